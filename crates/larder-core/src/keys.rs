//! Fixed key-value store keys shared by every component.

/// JSON array of favorited recipe ids.
pub const FAVORITE_RECIPES: &str = "favoriteRecipes";

/// JSON array of recipe ids that already produced a "Recipe Saved" notification.
pub const LAST_NOTIFIED_RECIPES: &str = "lastNotifiedRecipes";

/// Identifier of the active daily reminder, if any.
pub const DAILY_NOTIFICATION_ID: &str = "dailyNotificationId";

/// Push token obtained during push registration.
pub const PUSH_TOKEN: &str = "pushToken";
