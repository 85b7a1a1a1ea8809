use serde::{Deserialize, Serialize};

use crate::recipe::RecipeId;

/// Screen a notification points at when tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Home,
    Profile,
    Recipe,
}

/// Routing payload attached to every notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub screen: Screen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
}

impl NotificationData {
    pub fn screen(screen: Screen) -> Self {
        Self { screen, id: None }
    }
}

/// What a notification shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

impl NotificationContent {
    /// "Recipe Saved" notification fired once per newly favorited recipe.
    pub fn recipe_saved(recipe_title: &str) -> Self {
        Self {
            title: "Recipe Saved! 🎉".to_string(),
            body: format!("{recipe_title} has been added to your favorites"),
            data: NotificationData::screen(Screen::Profile),
        }
    }

    /// Daily cooking suggestion.
    pub fn daily_suggestion() -> Self {
        Self {
            title: "Time to cook something delicious! 👨‍🍳".to_string(),
            body: "Check out today's recipe suggestions".to_string(),
            data: NotificationData::screen(Screen::Home),
        }
    }

    pub fn test_immediate() -> Self {
        Self {
            title: "Test Notification".to_string(),
            body: "This is a test notification".to_string(),
            data: NotificationData::screen(Screen::Home),
        }
    }

    pub fn test_scheduled(seconds: u64) -> Self {
        Self {
            title: "Scheduled Test Notification 🍳".to_string(),
            body: format!("This notification was scheduled for {seconds} seconds later"),
            data: NotificationData::screen(Screen::Home),
        }
    }
}

/// When a notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Deliver right away.
    Immediate,
    /// Deliver once after a relative delay.
    AfterSeconds { seconds: u64 },
    /// Repeat every day at a local time of day.
    Daily { hour: u32, minute: u32 },
}

impl Trigger {
    pub fn repeats(&self) -> bool {
        matches!(self, Self::Daily { .. })
    }
}

/// How a delivered notification is presented.
///
/// Set once from configuration when the dispatcher is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPolicy {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_serializes_without_absent_id() {
        let json = serde_json::to_string(&NotificationData::screen(Screen::Home)).unwrap();
        assert_eq!(json, r#"{"screen":"home"}"#);

        let data = NotificationData {
            screen: Screen::Recipe,
            id: Some(42),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"screen":"recipe","id":42}"#);
    }

    #[test]
    fn test_recipe_saved_body_mentions_title() {
        let content = NotificationContent::recipe_saved("Lemon Risotto");
        assert_eq!(content.body, "Lemon Risotto has been added to your favorites");
        assert_eq!(content.data.screen, Screen::Profile);
    }

    #[test]
    fn test_only_daily_trigger_repeats() {
        assert!(Trigger::Daily { hour: 12, minute: 0 }.repeats());
        assert!(!Trigger::Immediate.repeats());
        assert!(!Trigger::AfterSeconds { seconds: 5 }.repeats());
    }
}
