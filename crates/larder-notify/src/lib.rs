//! # larder-notify
//!
//! Notification scheduling and delivery for Larder.
//!
//! - [`LocalDispatcher`] keeps scheduled notifications in SQLite and answers
//!   "what is due now?"
//! - [`NotificationSink`] implementations put a due notification in front of
//!   the user: [`LogSink`] through the log, [`ExpoPushSink`] through Expo push.
//! - [`register_for_push`] validates push configuration and stores the token.

pub mod local;
pub mod push;
pub mod sink;

pub use local::{LocalDispatcher, Repeat, ScheduledNotification};
pub use push::{register_for_push, ExpoPushSink};
pub use sink::{LogSink, NotificationSink};
