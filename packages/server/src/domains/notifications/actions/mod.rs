//! Notification actions - read paths over a user's notifications.

mod queries;

pub use queries::list_notifications;
