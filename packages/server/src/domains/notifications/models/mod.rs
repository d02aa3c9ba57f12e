pub mod notification;

pub use notification::{Notification, NotificationFilter, NotificationKind, NotificationRow};
