pub mod app_state;
pub mod notification_manager;

pub use app_state::{AppState, Session};
pub use notification_manager::{ChangeTopic, NotificationManager};
