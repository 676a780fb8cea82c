mod input;
mod key_result;
mod notification;
mod search_input;

pub use key_result::KeyResult;
pub use notification::{Notification, NotificationCenter, NotificationLevel, Notifier};
pub use search_input::{SearchEvent, SearchInput};
