//! Weather list state: the synchronized collection, its pager and the
//! notification banner.

pub mod models;
pub mod notification;
pub mod pager;
pub mod services;

pub use models::weather_list::{ViewMode, WeatherListModel};
pub use notification::{Notification, NotificationScheduler, Severity};
pub use pager::{compute_window, PageWindow};
