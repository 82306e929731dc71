mod notifier;
mod scheduler;
mod settings;

pub use notifier::{
    ErrorEvent, ErrorNotifierLayer, ErrorReceiver, ErrorSender, create_error_channel,
    start_notifier,
};
pub use scheduler::{PollScheduler, poll_delay};
pub use settings::{SettingsError, SettingsService};
