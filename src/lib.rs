mod archive;
mod config;
mod error;
mod roller;
mod symlink;
mod template;
mod tracker;

pub use config::Config;
pub use error::Error;
pub use roller::{LogRoller, LogRollerBuilder, RotateTrigger};
pub use template::PathTemplate;
pub use tracker::CompletionTracker;
