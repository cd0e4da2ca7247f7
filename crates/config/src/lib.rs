// Configuration loading

pub mod settings;

pub use settings::{
    ApiSettings, ClearSettings, ConfigError, DedupSettings, GoalSettings, RetrySettings, Settings,
};
