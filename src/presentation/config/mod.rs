mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LoggingSettings, ProviderSettings, SecuritySettings, ServerSettings,
    Settings,
};
