//! Configuration: on-disk locations and user settings

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
