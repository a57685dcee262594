pub mod api;
pub mod configuration;
pub mod gateway;
pub mod mapping;
pub mod models;
pub mod router;
pub mod run;
pub mod storage;

pub use configuration::Settings;
pub use models::Cli;
pub use run::run;
