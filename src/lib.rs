pub mod ashby;
pub mod config;
pub mod credentials;
pub mod fetch;
pub mod output;
pub mod screening;
pub mod telemetry;
