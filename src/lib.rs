pub mod db;
pub mod import;
pub mod quiz;
pub mod server;
pub mod settings;
pub mod telemetry;
