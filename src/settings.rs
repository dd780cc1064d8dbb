use std::fs::create_dir_all;
use std::path::PathBuf;

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

/// Server settings: `cloudream.toml` if present, then `CLOUDREAM_*` variables
/// (a `.env` file is loaded into the environment first).
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub db_path: String,
    pub static_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub token_ttl_minutes: i64,
}

/// The subset of settings the login and bearer-token checks need.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub admin_username: String,
    pub admin_password: SecretString,
    pub token_ttl: chrono::Duration,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::builder()?
            .add_source(File::with_name("cloudream").required(false))
            .add_source(Environment::with_prefix("CLOUDREAM"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("db_path", "cloudream.db")?
            .set_default("static_dir", "static")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("token_ttl_minutes", 60)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth(&self) -> AuthSettings {
        AuthSettings {
            admin_username: self.admin_username.clone(),
            admin_password: self.admin_password.clone(),
            token_ttl: chrono::Duration::minutes(self.token_ttl_minutes),
        }
    }

    pub fn ensure_static_dir(&self) -> anyhow::Result<()> {
        if !self.static_dir.exists() {
            create_dir_all(&self.static_dir)
                .context("Failed to create directory for static content")?;
        }
        if !self.static_dir.is_dir() {
            anyhow::bail!("static_dir should be a directory or not exist");
        }
        Ok(())
    }
}
