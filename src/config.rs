use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub cv_parse_delay_ms: u64,
    pub public_rps: u32,
    pub upload_per_minute: u32,
    pub wizard_idle_secs: u64,
    pub dashboard_page_size: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            api_base_url: get_env("API_BASE_URL")?,
            storage_dir: PathBuf::from(get_env("STORAGE_DIR")?),
            request_timeout_secs: get_env_parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            cv_parse_delay_ms: get_env_parse_or("CV_PARSE_DELAY_MS", 1500)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            upload_per_minute: get_env_parse_or("UPLOAD_PER_MINUTE", 20)?,
            wizard_idle_secs: get_env_parse_or("WIZARD_IDLE_SECS", 1800)?,
            dashboard_page_size: get_env_parse_or("DASHBOARD_PAGE_SIZE", 10)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
