//! Configuration loading.
//!
//! Order: built-in defaults, then the JSON file named by `EV_CONFIG`, then
//! individual environment overrides.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ev_04_api_gateway::{ElectionConfig, RunMode, SECRET_LEN};
use rand::RngCore;
use tracing::{info, warn};

pub const ENV_CONFIG: &str = "EV_CONFIG";
pub const ENV_MODE: &str = "EV_MODE";
pub const ENV_HTTP_PORT: &str = "EV_HTTP_PORT";
pub const ENV_OTP_HMAC_SECRET: &str = "EV_OTP_HMAC_SECRET";
pub const ENV_SEED_FILE: &str = "EV_SEED_FILE";

/// Load configuration from the process environment.
pub fn load_config() -> Result<ElectionConfig> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` for environment variables.
pub fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> Result<ElectionConfig> {
    let mut config = match lookup(ENV_CONFIG) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            let config: ElectionConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file {path}"))?;
            info!(path = %path, "Loaded configuration file");
            config
        }
        None => ElectionConfig::default(),
    };

    if let Some(mode) = lookup(ENV_MODE) {
        config.mode = mode
            .parse::<RunMode>()
            .with_context(|| format!("invalid {ENV_MODE}"))?;
    }

    if let Some(port) = lookup(ENV_HTTP_PORT) {
        config.http.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid {ENV_HTTP_PORT} '{port}'"))?;
    }

    if let Some(secret_hex) = lookup(ENV_OTP_HMAC_SECRET) {
        let secret_hex = secret_hex.trim().to_string();
        if secret_hex.len() != SECRET_LEN * 2 || hex::decode(&secret_hex).is_err() {
            bail!(
                "{ENV_OTP_HMAC_SECRET} must be {SECRET_LEN} bytes ({} hex chars)",
                SECRET_LEN * 2
            );
        }
        config.otp.hmac_secret = secret_hex;
        info!("Loaded OTP HMAC secret from environment");
    }

    if let Some(seed) = lookup(ENV_SEED_FILE) {
        config.seed_file = Some(PathBuf::from(seed));
    }

    ensure_secret(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Give development runs a throwaway key.
///
/// Codes and voting passes issued under it do not survive a restart.
/// Production is left alone so validation rejects the missing secret.
fn ensure_secret(config: &mut ElectionConfig) {
    if config.otp.has_secret() || config.mode.is_production() {
        return;
    }
    let mut key = [0u8; SECRET_LEN];
    rand::rngs::OsRng.fill_bytes(&mut key);
    config.otp.hmac_secret = hex::encode(key);
    warn!("No OTP HMAC secret configured; generated a random key for this run");
}
