//! Service configuration with validation.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it changes. Durations accept `"300s"`, `"5m"`, `"500ms"` or plain seconds.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ev_01_otp_auth::OtpConfig;
use ev_02_vote_ledger::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Length of the OTP HMAC key in bytes.
pub const SECRET_LEN: usize = 32;

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

impl std::str::FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => Err(ConfigError::Invalid(format!("unknown mode '{other}'"))),
        }
    }
}

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    pub mode: RunMode,
    pub http: HttpConfig,
    pub otp: OtpSettings,
    pub voting: VotingConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub limits: LimitsConfig,
    pub timeouts: TimeoutConfig,
    pub cors: CorsConfig,
    /// Voter roll imported at startup.
    pub seed_file: Option<PathBuf>,
}

impl ElectionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.otp.ttl.is_zero() {
            return Err(ConfigError::InvalidTimeout("otp.ttl cannot be 0".into()));
        }
        if self.otp.max_attempts == 0 {
            return Err(ConfigError::InvalidLimit("otp.max_attempts cannot be 0".into()));
        }
        if self.otp.max_entries == 0 {
            return Err(ConfigError::InvalidLimit("otp.max_entries cannot be 0".into()));
        }
        if self.otp.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout("otp.sweep_interval cannot be 0".into()));
        }
        if self.voting.pass_ttl.is_zero() {
            return Err(ConfigError::InvalidTimeout("voting.pass_ttl cannot be 0".into()));
        }
        if self.voting.increment_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "voting.increment_attempts cannot be 0".into(),
            ));
        }

        if self.rate_limit.requests_per_second == 0 || self.rate_limit.writes_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "requests_per_second and writes_per_second cannot be 0".into(),
            ));
        }
        if self.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidRateLimit("burst_size cannot be 0".into()));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit("max_request_size cannot be 0".into()));
        }
        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout("request timeout cannot be 0".into()));
        }

        let secret = self.otp.secret_bytes()?;
        if self.mode.is_production() {
            if secret.iter().all(|b| *b == 0) {
                return Err(ConfigError::Insecure(
                    "otp.hmac_secret must be set in production".into(),
                ));
            }
            if self.otp.expose_code {
                return Err(ConfigError::Insecure(
                    "otp.expose_code is not allowed in production".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Settings for the OTP service.
    pub fn otp_config(&self) -> OtpConfig {
        OtpConfig {
            ttl: self.otp.ttl,
            max_attempts: self.otp.max_attempts,
            max_entries: self.otp.max_entries,
            // Never echo codes in production, whatever the file says.
            expose_code: self.otp.expose_code && !self.mode.is_production(),
            pass_ttl: self.voting.pass_ttl,
        }
    }

    /// Retry policy for the tally increment.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.voting.increment_attempts,
            initial_backoff: self.voting.retry_backoff,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 5000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
        }
    }
}

/// OTP issuance and verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpSettings {
    /// Code lifetime
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Failed attempts before a challenge is discarded
    pub max_attempts: u32,
    /// Live challenges held in memory
    pub max_entries: usize,
    /// Return the code in the send-otp response (development only)
    pub expose_code: bool,
    /// HMAC key, 64 hex characters. Empty means unset.
    pub hmac_secret: String,
    /// Interval of the expired-challenge sweep
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_attempts: 5,
            max_entries: 100_000,
            expose_code: false,
            hmac_secret: String::new(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl OtpSettings {
    /// Decode the HMAC key. An unset secret decodes to all zeros.
    pub fn secret_bytes(&self) -> Result<[u8; SECRET_LEN], ConfigError> {
        let mut key = [0u8; SECRET_LEN];
        let trimmed = self.hmac_secret.trim();
        if trimmed.is_empty() {
            return Ok(key);
        }
        hex::decode_to_slice(trimmed, &mut key).map_err(|e| {
            ConfigError::Invalid(format!(
                "otp.hmac_secret must be {} hex characters: {e}",
                SECRET_LEN * 2
            ))
        })?;
        Ok(key)
    }

    pub fn has_secret(&self) -> bool {
        !self.hmac_secret.trim().is_empty()
    }
}

/// Vote casting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Require a voting pass from verify-otp on cast-vote
    pub require_pass: bool,
    /// Voting pass lifetime
    #[serde(with = "humantime_serde")]
    pub pass_ttl: Duration,
    /// Tries for the tally increment, including the first
    pub increment_attempts: u32,
    /// Backoff before the first increment retry
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            require_pass: true,
            pass_ttl: Duration::from_secs(10 * 60),
            increment_attempts: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

/// Operator endpoints under `/api/admin`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Required API key (None = localhost only, no key)
    pub api_key: Option<String>,
    /// Allow non-localhost connections
    pub allow_external: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// GET requests per second per IP
    pub requests_per_second: u32,
    /// POST requests per second per IP
    pub writes_per_second: u32,
    /// Burst allowance for reads; writes get a tenth of it
    pub burst_size: u32,
    /// Enable rate limiting
    pub enabled: bool,
    /// IPs exempt from rate limiting
    pub whitelist: Vec<IpAddr>,
    /// Use X-Forwarded-For / X-Real-IP for the client address
    pub trust_forwarded_headers: bool,
    /// Idle time after which a client's bucket is dropped
    #[serde(with = "humantime_serde")]
    pub bucket_idle: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 20,
            writes_per_second: 2,
            burst_size: 40,
            enabled: true,
            whitelist: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            trust_forwarded_headers: false,
            bucket_idle: Duration::from_secs(600),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 16KB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 16 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on handling one request
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: 86400, // 24 hours
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Setting not allowed in production
    #[error("insecure configuration: {0}")]
    Insecure(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m": both are suffixes of it.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map_err(|_| "invalid minutes")?
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("minutes out of range")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
