// ============================
// crates/backend-lib/src/config/mod.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::token_generator::generate_secure_token;
use crate::error::AppError;


/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "teamgate.toml";

/// Prefix for environment overrides, e.g. `TEAMGATE_BIND_ADDR`
pub const ENV_PREFIX: &str = "TEAMGATE_";

/// Upper bound for the session lifetime (about 100 years); token timestamps are `i64`
pub const MAX_SESSION_AGE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// JSON file holding the member directory
    pub directory_path: PathBuf,
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of the human format
    #[serde(default)]
    pub log_json: bool,
    /// Token signing secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Route of the sign-in page clients are sent to
    pub sign_in_page: String,
    /// Where a successful sign-in sends the client
    pub callback_url: String,
    /// Session lifetime in seconds, renewed on every session read
    pub session_max_age_secs: u64,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
    /// Take the client address from `x-real-ip`/`x-forwarded-for`.
    /// Only enable behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trusted_proxy: bool,
    /// Sign-in throttling
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Failed sign-in throttling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Failed attempts before an address is locked out
    pub max_attempts: u32,
    /// Lockout duration in seconds
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            directory_path: PathBuf::from("data/members.json"),
            log_level: "info".to_string(),
            log_json: false,
            secret: None,
            sign_in_page: "/login".to_string(),
            callback_url: "/".to_string(),
            session_max_age_secs: 30 * 24 * 60 * 60, // 30 days
            cookie_name: "teamgate.session-token".to_string(),
            secure_cookies: false,
            trusted_proxy: false,
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Settings {
    /// Load settings from `teamgate.toml` and the environment
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from the given file and the environment.
    ///
    /// Precedence, lowest first: built-in defaults, the file,
    /// `NEXTAUTH_SECRET`/`AUTH_SECRET`, `TEAMGATE_*` variables.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::raw().only(&["AUTH_SECRET"]).map(|_| "secret".into()))
            .merge(Env::raw().only(&["NEXTAUTH_SECRET"]).map(|_| "secret".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values the server cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "invalid log level `{}`",
                self.log_level
            )));
        }

        if self.session_max_age_secs == 0 {
            return Err(AppError::Config(
                "session_max_age_secs must be greater than zero".to_string(),
            ));
        }

        if self.session_max_age_secs > MAX_SESSION_AGE_SECS {
            return Err(AppError::Config(format!(
                "session_max_age_secs must be at most {MAX_SESSION_AGE_SECS}"
            )));
        }

        if !self.sign_in_page.starts_with('/') {
            return Err(AppError::Config(format!(
                "sign_in_page must be an absolute path, got `{}`",
                self.sign_in_page
            )));
        }

        if self.cookie_name.is_empty() || self.cookie_name.contains([';', '=', ' ']) {
            return Err(AppError::Config(format!(
                "invalid cookie name `{}`",
                self.cookie_name
            )));
        }

        if self.rate_limit.max_attempts == 0 {
            return Err(AppError::Config(
                "rate_limit.max_attempts must be greater than zero".to_string(),
            ));
        }

        if matches!(&self.secret, Some(secret) if secret.trim().is_empty()) {
            return Err(AppError::Config("secret must not be blank".to_string()));
        }

        if self.secret.is_none() && !cfg!(debug_assertions) {
            return Err(AppError::Config(
                "a signing secret is required (set TEAMGATE_SECRET or NEXTAUTH_SECRET)".to_string(),
            ));
        }

        Ok(())
    }

    /// Secret used to sign session tokens.
    ///
    /// Debug builds without a configured secret get a random one that lives
    /// as long as the process; every restart signs everyone out.
    pub fn signing_secret(&self) -> Result<String, AppError> {
        match &self.secret {
            Some(secret) if !secret.trim().is_empty() => Ok(secret.clone()),
            _ if cfg!(debug_assertions) => {
                tracing::warn!("no signing secret configured, using an ephemeral one");
                Ok(generate_secure_token())
            },
            _ => Err(AppError::Config("missing signing secret".to_string())),
        }
    }

    /// Session lifetime
    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_secs)
    }

    /// Sign-in page with an `error` query parameter
    pub fn sign_in_error_url(&self, error: &str) -> String {
        format!("{}?error={}", self.sign_in_page, urlencoding::encode(error))
    }
}
