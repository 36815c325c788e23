//! Application configuration.
//!
//! Assembled once at startup from the environment and passed by reference
//! into the portal and chat layers. Required credentials missing at startup
//! is a hard error; the binary turns it into a non-zero exit.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Required environment variables.
pub const ENV_EMAIL: &str = "EMAIL_CONTROL_SERVICES";
pub const ENV_PASSWORD: &str = "PASSWORD_CONTROL_SERVICES";
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_BOT_TOKEN";

/// Optional overrides.
pub const ENV_DOWNLOAD_DIR: &str = "RELATO_DOWNLOAD_DIR";
pub const ENV_WEBDRIVER_URL: &str = "RELATO_WEBDRIVER_URL";
pub const ENV_HEADLESS: &str = "RELATO_HEADLESS";
pub const ENV_MAX_CONCURRENT: &str = "RELATO_MAX_CONCURRENT";
pub const ENV_REQUIRE_ORDERED_RANGE: &str = "RELATO_REQUIRE_ORDERED_RANGE";

/// Portal login credentials.
#[derive(Debug, Clone)]
pub struct PortalCredentials {
    pub email: String,
    pub password: String,
}

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Portal login credentials.
    pub credentials: PortalCredentials,
    /// Telegram bot token.
    pub telegram_token: String,
    /// WebDriver endpoint (chromedriver).
    pub webdriver_url: String,
    /// Directory the browser downloads reports into.
    pub download_dir: PathBuf,
    /// Run the browser headless.
    pub headless: bool,
    /// Timeout budget for each distinct page-condition wait.
    pub wait_timeout: Duration,
    /// Download watcher poll interval.
    pub poll_interval: Duration,
    /// Download watcher deadline.
    pub download_timeout: Duration,
    /// Bound on simultaneous report generations (1 = serialized).
    pub max_concurrent_reports: usize,
    /// Reject ranges where the start date is after the end date.
    pub require_ordered_range: bool,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// The three credential/token variables are required; everything else has
    /// a default and an optional `RELATO_*` override.
    pub fn from_env() -> CoreResult<Self> {
        let credentials = PortalCredentials {
            email: required(ENV_EMAIL)?,
            password: required(ENV_PASSWORD)?,
        };
        let telegram_token = required(ENV_TELEGRAM_TOKEN)?;

        let webdriver_url = env::var(ENV_WEBDRIVER_URL)
            .unwrap_or_else(|_| "http://localhost:9515".to_string());
        let download_dir = env::var(ENV_DOWNLOAD_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("downloads"));
        let headless = flag(ENV_HEADLESS)?;
        let require_ordered_range = flag(ENV_REQUIRE_ORDERED_RANGE)?;

        let max_concurrent_reports = match env::var(ENV_MAX_CONCURRENT) {
            Ok(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(CoreError::InvalidEnvValue {
                    var: ENV_MAX_CONCURRENT,
                    value,
                })?,
            Err(_) => 1,
        };

        Ok(Self {
            credentials,
            telegram_token,
            webdriver_url,
            download_dir,
            headless,
            wait_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            download_timeout: Duration::from_secs(60),
            max_concurrent_reports,
            require_ordered_range,
        })
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

fn required(var: &'static str) -> CoreResult<String> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(CoreError::MissingEnv(var)),
    }
}

fn flag(var: &'static str) -> CoreResult<bool> {
    match env::var(var) {
        Ok(value) => match value.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            _ => Err(CoreError::InvalidEnvValue { var, value }),
        },
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other under the parallel test runner.
    #[test]
    fn test_from_env() {
        for var in [
            ENV_EMAIL,
            ENV_PASSWORD,
            ENV_TELEGRAM_TOKEN,
            ENV_MAX_CONCURRENT,
        ] {
            env::remove_var(var);
        }

        assert!(matches!(
            AppConfig::from_env(),
            Err(CoreError::MissingEnv(ENV_EMAIL))
        ));

        env::set_var(ENV_EMAIL, "ops@example.com");
        env::set_var(ENV_PASSWORD, "secret");
        env::set_var(ENV_TELEGRAM_TOKEN, "token");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.credentials.email, "ops@example.com");
        assert_eq!(config.max_concurrent_reports, 1);
        assert_eq!(config.wait_timeout, Duration::from_secs(60));
        assert!(!config.require_ordered_range);
        assert!(!config.headless);

        env::set_var(ENV_MAX_CONCURRENT, "0");
        assert!(AppConfig::from_env().is_err());
        env::set_var(ENV_MAX_CONCURRENT, "3");
        assert_eq!(AppConfig::from_env().unwrap().max_concurrent_reports, 3);

        for var in [
            ENV_EMAIL,
            ENV_PASSWORD,
            ENV_TELEGRAM_TOKEN,
            ENV_MAX_CONCURRENT,
        ] {
            env::remove_var(var);
        }
    }
}
