use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LECTURES_URL: &str = "http://localhost:8000/api/lectures/";
pub const DEFAULT_UPCOMING_URL: &str = "http://localhost:8000/api/upcoming/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TOAST_DURATION_SECS: u64 = 5;

/// Top-level config (lectern.toml + LECTERN_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LecternConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

/// Where the lecture record service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Collection URL. Create/update/delete paths are appended to it, so it
    /// must end with a slash.
    #[serde(default = "default_lectures_url")]
    pub lectures_url: String,
    #[serde(default = "default_upcoming_url")]
    pub upcoming_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lectures_url: default_lectures_url(),
            upcoming_url: default_upcoming_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Fetch once right away instead of waiting a full interval first.
    #[serde(default)]
    pub immediate_first_poll: bool,
    #[serde(default = "default_toast_duration_secs")]
    pub toast_duration_secs: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            immediate_first_poll: false,
            toast_duration_secs: DEFAULT_TOAST_DURATION_SECS,
        }
    }
}

impl RemindersConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }
}

fn default_lectures_url() -> String {
    DEFAULT_LECTURES_URL.to_string()
}
fn default_upcoming_url() -> String {
    DEFAULT_UPCOMING_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_toast_duration_secs() -> u64 {
    DEFAULT_TOAST_DURATION_SECS
}

impl LecternConfig {
    /// Load config from a TOML file with LECTERN_* env var overrides.
    ///
    /// A missing file is not an error; defaults fill every absent key.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: LecternConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("LECTERN_").split("__"))
            .extract()
            .map_err(|e| crate::error::LecternError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.reminders.poll_interval_secs == 0 {
            return Err(crate::error::LecternError::Config(
                "reminders.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.store.lectures_url.trim().is_empty() {
            return Err(crate::error::LecternError::Config(
                "store.lectures_url cannot be empty".to_string(),
            ));
        }
        if self.store.upcoming_url.trim().is_empty() {
            return Err(crate::error::LecternError::Config(
                "store.upcoming_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.lectern/lectern.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("absent.toml");
            let config = LecternConfig::load(path.to_str()).expect("defaults");
            assert_eq!(config.store.lectures_url, DEFAULT_LECTURES_URL);
            assert_eq!(config.store.upcoming_url, DEFAULT_UPCOMING_URL);
            assert_eq!(config.reminders.poll_interval(), Duration::from_secs(60));
            assert!(!config.reminders.immediate_first_poll);
            Ok(())
        });
    }

    #[test]
    fn toml_and_env_overrides_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lectern.toml",
                r#"
                [store]
                lectures_url = "http://school.test/api/lectures/"

                [reminders]
                poll_interval_secs = 30
                "#,
            )?;
            jail.set_env("LECTERN_REMINDERS__IMMEDIATE_FIRST_POLL", "true");

            let config = LecternConfig::load(Some("lectern.toml")).expect("config");
            assert_eq!(config.store.lectures_url, "http://school.test/api/lectures/");
            assert_eq!(config.reminders.poll_interval_secs, 30);
            assert!(config.reminders.immediate_first_poll);
            assert_eq!(config.reminders.toast_duration_secs, DEFAULT_TOAST_DURATION_SECS);
            Ok(())
        });
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("lectern.toml", "[reminders]\npoll_interval_secs = 0\n")?;
            let err = LecternConfig::load(Some("lectern.toml")).unwrap_err();
            assert_eq!(err.code(), "CONFIG_ERROR");
            Ok(())
        });
    }
}
