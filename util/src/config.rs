//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use chrono::NaiveTime;
use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub check_in_start: NaiveTime,
    pub check_in_end: NaiveTime,
    pub checkout_early_threshold: NaiveTime,
    pub checkout_late_threshold: NaiveTime,
    pub early_departure_points: i32,
    pub late_departure_points: i32,
    pub geolocation_timeout_secs: u64,
    pub referral_rules_path: Option<String>,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn time_var(key: &str, default: &str) -> NaiveTime {
    let raw = env::var(key).unwrap_or_else(|_| default.into());
    NaiveTime::parse_from_str(&raw, "%H:%M:%S")
        .unwrap_or_else(|_| panic!("{key} must be a HH:MM:SS time, got {raw}"))
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing or improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "kesiswaan".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "workflow=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "kesiswaan.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").expect("DATABASE_PATH is required"),
            check_in_start: time_var("CHECK_IN_START", "06:00:00"),
            check_in_end: time_var("CHECK_IN_END", "07:30:00"),
            checkout_early_threshold: time_var("CHECKOUT_EARLY_THRESHOLD", "15:15:00"),
            checkout_late_threshold: time_var("CHECKOUT_LATE_THRESHOLD", "17:15:00"),
            early_departure_points: env::var("EARLY_DEPARTURE_POINTS")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .expect("EARLY_DEPARTURE_POINTS must be an integer"),
            late_departure_points: env::var("LATE_DEPARTURE_POINTS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .expect("LATE_DEPARTURE_POINTS must be an integer"),
            geolocation_timeout_secs: env::var("GEOLOCATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .expect("GEOLOCATION_TIMEOUT_SECS must be an integer"),
            referral_rules_path: env::var("REFERRAL_RULES_PATH").ok(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_check_in_start(value: NaiveTime) {
        AppConfig::set_field(|cfg| cfg.check_in_start = value);
    }

    pub fn set_check_in_end(value: NaiveTime) {
        AppConfig::set_field(|cfg| cfg.check_in_end = value);
    }

    pub fn set_checkout_early_threshold(value: NaiveTime) {
        AppConfig::set_field(|cfg| cfg.checkout_early_threshold = value);
    }

    pub fn set_checkout_late_threshold(value: NaiveTime) {
        AppConfig::set_field(|cfg| cfg.checkout_late_threshold = value);
    }

    pub fn set_early_departure_points(value: i32) {
        AppConfig::set_field(|cfg| cfg.early_departure_points = value);
    }

    pub fn set_late_departure_points(value: i32) {
        AppConfig::set_field(|cfg| cfg.late_departure_points = value);
    }

    pub fn set_geolocation_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.geolocation_timeout_secs = value);
    }

    pub fn set_referral_rules_path(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.referral_rules_path = value);
    }
}
