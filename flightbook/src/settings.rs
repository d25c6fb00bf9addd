//! # Settings Module
//!
//! Runtime configuration read from the environment (and `.env`, loaded by the
//! binary through `dotenvy`).
//!
//! | Variable        | Default          |
//! |-----------------|------------------|
//! | `DATABASE_URL`  | required         |
//! | `BIND_ADDRESS`  | `127.0.0.1:8086` |
//! | `UPLOAD_FOLDER` | `uploads`        |
//! | `BCRYPT_COST`   | `bcrypt::DEFAULT_COST` |
//! | `SEED_DATA`     | `false`          |

use std::path::PathBuf;

use crate::Error;

/// Address the server binds to when `BIND_ADDRESS` is unset.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8086";

/// Image directory used when `UPLOAD_FOLDER` is unset.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Directory that `Post` image filenames are resolved against.
    pub upload_folder: PathBuf,
    pub bcrypt_cost: u32,
    /// Drop, recreate and fill the tables with sample data at startup.
    pub seed_data: bool,
}

impl Settings {
    /// Default settings for the given database.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_data: false,
        }
    }

    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::config("DATABASE_URL is not defined"))?;
        let mut settings = Self::new(database_url);

        if let Some(addr) = lookup("BIND_ADDRESS") {
            settings.bind_address = addr;
        }
        if let Some(dir) = lookup("UPLOAD_FOLDER") {
            settings.upload_folder = PathBuf::from(dir);
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            settings.bcrypt_cost = parse_cost(&cost)?;
        }
        if let Some(flag) = lookup("SEED_DATA") {
            settings.seed_data = parse_flag("SEED_DATA", &flag)?;
        }

        Ok(settings)
    }
}

fn parse_cost(value: &str) -> Result<u32, Error> {
    let cost: u32 = value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("BCRYPT_COST '{}' is not a number: {}", value, e)))?;
    // bcrypt accepts 4..=31
    if !(4..=31).contains(&cost) {
        return Err(Error::Config(format!("BCRYPT_COST must be between 4 and 31, got {}", cost)));
    }
    Ok(cost)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{} must be true or false, got '{}'", name, other))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let settings = Settings::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.upload_folder, PathBuf::from("uploads"));
        assert_eq!(settings.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(!settings.seed_data);
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flightbook"),
            ("BIND_ADDRESS", "0.0.0.0:9000"),
            ("UPLOAD_FOLDER", "/srv/images"),
            ("BCRYPT_COST", "6"),
            ("SEED_DATA", "True"),
        ]))
        .unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.upload_folder, PathBuf::from("/srv/images"));
        assert_eq!(settings.bcrypt_cost, 6);
        assert!(settings.seed_data);
    }

    #[test]
    fn requires_database_url() {
        assert!(matches!(Settings::from_lookup(lookup(&[])), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_cost = lookup(&[("DATABASE_URL", "sqlite::memory:"), ("BCRYPT_COST", "2")]);
        assert!(matches!(Settings::from_lookup(bad_cost), Err(Error::Config(_))));

        let bad_flag = lookup(&[("DATABASE_URL", "sqlite::memory:"), ("SEED_DATA", "maybe")]);
        assert!(matches!(Settings::from_lookup(bad_flag), Err(Error::Config(_))));
    }
}
