use chrono_tz::Tz;
use thiserror::Error;

const DEFAULT_HTTP_PORT: u16 = 3004;
const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Paris;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("LOG_FILE_PATH and LOG_ARCHIVE_PATTERN must be set together")]
    IncompleteLogFile,
}

/// Rolling log file settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFile {
    pub path: String,
    pub archive_pattern: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file. Without one the server keeps everything in
    /// memory and forgets it on shutdown.
    pub db_path: Option<String>,
    pub http_port: u16,
    /// Zone the Friday 17:00 selection deadline is read in.
    pub time_zone: Tz,
    pub log_file: Option<LogFile>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("INTERCLUB_DB").filter(|path| !path.trim().is_empty());

        let http_port = match lookup("INTERCLUB_HTTP_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "INTERCLUB_HTTP_PORT",
                expected: "a valid u16",
                value,
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let time_zone = match lookup("INTERCLUB_TIME_ZONE") {
            Some(value) => value.trim().parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "INTERCLUB_TIME_ZONE",
                expected: "an IANA time zone name",
                value,
            })?,
            None => DEFAULT_TIME_ZONE,
        };

        let log_file = match (lookup("LOG_FILE_PATH"), lookup("LOG_ARCHIVE_PATTERN")) {
            (Some(path), Some(archive_pattern)) => Some(LogFile {
                path,
                archive_pattern,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteLogFile),
        };

        Ok(Self {
            db_path,
            http_port,
            time_zone,
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_path, None);
        assert_eq!(config.http_port, 3004);
        assert_eq!(config.time_zone, chrono_tz::Europe::Paris);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_values_are_read() {
        let config = config(&[
            ("INTERCLUB_DB", "/var/lib/interclub/interclub.db"),
            ("INTERCLUB_HTTP_PORT", "8080"),
            ("INTERCLUB_TIME_ZONE", "Europe/Helsinki"),
            ("LOG_FILE_PATH", "logs/interclub.log"),
            ("LOG_ARCHIVE_PATTERN", "logs/interclub.{}.log.gz"),
        ])
        .unwrap();
        assert_eq!(
            config.db_path.as_deref(),
            Some("/var/lib/interclub/interclub.db")
        );
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.time_zone, chrono_tz::Europe::Helsinki);
        assert_eq!(
            config.log_file.unwrap().archive_pattern,
            "logs/interclub.{}.log.gz"
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(matches!(
            config(&[("INTERCLUB_HTTP_PORT", "70000")]),
            Err(ConfigError::Invalid {
                name: "INTERCLUB_HTTP_PORT",
                ..
            })
        ));
        assert!(matches!(
            config(&[("INTERCLUB_TIME_ZONE", "+01:00")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert_eq!(
            config(&[("LOG_FILE_PATH", "interclub.log")]),
            Err(ConfigError::IncompleteLogFile)
        );
    }
}
