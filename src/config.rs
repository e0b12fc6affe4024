use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const PORT: u16 = 8080;
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Startup-only failure; never reaches an HTTP response.
#[derive(Error, Debug)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Where a submission's files end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// A fresh timestamp-named folder per request.
    PerSubmission,
    /// One shared `images` folder, emptied before every request.
    Shared,
}

impl FromStr for UploadMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "per-submission" | "per_submission" | "folder" => Ok(UploadMode::PerSubmission),
            "shared" | "images" => Ok(UploadMode::Shared),
            other => Err(ConfigError(format!("unknown UPLOAD_MODE '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub uploads_dir: PathBuf,
    pub mode: UploadMode,
}

impl Config {
    /// Reads `UPLOADS_DIR` and `UPLOAD_MODE`, falling back to defaults.
    /// The listen port is always 8080.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let uploads_dir = lookup("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR));

        let mode = match lookup("UPLOAD_MODE") {
            Some(raw) => raw.parse()?,
            None => UploadMode::PerSubmission,
        };

        Ok(Self { uploads_dir, mode })
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.mode, UploadMode::PerSubmission);
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("UPLOADS_DIR", "/srv/uploads"),
            ("UPLOAD_MODE", "shared"),
        ]))
        .unwrap();
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.mode, UploadMode::Shared);
    }

    #[test]
    fn test_port_is_not_configurable() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("UPLOAD_MODE", "s3")])).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: unknown UPLOAD_MODE 's3'");
    }

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!("Per-Submission".parse::<UploadMode>().unwrap(), UploadMode::PerSubmission);
        assert_eq!(" SHARED ".parse::<UploadMode>().unwrap(), UploadMode::Shared);
    }
}
