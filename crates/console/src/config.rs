//! Console configuration.

use std::path::PathBuf;

use anyhow::Context;

use puntualcheck_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "https://puntualcheck-production.up.railway.app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    pub log_format: LogFormat,
}

impl ConsoleConfig {
    /// Build a validated config; `session_file` defaults to the data dir.
    pub fn new(api_url: &str, session_file: Option<PathBuf>, log_format: LogFormat) -> anyhow::Result<Self> {
        let api_url = validate_api_url(api_url)?;
        let session_file = match session_file {
            Some(path) => path,
            None => default_session_file()?,
        };
        Ok(Self {
            api_url,
            session_file,
            log_format,
        })
    }
}

/// Accept only absolute `http`/`https` URLs; trailing slashes are trimmed.
pub fn validate_api_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).with_context(|| format!("invalid API URL '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => anyhow::bail!("unsupported API URL scheme '{other}' (expected http or https)"),
    }
}

/// `<data dir>/puntualcheck/session.json`.
pub fn default_session_file() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("puntualcheck");
    path.push("session.json");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        assert_eq!(validate_api_url("http://localhost:8080/").unwrap(), "http://localhost:8080");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(validate_api_url("ftp://example.com").is_err());
        assert!(validate_api_url("not a url").is_err());
    }

    #[test]
    fn explicit_session_file_wins() {
        let cfg = ConsoleConfig::new(DEFAULT_API_URL, Some(PathBuf::from("/tmp/s.json")), LogFormat::Text).unwrap();
        assert_eq!(cfg.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }
}
