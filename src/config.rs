use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Where the startup import reads its rows from.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub source: PathBuf,
    pub delimiter: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("velib-pos.csv"),
            delimiter: b';',
        }
    }
}

/// Bootstrap account, created only while the user table is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub ingest: IngestConfig,
    pub seed_user: Option<SeedUser>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "velib-stations".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "velib-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };

        let defaults = IngestConfig::default();
        let ingest = IngestConfig {
            source: std::env::var("INGEST_SOURCE")
                .map(PathBuf::from)
                .unwrap_or(defaults.source),
            delimiter: std::env::var("INGEST_DELIMITER")
                .ok()
                .and_then(|v| parse_delimiter(&v))
                .unwrap_or(defaults.delimiter),
        };

        let seed_user = match (
            std::env::var("SEED_USERNAME"),
            std::env::var("SEED_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some(SeedUser { username, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt,
            ingest,
            seed_user,
        })
    }
}

fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw.as_bytes() {
        [b] => Some(*b),
        _ if raw == "\\t" => Some(b'\t'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_accepts_single_byte_and_tab_escape() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter(","), Some(b','));
        assert_eq!(parse_delimiter("\\t"), Some(b'\t'));
        assert_eq!(parse_delimiter(""), None);
        assert_eq!(parse_delimiter(";;"), None);
    }
}
