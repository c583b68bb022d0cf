//! Server configuration read from the environment.
//!
//! A `.env` file in the working directory is honoured when present.

use std::net::SocketAddr;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys & Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DATABASE_PATH: &str = "DATABASE_PATH";
pub const DATABASE_SEED: &str = "DATABASE_SEED";
pub const APPLICANT_TABLE: &str = "APPLICANT_TABLE";
pub const APPLICANT_ID_COLUMN: &str = "APPLICANT_ID_COLUMN";
pub const MODEL_PATH: &str = "MODEL_PATH";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_DATABASE_PATH: &str = "data/lender.db";
const DEFAULT_APPLICANT_TABLE: &str = "application_master_record";
const DEFAULT_APPLICANT_ID_COLUMN: &str = "applicant_id";
const DEFAULT_MODEL_PATH: &str = "models/credit_risk_model.json";

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// SQL file run against the store at startup, for local development.
    pub database_seed: Option<PathBuf>,
    pub applicant_table: String,
    pub applicant_id_column: String,
    pub model_path: PathBuf,
}

impl ServerConfig {
    /// Loads `.env` (if any), then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let bind_raw = get_or(BIND_ADDR, DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: BIND_ADDR,
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            bind_addr,
            database_path: get_or(DATABASE_PATH, DEFAULT_DATABASE_PATH).into(),
            database_seed: get(DATABASE_SEED).map(PathBuf::from),
            applicant_table: get_or(APPLICANT_TABLE, DEFAULT_APPLICANT_TABLE),
            applicant_id_column: get_or(APPLICANT_ID_COLUMN, DEFAULT_APPLICANT_ID_COLUMN),
            model_path: get_or(MODEL_PATH, DEFAULT_MODEL_PATH).into(),
        })
    }
}
