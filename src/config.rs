//! Where to read snapshots from.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! before this runs):
//!
//! | Variable        | Meaning                                   | Default      |
//! |-----------------|-------------------------------------------|--------------|
//! | `WASTE_DB_URL`  | Realtime database root URL                | required     |
//! | `WASTE_DB_PATH` | Path of the event log under the root      | `waste_logs` |
//! | `WASTE_DB_AUTH` | ID token or database secret (`?auth=`)    | none         |

use anyhow::{Context, Result};

pub const DEFAULT_PATH: &str = "waste_logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub database_url: String,
    pub path: String,
    pub auth_token: Option<String>,
}

impl SourceConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            path: DEFAULT_PATH.to_string(),
            auth_token: None,
        }
    }

    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        let database_url = get("WASTE_DB_URL").context("WASTE_DB_URL must be set")?;
        let path = get("WASTE_DB_PATH").unwrap_or_else(|| DEFAULT_PATH.to_string());
        let auth_token = auth_token_from(&lookup);

        Ok(Self {
            database_url,
            path,
            auth_token,
        })
    }

    /// REST endpoint returning the event log as JSON.
    pub fn snapshot_url(&self) -> String {
        format!(
            "{}/{}.json",
            self.database_url.trim_end_matches('/'),
            self.path.trim_matches('/')
        )
    }
}

/// The `WASTE_DB_AUTH` token alone, for URLs given without a full config.
pub fn auth_token_from<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup("WASTE_DB_AUTH"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
