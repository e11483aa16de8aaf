// 🔐 Secret store - database credentials for the persister
// One lookup per run, keyed by secret id + region

use crate::error::PipelineError;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::PathBuf;

/// Credential bundle stored as the secret's JSON string.
/// `engine` names the database to connect to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    pub engine: String,
}

impl DatabaseCredentials {
    /// `postgresql://<user>:<password>@<host>:<port>/<database>`
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.engine
        )
    }

    /// Connection string with the password masked, for logs
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.username, self.host, self.port, self.engine
        )
    }
}

// Secret payloads carry the port either as a number or a string
fn port_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// SecretStore - where credential bundles come from
pub trait SecretStore {
    /// Raw secret string for an id in a region
    fn get_secret_value(&self, secret_id: &str, region: &str) -> Result<String>;

    /// Fetch and decode database credentials
    fn fetch_credentials(&self, secret_id: &str, region: &str) -> Result<DatabaseCredentials> {
        let secret = self.get_secret_value(secret_id, region)?;
        let credentials = serde_json::from_str(&secret).map_err(|source| {
            PipelineError::InvalidSecret {
                secret_id: secret_id.to_string(),
                source,
            }
        })?;
        Ok(credentials)
    }
}

/// Secrets kept on disk as `<root>/<region>/<secret_id>.json`
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSecretStore { root: root.into() }
    }
}

impl SecretStore for FileSecretStore {
    fn get_secret_value(&self, secret_id: &str, region: &str) -> Result<String> {
        let path = self.root.join(region).join(format!("{}.json", secret_id));
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read secret {} in {}: {}", secret_id, region, path.display()))
    }
}
