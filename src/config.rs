use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("mortar")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MortarConfig {
    pub data_dir: PathBuf,
    /// Tenant used when the identity provider does not return one.
    pub organization_id: String,
    /// Base URL of the hosted identity provider.
    pub auth_url: String,
    /// Endpoint of the serverless AI proxy function.
    pub assistant_url: String,
    pub debug_logging: bool,
}

impl Default for MortarConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            organization_id: String::new(),
            auth_url: String::new(),
            assistant_url: String::new(),
            debug_logging: false,
        }
    }
}

impl MortarConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mortar")
            .join("config.json")
    }

    /// Load the config file, falling back to defaults when missing or unreadable.
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::config_path()) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, json)
    }

    pub fn orgs_dir(&self) -> PathBuf {
        self.data_dir.join("orgs")
    }

    /// Directory holding one organization's collections. Tenant isolation is
    /// a directory boundary: nothing outside this path is ever read for it.
    pub fn org_dir(&self, org_id: &str) -> PathBuf {
        self.orgs_dir().join(org_id)
    }

    /// Ensure the data directory tree exists.
    pub fn ensure_files(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.orgs_dir())?;
        Ok(())
    }
}
