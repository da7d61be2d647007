use home::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use crate::{
    constant::{CONFIG_DIR, CONFIG_FILE, STORE_FILE},
    BlogResult,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Socket address used to serve. Should be <ip>:<port>
    /// Example: 127.0.0.1:8080
    pub socket: SocketAddr,
    /// Path to the JSON document holding the post collection.
    pub store: PathBuf,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            socket: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
            store: base_dir().join(STORE_FILE),
        }
    }
}

impl BlogConfig {
    /// Default location of the config document: `~/.masterblog/config.toml`.
    pub fn default_path() -> PathBuf {
        base_dir().join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> BlogResult<Self> {
        let buf = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&buf)?)
    }

    /// Write the config to path, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> BlogResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.try_exists()? {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn base_dir() -> PathBuf {
    let home_dir = home_dir().unwrap_or_else(|| {
        std::env::current_dir().expect("Unable to get current working directory")
    });
    home_dir.join(CONFIG_DIR)
}
