//! Configuration for bridge instances

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_OPTIMISTIC_SECONDS, PROCESS_BUDGET, RESERVE_BUDGET};

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Domain identifier of this deployment
    pub local_domain: u32,

    /// Optimistic delay window before a submitted checkpoint is
    /// trusted (seconds)
    pub optimistic_seconds: u64,

    /// Resource ceiling forwarded to recipient handlers
    pub process_budget: u64,

    /// Working budget reserved for replica bookkeeping
    pub reserve_budget: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_domain: 0,
            optimistic_seconds: DEFAULT_OPTIMISTIC_SECONDS,
            process_budget: PROCESS_BUDGET,
            reserve_budget: RESERVE_BUDGET,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults with environment variable overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(domain) = std::env::var("BRIDGE_LOCAL_DOMAIN") {
            config.local_domain = domain
                .parse()
                .map_err(|e| crate::Error::Config(format!("BRIDGE_LOCAL_DOMAIN: {}", e)))?;
        }

        if let Ok(seconds) = std::env::var("BRIDGE_OPTIMISTIC_SECONDS") {
            config.optimistic_seconds = seconds
                .parse()
                .map_err(|e| crate::Error::Config(format!("BRIDGE_OPTIMISTIC_SECONDS: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.optimistic_seconds == 0 {
            return Err(crate::Error::Config(
                "optimistic_seconds must be nonzero".into(),
            ));
        }
        if self.reserve_budget >= self.process_budget {
            return Err(crate::Error::Config(format!(
                "reserve_budget {} must be below process_budget {}",
                self.reserve_budget, self.process_budget
            )));
        }
        Ok(())
    }
}
