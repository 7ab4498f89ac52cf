//! Network configuration with documented constants
//!
//! All capacity and range numbers are collected here. They are rules
//! constants, so the defaults should only change to model a variant ruleset.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{C3Error, Result};
use crate::network::constants::{
    COMMAND_CEILING, LANCE_CEILING, LARGE_MESH_CEILING, NAVAL_LINK_RANGE, PARALLEL_THRESHOLD,
    SMALL_MESH_CEILING,
};

/// Tunables for the C3 topology engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    // === HIERARCHICAL ===
    /// Subordinates a coordinator admits through its lance slot
    ///
    /// A single-link coordinator counts every subordinate against this pool.
    /// A dual-link coordinator counts only plain subordinates here.
    pub lance_ceiling: u32,

    /// Coordinator-capable subordinates a dual-link coordinator admits
    /// through its command slot
    pub command_ceiling: u32,

    // === MESH ===
    /// Other members allowed on an Information or Naval mesh
    pub large_mesh_ceiling: u32,

    /// Other members allowed on a Reconfigurable mesh
    pub small_mesh_ceiling: u32,

    /// Maximum distance (hexes) between two Naval mesh endpoints
    pub naval_link_range: u32,

    // === PARALLELIZATION ===
    /// Minimum roster size before pairwise evaluation goes parallel
    ///
    /// Below this, rayon's scheduling overhead exceeds the work per pair.
    pub parallel_threshold: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            lance_ceiling: LANCE_CEILING,
            command_ceiling: COMMAND_CEILING,
            large_mesh_ceiling: LARGE_MESH_CEILING,
            small_mesh_ceiling: SMALL_MESH_CEILING,
            naval_link_range: NAVAL_LINK_RANGE,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

impl NetworkConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.lance_ceiling == 0 || self.command_ceiling == 0 {
            return Err(C3Error::InvalidConfig(
                "hierarchical ceilings must be positive".into(),
            ));
        }

        if self.large_mesh_ceiling == 0 || self.small_mesh_ceiling == 0 {
            return Err(C3Error::InvalidConfig("mesh ceilings must be positive".into()));
        }

        if self.small_mesh_ceiling > self.large_mesh_ceiling {
            return Err(C3Error::InvalidConfig(format!(
                "small_mesh_ceiling ({}) should be <= large_mesh_ceiling ({})",
                self.small_mesh_ceiling, self.large_mesh_ceiling
            )));
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NetworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load network config from a TOML file
///
/// The shipped default lives at `data/network.toml`.
pub fn load_config(path: impl AsRef<Path>) -> Result<NetworkConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    NetworkConfig::from_toml_str(&contents)
}
