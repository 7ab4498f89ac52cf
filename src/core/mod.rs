pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, NetworkConfig};
pub use error::{C3Error, Result};
pub use types::{HexCoord, NodeId, Round, TeamId};
