//! C3 network topology engine
//!
//! Units share sensor and targeting data over one of two topologies:
//! - a hierarchy of coordinators and subordinates, at most two levels deep
//! - a flat mesh of peers sharing one identity token, size-bounded
//!
//! Links are stored as keys and re-validated lazily on read. Jamming,
//! stealth and shutdown suppress a link's evaluation without deleting it.

pub mod capability;
pub mod capacity;
pub mod connectivity;
pub mod constants;
pub mod engine;
pub mod identity;
pub mod master;
pub mod node;
pub mod oracles;
pub mod reconfiguration;
pub mod roster;
pub mod sandbox;

// Re-exports for convenient access
pub use capability::{active_kind, classify, installed_kind, is_coordinator_capable, offers};
pub use capacity::{
    free_coordinator_slots, free_lance_slots, free_mesh_slots, mesh_ceiling, mesh_headcount,
};
pub use connectivity::{same_network, top_of_hierarchy, HierarchyTop};
pub use constants::*;
pub use engine::Network;
pub use identity::{effective_identity, seeded_identity};
pub use master::{peek_master, resolve, resolve_master, set_master, MasterResolution, SeverReason};
pub use node::{CapabilitySet, NetworkId, NetworkKind, Node};
pub use oracles::{
    AllianceOracle, Battlespace, EquipmentOracle, JammingOracle, RangeOracle, RosterDirectory,
};
pub use reconfiguration::{on_round_start, request_reconfiguration};
pub use roster::Roster;
pub use sandbox::{JamZone, Sandbox, UnitProfile};
