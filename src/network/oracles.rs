//! Collaborators the topology engine consumes
//!
//! The engine never owns unit state beyond `Node`. Everything else (who is
//! an enemy, what equipment works, where jamming reaches) is asked of these
//! traits on every query, so answers are never stale.

use crate::core::types::NodeId;
use crate::network::node::{CapabilitySet, Node};

/// Directory of every node in the match
pub trait RosterDirectory {
    fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_;

    fn get(&self, id: NodeId) -> Option<&Node>;
}

pub trait AllianceOracle {
    fn is_enemy(&self, a: NodeId, b: NodeId) -> bool;
}

pub trait EquipmentOracle {
    /// Installed, operable network gear (ignores shutdown/off-board)
    fn capability_flags(&self, node: NodeId) -> CapabilitySet;

    fn is_shut_down(&self, node: NodeId) -> bool;

    fn is_off_board(&self, node: NodeId) -> bool;

    /// Stealth countermeasure actively engaged
    fn is_stealth_active(&self, node: NodeId) -> bool;

    /// Boosted hierarchical link (jam resistant)
    fn is_boosted(&self, node: NodeId) -> bool;
}

pub trait JammingOracle {
    /// Is `node` suppressed as seen from `observer`'s position?
    ///
    /// Callers evaluate both directions for a link.
    fn is_suppressed(&self, node: NodeId, observer: NodeId) -> bool;
}

pub trait RangeOracle {
    /// Distance in movement units
    fn distance(&self, a: NodeId, b: NodeId) -> u32;

    /// Is the battle being fought where the Naval mesh works at all?
    fn in_required_battle_context(&self) -> bool;
}

/// Every oracle the engine needs, in one bound
pub trait Battlespace: AllianceOracle + EquipmentOracle + JammingOracle + RangeOracle + Sync {}

impl<T> Battlespace for T where
    T: AllianceOracle + EquipmentOracle + JammingOracle + RangeOracle + Sync
{
}

/// Is the link between `a` and `b` suppressed in either direction?
pub fn link_suppressed<B: Battlespace + ?Sized>(space: &B, a: NodeId, b: NodeId) -> bool {
    space.is_suppressed(a, b) || space.is_suppressed(b, a)
}
