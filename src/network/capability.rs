//! Which network variants a unit currently offers
//!
//! Recomputed on every call: equipment can be destroyed or a unit shut down
//! at any moment, so the snapshot is never cached.

use crate::core::types::NodeId;
use crate::network::node::{CapabilitySet, NetworkKind};
use crate::network::oracles::EquipmentOracle;

/// Current capability snapshot of a unit
///
/// A shut-down or off-board unit offers nothing, whatever is installed.
pub fn classify<E: EquipmentOracle + ?Sized>(equipment: &E, node: NodeId) -> CapabilitySet {
    if equipment.is_shut_down(node) || equipment.is_off_board(node) {
        return CapabilitySet::empty();
    }
    equipment.capability_flags(node)
}

/// The kind that defines the unit's network identity
///
/// Hierarchical > Information > Reconfigurable > Naval. Lower-precedence
/// gear stays dormant.
pub fn active_kind<E: EquipmentOracle + ?Sized>(equipment: &E, node: NodeId) -> Option<NetworkKind> {
    classify(equipment, node).kinds().next()
}

/// Top-precedence kind of the installed gear, even while shut down or off board
pub fn installed_kind<E: EquipmentOracle + ?Sized>(equipment: &E, node: NodeId) -> Option<NetworkKind> {
    equipment.capability_flags(node).kinds().next()
}

pub fn offers<E: EquipmentOracle + ?Sized>(equipment: &E, node: NodeId, kind: NetworkKind) -> bool {
    classify(equipment, node).contains(kind)
}

/// Can this unit act as a coordinator?
pub fn is_coordinator_capable<E: EquipmentOracle + ?Sized>(equipment: &E, node: NodeId) -> bool {
    classify(equipment, node).has_command_unit()
}
