//! Remaining admission capacity of coordinators and meshes
//!
//! Every count scans the roster and stops the moment capacity hits zero,
//! so the result never goes below zero. Mesh seats are counted by identity
//! alone: jamming, stealth, shutdown and range suppress a member's links
//! for now but never free its seat.

use crate::core::config::NetworkConfig;
use crate::core::types::NodeId;
use crate::network::capability::{active_kind, installed_kind, is_coordinator_capable};
use crate::network::identity::identity_for_kind;
use crate::network::master::{peek_master, resolve, MasterResolution};
use crate::network::node::{NetworkId, NetworkKind, Node};
use crate::network::oracles::{AllianceOracle, EquipmentOracle, RosterDirectory};

/// Which subordinates a pool counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    /// Every subordinate (single-link coordinator)
    All,
    /// Coordinator-capable subordinates (command slot)
    Command,
    /// Plain subordinates (lance slot of a dual-link coordinator)
    Plain,
}

/// Decrement `ceiling` once per match, stopping at zero
fn count_down(ceiling: u32, matches: impl Iterator<Item = bool>) -> u32 {
    let mut free = ceiling;
    if free == 0 {
        return 0;
    }
    for matched in matches {
        if matched {
            free -= 1;
            if free == 0 {
                return 0;
            }
        }
    }
    free
}

/// The node, if it currently resolves as a coordinator
fn live_coordinator<'a, R, S>(roster: &'a R, space: &S, id: NodeId) -> Option<&'a Node>
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let node = roster.get(id)?;
    if !node.is_own_master() {
        return None;
    }
    match resolve(roster, space, node) {
        MasterResolution::Linked(master) if master == id => Some(node),
        _ => None,
    }
}

fn free_in_pool<R, S>(roster: &R, space: &S, id: NodeId, ceiling: u32, pool: Pool) -> u32
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let subordinates = roster.all_nodes().map(|other| {
        if other.id == id || peek_master(roster, space, other.id) != Some(id) {
            return false;
        }
        match pool {
            Pool::All => true,
            Pool::Command => is_coordinator_capable(space, other.id),
            Pool::Plain => !is_coordinator_capable(space, other.id),
        }
    });
    count_down(ceiling, subordinates)
}

/// Free slots of a coordinator's primary pool
///
/// Dual-link coordinators: command slots left for coordinator-capable
/// subordinates. Single-link coordinators: lance slots left for any
/// subordinate. Anything else has no slots.
pub fn free_coordinator_slots<R, S>(roster: &R, space: &S, config: &NetworkConfig, id: NodeId) -> u32
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let Some(node) = live_coordinator(roster, space, id) else {
        return 0;
    };
    if node.has_dual_link_slot {
        free_in_pool(roster, space, id, config.command_ceiling, Pool::Command)
    } else {
        free_in_pool(roster, space, id, config.lance_ceiling, Pool::All)
    }
}

/// Free lance slots (plain subordinates)
///
/// For a dual-link coordinator this pool is separate from the command
/// slots; for a single-link coordinator it is the same pool.
pub fn free_lance_slots<R, S>(roster: &R, space: &S, config: &NetworkConfig, id: NodeId) -> u32
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let Some(node) = live_coordinator(roster, space, id) else {
        return 0;
    };
    let pool = if node.has_dual_link_slot {
        Pool::Plain
    } else {
        Pool::All
    };
    free_in_pool(roster, space, id, config.lance_ceiling, pool)
}

/// Admission ceiling of a mesh kind
pub fn mesh_ceiling(config: &NetworkConfig, kind: NetworkKind) -> u32 {
    match kind {
        NetworkKind::Information | NetworkKind::Naval => config.large_mesh_ceiling,
        NetworkKind::Reconfigurable => config.small_mesh_ceiling,
        NetworkKind::Hierarchical => 0,
    }
}

/// Does `other` take a seat on the mesh `identity`, as seen from `id`?
///
/// With `include_pending`, a unit queued to move onto the mesh counts too.
fn holds_seat<S>(space: &S, id: NodeId, other: &Node, identity: NetworkId, include_pending: bool) -> bool
where
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let kind = identity.kind();
    if other.id == id || space.is_enemy(id, other.id) || installed_kind(space, other.id) != Some(kind) {
        return false;
    }
    identity_for_kind(other, kind) == identity
        || (include_pending && other.pending_network_identity == Some(identity))
}

/// Free slots on the mesh a node currently belongs to
///
/// Units queued to join at the next round already hold their seat.
pub fn free_mesh_slots<R, S>(roster: &R, space: &S, config: &NetworkConfig, id: NodeId) -> u32
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let Some(kind) = active_kind(space, id).filter(NetworkKind::is_mesh) else {
        return 0;
    };
    let Some(node) = roster.get(id) else {
        return 0;
    };
    let identity = identity_for_kind(node, kind);
    let seats = roster
        .all_nodes()
        .map(|other| holds_seat(space, id, other, identity, true));
    count_down(mesh_ceiling(config, kind), seats)
}

/// Units other than `id` already seated on `identity` (queued moves excluded)
pub fn mesh_headcount<R, S>(roster: &R, space: &S, id: NodeId, identity: NetworkId) -> u32
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    roster
        .all_nodes()
        .filter(|other| holds_seat(space, id, other, identity, false))
        .count() as u32
}
