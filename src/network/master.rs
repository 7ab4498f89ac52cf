//! Master links of the hierarchical network
//!
//! A link is only ever a key into the roster. Nothing is pushed to
//! dependents when a master dies, changes sides or loses gear: every read
//! re-validates the link, and an invalid link is cleared for good the next
//! time a writer resolves it.

use crate::core::types::NodeId;
use crate::network::capability::{is_coordinator_capable, offers};
use crate::network::constants::MAX_LINK_CHAIN;
use crate::network::identity::{identity_for_kind, propagate_identity, seeded_identity};
use crate::network::node::{NetworkKind, Node};
use crate::network::oracles::{AllianceOracle, EquipmentOracle, RosterDirectory};
use crate::network::roster::Roster;

/// Why a stored link is no longer valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverReason {
    /// Master left the roster (destroyed)
    MasterMissing,
    /// Master is on the other side
    MasterIsEnemy,
    /// Master no longer offers the hierarchical network
    MasterLostCapability,
    /// Coordinator-capable subordinate whose coordinator lost the dual-link slot
    CommandSlotLost,
    /// Master itself holds a standing link to another node (would exceed depth 2)
    ChainTooDeep,
}

/// Outcome of validating one master link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterResolution {
    /// No link stored
    Independent,
    /// Link is valid
    Linked(NodeId),
    /// Master is shut down: no master for now, link kept
    Suspended(NodeId),
    /// Link is invalid and must be cleared
    Severed(SeverReason),
}

impl MasterResolution {
    /// The master as seen by this read
    pub fn master(&self) -> Option<NodeId> {
        match self {
            MasterResolution::Linked(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_severed(&self) -> bool {
        matches!(self, MasterResolution::Severed(_))
    }
}

/// Validate a node's master link without writing anything
///
/// Safe to call from any number of readers at once. The answer never
/// depends on which other links have already been healed: a master whose
/// own link is severed counts as independent, exactly as it will once that
/// link is cleared. Every node on a raw link cycle is severed.
pub fn resolve<R, S>(roster: &R, space: &S, node: &Node) -> MasterResolution
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    resolve_within(roster, space, node, MAX_LINK_CHAIN)
}

fn resolve_within<R, S>(roster: &R, space: &S, node: &Node, budget: usize) -> MasterResolution
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let Some(link) = node.master_link else {
        return MasterResolution::Independent;
    };
    let Some(master) = roster.get(link) else {
        return MasterResolution::Severed(SeverReason::MasterMissing);
    };
    if let Some(outcome) = check_hop(space, node, master) {
        return outcome;
    }
    if master.id != node.id
        && (on_link_cycle(roster, space, node) || answers_elsewhere(roster, space, master, budget))
    {
        return MasterResolution::Severed(SeverReason::ChainTooDeep);
    }

    MasterResolution::Linked(master.id)
}

/// Outcome of the hop `node -> master` when the hop alone decides it
fn check_hop<S>(space: &S, node: &Node, master: &Node) -> Option<MasterResolution>
where
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let is_self = master.id == node.id;

    if !is_self && space.is_enemy(node.id, master.id) {
        return Some(MasterResolution::Severed(SeverReason::MasterIsEnemy));
    }
    if space.is_shut_down(master.id) {
        return Some(MasterResolution::Suspended(master.id));
    }
    if !offers(space, master.id, NetworkKind::Hierarchical) {
        return Some(MasterResolution::Severed(SeverReason::MasterLostCapability));
    }
    if !is_self
        && master.is_own_master()
        && !master.has_dual_link_slot
        && is_coordinator_capable(space, node.id)
    {
        return Some(MasterResolution::Severed(SeverReason::CommandSlotLost));
    }
    None
}

/// Does `master` hold a standing link to some other node?
///
/// Past the chain budget the raw link is trusted.
fn answers_elsewhere<R, S>(roster: &R, space: &S, master: &Node, budget: usize) -> bool
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    if !master.master_link.is_some_and(|up| up != master.id) {
        return false;
    }
    if budget == 0 {
        return true;
    }
    matches!(
        resolve_within(roster, space, master, budget - 1),
        MasterResolution::Linked(_) | MasterResolution::Suspended(_)
    )
}

/// Do raw links lead from `node` back to itself?
///
/// Only hops that pass `check_hop` count, and the walk gives up after
/// `MAX_LINK_CHAIN` hops.
fn on_link_cycle<R, S>(roster: &R, space: &S, node: &Node) -> bool
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let mut current = node;
    for _ in 0..MAX_LINK_CHAIN {
        let Some(up) = current.master_link.filter(|up| *up != current.id) else {
            return false;
        };
        let Some(master) = roster.get(up) else {
            return false;
        };
        if check_hop(space, current, master).is_some() {
            return false;
        }
        if up == node.id {
            return true;
        }
        current = master;
    }
    false
}

/// Every other node on the raw link cycle through `id`
fn cycle_members(roster: &Roster, id: NodeId) -> Vec<NodeId> {
    std::iter::successors(Some(id), |current| {
        roster.get(*current).and_then(|node| node.master_link)
    })
    .skip(1)
    .take_while(|member| *member != id)
    .take(MAX_LINK_CHAIN)
    .collect()
}

fn clear_link(roster: &mut Roster, id: NodeId, reason: SeverReason) {
    if let Some(node) = roster.get_mut(id) {
        if let Some(old) = node.master_link.take() {
            node.network_identity = Some(seeded_identity(NetworkKind::Hierarchical, id));
            tracing::debug!("Cleared master link {} -> {} ({:?})", id, old, reason);
        }
    }
}

/// Pure read of a node's current master
pub fn peek_master<R, S>(roster: &R, space: &S, id: NodeId) -> Option<NodeId>
where
    R: RosterDirectory,
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    roster
        .get(id)
        .and_then(|node| resolve(roster, space, node).master())
}

/// Resolve a node's master, clearing the link if it turned out invalid
///
/// Clearing is permanent and idempotent: a second call finds no link and
/// writes nothing. The healed node becomes independent and founds its own
/// hierarchical identity. A node on a raw link cycle takes the rest of the
/// cycle down with it.
pub fn resolve_master<S>(roster: &mut Roster, space: &S, id: NodeId) -> Option<NodeId>
where
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let resolution = {
        let node = roster.get(id)?;
        resolve(&*roster, space, node)
    };

    if let MasterResolution::Severed(reason) = resolution {
        // A cycle is severed as a whole
        let on_cycle = reason == SeverReason::ChainTooDeep
            && roster
                .get(id)
                .is_some_and(|node| on_link_cycle(&*roster, space, node));
        let others = if on_cycle {
            cycle_members(roster, id)
        } else {
            Vec::new()
        };
        clear_link(roster, id, reason);
        for other in others {
            clear_link(roster, other, reason);
        }
    }

    resolution.master()
}

/// Assign (or clear) a node's master
///
/// Enemy masters are ignored. When `cascade_on_role_change` is set and the
/// node gains or loses coordinator status, everything linked to it is
/// detached first. Returns whether the write happened.
pub fn set_master<S>(
    roster: &mut Roster,
    space: &S,
    id: NodeId,
    new_master: Option<NodeId>,
    cascade_on_role_change: bool,
) -> bool
where
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    let Some(node) = roster.get(id) else {
        return false;
    };
    if let Some(master) = new_master {
        if master != id && space.is_enemy(id, master) {
            tracing::debug!("Ignored enemy master {} for {}", master, id);
            return false;
        }
    }

    let was_coordinator = node.is_own_master();
    let becomes_coordinator = new_master == Some(id);

    if cascade_on_role_change && was_coordinator != becomes_coordinator {
        let dependents = roster.linked_to(id);
        if !dependents.is_empty() {
            tracing::debug!("Role change of {} detaches {} dependents", id, dependents.len());
        }
        for dependent in dependents {
            set_master(roster, space, dependent, None, true);
        }
    }

    if let Some(node) = roster.get_mut(id) {
        node.master_link = new_master;
    }

    let identity = match new_master {
        Some(master) if master != id => roster
            .get(master)
            .map(|m| identity_for_kind(m, NetworkKind::Hierarchical))
            .unwrap_or_else(|| seeded_identity(NetworkKind::Hierarchical, id)),
        _ => seeded_identity(NetworkKind::Hierarchical, id),
    };
    propagate_identity(roster, id, identity);

    true
}
