//! Network identity assignment
//!
//! Identities are cached on the node and only rewritten on explicit
//! mutation (role change, mesh join, reconfiguration, reset). A cached
//! identity whose kind no longer matches the unit's active kind is ignored
//! in favour of a fresh one seeded from the unit's own id.

use crate::core::types::NodeId;
use crate::network::capability::active_kind;
use crate::network::node::{NetworkId, NetworkKind, Node};
use crate::network::oracles::EquipmentOracle;
use crate::network::roster::Roster;

/// Identity of a brand-new network founded by `node`
pub fn seeded_identity(kind: NetworkKind, node: NodeId) -> NetworkId {
    NetworkId::seeded(kind, node)
}

/// Identity the node currently presents, without writing the cache
///
/// `None` when the unit offers no network at all.
pub fn effective_identity<E: EquipmentOracle + ?Sized>(equipment: &E, node: &Node) -> Option<NetworkId> {
    let kind = active_kind(equipment, node.id)?;
    Some(identity_for_kind(node, kind))
}

/// Identity for a known active kind
pub fn identity_for_kind(node: &Node, kind: NetworkKind) -> NetworkId {
    match node.network_identity {
        Some(cached) if cached.kind() == kind => cached,
        _ => seeded_identity(kind, node.id),
    }
}

/// Lazily compute and cache a node's identity
pub fn ensure_identity<E: EquipmentOracle + ?Sized>(
    roster: &mut Roster,
    equipment: &E,
    id: NodeId,
) -> Option<NetworkId> {
    let node = roster.get_mut(id)?;
    let identity = effective_identity(equipment, node)?;
    if node.network_identity != Some(identity) {
        node.network_identity = Some(identity);
    }
    Some(identity)
}

/// Commit an identity to one node and to everything linked directly to it
///
/// One level only: a depth-2 hierarchy has no deeper dependents.
pub fn propagate_identity(roster: &mut Roster, id: NodeId, identity: NetworkId) {
    if let Some(node) = roster.get_mut(id) {
        node.network_identity = Some(identity);
    }
    for dependent in roster.linked_to(id) {
        if let Some(node) = roster.get_mut(dependent) {
            node.network_identity = Some(identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TeamId;
    use crate::network::oracles::RosterDirectory;
    use crate::network::sandbox::{Sandbox, UnitProfile};

    #[test]
    fn test_uncached_identity_is_seeded_from_own_id() {
        let mut space = Sandbox::new();
        let node = Node::new(NodeId::new());
        space.add_unit(node.id, UnitProfile::new(TeamId(1)).with(NetworkKind::Information));

        let identity = effective_identity(&space, &node).unwrap();
        assert_eq!(identity, seeded_identity(NetworkKind::Information, node.id));
    }

    #[test]
    fn test_no_capability_no_identity() {
        let mut space = Sandbox::new();
        let node = Node::new(NodeId::new());
        space.add_unit(node.id, UnitProfile::new(TeamId(1)));

        assert_eq!(effective_identity(&space, &node), None);
    }

    #[test]
    fn test_stale_kind_is_ignored() {
        let mut space = Sandbox::new();
        let mut node = Node::new(NodeId::new());
        let other = NodeId::new();
        node.network_identity = Some(seeded_identity(NetworkKind::Hierarchical, other));
        space.add_unit(
            node.id,
            UnitProfile::new(TeamId(1))
                .with(NetworkKind::Hierarchical)
                .with(NetworkKind::Naval),
        );
        assert_eq!(
            effective_identity(&space, &node),
            Some(seeded_identity(NetworkKind::Hierarchical, other))
        );

        // Hierarchical gear destroyed: the naval mesh wakes up with its own identity
        space.destroy_equipment(node.id, NetworkKind::Hierarchical);
        assert_eq!(
            effective_identity(&space, &node),
            Some(seeded_identity(NetworkKind::Naval, node.id))
        );
    }

    #[test]
    fn test_ensure_identity_caches() {
        let mut space = Sandbox::new();
        let mut roster = Roster::new();
        let id = NodeId::new();
        roster.insert(Node::new(id));
        space.add_unit(id, UnitProfile::new(TeamId(1)).with(NetworkKind::Reconfigurable));

        let identity = ensure_identity(&mut roster, &space, id);
        assert_eq!(roster.get(id).unwrap().network_identity, identity);
    }

    #[test]
    fn test_propagation_is_one_level() {
        let mut roster = Roster::new();
        let (top, mid, low) = (NodeId::new(), NodeId::new(), NodeId::new());

        let mut top_node = Node::new(top);
        top_node.master_link = Some(top);
        roster.insert(top_node);

        let mut mid_node = Node::new(mid);
        mid_node.master_link = Some(top);
        roster.insert(mid_node);

        let mut low_node = Node::new(low);
        low_node.master_link = Some(mid);
        roster.insert(low_node);

        let identity = seeded_identity(NetworkKind::Hierarchical, top);
        propagate_identity(&mut roster, top, identity);

        assert_eq!(roster.get(top).unwrap().network_identity, Some(identity));
        assert_eq!(roster.get(mid).unwrap().network_identity, Some(identity));
        assert_eq!(roster.get(low).unwrap().network_identity, None);
    }
}
