//! Deferred identity changes of the reconfigurable mesh
//!
//! A request only fills the pending slot. The swap happens at the next
//! round start, so everything evaluated during the current round still sees
//! the old network.

use crate::core::config::NetworkConfig;
use crate::core::types::NodeId;
use crate::network::capability::offers;
use crate::network::capacity::{mesh_ceiling, mesh_headcount};
use crate::network::identity::seeded_identity;
use crate::network::node::{NetworkId, NetworkKind};
use crate::network::oracles::{AllianceOracle, EquipmentOracle, RosterDirectory};
use crate::network::roster::Roster;

/// Queue a new identity for the next round
///
/// Ignored unless the unit offers the reconfigurable mesh and the identity
/// belongs to that kind.
pub fn request_reconfiguration<E: EquipmentOracle + ?Sized>(
    roster: &mut Roster,
    equipment: &E,
    id: NodeId,
    new_identity: NetworkId,
) -> bool {
    if new_identity.kind() != NetworkKind::Reconfigurable
        || !offers(equipment, id, NetworkKind::Reconfigurable)
    {
        return false;
    }
    let Some(node) = roster.get_mut(id) else {
        return false;
    };
    node.pending_network_identity = Some(new_identity);
    tracing::debug!("{} will move to {} next round", id, new_identity);
    true
}

/// Apply a pending identity at the round boundary
///
/// Returns whether a pending identity was applied. A move onto a mesh that
/// has filled up in the meantime is dropped. A unit that never had an
/// identity gets one seeded from its own id.
pub fn on_round_start<S>(roster: &mut Roster, space: &S, config: &NetworkConfig, id: NodeId) -> bool
where
    S: AllianceOracle + EquipmentOracle + ?Sized,
{
    if !offers(space, id, NetworkKind::Reconfigurable) {
        return false;
    }
    let Some(pending) = roster.get(id).map(|node| node.pending_network_identity) else {
        return false;
    };
    let full = pending.is_some_and(|target| {
        mesh_headcount(roster, space, id, target) > mesh_ceiling(config, target.kind())
    });
    let Some(node) = roster.get_mut(id) else {
        return false;
    };

    match node.pending_network_identity.take() {
        Some(pending) if full => {
            tracing::debug!("Dropped move of {} onto full network {}", id, pending);
            if node.network_identity.is_none() {
                node.network_identity = Some(seeded_identity(NetworkKind::Reconfigurable, id));
            }
            false
        }
        Some(pending) => {
            node.network_identity = Some(pending);
            tracing::info!("{} reconfigured onto {}", id, pending);
            true
        }
        None => {
            if node.network_identity.is_none() {
                node.network_identity = Some(seeded_identity(NetworkKind::Reconfigurable, id));
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TeamId;
    use crate::network::node::Node;
    use crate::network::oracles::RosterDirectory;
    use crate::network::sandbox::{Sandbox, UnitProfile};

    fn nova(roster: &mut Roster, space: &mut Sandbox) -> NodeId {
        let id = NodeId::new();
        roster.insert(Node::new(id));
        space.add_unit(id, UnitProfile::new(TeamId(1)).with(NetworkKind::Reconfigurable));
        id
    }

    #[test]
    fn test_request_is_deferred() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let config = NetworkConfig::default();
        let a = nova(&mut roster, &mut space);
        let b = nova(&mut roster, &mut space);
        let target = seeded_identity(NetworkKind::Reconfigurable, b);

        assert!(request_reconfiguration(&mut roster, &space, a, target));
        let node = roster.get(a).unwrap();
        assert_eq!(node.network_identity, None);
        assert_eq!(node.pending_network_identity, Some(target));

        assert!(on_round_start(&mut roster, &space, &config, a));
        let node = roster.get(a).unwrap();
        assert_eq!(node.network_identity, Some(target));
        assert_eq!(node.pending_network_identity, None);
    }

    #[test]
    fn test_pending_consumed_once() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let config = NetworkConfig::default();
        let a = nova(&mut roster, &mut space);
        let target = seeded_identity(NetworkKind::Reconfigurable, NodeId::new());
        request_reconfiguration(&mut roster, &space, a, target);

        assert!(on_round_start(&mut roster, &space, &config, a));
        assert!(!on_round_start(&mut roster, &space, &config, a));
        assert_eq!(roster.get(a).unwrap().network_identity, Some(target));
    }

    #[test]
    fn test_round_start_seeds_missing_identity() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let config = NetworkConfig::default();
        let a = nova(&mut roster, &mut space);

        assert!(!on_round_start(&mut roster, &space, &config, a));
        assert_eq!(
            roster.get(a).unwrap().network_identity,
            Some(seeded_identity(NetworkKind::Reconfigurable, a))
        );
    }

    #[test]
    fn test_move_onto_full_network_is_dropped() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let config = NetworkConfig::default();
        let hub = nova(&mut roster, &mut space);
        let target = seeded_identity(NetworkKind::Reconfigurable, hub);
        let movers: Vec<NodeId> = (0..4).map(|_| nova(&mut roster, &mut space)).collect();
        for id in &movers {
            assert!(request_reconfiguration(&mut roster, &space, *id, target));
        }

        let applied = movers
            .iter()
            .filter(|id| on_round_start(&mut roster, &space, &config, **id))
            .count();
        assert_eq!(applied, 2);
        assert_eq!(mesh_headcount(&roster, &space, hub, target), 2);
        for id in &movers {
            assert_eq!(roster.get(*id).unwrap().pending_network_identity, None);
        }
    }

    #[test]
    fn test_request_rejected_without_gear() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let config = NetworkConfig::default();
        let id = NodeId::new();
        roster.insert(Node::new(id));
        space.add_unit(id, UnitProfile::new(TeamId(1)).with(NetworkKind::Information));

        let target = seeded_identity(NetworkKind::Reconfigurable, NodeId::new());
        assert!(!request_reconfiguration(&mut roster, &space, id, target));
        assert!(!on_round_start(&mut roster, &space, &config, id));
        assert_eq!(roster.get(id).unwrap().pending_network_identity, None);
    }

    #[test]
    fn test_request_rejects_foreign_kind() {
        let (mut roster, mut space) = (Roster::new(), Sandbox::new());
        let a = nova(&mut roster, &mut space);
        let wrong = seeded_identity(NetworkKind::Information, NodeId::new());

        assert!(!request_reconfiguration(&mut roster, &space, a, wrong));
    }
}
