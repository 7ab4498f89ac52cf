//! Are two units on the same operative network right now?
//!
//! Jamming, stealth and shutdown only affect this evaluation. They never
//! touch stored links or identities.

use serde::{Deserialize, Serialize};

use crate::core::config::NetworkConfig;
use crate::core::types::NodeId;
use crate::network::capability::active_kind;
use crate::network::constants::MAX_HIERARCHY_DEPTH;
use crate::network::identity::identity_for_kind;
use crate::network::master::peek_master;
use crate::network::node::NetworkKind;
use crate::network::oracles::{link_suppressed, Battlespace, RosterDirectory};

/// Where a hierarchy walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyTop {
    pub top: NodeId,
    /// The walk was cut short by a jammed hop
    pub jammed: bool,
}

/// Topmost reachable ancestor of a hierarchical node
///
/// Follows resolved master links for at most `MAX_HIERARCHY_DEPTH` hops.
/// A jammed hop stops the walk unless either end of it is boosted.
pub fn top_of_hierarchy<R, S>(roster: &R, space: &S, id: NodeId) -> HierarchyTop
where
    R: RosterDirectory,
    S: Battlespace + ?Sized,
{
    let mut current = id;
    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(master) = peek_master(roster, space, current) else {
            break;
        };
        if master == current {
            break;
        }
        let boosted = space.is_boosted(current) || space.is_boosted(master);
        if link_suppressed(space, current, master) && !boosted {
            return HierarchyTop {
                top: current,
                jammed: true,
            };
        }
        current = master;
    }
    HierarchyTop {
        top: current,
        jammed: false,
    }
}

fn hierarchical_linked<R, S>(roster: &R, space: &S, a: NodeId, b: NodeId) -> bool
where
    R: RosterDirectory,
    S: Battlespace + ?Sized,
{
    let top_a = top_of_hierarchy(roster, space, a);
    let top_b = top_of_hierarchy(roster, space, b);
    top_a.top == top_b.top && !top_a.jammed && !top_b.jammed
}

fn mesh_linked<R, S>(
    roster: &R,
    space: &S,
    config: &NetworkConfig,
    kind: NetworkKind,
    a: NodeId,
    b: NodeId,
) -> bool
where
    R: RosterDirectory,
    S: Battlespace + ?Sized,
{
    let (Some(node_a), Some(node_b)) = (roster.get(a), roster.get(b)) else {
        return false;
    };
    if identity_for_kind(node_a, kind) != identity_for_kind(node_b, kind) {
        return false;
    }

    if kind.is_jam_susceptible() {
        !link_suppressed(space, a, b)
    } else {
        space.in_required_battle_context() && space.distance(a, b) <= config.naval_link_range
    }
}

/// Are `a` and `b` currently networked?
pub fn same_network<R, S>(roster: &R, space: &S, config: &NetworkConfig, a: NodeId, b: NodeId) -> bool
where
    R: RosterDirectory,
    S: Battlespace + ?Sized,
{
    if space.is_enemy(a, b) || space.is_shut_down(a) || space.is_shut_down(b) {
        return false;
    }
    if space.is_stealth_active(a) || space.is_stealth_active(b) {
        return false;
    }

    let Some(kind) = active_kind(space, a) else {
        return false;
    };
    if active_kind(space, b) != Some(kind) {
        return false;
    }

    match kind {
        NetworkKind::Hierarchical => hierarchical_linked(roster, space, a, b),
        _ => mesh_linked(roster, space, config, kind, a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{HexCoord, TeamId};
    use crate::network::node::{NetworkId, Node};
    use crate::network::roster::Roster;
    use crate::network::sandbox::{Sandbox, UnitProfile};

    struct Fixture {
        roster: Roster,
        space: Sandbox,
        config: NetworkConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                roster: Roster::new(),
                space: Sandbox::new(),
                config: NetworkConfig::default(),
            }
        }

        fn add(&mut self, profile: UnitProfile) -> NodeId {
            let id = NodeId::new();
            self.roster.insert(Node::new(id));
            self.space.add_unit(id, profile);
            id
        }

        fn link(&mut self, id: NodeId, master: NodeId) {
            self.roster.get_mut(id).unwrap().master_link = Some(master);
        }

        fn share(&mut self, ids: &[NodeId], identity: NetworkId) {
            for id in ids {
                self.roster.get_mut(*id).unwrap().network_identity = Some(identity);
            }
        }

        fn networked(&self, a: NodeId, b: NodeId) -> bool {
            same_network(&self.roster, &self.space, &self.config, a, b)
        }
    }

    fn c3(team: u32) -> UnitProfile {
        UnitProfile::new(TeamId(team)).with(NetworkKind::Hierarchical)
    }

    fn c3i(team: u32) -> UnitProfile {
        UnitProfile::new(TeamId(team)).with(NetworkKind::Information)
    }

    #[test]
    fn test_lance_members_are_networked() {
        let mut f = Fixture::new();
        let a = f.add(c3(1).with_command_unit());
        let b = f.add(c3(1));
        let c = f.add(c3(1));
        f.link(a, a);
        f.link(b, a);
        f.link(c, a);

        assert!(f.networked(a, b));
        assert!(f.networked(b, c));
        assert_eq!(top_of_hierarchy(&f.roster, &f.space, c).top, a);
    }

    #[test]
    fn test_unlinked_hierarchical_units_are_not_networked() {
        let mut f = Fixture::new();
        let a = f.add(c3(1));
        let b = f.add(c3(1));
        assert!(!f.networked(a, b));
    }

    #[test]
    fn test_independent_master_hosts_its_slaves() {
        let mut f = Fixture::new();
        let a = f.add(c3(1).with_command_unit());
        let b = f.add(c3(1));
        f.link(b, a);

        assert!(f.networked(a, b));
    }

    #[test]
    fn test_shut_down_and_stealth_break_links() {
        let mut f = Fixture::new();
        let a = f.add(c3(1).with_command_unit());
        let b = f.add(c3(1));
        f.link(a, a);
        f.link(b, a);

        f.space.set_stealth(b, true);
        assert!(!f.networked(a, b));
        f.space.set_stealth(b, false);

        f.space.set_shut_down(b, true);
        assert!(!f.networked(a, b));
        f.space.set_shut_down(b, false);

        assert!(f.networked(a, b));
    }

    #[test]
    fn test_jammed_hop_stops_walk() {
        let mut f = Fixture::new();
        let a = f.add(c3(1).with_command_unit());
        let b = f.add(c3(1));
        f.link(a, a);
        f.link(b, a);
        f.space.jam(b);

        let top = top_of_hierarchy(&f.roster, &f.space, b);
        assert_eq!(top, HierarchyTop { top: b, jammed: true });
        assert!(!f.networked(a, b));
    }

    #[test]
    fn test_boosted_link_ignores_jamming() {
        let mut f = Fixture::new();
        let a = f.add(c3(1).with_command_unit().boosted());
        let b = f.add(c3(1));
        f.link(a, a);
        f.link(b, a);
        f.space.jam(b);

        assert!(f.networked(a, b));
    }

    #[test]
    fn test_mesh_requires_equal_identity() {
        let mut f = Fixture::new();
        let a = f.add(c3i(1));
        let b = f.add(c3i(1));
        assert!(!f.networked(a, b));

        f.share(&[a, b], NetworkId::seeded(NetworkKind::Information, a));
        assert!(f.networked(a, b));
    }

    #[test]
    fn test_mesh_kinds_never_cross() {
        let mut f = Fixture::new();
        let a = f.add(c3i(1));
        let b = f.add(UnitProfile::new(TeamId(1)).with(NetworkKind::Reconfigurable));
        f.share(&[a, b], NetworkId::seeded(NetworkKind::Information, a));

        assert!(!f.networked(a, b));
    }

    #[test]
    fn test_jam_susceptible_mesh_is_suppressed() {
        let mut f = Fixture::new();
        let a = f.add(c3i(1));
        let b = f.add(c3i(1));
        f.share(&[a, b], NetworkId::seeded(NetworkKind::Information, a));
        f.space.jam(a);

        assert!(!f.networked(a, b));
        assert!(!f.networked(b, a));
    }

    #[test]
    fn test_enemies_never_share_a_network() {
        let mut f = Fixture::new();
        let a = f.add(c3i(1));
        let b = f.add(c3i(2));
        f.share(&[a, b], NetworkId::seeded(NetworkKind::Information, a));

        assert!(!f.networked(a, b));
    }

    #[test]
    fn test_naval_mesh_needs_context_and_range() {
        let mut f = Fixture::new();
        let naval = |q: i32| {
            UnitProfile::new(TeamId(1))
                .with(NetworkKind::Naval)
                .at(HexCoord::new(q, 0))
        };
        let a = f.add(naval(0));
        let b = f.add(naval(10));
        let far = f.add(naval(100));
        f.share(&[a, b, far], NetworkId::seeded(NetworkKind::Naval, a));

        // Ground battle: the naval mesh is dormant
        assert!(!f.networked(a, b));

        f.space.set_naval_context(true);
        assert!(f.networked(a, b));
        assert!(!f.networked(a, far));

        // Jamming does not reach it
        f.space.jam(a);
        assert!(f.networked(a, b));
    }
}
