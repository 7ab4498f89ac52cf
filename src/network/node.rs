//! Network node data model
//!
//! One `Node` per unit. Equipment-derived facts (capabilities, shutdown,
//! stealth, boost) are never stored here; they come from the oracles on
//! every query.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::NodeId;

/// Network variant a unit can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkKind {
    /// Master/slave topology, depth at most 2
    Hierarchical,
    /// Large jam-susceptible mesh (C3i)
    Information,
    /// Small mesh whose membership changes at round boundaries (Nova)
    Reconfigurable,
    /// Large jam-resistant, range-limited mesh
    Naval,
}

impl NetworkKind {
    /// Highest precedence first; only the first offered kind is active
    pub const PRECEDENCE: [NetworkKind; 4] = [
        NetworkKind::Hierarchical,
        NetworkKind::Information,
        NetworkKind::Reconfigurable,
        NetworkKind::Naval,
    ];

    pub fn is_mesh(&self) -> bool {
        !matches!(self, NetworkKind::Hierarchical)
    }

    /// Is this mesh severed by adversarial jamming?
    pub fn is_jam_susceptible(&self) -> bool {
        matches!(self, NetworkKind::Information | NetworkKind::Reconfigurable)
    }

    fn bit(&self) -> u8 {
        match self {
            NetworkKind::Hierarchical => 1 << 0,
            NetworkKind::Information => 1 << 1,
            NetworkKind::Reconfigurable => 1 << 2,
            NetworkKind::Naval => 1 << 3,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            NetworkKind::Hierarchical => "C3",
            NetworkKind::Information => "C3i",
            NetworkKind::Reconfigurable => "Nova",
            NetworkKind::Naval => "NC3",
        }
    }
}

const COMMAND_UNIT_BIT: u8 = 1 << 7;

/// Operable network equipment on a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder: add a network kind
    pub fn with(mut self, kind: NetworkKind) -> Self {
        self.insert(kind);
        self
    }

    /// Builder: mark the unit as carrying coordinator hardware
    pub fn with_command_unit(mut self) -> Self {
        self.bits |= COMMAND_UNIT_BIT;
        self
    }

    pub fn insert(&mut self, kind: NetworkKind) {
        self.bits |= kind.bit();
    }

    pub fn remove(&mut self, kind: NetworkKind) {
        self.bits &= !kind.bit();
    }

    pub fn contains(&self, kind: NetworkKind) -> bool {
        self.bits & kind.bit() != 0
    }

    /// Coordinator-capable: hierarchical gear plus a master computer
    pub fn has_command_unit(&self) -> bool {
        self.bits & COMMAND_UNIT_BIT != 0 && self.contains(NetworkKind::Hierarchical)
    }

    pub fn is_empty(&self) -> bool {
        !NetworkKind::PRECEDENCE.iter().any(|k| self.contains(*k))
    }

    /// Offered kinds, highest precedence first
    pub fn kinds(&self) -> impl Iterator<Item = NetworkKind> + '_ {
        NetworkKind::PRECEDENCE
            .iter()
            .copied()
            .filter(move |k| self.contains(*k))
    }
}

/// Opaque identity token of one network instance
///
/// Two tokens are equal only if both kind and seed match, so networks of
/// different kinds can never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId {
    kind: NetworkKind,
    seed: NodeId,
}

impl NetworkId {
    /// Identity of a network founded by `seed`
    pub fn seeded(kind: NetworkKind, seed: NodeId) -> Self {
        Self { kind, seed }
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn seed(&self) -> NodeId {
        self.seed
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.prefix(), self.seed)
    }
}

/// Network state of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Hierarchical master; `Some(id)` pointing at itself marks a coordinator
    pub master_link: Option<NodeId>,
    /// Second master slot letting a coordinator host other coordinators
    pub has_dual_link_slot: bool,
    /// Cached identity of the current network
    pub network_identity: Option<NetworkId>,
    /// Reconfigurable mesh only: identity taking effect next round
    pub pending_network_identity: Option<NetworkId>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            master_link: None,
            has_dual_link_slot: false,
            network_identity: None,
            pending_network_identity: None,
        }
    }

    /// Builder: fit the dual-link slot
    pub fn with_dual_link_slot(mut self) -> Self {
        self.has_dual_link_slot = true;
        self
    }

    /// Is this node a coordinator (its own master)?
    pub fn is_own_master(&self) -> bool {
        self.master_link == Some(self.id)
    }

    /// Coordinator with the extra command slot
    pub fn is_dual_link_coordinator(&self) -> bool {
        self.is_own_master() && self.has_dual_link_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_set_membership() {
        let set = CapabilitySet::empty()
            .with(NetworkKind::Naval)
            .with(NetworkKind::Information);
        assert!(set.contains(NetworkKind::Naval));
        assert!(set.contains(NetworkKind::Information));
        assert!(!set.contains(NetworkKind::Hierarchical));
        assert!(!set.is_empty());
    }

    #[test]
    fn test_kinds_follow_precedence() {
        let set = CapabilitySet::empty()
            .with(NetworkKind::Naval)
            .with(NetworkKind::Reconfigurable)
            .with(NetworkKind::Hierarchical);
        let kinds: Vec<_> = set.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                NetworkKind::Hierarchical,
                NetworkKind::Reconfigurable,
                NetworkKind::Naval
            ]
        );
    }

    #[test]
    fn test_command_unit_requires_hierarchical_gear() {
        let bare = CapabilitySet::empty().with_command_unit();
        assert!(!bare.has_command_unit());
        assert!(bare.is_empty());

        let master = bare.with(NetworkKind::Hierarchical);
        assert!(master.has_command_unit());
    }

    #[test]
    fn test_network_ids_of_different_kinds_differ() {
        let seed = NodeId::new();
        let info = NetworkId::seeded(NetworkKind::Information, seed);
        let nova = NetworkId::seeded(NetworkKind::Reconfigurable, seed);
        assert_ne!(info, nova);
        assert_eq!(info, NetworkId::seeded(NetworkKind::Information, seed));
    }

    #[test]
    fn test_network_id_display() {
        let seed = NodeId::new();
        let id = NetworkId::seeded(NetworkKind::Information, seed);
        assert_eq!(id.to_string(), format!("C3i.{}", seed));
    }

    #[test]
    fn test_own_master_is_coordinator() {
        let mut node = Node::new(NodeId::new());
        assert!(!node.is_own_master());

        node.master_link = Some(node.id);
        assert!(node.is_own_master());
        assert!(!node.is_dual_link_coordinator());

        node.has_dual_link_slot = true;
        assert!(node.is_dual_link_coordinator());
    }
}
