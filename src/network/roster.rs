//! In-memory roster of network nodes

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::NodeId;
use crate::network::node::Node;
use crate::network::oracles::RosterDirectory;

/// Every node in the match, keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    nodes: AHashMap<NodeId, Node>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Remove a node (destruction); returns the removed state
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in a stable (sorted) order
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Ids of nodes whose stored master link equals `master` (excluding `master`)
    pub fn linked_to(&self, master: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.id != master && n.master_link == Some(master))
            .map(|n| n.id)
            .collect();
        ids.sort();
        ids
    }
}

impl RosterDirectory for Roster {
    fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }
}
