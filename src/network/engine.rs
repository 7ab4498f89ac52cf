//! The `Network` facade
//!
//! Owns the roster and configuration and exposes every query and mutator.
//! Queries take `&self` and never write; only `&mut self` entry points
//! self-heal links or change identities.

use rayon::prelude::*;

use crate::core::config::NetworkConfig;
use crate::core::types::{NodeId, Round};
use crate::network::capability::{active_kind, is_coordinator_capable, offers};
use crate::network::capacity;
use crate::network::connectivity::{self, HierarchyTop};
use crate::network::identity::{effective_identity, ensure_identity, seeded_identity};
use crate::network::master;
use crate::network::node::{NetworkId, NetworkKind, Node};
use crate::network::oracles::{Battlespace, RosterDirectory};
use crate::network::reconfiguration;
use crate::network::roster::Roster;

#[derive(Debug, Clone, Default)]
pub struct Network {
    roster: Roster,
    config: NetworkConfig,
    round: Round,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Rounds started so far (0 = deployment)
    pub fn round(&self) -> Round {
        self.round
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.roster.get(id)
    }

    /// Register a unit
    pub fn insert(&mut self, node: Node) {
        self.roster.insert(node);
    }

    /// Unit destroyed; links pointing at it heal lazily
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.roster.remove(id)
    }

    /// Dual-link hardware fitted or lost
    pub fn set_dual_link_slot(&mut self, id: NodeId, fitted: bool) {
        if let Some(node) = self.roster.get_mut(id) {
            node.has_dual_link_slot = fitted;
        }
    }

    // === MASTER LINKS ===

    /// Current master, clearing the link if it has become invalid
    pub fn resolve_master<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId) -> Option<NodeId> {
        master::resolve_master(&mut self.roster, space, id)
    }

    /// Current master without writing
    pub fn peek_master<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> Option<NodeId> {
        master::peek_master(&self.roster, space, id)
    }

    /// Raw master assignment (no capacity check); see `join` for admission
    pub fn set_master<B: Battlespace + ?Sized>(
        &mut self,
        space: &B,
        id: NodeId,
        new_master: Option<NodeId>,
        cascade_on_role_change: bool,
    ) -> bool {
        master::set_master(&mut self.roster, space, id, new_master, cascade_on_role_change)
    }

    /// Resolve every link once; returns how many were cleared
    pub fn heal_links<B: Battlespace + ?Sized>(&mut self, space: &B) -> usize {
        let ids = self.roster.ids();
        let linked: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| self.roster.get(*id).is_some_and(|n| n.master_link.is_some()))
            .collect();
        for id in ids {
            self.resolve_master(space, id);
        }
        linked
            .into_iter()
            .filter(|id| self.roster.get(*id).is_some_and(|n| n.master_link.is_none()))
            .count()
    }

    /// Make a coordinator-capable unit its own master
    pub fn promote<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId) -> bool {
        if !is_coordinator_capable(space, id) {
            tracing::debug!("Rejected promotion of {}: no command unit", id);
            return false;
        }
        self.set_master(space, id, Some(id), true)
    }

    /// Admit `subordinate` under the coordinator `master`
    ///
    /// Coordinator-capable units take a command slot and need a dual-link
    /// coordinator; plain units take a lance slot. Every rejection is a
    /// silent no-op returning `false`.
    pub fn join<B: Battlespace + ?Sized>(&mut self, space: &B, subordinate: NodeId, master: NodeId) -> bool {
        if subordinate == master || !self.roster.contains(subordinate) {
            return false;
        }
        if space.is_enemy(subordinate, master) {
            tracing::debug!("Rejected {} joining enemy {}", subordinate, master);
            return false;
        }
        if !offers(space, subordinate, NetworkKind::Hierarchical)
            || !offers(space, master, NetworkKind::Hierarchical)
        {
            return false;
        }
        if self.peek_master(space, subordinate) == Some(master) {
            return true;
        }
        if self.peek_master(space, master) != Some(master) {
            tracing::debug!("Rejected {} joining {}: not a coordinator", subordinate, master);
            return false;
        }

        let free = if is_coordinator_capable(space, subordinate) {
            let dual = self.roster.get(master).is_some_and(|n| n.has_dual_link_slot);
            if !dual {
                tracing::debug!("Rejected {} joining {}: no command slot", subordinate, master);
                return false;
            }
            self.free_coordinator_slots(space, master)
        } else {
            self.free_lance_slots(space, master)
        };
        if free == 0 {
            tracing::debug!("Rejected {} joining {}: at capacity", subordinate, master);
            return false;
        }

        self.set_master(space, subordinate, Some(master), true)
    }

    /// Drop out of the hierarchy (a coordinator's lance disbands)
    pub fn leave<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId) -> bool {
        self.set_master(space, id, None, true)
    }

    // === MESH MEMBERSHIP ===

    /// Put `id` on the mesh `target` belongs to
    ///
    /// During deployment the change is immediate. Once rounds are running a
    /// reconfigurable unit only queues the change for the next round, but
    /// its seat is reserved at once.
    pub fn join_mesh<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId, target: NodeId) -> bool {
        if id == target || space.is_enemy(id, target) {
            return false;
        }
        let Some(kind) = active_kind(space, id).filter(NetworkKind::is_mesh) else {
            return false;
        };
        if active_kind(space, target) != Some(kind) {
            return false;
        }
        let Some(identity) = self.network_identity(space, target) else {
            return false;
        };
        let queued = self
            .roster
            .get(id)
            .is_some_and(|node| node.pending_network_identity == Some(identity));
        if queued || self.network_identity(space, id) == Some(identity) {
            return true;
        }
        if self.free_mesh_slots(space, target) == 0 {
            tracing::debug!("Rejected {} joining mesh {}: at capacity", id, identity);
            return false;
        }

        if kind == NetworkKind::Reconfigurable && self.round > 0 {
            return self.request_reconfiguration(space, id, identity);
        }

        ensure_identity(&mut self.roster, space, target);
        match self.roster.get_mut(id) {
            Some(node) => {
                node.network_identity = Some(identity);
                true
            }
            None => false,
        }
    }

    /// Manual reset: leave the mesh and found a new one
    pub fn leave_mesh<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId) -> bool {
        let Some(kind) = active_kind(space, id).filter(NetworkKind::is_mesh) else {
            return false;
        };
        match self.roster.get_mut(id) {
            Some(node) => {
                node.network_identity = Some(seeded_identity(kind, id));
                node.pending_network_identity = None;
                true
            }
            None => false,
        }
    }

    /// Identity the unit currently presents
    pub fn network_identity<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> Option<NetworkId> {
        self.roster
            .get(id)
            .and_then(|node| effective_identity(space, node))
    }

    // === CAPACITY ===

    pub fn free_coordinator_slots<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> u32 {
        capacity::free_coordinator_slots(&self.roster, space, &self.config, id)
    }

    pub fn free_lance_slots<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> u32 {
        capacity::free_lance_slots(&self.roster, space, &self.config, id)
    }

    pub fn free_mesh_slots<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> u32 {
        capacity::free_mesh_slots(&self.roster, space, &self.config, id)
    }

    // === CONNECTIVITY ===

    pub fn same_network<B: Battlespace + ?Sized>(&self, space: &B, a: NodeId, b: NodeId) -> bool {
        connectivity::same_network(&self.roster, space, &self.config, a, b)
    }

    pub fn top_of_hierarchy<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> HierarchyTop {
        connectivity::top_of_hierarchy(&self.roster, space, id)
    }

    /// Every other unit currently networked with `id`
    pub fn network_members<B: Battlespace + ?Sized>(&self, space: &B, id: NodeId) -> Vec<NodeId> {
        self.roster
            .ids()
            .into_iter()
            .filter(|other| *other != id && self.same_network(space, id, *other))
            .collect()
    }

    /// All networked pairs `(a, b)` with `a < b`
    ///
    /// Goes parallel once the roster reaches `parallel_threshold` units.
    pub fn connectivity_matrix<B: Battlespace + ?Sized>(&self, space: &B) -> Vec<(NodeId, NodeId)> {
        let ids = self.roster.ids();
        let pairs: Vec<(NodeId, NodeId)> = ids
            .iter()
            .enumerate()
            .flat_map(|(i, a)| ids[i + 1..].iter().map(move |b| (*a, *b)))
            .collect();

        if ids.len() >= self.config.parallel_threshold {
            pairs
                .into_par_iter()
                .filter(|(a, b)| self.same_network(space, *a, *b))
                .collect()
        } else {
            pairs
                .into_iter()
                .filter(|(a, b)| self.same_network(space, *a, *b))
                .collect()
        }
    }

    // === ROUNDS ===

    pub fn request_reconfiguration<B: Battlespace + ?Sized>(
        &mut self,
        space: &B,
        id: NodeId,
        new_identity: NetworkId,
    ) -> bool {
        reconfiguration::request_reconfiguration(&mut self.roster, space, id, new_identity)
    }

    pub fn on_round_start<B: Battlespace + ?Sized>(&mut self, space: &B, id: NodeId) -> bool {
        reconfiguration::on_round_start(&mut self.roster, space, &self.config, id)
    }

    /// Advance to the next round; returns how many units reconfigured
    pub fn start_round<B: Battlespace + ?Sized>(&mut self, space: &B) -> usize {
        self.round += 1;
        let applied = self
            .roster
            .ids()
            .into_iter()
            .filter(|id| self.on_round_start(space, *id))
            .count();
        tracing::info!("Round {} started: {} units reconfigured", self.round, applied);
        applied
    }
}
