//! In-memory battlespace
//!
//! Holds just enough unit state (team, position, equipment, status flags)
//! and jamming coverage to answer every oracle. Used by the scenario runner
//! and by tests.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{HexCoord, NodeId, TeamId};
use crate::network::node::{CapabilitySet, NetworkKind};
use crate::network::oracles::{AllianceOracle, EquipmentOracle, JammingOracle, RangeOracle};

/// Per-unit facts the oracles report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitProfile {
    pub team: TeamId,
    pub position: HexCoord,
    pub equipment: CapabilitySet,
    pub shut_down: bool,
    pub off_board: bool,
    pub stealth_active: bool,
    pub boosted: bool,
}

impl UnitProfile {
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            position: HexCoord::default(),
            equipment: CapabilitySet::empty(),
            shut_down: false,
            off_board: false,
            stealth_active: false,
            boosted: false,
        }
    }

    /// Builder: install network gear
    pub fn with(mut self, kind: NetworkKind) -> Self {
        self.equipment.insert(kind);
        self
    }

    /// Builder: install a master computer
    pub fn with_command_unit(mut self) -> Self {
        self.equipment = self.equipment.with_command_unit();
        self
    }

    pub fn at(mut self, position: HexCoord) -> Self {
        self.position = position;
        self
    }

    pub fn boosted(mut self) -> Self {
        self.boosted = true;
        self
    }
}

/// Area where a team's jammers suppress enemy links
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JamZone {
    pub team: TeamId,
    pub center: HexCoord,
    pub radius: u32,
}

impl JamZone {
    fn covers(&self, position: HexCoord) -> bool {
        self.center.distance(&position) <= self.radius
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    units: AHashMap<NodeId, UnitProfile>,
    jam_zones: Vec<JamZone>,
    jammed: AHashSet<NodeId>,
    naval_context: bool,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, id: NodeId, profile: UnitProfile) {
        self.units.insert(id, profile);
    }

    pub fn remove_unit(&mut self, id: NodeId) -> Option<UnitProfile> {
        self.jammed.remove(&id);
        self.units.remove(&id)
    }

    pub fn unit(&self, id: NodeId) -> Option<&UnitProfile> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: NodeId) -> Option<&mut UnitProfile> {
        self.units.get_mut(&id)
    }

    pub fn set_shut_down(&mut self, id: NodeId, shut_down: bool) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.shut_down = shut_down;
        }
    }

    pub fn set_stealth(&mut self, id: NodeId, active: bool) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.stealth_active = active;
        }
    }

    /// Equipment hit: the gear stops working
    pub fn destroy_equipment(&mut self, id: NodeId, kind: NetworkKind) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.equipment.remove(kind);
        }
    }

    pub fn add_jam_zone(&mut self, zone: JamZone) {
        self.jam_zones.push(zone);
    }

    /// Suppress a single unit regardless of position
    pub fn jam(&mut self, id: NodeId) {
        self.jammed.insert(id);
    }

    pub fn clear_jamming(&mut self) {
        self.jam_zones.clear();
        self.jammed.clear();
    }

    pub fn set_naval_context(&mut self, naval: bool) {
        self.naval_context = naval;
    }
}

impl AllianceOracle for Sandbox {
    fn is_enemy(&self, a: NodeId, b: NodeId) -> bool {
        match (self.units.get(&a), self.units.get(&b)) {
            (Some(ua), Some(ub)) => ua.team != ub.team,
            _ => false,
        }
    }
}

impl EquipmentOracle for Sandbox {
    fn capability_flags(&self, node: NodeId) -> CapabilitySet {
        self.units
            .get(&node)
            .map(|u| u.equipment)
            .unwrap_or_default()
    }

    fn is_shut_down(&self, node: NodeId) -> bool {
        self.units.get(&node).is_some_and(|u| u.shut_down)
    }

    fn is_off_board(&self, node: NodeId) -> bool {
        self.units.get(&node).is_some_and(|u| u.off_board)
    }

    fn is_stealth_active(&self, node: NodeId) -> bool {
        self.units.get(&node).is_some_and(|u| u.stealth_active)
    }

    fn is_boosted(&self, node: NodeId) -> bool {
        self.units.get(&node).is_some_and(|u| u.boosted)
    }
}

impl JammingOracle for Sandbox {
    fn is_suppressed(&self, node: NodeId, _observer: NodeId) -> bool {
        if self.jammed.contains(&node) {
            return true;
        }
        let Some(unit) = self.units.get(&node) else {
            return false;
        };
        self.jam_zones
            .iter()
            .any(|zone| zone.team != unit.team && zone.covers(unit.position))
    }
}

impl RangeOracle for Sandbox {
    fn distance(&self, a: NodeId, b: NodeId) -> u32 {
        match (self.units.get(&a), self.units.get(&b)) {
            (Some(ua), Some(ub)) => ua.position.distance(&ub.position),
            _ => u32::MAX,
        }
    }

    fn in_required_battle_context(&self) -> bool {
        self.naval_context
    }
}
