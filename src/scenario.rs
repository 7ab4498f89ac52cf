//! Scripted C3 scenarios loaded from TOML
//!
//! A scenario names its units, places them in a sandbox battlespace and
//! replays an ordered list of actions against the network. Used by the
//! `c3_scenario` runner and by integration tests.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::NetworkConfig;
use crate::core::error::{C3Error, Result};
use crate::core::types::{HexCoord, NodeId, Round, TeamId};
use crate::network::{active_kind, JamZone, Network, NetworkKind, Node, Sandbox, UnitProfile};

/// Network gear as written in scenario files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gear {
    Hierarchical,
    CommandUnit,
    Information,
    Reconfigurable,
    Naval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub team: u32,
    #[serde(default)]
    pub position: (i32, i32),
    #[serde(default)]
    pub equipment: Vec<Gear>,
    #[serde(default)]
    pub dual_link: bool,
    #[serde(default)]
    pub boosted: bool,
    #[serde(default)]
    pub shut_down: bool,
    #[serde(default)]
    pub stealth: bool,
    /// Starts the match under targeted jamming
    #[serde(default)]
    pub jammed: bool,
}

impl UnitSpec {
    fn profile(&self) -> UnitProfile {
        let mut profile = UnitProfile::new(TeamId(self.team))
            .at(HexCoord::new(self.position.0, self.position.1));
        for gear in &self.equipment {
            profile = match gear {
                Gear::Hierarchical => profile.with(NetworkKind::Hierarchical),
                Gear::CommandUnit => profile.with_command_unit(),
                Gear::Information => profile.with(NetworkKind::Information),
                Gear::Reconfigurable => profile.with(NetworkKind::Reconfigurable),
                Gear::Naval => profile.with(NetworkKind::Naval),
            };
        }
        profile.boosted = self.boosted;
        profile.shut_down = self.shut_down;
        profile.stealth_active = self.stealth;
        profile
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JamZoneSpec {
    pub team: u32,
    pub center: (i32, i32),
    pub radius: u32,
}

/// One scripted step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Promote { unit: String },
    Join { unit: String, master: String },
    Leave { unit: String },
    JoinMesh { unit: String, target: String },
    LeaveMesh { unit: String },
    Reconfigure { unit: String, target: String },
    StartRound,
    Destroy { unit: String },
    LoseDualLink { unit: String },
    ShutDown { unit: String },
    Jam { unit: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Battle fought where the naval mesh works
    #[serde(default)]
    pub naval: bool,
    #[serde(default)]
    pub config: Option<NetworkConfig>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub jam_zones: Vec<JamZoneSpec>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Set up the network and battlespace (actions not yet applied)
    pub fn build(&self) -> Result<Skirmish> {
        let config = self.config.clone().unwrap_or_default();
        config.validate()?;

        let mut skirmish = Skirmish {
            network: Network::with_config(config),
            space: Sandbox::new(),
            ids: AHashMap::new(),
            names: Vec::new(),
        };
        skirmish.space.set_naval_context(self.naval);

        for unit in &self.units {
            if skirmish.ids.contains_key(&unit.name) {
                return Err(C3Error::InvalidScenario(format!(
                    "duplicate unit name {}",
                    unit.name
                )));
            }
            let id = NodeId::new();
            let mut node = Node::new(id);
            node.has_dual_link_slot = unit.dual_link;
            skirmish.network.insert(node);
            skirmish.space.add_unit(id, unit.profile());
            if unit.jammed {
                skirmish.space.jam(id);
            }
            skirmish.ids.insert(unit.name.clone(), id);
            skirmish.names.push((unit.name.clone(), id));
        }

        for zone in &self.jam_zones {
            skirmish.space.add_jam_zone(JamZone {
                team: TeamId(zone.team),
                center: HexCoord::new(zone.center.0, zone.center.1),
                radius: zone.radius,
            });
        }

        Ok(skirmish)
    }

    /// Build and replay every action
    pub fn run(&self) -> Result<Skirmish> {
        let mut skirmish = self.build()?;
        for action in &self.actions {
            let applied = skirmish.apply(action)?;
            if !applied {
                tracing::debug!("Action had no effect: {:?}", action);
            }
        }
        Ok(skirmish)
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let contents = fs::read_to_string(path.as_ref())?;
    Scenario::from_toml_str(&contents)
}

/// Random roster: one team of hierarchical lances plus a mesh detachment
pub fn random_scenario(rng: &mut impl Rng, units: usize) -> Scenario {
    let mut scenario = Scenario::default();
    let mut coordinators: Vec<String> = Vec::new();

    for i in 0..units {
        let name = format!("unit-{:03}", i);
        let team = if rng.gen_bool(0.8) { 1 } else { 2 };
        let position = (rng.gen_range(-20..=20), rng.gen_range(-20..=20));
        let mesh = rng.gen_bool(0.3);
        let command = !mesh && rng.gen_bool(0.25);

        let equipment = if mesh {
            vec![Gear::Information]
        } else if command {
            vec![Gear::Hierarchical, Gear::CommandUnit]
        } else {
            vec![Gear::Hierarchical]
        };

        if command {
            scenario.actions.push(Action::Promote { unit: name.clone() });
            coordinators.push(name.clone());
        } else if !mesh && !coordinators.is_empty() {
            let master = coordinators[rng.gen_range(0..coordinators.len())].clone();
            scenario.actions.push(Action::Join {
                unit: name.clone(),
                master,
            });
        }

        scenario.units.push(UnitSpec {
            name,
            team,
            position,
            equipment,
            dual_link: command && rng.gen_bool(0.3),
            boosted: rng.gen_bool(0.1),
            shut_down: false,
            stealth: false,
            jammed: false,
        });
    }

    let mesh_units: Vec<String> = scenario
        .units
        .iter()
        .filter(|u| u.equipment.contains(&Gear::Information))
        .map(|u| u.name.clone())
        .collect();
    if let Some((hub, rest)) = mesh_units.split_first() {
        for unit in rest {
            scenario.actions.push(Action::JoinMesh {
                unit: unit.clone(),
                target: hub.clone(),
            });
        }
    }

    if rng.gen_bool(0.5) {
        scenario.jam_zones.push(JamZoneSpec {
            team: 2,
            center: (rng.gen_range(-10..=10), rng.gen_range(-10..=10)),
            radius: rng.gen_range(1..=6),
        });
    }

    scenario
}

/// A built scenario: network plus battlespace
#[derive(Debug, Clone)]
pub struct Skirmish {
    pub network: Network,
    pub space: Sandbox,
    ids: AHashMap<String, NodeId>,
    names: Vec<(String, NodeId)>,
}

impl Skirmish {
    pub fn id(&self, name: &str) -> Result<NodeId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| C3Error::UnknownUnit(name.to_string()))
    }

    fn name(&self, id: NodeId) -> String {
        self.names
            .iter()
            .find(|(_, n)| *n == id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Apply one action; returns whether it took effect
    pub fn apply(&mut self, action: &Action) -> Result<bool> {
        let applied = match action {
            Action::Promote { unit } => {
                let id = self.id(unit)?;
                self.network.promote(&self.space, id)
            }
            Action::Join { unit, master } => {
                let (id, master) = (self.id(unit)?, self.id(master)?);
                self.network.join(&self.space, id, master)
            }
            Action::Leave { unit } => {
                let id = self.id(unit)?;
                self.network.leave(&self.space, id)
            }
            Action::JoinMesh { unit, target } => {
                let (id, target) = (self.id(unit)?, self.id(target)?);
                self.network.join_mesh(&self.space, id, target)
            }
            Action::LeaveMesh { unit } => {
                let id = self.id(unit)?;
                self.network.leave_mesh(&self.space, id)
            }
            Action::Reconfigure { unit, target } => {
                let (id, target) = (self.id(unit)?, self.id(target)?);
                match self.network.network_identity(&self.space, target) {
                    Some(identity) => self.network.request_reconfiguration(&self.space, id, identity),
                    None => false,
                }
            }
            Action::StartRound => {
                self.network.start_round(&self.space);
                true
            }
            Action::Destroy { unit } => {
                let id = self.id(unit)?;
                self.space.remove_unit(id);
                self.network.remove(id).is_some()
            }
            Action::LoseDualLink { unit } => {
                let id = self.id(unit)?;
                self.network.set_dual_link_slot(id, false);
                true
            }
            Action::ShutDown { unit } => {
                let id = self.id(unit)?;
                self.space.set_shut_down(id, true);
                true
            }
            Action::Jam { unit } => {
                let id = self.id(unit)?;
                self.space.jam(id);
                true
            }
        };
        Ok(applied)
    }

    /// Snapshot of every surviving unit's network state
    pub fn report(&self) -> ConnectivityReport {
        let network = &self.network;
        let space = &self.space;

        let units = self
            .names
            .iter()
            .filter(|(_, id)| network.node(*id).is_some())
            .map(|(name, id)| {
                let kind = active_kind(space, *id);
                let free_slots = match kind {
                    Some(NetworkKind::Hierarchical) => network.free_coordinator_slots(space, *id),
                    Some(_) => network.free_mesh_slots(space, *id),
                    None => 0,
                };
                UnitReport {
                    name: name.clone(),
                    kind,
                    identity: network.network_identity(space, *id).map(|i| i.to_string()),
                    master: network.peek_master(space, *id).map(|m| self.name(m)),
                    free_slots,
                    members: network
                        .network_members(space, *id)
                        .into_iter()
                        .map(|m| self.name(m))
                        .collect(),
                }
            })
            .collect();

        let links = network
            .connectivity_matrix(space)
            .into_iter()
            .map(|(a, b)| (self.name(a), self.name(b)))
            .collect();

        ConnectivityReport {
            round: network.round(),
            units,
            links,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub kind: Option<NetworkKind>,
    pub identity: Option<String>,
    pub master: Option<String>,
    pub free_slots: u32,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityReport {
    pub round: Round,
    pub units: Vec<UnitReport>,
    pub links: Vec<(String, String)>,
}
