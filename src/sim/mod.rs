//! In-memory host for the CLI and tests. A world file is a JSON [`SimWorld`]:
//! a device list plus named groups of device names.

mod devices;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::device::{Block, Device, DeviceId, Host, Light, RemoteControl, Rotor, ShipController};
use crate::store::{self, StoreError};

pub use devices::{SimLight, SimRemoteControl, SimRotor, SimShipController};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimDevice {
    Light(SimLight),
    Rotor(SimRotor),
    Cockpit(SimShipController),
    Remote(SimRemoteControl),
}

impl SimDevice {
    fn inner(&self) -> &dyn Block {
        match self {
            SimDevice::Light(d) => d,
            SimDevice::Rotor(d) => d,
            SimDevice::Cockpit(d) => d,
            SimDevice::Remote(d) => d,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SimDevice::Light(_) => "light",
            SimDevice::Rotor(d) if d.is_hinge() => "hinge",
            SimDevice::Rotor(_) => "rotor",
            SimDevice::Cockpit(_) => "cockpit",
            SimDevice::Remote(_) => "remote",
        }
    }
}

impl Block for SimDevice {
    fn name(&self) -> &str {
        self.inner().name()
    }
    fn subtype_id(&self) -> &str {
        self.inner().subtype_id()
    }
}

impl Device for SimDevice {
    fn as_light(&mut self) -> Option<&mut (dyn Light + 'static)> {
        match self {
            SimDevice::Light(d) => d.as_light(),
            _ => None,
        }
    }

    fn as_rotor(&mut self) -> Option<&mut (dyn Rotor + 'static)> {
        match self {
            SimDevice::Rotor(d) => d.as_rotor(),
            _ => None,
        }
    }

    fn as_ship_controller(&mut self) -> Option<&mut (dyn ShipController + 'static)> {
        match self {
            SimDevice::Cockpit(d) => d.as_ship_controller(),
            SimDevice::Remote(d) => d.as_ship_controller(),
            _ => None,
        }
    }

    fn as_remote_control(&mut self) -> Option<&mut (dyn RemoteControl + 'static)> {
        match self {
            SimDevice::Remote(d) => d.as_remote_control(),
            _ => None,
        }
    }
}

// ── World ───────────────────────────────────────────────────────────

/// Devices in insertion order; a device's [`DeviceId`] is its position.
/// Name and group lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimWorld {
    #[serde(default)]
    pub devices: Vec<SimDevice>,
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,
}

impl SimWorld {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        store::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        store::write_json(path, self)
    }

    pub fn add(&mut self, device: SimDevice) -> DeviceId {
        let id = DeviceId(self.devices.len() as u32);
        self.devices.push(device);
        id
    }

    pub fn add_light(&mut self, light: SimLight) -> DeviceId {
        self.add(SimDevice::Light(light))
    }

    pub fn add_rotor(&mut self, rotor: SimRotor) -> DeviceId {
        self.add(SimDevice::Rotor(rotor))
    }

    pub fn add_controller(&mut self, controller: SimShipController) -> DeviceId {
        self.add(SimDevice::Cockpit(controller))
    }

    pub fn add_remote(&mut self, remote: SimRemoteControl) -> DeviceId {
        self.add(SimDevice::Remote(remote))
    }

    /// Define (or redefine) a group by member names.
    pub fn add_group(&mut self, name: impl Into<String>, members: &[&str]) {
        self.groups
            .insert(name.into(), members.iter().map(ToString::to_string).collect());
    }

    /// First device named `name`.
    pub fn id_of(&self, name: &str) -> Option<DeviceId> {
        self.devices
            .iter()
            .position(|d| d.name().eq_ignore_ascii_case(name))
            .map(|i| DeviceId(i as u32))
    }

    pub fn device(&self, id: DeviceId) -> Option<&SimDevice> {
        self.devices.get(id.0 as usize)
    }

    pub fn light(&self, name: &str) -> Option<&SimLight> {
        self.devices.iter().find_map(|d| match d {
            SimDevice::Light(l) if l.name().eq_ignore_ascii_case(name) => Some(l),
            _ => None,
        })
    }

    pub fn light_mut(&mut self, name: &str) -> Option<&mut SimLight> {
        self.devices.iter_mut().find_map(|d| match d {
            SimDevice::Light(l) if l.name().eq_ignore_ascii_case(name) => Some(l),
            _ => None,
        })
    }

    pub fn rotor(&self, name: &str) -> Option<&SimRotor> {
        self.devices.iter().find_map(|d| match d {
            SimDevice::Rotor(r) if r.name().eq_ignore_ascii_case(name) => Some(r),
            _ => None,
        })
    }

    pub fn controller(&self, name: &str) -> Option<&SimShipController> {
        self.devices.iter().find_map(|d| match d {
            SimDevice::Cockpit(c) if c.name().eq_ignore_ascii_case(name) => Some(c),
            _ => None,
        })
    }

    pub fn remote(&self, name: &str) -> Option<&SimRemoteControl> {
        self.devices.iter().find_map(|d| match d {
            SimDevice::Remote(r) if r.name().eq_ignore_ascii_case(name) => Some(r),
            _ => None,
        })
    }
}

impl Host for SimWorld {
    fn find_by_name(&self, name: &str) -> Vec<DeviceId> {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, d)| d.name().eq_ignore_ascii_case(name))
            .map(|(i, _)| DeviceId(i as u32))
            .collect()
    }

    fn find_group(&self, name: &str) -> Option<Vec<DeviceId>> {
        let (_, members) = self
            .groups
            .iter()
            .find(|(group, _)| group.eq_ignore_ascii_case(name))?;
        Some(members.iter().flat_map(|member| self.find_by_name(member)).collect())
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn Device> {
        self.devices
            .get_mut(id.0 as usize)
            .map(|d| d as &mut dyn Device)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::Color;

    fn world() -> SimWorld {
        let mut world = SimWorld::default();
        world.add_light(SimLight::new("Hangar Light"));
        world.add_rotor(SimRotor::hinge("Door Hinge"));
        world.add_light(SimLight::new("hangar light"));
        world.add_group("Hangar", &["hangar light", "door hinge", "missing"]);
        world
    }

    #[test]
    fn lookups_ignore_case() {
        let world = world();
        assert_eq!(world.find_by_name("HANGAR LIGHT"), vec![DeviceId(0), DeviceId(2)]);
        assert_eq!(
            world.find_group("hangar"),
            Some(vec![DeviceId(0), DeviceId(2), DeviceId(1)])
        );
        assert_eq!(world.find_group("nope"), None);
        assert_eq!(world.id_of("door HINGE"), Some(DeviceId(1)));
    }

    #[test]
    fn capabilities_follow_the_device_kind() {
        let mut world = world();
        let hinge = world.device_mut(DeviceId(1)).unwrap();
        assert!(hinge.as_light().is_none());
        assert!(hinge.as_rotor().unwrap().is_hinge());

        let mut remote = SimDevice::Remote(SimRemoteControl::new("drone"));
        assert!(remote.as_ship_controller().is_some());
        assert!(remote.as_remote_control().is_some());
        let mut cockpit = SimDevice::Cockpit(SimShipController::new("seat"));
        assert!(cockpit.as_remote_control().is_none());
        assert_eq!(remote.kind(), "remote");
        assert_eq!(world.device(DeviceId(1)).unwrap().kind(), "hinge");
    }

    #[test]
    fn world_file_round_trip() {
        let dir = std::env::temp_dir().join("blockctl_test_world");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.json");

        let mut world = world();
        world.light_mut("hangar light").unwrap().color = Color::rgb(1, 2, 3);
        world.save(&path).unwrap();
        assert_eq!(SimWorld::load(&path).unwrap(), world);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn sparse_world_file_fills_defaults() {
        let json = r#"{
            "devices": [
                { "kind": "light", "name": "lamp", "intensity": 3.0 },
                { "kind": "remote", "controller": { "name": "drone" } }
            ],
            "groups": { "all": ["lamp", "drone"] }
        }"#;
        let world: SimWorld = serde_json::from_str(json).unwrap();
        let lamp = world.light("lamp").unwrap();
        assert!(lamp.enabled);
        assert!((lamp.intensity - 3.0).abs() < f64::EPSILON);
        assert!(world.remote("drone").unwrap().controller.dampeners);
        assert_eq!(world.find_group("all"), Some(vec![DeviceId(0), DeviceId(1)]));
    }
}
