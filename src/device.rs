//! Host-facing device capabilities.
//!
//! The engine never owns devices. A [`Host`] resolves names and groups to
//! [`DeviceId`]s and lends out `&mut dyn Device`; each block handler narrows that
//! to the capability trait it drives (`dyn Light`, `dyn Rotor`, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Color, Orientation, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

/// Identity shared by every block.
pub trait Block {
    fn name(&self) -> &str;
    /// Definition subtype, e.g. `"LargeHinge"` or `"SmallBlockLight"`.
    fn subtype_id(&self) -> &str;
}

/// A device as the host lends it out. Each accessor returns the device as the
/// given capability, or `None` when it does not have it.
pub trait Device: Block {
    fn as_light(&mut self) -> Option<&mut (dyn Light + 'static)> {
        None
    }

    fn as_rotor(&mut self) -> Option<&mut (dyn Rotor + 'static)> {
        None
    }

    fn as_ship_controller(&mut self) -> Option<&mut (dyn ShipController + 'static)> {
        None
    }

    fn as_remote_control(&mut self) -> Option<&mut (dyn RemoteControl + 'static)> {
        None
    }
}

/// Block and group lookup, injected by whatever owns the devices.
pub trait Host {
    /// All devices whose name matches `name`, in host order.
    fn find_by_name(&self, name: &str) -> Vec<DeviceId>;
    /// Members of the named group, or `None` if no such group exists.
    fn find_group(&self, name: &str) -> Option<Vec<DeviceId>>;
    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn Device>;
}

// ── Capabilities ─────────────────────────────────────────────────

/// A block that can be switched on and off.
pub trait Functional: Block {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

pub trait Light: Functional {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
    fn intensity(&self) -> f64;
    fn set_intensity(&mut self, value: f64);
    fn falloff(&self) -> f64;
    fn set_falloff(&mut self, value: f64);
    fn radius(&self) -> f64;
    fn set_radius(&mut self, value: f64);
    /// Seconds between blinks.
    fn blink_interval(&self) -> f64;
    fn set_blink_interval(&mut self, value: f64);
    /// Percentage of the interval the light stays on.
    fn blink_length(&self) -> f64;
    fn set_blink_length(&mut self, value: f64);
    fn blink_offset(&self) -> f64;
    fn set_blink_offset(&mut self, value: f64);
}

/// Rotors and hinges. Limits are in degrees, velocity in RPM.
pub trait Rotor: Functional {
    /// Current angle in radians, as the block reports it.
    fn angle(&self) -> f64;
    fn upper_limit(&self) -> f64;
    fn set_upper_limit(&mut self, degrees: f64);
    fn lower_limit(&self) -> f64;
    fn set_lower_limit(&mut self, degrees: f64);
    fn velocity(&self) -> f64;
    fn set_velocity(&mut self, rpm: f64);
    fn displacement(&self) -> f64;
    fn set_displacement(&mut self, value: f64);
    fn is_attached(&self) -> bool;
    fn attach(&mut self);
    fn detach(&mut self);
    fn is_locked(&self) -> bool;
    fn set_locked(&mut self, locked: bool);
    fn torque(&self) -> f64;
    fn set_torque(&mut self, value: f64);

    fn is_hinge(&self) -> bool {
        self.subtype_id().contains("Hinge")
    }
}

/// Cockpits, seats and remote controls.
pub trait ShipController: Block {
    fn is_main_cockpit(&self) -> bool;
    fn set_main_cockpit(&mut self, main: bool);
    fn dampeners(&self) -> bool;
    fn set_dampeners(&mut self, on: bool);
    fn hand_brake(&self) -> bool;
    fn set_hand_brake(&mut self, on: bool);
    fn total_gravity(&self) -> Vector3;
    fn ship_mass(&self) -> f64;
    fn ship_speed(&self) -> f64;
    /// World-space linear velocity.
    fn linear_velocity(&self) -> Vector3;
    fn orientation(&self) -> Orientation;
    fn move_indicator(&self) -> Vector3;
    /// (pitch, yaw)
    fn rotation_indicator(&self) -> (f64, f64);
    fn roll_indicator(&self) -> f64;

    /// Linear velocity in this controller's (right, up, backward) frame.
    fn local_velocity(&self) -> Vector3 {
        self.orientation().to_local(self.linear_velocity())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Waypoint {
    pub name: String,
    pub coords: Vector3,
}

pub trait RemoteControl: ShipController {
    fn autopilot(&self) -> bool;
    fn set_autopilot(&mut self, on: bool);
    fn speed_limit(&self) -> f64;
    fn set_speed_limit(&mut self, value: f64);
    fn docking_mode(&self) -> bool;
    fn set_docking_mode(&mut self, on: bool);
    fn current_waypoint(&self) -> Option<Waypoint>;
    fn waypoints(&self) -> Vec<Waypoint>;
    fn clear_waypoints(&mut self);
    fn add_waypoint(&mut self, waypoint: Waypoint);
}
