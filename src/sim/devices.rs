use serde::{Deserialize, Serialize};

use crate::device::{Block, Device, Functional, Light, RemoteControl, Rotor, ShipController, Waypoint};
use crate::model::{Color, Orientation, Vector3};

// ── Light ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimLight {
    pub name: String,
    pub subtype_id: String,
    pub enabled: bool,
    pub color: Color,
    pub intensity: f64,
    pub falloff: f64,
    pub radius: f64,
    pub blink_interval: f64,
    pub blink_length: f64,
    pub blink_offset: f64,
}

impl Default for SimLight {
    fn default() -> Self {
        Self {
            name: String::new(),
            subtype_id: "SmallLight".into(),
            enabled: true,
            color: Color::WHITE,
            intensity: 1.0,
            falloff: 1.0,
            radius: 4.0,
            blink_interval: 0.0,
            blink_length: 10.0,
            blink_offset: 0.0,
        }
    }
}

impl SimLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Block for SimLight {
    fn name(&self) -> &str {
        &self.name
    }
    fn subtype_id(&self) -> &str {
        &self.subtype_id
    }
}

impl Functional for SimLight {
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Light for SimLight {
    fn color(&self) -> Color {
        self.color
    }
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
    fn intensity(&self) -> f64 {
        self.intensity
    }
    fn set_intensity(&mut self, value: f64) {
        self.intensity = value;
    }
    fn falloff(&self) -> f64 {
        self.falloff
    }
    fn set_falloff(&mut self, value: f64) {
        self.falloff = value;
    }
    fn radius(&self) -> f64 {
        self.radius
    }
    fn set_radius(&mut self, value: f64) {
        self.radius = value;
    }
    fn blink_interval(&self) -> f64 {
        self.blink_interval
    }
    fn set_blink_interval(&mut self, value: f64) {
        self.blink_interval = value;
    }
    fn blink_length(&self) -> f64 {
        self.blink_length
    }
    fn set_blink_length(&mut self, value: f64) {
        self.blink_length = value;
    }
    fn blink_offset(&self) -> f64 {
        self.blink_offset
    }
    fn set_blink_offset(&mut self, value: f64) {
        self.blink_offset = value;
    }
}

impl Device for SimLight {
    fn as_light(&mut self) -> Option<&mut (dyn Light + 'static)> {
        Some(self)
    }
}

// ── Rotor / hinge ───────────────────────────────────────────────────

/// A rotor or hinge. Nothing turns on its own: `angle` only changes when a
/// test or world file sets it. World files hold it in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimRotor {
    pub name: String,
    pub subtype_id: String,
    pub enabled: bool,
    pub angle: f64,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub velocity: f64,
    pub displacement: f64,
    pub attached: bool,
    pub locked: bool,
    pub torque: f64,
}

impl Default for SimRotor {
    fn default() -> Self {
        Self {
            name: String::new(),
            subtype_id: "LargeStator".into(),
            enabled: true,
            angle: 0.0,
            upper_limit: 360.0,
            lower_limit: -360.0,
            velocity: 0.0,
            displacement: 0.0,
            attached: true,
            locked: false,
            torque: 1000.0,
        }
    }
}

impl SimRotor {
    pub fn rotor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn hinge(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subtype_id: "LargeHinge".into(),
            upper_limit: 90.0,
            lower_limit: -90.0,
            ..Self::default()
        }
    }
}

impl Block for SimRotor {
    fn name(&self) -> &str {
        &self.name
    }
    fn subtype_id(&self) -> &str {
        &self.subtype_id
    }
}

impl Functional for SimRotor {
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Rotor for SimRotor {
    fn angle(&self) -> f64 {
        self.angle.to_radians()
    }
    fn upper_limit(&self) -> f64 {
        self.upper_limit
    }
    fn set_upper_limit(&mut self, degrees: f64) {
        self.upper_limit = degrees;
    }
    fn lower_limit(&self) -> f64 {
        self.lower_limit
    }
    fn set_lower_limit(&mut self, degrees: f64) {
        self.lower_limit = degrees;
    }
    fn velocity(&self) -> f64 {
        self.velocity
    }
    fn set_velocity(&mut self, rpm: f64) {
        self.velocity = rpm;
    }
    fn displacement(&self) -> f64 {
        self.displacement
    }
    fn set_displacement(&mut self, value: f64) {
        self.displacement = value;
    }
    fn is_attached(&self) -> bool {
        self.attached
    }
    fn attach(&mut self) {
        self.attached = true;
    }
    fn detach(&mut self) {
        self.attached = false;
    }
    fn is_locked(&self) -> bool {
        self.locked
    }
    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
    fn torque(&self) -> f64 {
        self.torque
    }
    fn set_torque(&mut self, value: f64) {
        self.torque = value;
    }
}

impl Device for SimRotor {
    fn as_rotor(&mut self) -> Option<&mut (dyn Rotor + 'static)> {
        Some(self)
    }
}

// ── Ship controllers ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimShipController {
    pub name: String,
    pub subtype_id: String,
    pub main_cockpit: bool,
    pub dampeners: bool,
    pub hand_brake: bool,
    pub gravity: Vector3,
    pub mass: f64,
    pub linear_velocity: Vector3,
    pub orientation: Orientation,
    pub move_indicator: Vector3,
    /// (pitch, yaw)
    pub rotation_indicator: (f64, f64),
    pub roll_indicator: f64,
}

impl Default for SimShipController {
    fn default() -> Self {
        Self {
            name: String::new(),
            subtype_id: "LargeBlockCockpit".into(),
            main_cockpit: false,
            dampeners: true,
            hand_brake: false,
            gravity: Vector3::new(0.0, -9.81, 0.0),
            mass: 10_000.0,
            linear_velocity: Vector3::ZERO,
            orientation: Orientation::default(),
            move_indicator: Vector3::ZERO,
            rotation_indicator: (0.0, 0.0),
            roll_indicator: 0.0,
        }
    }
}

impl SimShipController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Block for SimShipController {
    fn name(&self) -> &str {
        &self.name
    }
    fn subtype_id(&self) -> &str {
        &self.subtype_id
    }
}

impl ShipController for SimShipController {
    fn is_main_cockpit(&self) -> bool {
        self.main_cockpit
    }
    fn set_main_cockpit(&mut self, main: bool) {
        self.main_cockpit = main;
    }
    fn dampeners(&self) -> bool {
        self.dampeners
    }
    fn set_dampeners(&mut self, on: bool) {
        self.dampeners = on;
    }
    fn hand_brake(&self) -> bool {
        self.hand_brake
    }
    fn set_hand_brake(&mut self, on: bool) {
        self.hand_brake = on;
    }
    fn total_gravity(&self) -> Vector3 {
        self.gravity
    }
    fn ship_mass(&self) -> f64 {
        self.mass
    }
    fn ship_speed(&self) -> f64 {
        self.linear_velocity.length()
    }
    fn linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }
    fn orientation(&self) -> Orientation {
        self.orientation
    }
    fn move_indicator(&self) -> Vector3 {
        self.move_indicator
    }
    fn rotation_indicator(&self) -> (f64, f64) {
        self.rotation_indicator
    }
    fn roll_indicator(&self) -> f64 {
        self.roll_indicator
    }
}

impl Device for SimShipController {
    fn as_ship_controller(&mut self) -> Option<&mut (dyn ShipController + 'static)> {
        Some(self)
    }
}

/// A remote control: a ship controller with an autopilot and a waypoint list.
/// The autopilot flies toward the first waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimRemoteControl {
    pub controller: SimShipController,
    pub autopilot: bool,
    pub speed_limit: f64,
    pub docking_mode: bool,
    pub waypoints: Vec<Waypoint>,
}

impl Default for SimRemoteControl {
    fn default() -> Self {
        Self {
            controller: SimShipController {
                subtype_id: "LargeBlockRemoteControl".into(),
                ..SimShipController::default()
            },
            autopilot: false,
            speed_limit: 100.0,
            docking_mode: false,
            waypoints: Vec::new(),
        }
    }
}

impl SimRemoteControl {
    pub fn new(name: impl Into<String>) -> Self {
        let mut remote = Self::default();
        remote.controller.name = name.into();
        remote
    }
}

impl Block for SimRemoteControl {
    fn name(&self) -> &str {
        self.controller.name()
    }
    fn subtype_id(&self) -> &str {
        self.controller.subtype_id()
    }
}

impl ShipController for SimRemoteControl {
    fn is_main_cockpit(&self) -> bool {
        self.controller.is_main_cockpit()
    }
    fn set_main_cockpit(&mut self, main: bool) {
        self.controller.set_main_cockpit(main);
    }
    fn dampeners(&self) -> bool {
        self.controller.dampeners()
    }
    fn set_dampeners(&mut self, on: bool) {
        self.controller.set_dampeners(on);
    }
    fn hand_brake(&self) -> bool {
        self.controller.hand_brake()
    }
    fn set_hand_brake(&mut self, on: bool) {
        self.controller.set_hand_brake(on);
    }
    fn total_gravity(&self) -> Vector3 {
        self.controller.total_gravity()
    }
    fn ship_mass(&self) -> f64 {
        self.controller.ship_mass()
    }
    fn ship_speed(&self) -> f64 {
        self.controller.ship_speed()
    }
    fn linear_velocity(&self) -> Vector3 {
        self.controller.linear_velocity()
    }
    fn orientation(&self) -> Orientation {
        self.controller.orientation()
    }
    fn move_indicator(&self) -> Vector3 {
        self.controller.move_indicator()
    }
    fn rotation_indicator(&self) -> (f64, f64) {
        self.controller.rotation_indicator()
    }
    fn roll_indicator(&self) -> f64 {
        self.controller.roll_indicator()
    }
}

impl RemoteControl for SimRemoteControl {
    fn autopilot(&self) -> bool {
        self.autopilot
    }
    fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }
    fn speed_limit(&self) -> f64 {
        self.speed_limit
    }
    fn set_speed_limit(&mut self, value: f64) {
        self.speed_limit = value;
    }
    fn docking_mode(&self) -> bool {
        self.docking_mode
    }
    fn set_docking_mode(&mut self, on: bool) {
        self.docking_mode = on;
    }
    fn current_waypoint(&self) -> Option<Waypoint> {
        self.waypoints.first().cloned()
    }
    fn waypoints(&self) -> Vec<Waypoint> {
        self.waypoints.clone()
    }
    fn clear_waypoints(&mut self) {
        self.waypoints.clear();
    }
    fn add_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }
}

impl Device for SimRemoteControl {
    fn as_ship_controller(&mut self) -> Option<&mut (dyn ShipController + 'static)> {
        Some(self)
    }
    fn as_remote_control(&mut self) -> Option<&mut (dyn RemoteControl + 'static)> {
        Some(self)
    }
}
