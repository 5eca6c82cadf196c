use crate::device::{Device, RemoteControl, ShipController, Waypoint};
use crate::error::{EngineError, Result};
use crate::model::{BlockType, Direction, KeyedValue, Primitive, Property, ReturnType, Vector3};
use crate::registry::{DeviceHandler, PropertyHandler};

const SPEED_LIMIT_STEP: f64 = 10.0;

fn as_ship_controller(device: &mut dyn Device) -> Option<&mut (dyn ShipController + 'static)> {
    device.as_ship_controller()
}

fn as_remote_control(device: &mut dyn Device) -> Option<&mut (dyn RemoteControl + 'static)> {
    device.as_remote_control()
}

pub fn cockpit_handler() -> DeviceHandler<dyn ShipController> {
    controller_properties(DeviceHandler::new(BlockType::Cockpit, as_ship_controller))
}

pub fn remote_control_handler() -> DeviceHandler<dyn RemoteControl> {
    let autopilot = PropertyHandler::<dyn RemoteControl>::boolean(|r| r.autopilot(), |r, on| r.set_autopilot(on));
    let speed = PropertyHandler::<dyn RemoteControl>::numeric(
        |r| r.ship_speed(),
        |r, v| r.set_speed_limit(v),
        1.0,
    );

    controller_properties(DeviceHandler::new(BlockType::Remote, as_remote_control))
        .add_property_handler(Property::Auto, autopilot.clone())
        .add_property_handler(Property::Run, autopilot)
        .add_numeric_handler(
            Property::Range,
            |r| r.speed_limit(),
            |r, v| r.set_speed_limit(v),
            SPEED_LIMIT_STEP,
        )
        .add_boolean_handler(Property::Connected, |r| r.docking_mode(), |r, on| r.set_docking_mode(on))
        .add_property_handler(
            Property::Target,
            PropertyHandler::<dyn RemoteControl>::vector(|r| {
                r.current_waypoint().map_or(Vector3::ZERO, |w| w.coords)
            })
            .with_set(|r, value| set_waypoints(r, &[KeyedValue::new(None, value.clone())])),
        )
        .add_property_handler(
            Property::Waypoints,
            PropertyHandler::<dyn RemoteControl>::list(
                |r| {
                    r.waypoints()
                        .into_iter()
                        .map(|w| KeyedValue::new(Some(w.name), Primitive::Vector(w.coords)))
                        .collect()
                },
                |r, entries| set_waypoints(r, &entries),
            ),
        )
        .add_property_handler(Property::Velocity, velocity_handler(speed))
        .default_for_type(ReturnType::Vector, Property::Target)
        .default_for_type(ReturnType::List, Property::Waypoints)
        .default_for_type(ReturnType::Boolean, Property::Auto)
}

/// Replace the waypoint list. Unnamed entries are numbered from 1. Every
/// entry is checked before the old list is cleared.
fn set_waypoints(remote: &mut dyn RemoteControl, entries: &[KeyedValue]) -> Result<()> {
    let waypoints = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Ok(Waypoint {
                name: entry
                    .key
                    .clone()
                    .unwrap_or_else(|| format!("Waypoint {}", i + 1)),
                coords: entry.value.cast_vector()?,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    remote.clear_waypoints();
    for waypoint in waypoints {
        remote.add_waypoint(waypoint);
    }
    Ok(())
}

/// Properties every ship controller has, remote controls included.
fn controller_properties<T: ShipController + ?Sized + 'static>(handler: DeviceHandler<T>) -> DeviceHandler<T> {
    let dampeners = PropertyHandler::<T>::boolean(|c| c.dampeners(), |c, on| c.set_dampeners(on));
    let speed = PropertyHandler::<T>::numeric_read_only(|c| c.ship_speed());

    handler
        .add_boolean_handler(Property::Enable, |c| c.is_main_cockpit(), |c, on| c.set_main_cockpit(on))
        .add_property_handler(Property::Override, dampeners.clone())
        .add_property_handler(Property::Auto, dampeners)
        .add_boolean_handler(Property::Locked, |c| c.hand_brake(), |c, on| c.set_hand_brake(on))
        .add_vector_handler(Property::Strength, |c| c.total_gravity())
        .add_property_handler(
            Property::Level,
            PropertyHandler::<T>::numeric_read_only(|c| c.ship_mass()),
        )
        .add_property_handler(Property::Velocity, velocity_handler(speed))
        .add_property_handler(Property::Input, input_handler())
        .add_property_handler(Property::RollInput, roll_input_handler())
        .default_for_type(ReturnType::Boolean, Property::Enable)
        .default_for_type(ReturnType::Numeric, Property::Velocity)
        .default_for_direction(Direction::Up, Property::Velocity)
}

/// Overall speed without a direction, signed components of the local
/// velocity with one.
fn velocity_handler<T: ShipController + ?Sized + 'static>(speed: PropertyHandler<T>) -> PropertyHandler<T> {
    PropertyHandler::by_direction(
        Direction::None,
        vec![
            (speed, &[Direction::None][..]),
            (axis(|c: &T| c.local_velocity().y), &[Direction::Up][..]),
            (axis(|c: &T| -c.local_velocity().y), &[Direction::Down][..]),
            (axis(|c: &T| -c.local_velocity().x), &[Direction::Left][..]),
            (axis(|c: &T| c.local_velocity().x), &[Direction::Right][..]),
            (axis(|c: &T| -c.local_velocity().z), &[Direction::Forward][..]),
            (axis(|c: &T| c.local_velocity().z), &[Direction::Backward][..]),
        ],
    )
}

fn input_handler<T: ShipController + ?Sized + 'static>() -> PropertyHandler<T> {
    PropertyHandler::by_direction(
        Direction::None,
        vec![
            (PropertyHandler::<T>::vector(|c| c.move_indicator()), &[Direction::None][..]),
            (axis(|c: &T| c.move_indicator().y), &[Direction::Up][..]),
            (axis(|c: &T| -c.move_indicator().y), &[Direction::Down][..]),
            (axis(|c: &T| -c.move_indicator().x), &[Direction::Left][..]),
            (axis(|c: &T| c.move_indicator().x), &[Direction::Right][..]),
            (axis(|c: &T| -c.move_indicator().z), &[Direction::Forward][..]),
            (axis(|c: &T| c.move_indicator().z), &[Direction::Backward][..]),
        ],
    )
}

/// Pitch and yaw from the rotation indicator, roll from the roll indicator.
fn roll_input_handler<T: ShipController + ?Sized + 'static>() -> PropertyHandler<T> {
    PropertyHandler::by_direction(
        Direction::None,
        vec![
            (
                PropertyHandler::<T>::vector(|c| {
                    let (pitch, yaw) = c.rotation_indicator();
                    Vector3::new(pitch, yaw, c.roll_indicator())
                }),
                &[Direction::None][..],
            ),
            (axis(|c: &T| -c.rotation_indicator().0), &[Direction::Up][..]),
            (axis(|c: &T| c.rotation_indicator().0), &[Direction::Down][..]),
            (axis(|c: &T| -c.rotation_indicator().1), &[Direction::Left][..]),
            (axis(|c: &T| c.rotation_indicator().1), &[Direction::Right][..]),
            (axis(|c: &T| -c.roll_indicator()), &[Direction::Counterclockwise][..]),
            (axis(|c: &T| c.roll_indicator()), &[Direction::Clockwise][..]),
        ],
    )
}

fn axis<T: ?Sized + 'static>(get: impl Fn(&T) -> f64 + Send + Sync + 'static) -> PropertyHandler<T> {
    PropertyHandler::numeric_read_only(get)
}
