//! Rotors and hinges share one handler; the selection filter tells them apart.

use super::common::functional;
use crate::device::{Device, Rotor};
use crate::error::Result;
use crate::model::{BlockType, Direction, Primitive, Property, ReturnType};
use crate::registry::{DeviceHandler, PropertyHandler};

/// Degrees added by a bare "rotate".
const ANGLE_STEP: f64 = 10.0;
const RANGE_STEP: f64 = 10.0;

fn as_rotor(device: &mut dyn Device) -> Option<&mut (dyn Rotor + 'static)> {
    device.as_rotor()
}

pub fn rotor_handler() -> DeviceHandler<dyn Rotor> {
    motor_handler(BlockType::Rotor).with_filter(|r| !r.is_hinge())
}

pub fn hinge_handler() -> DeviceHandler<dyn Rotor> {
    motor_handler(BlockType::Hinge).with_filter(|r| r.is_hinge())
}

fn motor_handler(block_type: BlockType) -> DeviceHandler<dyn Rotor> {
    functional(DeviceHandler::new(block_type, as_rotor))
        .add_property_handler(Property::Angle, angle_handler())
        .add_direction_handlers(
            Property::Range,
            Direction::Up,
            vec![
                (
                    PropertyHandler::<dyn Rotor>::numeric(
                        |r| r.upper_limit(),
                        |r, v| r.set_upper_limit(v),
                        RANGE_STEP,
                    ),
                    &[Direction::Up, Direction::Forward, Direction::Clockwise][..],
                ),
                (
                    PropertyHandler::<dyn Rotor>::numeric(
                        |r| r.lower_limit(),
                        |r, v| r.set_lower_limit(v),
                        RANGE_STEP,
                    ),
                    &[Direction::Down, Direction::Backward, Direction::Counterclockwise][..],
                ),
            ],
        )
        .add_numeric_handler(Property::Velocity, |r| r.velocity(), |r, v| r.set_velocity(v), 1.0)
        .add_numeric_handler(Property::Level, |r| r.displacement(), |r, v| r.set_displacement(v), 0.1)
        .add_boolean_handler(
            Property::Connected,
            |r| r.is_attached(),
            |r, attach| {
                if attach {
                    r.attach();
                } else {
                    r.detach();
                }
            },
        )
        .add_boolean_handler(Property::Locked, |r| r.is_locked(), |r, v| r.set_locked(v))
        .add_numeric_handler(Property::Strength, |r| r.torque(), |r, v| r.set_torque(v), 1000.0)
        .default_for_type(ReturnType::Numeric, Property::Angle)
        .default_for_direction(Direction::Up, Property::Level)
        .default_for_direction(Direction::Down, Property::Level)
        .default_for_direction(Direction::Clockwise, Property::Angle)
        .default_for_direction(Direction::Counterclockwise, Property::Angle)
        .default_direction(Direction::Clockwise)
}

// ── Angle ────────────────────────────────────────────────────────

fn angle_handler() -> PropertyHandler<dyn Rotor> {
    PropertyHandler::<dyn Rotor>::default()
        .with_get(|r| Ok(Primitive::Numeric(angle_degrees(r))))
        .with_get_direction(|r, _| Ok(Primitive::Numeric(angle_degrees(r))))
        .with_set(|r, value| {
            rotate_to(r, value.cast_number()?);
            Ok(())
        })
        .with_set_direction(|r, direction, value| {
            rotate_toward(r, value.cast_number()?, direction);
            Ok(())
        })
        .with_increment_value_direction(|r, direction, value| increment_angle(r, direction, value))
        .with_increment_value(|r, value| increment_angle(r, Direction::Clockwise, value))
        .with_increment(|r| increment_angle(r, Direction::Clockwise, &Primitive::Numeric(ANGLE_STEP)))
        .with_move(|r, direction| {
            match direction {
                Direction::Clockwise => r.set_velocity(r.velocity().abs()),
                Direction::Counterclockwise => r.set_velocity(-r.velocity().abs()),
                _ => {}
            }
            Ok(())
        })
        .with_reverse(|r| {
            r.set_velocity(-r.velocity());
            Ok(())
        })
        .with_step(ANGLE_STEP)
}

fn increment_angle(rotor: &mut dyn Rotor, direction: Direction, value: &Primitive) -> Result<()> {
    let delta = value.cast_number()?;
    let current = angle_degrees(rotor);
    match direction {
        Direction::Clockwise | Direction::Up => rotate_toward(rotor, current + delta, direction),
        Direction::Counterclockwise | Direction::Down => rotate_toward(rotor, current - delta, direction),
        _ => {}
    }
    Ok(())
}

/// Hosts report the angle in radians; limits and targets are in degrees.
fn angle_degrees(rotor: &dyn Rotor) -> f64 {
    rotor.angle().to_degrees()
}

/// Fold an angle outside [-360, 360] back into that range, keeping its sign.
pub fn correct_angle(angle: f64) -> f64 {
    if angle > 360.0 {
        angle % 360.0
    } else if angle < -360.0 {
        -((-angle) % 360.0)
    } else {
        angle
    }
}

/// Rotate to `target` degrees in whichever sense the corrected target lies
/// from the current angle.
fn rotate_to(rotor: &mut dyn Rotor, target: f64) {
    let corrected = correct_angle(target);
    if angle_degrees(rotor) < corrected {
        rotor.set_upper_limit(corrected);
        rotor.set_velocity(rotor.velocity().abs());
    } else {
        rotor.set_lower_limit(corrected);
        rotor.set_velocity(-rotor.velocity().abs());
    }
}

/// Rotate to `target` degrees, going the long way round when the target lies
/// behind the current angle in the requested sense.
fn rotate_toward(rotor: &mut dyn Rotor, target: f64, direction: Direction) {
    let mut value = correct_angle(target);
    let current = angle_degrees(rotor);
    match direction {
        Direction::Clockwise => {
            if value < current {
                value = correct_angle(value + 360.0);
            }
            rotor.set_upper_limit(value);
            rotor.set_velocity(rotor.velocity().abs());
        }
        Direction::Counterclockwise => {
            if value > current {
                value = correct_angle(value - 360.0);
            }
            rotor.set_lower_limit(value);
            rotor.set_velocity(-rotor.velocity().abs());
        }
        _ => rotate_to(rotor, target),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::{Instruction, Selector};
    use crate::engine::Engine;
    use crate::error::EngineError;
    use crate::model::Operation;
    use crate::registry::{BlockHandler, HandlerRegistry};
    use crate::sim::{SimRotor, SimWorld};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rotor_at(angle: f64, velocity: f64) -> SimRotor {
        let mut r = SimRotor::rotor("arm");
        r.angle = angle;
        r.velocity = velocity;
        r
    }

    #[test]
    fn correction_stays_in_range() {
        for a in [-1000.0, -721.5, -360.0, -10.0, 0.0, 90.0, 360.0, 361.0, 725.0, 9999.0] {
            let c = correct_angle(a);
            assert!((-360.0..=360.0).contains(&c), "{a} -> {c}");
        }
        for a in [-360.0, -45.0, 0.0, 180.0, 360.0] {
            assert!(approx(correct_angle(a), a));
        }
        assert!(approx(correct_angle(450.0), 90.0));
        assert!(approx(correct_angle(-450.0), -90.0));
    }

    #[test]
    fn clockwise_to_lower_target_wraps() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(100.0, -3.0);
        handler
            .apply(&mut rotor, Operation::Set, Property::Angle, Some(Direction::Clockwise), Some(&Primitive::Numeric(90.0)))
            .unwrap();
        assert!(approx(rotor.upper_limit, 90.0));
        assert!(approx(rotor.velocity, 3.0));
    }

    #[test]
    fn counterclockwise_to_higher_target_wraps() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(10.0, 2.0);
        handler
            .apply(
                &mut rotor,
                Operation::Set,
                Property::Angle,
                Some(Direction::Counterclockwise),
                Some(&Primitive::Numeric(30.0)),
            )
            .unwrap();
        assert!(approx(rotor.lower_limit, -330.0));
        assert!(approx(rotor.velocity, -2.0));
    }

    #[test]
    fn undirected_set_picks_sense_from_corrected_target() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(100.0, 1.0);
        handler
            .apply(&mut rotor, Operation::Set, Property::Angle, None, Some(&Primitive::Numeric(450.0)))
            .unwrap();
        // 450 folds to 90, which is behind 100, so the lower limit moves.
        assert!(approx(rotor.lower_limit, 90.0));
        assert!(approx(rotor.upper_limit, 360.0));
        assert!(approx(rotor.velocity, -1.0));

        handler
            .apply(&mut rotor, Operation::Set, Property::Angle, None, Some(&Primitive::Numeric(200.0)))
            .unwrap();
        assert!(approx(rotor.upper_limit, 200.0));
        assert!(approx(rotor.velocity, 1.0));
    }

    #[test]
    fn get_reports_degrees() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(135.0, 1.0);
        assert!(approx(rotor.angle(), 135.0_f64.to_radians()));
        let value = handler
            .apply(&mut rotor, Operation::Get, Property::Angle, None, None)
            .unwrap()
            .unwrap();
        assert!(approx(value.cast_number().unwrap(), 135.0));
    }

    #[test]
    fn direction_without_default_is_unresolved() {
        let mut world = SimWorld::default();
        world.add_rotor(SimRotor::rotor("base"));
        let engine = Engine::new(Arc::new(HandlerRegistry::standard()));
        let err = engine
            .execute(
                &mut world,
                &Instruction::set(Selector::single(BlockType::Rotor, "base"), 45.0)
                    .with_direction(Direction::Left),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::UnresolvedProperty { block_type: BlockType::Rotor });
        assert_eq!(world.rotor("base").unwrap(), &SimRotor::rotor("base"));
    }

    #[test]
    fn rotate_clockwise_by_value() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(350.0, 1.0);
        handler
            .apply(
                &mut rotor,
                Operation::Increment,
                Property::Angle,
                Some(Direction::Clockwise),
                Some(&Primitive::Numeric(20.0)),
            )
            .unwrap();
        // 370 folds to 10, which is behind 350 clockwise, so it wraps once more.
        assert!(approx(rotor.upper_limit, 10.0));
        assert!(approx(rotor.velocity, 1.0));
    }

    #[test]
    fn bare_increment_rotates_ten_clockwise() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(40.0, -1.0);
        handler
            .apply(&mut rotor, Operation::Increment, Property::Angle, None, None)
            .unwrap();
        assert!(approx(rotor.upper_limit, 50.0));
        assert!(approx(rotor.velocity, 1.0));
    }

    #[test]
    fn non_numeric_angle_writes_nothing() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(40.0, 1.0);
        let before = rotor.clone();
        let err = handler
            .apply(&mut rotor, Operation::Set, Property::Angle, None, Some(&"north".into()))
            .unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { .. }));
        assert_eq!(rotor, before);
    }

    #[test]
    fn move_and_reverse_touch_velocity_sign() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(0.0, 5.0);
        handler
            .apply(&mut rotor, Operation::Move, Property::Angle, Some(Direction::Counterclockwise), None)
            .unwrap();
        assert!(approx(rotor.velocity, -5.0));
        handler
            .apply(&mut rotor, Operation::Move, Property::Angle, None, None)
            .unwrap();
        assert!(approx(rotor.velocity, 5.0));
        handler
            .apply(&mut rotor, Operation::Reverse, Property::Angle, None, None)
            .unwrap();
        assert!(approx(rotor.velocity, -5.0));
    }

    #[test]
    fn range_partition() {
        let handler = rotor_handler();
        let mut rotor = rotor_at(0.0, 1.0);
        handler
            .apply(&mut rotor, Operation::Set, Property::Range, Some(Direction::Down), Some(&Primitive::Numeric(-45.0)))
            .unwrap();
        handler
            .apply(&mut rotor, Operation::Set, Property::Range, Some(Direction::Forward), Some(&Primitive::Numeric(45.0)))
            .unwrap();
        handler
            .apply(&mut rotor, Operation::Increment, Property::Range, None, None)
            .unwrap();
        assert!(approx(rotor.lower_limit, -45.0));
        assert!(approx(rotor.upper_limit, 55.0));
    }

    #[test]
    fn resolution_defaults() {
        let handler = rotor_handler();
        assert_eq!(handler.resolve(None, None, Some(ReturnType::Numeric)), Ok(Property::Angle));
        assert_eq!(handler.resolve(None, None, Some(ReturnType::Boolean)), Ok(Property::Power));
        assert_eq!(
            handler.resolve(None, Some(Direction::Up), Some(ReturnType::Numeric)),
            Ok(Property::Level)
        );
        assert_eq!(
            handler.resolve(None, Some(Direction::Counterclockwise), None),
            Ok(Property::Angle)
        );
        // LEFT has no direction default, and the numeric default is not consulted.
        assert_eq!(
            handler.resolve(None, Some(Direction::Left), Some(ReturnType::Numeric)),
            Err(EngineError::UnresolvedProperty { block_type: BlockType::Rotor })
        );
        assert_eq!(
            handler.resolve(None, None, Some(ReturnType::Vector)),
            Err(EngineError::UnresolvedProperty { block_type: BlockType::Rotor })
        );
    }

    #[test]
    fn group_selection_respects_hinge_filter() {
        let mut world = SimWorld::default();
        world.add_rotor(SimRotor::rotor("base"));
        world.add_rotor(SimRotor::hinge("elbow"));
        world.add_rotor(SimRotor::rotor("wrist"));
        world.add_group("arm", &["base", "elbow", "wrist"]);

        let registry = HandlerRegistry::standard();
        let rotors = registry
            .handler(BlockType::Rotor)
            .unwrap()
            .select_instances(&mut world, &Selector::group(BlockType::Rotor, "arm"))
            .unwrap();
        let hinges = registry
            .handler(BlockType::Hinge)
            .unwrap()
            .select_instances(&mut world, &Selector::group(BlockType::Hinge, "arm"))
            .unwrap();
        assert_eq!(rotors, vec![world.id_of("base").unwrap(), world.id_of("wrist").unwrap()]);
        assert_eq!(hinges, vec![world.id_of("elbow").unwrap()]);

        let second = registry
            .handler(BlockType::Rotor)
            .unwrap()
            .select_instances(&mut world, &Selector::group(BlockType::Rotor, "arm").at(1))
            .unwrap();
        assert_eq!(second, vec![world.id_of("wrist").unwrap()]);
    }

    #[test]
    fn rotate_group_clockwise_to_ninety() {
        let mut world = SimWorld::default();
        let mut base = SimRotor::rotor("base");
        base.angle = 100.0;
        base.velocity = -2.0;
        world.add_rotor(base);
        world.add_rotor(SimRotor::hinge("elbow"));
        world.add_group("arm", &["base", "elbow"]);

        let engine = Engine::new(Arc::new(HandlerRegistry::standard()));
        engine
            .execute(
                &mut world,
                &Instruction::set(Selector::group(BlockType::Rotor, "arm"), 90.0)
                    .with_direction(Direction::Clockwise),
            )
            .unwrap();

        let base = world.rotor("base").unwrap();
        assert!(approx(base.upper_limit, 90.0));
        assert!(approx(base.velocity, 2.0));
        // The hinge is filtered out of a rotor selection.
        assert_eq!(world.rotor("elbow").unwrap(), &SimRotor::hinge("elbow"));
    }
}
