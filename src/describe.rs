use crate::device::Block;
use crate::registry::catalog::CatalogEntry;
use crate::sim::{SimDevice, SimWorld};

/// Human-readable summary of a world: every device with its key state, then
/// the groups.
pub fn describe_world(world: &SimWorld) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Devices ({})", world.devices.len()));
    for (i, device) in world.devices.iter().enumerate() {
        lines.push(format!("  [{i}] {} ({}, {})", device.name(), device.kind(), device.subtype_id()));
        lines.push(format!("      {}", device_state(device)));
    }

    if !world.groups.is_empty() {
        lines.push(format!("\nGroups ({})", world.groups.len()));
        for (name, members) in &world.groups {
            lines.push(format!("  - {name}: {}", members.join(", ")));
        }
    }

    lines.join("\n")
}

fn device_state(device: &SimDevice) -> String {
    match device {
        SimDevice::Light(l) => format!(
            "{} color {} intensity {} range {}",
            on_off(l.enabled),
            l.color,
            l.intensity,
            l.radius
        ),
        SimDevice::Rotor(r) => format!(
            "{} angle {} limits {}..{} velocity {}{}",
            on_off(r.enabled),
            r.angle,
            r.lower_limit,
            r.upper_limit,
            r.velocity,
            if r.attached { "" } else { " (detached)" }
        ),
        SimDevice::Cockpit(c) => format!(
            "velocity {} dampeners {} hand brake {}",
            c.linear_velocity,
            on_off(c.dampeners),
            on_off(c.hand_brake)
        ),
        SimDevice::Remote(r) => format!(
            "autopilot {} speed limit {} waypoints [{}]",
            on_off(r.autopilot),
            r.speed_limit,
            join(r.waypoints.iter().map(|w| format!("{} {}", w.name, w.coords)), ", ")
        ),
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Human-readable listing of registered block types: properties with their
/// operations and steps, then default tables.
pub fn describe_catalog(entries: &[CatalogEntry]) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        lines.push(format!(
            "{} (moves {} by default)",
            entry.block_type, entry.default_direction
        ));
        for p in &entry.properties {
            let ops = join(p.operations.iter().map(ToString::to_string), ", ");
            match p.step {
                Some(step) => lines.push(format!("  {}: {ops} (step {step})", p.property)),
                None => lines.push(format!("  {}: {ops}", p.property)),
            }
        }
        if !entry.defaults_by_type.is_empty() {
            let defaults = join(entry.defaults_by_type.iter().map(|(t, p)| format!("{t} -> {p}")), ", ");
            lines.push(format!("  by value type: {defaults}"));
        }
        if !entry.defaults_by_direction.is_empty() {
            let defaults = join(
                entry.defaults_by_direction.iter().map(|(d, p)| format!("{d} -> {p}")),
                ", ",
            );
            lines.push(format!("  by direction: {defaults}"));
        }
    }
    lines.join("\n")
}

fn join(items: impl Iterator<Item = String>, sep: &str) -> String {
    items.collect::<Vec<_>>().join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::catalog::catalog;
    use crate::registry::HandlerRegistry;
    use crate::sim::{SimLight, SimRotor};

    #[test]
    fn world_lists_devices_and_groups() {
        let mut world = SimWorld::default();
        world.add_light(SimLight::new("lamp"));
        world.add_rotor(SimRotor::hinge("door"));
        world.add_group("all", &["lamp", "door"]);

        let text = describe_world(&world);
        assert!(text.contains("Devices (2)"));
        assert!(text.contains("[0] lamp (light, SmallLight)"));
        assert!(text.contains("on color 255:255:255 intensity 1"));
        assert!(text.contains("[1] door (hinge, LargeHinge)"));
        assert!(text.contains("- all: lamp, door"));
    }

    #[test]
    fn catalog_text_shows_steps_and_defaults() {
        let text = describe_catalog(&catalog(&HandlerRegistry::standard()));
        assert!(text.contains("light (moves up by default)"));
        assert!(text.contains("  intensity: get, set, increment"));
        assert!(text.contains("(step 1)"));
        assert!(text.contains("numeric -> angle"));
        assert!(text.contains("clockwise -> angle"));
    }
}
