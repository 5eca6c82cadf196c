use super::common::functional;
use crate::device::{Device, Light};
use crate::error::EngineError;
use crate::model::{BlockType, Color, Property, ReturnType};
use crate::registry::{DeviceHandler, PropertyHandler};

fn as_light(device: &mut dyn Device) -> Option<&mut (dyn Light + 'static)> {
    device.as_light()
}

pub fn light_handler() -> DeviceHandler<dyn Light> {
    functional(DeviceHandler::new(BlockType::Light, as_light))
        .add_property_handler(
            Property::Color,
            PropertyHandler::<dyn Light>::vector_with_set(
                |l| l.color().to_vector(),
                |l, v| {
                    let color = Color::from_vector(v)
                        .ok_or_else(|| EngineError::type_mismatch(ReturnType::Vector, v))?;
                    l.set_color(color);
                    Ok(())
                },
            ),
        )
        .add_numeric_handler(Property::Intensity, |l| l.intensity(), |l, v| l.set_intensity(v), 1.0)
        .add_numeric_handler(Property::Falloff, |l| l.falloff(), |l, v| l.set_falloff(v), 0.5)
        .add_numeric_handler(Property::Range, |l| l.radius(), |l, v| l.set_radius(v), 1.0)
        .add_numeric_handler(
            Property::BlinkInterval,
            |l| l.blink_interval(),
            |l, v| l.set_blink_interval(v),
            0.1,
        )
        .add_numeric_handler(
            Property::BlinkLength,
            |l| l.blink_length(),
            |l, v| l.set_blink_length(v),
            0.1,
        )
        .add_numeric_handler(
            Property::BlinkOffset,
            |l| l.blink_offset(),
            |l, v| l.set_blink_offset(v),
            0.1,
        )
        .default_for_type(ReturnType::Vector, Property::Color)
        .default_for_type(ReturnType::String, Property::Color)
        .default_for_type(ReturnType::Numeric, Property::Intensity)
}
