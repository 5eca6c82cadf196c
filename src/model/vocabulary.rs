//! Closed symbolic vocabularies shared by the parameter model, the handlers, and the CLI.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declares a closed enumeration with a lowercase display name per variant.
/// Serde uses SCREAMING_SNAKE_CASE; `FromStr` accepts either spelling.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, JsonSchema,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, String> {
                let wanted = s.trim().replace([' ', '-'], "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(&wanted))
                    .ok_or_else(|| format!("Unknown {}: {s}", stringify!($name)))
            }
        }
    };
}

vocabulary! {
    /// The symbolic capability an instruction addresses, independent of device type.
    Property {
        Power => "power",
        Color => "color",
        Intensity => "intensity",
        Falloff => "falloff",
        BlinkInterval => "blink_interval",
        BlinkLength => "blink_length",
        BlinkOffset => "blink_offset",
        Angle => "angle",
        Range => "range",
        Velocity => "velocity",
        Level => "level",
        Connected => "connected",
        Locked => "locked",
        Strength => "strength",
        Target => "target",
        Waypoints => "waypoints",
        Auto => "auto",
        Run => "run",
        Override => "override",
        Enable => "enable",
        Input => "input",
        RollInput => "roll_input",
    }
}

vocabulary! {
    /// Spatial or rotational qualifier refining which axis or sense of a property is meant.
    Direction {
        Up => "up",
        Down => "down",
        Left => "left",
        Right => "right",
        Forward => "forward",
        Backward => "backward",
        Clockwise => "clockwise",
        Counterclockwise => "counterclockwise",
        None => "none",
    }
}

impl Direction {
    /// Whether this direction decreases a signed quantity. NONE and the positive
    /// senses (UP, RIGHT, FORWARD, CLOCKWISE) do not.
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            Direction::Down | Direction::Left | Direction::Backward | Direction::Counterclockwise
        )
    }

    /// Apply this direction's sense to a magnitude.
    pub fn signed(self, magnitude: f64) -> f64 {
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

vocabulary! {
    /// Device categories with a registered handler.
    BlockType {
        Light => "light",
        Rotor => "rotor",
        Hinge => "hinge",
        Cockpit => "cockpit",
        Remote => "remote",
    }
}

vocabulary! {
    /// Tag of a [`Primitive`](super::Primitive); keyed lists share the LIST tag.
    ReturnType {
        Numeric => "numeric",
        Boolean => "boolean",
        String => "string",
        Vector => "vector",
        List => "list",
    }
}

vocabulary! {
    /// Unit qualifier attached to a numeric literal.
    UnitType {
        Seconds => "seconds",
        Ticks => "ticks",
        Degrees => "degrees",
        Radians => "radians",
        Meters => "meters",
        Rpm => "rpm",
    }
}

/// Game ticks per second, used to express tick counts in seconds.
pub const TICKS_PER_SECOND: f64 = 60.0;

impl UnitType {
    /// Convert a value in this unit into the unit the handlers work in
    /// (degrees for angles, seconds for time).
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            UnitType::Radians => value.to_degrees(),
            UnitType::Ticks => value / TICKS_PER_SECOND,
            UnitType::Seconds | UnitType::Degrees | UnitType::Meters | UnitType::Rpm => value,
        }
    }
}

vocabulary! {
    /// Program-level control verbs, consumed by the execution engine.
    ControlType {
        Start => "start",
        Restart => "restart",
        Stop => "stop",
        Parse => "parse",
        Loop => "loop",
        Pause => "pause",
        Resume => "resume",
        Repeat => "repeat",
        Exit => "exit",
    }
}

vocabulary! {
    /// Function-call verbs, consumed by the execution engine.
    FunctionType {
        Goto => "goto",
        Gosub => "gosub",
        Switch => "switch",
    }
}

vocabulary! {
    ComparisonType {
        Less => "less",
        LessOrEqual => "less_or_equal",
        Equal => "equal",
        NotEqual => "not_equal",
        GreaterOrEqual => "greater_or_equal",
        Greater => "greater",
    }
}

vocabulary! {
    /// How per-device condition results fold into one answer.
    AggregationMode {
        All => "all",
        Any => "any",
        None => "none",
    }
}

impl AggregationMode {
    /// Fold per-device results. An empty selection satisfies ALL and NONE, not ANY.
    pub fn aggregate(self, results: impl IntoIterator<Item = bool>) -> bool {
        let mut results = results.into_iter();
        match self {
            AggregationMode::All => results.all(|r| r),
            AggregationMode::Any => results.any(|r| r),
            AggregationMode::None => !results.any(|r| r),
        }
    }
}

vocabulary! {
    /// Operation slots a property handler may fill.
    HandlerSlot {
        Get => "get",
        GetDirection => "get_direction",
        Set => "set",
        SetDirection => "set_direction",
        Increment => "increment",
        IncrementValue => "increment_value",
        IncrementValueDirection => "increment_value_direction",
        Move => "move",
        Reverse => "reverse",
    }
}

vocabulary! {
    /// The verb an instruction performs once its property is resolved.
    Operation {
        Get => "get",
        Set => "set",
        Increment => "increment",
        Move => "move",
        Reverse => "reverse",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_and_serde_spellings() {
        assert_eq!("blink_interval".parse::<Property>().unwrap(), Property::BlinkInterval);
        assert_eq!("ROLL_INPUT".parse::<Property>().unwrap(), Property::RollInput);
        assert_eq!("roll input".parse::<Property>().unwrap(), Property::RollInput);
        assert!("banana".parse::<Property>().is_err());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Direction::Counterclockwise).unwrap();
        assert_eq!(json, "\"COUNTERCLOCKWISE\"");
        let back: Property = serde_json::from_str("\"BLINK_OFFSET\"").unwrap();
        assert_eq!(back, Property::BlinkOffset);
    }

    #[test]
    fn direction_signs() {
        for d in [Direction::Up, Direction::Clockwise, Direction::Forward, Direction::Right, Direction::None] {
            assert!((d.signed(2.0) - 2.0).abs() < f64::EPSILON, "{d} should be positive");
        }
        for d in [Direction::Down, Direction::Counterclockwise, Direction::Backward, Direction::Left] {
            assert!((d.signed(2.0) + 2.0).abs() < f64::EPSILON, "{d} should be negative");
        }
    }

    #[test]
    fn unit_normalization() {
        assert!((UnitType::Radians.normalize(std::f64::consts::PI) - 180.0).abs() < 1e-9);
        assert!((UnitType::Ticks.normalize(120.0) - 2.0).abs() < 1e-9);
        assert!((UnitType::Degrees.normalize(45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn aggregation_modes() {
        assert!(AggregationMode::All.aggregate([true, true]));
        assert!(!AggregationMode::All.aggregate([true, false]));
        assert!(AggregationMode::Any.aggregate([false, true]));
        assert!(AggregationMode::None.aggregate([false, false]));
        assert!(AggregationMode::All.aggregate([]));
        assert!(!AggregationMode::Any.aggregate([]));
    }
}
