use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Color, ComparisonType, ReturnType, Vector3};
use crate::error::{EngineError, Result};

/// A typed value flowing between instructions and devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Primitive {
    Numeric(f64),
    Boolean(bool),
    String(String),
    Vector(Vector3),
    List(Vec<Primitive>),
    KeyedList(Vec<KeyedValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: Primitive,
}

impl KeyedValue {
    pub fn new(key: Option<String>, value: Primitive) -> Self {
        Self { key, value }
    }
}

impl Primitive {
    pub fn return_type(&self) -> ReturnType {
        match self {
            Primitive::Numeric(_) => ReturnType::Numeric,
            Primitive::Boolean(_) => ReturnType::Boolean,
            Primitive::String(_) => ReturnType::String,
            Primitive::Vector(_) => ReturnType::Vector,
            Primitive::List(_) | Primitive::KeyedList(_) => ReturnType::List,
        }
    }

    fn mismatch(&self, expected: ReturnType) -> EngineError {
        EngineError::type_mismatch(expected, self)
    }

    pub fn cast_number(&self) -> Result<f64> {
        match self {
            Primitive::Numeric(n) => Ok(*n),
            other => Err(other.mismatch(ReturnType::Numeric)),
        }
    }

    pub fn cast_boolean(&self) -> Result<bool> {
        match self {
            Primitive::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ReturnType::Boolean)),
        }
    }

    /// Every value has a string form.
    pub fn cast_string(&self) -> String {
        match self {
            Primitive::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Vectors pass through; strings are read as color triplets or color names.
    pub fn cast_vector(&self) -> Result<Vector3> {
        match self {
            Primitive::Vector(v) => Ok(*v),
            Primitive::String(s) => Color::parse(s)
                .map(Color::to_vector)
                .ok_or_else(|| self.mismatch(ReturnType::Vector)),
            other => Err(other.mismatch(ReturnType::Vector)),
        }
    }

    pub fn cast_list(&self) -> Result<Vec<Primitive>> {
        match self {
            Primitive::List(items) => Ok(items.clone()),
            Primitive::KeyedList(items) => Ok(items.iter().map(|kv| kv.value.clone()).collect()),
            other => Err(other.mismatch(ReturnType::List)),
        }
    }

    /// Plain lists become keyed lists with no keys.
    pub fn cast_keyed_list(&self) -> Result<Vec<KeyedValue>> {
        match self {
            Primitive::KeyedList(items) => Ok(items.clone()),
            Primitive::List(items) => Ok(items
                .iter()
                .map(|v| KeyedValue::new(None, v.clone()))
                .collect()),
            other => Err(other.mismatch(ReturnType::List)),
        }
    }
}

impl From<f64> for Primitive {
    fn from(n: f64) -> Self {
        Primitive::Numeric(n)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Boolean(b)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl From<Vector3> for Primitive {
    fn from(v: Vector3) -> Self {
        Primitive::Vector(v)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Numeric(n) => write!(f, "{n}"),
            Primitive::Boolean(b) => write!(f, "{b}"),
            Primitive::String(s) => f.write_str(s),
            Primitive::Vector(v) => write!(f, "{v}"),
            Primitive::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Primitive::KeyedList(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match &item.key {
                        Some(key) => write!(f, "{key}->{}", item.value)?,
                        None => write!(f, "{}", item.value)?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl ComparisonType {
    /// Ordering comparisons need two numbers; equality works on any pair, reading a
    /// string against a vector as a color.
    pub fn compare(self, actual: &Primitive, expected: &Primitive) -> Result<bool> {
        match self {
            ComparisonType::Equal => values_equal(actual, expected),
            ComparisonType::NotEqual => values_equal(actual, expected).map(|eq| !eq),
            ordering => {
                let a = actual.cast_number()?;
                let b = expected.cast_number()?;
                Ok(match ordering {
                    ComparisonType::Less => a < b,
                    ComparisonType::LessOrEqual => a <= b,
                    ComparisonType::GreaterOrEqual => a >= b,
                    _ => a > b,
                })
            }
        }
    }
}

fn values_equal(a: &Primitive, b: &Primitive) -> Result<bool> {
    match (a, b) {
        (Primitive::Vector(_), Primitive::String(_)) | (Primitive::String(_), Primitive::Vector(_)) => {
            Ok(a.cast_vector()? == b.cast_vector()?)
        }
        _ => Ok(a == b),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cast_number_only_accepts_numeric() {
        assert!((Primitive::Numeric(3.5).cast_number().unwrap() - 3.5).abs() < f64::EPSILON);
        let err = Primitive::from("ten").cast_number().unwrap_err();
        assert_eq!(err, EngineError::type_mismatch(ReturnType::Numeric, "ten"));
    }

    #[test]
    fn cast_vector_reads_colors() {
        assert_eq!(
            Primitive::from("255:128:0").cast_vector().unwrap(),
            Vector3::new(255.0, 128.0, 0.0)
        );
        assert_eq!(
            Primitive::from("blue").cast_vector().unwrap(),
            Vector3::new(0.0, 0.0, 255.0)
        );
        let err = Primitive::from("banana").cast_vector().unwrap_err();
        assert_eq!(err, EngineError::type_mismatch(ReturnType::Vector, "banana"));
    }

    #[test]
    fn boundary_values_cast() {
        assert_eq!(
            Primitive::from("0:255:0").cast_vector().unwrap(),
            Vector3::new(0.0, 255.0, 0.0)
        );
        assert!((Primitive::Numeric(360.0).cast_number().unwrap() - 360.0).abs() < f64::EPSILON);
    }

    #[test]
    fn list_and_keyed_list_interconvert() {
        let list = Primitive::List(vec![Primitive::Numeric(1.0), Primitive::Numeric(2.0)]);
        let keyed = list.cast_keyed_list().unwrap();
        assert_eq!(keyed.len(), 2);
        assert!(keyed.iter().all(|kv| kv.key.is_none()));
        let back = Primitive::KeyedList(keyed).cast_list().unwrap();
        assert_eq!(back, vec![Primitive::Numeric(1.0), Primitive::Numeric(2.0)]);
        assert!(Primitive::Numeric(1.0).cast_list().is_err());
    }

    #[test]
    fn renders_values() {
        assert_eq!(Primitive::Numeric(10.0).to_string(), "10");
        assert_eq!(Primitive::Numeric(0.5).to_string(), "0.5");
        assert_eq!(Primitive::Vector(Vector3::new(1.0, 2.0, 3.0)).to_string(), "1:2:3");
        let keyed = Primitive::KeyedList(vec![
            KeyedValue::new(Some("home".into()), Vector3::ZERO.into()),
            KeyedValue::new(None, true.into()),
        ]);
        assert_eq!(keyed.to_string(), "[home->0:0:0, true]");
        assert_eq!(keyed.return_type(), ReturnType::List);
    }

    #[test]
    fn comparisons() {
        let ten = Primitive::Numeric(10.0);
        let five = Primitive::Numeric(5.0);
        assert!(ComparisonType::Greater.compare(&ten, &five).unwrap());
        assert!(!ComparisonType::LessOrEqual.compare(&ten, &five).unwrap());
        assert!(ComparisonType::Equal.compare(&true.into(), &true.into()).unwrap());
        assert!(ComparisonType::NotEqual.compare(&ten, &five).unwrap());
        assert!(ComparisonType::Equal
            .compare(&Vector3::new(0.0, 0.0, 255.0).into(), &"blue".into())
            .unwrap());
        assert!(ComparisonType::Less.compare(&true.into(), &five).is_err());
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_value(Primitive::Numeric(2.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "NUMERIC", "value": 2.0 }));
    }
}
