//! Per-property operation tables.
//!
//! A [`PropertyHandler`] is a set of optional closures over one device
//! capability `T` (`dyn Light`, `dyn Rotor`, ...). Builders cover the common
//! shapes: numeric with a step, boolean, vector, keyed list, and handlers
//! partitioned by direction.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{EngineError, Result};
use crate::model::{Direction, HandlerSlot, KeyedValue, Operation, Primitive, Vector3};

type GetFn<T> = Arc<dyn Fn(&T) -> Result<Primitive> + Send + Sync>;
type GetDirectionFn<T> = Arc<dyn Fn(&T, Direction) -> Result<Primitive> + Send + Sync>;
type SetFn<T> = Arc<dyn Fn(&mut T, &Primitive) -> Result<()> + Send + Sync>;
type SetDirectionFn<T> = Arc<dyn Fn(&mut T, Direction, &Primitive) -> Result<()> + Send + Sync>;
type ActionFn<T> = Arc<dyn Fn(&mut T) -> Result<()> + Send + Sync>;
type MoveFn<T> = Arc<dyn Fn(&mut T, Direction) -> Result<()> + Send + Sync>;

pub struct PropertyHandler<T: ?Sized> {
    get: Option<GetFn<T>>,
    get_direction: Option<GetDirectionFn<T>>,
    set: Option<SetFn<T>>,
    set_direction: Option<SetDirectionFn<T>>,
    increment: Option<ActionFn<T>>,
    increment_value: Option<SetFn<T>>,
    increment_value_direction: Option<SetDirectionFn<T>>,
    move_: Option<MoveFn<T>>,
    reverse: Option<ActionFn<T>>,
    step: Option<f64>,
}

impl<T: ?Sized> Clone for PropertyHandler<T> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            get_direction: self.get_direction.clone(),
            set: self.set.clone(),
            set_direction: self.set_direction.clone(),
            increment: self.increment.clone(),
            increment_value: self.increment_value.clone(),
            increment_value_direction: self.increment_value_direction.clone(),
            move_: self.move_.clone(),
            reverse: self.reverse.clone(),
            step: self.step,
        }
    }
}

impl<T: ?Sized> Default for PropertyHandler<T> {
    fn default() -> Self {
        Self {
            get: None,
            get_direction: None,
            set: None,
            set_direction: None,
            increment: None,
            increment_value: None,
            increment_value_direction: None,
            move_: None,
            reverse: None,
            step: None,
        }
    }
}

// ── Slot setters ─────────────────────────────────────────────────

impl<T: ?Sized + 'static> PropertyHandler<T> {
    pub fn with_get(mut self, f: impl Fn(&T) -> Result<Primitive> + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(f));
        self
    }

    pub fn with_get_direction(
        mut self,
        f: impl Fn(&T, Direction) -> Result<Primitive> + Send + Sync + 'static,
    ) -> Self {
        self.get_direction = Some(Arc::new(f));
        self
    }

    pub fn with_set(mut self, f: impl Fn(&mut T, &Primitive) -> Result<()> + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(f));
        self
    }

    pub fn with_set_direction(
        mut self,
        f: impl Fn(&mut T, Direction, &Primitive) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.set_direction = Some(Arc::new(f));
        self
    }

    pub fn with_increment(mut self, f: impl Fn(&mut T) -> Result<()> + Send + Sync + 'static) -> Self {
        self.increment = Some(Arc::new(f));
        self
    }

    pub fn with_increment_value(
        mut self,
        f: impl Fn(&mut T, &Primitive) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.increment_value = Some(Arc::new(f));
        self
    }

    pub fn with_increment_value_direction(
        mut self,
        f: impl Fn(&mut T, Direction, &Primitive) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.increment_value_direction = Some(Arc::new(f));
        self
    }

    pub fn with_move(mut self, f: impl Fn(&mut T, Direction) -> Result<()> + Send + Sync + 'static) -> Self {
        self.move_ = Some(Arc::new(f));
        self
    }

    pub fn with_reverse(mut self, f: impl Fn(&mut T) -> Result<()> + Send + Sync + 'static) -> Self {
        self.reverse = Some(Arc::new(f));
        self
    }

    /// Amount used when an increment or move names no value.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

// ── Dispatch ─────────────────────────────────────────────────────

impl<T: ?Sized> PropertyHandler<T> {
    pub fn step(&self) -> Option<f64> {
        self.step
    }

    /// Filled slots, in declaration order.
    pub fn supported(&self) -> Vec<HandlerSlot> {
        [
            (HandlerSlot::Get, self.get.is_some()),
            (HandlerSlot::GetDirection, self.get_direction.is_some()),
            (HandlerSlot::Set, self.set.is_some()),
            (HandlerSlot::SetDirection, self.set_direction.is_some()),
            (HandlerSlot::Increment, self.increment.is_some()),
            (HandlerSlot::IncrementValue, self.increment_value.is_some()),
            (HandlerSlot::IncrementValueDirection, self.increment_value_direction.is_some()),
            (HandlerSlot::Move, self.move_.is_some()),
            (HandlerSlot::Reverse, self.reverse.is_some()),
        ]
        .into_iter()
        .filter_map(|(slot, filled)| filled.then_some(slot))
        .collect()
    }

    /// Run `operation` against one device. Only `Get` produces a value.
    ///
    /// `default_direction` stands in for a missing direction on `Move`.
    pub fn invoke(
        &self,
        device: &mut T,
        operation: Operation,
        direction: Option<Direction>,
        value: Option<&Primitive>,
        default_direction: Direction,
    ) -> Result<Option<Primitive>> {
        match operation {
            Operation::Get => self.get_value(device, direction).map(Some),
            Operation::Set => {
                let value = value.ok_or_else(|| EngineError::invalid("set requires a value"))?;
                self.set_value(device, direction, value).map(|()| None)
            }
            Operation::Increment => self.increment_by(device, direction, value).map(|()| None),
            Operation::Move => self
                .move_toward(device, direction.unwrap_or(default_direction))
                .map(|()| None),
            Operation::Reverse => self.reverse(device).map(|()| None),
        }
    }

    pub fn get_value(&self, device: &T, direction: Option<Direction>) -> Result<Primitive> {
        match (direction, &self.get_direction, &self.get) {
            (Some(d), Some(get_direction), _) => get_direction(device, d),
            (_, _, Some(get)) => get(device),
            _ => Err(EngineError::unsupported(HandlerSlot::Get)),
        }
    }

    pub fn set_value(&self, device: &mut T, direction: Option<Direction>, value: &Primitive) -> Result<()> {
        match (direction, &self.set_direction, &self.set) {
            (Some(d), Some(set_direction), _) => set_direction(device, d, value),
            (_, _, Some(set)) => set(device, value),
            _ => Err(EngineError::unsupported(HandlerSlot::Set)),
        }
    }

    /// Increment fallbacks: a value with a direction prefers the directional
    /// slot; a bare direction increments by the step in that direction.
    pub fn increment_by(
        &self,
        device: &mut T,
        direction: Option<Direction>,
        value: Option<&Primitive>,
    ) -> Result<()> {
        match (value, direction) {
            (Some(v), Some(d)) => match (&self.increment_value_direction, &self.increment_value) {
                (Some(ivd), _) => ivd(device, d, v),
                (None, Some(iv)) => iv(device, v),
                (None, None) => Err(EngineError::unsupported(HandlerSlot::IncrementValueDirection)),
            },
            (Some(v), None) => match &self.increment_value {
                Some(iv) => iv(device, v),
                None => Err(EngineError::unsupported(HandlerSlot::IncrementValue)),
            },
            (None, Some(d)) => match (&self.increment_value_direction, self.step, &self.increment) {
                (Some(ivd), Some(step), _) => ivd(device, d, &Primitive::Numeric(step)),
                (_, _, Some(increment)) => increment(device),
                _ => Err(EngineError::unsupported(HandlerSlot::Increment)),
            },
            (None, None) => match &self.increment {
                Some(increment) => increment(device),
                None => Err(EngineError::unsupported(HandlerSlot::Increment)),
            },
        }
    }

    pub fn move_toward(&self, device: &mut T, direction: Direction) -> Result<()> {
        match &self.move_ {
            Some(move_) => move_(device, direction),
            None => Err(EngineError::unsupported(HandlerSlot::Move)),
        }
    }

    pub fn reverse(&self, device: &mut T) -> Result<()> {
        match &self.reverse {
            Some(reverse) => reverse(device),
            None => Err(EngineError::unsupported(HandlerSlot::Reverse)),
        }
    }
}

// ── Builders ─────────────────────────────────────────────────────

impl<T: ?Sized + 'static> PropertyHandler<T> {
    /// Numeric property with a step. Increment adds the step, directional
    /// increments are signed by the direction, move steps once in the given
    /// direction, and reverse negates.
    pub fn numeric(
        get: impl Fn(&T) -> f64 + Send + Sync + 'static,
        set: impl Fn(&mut T, f64) + Send + Sync + 'static,
        step: f64,
    ) -> Self {
        let get = Arc::new(get);
        let set = Arc::new(set);
        let add = {
            let (get, set) = (Arc::clone(&get), Arc::clone(&set));
            Arc::new(move |device: &mut T, delta: f64| {
                let current = get(device);
                set(device, current + delta);
            })
        };

        Self::default()
            .with_get({
                let get = Arc::clone(&get);
                move |device| Ok(Primitive::Numeric(get(device)))
            })
            .with_set({
                let set = Arc::clone(&set);
                move |device, value| {
                    set(device, value.cast_number()?);
                    Ok(())
                }
            })
            .with_increment({
                let add = Arc::clone(&add);
                move |device| {
                    add(device, step);
                    Ok(())
                }
            })
            .with_increment_value({
                let add = Arc::clone(&add);
                move |device, value| {
                    add(device, value.cast_number()?);
                    Ok(())
                }
            })
            .with_increment_value_direction({
                let add = Arc::clone(&add);
                move |device, direction, value| {
                    add(device, direction.signed(value.cast_number()?));
                    Ok(())
                }
            })
            .with_move({
                let add = Arc::clone(&add);
                move |device, direction| {
                    add(device, direction.signed(step));
                    Ok(())
                }
            })
            .with_reverse(move |device| {
                let current = get(device);
                set(device, -current);
                Ok(())
            })
            .with_step(step)
    }

    pub fn numeric_read_only(get: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self::default().with_get(move |device| Ok(Primitive::Numeric(get(device))))
    }

    /// Boolean property. Reverse toggles; increments are unsupported.
    pub fn boolean(
        get: impl Fn(&T) -> bool + Send + Sync + 'static,
        set: impl Fn(&mut T, bool) + Send + Sync + 'static,
    ) -> Self {
        let get = Arc::new(get);
        let set = Arc::new(set);
        Self::default()
            .with_get({
                let get = Arc::clone(&get);
                move |device| Ok(Primitive::Boolean(get(device)))
            })
            .with_set({
                let set = Arc::clone(&set);
                move |device, value| {
                    set(device, value.cast_boolean()?);
                    Ok(())
                }
            })
            .with_reverse(move |device| {
                let current = get(device);
                set(device, !current);
                Ok(())
            })
    }

    pub fn vector(get: impl Fn(&T) -> Vector3 + Send + Sync + 'static) -> Self {
        Self::default().with_get(move |device| Ok(Primitive::Vector(get(device))))
    }

    /// Vector property that also accepts writes. Strings are read as colors.
    /// The setter may reject a vector it cannot represent.
    pub fn vector_with_set(
        get: impl Fn(&T) -> Vector3 + Send + Sync + 'static,
        set: impl Fn(&mut T, Vector3) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::vector(get).with_set(move |device, value| set(device, value.cast_vector()?))
    }

    /// Keyed-list property. The setter may reject entries, and must do so
    /// before writing anything.
    pub fn list(
        get: impl Fn(&T) -> Vec<KeyedValue> + Send + Sync + 'static,
        set: impl Fn(&mut T, Vec<KeyedValue>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::default()
            .with_get(move |device| Ok(Primitive::KeyedList(get(device))))
            .with_set(move |device, value| set(device, value.cast_keyed_list()?))
    }

    /// Route each direction to its own handler. Calls without a direction, and
    /// directions no entry claims, go to the handler for `default`.
    ///
    /// # Panics
    ///
    /// When two entries claim the same direction. Handler tables are built once
    /// at startup, so this is a programming error.
    pub fn by_direction(default: Direction, entries: Vec<(PropertyHandler<T>, &[Direction])>) -> Self {
        let mut table: IndexMap<Direction, PropertyHandler<T>> = IndexMap::new();
        for (handler, directions) in entries {
            for &direction in directions {
                let previous = table.insert(direction, handler.clone());
                assert!(previous.is_none(), "direction {direction} is handled twice");
            }
        }
        let step = table.get(&default).and_then(PropertyHandler::step);
        let table = Arc::new(DirectionTable { default, table });

        let mut handler = Self::default()
            .with_get({
                let t = Arc::clone(&table);
                move |device| t.pick(None)?.get_value(device, None)
            })
            .with_get_direction({
                let t = Arc::clone(&table);
                move |device, d| t.pick(Some(d))?.get_value(device, Some(d))
            })
            .with_set({
                let t = Arc::clone(&table);
                move |device, value| t.pick(None)?.set_value(device, None, value)
            })
            .with_set_direction({
                let t = Arc::clone(&table);
                move |device, d, value| t.pick(Some(d))?.set_value(device, Some(d), value)
            })
            .with_increment({
                let t = Arc::clone(&table);
                move |device| t.pick(None)?.increment_by(device, None, None)
            })
            .with_increment_value({
                let t = Arc::clone(&table);
                move |device, value| t.pick(None)?.increment_by(device, None, Some(value))
            })
            .with_increment_value_direction({
                let t = Arc::clone(&table);
                move |device, d, value| t.pick(Some(d))?.increment_by(device, Some(d), Some(value))
            })
            .with_move({
                let t = Arc::clone(&table);
                move |device, d| t.pick(Some(d))?.move_toward(device, d)
            })
            .with_reverse(move |device| table.pick(None)?.reverse(device));
        handler.step = step;
        handler
    }
}

struct DirectionTable<T: ?Sized> {
    default: Direction,
    table: IndexMap<Direction, PropertyHandler<T>>,
}

impl<T: ?Sized> DirectionTable<T> {
    fn pick(&self, direction: Option<Direction>) -> Result<&PropertyHandler<T>> {
        direction
            .and_then(|d| self.table.get(&d))
            .or_else(|| self.table.get(&self.default))
            .ok_or_else(|| EngineError::invalid(format!("no handler for direction {}", self.default)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dial {
        value: f64,
        on: bool,
        low: f64,
        high: f64,
    }

    fn dial_handler() -> PropertyHandler<Dial> {
        PropertyHandler::numeric(|d: &Dial| d.value, |d: &mut Dial, v| d.value = v, 2.0)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn numeric_increment_law() {
        let handler = dial_handler();
        let mut dial = Dial { value: 5.0, ..Dial::default() };

        handler.increment_by(&mut dial, None, None).unwrap();
        assert!(approx(dial.value, 7.0));

        handler.increment_by(&mut dial, None, Some(&Primitive::Numeric(3.0))).unwrap();
        assert!(approx(dial.value, 10.0));

        handler
            .increment_by(&mut dial, Some(Direction::Down), Some(&Primitive::Numeric(4.0)))
            .unwrap();
        assert!(approx(dial.value, 6.0));

        handler
            .increment_by(&mut dial, Some(Direction::Clockwise), Some(&Primitive::Numeric(1.0)))
            .unwrap();
        assert!(approx(dial.value, 7.0));
    }

    #[test]
    fn numeric_move_and_reverse() {
        let handler = dial_handler();
        let mut dial = Dial { value: 1.0, ..Dial::default() };

        handler
            .invoke(&mut dial, Operation::Move, Some(Direction::Backward), None, Direction::Up)
            .unwrap();
        assert!(approx(dial.value, -1.0));

        handler
            .invoke(&mut dial, Operation::Move, None, None, Direction::Up)
            .unwrap();
        assert!(approx(dial.value, 1.0));

        handler.invoke(&mut dial, Operation::Reverse, None, None, Direction::Up).unwrap();
        assert!(approx(dial.value, -1.0));
    }

    #[test]
    fn set_rejects_wrong_type_before_writing() {
        let handler = dial_handler();
        let mut dial = Dial { value: 1.0, ..Dial::default() };
        let err = handler.set_value(&mut dial, None, &Primitive::from("fast")).unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { .. }));
        assert!(approx(dial.value, 1.0));
    }

    #[test]
    fn boolean_toggles_and_rejects_increment() {
        let handler = PropertyHandler::boolean(|d: &Dial| d.on, |d: &mut Dial, v| d.on = v);
        let mut dial = Dial::default();
        handler.reverse(&mut dial).unwrap();
        assert!(dial.on);
        assert_eq!(
            handler.increment_by(&mut dial, None, None),
            Err(EngineError::unsupported(HandlerSlot::Increment))
        );
        assert_eq!(handler.supported(), vec![HandlerSlot::Get, HandlerSlot::Set, HandlerSlot::Reverse]);
    }

    #[test]
    fn read_only_supports_get_only() {
        let handler = PropertyHandler::numeric_read_only(|d: &Dial| d.value);
        let mut dial = Dial { value: 3.0, ..Dial::default() };
        assert_eq!(handler.get_value(&dial, None), Ok(Primitive::Numeric(3.0)));
        assert_eq!(
            handler.set_value(&mut dial, None, &Primitive::Numeric(1.0)),
            Err(EngineError::unsupported(HandlerSlot::Set))
        );
    }

    fn limits() -> PropertyHandler<Dial> {
        PropertyHandler::by_direction(
            Direction::Up,
            vec![
                (
                    PropertyHandler::numeric(|d: &Dial| d.high, |d: &mut Dial, v| d.high = v, 10.0),
                    &[Direction::Up, Direction::Clockwise][..],
                ),
                (
                    PropertyHandler::numeric(|d: &Dial| d.low, |d: &mut Dial, v| d.low = v, 10.0),
                    &[Direction::Down, Direction::Counterclockwise][..],
                ),
            ],
        )
    }

    #[test]
    fn direction_partition_routes() {
        let handler = limits();
        let mut dial = Dial::default();

        handler.set_value(&mut dial, Some(Direction::Down), &Primitive::Numeric(-45.0)).unwrap();
        handler.set_value(&mut dial, None, &Primitive::Numeric(45.0)).unwrap();
        assert!(approx(dial.low, -45.0));
        assert!(approx(dial.high, 45.0));

        // Unclaimed direction falls back to the default entry.
        handler.set_value(&mut dial, Some(Direction::Left), &Primitive::Numeric(30.0)).unwrap();
        assert!(approx(dial.high, 30.0));

        handler.increment_by(&mut dial, Some(Direction::Counterclockwise), None).unwrap();
        assert!(approx(dial.low, -55.0));
        assert_eq!(handler.step(), Some(10.0));
        assert_eq!(
            handler.get_value(&dial, Some(Direction::Down)),
            Ok(Primitive::Numeric(-55.0))
        );
    }

    #[test]
    #[should_panic(expected = "handled twice")]
    fn direction_registered_twice_panics() {
        let _ = PropertyHandler::<Dial>::by_direction(
            Direction::Up,
            vec![
                (PropertyHandler::numeric_read_only(|d: &Dial| d.low), &[Direction::Up][..]),
                (PropertyHandler::numeric_read_only(|d: &Dial| d.high), &[Direction::Up][..]),
            ],
        );
    }
}
