use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Instruction;
use crate::engine::{BlockCondition, Engine};
use crate::error::{EngineError, Result};
use crate::model::Primitive;
use crate::registry::HandlerRegistry;
use crate::sim::SimWorld;

// ── Session ────────────────────────────────────────────────────────

/// A sealed registry plus the world it drives. The world sits behind a lock
/// so one session can be shared between threads; each instruction holds the
/// lock for its whole selection.
pub struct Session {
    engine: Engine,
    world: Mutex<SimWorld>,
    world_path: Option<PathBuf>,
}

impl Session {
    pub fn new(registry: Arc<HandlerRegistry>, world: SimWorld) -> Self {
        Self {
            engine: Engine::new(registry),
            world: Mutex::new(world),
            world_path: None,
        }
    }

    /// Session over the standard handlers and the world file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let world = SimWorld::load(path)?;
        tracing::debug!(path = %path.display(), devices = world.devices.len(), "world loaded");
        Ok(Self {
            world_path: Some(path.to_path_buf()),
            ..Self::new(Arc::new(HandlerRegistry::standard()), world)
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn world_path(&self) -> Option<&Path> {
        self.world_path.as_deref()
    }

    pub fn with_world<R>(&self, f: impl FnOnce(&SimWorld) -> R) -> R {
        f(&self.world.lock())
    }

    pub fn execute(&self, instruction: &Instruction) -> Result<Vec<Primitive>> {
        let mut world = self.world.lock();
        self.engine.execute(&mut *world, instruction)
    }

    /// Run instructions in order, stopping at the first failure. Earlier
    /// instructions keep their effect.
    pub fn execute_all(&self, instructions: &[Instruction]) -> Result<Vec<Vec<Primitive>>> {
        let mut world = self.world.lock();
        instructions
            .iter()
            .map(|instruction| self.engine.execute(&mut *world, instruction))
            .collect()
    }

    pub fn evaluate(&self, condition: &BlockCondition) -> Result<bool> {
        let mut world = self.world.lock();
        self.engine.evaluate_condition(&mut *world, condition)
    }

    /// Write the world back to `path`, or to the file it was opened from.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let Some(path) = path.or(self.world_path.as_deref()) else {
            return Err(EngineError::invalid("no world file to save to"));
        };
        self.world.lock().save(path)?;
        tracing::debug!(path = %path.display(), "world saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::command::Selector;
    use crate::model::{BlockType, Property};
    use crate::sim::SimLight;

    fn session() -> Session {
        let mut world = SimWorld::default();
        world.add_light(SimLight::new("lamp"));
        Session::new(Arc::new(HandlerRegistry::standard()), world)
    }

    fn lamp() -> Selector {
        Selector::single(BlockType::Light, "lamp")
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let session = session();
        let batch = [
            Instruction::set(lamp(), 5.0),
            Instruction::set(Selector::single(BlockType::Light, "ghost"), 1.0),
            Instruction::set(lamp(), 9.0),
        ];
        let err = session.execute_all(&batch).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSelector { .. }));
        let intensity = session.with_world(|w| w.light("lamp").unwrap().intensity);
        assert!((intensity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn save_needs_a_path() {
        let session = session();
        assert!(matches!(session.save(None), Err(EngineError::InvalidInstruction { .. })));
    }

    #[test]
    fn open_execute_save() {
        let dir = std::env::temp_dir().join("blockctl_test_session");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.json");
        session().with_world(|w| w.save(&path)).unwrap();

        let opened = Session::open(&path).unwrap();
        assert_eq!(opened.world_path(), Some(path.as_path()));
        opened
            .execute(&Instruction::set(lamp(), false).with_property(Property::Power))
            .unwrap();
        opened.save(None).unwrap();

        let reloaded = SimWorld::load(&path).unwrap();
        assert!(!reloaded.light("lamp").unwrap().enabled);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let missing = std::env::temp_dir().join("blockctl_test_session_missing/world.json");
        assert!(matches!(Session::open(&missing), Err(EngineError::Io { .. })));
    }
}
