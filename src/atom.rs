// ABOUTME: Mutable single-slot reference cell with lock-guarded, linearizable updates

use crate::error::EvalError;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use std::sync::Mutex;

/// The one escape hatch from the otherwise-immutable value model. Each atom
/// owns its slot and its own lock; locks are never shared between atoms.
#[derive(Clone)]
pub struct Atom {
    cell: Rc<Mutex<Value>>,
}

impl Atom {
    pub fn new(value: Value) -> Self {
        Atom {
            cell: Rc::new(Mutex::new(value)),
        }
    }

    /// Current value (`deref`)
    pub fn load(&self) -> Value {
        self.lock().clone()
    }

    /// Store a new value (`reset!`), returning it
    pub fn store(&self, value: Value) -> Value {
        *self.lock() = value.clone();
        value
    }

    /// Compute a replacement from the current value while holding the lock
    /// (`swap!`). If the update function fails the slot is left unchanged
    /// and the error propagates.
    pub fn swap<F>(&self, update: F) -> Result<Value, EvalError>
    where
        F: FnOnce(Value) -> Result<Value, EvalError>,
    {
        let mut guard = self.lock();
        let next = update(guard.clone())?;
        *guard = next.clone();
        Ok(next)
    }

    /// Identity comparison; two atoms are equal only if they are the same cell
    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Value> {
        // A poisoned lock only means a previous holder panicked; the slot
        // itself is still a coherent Value.
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom").finish_non_exhaustive()
    }
}
