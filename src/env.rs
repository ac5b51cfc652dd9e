// ABOUTME: Environment module managing lexically scoped variable bindings

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A frame in the parent-linked environment chain. Closures keep their
/// defining frame alive through the Rc; multiple children may share one
/// parent.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Creates a child environment pre-populated with bindings
    pub fn extend(
        parent: Rc<Environment>,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> Rc<Self> {
        let env = Environment::with_parent(parent);
        for (name, value) in bindings {
            env.define(name, value);
        }
        env
    }

    /// Defines a binding in THIS frame (doesn't walk the parent chain)
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in this frame and parent frames recursively
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }

        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }

        None
    }

    /// Updates the nearest frame in which `name` is bound (`set!`)
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }

        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }

        Err(EvalError::unbound(name, None))
    }

    /// Walks to the top of the chain; `def` installs bindings there
    pub fn root(self: &Rc<Self>) -> Rc<Environment> {
        let mut current = Rc::clone(self);
        loop {
            let parent = match &current.parent {
                Some(parent) => Rc::clone(parent),
                None => return current,
            };
            current = parent;
        }
    }
}
