// ABOUTME: Name-keyed table of builtin operations with arity metadata,
// ABOUTME: plus the plugin installation contract

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Handlers receive the evaluator and the *unevaluated* argument
/// expressions; most call `eval_args`, short-circuiting ones do not.
pub type BuiltinHandler = fn(&mut Evaluator, &[Expr]) -> Result<Value, EvalError>;

/// Arity value meaning "the handler enforces its own bounds"
pub const VARIADIC: i32 = -1;

/// Compile-time registration record emitted by `#[builtin]` and collected
/// by `Registry::with_core`
pub struct BuiltinDef {
    pub name: &'static str,
    pub category: &'static str,
    pub arity: i32,
    pub help: &'static str,
    pub handler: BuiltinHandler,
}

inventory::collect!(BuiltinDef);

/// Per-entry metadata. Categories partition the registry for the help
/// surface only; they carry no runtime semantics.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub name: String,
    pub category: String,
    pub arity: i32,
    pub help: String,
}

impl Metadata {
    pub fn new(name: &str, category: &str, arity: i32, help: &str) -> Self {
        Metadata {
            name: name.to_string(),
            category: category.to_string(),
            arity,
            help: help.to_string(),
        }
    }
}

/// An external package of operations. `register` installs its entries; a
/// plugin whose declared dependency is not yet installed is rejected.
pub struct Plugin {
    pub name: &'static str,
    pub version: &'static str,
    pub dependencies: &'static [&'static str],
    pub register: fn(&mut Registry) -> Result<(), EvalError>,
}

#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, (Metadata, BuiltinHandler)>,
    installed: Vec<String>,
}

impl Registry {
    /// An empty registry; tests build these directly
    pub fn new() -> Self {
        Registry::default()
    }

    /// A registry holding every `#[builtin]`-annotated core operation
    pub fn with_core() -> Result<Self, EvalError> {
        let mut registry = Registry::new();
        for def in inventory::iter::<BuiltinDef> {
            registry.register(
                Metadata::new(def.name, def.category, def.arity, def.help),
                def.handler,
            )?;
        }
        Ok(registry)
    }

    /// Install an entry. Duplicate names are rejected; `replace` is the
    /// explicit override path.
    pub fn register(
        &mut self,
        metadata: Metadata,
        handler: BuiltinHandler,
    ) -> Result<(), EvalError> {
        if self.entries.contains_key(&metadata.name) {
            return Err(EvalError::argument_error(
                "registry",
                format!("'{}' is already registered", metadata.name),
            ));
        }
        self.entries.insert(metadata.name.clone(), (metadata, handler));
        Ok(())
    }

    /// Install an entry, overwriting any existing one of the same name
    pub fn replace(&mut self, metadata: Metadata, handler: BuiltinHandler) {
        self.entries.insert(metadata.name.clone(), (metadata, handler));
    }

    pub fn lookup(&self, name: &str) -> Option<(&Metadata, BuiltinHandler)> {
        self.entries
            .get(name)
            .map(|(metadata, handler)| (metadata, *handler))
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Front-door dispatch: fixed arities are enforced here, BEFORE the
    /// handler runs; variadic entries check their own bounds.
    pub fn invoke(
        &self,
        name: &str,
        ev: &mut Evaluator,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        let (metadata, handler) = self
            .lookup(name)
            .ok_or_else(|| EvalError::unbound(name, None))?;
        if metadata.arity >= 0 && args.len() != metadata.arity as usize {
            return Err(EvalError::arity_error(
                name,
                metadata.arity.to_string(),
                args.len(),
            ));
        }
        handler(ev, args)
    }

    /// Install a plugin, validating its declared dependencies first
    pub fn install(&mut self, plugin: &Plugin) -> Result<(), EvalError> {
        for dep in plugin.dependencies {
            if !self.installed.iter().any(|p| p == dep) {
                return Err(EvalError::argument_error(
                    "registry",
                    format!(
                        "plugin '{}' requires '{}', which is not installed",
                        plugin.name, dep
                    ),
                ));
            }
        }
        (plugin.register)(self)?;
        self.installed.push(plugin.name.to_string());
        Ok(())
    }

    pub fn installed(&self, plugin_name: &str) -> bool {
        self.installed.iter().any(|p| p == plugin_name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Metadata grouped by category, for the help surface
    pub fn by_category(&self) -> BTreeMap<String, Vec<Metadata>> {
        let mut grouped: BTreeMap<String, Vec<Metadata>> = BTreeMap::new();
        for (metadata, _) in self.entries.values() {
            grouped
                .entry(metadata.category.clone())
                .or_default()
                .push(metadata.clone());
        }
        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Evaluator, _: &[Expr]) -> Result<Value, EvalError> {
        Ok(Value::Nil)
    }

    fn meta(name: &str) -> Metadata {
        Metadata::new(name, "Test", 1, "noop")
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register(meta("f"), noop).expect("register failed");
        assert!(registry.has("f"));
        let (metadata, _) = registry.lookup("f").expect("lookup failed");
        assert_eq!(metadata.arity, 1);
        assert!(!registry.has("g"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::new();
        registry.register(meta("f"), noop).expect("register failed");
        assert!(registry.register(meta("f"), noop).is_err());
    }

    #[test]
    fn test_replace_is_explicit() {
        let mut registry = Registry::new();
        registry.register(meta("f"), noop).expect("register failed");
        registry.replace(Metadata::new("f", "Test", 2, "other"), noop);
        let (metadata, _) = registry.lookup("f").expect("lookup failed");
        assert_eq!(metadata.arity, 2);
    }

    #[test]
    fn test_core_registry_collects_builtins() {
        let registry = Registry::with_core().expect("core registry");
        for name in ["+", "first", "assoc", "swap!", "comp", "not"] {
            assert!(registry.has(name), "missing core builtin '{}'", name);
        }
    }

    #[test]
    fn test_plugin_dependency_validation() {
        fn register_nothing(_: &mut Registry) -> Result<(), EvalError> {
            Ok(())
        }

        static BASE: Plugin = Plugin {
            name: "base",
            version: "0.1.0",
            dependencies: &[],
            register: register_nothing,
        };
        static NEEDS_BASE: Plugin = Plugin {
            name: "needs-base",
            version: "0.1.0",
            dependencies: &["base"],
            register: register_nothing,
        };

        let mut registry = Registry::new();
        assert!(registry.install(&NEEDS_BASE).is_err());
        registry.install(&BASE).expect("install failed");
        assert!(registry.installed("base"));
        registry.install(&NEEDS_BASE).expect("install failed");
        assert!(registry.installed("needs-base"));
    }
}
