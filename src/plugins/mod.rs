//! # Plugin Packages
//!
//! Operations outside the core contract, shipped through the registry's
//! plugin mechanism: each package declares a name, version, and
//! dependencies, and installs its entries with plain `Registry::register`
//! calls. Installation fails if a declared dependency is missing.

use crate::error::EvalError;
use crate::registry::Registry;

pub mod json;
pub mod math;
pub mod seq;
pub mod sets;
pub mod strings;

/// Install every bundled plugin in dependency order
pub fn install_all(registry: &mut Registry) -> Result<(), EvalError> {
    registry.install(&math::PLUGIN)?;
    registry.install(&seq::PLUGIN)?;
    registry.install(&strings::PLUGIN)?;
    registry.install(&sets::PLUGIN)?;
    registry.install(&json::PLUGIN)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    #[test]
    fn test_install_all() {
        let mut registry = Registry::with_core().expect("core registry");
        install_all(&mut registry).expect("plugin install failed");
        for name in ["sqrt", "map", "str-upper", "union", "json-encode"] {
            assert!(registry.has(name), "missing plugin operation '{}'", name);
        }
        let interp = Interpreter::new(registry);
        assert!(interp.eval_source("(map inc [1 2 3])").is_ok());
    }

    #[test]
    fn test_core_alone_lacks_plugin_operations() {
        let registry = Registry::with_core().expect("core registry");
        assert!(!registry.has("sqrt"));
        assert!(!registry.has("json-encode"));
    }
}
