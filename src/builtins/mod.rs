//! The builtin registry: name → adaptor function over the engines.
//!
//! The registry is a process-wide constant: built once behind a
//! `OnceLock` at first use and never mutated afterwards. Only the
//! builtins whose cores live in this crate are registered; the hundreds
//! of thin wrappers over excluded subsystems (I/O, FFI, parsing) belong
//! to the embedding interpreter.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{VelaResult, Warnings};
use crate::value::{Argument, RValue};

pub mod validation;
pub mod vectors;

/// Builtin adaptor signature: forced arguments in, value out, with a
/// per-call warning collector the caller drains afterwards.
pub type BuiltinFunction = fn(&[Argument], &mut Warnings) -> VelaResult<RValue>;

#[derive(Debug)]
pub struct Registry {
    functions: HashMap<String, BuiltinFunction>,
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Registry {
            functions: HashMap::new(),
        };
        registry.register_combine_functions();
        registry.register_matching_functions();
        registry.register_extreme_functions();
        registry
    }

    pub fn get_function(&self, name: &str) -> Option<BuiltinFunction> {
        self.functions.get(name).copied()
    }

    /// All registered names in deterministic sorted order.
    pub fn function_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        names
    }

    fn register(&mut self, name: impl Into<String>, function: BuiltinFunction) {
        self.functions.insert(name.into(), function);
    }

    fn register_combine_functions(&mut self) {
        self.register("c", vectors::c);
        self.register("unlist", vectors::unlist);
        self.register("cbind", vectors::cbind);
        self.register("rbind", vectors::rbind);
    }

    fn register_matching_functions(&mut self) {
        self.register("match", vectors::match_fn);
        self.register("%in%", vectors::is_element);
        self.register("duplicated", vectors::duplicated);
        self.register("unique", vectors::unique);
        self.register("order", vectors::order);
    }

    fn register_extreme_functions(&mut self) {
        self.register("pmin", vectors::pmin);
        self.register("pmax", vectors::pmax);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, initialized once.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}
