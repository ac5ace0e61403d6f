//! S3 method dispatch resolution: `UseMethod` and `NextMethod`.
//!
//! The resolver owns nothing but the lookup protocol. Functions live in
//! the embedding interpreter's lexical scopes, which it exposes through
//! the read-only `Scope` chain; the resolver walks the object's class
//! vector building `<generic>.<class>` candidates and hands back an
//! opaque `FunctionRef` plus the continuation state `NextMethod` needs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{VelaError, VelaResult};
use crate::value::{Argument, Kind, RValue};

/// Opaque handle to an interpreter-owned function. The resolver never
/// looks inside; it only carries the token from the scope lookup back to
/// the call mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(u64);

impl FunctionRef {
    pub fn new(token: u64) -> Self {
        FunctionRef(token)
    }

    pub fn token(self) -> u64 {
        self.0
    }
}

/// The lexical-scope lookup service the interpreter provides. Read-only
/// for the duration of one resolution.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<FunctionRef>;
    fn parent(&self) -> Option<&dyn Scope>;
}

/// Walk the chain from `scope` outward, innermost binding wins.
pub fn find_in_chain(scope: &dyn Scope, name: &str) -> Option<FunctionRef> {
    let mut current: Option<&dyn Scope> = Some(scope);
    while let Some(s) = current {
        if let Some(found) = s.lookup(name) {
            return Some(found);
        }
        current = s.parent();
    }
    None
}

/// A basic chained environment for embedders and tests. Real interpreter
/// frames implement `Scope` themselves.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    bindings: HashMap<String, FunctionRef>,
    parent: Option<Arc<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn child_of(parent: &Arc<Environment>) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(Arc::clone(parent)),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, function: FunctionRef) {
        self.bindings.insert(name.into(), function);
    }
}

impl Scope for Environment {
    fn lookup(&self, name: &str) -> Option<FunctionRef> {
        self.bindings.get(name).copied()
    }

    fn parent(&self) -> Option<&dyn Scope> {
        self.parent.as_deref().map(|e| e as &dyn Scope)
    }
}

/// The dispatch value as the calling frame holds it: either a plain
/// value, or the variadic rest-args container when the generic's first
/// formal is the dots.
pub enum DispatchArg<'a> {
    Value(&'a RValue),
    Rest(&'a [RValue]),
}

/// The class vector used for dispatch: the explicit `class` attribute if
/// present, else the implicit class derived from dimensions and kind.
pub fn class_of(value: &RValue) -> Vec<String> {
    let v = match value {
        RValue::Null | RValue::Missing => return vec!["NULL".to_string()],
        RValue::Vector(v) => v,
    };
    if let Some(explicit) = v.class_attr() {
        if !explicit.is_empty() {
            return explicit;
        }
    }
    let mut out = Vec::new();
    if let Some(dim) = v.dim() {
        if dim.len() == 2 {
            out.push("matrix".to_string());
        }
        out.push("array".to_string());
    }
    match v.kind() {
        Kind::Integer => {
            out.push("integer".to_string());
            out.push("numeric".to_string());
        }
        Kind::Double => {
            out.push("double".to_string());
            out.push("numeric".to_string());
        }
        kind => out.push(kind.name().to_string()),
    }
    out
}

/// `inherits`: membership of `what` in the object's class vector.
pub fn inherits(value: &RValue, what: &str) -> bool {
    class_of(value).iter().any(|c| c == what)
}

/// Resolution result and `NextMethod` continuation state.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub method: FunctionRef,
    pub method_name: String,
    pub generic: String,
    pub group: Option<String>,
    pub classes: Vec<String>,
    /// Index into `classes` that produced the method; `classes.len()`
    /// when the `.default` method matched.
    pub class_index: usize,
}

impl Dispatch {
    /// The inheritance tail a `NextMethod` continuation would search:
    /// every class past the one that produced the executing method.
    pub fn remaining_classes(&self) -> &[String] {
        let next = (self.class_index + 1).min(self.classes.len());
        &self.classes[next..]
    }
}

/// `UseMethod`: resolve `generic` against the dispatch argument's class
/// vector through the calling scope chain.
pub fn use_method(
    generic: &str,
    group: Option<&str>,
    arg: DispatchArg<'_>,
    scope: &dyn Scope,
) -> VelaResult<Dispatch> {
    let object = match arg {
        DispatchArg::Value(v) => v,
        DispatchArg::Rest(items) => items.first().ok_or_else(|| {
            VelaError::argument("...", "UseMethod called with an empty argument list")
        })?,
    };
    let classes = class_of(object);
    resolve(generic, group, &classes, 0, scope).ok_or_else(|| {
        VelaError::dispatch(generic, classes.join(", "))
    })
}

/// `NextMethod` with the continuation state captured at `UseMethod`:
/// resume one past the class that produced the executing method.
pub fn next_method(state: &Dispatch, scope: &dyn Scope) -> VelaResult<Dispatch> {
    if state.class_index >= state.classes.len() {
        // The default method has no successor.
        return Err(VelaError::dispatch(
            state.generic.clone(),
            state.classes.join(", "),
        ));
    }
    resolve(
        &state.generic,
        state.group.as_deref(),
        &state.classes,
        state.class_index + 1,
        scope,
    )
    .ok_or_else(|| VelaError::dispatch(state.generic.clone(), state.classes.join(", ")))
}

/// `NextMethod` from a method that was invoked directly rather than via
/// dispatch: no stored state exists, so the class vector is recomputed
/// from the current call's first argument and the search starts at the
/// front of the chain.
pub fn next_method_from_value(
    generic: &str,
    group: Option<&str>,
    object: &RValue,
    scope: &dyn Scope,
) -> VelaResult<Dispatch> {
    let classes = class_of(object);
    resolve(generic, group, &classes, 0, scope)
        .ok_or_else(|| VelaError::dispatch(generic, classes.join(", ")))
}

fn resolve(
    generic: &str,
    group: Option<&str>,
    classes: &[String],
    start: usize,
    scope: &dyn Scope,
) -> Option<Dispatch> {
    for (i, class) in classes.iter().enumerate().skip(start) {
        let specific = format!("{}.{}", generic, class);
        if let Some(method) = find_in_chain(scope, &specific) {
            return Some(Dispatch {
                method,
                method_name: specific,
                generic: generic.to_string(),
                group: group.map(str::to_string),
                classes: classes.to_vec(),
                class_index: i,
            });
        }
        if let Some(group) = group {
            let grouped = format!("{}.{}", group, class);
            if let Some(method) = find_in_chain(scope, &grouped) {
                return Some(Dispatch {
                    method,
                    method_name: grouped,
                    generic: generic.to_string(),
                    group: Some(group.to_string()),
                    classes: classes.to_vec(),
                    class_index: i,
                });
            }
        }
    }
    let default = format!("{}.default", generic);
    find_in_chain(scope, &default).map(|method| Dispatch {
        method,
        method_name: default,
        generic: generic.to_string(),
        group: group.map(str::to_string),
        classes: classes.to_vec(),
        class_index: classes.len(),
    })
}

/// The argument merge `NextMethod` applies before re-invoking: named
/// extras rebind same-named inherited arguments, everything else appends
/// positionally after the inherited ones.
pub fn merge_call_arguments(inherited: &[Argument], extra: &[Argument]) -> Vec<Argument> {
    let mut out = inherited.to_vec();
    for arg in extra {
        let replaced = match &arg.name {
            Some(name) => {
                if let Some(slot) = out
                    .iter_mut()
                    .find(|a| a.name.as_deref() == Some(name.as_str()))
                {
                    slot.value = arg.value.clone();
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        if !replaced {
            out.push(arg.clone());
        }
    }
    out
}
