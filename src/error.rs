//! Unified error and warning types for the vela runtime core.
//!
//! Fatal failures (wrong argument kind/shape, unresolvable dispatch,
//! intentionally unimplemented behavior) are `VelaError` values and abort
//! the builtin call. Recoverable events (NA introduced by coercion,
//! fractional recycling) are `Warning`s, collected per call by `Warnings`
//! and drained by the embedding interpreter's warning sink.

use thiserror::Error;

pub type VelaResult<T> = std::result::Result<T, VelaError>;

/// Fatal error taxonomy. The embedding interpreter maps these tags onto
/// its own condition system; the crate never retries internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VelaError {
    #[error("invalid '{argument}' argument: {message}")]
    ArgumentError { argument: String, message: String },

    #[error("no applicable method for '{generic}' applied to an object of class \"{class}\"")]
    DispatchError { generic: String, class: String },

    #[error("{feature} is not yet implemented")]
    NotImplemented { feature: &'static str },
}

impl VelaError {
    pub fn argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        VelaError::ArgumentError {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn dispatch(generic: impl Into<String>, class: impl Into<String>) -> Self {
        VelaError::DispatchError {
            generic: generic.into(),
            class: class.into(),
        }
    }

    pub fn not_implemented(feature: &'static str) -> Self {
        VelaError::NotImplemented { feature }
    }
}

/// A recoverable diagnostic raised during a builtin call.
///
/// Equality doubles as the dedup key: `CoercionLoss` fires at most once
/// per call no matter how many elements failed, `RecycleMismatch` at most
/// once per offending argument index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// One or more elements failed a narrowing conversion and became NA.
    CoercionLoss,
    /// A complex value lost a nonzero imaginary part on the way to a real kind.
    ImaginaryDiscarded,
    /// NA or out-of-range values were treated as `00` when coercing to raw.
    RawLoss,
    /// The length of argument `argument` (1-based) does not evenly divide
    /// the extent it was recycled to.
    RecycleMismatch { argument: usize },
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::CoercionLoss => "NAs introduced by coercion".to_string(),
            Warning::ImaginaryDiscarded => "imaginary parts discarded in coercion".to_string(),
            Warning::RawLoss => "out-of-range values treated as 0 in coercion to raw".to_string(),
            Warning::RecycleMismatch { argument } => format!(
                "length of argument {} does not evenly divide the result extent",
                argument
            ),
        }
    }
}

/// Per-call warning collector standing in for the interpreter's
/// `emitWarning` sink. One collector is allocated per builtin call; the
/// caller drains it after the call returns.
#[derive(Debug, Default)]
pub struct Warnings {
    emitted: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Warnings::default()
    }

    /// Record a warning unless an identical one was already recorded
    /// during this call.
    pub fn emit(&mut self, warning: Warning) {
        if !self.emitted.contains(&warning) {
            self.emitted.push(warning);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn contains(&self, warning: &Warning) -> bool {
        self.emitted.contains(warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.emitted.iter()
    }

    /// Hand the collected warnings to the embedding sink, leaving the
    /// collector empty.
    pub fn drain(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.emitted)
    }
}
