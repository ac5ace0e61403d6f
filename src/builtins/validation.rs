//! Argument validation helpers shared by the builtin adaptors: splitting
//! recognized named options from positional arguments and extracting
//! scalar option values with clear error messages.

use std::collections::HashMap;

use crate::error::{VelaError, VelaResult};
use crate::value::{Kind, RValue, RVector, VectorData, NA_INTEGER};

/// Partition a call's arguments into positionals and recognized named
/// options. Named arguments that are not recognized options stay
/// positional with their tag (so `c(a = 1)` keeps its name).
pub fn split_options<'a>(
    args: &'a [crate::value::Argument],
    option_names: &[&str],
) -> (Vec<&'a crate::value::Argument>, HashMap<String, &'a RValue>) {
    let mut positional = Vec::new();
    let mut options = HashMap::new();
    for arg in args {
        match &arg.name {
            Some(name) if option_names.contains(&name.as_str()) => {
                options.insert(name.clone(), &arg.value);
            }
            _ => positional.push(arg),
        }
    }
    (positional, options)
}

pub fn require_vector<'a>(value: &'a RValue, name: &str) -> VelaResult<&'a RVector> {
    match value {
        RValue::Vector(v) => Ok(v),
        _ => Err(VelaError::argument(name, "must be a vector")),
    }
}

/// A scalar TRUE/FALSE option; NA and non-scalar values are argument
/// errors.
pub fn scalar_logical(value: &RValue, name: &str) -> VelaResult<bool> {
    let v = require_vector(value, name)?;
    if v.len() != 1 {
        return Err(VelaError::argument(name, "must be a single logical value"));
    }
    match v.data() {
        VectorData::Logical(d) | VectorData::Integer(d) => {
            if d[0] == NA_INTEGER {
                Err(VelaError::argument(name, "must not be NA"))
            } else {
                Ok(d[0] != 0)
            }
        }
        VectorData::Double(d) => {
            if d[0].is_nan() {
                Err(VelaError::argument(name, "must not be NA"))
            } else {
                Ok(d[0] != 0.0)
            }
        }
        _ => Err(VelaError::argument(name, "must be a single logical value")),
    }
}

/// A scalar integer option. NA is allowed and comes back as the integer
/// NA sentinel; the caller decides whether that is meaningful (it is for
/// `nomatch`).
pub fn scalar_integer(value: &RValue, name: &str) -> VelaResult<i32> {
    let v = require_vector(value, name)?;
    if v.len() != 1 {
        return Err(VelaError::argument(name, "must be a single integer value"));
    }
    match v.data() {
        VectorData::Logical(d) | VectorData::Integer(d) => Ok(d[0]),
        VectorData::Double(d) => {
            if d[0].is_nan() {
                Ok(NA_INTEGER)
            } else if d[0].fract() == 0.0 && d[0].abs() <= 2_147_483_647.0 {
                Ok(d[0] as i32)
            } else {
                Err(VelaError::argument(name, "must be a single integer value"))
            }
        }
        _ => Err(VelaError::argument(name, "must be a single integer value")),
    }
}

pub fn option_logical(
    options: &HashMap<String, &RValue>,
    key: &str,
    default: bool,
) -> VelaResult<bool> {
    match options.get(key) {
        Some(&value) => scalar_logical(value, key),
        None => Ok(default),
    }
}

pub fn option_integer(
    options: &HashMap<String, &RValue>,
    key: &str,
    default: i32,
) -> VelaResult<i32> {
    match options.get(key) {
        Some(&value) => scalar_integer(value, key),
        None => Ok(default),
    }
}

/// An option that the original implementation only accepts in its
/// do-nothing form (`NULL` / `FALSE`); anything else is the intentional
/// gap signal.
pub fn reject_unsupported_option(
    options: &HashMap<String, &RValue>,
    key: &str,
    feature: &'static str,
) -> VelaResult<()> {
    match options.get(key) {
        None => Ok(()),
        Some(RValue::Null) => Ok(()),
        Some(&value) => {
            if let Ok(false) = scalar_logical(value, key) {
                return Ok(());
            }
            Err(VelaError::not_implemented(feature))
        }
    }
}

/// Exact positional arity.
pub fn require_arity(
    positional: &[&crate::value::Argument],
    expected: usize,
    what: &str,
) -> VelaResult<()> {
    if positional.len() != expected {
        return Err(VelaError::argument(
            what,
            format!("expected {} arguments, got {}", expected, positional.len()),
        ));
    }
    Ok(())
}

/// A matching operand: a vector, or NULL standing in for the empty
/// logical vector the way the source language treats absent tables.
pub fn matching_operand<'a>(value: &'a RValue, name: &str) -> VelaResult<RVector> {
    match value {
        RValue::Null => Ok(RVector::empty(Kind::Logical)),
        RValue::Vector(v) => Ok(v.clone()),
        RValue::Missing => Err(VelaError::argument(name, "is missing, with no default")),
    }
}
