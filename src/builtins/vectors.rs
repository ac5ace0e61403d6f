//! Builtin adaptors over the engines: option parsing and argument shape
//! checks, then a single engine call. These are the only call sites the
//! registry exposes; the engines themselves stay directly callable for
//! embedders that bypass the builtin surface.

use crate::bind::{self, BindArg};
use crate::builtins::validation::{
    matching_operand, option_integer, option_logical, reject_unsupported_option, require_arity,
    require_vector, split_options,
};
use crate::combine;
use crate::error::{VelaResult, Warnings};
use crate::extremes;
use crate::matching;
use crate::ordering;
use crate::value::{Argument, RValue, RVector, NA_INTEGER};

pub fn c(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    combine::combine(args, warnings)
}

pub fn unlist(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["recursive", "use.names"]);
    require_arity(&positional, 1, "unlist")?;
    let recursive = option_logical(&options, "recursive", true)?;
    let use_names = option_logical(&options, "use.names", true)?;
    combine::unlist(&positional[0].value, recursive, use_names, warnings)
}

pub fn cbind(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    bind_adaptor(args, warnings, bind::cbind)
}

pub fn rbind(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    bind_adaptor(args, warnings, bind::rbind)
}

fn bind_adaptor(
    args: &[Argument],
    warnings: &mut Warnings,
    engine: fn(&[BindArg], i32, &mut Warnings) -> VelaResult<RValue>,
) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["deparse.level"]);
    let deparse_level = option_integer(&options, "deparse.level", 1)?;
    // Deparsed call text would come from the interpreter; through the
    // registry surface only explicit tags are available.
    let bind_args: Vec<BindArg> = positional
        .iter()
        .map(|arg| BindArg {
            value: arg.value.clone(),
            name: arg.name.clone(),
            deparsed: None,
        })
        .collect();
    engine(&bind_args, deparse_level, warnings)
}

pub fn match_fn(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["nomatch", "incomparables"]);
    require_arity(&positional, 2, "match")?;
    reject_unsupported_option(&options, "incomparables", "the incomparables argument of match")?;
    let no_match = option_integer(&options, "nomatch", NA_INTEGER)?;
    let x = matching_operand(&positional[0].value, "x")?;
    let table = matching_operand(&positional[1].value, "table")?;
    Ok(RValue::Vector(matching::match_in(
        &x, &table, no_match, warnings,
    )?))
}

pub fn is_element(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, _) = split_options(args, &[]);
    require_arity(&positional, 2, "%in%")?;
    let x = matching_operand(&positional[0].value, "x")?;
    let table = matching_operand(&positional[1].value, "table")?;
    Ok(RValue::Vector(matching::is_element(&x, &table, warnings)?))
}

pub fn duplicated(args: &[Argument], _warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["fromLast", "incomparables"]);
    require_arity(&positional, 1, "duplicated")?;
    reject_unsupported_option(
        &options,
        "incomparables",
        "the incomparables argument of duplicated",
    )?;
    let from_last = option_logical(&options, "fromLast", false)?;
    let x = require_vector(&positional[0].value, "x")?;
    Ok(RValue::Vector(matching::duplicated(x, from_last)?))
}

pub fn unique(args: &[Argument], _warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["fromLast", "incomparables"]);
    require_arity(&positional, 1, "unique")?;
    reject_unsupported_option(
        &options,
        "incomparables",
        "the incomparables argument of unique",
    )?;
    let from_last = option_logical(&options, "fromLast", false)?;
    let x = require_vector(&positional[0].value, "x")?;
    Ok(RValue::Vector(matching::unique(x, from_last)?))
}

pub fn order(args: &[Argument], _warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["na.last", "decreasing"]);
    let na_last = option_logical(&options, "na.last", true)?;
    let decreasing = option_logical(&options, "decreasing", false)?;
    let keys: Vec<RVector> = positional
        .iter()
        .map(|arg| matching_operand(&arg.value, "..."))
        .collect::<VelaResult<_>>()?;
    let refs: Vec<&RVector> = keys.iter().collect();
    Ok(RValue::Vector(ordering::order(&refs, na_last, decreasing)?))
}

pub fn pmin(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["na.rm"]);
    let na_rm = option_logical(&options, "na.rm", false)?;
    let values: Vec<RValue> = positional.iter().map(|a| a.value.clone()).collect();
    extremes::pmin(&values, na_rm, warnings)
}

pub fn pmax(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    let (positional, options) = split_options(args, &["na.rm"]);
    let na_rm = option_logical(&options, "na.rm", false)?;
    let values: Vec<RValue> = positional.iter().map(|a| a.value.clone()).collect();
    extremes::pmax(&values, na_rm, warnings)
}
