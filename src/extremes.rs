//! Parallel extremes: element-wise `pmin` / `pmax` over N arguments at
//! the precedence join, with modular recycling to the longest argument.

use crate::coerce::{coerce, fold_precedence};
use crate::error::{VelaError, VelaResult, Warning, Warnings};
use crate::value::{Kind, RValue, RVector, VectorData, NA_INTEGER};

pub fn pmin(args: &[RValue], na_rm: bool, warnings: &mut Warnings) -> VelaResult<RValue> {
    parallel_extreme(args, na_rm, Extreme::Min, warnings)
}

pub fn pmax(args: &[RValue], na_rm: bool, warnings: &mut Warnings) -> VelaResult<RValue> {
    parallel_extreme(args, na_rm, Extreme::Max, warnings)
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn parallel_extreme(
    args: &[RValue],
    na_rm: bool,
    which: Extreme,
    warnings: &mut Warnings,
) -> VelaResult<RValue> {
    if args.is_empty() {
        return Err(VelaError::argument("...", "no arguments"));
    }
    for (i, arg) in args.iter().enumerate() {
        if matches!(arg, RValue::Missing) {
            return Err(VelaError::argument(
                (i + 1).to_string(),
                "is missing, with no default",
            ));
        }
    }
    let kind = match fold_precedence(args.iter()) {
        Some(k) => k,
        None => return Ok(RValue::Null),
    };
    if kind == Kind::List || kind == Kind::Complex {
        return Err(VelaError::argument("...", "invalid input type"));
    }

    let vectors: Vec<&RVector> = args.iter().filter_map(|a| a.as_vector()).collect();
    if vectors.iter().any(|v| v.is_empty()) {
        return Ok(RValue::Vector(RVector::empty(kind)));
    }
    let n = vectors.iter().map(|v| v.len()).max().unwrap_or(0);
    for (i, arg) in args.iter().enumerate() {
        if let RValue::Vector(v) = arg {
            if n % v.len() != 0 {
                warnings.emit(Warning::RecycleMismatch { argument: i + 1 });
            }
        }
    }

    let coerced: Vec<RVector> = vectors.iter().map(|v| coerce(v, kind, warnings)).collect();
    let data = match kind {
        Kind::Raw => {
            let pieces: Vec<&[u8]> = coerced
                .iter()
                .map(|v| match v.data() {
                    VectorData::Raw(d) => d.as_slice(),
                    _ => unreachable!(),
                })
                .collect();
            // Raw carries no NA, so na_rm never applies.
            VectorData::Raw(fold_positions(
                &pieces,
                n,
                |_| false,
                pick_ord(which),
                0u8,
                na_rm,
            ))
        }
        Kind::Logical | Kind::Integer => {
            let pieces: Vec<&[i32]> = coerced
                .iter()
                .map(|v| match v.data() {
                    VectorData::Logical(d) | VectorData::Integer(d) => d.as_slice(),
                    _ => unreachable!(),
                })
                .collect();
            let folded = fold_positions(
                &pieces,
                n,
                |&x| x == NA_INTEGER,
                pick_ord(which),
                NA_INTEGER,
                na_rm,
            );
            match kind {
                Kind::Logical => VectorData::Logical(folded),
                _ => VectorData::Integer(folded),
            }
        }
        Kind::Double => {
            let pieces: Vec<&[f64]> = coerced
                .iter()
                .map(|v| match v.data() {
                    VectorData::Double(d) => d.as_slice(),
                    _ => unreachable!(),
                })
                .collect();
            // NaN counts as missing here, like the source language's is.na.
            VectorData::Double(fold_positions(
                &pieces,
                n,
                |x| x.is_nan(),
                match which {
                    Extreme::Min => |a: &f64, b: &f64| a < b,
                    Extreme::Max => |a: &f64, b: &f64| a > b,
                },
                crate::value::na_real(),
                na_rm,
            ))
        }
        Kind::Character => {
            let pieces: Vec<&[Option<String>]> = coerced
                .iter()
                .map(|v| match v.data() {
                    VectorData::Character(d) => d.as_slice(),
                    _ => unreachable!(),
                })
                .collect();
            VectorData::Character(fold_positions(
                &pieces,
                n,
                |x| x.is_none(),
                match which {
                    Extreme::Min => |a: &Option<String>, b: &Option<String>| a < b,
                    Extreme::Max => |a: &Option<String>, b: &Option<String>| a > b,
                },
                None,
                na_rm,
            ))
        }
        Kind::Complex | Kind::List => unreachable!("rejected above"),
    };

    let mut out = RVector::new(data);
    if let Some(longest) = vectors.iter().find(|v| v.len() == n) {
        out.copy_attributes_from(longest);
    }
    Ok(RValue::Vector(out))
}

fn pick_ord<T: Ord>(which: Extreme) -> fn(&T, &T) -> bool {
    match which {
        Extreme::Min => |a, b| a < b,
        Extreme::Max => |a, b| a > b,
    }
}

/// Position-wise fold: `better(candidate, best)` decides replacement; a
/// missing operand poisons the position unless `na_rm` is set.
fn fold_positions<T, N, B>(
    pieces: &[&[T]],
    n: usize,
    is_na: N,
    better: B,
    na: T,
    na_rm: bool,
) -> Vec<T>
where
    T: Clone,
    N: Fn(&T) -> bool,
    B: Fn(&T, &T) -> bool,
{
    let mut out = Vec::with_capacity(n);
    for j in 0..n {
        let mut best: Option<&T> = None;
        let mut poisoned = false;
        for piece in pieces {
            let x = &piece[j % piece.len()];
            if is_na(x) {
                if !na_rm {
                    poisoned = true;
                }
                continue;
            }
            best = match best {
                Some(b) if !better(x, b) => Some(b),
                _ => Some(x),
            };
        }
        if poisoned {
            out.push(na.clone());
        } else {
            out.push(best.cloned().unwrap_or_else(|| na.clone()));
        }
    }
    out
}
