//! Stable multi-key ordering (`order`).
//!
//! Produces a 1-based permutation sorting rows by the lexicographic
//! comparison of the key vectors. Missing keys (NA, and NaN for doubles)
//! are placed by `na_last` regardless of `decreasing`; ties fall through
//! to the next key and finally to the original index, which `std`'s
//! stable sort provides for free.

use std::cmp::Ordering;

use crate::error::{VelaError, VelaResult};
use crate::value::{Kind, RVector, VectorData, NA_INTEGER};

pub fn order(keys: &[&RVector], na_last: bool, decreasing: bool) -> VelaResult<RVector> {
    if keys.is_empty() {
        return Err(VelaError::argument("...", "no ordering keys supplied"));
    }
    for key in keys {
        if key.kind() == Kind::List {
            return Err(VelaError::argument(
                "...",
                "ordering keys must be atomic vectors",
            ));
        }
    }
    let n = keys[0].len();
    if keys.iter().any(|k| k.len() != n) {
        return Err(VelaError::argument("...", "ordering keys differ in length"));
    }

    let mut perm: Vec<usize> = (0..n).collect();
    perm.sort_by(|&a, &b| {
        for key in keys {
            let ord = compare_in(key, a, b, na_last, decreasing);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    Ok(RVector::integer(
        perm.into_iter().map(|i| (i + 1) as i32).collect(),
    ))
}

fn compare_in(key: &RVector, a: usize, b: usize, na_last: bool, decreasing: bool) -> Ordering {
    match key.data() {
        VectorData::Raw(v) => directed(v[a].cmp(&v[b]), decreasing),
        VectorData::Logical(v) | VectorData::Integer(v) => {
            match (v[a] == NA_INTEGER, v[b] == NA_INTEGER) {
                (true, true) => Ordering::Equal,
                (true, false) => missing_rank(na_last),
                (false, true) => missing_rank(na_last).reverse(),
                (false, false) => directed(v[a].cmp(&v[b]), decreasing),
            }
        }
        VectorData::Double(v) => match (v[a].is_nan(), v[b].is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => missing_rank(na_last),
            (false, true) => missing_rank(na_last).reverse(),
            (false, false) => directed(
                v[a].partial_cmp(&v[b]).unwrap_or(Ordering::Equal),
                decreasing,
            ),
        },
        VectorData::Complex(v) => match (v[a].real.is_nan(), v[b].real.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => missing_rank(na_last),
            (false, true) => missing_rank(na_last).reverse(),
            (false, false) => {
                let real = v[a].real.partial_cmp(&v[b].real).unwrap_or(Ordering::Equal);
                let ord = if real != Ordering::Equal {
                    real
                } else {
                    v[a].imag.partial_cmp(&v[b].imag).unwrap_or(Ordering::Equal)
                };
                directed(ord, decreasing)
            }
        },
        VectorData::Character(v) => match (&v[a], &v[b]) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => missing_rank(na_last),
            (Some(_), None) => missing_rank(na_last).reverse(),
            (Some(x), Some(y)) => directed(x.cmp(y), decreasing),
        },
        VectorData::List(_) => unreachable!("list keys are rejected up front"),
    }
}

#[inline]
fn missing_rank(na_last: bool) -> Ordering {
    if na_last {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

#[inline]
fn directed(ord: Ordering, decreasing: bool) -> Ordering {
    if decreasing {
        ord.reverse()
    } else {
        ord
    }
}
