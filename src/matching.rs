//! Hash-based matching: `match`, `%in%`, `duplicated`, `unique`.
//!
//! Equality here is the matching rule of the source language, not IEEE:
//! NA matches NA, NaN matches NaN, and the two are distinct from each
//! other and from every ordinary value. Doubles are keyed by canonical
//! bit patterns so that `-0.0` and `0.0` share a bucket while the NA
//! payload and ordinary NaN get one bucket each.

use std::collections::{HashMap, HashSet};

use crate::coerce::{coerce, join_kind};
use crate::complex::Complex;
use crate::error::{VelaError, VelaResult, Warnings};
use crate::value::{is_na_real, Kind, RVector, VectorData};

/// Canonical bucket key for one vector element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HashKey<'a> {
    Byte(u8),
    Int(i32),
    Bits(u64),
    Pair(u64, u64),
    Str(&'a str),
    NaStr,
}

const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

fn real_bits(x: f64) -> u64 {
    if is_na_real(x) {
        crate::value::NA_REAL_BITS
    } else if x.is_nan() {
        CANONICAL_NAN_BITS
    } else if x == 0.0 {
        // collapses -0.0 and 0.0
        0
    } else {
        x.to_bits()
    }
}

fn keys_of(v: &RVector) -> Vec<HashKey<'_>> {
    match v.data() {
        VectorData::Raw(data) => data.iter().map(|&x| HashKey::Byte(x)).collect(),
        VectorData::Logical(data) | VectorData::Integer(data) => {
            data.iter().map(|&x| HashKey::Int(x)).collect()
        }
        VectorData::Double(data) => data.iter().map(|&x| HashKey::Bits(real_bits(x))).collect(),
        VectorData::Complex(data) => data
            .iter()
            .map(|c: &Complex| HashKey::Pair(real_bits(c.real), real_bits(c.imag)))
            .collect(),
        VectorData::Character(data) => data
            .iter()
            .map(|s| match s {
                Some(text) => HashKey::Str(text),
                None => HashKey::NaStr,
            })
            .collect(),
        VectorData::List(_) => unreachable!("list operands are rejected before keying"),
    }
}

fn reject_list(v: &RVector) -> VelaResult<()> {
    if v.kind() == Kind::List {
        return Err(VelaError::not_implemented("matching on list vectors"));
    }
    Ok(())
}

/// First-occurrence index of each element of `x` in `table`, 1-based,
/// `no_match` where absent. Both operands are first coerced to their
/// joint precedence kind. One unconditional hash index is used; the
/// original's scan-vs-hash threshold is not an observable.
pub fn match_in(
    x: &RVector,
    table: &RVector,
    no_match: i32,
    warnings: &mut Warnings,
) -> VelaResult<RVector> {
    reject_list(x)?;
    reject_list(table)?;
    let kind = join_kind(x.kind(), table.kind());
    let x = coerce(x, kind, warnings);
    let table = coerce(table, kind, warnings);

    let table_keys = keys_of(&table);
    let mut index: HashMap<&HashKey, usize> = HashMap::with_capacity(table_keys.len());
    for (i, key) in table_keys.iter().enumerate() {
        index.entry(key).or_insert(i);
    }

    let out: Vec<i32> = keys_of(&x)
        .iter()
        .map(|key| match index.get(key) {
            Some(&i) => (i + 1) as i32,
            None => no_match,
        })
        .collect();
    Ok(RVector::integer(out))
}

/// `%in%`: membership as a complete logical vector.
pub fn is_element(x: &RVector, table: &RVector, warnings: &mut Warnings) -> VelaResult<RVector> {
    let matched = match_in(x, table, 0, warnings)?;
    let out = match matched.data() {
        VectorData::Integer(v) => v.iter().map(|&i| (i != 0) as i32).collect(),
        _ => unreachable!(),
    };
    Ok(RVector::logical(out))
}

/// `duplicated`: TRUE where an equal element occurred earlier in scan
/// order; the first occurrence in that order is always FALSE.
pub fn duplicated(x: &RVector, from_last: bool) -> VelaResult<RVector> {
    reject_list(x)?;
    let keys = keys_of(x);
    let mut seen: HashSet<&HashKey> = HashSet::with_capacity(keys.len());
    let mut out = vec![0i32; keys.len()];
    let positions: Box<dyn Iterator<Item = usize>> = if from_last {
        Box::new((0..keys.len()).rev())
    } else {
        Box::new(0..keys.len())
    };
    for i in positions {
        if !seen.insert(&keys[i]) {
            out[i] = 1;
        }
    }
    Ok(RVector::logical(out))
}

/// `unique`: stable distinct elements, first occurrence in scan order
/// wins. Attributes are dropped.
pub fn unique(x: &RVector, from_last: bool) -> VelaResult<RVector> {
    let dup = duplicated(x, from_last)?;
    let keep: Vec<bool> = match dup.data() {
        VectorData::Logical(v) => v.iter().map(|&d| d == 0).collect(),
        _ => unreachable!(),
    };
    let data = match x.data() {
        VectorData::Raw(v) => VectorData::Raw(filter(v, &keep)),
        VectorData::Logical(v) => VectorData::Logical(filter(v, &keep)),
        VectorData::Integer(v) => VectorData::Integer(filter(v, &keep)),
        VectorData::Double(v) => VectorData::Double(filter(v, &keep)),
        VectorData::Complex(v) => VectorData::Complex(filter(v, &keep)),
        VectorData::Character(v) => VectorData::Character(filter(v, &keep)),
        VectorData::List(_) => unreachable!("rejected by duplicated"),
    };
    Ok(RVector::new(data))
}

fn filter<T: Clone>(data: &[T], keep: &[bool]) -> Vec<T> {
    data.iter()
        .zip(keep)
        .filter(|(_, &k)| k)
        .map(|(x, _)| x.clone())
        .collect()
}
