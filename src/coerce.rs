//! Type precedence lattice and the coercion engine.
//!
//! Precedence is fixed per kind, never inferred from content:
//! raw < logical < integer < double < complex < character < list.
//! Coercion is total: a failed narrowing is a per-element event that
//! contributes the target's NA and at most one `CoercionLoss` warning for
//! the whole call, never an error. Call sites that must reject a shape
//! outright (list to atomic at strict builtins) check before coercing.

use crate::complex::Complex;
use crate::error::{Warning, Warnings};
use crate::value::{
    is_na_complex, is_na_real, na_complex, na_real, Kind, RValue, RVector, VectorData, NA_INTEGER,
    NA_LOGICAL,
};

/// Rank of a kind in the coercion order. Strictly increasing along the
/// lattice; the only consumer ordering decisions ever look at.
pub fn precedence(kind: Kind) -> u8 {
    match kind {
        Kind::Raw => 0,
        Kind::Logical => 1,
        Kind::Integer => 2,
        Kind::Double => 3,
        Kind::Complex => 4,
        Kind::Character => 5,
        Kind::List => 6,
    }
}

/// The join of two kinds: whichever ranks higher.
pub fn join_kind(a: Kind, b: Kind) -> Kind {
    if precedence(a) >= precedence(b) {
        a
    } else {
        b
    }
}

/// Fold the precedence of a sequence of argument values. Null arguments
/// impose no constraint; a fold in which no argument carried a kind
/// yields `None`, the "produce NULL" signal. A typed zero-length vector
/// folds with its own kind: it constrains the result type, just not its
/// length.
pub fn fold_precedence<'a, I>(values: I) -> Option<Kind>
where
    I: IntoIterator<Item = &'a RValue>,
{
    let mut acc: Option<Kind> = None;
    for value in values {
        if let RValue::Vector(v) = value {
            acc = Some(match acc {
                None => v.kind(),
                Some(k) => join_kind(k, v.kind()),
            });
        }
    }
    acc
}

/// Convert `v` to `target`, preserving `names` and dropping every other
/// attribute. Coercing a vector to its own kind is the identity (all
/// attributes kept).
pub fn coerce(v: &RVector, target: Kind, warnings: &mut Warnings) -> RVector {
    if v.kind() == target {
        return v.clone();
    }
    let data = match target {
        Kind::Raw => VectorData::Raw(to_raw(v.data(), warnings)),
        Kind::Logical => VectorData::Logical(to_logical(v.data(), warnings)),
        Kind::Integer => VectorData::Integer(to_integer(v.data(), warnings)),
        Kind::Double => VectorData::Double(to_double(v.data(), warnings)),
        Kind::Complex => VectorData::Complex(to_complex(v.data(), warnings)),
        Kind::Character => VectorData::Character(to_character(v.data(), warnings)),
        Kind::List => VectorData::List(to_list(v.data())),
    };
    let mut out = RVector::new(data);
    if let Some(names) = v.names() {
        // set_names cannot fail here: the name vector already fits.
        let _ = out.set_names(Some(names.clone()));
    }
    out
}

// ---- narrowing helpers ----

/// Double to integer. NA and NaN propagate silently; non-integral and
/// out-of-range values are failed narrowings.
fn narrow_real_to_int(x: f64, lossy: &mut bool) -> i32 {
    if x.is_nan() {
        return NA_INTEGER;
    }
    if x.fract() != 0.0 || x < -2_147_483_647.0 || x > 2_147_483_647.0 {
        *lossy = true;
        return NA_INTEGER;
    }
    x as i32
}

fn real_to_raw(x: f64, lossy: &mut bool) -> u8 {
    if x.is_nan() {
        *lossy = true;
        return 0;
    }
    let t = x.trunc();
    if !(0.0..=255.0).contains(&t) {
        *lossy = true;
        return 0;
    }
    t as u8
}

fn parse_real(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    t.parse::<f64>().ok()
}

/// Complex notation: `a+bi` / `a-bi` / `bi`, with each part an ordinary
/// decimal. Returns `None` for anything else.
fn parse_complex(s: &str) -> Option<Complex> {
    let t = s.trim();
    let body = t.strip_suffix('i')?;
    // Split at the sign of the imaginary part: the last '+'/'-' that is
    // not a leading sign and not part of an exponent.
    let bytes = body.as_bytes();
    let mut split = None;
    for i in (1..bytes.len()).rev() {
        let c = bytes[i];
        if (c == b'+' || c == b'-') && bytes[i - 1] != b'e' && bytes[i - 1] != b'E' {
            split = Some(i);
            break;
        }
    }
    match split {
        Some(i) => {
            let re: f64 = body[..i].trim().parse().ok()?;
            let sign = if bytes[i] == b'-' { -1.0 } else { 1.0 };
            let im_text = body[i + 1..].trim();
            let im: f64 = if im_text.is_empty() {
                1.0
            } else {
                im_text.parse().ok()?
            };
            Some(Complex::new(re, sign * im))
        }
        None => {
            let im: f64 = body.trim().parse().ok()?;
            Some(Complex::new(0.0, im))
        }
    }
}

fn fmt_real(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf".to_string() } else { "-Inf".to_string() }
    } else {
        format!("{}", x)
    }
}

// ---- per-target conversions ----

fn to_logical(data: &VectorData, warnings: &mut Warnings) -> Vec<i32> {
    let mut lossy = false;
    let out: Vec<i32> = match data {
        VectorData::Raw(v) => v.iter().map(|&x| (x != 0) as i32).collect(),
        VectorData::Logical(v) => v.clone(),
        VectorData::Integer(v) => v
            .iter()
            .map(|&x| if x == NA_INTEGER { NA_LOGICAL } else { (x != 0) as i32 })
            .collect(),
        VectorData::Double(v) => v
            .iter()
            .map(|&x| if x.is_nan() { NA_LOGICAL } else { (x != 0.0) as i32 })
            .collect(),
        VectorData::Complex(v) => v
            .iter()
            .map(|c| {
                if c.real.is_nan() {
                    NA_LOGICAL
                } else {
                    (c.real != 0.0 || c.imag != 0.0) as i32
                }
            })
            .collect(),
        VectorData::Character(v) => v
            .iter()
            .map(|s| match s.as_deref() {
                None => NA_LOGICAL,
                Some("TRUE") | Some("T") => 1,
                Some("FALSE") | Some("F") => 0,
                Some(_) => {
                    lossy = true;
                    NA_LOGICAL
                }
            })
            .collect(),
        VectorData::List(items) => from_list(items, Kind::Logical, &mut lossy, warnings, |v| {
            match v.data() {
                VectorData::Logical(x) => x[0],
                _ => NA_LOGICAL,
            }
        }),
    };
    if lossy {
        warnings.emit(Warning::CoercionLoss);
    }
    out
}

fn to_integer(data: &VectorData, warnings: &mut Warnings) -> Vec<i32> {
    let mut lossy = false;
    let out: Vec<i32> = match data {
        VectorData::Raw(v) => v.iter().map(|&x| x as i32).collect(),
        VectorData::Logical(v) => v.clone(),
        VectorData::Integer(v) => v.clone(),
        VectorData::Double(v) => v
            .iter()
            .map(|&x| narrow_real_to_int(x, &mut lossy))
            .collect(),
        VectorData::Complex(v) => {
            let mut discarded = false;
            let out = v
                .iter()
                .map(|c| {
                    if !c.real.is_nan() && c.imag != 0.0 {
                        discarded = true;
                    }
                    narrow_real_to_int(c.real, &mut lossy)
                })
                .collect();
            if discarded {
                warnings.emit(Warning::ImaginaryDiscarded);
            }
            out
        }
        VectorData::Character(v) => v
            .iter()
            .map(|s| match s {
                None => NA_INTEGER,
                Some(text) => match parse_real(text) {
                    Some(x) => narrow_real_to_int(x, &mut lossy),
                    None => {
                        lossy = true;
                        NA_INTEGER
                    }
                },
            })
            .collect(),
        VectorData::List(items) => from_list(items, Kind::Integer, &mut lossy, warnings, |v| {
            match v.data() {
                VectorData::Integer(x) => x[0],
                _ => NA_INTEGER,
            }
        }),
    };
    if lossy {
        warnings.emit(Warning::CoercionLoss);
    }
    out
}

fn to_double(data: &VectorData, warnings: &mut Warnings) -> Vec<f64> {
    let mut lossy = false;
    let out: Vec<f64> = match data {
        VectorData::Raw(v) => v.iter().map(|&x| x as f64).collect(),
        VectorData::Logical(v) | VectorData::Integer(v) => v
            .iter()
            .map(|&x| if x == NA_INTEGER { na_real() } else { x as f64 })
            .collect(),
        VectorData::Double(v) => v.clone(),
        VectorData::Complex(v) => {
            let discarded = v
                .iter()
                .any(|c| !c.real.is_nan() && c.imag != 0.0);
            if discarded {
                warnings.emit(Warning::ImaginaryDiscarded);
            }
            v.iter().map(|c| c.real).collect()
        }
        VectorData::Character(v) => v
            .iter()
            .map(|s| match s {
                None => na_real(),
                Some(text) => match parse_real(text) {
                    Some(x) => x,
                    None => {
                        lossy = true;
                        na_real()
                    }
                },
            })
            .collect(),
        VectorData::List(items) => from_list(items, Kind::Double, &mut lossy, warnings, |v| {
            match v.data() {
                VectorData::Double(x) => x[0],
                _ => na_real(),
            }
        }),
    };
    if lossy {
        warnings.emit(Warning::CoercionLoss);
    }
    out
}

fn to_complex(data: &VectorData, warnings: &mut Warnings) -> Vec<Complex> {
    let mut lossy = false;
    let out: Vec<Complex> = match data {
        VectorData::Raw(v) => v.iter().map(|&x| Complex::from_real(x as f64)).collect(),
        VectorData::Logical(v) | VectorData::Integer(v) => v
            .iter()
            .map(|&x| {
                if x == NA_INTEGER {
                    na_complex()
                } else {
                    Complex::from_real(x as f64)
                }
            })
            .collect(),
        VectorData::Double(v) => v
            .iter()
            .map(|&x| if is_na_real(x) { na_complex() } else { Complex::from_real(x) })
            .collect(),
        VectorData::Complex(v) => v.clone(),
        VectorData::Character(v) => v
            .iter()
            .map(|s| match s {
                None => na_complex(),
                Some(text) => match parse_complex(text)
                    .or_else(|| parse_real(text).map(Complex::from_real))
                {
                    Some(c) => c,
                    None => {
                        lossy = true;
                        na_complex()
                    }
                },
            })
            .collect(),
        VectorData::List(items) => from_list(items, Kind::Complex, &mut lossy, warnings, |v| {
            match v.data() {
                VectorData::Complex(x) => x[0],
                _ => na_complex(),
            }
        }),
    };
    if lossy {
        warnings.emit(Warning::CoercionLoss);
    }
    out
}

fn to_character(data: &VectorData, warnings: &mut Warnings) -> Vec<Option<String>> {
    let mut lossy = false;
    let out: Vec<Option<String>> = match data {
        VectorData::Raw(v) => v.iter().map(|&x| Some(format!("{:02x}", x))).collect(),
        VectorData::Logical(v) => v
            .iter()
            .map(|&x| match x {
                NA_LOGICAL => None,
                0 => Some("FALSE".to_string()),
                _ => Some("TRUE".to_string()),
            })
            .collect(),
        VectorData::Integer(v) => v
            .iter()
            .map(|&x| {
                if x == NA_INTEGER {
                    None
                } else {
                    Some(x.to_string())
                }
            })
            .collect(),
        VectorData::Double(v) => v
            .iter()
            .map(|&x| if is_na_real(x) { None } else { Some(fmt_real(x)) })
            .collect(),
        VectorData::Complex(v) => v
            .iter()
            .map(|c| {
                if is_na_complex(c) {
                    None
                } else {
                    Some(c.to_string())
                }
            })
            .collect(),
        VectorData::Character(v) => v.clone(),
        VectorData::List(items) => from_list(items, Kind::Character, &mut lossy, warnings, |v| {
            match v.data() {
                VectorData::Character(x) => x[0].clone(),
                _ => None,
            }
        }),
    };
    if lossy {
        warnings.emit(Warning::CoercionLoss);
    }
    out
}

fn to_raw(data: &VectorData, warnings: &mut Warnings) -> Vec<u8> {
    // Raw has no NA: every failure clamps to 00 under a single RawLoss.
    let mut lossy = false;
    let out: Vec<u8> = match data {
        VectorData::Raw(v) => v.clone(),
        VectorData::Logical(v) | VectorData::Integer(v) => v
            .iter()
            .map(|&x| {
                if x == NA_INTEGER || !(0..=255).contains(&x) {
                    lossy = true;
                    0
                } else {
                    x as u8
                }
            })
            .collect(),
        VectorData::Double(v) => v.iter().map(|&x| real_to_raw(x, &mut lossy)).collect(),
        VectorData::Complex(v) => {
            let discarded = v.iter().any(|c| !c.real.is_nan() && c.imag != 0.0);
            if discarded {
                warnings.emit(Warning::ImaginaryDiscarded);
            }
            v.iter().map(|c| real_to_raw(c.real, &mut lossy)).collect()
        }
        VectorData::Character(v) => v
            .iter()
            .map(|s| match s.as_deref().and_then(parse_real) {
                Some(x) => real_to_raw(x, &mut lossy),
                None => {
                    lossy = true;
                    0
                }
            })
            .collect(),
        VectorData::List(items) => {
            let mut na_lossy = false;
            let out = from_list(items, Kind::Raw, &mut na_lossy, warnings, |v| {
                match v.data() {
                    VectorData::Raw(x) => x[0],
                    _ => 0,
                }
            });
            lossy = na_lossy;
            out
        }
    };
    if lossy {
        warnings.emit(Warning::RawLoss);
    }
    out
}

fn to_list(data: &VectorData) -> Vec<RValue> {
    match data {
        VectorData::Raw(v) => v
            .iter()
            .map(|&x| RValue::Vector(RVector::raw(vec![x])))
            .collect(),
        VectorData::Logical(v) => v
            .iter()
            .map(|&x| RValue::Vector(RVector::logical(vec![x])))
            .collect(),
        VectorData::Integer(v) => v
            .iter()
            .map(|&x| RValue::Vector(RVector::integer(vec![x])))
            .collect(),
        VectorData::Double(v) => v
            .iter()
            .map(|&x| RValue::Vector(RVector::double(vec![x])))
            .collect(),
        VectorData::Complex(v) => v
            .iter()
            .map(|&c| RValue::Vector(RVector::complex(vec![c])))
            .collect(),
        VectorData::Character(v) => v
            .iter()
            .map(|s| RValue::Vector(RVector::character(vec![s.clone()])))
            .collect(),
        VectorData::List(items) => items.clone(),
    }
}

/// List to atomic: each element must itself be a length-1 atomic vector
/// coercible to the target. Anything else fails that element. An absent
/// slot is ordinary NA propagation, not a failure.
fn from_list<T>(
    items: &[RValue],
    target: Kind,
    lossy: &mut bool,
    warnings: &mut Warnings,
    extract: impl Fn(&RVector) -> T,
) -> Vec<T>
where
    T: Clone,
{
    let na_template = RVector::na_scalar(target);
    items
        .iter()
        .map(|item| match item {
            RValue::Missing => extract(&na_template),
            RValue::Vector(v) if v.len() == 1 && v.kind() != Kind::List => {
                let coerced = coerce(v, target, warnings);
                extract(&coerced)
            }
            _ => {
                *lossy = true;
                extract(&na_template)
            }
        })
        .collect()
}
