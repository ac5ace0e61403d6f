//! The vector value model: tagged typed vectors with per-kind NA
//! sentinels, a completeness fast-path flag, and an ordered attribute set
//! (`names`, `dim`, `dimnames`, `class`, arbitrary).
//!
//! Vectors are deep-owned values. Copy-on-write bookkeeping across
//! bindings belongs to the embedding interpreter; the engines here only
//! promise that they never mutate an input in place.

use crate::complex::Complex;
use crate::error::{VelaError, VelaResult};

/// The closed set of vector kinds. Expression vectors of the source
/// language are treated as List-equivalent and do not get a tag of their
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Raw,
    Logical,
    Integer,
    Double,
    Complex,
    Character,
    List,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Raw => "raw",
            Kind::Logical => "logical",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::Complex => "complex",
            Kind::Character => "character",
            Kind::List => "list",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// NA sentinel for Integer vectors.
pub const NA_INTEGER: i32 = i32::MIN;
/// NA sentinel for Logical vectors (stored as 0 / 1 / sentinel).
pub const NA_LOGICAL: i32 = i32::MIN;

/// Bit pattern of the Double NA: a quiet NaN whose low word is 1954,
/// distinguishable from every ordinary NaN the FPU produces.
pub(crate) const NA_REAL_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// The Double NA sentinel.
#[inline]
pub fn na_real() -> f64 {
    f64::from_bits(NA_REAL_BITS)
}

/// True for the NA payload only; ordinary NaN is not NA.
#[inline]
pub fn is_na_real(x: f64) -> bool {
    x.is_nan() && (x.to_bits() & 0xFFFF_FFFF) == (NA_REAL_BITS & 0xFFFF_FFFF)
}

/// The complex NA: a complex element is missing iff its real part is.
#[inline]
pub fn na_complex() -> Complex {
    Complex::new(na_real(), na_real())
}

#[inline]
pub fn is_na_complex(c: &Complex) -> bool {
    is_na_real(c.real)
}

/// NA-aware equality for doubles: NA equals NA, NaN equals NaN, and the
/// two are distinct from each other and from every ordinary value.
#[inline]
pub(crate) fn real_eq(a: f64, b: f64) -> bool {
    let na_a = is_na_real(a);
    let na_b = is_na_real(b);
    if na_a || na_b {
        return na_a && na_b;
    }
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b
}

#[inline]
pub(crate) fn complex_eq(a: &Complex, b: &Complex) -> bool {
    real_eq(a.real, b.real) && real_eq(a.imag, b.imag)
}

/// Per-kind contiguous storage. Logical is kept as `i32` so the three
/// states (0, 1, NA sentinel) share one representation with Integer.
#[derive(Debug, Clone)]
pub enum VectorData {
    Raw(Vec<u8>),
    Logical(Vec<i32>),
    Integer(Vec<i32>),
    Double(Vec<f64>),
    Complex(Vec<Complex>),
    Character(Vec<Option<String>>),
    List(Vec<RValue>),
}

impl VectorData {
    pub fn kind(&self) -> Kind {
        match self {
            VectorData::Raw(_) => Kind::Raw,
            VectorData::Logical(_) => Kind::Logical,
            VectorData::Integer(_) => Kind::Integer,
            VectorData::Double(_) => Kind::Double,
            VectorData::Complex(_) => Kind::Complex,
            VectorData::Character(_) => Kind::Character,
            VectorData::List(_) => Kind::List,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VectorData::Raw(v) => v.len(),
            VectorData::Logical(v) => v.len(),
            VectorData::Integer(v) => v.len(),
            VectorData::Double(v) => v.len(),
            VectorData::Complex(v) => v.len(),
            VectorData::Character(v) => v.len(),
            VectorData::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn scan_complete(&self) -> bool {
        match self {
            VectorData::Raw(_) => true,
            VectorData::Logical(v) => !v.iter().any(|&x| x == NA_LOGICAL),
            VectorData::Integer(v) => !v.iter().any(|&x| x == NA_INTEGER),
            VectorData::Double(v) => !v.iter().any(|&x| is_na_real(x)),
            VectorData::Complex(v) => !v.iter().any(is_na_complex),
            VectorData::Character(v) => !v.iter().any(|x| x.is_none()),
            VectorData::List(v) => !v.iter().any(|x| matches!(x, RValue::Missing)),
        }
    }
}

// Value identity: NA-aware element comparison. The completeness flag is a
// conservative hint, not part of the value, so it does not participate.
impl PartialEq for VectorData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (VectorData::Raw(a), VectorData::Raw(b)) => a == b,
            (VectorData::Logical(a), VectorData::Logical(b)) => a == b,
            (VectorData::Integer(a), VectorData::Integer(b)) => a == b,
            (VectorData::Double(a), VectorData::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| real_eq(x, y))
            }
            (VectorData::Complex(a), VectorData::Complex(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| complex_eq(x, y))
            }
            (VectorData::Character(a), VectorData::Character(b)) => a == b,
            (VectorData::List(a), VectorData::List(b)) => a == b,
            _ => false,
        }
    }
}

/// A runtime value as the engines see it: the null object, the absent
/// marker for list slots (distinct from a stored null), or a vector.
#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    Null,
    Missing,
    Vector(RVector),
}

impl RValue {
    pub fn vector(v: RVector) -> Self {
        RValue::Vector(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RValue::Null)
    }

    pub fn as_vector(&self) -> Option<&RVector> {
        match self {
            RValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Length the way the source language counts it: null is length zero.
    pub fn len(&self) -> usize {
        match self {
            RValue::Vector(v) => v.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered attribute table. Small by construction, so linear
/// lookup beats a map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    entries: Vec<(String, RValue)>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&RValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set(&mut self, name: &str, value: RValue) {
        if value.is_null() {
            self.remove(name);
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A typed vector: storage, the no-NA fast-path flag, and attributes.
#[derive(Debug, Clone)]
pub struct RVector {
    data: VectorData,
    complete: bool,
    attributes: Attributes,
}

impl PartialEq for RVector {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.attributes == other.attributes
    }
}

impl RVector {
    /// Wrap storage, scanning it for NA to establish the completeness flag.
    pub fn new(data: VectorData) -> Self {
        let complete = data.scan_complete();
        RVector {
            data,
            complete,
            attributes: Attributes::default(),
        }
    }

    /// Wrap storage with a caller-supplied completeness flag. The flag may
    /// be conservatively false for NA-free data, never true for data
    /// containing NA.
    pub(crate) fn from_parts(data: VectorData, complete: bool) -> Self {
        debug_assert!(!complete || data.scan_complete());
        RVector {
            data,
            complete,
            attributes: Attributes::default(),
        }
    }

    pub fn raw(data: Vec<u8>) -> Self {
        Self::new(VectorData::Raw(data))
    }

    pub fn logical(data: Vec<i32>) -> Self {
        Self::new(VectorData::Logical(data))
    }

    pub fn logical_from_bools(data: Vec<bool>) -> Self {
        Self::new(VectorData::Logical(
            data.into_iter().map(|b| b as i32).collect(),
        ))
    }

    pub fn integer(data: Vec<i32>) -> Self {
        Self::new(VectorData::Integer(data))
    }

    pub fn double(data: Vec<f64>) -> Self {
        Self::new(VectorData::Double(data))
    }

    pub fn complex(data: Vec<Complex>) -> Self {
        Self::new(VectorData::Complex(data))
    }

    pub fn character(data: Vec<Option<String>>) -> Self {
        Self::new(VectorData::Character(data))
    }

    pub fn character_from_strs(data: &[&str]) -> Self {
        Self::new(VectorData::Character(
            data.iter().map(|s| Some((*s).to_string())).collect(),
        ))
    }

    pub fn list(items: Vec<RValue>) -> Self {
        Self::new(VectorData::List(items))
    }

    /// A zero-length vector of the given kind.
    pub fn empty(kind: Kind) -> Self {
        let data = match kind {
            Kind::Raw => VectorData::Raw(Vec::new()),
            Kind::Logical => VectorData::Logical(Vec::new()),
            Kind::Integer => VectorData::Integer(Vec::new()),
            Kind::Double => VectorData::Double(Vec::new()),
            Kind::Complex => VectorData::Complex(Vec::new()),
            Kind::Character => VectorData::Character(Vec::new()),
            Kind::List => VectorData::List(Vec::new()),
        };
        Self::new(data)
    }

    /// A length-one vector holding the kind's NA.
    pub fn na_scalar(kind: Kind) -> Self {
        match kind {
            Kind::Raw => Self::raw(vec![0]),
            Kind::Logical => Self::logical(vec![NA_LOGICAL]),
            Kind::Integer => Self::integer(vec![NA_INTEGER]),
            Kind::Double => Self::double(vec![na_real()]),
            Kind::Complex => Self::complex(vec![na_complex()]),
            Kind::Character => Self::character(vec![None]),
            Kind::List => Self::list(vec![RValue::Missing]),
        }
    }

    pub fn kind(&self) -> Kind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True iff no element is NA. May be conservatively false.
    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn into_data(self) -> VectorData {
        self.data
    }

    /// Whether element `i` is the kind's missing sentinel.
    pub fn is_na_at(&self, i: usize) -> bool {
        if self.complete {
            return false;
        }
        match &self.data {
            VectorData::Raw(_) => false,
            VectorData::Logical(v) => v[i] == NA_LOGICAL,
            VectorData::Integer(v) => v[i] == NA_INTEGER,
            VectorData::Double(v) => is_na_real(v[i]),
            VectorData::Complex(v) => is_na_complex(&v[i]),
            VectorData::Character(v) => v[i].is_none(),
            VectorData::List(v) => matches!(v[i], RValue::Missing),
        }
    }

    // ---- attributes ----

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&RValue> {
        self.attributes.get(name)
    }

    /// Set an arbitrary attribute without structural validation. The
    /// reserved names go through the typed setters below.
    pub fn set_attr(&mut self, name: &str, value: RValue) {
        self.attributes.set(name, value);
    }

    /// Install (or, with `None`, remove) element names. Shorter name
    /// vectors are padded with `""`; NA entries are normalized to `""`,
    /// which is the only "no name" encoding.
    pub fn set_names(&mut self, names: Option<RVector>) -> VelaResult<()> {
        let names = match names {
            None => {
                self.attributes.remove("names");
                return Ok(());
            }
            Some(n) => n,
        };
        if names.kind() != Kind::Character {
            return Err(VelaError::argument("names", "must be a character vector"));
        }
        if names.len() > self.len() {
            return Err(VelaError::argument(
                "names",
                format!(
                    "attribute length {} exceeds vector length {}",
                    names.len(),
                    self.len()
                ),
            ));
        }
        let mut padded: Vec<Option<String>> = match names.data {
            VectorData::Character(v) => v
                .into_iter()
                .map(|n| Some(n.unwrap_or_default()))
                .collect(),
            _ => unreachable!(),
        };
        padded.resize(self.len(), Some(String::new()));
        self.attributes
            .set("names", RValue::Vector(RVector::character(padded)));
        Ok(())
    }

    pub fn names(&self) -> Option<&RVector> {
        match self.attributes.get("names") {
            Some(RValue::Vector(v)) => Some(v),
            _ => None,
        }
    }

    /// Per-element names with `""` for unnamed positions, or `None` when
    /// the vector carries no names at all.
    pub fn element_names(&self) -> Option<Vec<String>> {
        let names = self.names()?;
        match names.data() {
            VectorData::Character(v) => Some(
                v.iter()
                    .map(|n| n.clone().unwrap_or_default())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Install dimensions. The element product must equal the length;
    /// setting `dim` drops `names` and `dimnames`, as assignment does in
    /// the source language.
    pub fn set_dim(&mut self, dim: Vec<i32>) -> VelaResult<()> {
        if dim.iter().any(|&d| d == NA_INTEGER || d < 0) {
            return Err(VelaError::argument(
                "dim",
                "dimensions must be non-negative and not NA",
            ));
        }
        let product: i64 = dim.iter().map(|&d| d as i64).product();
        if product != self.len() as i64 {
            return Err(VelaError::argument(
                "dim",
                format!(
                    "product of dimensions {} does not match vector length {}",
                    product,
                    self.len()
                ),
            ));
        }
        self.attributes.remove("names");
        self.attributes.remove("dimnames");
        self.attributes
            .set("dim", RValue::Vector(RVector::integer(dim)));
        Ok(())
    }

    pub fn dim(&self) -> Option<Vec<i32>> {
        match self.attributes.get("dim") {
            Some(RValue::Vector(v)) => match v.data() {
                VectorData::Integer(d) => Some(d.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Install dimension names: a list with one entry per dimension, each
    /// entry null or a character vector of that dimension's extent.
    pub fn set_dimnames(&mut self, dimnames: Option<RVector>) -> VelaResult<()> {
        let dimnames = match dimnames {
            None => {
                self.attributes.remove("dimnames");
                return Ok(());
            }
            Some(d) => d,
        };
        let dim = match self.dim() {
            Some(d) => d,
            None => {
                return Err(VelaError::argument(
                    "dimnames",
                    "applied to a vector without dimensions",
                ))
            }
        };
        if dimnames.kind() != Kind::List || dimnames.len() != dim.len() {
            return Err(VelaError::argument(
                "dimnames",
                format!("must be a list of length {}", dim.len()),
            ));
        }
        if let VectorData::List(entries) = dimnames.data() {
            for (axis, entry) in entries.iter().enumerate() {
                match entry {
                    RValue::Null => {}
                    RValue::Vector(v)
                        if v.kind() == Kind::Character && v.len() == dim[axis] as usize => {}
                    _ => {
                        return Err(VelaError::argument(
                            "dimnames",
                            format!(
                                "entry {} must be null or a character vector of length {}",
                                axis + 1,
                                dim[axis]
                            ),
                        ))
                    }
                }
            }
        }
        self.attributes
            .set("dimnames", RValue::Vector(dimnames));
        Ok(())
    }

    pub fn dimnames(&self) -> Option<&RVector> {
        match self.attributes.get("dimnames") {
            Some(RValue::Vector(v)) => Some(v),
            _ => None,
        }
    }

    pub fn set_class(&mut self, class: Option<Vec<String>>) {
        match class {
            None => self.attributes.remove("class"),
            Some(names) => {
                let data = names.into_iter().map(Some).collect();
                self.attributes
                    .set("class", RValue::Vector(RVector::character(data)));
            }
        }
    }

    pub fn class_attr(&self) -> Option<Vec<String>> {
        match self.attributes.get("class") {
            Some(RValue::Vector(v)) => match v.data() {
                VectorData::Character(names) => Some(
                    names
                        .iter()
                        .map(|n| n.clone().unwrap_or_default())
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// Copy every attribute of `other` onto `self`, replacing existing
    /// entries. Used where the source language transplants attributes
    /// wholesale (parallel extremes).
    pub(crate) fn copy_attributes_from(&mut self, other: &RVector) {
        for (name, value) in other.attributes.iter() {
            self.attributes.set(name, value.clone());
        }
    }

    /// Same data and completeness, attributes dropped.
    pub fn without_attributes(&self) -> RVector {
        RVector {
            data: self.data.clone(),
            complete: self.complete,
            attributes: Attributes::default(),
        }
    }
}

/// A builtin call argument: a forced value with an optional tag. Tags
/// drive name propagation in combine and the bound-dimension names in the
/// bind engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: RValue,
}

impl Argument {
    pub fn positional(value: RValue) -> Self {
        Argument { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: RValue) -> Self {
        Argument {
            name: Some(name.into()),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_real_is_nan_but_distinct_from_nan() {
        let na = na_real();
        assert!(na.is_nan());
        assert!(is_na_real(na));
        assert!(!is_na_real(f64::NAN));
        assert!(!is_na_real(0.0 / 0.0));
    }

    #[test]
    fn completeness_is_scanned_per_kind() {
        assert!(RVector::integer(vec![1, 2]).complete());
        assert!(!RVector::integer(vec![1, NA_INTEGER]).complete());
        assert!(!RVector::double(vec![na_real()]).complete());
        // NaN is not NA: the vector is complete in the statistical sense.
        assert!(RVector::double(vec![f64::NAN]).complete());
        assert!(!RVector::character(vec![Some("a".into()), None]).complete());
        assert!(RVector::raw(vec![0, 255]).complete());
        assert!(!RVector::list(vec![RValue::Missing]).complete());
        assert!(RVector::list(vec![RValue::Null]).complete());
    }

    #[test]
    fn value_identity_treats_na_as_self_equal() {
        let a = RVector::double(vec![1.0, na_real(), f64::NAN]);
        let b = RVector::double(vec![1.0, na_real(), f64::NAN]);
        assert_eq!(a, b);
        let c = RVector::double(vec![1.0, f64::NAN, f64::NAN]);
        assert_ne!(a, c);
    }

    #[test]
    fn dim_requires_matching_product() {
        let mut v = RVector::integer(vec![1, 2, 3, 4, 5, 6]);
        assert!(v.set_dim(vec![2, 3]).is_ok());
        assert_eq!(v.dim(), Some(vec![2, 3]));
        let mut w = RVector::integer(vec![1, 2, 3]);
        assert!(w.set_dim(vec![2, 2]).is_err());
    }

    #[test]
    fn names_are_padded_and_normalized() {
        let mut v = RVector::integer(vec![1, 2, 3]);
        v.set_names(Some(RVector::character(vec![Some("a".into()), None])))
            .unwrap();
        assert_eq!(
            v.element_names(),
            Some(vec!["a".to_string(), String::new(), String::new()])
        );
    }

    #[test]
    fn setting_dim_drops_names() {
        let mut v = RVector::integer(vec![1, 2, 3, 4]);
        v.set_names(Some(RVector::character_from_strs(&["a", "b", "c", "d"])))
            .unwrap();
        v.set_dim(vec![2, 2]).unwrap();
        assert!(v.names().is_none());
    }
}
