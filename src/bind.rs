//! The matrix bind engine behind `cbind` and `rbind`.
//!
//! Arguments are vectors (one column/row each) or matrices (their
//! columns/rows). The bound extent is dictated by the matrices when any
//! are present, otherwise by the longest vector; shorter vectors recycle
//! modularly with a once-per-argument warning when their length does not
//! evenly divide the extent. Arrays of more than two dimensions are an
//! intentional gap.

use crate::coerce::{coerce, join_kind};
use crate::complex::Complex;
use crate::error::{VelaError, VelaResult, Warning, Warnings};
use crate::value::{Kind, RValue, RVector, VectorData};

/// One `cbind`/`rbind` argument: the value, its explicit tag, and the
/// deparsed call text the caller may supply for it (deparsing itself is
/// the interpreter's job; it is consulted only when `deparse_level > 0`
/// and no explicit tag exists).
#[derive(Debug, Clone)]
pub struct BindArg {
    pub value: RValue,
    pub name: Option<String>,
    pub deparsed: Option<String>,
}

impl BindArg {
    pub fn positional(value: RValue) -> Self {
        BindArg {
            value,
            name: None,
            deparsed: None,
        }
    }

    pub fn named(name: impl Into<String>, value: RValue) -> Self {
        BindArg {
            value,
            name: Some(name.into()),
            deparsed: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Columns,
    Rows,
}

/// Bind arguments as columns of a matrix.
pub fn cbind(args: &[BindArg], deparse_level: i32, warnings: &mut Warnings) -> VelaResult<RValue> {
    bind(args, Direction::Columns, deparse_level, warnings)
}

/// Bind arguments as rows of a matrix.
pub fn rbind(args: &[BindArg], deparse_level: i32, warnings: &mut Warnings) -> VelaResult<RValue> {
    bind(args, Direction::Rows, deparse_level, warnings)
}

struct Participant<'a> {
    index: usize, // 1-based original argument position
    vector: &'a RVector,
    tag: Option<&'a str>,
    matrix: Option<(usize, usize)>, // (rows, cols)
}

fn bind(
    args: &[BindArg],
    dir: Direction,
    deparse_level: i32,
    warnings: &mut Warnings,
) -> VelaResult<RValue> {
    let mut parts: Vec<Participant> = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        let v = match &arg.value {
            RValue::Null => continue,
            RValue::Missing => {
                return Err(VelaError::argument(
                    (i + 1).to_string(),
                    "is missing, with no default",
                ))
            }
            RValue::Vector(v) => v,
        };
        let matrix = match v.dim() {
            Some(d) if d.len() == 2 => Some((d[0] as usize, d[1] as usize)),
            Some(d) if d.len() > 2 => {
                return Err(VelaError::not_implemented(
                    "binding arrays of more than two dimensions",
                ))
            }
            _ => None,
        };
        let tag = arg.name.as_deref().or(if deparse_level > 0 {
            arg.deparsed.as_deref()
        } else {
            None
        });
        parts.push(Participant {
            index: i + 1,
            vector: v,
            tag,
            matrix,
        });
    }
    if parts.is_empty() {
        return Ok(RValue::Null);
    }

    // The bound extent: matrices dictate it and must agree among
    // themselves; otherwise the longest vector wins.
    let mut extent: Option<usize> = None;
    for p in &parts {
        if let Some((rows, cols)) = p.matrix {
            let e = match dir {
                Direction::Columns => rows,
                Direction::Rows => cols,
            };
            match extent {
                None => extent = Some(e),
                Some(prev) if prev != e => {
                    return Err(VelaError::argument(
                        p.index.to_string(),
                        match dir {
                            Direction::Columns => "number of rows of matrices must match",
                            Direction::Rows => "number of columns of matrices must match",
                        },
                    ))
                }
                Some(_) => {}
            }
        }
    }
    let extent = extent.unwrap_or_else(|| {
        parts
            .iter()
            .filter(|p| p.matrix.is_none())
            .map(|p| p.vector.len())
            .max()
            .unwrap_or(0)
    });

    let kind = {
        let mut acc: Option<Kind> = None;
        for p in &parts {
            acc = Some(match acc {
                None => p.vector.kind(),
                Some(k) => join_kind(k, p.vector.kind()),
            });
        }
        acc.expect("participants are non-empty")
    };

    // Zero-length vectors are ignored once anything establishes a
    // positive extent; they only matter when the whole result is empty.
    let used: Vec<(usize, RVector, Option<(usize, usize)>, Option<&str>)> = parts
        .iter()
        .filter(|p| p.matrix.is_some() || p.vector.len() > 0 || extent == 0)
        .map(|p| {
            (
                p.index,
                coerce(p.vector, kind, warnings),
                p.matrix,
                p.tag,
            )
        })
        .collect();
    if used.is_empty() {
        return Ok(RValue::Null);
    }

    for (index, piece, matrix, _) in &used {
        if matrix.is_none() {
            let len = piece.len();
            if len > 0 && extent % len != 0 {
                warnings.emit(Warning::RecycleMismatch { argument: *index });
            }
        }
    }

    let bound_total: usize = used
        .iter()
        .map(|(_, _, matrix, _)| match (dir, matrix) {
            (Direction::Columns, Some((_, cols))) => *cols,
            (Direction::Rows, Some((rows, _))) => *rows,
            _ => 1,
        })
        .sum();

    let complete = used.iter().all(|(_, piece, _, _)| piece.complete());
    let data = match kind {
        Kind::Raw => VectorData::Raw(assemble(&used, extent, dir, slice_raw)),
        Kind::Logical => VectorData::Logical(assemble(&used, extent, dir, slice_i32)),
        Kind::Integer => VectorData::Integer(assemble(&used, extent, dir, slice_i32)),
        Kind::Double => VectorData::Double(assemble(&used, extent, dir, slice_f64)),
        Kind::Complex => VectorData::Complex(assemble(&used, extent, dir, slice_complex)),
        Kind::Character => VectorData::Character(assemble(&used, extent, dir, slice_character)),
        Kind::List => VectorData::List(assemble(&used, extent, dir, slice_list)),
    };
    let mut out = RVector::from_parts(data, complete);
    let (nrow, ncol) = match dir {
        Direction::Columns => (extent, bound_total),
        Direction::Rows => (bound_total, extent),
    };
    out.set_dim(vec![nrow as i32, ncol as i32])?;

    let preserved = preserved_names(&used, extent, dir);
    let bound = bound_names(&used, dir);
    if preserved.is_some() || bound.is_some() {
        let to_entry = |names: Option<Vec<String>>| match names {
            Some(n) => RValue::Vector(RVector::character(n.into_iter().map(Some).collect())),
            None => RValue::Null,
        };
        let entries = match dir {
            Direction::Columns => vec![to_entry(preserved), to_entry(bound)],
            Direction::Rows => vec![to_entry(bound), to_entry(preserved)],
        };
        out.set_dimnames(Some(RVector::list(entries)))?;
    }
    Ok(RValue::Vector(out))
}

type Used<'a> = (usize, RVector, Option<(usize, usize)>, Option<&'a str>);

fn assemble<T, F>(used: &[Used<'_>], extent: usize, dir: Direction, slice: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&VectorData) -> &[T],
{
    match dir {
        Direction::Columns => {
            // Column-major output: columns append in argument order.
            let mut out = Vec::new();
            for (_, piece, matrix, _) in used {
                let data = slice(piece.data());
                match matrix {
                    Some(_) => out.extend_from_slice(data),
                    None => {
                        let len = data.len();
                        for r in 0..extent {
                            out.push(data[r % len].clone());
                        }
                    }
                }
            }
            out
        }
        Direction::Rows => {
            let mut rows: Vec<Vec<T>> = Vec::new();
            for (_, piece, matrix, _) in used {
                let data = slice(piece.data());
                match matrix {
                    Some((mrows, _)) => {
                        for r in 0..*mrows {
                            rows.push((0..extent).map(|c| data[r + c * mrows].clone()).collect());
                        }
                    }
                    None => {
                        let len = data.len();
                        rows.push((0..extent).map(|c| data[c % len].clone()).collect());
                    }
                }
            }
            let total = rows.len();
            let mut out = Vec::with_capacity(total * extent);
            for c in 0..extent {
                for row in rows.iter().take(total) {
                    out.push(row[c].clone());
                }
            }
            out
        }
    }
}

fn slice_raw(data: &VectorData) -> &[u8] {
    match data {
        VectorData::Raw(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

fn slice_i32(data: &VectorData) -> &[i32] {
    match data {
        VectorData::Logical(v) | VectorData::Integer(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

fn slice_f64(data: &VectorData) -> &[f64] {
    match data {
        VectorData::Double(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

fn slice_complex(data: &VectorData) -> &[Complex] {
    match data {
        VectorData::Complex(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

fn slice_character(data: &VectorData) -> &[Option<String>] {
    match data {
        VectorData::Character(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

fn slice_list(data: &VectorData) -> &[RValue] {
    match data {
        VectorData::List(v) => v,
        _ => unreachable!("bind pieces share one kind"),
    }
}

/// Names for the preserved dimension come from the first argument that
/// carries non-null names for it: a matrix's own dimnames, or a plain
/// vector's names when its length matches the extent.
fn preserved_names(used: &[Used<'_>], extent: usize, dir: Direction) -> Option<Vec<String>> {
    for (_, piece, matrix, _) in used {
        match matrix {
            Some(_) => {
                let axis = match dir {
                    Direction::Columns => 0,
                    Direction::Rows => 1,
                };
                if let Some(names) = dimnames_entry(piece, axis) {
                    return Some(names);
                }
            }
            None => {
                if let Some(names) = piece.element_names() {
                    if names.len() == extent {
                        return Some(names);
                    }
                }
            }
        }
    }
    None
}

/// Names for the bound dimension, one slot per contributed column/row,
/// using the combine tag rule per argument: `tag` for a single slot,
/// `tag1..tagN` numbering otherwise, `tag.own` when the argument brings
/// its own dimnames for the bound axis.
fn bound_names(used: &[Used<'_>], dir: Direction) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut any = false;
    for (_, piece, matrix, tag) in used {
        match matrix {
            Some((rows, cols)) => {
                let n = match dir {
                    Direction::Columns => *cols,
                    Direction::Rows => *rows,
                };
                let axis = match dir {
                    Direction::Columns => 1,
                    Direction::Rows => 0,
                };
                let own = dimnames_entry(piece, axis);
                if own.is_some() || tag.is_some() {
                    any = true;
                }
                for i in 0..n {
                    let element = own.as_ref().map(|o| o[i].as_str()).unwrap_or("");
                    out.push(slot_name(*tag, element, i, n));
                }
            }
            None => {
                if tag.is_some() {
                    any = true;
                }
                out.push(tag.unwrap_or("").to_string());
            }
        }
    }
    if any {
        Some(out)
    } else {
        None
    }
}

fn slot_name(tag: Option<&str>, element: &str, index: usize, n: usize) -> String {
    match tag {
        None => element.to_string(),
        Some(tag) if !element.is_empty() => format!("{}.{}", tag, element),
        Some(tag) if n > 1 => format!("{}{}", tag, index + 1),
        Some(tag) => tag.to_string(),
    }
}

fn dimnames_entry(v: &RVector, axis: usize) -> Option<Vec<String>> {
    let dimnames = v.dimnames()?;
    let entries = match dimnames.data() {
        VectorData::List(entries) => entries,
        _ => return None,
    };
    match entries.get(axis) {
        Some(RValue::Vector(names)) => match names.data() {
            VectorData::Character(n) => Some(
                n.iter()
                    .map(|x| x.clone().unwrap_or_default())
                    .collect(),
            ),
            _ => None,
        },
        _ => None,
    }
}
