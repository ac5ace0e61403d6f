//! The combine engine: concatenation of heterogeneous arguments at the
//! join of their precedences, with the name-propagation rules of the
//! source language's `c` and the recursive flattening of `unlist`.

use crate::coerce::{coerce, fold_precedence};
use crate::error::{VelaError, VelaResult, Warnings};
use crate::value::{Argument, Kind, RValue, RVector, VectorData};

/// Concatenate argument values into one vector at the precedence join.
///
/// Null arguments contribute nothing (their tags included); a fold over
/// no contributing argument yields Null. Name propagation: a tagged
/// multi-element argument numbers its unnamed elements `tag1..tagN` and
/// dot-joins the named ones (`tag.name`); a tagged single element is
/// `tag` or `tag.name`; once any position is named, every position is
/// (empty string for the rest).
pub fn combine(args: &[Argument], warnings: &mut Warnings) -> VelaResult<RValue> {
    for (i, arg) in args.iter().enumerate() {
        if matches!(arg.value, RValue::Missing) {
            return Err(VelaError::argument(
                (i + 1).to_string(),
                "is missing, with no default",
            ));
        }
    }
    let target = match fold_precedence(args.iter().map(|a| &a.value)) {
        Some(kind) => kind,
        None => return Ok(RValue::Null),
    };

    let mut pieces: Vec<(Option<&str>, RVector)> = Vec::new();
    for arg in args {
        if let RValue::Vector(v) = &arg.value {
            pieces.push((arg.name.as_deref(), coerce(v, target, warnings)));
        }
    }

    let complete = pieces.iter().all(|(_, v)| v.complete());
    let data = concat(target, pieces.iter().map(|(_, v)| v));
    let mut out = RVector::from_parts(data, complete);

    let any_names = pieces
        .iter()
        .any(|(tag, v)| (tag.is_some() && !v.is_empty()) || v.names().is_some());
    if any_names {
        let mut names: Vec<Option<String>> = Vec::with_capacity(out.len());
        for (tag, v) in &pieces {
            let own = v.element_names();
            for i in 0..v.len() {
                let element = own.as_ref().map(|n| n[i].as_str()).unwrap_or("");
                names.push(Some(merge_name(*tag, element, i, v.len())));
            }
        }
        out.set_names(Some(RVector::character(names)))?;
    }
    Ok(RValue::Vector(out))
}

fn merge_name(tag: Option<&str>, element: &str, index: usize, len: usize) -> String {
    match tag {
        None => element.to_string(),
        Some(tag) if !element.is_empty() => format!("{}.{}", tag, element),
        Some(tag) if len > 1 => format!("{}{}", tag, index + 1),
        Some(tag) => tag.to_string(),
    }
}

fn concat<'a, I>(kind: Kind, pieces: I) -> VectorData
where
    I: Iterator<Item = &'a RVector>,
{
    match kind {
        Kind::Raw => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Raw(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Raw(out)
        }
        Kind::Logical => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Logical(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Logical(out)
        }
        Kind::Integer => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Integer(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Integer(out)
        }
        Kind::Double => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Double(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Double(out)
        }
        Kind::Complex => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Complex(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Complex(out)
        }
        Kind::Character => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::Character(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::Character(out)
        }
        Kind::List => {
            let mut out = Vec::new();
            for p in pieces {
                if let VectorData::List(v) = p.data() {
                    out.extend_from_slice(v);
                }
            }
            VectorData::List(out)
        }
    }
}

/// Flatten a list value through the combine machinery. Tags compose
/// depth-first with dots, then the leaf-level combine applies the usual
/// `tag1..tagN` numbering. Non-list input passes through unchanged.
pub fn unlist(
    value: &RValue,
    recursive: bool,
    use_names: bool,
    warnings: &mut Warnings,
) -> VelaResult<RValue> {
    let v = match value {
        RValue::Null => return Ok(RValue::Null),
        RValue::Missing => {
            return Err(VelaError::argument("x", "is missing, with no default"))
        }
        RValue::Vector(v) => v,
    };
    if v.kind() != Kind::List {
        let mut out = v.clone();
        if !use_names {
            out.set_names(None)?;
        }
        return Ok(RValue::Vector(out));
    }

    let mut gathered = Vec::new();
    gather(v, None, recursive, &mut gathered);
    if !use_names {
        for arg in &mut gathered {
            arg.name = None;
            if let RValue::Vector(inner) = &mut arg.value {
                inner.set_names(None)?;
            }
        }
    }
    combine(&gathered, warnings)
}

fn gather(list: &RVector, prefix: Option<&str>, recursive: bool, out: &mut Vec<Argument>) {
    let names = list.element_names();
    let items = match list.data() {
        VectorData::List(items) => items,
        _ => unreachable!("gather is only called on lists"),
    };
    for (i, item) in items.iter().enumerate() {
        let element = names.as_ref().map(|n| n[i].as_str()).unwrap_or("");
        let tag = compose_tag(prefix, element);
        match item {
            RValue::Vector(inner) if inner.kind() == Kind::List && recursive => {
                gather(inner, tag.as_deref(), recursive, out);
            }
            other => out.push(Argument {
                name: tag,
                value: other.clone(),
            }),
        }
    }
}

fn compose_tag(prefix: Option<&str>, element: &str) -> Option<String> {
    match (prefix, element.is_empty()) {
        (None, true) => None,
        (None, false) => Some(element.to_string()),
        (Some(p), true) => Some(p.to_string()),
        (Some(p), false) => Some(format!("{}.{}", p, element)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::na_real;

    fn pos(v: RVector) -> Argument {
        Argument::positional(RValue::Vector(v))
    }

    #[test]
    fn kind_join_and_order_are_preserved() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                pos(RVector::integer(vec![1, 2])),
                pos(RVector::double(vec![3.5])),
            ],
            &mut w,
        )
        .unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(*v, RVector::double(vec![1.0, 2.0, 3.5]));
        assert!(v.complete());
        assert!(w.is_empty());
    }

    #[test]
    fn all_null_arguments_yield_null() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                Argument::positional(RValue::Null),
                Argument::named("a", RValue::Null),
            ],
            &mut w,
        )
        .unwrap();
        assert!(out.is_null());
        assert!(combine(&[], &mut w).unwrap().is_null());
    }

    #[test]
    fn tagged_arguments_number_their_elements() {
        let mut w = Warnings::new();
        let mut named = RVector::integer(vec![1, 2]);
        named
            .set_names(Some(RVector::character(vec![
                Some("a".into()),
                Some(String::new()),
            ])))
            .unwrap();
        let out = combine(
            &[
                Argument::named("x", RValue::Vector(named)),
                Argument::named("y", RValue::Vector(RVector::integer(vec![3]))),
                pos(RVector::integer(vec![4])),
            ],
            &mut w,
        )
        .unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(
            v.element_names(),
            Some(vec![
                "x.a".to_string(),
                "x2".to_string(),
                "y".to_string(),
                String::new(),
            ])
        );
    }

    #[test]
    fn unlist_composes_nested_tags() {
        let mut w = Warnings::new();
        let mut inner = RVector::double(vec![1.0, 2.0]);
        inner
            .set_names(Some(RVector::character_from_strs(&["p", "q"])))
            .unwrap();
        let mut nested = RVector::list(vec![RValue::Vector(inner)]);
        nested
            .set_names(Some(RVector::character_from_strs(&["b"])))
            .unwrap();
        let mut top = RVector::list(vec![
            RValue::Vector(nested),
            RValue::Vector(RVector::integer(vec![7])),
        ]);
        top.set_names(Some(RVector::character_from_strs(&["a", "c"])))
            .unwrap();

        let out = unlist(&RValue::Vector(top), true, true, &mut w).unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(v.kind(), Kind::Double);
        assert_eq!(
            v.element_names(),
            Some(vec![
                "a.b.p".to_string(),
                "a.b.q".to_string(),
                "c".to_string(),
            ])
        );
    }

    #[test]
    fn unlist_non_recursive_keeps_inner_lists() {
        let mut w = Warnings::new();
        let inner = RVector::list(vec![RValue::Vector(RVector::integer(vec![1]))]);
        let top = RVector::list(vec![
            RValue::Vector(inner.clone()),
            RValue::Vector(RVector::integer(vec![2])),
        ]);
        let out = unlist(&RValue::Vector(top), false, true, &mut w).unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(v.kind(), Kind::List);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn completeness_is_the_and_of_inputs() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                pos(RVector::double(vec![1.0])),
                pos(RVector::double(vec![na_real()])),
            ],
            &mut w,
        )
        .unwrap();
        assert!(!out.as_vector().unwrap().complete());
    }

    #[test]
    fn missing_argument_is_fatal() {
        let mut w = Warnings::new();
        let err = combine(
            &[Argument::positional(RValue::Missing)],
            &mut w,
        )
        .unwrap_err();
        assert!(matches!(err, VelaError::ArgumentError { .. }));
    }
}
