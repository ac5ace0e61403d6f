use vela::combine::{combine, unlist};
use vela::value::na_real;
use vela::{Argument, Kind, RValue, RVector, Warnings};

fn int(data: Vec<i32>) -> RVector {
    RVector::integer(data)
}

fn dbl(data: Vec<f64>) -> RVector {
    RVector::double(data)
}

fn chr(data: &[&str]) -> RVector {
    RVector::character_from_strs(data)
}

fn pos(v: RVector) -> Argument {
    Argument::positional(RValue::Vector(v))
}

fn named(name: &str, v: RVector) -> Argument {
    Argument::named(name, RValue::Vector(v))
}

fn with_names(mut v: RVector, names: &[&str]) -> RVector {
    v.set_names(Some(RVector::character_from_strs(names))).unwrap();
    v
}

#[cfg(test)]
mod combine_tests {
    use super::*;

    #[test]
    fn test_integer_and_double_join_on_double() {
        // combine([IntVector([1,2]), DoubleVector([3.5])])
        //   -> DoubleVector([1.0, 2.0, 3.5]), complete
        let mut w = Warnings::new();
        let out = combine(&[pos(int(vec![1, 2])), pos(dbl(vec![3.5]))], &mut w).unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(*v, dbl(vec![1.0, 2.0, 3.5]));
        assert!(v.complete());
        assert!(w.is_empty());
    }

    #[test]
    fn test_result_kind_is_associative() {
        let mut w = Warnings::new();
        let a = RVector::logical(vec![1]);
        let b = int(vec![2]);
        let c = chr(&["x"]);
        let direct = combine(&[pos(a.clone()), pos(b.clone()), pos(c.clone())], &mut w).unwrap();
        let ab = combine(&[pos(a), pos(b)], &mut w).unwrap();
        let nested = combine(
            &[
                Argument::positional(ab),
                pos(c),
            ],
            &mut w,
        )
        .unwrap();
        // Result kind is associative; element values are not (the inner
        // combine settles logical+integer on integer before the text
        // join, so TRUE renders as "1" rather than "TRUE").
        assert_eq!(
            direct.as_vector().unwrap().kind(),
            nested.as_vector().unwrap().kind()
        );
        assert_eq!(direct.len(), nested.len());
    }

    #[test]
    fn test_null_arguments_vanish() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                Argument::positional(RValue::Null),
                pos(int(vec![1])),
                Argument::named("dropped", RValue::Null),
            ],
            &mut w,
        )
        .unwrap();
        assert_eq!(*out.as_vector().unwrap(), int(vec![1]));
    }

    #[test]
    fn test_empty_typed_vectors_combine_to_typed_empty() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                pos(RVector::empty(Kind::Integer)),
                pos(RVector::empty(Kind::Character)),
            ],
            &mut w,
        )
        .unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(v.kind(), Kind::Character);
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn test_name_rules_match_the_source_language() {
        let mut w = Warnings::new();
        let out = combine(
            &[
                named("x", with_names(int(vec![1, 2]), &["a", ""])),
                named("y", int(vec![3, 4])),
                named("z", int(vec![5])),
                pos(with_names(int(vec![6]), &["own"])),
                pos(int(vec![7])),
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
                "y1".to_string(),
                "y2".to_string(),
                "z".to_string(),
                "own".to_string(),
                String::new(),
            ])
        );
    }

    #[test]
    fn test_na_flows_into_the_joined_kind() {
        let mut w = Warnings::new();
        let out = combine(
            &[pos(dbl(vec![1.0, na_real()])), pos(int(vec![5]))],
            &mut w,
        )
        .unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(*v, dbl(vec![1.0, na_real(), 5.0]));
        assert!(!v.complete());
    }

    #[test]
    fn test_list_join_keeps_elements_intact() {
        let mut w = Warnings::new();
        let l = RVector::list(vec![RValue::Vector(chr(&["a", "b"]))]);
        let out = combine(&[pos(l), pos(int(vec![1, 2]))], &mut w).unwrap();
        let v = out.as_vector().unwrap();
        assert_eq!(v.kind(), Kind::List);
        // The list element survives unsplit; the atomic argument splits
        // into scalar elements.
        assert_eq!(v.len(), 3);
    }
}

#[cfg(test)]
mod unlist_tests {
    use super::*;

    #[test]
    fn test_flattens_recursively_with_composed_names() {
        let mut w = Warnings::new();
        let inner = with_names(dbl(vec![1.0, 2.0]), &["p", "q"]);
        let mut mid = RVector::list(vec![RValue::Vector(inner)]);
        mid.set_names(Some(chr(&["b"]))).unwrap();
        let mut top = RVector::list(vec![
            RValue::Vector(mid),
            RValue::Vector(int(vec![3])),
        ]);
        top.set_names(Some(chr(&["a", "c"]))).unwrap();

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
    fn test_use_names_false_strips_everything() {
        let mut w = Warnings::new();
        let mut top = RVector::list(vec![RValue::Vector(int(vec![1, 2]))]);
        top.set_names(Some(chr(&["a"]))).unwrap();
        let out = unlist(&RValue::Vector(top), true, false, &mut w).unwrap();
        assert!(out.as_vector().unwrap().names().is_none());
    }

    #[test]
    fn test_empty_list_yields_null() {
        let mut w = Warnings::new();
        let out = unlist(&RValue::Vector(RVector::list(vec![])), true, true, &mut w).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn test_atomic_input_passes_through() {
        let mut w = Warnings::new();
        let v = with_names(int(vec![1]), &["n"]);
        let out = unlist(&RValue::Vector(v.clone()), true, true, &mut w).unwrap();
        assert_eq!(*out.as_vector().unwrap(), v);
    }
}
