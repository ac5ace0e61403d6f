use vela::matching::{duplicated, is_element, match_in, unique};
use vela::value::{na_real, NA_INTEGER};
use vela::{RVector, VelaError, Warnings};

fn int(data: Vec<i32>) -> RVector {
    RVector::integer(data)
}

fn dbl(data: Vec<f64>) -> RVector {
    RVector::double(data)
}

fn chr(data: &[&str]) -> RVector {
    RVector::character_from_strs(data)
}

fn lgl_data(v: &RVector) -> Vec<i32> {
    match v.data() {
        vela::value::VectorData::Logical(d) => d.clone(),
        other => panic!("expected logical storage, got {:?}", other),
    }
}

#[cfg(test)]
mod match_tests {
    use super::*;

    #[test]
    fn test_first_occurrence_index_wins() {
        // match([5,9,5], [9,5]) -> [2,1,2]
        let mut w = Warnings::new();
        let out = match_in(&int(vec![5, 9, 5]), &int(vec![9, 5]), NA_INTEGER, &mut w).unwrap();
        assert_eq!(out, int(vec![2, 1, 2]));
    }

    #[test]
    fn test_no_match_value_flows_through() {
        let mut w = Warnings::new();
        let out = match_in(&int(vec![7]), &int(vec![1, 2]), 0, &mut w).unwrap();
        assert_eq!(out, int(vec![0]));
        assert!(out.complete());
        let out = match_in(&int(vec![7]), &int(vec![1, 2]), NA_INTEGER, &mut w).unwrap();
        assert!(!out.complete());
    }

    #[test]
    fn test_na_matches_na_and_nan_matches_nan() {
        let mut w = Warnings::new();
        let x = dbl(vec![na_real(), f64::NAN]);
        let table = dbl(vec![1.0, f64::NAN, na_real()]);
        let out = match_in(&x, &table, 0, &mut w).unwrap();
        assert_eq!(out, int(vec![3, 2]));
    }

    #[test]
    fn test_character_na_is_a_single_bucket() {
        let mut w = Warnings::new();
        let x = RVector::character(vec![None, Some("a".into())]);
        let table = RVector::character(vec![Some("a".into()), None]);
        let out = match_in(&x, &table, 0, &mut w).unwrap();
        assert_eq!(out, int(vec![2, 1]));
    }

    #[test]
    fn test_cross_kind_match_meets_at_the_join() {
        let mut w = Warnings::new();
        // integer 1 meets character "1"
        let out = match_in(&int(vec![1, 3]), &chr(&["1", "2"]), 0, &mut w).unwrap();
        assert_eq!(out, int(vec![1, 0]));
        // logical TRUE meets double 1.0
        let out = match_in(
            &RVector::logical(vec![1]),
            &dbl(vec![0.0, 1.0]),
            0,
            &mut w,
        )
        .unwrap();
        assert_eq!(out, int(vec![2]));
    }

    #[test]
    fn test_match_duplicated_consistency() {
        // Where duplicated(x) is TRUE, match(x, x) points strictly earlier.
        let x = int(vec![4, 8, 4, 8, 4]);
        let mut w = Warnings::new();
        let dup = duplicated(&x, false).unwrap();
        let self_match = match_in(&x, &x, NA_INTEGER, &mut w).unwrap();
        let dup = lgl_data(&dup);
        let positions = match self_match.data() {
            vela::value::VectorData::Integer(d) => d.clone(),
            _ => unreachable!(),
        };
        for (i, &is_dup) in dup.iter().enumerate() {
            if is_dup == 1 {
                assert!((positions[i] as usize) < i + 1);
            } else {
                assert_eq!(positions[i] as usize, i + 1);
            }
        }
    }

    #[test]
    fn test_in_operator_is_complete_logical() {
        let mut w = Warnings::new();
        let out = is_element(&dbl(vec![1.0, na_real()]), &dbl(vec![2.0, na_real()]), &mut w)
            .unwrap();
        assert_eq!(lgl_data(&out), vec![0, 1]);
        assert!(out.complete());
    }

    #[test]
    fn test_list_operands_are_an_intentional_gap() {
        let mut w = Warnings::new();
        let l = RVector::list(vec![]);
        assert!(matches!(
            match_in(&l, &int(vec![1]), 0, &mut w),
            Err(VelaError::NotImplemented { .. })
        ));
    }
}

#[cfg(test)]
mod duplicated_tests {
    use super::*;

    #[test]
    fn test_repeated_string_is_flagged() {
        // duplicated(["a","b","a"]) -> [false,false,true]
        let out = duplicated(&chr(&["a", "b", "a"]), false).unwrap();
        assert_eq!(lgl_data(&out), vec![0, 0, 1]);
    }

    #[test]
    fn test_from_last_reverses_the_scan() {
        let out = duplicated(&chr(&["a", "b", "a"]), true).unwrap();
        assert_eq!(lgl_data(&out), vec![1, 0, 0]);
    }

    #[test]
    fn test_na_and_nan_duplicate_separately() {
        let x = dbl(vec![na_real(), f64::NAN, na_real(), f64::NAN]);
        let out = duplicated(&x, false).unwrap();
        assert_eq!(lgl_data(&out), vec![0, 0, 1, 1]);
    }
}

#[cfg(test)]
mod unique_tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins_in_order() {
        let out = unique(&int(vec![3, 1, 3, 2, 1]), false).unwrap();
        assert_eq!(out, int(vec![3, 1, 2]));
    }

    #[test]
    fn test_from_last_keeps_the_last_occurrence() {
        let out = unique(&int(vec![3, 1, 3, 2, 1]), true).unwrap();
        assert_eq!(out, int(vec![3, 2, 1]));
    }

    #[test]
    fn test_negative_zero_collapses_into_zero() {
        let out = unique(&dbl(vec![0.0, -0.0]), false).unwrap();
        assert_eq!(out.len(), 1);
    }
}
