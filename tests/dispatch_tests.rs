use std::sync::Arc;

use vela::dispatch::{
    class_of, inherits, merge_call_arguments, next_method, next_method_from_value, use_method,
    DispatchArg, Environment, FunctionRef,
};
use vela::{Argument, RValue, RVector, VelaError};

fn classed(classes: &[&str]) -> RValue {
    let mut v = RVector::integer(vec![1]);
    v.set_class(Some(classes.iter().map(|s| s.to_string()).collect()));
    RValue::Vector(v)
}

fn env_with(methods: &[&str]) -> Environment {
    let mut env = Environment::new();
    for (i, name) in methods.iter().enumerate() {
        env.define(*name, FunctionRef::new(i as u64 + 1));
    }
    env
}

#[cfg(test)]
mod class_vector_tests {
    use super::*;

    #[test]
    fn test_explicit_class_wins() {
        assert_eq!(class_of(&classed(&["b", "a"])), vec!["b", "a"]);
    }

    #[test]
    fn test_implicit_numeric_classes() {
        assert_eq!(
            class_of(&RValue::Vector(RVector::integer(vec![1]))),
            vec!["integer", "numeric"]
        );
        assert_eq!(
            class_of(&RValue::Vector(RVector::double(vec![1.0]))),
            vec!["double", "numeric"]
        );
        assert_eq!(
            class_of(&RValue::Vector(RVector::character_from_strs(&["x"]))),
            vec!["character"]
        );
    }

    #[test]
    fn test_dimensions_prepend_matrix_and_array() {
        let mut m = RVector::double(vec![1.0, 2.0, 3.0, 4.0]);
        m.set_dim(vec![2, 2]).unwrap();
        assert_eq!(
            class_of(&RValue::Vector(m)),
            vec!["matrix", "array", "double", "numeric"]
        );
        let mut cube = RVector::double(vec![1.0; 8]);
        cube.set_dim(vec![2, 2, 2]).unwrap();
        assert_eq!(
            class_of(&RValue::Vector(cube)),
            vec!["array", "double", "numeric"]
        );
    }

    #[test]
    fn test_null_has_the_null_class() {
        assert_eq!(class_of(&RValue::Null), vec!["NULL"]);
        assert!(inherits(&RValue::Null, "NULL"));
    }

    #[test]
    fn test_inherits_consults_the_class_vector() {
        let obj = classed(&["data.frame"]);
        assert!(inherits(&obj, "data.frame"));
        assert!(!inherits(&obj, "matrix"));
    }
}

#[cfg(test)]
mod use_method_tests {
    use super::*;

    #[test]
    fn test_inherited_method_then_default() {
        // classes ["b","a"], methods gen.a + gen.default:
        // UseMethod resolves gen.a, NextMethod then gen.default.
        let env = env_with(&["gen.a", "gen.default"]);
        let obj = classed(&["b", "a"]);
        let first = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(first.method_name, "gen.a");
        let next = next_method(&first, &env).unwrap();
        assert_eq!(next.method_name, "gen.default");
    }

    #[test]
    fn test_first_class_wins_over_later_ones() {
        let env = env_with(&["gen.a", "gen.b"]);
        let obj = classed(&["b", "a"]);
        let dispatch = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(dispatch.method_name, "gen.b");
        assert_eq!(dispatch.class_index, 0);
    }

    #[test]
    fn test_implicit_class_drives_dispatch() {
        let env = env_with(&["gen.numeric"]);
        let obj = RValue::Vector(RVector::double(vec![1.5]));
        let dispatch = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(dispatch.method_name, "gen.numeric");
    }

    #[test]
    fn test_rest_args_container_unwraps_to_first_element() {
        let env = env_with(&["gen.default"]);
        let items = [classed(&["a"]), classed(&["b"])];
        let dispatch = use_method("gen", None, DispatchArg::Rest(&items), &env).unwrap();
        assert_eq!(dispatch.method_name, "gen.default");
        assert_eq!(dispatch.classes, vec!["a"]);
    }

    #[test]
    fn test_empty_rest_args_is_fatal() {
        let env = env_with(&["gen.default"]);
        let err = use_method("gen", None, DispatchArg::Rest(&[]), &env).unwrap_err();
        assert!(matches!(err, VelaError::ArgumentError { .. }));
    }

    #[test]
    fn test_unresolvable_generic_names_the_generic() {
        let env = env_with(&[]);
        let obj = classed(&["a"]);
        let err = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap_err();
        match err {
            VelaError::DispatchError { generic, class } => {
                assert_eq!(generic, "gen");
                assert_eq!(class, "a");
            }
            other => panic!("expected a dispatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_walks_outward_through_scopes() {
        let mut global = Environment::new();
        global.define("gen.a", FunctionRef::new(1));
        let global = Arc::new(global);
        let mut local = Environment::child_of(&global);
        // A nearer binding shadows the outer one.
        local.define("gen.a", FunctionRef::new(2));
        let obj = classed(&["a"]);
        let dispatch = use_method("gen", None, DispatchArg::Value(&obj), &local).unwrap();
        assert_eq!(dispatch.method, FunctionRef::new(2));
    }

    #[test]
    fn test_group_generic_is_tried_after_the_specific() {
        let env = env_with(&["Ops.roman"]);
        let obj = classed(&["roman"]);
        let dispatch = use_method("+", Some("Ops"), DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(dispatch.method_name, "Ops.roman");
        // A specific method still wins when both exist.
        let mut env = env_with(&["Ops.roman"]);
        env.define("+.roman", FunctionRef::new(9));
        let dispatch = use_method("+", Some("Ops"), DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(dispatch.method_name, "+.roman");
    }
}

#[cfg(test)]
mod next_method_tests {
    use super::*;

    #[test]
    fn test_chain_walks_every_class_then_default() {
        let env = env_with(&["gen.a", "gen.b", "gen.default"]);
        let obj = classed(&["b", "a"]);
        let first = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap();
        assert_eq!(first.method_name, "gen.b");
        let second = next_method(&first, &env).unwrap();
        assert_eq!(second.method_name, "gen.a");
        let third = next_method(&second, &env).unwrap();
        assert_eq!(third.method_name, "gen.default");
        assert!(next_method(&third, &env).is_err());
    }

    #[test]
    fn test_direct_invocation_recomputes_the_class_vector() {
        let env = env_with(&["gen.a", "gen.default"]);
        let obj = classed(&["a"]);
        let dispatch = next_method_from_value("gen", None, &obj, &env).unwrap();
        assert_eq!(dispatch.method_name, "gen.a");
    }

    #[test]
    fn test_exhausted_chain_is_fatal() {
        let env = env_with(&["gen.b"]);
        let obj = classed(&["b", "a"]);
        let first = use_method("gen", None, DispatchArg::Value(&obj), &env).unwrap();
        let err = next_method(&first, &env).unwrap_err();
        assert!(matches!(err, VelaError::DispatchError { .. }));
    }

    #[test]
    fn test_extra_arguments_merge_by_the_call_matching_rule() {
        let inherited = vec![
            Argument::named("x", RValue::Vector(RVector::integer(vec![1]))),
            Argument::named("digits", RValue::Vector(RVector::integer(vec![2]))),
        ];
        let extra = vec![
            Argument::named("digits", RValue::Vector(RVector::integer(vec![7]))),
            Argument::positional(RValue::Vector(RVector::integer(vec![99]))),
        ];
        let merged = merge_call_arguments(&inherited, &extra);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[1],
            Argument::named("digits", RValue::Vector(RVector::integer(vec![7])))
        );
        assert_eq!(
            merged[2],
            Argument::positional(RValue::Vector(RVector::integer(vec![99])))
        );
    }
}
