#![allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

use std::collections::BTreeMap;

use super::*;
use backd_ir::Span;
use backd_value::{EvalErrorKind, FieldDef, MapKey, PointerValue, StructDef, StructValue};
use pretty_assertions::assert_eq;

fn ints(items: &[i64]) -> Value {
    Value::array(Type::Int, items.iter().copied().map(Value::int).collect())
}

fn with(bindings: Vec<(&str, Value)>) -> Interpreter {
    let mut interp = Interpreter::new();
    for (name, value) in bindings {
        interp.env_mut().define(Name::new(name), value);
    }
    interp
}

// Literals and variables

#[test]
fn literals() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval(&Expr::nil()).unwrap(), Value::Nil);
    assert_eq!(interp.eval(&Expr::bool(true)).unwrap(), Value::bool(true));
    assert_eq!(interp.eval(&Expr::float(1.5)).unwrap(), Value::float(1.5));
    assert_eq!(interp.eval(&Expr::string("hi")).unwrap(), Value::string("hi"));
}

#[test]
fn array_literal_is_growable_any() {
    let mut interp = Interpreter::new();
    let Value::Array(a) = interp
        .eval(&Expr::array(vec![Expr::int(1), Expr::string("x")]))
        .unwrap()
    else {
        panic!("expected array");
    };
    assert_eq!(a.elem_type(), &Type::Any);
    assert!(!a.is_fixed());
    assert_eq!(a.len(), 2);
}

#[test]
fn unbound_identifier() {
    let mut interp = Interpreter::new();
    let err = interp
        .eval(&Expr::ident("ghost").with_span(Span::new(5, 10)))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedSymbol { .. }));
    assert_eq!(err.span, Some(Span::new(5, 10)));
}

// Reads

#[test]
fn member_reads() {
    let def = StructDef::new(
        "Plan",
        vec![
            FieldDef::exported("Name", Type::Str),
            FieldDef::unexported("tier", Type::Int),
        ],
    );
    let plan = StructValue::new(def, vec![Value::string("pro"), Value::int(2)]).unwrap();
    let ptr = Value::pointer_to(Type::structure("Plan"), Value::Struct(plan.clone()));
    let mut interp = with(vec![("plan", Value::Struct(plan)), ("ptr", ptr)]);

    assert_eq!(
        interp.eval(&Expr::ident("plan").member("Name")).unwrap(),
        Value::string("pro")
    );
    assert_eq!(
        interp.eval(&Expr::ident("plan").member("tier")).unwrap(),
        Value::int(2)
    );
    assert_eq!(
        interp.eval(&Expr::ident("ptr").member("Name")).unwrap(),
        Value::string("pro")
    );
    let err = interp
        .eval(&Expr::ident("plan").member("Missing"))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NoSuchMember { .. }));
}

#[test]
fn map_reads_default_to_zero_value() {
    let mut entries = BTreeMap::new();
    entries.insert(MapKey::Str("a".into()), Value::int(1));
    let mut interp = with(vec![
        (
            "m",
            Value::Map(MapValue::new(Type::Str, Type::Int, entries)),
        ),
        ("nilmap", Value::nil_map(Type::Str, Type::Str)),
    ]);
    assert_eq!(interp.eval(&Expr::ident("m").member("a")).unwrap(), Value::int(1));
    assert_eq!(
        interp.eval(&Expr::ident("m").item(Expr::string("b"))).unwrap(),
        Value::int(0)
    );
    assert_eq!(
        interp.eval(&Expr::ident("nilmap").member("x")).unwrap(),
        Value::string("")
    );
}

#[test]
fn item_reads() {
    let mut interp = with(vec![("xs", ints(&[10, 20])), ("s", Value::string("héllo"))]);
    assert_eq!(
        interp.eval(&Expr::ident("xs").item(Expr::float(1.7))).unwrap(),
        Value::int(20)
    );
    assert_eq!(
        interp.eval(&Expr::ident("s").item(Expr::int(1))).unwrap(),
        Value::string("é")
    );
    let err = interp
        .eval(&Expr::ident("xs").item(Expr::int(2)))
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index: 2, len: 2 });
}

#[test]
fn slice_reads_copy() {
    let original = ints(&[1, 2, 3, 4]);
    let mut interp = with(vec![("xs", original.clone()), ("s", Value::string("tenant"))]);
    let part = interp
        .eval(&Expr::ident("xs").slice(Some(Expr::int(1)), Some(Expr::int(3))))
        .unwrap();
    assert_eq!(part, ints(&[2, 3]));

    let Value::Array(part) = part else {
        panic!("expected array");
    };
    part.set_index(0, &Value::int(99)).unwrap();
    assert_eq!(original, ints(&[1, 2, 3, 4]));

    assert_eq!(
        interp
            .eval(&Expr::ident("s").slice(None, Some(Expr::int(3))))
            .unwrap(),
        Value::string("ten")
    );
    let err = interp
        .eval(&Expr::ident("s").slice(Some(Expr::int(4)), Some(Expr::int(2))))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidSliceIndex { .. }));
}

#[test]
fn deref_reads() {
    let mut interp = with(vec![
        ("p", Value::pointer_to(Type::Int, Value::int(4))),
        ("nilp", Value::Pointer(PointerValue::nil(Type::Int))),
    ]);
    assert_eq!(interp.eval(&Expr::ident("p").deref()).unwrap(), Value::int(4));
    let err = interp.eval(&Expr::ident("nilp").deref()).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeInvalid { .. }));
}

// Assignment expressions

#[test]
fn chained_assignment_binds_both() {
    let mut interp = Interpreter::new();
    let expr = Expr::ident("a").assign(Expr::ident("b").assign(Expr::int(5)));
    assert_eq!(interp.eval(&expr).unwrap(), Value::int(5));
    assert_eq!(interp.env().lookup("a"), Some(Value::int(5)));
    assert_eq!(interp.env().lookup("b"), Some(Value::int(5)));
}

#[test]
fn chained_assignment_feeds_converted_value() {
    let def = StructDef::new("Q", vec![FieldDef::exported("Limit", Type::Float)]);
    let mut interp = with(vec![("q", Value::Struct(StructValue::zeroed(def)))]);
    let expr = Expr::ident("a").assign(Expr::ident("q").member("Limit").assign(Expr::int(5)));
    interp.eval(&expr).unwrap();
    assert_eq!(interp.env().lookup("a"), Some(Value::float(5.0)));
}

// Statements

#[test]
fn block_value_is_last_expression() {
    let mut interp = Interpreter::new();
    let body = vec![
        Stmt::expr(Expr::int(1)),
        Stmt::assign(vec![Expr::ident("x")], vec![Expr::int(2)]),
    ];
    assert_eq!(interp.run(&body).unwrap(), Value::int(1));
    assert_eq!(interp.run(&[]).unwrap(), Value::Nil);
}

#[test]
fn return_stops_the_block() {
    let mut interp = Interpreter::new();
    let body = vec![
        Stmt::ret(Some(Expr::int(7))),
        Stmt::expr(Expr::ident("x").assign(Expr::int(1))),
    ];
    assert_eq!(interp.run(&body).unwrap(), Value::int(7));
    assert_eq!(interp.env().lookup("x"), None);
}

#[test]
fn pairwise_assignment_evaluates_all_values_first() {
    let mut interp = with(vec![("a", Value::int(1)), ("b", Value::int(2))]);
    let swap = Stmt::assign(
        vec![Expr::ident("a"), Expr::ident("b")],
        vec![Expr::ident("b"), Expr::ident("a")],
    );
    interp.run(&[swap]).unwrap();
    assert_eq!(interp.env().lookup("a"), Some(Value::int(2)));
    assert_eq!(interp.env().lookup("b"), Some(Value::int(1)));
}

#[test]
fn array_spreads_over_targets() {
    let mut interp = Interpreter::new();
    let stmt = Stmt::assign(
        vec![Expr::ident("a"), Expr::ident("b"), Expr::ident("c")],
        vec![Expr::array(vec![Expr::int(1), Expr::int(2)])],
    );
    interp.run(&[stmt]).unwrap();
    assert_eq!(interp.env().lookup("a"), Some(Value::int(1)));
    assert_eq!(interp.env().lookup("b"), Some(Value::int(2)));
    assert_eq!(interp.env().lookup("c"), Some(Value::Nil));
}

#[test]
fn assignment_count_mismatch() {
    let mut interp = Interpreter::new();
    let spread_scalar = Stmt::assign(
        vec![Expr::ident("a"), Expr::ident("b")],
        vec![Expr::int(1)],
    );
    let err = interp.run(&[spread_scalar]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));

    let too_many = Stmt::assign(vec![Expr::ident("a")], vec![Expr::int(1), Expr::int(2)]);
    let err = interp.run(&[too_many]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn earlier_targets_stay_written_when_a_later_one_fails() {
    let mut interp = with(vec![("q", Value::int(0))]);
    let stmt = Stmt::assign(
        vec![Expr::ident("a"), Expr::ident("q").member("X")],
        vec![Expr::int(1), Expr::int(2)],
    );
    assert!(interp.run(&[stmt]).is_err());
    assert_eq!(interp.env().lookup("a"), Some(Value::int(1)));
}

#[test]
fn for_over_array_binds_locally() {
    let mut interp = with(vec![("total", ints(&[]))]);
    let body = vec![Stmt::expr(
        Expr::ident("total")
            .item(Expr::ident("i"))
            .assign(Expr::ident("i")),
    )];
    let stmt = Stmt::for_in(Expr::ident("i"), Expr::array(vec![Expr::int(0), Expr::int(1)]), body);
    interp.run(&[stmt]).unwrap();
    assert_eq!(interp.env().lookup("total"), Some(ints(&[0, 1])));
    assert_eq!(interp.env().lookup("i"), None);
    assert_eq!(interp.env().depth(), 0);
}

#[test]
fn for_over_map_visits_keys_in_order() {
    let mut entries = BTreeMap::new();
    entries.insert(MapKey::Str("b".into()), Value::int(2));
    entries.insert(MapKey::Str("a".into()), Value::int(1));
    let mut interp = with(vec![
        ("m", Value::Map(MapValue::new(Type::Str, Type::Int, entries))),
        ("last", Value::Nil),
    ]);
    let track = Stmt::for_in(
        Expr::ident("k"),
        Expr::ident("m"),
        vec![Stmt::expr(Expr::ident("last").assign(Expr::ident("k")))],
    );
    interp.run(&[track]).unwrap();
    assert_eq!(interp.env().lookup("last"), Some(Value::string("b")));

    let first = Stmt::for_in(
        Expr::ident("k"),
        Expr::ident("m"),
        vec![Stmt::ret(Some(Expr::ident("k")))],
    );
    assert_eq!(interp.run(&[first]).unwrap(), Value::string("a"));
}

#[test]
fn for_over_string_and_early_return() {
    let mut interp = Interpreter::new();
    let body = vec![Stmt::ret(Some(Expr::ident("c")))];
    let stmt = Stmt::for_in(Expr::ident("c"), Expr::string("xyz"), body);
    assert_eq!(interp.run(&[stmt]).unwrap(), Value::string("x"));
    assert_eq!(interp.env().depth(), 0);
}

#[test]
fn for_over_scalar_is_unsupported() {
    let mut interp = Interpreter::new();
    let stmt = Stmt::for_in(Expr::ident("i"), Expr::int(3), vec![]);
    let err = interp.run(&[stmt]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnsupportedOperation { .. }));
}

#[test]
fn failing_iteration_pops_its_scope() {
    let mut interp = Interpreter::new();
    let body = vec![Stmt::expr(Expr::ident("ghost"))];
    let stmt = Stmt::for_in(Expr::ident("i"), Expr::array(vec![Expr::int(1)]), body);
    assert!(interp.run(&[stmt]).is_err());
    assert_eq!(interp.env().depth(), 0);
}

// Config

#[test]
fn default_config() {
    let interp = Interpreter::new();
    assert_eq!(interp.config().max_depth, EvalConfig::DEFAULT_MAX_DEPTH);
}

#[test]
fn depth_limit_is_enforced() {
    let mut interp = Interpreter::builder().max_depth(4).build();
    let mut expr = Expr::int(1);
    for _ in 0..8 {
        expr = Expr::array(vec![expr]);
    }
    let err = interp.eval(&expr).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DepthLimitExceeded { limit: 4 });

    let shallow = Expr::array(vec![Expr::int(1)]);
    assert!(interp.eval(&shallow).is_ok());
}

#[test]
fn builder_env_is_used() {
    let mut env = Environment::new();
    env.define(Name::new("seed"), Value::int(3));
    let mut interp = Interpreter::builder().env(env).build();
    assert_eq!(interp.eval(&Expr::ident("seed")).unwrap(), Value::int(3));
}
