#![allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

use super::*;
use crate::errors::EvalErrorKind;
use crate::value::{FieldDef, MapKey, StructDef};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn quota() -> StructValue {
    let def = StructDef::new(
        "Quota",
        vec![
            FieldDef::exported("Limit", Type::Float),
            FieldDef::exported("Owner", Type::Str),
            FieldDef::unexported("secret", Type::Str),
        ],
    );
    StructValue::zeroed(def)
}

fn ints(items: &[i64]) -> ArrayValue {
    ArrayValue::new(Type::Int, items.iter().copied().map(Value::int).collect())
}

// Struct fields

#[test]
fn set_field_converts_and_stores_in_place() {
    let q = quota();
    let m = q.set_field("Limit", &Value::int(10)).unwrap();
    assert_eq!(m, Mutation::InPlace(Value::float(10.0)));
    assert_eq!(q.get_field("Limit"), Some(Value::float(10.0)));
    assert_eq!(q.get_field("Owner"), Some(Value::string("")));
}

#[test]
fn set_field_visible_through_alias() {
    let q = quota();
    let alias = q.clone();
    q.set_field("Owner", &Value::string("ops")).unwrap();
    assert_eq!(alias.get_field("Owner"), Some(Value::string("ops")));
}

#[test]
fn set_field_unknown_member() {
    let err = quota().set_field("Missing", &Value::int(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NoSuchMember { .. }));
}

#[test]
fn set_field_unexported_is_not_settable() {
    let q = quota();
    let err = q.set_field("secret", &Value::string("x")).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotSettable { .. }));
    assert_eq!(q.get_field("secret"), Some(Value::string("")));
}

#[test]
fn set_field_inconvertible_value() {
    let q = quota();
    let err = q.set_field("Owner", &Value::int(5)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeConversion { .. }));
    assert_eq!(q.get_field("Owner"), Some(Value::string("")));
}

// Maps

#[test]
fn insert_into_live_map_is_in_place() {
    let m = MapValue::empty(Type::Str, Type::Int);
    let alias = m.clone();
    let out = m.insert(&Value::string("a"), &Value::int(1)).unwrap();
    assert_eq!(out, Mutation::InPlace(Value::int(1)));
    assert_eq!(alias.get(&MapKey::Str("a".into())), Some(Value::int(1)));
}

#[test]
fn insert_into_nil_map_materializes() {
    let m = MapValue::nil(Type::Str, Type::Float);
    let out = m.insert(&Value::string("a"), &Value::int(2)).unwrap();
    assert!(matches!(out, Mutation::Replaced(_)));
    let Value::Map(fresh) = out.into_value() else {
        panic!("expected map");
    };
    assert!(!fresh.is_nil());
    assert_eq!(fresh.snapshot(), vec![(MapKey::Str("a".into()), Value::float(2.0))]);
    assert!(m.is_nil());
}

#[test]
fn insert_rejects_bad_key_and_value() {
    let m = MapValue::empty(Type::Int, Type::Str);
    assert!(m.insert(&Value::string("k"), &Value::string("v")).is_err());
    assert!(m.insert(&Value::int(1), &Value::int(1)).is_err());
    assert!(m.is_empty());
}

// Arrays

#[test]
fn set_index_in_bounds_replaces_in_place() {
    let a = ints(&[1, 2, 3]);
    let alias = a.clone();
    assert_eq!(
        a.set_index(1, &Value::int(9)).unwrap(),
        Mutation::InPlace(Value::int(9))
    );
    assert_eq!(alias.snapshot(), ints(&[1, 9, 3]).snapshot());
}

#[test]
fn set_index_at_len_grows_fresh_backing() {
    let a = ints(&[1, 2]);
    let Mutation::Replaced(Value::Array(grown)) = a.set_index(2, &Value::int(3)).unwrap() else {
        panic!("expected replaced array");
    };
    assert!(!grown.ptr_eq(&a));
    assert_eq!(grown.snapshot(), ints(&[1, 2, 3]).snapshot());
    assert_eq!(a.len(), 2);
}

#[test]
fn set_index_bulk_append() {
    let a = ints(&[1]);
    let src = Value::array(Type::Any, vec![Value::int(2), Value::int(3)]);
    let grown = a.set_index(1, &src).unwrap().into_value();
    assert_eq!(grown, Value::Array(ints(&[1, 2, 3])));
}

#[test]
fn bulk_append_is_all_or_nothing() {
    let a = ints(&[1]);
    let src = Value::array(Type::Any, vec![Value::int(2), Value::string("x")]);
    let err = a.set_index(1, &src).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeConversion { .. }));
    assert_eq!(a.snapshot(), vec![Value::int(1)]);
}

#[test]
fn any_array_appends_nested_array_as_one_element() {
    let a = ArrayValue::new(Type::Any, vec![]);
    let src = Value::array(Type::Int, vec![Value::int(1), Value::int(2)]);
    let Value::Array(grown) = a.set_index(0, &src).unwrap().into_value() else {
        panic!("expected array");
    };
    assert_eq!(grown.len(), 1);
}

#[test]
fn set_index_out_of_range() {
    let a = ints(&[1, 2]);
    for index in [-1, 3, i64::MAX] {
        let err = a.set_index(index, &Value::int(0)).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index, len: 2 });
    }
}

#[test]
fn fixed_array_does_not_grow() {
    let a = ArrayValue::fixed(Type::Int, vec![Value::int(1)]);
    let err = a.set_index(1, &Value::int(2)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index: 1, len: 1 });
    assert!(a.set_index(0, &Value::int(2)).is_ok());
}

#[test]
fn read_only_array_rejects_writes() {
    let a = ints(&[1, 2]).read_only();
    let err = a.set_index(0, &Value::int(5)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotSettable { .. }));
    let err = a
        .set_range(0, 1, &Value::array(Type::Int, vec![Value::int(5)]))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotSettable { .. }));
}

#[test]
fn set_range_copies_element_wise() {
    let a = ints(&[1, 2, 3, 4]);
    let alias = a.clone();
    let src = Value::array(Type::Any, vec![Value::int(8), Value::int(9)]);
    let out = a.set_range(1, 3, &src).unwrap();
    assert_eq!(out.into_value(), Value::Array(ints(&[8, 9])));
    assert_eq!(alias.snapshot(), ints(&[1, 8, 9, 4]).snapshot());
}

#[test]
fn set_range_invalid_bounds() {
    let a = ints(&[1, 2, 3]);
    let src = Value::array(Type::Int, vec![]);
    for (begin, end) in [(2, 1), (-1, 1), (0, 4)] {
        let err = a.set_range(begin, end, &src).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::InvalidSliceIndex { begin, end, len: 3 }
        );
    }
}

#[test]
fn set_range_length_mismatch() {
    let a = ints(&[1, 2, 3]);
    let src = Value::array(Type::Int, vec![Value::int(7)]);
    let err = a.set_range(0, 2, &src).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidSliceIndex { .. }));
    assert_eq!(a.snapshot(), ints(&[1, 2, 3]).snapshot());
}

#[test]
fn set_range_converts_before_writing() {
    let a = ints(&[1, 2, 3]);
    let src = Value::array(Type::Any, vec![Value::int(7), Value::string("x")]);
    assert!(a.set_range(0, 2, &src).is_err());
    assert_eq!(a.snapshot(), ints(&[1, 2, 3]).snapshot());
}

#[test]
fn set_range_requires_array_source() {
    let err = ints(&[1]).set_range(0, 1, &Value::int(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeConversion { .. }));
}

// Pointers

#[test]
fn pointer_store_writes_pointee() {
    let p = PointerValue::to(Type::Int, Value::int(1));
    let alias = p.clone();
    p.store(Value::int(2)).unwrap();
    assert_eq!(alias.load(), Some(Value::int(2)));
}

#[test]
fn nil_pointer_store_fails() {
    let err = PointerValue::nil(Type::Int).store(Value::int(2)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeInvalid { .. }));
}

// Strings

#[test]
fn string_replace_and_append() {
    let cut = string_set_index("cat", 1, &Value::string("u")).unwrap();
    assert_eq!(cut, Mutation::Replaced(Value::string("cut")));
    let cats = string_set_index("cat", 3, &Value::string("s")).unwrap();
    assert_eq!(cats, Mutation::Replaced(Value::string("cats")));
}

#[test]
fn string_indices_count_chars() {
    let out = string_set_index("héllo", 1, &Value::string("e")).unwrap();
    assert_eq!(out.into_value(), Value::string("hello"));
}

#[test]
fn string_out_of_range() {
    for index in [-1, 4] {
        let err = string_set_index("cat", index, &Value::string("x")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index, len: 3 });
    }
}

#[test]
fn string_requires_string_piece() {
    let err = string_set_index("cat", 0, &Value::int(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeConversion { .. }));
}

proptest! {
    #[test]
    fn string_rebuild_law(s in "[a-z]{0,12}", piece in "[A-Z]{1,3}", raw in 0usize..16) {
        let chars: Vec<char> = s.chars().collect();
        let index = raw.min(chars.len());
        let out = string_set_index(&s, i64::try_from(index).unwrap(), &Value::string(piece.as_str()))
            .unwrap()
            .into_value();
        let tail: String = chars.iter().skip(index + 1).collect();
        let head: String = chars.iter().take(index).collect();
        prop_assert_eq!(out, Value::string(format!("{head}{piece}{tail}")));
    }

    #[test]
    fn array_replace_then_append_law(items in prop::collection::vec(any::<i64>(), 0..8), v in any::<i64>()) {
        let a = ints(&items);
        let len = items.len();

        let grown = a.set_index(i64::try_from(len).unwrap(), &Value::int(v)).unwrap();
        prop_assert!(matches!(grown, Mutation::Replaced(_)));
        let Value::Array(grown) = grown.into_value() else {
            unreachable!("append yields an array");
        };
        prop_assert_eq!(grown.len(), len + 1);
        prop_assert_eq!(grown.get(len), Some(Value::int(v)));
        prop_assert_eq!(a.len(), len);

        if len > 0 {
            let replaced = a.set_index(0, &Value::int(v)).unwrap();
            prop_assert!(matches!(replaced, Mutation::InPlace(_)));
            prop_assert_eq!(a.get(0), Some(Value::int(v)));
            prop_assert_eq!(grown.get(0), Some(Value::int(items[0])));
        }
    }
}
