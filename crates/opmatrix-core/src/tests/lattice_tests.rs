use crate::types::{IntegerType, ResultType, TypeFamily, TypeLattice};
use crate::MatrixError;
use pretty_assertions::assert_eq;

#[test]
fn test_type_order_custom_then_native() {
    let names: Vec<&str> = TypeLattice::types().iter().map(|ty| ty.name()).collect();
    assert_eq!(
        names,
        vec!["int1", "uint1", "uint2", "uint4", "uint8", "int2", "int4", "int8"]
    );
}

#[test]
fn test_max_value_matches_width_and_sign() {
    for ty in TypeLattice::types() {
        let magnitude_bits = ty.bit_width() - u32::from(ty.is_signed());
        let expected = (1u128 << magnitude_bits) - 1;
        assert_eq!(u128::from(ty.max_value()), expected, "{}", ty);
    }
    assert_eq!(IntegerType::Uint1.max_value(), 255);
    assert_eq!(IntegerType::Int1.max_value(), 127);
    assert_eq!(IntegerType::Uint8.max_value(), 18446744073709551615);
    assert_eq!(IntegerType::Int8.max_value(), 9223372036854775807);
}

#[test]
fn test_min_value() {
    assert_eq!(IntegerType::Int1.min_value(), -128);
    assert_eq!(IntegerType::Int2.min_value(), -32768);
    assert_eq!(IntegerType::Int8.min_value(), i64::MIN);
    assert_eq!(IntegerType::Uint4.min_value(), 0);
}

#[test]
fn test_families() {
    for ty in TypeLattice::custom() {
        assert_eq!(ty.family(), TypeFamily::Custom);
    }
    for ty in TypeLattice::NATIVE {
        assert_eq!(ty.family(), TypeFamily::Native);
    }
}

#[test]
fn test_wider_keeps_signedness_and_doubles_width() {
    for ty in TypeLattice::types() {
        match ty.wider() {
            Some(wider) => {
                assert_eq!(wider.bit_width(), ty.bit_width() * 2);
                assert_eq!(wider.is_signed(), ty.is_signed());
            }
            None => assert_eq!(ty.bit_width(), 64),
        }
    }
    assert_eq!(
        TypeLattice::next_wider(IntegerType::Uint1),
        Ok(IntegerType::Uint2)
    );
    assert_eq!(
        TypeLattice::next_wider(IntegerType::Int1),
        Ok(IntegerType::Int2)
    );
}

#[test]
fn test_next_wider_of_64_bit_is_lookup_error() {
    assert_eq!(
        TypeLattice::next_wider(IntegerType::Uint8),
        Err(MatrixError::NoWiderType(IntegerType::Uint8))
    );
    assert_eq!(
        TypeLattice::next_wider(IntegerType::Int8),
        Err(MatrixError::NoWiderType(IntegerType::Int8))
    );
}

#[test]
fn test_closure_excludes_native_pairs_only() {
    for &left in TypeLattice::types() {
        for &right in TypeLattice::types() {
            let both_native =
                left.family() == TypeFamily::Native && right.family() == TypeFamily::Native;
            assert_eq!(TypeLattice::in_closure(left, right), !both_native);
        }
    }
}

#[test]
fn test_wrap_two_complement() {
    assert_eq!(IntegerType::Uint1.wrap(300), 44);
    assert_eq!(IntegerType::Uint1.wrap(-5), 251);
    assert_eq!(IntegerType::Int1.wrap(200), -56);
    assert_eq!(IntegerType::Int1.wrap(-129), 127);
    assert_eq!(IntegerType::Int8.wrap(i128::from(i64::MAX) + 1), i128::from(i64::MIN));
    assert_eq!(IntegerType::Uint8.wrap(-1), i128::from(u64::MAX));
    assert_eq!(IntegerType::Uint4.wrap(1 << 32), 0);
}

#[test]
fn test_contains() {
    assert!(IntegerType::Uint1.contains(255));
    assert!(!IntegerType::Uint1.contains(256));
    assert!(!IntegerType::Uint1.contains(-1));
    assert!(IntegerType::Int1.contains(-128));
    assert!(!IntegerType::Int1.contains(128));
}

#[test]
fn test_parse_type_names() {
    assert_eq!("uint4".parse::<IntegerType>(), Ok(IntegerType::Uint4));
    assert_eq!("INT2".parse::<IntegerType>(), Ok(IntegerType::Int2));
    assert_eq!(
        "uint16".parse::<IntegerType>(),
        Err(MatrixError::UnknownType("uint16".to_string()))
    );
}

#[test]
fn test_result_type_names() {
    assert_eq!(ResultType::Boolean.to_string(), "boolean");
    assert_eq!(ResultType::Integer(IntegerType::Uint2).to_string(), "uint2");
    assert_eq!(ResultType::Boolean.as_integer(), None);
}

#[test]
fn test_serde_uses_type_names() {
    let json = serde_json::to_string(&IntegerType::Uint8).unwrap();
    assert_eq!(json, "\"uint8\"");
    let back: IntegerType = serde_json::from_str("\"int1\"").unwrap();
    assert_eq!(back, IntegerType::Int1);
}
