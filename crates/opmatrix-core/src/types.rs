use crate::{MatrixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-width integer types known to the generator.
///
/// The digit in each name is the width in bytes, so `uint8` is a 64-bit
/// unsigned integer and `int1` a signed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerType {
    Int1,
    Uint1,
    Uint2,
    Uint4,
    Uint8,
    Int2,
    Int4,
    Int8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    /// Types introduced by the generated extension.
    Custom,
    /// Types the host already ships operators for.
    Native,
}

impl IntegerType {
    pub fn name(&self) -> &'static str {
        match self {
            IntegerType::Int1 => "int1",
            IntegerType::Uint1 => "uint1",
            IntegerType::Uint2 => "uint2",
            IntegerType::Uint4 => "uint4",
            IntegerType::Uint8 => "uint8",
            IntegerType::Int2 => "int2",
            IntegerType::Int4 => "int4",
            IntegerType::Int8 => "int8",
        }
    }

    pub fn bit_width(&self) -> u32 {
        match self {
            IntegerType::Int1 | IntegerType::Uint1 => 8,
            IntegerType::Int2 | IntegerType::Uint2 => 16,
            IntegerType::Int4 | IntegerType::Uint4 => 32,
            IntegerType::Int8 | IntegerType::Uint8 => 64,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntegerType::Int1 | IntegerType::Int2 | IntegerType::Int4 | IntegerType::Int8
        )
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            IntegerType::Int2 | IntegerType::Int4 | IntegerType::Int8 => TypeFamily::Native,
            _ => TypeFamily::Custom,
        }
    }

    /// `2^(bits - sign) - 1`
    pub fn max_value(&self) -> u64 {
        let magnitude_bits = self.bit_width() - u32::from(self.is_signed());
        u64::MAX >> (64 - magnitude_bits)
    }

    pub fn min_value(&self) -> i64 {
        if self.is_signed() {
            -(self.max_value() as i64) - 1
        } else {
            0
        }
    }

    pub fn contains(&self, value: i128) -> bool {
        value >= i128::from(self.min_value()) && value <= i128::from(self.max_value())
    }

    /// Reduce `value` modulo `2^bits` into this type's range, the way a
    /// two's-complement store truncates.
    pub fn wrap(&self, value: i128) -> i128 {
        let bits = self.bit_width();
        let modulus = 1u128 << bits;
        let low = (value as u128) & (modulus - 1);
        if self.is_signed() && low >= modulus >> 1 {
            low as i128 - modulus as i128
        } else {
            low as i128
        }
    }

    /// Next power-of-two wider type of the same signedness.
    pub fn wider(&self) -> Option<IntegerType> {
        match self {
            IntegerType::Int1 => Some(IntegerType::Int2),
            IntegerType::Int2 => Some(IntegerType::Int4),
            IntegerType::Int4 => Some(IntegerType::Int8),
            IntegerType::Uint1 => Some(IntegerType::Uint2),
            IntegerType::Uint2 => Some(IntegerType::Uint4),
            IntegerType::Uint4 => Some(IntegerType::Uint8),
            IntegerType::Int8 | IntegerType::Uint8 => None,
        }
    }

    /// Next narrower type of the same signedness.
    pub fn half_width(&self) -> Option<IntegerType> {
        match self {
            IntegerType::Int2 => Some(IntegerType::Int1),
            IntegerType::Int4 => Some(IntegerType::Int2),
            IntegerType::Int8 => Some(IntegerType::Int4),
            IntegerType::Uint2 => Some(IntegerType::Uint1),
            IntegerType::Uint4 => Some(IntegerType::Uint2),
            IntegerType::Uint8 => Some(IntegerType::Uint4),
            IntegerType::Int1 | IntegerType::Uint1 => None,
        }
    }

    /// Ordering key for promotion: wider wins, unsigned wins a tie.
    pub fn promotion_rank(&self) -> (u32, bool) {
        (self.bit_width(), !self.is_signed())
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegerType {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        TypeLattice::types()
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MatrixError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Boolean,
    Integer(IntegerType),
}

impl ResultType {
    pub fn name(&self) -> &'static str {
        match self {
            ResultType::Boolean => "boolean",
            ResultType::Integer(ty) => ty.name(),
        }
    }

    pub fn as_integer(&self) -> Option<IntegerType> {
        match self {
            ResultType::Integer(ty) => Some(*ty),
            ResultType::Boolean => None,
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<IntegerType> for ResultType {
    fn from(ty: IntegerType) -> Self {
        ResultType::Integer(ty)
    }
}

/// The closed catalog of integer types and the relations between them.
pub struct TypeLattice;

impl TypeLattice {
    pub const CUSTOM: [IntegerType; 5] = [
        IntegerType::Int1,
        IntegerType::Uint1,
        IntegerType::Uint2,
        IntegerType::Uint4,
        IntegerType::Uint8,
    ];

    pub const NATIVE: [IntegerType; 3] = [IntegerType::Int2, IntegerType::Int4, IntegerType::Int8];

    const ALL: [IntegerType; 8] = [
        IntegerType::Int1,
        IntegerType::Uint1,
        IntegerType::Uint2,
        IntegerType::Uint4,
        IntegerType::Uint8,
        IntegerType::Int2,
        IntegerType::Int4,
        IntegerType::Int8,
    ];

    /// Custom widths first, then native widths.
    pub fn types() -> &'static [IntegerType] {
        &Self::ALL
    }

    pub fn custom() -> &'static [IntegerType] {
        &Self::CUSTOM
    }

    pub fn next_wider(ty: IntegerType) -> Result<IntegerType> {
        ty.wider().ok_or(MatrixError::NoWiderType(ty))
    }

    /// Native x native pairs are already covered by the host.
    pub fn in_closure(left: IntegerType, right: IntegerType) -> bool {
        left.family() == TypeFamily::Custom || right.family() == TypeFamily::Custom
    }
}
