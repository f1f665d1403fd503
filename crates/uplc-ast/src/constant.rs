use std::fmt;

use bls12_381::{G1Projective, G2Projective};
use num_bigint::BigInt;

use crate::{ConstantList, LedgerValue, PlutusData};

/// The type of a constant.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    /// Arbitrary-precision integers.
    Integer,
    /// Byte strings.
    ByteString,
    /// UTF-8 strings.
    String,
    /// The unit type.
    Unit,
    /// Booleans.
    Bool,
    /// Plutus data.
    Data,
    /// Homogeneous lists.
    List(Box<Type>),
    /// Pairs.
    Pair(Box<Type>, Box<Type>),
    /// Homogeneous arrays.
    Array(Box<Type>),
    /// BLS12-381 G1 points.
    Bls12_381G1Element,
    /// BLS12-381 G2 points.
    Bls12_381G2Element,
    /// Intermediate pairing results.
    Bls12_381MlResult,
    /// Multi-asset ledger values.
    Value,
}

impl Type {
    /// `list(t)`
    pub fn list(elem: Type) -> Self {
        Self::List(Box::new(elem))
    }

    /// `pair(a, b)`
    pub fn pair(fst: Type, snd: Type) -> Self {
        Self::Pair(Box::new(fst), Box::new(snd))
    }

    /// `array(t)`
    pub fn array(elem: Type) -> Self {
        Self::Array(Box::new(elem))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::ByteString => write!(f, "bytestring"),
            Self::String => write!(f, "string"),
            Self::Unit => write!(f, "unit"),
            Self::Bool => write!(f, "bool"),
            Self::Data => write!(f, "data"),
            Self::List(t) => write!(f, "(list {t})"),
            Self::Pair(a, b) => write!(f, "(pair {a} {b})"),
            Self::Array(t) => write!(f, "(array {t})"),
            Self::Bls12_381G1Element => write!(f, "bls12_381_G1_element"),
            Self::Bls12_381G2Element => write!(f, "bls12_381_G2_element"),
            Self::Bls12_381MlResult => write!(f, "bls12_381_mlresult"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// The output of a Miller loop.
///
/// The curve library exposes no structural equality for these, so two
/// results compare equal when they reduce to the same target group element.
#[derive(Copy, Clone, Debug)]
pub struct MillerLoopResult(pub bls12_381::MillerLoopResult);

impl PartialEq for MillerLoopResult {
    fn eq(&self, other: &Self) -> bool {
        self.0.final_exponentiation() == other.0.final_exponentiation()
    }
}

/// A constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    /// An integer.
    Integer(BigInt),
    /// A byte string.
    ByteString(Vec<u8>),
    /// A string.
    String(String),
    /// Unit.
    Unit,
    /// A boolean.
    Bool(bool),
    /// Plutus data.
    Data(PlutusData),
    /// A list along with its element type.
    ProtoList(Type, ConstantList),
    /// A pair along with its component types.
    ProtoPair(Type, Type, Box<Constant>, Box<Constant>),
    /// An array along with its element type.
    ProtoArray(Type, Vec<Constant>),
    /// A G1 point.
    Bls12_381G1Element(Box<G1Projective>),
    /// A G2 point.
    Bls12_381G2Element(Box<G2Projective>),
    /// A Miller loop result.
    Bls12_381MlResult(Box<MillerLoopResult>),
    /// A multi-asset value.
    Value(LedgerValue),
}

impl Constant {
    /// Returns the type of this constant.
    pub fn type_of(&self) -> Type {
        match self {
            Self::Integer(_) => Type::Integer,
            Self::ByteString(_) => Type::ByteString,
            Self::String(_) => Type::String,
            Self::Unit => Type::Unit,
            Self::Bool(_) => Type::Bool,
            Self::Data(_) => Type::Data,
            Self::ProtoList(t, _) => Type::list(t.clone()),
            Self::ProtoPair(a, b, _, _) => Type::pair(a.clone(), b.clone()),
            Self::ProtoArray(t, _) => Type::array(t.clone()),
            Self::Bls12_381G1Element(_) => Type::Bls12_381G1Element,
            Self::Bls12_381G2Element(_) => Type::Bls12_381G2Element,
            Self::Bls12_381MlResult(_) => Type::Bls12_381MlResult,
            Self::Value(_) => Type::Value,
        }
    }

    /// A pair constant, deriving the component types from the components.
    pub fn pair(fst: Constant, snd: Constant) -> Self {
        Self::ProtoPair(
            fst.type_of(),
            snd.type_of(),
            Box::new(fst),
            Box::new(snd),
        )
    }

    /// A list of data.
    pub fn data_list(items: impl IntoIterator<Item = PlutusData>) -> Self {
        Self::ProtoList(Type::Data, items.into_iter().map(Self::Data).collect())
    }

    /// A list of `pair(data, data)`.
    pub fn data_pair_list(items: impl IntoIterator<Item = (PlutusData, PlutusData)>) -> Self {
        Self::ProtoList(
            Type::pair(Type::Data, Type::Data),
            items
                .into_iter()
                .map(|(k, v)| Self::pair(Self::Data(k), Self::Data(v)))
                .collect(),
        )
    }
}

impl From<BigInt> for Constant {
    fn from(i: BigInt) -> Self {
        Self::Integer(i)
    }
}

impl From<i64> for Constant {
    fn from(i: i64) -> Self {
        Self::Integer(i.into())
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Constant {
    fn from(bytes: Vec<u8>) -> Self {
        Self::ByteString(bytes)
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<PlutusData> for Constant {
    fn from(d: PlutusData) -> Self {
        Self::Data(d)
    }
}

impl From<LedgerValue> for Constant {
    fn from(v: LedgerValue) -> Self {
        Self::Value(v)
    }
}
