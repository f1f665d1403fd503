//! BLS12-381 builtins.
//!
//! G1 and G2 share every operation, so the builtins are written once over
//! [`Point`] and instantiated per group by the dispatcher.

use core::ops::{Add, Mul, Neg};

use buggy::{Bug, BugExt as _};
use bls12_381::{
    G1Affine, G1Projective, G2Affine, G2Prepared, G2Projective, Scalar,
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    multi_miller_loop,
};
use num_bigint::{BigInt, Sign};
use num_integer::Integer as _;
use uplc_ast::{Constant, DefaultFunction, Type, bls::MillerLoopResult};

use super::{CallResult, take};
use crate::{
    BuiltinError, MachineErrorType, RunState, Value, byte_string_ex_mem, integer_ex_mem,
    list_length,
};

/// The order of the BLS12-381 scalar field, big-endian.
const SCALAR_MODULUS: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Longest domain separation tag accepted by hash-to-group.
const MAX_DST_LEN: usize = 255;

/// A point in G1 or G2.
pub(super) trait Point:
    Copy + PartialEq + Add<Output = Self> + Neg<Output = Self> + Mul<Scalar, Output = Self>
{
    /// The constant type holding this point.
    const TYPE: Type;
    /// Name used in errors.
    const NAME: &'static str;

    fn identity() -> Self;
    fn from_constant(c: &Constant) -> Option<&Self>;
    fn unwrap<'v>(v: &'v Value<'_>) -> Result<&'v Self, MachineErrorType>;
    fn into_value<'a>(self) -> Value<'a>;
    fn compress(&self) -> Vec<u8>;
    fn uncompress(bytes: &[u8]) -> Result<Self, BuiltinError>;
    fn hash_to_group(msg: &[u8], dst: &[u8]) -> Self;
}

impl Point for G1Projective {
    const TYPE: Type = Type::Bls12_381G1Element;
    const NAME: &'static str = "G1";

    fn identity() -> Self {
        Self::identity()
    }

    fn from_constant(c: &Constant) -> Option<&Self> {
        match c {
            Constant::Bls12_381G1Element(p) => Some(p),
            _ => None,
        }
    }

    fn unwrap<'v>(v: &'v Value<'_>) -> Result<&'v Self, MachineErrorType> {
        v.unwrap_g1()
    }

    fn into_value<'a>(self) -> Value<'a> {
        Value::con(Constant::Bls12_381G1Element(Box::new(self)))
    }

    fn compress(&self) -> Vec<u8> {
        G1Affine::from(self).to_compressed().to_vec()
    }

    fn uncompress(bytes: &[u8]) -> Result<Self, BuiltinError> {
        let bytes: &[u8; 48] = bytes
            .try_into()
            .map_err(|_| BuiltinError::InvalidLength {
                what: "compressed G1 point",
                expected: 48,
                got: bytes.len(),
            })?;
        Option::<G1Affine>::from(G1Affine::from_compressed(bytes))
            .map(Self::from)
            .ok_or(BuiltinError::Uncompress(Self::NAME))
    }

    fn hash_to_group(msg: &[u8], dst: &[u8]) -> Self {
        <Self as HashToCurve<ExpandMsgXmd<sha2_v09::Sha256>>>::hash_to_curve(msg, dst)
    }
}

impl Point for G2Projective {
    const TYPE: Type = Type::Bls12_381G2Element;
    const NAME: &'static str = "G2";

    fn identity() -> Self {
        Self::identity()
    }

    fn from_constant(c: &Constant) -> Option<&Self> {
        match c {
            Constant::Bls12_381G2Element(p) => Some(p),
            _ => None,
        }
    }

    fn unwrap<'v>(v: &'v Value<'_>) -> Result<&'v Self, MachineErrorType> {
        v.unwrap_g2()
    }

    fn into_value<'a>(self) -> Value<'a> {
        Value::con(Constant::Bls12_381G2Element(Box::new(self)))
    }

    fn compress(&self) -> Vec<u8> {
        G2Affine::from(self).to_compressed().to_vec()
    }

    fn uncompress(bytes: &[u8]) -> Result<Self, BuiltinError> {
        let bytes: &[u8; 96] = bytes
            .try_into()
            .map_err(|_| BuiltinError::InvalidLength {
                what: "compressed G2 point",
                expected: 96,
                got: bytes.len(),
            })?;
        Option::<G2Affine>::from(G2Affine::from_compressed(bytes))
            .map(Self::from)
            .ok_or(BuiltinError::Uncompress(Self::NAME))
    }

    fn hash_to_group(msg: &[u8], dst: &[u8]) -> Self {
        <Self as HashToCurve<ExpandMsgXmd<sha2_v09::Sha256>>>::hash_to_curve(msg, dst)
    }
}

/// Reduces an integer into the scalar field.
fn scalar(n: &BigInt) -> Result<Scalar, Bug> {
    let modulus = BigInt::from_bytes_be(Sign::Plus, &SCALAR_MODULUS);
    let (_, mut le) = n.mod_floor(&modulus).to_bytes_le();
    le.resize(32, 0);
    let bytes: [u8; 32] = le
        .try_into()
        .ok()
        .assume("reduced scalar fits in 32 bytes")?;
    Option::<Scalar>::from(Scalar::from_bytes(&bytes)).assume("reduced scalar is canonical")
}

#[allow(clippy::arithmetic_side_effects)]
pub(super) fn add<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (p, q) = (P::unwrap(a)?, P::unwrap(b)?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    Ok((*p + *q).into_value())
}

pub(super) fn neg<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a] = take::<1>(args)?;
    let p = P::unwrap(a)?;
    rs.charge(fun, &[a.ex_mem()])?;
    Ok((-*p).into_value())
}

#[allow(clippy::arithmetic_side_effects)]
pub(super) fn scalar_mul<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [n, a] = take::<2>(args)?;
    let (n, p) = (n.unwrap_integer()?, P::unwrap(a)?);
    rs.charge(fun, &[integer_ex_mem(n), a.ex_mem()])?;
    Ok((*p * scalar(n)?).into_value())
}

pub(super) fn equal<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (p, q) = (P::unwrap(a)?, P::unwrap(b)?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    Ok(Value::bool(p == q))
}

pub(super) fn compress<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a] = take::<1>(args)?;
    let p = P::unwrap(a)?;
    rs.charge(fun, &[a.ex_mem()])?;
    Ok(Value::byte_string(p.compress()))
}

pub(super) fn uncompress<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    Ok(P::uncompress(bytes)?.into_value())
}

pub(super) fn hash_to_group<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [m, d] = take::<2>(args)?;
    let (msg, dst) = (m.unwrap_byte_string()?, d.unwrap_byte_string()?);
    rs.charge(fun, &[byte_string_ex_mem(msg), byte_string_ex_mem(dst)])?;
    if dst.len() > MAX_DST_LEN {
        return Err(BuiltinError::DstTooLong(dst.len()).into());
    }
    Ok(P::hash_to_group(msg, dst).into_value())
}

/// `multiScalarMul scalars points`: the sum of `s_i * p_i`, pairing
/// elements until the shorter list runs out.
#[allow(clippy::arithmetic_side_effects)]
pub(super) fn multi_scalar_mul<'a, P: Point>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [s, p] = take::<2>(args)?;
    let (scalars, points) = (s.unwrap_list_of(&Type::Integer)?, p.unwrap_list_of(&P::TYPE)?);
    rs.charge(fun, &[list_length(scalars), list_length(points)])?;
    let mut acc = P::identity();
    for (s, p) in scalars.iter().zip(points) {
        let Constant::Integer(n) = s else {
            return Err(MachineErrorType::type_mismatch("integer", s.type_of()).into());
        };
        let point = P::from_constant(p)
            .ok_or_else(|| MachineErrorType::type_mismatch(P::TYPE.to_string(), p.type_of()))?;
        acc = acc + *point * scalar(n)?;
    }
    Ok(acc.into_value())
}

fn ml_value<'a>(r: bls12_381::MillerLoopResult) -> Value<'a> {
    Value::con(Constant::Bls12_381MlResult(Box::new(MillerLoopResult(r))))
}

pub(super) fn miller_loop<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (p, q) = (a.unwrap_g1()?, b.unwrap_g2()?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    let q = G2Prepared::from(G2Affine::from(q));
    Ok(ml_value(multi_miller_loop(&[(&G1Affine::from(p), &q)])))
}

#[allow(clippy::arithmetic_side_effects)]
pub(super) fn mul_ml_result<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_ml_result()?, b.unwrap_ml_result()?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    // The target group is written additively here.
    Ok(ml_value(x.0 + y.0))
}

pub(super) fn final_verify<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_ml_result()?, b.unwrap_ml_result()?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    Ok(Value::bool(x == y))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scalar_reduction() {
        let r = BigInt::from_bytes_be(Sign::Plus, &SCALAR_MODULUS);
        assert_eq!(scalar(&r).unwrap(), Scalar::zero());
        assert_eq!(scalar(&(&r + 1)).unwrap(), Scalar::one());
        assert_eq!(scalar(&BigInt::from(-1)).unwrap(), -Scalar::one());
    }

    #[test]
    fn test_compression_round_trip() {
        let g = G1Projective::generator();
        let bytes = Point::compress(&g);
        assert_eq!(bytes.len(), 48);
        assert_eq!(<G1Projective as Point>::uncompress(&bytes).unwrap(), g);

        let h = G2Projective::generator();
        let bytes = Point::compress(&h);
        assert_eq!(bytes.len(), 96);
        assert_eq!(<G2Projective as Point>::uncompress(&bytes).unwrap(), h);
    }

    #[test]
    fn test_uncompress_rejects_bad_length() {
        assert!(matches!(
            <G1Projective as Point>::uncompress(&[0; 47]),
            Err(BuiltinError::InvalidLength { expected: 48, .. })
        ));
    }
}
