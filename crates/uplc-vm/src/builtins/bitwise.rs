//! Logical and bit-level byte string builtins.
//!
//! Bit `j` of a byte string lives in byte `len - 1 - j / 8` at position
//! `j % 8`, so bit 0 is the least significant bit of the last byte.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer as _;
use num_traits::{One as _, Signed as _, ToPrimitive as _};
use uplc_ast::{Constant, DefaultFunction, Type};

use super::{CallResult, bytestring::MAX_CONVERSION_BYTES, take};
use crate::{
    BuiltinError, MachineErrorType, RunState, Value, byte_string_ex_mem, bytes_as_words,
    integer_ex_mem, list_length, literal_size,
};

/// `and/or/xorByteString pad a b`.
///
/// Bytes are combined from the start. With `pad` the result keeps the
/// tail of the longer input; without it the result is truncated to the
/// shorter.
pub(super) fn logical<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    op: impl Fn(u8, u8) -> u8,
) -> CallResult<'a> {
    let [p, a, b] = take::<3>(args)?;
    let (pad, x, y) = (p.unwrap_bool()?, a.unwrap_byte_string()?, b.unwrap_byte_string()?);
    rs.charge(fun, &[1, byte_string_ex_mem(x), byte_string_ex_mem(y)])?;
    let (short, long) = if x.len() <= y.len() { (x, y) } else { (y, x) };
    let mut out = if pad { long.to_vec() } else { short.to_vec() };
    for (o, (s, l)) in out.iter_mut().zip(short.iter().zip(long)) {
        *o = op(*s, *l);
    }
    Ok(Value::byte_string(out))
}

pub(super) fn complement<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    Ok(Value::byte_string(bytes.iter().map(|b| !b).collect()))
}

/// Locates bit `index`, as `(byte offset, mask)`.
fn locate(index: &BigInt, len: usize) -> Result<(usize, u8), BuiltinError> {
    let out_of_range = || BuiltinError::BitIndexOutOfRange(index.clone());
    let j = index.to_usize().ok_or_else(out_of_range)?;
    let byte = len
        .checked_sub(1)
        .and_then(|last| last.checked_sub(j / 8))
        .ok_or_else(out_of_range)?;
    Ok((byte, 1u8 << (j % 8)))
}

pub(super) fn read_bit<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, i] = take::<2>(args)?;
    let (bytes, index) = (b.unwrap_byte_string()?, i.unwrap_integer()?);
    rs.charge(fun, &[byte_string_ex_mem(bytes), integer_ex_mem(index)])?;
    let (byte, mask) = locate(index, bytes.len())?;
    let set = bytes.get(byte).is_some_and(|b| b & mask != 0);
    Ok(Value::bool(set))
}

/// `writeBits bytes indices value` sets every listed bit to `value`.
pub(super) fn write_bits<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, l, v] = take::<3>(args)?;
    let (bytes, indices, value) = (
        b.unwrap_byte_string()?,
        l.unwrap_list_of(&Type::Integer)?,
        v.unwrap_bool()?,
    );
    rs.charge(fun, &[byte_string_ex_mem(bytes), list_length(indices), 1])?;
    let mut out = bytes.to_vec();
    for index in indices {
        let Constant::Integer(index) = index else {
            return Err(MachineErrorType::type_mismatch("integer", index.type_of()).into());
        };
        let (byte, mask) = locate(index, out.len())?;
        if let Some(b) = out.get_mut(byte) {
            if value {
                *b |= mask;
            } else {
                *b &= !mask;
            }
        }
    }
    Ok(Value::byte_string(out))
}

pub(super) fn replicate_byte<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [n, b] = take::<2>(args)?;
    let (count, byte) = (n.unwrap_integer()?, b.unwrap_integer()?);
    rs.charge(fun, &[bytes_as_words(count), integer_ex_mem(byte)])?;
    let count = count
        .to_usize()
        .filter(|n| *n <= MAX_CONVERSION_BYTES)
        .ok_or_else(|| BuiltinError::InvalidSize(count.clone()))?;
    let byte = byte
        .to_u8()
        .ok_or_else(|| BuiltinError::ByteOutOfRange(byte.clone()))?;
    Ok(Value::byte_string(vec![byte; count]))
}

/// Pads or truncates a big-endian encoding to exactly `len` bytes.
fn to_fixed_be(n: &BigUint, len: usize) -> Vec<u8> {
    let bytes = n.to_bytes_be();
    match len.checked_sub(bytes.len()) {
        Some(pad) => {
            let mut out = vec![0; pad];
            out.extend_from_slice(&bytes);
            out
        }
        None => bytes.get(bytes.len().saturating_sub(len)..).unwrap_or_default().to_vec(),
    }
}

/// `shiftByteString bytes k`. Positive `k` moves bits toward higher
/// indices; vacated bits are zero.
#[allow(clippy::arithmetic_side_effects)]
pub(super) fn shift<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, k] = take::<2>(args)?;
    let (bytes, k) = (b.unwrap_byte_string()?, k.unwrap_integer()?);
    rs.charge(fun, &[byte_string_ex_mem(bytes), literal_size(k)])?;
    let bits = bytes.len().saturating_mul(8);
    let Some(amount) = k.abs().to_usize().filter(|a| *a < bits) else {
        return Ok(Value::byte_string(vec![0; bytes.len()]));
    };
    let n = BigUint::from_bytes_be(bytes);
    let shifted = if k.is_negative() {
        n >> amount
    } else {
        let mask = (BigUint::one() << bits) - 1u8;
        (n << amount) & mask
    };
    Ok(Value::byte_string(to_fixed_be(&shifted, bytes.len())))
}

/// `rotateByteString bytes k`, rotating toward higher indices by `k`
/// modulo the bit length.
#[allow(clippy::arithmetic_side_effects)]
pub(super) fn rotate<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, k] = take::<2>(args)?;
    let (bytes, k) = (b.unwrap_byte_string()?, k.unwrap_integer()?);
    rs.charge(fun, &[byte_string_ex_mem(bytes), literal_size(k)])?;
    let bits = bytes.len().saturating_mul(8);
    if bits == 0 {
        return Ok(Value::byte_string(Vec::new()));
    }
    let amount = k
        .mod_floor(&BigInt::from(bits))
        .to_usize()
        .unwrap_or_default();
    if amount == 0 {
        return Ok(Value::byte_string(bytes.to_vec()));
    }
    let n = BigUint::from_bytes_be(bytes);
    let mask = (BigUint::one() << bits) - 1u8;
    let rotated = ((&n << amount) | (n >> bits.saturating_sub(amount))) & mask;
    Ok(Value::byte_string(to_fixed_be(&rotated, bytes.len())))
}

pub(super) fn count_set_bits<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    let count: u64 = bytes.iter().map(|b| u64::from(b.count_ones())).sum();
    Ok(Value::integer(count.into()))
}

/// The index of the lowest set bit, or -1 when none is set.
#[allow(clippy::arithmetic_side_effects)]
pub(super) fn find_first_set_bit<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    let found = bytes
        .iter()
        .rev()
        .enumerate()
        .find(|(_, b)| **b != 0)
        .map(|(i, b)| {
            BigInt::from(i) * 8u8 + b.trailing_zeros()
        });
    Ok(Value::integer(found.unwrap_or_else(|| BigInt::from(-1))))
}
