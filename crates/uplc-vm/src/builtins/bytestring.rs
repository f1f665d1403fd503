use num_bigint::{BigInt, Sign};
use num_integer::Integer as _;
use num_traits::{Signed as _, ToPrimitive as _, Zero as _};
use uplc_ast::DefaultFunction;

use super::{CallResult, take};
use crate::{
    BuiltinError, BuiltinSemantics, RunState, Value, byte_string_ex_mem, bytes_as_words,
    integer_ex_mem,
};

/// Largest output of `integerToByteString` and `replicateByte`, in bytes.
pub(super) const MAX_CONVERSION_BYTES: usize = 8192;

pub(super) fn append<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_byte_string()?, b.unwrap_byte_string()?);
    rs.charge(fun, &[byte_string_ex_mem(x), byte_string_ex_mem(y)])?;
    Ok(Value::byte_string([x, y].concat()))
}

pub(super) fn cons<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (byte, bytes) = (a.unwrap_integer()?, b.unwrap_byte_string()?);
    rs.charge(fun, &[integer_ex_mem(byte), byte_string_ex_mem(bytes)])?;
    let byte = match rs.machine().semantics {
        BuiltinSemantics::Wrapping => byte.mod_floor(&BigInt::from(256)).to_u8(),
        BuiltinSemantics::Checked => byte.to_u8(),
    }
    .ok_or_else(|| BuiltinError::ByteOutOfRange(byte.clone()))?;
    let mut out = Vec::with_capacity(bytes.len().saturating_add(1));
    out.push(byte);
    out.extend_from_slice(bytes);
    Ok(Value::byte_string(out))
}

/// Clamps an integer to `0..=max`.
fn clamp(i: &BigInt, max: usize) -> usize {
    if i.is_negative() {
        return 0;
    }
    i.to_usize().map_or(max, |i| i.min(max))
}

pub(super) fn slice<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [s, n, b] = take::<3>(args)?;
    let (start, len, bytes) = (s.unwrap_integer()?, n.unwrap_integer()?, b.unwrap_byte_string()?);
    rs.charge(
        fun,
        &[
            integer_ex_mem(start),
            integer_ex_mem(len),
            byte_string_ex_mem(bytes),
        ],
    )?;
    let start = clamp(start, bytes.len());
    let rest = bytes.get(start..).unwrap_or_default();
    let len = clamp(len, rest.len());
    Ok(Value::byte_string(
        rest.get(..len).unwrap_or_default().to_vec(),
    ))
}

pub(super) fn length<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    Ok(Value::integer(bytes.len().into()))
}

pub(super) fn index<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, i] = take::<2>(args)?;
    let (bytes, index) = (b.unwrap_byte_string()?, i.unwrap_integer()?);
    rs.charge(fun, &[byte_string_ex_mem(bytes), integer_ex_mem(index)])?;
    let byte = index
        .to_usize()
        .and_then(|i| bytes.get(i))
        .ok_or_else(|| BuiltinError::IndexOutOfBounds {
            index: index.clone(),
            len: bytes.len(),
        })?;
    Ok(Value::integer((*byte).into()))
}

pub(super) fn compare<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    op: impl FnOnce(&[u8], &[u8]) -> bool,
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_byte_string()?, b.unwrap_byte_string()?);
    rs.charge(fun, &[byte_string_ex_mem(x), byte_string_ex_mem(y)])?;
    Ok(Value::bool(op(x, y)))
}

/// `integerToByteString big_endian width n`.
///
/// A zero width produces the shortest encoding; otherwise the output is
/// padded to exactly `width` bytes.
pub(super) fn from_integer<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [e, w, n] = take::<3>(args)?;
    let (big_endian, width, n) = (e.unwrap_bool()?, w.unwrap_integer()?, n.unwrap_integer()?);
    rs.charge(fun, &[1, bytes_as_words(width), integer_ex_mem(n)])?;

    let width = width
        .to_usize()
        .filter(|w| *w <= MAX_CONVERSION_BYTES)
        .ok_or_else(|| BuiltinError::InvalidSize(width.clone()))?;
    if n.is_negative() {
        return Err(BuiltinError::NegativeInteger(n.clone()).into());
    }
    let mut bytes = if n.is_zero() {
        Vec::new()
    } else {
        n.to_bytes_le().1
    };
    let limit = if width == 0 { MAX_CONVERSION_BYTES } else { width };
    if bytes.len() > limit {
        return Err(BuiltinError::IntegerTooWide(n.clone()).into());
    }
    bytes.resize(width.max(bytes.len()), 0);
    if big_endian {
        bytes.reverse();
    }
    Ok(Value::byte_string(bytes))
}

/// `byteStringToInteger big_endian bytes`, read as unsigned.
pub(super) fn to_integer<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [e, b] = take::<2>(args)?;
    let (big_endian, bytes) = (e.unwrap_bool()?, b.unwrap_byte_string()?);
    rs.charge(fun, &[1, byte_string_ex_mem(bytes)])?;
    let n = if big_endian {
        BigInt::from_bytes_be(Sign::Plus, bytes)
    } else {
        BigInt::from_bytes_le(Sign::Plus, bytes)
    };
    Ok(Value::integer(n))
}
