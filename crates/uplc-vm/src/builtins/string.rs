use uplc_ast::DefaultFunction;

use super::{CallResult, take};
use crate::{BuiltinError, RunState, Value, byte_string_ex_mem, string_ex_mem};

pub(super) fn append<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_string()?, b.unwrap_string()?);
    rs.charge(fun, &[string_ex_mem(x), string_ex_mem(y)])?;
    Ok(Value::string([x, y].concat()))
}

pub(super) fn equals<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_string()?, b.unwrap_string()?);
    rs.charge(fun, &[string_ex_mem(x), string_ex_mem(y)])?;
    Ok(Value::bool(x == y))
}

pub(super) fn encode_utf8<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [s] = take::<1>(args)?;
    let s = s.unwrap_string()?;
    rs.charge(fun, &[string_ex_mem(s)])?;
    Ok(Value::byte_string(s.as_bytes().to_vec()))
}

pub(super) fn decode_utf8<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    let s = core::str::from_utf8(bytes).map_err(|_| BuiltinError::InvalidUtf8)?;
    Ok(Value::string(s.to_owned()))
}
