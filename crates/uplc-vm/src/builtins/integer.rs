use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One as _, Signed as _, Zero as _};
use uplc_ast::DefaultFunction;

use super::{CallResult, take};
use crate::{BuiltinError, RunState, Value, integer_ex_mem};

pub(super) fn arithmetic<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    op: impl FnOnce(&BigInt, &BigInt) -> BigInt,
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_integer()?, b.unwrap_integer()?);
    rs.charge(fun, &[integer_ex_mem(x), integer_ex_mem(y)])?;
    Ok(Value::integer(op(x, y)))
}

/// Like [`arithmetic`], but a zero divisor fails without charging.
pub(super) fn division<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    op: impl FnOnce(&BigInt, &BigInt) -> BigInt,
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_integer()?, b.unwrap_integer()?);
    if y.is_zero() {
        return Err(BuiltinError::DivisionByZero.into());
    }
    rs.charge(fun, &[integer_ex_mem(x), integer_ex_mem(y)])?;
    Ok(Value::integer(op(x, y)))
}

pub(super) fn compare<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    op: impl FnOnce(&BigInt, &BigInt) -> bool,
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_integer()?, b.unwrap_integer()?);
    rs.charge(fun, &[integer_ex_mem(x), integer_ex_mem(y)])?;
    Ok(Value::bool(op(x, y)))
}

/// `expModInteger b e m`: `b^e mod m`, where a negative exponent raises
/// the inverse of `b`.
#[allow(clippy::arithmetic_side_effects)]
pub(super) fn exp_mod<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b, e, m] = take::<3>(args)?;
    let (base, exponent, modulus) = (b.unwrap_integer()?, e.unwrap_integer()?, m.unwrap_integer()?);
    rs.charge(
        fun,
        &[
            integer_ex_mem(base),
            integer_ex_mem(exponent),
            integer_ex_mem(modulus),
        ],
    )?;
    if !modulus.is_positive() {
        return Err(BuiltinError::ExpMod("modulus must be positive").into());
    }
    if modulus.is_one() {
        return Ok(Value::integer(BigInt::zero()));
    }
    let result = if exponent.is_negative() {
        let inverse = base
            .mod_floor(modulus)
            .modinv(modulus)
            .ok_or(BuiltinError::ExpMod("base is not invertible"))?;
        inverse.modpow(&-exponent, modulus)
    } else {
        base.modpow(exponent, modulus)
    };
    Ok(Value::integer(result))
}
