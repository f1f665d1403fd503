//! Multi-asset value builtins.

use uplc_ast::{Constant, DefaultFunction, LedgerValue};

use super::{CallResult, take};
use crate::{RunState, Value, byte_string_ex_mem, integer_ex_mem};

fn value<'a>(v: LedgerValue) -> Value<'a> {
    Value::con(Constant::Value(v))
}

/// `insertCoin currency token quantity value`, where a zero quantity
/// removes the entry.
pub(super) fn insert_coin<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [c, t, q, v] = take::<4>(args)?;
    let (currency, token, quantity, val) = (
        c.unwrap_byte_string()?,
        t.unwrap_byte_string()?,
        q.unwrap_integer()?,
        v.unwrap_ledger_value()?,
    );
    rs.charge(
        fun,
        &[
            byte_string_ex_mem(currency),
            byte_string_ex_mem(token),
            integer_ex_mem(quantity),
            v.ex_mem(),
        ],
    )?;
    let mut out = val.clone();
    out.insert(currency, token, quantity.clone())?;
    Ok(value(out))
}

pub(super) fn lookup_coin<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [c, t, v] = take::<3>(args)?;
    let (currency, token, val) = (
        c.unwrap_byte_string()?,
        t.unwrap_byte_string()?,
        v.unwrap_ledger_value()?,
    );
    rs.charge(
        fun,
        &[
            byte_string_ex_mem(currency),
            byte_string_ex_mem(token),
            v.ex_mem(),
        ],
    )?;
    Ok(Value::integer(val.lookup(currency, token)))
}

pub(super) fn union<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_ledger_value()?, b.unwrap_ledger_value()?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    Ok(value(x.union(y)?))
}

pub(super) fn contains<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_ledger_value()?, b.unwrap_ledger_value()?);
    rs.charge(fun, &[a.ex_mem(), b.ex_mem()])?;
    Ok(Value::bool(x.contains(y)))
}

pub(super) fn to_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [v] = take::<1>(args)?;
    let val = v.unwrap_ledger_value()?;
    rs.charge(fun, &[v.ex_mem()])?;
    Ok(Value::data(val.to_data()))
}

pub(super) fn from_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge(fun, &[d.ex_mem()])?;
    Ok(value(LedgerValue::from_data(data)?))
}

pub(super) fn scale<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [n, v] = take::<2>(args)?;
    let (factor, val) = (n.unwrap_integer()?, v.unwrap_ledger_value()?);
    rs.charge(fun, &[integer_ex_mem(factor), v.ex_mem()])?;
    Ok(value(val.scale(factor)?))
}
