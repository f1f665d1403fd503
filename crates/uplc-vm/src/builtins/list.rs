//! Polymorphic builtins over booleans, unit, pairs and lists.

use num_traits::{Signed as _, ToPrimitive as _};
use uplc_ast::{Constant, DefaultFunction};

use super::{CallResult, take};
use crate::{BuiltinError, MachineErrorType, RunState, Value, literal_size};

pub(super) fn if_then_else<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<3>(args)?;
    let [cond, then, otherwise] = args;
    let cond = cond.unwrap_bool()?;
    rs.charge_args(fun, args)?;
    Ok(if cond { then } else { otherwise }.clone())
}

pub(super) fn choose_unit<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<2>(args)?;
    let [unit, result] = args;
    unit.unwrap_unit()?;
    rs.charge_args(fun, args)?;
    Ok(result.clone())
}

pub(super) fn trace<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<2>(args)?;
    let [message, result] = args;
    let message = message.unwrap_string()?;
    rs.charge_args(fun, args)?;
    rs.log(message.to_owned());
    Ok(result.clone())
}

pub(super) fn fst_pair<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<1>(args)?;
    let (fst, _) = args[0].unwrap_pair()?;
    rs.charge_args(fun, args)?;
    Ok(Value::con(fst.clone()))
}

pub(super) fn snd_pair<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<1>(args)?;
    let (_, snd) = args[0].unwrap_pair()?;
    rs.charge_args(fun, args)?;
    Ok(Value::con(snd.clone()))
}

pub(super) fn choose_list<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<3>(args)?;
    let [list, if_empty, if_cons] = args;
    let (_, items) = list.unwrap_list()?;
    rs.charge_args(fun, args)?;
    Ok(if items.is_empty() { if_empty } else { if_cons }.clone())
}

pub(super) fn mk_cons<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<2>(args)?;
    let [head, list] = args;
    let (elem, items) = list.unwrap_list()?;
    let head = head.constant_rc(&elem.to_string())?;
    if head.type_of() != *elem {
        return Err(MachineErrorType::type_mismatch(elem.to_string(), head.type_of()).into());
    }
    rs.charge_args(fun, args)?;
    Ok(Value::con(Constant::ProtoList(elem.clone(), items.cons(head.clone()))))
}

pub(super) fn head<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<1>(args)?;
    let (_, items) = args[0].unwrap_list()?;
    rs.charge_args(fun, args)?;
    let first = items.first().ok_or(BuiltinError::EmptyList)?;
    Ok(Value::Con(first.clone()))
}

pub(super) fn tail<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<1>(args)?;
    let (elem, items) = args[0].unwrap_list()?;
    rs.charge_args(fun, args)?;
    let (_, rest) = items.split_first().ok_or(BuiltinError::EmptyList)?;
    Ok(Value::con(Constant::ProtoList(elem.clone(), rest.clone())))
}

pub(super) fn null<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<1>(args)?;
    let (_, items) = args[0].unwrap_list()?;
    rs.charge_args(fun, args)?;
    Ok(Value::bool(items.is_empty()))
}

/// `dropList n xs`. A negative count drops nothing.
pub(super) fn drop<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [n, list] = take::<2>(args)?;
    let (count, (elem, items)) = (n.unwrap_integer()?, list.unwrap_list()?);
    rs.charge_with(fun, |i| match i {
        0 => literal_size(count),
        1 => list.ex_mem(),
        _ => 0,
    })?;
    let count = if count.is_negative() {
        0
    } else {
        count.to_usize().unwrap_or(usize::MAX)
    };
    Ok(Value::con(Constant::ProtoList(elem.clone(), items.skip(count))))
}
