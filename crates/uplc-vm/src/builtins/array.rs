use num_traits::ToPrimitive as _;
use uplc_ast::{Constant, DefaultFunction};

use super::{CallResult, take};
use crate::{BuiltinError, RunState, Value, integer_ex_mem, list_length};

pub(super) fn length<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a] = take::<1>(args)?;
    let (_, items) = a.unwrap_array()?;
    rs.charge(fun, &[a.ex_mem()])?;
    Ok(Value::integer(items.len().into()))
}

pub(super) fn from_list<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [l] = take::<1>(args)?;
    let (elem, items) = l.unwrap_list()?;
    rs.charge(fun, &[list_length(items)])?;
    Ok(Value::con(Constant::ProtoArray(
        elem.clone(),
        items.iter().cloned().collect(),
    )))
}

pub(super) fn index<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, i] = take::<2>(args)?;
    let ((_, items), index) = (a.unwrap_array()?, i.unwrap_integer()?);
    rs.charge(fun, &[a.ex_mem(), integer_ex_mem(index)])?;
    let item = index
        .to_usize()
        .and_then(|i| items.get(i))
        .ok_or_else(|| BuiltinError::IndexOutOfBounds {
            index: index.clone(),
            len: items.len(),
        })?;
    Ok(Value::con(item.clone()))
}
