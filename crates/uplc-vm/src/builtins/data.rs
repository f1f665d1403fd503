use uplc_ast::{Constant, ConstantList, DefaultFunction, PlutusData, Type};

use super::{CallResult, take};
use crate::{BuiltinError, MachineErrorType, RunState, Value, equals_data_ex_mem};

fn data_pair_type() -> Type {
    Type::pair(Type::Data, Type::Data)
}

fn as_data(c: &Constant) -> Result<&PlutusData, MachineErrorType> {
    match c {
        Constant::Data(d) => Ok(d),
        c => Err(MachineErrorType::type_mismatch("data", c.type_of())),
    }
}

fn data_items(items: &ConstantList) -> Result<Vec<PlutusData>, MachineErrorType> {
    items.iter().map(|c| as_data(c).cloned()).collect()
}

fn data_pairs(items: &ConstantList) -> Result<Vec<(PlutusData, PlutusData)>, MachineErrorType> {
    items
        .iter()
        .map(|c| match c {
            Constant::ProtoPair(_, _, k, v) => Ok((as_data(k)?.clone(), as_data(v)?.clone())),
            c => Err(MachineErrorType::type_mismatch(data_pair_type().to_string(), c.type_of())),
        })
        .collect()
}

/// `chooseData d constr map list int bytes`
pub(super) fn choose<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let args = take::<6>(args)?;
    let [d, on_constr, on_map, on_list, on_int, on_bytes] = args;
    let d = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let branch = match d {
        PlutusData::Constr { .. } => on_constr,
        PlutusData::Map(_) => on_map,
        PlutusData::List(_) => on_list,
        PlutusData::Integer(_) => on_int,
        PlutusData::ByteString(_) => on_bytes,
    };
    Ok(branch.clone())
}

pub(super) fn constr<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [t, f] = take::<2>(args)?;
    let (tag, fields) = (t.unwrap_integer()?, f.unwrap_list_of(&Type::Data)?);
    rs.charge_args(fun, args)?;
    Ok(Value::data(PlutusData::constr(tag.clone(), data_items(fields)?)))
}

pub(super) fn map<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [m] = take::<1>(args)?;
    let entries = m.unwrap_list_of(&data_pair_type())?;
    rs.charge_args(fun, args)?;
    Ok(Value::data(PlutusData::Map(data_pairs(entries)?)))
}

pub(super) fn list<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [l] = take::<1>(args)?;
    let items = l.unwrap_list_of(&Type::Data)?;
    rs.charge_args(fun, args)?;
    Ok(Value::data(PlutusData::List(data_items(items)?)))
}

pub(super) fn i_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [i] = take::<1>(args)?;
    let n = i.unwrap_integer()?;
    rs.charge_args(fun, args)?;
    Ok(Value::data(PlutusData::Integer(n.clone())))
}

pub(super) fn b_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge_args(fun, args)?;
    Ok(Value::data(PlutusData::bytes(bytes)))
}

pub(super) fn un_constr<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let PlutusData::Constr { tag, fields } = data else {
        return Err(BuiltinError::UnexpectedData("constructor").into());
    };
    Ok(Value::con(Constant::pair(
        Constant::Integer(tag.clone()),
        Constant::data_list(fields.iter().cloned()),
    )))
}

pub(super) fn un_map<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let PlutusData::Map(entries) = data else {
        return Err(BuiltinError::UnexpectedData("map").into());
    };
    Ok(Value::con(Constant::data_pair_list(entries.iter().cloned())))
}

pub(super) fn un_list<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let PlutusData::List(items) = data else {
        return Err(BuiltinError::UnexpectedData("list").into());
    };
    Ok(Value::con(Constant::data_list(items.iter().cloned())))
}

pub(super) fn un_i_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let PlutusData::Integer(i) = data else {
        return Err(BuiltinError::UnexpectedData("integer").into());
    };
    Ok(Value::integer(i.clone()))
}

pub(super) fn un_b_data<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    let PlutusData::ByteString(bytes) = data else {
        return Err(BuiltinError::UnexpectedData("bytestring").into());
    };
    Ok(Value::byte_string(bytes.clone()))
}

/// `equalsData a b`, costed on the smaller of the two sizes since
/// comparison stops at the first difference.
pub(super) fn equals<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_data()?, b.unwrap_data()?);
    let size = equals_data_ex_mem(x, y);
    rs.charge(fun, &[size, size])?;
    Ok(Value::bool(x == y))
}

pub(super) fn mk_pair<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [a, b] = take::<2>(args)?;
    let (x, y) = (a.unwrap_data()?, b.unwrap_data()?);
    rs.charge_args(fun, args)?;
    Ok(Value::con(Constant::pair(
        Constant::Data(x.clone()),
        Constant::Data(y.clone()),
    )))
}

pub(super) fn mk_nil<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [u] = take::<1>(args)?;
    u.unwrap_unit()?;
    rs.charge_args(fun, args)?;
    Ok(Value::con(Constant::ProtoList(Type::Data, ConstantList::new())))
}

pub(super) fn mk_nil_pair<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [u] = take::<1>(args)?;
    u.unwrap_unit()?;
    rs.charge_args(fun, args)?;
    Ok(Value::con(Constant::ProtoList(data_pair_type(), ConstantList::new())))
}

pub(super) fn serialise<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
) -> CallResult<'a> {
    let [d] = take::<1>(args)?;
    let data = d.unwrap_data()?;
    rs.charge_args(fun, args)?;
    Ok(Value::byte_string(data.to_cbor()?))
}
