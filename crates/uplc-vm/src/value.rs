use std::rc::Rc;

use buggy::{Bug, BugExt as _};
use heapless::Vec as HVec;
use num_bigint::BigInt;
use uplc_ast::{
    Constant, ConstantList, DefaultFunction, LedgerValue, MAX_ARITY, PlutusData, Term, Type,
    bls::{G1Projective, G2Projective, MillerLoopResult},
};

use crate::{Env, MachineErrorType, constant_ex_mem, value_as_term};

/// Builtin arguments in application order.
pub type BuiltinArgs<'a> = HVec<Value<'a>, MAX_ARITY>;

/// A machine value.
///
/// Lambda and delay bodies borrow from the program being evaluated.
#[derive(Clone, Debug)]
pub enum Value<'a> {
    /// A constant.
    Con(Rc<Constant>),
    /// A suspended computation and its environment.
    Delay {
        /// The suspended term.
        body: &'a Term,
        /// The captured environment.
        env: Env<'a>,
    },
    /// A closure.
    Lambda {
        /// The function body.
        body: &'a Term,
        /// The captured environment.
        env: Env<'a>,
    },
    /// A builtin awaiting further forces or arguments.
    Builtin(BuiltinApp<'a>),
    /// A fully evaluated constructor.
    Constr {
        /// The constructor tag.
        tag: u64,
        /// The evaluated fields.
        fields: Vec<Value<'a>>,
    },
}

impl<'a> Value<'a> {
    /// Wraps a constant.
    pub fn con(c: Constant) -> Self {
        Self::Con(Rc::new(c))
    }

    /// An integer constant.
    pub fn integer(i: BigInt) -> Self {
        Self::con(Constant::Integer(i))
    }

    /// A byte string constant.
    pub fn byte_string(b: Vec<u8>) -> Self {
        Self::con(Constant::ByteString(b))
    }

    /// A string constant.
    pub fn string(s: String) -> Self {
        Self::con(Constant::String(s))
    }

    /// A boolean constant.
    pub fn bool(b: bool) -> Self {
        Self::con(Constant::Bool(b))
    }

    /// The unit constant.
    pub fn unit() -> Self {
        Self::con(Constant::Unit)
    }

    /// A data constant.
    pub fn data(d: PlutusData) -> Self {
        Self::con(Constant::Data(d))
    }

    /// Returns the constant if this is one.
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Con(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer constant.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self.as_constant()? {
            Constant::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// The memory size of this value as builtin costing sees it.
    pub fn ex_mem(&self) -> i64 {
        match self {
            Self::Con(c) => constant_ex_mem(c),
            _ => 1,
        }
    }

    /// Returns the constant, or `NotAConstant` naming `want`.
    pub fn constant(&self, want: &str) -> Result<&Constant, MachineErrorType> {
        self.constant_rc(want).map(|c| &**c)
    }

    /// Like [`constant`](Self::constant), but returns the shared handle.
    pub fn constant_rc(&self, want: &str) -> Result<&Rc<Constant>, MachineErrorType> {
        match self {
            Self::Con(c) => Ok(c),
            _ => Err(MachineErrorType::NotAConstant {
                want: want.to_owned(),
                got: value_as_term(self),
            }),
        }
    }

    /// Unwraps an integer constant.
    pub fn unwrap_integer(&self) -> Result<&BigInt, MachineErrorType> {
        match self.constant("integer")? {
            Constant::Integer(i) => Ok(i),
            c => Err(MachineErrorType::type_mismatch("integer", c.type_of())),
        }
    }

    /// Unwraps a byte string constant.
    pub fn unwrap_byte_string(&self) -> Result<&[u8], MachineErrorType> {
        match self.constant("bytestring")? {
            Constant::ByteString(b) => Ok(b),
            c => Err(MachineErrorType::type_mismatch("bytestring", c.type_of())),
        }
    }

    /// Unwraps a string constant.
    pub fn unwrap_string(&self) -> Result<&str, MachineErrorType> {
        match self.constant("string")? {
            Constant::String(s) => Ok(s),
            c => Err(MachineErrorType::type_mismatch("string", c.type_of())),
        }
    }

    /// Unwraps a boolean constant.
    pub fn unwrap_bool(&self) -> Result<bool, MachineErrorType> {
        match self.constant("bool")? {
            Constant::Bool(b) => Ok(*b),
            c => Err(MachineErrorType::type_mismatch("bool", c.type_of())),
        }
    }

    /// Checks for the unit constant.
    pub fn unwrap_unit(&self) -> Result<(), MachineErrorType> {
        match self.constant("unit")? {
            Constant::Unit => Ok(()),
            c => Err(MachineErrorType::type_mismatch("unit", c.type_of())),
        }
    }

    /// Unwraps a data constant.
    pub fn unwrap_data(&self) -> Result<&PlutusData, MachineErrorType> {
        match self.constant("data")? {
            Constant::Data(d) => Ok(d),
            c => Err(MachineErrorType::type_mismatch("data", c.type_of())),
        }
    }

    /// Unwraps a list constant into its element type and elements.
    pub fn unwrap_list(&self) -> Result<(&Type, &ConstantList), MachineErrorType> {
        match self.constant("list")? {
            Constant::ProtoList(t, items) => Ok((t, items)),
            c => Err(MachineErrorType::type_mismatch("list", c.type_of())),
        }
    }

    /// Unwraps a list constant whose elements must have type `elem`.
    pub fn unwrap_list_of(&self, elem: &Type) -> Result<&ConstantList, MachineErrorType> {
        let (t, items) = self.unwrap_list()?;
        if t != elem {
            return Err(MachineErrorType::type_mismatch(
                Type::list(elem.clone()).to_string(),
                Type::list(t.clone()),
            ));
        }
        Ok(items)
    }

    /// Unwraps a pair constant.
    pub fn unwrap_pair(&self) -> Result<(&Constant, &Constant), MachineErrorType> {
        match self.constant("pair")? {
            Constant::ProtoPair(_, _, a, b) => Ok((a, b)),
            c => Err(MachineErrorType::type_mismatch("pair", c.type_of())),
        }
    }

    /// Unwraps an array constant into its element type and elements.
    pub fn unwrap_array(&self) -> Result<(&Type, &[Constant]), MachineErrorType> {
        match self.constant("array")? {
            Constant::ProtoArray(t, items) => Ok((t, items)),
            c => Err(MachineErrorType::type_mismatch("array", c.type_of())),
        }
    }

    /// Unwraps a G1 element.
    pub fn unwrap_g1(&self) -> Result<&G1Projective, MachineErrorType> {
        match self.constant("bls12_381_G1_element")? {
            Constant::Bls12_381G1Element(p) => Ok(p),
            c => Err(MachineErrorType::type_mismatch("bls12_381_G1_element", c.type_of())),
        }
    }

    /// Unwraps a G2 element.
    pub fn unwrap_g2(&self) -> Result<&G2Projective, MachineErrorType> {
        match self.constant("bls12_381_G2_element")? {
            Constant::Bls12_381G2Element(p) => Ok(p),
            c => Err(MachineErrorType::type_mismatch("bls12_381_G2_element", c.type_of())),
        }
    }

    /// Unwraps a Miller loop result.
    pub fn unwrap_ml_result(&self) -> Result<&MillerLoopResult, MachineErrorType> {
        match self.constant("bls12_381_mlresult")? {
            Constant::Bls12_381MlResult(r) => Ok(r),
            c => Err(MachineErrorType::type_mismatch("bls12_381_mlresult", c.type_of())),
        }
    }

    /// Unwraps a ledger value.
    pub fn unwrap_ledger_value(&self) -> Result<&LedgerValue, MachineErrorType> {
        match self.constant("value")? {
            Constant::Value(v) => Ok(v),
            c => Err(MachineErrorType::type_mismatch("value", c.type_of())),
        }
    }
}

/// A persistent list of builtin arguments, newest first.
#[derive(Clone, Debug, Default)]
struct ArgList<'a>(Option<Rc<ArgNode<'a>>>);

#[derive(Debug)]
struct ArgNode<'a> {
    value: Value<'a>,
    prev: ArgList<'a>,
}

/// A builtin that has received some of its forces and arguments.
///
/// Partial applications share their argument prefix, so a partially
/// applied builtin held in several places is never copied.
#[derive(Clone, Debug)]
pub struct BuiltinApp<'a> {
    /// The builtin.
    pub fun: DefaultFunction,
    forces: usize,
    arg_count: usize,
    args: ArgList<'a>,
}

impl<'a> BuiltinApp<'a> {
    /// A builtin with nothing applied.
    pub fn new(fun: DefaultFunction) -> Self {
        Self {
            fun,
            forces: 0,
            arg_count: 0,
            args: ArgList::default(),
        }
    }

    /// Number of forces consumed so far.
    pub fn forces(&self) -> usize {
        self.forces
    }

    /// Number of arguments applied so far.
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    /// Reports whether the next interaction must be a force.
    pub fn needs_force(&self) -> bool {
        self.forces < self.fun.force_count()
    }

    /// Reports whether every force and argument has been supplied.
    pub fn is_saturated(&self) -> bool {
        !self.needs_force() && self.arg_count >= self.fun.arity()
    }

    /// Consumes one force.
    pub(crate) fn force(mut self) -> Result<Self, Bug> {
        self.forces = self.forces.checked_add(1).assume("force count must not wrap")?;
        Ok(self)
    }

    /// Applies one more argument.
    pub(crate) fn push(mut self, value: Value<'a>) -> Result<Self, Bug> {
        self.arg_count = self
            .arg_count
            .checked_add(1)
            .assume("argument count must not wrap")?;
        self.args = ArgList(Some(Rc::new(ArgNode {
            value,
            prev: self.args,
        })));
        Ok(self)
    }

    /// The applied arguments in application order.
    pub fn args(&self) -> Result<BuiltinArgs<'a>, Bug> {
        let mut out = BuiltinArgs::new();
        let mut cur = self.args.0.as_deref();
        while let Some(node) = cur {
            out.push(node.value.clone())
                .ok()
                .assume("builtins take at most MAX_ARITY arguments")?;
            cur = node.prev.0.as_deref();
        }
        out.reverse();
        Ok(out)
    }
}
