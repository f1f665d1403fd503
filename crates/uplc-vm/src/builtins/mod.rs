//! Builtin function implementations.
//!
//! Every builtin unwraps its arguments, charges its cost from the argument
//! sizes, then computes. Type errors surface before any cost is charged.
//! Sizes are measured lazily, so constant-cost builtins never walk their
//! arguments.

mod array;
mod bitwise;
mod bls;
mod bytestring;
mod crypto;
mod data;
mod integer;
mod ledger;
mod list;
mod string;

use core::cell::Cell;

use bls12_381::{G1Projective, G2Projective};
use buggy::{Bug, BugExt as _};
use num_integer::Integer as _;
use tracing::trace;
use uplc_ast::{DataError, DefaultFunction, LedgerValueError, MAX_ARITY};

use crate::{BuiltinError, MachineErrorType, RunState, Value};

/// How a builtin call can fail before being attributed to its builtin.
#[derive(Debug)]
pub(crate) enum CallError {
    Machine(MachineErrorType),
    Builtin(BuiltinError),
}

impl From<MachineErrorType> for CallError {
    fn from(err: MachineErrorType) -> Self {
        Self::Machine(err)
    }
}

impl From<BuiltinError> for CallError {
    fn from(err: BuiltinError) -> Self {
        Self::Builtin(err)
    }
}

impl From<Bug> for CallError {
    fn from(bug: Bug) -> Self {
        Self::Machine(MachineErrorType::Bug(bug))
    }
}

impl From<LedgerValueError> for CallError {
    fn from(err: LedgerValueError) -> Self {
        Self::Builtin(err.into())
    }
}

impl From<DataError> for CallError {
    fn from(err: DataError) -> Self {
        Self::Builtin(err.into())
    }
}

pub(crate) type CallResult<'a> = Result<Value<'a>, CallError>;

/// Views a saturated argument list as a fixed-size array.
fn take<'v, 'a, const N: usize>(args: &'v [Value<'a>]) -> Result<&'v [Value<'a>; N], Bug> {
    args.try_into()
        .assume("builtin applied to the wrong number of arguments")
}

impl<'a> RunState<'a> {
    /// Charges the cost of calling `fun`, where `size(i)` measures operand
    /// `i`. Operands the costing functions ignore are never measured, and
    /// each is measured at most once.
    fn charge_with(
        &mut self,
        fun: DefaultFunction,
        size: impl Fn(usize) -> i64,
    ) -> Result<(), MachineErrorType> {
        let machine = self.machine();
        let cost = machine
            .cost_model
            .builtins
            .get(fun)
            .ok_or(MachineErrorType::BuiltinNotAvailable {
                fun,
                language: machine.language,
                protocol: machine.protocol,
            })?;
        let measured: [Cell<Option<i64>>; MAX_ARITY] =
            core::array::from_fn(|_| Cell::new(None));
        let measure = |i: usize| {
            let Some(slot) = measured.get(i) else {
                return size(i);
            };
            if let Some(n) = slot.get() {
                return n;
            }
            let n = size(i);
            slot.set(Some(n));
            n
        };
        self.spend_budget(cost.cost_with(&measure))
    }

    /// Charges the cost of calling `fun` on operands of the given sizes.
    fn charge(&mut self, fun: DefaultFunction, sizes: &[i64]) -> Result<(), MachineErrorType> {
        self.charge_with(fun, |i| sizes.get(i).copied().unwrap_or(0))
    }

    /// Charges the cost of calling `fun`, sizing each argument by its
    /// memory footprint.
    fn charge_args(
        &mut self,
        fun: DefaultFunction,
        args: &[Value<'a>],
    ) -> Result<(), MachineErrorType> {
        self.charge_with(fun, |i| args.get(i).map_or(0, Value::ex_mem))
    }

    /// Calls a saturated builtin.
    #[allow(clippy::arithmetic_side_effects)]
    pub(crate) fn call_builtin(
        &mut self,
        fun: DefaultFunction,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, MachineErrorType> {
        use DefaultFunction::*;

        trace!(%fun, "calling builtin");
        let result = match fun {
            AddInteger => integer::arithmetic(self, fun, args, |x, y| x + y),
            SubtractInteger => integer::arithmetic(self, fun, args, |x, y| x - y),
            MultiplyInteger => integer::arithmetic(self, fun, args, |x, y| x * y),
            DivideInteger => integer::division(self, fun, args, |x, y| x.div_floor(y)),
            QuotientInteger => integer::division(self, fun, args, |x, y| x / y),
            RemainderInteger => integer::division(self, fun, args, |x, y| x % y),
            ModInteger => integer::division(self, fun, args, |x, y| x.mod_floor(y)),
            EqualsInteger => integer::compare(self, fun, args, |x, y| x == y),
            LessThanInteger => integer::compare(self, fun, args, |x, y| x < y),
            LessThanEqualsInteger => integer::compare(self, fun, args, |x, y| x <= y),
            ExpModInteger => integer::exp_mod(self, fun, args),

            AppendByteString => bytestring::append(self, fun, args),
            ConsByteString => bytestring::cons(self, fun, args),
            SliceByteString => bytestring::slice(self, fun, args),
            LengthOfByteString => bytestring::length(self, fun, args),
            IndexByteString => bytestring::index(self, fun, args),
            EqualsByteString => bytestring::compare(self, fun, args, |x, y| x == y),
            LessThanByteString => bytestring::compare(self, fun, args, |x, y| x < y),
            LessThanEqualsByteString => bytestring::compare(self, fun, args, |x, y| x <= y),
            IntegerToByteString => bytestring::from_integer(self, fun, args),
            ByteStringToInteger => bytestring::to_integer(self, fun, args),

            Sha2_256 => crypto::hash(self, fun, args, crypto::sha2_256),
            Sha3_256 => crypto::hash(self, fun, args, crypto::sha3_256),
            Blake2b_256 => crypto::hash(self, fun, args, crypto::blake2b_256),
            Blake2b_224 => crypto::hash(self, fun, args, crypto::blake2b_224),
            Keccak_256 => crypto::hash(self, fun, args, crypto::keccak_256),
            Ripemd_160 => crypto::hash(self, fun, args, crypto::ripemd_160),
            VerifyEd25519Signature => crypto::verify(self, fun, args, crypto::ed25519),
            VerifyEcdsaSecp256k1Signature => {
                crypto::verify(self, fun, args, crypto::ecdsa_secp256k1)
            }
            VerifySchnorrSecp256k1Signature => {
                crypto::verify(self, fun, args, crypto::schnorr_secp256k1)
            }

            AppendString => string::append(self, fun, args),
            EqualsString => string::equals(self, fun, args),
            EncodeUtf8 => string::encode_utf8(self, fun, args),
            DecodeUtf8 => string::decode_utf8(self, fun, args),

            IfThenElse => list::if_then_else(self, fun, args),
            ChooseUnit => list::choose_unit(self, fun, args),
            Trace => list::trace(self, fun, args),
            FstPair => list::fst_pair(self, fun, args),
            SndPair => list::snd_pair(self, fun, args),
            ChooseList => list::choose_list(self, fun, args),
            MkCons => list::mk_cons(self, fun, args),
            HeadList => list::head(self, fun, args),
            TailList => list::tail(self, fun, args),
            NullList => list::null(self, fun, args),
            DropList => list::drop(self, fun, args),

            ChooseData => data::choose(self, fun, args),
            ConstrData => data::constr(self, fun, args),
            MapData => data::map(self, fun, args),
            ListData => data::list(self, fun, args),
            IData => data::i_data(self, fun, args),
            BData => data::b_data(self, fun, args),
            UnConstrData => data::un_constr(self, fun, args),
            UnMapData => data::un_map(self, fun, args),
            UnListData => data::un_list(self, fun, args),
            UnIData => data::un_i_data(self, fun, args),
            UnBData => data::un_b_data(self, fun, args),
            EqualsData => data::equals(self, fun, args),
            MkPairData => data::mk_pair(self, fun, args),
            MkNilData => data::mk_nil(self, fun, args),
            MkNilPairData => data::mk_nil_pair(self, fun, args),
            SerialiseData => data::serialise(self, fun, args),

            Bls12_381_G1_Add => bls::add::<G1Projective>(self, fun, args),
            Bls12_381_G1_Neg => bls::neg::<G1Projective>(self, fun, args),
            Bls12_381_G1_ScalarMul => bls::scalar_mul::<G1Projective>(self, fun, args),
            Bls12_381_G1_Equal => bls::equal::<G1Projective>(self, fun, args),
            Bls12_381_G1_Compress => bls::compress::<G1Projective>(self, fun, args),
            Bls12_381_G1_Uncompress => bls::uncompress::<G1Projective>(self, fun, args),
            Bls12_381_G1_HashToGroup => bls::hash_to_group::<G1Projective>(self, fun, args),
            Bls12_381_G1_MultiScalarMul => bls::multi_scalar_mul::<G1Projective>(self, fun, args),
            Bls12_381_G2_Add => bls::add::<G2Projective>(self, fun, args),
            Bls12_381_G2_Neg => bls::neg::<G2Projective>(self, fun, args),
            Bls12_381_G2_ScalarMul => bls::scalar_mul::<G2Projective>(self, fun, args),
            Bls12_381_G2_Equal => bls::equal::<G2Projective>(self, fun, args),
            Bls12_381_G2_Compress => bls::compress::<G2Projective>(self, fun, args),
            Bls12_381_G2_Uncompress => bls::uncompress::<G2Projective>(self, fun, args),
            Bls12_381_G2_HashToGroup => bls::hash_to_group::<G2Projective>(self, fun, args),
            Bls12_381_G2_MultiScalarMul => bls::multi_scalar_mul::<G2Projective>(self, fun, args),
            Bls12_381_MillerLoop => bls::miller_loop(self, fun, args),
            Bls12_381_MulMlResult => bls::mul_ml_result(self, fun, args),
            Bls12_381_FinalVerify => bls::final_verify(self, fun, args),

            AndByteString => bitwise::logical(self, fun, args, |x, y| x & y),
            OrByteString => bitwise::logical(self, fun, args, |x, y| x | y),
            XorByteString => bitwise::logical(self, fun, args, |x, y| x ^ y),
            ComplementByteString => bitwise::complement(self, fun, args),
            ReadBit => bitwise::read_bit(self, fun, args),
            WriteBits => bitwise::write_bits(self, fun, args),
            ReplicateByte => bitwise::replicate_byte(self, fun, args),
            ShiftByteString => bitwise::shift(self, fun, args),
            RotateByteString => bitwise::rotate(self, fun, args),
            CountSetBits => bitwise::count_set_bits(self, fun, args),
            FindFirstSetBit => bitwise::find_first_set_bit(self, fun, args),

            LengthOfArray => array::length(self, fun, args),
            ListToArray => array::from_list(self, fun, args),
            IndexArray => array::index(self, fun, args),

            InsertCoin => ledger::insert_coin(self, fun, args),
            LookupCoin => ledger::lookup_coin(self, fun, args),
            UnionValue => ledger::union(self, fun, args),
            ValueContains => ledger::contains(self, fun, args),
            ValueData => ledger::to_data(self, fun, args),
            UnValueData => ledger::from_data(self, fun, args),
            ScaleValue => ledger::scale(self, fun, args),
        };
        result.map_err(|err| match err {
            CallError::Machine(err) => err,
            CallError::Builtin(err) => MachineErrorType::Builtin { fun, err },
        })
    }
}
