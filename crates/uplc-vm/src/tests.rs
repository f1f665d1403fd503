#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use bls12_381::{G1Projective, G2Projective};
use test_log::test;
use uplc_ast::{
    Constant, DeBruijn, DefaultFunction, LedgerValue, LedgerValueError, PlutusData, Program, Term,
    Type, Version,
};

use crate::{
    BuiltinError, CostModel, ErrorKind, EvalResult, ExBudget, Machine, MachineError,
    MachineErrorType, PlutusVersion, ProtocolVersion, StepKind, Value, value_as_term,
};

fn program(term: Term) -> Program {
    Program::new(Version::V1_1_0, term)
}

fn eval_with(machine: &Machine, term: Term) -> EvalResult {
    machine.evaluate(&program(term), ExBudget::max())
}

fn eval(term: Term) -> Result<Term, MachineError> {
    eval_with(&Machine::default_for(PlutusVersion::V3), term).result
}

fn ok(term: Term) -> Term {
    eval(term).unwrap()
}

fn machine_err(term: Term) -> MachineErrorType {
    eval(term).unwrap_err().err_type
}

fn builtin_err(term: Term) -> BuiltinError {
    match machine_err(term) {
        MachineErrorType::Builtin { err, .. } => err,
        other => panic!("expected a builtin error, got {other}"),
    }
}

/// Forces `fun` as often as it needs, then applies it to `args`.
fn call(fun: DefaultFunction, args: impl IntoIterator<Item = Term>) -> Term {
    let mut term = Term::builtin(fun);
    for _ in 0..fun.force_count() {
        term = term.force();
    }
    args.into_iter().fold(term, Term::apply)
}

fn bytes(b: &[u8]) -> Term {
    Term::byte_string(b.to_vec())
}

fn int_list(items: &[i64]) -> Term {
    Term::constant(Constant::ProtoList(
        Type::Integer,
        items.iter().map(|i| Constant::from(*i)).collect(),
    ))
}

fn g1(p: G1Projective) -> Term {
    Term::constant(Constant::Bls12_381G1Element(Box::new(p)))
}

fn g2(p: G2Projective) -> Term {
    Term::constant(Constant::Bls12_381G2Element(Box::new(p)))
}

#[test]
fn test_integer_arithmetic() {
    use DefaultFunction::*;

    let cases = [
        (AddInteger, 2, 3, 5),
        (SubtractInteger, 10, 3, 7),
        (MultiplyInteger, 6, 7, 42),
        (DivideInteger, -7, 2, -4),
        (QuotientInteger, -7, 2, -3),
        (ModInteger, -7, 2, 1),
        (RemainderInteger, -7, 2, -1),
    ];
    for (fun, x, y, want) in cases {
        assert_eq!(
            ok(call(fun, [Term::integer(x), Term::integer(y)])),
            Term::integer(want),
            "{fun} {x} {y}"
        );
    }
    assert_eq!(
        ok(call(EqualsInteger, [Term::integer(5), Term::integer(5)])),
        Term::bool(true)
    );
    assert_eq!(
        ok(call(LessThanInteger, [Term::integer(2), Term::integer(2)])),
        Term::bool(false)
    );
    assert_eq!(
        ok(call(LessThanEqualsInteger, [Term::integer(2), Term::integer(2)])),
        Term::bool(true)
    );
}

#[test]
fn test_division_by_zero_is_not_charged() {
    let machine = Machine::default_for(PlutusVersion::V3).with_slippage(0);
    let div = |d| call(DefaultFunction::DivideInteger, [Term::integer(10), Term::integer(d)]);

    let failed = eval_with(&machine, div(0));
    let err = failed.result.as_ref().unwrap_err();
    assert!(matches!(
        err.err_type,
        MachineErrorType::Builtin {
            fun: DefaultFunction::DivideInteger,
            err: BuiltinError::DivisionByZero
        }
    ));
    assert_eq!(err.code(), 400);
    assert_eq!(err.kind(), ErrorKind::Builtin);

    let costs = &machine.cost_model;
    let steps = costs.machine.startup
        + costs.step_cost(StepKind::Apply).occurrences(2)
        + costs.step_cost(StepKind::Builtin)
        + costs.step_cost(StepKind::Constant).occurrences(2);
    assert_eq!(failed.consumed(), steps);

    let divided = eval_with(&machine, div(1));
    let builtin = costs
        .builtins
        .get(DefaultFunction::DivideInteger)
        .unwrap()
        .cost(&[1, 1]);
    assert_eq!(divided.consumed(), steps + builtin);
}

#[test]
fn test_exp_mod() {
    let exp_mod = |b: i64, e: i64, m: i64| {
        call(
            DefaultFunction::ExpModInteger,
            [Term::integer(b), Term::integer(e), Term::integer(m)],
        )
    };
    assert_eq!(ok(exp_mod(2, 10, 1000)), Term::integer(24));
    assert_eq!(ok(exp_mod(3, -1, 7)), Term::integer(5));
    assert_eq!(ok(exp_mod(-3, 3, 5)), Term::integer(3));
    assert_eq!(ok(exp_mod(12, 34, 1)), Term::integer(0));
    assert!(matches!(builtin_err(exp_mod(2, -1, 4)), BuiltinError::ExpMod(_)));
    assert!(matches!(builtin_err(exp_mod(2, 1, 0)), BuiltinError::ExpMod(_)));
}

#[test]
fn test_force_delay() {
    assert_eq!(ok(Term::delay(Term::integer(7)).force()), Term::integer(7));
}

#[test]
fn test_constr_evaluates_fields_in_order() {
    let term = Term::constr(
        3,
        vec![
            call(DefaultFunction::AddInteger, [Term::integer(1), Term::integer(2)]),
            Term::bool(true),
        ],
    );
    assert_eq!(
        ok(term),
        Term::constr(3, vec![Term::integer(3), Term::bool(true)])
    );
    assert_eq!(ok(Term::constr(0, vec![])), Term::constr(0, vec![]));
}

#[test]
fn test_case_applies_fields() {
    // \x. \y. x - y
    let sub = Term::lambda(Term::lambda(call(
        DefaultFunction::SubtractInteger,
        [Term::var(2), Term::var(1)],
    )));
    let term = Term::case(
        Term::constr(1, vec![Term::integer(10), Term::integer(3)]),
        vec![Term::Error, sub],
    );
    assert_eq!(ok(term), Term::integer(7));
}

#[test]
fn test_case_errors() {
    let missing = Term::case(Term::constr(2, vec![]), vec![Term::integer(0)]);
    assert!(matches!(
        machine_err(missing),
        MachineErrorType::MissingCaseBranch {
            tag: 2,
            branches: 1
        }
    ));

    let not_constr = Term::case(Term::integer(0), vec![Term::integer(0)]);
    assert!(matches!(
        machine_err(not_constr),
        MachineErrorType::NonConstrScrutinized(_)
    ));

    let huge = Term::case(Term::constr(u64::MAX, vec![]), vec![Term::integer(0)]);
    let err = machine_err(huge);
    assert!(matches!(err, MachineErrorType::MaxIntExceeded(u64::MAX)));
    assert_eq!(err.kind(), ErrorKind::Script);
}

#[test]
fn test_lists() {
    use DefaultFunction::*;

    let empty = int_list(&[]);
    assert!(matches!(builtin_err(call(HeadList, [empty.clone()])), BuiltinError::EmptyList));
    assert!(matches!(builtin_err(call(TailList, [empty.clone()])), BuiltinError::EmptyList));
    assert_eq!(ok(call(NullList, [empty.clone()])), Term::bool(true));

    let xs = int_list(&[1, 2, 3]);
    assert_eq!(ok(call(HeadList, [xs.clone()])), Term::integer(1));
    assert_eq!(ok(call(TailList, [xs.clone()])), int_list(&[2, 3]));
    assert_eq!(ok(call(NullList, [xs.clone()])), Term::bool(false));
    assert_eq!(
        ok(call(MkCons, [Term::integer(0), xs.clone()])),
        int_list(&[0, 1, 2, 3])
    );
    assert!(matches!(
        machine_err(call(MkCons, [Term::string("no"), xs.clone()])),
        MachineErrorType::TypeMismatch { .. }
    ));
    assert_eq!(
        ok(call(ChooseList, [empty, Term::integer(1), Term::integer(2)])),
        Term::integer(1)
    );

    assert_eq!(ok(call(DropList, [Term::integer(1), xs.clone()])), int_list(&[2, 3]));
    assert_eq!(ok(call(DropList, [Term::integer(-1), xs.clone()])), xs);
    assert_eq!(ok(call(DropList, [Term::integer(10), xs])), int_list(&[]));
}

#[test]
fn test_walking_a_long_list() {
    use DefaultFunction::*;

    let long = Term::constant(Constant::ProtoList(
        Type::Integer,
        (0..100_000i64).map(Constant::from).collect(),
    ));
    let walked = (0..1000).fold(long.clone(), |list, _| call(TailList, [list]));
    assert_eq!(ok(call(HeadList, [walked])), Term::integer(1000));

    // Constant-cost list builtins charge the same whatever the length.
    let machine = Machine::default_for(PlutusVersion::V3);
    let cost = |list: Term| eval_with(&machine, call(TailList, [list])).consumed();
    assert_eq!(cost(long), cost(int_list(&[1, 2])));
}

#[test]
fn test_pairs_and_choices() {
    use DefaultFunction::*;

    let pair = Term::constant(Constant::pair(Constant::from(1), Constant::Bool(true)));
    assert_eq!(ok(call(FstPair, [pair.clone()])), Term::integer(1));
    assert_eq!(ok(call(SndPair, [pair])), Term::bool(true));
    assert_eq!(
        ok(call(IfThenElse, [Term::bool(false), Term::integer(1), Term::integer(2)])),
        Term::integer(2)
    );
    assert_eq!(
        ok(call(ChooseUnit, [Term::unit(), Term::integer(9)])),
        Term::integer(9)
    );
    assert!(matches!(
        machine_err(call(IfThenElse, [Term::integer(0), Term::unit(), Term::unit()])),
        MachineErrorType::TypeMismatch { .. }
    ));
}

#[test]
fn test_byte_strings() {
    use DefaultFunction::*;

    assert_eq!(ok(call(AppendByteString, [bytes(&[1]), bytes(&[2])])), bytes(&[1, 2]));
    assert_eq!(
        ok(call(SliceByteString, [Term::integer(1), Term::integer(2), bytes(&[0, 1, 2, 3])])),
        bytes(&[1, 2])
    );
    assert_eq!(
        ok(call(SliceByteString, [Term::integer(-5), Term::integer(100), bytes(&[0, 1])])),
        bytes(&[0, 1])
    );
    assert_eq!(ok(call(LengthOfByteString, [bytes(&[1, 2, 3])])), Term::integer(3));
    assert_eq!(ok(call(IndexByteString, [bytes(&[5, 6]), Term::integer(1)])), Term::integer(6));
    assert!(matches!(
        builtin_err(call(IndexByteString, [bytes(&[5]), Term::integer(1)])),
        BuiltinError::IndexOutOfBounds { len: 1, .. }
    ));
    assert_eq!(
        ok(call(LessThanByteString, [bytes(&[1]), bytes(&[1, 0])])),
        Term::bool(true)
    );
    assert_eq!(
        ok(call(EqualsByteString, [bytes(&[1]), bytes(&[1])])),
        Term::bool(true)
    );
}

#[test]
fn test_cons_byte_string_semantics() {
    let cons = |i: i64| call(DefaultFunction::ConsByteString, [Term::integer(i), bytes(&[9])]);

    let v2 = Machine::default_for(PlutusVersion::V2);
    assert_eq!(eval_with(&v2, cons(257)).result.unwrap(), bytes(&[1, 9]));
    assert_eq!(eval_with(&v2, cons(-1)).result.unwrap(), bytes(&[255, 9]));

    assert_eq!(ok(cons(255)), bytes(&[255, 9]));
    assert!(matches!(builtin_err(cons(256)), BuiltinError::ByteOutOfRange(_)));
}

#[test]
fn test_integer_byte_string_conversions() {
    use DefaultFunction::*;

    let to_bytes = |big_endian, width: i64, n: i64| {
        call(
            IntegerToByteString,
            [Term::bool(big_endian), Term::integer(width), Term::integer(n)],
        )
    };
    assert_eq!(ok(to_bytes(true, 0, 258)), bytes(&[1, 2]));
    assert_eq!(ok(to_bytes(false, 0, 258)), bytes(&[2, 1]));
    assert_eq!(ok(to_bytes(true, 4, 258)), bytes(&[0, 0, 1, 2]));
    assert_eq!(ok(to_bytes(false, 4, 258)), bytes(&[2, 1, 0, 0]));
    assert_eq!(ok(to_bytes(true, 0, 0)), bytes(&[]));
    assert!(matches!(builtin_err(to_bytes(true, 1, 258)), BuiltinError::IntegerTooWide(_)));
    assert!(matches!(builtin_err(to_bytes(true, 8193, 0)), BuiltinError::InvalidSize(_)));
    assert!(matches!(builtin_err(to_bytes(true, -1, 0)), BuiltinError::InvalidSize(_)));
    assert!(matches!(builtin_err(to_bytes(true, 0, -1)), BuiltinError::NegativeInteger(_)));

    assert_eq!(
        ok(call(ByteStringToInteger, [Term::bool(true), bytes(&[1, 2])])),
        Term::integer(258)
    );
    assert_eq!(
        ok(call(ByteStringToInteger, [Term::bool(false), bytes(&[1, 2])])),
        Term::integer(513)
    );
}

#[test]
fn test_strings() {
    use DefaultFunction::*;

    assert_eq!(
        ok(call(AppendString, [Term::string("ab"), Term::string("c")])),
        Term::string("abc")
    );
    assert_eq!(
        ok(call(EqualsString, [Term::string("a"), Term::string("b")])),
        Term::bool(false)
    );
    assert_eq!(ok(call(EncodeUtf8, [Term::string("é")])), bytes(&[0xc3, 0xa9]));
    assert_eq!(ok(call(DecodeUtf8, [bytes(&[0xc3, 0xa9])])), Term::string("é"));
    assert!(matches!(builtin_err(call(DecodeUtf8, [bytes(&[0xff])])), BuiltinError::InvalidUtf8));
}

#[test]
fn test_hashes() {
    use sha2::Digest as _;

    assert_eq!(
        ok(call(DefaultFunction::Sha2_256, [bytes(b"abc")])),
        bytes(&sha2::Sha256::digest(b"abc"))
    );
    let Term::Constant(c) = ok(call(DefaultFunction::Blake2b_224, [bytes(b"")])) else {
        panic!("expected a constant");
    };
    assert!(matches!(&*c, Constant::ByteString(b) if b.len() == 28));
}

#[test]
fn test_signature_length_is_a_builtin_error() {
    let term = call(
        DefaultFunction::VerifyEd25519Signature,
        [bytes(&[0; 31]), bytes(b"msg"), bytes(&[0; 64])],
    );
    assert!(matches!(
        builtin_err(term),
        BuiltinError::InvalidLength {
            expected: 32,
            got: 31,
            ..
        }
    ));
}

#[test]
fn test_data() {
    use DefaultFunction::*;

    let fields = Term::constant(Constant::data_list([PlutusData::integer(2)]));
    let constr = call(ConstrData, [Term::integer(1), fields]);
    let want = PlutusData::constr(1, vec![PlutusData::integer(2)]);
    assert_eq!(ok(constr.clone()), Term::data(want.clone()));
    assert_eq!(
        ok(call(UnConstrData, [constr])),
        Term::constant(Constant::pair(
            Constant::from(1),
            Constant::data_list([PlutusData::integer(2)])
        ))
    );

    assert_eq!(
        ok(call(UnIData, [call(IData, [Term::integer(4)])])),
        Term::integer(4)
    );
    assert!(matches!(
        builtin_err(call(UnIData, [Term::data(PlutusData::bytes(vec![]))])),
        BuiltinError::UnexpectedData("integer")
    ));

    let branches = (0..5).map(Term::integer);
    assert_eq!(
        ok(call(
            ChooseData,
            std::iter::once(Term::data(PlutusData::integer(0))).chain(branches)
        )),
        Term::integer(3)
    );

    assert_eq!(
        ok(call(EqualsData, [Term::data(want.clone()), Term::data(want)])),
        Term::bool(true)
    );
    assert_eq!(
        ok(call(SerialiseData, [Term::data(PlutusData::integer(1))])),
        bytes(&[0x01])
    );
    assert_eq!(
        ok(call(MkNilData, [Term::unit()])),
        Term::constant(Constant::data_list([]))
    );
    assert_eq!(
        ok(call(MapData, [call(MkNilPairData, [Term::unit()])])),
        Term::data(PlutusData::Map(vec![]))
    );
}

#[test]
fn test_bitwise() {
    use DefaultFunction::*;

    let logical = |fun, pad, a: &[u8], b: &[u8]| call(fun, [Term::bool(pad), bytes(a), bytes(b)]);
    assert_eq!(ok(logical(AndByteString, false, &[0xff, 0x0f], &[0x0f])), bytes(&[0x0f]));
    assert_eq!(
        ok(logical(AndByteString, true, &[0xff, 0x0f], &[0x0f])),
        bytes(&[0x0f, 0x0f])
    );
    assert_eq!(
        ok(logical(OrByteString, true, &[0xf0], &[0x0f, 0xaa])),
        bytes(&[0xff, 0xaa])
    );
    assert_eq!(ok(logical(XorByteString, false, &[0xff], &[0x0f])), bytes(&[0xf0]));
    assert_eq!(ok(call(ComplementByteString, [bytes(&[0x0f])])), bytes(&[0xf0]));

    assert_eq!(ok(call(ReadBit, [bytes(&[0x01]), Term::integer(0)])), Term::bool(true));
    assert_eq!(ok(call(ReadBit, [bytes(&[0x80, 0]), Term::integer(15)])), Term::bool(true));
    assert!(matches!(
        builtin_err(call(ReadBit, [bytes(&[0x01]), Term::integer(8)])),
        BuiltinError::BitIndexOutOfRange(_)
    ));
    assert_eq!(
        ok(call(WriteBits, [bytes(&[0]), int_list(&[0, 7]), Term::bool(true)])),
        bytes(&[0x81])
    );
    assert_eq!(
        ok(call(ReplicateByte, [Term::integer(3), Term::integer(0xab)])),
        bytes(&[0xab; 3])
    );

    assert_eq!(ok(call(ShiftByteString, [bytes(&[0x01]), Term::integer(1)])), bytes(&[0x02]));
    assert_eq!(
        ok(call(ShiftByteString, [bytes(&[0x80, 0]), Term::integer(-15)])),
        bytes(&[0, 0x01])
    );
    assert_eq!(ok(call(ShiftByteString, [bytes(&[0x01]), Term::integer(8)])), bytes(&[0]));
    assert_eq!(ok(call(RotateByteString, [bytes(&[0x80]), Term::integer(1)])), bytes(&[0x01]));
    assert_eq!(
        ok(call(RotateByteString, [bytes(&[0x01, 0]), Term::integer(-1)])),
        bytes(&[0, 0x80])
    );

    assert_eq!(ok(call(CountSetBits, [bytes(&[0xff, 0x01])])), Term::integer(9));
    assert_eq!(ok(call(FindFirstSetBit, [bytes(&[0, 0])])), Term::integer(-1));
    assert_eq!(ok(call(FindFirstSetBit, [bytes(&[0x01, 0])])), Term::integer(8));
}

#[test]
fn test_arrays() {
    use DefaultFunction::*;

    let array = call(ListToArray, [int_list(&[4, 5, 6])]);
    assert_eq!(
        ok(array.clone()),
        Term::constant(Constant::ProtoArray(
            Type::Integer,
            vec![4.into(), 5.into(), 6.into()]
        ))
    );
    assert_eq!(ok(call(LengthOfArray, [array.clone()])), Term::integer(3));
    assert_eq!(ok(call(IndexArray, [array.clone(), Term::integer(1)])), Term::integer(5));
    assert!(matches!(
        builtin_err(call(IndexArray, [array, Term::integer(3)])),
        BuiltinError::IndexOutOfBounds { len: 3, .. }
    ));
}

#[test]
fn test_bls() {
    use DefaultFunction::*;

    let g = G1Projective::generator();
    let h = G2Projective::generator();

    let zero = call(Bls12_381_G1_ScalarMul, [Term::integer(0), g1(g)]);
    let cancelled = call(Bls12_381_G1_Add, [g1(g), call(Bls12_381_G1_Neg, [g1(g)])]);
    assert_eq!(ok(call(Bls12_381_G1_Equal, [cancelled, zero])), Term::bool(true));

    let round_trip = call(
        Bls12_381_G2_Uncompress,
        [call(Bls12_381_G2_Compress, [g2(h)])],
    );
    assert_eq!(ok(call(Bls12_381_G2_Equal, [round_trip, g2(h)])), Term::bool(true));

    // e(2g, h) == e(g, 2h)
    let left = call(
        Bls12_381_MillerLoop,
        [call(Bls12_381_G1_ScalarMul, [Term::integer(2), g1(g)]), g2(h)],
    );
    let right = call(
        Bls12_381_MillerLoop,
        [g1(g), call(Bls12_381_G2_ScalarMul, [Term::integer(2), g2(h)])],
    );
    assert_eq!(ok(call(Bls12_381_FinalVerify, [left, right])), Term::bool(true));

    let scalars = int_list(&[1, 2]);
    let points = Term::constant(Constant::ProtoList(
        Type::Bls12_381G1Element,
        vec![
            Constant::Bls12_381G1Element(Box::new(g)),
            Constant::Bls12_381G1Element(Box::new(g)),
        ]
        .into(),
    ));
    let msm = call(Bls12_381_G1_MultiScalarMul, [scalars, points]);
    let triple = call(Bls12_381_G1_ScalarMul, [Term::integer(3), g1(g)]);
    assert_eq!(ok(call(Bls12_381_G1_Equal, [msm, triple])), Term::bool(true));

    assert!(matches!(
        builtin_err(call(Bls12_381_G1_HashToGroup, [bytes(b"msg"), bytes(&[0; 256])])),
        BuiltinError::DstTooLong(256)
    ));
    assert!(matches!(
        builtin_err(call(Bls12_381_G1_Uncompress, [bytes(&[0; 48])])),
        BuiltinError::Uncompress("G1")
    ));
}

/// A machine at protocol 12 whose cost model names every ledger value
/// parameter.
fn ledger_machine() -> Machine {
    let mut params = BTreeMap::new();
    for name in [
        "insertCoin",
        "lookupCoin",
        "unionValue",
        "valueContains",
        "valueData",
        "unValueData",
        "scaleValue",
    ] {
        for side in ["cpu", "memory"] {
            match (name, side) {
                ("lookupCoin" | "valueContains", "memory") => {
                    params.insert(format!("{name}-{side}-arguments"), 1);
                }
                _ => {
                    params.insert(format!("{name}-{side}-arguments-intercept"), 1);
                    params.insert(format!("{name}-{side}-arguments-slope"), 1);
                }
            }
        }
    }
    let mut model = CostModel::default_for(PlutusVersion::V3);
    model.apply_named(&params).unwrap();
    Machine::new(PlutusVersion::V3, ProtocolVersion::PV12, model)
}

#[test]
fn test_ledger_values() {
    use DefaultFunction::*;

    let empty = Term::constant(Constant::Value(LedgerValue::new()));
    let insert = |cur: &[u8], tok: &[u8], q: i64, v: Term| {
        call(InsertCoin, [bytes(cur), bytes(tok), Term::integer(q), v])
    };
    let unavailable = Machine::new(
        PlutusVersion::V3,
        ProtocolVersion::PV12,
        CostModel::default_for(PlutusVersion::V3),
    );
    assert!(matches!(
        eval_with(&unavailable, insert(b"c", b"t", 5, empty.clone())).result.unwrap_err().err_type,
        MachineErrorType::BuiltinNotAvailable { fun: InsertCoin, .. }
    ));

    let machine = ledger_machine();
    let run = |term| eval_with(&machine, term).result;
    let v = insert(b"c", b"t", 5, empty.clone());
    assert_eq!(
        run(call(LookupCoin, [bytes(b"c"), bytes(b"t"), v.clone()])).unwrap(),
        Term::integer(5)
    );
    assert_eq!(
        run(call(LookupCoin, [bytes(b"c"), bytes(b"x"), v.clone()])).unwrap(),
        Term::integer(0)
    );

    let doubled = call(UnionValue, [v.clone(), v.clone()]);
    let scaled = call(ScaleValue, [Term::integer(2), v.clone()]);
    assert_eq!(run(doubled.clone()).unwrap(), run(scaled).unwrap());
    assert_eq!(
        run(call(ValueContains, [doubled, v.clone()])).unwrap(),
        Term::bool(true)
    );
    assert_eq!(
        run(call(UnValueData, [call(ValueData, [v.clone()])])).unwrap(),
        run(v).unwrap()
    );

    let err = run(insert(&[0; 33], b"t", 1, empty)).unwrap_err();
    assert!(matches!(
        err.err_type,
        MachineErrorType::Builtin {
            err: BuiltinError::LedgerValue(LedgerValueError::KeyTooLong(33)),
            ..
        }
    ));
    assert_eq!(err.code(), 415);
}

#[test]
fn test_zero_budget_fails_immediately() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let result = machine.evaluate(&program(Term::integer(1)), ExBudget::ZERO);
    let err = result.result.unwrap_err();
    assert!(matches!(err.err_type, MachineErrorType::BudgetExhausted(_)));
    assert!(err.is_recoverable());
    assert_eq!(err.step, None);
    assert!(result.remaining.is_exhausted());
}

#[test]
fn test_batched_steps_are_charged_at_the_end() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let budget = machine.cost_model.machine.startup;
    let result = machine.evaluate(&program(Term::integer(1)), budget);
    assert!(matches!(
        result.result.unwrap_err().err_type,
        MachineErrorType::BudgetExhausted(_)
    ));
}

#[test]
fn test_exhaustion_stops_at_the_first_overdraft() {
    use DefaultFunction::*;

    let machine = Machine::default_for(PlutusVersion::V3).with_slippage(0);
    let traced = |msg: &str, then: Term| call(Trace, [Term::string(msg), then]);
    let term = traced(
        "outer",
        call(
            AddInteger,
            [traced("left", Term::integer(1)), traced("right", Term::integer(2))],
        ),
    );
    let full = eval_with(&machine, term.clone());
    let needed = full.consumed();
    assert_eq!(full.logs, ["left", "right", "outer"]);
    assert_eq!(full.result.unwrap(), Term::integer(3));

    let shrinkers: [fn(ExBudget, i64) -> ExBudget; 2] = [
        |b, k| ExBudget::new(b.mem, b.cpu * k / 40),
        |b, k| ExBudget::new(b.mem * k / 40, b.cpu),
    ];
    for shrink in shrinkers {
        let mut previous: Option<(ExBudget, usize)> = None;
        for k in (0..40).rev() {
            let budget = shrink(needed, k);
            let mut rs = machine.create_run_state(budget);
            let err = rs.run(&term).unwrap_err();
            let remaining = rs.remaining_budget();
            assert!(
                matches!(err.err_type, MachineErrorType::BudgetExhausted(r) if r == remaining),
                "{err}"
            );
            assert!(remaining.is_exhausted());

            // Charges are a prefix of the full run's charges, so spending
            // only ever shrinks along with the budget.
            let spent = rs.consumed_budget();
            assert!(spent.cpu <= needed.cpu && spent.mem <= needed.mem, "{spent}");
            assert!(full.logs.starts_with(rs.logs()), "{:?}", rs.logs());
            if let Some((last_spent, last_logs)) = previous {
                assert!(spent.cpu <= last_spent.cpu && spent.mem <= last_spent.mem);
                assert!(rs.logs().len() <= last_logs);
            }
            previous = Some((spent, rs.logs().len()));
        }
        assert_eq!(previous.map(|(_, logs)| logs), Some(0));
    }
}

#[test]
fn test_builtin_cost_is_charged() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let result = eval_with(
        &machine,
        call(DefaultFunction::AddInteger, [Term::integer(1), Term::integer(2)]),
    );
    let costs = &machine.cost_model;
    let want = costs.machine.startup
        + costs.step_cost(StepKind::Apply).occurrences(2)
        + costs.step_cost(StepKind::Builtin)
        + costs.step_cost(StepKind::Constant).occurrences(2)
        + costs
            .builtins
            .get(DefaultFunction::AddInteger)
            .unwrap()
            .cost(&[1, 1]);
    assert_eq!(result.consumed(), want);
}

#[test]
fn test_slippage_does_not_change_cost() {
    let term = Term::lambda(call(
        DefaultFunction::MultiplyInteger,
        [Term::var(1), Term::var(1)],
    ))
    .apply(Term::delay(Term::integer(12)).force());
    let consumed: Vec<_> = [0, 1, 3, 200]
        .into_iter()
        .map(|slippage| {
            let machine = Machine::default_for(PlutusVersion::V3).with_slippage(slippage);
            let result = eval_with(&machine, term.clone());
            assert_eq!(result.result.as_ref().unwrap(), &Term::integer(144));
            result.consumed()
        })
        .collect();
    assert!(consumed.windows(2).all(|w| w[0] == w[1]), "{consumed:?}");
}

#[test]
fn test_open_term() {
    let err = eval(Term::var(1)).unwrap_err();
    assert!(matches!(
        err.err_type,
        MachineErrorType::OpenTermEvaluated(i) if i == DeBruijn::new(1)
    ));
    assert_eq!(err.step, Some(StepKind::Var));
    assert_eq!(err.kind(), ErrorKind::Type);

    let zero = Term::lambda(Term::var(0)).apply(Term::unit());
    assert!(matches!(
        machine_err(zero),
        MachineErrorType::OpenTermEvaluated(_)
    ));
}

#[test]
fn test_explicit_error() {
    let err = eval(Term::lambda(Term::Error).apply(Term::unit())).unwrap_err();
    assert!(matches!(err.err_type, MachineErrorType::ExplicitError));
    assert_eq!(err.code(), 200);
    assert!(!err.is_recoverable());
}

#[test]
fn test_application_and_force_errors() {
    use DefaultFunction::*;

    assert!(matches!(
        machine_err(Term::integer(1).apply(Term::integer(2))),
        MachineErrorType::NonFunctionalApplication(_)
    ));
    assert!(matches!(
        machine_err(Term::integer(1).force()),
        MachineErrorType::NonPolymorphicInstantiation(_)
    ));
    assert!(matches!(
        machine_err(Term::builtin(AddInteger).force()),
        MachineErrorType::BuiltinTermArgumentExpected(AddInteger)
    ));
    assert!(matches!(
        machine_err(Term::builtin(IfThenElse).apply(Term::bool(true))),
        MachineErrorType::UnexpectedBuiltinTermArgument(IfThenElse)
    ));
    assert!(matches!(
        machine_err(call(AddInteger, [Term::integer(1), Term::string("x")])),
        MachineErrorType::TypeMismatch { .. }
    ));
    assert!(matches!(
        machine_err(call(AddInteger, [Term::integer(1), Term::delay(Term::unit())])),
        MachineErrorType::NotAConstant { .. }
    ));
}

#[test]
fn test_partial_builtins_are_values() {
    let partial = Term::builtin(DefaultFunction::AddInteger).apply(Term::integer(1));
    assert_eq!(ok(partial.clone()), partial);

    let forced = Term::builtin(DefaultFunction::FstPair).force();
    assert_eq!(ok(forced.clone()), forced);
}

#[test]
fn test_trace_logs() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let term = call(
        DefaultFunction::Trace,
        [Term::string("hello"), call(
            DefaultFunction::Trace,
            [Term::string("world"), Term::unit()],
        )],
    );
    let result = eval_with(&machine, term);
    assert_eq!(result.result.unwrap(), Term::unit());
    assert_eq!(result.logs, ["world", "hello"]);
}

#[test]
fn test_logs_survive_failure() {
    let term = call(DefaultFunction::Trace, [Term::string("before"), Term::unit()])
        .apply(Term::unit());
    let result = eval_with(&Machine::default_for(PlutusVersion::V3), term);
    assert!(result.result.is_err());
    assert_eq!(result.logs, ["before"]);
}

#[test]
fn test_availability_is_checked_when_saturated() {
    let machine = Machine::new(
        PlutusVersion::V1,
        ProtocolVersion::ALONZO,
        CostModel::default_for(PlutusVersion::V1),
    );
    let bare = Term::builtin(DefaultFunction::SerialiseData);
    assert_eq!(eval_with(&machine, bare.clone()).result.unwrap(), bare);

    let err = eval_with(
        &machine,
        call(DefaultFunction::SerialiseData, [Term::data(PlutusData::integer(1))]),
    )
    .result
    .unwrap_err();
    assert!(matches!(
        err.err_type,
        MachineErrorType::BuiltinNotAvailable {
            fun: DefaultFunction::SerialiseData,
            language: PlutusVersion::V1,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Builtin);
    assert!(!machine.is_available(DefaultFunction::SerialiseData));
    assert!(machine.is_available(DefaultFunction::AddInteger));
}

#[test]
fn test_discharge_constant() {
    assert_eq!(value_as_term(&Value::integer(42.into())), Term::integer(42));
}

#[test]
fn test_discharged_closure_is_closed() {
    // (\x. \y. x) 5  ==>  \y. 5
    let term = Term::lambda(Term::lambda(Term::var(2))).apply(Term::integer(5));
    assert_eq!(ok(term), Term::lambda(Term::integer(5)));
}

#[test]
fn test_run_state_budget_carries_over() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let term = Term::integer(1);
    let mut rs = machine.create_run_state(ExBudget::max());
    rs.run(&term).unwrap();
    let once = rs.consumed_budget();
    rs.run(&term).unwrap();
    assert_eq!(rs.consumed_budget(), once + once);
    assert_eq!(rs.remaining_budget(), ExBudget::max() - once - once);
}

#[test]
fn test_failed_run_leaves_no_batched_steps() {
    let machine = Machine::default_for(PlutusVersion::V3);
    let failing = Term::lambda(Term::Error).apply(Term::integer(1));
    let one = Term::integer(1);
    let mut rs = machine.create_run_state(ExBudget::max());
    assert!(matches!(
        rs.run(&failing).unwrap_err().err_type,
        MachineErrorType::ExplicitError
    ));
    let before = rs.remaining_budget();
    rs.run(&one).unwrap();
    let costs = &machine.cost_model;
    assert_eq!(
        before - rs.remaining_budget(),
        costs.machine.startup + costs.step_cost(StepKind::Constant)
    );
}
