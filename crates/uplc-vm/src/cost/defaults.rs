//! Default cost tables.

use uplc_ast::DefaultFunction::{self, *};

use super::{
    BuiltinCost, BuiltinCosts, CostingFunction, MachineCosts,
    function::shape::{
        added_sizes, const_above_diagonal, constant, exp_mod, linear_in_max_yz, linear_in_u,
        linear_in_x, linear_in_y, linear_in_y_and_z, linear_in_z, linear_on_diagonal,
        literal_in_y_or_linear_in_z, max_size, min_size, multiplied_sizes, quadratic_in_y,
        quadratic_in_z, subtracted_sizes,
    },
};
use crate::ExBudget;

const STARTUP: ExBudget = ExBudget::new(100, 100);

pub(super) fn machine_v1_v2() -> MachineCosts {
    MachineCosts::uniform(STARTUP, ExBudget::new(100, 23000))
}

pub(super) fn machine_v3() -> MachineCosts {
    MachineCosts::uniform(STARTUP, ExBudget::new(100, 16000))
}

fn table(entries: Vec<(DefaultFunction, CostingFunction, CostingFunction)>) -> BuiltinCosts {
    let mut costs = BuiltinCosts::empty();
    for (fun, mem, cpu) in entries {
        costs.set(fun, BuiltinCost::new(mem, cpu));
    }
    costs
}

/// Builtins whose costs are the same in every language.
fn shared() -> Vec<(DefaultFunction, CostingFunction, CostingFunction)> {
    vec![
        (Bls12_381_G1_Add, constant(18), constant(962335)),
        (Bls12_381_G1_Neg, constant(18), constant(267929)),
        (Bls12_381_G1_ScalarMul, constant(18), linear_in_x(76433006, 8868)),
        (Bls12_381_G1_Equal, constant(1), constant(442008)),
        (Bls12_381_G1_Compress, constant(6), constant(2780678)),
        (Bls12_381_G1_Uncompress, constant(18), constant(52948122)),
        (Bls12_381_G1_HashToGroup, constant(18), linear_in_x(52538055, 3756)),
        (Bls12_381_G2_Add, constant(36), constant(1995836)),
        (Bls12_381_G2_Neg, constant(36), constant(284546)),
        (Bls12_381_G2_ScalarMul, constant(36), linear_in_x(158221314, 26549)),
        (Bls12_381_G2_Equal, constant(1), constant(901022)),
        (Bls12_381_G2_Compress, constant(12), constant(3227919)),
        (Bls12_381_G2_Uncompress, constant(36), constant(74698472)),
        (Bls12_381_G2_HashToGroup, constant(36), linear_in_x(166917843, 4307)),
        (Bls12_381_MillerLoop, constant(72), constant(254006273)),
        (Bls12_381_MulMlResult, constant(72), constant(2174038)),
        (Bls12_381_FinalVerify, constant(1), constant(333849714)),
        (Keccak_256, constant(4), linear_in_x(2261318, 64571)),
        (Blake2b_224, constant(4), linear_in_x(207616, 8310)),
        (
            IntegerToByteString,
            literal_in_y_or_linear_in_z(0, 1),
            quadratic_in_z(1293828, 28716, 63),
        ),
        (
            ByteStringToInteger,
            linear_in_y(0, 1),
            quadratic_in_y(1006041, 43623, 251),
        ),
        (AndByteString, linear_in_max_yz(0, 1), linear_in_y_and_z(100181, 726, 719)),
        (OrByteString, linear_in_max_yz(0, 1), linear_in_y_and_z(100181, 726, 719)),
        (XorByteString, linear_in_max_yz(0, 1), linear_in_y_and_z(100181, 726, 719)),
        (ComplementByteString, linear_in_x(0, 1), linear_in_x(107878, 680)),
        (ReadBit, constant(1), constant(95336)),
        (WriteBits, linear_in_x(0, 1), linear_in_y(281145, 18848)),
        (ReplicateByte, linear_in_x(1, 1), linear_in_x(180194, 159)),
        (ShiftByteString, linear_in_x(0, 1), linear_in_x(158519, 8942)),
        (RotateByteString, linear_in_x(0, 1), linear_in_x(159378, 8813)),
        (CountSetBits, constant(1), linear_in_x(107490, 3298)),
        (FindFirstSetBit, constant(1), linear_in_x(106057, 655)),
        (Ripemd_160, constant(3), linear_in_x(1964219, 24520)),
        (ExpModInteger, linear_in_z(0, 1), exp_mod(607153, 231697, 53144)),
        (DropList, constant(4), linear_in_x(116711, 1957)),
        (LengthOfArray, constant(10), constant(231883)),
        (ListToArray, linear_in_x(7, 1), linear_in_x(1000, 24838)),
        (IndexArray, constant(32), constant(232010)),
        (
            Bls12_381_G1_MultiScalarMul,
            constant(18),
            linear_in_x(321837444, 25087669),
        ),
        (
            Bls12_381_G2_MultiScalarMul,
            constant(36),
            linear_in_x(617887431, 67302824),
        ),
    ]
}

pub(super) fn builtins_v3() -> BuiltinCosts {
    let divide_cpu = || {
        const_above_diagonal(
            85848,
            CostingFunction::QuadraticInXAndY(super::TwoVarQuadratic {
                minimum: 85848,
                c00: 123203,
                c10: 1716,
                c01: 7305,
                c20: 57,
                c11: 549,
                c02: -900,
            }),
        )
    };
    let mut entries = vec![
        (AddInteger, max_size(1, 1), max_size(100788, 420)),
        (SubtractInteger, max_size(1, 1), max_size(100788, 420)),
        (MultiplyInteger, added_sizes(0, 1), multiplied_sizes(90434, 519)),
        (DivideInteger, subtracted_sizes(0, 1, 1), divide_cpu()),
        (QuotientInteger, subtracted_sizes(0, 1, 1), divide_cpu()),
        (RemainderInteger, linear_in_y(0, 1), divide_cpu()),
        (ModInteger, linear_in_y(0, 1), divide_cpu()),
        (EqualsInteger, constant(1), min_size(51775, 558)),
        (LessThanInteger, constant(1), min_size(44749, 541)),
        (LessThanEqualsInteger, constant(1), min_size(43285, 552)),
        (AppendByteString, added_sizes(0, 1), added_sizes(1000, 173)),
        (ConsByteString, added_sizes(0, 1), linear_in_y(72010, 178)),
        (SliceByteString, linear_in_z(4, 0), linear_in_z(20467, 1)),
        (LengthOfByteString, constant(10), constant(22100)),
        (IndexByteString, constant(4), constant(13169)),
        (EqualsByteString, constant(1), linear_on_diagonal(24548, 29498, 38)),
        (LessThanByteString, constant(1), min_size(28999, 74)),
        (LessThanEqualsByteString, constant(1), min_size(28999, 74)),
        (Sha2_256, constant(4), linear_in_x(270652, 22588)),
        (Sha3_256, constant(4), linear_in_x(1457325, 64566)),
        (Blake2b_256, constant(4), linear_in_x(201305, 8356)),
        (VerifyEd25519Signature, constant(10), linear_in_y(53384111, 14333)),
        (AppendString, added_sizes(4, 1), added_sizes(1000, 59957)),
        (EqualsString, constant(1), linear_on_diagonal(39184, 1000, 60594)),
        (EncodeUtf8, linear_in_x(4, 2), linear_in_x(1000, 42921)),
        (DecodeUtf8, linear_in_x(4, 2), linear_in_x(91189, 769)),
        (IfThenElse, constant(1), constant(76049)),
        (ChooseUnit, constant(4), constant(61462)),
        (Trace, constant(32), constant(59498)),
        (FstPair, constant(32), constant(141895)),
        (SndPair, constant(32), constant(141992)),
        (ChooseList, constant(32), constant(132994)),
        (MkCons, constant(32), constant(72362)),
        (HeadList, constant(32), constant(83150)),
        (TailList, constant(32), constant(81663)),
        (NullList, constant(32), constant(74433)),
        (ChooseData, constant(32), constant(94375)),
        (ConstrData, constant(32), constant(22151)),
        (MapData, constant(32), constant(68246)),
        (ListData, constant(32), constant(33852)),
        (IData, constant(32), constant(15299)),
        (BData, constant(32), constant(11183)),
        (UnConstrData, constant(32), constant(24588)),
        (UnMapData, constant(32), constant(24623)),
        (UnListData, constant(32), constant(25933)),
        (UnIData, constant(32), constant(20744)),
        (UnBData, constant(32), constant(20142)),
        (EqualsData, constant(1), min_size(898148, 27279)),
        (MkPairData, constant(32), constant(11546)),
        (MkNilData, constant(32), constant(7243)),
        (MkNilPairData, constant(32), constant(7391)),
        (SerialiseData, linear_in_x(0, 2), linear_in_x(955506, 213312)),
        (VerifyEcdsaSecp256k1Signature, constant(10), constant(43053543)),
        (
            VerifySchnorrSecp256k1Signature,
            constant(10),
            linear_in_y(43574283, 26308),
        ),
    ];
    entries.extend(shared());
    table(entries)
}

pub(super) fn builtins_v1_v2() -> BuiltinCosts {
    let divide_cpu = || const_above_diagonal(196500, multiplied_sizes(453240, 220));
    let mut entries = vec![
        (AddInteger, max_size(1, 1), max_size(205665, 812)),
        (SubtractInteger, max_size(1, 1), max_size(205665, 812)),
        (MultiplyInteger, added_sizes(0, 1), added_sizes(69522, 11687)),
        (DivideInteger, subtracted_sizes(0, 1, 1), divide_cpu()),
        (QuotientInteger, subtracted_sizes(0, 1, 1), divide_cpu()),
        (RemainderInteger, linear_in_y(0, 1), divide_cpu()),
        (ModInteger, linear_in_y(0, 1), divide_cpu()),
        (EqualsInteger, constant(1), min_size(208512, 421)),
        (LessThanInteger, constant(1), min_size(208896, 511)),
        (LessThanEqualsInteger, constant(1), min_size(204924, 473)),
        (AppendByteString, added_sizes(0, 1), added_sizes(1000, 571)),
        (ConsByteString, added_sizes(0, 1), linear_in_y(221973, 511)),
        (SliceByteString, linear_in_z(4, 0), linear_in_z(265318, 0)),
        (LengthOfByteString, constant(10), constant(1000)),
        (IndexByteString, constant(4), constant(57667)),
        (EqualsByteString, constant(1), linear_on_diagonal(245000, 216773, 62)),
        (LessThanByteString, constant(1), min_size(197145, 156)),
        (LessThanEqualsByteString, constant(1), min_size(197145, 156)),
        (Sha2_256, constant(4), linear_in_x(806990, 30482)),
        (Sha3_256, constant(4), linear_in_x(1927926, 82523)),
        (Blake2b_256, constant(4), linear_in_x(117366, 10475)),
        (VerifyEd25519Signature, constant(10), linear_in_y(57996947, 18975)),
        (AppendString, added_sizes(4, 1), added_sizes(1000, 24177)),
        (EqualsString, constant(1), linear_on_diagonal(187000, 1000, 52998)),
        (EncodeUtf8, linear_in_x(4, 2), linear_in_x(1000, 28662)),
        (DecodeUtf8, linear_in_x(4, 2), linear_in_x(497525, 14068)),
        (IfThenElse, constant(1), constant(80556)),
        (ChooseUnit, constant(4), constant(46417)),
        (Trace, constant(32), constant(212342)),
        (FstPair, constant(32), constant(80436)),
        (SndPair, constant(32), constant(85931)),
        (ChooseList, constant(32), constant(175354)),
        (MkCons, constant(32), constant(65493)),
        (HeadList, constant(32), constant(43249)),
        (TailList, constant(32), constant(41182)),
        (NullList, constant(32), constant(60091)),
        (ChooseData, constant(32), constant(19537)),
        (ConstrData, constant(32), constant(89141)),
        (MapData, constant(32), constant(64832)),
        (ListData, constant(32), constant(52467)),
        (IData, constant(32), constant(1000)),
        (BData, constant(32), constant(1000)),
        (UnConstrData, constant(32), constant(32696)),
        (UnMapData, constant(32), constant(38314)),
        (UnListData, constant(32), constant(32247)),
        (UnIData, constant(32), constant(43357)),
        (UnBData, constant(32), constant(31220)),
        (EqualsData, constant(1), min_size(1060367, 12586)),
        (MkPairData, constant(32), constant(76511)),
        (MkNilData, constant(32), constant(22558)),
        (MkNilPairData, constant(32), constant(16563)),
        (SerialiseData, linear_in_x(0, 2), linear_in_x(1159724, 392670)),
        (VerifyEcdsaSecp256k1Signature, constant(10), constant(35892428)),
        (
            VerifySchnorrSecp256k1Signature,
            constant(10),
            linear_in_y(38887044, 32947),
        ),
    ];
    entries.extend(shared());
    table(entries)
}

/// The shape of a builtin that ships without calibrated costs. All
/// parameters start at zero and must be supplied by name before the
/// builtin can run.
pub(super) fn uncalibrated(fun: DefaultFunction) -> Option<BuiltinCost> {
    let (mem, cpu) = match fun {
        InsertCoin => (linear_in_u(0, 0), linear_in_u(0, 0)),
        LookupCoin => (constant(0), linear_in_z(0, 0)),
        UnionValue => (added_sizes(0, 0), added_sizes(0, 0)),
        ValueContains => (constant(0), added_sizes(0, 0)),
        ValueData => (linear_in_x(0, 0), linear_in_x(0, 0)),
        UnValueData => (linear_in_x(0, 0), linear_in_x(0, 0)),
        ScaleValue => (linear_in_y(0, 0), linear_in_y(0, 0)),
        _ => return None,
    };
    Some(BuiltinCost::new(mem, cpu))
}
