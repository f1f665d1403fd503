use std::{fmt, str::FromStr};

/// The largest number of term arguments any builtin takes.
pub const MAX_ARITY: usize = 6;

/// The release batch a builtin was introduced in.
///
/// Each batch is tied to a language version and protocol version by the
/// machine's availability rules.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Batch {
    /// The Alonzo set.
    Batch1,
    /// `serialiseData`.
    Batch2,
    /// secp256k1 signature verification.
    Batch3,
    /// BLS12-381, Keccak, Blake2b-224 and integer/bytestring conversion.
    Batch4,
    /// Bitwise primitives and RIPEMD-160.
    Batch5,
    /// Modular exponentiation, arrays, `dropList` and multi-scalar multiplication.
    Batch6,
    /// Ledger value primitives.
    Batch7,
}

/// A builtin name did not match any [`DefaultFunction`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown builtin `{0}`")]
pub struct UnknownBuiltin(pub String);

/// A flat tag did not match any [`DefaultFunction`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown builtin tag {0}")]
pub struct UnknownBuiltinTag(pub u8);

macro_rules! default_functions {
    ($( $variant:ident = $tag:literal, $name:literal, $arity:literal, $forces:literal, $batch:ident; )*) => {
        /// The builtin functions, numbered by their 7-bit flat tag.
        #[allow(non_camel_case_types)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(u8)]
        pub enum DefaultFunction {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant = $tag,
            )*
        }

        impl DefaultFunction {
            /// Every builtin, in tag order.
            pub const ALL: &'static [DefaultFunction] = &[ $( Self::$variant, )* ];

            /// The name used in textual programs and cost model parameters.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Number of term arguments.
            pub const fn arity(self) -> usize {
                match self {
                    $( Self::$variant => $arity, )*
                }
            }

            /// Number of `force`s required before the first argument.
            pub const fn force_count(self) -> usize {
                match self {
                    $( Self::$variant => $forces, )*
                }
            }

            /// The batch the builtin was introduced in.
            pub const fn batch(self) -> Batch {
                match self {
                    $( Self::$variant => Batch::$batch, )*
                }
            }
        }
    };
}

default_functions! {
    AddInteger = 0, "addInteger", 2, 0, Batch1;
    SubtractInteger = 1, "subtractInteger", 2, 0, Batch1;
    MultiplyInteger = 2, "multiplyInteger", 2, 0, Batch1;
    DivideInteger = 3, "divideInteger", 2, 0, Batch1;
    QuotientInteger = 4, "quotientInteger", 2, 0, Batch1;
    RemainderInteger = 5, "remainderInteger", 2, 0, Batch1;
    ModInteger = 6, "modInteger", 2, 0, Batch1;
    EqualsInteger = 7, "equalsInteger", 2, 0, Batch1;
    LessThanInteger = 8, "lessThanInteger", 2, 0, Batch1;
    LessThanEqualsInteger = 9, "lessThanEqualsInteger", 2, 0, Batch1;
    AppendByteString = 10, "appendByteString", 2, 0, Batch1;
    ConsByteString = 11, "consByteString", 2, 0, Batch1;
    SliceByteString = 12, "sliceByteString", 3, 0, Batch1;
    LengthOfByteString = 13, "lengthOfByteString", 1, 0, Batch1;
    IndexByteString = 14, "indexByteString", 2, 0, Batch1;
    EqualsByteString = 15, "equalsByteString", 2, 0, Batch1;
    LessThanByteString = 16, "lessThanByteString", 2, 0, Batch1;
    LessThanEqualsByteString = 17, "lessThanEqualsByteString", 2, 0, Batch1;
    Sha2_256 = 18, "sha2_256", 1, 0, Batch1;
    Sha3_256 = 19, "sha3_256", 1, 0, Batch1;
    Blake2b_256 = 20, "blake2b_256", 1, 0, Batch1;
    VerifyEd25519Signature = 21, "verifyEd25519Signature", 3, 0, Batch1;
    AppendString = 22, "appendString", 2, 0, Batch1;
    EqualsString = 23, "equalsString", 2, 0, Batch1;
    EncodeUtf8 = 24, "encodeUtf8", 1, 0, Batch1;
    DecodeUtf8 = 25, "decodeUtf8", 1, 0, Batch1;
    IfThenElse = 26, "ifThenElse", 3, 1, Batch1;
    ChooseUnit = 27, "chooseUnit", 2, 1, Batch1;
    Trace = 28, "trace", 2, 1, Batch1;
    FstPair = 29, "fstPair", 1, 2, Batch1;
    SndPair = 30, "sndPair", 1, 2, Batch1;
    ChooseList = 31, "chooseList", 3, 2, Batch1;
    MkCons = 32, "mkCons", 2, 1, Batch1;
    HeadList = 33, "headList", 1, 1, Batch1;
    TailList = 34, "tailList", 1, 1, Batch1;
    NullList = 35, "nullList", 1, 1, Batch1;
    ChooseData = 36, "chooseData", 6, 1, Batch1;
    ConstrData = 37, "constrData", 2, 0, Batch1;
    MapData = 38, "mapData", 1, 0, Batch1;
    ListData = 39, "listData", 1, 0, Batch1;
    IData = 40, "iData", 1, 0, Batch1;
    BData = 41, "bData", 1, 0, Batch1;
    UnConstrData = 42, "unConstrData", 1, 0, Batch1;
    UnMapData = 43, "unMapData", 1, 0, Batch1;
    UnListData = 44, "unListData", 1, 0, Batch1;
    UnIData = 45, "unIData", 1, 0, Batch1;
    UnBData = 46, "unBData", 1, 0, Batch1;
    EqualsData = 47, "equalsData", 2, 0, Batch1;
    MkPairData = 48, "mkPairData", 2, 0, Batch1;
    MkNilData = 49, "mkNilData", 1, 0, Batch1;
    MkNilPairData = 50, "mkNilPairData", 1, 0, Batch1;
    SerialiseData = 51, "serialiseData", 1, 0, Batch2;
    VerifyEcdsaSecp256k1Signature = 52, "verifyEcdsaSecp256k1Signature", 3, 0, Batch3;
    VerifySchnorrSecp256k1Signature = 53, "verifySchnorrSecp256k1Signature", 3, 0, Batch3;
    Bls12_381_G1_Add = 54, "bls12_381_G1_add", 2, 0, Batch4;
    Bls12_381_G1_Neg = 55, "bls12_381_G1_neg", 1, 0, Batch4;
    Bls12_381_G1_ScalarMul = 56, "bls12_381_G1_scalarMul", 2, 0, Batch4;
    Bls12_381_G1_Equal = 57, "bls12_381_G1_equal", 2, 0, Batch4;
    Bls12_381_G1_Compress = 58, "bls12_381_G1_compress", 1, 0, Batch4;
    Bls12_381_G1_Uncompress = 59, "bls12_381_G1_uncompress", 1, 0, Batch4;
    Bls12_381_G1_HashToGroup = 60, "bls12_381_G1_hashToGroup", 2, 0, Batch4;
    Bls12_381_G2_Add = 61, "bls12_381_G2_add", 2, 0, Batch4;
    Bls12_381_G2_Neg = 62, "bls12_381_G2_neg", 1, 0, Batch4;
    Bls12_381_G2_ScalarMul = 63, "bls12_381_G2_scalarMul", 2, 0, Batch4;
    Bls12_381_G2_Equal = 64, "bls12_381_G2_equal", 2, 0, Batch4;
    Bls12_381_G2_Compress = 65, "bls12_381_G2_compress", 1, 0, Batch4;
    Bls12_381_G2_Uncompress = 66, "bls12_381_G2_uncompress", 1, 0, Batch4;
    Bls12_381_G2_HashToGroup = 67, "bls12_381_G2_hashToGroup", 2, 0, Batch4;
    Bls12_381_MillerLoop = 68, "bls12_381_millerLoop", 2, 0, Batch4;
    Bls12_381_MulMlResult = 69, "bls12_381_mulMlResult", 2, 0, Batch4;
    Bls12_381_FinalVerify = 70, "bls12_381_finalVerify", 2, 0, Batch4;
    Keccak_256 = 71, "keccak_256", 1, 0, Batch4;
    Blake2b_224 = 72, "blake2b_224", 1, 0, Batch4;
    IntegerToByteString = 73, "integerToByteString", 3, 0, Batch4;
    ByteStringToInteger = 74, "byteStringToInteger", 2, 0, Batch4;
    AndByteString = 75, "andByteString", 3, 0, Batch5;
    OrByteString = 76, "orByteString", 3, 0, Batch5;
    XorByteString = 77, "xorByteString", 3, 0, Batch5;
    ComplementByteString = 78, "complementByteString", 1, 0, Batch5;
    ReadBit = 79, "readBit", 2, 0, Batch5;
    WriteBits = 80, "writeBits", 3, 0, Batch5;
    ReplicateByte = 81, "replicateByte", 2, 0, Batch5;
    ShiftByteString = 82, "shiftByteString", 2, 0, Batch5;
    RotateByteString = 83, "rotateByteString", 2, 0, Batch5;
    CountSetBits = 84, "countSetBits", 1, 0, Batch5;
    FindFirstSetBit = 85, "findFirstSetBit", 1, 0, Batch5;
    Ripemd_160 = 86, "ripemd_160", 1, 0, Batch5;
    ExpModInteger = 87, "expModInteger", 3, 0, Batch6;
    DropList = 88, "dropList", 2, 1, Batch6;
    LengthOfArray = 89, "lengthOfArray", 1, 1, Batch6;
    ListToArray = 90, "listToArray", 1, 1, Batch6;
    IndexArray = 91, "indexArray", 2, 1, Batch6;
    Bls12_381_G1_MultiScalarMul = 92, "bls12_381_G1_multiScalarMul", 2, 0, Batch6;
    Bls12_381_G2_MultiScalarMul = 93, "bls12_381_G2_multiScalarMul", 2, 0, Batch6;
    InsertCoin = 94, "insertCoin", 4, 0, Batch7;
    LookupCoin = 95, "lookupCoin", 3, 0, Batch7;
    UnionValue = 96, "unionValue", 2, 0, Batch7;
    ValueContains = 97, "valueContains", 2, 0, Batch7;
    ValueData = 98, "valueData", 1, 0, Batch7;
    UnValueData = 99, "unValueData", 1, 0, Batch7;
    ScaleValue = 100, "scaleValue", 2, 0, Batch7;
}

impl DefaultFunction {
    /// Number of builtins.
    pub const COUNT: usize = Self::ALL.len();

    /// The index of this builtin in tables sized by [`DefaultFunction::COUNT`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The 7-bit flat tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for DefaultFunction {
    type Error = UnknownBuiltinTag;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .filter(|f| f.tag() == tag)
            .ok_or(UnknownBuiltinTag(tag))
    }
}

impl FromStr for DefaultFunction {
    type Err = UnknownBuiltin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownBuiltin(s.to_owned()))
    }
}

impl fmt::Display for DefaultFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
