use core::fmt;

use serde::{Deserialize, Serialize};
use uplc_ast::{Batch, DefaultFunction};

/// A Plutus ledger language.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum PlutusVersion {
    /// Plutus V1.
    V1,
    /// Plutus V2.
    V2,
    /// Plutus V3.
    V3,
}

impl PlutusVersion {
    /// The first protocol version at which scripts in this language run.
    pub const fn introduced_in(self) -> ProtocolVersion {
        match self {
            Self::V1 => ProtocolVersion::ALONZO,
            Self::V2 => ProtocolVersion::VASIL,
            Self::V3 => ProtocolVersion::CONWAY,
        }
    }
}

impl fmt::Display for PlutusVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("PlutusV1"),
            Self::V2 => f.write_str("PlutusV2"),
            Self::V3 => f.write_str("PlutusV3"),
        }
    }
}

/// A ledger protocol version.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ProtocolVersion {
    /// Major version; hard forks bump this.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl ProtocolVersion {
    /// Alonzo.
    pub const ALONZO: Self = Self::new(5, 0);
    /// Vasil.
    pub const VASIL: Self = Self::new(7, 0);
    /// Valentine.
    pub const VALENTINE: Self = Self::new(8, 0);
    /// Conway.
    pub const CONWAY: Self = Self::new(9, 0);
    /// Plomin.
    pub const PLOMIN: Self = Self::new(10, 0);
    /// The intra-era hard fork after Plomin.
    pub const PV11: Self = Self::new(11, 0);
    /// The release introducing ledger value builtins.
    pub const PV12: Self = Self::new(12, 0);

    /// Creates a protocol version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Behavioural variants of builtins that changed between languages.
///
/// Only `consByteString` differs today: the older languages reduce the
/// byte argument modulo 256, newer ones reject out-of-range bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BuiltinSemantics {
    /// V1 and V2 behaviour.
    Wrapping,
    /// V3 behaviour.
    Checked,
}

impl From<PlutusVersion> for BuiltinSemantics {
    fn from(language: PlutusVersion) -> Self {
        match language {
            PlutusVersion::V1 | PlutusVersion::V2 => Self::Wrapping,
            PlutusVersion::V3 => Self::Checked,
        }
    }
}

/// The language and protocol version that introduced a batch.
const fn batch_introduction(batch: Batch) -> (PlutusVersion, u32) {
    match batch {
        Batch::Batch1 => (PlutusVersion::V1, 5),
        Batch::Batch2 => (PlutusVersion::V2, 7),
        Batch::Batch3 => (PlutusVersion::V2, 8),
        Batch::Batch4 => (PlutusVersion::V3, 9),
        Batch::Batch5 => (PlutusVersion::V3, 10),
        Batch::Batch6 => (PlutusVersion::V3, 11),
        Batch::Batch7 => (PlutusVersion::V3, 12),
    }
}

/// Reports whether `fun` may be used by `language` scripts at `protocol`.
///
/// A batch is available in the language that introduced it and every later
/// one, from its introduction protocol onwards. From protocol 11 the older
/// languages also see batches one through six.
pub fn builtin_available(
    fun: DefaultFunction,
    language: PlutusVersion,
    protocol: ProtocolVersion,
) -> bool {
    let batch = fun.batch();
    let (intro_language, intro_major) = batch_introduction(batch);
    if protocol.major < intro_major || protocol < language.introduced_in() {
        return false;
    }
    language >= intro_language || (protocol.major >= 11 && batch <= Batch::Batch6)
}
