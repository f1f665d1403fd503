use core::{fmt, ops::RangeInclusive};

use buggy::Bug;
use num_bigint::BigInt;
use uplc_ast::{DataError, DeBruijn, DefaultFunction, LedgerValueError, Term};

use crate::{ExBudget, PlutusVersion, ProtocolVersion, StepKind};

/// The broad class of a [`MachineErrorType`].
///
/// Each class owns a band of numeric error codes. Only budget failures are
/// recoverable: the same script may succeed with a larger budget.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The budget ran out.
    Budget,
    /// The script failed on purpose or through a malformed `case`.
    Script,
    /// A value had the wrong shape for the operation applied to it.
    Type,
    /// A builtin rejected its arguments.
    Builtin,
    /// A broken machine invariant.
    Internal,
}

impl ErrorKind {
    /// The band of codes this kind occupies.
    pub const fn code_range(self) -> RangeInclusive<u16> {
        match self {
            Self::Budget => 100..=199,
            Self::Script => 200..=299,
            Self::Type => 300..=399,
            Self::Builtin => 400..=499,
            Self::Internal => 500..=599,
        }
    }

    /// Reports whether retrying with more resources could succeed.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::Budget)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Budget => "budget",
            Self::Script => "script",
            Self::Type => "type",
            Self::Builtin => "builtin",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A builtin refused its (well-typed) arguments.
#[derive(Debug, thiserror::Error)]
pub enum BuiltinError {
    /// Division, quotient, remainder or modulus by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// An index fell outside a byte string, list or array.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: BigInt,
        /// The length of the indexed value.
        len: usize,
    },
    /// `headList` or `tailList` on an empty list.
    #[error("empty list")]
    EmptyList,
    /// A byte value outside `0..=255`.
    #[error("byte {0} out of range")]
    ByteOutOfRange(BigInt),
    /// A byte string had the wrong length for its role.
    #[error("expected {expected} bytes for {what}, got {got}")]
    InvalidLength {
        /// What the bytes were meant to be.
        what: &'static str,
        /// The required length.
        expected: usize,
        /// The actual length.
        got: usize,
    },
    /// Bytes were not valid UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// A key or signature could not be parsed.
    #[error("malformed {0}")]
    Malformed(&'static str),
    /// A compressed curve point did not decode.
    #[error("invalid compressed {0} point")]
    Uncompress(&'static str),
    /// A hash-to-group domain separation tag over 255 bytes.
    #[error("domain separation tag of {0} bytes exceeds 255")]
    DstTooLong(usize),
    /// An `un*Data` builtin saw the wrong kind of data.
    #[error("expected {0} data")]
    UnexpectedData(&'static str),
    /// `integerToByteString` was asked for more than its width limit,
    /// or for a width too small for the integer.
    #[error("integer does not fit in {0} bytes")]
    IntegerTooWide(BigInt),
    /// `integerToByteString` on a negative integer.
    #[error("cannot convert negative integer {0}")]
    NegativeInteger(BigInt),
    /// A bitwise write or shift with an invalid argument.
    #[error("invalid bit index {0}")]
    BitIndexOutOfRange(BigInt),
    /// `expModInteger` with a non-positive modulus or no inverse.
    #[error("expModInteger: {0}")]
    ExpMod(&'static str),
    /// A size or count argument was negative or absurdly large.
    #[error("invalid size argument {0}")]
    InvalidSize(BigInt),
    /// A multi-asset value operation failed.
    #[error(transparent)]
    LedgerValue(#[from] LedgerValueError),
    /// Data serialisation failed.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl BuiltinError {
    /// The numeric code of this error, within [`ErrorKind::Builtin`]'s band.
    pub const fn code(&self) -> u16 {
        match self {
            Self::DivisionByZero => 400,
            Self::IndexOutOfBounds { .. } => 401,
            Self::EmptyList => 402,
            Self::ByteOutOfRange(_) => 403,
            Self::InvalidLength { .. } => 404,
            Self::InvalidUtf8 => 405,
            Self::Malformed(_) => 406,
            Self::Uncompress(_) => 407,
            Self::DstTooLong(_) => 408,
            Self::UnexpectedData(_) => 409,
            Self::IntegerTooWide(_) => 410,
            Self::NegativeInteger(_) => 411,
            Self::BitIndexOutOfRange(_) => 412,
            Self::ExpMod(_) => 413,
            Self::InvalidSize(_) => 414,
            Self::LedgerValue(_) => 415,
            Self::Data(_) => 416,
        }
    }
}

/// Possible machine errors.
#[derive(Debug, thiserror::Error)]
pub enum MachineErrorType {
    /// The budget went negative. Carries the (overdrawn) remainder.
    #[error("budget exhausted: {0}")]
    BudgetExhausted(ExBudget),
    /// The `error` term was evaluated.
    #[error("explicit error term evaluated")]
    ExplicitError,
    /// A `case` had no branch for the scrutinee's tag.
    #[error("no case branch for tag {tag} among {branches} branches")]
    MissingCaseBranch {
        /// The scrutinee's tag.
        tag: u64,
        /// Number of branches available.
        branches: usize,
    },
    /// A constructor tag too large to select a branch.
    #[error("constructor tag {0} exceeds the maximum case tag")]
    MaxIntExceeded(u64),
    /// A variable had no binding.
    #[error("open term evaluated: unbound variable {0}")]
    OpenTermEvaluated(DeBruijn),
    /// A constant had the wrong type.
    #[error("expected type {want}, but got {got}")]
    TypeMismatch {
        /// Expected type name.
        want: String,
        /// Received type name.
        got: String,
    },
    /// A builtin expected a constant and got a function, delay or
    /// constructor.
    #[error("expected a constant of type {want}, got {got:?}")]
    NotAConstant {
        /// Expected type name.
        want: String,
        /// The offending value as a term.
        got: Term,
    },
    /// Something other than a lambda or builtin was applied.
    #[error("attempted to apply non-function {0:?}")]
    NonFunctionalApplication(Term),
    /// A builtin received a term argument while it still expected a force.
    #[error("builtin {0} expects a force before its next argument")]
    UnexpectedBuiltinTermArgument(DefaultFunction),
    /// A builtin was forced while it expected a term argument.
    #[error("builtin {0} expects a term argument, not a force")]
    BuiltinTermArgumentExpected(DefaultFunction),
    /// Something other than a delay or builtin was forced.
    #[error("attempted to force non-polymorphic value {0:?}")]
    NonPolymorphicInstantiation(Term),
    /// `case` on something other than a constructor.
    #[error("case scrutinee is not a constructor: {0:?}")]
    NonConstrScrutinized(Term),
    /// A builtin failed.
    #[error("{fun}: {err}")]
    Builtin {
        /// The failing builtin.
        fun: DefaultFunction,
        /// What went wrong.
        #[source]
        err: BuiltinError,
    },
    /// A builtin is not part of the configured language at the configured
    /// protocol version, or has no costing.
    #[error("builtin {fun} is not available in {language} at protocol version {protocol}")]
    BuiltinNotAvailable {
        /// The builtin.
        fun: DefaultFunction,
        /// The configured language.
        language: PlutusVersion,
        /// The configured protocol version.
        protocol: ProtocolVersion,
    },
    /// An implementation bug
    #[error("bug: {0}")]
    Bug(Bug),
}

impl MachineErrorType {
    /// Constructs a `TypeMismatch` error
    pub fn type_mismatch(want: impl Into<String>, got: impl ToString) -> Self {
        Self::TypeMismatch {
            want: want.into(),
            got: got.to_string(),
        }
    }

    /// The class of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BudgetExhausted(_) => ErrorKind::Budget,
            Self::ExplicitError | Self::MissingCaseBranch { .. } | Self::MaxIntExceeded(_) => {
                ErrorKind::Script
            }
            Self::OpenTermEvaluated(_)
            | Self::TypeMismatch { .. }
            | Self::NotAConstant { .. }
            | Self::NonFunctionalApplication(_)
            | Self::UnexpectedBuiltinTermArgument(_)
            | Self::BuiltinTermArgumentExpected(_)
            | Self::NonPolymorphicInstantiation(_)
            | Self::NonConstrScrutinized(_) => ErrorKind::Type,
            Self::Builtin { .. } | Self::BuiltinNotAvailable { .. } => ErrorKind::Builtin,
            Self::Bug(_) => ErrorKind::Internal,
        }
    }

    /// The numeric code of this error.
    pub const fn code(&self) -> u16 {
        match self {
            Self::BudgetExhausted(_) => 100,
            Self::ExplicitError => 200,
            Self::MissingCaseBranch { .. } => 201,
            Self::MaxIntExceeded(_) => 202,
            Self::OpenTermEvaluated(_) => 300,
            Self::TypeMismatch { .. } => 301,
            Self::NotAConstant { .. } => 302,
            Self::NonFunctionalApplication(_) => 303,
            Self::UnexpectedBuiltinTermArgument(_) => 304,
            Self::BuiltinTermArgumentExpected(_) => 305,
            Self::NonPolymorphicInstantiation(_) => 306,
            Self::NonConstrScrutinized(_) => 307,
            Self::Builtin { err, .. } => err.code(),
            Self::BuiltinNotAvailable { .. } => 499,
            Self::Bug(_) => 500,
        }
    }
}

impl From<Bug> for MachineErrorType {
    fn from(bug: Bug) -> Self {
        Self::Bug(bug)
    }
}

/// An error returned by [`RunState::run`][crate::RunState::run].
#[derive(Debug, thiserror::Error)]
pub struct MachineError {
    /// The type of the error
    #[source]
    pub err_type: MachineErrorType,
    /// The kind of term being computed when the error arose, if any.
    pub step: Option<StepKind>,
}

impl MachineError {
    /// Creates a `MachineError`.
    pub fn new(err_type: MachineErrorType) -> Self {
        Self {
            err_type,
            step: None,
        }
    }

    /// Records the step the error arose in, keeping an earlier one.
    pub(crate) fn with_step(mut self, step: Option<StepKind>) -> Self {
        if self.step.is_none() {
            self.step = step;
        }
        self
    }

    /// The class of the error.
    pub const fn kind(&self) -> ErrorKind {
        self.err_type.kind()
    }

    /// The numeric code of the error.
    pub const fn code(&self) -> u16 {
        self.err_type.code()
    }

    /// Reports whether a retry with a larger budget could succeed.
    pub const fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{} (while computing {step})", self.err_type),
            None => write!(f, "{}", self.err_type),
        }
    }
}

impl From<MachineErrorType> for MachineError {
    fn from(value: MachineErrorType) -> Self {
        Self::new(value)
    }
}

impl From<Bug> for MachineError {
    fn from(bug: Bug) -> Self {
        Self::new(MachineErrorType::Bug(bug))
    }
}
