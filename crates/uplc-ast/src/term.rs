use std::{fmt, rc::Rc, str::FromStr};

use num_bigint::BigInt;
use serde_derive::{Deserialize, Serialize};

use crate::{Constant, DefaultFunction, PlutusData};

/// A de Bruijn index.
///
/// Index 1 refers to the innermost enclosing lambda. Index 0 is never bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DeBruijn(usize);

impl DeBruijn {
    /// Creates an index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub const fn inner(self) -> usize {
        self.0
    }
}

impl From<usize> for DeBruijn {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for DeBruijn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// An Untyped Plutus Core term with resolved de Bruijn indices.
///
/// Terms are immutable once built. Constants sit behind an [`Rc`] so that
/// evaluation can hand them out as values without copying their payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A variable reference.
    Var(DeBruijn),
    /// A suspended computation.
    Delay(Box<Term>),
    /// A single-argument function.
    Lambda {
        /// The function body, where index 1 is the argument.
        body: Box<Term>,
    },
    /// Function application.
    Apply {
        /// The function.
        function: Box<Term>,
        /// The argument.
        argument: Box<Term>,
    },
    /// A constant.
    Constant(Rc<Constant>),
    /// Forces a delayed computation or instantiates a builtin.
    Force(Box<Term>),
    /// Explicit failure.
    Error,
    /// A builtin function.
    Builtin(DefaultFunction),
    /// A constructor application.
    Constr {
        /// The constructor tag.
        tag: u64,
        /// The constructor fields, evaluated left to right.
        fields: Vec<Term>,
    },
    /// Case analysis on a constructor value.
    Case {
        /// The scrutinee.
        constr: Box<Term>,
        /// One branch per constructor tag.
        branches: Vec<Term>,
    },
}

impl Term {
    /// A variable reference.
    pub fn var(index: usize) -> Self {
        Self::Var(DeBruijn::new(index))
    }

    /// A lambda around `body`.
    pub fn lambda(body: Term) -> Self {
        Self::Lambda {
            body: Box::new(body),
        }
    }

    /// A `delay` around `body`.
    pub fn delay(body: Term) -> Self {
        Self::Delay(Box::new(body))
    }

    /// Applies `self` to `argument`.
    pub fn apply(self, argument: Term) -> Self {
        Self::Apply {
            function: Box::new(self),
            argument: Box::new(argument),
        }
    }

    /// A `force` around `self`.
    pub fn force(self) -> Self {
        Self::Force(Box::new(self))
    }

    /// A builtin reference.
    pub fn builtin(fun: DefaultFunction) -> Self {
        Self::Builtin(fun)
    }

    /// A constant term.
    pub fn constant(constant: Constant) -> Self {
        Self::Constant(Rc::new(constant))
    }

    /// An integer constant.
    pub fn integer(i: impl Into<BigInt>) -> Self {
        Self::constant(Constant::Integer(i.into()))
    }

    /// A bytestring constant.
    pub fn byte_string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::constant(Constant::ByteString(bytes.into()))
    }

    /// A string constant.
    pub fn string(s: impl Into<String>) -> Self {
        Self::constant(Constant::String(s.into()))
    }

    /// A boolean constant.
    pub fn bool(b: bool) -> Self {
        Self::constant(Constant::Bool(b))
    }

    /// The unit constant.
    pub fn unit() -> Self {
        Self::constant(Constant::Unit)
    }

    /// A data constant.
    pub fn data(d: PlutusData) -> Self {
        Self::constant(Constant::Data(d))
    }

    /// A constructor application.
    pub fn constr(tag: u64, fields: Vec<Term>) -> Self {
        Self::Constr { tag, fields }
    }

    /// A case expression.
    pub fn case(constr: Term, branches: Vec<Term>) -> Self {
        Self::Case {
            constr: Box::new(constr),
            branches,
        }
    }

    /// Returns the constant if this term is one.
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Returns true if this term contains a `constr` or `case` node.
    pub fn uses_sums_of_products(&self) -> bool {
        let mut pending = vec![self];
        while let Some(term) = pending.pop() {
            match term {
                Self::Constr { .. } | Self::Case { .. } => return true,
                Self::Delay(t) | Self::Force(t) | Self::Lambda { body: t } => pending.push(t),
                Self::Apply { function, argument } => {
                    pending.push(function);
                    pending.push(argument);
                }
                Self::Var(_) | Self::Constant(_) | Self::Error | Self::Builtin(_) => {}
            }
        }
        false
    }
}

impl From<Constant> for Term {
    fn from(constant: Constant) -> Self {
        Self::constant(constant)
    }
}

/// An invalid version string was provided to [`Version::from_str`].
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("invalid version string")]
pub struct InvalidVersion;

/// The version of the Plutus Core language a program is written in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    /// Plutus Core 1.0.0.
    pub const V1_0_0: Self = Self::new(1, 0, 0);
    /// Plutus Core 1.1.0, which adds `constr` and `case`.
    pub const V1_1_0: Self = Self::new(1, 1, 0);

    /// Creates a version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Reports whether `constr` and `case` terms are allowed.
    pub fn supports_sums_of_products(&self) -> bool {
        *self >= Self::V1_1_0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::V1_1_0
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '.').map(u32::from_str);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => {
                Ok(Self::new(major, minor, patch))
            }
            _ => Err(InvalidVersion),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A versioned program.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// The language version.
    pub version: Version,
    /// The program body.
    pub term: Term,
}

impl Program {
    /// Creates a program.
    pub fn new(version: Version, term: Term) -> Self {
        Self { version, term }
    }
}
