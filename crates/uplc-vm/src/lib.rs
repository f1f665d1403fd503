//! A CEK machine for Untyped Plutus Core.
//!
//! [`Machine`] holds the static configuration of an evaluation (language
//! version, protocol version, and [`CostModel`]). Each evaluation runs in a
//! [`RunState`] that owns the remaining [`ExBudget`], the continuation
//! stack, and the trace log.
//!
//! ```
//! use uplc_vm::{ExBudget, Machine, PlutusVersion, ast::{DefaultFunction, Program, Term, Version}};
//!
//! let machine = Machine::default_for(PlutusVersion::V3);
//! let term = Term::builtin(DefaultFunction::AddInteger)
//!     .apply(Term::integer(2))
//!     .apply(Term::integer(3));
//! let result = machine.evaluate(&Program::new(Version::V1_1_0, term), ExBudget::max());
//! assert_eq!(result.result.unwrap(), Term::integer(5));
//! ```

#![allow(unstable_name_collisions)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod budget;
mod builtins;
pub mod cost;
mod discharge;
mod env;
mod error;
mod exmem;
mod machine;
mod stack;
mod tests;
mod value;
mod version;

pub use budget::*;
pub use discharge::value_as_term;
pub use env::Env;
pub use error::*;
pub use exmem::*;
pub use machine::*;
pub use uplc_ast as ast;
pub use value::*;
pub use version::*;

pub use crate::cost::{CostModel, CostModelError, StepKind};
