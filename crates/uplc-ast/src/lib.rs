//! The Untyped Plutus Core AST.
//!
//! These are the types an external parser or flat decoder produces and the
//! CEK machine in `uplc-vm` consumes: [`Term`]s with resolved de Bruijn
//! indices, the [`Constant`] universe, Plutus [`PlutusData`], and the static
//! metadata of every [`DefaultFunction`].

#![allow(unstable_name_collisions)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod builtin;
mod constant;
mod data;
mod ledger;
mod list;
mod term;


pub use builtin::*;
pub use constant::*;
pub use data::*;
pub use ledger::*;
pub use list::*;
pub use num_bigint::BigInt;
pub use term::*;

/// Re-export of the BLS12-381 curve types stored in constants.
pub mod bls {
    pub use bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};

    pub use crate::constant::MillerLoopResult;
}
