#![cfg(test)]

use num_bigint::BigInt;
use proptest::prelude::*;
use uplc_vm::ast::{DefaultFunction, Term};

use super::programs::call;

/// Integer arithmetic without division, so every expression evaluates.
#[derive(Clone, Debug)]
pub enum Expr {
    Lit(i64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    /// `(\x. body) arg`, where the body refers to `x` at most once.
    Let(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn eval(&self) -> BigInt {
        match self {
            Self::Lit(n) => BigInt::from(*n),
            Self::Add(a, b) => a.eval() + b.eval(),
            Self::Sub(a, b) => a.eval() - b.eval(),
            Self::Mul(a, b) => a.eval() * b.eval(),
            Self::Let(arg, body) => arg.eval() + body.eval(),
        }
    }

    pub fn to_term(&self) -> Term {
        use DefaultFunction::*;

        let bin = |fun, a: &Expr, b: &Expr| call(fun, [a.to_term(), b.to_term()]);
        match self {
            Self::Lit(n) => Term::integer(*n),
            Self::Add(a, b) => bin(AddInteger, a, b),
            Self::Sub(a, b) => bin(SubtractInteger, a, b),
            Self::Mul(a, b) => bin(MultiplyInteger, a, b),
            // Closed subterms never mention the new binder.
            Self::Let(arg, body) => {
                Term::lambda(call(AddInteger, [Term::var(1), body.to_term()]))
                    .apply(arg.to_term())
            }
        }
    }
}

pub fn expr() -> impl Strategy<Value = Expr> {
    let leaf = any::<i64>().prop_map(Expr::Lit);
    leaf.prop_recursive(5, 64, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Mul(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Let(Box::new(a), Box::new(b))),
        ]
    })
}
