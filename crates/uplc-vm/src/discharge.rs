use uplc_ast::{DeBruijn, Term};

use crate::{Env, Value};

/// Converts a value back into a closed term.
///
/// Closures have their captured environment substituted into their bodies.
/// Variables bound inside the body, and any the environment cannot
/// resolve, are left alone.
pub fn value_as_term(value: &Value<'_>) -> Term {
    match value {
        Value::Con(c) => Term::Constant(c.clone()),
        Value::Delay { body, env } => Term::delay(with_env(0, env, body)),
        Value::Lambda { body, env } => Term::lambda(with_env(1, env, body)),
        Value::Builtin(app) => {
            let mut term = Term::Builtin(app.fun);
            for _ in 0..app.forces() {
                term = term.force();
            }
            // Only fails for a corrupt application, which cannot be built.
            for arg in app.args().unwrap_or_default() {
                term = term.apply(value_as_term(&arg));
            }
            term
        }
        Value::Constr { tag, fields } => Term::Constr {
            tag: *tag,
            fields: fields.iter().map(value_as_term).collect(),
        },
    }
}

/// Substitutes `env` into `term`, where `bound` is the number of lambdas
/// between `term` and the environment's scope.
fn with_env(bound: usize, env: &Env<'_>, term: &Term) -> Term {
    match term {
        Term::Var(index) => match index.inner().checked_sub(bound) {
            Some(free) if free > 0 => match env.lookup(DeBruijn::new(free)) {
                Some(value) => value_as_term(value),
                None => term.clone(),
            },
            _ => term.clone(),
        },
        Term::Lambda { body } => Term::lambda(with_env(bound.saturating_add(1), env, body)),
        Term::Delay(body) => Term::delay(with_env(bound, env, body)),
        Term::Apply { function, argument } => {
            with_env(bound, env, function).apply(with_env(bound, env, argument))
        }
        Term::Force(body) => with_env(bound, env, body).force(),
        Term::Constr { tag, fields } => Term::Constr {
            tag: *tag,
            fields: fields.iter().map(|f| with_env(bound, env, f)).collect(),
        },
        Term::Case { constr, branches } => Term::Case {
            constr: Box::new(with_env(bound, env, constr)),
            branches: branches.iter().map(|b| with_env(bound, env, b)).collect(),
        },
        Term::Constant(_) | Term::Error | Term::Builtin(_) => term.clone(),
    }
}
