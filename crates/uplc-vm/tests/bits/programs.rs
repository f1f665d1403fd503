#![cfg(test)]

use uplc_vm::ast::{DefaultFunction, Program, Term, Version};

/// Saturates `fun` with its forces and then `args`.
pub fn call(fun: DefaultFunction, args: impl IntoIterator<Item = Term>) -> Term {
    let mut term = Term::builtin(fun);
    for _ in 0..fun.force_count() {
        term = term.force();
    }
    args.into_iter().fold(term, Term::apply)
}

/// The strict fixpoint combinator, `\f. (\x. f (\v. x x v)) (\x. f (\v. x x v))`.
pub fn fix() -> Term {
    let half = Term::lambda(
        Term::var(2).apply(Term::lambda(Term::var(2).apply(Term::var(2)).apply(Term::var(1)))),
    );
    Term::lambda(half.clone().apply(half))
}

/// `if cond then yes else no`, with both branches delayed so only one runs.
pub fn lazy_if(cond: Term, yes: Term, no: Term) -> Term {
    call(
        DefaultFunction::IfThenElse,
        [cond, Term::delay(yes), Term::delay(no)],
    )
    .force()
}

/// Naive doubly recursive Fibonacci, applied to `n`.
pub fn fib(n: i64) -> Program {
    use DefaultFunction::*;

    // \self. \n. if n < 2 then n else self (n - 1) + self (n - 2)
    let sub = |k: i64| call(SubtractInteger, [Term::var(1), Term::integer(k)]);
    let body = Term::lambda(Term::lambda(lazy_if(
        call(LessThanInteger, [Term::var(1), Term::integer(2)]),
        Term::var(1),
        call(
            AddInteger,
            [Term::var(2).apply(sub(1)), Term::var(2).apply(sub(2))],
        ),
    )));
    Program::new(
        Version::V1_1_0,
        fix().apply(body).apply(Term::integer(n)),
    )
}

/// Sums the integers in `0..=n` by counting down.
pub fn sum_to(n: i64) -> Program {
    use DefaultFunction::*;

    let body = Term::lambda(Term::lambda(lazy_if(
        call(EqualsInteger, [Term::var(1), Term::integer(0)]),
        Term::integer(0),
        call(
            AddInteger,
            [
                Term::var(1),
                Term::var(2).apply(call(SubtractInteger, [Term::var(1), Term::integer(1)])),
            ],
        ),
    )));
    Program::new(
        Version::V1_1_0,
        fix().apply(body).apply(Term::integer(n)),
    )
}

/// Builds an `n`-field constructor and sums its fields through `case`.
pub fn case_sum(fields: &[i64]) -> Program {
    let n = fields.len();
    let mut sum = Term::integer(0);
    for i in 1..=n {
        sum = call(DefaultFunction::AddInteger, [sum, Term::var(i)]);
    }
    let branch = (0..n).fold(sum, |body, _| Term::lambda(body));
    let scrutinee = Term::constr(0, fields.iter().map(|f| Term::integer(*f)).collect());
    Program::new(Version::V1_1_0, Term::case(scrutinee, vec![branch]))
}
