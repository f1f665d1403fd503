use uplc_ast::Term;

use crate::{Env, Value};

/// A continuation frame: what to do with the next returned value.
#[derive(Debug)]
pub(crate) enum Frame<'a> {
    /// The function is being computed; the argument term comes next.
    AwaitFunTerm {
        /// Environment for the argument.
        env: Env<'a>,
        /// The unevaluated argument.
        argument: &'a Term,
    },
    /// The argument is being computed; apply `function` to it.
    AwaitArg {
        /// The evaluated function.
        function: Value<'a>,
    },
    /// The function is being computed; apply it to `argument`.
    AwaitFunValue {
        /// The evaluated argument.
        argument: Value<'a>,
    },
    /// Force the returned value.
    Force,
    /// A constructor field is being computed.
    Constr {
        /// Environment for the remaining fields.
        env: Env<'a>,
        /// The constructor tag.
        tag: u64,
        /// Fields not yet computed.
        remaining: &'a [Term],
        /// Fields already computed, in order.
        resolved: Vec<Value<'a>>,
    },
    /// The scrutinee is being computed; select a branch.
    Cases {
        /// Environment for the branches.
        env: Env<'a>,
        /// One branch per tag.
        branches: &'a [Term],
    },
}

/// The continuation stack. An empty stack means evaluation is complete.
#[derive(Debug, Default)]
pub(crate) struct FrameStack<'a>(Vec<Frame<'a>>);

impl<'a> FrameStack<'a> {
    pub fn push(&mut self, frame: Frame<'a>) {
        self.0.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame<'a>> {
        self.0.pop()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
