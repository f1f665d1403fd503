use core::fmt::{self, Display};

use tracing::{debug, trace};
use uplc_ast::{DefaultFunction, Program, Term};

use crate::{
    BuiltinApp, BuiltinSemantics, CostModel, Env, ExBudget, MachineError, MachineErrorType,
    PlutusVersion, ProtocolVersion, StepKind, Value, builtin_available,
    discharge::value_as_term,
    stack::{Frame, FrameStack},
};

/// Number of steps the machine may take before charging for them.
pub const DEFAULT_SLIPPAGE: u32 = 200;

/// The CEK machine.
///
/// This contains the static configuration for evaluation: language and
/// protocol versions, builtin semantics, and the cost model. For the
/// runtime data of one evaluation, see
/// [`create_run_state()`](Self::create_run_state) and [`RunState`].
#[derive(Clone, Debug)]
pub struct Machine {
    /// The ledger language scripts are written in.
    pub language: PlutusVersion,
    /// The protocol version scripts run under.
    pub protocol: ProtocolVersion,
    /// Builtin behaviour variants.
    pub semantics: BuiltinSemantics,
    /// Step and builtin costs.
    pub cost_model: CostModel,
    /// Steps to accumulate before charging the budget.
    pub slippage: u32,
}

impl Machine {
    /// Creates a `Machine`.
    pub fn new(language: PlutusVersion, protocol: ProtocolVersion, cost_model: CostModel) -> Self {
        Self {
            language,
            protocol,
            semantics: language.into(),
            cost_model,
            slippage: DEFAULT_SLIPPAGE,
        }
    }

    /// A machine for `language` with its default costs, at protocol 11.
    pub fn default_for(language: PlutusVersion) -> Self {
        Self::new(language, ProtocolVersion::PV11, CostModel::default_for(language))
    }

    /// Sets the slippage. Zero charges every step immediately.
    pub fn with_slippage(mut self, slippage: u32) -> Self {
        self.slippage = slippage;
        self
    }

    /// Reports whether scripts may call `fun`: it must belong to the
    /// configured language and protocol, and have costs.
    pub fn is_available(&self, fun: DefaultFunction) -> bool {
        builtin_available(fun, self.language, self.protocol)
            && self.cost_model.builtins.get(fun).is_some()
    }

    /// Create a RunState associated with this Machine.
    pub fn create_run_state(&self, budget: ExBudget) -> RunState<'_> {
        RunState::new(self, budget)
    }

    /// Evaluates a program, reporting the outcome along with the budget
    /// and logs whether or not evaluation succeeded.
    pub fn evaluate(&self, program: &Program, budget: ExBudget) -> EvalResult {
        let mut rs = self.create_run_state(budget);
        let result = rs.run(&program.term);
        match &result {
            Ok(_) => debug!(consumed = %rs.consumed_budget(), "evaluation succeeded"),
            Err(err) => debug!(%err, consumed = %rs.consumed_budget(), "evaluation failed"),
        }
        EvalResult {
            result,
            initial_budget: budget,
            remaining: rs.remaining_budget(),
            logs: rs.take_logs(),
        }
    }
}

impl Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} machine at protocol {} (slippage {})",
            self.language, self.protocol, self.slippage
        )
    }
}

/// The outcome of [`Machine::evaluate`].
#[derive(Debug)]
pub struct EvalResult {
    /// The discharged result term, or the failure.
    pub result: Result<Term, MachineError>,
    /// The budget evaluation started with.
    pub initial_budget: ExBudget,
    /// What was left. Negative after budget exhaustion.
    pub remaining: ExBudget,
    /// Messages emitted by `trace`.
    pub logs: Vec<String>,
}

impl EvalResult {
    /// The budget spent.
    pub fn consumed(&self) -> ExBudget {
        self.initial_budget.saturating_sub(self.remaining)
    }

    /// Reports whether evaluation produced a term.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// The machine's control state between steps.
enum MachineState<'a> {
    /// Evaluate a term in an environment.
    Compute(&'a Term, Env<'a>),
    /// Hand a value to the top frame.
    Return(Value<'a>),
    /// Evaluation finished.
    Done(Term),
}

/// The "run state" of the machine.
///
/// This includes the remaining budget, the continuation stack, the
/// accumulated unbudgeted steps, and the trace log. It's separated from the
/// [`Machine`] so that one configuration can drive many evaluations.
pub struct RunState<'a> {
    /// Reference to the underlying static machine data
    machine: &'a Machine,
    initial_budget: ExBudget,
    ex_budget: ExBudget,
    unbudgeted_steps: [u32; StepKind::COUNT],
    unbudgeted_total: u32,
    frames: FrameStack<'a>,
    logs: Vec<String>,
}

impl<'a> RunState<'a> {
    /// Creates a run state with `budget` to spend.
    pub fn new(machine: &'a Machine, budget: ExBudget) -> Self {
        Self {
            machine,
            initial_budget: budget,
            ex_budget: budget,
            unbudgeted_steps: [0; StepKind::COUNT],
            unbudgeted_total: 0,
            frames: FrameStack::default(),
            logs: Vec::new(),
        }
    }

    /// The budget left.
    pub fn remaining_budget(&self) -> ExBudget {
        self.ex_budget
    }

    /// The budget spent so far.
    pub fn consumed_budget(&self) -> ExBudget {
        self.initial_budget.saturating_sub(self.ex_budget)
    }

    /// Messages emitted by `trace` so far.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Takes the trace messages, leaving none behind.
    pub fn take_logs(&mut self) -> Vec<String> {
        core::mem::take(&mut self.logs)
    }

    pub(crate) fn machine(&self) -> &'a Machine {
        self.machine
    }

    pub(crate) fn log(&mut self, message: String) {
        debug!(%message, "trace");
        self.logs.push(message);
    }

    /// Evaluates `term` to a closed term.
    ///
    /// The startup cost is charged first, so an empty budget fails before
    /// any step is taken. The budget carries over between calls, but steps
    /// left unbudgeted by a failed call do not.
    pub fn run(&mut self, term: &'a Term) -> Result<Term, MachineError> {
        debug!(budget = %self.ex_budget, machine = %self.machine, "starting evaluation");
        self.frames.clear();
        self.unbudgeted_steps = [0; StepKind::COUNT];
        self.unbudgeted_total = 0;
        self.spend_budget(self.machine.cost_model.machine.startup)?;

        let mut state = MachineState::Compute(term, Env::new());
        loop {
            state = match state {
                MachineState::Compute(term, env) => {
                    let step = StepKind::of(term);
                    self.compute(term, env)
                        .map_err(|err| err.with_step(step))?
                }
                MachineState::Return(value) => self.return_compute(value)?,
                MachineState::Done(term) => return Ok(term),
            };
        }
    }

    fn compute(&mut self, term: &'a Term, env: Env<'a>) -> Result<MachineState<'a>, MachineError> {
        if let Some(kind) = StepKind::of(term) {
            self.step_and_maybe_spend(kind)?;
        }
        let state = match term {
            Term::Var(index) => {
                let value = env
                    .lookup(*index)
                    .cloned()
                    .ok_or(MachineErrorType::OpenTermEvaluated(*index))?;
                MachineState::Return(value)
            }
            Term::Delay(body) => MachineState::Return(Value::Delay { body, env }),
            Term::Lambda { body } => MachineState::Return(Value::Lambda { body, env }),
            Term::Apply { function, argument } => {
                self.frames.push(Frame::AwaitFunTerm {
                    env: env.clone(),
                    argument,
                });
                MachineState::Compute(function, env)
            }
            Term::Constant(c) => MachineState::Return(Value::Con(c.clone())),
            Term::Force(body) => {
                self.frames.push(Frame::Force);
                MachineState::Compute(body, env)
            }
            Term::Error => return Err(MachineErrorType::ExplicitError.into()),
            Term::Builtin(fun) => MachineState::Return(Value::Builtin(BuiltinApp::new(*fun))),
            Term::Constr { tag, fields } => match fields.split_first() {
                None => MachineState::Return(Value::Constr {
                    tag: *tag,
                    fields: Vec::new(),
                }),
                Some((first, remaining)) => {
                    self.frames.push(Frame::Constr {
                        env: env.clone(),
                        tag: *tag,
                        remaining,
                        resolved: Vec::with_capacity(fields.len()),
                    });
                    MachineState::Compute(first, env)
                }
            },
            Term::Case { constr, branches } => {
                self.frames.push(Frame::Cases {
                    env: env.clone(),
                    branches,
                });
                MachineState::Compute(constr, env)
            }
        };
        Ok(state)
    }

    fn return_compute(&mut self, value: Value<'a>) -> Result<MachineState<'a>, MachineError> {
        let Some(frame) = self.frames.pop() else {
            self.spend_unbudgeted_steps()?;
            return Ok(MachineState::Done(value_as_term(&value)));
        };
        match frame {
            Frame::AwaitFunTerm { env, argument } => {
                self.frames.push(Frame::AwaitArg { function: value });
                Ok(MachineState::Compute(argument, env))
            }
            Frame::AwaitArg { function } => self.apply_evaluate(function, value),
            Frame::AwaitFunValue { argument } => self.apply_evaluate(value, argument),
            Frame::Force => self.force_evaluate(value),
            Frame::Constr {
                env,
                tag,
                remaining,
                mut resolved,
            } => {
                resolved.push(value);
                match remaining.split_first() {
                    None => Ok(MachineState::Return(Value::Constr {
                        tag,
                        fields: resolved,
                    })),
                    Some((next, remaining)) => {
                        self.frames.push(Frame::Constr {
                            env: env.clone(),
                            tag,
                            remaining,
                            resolved,
                        });
                        Ok(MachineState::Compute(next, env))
                    }
                }
            }
            Frame::Cases { env, branches } => match value {
                Value::Constr { tag, fields } => {
                    if i64::try_from(tag).is_err() {
                        return Err(MachineErrorType::MaxIntExceeded(tag).into());
                    }
                    let branch = usize::try_from(tag)
                        .ok()
                        .and_then(|i| branches.get(i))
                        .ok_or(MachineErrorType::MissingCaseBranch {
                            tag,
                            branches: branches.len(),
                        })?;
                    // The branch is applied to the first field first.
                    for argument in fields.into_iter().rev() {
                        self.frames.push(Frame::AwaitFunValue { argument });
                    }
                    Ok(MachineState::Compute(branch, env))
                }
                other => Err(MachineErrorType::NonConstrScrutinized(value_as_term(&other)).into()),
            },
        }
    }

    fn apply_evaluate(
        &mut self,
        function: Value<'a>,
        argument: Value<'a>,
    ) -> Result<MachineState<'a>, MachineError> {
        match function {
            Value::Lambda { body, env } => Ok(MachineState::Compute(body, env.extend(argument))),
            Value::Builtin(app) => {
                if app.needs_force() {
                    return Err(MachineErrorType::UnexpectedBuiltinTermArgument(app.fun).into());
                }
                if app.is_saturated() {
                    return Err(MachineErrorType::NonFunctionalApplication(value_as_term(
                        &Value::Builtin(app),
                    ))
                    .into());
                }
                let app = app.push(argument)?;
                self.return_builtin(app)
            }
            other => {
                Err(MachineErrorType::NonFunctionalApplication(value_as_term(&other)).into())
            }
        }
    }

    fn force_evaluate(&mut self, value: Value<'a>) -> Result<MachineState<'a>, MachineError> {
        match value {
            Value::Delay { body, env } => Ok(MachineState::Compute(body, env)),
            Value::Builtin(app) => {
                if !app.needs_force() {
                    return Err(MachineErrorType::BuiltinTermArgumentExpected(app.fun).into());
                }
                let app = app.force()?;
                self.return_builtin(app)
            }
            other => {
                Err(MachineErrorType::NonPolymorphicInstantiation(value_as_term(&other)).into())
            }
        }
    }

    /// Runs a builtin once saturated, otherwise returns the partial
    /// application.
    fn return_builtin(&mut self, app: BuiltinApp<'a>) -> Result<MachineState<'a>, MachineError> {
        if !app.is_saturated() {
            return Ok(MachineState::Return(Value::Builtin(app)));
        }
        let fun = app.fun;
        if !self.machine.is_available(fun) {
            return Err(MachineErrorType::BuiltinNotAvailable {
                fun,
                language: self.machine.language,
                protocol: self.machine.protocol,
            }
            .into());
        }
        let args = app.args()?;
        let value = self.call_builtin(fun, &args)?;
        Ok(MachineState::Return(value))
    }

    fn step_and_maybe_spend(&mut self, kind: StepKind) -> Result<(), MachineErrorType> {
        let count = &mut self.unbudgeted_steps[kind.index()];
        *count = count.saturating_add(1);
        self.unbudgeted_total = self.unbudgeted_total.saturating_add(1);
        if self.unbudgeted_total >= self.machine.slippage {
            self.spend_unbudgeted_steps()?;
        }
        Ok(())
    }

    fn spend_unbudgeted_steps(&mut self) -> Result<(), MachineErrorType> {
        let mut cost = ExBudget::ZERO;
        for kind in StepKind::ALL {
            let count = core::mem::take(&mut self.unbudgeted_steps[kind.index()]);
            let steps = self.machine.cost_model.step_cost(kind).occurrences(count);
            cost = cost.saturating_add(steps);
        }
        trace!(
            steps = self.unbudgeted_total,
            depth = self.frames.depth(),
            %cost,
            "charging machine steps"
        );
        self.unbudgeted_total = 0;
        self.spend_budget(cost)
    }

    /// Deducts `cost`, failing once either component goes negative.
    pub(crate) fn spend_budget(&mut self, cost: ExBudget) -> Result<(), MachineErrorType> {
        self.ex_budget = self.ex_budget.saturating_sub(cost);
        if self.ex_budget.is_exhausted() {
            return Err(MachineErrorType::BudgetExhausted(self.ex_budget));
        }
        Ok(())
    }
}
