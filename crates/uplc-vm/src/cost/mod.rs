//! The cost model: per-step machine costs and per-builtin costing
//! functions.

mod defaults;
mod function;
mod params;

use core::fmt;

pub use function::*;
pub use params::CostModelError;
use uplc_ast::{DefaultFunction, Term};

use crate::{ExBudget, PlutusVersion};

/// The kinds of machine step that are charged for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StepKind {
    /// Returning a constant.
    Constant,
    /// Looking up a variable.
    Var,
    /// Building a closure.
    Lambda,
    /// Starting an application.
    Apply,
    /// Building a delay.
    Delay,
    /// Starting a force.
    Force,
    /// Returning a builtin.
    Builtin,
    /// Starting a constructor.
    Constr,
    /// Starting a case analysis.
    Case,
}

impl StepKind {
    /// Every step kind, in index order.
    pub const ALL: [StepKind; 9] = [
        Self::Constant,
        Self::Var,
        Self::Lambda,
        Self::Apply,
        Self::Delay,
        Self::Force,
        Self::Builtin,
        Self::Constr,
        Self::Case,
    ];

    /// Number of step kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// The position of this kind in [`StepKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The step computing `term` costs, if any. Evaluating `error` is free.
    pub fn of(term: &Term) -> Option<Self> {
        Some(match term {
            Term::Var(_) => Self::Var,
            Term::Delay(_) => Self::Delay,
            Term::Lambda { .. } => Self::Lambda,
            Term::Apply { .. } => Self::Apply,
            Term::Constant(_) => Self::Constant,
            Term::Force(_) => Self::Force,
            Term::Error => return None,
            Term::Builtin(_) => Self::Builtin,
            Term::Constr { .. } => Self::Constr,
            Term::Case { .. } => Self::Case,
        })
    }

    /// The stem of this kind's cost model parameters.
    pub const fn param_stem(self) -> &'static str {
        match self {
            Self::Constant => "cekConstCost",
            Self::Var => "cekVarCost",
            Self::Lambda => "cekLamCost",
            Self::Apply => "cekApplyCost",
            Self::Delay => "cekDelayCost",
            Self::Force => "cekForceCost",
            Self::Builtin => "cekBuiltinCost",
            Self::Constr => "cekConstrCost",
            Self::Case => "cekCaseCost",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constant => "constant",
            Self::Var => "var",
            Self::Lambda => "lambda",
            Self::Apply => "apply",
            Self::Delay => "delay",
            Self::Force => "force",
            Self::Builtin => "builtin",
            Self::Constr => "constr",
            Self::Case => "case",
        };
        f.write_str(s)
    }
}

/// Costs charged by the machine itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MachineCosts {
    /// Charged once before evaluation starts.
    pub startup: ExBudget,
    steps: [ExBudget; StepKind::COUNT],
}

impl MachineCosts {
    /// Every step costs `step`.
    pub const fn uniform(startup: ExBudget, step: ExBudget) -> Self {
        Self {
            startup,
            steps: [step; StepKind::COUNT],
        }
    }

    /// The cost of one step of `kind`.
    pub fn get(&self, kind: StepKind) -> ExBudget {
        self.steps[kind.index()]
    }

    /// Sets the cost of one step of `kind`.
    pub fn set(&mut self, kind: StepKind, cost: ExBudget) {
        self.steps[kind.index()] = cost;
    }
}

/// The CPU and memory costing functions of one builtin.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltinCost {
    /// Memory cost.
    pub mem: CostingFunction,
    /// CPU cost.
    pub cpu: CostingFunction,
}

impl BuiltinCost {
    /// Creates a cost entry.
    pub fn new(mem: CostingFunction, cpu: CostingFunction) -> Self {
        Self { mem, cpu }
    }

    /// The cost of a call with the given argument sizes.
    pub fn cost(&self, sizes: &[i64]) -> ExBudget {
        ExBudget::new(self.mem.cost(sizes), self.cpu.cost(sizes))
    }

    /// The cost of a call, measuring operands through `size` on demand.
    pub fn cost_with(&self, size: &dyn Fn(usize) -> i64) -> ExBudget {
        ExBudget::new(self.mem.cost_with(size), self.cpu.cost_with(size))
    }
}

/// Per-builtin costs, indexed by [`DefaultFunction::index`].
///
/// A builtin without an entry has no calibrated costs and cannot be called.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltinCosts(Vec<Option<BuiltinCost>>);

impl BuiltinCosts {
    fn empty() -> Self {
        Self(vec![None; DefaultFunction::COUNT])
    }

    /// The costs of `fun`, if it has any.
    pub fn get(&self, fun: DefaultFunction) -> Option<&BuiltinCost> {
        self.0.get(fun.index())?.as_ref()
    }

    /// Sets the costs of `fun`.
    pub fn set(&mut self, fun: DefaultFunction, cost: BuiltinCost) {
        if let Some(slot) = self.0.get_mut(fun.index()) {
            *slot = Some(cost);
        }
    }
}

/// A complete cost model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CostModel {
    /// Machine step costs.
    pub machine: MachineCosts,
    /// Builtin costs.
    pub builtins: BuiltinCosts,
}

impl CostModel {
    /// The default costs for `language`.
    pub fn default_for(language: PlutusVersion) -> Self {
        match language {
            PlutusVersion::V1 | PlutusVersion::V2 => Self {
                machine: defaults::machine_v1_v2(),
                builtins: defaults::builtins_v1_v2(),
            },
            PlutusVersion::V3 => Self {
                machine: defaults::machine_v3(),
                builtins: defaults::builtins_v3(),
            },
        }
    }

    /// The cost of one step of `kind`.
    pub fn step_cost(&self, kind: StepKind) -> ExBudget {
        self.machine.get(kind)
    }

    /// Visits every settable parameter of this model by name.
    fn visit_params(&mut self, f: &mut dyn FnMut(String, &mut i64)) {
        for (stem, slot) in machine_slots(&mut self.machine) {
            f(format!("{stem}-exBudgetCPU"), &mut slot.cpu);
            f(format!("{stem}-exBudgetMemory"), &mut slot.mem);
        }
        for fun in DefaultFunction::ALL {
            if let Some(Some(cost)) = self.builtins.0.get_mut(fun.index()) {
                cost.cpu
                    .visit_params(&format!("{}-cpu-arguments", fun.name()), &mut *f);
                cost.mem
                    .visit_params(&format!("{}-memory-arguments", fun.name()), &mut *f);
            }
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::default_for(PlutusVersion::V3)
    }
}

fn machine_slots(machine: &mut MachineCosts) -> Vec<(&'static str, &mut ExBudget)> {
    let mut out = Vec::with_capacity(StepKind::COUNT.saturating_add(1));
    out.push(("cekStartupCost", &mut machine.startup));
    for (kind, slot) in StepKind::ALL.iter().zip(machine.steps.iter_mut()) {
        out.push((kind.param_stem(), slot));
    }
    out
}
