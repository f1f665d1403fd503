//! Overriding cost model parameters by name or by position.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};
use uplc_ast::DefaultFunction;

use super::{CostModel, defaults};

/// A parameter update could not be applied.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CostModelError {
    /// No parameter has this name.
    #[error("unknown cost model parameter `{0}`")]
    UnknownParameter(String),
    /// More positional values than parameters.
    #[error("expected at most {expected} cost model parameters, got {got}")]
    TooManyParameters {
        /// Number of known parameters.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
    /// Some, but not all, parameters of an uncalibrated builtin were given.
    #[error("builtin {fun} has no default costs and is missing parameter `{missing}`")]
    IncompleteBuiltin {
        /// The builtin.
        fun: DefaultFunction,
        /// The first missing parameter.
        missing: String,
    },
}

impl CostModel {
    /// Every parameter name of this model, sorted.
    ///
    /// Builtins without costs contribute no names.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.clone()
            .visit_params(&mut |name: String, _: &mut i64| names.push(name));
        names.sort();
        names
    }

    /// Overrides parameters by name.
    ///
    /// Builtins without default costs become callable once all of their
    /// parameters are named here. On error the model is left unchanged.
    pub fn apply_named(&mut self, params: &BTreeMap<String, i64>) -> Result<(), CostModelError> {
        let mut updated = self.clone();
        let mut instantiated = BTreeSet::new();
        for name in params.keys() {
            let Some((stem, _)) = name.split_once('-') else {
                return Err(CostModelError::UnknownParameter(name.clone()));
            };
            let Ok(fun) = stem.parse::<DefaultFunction>() else {
                continue;
            };
            if updated.builtins.get(fun).is_none() {
                let template = defaults::uncalibrated(fun)
                    .ok_or_else(|| CostModelError::UnknownParameter(name.clone()))?;
                warn!(%fun, "costing an uncalibrated builtin from supplied parameters");
                updated.builtins.set(fun, template);
                instantiated.insert(fun);
            }
        }

        let mut unused: BTreeSet<&str> = params.keys().map(String::as_str).collect();
        let mut missing = None;
        updated.visit_params(&mut |name: String, slot: &mut i64| match params.get(&name) {
            Some(v) => {
                *slot = *v;
                unused.remove(name.as_str());
            }
            None => {
                let owner = name
                    .split_once('-')
                    .and_then(|(stem, _)| stem.parse::<DefaultFunction>().ok());
                if let Some(fun) = owner.filter(|f| instantiated.contains(f)) {
                    missing.get_or_insert((fun, name));
                }
            }
        });
        if let Some(name) = unused.into_iter().next() {
            return Err(CostModelError::UnknownParameter(name.to_owned()));
        }
        if let Some((fun, missing)) = missing {
            return Err(CostModelError::IncompleteBuiltin { fun, missing });
        }

        debug!(count = params.len(), "applied cost model parameters");
        *self = updated;
        Ok(())
    }

    /// Overrides parameters by position in [`CostModel::parameter_names`].
    ///
    /// Fewer values than parameters leaves the rest at their defaults.
    pub fn apply_ordered(&mut self, values: &[i64]) -> Result<(), CostModelError> {
        let names = self.parameter_names();
        if values.len() > names.len() {
            return Err(CostModelError::TooManyParameters {
                expected: names.len(),
                got: values.len(),
            });
        }
        let params = names.into_iter().zip(values.iter().copied()).collect();
        self.apply_named(&params)
    }
}
