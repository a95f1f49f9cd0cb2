//! Dirty propagation (push) and evaluation propagation (pull).
//!
//! Writing a value dirties everything downstream of it. Reading a dirty
//! parameter with evaluation pulls its upstream first, then runs its
//! processing callback, so every stale parameter is recomputed once.

use std::collections::HashSet;

use log::{error, trace};

use crate::error::PropagationError;
use crate::param::CallbackKind;

use super::{GraphEditor, Notification, ParameterId};

impl GraphEditor {
    /// Marks `id` dirty (or clean, with `set_first_true == false`) and dirties
    /// everything downstream of it.
    ///
    /// Downstream means connection targets of output pins plus each
    /// parameter's affected list. Parameters that are already dirty are not
    /// walked again, so cycles terminate. Self-evaluating inputs reached by
    /// the walk are evaluated once it finishes.
    pub fn propagate_dirty(&mut self, id: ParameterId, set_first_true: bool) {
        let Some(start) = self.parameters.get_mut(id) else {
            return;
        };
        let mut self_evaluating = Vec::new();
        if set_first_true {
            if !start.is_dirty() {
                start.set_dirty(true);
                if start.is_input() && start.is_self_evaluating() {
                    self_evaluating.push(id);
                }
                self.notify(Notification::Dirtied(id));
            }
        } else {
            start.set_dirty(false);
        }

        let mut stack = self.downstream_of(id);
        stack.reverse();
        while let Some(next) = stack.pop() {
            let Some(parameter) = self.parameters.get_mut(next) else {
                continue;
            };
            if parameter.is_dirty() {
                continue;
            }
            parameter.set_dirty(true);
            if parameter.is_input() && parameter.is_self_evaluating() {
                self_evaluating.push(next);
            }
            self.notify(Notification::Dirtied(next));
            trace!("Dirtied \"{}\"", self.parameter_path(next));
            stack.extend(self.downstream_of(next).into_iter().rev());
        }

        for id in self_evaluating {
            if let Err(err) = self.propagate_evaluation(id) {
                error!(
                    "Self-evaluation of \"{}\" aborted: {}",
                    self.parameter_path(id),
                    err
                );
            }
        }
    }

    fn downstream_of(&self, id: ParameterId) -> Vec<ParameterId> {
        let Some(parameter) = self.parameters.get(id) else {
            return Vec::new();
        };
        let mut downstream = Vec::new();
        if parameter.is_output() {
            downstream.extend(
                parameter
                    .connections()
                    .iter()
                    .filter_map(|c| self.connections.get(*c))
                    .filter(|c| c.source() == id)
                    .map(|c| c.target()),
            );
        }
        downstream.extend_from_slice(parameter.affected());
        downstream
    }

    fn upstream_of(&self, id: ParameterId) -> Vec<ParameterId> {
        let Some(parameter) = self.parameters.get(id) else {
            return Vec::new();
        };
        if parameter.is_input() {
            self.sources_of(id)
        } else {
            parameter.affecting().to_vec()
        }
    }

    /// Sources of an input's connections, in connection order.
    fn sources_of(&self, id: ParameterId) -> Vec<ParameterId> {
        self.parameters
            .get(id)
            .map(|p| {
                p.connections()
                    .iter()
                    .filter_map(|c| self.connections.get(*c))
                    .filter(|c| c.target() == id)
                    .map(|c| c.source())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Marks `id` and everything upstream of it aux-dirty.
    ///
    /// Upstream means connection sources of input pins and the affecting
    /// list of any other parameter.
    pub fn propagate_aux_dirty(&mut self, id: ParameterId) {
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            let Some(parameter) = self.parameters.get_mut(next) else {
                continue;
            };
            parameter.set_aux_dirty(true);
            stack.extend(self.upstream_of(next));
        }
    }

    /// Brings `id` up to date.
    ///
    /// Nothing happens unless the parameter is dirty, aux-dirty or
    /// self-evaluating. Upstream parameters are evaluated first. Re-entering
    /// a parameter that is still being evaluated is a cycle and aborts the
    /// evaluation, as does nesting deeper than the configured limit.
    pub fn propagate_evaluation(&mut self, id: ParameterId) -> Result<(), PropagationError> {
        let parameter = self
            .parameters
            .get(id)
            .ok_or(PropagationError::StaleParameter)?;
        if !parameter.is_dirty() && !parameter.is_aux_dirty() && !parameter.is_self_evaluating() {
            return Ok(());
        }

        let limit = self.config.max_evaluation_depth;
        if self.evaluating.len() >= limit {
            return Err(PropagationError::DepthExceeded(limit));
        }
        if !self.evaluating.insert(id) {
            return Err(PropagationError::Cycle(self.parameter_path(id)));
        }
        let result = self.evaluate_in_progress(id);
        self.evaluating.remove(&id);
        result
    }

    fn evaluate_in_progress(&mut self, id: ParameterId) -> Result<(), PropagationError> {
        let Some(parameter) = self.parameters.get(id) else {
            return Err(PropagationError::StaleParameter);
        };

        if parameter.is_input() {
            if parameter.is_dirty() {
                if let Some(p) = self.parameters.get_mut(id) {
                    p.clear_inputs();
                }
            }
            for (index, source) in self.sources_of(id).into_iter().enumerate() {
                self.propagate_evaluation(source)?;
                self.pull_from(id, source, index == 0);
            }
        } else {
            for upstream in parameter.affecting().to_vec() {
                let stale = self
                    .parameters
                    .get(upstream)
                    .is_some_and(|p| p.is_dirty() || p.is_aux_dirty());
                if stale {
                    self.propagate_evaluation(upstream)?;
                }
            }
        }

        let Some(parameter) = self.parameters.get(id) else {
            return Err(PropagationError::StaleParameter);
        };
        let (dirty, aux_dirty) = (parameter.is_dirty(), parameter.is_aux_dirty());
        trace!("Evaluating \"{}\"", self.parameter_path(id));
        if dirty {
            self.run_callback(id, CallbackKind::Processing);
        }
        if aux_dirty {
            self.run_callback(id, CallbackKind::AuxProcessing);
        }
        if let Some(parameter) = self.parameters.get_mut(id) {
            parameter.set_dirty(false);
            parameter.set_aux_dirty(false);
        }
        Ok(())
    }

    /// Copies an evaluated source into a dirty input.
    fn pull_from(&mut self, input: ParameterId, source: ParameterId, first: bool) {
        let Some(values) = self.parameters.get(source).map(|p| p.values()) else {
            return;
        };
        let Some(parameter) = self.parameters.get_mut(input) else {
            return;
        };
        if !parameter.is_dirty() {
            return;
        }
        if let Some(value) = values.first() {
            parameter.push_input(value.clone());
        }
        if first && parameter.write_values(values) {
            self.notify(Notification::ValueChanged(input));
        }
    }
}
