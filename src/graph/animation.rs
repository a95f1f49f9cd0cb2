//! Keyframes on numeric parameters, driven by the current frame.

use log::debug;

use crate::error::ValueError;
use crate::param::Key;

use super::{GraphEditor, ParameterId};

impl GraphEditor {
    /// Adds an animation key to a numeric parameter, replacing any key at
    /// the same time. The parameter immediately takes its animated value for
    /// the current frame.
    pub fn add_key(&mut self, id: ParameterId, key: Key) -> Result<Option<Key>, ValueError> {
        let parameter = self
            .parameters
            .get_mut(id)
            .ok_or(ValueError::UnknownParameter)?;
        if !parameter.ty().is_numeric() {
            return Err(ValueError::NotAnimatable(parameter.ty()));
        }
        let replaced = parameter.keys_mut().insert(key);
        self.animate(id)?;
        Ok(replaced)
    }

    /// Removes the key at `time`. The remaining keys, if any, take over.
    pub fn remove_key(&mut self, id: ParameterId, time: f64) -> Option<Key> {
        let removed = self.parameters.get_mut(id)?.keys_mut().remove(time)?;
        // A value the keys no longer agree on stays as it is.
        let _ = self.animate(id);
        Some(removed)
    }

    /// Drops every key. The parameter keeps its current value.
    pub fn clear_keys(&mut self, id: ParameterId) -> usize {
        match self.parameters.get_mut(id) {
            Some(parameter) => {
                let keys = parameter.keys_mut();
                let count = keys.len();
                keys.clear();
                count
            }
            None => 0,
        }
    }

    /// Writes the animated value for the current frame, dirtying dependents
    /// when it changed. Returns `Ok(false)` for parameters without keys.
    pub fn animate(&mut self, id: ParameterId) -> Result<bool, ValueError> {
        let parameter = self.parameters.get(id).ok_or(ValueError::UnknownParameter)?;
        if !parameter.is_enabled() {
            return Ok(false);
        }
        match parameter.sample(f64::from(self.current_frame)) {
            Some(value) => self.set_value(id, value, true),
            None => Ok(false),
        }
    }

    /// Re-samples every enabled animated parameter. Returns how many changed.
    pub(crate) fn animate_all(&mut self) -> usize {
        let animated: Vec<ParameterId> = self
            .parameters
            .iter()
            .filter(|(_, p)| p.is_animated() && p.is_enabled())
            .map(|(id, _)| id)
            .collect();
        let changed = animated
            .into_iter()
            .filter(|id| self.animate(*id).unwrap_or(false))
            .count();
        debug!("Frame {}: {} animated parameter(s) changed", self.current_frame, changed);
        changed
    }
}
