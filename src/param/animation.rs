//! Keyframe animation for numeric parameters.
//!
//! An animated parameter takes its value from its keys whenever the editor's
//! current frame moves. Between two keys the earlier key's interpolation
//! shapes the curve; before the first key and after the last one the nearest
//! key holds.

use serde::{Deserialize, Serialize};

use super::{ParameterType, Value};

/// How the curve runs from a key to the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// Holds the key's value until the next key.
    Step,
    /// Blends linearly towards the next key.
    #[default]
    Linear,
}

/// A value pinned to a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub time: f64,
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Key {
    /// A linearly interpolated key.
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::Linear,
        }
    }

    /// A key that holds its value until the next one.
    pub fn step(time: f64, value: f64) -> Self {
        Self {
            interpolation: Interpolation::Step,
            ..Self::new(time, value)
        }
    }
}

/// Keys ordered by time, at most one per time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyList {
    keys: Vec<Key>,
}

impl KeyList {
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts a key, handing back the one it replaced at the same time.
    pub fn insert(&mut self, key: Key) -> Option<Key> {
        match self.position(key.time) {
            Ok(index) => Some(std::mem::replace(&mut self.keys[index], key)),
            Err(index) => {
                self.keys.insert(index, key);
                None
            }
        }
    }

    /// Removes the key at `time`.
    pub fn remove(&mut self, time: f64) -> Option<Key> {
        let index = self.position(time).ok()?;
        Some(self.keys.remove(index))
    }

    pub fn get(&self, time: f64) -> Option<&Key> {
        self.position(time).ok().map(|index| &self.keys[index])
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Time of the last key.
    pub fn last_time(&self) -> Option<f64> {
        self.keys.last().map(|k| k.time)
    }

    fn position(&self, time: f64) -> Result<usize, usize> {
        self.keys.binary_search_by(|k| k.time.total_cmp(&time))
    }

    /// The curve's value at `time`, or `None` without keys.
    pub fn sample(&self, time: f64) -> Option<f64> {
        let next = self.keys.partition_point(|k| k.time <= time);
        let before = next.checked_sub(1).and_then(|i| self.keys.get(i));
        match (before, self.keys.get(next)) {
            (Some(before), Some(after)) => Some(match before.interpolation {
                Interpolation::Step => before.value,
                Interpolation::Linear => {
                    let t = (time - before.time) / (after.time - before.time);
                    before.value + (after.value - before.value) * t
                }
            }),
            (Some(key), None) | (None, Some(key)) => Some(key.value),
            (None, None) => None,
        }
    }
}

/// Converts a sampled number into a value of `ty`. Integers are rounded.
pub fn keyed_value(ty: ParameterType, value: f64) -> Option<Value> {
    match ty {
        ParameterType::Float => Some(Value::Float(value)),
        ParameterType::Int => Some(Value::Int(value.round() as i32)),
        ParameterType::UnsignedInt => Some(Value::UnsignedInt(value.max(0.0).round() as u32)),
        _ => None,
    }
}
