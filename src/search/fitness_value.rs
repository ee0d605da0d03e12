//! Sparse fitness vector of one evaluated individual

use std::collections::HashMap;

/// Identifier of a coverage target. Targets reported by the instrumentation
/// are positive, targets synthesized during evaluation are negative.
pub type TargetId = i32;

/// Value of a fully covered target
pub const MAX_VALUE: f64 = 1.0;

pub const MIN_VALUE: f64 = 0.0;

/// Type alias for fitness value operation results
pub type FitnessResult<T> = Result<T, FitnessError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitnessError {
    #[error("Invalid value {value} for target {target}: must lie in [0, 1]")]
    InvalidValue { target: TargetId, value: f64 },
}

/// Size of the individual plus a sparse mapping from target to a value in
/// `[0, 1]`. Entries are inserted or overwritten, never removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitnessValue {
    size: f64,
    targets: HashMap<TargetId, f64>,
}

impl FitnessValue {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            targets: HashMap::new(),
        }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Insert or overwrite the value of a target
    pub fn update_target(&mut self, target: TargetId, value: f64) -> FitnessResult<()> {
        if value.is_nan() || !(MIN_VALUE..=MAX_VALUE).contains(&value) {
            return Err(FitnessError::InvalidValue { target, value });
        }
        self.targets.insert(target, value);
        Ok(())
    }

    pub fn cover_target(&mut self, target: TargetId) {
        self.targets.insert(target, MAX_VALUE);
    }

    /// Value of a target, or `None` if this evaluation never reached it
    pub fn value_of(&self, target: TargetId) -> Option<f64> {
        self.targets.get(&target).copied()
    }

    pub fn does_cover(&self, target: TargetId) -> bool {
        self.value_of(target) == Some(MAX_VALUE)
    }

    /// Target ids with a value, sorted
    pub fn targets(&self) -> Vec<TargetId> {
        let mut ids: Vec<TargetId> = self.targets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn number_of_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn covered_targets(&self) -> usize {
        self.targets.values().filter(|v| **v == MAX_VALUE).count()
    }

    /// Sum of all target values
    pub fn compute_fitness_score(&self) -> f64 {
        self.targets.values().sum()
    }

    /// Keep, per target, the better of this value and `other`'s
    pub fn merge_max(&mut self, other: &FitnessValue) {
        for (target, value) in &other.targets {
            let current = self.targets.entry(*target).or_insert(*value);
            if *value > *current {
                *current = *value;
            }
        }
    }
}
