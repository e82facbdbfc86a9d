//! Running statistics for a fixed-width numeric series type.

use crate::types::NativeType;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveStatistics<T: NativeType> {
    pub count: u64,
    pub min_value: Option<T>,
    pub max_value: Option<T>,
    pub first_value: Option<T>,
    pub last_value: Option<T>,
    pub sum: f64,
}

impl<T: NativeType> Default for PrimitiveStatistics<T> {
    fn default() -> Self {
        Self {
            count: 0,
            min_value: None,
            max_value: None,
            first_value: None,
            last_value: None,
            sum: 0.0,
        }
    }
}

impl<T: NativeType> PrimitiveStatistics<T> {
    pub fn update(&mut self, value: T) {
        if self.first_value.is_none() {
            self.first_value = Some(value);
        }
        self.last_value = Some(value);
        self.min_value = Some(match self.min_value {
            None => value,
            Some(current) if value < current => value,
            Some(current) => current,
        });
        self.max_value = Some(match self.max_value {
            None => value,
            Some(current) if value > current => value,
            Some(current) => current,
        });
        self.sum += value.as_f64();
        self.count += 1;
    }

    /// Merges statistics of a chronologically *later* page/chunk into
    /// `self`; `self`'s `first_value` wins, `other`'s `last_value` wins.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        self.last_value = other.last_value;
        self.min_value = match (self.min_value, other.min_value) {
            (Some(a), Some(b)) => Some(if a < b { a } else { b }),
            (a, None) => a,
            (None, b) => b,
        };
        self.max_value = match (self.max_value, other.max_value) {
            (Some(a), Some(b)) => Some(if a > b { a } else { b }),
            (a, None) => a,
            (None, b) => b,
        };
        self.sum += other.sum;
        self.count += other.count;
    }
}
