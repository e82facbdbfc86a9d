//! Running statistics for `TEXT`/`BLOB`/`STRING` series.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinaryStatistics {
    pub count: u64,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
    pub first_value: Option<Vec<u8>>,
    pub last_value: Option<Vec<u8>>,
}

impl BinaryStatistics {
    pub fn update(&mut self, value: &[u8]) {
        if self.first_value.is_none() {
            self.first_value = Some(value.to_vec());
        }
        self.last_value = Some(value.to_vec());
        if self.min_value.as_deref().map_or(true, |m| value < m) {
            self.min_value = Some(value.to_vec());
        }
        if self.max_value.as_deref().map_or(true, |m| value > m) {
            self.max_value = Some(value.to_vec());
        }
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        self.last_value = other.last_value.clone();
        if let Some(other_min) = &other.min_value {
            if self.min_value.as_deref().map_or(true, |m| other_min.as_slice() < m) {
                self.min_value = Some(other_min.clone());
            }
        }
        if let Some(other_max) = &other.max_value {
            if self.max_value.as_deref().map_or(true, |m| other_max.as_slice() > m) {
                self.max_value = Some(other_max.clone());
            }
        }
        self.count += other.count;
    }
}
