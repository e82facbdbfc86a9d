//! `Tablet`: a batch of rows for one device, sharing a single timestamp
//! column across one or more value columns. Used to feed an
//! `AlignedChunkWriter` without requiring callers to interleave
//! timestamp/value calls by hand.

use crate::error::{out_of_spec_err, Result};
use crate::schema::MeasurementSchema;
use crate::types::Value;

/// One column of a `Tablet`: the schema it belongs to and one `Value` per
/// row (using `Value::Null` for an absent measurement at that row).
#[derive(Debug, Clone, PartialEq)]
pub struct TabletColumn {
    pub schema: MeasurementSchema,
    pub values: Vec<Value>,
}

/// A row-major-friendly batch: one shared timestamp column plus one value
/// column per measurement, all holding the same row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Tablet {
    pub timestamps: Vec<i64>,
    pub columns: Vec<TabletColumn>,
}

impl Tablet {
    pub fn new(timestamps: Vec<i64>, columns: Vec<TabletColumn>) -> Result<Self> {
        let row_count = timestamps.len();
        for column in &columns {
            if column.values.len() != row_count {
                return Err(out_of_spec_err!(
                    "tablet column '{}' has {} values, expected {} (matching the timestamp column)",
                    column.schema.measurement_id,
                    column.values.len(),
                    row_count
                ));
            }
        }
        Ok(Self { timestamps, columns })
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns the sub-tablet covering rows `row_start..row_end` and
    /// columns `col_start..col_end` — backs the windowed
    /// `write(tablet, startRow, endRow, startCol, endCol)` operation.
    pub fn slice(&self, row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Tablet {
        let timestamps = self.timestamps[row_start..row_end].to_vec();
        let columns = self.columns[col_start..col_end]
            .iter()
            .map(|column| TabletColumn {
                schema: column.schema.clone(),
                values: column.values[row_start..row_end].to_vec(),
            })
            .collect();
        Tablet { timestamps, columns }
    }

    /// Splits this tablet into two at row `r`: rows `[0, r)` and `[r,
    /// row_count)`. Used by the aligned column-batch splitting algorithm to
    /// cut a batch at the row where a page would otherwise cross its
    /// threshold.
    pub fn split_at(&self, r: usize) -> (Tablet, Tablet) {
        let left_timestamps = self.timestamps[..r].to_vec();
        let right_timestamps = self.timestamps[r..].to_vec();
        let mut left_columns = Vec::with_capacity(self.columns.len());
        let mut right_columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            left_columns.push(TabletColumn {
                schema: column.schema.clone(),
                values: column.values[..r].to_vec(),
            });
            right_columns.push(TabletColumn {
                schema: column.schema.clone(),
                values: column.values[r..].to_vec(),
            });
        }
        (
            Tablet {
                timestamps: left_timestamps,
                columns: left_columns,
            },
            Tablet {
                timestamps: right_timestamps,
                columns: right_columns,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use crate::encoding::EncodingKind;
    use crate::types::DataType;

    fn schema(name: &str) -> MeasurementSchema {
        MeasurementSchema::new(name, DataType::Int64, EncodingKind::Ts2Diff, Compression::Uncompressed)
    }

    #[test]
    fn rejects_mismatched_column_length() {
        let result = Tablet::new(
            vec![1, 2, 3],
            vec![TabletColumn {
                schema: schema("s1"),
                values: vec![Value::I64(1), Value::I64(2)],
            }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn split_preserves_row_count() {
        let tablet = Tablet::new(
            vec![1, 2, 3, 4],
            vec![TabletColumn {
                schema: schema("s1"),
                values: vec![Value::I64(10), Value::I64(20), Value::I64(30), Value::I64(40)],
            }],
        )
        .unwrap();
        let (left, right) = tablet.split_at(2);
        assert_eq!(left.row_count(), 2);
        assert_eq!(right.row_count(), 2);
        assert_eq!(left.timestamps, vec![1, 2]);
        assert_eq!(right.timestamps, vec![3, 4]);
        assert_eq!(left.columns[0].values, vec![Value::I64(10), Value::I64(20)]);
    }

    #[test]
    fn slice_selects_row_and_column_window() {
        let tablet = Tablet::new(
            (0..10).collect(),
            vec![
                TabletColumn {
                    schema: schema("c0"),
                    values: (0..10).map(Value::I64).collect(),
                },
                TabletColumn {
                    schema: schema("c1"),
                    values: (100..110).map(Value::I64).collect(),
                },
                TabletColumn {
                    schema: schema("c2"),
                    values: (200..210).map(Value::I64).collect(),
                },
                TabletColumn {
                    schema: schema("c3"),
                    values: (300..310).map(Value::I64).collect(),
                },
            ],
        )
        .unwrap();
        let window = tablet.slice(2, 5, 1, 3);
        assert_eq!(window.row_count(), 3);
        assert_eq!(window.columns.len(), 2);
        assert_eq!(window.columns[0].schema.measurement_id, "c1");
        assert_eq!(window.columns[0].values, vec![Value::I64(102), Value::I64(103), Value::I64(104)]);
        assert_eq!(window.columns[1].schema.measurement_id, "c2");
    }
}
