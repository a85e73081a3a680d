//! Per-tick feature records and the in-memory log that buffers them

use serde::{Deserialize, Serialize};

use crate::error::CoachError;
use crate::game::{Direction, Position};

use super::dataset::Dataset;

/// Number of numeric inputs the classifier sees
pub const NUM_FEATURES: usize = 6;

/// `[head_x, head_y, xdirection, ydirection, food_x, food_y]`
pub type FeatureVector = [f32; NUM_FEATURES];

/// Build the classifier input for a head position, heading, and food position
pub fn feature_vector(head: Position, direction: Direction, food: Position) -> FeatureVector {
    let (dx, dy) = direction.delta();
    [
        head.x as f32,
        head.y as f32,
        dx as f32,
        dy as f32,
        food.x as f32,
        food.y as f32,
    ]
}

/// One simulated tick as stored in the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub head_x: i32,
    pub head_y: i32,
    pub xdirection: i32,
    pub ydirection: i32,
    pub food_x: i32,
    pub food_y: i32,
    /// 1 if this tick ended the game, else 0
    pub collision: u8,
}

impl FeatureRecord {
    pub const HEADER: &'static str = "head_x,head_y,xdirection,ydirection,food_x,food_y,collision";

    pub fn new(head: Position, direction: Direction, food: Position, collision: bool) -> Self {
        let (xdirection, ydirection) = direction.delta();
        Self {
            head_x: head.x,
            head_y: head.y,
            xdirection,
            ydirection,
            food_x: food.x,
            food_y: food.y,
            collision: collision as u8,
        }
    }

    pub fn is_collision(&self) -> bool {
        self.collision == 1
    }

    pub fn features(&self) -> FeatureVector {
        [
            self.head_x as f32,
            self.head_y as f32,
            self.xdirection as f32,
            self.ydirection as f32,
            self.food_x as f32,
            self.food_y as f32,
        ]
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.head_x,
            self.head_y,
            self.xdirection,
            self.ydirection,
            self.food_x,
            self.food_y,
            self.collision
        )
    }

    /// Parse one data row; `line` is only used for the error message
    pub fn parse_csv_row(row: &str, line: usize) -> Result<Self, CoachError> {
        let fields: Vec<&str> = row.trim().split(',').map(str::trim).collect();
        if fields.len() != 7 {
            return Err(CoachError::InputValidation {
                line,
                reason: format!("expected 7 fields, found {}", fields.len()),
            });
        }

        let mut values = [0i32; 7];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = parse_number(field).ok_or_else(|| CoachError::InputValidation {
                line,
                reason: format!("{field:?} is not an integer"),
            })?;
        }

        let collision = match values[6] {
            0 => 0,
            1 => 1,
            other => {
                return Err(CoachError::InputValidation {
                    line,
                    reason: format!("collision label must be 0 or 1, found {other}"),
                });
            }
        };

        Ok(Self {
            head_x: values[0],
            head_y: values[1],
            xdirection: values[2],
            ydirection: values[3],
            food_x: values[4],
            food_y: values[5],
            collision,
        })
    }
}

// Accepts "12" as well as "12.0", which spreadsheet round-trips tend to produce.
fn parse_number(field: &str) -> Option<i32> {
    if let Ok(v) = field.parse::<i32>() {
        return Some(v);
    }
    let v = field.parse::<f64>().ok()?;
    (v.fract() == 0.0 && v.abs() <= i32::MAX as f64).then_some(v as i32)
}

/// Per-feature z-score standardization fitted on the training split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: FeatureVector,
    pub std: FeatureVector,
}

impl FeatureScaler {
    /// Fit on a set of rows. Constant columns keep a unit scale.
    pub fn fit(rows: &[FeatureVector]) -> Self {
        let n = rows.len().max(1) as f32;
        let mut mean = [0.0; NUM_FEATURES];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }

        let mut std = [0.0; NUM_FEATURES];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in std.iter_mut() {
            *s = s.sqrt();
            if *s < 1e-6 {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; NUM_FEATURES];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (row[i] - self.mean[i]) / self.std[i];
        }
        out
    }
}

impl Default for FeatureScaler {
    fn default() -> Self {
        Self {
            mean: [0.0; NUM_FEATURES],
            std: [1.0; NUM_FEATURES],
        }
    }
}

/// Records gathered during this process, waiting to be appended to the dataset
#[derive(Debug, Default)]
pub struct FeatureLog {
    pending: Vec<FeatureRecord>,
}

impl FeatureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FeatureRecord) {
        self.pending.push(record);
    }

    pub fn pending(&self) -> &[FeatureRecord] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Append all pending records to the dataset and clear the buffer.
    ///
    /// Returns the number of rows written. The buffer is kept on failure so a
    /// later attempt can retry.
    pub fn flush_to(&mut self, dataset: &Dataset) -> Result<usize, CoachError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        dataset.append(&self.pending)?;
        let written = self.pending.len();
        self.pending.clear();
        Ok(written)
    }
}
