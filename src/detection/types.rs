//! Detection type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Labels treated as living creatures unless overridden by configuration
pub const DEFAULT_LIVING_CLASSES: [&str; 4] = ["Person", "Dog", "Cat", "Teddy bear"];

/// Minimum confidence (exclusive) for a detection to count
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// One object reported by the detector for the current frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    /// 0.0-1.0
    pub confidence: f64,
    /// Left edge in frame pixels
    pub x_min: f64,
    /// Right edge in frame pixels
    pub x_max: f64,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f64, x_min: f64, x_max: f64) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            x_min,
            x_max,
        }
    }

    /// Horizontal centre of the bounding box
    pub fn midpoint(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }
}

/// Fixed set of class labels considered alive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivingClassSet {
    labels: HashSet<String>,
}

impl LivingClassSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive label match
    pub fn contains(&self, class_name: &str) -> bool {
        self.labels.contains(class_name)
    }
}

impl Default for LivingClassSet {
    fn default() -> Self {
        Self::new(DEFAULT_LIVING_CLASSES)
    }
}
