//! Detection - living creature classification
//!
//! ## Responsibilities
//!
//! - Detection model shared by the detector adapters and the loop
//! - "First living object wins" selection over the detector's ordering

mod types;

pub use types::*;

/// Picks the living creature for this tick.
///
/// Returns the first detection, in the order the detector returned them,
/// whose confidence is strictly above `threshold` and whose label is in
/// `living`. Later detections are never preferred, even with a higher
/// confidence or a larger box.
pub fn find_living_creature<'a>(
    detections: &'a [Detection],
    living: &LivingClassSet,
    threshold: f64,
) -> Option<&'a Detection> {
    detections
        .iter()
        .find(|d| d.confidence > threshold && living.contains(&d.class_name))
}
