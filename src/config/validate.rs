//! Attribute validation
//!
//! Checks the raw component attributes before anything is constructed.
//! Every failure is a `Error::Config` naming the offending attribute.

use crate::error::{Error, Result};
use serde_json::Value;

/// Required string attributes, in dependency order
pub const REQUIRED_NAMES: [&str; 4] = ["camera_name", "detector_name", "servo_name", "board_name"];

/// Required non-empty LED pin lists
pub const REQUIRED_PIN_LISTS: [&str; 2] = ["red_leds", "blue_leds"];

/// Structural checks on the raw attributes: required names present,
/// string-typed and non-empty; LED pin lists present, arrays and non-empty.
pub fn validate_attributes(attributes: &Value) -> Result<()> {
    let fields = attributes
        .as_object()
        .ok_or_else(|| Error::Config("attributes must be an object".to_string()))?;

    for key in REQUIRED_NAMES {
        let value = fields
            .get(key)
            .ok_or_else(|| Error::Config(format!("missing required {} attribute", key)))?;
        let name = value
            .as_str()
            .ok_or_else(|| Error::Config(format!("{} must be a string", key)))?;
        if name.is_empty() {
            return Err(Error::Config(format!("{} cannot be empty", key)));
        }
    }

    for key in REQUIRED_PIN_LISTS {
        let value = fields
            .get(key)
            .ok_or_else(|| Error::Config(format!("missing required {} attribute", key)))?;
        let pins = value
            .as_array()
            .ok_or_else(|| Error::Config(format!("{} must be an array", key)))?;
        if pins.is_empty() {
            return Err(Error::Config(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}
