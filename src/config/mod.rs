//! GuardianConfig - validated component configuration
//!
//! ## Responsibilities
//!
//! - Validate raw attributes (names, LED pin lists) before construction
//! - Normalise LED pin identifiers
//! - Tuning parameters with defaults matching the stock guardian behaviour

mod validate;

pub use validate::{validate_attributes, REQUIRED_NAMES, REQUIRED_PIN_LISTS};

use crate::detection::{LivingClassSet, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LIVING_CLASSES};
use crate::error::{Error, Result};
use crate::tracking::{TrackingController, DEFAULT_ANGULAR_SCALE, DEFAULT_DEAD_ZONE_RATIO};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chance per idle tick of a random servo move
pub const DEFAULT_SCAN_PROBABILITY: f64 = 0.10;

/// GPIO pin identifier as written in the attributes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PinId {
    Number(f64),
    Name(String),
}

impl PinId {
    /// Numbers become their integer string form (22.0 -> "22")
    fn normalize(self, key: &str) -> Result<String> {
        match self {
            PinId::Number(n) if n.is_finite() && n >= 0.0 => Ok((n.trunc() as u64).to_string()),
            PinId::Number(n) => Err(Error::Config(format!("{} contains invalid pin {}", key, n))),
            PinId::Name(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            PinId::Name(_) => Err(Error::Config(format!("{} contains an empty pin name", key))),
        }
    }
}

/// Attribute layout after the structural checks passed
#[derive(Debug, Deserialize)]
struct RawAttributes {
    camera_name: String,
    detector_name: String,
    servo_name: String,
    board_name: String,
    red_leds: Vec<PinId>,
    blue_leds: Vec<PinId>,
    #[serde(default)]
    confidence_threshold: Option<f64>,
    #[serde(default)]
    living_classes: Option<Vec<String>>,
    #[serde(default)]
    angular_scale: Option<f64>,
    #[serde(default)]
    dead_zone_ratio: Option<f64>,
    #[serde(default)]
    scan_probability: Option<f64>,
    #[serde(default)]
    scan_seed: Option<u64>,
}

/// Guardian component configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardianConfig {
    pub camera_name: String,
    pub detector_name: String,
    pub servo_name: String,
    pub board_name: String,
    pub red_leds: Vec<String>,
    pub blue_leds: Vec<String>,
    /// Exclusive lower bound on detection confidence
    pub confidence_threshold: f64,
    pub living_classes: Vec<String>,
    pub angular_scale: f64,
    pub dead_zone_ratio: f64,
    pub scan_probability: f64,
    /// Fixed seed for idle scanning (None = OS entropy)
    pub scan_seed: Option<u64>,
}

impl GuardianConfig {
    /// Validate and parse component attributes
    pub fn from_attributes(attributes: &Value) -> Result<Self> {
        validate_attributes(attributes)?;

        let raw: RawAttributes = serde_json::from_value(attributes.clone())
            .map_err(|e| Error::Config(format!("invalid attributes: {}", e)))?;

        let red_leds = normalize_pins("red_leds", raw.red_leds)?;
        let blue_leds = normalize_pins("blue_leds", raw.blue_leds)?;

        let config = Self {
            camera_name: raw.camera_name,
            detector_name: raw.detector_name,
            servo_name: raw.servo_name,
            board_name: raw.board_name,
            red_leds,
            blue_leds,
            confidence_threshold: raw
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            living_classes: raw.living_classes.unwrap_or_else(|| {
                DEFAULT_LIVING_CLASSES.iter().map(|c| c.to_string()).collect()
            }),
            angular_scale: raw.angular_scale.unwrap_or(DEFAULT_ANGULAR_SCALE),
            dead_zone_ratio: raw.dead_zone_ratio.unwrap_or(DEFAULT_DEAD_ZONE_RATIO),
            scan_probability: raw.scan_probability.unwrap_or(DEFAULT_SCAN_PROBABILITY),
            scan_seed: raw.scan_seed,
        };

        config.check_tuning()?;
        Ok(config)
    }

    fn check_tuning(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(
                "confidence_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.living_classes.is_empty() {
            return Err(Error::Config("living_classes cannot be empty".to_string()));
        }
        if !(self.angular_scale.is_finite() && self.angular_scale > 0.0) {
            return Err(Error::Config("angular_scale must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.dead_zone_ratio) {
            return Err(Error::Config(
                "dead_zone_ratio must be within [0, 1)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scan_probability) {
            return Err(Error::Config(
                "scan_probability must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn living_class_set(&self) -> LivingClassSet {
        LivingClassSet::new(self.living_classes.iter().cloned())
    }

    pub fn tracking_controller(&self) -> TrackingController {
        TrackingController::new(self.angular_scale, self.dead_zone_ratio)
    }
}

fn normalize_pins(key: &str, pins: Vec<PinId>) -> Result<Vec<String>> {
    pins.into_iter().map(|p| p.normalize(key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes() -> Value {
        json!({
            "camera_name": "cam",
            "detector_name": "detector",
            "servo_name": "servo",
            "board_name": "local",
            "red_leds": [22, 24, 26],
            "blue_leds": [11.0, "13", 15]
        })
    }

    #[test]
    fn test_defaults_applied() {
        let config = GuardianConfig::from_attributes(&attributes()).unwrap();
        assert_eq!(config.camera_name, "cam");
        assert_eq!(config.red_leds, vec!["22", "24", "26"]);
        assert_eq!(config.blue_leds, vec!["11", "13", "15"]);
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.angular_scale, 20.0);
        assert_eq!(config.dead_zone_ratio, 0.2);
        assert_eq!(config.scan_probability, 0.10);
        assert_eq!(config.scan_seed, None);
        let living = config.living_class_set();
        assert!(DEFAULT_LIVING_CLASSES.iter().all(|c| living.contains(c)));
    }

    #[test]
    fn test_tuning_overrides() {
        let mut attrs = attributes();
        attrs["living_classes"] = json!(["Bird"]);
        attrs["scan_probability"] = json!(0.0);
        attrs["scan_seed"] = json!(7);
        let config = GuardianConfig::from_attributes(&attrs).unwrap();
        assert!(config.living_class_set().contains("Bird"));
        assert!(!config.living_class_set().contains("Dog"));
        assert_eq!(config.scan_probability, 0.0);
        assert_eq!(config.scan_seed, Some(7));
    }

    #[test]
    fn test_structural_errors_come_first() {
        let mut attrs = attributes();
        attrs["camera_name"] = json!("");
        let err = GuardianConfig::from_attributes(&attrs).unwrap_err();
        assert_eq!(err.to_string(), "Config error: camera_name cannot be empty");
    }

    #[test]
    fn test_invalid_pin_entries() {
        let mut attrs = attributes();
        attrs["red_leds"] = json!([22, true]);
        assert!(matches!(
            GuardianConfig::from_attributes(&attrs),
            Err(Error::Config(_))
        ));

        let mut attrs = attributes();
        attrs["red_leds"] = json!([-1]);
        assert!(matches!(
            GuardianConfig::from_attributes(&attrs),
            Err(Error::Config(_))
        ));

        let mut attrs = attributes();
        attrs["blue_leds"] = json!([" "]);
        assert!(matches!(
            GuardianConfig::from_attributes(&attrs),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_tuning_ranges() {
        for (key, value) in [
            ("confidence_threshold", json!(1.5)),
            ("angular_scale", json!(0)),
            ("dead_zone_ratio", json!(1.0)),
            ("scan_probability", json!(-0.1)),
            ("living_classes", json!([])),
        ] {
            let mut attrs = attributes();
            attrs[key] = value;
            assert!(
                matches!(GuardianConfig::from_attributes(&attrs), Err(Error::Config(_))),
                "{} should be rejected",
                key
            );
        }
    }
}
