//! LedIndicator - named group of LEDs driven to one state

use crate::error::Result;
use crate::hardware::{Board, DigitalOutput};
use std::fmt;
use std::sync::Arc;

/// LED group (e.g. "red", "blue")
#[derive(Clone)]
pub struct LedIndicator {
    label: String,
    pins: Vec<Arc<dyn DigitalOutput>>,
}

impl LedIndicator {
    pub fn new(label: impl Into<String>, pins: Vec<Arc<dyn DigitalOutput>>) -> Self {
        Self {
            label: label.into(),
            pins,
        }
    }

    /// Resolve every pin name on `board` into a group
    pub async fn resolve(board: &dyn Board, label: &str, pin_names: &[String]) -> Result<Self> {
        let mut pins = Vec::with_capacity(pin_names.len());
        for name in pin_names {
            pins.push(board.gpio_pin_by_name(name).await?);
        }

        tracing::debug!(group = %label, pins = ?pin_names, "LED group resolved");

        Ok(Self::new(label, pins))
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Set every pin in the group, in order.
    ///
    /// Stops at the first failing pin; pins before it keep the new value.
    pub async fn set_state(&self, on: bool) -> Result<()> {
        for pin in &self.pins {
            if let Err(e) = pin.set(on).await {
                tracing::warn!(
                    group = %self.label,
                    pin = %pin.pin_name(),
                    on,
                    error = %e,
                    "LED write failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for LedIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pins: Vec<&str> = self.pins.iter().map(|p| p.pin_name()).collect();
        f.debug_struct("LedIndicator")
            .field("label", &self.label)
            .field("pins", &pins)
            .finish()
    }
}
