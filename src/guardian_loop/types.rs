//! GuardianLoop type definitions

use crate::detection::Detection;
use serde::{Deserialize, Serialize};

/// Current mode of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardianState {
    /// Scanning, blue LEDs on
    #[default]
    Idle,
    /// Tracking a living creature, red LEDs on, alert sounding
    Alert,
}

impl GuardianState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardianState::Idle => "idle",
            GuardianState::Alert => "alert",
        }
    }
}

/// External control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardianCommand {
    /// Toggle the running flag
    StartStop,
    /// Run one tick of the loop
    #[serde(alias = "logic_loop")]
    AdvanceTick,
}

/// Status mapping returned for every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub running: bool,
    pub state: GuardianState,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutcome {
    pub running: bool,
    pub state: GuardianState,
    /// Living creature selected this tick
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creature: Option<Detection>,
    /// Angle commanded to the servo this tick (tracking or idle scan)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servo_target: Option<u32>,
}

/// Snapshot of the loop for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct GuardianStatus {
    pub running: bool,
    pub state: GuardianState,
    pub camera_name: String,
    pub frame_width: u32,
    pub red_leds: usize,
    pub blue_leds: usize,
}
