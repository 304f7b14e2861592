//! Guardian Control Library
//!
//! Detect living creatures in front of the robot, raise an alert and keep the
//! camera servo pointed at them; scan idly otherwise.
//!
//! ## Architecture (9 Components)
//!
//! 1. Detection - living-creature classification of detector output
//! 2. TrackingController - servo angle correction with a central dead zone
//! 3. LedIndicator - red/blue LED groups on board GPIO pins
//! 4. AlertSignal - alert sound start/stop
//! 5. Hardware - collaborator traits, dependency registry, robot gateway client
//! 6. GuardianConfig - attribute validation and tuning
//! 7. GuardianLoop - Idle/Alert state machine, toggle and command dispatch
//! 8. TickScheduler - periodic tick driver
//! 9. WebAPI - REST command and status endpoints

pub mod alert_signal;
pub mod config;
pub mod detection;
pub mod error;
pub mod guardian_loop;
pub mod hardware;
pub mod led_indicator;
pub mod models;
pub mod state;
pub mod tick_scheduler;
pub mod tracking;
pub mod web_api;

pub use error::{Error, Result};
