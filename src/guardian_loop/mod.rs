//! GuardianLoop - detection/reaction state machine
//!
//! ## Responsibilities
//!
//! - Idle/Alert state machine driven one tick at a time by an external scheduler
//! - LED, alert and servo side effects for each state
//! - Start/stop toggle and the command dispatch for the control surface
//!
//! ## Design
//!
//! - All collaborators, LED groups and the frame width are resolved once in
//!   `initialize` (and again in `reconfigure`); ticks never re-resolve them
//! - `tick` takes `&mut self`: callers serialise ticks and toggles
//! - Hardware errors propagate out of `tick`; the loop keeps no retry state

mod types;

pub use types::*;

use crate::alert_signal::AlertSignal;
use crate::config::GuardianConfig;
use crate::detection::{find_living_creature, Detection, LivingClassSet};
use crate::error::{Error, Result};
use crate::hardware::{Dependencies, Detector, ServoDevice};
use crate::led_indicator::LedIndicator;
use crate::tracking::{TrackingController, SERVO_MAX_ANGLE, SERVO_MIN_ANGLE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Collaborators resolved for one configuration
struct GuardianHandles {
    camera_name: String,
    detector: Arc<dyn Detector>,
    servo: Arc<dyn ServoDevice>,
    red_leds: LedIndicator,
    blue_leds: LedIndicator,
    /// Cached once per configuration
    frame_width: u32,
}

impl GuardianHandles {
    async fn resolve(config: &GuardianConfig, deps: &Dependencies) -> Result<Self> {
        let camera = deps.camera(&config.camera_name)?;
        let detector = deps.detector(&config.detector_name)?;
        let servo = deps.servo(&config.servo_name)?;
        let board = deps.board(&config.board_name)?;

        let red_leds = LedIndicator::resolve(board.as_ref(), "red", &config.red_leds).await?;
        let blue_leds = LedIndicator::resolve(board.as_ref(), "blue", &config.blue_leds).await?;

        let frame = camera.get_frame().await?;
        if frame.width == 0 {
            return Err(Error::hardware(
                format!("camera {}", config.camera_name),
                "frame width is zero",
            ));
        }

        tracing::info!(
            camera = %config.camera_name,
            detector = %config.detector_name,
            servo = %config.servo_name,
            board = %config.board_name,
            frame_width = frame.width,
            "Guardian handles resolved"
        );

        Ok(Self {
            camera_name: config.camera_name.clone(),
            detector,
            servo,
            red_leds,
            blue_leds,
            frame_width: frame.width,
        })
    }
}

/// Decision parameters taken from the configuration
struct GuardianPolicy {
    living: LivingClassSet,
    confidence_threshold: f64,
    tracking: TrackingController,
    scan_probability: f64,
}

impl GuardianPolicy {
    fn from_config(config: &GuardianConfig) -> Self {
        Self {
            living: config.living_class_set(),
            confidence_threshold: config.confidence_threshold,
            tracking: config.tracking_controller(),
            scan_probability: config.scan_probability,
        }
    }
}

/// Guardian behaviour loop
pub struct GuardianLoop {
    handles: GuardianHandles,
    policy: GuardianPolicy,
    alert: AlertSignal,
    rng: StdRng,
    state: GuardianState,
    running: bool,
    /// Outputs still need silencing while stopped
    cleanup_pending: bool,
}

impl GuardianLoop {
    /// Resolve collaborators and cache the frame width.
    ///
    /// The loop starts stopped, in `Idle`.
    pub async fn initialize(
        config: &GuardianConfig,
        deps: &Dependencies,
        alert: AlertSignal,
    ) -> Result<Self> {
        let handles = GuardianHandles::resolve(config, deps).await?;
        let rng = match config.scan_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            handles,
            policy: GuardianPolicy::from_config(config),
            alert,
            rng,
            state: GuardianState::Idle,
            running: false,
            cleanup_pending: true,
        })
    }

    /// Swap in a new configuration; running flag and state are kept.
    ///
    /// On error the previous handles stay in place.
    pub async fn reconfigure(&mut self, config: &GuardianConfig, deps: &Dependencies) -> Result<()> {
        let handles = GuardianHandles::resolve(config, deps).await?;
        self.handles = handles;
        self.policy = GuardianPolicy::from_config(config);
        if let Some(seed) = config.scan_seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        tracing::info!(running = self.running, state = %self.state.as_str(), "Guardian reconfigured");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> GuardianState {
        self.state
    }

    pub fn frame_width(&self) -> u32 {
        self.handles.frame_width
    }

    pub fn status(&self) -> GuardianStatus {
        GuardianStatus {
            running: self.running,
            state: self.state,
            camera_name: self.handles.camera_name.clone(),
            frame_width: self.handles.frame_width,
            red_leds: self.handles.red_leds.pin_count(),
            blue_leds: self.handles.blue_leds.pin_count(),
        }
    }

    /// Flip the running flag and return its new value.
    ///
    /// Starting turns the blue LEDs on; stopping silences the alert and turns
    /// both LED groups off. The flag only changes once the side effects
    /// succeeded.
    pub async fn toggle(&mut self) -> Result<bool> {
        if self.running {
            tracing::info!("Stopping guardian loop");
            self.silence().await?;
            self.running = false;
            self.state = GuardianState::Idle;
            self.cleanup_pending = false;
        } else {
            tracing::info!("Starting guardian loop");
            self.handles.blue_leds.set_state(true).await?;
            self.running = true;
        }
        Ok(self.running)
    }

    /// One pass of the detection/reaction logic
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        if !self.running {
            if self.cleanup_pending {
                self.silence().await?;
                self.cleanup_pending = false;
            }
            return Ok(self.outcome(None, None));
        }

        let detections = self
            .handles
            .detector
            .get_detections(&self.handles.camera_name)
            .await?;

        let creature = find_living_creature(
            &detections,
            &self.policy.living,
            self.policy.confidence_threshold,
        )
        .cloned();

        match creature {
            Some(creature) => {
                let servo_target = self.enter_alert(&creature).await?;
                Ok(self.outcome(Some(creature), servo_target))
            }
            None => {
                let servo_target = self.enter_idle().await?;
                Ok(self.outcome(None, servo_target))
            }
        }
    }

    /// Dispatch an external command
    pub async fn handle_command(&mut self, command: GuardianCommand) -> Result<CommandResponse> {
        match command {
            GuardianCommand::StartStop => {
                self.toggle().await?;
            }
            GuardianCommand::AdvanceTick => {
                self.tick().await?;
            }
        }

        Ok(CommandResponse {
            running: self.running,
            state: self.state,
        })
    }

    async fn enter_alert(&mut self, creature: &Detection) -> Result<Option<u32>> {
        self.transition(GuardianState::Alert, Some(creature));

        self.handles.blue_leds.set_state(false).await?;
        self.handles.red_leds.set_state(true).await?;
        self.alert.start().await?;

        let current = self.handles.servo.get_angle().await?;
        let target = self.policy.tracking.compute_angle_delta(
            creature,
            self.handles.frame_width,
            current,
        );

        if let Some(angle) = target {
            tracing::debug!(
                class_name = %creature.class_name,
                from = current,
                to = angle,
                "Focusing on creature"
            );
            self.handles.servo.set_angle(angle).await?;
        }

        Ok(target)
    }

    async fn enter_idle(&mut self) -> Result<Option<u32>> {
        self.transition(GuardianState::Idle, None);

        self.handles.blue_leds.set_state(true).await?;
        self.handles.red_leds.set_state(false).await?;
        self.alert.stop().await?;

        if !self.rng.gen_bool(self.policy.scan_probability) {
            return Ok(None);
        }

        let angle = self.rng.gen_range(SERVO_MIN_ANGLE..=SERVO_MAX_ANGLE);
        tracing::debug!(angle, "Idle scan move");
        self.handles.servo.set_angle(angle).await?;
        Ok(Some(angle))
    }

    fn transition(&mut self, next: GuardianState, creature: Option<&Detection>) {
        if self.state == next {
            return;
        }
        match creature {
            Some(c) => tracing::info!(
                from = %self.state.as_str(),
                to = %next.as_str(),
                class_name = %c.class_name,
                confidence = c.confidence,
                "Living creature detected"
            ),
            None => tracing::info!(
                from = %self.state.as_str(),
                to = %next.as_str(),
                "Creature lost, resuming scan"
            ),
        }
        self.state = next;
    }

    /// Alert off, both LED groups off
    async fn silence(&self) -> Result<()> {
        self.alert.stop().await?;
        self.handles.blue_leds.set_state(false).await?;
        self.handles.red_leds.set_state(false).await?;
        Ok(())
    }

    fn outcome(&self, creature: Option<Detection>, servo_target: Option<u32>) -> TickOutcome {
        TickOutcome {
            running: self.running,
            state: self.state,
            creature,
            servo_target,
        }
    }
}
