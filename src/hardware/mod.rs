//! Hardware collaborators
//!
//! ## Responsibilities
//!
//! - Narrow async contracts for the devices the guardian loop drives
//!   (camera, vision detector, servo, GPIO board, audio player)
//! - Dependency registry used to resolve configured names to devices
//! - RobotGateway: HTTP adapter to the robot's hardware gateway
//!
//! Every call here is a suspension point; none of them carries its own
//! timeout, so a hung device stalls the caller.

mod gateway;
mod registry;

#[cfg(test)]
pub(crate) mod mock;

pub use gateway::RobotGateway;
pub use registry::{Dependencies, DependencyProvider, Resource, ResourceKind, ResourceName};

use crate::detection::Detection;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One captured camera frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Camera that can hand out its current frame
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn get_frame(&self) -> Result<Frame>;
}

/// Object detector running against a named camera
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detections for the camera's current frame, in detector order
    async fn get_detections(&self, camera_name: &str) -> Result<Vec<Detection>>;
}

/// Positional servo (degrees)
#[async_trait]
pub trait ServoDevice: Send + Sync {
    async fn get_angle(&self) -> Result<u32>;
    async fn set_angle(&self, angle: u32) -> Result<()>;
}

/// Single binary output pin
#[async_trait]
pub trait DigitalOutput: Send + Sync {
    fn pin_name(&self) -> &str;
    async fn set(&self, high: bool) -> Result<()>;
}

/// Board exposing GPIO pins by name
#[async_trait]
pub trait Board: Send + Sync {
    async fn gpio_pin_by_name(&self, name: &str) -> Result<Arc<dyn DigitalOutput>>;
}

/// Audio output for the alert sound
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn is_playing(&self) -> Result<bool>;
}
