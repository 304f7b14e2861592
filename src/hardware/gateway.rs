//! Robot Gateway Client
//!
//! HTTP adapter to the robot's hardware gateway. Every configured component
//! (camera, vision service, servo, board pins) is reached through the same
//! authenticated client.

use super::registry::{Dependencies, DependencyProvider, Resource, ResourceKind, ResourceName};
use super::{Board, CameraSource, Detector, DigitalOutput, Frame, ServoDevice};
use crate::detection::Detection;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Gateway request timeout
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Authenticated gateway client
#[derive(Clone)]
pub struct RobotGateway {
    client: Client,
    base_url: String,
    api_key: String,
    api_key_id: String,
}

/// Camera image as returned by the gateway
#[derive(Debug, Deserialize)]
struct FrameResponse {
    width: u32,
    height: u32,
    mime_type: String,
    /// base64-encoded image bytes
    data: String,
}

#[derive(Debug, Deserialize)]
struct DetectionsResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServoPosition {
    angle: u32,
}

#[derive(Debug, Serialize)]
struct PinState {
    high: bool,
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    resources: Vec<ResourceName>,
}

impl RobotGateway {
    /// Create a client for `base_url` (e.g. http://robot.local:8080)
    pub fn new(base_url: &str, api_key: &str, api_key_id: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_key_id: api_key_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header("api_key", &self.api_key)
            .header("api_key_id", &self.api_key_id)
    }

    async fn send(&self, device: &str, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::hardware(device, format!("gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                device = %device,
                status = %status,
                body = %body,
                "Gateway request failed"
            );
            return Err(Error::hardware(
                device,
                format!("gateway returned {}: {}", status, body),
            ));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        device: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .send(device, self.request(Method::GET, path).query(query))
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| Error::hardware(device, format!("invalid gateway response: {}", e)))
    }

    async fn put_json<B: Serialize>(&self, device: &str, path: &str, body: &B) -> Result<()> {
        self.send(device, self.request(Method::PUT, path).json(body))
            .await
            .map(|_| ())
    }

    pub fn camera(&self, name: &str) -> GatewayCamera {
        GatewayCamera {
            gateway: self.clone(),
            name: name.to_string(),
        }
    }

    pub fn detector(&self, name: &str) -> GatewayDetector {
        GatewayDetector {
            gateway: self.clone(),
            name: name.to_string(),
        }
    }

    pub fn servo(&self, name: &str) -> GatewayServo {
        GatewayServo {
            gateway: self.clone(),
            name: name.to_string(),
        }
    }

    pub fn board(&self, name: &str) -> GatewayBoard {
        GatewayBoard {
            gateway: self.clone(),
            name: name.to_string(),
        }
    }
}

fn decode_frame(device: &str, response: FrameResponse) -> Result<Frame> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(response.data.as_bytes())
        .map_err(|e| Error::hardware(device, format!("invalid image data: {}", e)))?;

    Ok(Frame {
        width: response.width,
        height: response.height,
        mime_type: response.mime_type,
        data,
    })
}

#[async_trait]
impl DependencyProvider for RobotGateway {
    /// Lists the robot's resources and wraps each one in a gateway handle
    async fn dependencies(&self) -> Result<Dependencies> {
        let listing: ResourcesResponse = self.get_json("gateway", "resources", &[]).await?;

        let mut deps = Dependencies::new();
        for resource in listing.resources {
            let handle = match resource.kind {
                ResourceKind::Camera => Resource::Camera(Arc::new(self.camera(&resource.name))),
                ResourceKind::Vision => Resource::Vision(Arc::new(self.detector(&resource.name))),
                ResourceKind::Servo => Resource::Servo(Arc::new(self.servo(&resource.name))),
                ResourceKind::Board => Resource::Board(Arc::new(self.board(&resource.name))),
            };
            deps.insert(resource.name, handle);
        }

        tracing::debug!(
            base_url = %self.base_url,
            resources = ?deps.names(),
            "Gateway resources discovered"
        );

        Ok(deps)
    }
}

pub struct GatewayCamera {
    gateway: RobotGateway,
    name: String,
}

#[async_trait]
impl CameraSource for GatewayCamera {
    async fn get_frame(&self) -> Result<Frame> {
        let device = format!("camera {}", self.name);
        let path = format!("cameras/{}/image", self.name);
        let response: FrameResponse = self
            .gateway
            .get_json(&device, &path, &[("mime_type", "image/jpeg")])
            .await?;
        decode_frame(&device, response)
    }
}

pub struct GatewayDetector {
    gateway: RobotGateway,
    name: String,
}

#[async_trait]
impl Detector for GatewayDetector {
    async fn get_detections(&self, camera_name: &str) -> Result<Vec<Detection>> {
        let device = format!("vision {}", self.name);
        let path = format!("vision/{}/detections", self.name);
        let response: DetectionsResponse = self
            .gateway
            .get_json(&device, &path, &[("camera", camera_name)])
            .await?;
        Ok(response.detections)
    }
}

pub struct GatewayServo {
    gateway: RobotGateway,
    name: String,
}

#[async_trait]
impl ServoDevice for GatewayServo {
    async fn get_angle(&self) -> Result<u32> {
        let device = format!("servo {}", self.name);
        let path = format!("servos/{}/position", self.name);
        let position: ServoPosition = self.gateway.get_json(&device, &path, &[]).await?;
        Ok(position.angle)
    }

    async fn set_angle(&self, angle: u32) -> Result<()> {
        let device = format!("servo {}", self.name);
        let path = format!("servos/{}/position", self.name);
        self.gateway
            .put_json(&device, &path, &ServoPosition { angle })
            .await
    }
}

pub struct GatewayBoard {
    gateway: RobotGateway,
    name: String,
}

#[async_trait]
impl Board for GatewayBoard {
    /// Pins are addressed lazily; an unknown pin fails on its first write
    async fn gpio_pin_by_name(&self, name: &str) -> Result<Arc<dyn DigitalOutput>> {
        if name.trim().is_empty() {
            return Err(Error::hardware(
                format!("board {}", self.name),
                "empty GPIO pin name",
            ));
        }
        Ok(Arc::new(GatewayPin {
            gateway: self.gateway.clone(),
            board: self.name.clone(),
            pin: name.to_string(),
        }))
    }
}

pub struct GatewayPin {
    gateway: RobotGateway,
    board: String,
    pin: String,
}

#[async_trait]
impl DigitalOutput for GatewayPin {
    fn pin_name(&self) -> &str {
        &self.pin
    }

    async fn set(&self, high: bool) -> Result<()> {
        let device = format!("board {} gpio {}", self.board, self.pin);
        let path = format!("boards/{}/gpio/{}", self.board, self.pin);
        self.gateway.put_json(&device, &path, &PinState { high }).await
    }
}
