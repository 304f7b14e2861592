//! Dependency registry
//!
//! Maps `(kind, name)` resource names to live collaborator handles so the
//! guardian loop can resolve the names from its configuration.

use super::{Board, CameraSource, Detector, ServoDevice};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Resource subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Camera,
    Vision,
    Servo,
    Board,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Camera => "camera",
            ResourceKind::Vision => "vision",
            ResourceKind::Servo => "servo",
            ResourceKind::Board => "board",
        }
    }

    /// Label used in resolution errors
    fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Camera => "Camera",
            ResourceKind::Vision => "Vision service",
            ResourceKind::Servo => "Servo",
            ResourceKind::Board => "Board",
        }
    }
}

/// Fully qualified resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceName {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceName {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.name)
    }
}

/// Collaborator handle
#[derive(Clone)]
pub enum Resource {
    Camera(Arc<dyn CameraSource>),
    Vision(Arc<dyn Detector>),
    Servo(Arc<dyn ServoDevice>),
    Board(Arc<dyn Board>),
}

impl Resource {
    fn kind(&self) -> ResourceKind {
        match self {
            Resource::Camera(_) => ResourceKind::Camera,
            Resource::Vision(_) => ResourceKind::Vision,
            Resource::Servo(_) => ResourceKind::Servo,
            Resource::Board(_) => ResourceKind::Board,
        }
    }
}

/// Named collaborators available to the guardian loop
#[derive(Clone, Default)]
pub struct Dependencies {
    resources: HashMap<ResourceName, Resource>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under `name`; replaces any previous entry
    pub fn insert(&mut self, name: impl Into<String>, resource: Resource) {
        let key = ResourceName::new(resource.kind(), name);
        self.resources.insert(key, resource);
    }

    pub fn with_camera(mut self, name: impl Into<String>, camera: Arc<dyn CameraSource>) -> Self {
        self.insert(name, Resource::Camera(camera));
        self
    }

    pub fn with_detector(mut self, name: impl Into<String>, detector: Arc<dyn Detector>) -> Self {
        self.insert(name, Resource::Vision(detector));
        self
    }

    pub fn with_servo(mut self, name: impl Into<String>, servo: Arc<dyn ServoDevice>) -> Self {
        self.insert(name, Resource::Servo(servo));
        self
    }

    pub fn with_board(mut self, name: impl Into<String>, board: Arc<dyn Board>) -> Self {
        self.insert(name, Resource::Board(board));
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Sorted `kind/name` list, used in resolution errors and startup logs
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }

    pub fn camera(&self, name: &str) -> Result<Arc<dyn CameraSource>> {
        match self.get(ResourceKind::Camera, name) {
            Some(Resource::Camera(camera)) => Ok(camera.clone()),
            _ => Err(self.not_found(ResourceKind::Camera, name)),
        }
    }

    pub fn detector(&self, name: &str) -> Result<Arc<dyn Detector>> {
        match self.get(ResourceKind::Vision, name) {
            Some(Resource::Vision(detector)) => Ok(detector.clone()),
            _ => Err(self.not_found(ResourceKind::Vision, name)),
        }
    }

    pub fn servo(&self, name: &str) -> Result<Arc<dyn ServoDevice>> {
        match self.get(ResourceKind::Servo, name) {
            Some(Resource::Servo(servo)) => Ok(servo.clone()),
            _ => Err(self.not_found(ResourceKind::Servo, name)),
        }
    }

    pub fn board(&self, name: &str) -> Result<Arc<dyn Board>> {
        match self.get(ResourceKind::Board, name) {
            Some(Resource::Board(board)) => Ok(board.clone()),
            _ => Err(self.not_found(ResourceKind::Board, name)),
        }
    }

    /// Entries are keyed by their own kind, so a hit always has the variant asked for
    fn get(&self, kind: ResourceKind, name: &str) -> Option<&Resource> {
        self.resources.get(&ResourceName::new(kind, name))
    }

    fn not_found(&self, kind: ResourceKind, name: &str) -> Error {
        Error::DependencyNotFound {
            kind: kind.display_name().to_string(),
            name: name.to_string(),
            available: self.names(),
        }
    }
}

/// Source of the dependency set (initial construction and reconfiguration)
#[async_trait]
pub trait DependencyProvider: Send + Sync {
    async fn dependencies(&self) -> Result<Dependencies>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{MockBoard, MockCamera, MockDetector, MockServo};

    fn deps() -> Dependencies {
        Dependencies::new()
            .with_camera("cam", Arc::new(MockCamera::new(640)))
            .with_detector("detector", Arc::new(MockDetector::new()))
            .with_servo("servo", Arc::new(MockServo::new(90)))
            .with_board("local", Arc::new(MockBoard::new()))
    }

    #[test]
    fn test_resolves_each_kind() {
        let deps = deps();
        assert!(deps.camera("cam").is_ok());
        assert!(deps.detector("detector").is_ok());
        assert!(deps.servo("servo").is_ok());
        assert!(deps.board("local").is_ok());
        assert_eq!(deps.len(), 4);
    }

    #[test]
    fn test_kind_is_part_of_the_key() {
        let deps = deps();
        // "cam" exists as a camera, not as a servo
        let err = deps.servo("cam").err().unwrap();
        match err {
            Error::DependencyNotFound { kind, name, available } => {
                assert_eq!(kind, "Servo");
                assert_eq!(name, "cam");
                assert!(available.contains(&"camera/cam".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_name_under_two_kinds() {
        let deps = Dependencies::new()
            .with_camera("front", Arc::new(MockCamera::new(640)))
            .with_servo("front", Arc::new(MockServo::new(90)));
        assert_eq!(deps.len(), 2);
        assert!(deps.camera("front").is_ok());
        assert!(deps.servo("front").is_ok());
        assert!(deps.board("front").is_err());
    }

    #[test]
    fn test_names_sorted() {
        assert_eq!(
            deps().names(),
            vec!["board/local", "camera/cam", "servo/servo", "vision/detector"]
        );
    }
}
