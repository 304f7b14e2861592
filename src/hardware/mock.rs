//! Recording in-memory collaborators for tests

use super::{AudioPlayer, Board, CameraSource, Detector, DigitalOutput, Frame, ServoDevice};
use crate::detection::Detection;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockCamera {
    width: u32,
    pub frames_served: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockCamera {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            frames_served: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CameraSource for MockCamera {
    async fn get_frame(&self) -> Result<Frame> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::hardware("camera", "no frame"));
        }
        self.frames_served.fetch_add(1, Ordering::SeqCst);
        Ok(Frame {
            width: self.width,
            height: self.width * 3 / 4,
            mime_type: "image/jpeg".to_string(),
            data: Vec::new(),
        })
    }
}

/// Serves queued detection lists; an empty queue yields no detections
pub struct MockDetector {
    queue: Mutex<VecDeque<Vec<Detection>>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockDetector {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn push(&self, detections: Vec<Detection>) {
        self.queue.lock().unwrap().push_back(detections);
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn get_detections(&self, _camera_name: &str) -> Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::hardware("detector", "inference failed"));
        }
        Ok(self.queue.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub struct MockServo {
    angle: Mutex<u32>,
    pub moves: Mutex<Vec<u32>>,
    pub reads: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockServo {
    pub fn new(angle: u32) -> Self {
        Self {
            angle: Mutex::new(angle),
            moves: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn angle(&self) -> u32 {
        *self.angle.lock().unwrap()
    }

    pub fn moves(&self) -> Vec<u32> {
        self.moves.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServoDevice for MockServo {
    async fn get_angle(&self) -> Result<u32> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::hardware("servo", "read failed"));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.angle())
    }

    async fn set_angle(&self, angle: u32) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::hardware("servo", "move failed"));
        }
        *self.angle.lock().unwrap() = angle;
        self.moves.lock().unwrap().push(angle);
        Ok(())
    }
}

pub struct MockPin {
    name: String,
    state: Mutex<Option<bool>>,
    pub writes: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockPin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(None),
            writes: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// `None` until the pin is first written
    pub fn state(&self) -> Option<bool> {
        *self.state.lock().unwrap()
    }
}

#[async_trait]
impl DigitalOutput for MockPin {
    fn pin_name(&self) -> &str {
        &self.name
    }

    async fn set(&self, high: bool) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::hardware(format!("gpio {}", self.name), "write failed"));
        }
        *self.state.lock().unwrap() = Some(high);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one shared `MockPin` per name
pub struct MockBoard {
    pins: Mutex<HashMap<String, Arc<MockPin>>>,
    known: Option<Vec<String>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            pins: Mutex::new(HashMap::new()),
            known: None,
        }
    }

    /// Board that only knows the listed pins
    pub fn with_pins(names: &[&str]) -> Self {
        Self {
            pins: Mutex::new(HashMap::new()),
            known: Some(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub fn pin(&self, name: &str) -> Arc<MockPin> {
        self.pins
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MockPin::new(name)))
            .clone()
    }

    pub fn total_writes(&self) -> usize {
        self.pins
            .lock()
            .unwrap()
            .values()
            .map(|p| p.writes.load(Ordering::SeqCst))
            .sum()
    }
}

#[async_trait]
impl Board for MockBoard {
    async fn gpio_pin_by_name(&self, name: &str) -> Result<Arc<dyn DigitalOutput>> {
        if let Some(known) = &self.known {
            if !known.iter().any(|k| k == name) {
                return Err(Error::hardware("board", format!("unknown pin {name}")));
            }
        }
        Ok(self.pin(name))
    }
}

#[derive(Default)]
pub struct MockAudio {
    playing: AtomicBool,
    pub play_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst) + self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioPlayer for MockAudio {
    async fn play(&self) -> Result<()> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool> {
        Ok(self.playing.load(Ordering::SeqCst))
    }
}
