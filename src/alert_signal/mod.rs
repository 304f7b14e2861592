//! AlertSignal - audible alert
//!
//! ## Responsibilities
//!
//! - Idempotent start/stop of the alert sound
//! - ProcessAudioPlayer: plays the alert file through an external player

mod player;

pub use player::ProcessAudioPlayer;

use crate::error::Result;
use crate::hardware::AudioPlayer;
use std::sync::Arc;

/// Audible alert over an `AudioPlayer`
#[derive(Clone)]
pub struct AlertSignal {
    player: Arc<dyn AudioPlayer>,
}

impl AlertSignal {
    pub fn new(player: Arc<dyn AudioPlayer>) -> Self {
        Self { player }
    }

    pub async fn is_active(&self) -> Result<bool> {
        self.player.is_playing().await
    }

    /// Start the alert; no-op while already playing
    pub async fn start(&self) -> Result<()> {
        if self.player.is_playing().await? {
            return Ok(());
        }
        tracing::info!("Alert signal started");
        self.player.play().await
    }

    /// Stop the alert; no-op while already silent
    pub async fn stop(&self) -> Result<()> {
        if !self.player.is_playing().await? {
            return Ok(());
        }
        tracing::info!("Alert signal stopped");
        self.player.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::MockAudio;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let audio = Arc::new(MockAudio::new());
        let alert = AlertSignal::new(audio.clone());

        alert.start().await.unwrap();
        alert.start().await.unwrap();

        assert!(alert.is_active().await.unwrap());
        assert_eq!(audio.play_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_twice_stays_inactive() {
        let audio = Arc::new(MockAudio::new());
        let alert = AlertSignal::new(audio.clone());
        alert.start().await.unwrap();

        alert.stop().await.unwrap();
        assert!(!alert.is_active().await.unwrap());
        alert.stop().await.unwrap();
        assert!(!alert.is_active().await.unwrap());

        assert_eq!(audio.stop_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_when_never_started() {
        let audio = Arc::new(MockAudio::new());
        let alert = AlertSignal::new(audio.clone());

        alert.stop().await.unwrap();
        assert_eq!(audio.calls(), 0);
    }
}
