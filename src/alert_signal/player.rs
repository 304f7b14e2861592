//! ProcessAudioPlayer - alert playback via an external player
//!
//! Spawns the configured player (mpg123 by default) with the alert file.
//! The child is kept so it can be killed on stop and polled for completion.

use crate::error::{Error, Result};
use crate::hardware::AudioPlayer;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Plays one audio file per `play` call through an external command
pub struct ProcessAudioPlayer {
    program: String,
    args: Vec<String>,
    file: PathBuf,
    child: Mutex<Option<Child>>,
}

impl ProcessAudioPlayer {
    /// `program` is invoked as `program [args..] file`
    pub fn new(program: impl Into<String>, args: Vec<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            file: file.into(),
            child: Mutex::new(None),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

#[async_trait]
impl AudioPlayer for ProcessAudioPlayer {
    async fn play(&self) -> Result<()> {
        let mut slot = self.child.lock().await;
        if let Some(child) = slot.as_mut() {
            if child.try_wait()?.is_none() {
                return Ok(());
            }
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::hardware("audio", format!("{} spawn failed: {}", self.program, e)))?;

        tracing::debug!(
            program = %self.program,
            file = %self.file.display(),
            pid = ?child.id(),
            "Alert playback spawned"
        );

        *slot = Some(child);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut slot = self.child.lock().await;
        if let Some(mut child) = slot.take() {
            if child.try_wait()?.is_none() {
                child
                    .kill()
                    .await
                    .map_err(|e| Error::hardware("audio", format!("kill failed: {}", e)))?;
            }
        }
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool> {
        let mut slot = self.child.lock().await;
        let finished = match slot.as_mut() {
            Some(child) => child.try_wait()?.is_some(),
            None => return Ok(false),
        };
        if finished {
            *slot = None;
        }
        Ok(!finished)
    }
}
