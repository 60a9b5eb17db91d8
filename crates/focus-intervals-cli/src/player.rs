//! Notification players for the terminal.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use focus_intervals_core::storage::NotificationsConfig;
use focus_intervals_core::{NotificationPlayer, SilentPlayer};
use tracing::warn;

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl NotificationPlayer for TerminalBell {
    fn on_completion_count_increased(&mut self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|()| stderr.flush()) {
            warn!(error = %e, "failed to ring terminal bell");
        }
    }
}

/// Runs a user-supplied shell command, e.g. a sound player.
#[derive(Debug)]
pub struct CommandPlayer {
    command: String,
    playing: Option<Child>,
}

impl CommandPlayer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            playing: None,
        }
    }

    fn stop_playback(&mut self) {
        if let Some(mut child) = self.playing.take() {
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl NotificationPlayer for CommandPlayer {
    fn on_completion_count_increased(&mut self) {
        self.stop_playback();
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.playing = Some(child),
            Err(e) => warn!(command = %self.command, error = %e, "failed to start sound command"),
        }
    }

    fn reset(&mut self) {
        self.stop_playback();
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        // Reap without cutting the sound short.
        if let Some(mut child) = self.playing.take() {
            let _ = child.try_wait();
        }
    }
}

pub fn from_config(config: &NotificationsConfig) -> Box<dyn NotificationPlayer> {
    if !config.enabled {
        return Box::new(SilentPlayer);
    }
    match config.custom_sound.as_deref().map(str::trim) {
        Some(command) if !command.is_empty() => Box::new(CommandPlayer::new(command)),
        _ if config.bell => Box::new(TerminalBell),
        _ => Box::new(SilentPlayer),
    }
}
