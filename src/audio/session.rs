use std::sync::Arc;
use tracing::{debug, warn};

use crate::audio::source::{AudioSource, VolumeReading};
use crate::system::{SessionDriver, SessionHandle};

/// Process name used by the host screen reader itself; the preferred fallback
/// when a requested session cannot be found.
pub const SCREEN_READER_PROCESS: &str = "nvda.exe";

/// Placeholder identity when no process could be resolved at all.
pub const UNKNOWN_PROCESS: &str = "unknown-application";

/// Raw display names some backends report, mapped to something speakable.
fn friendly_display_name(raw: &str) -> Option<&'static str> {
    match raw {
        r"@%SystemRoot%\System32\AudioSrv.Dll,-202" => Some("System Sound"),
        _ => None,
    }
}

/// The audio session of one running process, resolved for the duration of a
/// single gesture.
///
/// Sessions are never cached: the underlying stream can vanish whenever its
/// process stops playing, so each instance is constructed from a fresh
/// enumeration. A session without a handle is a no-op source.
pub struct AudioSession {
    requested: String,
    handle: Option<SessionHandle>,
}

impl AudioSession {
    pub fn detached(requested: &str) -> Self {
        Self {
            requested: requested.to_string(),
            handle: None,
        }
    }

    pub fn from_handle(requested: &str, handle: SessionHandle) -> Self {
        Self {
            requested: requested.to_string(),
            handle: Some(handle),
        }
    }

    pub fn process_name(&self) -> &str {
        match &self.handle {
            Some(handle) => &handle.process_name,
            None => &self.requested,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.handle.is_none()
    }
}

impl AudioSource for AudioSession {
    fn id(&self) -> &str {
        self.process_name()
    }

    /// Human friendly label: the session's display name when the backend
    /// provides a real one, otherwise the process name without its extension.
    fn title(&self) -> String {
        if let Some(handle) = &self.handle {
            let display = friendly_display_name(&handle.display_name)
                .map(str::to_string)
                .unwrap_or_else(|| handle.display_name.clone());
            if !display.is_empty() {
                return display;
            }
        }
        self.process_name().trim_end_matches(".exe").to_string()
    }

    fn volume_level(&self) -> VolumeReading {
        match &self.handle {
            Some(handle) => VolumeReading::from_driver(handle.volume.master_volume()),
            None => VolumeReading::Unsupported,
        }
    }

    fn set_volume_level(&self, level: f32) {
        if let Some(handle) = &self.handle {
            if let Err(e) = handle.volume.set_master_volume(level) {
                debug!("Failed to set volume on {}: {}", handle.process_name, e);
            }
        }
    }

    fn native_mute(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.volume.mute().unwrap_or(false),
            None => false,
        }
    }

    fn set_native_mute(&self, muted: bool) -> bool {
        match &self.handle {
            Some(handle) => handle.volume.set_mute(muted).is_ok(),
            None => false,
        }
    }

    /// Sessions never expose per-channel control.
    fn channel_count(&self) -> i32 {
        -1
    }

    fn channel_volume_level(&self, _channel: u32) -> VolumeReading {
        VolumeReading::Unsupported
    }

    fn set_channel_volume_level(&self, _channel: u32, _level: f32) {}
}

/// Maps process names to live audio sessions.
///
/// Stateless by design: every lookup re-enumerates, because sessions are
/// created and destroyed continuously as processes start, stop, and play
/// audio.
pub struct SessionResolver {
    driver: Arc<dyn SessionDriver>,
}

impl SessionResolver {
    pub fn new(driver: Arc<dyn SessionDriver>) -> Self {
        Self { driver }
    }

    fn live_sessions(&self) -> Vec<SessionHandle> {
        match self.driver.enumerate_sessions() {
            Ok(sessions) => sessions
                .into_iter()
                .filter(|s| !s.process_name.is_empty())
                .collect(),
            Err(e) => {
                warn!("Session enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Find the session whose process name contains `name`, without any
    /// fallback. Used to decide whether a focused application is playing
    /// sound at all.
    pub fn find(&self, name: &str) -> Option<AudioSession> {
        let needle = name.to_lowercase();
        self.live_sessions()
            .into_iter()
            .find(|s| s.process_name.to_lowercase().contains(&needle))
            .map(|handle| AudioSession::from_handle(name, handle))
    }

    /// Resolve a name to a session, falling back to the screen reader's own
    /// session, then to the first available one, then to a detached sentinel.
    /// Never fails.
    pub fn resolve(&self, name: &str) -> AudioSession {
        let sessions = self.live_sessions();
        let needle = name.to_lowercase();
        let found = sessions
            .iter()
            .find(|s| s.process_name.to_lowercase().contains(&needle))
            .or_else(|| {
                sessions
                    .iter()
                    .find(|s| s.process_name.to_lowercase().contains(SCREEN_READER_PROCESS))
            })
            .or_else(|| sessions.first());
        match found {
            Some(handle) => AudioSession::from_handle(name, handle.clone()),
            None => AudioSession::detached(name),
        }
    }

    /// Process names of all sessions that are not hidden, in enumeration
    /// order. With `dedupe` set, repeated names collapse to their first
    /// occurrence (one process can own several sessions).
    pub fn visible_process_names(&self, hidden: &[String], dedupe: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .live_sessions()
            .into_iter()
            .map(|s| s.process_name)
            .filter(|name| !hidden.iter().any(|h| h == name))
            .collect();
        if dedupe {
            let mut seen = std::collections::HashSet::new();
            names.retain(|name| seen.insert(name.clone()));
        }
        names
    }
}
