pub mod switcher;

pub use switcher::OutputDeviceSwitcher;

use std::sync::Arc;

use crate::audio::device::AudioDevice;
use crate::audio::session::{AudioSession, SessionResolver, UNKNOWN_PROCESS};
use crate::audio::source::AudioSource;

/// Position in the virtual `[devices..., sessions...]` sequence.
///
/// `Unresolved` is entered at startup and whenever the focused application
/// changes; the next gesture decides what it actually points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Unresolved,
    At(usize),
}

/// The source a gesture resolved to.
pub enum SelectedSource {
    Device(Arc<AudioDevice>),
    Session(AudioSession),
}

impl SelectedSource {
    pub fn source(&self) -> &dyn AudioSource {
        match self {
            SelectedSource::Device(device) => device.as_ref(),
            SelectedSource::Session(session) => session,
        }
    }
}

/// A freshly selected source together with the title to announce for it.
pub struct Selection {
    pub source: SelectedSource,
    pub title: String,
}

/// Cursor state machine over the concatenation of the device registry and the
/// visible session list.
///
/// The session list is re-fetched by the caller on every navigation gesture,
/// so the cursor's meaning is approximate across calls: if a session appeared
/// or vanished between gestures the selection may shift by one slot. That is
/// an accepted trade-off, not corrected with stable identity tracking.
pub struct SourceSelector {
    cursor: Cursor,
    process: String,
    last_announced: String,
}

impl Default for SourceSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSelector {
    pub fn new() -> Self {
        Self {
            cursor: Cursor::Unresolved,
            process: String::new(),
            last_announced: String::new(),
        }
    }

    /// Forget the current position; the next gesture re-resolves against the
    /// focused application.
    pub fn reset(&mut self) {
        self.cursor = Cursor::Unresolved;
        self.last_announced = UNKNOWN_PROCESS.to_string();
    }

    pub fn is_unresolved(&self) -> bool {
        self.cursor == Cursor::Unresolved
    }

    /// Pin the selector to a process resolved from focus. The cursor stays
    /// unresolved; volume gestures address the process directly.
    pub fn set_process(&mut self, name: &str) {
        self.process = name.to_string();
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    fn resolved_slot(&self, device_count: usize, sessions: &[String], forward: bool) -> isize {
        match self.cursor {
            Cursor::At(index) => index as isize,
            Cursor::Unresolved => {
                match sessions.iter().position(|s| s.contains(&self.process)) {
                    Some(slot) => (device_count + slot) as isize,
                    // Land on the boundary so the following step enters the
                    // session range (forward) or wraps to the end (backward).
                    None if forward => device_count as isize - 1,
                    None => -1,
                }
            }
        }
    }

    /// Advance the cursor with wraparound. Returns the new position, or None
    /// when there is nothing to select at all.
    pub fn next(&mut self, device_count: usize, sessions: &[String]) -> Option<usize> {
        let total = (device_count + sessions.len()) as isize;
        if total == 0 {
            self.cursor = Cursor::Unresolved;
            return None;
        }
        let current = self.resolved_slot(device_count, sessions, true);
        let next = if current < total - 1 { (current + 1).max(0) } else { 0 };
        self.cursor = Cursor::At(next as usize);
        Some(next as usize)
    }

    /// Retreat the cursor with wraparound. Returns the new position, or None
    /// when there is nothing to select at all.
    pub fn prev(&mut self, device_count: usize, sessions: &[String]) -> Option<usize> {
        let total = (device_count + sessions.len()) as isize;
        if total == 0 {
            self.cursor = Cursor::Unresolved;
            return None;
        }
        let current = self.resolved_slot(device_count, sessions, false);
        let prev = if current > 0 { current - 1 } else { total - 1 };
        self.cursor = Cursor::At(prev as usize);
        Some(prev as usize)
    }

    /// Materialize the source under the cursor right after navigation,
    /// producing the title to announce. Landing on a session records it so
    /// the following volume gesture does not re-announce it.
    pub fn selected(
        &mut self,
        devices: &[Arc<AudioDevice>],
        sessions: &[String],
        resolver: &SessionResolver,
    ) -> Selection {
        let index = match self.cursor {
            Cursor::At(index) => index,
            Cursor::Unresolved => 0,
        };
        if index < devices.len() {
            let device = Arc::clone(&devices[index]);
            let title = if device.is_default_device() {
                format!("Default audio device: {}", device.name())
            } else {
                device.name().to_string()
            };
            return Selection {
                source: SelectedSource::Device(device),
                title,
            };
        }
        // The session list may have shrunk since the cursor was set; fall
        // back to the last session, then to the unknown sentinel.
        let process = sessions
            .get(index - devices.len())
            .or_else(|| sessions.last())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_PROCESS.to_string());
        self.process = process.clone();
        self.last_announced = process.clone();
        let session = resolver.resolve(&process);
        let title = session.title();
        Selection {
            source: SelectedSource::Session(session),
            title,
        }
    }

    /// Materialize the source under the cursor for a volume or mute gesture.
    ///
    /// Device slots reset the session context so a later session re-selection
    /// announces its title again; session slots resolve the tracked process
    /// fresh and yield a title only when the identity changed since the last
    /// announcement.
    pub fn current(
        &mut self,
        devices: &[Arc<AudioDevice>],
        resolver: &SessionResolver,
    ) -> (SelectedSource, Option<String>) {
        if let Cursor::At(index) = self.cursor {
            if index < devices.len() {
                self.last_announced = UNKNOWN_PROCESS.to_string();
                return (SelectedSource::Device(Arc::clone(&devices[index])), None);
            }
        }
        let session = resolver.resolve(&self.process);
        let title = if session.id() != self.last_announced {
            self.last_announced = session.id().to_string();
            Some(session.title())
        } else {
            None
        };
        (SelectedSource::Session(session), title)
    }
}
