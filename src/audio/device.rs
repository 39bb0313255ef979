use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::audio::source::{AudioSource, VolumeReading};
use crate::system::DeviceVolume;

/// One physical output device, paired with its activated control handle.
///
/// Devices live inside the registry snapshot and are shared as `Arc`s, so the
/// channel selection survives across gestures for as long as the snapshot
/// does. A device without a handle (activation failed, synthesized default)
/// still announces but reports every reading as unsupported.
pub struct AudioDevice {
    id: String,
    name: String,
    volume: Option<Arc<dyn DeviceVolume>>,
    is_default: bool,
    selected_channel: AtomicU32,
}

impl AudioDevice {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            volume: None,
            is_default: false,
            selected_channel: AtomicU32::new(0),
        }
    }

    pub fn with_volume(mut self, volume: Arc<dyn DeviceVolume>) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn set_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_volume_control(&self) -> bool {
        self.volume.is_some()
    }
}

impl fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]{}",
            self.name,
            if self.volume.is_some() {
                "controllable"
            } else {
                "no control"
            },
            if self.is_default { " (default)" } else { "" }
        )
    }
}

impl AudioSource for AudioDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn is_default_device(&self) -> bool {
        self.is_default
    }

    fn volume_level(&self) -> VolumeReading {
        match &self.volume {
            Some(volume) => VolumeReading::from_driver(volume.master_volume()),
            None => VolumeReading::Unsupported,
        }
    }

    fn set_volume_level(&self, level: f32) {
        if let Some(volume) = &self.volume {
            if let Err(e) = volume.set_master_volume(level) {
                tracing::debug!("Failed to set volume on {}: {}", self.name, e);
            }
        }
    }

    fn native_mute(&self) -> bool {
        match &self.volume {
            Some(volume) => volume.mute().unwrap_or(false),
            None => false,
        }
    }

    fn set_native_mute(&self, muted: bool) -> bool {
        match &self.volume {
            Some(volume) => volume.set_mute(muted).is_ok(),
            None => false,
        }
    }

    fn channel_count(&self) -> i32 {
        match &self.volume {
            Some(volume) => volume.channel_count().map(|c| c as i32).unwrap_or(0),
            None => 0,
        }
    }

    fn channel_volume_level(&self, channel: u32) -> VolumeReading {
        match &self.volume {
            Some(volume) => VolumeReading::from_driver(volume.channel_volume(channel)),
            None => VolumeReading::Unsupported,
        }
    }

    fn set_channel_volume_level(&self, channel: u32, level: f32) {
        if let Some(volume) = &self.volume {
            if let Err(e) = volume.set_channel_volume(channel, level) {
                tracing::debug!("Failed to set channel {} on {}: {}", channel, self.name, e);
            }
        }
    }

    fn selected_channel(&self) -> u32 {
        self.selected_channel.load(Ordering::Relaxed)
    }

    fn set_selected_channel(&self, channel: u32) {
        self.selected_channel.store(channel, Ordering::Relaxed);
    }
}
