use anyhow::Result;
use tracing::debug;

use crate::config::{ControlConfig, StateStore};

/// A volume level read through a driver, or the admission that the driver
/// cannot provide one (vanished session, failed handle, channel-less source).
///
/// Replaces the magic `-1.0` float so unsupported readings cannot leak into
/// arithmetic unnoticed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeReading {
    /// A scalar level in `[0.0, 1.0]`
    Level(f32),
    Unsupported,
}

impl VolumeReading {
    pub fn from_driver(result: Result<f32>) -> Self {
        match result {
            Ok(level) => VolumeReading::Level(level),
            Err(e) => {
                debug!("Driver volume read failed: {}", e);
                VolumeReading::Unsupported
            }
        }
    }

    pub fn level(self) -> Option<f32> {
        match self {
            VolumeReading::Level(level) => Some(level),
            VolumeReading::Unsupported => None,
        }
    }

    /// The level as whole percentage points, the unit all step arithmetic
    /// works in.
    pub fn percent(self) -> Option<i32> {
        self.level().map(quantize)
    }
}

/// Settings and persisted state a source needs to interpret mute gestures.
#[derive(Clone, Copy)]
pub struct ControlContext<'a> {
    pub settings: &'a ControlConfig,
    pub state: &'a StateStore,
}

fn quantize(level: f32) -> i32 {
    (level * 100.0).round() as i32
}

fn to_level(percent: i32) -> f32 {
    percent as f32 / 100.0
}

/// Common contract over physical output devices and per-process audio
/// sessions.
///
/// Implementors supply the minimal driver surface; every gesture-facing
/// operation is a provided method so the step and mute arithmetic exists in
/// exactly one place. Levels are quantized to whole percentage points before
/// a step is applied, so repeated single-step adjustments cannot accumulate
/// floating point drift.
pub trait AudioSource {
    /// Stable identifier: endpoint id for devices, process image name for
    /// sessions. This is the key used in the persisted muted set.
    fn id(&self) -> &str;

    /// Human-readable label for announcements.
    fn title(&self) -> String;

    fn is_default_device(&self) -> bool {
        false
    }

    fn volume_level(&self) -> VolumeReading;

    /// Write a level through the driver; failures are silent.
    fn set_volume_level(&self, level: f32);

    /// The driver's native mute flag; false when no handle is available.
    fn native_mute(&self) -> bool;

    /// Write the native mute flag; returns false when no handle is available.
    fn set_native_mute(&self, muted: bool) -> bool;

    /// Number of channels, or 0 / -1 when the source does not expose them.
    fn channel_count(&self) -> i32;

    fn channel_volume_level(&self, channel: u32) -> VolumeReading;

    fn set_channel_volume_level(&self, channel: u32, level: f32);

    fn selected_channel(&self) -> u32 {
        0
    }

    fn set_selected_channel(&self, _channel: u32) {}

    /// Whether the source counts as muted: the driver's native flag, or (in
    /// partial mute mode) membership in the persisted muted set.
    fn is_muted(&self, ctx: &ControlContext<'_>) -> bool {
        let native = self.native_mute();
        if ctx.settings.mute_completely {
            native
        } else {
            native || ctx.state.is_muted(self.id())
        }
    }

    /// Increase the volume by the configured step. Unmutes first.
    fn volume_up(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let Some(percent) = self.volume_level().percent() else {
            return VolumeReading::Unsupported;
        };
        let level = to_level((percent + ctx.settings.step as i32).min(100));
        self.set_volume_level(level);
        VolumeReading::Level(level)
    }

    /// Decrease the volume by the configured step. Unmutes first.
    ///
    /// A result of exactly 0.0 is the caller's cue to mute the source rather
    /// than leave it at a silent level.
    fn volume_down(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let Some(percent) = self.volume_level().percent() else {
            return VolumeReading::Unsupported;
        };
        let level = to_level((percent - ctx.settings.step as i32).max(0));
        self.set_volume_level(level);
        VolumeReading::Level(level)
    }

    /// Set full volume; the returned level is re-read from the driver.
    fn volume_max(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        self.set_volume_level(1.0);
        self.volume_level()
    }

    /// Set zero volume; the returned level is re-read from the driver.
    fn volume_min(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        self.set_volume_level(0.0);
        self.volume_level()
    }

    /// Mute the source. In complete mode this sets the driver's native flag;
    /// in partial mute mode the volume is reduced by the configured percentage
    /// and the id is recorded in the persisted muted set instead, because some
    /// backends report full volume again after a native mute.
    fn mute(&self, ctx: &ControlContext<'_>) -> bool {
        if ctx.settings.mute_completely {
            if !self.set_native_mute(true) {
                return false;
            }
        } else if !self.is_muted(ctx) {
            let Some(level) = self.volume_level().level() else {
                return false;
            };
            let factor = (100 - ctx.settings.mute_percentage as i32) as f32 / 100.0;
            self.set_volume_level(level * factor);
        }
        ctx.state.add_muted(self.id());
        true
    }

    /// Unmute the source, restoring a partially muted volume by the inverse
    /// scaling, and drop the id from the persisted muted set.
    fn unmute(&self, ctx: &ControlContext<'_>) -> bool {
        if !self.set_native_mute(false) {
            return false;
        }
        if self.is_muted(ctx) {
            if let Some(percent) = self.volume_level().percent() {
                let restored =
                    (percent as f32 / (100 - ctx.settings.mute_percentage as i32) as f32).min(1.0);
                self.set_volume_level(restored);
            }
        }
        ctx.state.remove_muted(self.id());
        true
    }

    /// Move the channel selection by `delta`, wrapping around the channel
    /// count. Returns the newly selected channel, or None when the source
    /// exposes no channels.
    fn channel_step(&self, delta: i32) -> Option<u32> {
        let count = self.channel_count();
        if count <= 0 {
            return None;
        }
        let selected =
            (self.selected_channel() as i64 + delta as i64).rem_euclid(count as i64) as u32;
        self.set_selected_channel(selected);
        Some(selected)
    }

    fn channel_volume_up(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let channel = self.selected_channel();
        let Some(percent) = self.channel_volume_level(channel).percent() else {
            return VolumeReading::Unsupported;
        };
        let level = to_level((percent + ctx.settings.step as i32).min(100));
        self.set_channel_volume_level(channel, level);
        VolumeReading::Level(level)
    }

    fn channel_volume_down(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let channel = self.selected_channel();
        let Some(percent) = self.channel_volume_level(channel).percent() else {
            return VolumeReading::Unsupported;
        };
        let level = to_level((percent - ctx.settings.step as i32).max(0));
        self.set_channel_volume_level(channel, level);
        VolumeReading::Level(level)
    }

    fn channel_volume_max(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let channel = self.selected_channel();
        self.set_channel_volume_level(channel, 1.0);
        self.channel_volume_level(channel)
    }

    fn channel_volume_min(&self, ctx: &ControlContext<'_>) -> VolumeReading {
        if self.is_muted(ctx) {
            self.unmute(ctx);
        }
        let channel = self.selected_channel();
        self.set_channel_volume_level(channel, 0.0);
        self.channel_volume_level(channel)
    }

    /// Set every channel to the arithmetic mean of all channel levels - a
    /// normalize-to-center operation, not a per-channel step.
    fn channel_volume_average(&self) -> VolumeReading {
        let count = self.channel_count();
        if count <= 0 {
            return VolumeReading::Unsupported;
        }
        let mut sum = 0.0f32;
        for channel in 0..count as u32 {
            let Some(level) = self.channel_volume_level(channel).level() else {
                return VolumeReading::Unsupported;
            };
            sum += level;
        }
        let mean = sum / count as f32;
        for channel in 0..count as u32 {
            self.set_channel_volume_level(channel, mean);
        }
        VolumeReading::Level(mean)
    }
}
