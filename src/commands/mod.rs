use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::{
    AudioSource, ControlContext, DeviceRegistry, SessionResolver, UNKNOWN_PROCESS, VolumeReading,
};
use crate::config::{Config, StateStore};
use crate::selector::{OutputDeviceSwitcher, SelectedSource, SourceSelector};
use crate::speech::{Announcer, SpeechSender};
use crate::system::{DeviceDriver, FocusTracker, OutputRouter, SessionDriver};

// Type alias for the default command handler type
#[cfg(not(any(test, feature = "test-mocks")))]
pub type DefaultCommandHandler = CommandHandler<crate::speech::ConsoleSpeechSender>;

#[cfg(any(test, feature = "test-mocks"))]
pub type DefaultCommandHandler = CommandHandler<crate::speech::TestSpeechSender>;

/// Every logical action a gesture can trigger. The host binds its input
/// events to these and feeds them through `CommandHandler::handle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    VolumeUp,
    VolumeDown,
    VolumeMax,
    VolumeMin,
    MuteToggle,
    NextSource,
    PrevSource,
    NextChannel,
    PrevChannel,
    ChannelVolumeUp,
    ChannelVolumeDown,
    ChannelVolumeMax,
    ChannelVolumeMin,
    ChannelVolumeAverage,
    NextOutputDevice,
    PrevOutputDevice,
    /// Direct selection of an output device by its position in the current
    /// list, resolved at dispatch time.
    SwitchToOutputDevice(usize),
}

/// The built-in key chords, bound by hosts when `default_gestures` is set.
/// Number keys beyond the listed ones map to `SwitchToOutputDevice(n)`.
pub fn default_gesture_bindings() -> Vec<(&'static str, Gesture)> {
    vec![
        ("volume-up", Gesture::VolumeUp),
        ("volume-down", Gesture::VolumeDown),
        ("volume-max", Gesture::VolumeMax),
        ("volume-min", Gesture::VolumeMin),
        ("mute", Gesture::MuteToggle),
        ("next-source", Gesture::NextSource),
        ("prev-source", Gesture::PrevSource),
        ("next-channel", Gesture::NextChannel),
        ("prev-channel", Gesture::PrevChannel),
        ("channel-volume-up", Gesture::ChannelVolumeUp),
        ("channel-volume-down", Gesture::ChannelVolumeDown),
        ("channel-volume-max", Gesture::ChannelVolumeMax),
        ("channel-volume-min", Gesture::ChannelVolumeMin),
        ("channel-volume-average", Gesture::ChannelVolumeAverage),
        ("next-output-device", Gesture::NextOutputDevice),
        ("prev-output-device", Gesture::PrevOutputDevice),
    ]
}

/// The host-side interfaces the engine consumes.
#[derive(Clone)]
pub struct HostInterfaces {
    pub devices: Arc<dyn DeviceDriver>,
    pub sessions: Arc<dyn SessionDriver>,
    pub focus: Arc<dyn FocusTracker>,
    pub output: Arc<dyn OutputRouter>,
}

/// Owns the whole control surface: one method per logical gesture, driving
/// the selector, the source arithmetic, and the announcements.
///
/// Gestures are serialized by the host; the only background work is the
/// device scan. No failure in here ever escapes to the host - everything
/// degrades to an announcement.
pub struct CommandHandler<S: SpeechSender> {
    config: Config,
    state: StateStore,
    registry: DeviceRegistry,
    resolver: SessionResolver,
    selector: SourceSelector,
    switcher: OutputDeviceSwitcher,
    focus: Arc<dyn FocusTracker>,
    announcer: Announcer<S>,
}

impl<S: SpeechSender> CommandHandler<S> {
    pub fn new(
        config: Config,
        state: StateStore,
        host: HostInterfaces,
        announcer: Announcer<S>,
    ) -> Self {
        info!("Creating gesture command handler");
        Self {
            config,
            state,
            registry: DeviceRegistry::new(host.devices),
            resolver: SessionResolver::new(host.sessions),
            selector: SourceSelector::new(),
            switcher: OutputDeviceSwitcher::new(host.output),
            focus: host.focus,
            announcer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    pub fn announcer(&self) -> &Announcer<S> {
        &self.announcer
    }

    /// Rebuild the device registry from the current driver state, honoring
    /// hidden devices and the advanced-scan setting.
    pub async fn rescan_devices(&self) -> Result<usize> {
        self.registry
            .scan(self.state.hidden_devices(), self.config.control.advanced_scan)
            .await
    }

    /// Host notification that the focused application changed.
    pub fn on_focus_changed(&mut self) {
        if self.config.control.follow_focus {
            self.selector.reset();
        }
    }

    pub fn handle(&mut self, gesture: Gesture) {
        debug!("Handling gesture: {:?}", gesture);
        match gesture {
            Gesture::VolumeUp => self.volume_up(),
            Gesture::VolumeDown => self.volume_down(),
            Gesture::VolumeMax => self.volume_max(),
            Gesture::VolumeMin => self.volume_min(),
            Gesture::MuteToggle => self.mute_toggle(),
            Gesture::NextSource => self.next_source(),
            Gesture::PrevSource => self.prev_source(),
            Gesture::NextChannel => self.next_channel(),
            Gesture::PrevChannel => self.prev_channel(),
            Gesture::ChannelVolumeUp => self.channel_volume_up(),
            Gesture::ChannelVolumeDown => self.channel_volume_down(),
            Gesture::ChannelVolumeMax => self.channel_volume_max(),
            Gesture::ChannelVolumeMin => self.channel_volume_min(),
            Gesture::ChannelVolumeAverage => self.channel_volume_average(),
            Gesture::NextOutputDevice => self.next_output_device(),
            Gesture::PrevOutputDevice => self.prev_output_device(),
            Gesture::SwitchToOutputDevice(index) => self.switch_to_output_device(index),
        }
    }

    /// Resolve the focused application to an audio session. When it has
    /// none, announce so and abort the gesture without touching any state.
    fn resolve_focused_target(&mut self) -> bool {
        let app = self
            .focus
            .focused_process_name()
            .unwrap_or_else(|| UNKNOWN_PROCESS.to_string());
        match self.resolver.find(&app) {
            Some(session) => {
                self.selector.set_process(session.id());
                true
            }
            None => {
                self.announcer.no_sound(&app);
                false
            }
        }
    }

    /// The source the gesture applies to, announcing a session title on
    /// first touch after a source change.
    fn acquire_source(&mut self) -> Option<SelectedSource> {
        if self.selector.is_unresolved() && !self.resolve_focused_target() {
            return None;
        }
        let devices = self.registry.snapshot();
        let (source, title) = self.selector.current(&devices, &self.resolver);
        if let Some(title) = title {
            self.announcer.say(&title);
        }
        Some(source)
    }

    fn announce_reading(&self, reading: VolumeReading) {
        match reading {
            VolumeReading::Level(level) => self.announcer.volume(level),
            VolumeReading::Unsupported => self.announcer.not_supported(),
        }
    }

    pub fn volume_up(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().volume_up(&ctx);
        self.announce_reading(reading);
    }

    /// Decreasing past zero ends in an explicit muted state, never a silent
    /// 0% level.
    pub fn volume_down(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        match selected.source().volume_down(&ctx) {
            VolumeReading::Level(level) if level > 0.0 => self.announcer.volume(level),
            VolumeReading::Level(_) => {
                selected.source().mute(&ctx);
                self.announcer.muted();
            }
            VolumeReading::Unsupported => self.announcer.not_supported(),
        }
    }

    pub fn volume_max(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().volume_max(&ctx);
        self.announce_reading(reading);
    }

    pub fn volume_min(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().volume_min(&ctx);
        self.announce_reading(reading);
    }

    pub fn mute_toggle(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let source = selected.source();
        if source.is_muted(&ctx) {
            if source.unmute(&ctx) {
                self.announce_reading(source.volume_level());
            } else {
                self.announcer.not_supported();
            }
        } else if source.mute(&ctx) {
            self.announcer.muted();
        } else {
            self.announcer.not_supported();
        }
    }

    pub fn next_source(&mut self) {
        self.cycle_source(true);
    }

    pub fn prev_source(&mut self) {
        self.cycle_source(false);
    }

    fn cycle_source(&mut self, forward: bool) {
        let devices = self.registry.snapshot();
        let hidden = self.state.hidden_processes();
        let sessions = self
            .resolver
            .visible_process_names(&hidden, self.config.control.dedupe_sessions);
        let moved = if forward {
            self.selector.next(devices.len(), &sessions)
        } else {
            self.selector.prev(devices.len(), &sessions)
        };
        if moved.is_none() {
            // Every device and session vanished; nothing to select.
            self.announcer.not_supported();
            return;
        }
        let selection = self.selector.selected(&devices, &sessions, &self.resolver);
        self.announcer.say(&selection.title);
        if self.config.control.announce_status {
            let ctx = ControlContext {
                settings: &self.config.control,
                state: &self.state,
            };
            let source = selection.source.source();
            if source.is_muted(&ctx) {
                self.announcer.muted();
            } else {
                self.announce_reading(source.volume_level());
            }
        }
    }

    pub fn next_channel(&mut self) {
        self.cycle_channel(1);
    }

    pub fn prev_channel(&mut self) {
        self.cycle_channel(-1);
    }

    fn cycle_channel(&mut self, delta: i32) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let source = selected.source();
        match source.channel_step(delta) {
            None => self.announcer.not_supported(),
            Some(channel) => {
                self.announcer.channel(channel);
                if self.config.control.announce_status {
                    let ctx = ControlContext {
                        settings: &self.config.control,
                        state: &self.state,
                    };
                    if source.is_muted(&ctx) {
                        self.announcer.muted();
                    } else {
                        self.announce_reading(source.channel_volume_level(channel));
                    }
                }
            }
        }
    }

    pub fn channel_volume_up(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().channel_volume_up(&ctx);
        self.announce_reading(reading);
    }

    pub fn channel_volume_down(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().channel_volume_down(&ctx);
        self.announce_reading(reading);
    }

    pub fn channel_volume_max(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().channel_volume_max(&ctx);
        self.announce_reading(reading);
    }

    pub fn channel_volume_min(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        let reading = selected.source().channel_volume_min(&ctx);
        self.announce_reading(reading);
    }

    pub fn channel_volume_average(&mut self) {
        let Some(selected) = self.acquire_source() else {
            return;
        };
        let reading = selected.source().channel_volume_average();
        self.announce_reading(reading);
    }

    pub fn next_output_device(&mut self) {
        self.switch_output_adjacent(1);
    }

    pub fn prev_output_device(&mut self) {
        self.switch_output_adjacent(-1);
    }

    fn switch_output_adjacent(&mut self, step: i32) {
        match self.switcher.select_adjacent(step) {
            Some(name) => self.apply_output_device(&name),
            None => self.announcer.not_supported(),
        }
    }

    pub fn switch_to_output_device(&mut self, index: usize) {
        match self.switcher.select_index(index) {
            Some(name) => self.apply_output_device(&name),
            None => self.announcer.not_supported(),
        }
    }

    fn apply_output_device(&self, name: &str) {
        match self.switcher.switch_to(name) {
            Ok(()) => self.announcer.say(name),
            Err(e) => {
                warn!("Output device switch failed: {}", e);
                self.announcer.not_supported();
            }
        }
    }

    /// Unmute every device and visible session this tool muted. Used on
    /// shutdown when `unmute_on_exit` is set.
    pub fn unmute_all(&self) {
        let ctx = ControlContext {
            settings: &self.config.control,
            state: &self.state,
        };
        for device in self.registry.snapshot().iter() {
            if device.is_muted(&ctx) {
                device.unmute(&ctx);
            }
        }
        let hidden = self.state.hidden_processes();
        for name in self.resolver.visible_process_names(&hidden, true) {
            let session = self.resolver.resolve(&name);
            if session.is_muted(&ctx) {
                session.unmute(&ctx);
            }
        }
    }

    pub fn shutdown(&self) {
        if self.config.control.unmute_on_exit {
            info!("Unmuting all sources on shutdown");
            self.unmute_all();
        }
    }
}
