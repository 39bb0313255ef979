//! Shared fixtures for the integration tests.
//!
//! Individual helpers may not be used by every test file, so dead code
//! warnings are suppressed.

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;

use volume_gestures::commands::{DefaultCommandHandler, HostInterfaces};
use volume_gestures::config::{Config, ControlConfig, StateStore};
use volume_gestures::speech::DefaultAnnouncer;
use volume_gestures::system::{
    MockDeviceDriver, MockFocusTracker, MockOutputRouter, MockSessionDriver, MockVolume,
};

/// A complete mock host: drivers, focus, output routing, and a scratch
/// directory for the persisted state document.
pub struct TestWorld {
    pub devices: Arc<MockDeviceDriver>,
    pub sessions: Arc<MockSessionDriver>,
    pub focus: Arc<MockFocusTracker>,
    pub output: Arc<MockOutputRouter>,
    pub dir: TempDir,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            devices: Arc::new(MockDeviceDriver::new()),
            sessions: Arc::new(MockSessionDriver::new()),
            focus: Arc::new(MockFocusTracker::new()),
            output: Arc::new(MockOutputRouter::new(&[])),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with_output_devices(names: &[&str]) -> Self {
        let mut world = Self::new();
        world.output = Arc::new(MockOutputRouter::new(names));
        world
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::load(self.dir.path().join("state.json"))
    }

    pub fn host(&self) -> HostInterfaces {
        HostInterfaces {
            devices: self.devices.clone(),
            sessions: self.sessions.clone(),
            focus: self.focus.clone(),
            output: self.output.clone(),
        }
    }

    pub fn handler(&self, config: Config) -> DefaultCommandHandler {
        DefaultCommandHandler::new(config, self.state_store(), self.host(), DefaultAnnouncer::new())
    }

    /// Convenience: a session backed by a fresh mock volume handle.
    pub fn add_session(&self, process_name: &str, level: f32) -> Arc<MockVolume> {
        let volume = MockVolume::new(level);
        self.sessions.add_session(process_name, "", volume.clone());
        volume
    }

    /// Convenience: an activatable endpoint; marks it default when asked.
    pub fn add_device(&self, id: &str, name: &str, level: f32, default: bool) -> Arc<MockVolume> {
        let volume = MockVolume::new(level);
        self.devices.add_endpoint(id, name, Some(volume.clone()));
        if default {
            self.devices.set_default_id(id);
        }
        volume
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for control settings used across the arithmetic tests.
pub struct ControlConfigBuilder {
    control: ControlConfig,
}

impl ControlConfigBuilder {
    pub fn new() -> Self {
        Self {
            control: ControlConfig::default(),
        }
    }

    pub fn step(mut self, step: u8) -> Self {
        self.control.step = step;
        self
    }

    pub fn mute_completely(mut self) -> Self {
        self.control.mute_completely = true;
        self
    }

    pub fn mute_percentage(mut self, percentage: u8) -> Self {
        self.control.mute_percentage = percentage;
        self
    }

    pub fn advanced_scan(mut self) -> Self {
        self.control.advanced_scan = true;
        self
    }

    pub fn no_status(mut self) -> Self {
        self.control.announce_status = false;
        self
    }

    pub fn no_follow_focus(mut self) -> Self {
        self.control.follow_focus = false;
        self
    }

    pub fn keep_duplicates(mut self) -> Self {
        self.control.dedupe_sessions = false;
        self
    }

    pub fn build(self) -> ControlConfig {
        self.control
    }

    pub fn build_config(self) -> Config {
        Config {
            control: self.control,
            ..Config::default()
        }
    }
}

impl Default for ControlConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
