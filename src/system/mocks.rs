use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::system::traits::{
    DeviceDriver, DeviceVolume, EndpointDescriptor, FocusTracker, OutputRouter, SessionDriver,
    SessionHandle, SessionVolume,
};

/// Mock volume handle for testing - implements both the device and the
/// session control surface over the same controllable state.
pub struct MockVolume {
    pub level: Mutex<f32>,
    pub muted: Mutex<bool>,
    pub channels: Mutex<Vec<f32>>,
    pub should_fail: Mutex<bool>,
}

impl MockVolume {
    pub fn new(level: f32) -> Arc<Self> {
        Arc::new(Self {
            level: Mutex::new(level),
            muted: Mutex::new(false),
            channels: Mutex::new(Vec::new()),
            should_fail: Mutex::new(false),
        })
    }

    pub fn with_channels(level: f32, channels: Vec<f32>) -> Arc<Self> {
        let volume = Self::new(level);
        *volume.channels.lock().unwrap() = channels;
        volume
    }

    /// Make every driver call on this handle fail, simulating a source that
    /// vanished between enumeration and use.
    pub fn set_failure(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn current_level(&self) -> f32 {
        *self.level.lock().unwrap()
    }

    pub fn is_muted(&self) -> bool {
        *self.muted.lock().unwrap()
    }

    pub fn channel_levels(&self) -> Vec<f32> {
        self.channels.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock volume handle failure"));
        }
        Ok(())
    }
}

impl DeviceVolume for MockVolume {
    fn master_volume(&self) -> Result<f32> {
        self.check()?;
        Ok(*self.level.lock().unwrap())
    }

    fn set_master_volume(&self, level: f32) -> Result<()> {
        self.check()?;
        *self.level.lock().unwrap() = level;
        Ok(())
    }

    fn channel_count(&self) -> Result<u32> {
        self.check()?;
        Ok(self.channels.lock().unwrap().len() as u32)
    }

    fn channel_volume(&self, channel: u32) -> Result<f32> {
        self.check()?;
        self.channels
            .lock()
            .unwrap()
            .get(channel as usize)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("No such channel: {}", channel))
    }

    fn set_channel_volume(&self, channel: u32, level: f32) -> Result<()> {
        self.check()?;
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(channel as usize) {
            Some(slot) => {
                *slot = level;
                Ok(())
            }
            None => Err(anyhow::anyhow!("No such channel: {}", channel)),
        }
    }

    fn mute(&self) -> Result<bool> {
        self.check()?;
        Ok(*self.muted.lock().unwrap())
    }

    fn set_mute(&self, muted: bool) -> Result<()> {
        self.check()?;
        *self.muted.lock().unwrap() = muted;
        Ok(())
    }
}

impl SessionVolume for MockVolume {
    fn master_volume(&self) -> Result<f32> {
        DeviceVolume::master_volume(self)
    }

    fn set_master_volume(&self, level: f32) -> Result<()> {
        DeviceVolume::set_master_volume(self, level)
    }

    fn mute(&self) -> Result<bool> {
        DeviceVolume::mute(self)
    }

    fn set_mute(&self, muted: bool) -> Result<()> {
        DeviceVolume::set_mute(self, muted)
    }
}

/// Mock endpoint driver for testing - provides controllable enumeration
/// behavior, including endpoints that refuse to activate.
pub struct MockDeviceDriver {
    pub endpoints: Mutex<Vec<(EndpointDescriptor, Option<Arc<MockVolume>>)>>,
    pub default_id: Mutex<Option<String>>,
    pub should_fail_enumeration: Mutex<bool>,
    pub should_fail_default: Mutex<bool>,
}

impl MockDeviceDriver {
    pub fn new() -> Self {
        Self {
            endpoints: Mutex::new(Vec::new()),
            default_id: Mutex::new(None),
            should_fail_enumeration: Mutex::new(false),
            should_fail_default: Mutex::new(false),
        }
    }

    /// Add an endpoint; pass None as volume to simulate activation failure.
    pub fn add_endpoint(&self, id: &str, name: &str, volume: Option<Arc<MockVolume>>) {
        self.endpoints.lock().unwrap().push((
            EndpointDescriptor {
                id: id.to_string(),
                friendly_name: name.to_string(),
            },
            volume,
        ));
    }

    pub fn set_default_id(&self, id: &str) {
        *self.default_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn set_enumeration_failure(&self, should_fail: bool) {
        *self.should_fail_enumeration.lock().unwrap() = should_fail;
    }

    pub fn set_default_failure(&self, should_fail: bool) {
        *self.should_fail_default.lock().unwrap() = should_fail;
    }
}

impl Default for MockDeviceDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDriver for MockDeviceDriver {
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointDescriptor>> {
        if *self.should_fail_enumeration.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock enumeration failure"));
        }
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .map(|(descriptor, _)| descriptor.clone())
            .collect())
    }

    fn default_endpoint(&self) -> Result<EndpointDescriptor> {
        if *self.should_fail_default.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock default endpoint failure"));
        }
        let default_id = self.default_id.lock().unwrap().clone();
        let id = default_id.ok_or_else(|| anyhow::anyhow!("No default endpoint configured"))?;
        let endpoints = self.endpoints.lock().unwrap();
        match endpoints.iter().find(|(d, _)| d.id == id) {
            Some((descriptor, _)) => Ok(descriptor.clone()),
            // Default endpoints are not always part of the enumerable set
            None => Ok(EndpointDescriptor {
                id,
                friendly_name: String::new(),
            }),
        }
    }

    fn activate(&self, endpoint_id: &str) -> Result<Arc<dyn DeviceVolume>> {
        let endpoints = self.endpoints.lock().unwrap();
        let entry = endpoints
            .iter()
            .find(|(descriptor, _)| descriptor.id == endpoint_id);
        match entry {
            Some((_, Some(volume))) => Ok(Arc::clone(volume) as Arc<dyn DeviceVolume>),
            Some((_, None)) => Err(anyhow::anyhow!("Mock activation failure: {}", endpoint_id)),
            None => Err(anyhow::anyhow!("No such endpoint: {}", endpoint_id)),
        }
    }
}

/// Mock session driver for testing - the session list is fully controllable
/// between calls, mirroring how real sessions come and go.
pub struct MockSessionDriver {
    pub sessions: Mutex<Vec<SessionHandle>>,
    pub should_fail: Mutex<bool>,
}

impl MockSessionDriver {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            should_fail: Mutex::new(false),
        }
    }

    pub fn add_session(&self, process_name: &str, display_name: &str, volume: Arc<MockVolume>) {
        self.sessions.lock().unwrap().push(SessionHandle {
            process_name: process_name.to_string(),
            display_name: display_name.to_string(),
            volume,
        });
    }

    pub fn remove_session(&self, process_name: &str) {
        self.sessions
            .lock()
            .unwrap()
            .retain(|s| s.process_name != process_name);
    }

    pub fn clear(&self) {
        self.sessions.lock().unwrap().clear();
    }

    pub fn set_failure(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }
}

impl Default for MockSessionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionDriver for MockSessionDriver {
    fn enumerate_sessions(&self) -> Result<Vec<SessionHandle>> {
        if *self.should_fail.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock session enumeration failure"));
        }
        Ok(self.sessions.lock().unwrap().clone())
    }
}

/// Mock focus tracker for testing.
pub struct MockFocusTracker {
    pub focused: Mutex<Option<String>>,
}

impl MockFocusTracker {
    pub fn new() -> Self {
        Self {
            focused: Mutex::new(None),
        }
    }

    pub fn focus(&self, process_name: &str) {
        *self.focused.lock().unwrap() = Some(process_name.to_string());
    }
}

impl Default for MockFocusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTracker for MockFocusTracker {
    fn focused_process_name(&self) -> Option<String> {
        self.focused.lock().unwrap().clone()
    }
}

/// Mock output router for testing - records every applied device and tone
/// restart.
pub struct MockOutputRouter {
    pub names: Mutex<Vec<String>>,
    pub active: Mutex<String>,
    pub applied: Mutex<Vec<String>>,
    pub tone_restarts: AtomicUsize,
    pub should_fail_switch: Mutex<bool>,
}

impl MockOutputRouter {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            active: Mutex::new(String::new()),
            applied: Mutex::new(Vec::new()),
            tone_restarts: AtomicUsize::new(0),
            should_fail_switch: Mutex::new(false),
        }
    }

    pub fn set_active(&self, name: &str) {
        *self.active.lock().unwrap() = name.to_string();
    }

    pub fn applied_devices(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    pub fn tone_restart_count(&self) -> usize {
        self.tone_restarts.load(Ordering::Relaxed)
    }

    pub fn set_switch_failure(&self, should_fail: bool) {
        *self.should_fail_switch.lock().unwrap() = should_fail;
    }
}

impl OutputRouter for MockOutputRouter {
    fn output_device_names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    fn active_output_device(&self) -> String {
        self.active.lock().unwrap().clone()
    }

    fn set_active_output_device(&self, name: &str) -> Result<()> {
        if *self.should_fail_switch.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock switch failure"));
        }
        *self.active.lock().unwrap() = name.to_string();
        self.applied.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn reinit_tones(&self) -> Result<()> {
        self.tone_restarts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
