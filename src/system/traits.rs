use anyhow::Result;
use std::sync::Arc;

/// A single audio endpoint as reported by the driver's enumeration,
/// before a control handle has been activated for it.
#[derive(Debug, Clone, Default)]
pub struct EndpointDescriptor {
    pub id: String,
    pub friendly_name: String,
}

/// Volume control handle for one physical output endpoint.
///
/// Every method may fail at any time: the endpoint can disappear between
/// enumeration and use. Callers convert failures to sentinel values and
/// never propagate them further.
pub trait DeviceVolume: Send + Sync {
    fn master_volume(&self) -> Result<f32>;
    fn set_master_volume(&self, level: f32) -> Result<()>;
    fn channel_count(&self) -> Result<u32>;
    fn channel_volume(&self, channel: u32) -> Result<f32>;
    fn set_channel_volume(&self, channel: u32, level: f32) -> Result<()>;
    fn mute(&self) -> Result<bool>;
    fn set_mute(&self, muted: bool) -> Result<()>;
}

/// Trait for endpoint enumeration - abstracts the platform audio driver
pub trait DeviceDriver: Send + Sync {
    /// Enumerate all output endpoints known to the system
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointDescriptor>>;

    /// The OS-designated default output endpoint
    fn default_endpoint(&self) -> Result<EndpointDescriptor>;

    /// Activate a volume control handle for the endpoint with the given id
    fn activate(&self, endpoint_id: &str) -> Result<Arc<dyn DeviceVolume>>;
}

/// Volume control handle for one process audio session.
pub trait SessionVolume: Send + Sync {
    fn master_volume(&self) -> Result<f32>;
    fn set_master_volume(&self, level: f32) -> Result<()>;
    fn mute(&self) -> Result<bool>;
    fn set_mute(&self, muted: bool) -> Result<()>;
}

/// A live audio session belonging to one running process.
#[derive(Clone)]
pub struct SessionHandle {
    pub process_name: String,
    pub display_name: String,
    pub volume: Arc<dyn SessionVolume>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("process_name", &self.process_name)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Trait for session enumeration - sessions appear and vanish continuously
/// as processes start, stop, and play audio, so the list is fetched fresh
/// for every lookup and never cached.
pub trait SessionDriver: Send + Sync {
    fn enumerate_sessions(&self) -> Result<Vec<SessionHandle>>;
}

/// Reports which process currently has input focus.
pub trait FocusTracker: Send + Sync {
    fn focused_process_name(&self) -> Option<String>;
}

/// Routing of the screen reader's own speech and tone output.
///
/// This is distinct from `DeviceDriver`: it selects where spoken feedback is
/// rendered, not which application's volume is controlled.
pub trait OutputRouter: Send + Sync {
    /// Ordered list of output device names as the host reports them
    fn output_device_names(&self) -> Vec<String>;

    /// Name of the currently configured output device (may be empty on first run)
    fn active_output_device(&self) -> String;

    /// Apply the given device to the speech subsystem
    fn set_active_output_device(&self, name: &str) -> Result<()>;

    /// Restart tone generation so non-speech audio follows the speech output
    fn reinit_tones(&self) -> Result<()>;
}
