use anyhow::Result;
use std::sync::Arc;

use crate::system::traits::{
    DeviceDriver, DeviceVolume, EndpointDescriptor, FocusTracker, OutputRouter, SessionDriver,
    SessionHandle,
};

/// Stand-in driver used when no platform audio backend is attached, e.g. by
/// the CLI on an unsupported system. Everything enumerates empty and every
/// control call reports the feature as unavailable, which the core already
/// degrades to sentinels and "not supported" announcements.
///
/// Host integrations replace this by implementing the `system::traits` seams
/// over their native audio bindings.
pub struct DetachedAudioSystem;

impl DeviceDriver for DetachedAudioSystem {
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointDescriptor>> {
        Ok(Vec::new())
    }

    fn default_endpoint(&self) -> Result<EndpointDescriptor> {
        Err(anyhow::anyhow!("No audio backend attached"))
    }

    fn activate(&self, endpoint_id: &str) -> Result<Arc<dyn DeviceVolume>> {
        Err(anyhow::anyhow!(
            "No audio backend attached, cannot activate {}",
            endpoint_id
        ))
    }
}

impl SessionDriver for DetachedAudioSystem {
    fn enumerate_sessions(&self) -> Result<Vec<SessionHandle>> {
        Ok(Vec::new())
    }
}

impl FocusTracker for DetachedAudioSystem {
    fn focused_process_name(&self) -> Option<String> {
        None
    }
}

impl OutputRouter for DetachedAudioSystem {
    fn output_device_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn active_output_device(&self) -> String {
        String::new()
    }

    fn set_active_output_device(&self, name: &str) -> Result<()> {
        Err(anyhow::anyhow!(
            "No audio backend attached, cannot switch to {}",
            name
        ))
    }

    fn reinit_tones(&self) -> Result<()> {
        Ok(())
    }
}
