use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::system::OutputRouter;

/// Name some hosts report for the default output slot, alongside an empty
/// string; both are normalized to this label before announcing.
pub const DEFAULT_OUTPUT_LABEL: &str = "Microsoft Sound Mapper";

/// Cycles the screen reader's own speech output across the available output
/// devices.
///
/// Intentionally independent of the device registry: this chooses where
/// spoken feedback is rendered, not which application's volume is adjusted.
/// The name list is fetched fresh on every call because devices come and go.
pub struct OutputDeviceSwitcher {
    router: Arc<dyn OutputRouter>,
}

impl OutputDeviceSwitcher {
    pub fn new(router: Arc<dyn OutputRouter>) -> Self {
        Self { router }
    }

    fn device_names(&self) -> Vec<String> {
        let mut names = self.router.output_device_names();
        if let Some(first) = names.first_mut() {
            if first.is_empty() || first == DEFAULT_OUTPUT_LABEL {
                *first = DEFAULT_OUTPUT_LABEL.to_string();
            }
        }
        names
    }

    /// The device name `step` positions away from the currently configured
    /// one, wrapping around the list. Falls back to position 0 when the
    /// configured device is not in the list (e.g. first run).
    pub fn select_adjacent(&self, step: i32) -> Option<String> {
        let names = self.device_names();
        if names.is_empty() {
            return None;
        }
        let active = self.router.active_output_device();
        let current = names.iter().position(|n| *n == active).unwrap_or(0);
        let target = (current as i64 + step as i64).rem_euclid(names.len() as i64) as usize;
        Some(names[target].clone())
    }

    /// The device name at a fixed position, for the numbered direct-select
    /// gestures. The list is resolved at dispatch time.
    pub fn select_index(&self, index: usize) -> Option<String> {
        self.device_names().get(index).cloned()
    }

    /// Route speech to the named device and restart tone generation so
    /// non-speech audio follows it.
    pub fn switch_to(&self, name: &str) -> Result<()> {
        info!("Switching speech output to: {}", name);
        self.router.set_active_output_device(name)?;
        if let Err(e) = self.router.reinit_tones() {
            debug!("Tone generator restart failed: {}", e);
        }
        Ok(())
    }
}
