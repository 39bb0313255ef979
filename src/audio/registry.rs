use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::audio::device::AudioDevice;
use crate::audio::source::AudioSource;
use crate::system::DeviceDriver;

/// Ordered collection of output devices, rebuilt wholesale by `scan`.
///
/// The list is never patched in place: a scan builds a complete replacement on
/// a blocking worker and swaps it in atomically, so gestures racing a scan
/// read the previous snapshot rather than a half-built one. The default
/// device is always present and always at index 0.
pub struct DeviceRegistry {
    driver: Arc<dyn DeviceDriver>,
    devices: RwLock<Arc<Vec<Arc<AudioDevice>>>>,
}

impl DeviceRegistry {
    pub fn new(driver: Arc<dyn DeviceDriver>) -> Self {
        Self {
            driver,
            devices: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Rebuild the device list off the caller's thread. Enumeration is slow
    /// enough on some systems to stall gesture handling if run inline.
    ///
    /// Concurrent scans race benignly: both are pure reads of system state
    /// and the last swap wins.
    pub async fn scan(
        &self,
        hidden: BTreeMap<String, String>,
        advanced: bool,
    ) -> Result<usize> {
        let driver = Arc::clone(&self.driver);
        let built = tokio::task::spawn_blocking(move || {
            build_device_list(driver.as_ref(), &hidden, advanced)
        })
        .await
        .context("Device scan task failed")?;

        let count = built.len();
        *self.devices.write().unwrap() = Arc::new(built);
        info!("Device registry rebuilt with {} devices", count);
        Ok(count)
    }

    /// The current device list. Cheap to clone; stays valid while a scan is
    /// in flight.
    pub fn snapshot(&self) -> Arc<Vec<Arc<AudioDevice>>> {
        Arc::clone(&self.devices.read().unwrap())
    }

    pub fn len(&self) -> usize {
        self.devices.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerate, activate, and order the output devices.
///
/// Endpoints whose control handle cannot be activated are expected on some
/// systems and simply skipped. Hidden endpoints are filtered here, at build
/// time; hiding is not a runtime flag. Whatever happens, exactly one default
/// entry ends up at index 0 - synthesized from the OS default endpoint if the
/// advanced enumeration missed it, failed, filtered it out, or was disabled.
fn build_device_list(
    driver: &dyn DeviceDriver,
    hidden: &BTreeMap<String, String>,
    advanced: bool,
) -> Vec<Arc<AudioDevice>> {
    let default_endpoint = match driver.default_endpoint() {
        Ok(endpoint) => Some(endpoint),
        Err(e) => {
            warn!("Could not determine the default endpoint: {}", e);
            None
        }
    };
    let default_id = default_endpoint.as_ref().map(|d| d.id.clone());

    let mut devices: Vec<Arc<AudioDevice>> = Vec::new();

    if advanced {
        let endpoints = match driver.enumerate_endpoints() {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!("Endpoint enumeration failed: {}", e);
                Vec::new()
            }
        };
        for endpoint in endpoints {
            if endpoint.id.is_empty() || hidden.contains_key(&endpoint.id) {
                continue;
            }
            let volume = match driver.activate(&endpoint.id) {
                Ok(volume) => volume,
                Err(e) => {
                    debug!("Skipping endpoint {}: activation failed: {}", endpoint.id, e);
                    continue;
                }
            };
            let name = if endpoint.friendly_name.is_empty() {
                endpoint.id.clone()
            } else {
                endpoint.friendly_name.clone()
            };
            let is_default = default_id.as_deref() == Some(endpoint.id.as_str());
            let device = Arc::new(
                AudioDevice::new(endpoint.id, name)
                    .with_volume(volume)
                    .set_default(is_default),
            );
            if is_default {
                devices.insert(0, device);
            } else {
                devices.push(device);
            }
        }
    }

    // The default output device must never be absent, even when the advanced
    // path is disabled or failed to surface it.
    if !devices.iter().any(|d| d.is_default_device()) {
        let id = default_id.clone().unwrap_or_else(|| "default".to_string());
        let name = default_endpoint
            .map(|d| d.friendly_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| lookup_endpoint_name(driver, &id));
        let mut device = AudioDevice::new(id.clone(), name);
        match driver.activate(&id) {
            Ok(volume) => device = device.with_volume(volume),
            Err(e) => debug!("Default endpoint {} has no control handle: {}", id, e),
        }
        devices.insert(0, Arc::new(device.set_default(true)));
    }

    devices
}

fn lookup_endpoint_name(driver: &dyn DeviceDriver, id: &str) -> String {
    driver
        .enumerate_endpoints()
        .ok()
        .and_then(|endpoints| endpoints.into_iter().find(|e| e.id == id))
        .map(|e| e.friendly_name)
        .unwrap_or_default()
}
