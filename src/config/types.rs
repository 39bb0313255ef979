use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub control: ControlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub log_to_file: bool,
}

/// Behavior of the volume gestures themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Volume change per gesture, in whole percentage points
    pub step: u8,

    /// Announce mute state or volume level after selecting a source or channel
    pub announce_status: bool,

    /// Reset the source cursor whenever the focused application changes
    pub follow_focus: bool,

    /// Collapse repeated process names when listing audio sessions
    pub dedupe_sessions: bool,

    /// Enumerate and control every output device, not just the default one
    pub advanced_scan: bool,

    /// Use the driver's native mute flag instead of volume reduction
    pub mute_completely: bool,

    /// Volume reduction applied by the partial mute mode, in percent
    pub mute_percentage: u8,

    /// Unmute every source muted through this tool on shutdown
    pub unmute_on_exit: bool,

    /// Bind the built-in gesture set at startup
    pub default_gestures: bool,
}

pub const STEP_RANGE: std::ops::RangeInclusive<u8> = 1..=20;
pub const MUTE_PERCENTAGE_RANGE: std::ops::RangeInclusive<u8> = 1..=99;

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            step: 1,
            announce_status: true,
            follow_focus: true,
            dedupe_sessions: true,
            advanced_scan: false,
            mute_completely: false,
            mute_percentage: 75,
            unmute_on_exit: true,
            default_gestures: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(path) => PathBuf::from(path),
            None => Self::default_config_path()?,
        };

        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            info!("Configuration file not found, creating default configuration");
            return Self::create_default_config(&path);
        }

        let config_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        config.control = config.control.clamped();

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn save(&self, config_path: Option<&str>) -> Result<()> {
        let path = match config_path {
            Some(path) => PathBuf::from(path),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(&path, config_content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home_dir.join(".config/volume-gestures/config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<Self> {
        let config = Config::default();

        // The path may be invalid or unwritable; a missing file is never fatal
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(
                    "Could not create config directory {}: {}. Using default config without saving.",
                    parent.display(),
                    e
                );
                return Ok(config);
            }
        }

        if let Err(e) = config.save(path.to_str()) {
            warn!(
                "Could not save default config to {}: {}. Using default config.",
                path.display(),
                e
            );
            return Ok(config);
        }

        info!("Created default configuration file: {}", path.display());
        Ok(config)
    }
}

impl ControlConfig {
    /// Force out-of-range values back to the nearest bound.
    pub fn clamped(mut self) -> Self {
        if !STEP_RANGE.contains(&self.step) {
            let clamped = self.step.clamp(*STEP_RANGE.start(), *STEP_RANGE.end());
            warn!("Volume step {} out of range, using {}", self.step, clamped);
            self.step = clamped;
        }
        if !MUTE_PERCENTAGE_RANGE.contains(&self.mute_percentage) {
            let clamped = self
                .mute_percentage
                .clamp(*MUTE_PERCENTAGE_RANGE.start(), *MUTE_PERCENTAGE_RANGE.end());
            warn!(
                "Mute percentage {} out of range, using {}",
                self.mute_percentage, clamped
            );
            self.mute_percentage = clamped;
        }
        self
    }
}
