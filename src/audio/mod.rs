pub mod device;
pub mod registry;
pub mod session;
pub mod source;

pub use device::AudioDevice;
pub use registry::DeviceRegistry;
pub use session::{AudioSession, SessionResolver, SCREEN_READER_PROCESS, UNKNOWN_PROCESS};
pub use source::{AudioSource, ControlContext, VolumeReading};
