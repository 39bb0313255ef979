pub mod adapters;
pub mod traits;

// Mock implementations for testing
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use adapters::DetachedAudioSystem;
pub use traits::{
    DeviceDriver, DeviceVolume, EndpointDescriptor, FocusTracker, OutputRouter, SessionDriver,
    SessionHandle, SessionVolume,
};

#[cfg(any(test, feature = "test-mocks"))]
pub use mocks::{
    MockDeviceDriver, MockFocusTracker, MockOutputRouter, MockSessionDriver, MockVolume,
};
