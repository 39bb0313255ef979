pub mod audio;
pub mod commands;
pub mod config;
pub mod logging;
pub mod selector;
pub mod speech;
pub mod system;

pub use audio::{AudioDevice, AudioSession, AudioSource, DeviceRegistry, SessionResolver};
pub use commands::{CommandHandler, DefaultCommandHandler, Gesture, HostInterfaces};
pub use config::{Config, StateStore};
pub use speech::Announcer;

#[cfg(any(test, feature = "test-mocks"))]
pub use speech::TestSpeechSender;
