pub mod state;
pub mod types;

pub use state::{PersistentState, StateStore};
pub use types::{Config, ControlConfig, GeneralConfig};
