pub mod audio;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod processing;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use audio::RawBlock;
pub use config::DemodConfig;
pub use driver::{RunSummary, StopReason, run_pipeline};
pub use error::{DemodError, Result};
pub use processing::FmReceiver;
pub use wav::save_wav;
