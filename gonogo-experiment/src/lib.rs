pub mod config;
pub mod error;
pub mod state;
pub mod trial;
pub use config::{TaskConfig, MAX_DURATION_MS};
pub use error::{ConfigError, SequencerError};
pub use state::{Sequencer, SequencerEvent, SequencerSignal, TimerPurpose};
pub use trial::{generate_trials, go_count};
