use gonogo_core::LogError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("trial count must be positive")]
    NoTrials,
    #[error("trial count {0} exceeds the ordinal range")]
    TooManyTrials(usize),
    #[error("go ratio {0} is outside [0, 1]")]
    GoRatioOutOfRange(f64),
    #[error("stimulus duration must be positive")]
    ZeroStimulusDuration,
    #[error("{name} of {ms}ms exceeds the {max}ms limit")]
    DurationTooLong {
        name: &'static str,
        ms: u64,
        max: u64,
    },
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error(transparent)]
    Log(#[from] LogError),
}
