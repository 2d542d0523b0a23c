use serde::Serialize;

use crate::error::ConfigError;

/// Fixed task parameters. Not editable by the participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskConfig {
    pub trial_count: usize,
    /// Share of go trials, in [0, 1].
    pub go_ratio: f64,
    /// How long the stimulus stays up; also the response window.
    pub stimulus_duration_ms: u64,
    /// Blank interval before each stimulus.
    pub iti_duration_ms: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            trial_count: 20,
            go_ratio: 0.7,
            stimulus_duration_ms: 1500,
            iti_duration_ms: 1000,
        }
    }
}

/// Longest stimulus or interval a run accepts, one hour.
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;

impl TaskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_design(self.trial_count, self.go_ratio)?;
        if self.stimulus_duration_ms == 0 {
            return Err(ConfigError::ZeroStimulusDuration);
        }
        check_duration("stimulus duration", self.stimulus_duration_ms)?;
        check_duration("inter-trial interval", self.iti_duration_ms)?;
        Ok(())
    }
}

fn check_duration(name: &'static str, ms: u64) -> Result<(), ConfigError> {
    if ms > MAX_DURATION_MS {
        return Err(ConfigError::DurationTooLong {
            name,
            ms,
            max: MAX_DURATION_MS,
        });
    }
    Ok(())
}

pub(crate) fn check_design(count: usize, go_ratio: f64) -> Result<(), ConfigError> {
    if count == 0 {
        return Err(ConfigError::NoTrials);
    }
    if count > u32::MAX as usize {
        return Err(ConfigError::TooManyTrials(count));
    }
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&go_ratio) {
        return Err(ConfigError::GoRatioOutOfRange(go_ratio));
    }
    Ok(())
}
