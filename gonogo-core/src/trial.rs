use serde::Serialize;

use crate::StimulusKind;

/// Run-level state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    AwaitingInterval,
    StimulusVisible,
    InterTrialGap,
    Complete,
}

impl RunState {
    /// True between a successful start and completion or abort.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            RunState::AwaitingInterval | RunState::StimulusVisible | RunState::InterTrialGap
        )
    }

    pub fn accepts_response(&self) -> bool {
        matches!(self, RunState::StimulusVisible)
    }
}

/// One planned trial. Ordinals start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSpec {
    pub ordinal: u32,
    pub kind: StimulusKind,
}

/// Recorded result per trial.
///
/// Only constructible through [`TrialOutcome::responded`] and
/// [`TrialOutcome::withheld`], so `correct` always agrees with `kind` and
/// `responded`, and a reaction time exists exactly when a response does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialOutcome {
    ordinal: u32,
    kind: StimulusKind,
    responded: bool,
    correct: bool,
    reaction_time_ms: Option<u64>,
    completed_at_epoch_ms: u64,
}

impl TrialOutcome {
    pub fn responded(spec: &TrialSpec, reaction_time_ms: u64, completed_at_epoch_ms: u64) -> Self {
        Self {
            ordinal: spec.ordinal,
            kind: spec.kind,
            responded: true,
            correct: spec.kind.is_correct(true),
            reaction_time_ms: Some(reaction_time_ms),
            completed_at_epoch_ms,
        }
    }

    pub fn withheld(spec: &TrialSpec, completed_at_epoch_ms: u64) -> Self {
        Self {
            ordinal: spec.ordinal,
            kind: spec.kind,
            responded: false,
            correct: spec.kind.is_correct(false),
            reaction_time_ms: None,
            completed_at_epoch_ms,
        }
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn kind(&self) -> StimulusKind {
        self.kind
    }

    pub fn is_responded(&self) -> bool {
        self.responded
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    pub fn reaction_time_ms(&self) -> Option<u64> {
        self.reaction_time_ms
    }

    pub fn completed_at_epoch_ms(&self) -> u64 {
        self.completed_at_epoch_ms
    }
}
