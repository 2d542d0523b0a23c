use thiserror::Error;

use crate::TrialOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("outcome for trial {got} appended out of order (expected trial {expected})")]
    OutOfOrder { expected: u32, got: u32 },
}

/// Append-only log of trial outcomes, in presentation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultLog {
    outcomes: Vec<TrialOutcome>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Appends the outcome of the next trial. Ordinals must be contiguous from 1.
    pub fn append(&mut self, outcome: TrialOutcome) -> Result<(), LogError> {
        let expected = self.outcomes.len() as u32 + 1;
        if outcome.ordinal() != expected {
            return Err(LogError::OutOfOrder {
                expected,
                got: outcome.ordinal(),
            });
        }
        self.outcomes.push(outcome);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn last(&self) -> Option<&TrialOutcome> {
        self.outcomes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialOutcome> {
        self.outcomes.iter()
    }

    pub fn as_slice(&self) -> &[TrialOutcome] {
        &self.outcomes
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a TrialOutcome;
    type IntoIter = std::slice::Iter<'a, TrialOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
