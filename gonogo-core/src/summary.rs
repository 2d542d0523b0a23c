use serde::Serialize;

use crate::{StimulusKind, TrialOutcome};

/// Aggregate scores of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_trials: usize,
    pub correct_count: usize,
    pub accuracy_pct: f64,
    pub go_accuracy_pct: f64,
    pub nogo_accuracy_pct: f64,
    /// Mean over go trials that carry a reaction time; 0 when there are none.
    pub average_reaction_time_ms: f64,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Scores a result log. Pure; an empty log yields an all-zero summary.
pub fn summarize(outcomes: &[TrialOutcome]) -> Summary {
    let correct_count = outcomes.iter().filter(|o| o.is_correct()).count();

    let (go, nogo): (Vec<&TrialOutcome>, Vec<&TrialOutcome>) = outcomes
        .iter()
        .partition(|o| o.kind() == StimulusKind::Go);
    let go_correct = go.iter().filter(|o| o.is_correct()).count();
    let nogo_correct = nogo.iter().filter(|o| o.is_correct()).count();

    let go_rts: Vec<u64> = go.iter().filter_map(|o| o.reaction_time_ms()).collect();
    let average_reaction_time_ms = if go_rts.is_empty() {
        0.0
    } else {
        go_rts.iter().sum::<u64>() as f64 / go_rts.len() as f64
    };

    Summary {
        total_trials: outcomes.len(),
        correct_count,
        accuracy_pct: percent(correct_count, outcomes.len()),
        go_accuracy_pct: percent(go_correct, go.len()),
        nogo_accuracy_pct: percent(nogo_correct, nogo.len()),
        average_reaction_time_ms,
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total trials:   {}", self.total_trials)?;
        writeln!(f, "Correct:        {}", self.correct_count)?;
        writeln!(f, "Accuracy:       {:.1}%", self.accuracy_pct)?;
        writeln!(f, "Go accuracy:    {:.1}%", self.go_accuracy_pct)?;
        writeln!(f, "NoGo accuracy:  {:.1}%", self.nogo_accuracy_pct)?;
        write!(f, "Mean RT (go):   {:.0}ms", self.average_reaction_time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrialSpec;

    fn spec(ordinal: u32, kind: StimulusKind) -> TrialSpec {
        TrialSpec { ordinal, kind }
    }

    #[test]
    fn mixed_run() {
        let outcomes = vec![
            TrialOutcome::responded(&spec(1, StimulusKind::Go), 300, 0),
            TrialOutcome::responded(&spec(2, StimulusKind::Go), 500, 0),
            TrialOutcome::withheld(&spec(3, StimulusKind::Go), 0),
            TrialOutcome::withheld(&spec(4, StimulusKind::NoGo), 0),
            TrialOutcome::responded(&spec(5, StimulusKind::NoGo), 250, 0),
        ];
        let s = summarize(&outcomes);
        assert_eq!(s.total_trials, 5);
        assert_eq!(s.correct_count, 3);
        assert!((s.accuracy_pct - 60.0).abs() < 1e-9);
        assert!((s.go_accuracy_pct - 200.0 / 3.0).abs() < 1e-9);
        assert!((s.nogo_accuracy_pct - 50.0).abs() < 1e-9);
        // the nogo commission at 250ms does not count towards go RT
        assert!((s.average_reaction_time_ms - 400.0).abs() < 1e-9);
    }

    #[test]
    fn no_go_responses_means_zero_rt() {
        let outcomes = vec![
            TrialOutcome::withheld(&spec(1, StimulusKind::Go), 0),
            TrialOutcome::withheld(&spec(2, StimulusKind::NoGo), 0),
        ];
        let s = summarize(&outcomes);
        assert_eq!(s.average_reaction_time_ms, 0.0);
        assert!(!s.average_reaction_time_ms.is_nan());
    }

    #[test]
    fn empty_log_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.total_trials, 0);
        assert_eq!(s.accuracy_pct, 0.0);
        assert_eq!(s.go_accuracy_pct, 0.0);
        assert_eq!(s.nogo_accuracy_pct, 0.0);
    }

    #[test]
    fn display_rounds_like_the_results_view() {
        let outcomes = vec![
            TrialOutcome::responded(&spec(1, StimulusKind::Go), 301, 0),
            TrialOutcome::responded(&spec(2, StimulusKind::Go), 303, 0),
            TrialOutcome::withheld(&spec(3, StimulusKind::Go), 0),
        ];
        let text = summarize(&outcomes).to_string();
        assert!(text.contains("Accuracy:       66.7%"));
        assert!(text.contains("NoGo accuracy:  0.0%"));
        assert!(text.contains("Mean RT (go):   302ms"));
    }
}
