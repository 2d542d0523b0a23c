use std::fmt;

use anyhow::Result;
use gonogo_core::{ResultLog, Summary, TrialOutcome};
use gonogo_experiment::TaskConfig;
use tracing::info;

/// Logs one resolved trial as a JSON line.
pub fn log_outcome(outcome: &TrialOutcome) -> Result<()> {
    let json = serde_json::to_string(outcome)?;
    info!(target: "gonogo::trial", "{json}");
    Ok(())
}

/// Logs the end-of-run summary as JSON.
pub fn log_summary(summary: &Summary) -> Result<()> {
    let json = serde_json::to_string(summary)?;
    info!(target: "gonogo::summary", "{json}");
    Ok(())
}

/// Logs the task parameters of this session as JSON.
pub fn log_config(config: &TaskConfig) -> Result<()> {
    let json = serde_json::to_string(config)?;
    info!(target: "gonogo::config", "{json}");
    Ok(())
}

/// Summary block followed by one row per trial.
pub struct Report<'a> {
    results: &'a ResultLog,
    summary: &'a Summary,
}

impl<'a> Report<'a> {
    pub fn new(results: &'a ResultLog, summary: &'a Summary) -> Self {
        Self { results, summary }
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== RESULTS ===")?;
        writeln!(f, "{}", self.summary)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>5}  {:<4}  {:<8}  {:<7}  {:>6}",
            "Trial", "Kind", "Response", "Correct", "RT"
        )?;
        for outcome in self.results {
            let rt = outcome
                .reaction_time_ms()
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:>5}  {:<4}  {:<8}  {:<7}  {:>6}",
                outcome.ordinal(),
                outcome.kind(),
                yes_no(outcome.is_responded()),
                yes_no(outcome.is_correct()),
                rt
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonogo_core::{summarize, StimulusKind, TrialSpec};

    fn log() -> ResultLog {
        let mut log = ResultLog::new();
        log.append(TrialOutcome::responded(
            &TrialSpec {
                ordinal: 1,
                kind: StimulusKind::Go,
            },
            312,
            0,
        ))
        .unwrap();
        log.append(TrialOutcome::withheld(
            &TrialSpec {
                ordinal: 2,
                kind: StimulusKind::NoGo,
            },
            0,
        ))
        .unwrap();
        log
    }

    #[test]
    fn report_lists_every_trial() {
        let log = log();
        let summary = summarize(log.as_slice());
        let text = Report::new(&log, &summary).to_string();

        assert!(text.starts_with("=== RESULTS ==="));
        assert!(text.contains("Accuracy:       100.0%"));
        assert!(text.contains("    1  GO    yes       yes       312ms"));
        assert!(text.contains("    2  NOGO  no        yes           -"));
    }

    #[test]
    fn config_serializes_every_parameter() {
        let value = serde_json::to_value(TaskConfig::default()).unwrap();
        assert_eq!(value["trial_count"], 20);
        assert_eq!(value["go_ratio"], 0.7);
        assert_eq!(value["stimulus_duration_ms"], 1500);
        assert_eq!(value["iti_duration_ms"], 1000);
        assert!(log_config(&TaskConfig::default()).is_ok());
    }

    #[test]
    fn summary_serializes_in_camel_case() {
        let log = log();
        let summary = summarize(log.as_slice());
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["totalTrials"], 2);
        assert_eq!(value["correctCount"], 2);
        assert_eq!(value["averageReactionTimeMs"], 312.0);
        assert!(log_summary(&summary).is_ok());
    }

    #[test]
    fn outcome_logs_as_json() {
        let log = log();
        for outcome in &log {
            assert!(log_outcome(outcome).is_ok());
        }
    }
}
