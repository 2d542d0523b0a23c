use std::ops::RangeInclusive;

use anyhow::{anyhow, bail, Result};
use gonogo_core::{StimulusKind, Summary};
use gonogo_experiment::{Sequencer, SequencerSignal};
use gonogo_timing::Clock;
use rand::Rng;
use tracing::{debug, info};

use crate::report::{log_outcome, log_summary};

/// Scripted responder for windowless runs.
pub struct SimulatedParticipant<R: Rng> {
    rng: R,
    rt_range_ms: RangeInclusive<u64>,
    commission_rate: f64,
    omission_rate: f64,
}

impl<R: Rng> SimulatedParticipant<R> {
    pub fn new(rng: R, commission_rate: f64, omission_rate: f64) -> Self {
        Self {
            rng,
            rt_range_ms: 250..=600,
            commission_rate: commission_rate.clamp(0.0, 1.0),
            omission_rate: omission_rate.clamp(0.0, 1.0),
        }
    }

    /// Delay after onset at which to click, or `None` to withhold.
    pub fn decide(&mut self, kind: StimulusKind) -> Option<u64> {
        let click = match kind {
            StimulusKind::Go => !self.rng.random_bool(self.omission_rate),
            StimulusKind::NoGo => self.rng.random_bool(self.commission_rate),
        };
        click.then(|| self.rng.random_range(self.rt_range_ms.clone()))
    }
}

/// Plays one full run against `participant`, sleeping on `clock` between
/// events. Returns the summary once the run completes.
pub fn run_headless<C, R, P>(
    sequencer: &mut Sequencer<C, R>,
    clock: &C,
    mut participant: SimulatedParticipant<P>,
) -> Result<Summary>
where
    C: Clock,
    R: Rng,
    P: Rng,
{
    sequencer.start()?;
    info!(trials = sequencer.trials().len(), "headless run");

    let mut planned_click: Option<u64> = None;
    loop {
        if planned_click.is_some_and(|at| clock.now_ms() >= at) {
            sequencer.click();
            planned_click = None;
        }

        for signal in sequencer.update()? {
            match signal {
                SequencerSignal::StimulusShown { ordinal, kind } => {
                    planned_click = participant
                        .decide(kind)
                        .map(|rt| clock.now_ms() + rt);
                    debug!(ordinal, %kind, click_at = ?planned_click, "participant decided");
                }
                SequencerSignal::StimulusHidden { .. } => planned_click = None,
                SequencerSignal::OutcomeRecorded(outcome) => log_outcome(&outcome)?,
                SequencerSignal::Completed(summary) => {
                    log_summary(&summary)?;
                    return Ok(summary);
                }
                SequencerSignal::Aborted { ordinal } => bail!("run aborted at trial {ordinal}"),
            }
        }

        if sequencer.has_pending_events() {
            continue;
        }
        let wake = match (planned_click, sequencer.next_deadline_ms()) {
            (Some(click), Some(deadline)) => click.min(deadline),
            (click, deadline) => click
                .or(deadline)
                .ok_or_else(|| anyhow!("run stalled with nothing scheduled"))?,
        };
        clock.sleep_until(wake);
    }
}
