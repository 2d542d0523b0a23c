use std::collections::VecDeque;

use gonogo_core::{
    summarize, ResultLog, RunState, StimulusKind, Summary, TrialOutcome, TrialSpec,
};
use gonogo_timing::{Clock, TimerHandle, TimerQueue};
use rand::Rng;
use tracing::{debug, info, trace};

use super::config::TaskConfig;
use super::error::SequencerError;
use super::trial::generate_trials;

/// What a pending timer ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Blank interval before trial `ordinal`.
    Interval { ordinal: u32 },
    /// Response window of trial `ordinal`.
    ResponseWindow { ordinal: u32 },
}

/// Inputs to the sequencer. Queued and handled strictly one at a time, in
/// the order they were pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    Click { at_ms: u64 },
    TimerFired {
        handle: TimerHandle,
        purpose: TimerPurpose,
    },
    /// Leave the inter-trial gap after trial `ordinal`.
    Advance { ordinal: u32 },
    Abort,
}

/// What the presentation layer needs to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerSignal {
    StimulusShown { ordinal: u32, kind: StimulusKind },
    OutcomeRecorded(TrialOutcome),
    StimulusHidden { ordinal: u32 },
    Completed(Summary),
    Aborted { ordinal: u32 },
}

/// Context of the trial currently on screen.
#[derive(Debug, Clone)]
struct ActiveTrial {
    spec: TrialSpec,
    timer: Option<TimerHandle>,
    stimulus_start_ms: Option<u64>,
    /// Set once an outcome exists; nothing may produce another one.
    resolved: bool,
}

pub struct Sequencer<C, R>
where
    C: Clock,
    R: Rng,
{
    clock: C,
    rng: R,
    config: TaskConfig,
    timers: TimerQueue<TimerPurpose>,
    queue: VecDeque<SequencerEvent>,
    state: RunState,
    trials: Vec<TrialSpec>,
    cursor: usize,
    current: Option<ActiveTrial>,
    results: ResultLog,
    summary: Option<Summary>,
}

impl<C, R> Sequencer<C, R>
where
    C: Clock,
    R: Rng,
{
    pub fn new(config: TaskConfig, clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            config,
            timers: TimerQueue::new(),
            queue: VecDeque::new(),
            state: RunState::Idle,
            trials: Vec::new(),
            cursor: 0,
            current: None,
            results: ResultLog::new(),
            summary: None,
        }
    }

    /// Begins a new run: validates the configuration, clears the previous
    /// results and schedules the first trial.
    pub fn start(&mut self) -> Result<(), SequencerError> {
        if self.state.is_running() {
            return Err(SequencerError::AlreadyRunning);
        }
        self.config.validate()?;
        let trials = generate_trials(self.config.trial_count, self.config.go_ratio, &mut self.rng)?;

        self.timers.clear();
        self.queue.clear();
        self.results = ResultLog::with_capacity(trials.len());
        self.summary = None;
        self.trials = trials;
        self.cursor = 0;

        info!(
            trials = self.trials.len(),
            go = self.trials.iter().filter(|t| t.kind.is_go()).count(),
            "run started"
        );
        self.begin_trial();
        Ok(())
    }

    /// Cancels the run immediately. Pending timers and queued events are
    /// dropped and the interrupted trial leaves no outcome.
    pub fn abort(&mut self) -> Vec<SequencerSignal> {
        self.queue.clear();
        let mut signals = Vec::new();
        self.on_abort(&mut signals);
        signals
    }

    /// Queues a click stamped with the current time.
    pub fn click(&mut self) {
        let at_ms = self.clock.now_ms();
        self.queue.push_back(SequencerEvent::Click { at_ms });
    }

    pub fn push(&mut self, event: SequencerEvent) {
        self.queue.push_back(event);
    }

    /// Moves due timers into the event queue behind anything already
    /// queued, then handles every queued event. Repeats while handling
    /// made new timers due (a zero-length interval, for instance).
    pub fn update(&mut self) -> Result<Vec<SequencerSignal>, SequencerError> {
        let mut signals = Vec::new();
        loop {
            let now = self.clock.now_ms();
            for (handle, purpose) in self.timers.expired(now) {
                self.queue
                    .push_back(SequencerEvent::TimerFired { handle, purpose });
            }
            if self.queue.is_empty() {
                break;
            }
            while let Some(event) = self.queue.pop_front() {
                self.dispatch(event, &mut signals)?;
            }
        }
        Ok(signals)
    }

    fn dispatch(
        &mut self,
        event: SequencerEvent,
        signals: &mut Vec<SequencerSignal>,
    ) -> Result<(), SequencerError> {
        match event {
            SequencerEvent::Click { at_ms } => self.on_click(at_ms, signals)?,
            SequencerEvent::TimerFired { handle, purpose } => {
                self.on_timer(handle, purpose, signals)?
            }
            SequencerEvent::Advance { ordinal } => self.on_advance(ordinal, signals),
            SequencerEvent::Abort => self.on_abort(signals),
        }
        Ok(())
    }

    fn begin_trial(&mut self) {
        let spec = self.trials[self.cursor];
        let deadline = self.clock.now_ms().saturating_add(self.config.iti_duration_ms);
        let handle = self.timers.schedule(
            deadline,
            TimerPurpose::Interval {
                ordinal: spec.ordinal,
            },
        );
        self.current = Some(ActiveTrial {
            spec,
            timer: Some(handle),
            stimulus_start_ms: None,
            resolved: false,
        });
        self.state = RunState::AwaitingInterval;
        debug!(ordinal = spec.ordinal, deadline, "trial started");
    }

    fn on_click(
        &mut self,
        at_ms: u64,
        signals: &mut Vec<SequencerSignal>,
    ) -> Result<(), SequencerError> {
        if !self.state.accepts_response() {
            trace!(state = ?self.state, "click outside response window ignored");
            return Ok(());
        }
        let Some(trial) = self.current.as_mut() else {
            return Ok(());
        };
        if trial.resolved {
            trace!(ordinal = trial.spec.ordinal, "repeat click ignored");
            return Ok(());
        }

        let started = trial.stimulus_start_ms.unwrap_or(at_ms);
        trial.resolved = true;
        let outcome =
            TrialOutcome::responded(&trial.spec, at_ms.saturating_sub(started), self.clock.epoch_ms());
        self.record(outcome, signals)
    }

    fn on_timer(
        &mut self,
        handle: TimerHandle,
        purpose: TimerPurpose,
        signals: &mut Vec<SequencerSignal>,
    ) -> Result<(), SequencerError> {
        let Some(trial) = self.current.as_mut() else {
            trace!(?purpose, "timer fired with no active trial");
            return Ok(());
        };
        if trial.timer != Some(handle) {
            trace!(?purpose, "stale timer ignored");
            return Ok(());
        }
        trial.timer = None;

        match (self.state, purpose) {
            (RunState::AwaitingInterval, TimerPurpose::Interval { ordinal })
                if ordinal == trial.spec.ordinal =>
            {
                let now = self.clock.now_ms();
                trial.stimulus_start_ms = Some(now);
                trial.timer = Some(self.timers.schedule(
                    now.saturating_add(self.config.stimulus_duration_ms),
                    TimerPurpose::ResponseWindow { ordinal },
                ));
                self.state = RunState::StimulusVisible;

                let kind = trial.spec.kind;
                debug!(ordinal, %kind, at = now, "stimulus shown");
                signals.push(SequencerSignal::StimulusShown { ordinal, kind });
            }
            (RunState::StimulusVisible, TimerPurpose::ResponseWindow { ordinal })
                if ordinal == trial.spec.ordinal =>
            {
                // a click may already have resolved the trial
                let timed_out = if trial.resolved {
                    None
                } else {
                    trial.resolved = true;
                    Some(TrialOutcome::withheld(&trial.spec, self.clock.epoch_ms()))
                };
                self.state = RunState::InterTrialGap;
                if let Some(outcome) = timed_out {
                    self.record(outcome, signals)?;
                }
                signals.push(SequencerSignal::StimulusHidden { ordinal });
                self.queue.push_back(SequencerEvent::Advance { ordinal });
            }
            (state, purpose) => {
                trace!(?state, ?purpose, "timer does not match run state, ignored");
            }
        }
        Ok(())
    }

    fn on_advance(&mut self, ordinal: u32, signals: &mut Vec<SequencerSignal>) {
        let at_boundary = self.state == RunState::InterTrialGap
            && self
                .current
                .as_ref()
                .is_some_and(|t| t.spec.ordinal == ordinal);
        if !at_boundary {
            trace!(ordinal, state = ?self.state, "advance for a settled boundary ignored");
            return;
        }

        if self.cursor + 1 >= self.trials.len() {
            self.current = None;
            self.state = RunState::Complete;
            let summary = summarize(self.results.as_slice());
            info!(
                trials = summary.total_trials,
                correct = summary.correct_count,
                accuracy = summary.accuracy_pct,
                "run complete"
            );
            self.summary = Some(summary.clone());
            signals.push(SequencerSignal::Completed(summary));
        } else {
            self.cursor += 1;
            self.begin_trial();
        }
    }

    fn on_abort(&mut self, signals: &mut Vec<SequencerSignal>) {
        if !self.state.is_running() {
            trace!(state = ?self.state, "abort with no run in progress ignored");
            return;
        }
        self.timers.clear();
        self.queue.clear();
        let ordinal = self
            .current
            .take()
            .map(|t| t.spec.ordinal)
            .unwrap_or_default();
        self.state = RunState::Idle;
        info!(ordinal, recorded = self.results.len(), "run aborted");
        signals.push(SequencerSignal::Aborted { ordinal });
    }

    fn record(
        &mut self,
        outcome: TrialOutcome,
        signals: &mut Vec<SequencerSignal>,
    ) -> Result<(), SequencerError> {
        self.results.append(outcome.clone())?;
        debug!(
            ordinal = outcome.ordinal(),
            kind = %outcome.kind(),
            responded = outcome.is_responded(),
            correct = outcome.is_correct(),
            rt_ms = ?outcome.reaction_time_ms(),
            "trial resolved"
        );
        signals.push(SequencerSignal::OutcomeRecorded(outcome));
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Trial whose interval or stimulus is in progress.
    pub fn current_trial(&self) -> Option<&TrialSpec> {
        self.current.as_ref().map(|t| &t.spec)
    }

    /// Stimulus to draw right now, if any.
    pub fn visible_stimulus(&self) -> Option<StimulusKind> {
        match self.state {
            RunState::StimulusVisible => self.current.as_ref().map(|t| t.spec.kind),
            _ => None,
        }
    }

    /// `(resolved trials, total trials)` for the current or last run.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.trials.is_empty() {
            None
        } else {
            Some((self.results.len(), self.trials.len()))
        }
    }

    pub fn trials(&self) -> &[TrialSpec] {
        &self.trials
    }

    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    /// Present once the last run reached `Complete`.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Earliest pending timer; the driver can sleep until then.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.queue.is_empty()
    }
}
