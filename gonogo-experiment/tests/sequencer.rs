use gonogo_core::{RunState, StimulusKind, Summary};
use gonogo_experiment::{Sequencer, SequencerSignal, TaskConfig};
use gonogo_timing::{Clock, ManualClock};
use rand::rngs::StdRng;
use rand::SeedableRng;

type TestSequencer = Sequencer<ManualClock, StdRng>;

fn build(trial_count: usize, go_ratio: f64, seed: u64) -> (TestSequencer, ManualClock) {
    let config = TaskConfig {
        trial_count,
        go_ratio,
        stimulus_duration_ms: 1500,
        iti_duration_ms: 1000,
    };
    let clock = ManualClock::new(1_700_000_000_000);
    let seq = Sequencer::new(config, clock.clone(), StdRng::seed_from_u64(seed));
    (seq, clock)
}

/// Runs to completion. `respond` decides, per stimulus, whether to click and
/// after how many milliseconds.
fn run_with<F>(seq: &mut TestSequencer, clock: &ManualClock, mut respond: F) -> Summary
where
    F: FnMut(StimulusKind) -> Option<u64>,
{
    seq.start().expect("start");
    loop {
        for signal in seq.update().expect("update") {
            match signal {
                SequencerSignal::StimulusShown { kind, .. } => {
                    if let Some(rt) = respond(kind) {
                        clock.advance(rt);
                        seq.click();
                    }
                }
                SequencerSignal::Completed(summary) => return summary,
                _ => {}
            }
        }
        if !seq.has_pending_events() {
            let deadline = seq.next_deadline_ms().expect("a running sequencer has a timer");
            clock.sleep_until(deadline);
        }
    }
}

#[test]
fn perfect_play_scores_one_hundred_percent() {
    let (mut seq, clock) = build(10, 0.7, 11);
    let summary = run_with(&mut seq, &clock, |kind| kind.is_go().then_some(320));

    let go = seq.trials().iter().filter(|t| t.kind.is_go()).count();
    assert_eq!(go, 7);
    assert_eq!(seq.trials().len() - go, 3);

    assert_eq!(summary.total_trials, 10);
    assert_eq!(summary.correct_count, 10);
    assert_eq!(summary.accuracy_pct, 100.0);
    assert_eq!(summary.go_accuracy_pct, 100.0);
    assert_eq!(summary.nogo_accuracy_pct, 100.0);
    assert_eq!(summary.average_reaction_time_ms, 320.0);
    assert_eq!(seq.summary(), Some(&summary));
}

#[test]
fn result_log_covers_every_trial_in_order() {
    for seed in 0..8 {
        let (mut seq, clock) = build(15, 0.6, seed);
        let mut flip = false;
        run_with(&mut seq, &clock, |_| {
            flip = !flip;
            flip.then_some(200 + seed * 10)
        });

        assert_eq!(seq.state(), RunState::Complete);
        let log = seq.results();
        assert_eq!(log.len(), 15);
        for (i, (outcome, spec)) in log.iter().zip(seq.trials()).enumerate() {
            assert_eq!(outcome.ordinal(), i as u32 + 1);
            assert_eq!(outcome.kind(), spec.kind);
            assert_eq!(outcome.reaction_time_ms().is_some(), outcome.is_responded());
            assert_eq!(outcome.is_correct(), outcome.kind().is_correct(outcome.is_responded()));
        }
    }
}

#[test]
fn no_clicks_means_nogo_only_correct() {
    let (mut seq, clock) = build(8, 0.5, 3);
    let summary = run_with(&mut seq, &clock, |_| None);

    for outcome in seq.results() {
        assert!(!outcome.is_responded());
        assert_eq!(outcome.is_correct(), outcome.kind() == StimulusKind::NoGo);
    }
    assert_eq!(summary.go_accuracy_pct, 0.0);
    assert_eq!(summary.nogo_accuracy_pct, 100.0);
    assert_eq!(summary.average_reaction_time_ms, 0.0);
}

#[test]
fn reaction_time_is_measured_from_stimulus_onset() {
    let (mut seq, clock) = build(4, 1.0, 9);
    let mut rts = vec![150, 410, 999, 1].into_iter();
    run_with(&mut seq, &clock, |_| rts.next());

    let measured: Vec<Option<u64>> = seq.results().iter().map(|o| o.reaction_time_ms()).collect();
    assert_eq!(measured, vec![Some(150), Some(410), Some(999), Some(1)]);
}

#[test]
fn completion_stamps_are_wall_clock_and_monotonic() {
    let (mut seq, clock) = build(5, 0.4, 21);
    run_with(&mut seq, &clock, |kind| kind.is_go().then_some(250));

    let stamps: Vec<u64> = seq
        .results()
        .iter()
        .map(|o| o.completed_at_epoch_ms())
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    assert!(stamps[0] >= 1_700_000_000_000);
}

#[test]
fn abort_mid_run_then_restart_clears_results() {
    let (mut seq, clock) = build(6, 0.5, 4);
    seq.start().unwrap();

    // play two full trials
    for _ in 0..2 {
        clock.sleep_until(seq.next_deadline_ms().unwrap());
        seq.update().unwrap();
        clock.sleep_until(seq.next_deadline_ms().unwrap());
        seq.update().unwrap();
    }
    assert_eq!(seq.results().len(), 2);

    // third stimulus is up, unresolved
    clock.sleep_until(seq.next_deadline_ms().unwrap());
    seq.update().unwrap();
    assert_eq!(seq.state(), RunState::StimulusVisible);

    let signals = seq.abort();
    assert_eq!(signals, vec![SequencerSignal::Aborted { ordinal: 3 }]);
    assert_eq!(seq.state(), RunState::Idle);
    assert_eq!(seq.results().len(), 2);

    // the cancelled window must not append anything later
    clock.advance(60_000);
    assert!(seq.update().unwrap().is_empty());
    assert_eq!(seq.results().len(), 2);

    seq.start().unwrap();
    assert!(seq.results().is_empty());
    assert_eq!(seq.progress(), Some((0, 6)));
    assert_eq!(seq.current_trial().map(|t| t.ordinal), Some(1));
}

#[test]
fn completed_run_can_be_started_again() {
    let (mut seq, clock) = build(3, 0.7, 8);
    run_with(&mut seq, &clock, |_| Some(100));
    assert_eq!(seq.state(), RunState::Complete);
    assert!(seq.abort().is_empty());

    let summary = run_with(&mut seq, &clock, |_| None);
    assert_eq!(summary.total_trials, 3);
    assert_eq!(seq.results().len(), 3);
}
