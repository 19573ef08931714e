use std::sync::Arc;

use assert_matches::assert_matches;

use whack::scheduler::ManualSpawner;
use whack::session::TARGET_COUNT;
use whack::surface::{RecordingSurface, RenderCommand};
use whack::{Controller, GameError, Phase, Selection, TickOutcome, Timing};

struct Harness {
    controller: Arc<Controller>,
    surface: Arc<RecordingSurface>,
}

impl Harness {
    fn new() -> Self {
        let surface = Arc::new(RecordingSurface::new());
        let controller = Arc::new(Controller::new(
            Timing::default(),
            surface.clone(),
            ManualSpawner::new(),
        ));
        Self {
            controller,
            surface,
        }
    }

    fn all_dormant(&self) -> bool {
        (0..TARGET_COUNT).all(|id| !self.controller.is_active(id).unwrap())
    }
}

#[test]
fn twenty_ticks_end_the_round_with_every_target_down() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();
    for id in 0..TARGET_COUNT {
        h.controller.raise(generation, id).unwrap();
    }

    let mut last = h.controller.remaining();
    for _ in 0..19 {
        assert_matches!(h.controller.tick(generation), TickOutcome::Running(_));
        let now = h.controller.remaining();
        assert_eq!(now, last - 1);
        last = now;
    }
    assert_eq!(h.controller.tick(generation), TickOutcome::Finished);

    assert_eq!(h.controller.remaining(), 0);
    assert!(h.all_dormant());

    // Stays down until the next start
    assert!(!h.controller.raise(generation, 0).unwrap());
    assert!(h.all_dormant());
}

#[test]
fn remaining_time_is_rendered_each_tick() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();
    h.surface.clear();
    for _ in 0..20 {
        h.controller.tick(generation);
    }

    let times: Vec<u32> = h
        .surface
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            RenderCommand::RemainingTime(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(times, (0..20).rev().collect::<Vec<u32>>());
}

#[test]
fn selecting_target_three_while_active_scores_one() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();
    h.controller.raise(generation, 3).unwrap();

    assert_matches!(h.controller.select(3), Ok(Selection::Hit { score: 1, .. }));
    assert_eq!(h.controller.score(), 1);
    assert!(!h.controller.is_active(3).unwrap());
}

#[test]
fn selecting_dormant_target_five_leaves_score_alone() {
    let h = Harness::new();
    h.controller.start().unwrap();

    assert_eq!(h.controller.select(5), Ok(Selection::Miss));
    assert_eq!(h.controller.score(), 0);
}

#[test]
fn score_counts_exactly_the_active_selections() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();

    for id in [0, 2, 4] {
        h.controller.raise(generation, id).unwrap();
    }
    for id in [0, 1, 2, 2, 3, 4, 0] {
        let _ = h.controller.select(id);
    }

    assert_eq!(h.controller.score(), 3);
    assert_eq!(h.controller.summary().misses, 4);
}

#[test]
fn back_to_back_starts_are_rejected_until_cooldown_completes() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();
    assert!(!h.controller.is_start_enabled());
    assert_eq!(h.controller.start(), Err(GameError::StartDisabled));

    for _ in 0..20 {
        h.controller.tick(generation);
    }
    assert_eq!(h.controller.phase(), Phase::Cooldown);
    assert_eq!(h.controller.start(), Err(GameError::StartDisabled));

    h.controller.rearm(generation);
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_matches!(h.controller.start(), Ok(g) if g == generation + 1);
}

#[test]
fn concurrent_selection_credits_a_mole_once() {
    let h = Harness::new();
    let generation = h.controller.start().unwrap();

    for _ in 0..50 {
        h.controller.raise(generation, 9).unwrap();
        let before = h.controller.score();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let controller = Arc::clone(&h.controller);
                std::thread::spawn(move || controller.select(9).unwrap())
            })
            .chain(std::iter::once({
                let controller = Arc::clone(&h.controller);
                std::thread::spawn(move || {
                    controller.lower(generation, 9).unwrap();
                    Selection::Miss
                })
            }))
            .collect();

        let hits = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|s| matches!(s, Selection::Hit { .. }))
            .count() as u32;

        assert!(hits <= 1);
        assert_eq!(h.controller.score(), before + hits);
        assert!(!h.controller.is_active(9).unwrap());
    }
}
