//! Kernel semantics: time resolution, event ordering, sensitivity, and
//! convergence behavior.

use std::cell::RefCell;
use std::rc::Rc;

use deltabench::models::{Metronome, Wire};
use deltabench::{Scheduler, SchedulerError, StopReason};

// ============================================================================
// Time wheel ordering
// ============================================================================

#[test]
fn test_same_time_events_fire_in_issue_order() {
    let mut sched = Scheduler::new(Wire::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    for tag in 0..5u32 {
        let order = order.clone();
        sched.schedule_at(10, move |_| order.borrow_mut().push(tag));
    }

    sched.run().unwrap();
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_event_chained_onto_current_instant_fires_before_time_advances() {
    let mut sched = Scheduler::new(Wire::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = order.clone();
    sched.schedule_at(10, move |ctx| {
        log.borrow_mut().push(("first", ctx.now()));
        let log = log.clone();
        ctx.schedule_after(0, move |ctx| {
            log.borrow_mut().push(("chained", ctx.now()));
        });
    });
    let log = order.clone();
    sched.schedule_at(20, move |ctx| log.borrow_mut().push(("later", ctx.now())));

    sched.run().unwrap();
    assert_eq!(
        *order.borrow(),
        vec![("first", 10), ("chained", 10), ("later", 20)]
    );
}

#[test]
fn test_events_interleave_by_time() {
    let mut sched = Scheduler::new(Wire::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    for &time in &[30u64, 10, 20] {
        let order = order.clone();
        sched.schedule_at(time, move |ctx| order.borrow_mut().push(ctx.now()));
    }

    sched.run().unwrap();
    assert_eq!(*order.borrow(), vec![10, 20, 30]);
}

// ============================================================================
// Monotonic time
// ============================================================================

#[test]
fn test_instants_strictly_increase() {
    let mut sched = Scheduler::new(Metronome::new(7, 6));
    let sig = sched.signal::<u8>(0);

    let instants = Rc::new(RefCell::new(Vec::new()));
    let seen = instants.clone();
    sched.always("clock_log", move |ctx| {
        let now = ctx.now();
        let mut seen = seen.borrow_mut();
        if seen.last() != Some(&now) {
            seen.push(now);
        }
    });

    // Wheel events deliberately collide with and straddle the metronome's
    // own schedule.
    sched.schedule_at(7, move |ctx| ctx.write(sig, 1));
    sched.schedule_at(7, move |ctx| ctx.write(sig, 2));
    sched.schedule_at(3, move |ctx| ctx.write(sig, 3));
    sched.schedule_at(40, move |ctx| ctx.write(sig, 4));

    sched.run().unwrap();

    let instants = instants.borrow();
    assert!(!instants.is_empty());
    assert!(instants.windows(2).all(|w| w[0] < w[1]));
    // Both event domains contributed instants.
    assert!(instants.contains(&3));
    assert!(instants.contains(&14));
    assert!(instants.contains(&40));
}

// ============================================================================
// Sensitivity
// ============================================================================

#[test]
fn test_process_fires_iff_watched_observable_changed() {
    let mut sched = Scheduler::new(Wire::new());
    let x = sched.signal::<u8>(0);
    let y = sched.signal::<u8>(0);

    let x_fires = Rc::new(RefCell::new(0u32));
    let count = x_fires.clone();
    sched
        .process("on_x", &[x.id()], move |_| *count.borrow_mut() += 1)
        .unwrap();

    sched.schedule_at(5, move |ctx| ctx.write(y, 1));
    sched.schedule_at(10, move |ctx| ctx.write(x, 1));
    sched.schedule_at(15, move |ctx| ctx.write(y, 2));
    sched.run().unwrap();

    assert_eq!(*x_fires.borrow(), 1);
}

#[test]
fn test_processes_fire_in_registration_order() {
    let mut sched = Scheduler::new(Wire::new());
    let sig = sched.signal::<bool>(false);

    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let order = order.clone();
        sched
            .process(name, &[sig.id()], move |_| order.borrow_mut().push(name))
            .unwrap();
    }

    sched.schedule_at(1, move |ctx| ctx.write(sig, true));
    sched.run().unwrap();
    assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn test_always_process_runs_every_delta() {
    let mut sched = Scheduler::new(Wire::new());
    let sig = sched.signal::<u8>(0);

    let runs = Rc::new(RefCell::new(0u64));
    let count = runs.clone();
    sched.always("every_delta", move |_| *count.borrow_mut() += 1);

    // Each instant converges in one delta (the event's write commits in
    // delta 0 and nothing re-dirties), so the always process runs twice.
    sched.schedule_at(5, move |ctx| ctx.write(sig, 1));
    sched.schedule_at(9, |_| {});
    sched.run().unwrap();

    assert_eq!(*runs.borrow(), sched.stats().deltas_run);
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn test_feedback_write_to_own_trigger_converges() {
    let mut sched = Scheduler::new(Wire::new());
    let req = sched.signal::<u8>(0);

    // Combinational feedback that settles: counts req up to 4 and stops.
    let count = req;
    sched
        .process("settle", &[req.id()], move |ctx| {
            let v = ctx.val(count);
            if v < 4 {
                ctx.write(count, v + 1);
            }
        })
        .unwrap();

    sched.schedule_at(1, move |ctx| ctx.write(req, 1));
    let summary = sched.run().unwrap();

    assert_eq!(summary.stop, StopReason::Idle);
    assert_eq!(sched.ctx().val(req), 4);
    // One instant, several deltas, no loop abort.
    assert_eq!(sched.stats().instants, 1);
    assert!(sched.stats().max_deltas_in_instant >= 4);
}

// ============================================================================
// Combinational loop breaking
// ============================================================================

#[test]
fn test_unbroken_feedback_aborts_at_the_bound() {
    let limit = 10;
    let mut sched = Scheduler::new(Wire::new()).with_delta_limit(limit);
    let sig = sched.signal::<bool>(false);

    let fires = Rc::new(RefCell::new(0u32));
    let count = fires.clone();
    sched
        .process("oscillator", &[sig.id()], move |ctx| {
            *count.borrow_mut() += 1;
            let v = ctx.val(sig);
            ctx.write(sig, !v);
        })
        .unwrap();

    sched.schedule_at(3, move |ctx| ctx.write(sig, true));
    let err = sched.run().unwrap_err();

    assert_eq!(
        err,
        SchedulerError::CombinationalLoop { time: 3, limit }
    );
    // The loop ran exactly `limit` deltas, not one more or less.
    assert_eq!(*fires.borrow(), limit);
    // Observable state is left as last committed.
    assert_eq!(sched.current_time(), 3);
}

#[test]
fn test_loop_bound_is_per_instant() {
    let mut sched = Scheduler::new(Wire::new()).with_delta_limit(8);
    let sig = sched.signal::<u8>(0);

    // Five deltas of feedback per instant, twice; neither instant trips an
    // 8-delta bound even though the total exceeds it.
    sched
        .process("burst", &[sig.id()], move |ctx| {
            let v = ctx.val(sig);
            if v % 10 < 5 {
                ctx.write(sig, v + 1);
            }
        })
        .unwrap();

    sched.schedule_at(1, move |ctx| ctx.write(sig, 1));
    sched.schedule_at(2, move |ctx| ctx.write(sig, 11));
    let summary = sched.run().unwrap();

    assert_eq!(summary.stop, StopReason::Idle);
    assert_eq!(sched.ctx().val(sig), 15);
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_budget_checked_per_instant_not_mid_delta() {
    let mut sched = Scheduler::new(Wire::new()).with_max_time(10);
    let sig = sched.signal::<u8>(0);

    // The instant at 10 is inside the budget and converges fully.
    sched
        .process("settle", &[sig.id()], move |ctx| {
            let v = ctx.val(sig);
            if v < 3 {
                ctx.write(sig, v + 1);
            }
        })
        .unwrap();
    sched.schedule_at(10, move |ctx| ctx.write(sig, 1));
    sched.schedule_at(11, move |ctx| ctx.write(sig, 99));

    let summary = sched.run().unwrap();
    assert_eq!(summary.stop, StopReason::TimeLimit);
    assert_eq!(summary.final_time, 10);
    assert_eq!(sched.ctx().val(sig), 3);
}

#[test]
fn test_idle_when_both_domains_drain() {
    let mut sched = Scheduler::new(Metronome::new(5, 3));
    sched.bind_output::<bool>(Metronome::OUT);

    let summary = sched.run().unwrap();
    assert_eq!(summary.stop, StopReason::Idle);
    assert_eq!(summary.final_time, 15);
    assert_eq!(summary.stats.instants, 3);
}
