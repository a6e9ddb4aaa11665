//! Run Store Test Suite
//!
//! Concurrency-focused tests for the optimistically-versioned run store:
//! exactly-one-winner commits, limit enforcement under contention, and the
//! read-side query surface.
//!
//! ```bash
//! cargo test --test store
//! ```

use std::sync::Arc;
use std::thread;

use cadence::{
    CommitResult, FlowId, LimitGroup, Parent, Run, RunFilter, RunSpec, RunStore, SideEffect,
    State, StateKind,
};

fn scheduled_run() -> Run {
    Run::create(RunSpec::new(Parent::Flow(FlowId::new())))
}

fn store_with(runs: &[Run]) -> Arc<RunStore> {
    let store = Arc::new(RunStore::new());
    for run in runs {
        store.insert(run.clone()).unwrap();
    }
    store
}

// =============================================================================
// OPTIMISTIC CONCURRENCY
// =============================================================================

#[test]
fn concurrent_commits_have_exactly_one_winner() {
    let run = scheduled_run();
    let id = run.id;
    let store = store_with(&[run]);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                // Everyone read version 1 and races the same CAS.
                let state = State::pending().with_message(format!("committer-{i}"));
                store.commit(&id, 1, state, &[]).unwrap()
            })
        })
        .collect();

    let results: Vec<CommitResult> = workers.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results
        .iter()
        .filter(|r| matches!(r, CommitResult::Committed { .. }))
        .count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, CommitResult::Conflict { actual: 2 }))
        .count();

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);

    let run = store.get(&id).unwrap();
    assert_eq!(run.version, 2);
    assert_eq!(run.history.len(), 2);
    assert!(run.history_is_consistent());
}

#[test]
fn interleaved_commits_keep_history_consistent() {
    let run = scheduled_run();
    let id = run.id;
    let store = store_with(&[run]);

    // Two writers alternate, each re-reading before committing.
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    let run = store.get(&id).unwrap();
                    // Pending self-edge keeps the walk legal forever.
                    let _ = store
                        .commit(&id, run.version, State::pending(), &[])
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let run = store.get(&id).unwrap();
    assert!(run.history_is_consistent());
    // Every committed transition appended exactly one state.
    assert_eq!(run.history.len() as u64, run.version);
}

#[test]
fn commit_sequence_totally_orders_commits() {
    let runs: Vec<Run> = (0..4).map(|_| scheduled_run()).collect();
    let ids: Vec<_> = runs.iter().map(|r| r.id).collect();
    let store = store_with(&runs);

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut sequences = Vec::new();
                for _ in 0..25 {
                    let run = store.get(&id).unwrap();
                    if let CommitResult::Committed { sequence, .. } = store
                        .commit(&id, run.version, State::pending(), &[])
                        .unwrap()
                    {
                        sequences.push(sequence);
                    }
                }
                sequences
            })
        })
        .collect();

    let mut all: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(all.len(), 100);
    all.sort_unstable();
    all.dedup();
    // No two commits ever shared a sequence number.
    assert_eq!(all.len(), 100);
}

// =============================================================================
// LIMIT ENFORCEMENT UNDER CONTENTION
// =============================================================================

#[test]
fn limit_group_never_exceeds_its_ceiling() {
    let group = LimitGroup::new("db-pool");
    let runs: Vec<Run> = (0..16)
        .map(|_| Run::create(RunSpec::new(Parent::Flow(FlowId::new())).with_limit_group("db-pool")))
        .collect();
    let ids: Vec<_> = runs.iter().map(|r| r.id).collect();
    let store = store_with(&runs);
    store.limits().set_limit(group.clone(), 3);

    let handles: Vec<_> = ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let store = Arc::clone(&store);
            let group = group.clone();
            thread::spawn(move || {
                let state = State::running(cadence::WorkerId::new(format!("w{i}")));
                store
                    .commit(&id, 1, state, &[SideEffect::AcquireSlot(group)])
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<CommitResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let admitted = results
        .iter()
        .filter(|r| matches!(r, CommitResult::Committed { .. }))
        .count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, CommitResult::SlotExhausted { .. }))
        .count();

    assert_eq!(admitted, 3);
    assert_eq!(refused, 13);
    assert_eq!(store.limits().active(&group), 3);
}

#[test]
fn refused_commit_leaves_run_and_counters_untouched() {
    let group = LimitGroup::new("db");
    let run = scheduled_run();
    let id = run.id;
    let store = store_with(&[run]);
    store.limits().set_limit(group.clone(), 0);

    let result = store
        .commit(
            &id,
            1,
            State::running("w1".into()),
            &[SideEffect::AcquireSlot(group.clone())],
        )
        .unwrap();
    assert!(matches!(result, CommitResult::SlotExhausted { .. }));

    let run = store.get(&id).unwrap();
    assert_eq!(run.version, 1);
    assert_eq!(run.state.kind, StateKind::Scheduled);
    assert_eq!(store.limits().active(&group), 0);
}

#[test]
fn release_frees_exactly_one_slot() {
    let group = LimitGroup::new("db");
    let store = Arc::new(RunStore::new());
    store.limits().set_limit(group.clone(), 2);
    store
        .limits()
        .apply(&[
            SideEffect::AcquireSlot(group.clone()),
            SideEffect::AcquireSlot(group.clone()),
        ])
        .unwrap();

    store
        .limits()
        .apply(&[SideEffect::ReleaseSlot(group.clone())])
        .unwrap();
    assert_eq!(store.limits().active(&group), 1);
    assert!(store.limits().has_headroom(&group));
}

// =============================================================================
// QUERY SURFACE
// =============================================================================

#[test]
fn query_filters_by_state_and_tag() {
    let store = Arc::new(RunStore::new());
    let tagged = Run::create(RunSpec::new(Parent::Flow(FlowId::new())).with_tag("etl"));
    let plain = scheduled_run();
    let pending = scheduled_run();
    let pending_id = pending.id;
    for run in [&tagged, &plain, &pending] {
        store.insert(run.clone()).unwrap();
    }
    store
        .commit(&pending_id, 1, State::pending(), &[])
        .unwrap();

    let etl = store.query(&RunFilter::all().with_tag("etl"));
    assert_eq!(etl.len(), 1);
    assert_eq!(etl[0].id, tagged.id);

    let pendings = store.query(&RunFilter::all().with_states([StateKind::Pending]));
    assert_eq!(pendings.len(), 1);
    assert_eq!(pendings[0].id, pending_id);
}

#[test]
fn query_orders_by_creation_and_paginates() {
    let store = Arc::new(RunStore::new());
    let mut ids = Vec::new();
    for _ in 0..5 {
        let run = scheduled_run();
        ids.push(run.id);
        store.insert(run).unwrap();
    }

    let all = store.query(&RunFilter::all());
    assert_eq!(all.len(), 5);
    // Oldest first.
    let first_two: Vec<_> = store
        .query(&RunFilter::all().with_limit(2))
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(first_two, all[..2].iter().map(|r| r.id).collect::<Vec<_>>());

    let rest = store.query(&RunFilter::all().with_offset(2));
    assert_eq!(rest.len(), 3);
    assert_eq!(rest[0].id, all[2].id);
}

#[test]
fn query_scheduled_before_excludes_future_runs() {
    let store = Arc::new(RunStore::new());
    let now = chrono::Utc::now();
    let due = Run::create(RunSpec::new(Parent::Flow(FlowId::new())));
    let future = Run::create(
        RunSpec::new(Parent::Flow(FlowId::new())).scheduled_at(now + chrono::Duration::hours(1)),
    );
    store.insert(due.clone()).unwrap();
    store.insert(future).unwrap();

    let ready = store.query(&RunFilter::all().scheduled_before(now));
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, due.id);
}
