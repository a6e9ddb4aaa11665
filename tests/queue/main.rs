//! Work Queue Test Suite
//!
//! End-to-end tests through the facade: worker polling and claiming, claim
//! exclusivity under concurrent polls, heartbeat-gated claim expiry, and the
//! sweepers.
//!
//! ```bash
//! cargo test --test queue
//! ```

use std::sync::Arc;
use std::thread;

use cadence::prelude::*;
use cadence::{AnomalyReporter, Run, WorkQueue};
use chrono::{Duration, Utc};
use parking_lot::Mutex;

fn flow_spec() -> RunSpec {
    RunSpec::new(Parent::Flow(FlowId::new()))
}

// =============================================================================
// POLL / CLAIM LIFECYCLE
// =============================================================================

#[test]
fn polled_run_travels_the_full_lifecycle() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    let run = cadence.runs.create(flow_spec()).unwrap();
    let worker = WorkerId::new("w1");

    let batch = cadence.queues.poll(&queue.id, &worker, 1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, run.id);
    assert_eq!(batch[0].state.kind, StateKind::Pending);
    assert_eq!(batch[0].assigned_worker(), Some(&worker));

    cadence
        .runs
        .transition(&run.id, State::running(worker.clone()))
        .unwrap();
    cadence.workers.heartbeat(&worker);
    cadence.runs.transition(&run.id, State::completed()).unwrap();

    let run = cadence.runs.get(&run.id).unwrap();
    assert!(run.history_is_consistent());
    let kinds: Vec<StateKind> = run.history.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StateKind::Scheduled,
            StateKind::Pending,
            StateKind::Running,
            StateKind::Completed,
        ]
    );
}

#[test]
fn queue_filters_scope_what_each_worker_sees() {
    let cadence = Cadence::in_memory();
    let etl = cadence
        .queues
        .create("etl", QueueFilter::all().with_tag("etl"))
        .unwrap();
    let gpu = cadence
        .queues
        .create("gpu", QueueFilter::all().with_tag("gpu"))
        .unwrap();

    let etl_run = cadence.runs.create(flow_spec().with_tag("etl")).unwrap();
    let gpu_run = cadence.runs.create(flow_spec().with_tag("gpu")).unwrap();

    let batch = cadence.queues.poll(&etl.id, &WorkerId::new("w1"), 10).unwrap();
    assert_eq!(batch.iter().map(|r| r.id).collect::<Vec<_>>(), vec![etl_run.id]);

    let batch = cadence.queues.poll(&gpu.id, &WorkerId::new("w2"), 10).unwrap();
    assert_eq!(batch.iter().map(|r| r.id).collect::<Vec<_>>(), vec![gpu_run.id]);
}

#[test]
fn concurrent_polls_never_double_claim() {
    let cadence = Arc::new(Cadence::in_memory());
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    for _ in 0..4 {
        cadence.runs.create(flow_spec()).unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cadence = Arc::clone(&cadence);
            let queue = queue.id;
            thread::spawn(move || {
                let worker = WorkerId::new(format!("w{i}"));
                cadence.queues.poll(&queue, &worker, 10).unwrap()
            })
        })
        .collect();

    let batches: Vec<Vec<Run>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let mut claimed: Vec<RunId> = batches.iter().flatten().map(|r| r.id).collect();
    let total = claimed.len();
    claimed.sort();
    claimed.dedup();

    // Four runs existed; every one was claimed exactly once.
    assert_eq!(total, 4);
    assert_eq!(claimed.len(), 4);
}

#[test]
fn earliest_due_runs_are_offered_first() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    let now = Utc::now();

    let later = cadence
        .runs
        .create(flow_spec().scheduled_at(now - Duration::seconds(10)))
        .unwrap();
    let earlier = cadence
        .runs
        .create(flow_spec().scheduled_at(now - Duration::seconds(60)))
        .unwrap();

    let batch = cadence.queues.poll(&queue.id, &WorkerId::new("w1"), 1).unwrap();
    assert_eq!(batch[0].id, earlier.id);

    let batch = cadence.queues.poll(&queue.id, &WorkerId::new("w1"), 1).unwrap();
    assert_eq!(batch[0].id, later.id);
}

#[test]
fn queues_list_in_priority_order() {
    let cadence = Cadence::in_memory();
    cadence
        .queues
        .register(WorkQueue::new("bulk", QueueFilter::all()).with_priority(200))
        .unwrap();
    cadence
        .queues
        .register(WorkQueue::new("urgent", QueueFilter::all()).with_priority(10))
        .unwrap();
    cadence.queues.create("default", QueueFilter::all()).unwrap();

    let names: Vec<String> = cadence.queues.list().into_iter().map(|q| q.name).collect();
    assert_eq!(names, vec!["urgent", "default", "bulk"]);
}

// =============================================================================
// CLAIM EXPIRY
// =============================================================================

#[test]
fn dead_workers_claim_expires_and_the_run_is_repooled() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    let run = cadence.runs.create(flow_spec()).unwrap();

    let batch = cadence.queues.poll(&queue.id, &WorkerId::new("w1"), 1).unwrap();
    assert_eq!(batch.len(), 1);

    // Past the 60s claim deadline and the 30s heartbeat lease.
    let later = Utc::now() + Duration::seconds(120);
    assert_eq!(cadence.queue_service().reap_claims(later), 1);

    let run = cadence.runs.get(&run.id).unwrap();
    assert_eq!(run.state.kind, StateKind::Scheduled);
    assert!(run.history_is_consistent());

    // Another worker picks it up.
    let batch = cadence.queues.poll(&queue.id, &WorkerId::new("w2"), 1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, run.id);
    assert_eq!(batch[0].assigned_worker(), Some(&WorkerId::new("w2")));
}

#[test]
fn slow_but_alive_worker_keeps_its_claim() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    cadence.runs.create(flow_spec()).unwrap();
    let worker = WorkerId::new("w1");

    cadence.queues.poll(&queue.id, &worker, 1).unwrap();

    // The deadline has passed but the worker heartbeats right before the
    // sweep, so the lease is fresh.
    let later = Utc::now() + Duration::seconds(120);
    cadence.queue_service().workers().heartbeat(&worker, later);
    assert_eq!(cadence.queue_service().reap_claims(later), 0);

    // Nothing to offer anyone else.
    let batch = cadence.queues.poll(&queue.id, &WorkerId::new("w2"), 1).unwrap();
    assert!(batch.is_empty());
}

#[test]
fn deregistered_workers_reports_are_rewritten_to_crashed() {
    let cadence = Cadence::in_memory();
    let run = cadence.runs.create(flow_spec()).unwrap();
    let worker = WorkerId::new("w1");

    cadence.workers.heartbeat(&worker);
    cadence
        .runs
        .transition(&run.id, State::running(worker.clone()))
        .unwrap();
    cadence.workers.deregister(&worker);

    let outcome = cadence.runs.transition(&run.id, State::completed()).unwrap();
    assert_eq!(
        outcome.accepted_state().map(|s| s.kind),
        Some(StateKind::Crashed)
    );
}

// =============================================================================
// SWEEPERS AND ANOMALIES
// =============================================================================

#[test]
fn stuck_cancelling_runs_are_reported_to_the_anomaly_seam() {
    #[derive(Default)]
    struct Recording(Mutex<Vec<RunId>>);
    impl AnomalyReporter for Recording {
        fn stuck_cancelling(&self, run: &Run, _since: chrono::DateTime<Utc>) {
            self.0.lock().push(run.id);
        }
    }

    let recorder = Arc::new(Recording::default());
    let cadence = Cadence::builder()
        .anomalies(Arc::clone(&recorder) as Arc<dyn AnomalyReporter>)
        .build();

    let run = cadence.runs.create(flow_spec()).unwrap();
    cadence.runs.cancel(&run.id).unwrap();

    // Within the timeout nothing is reported.
    assert!(cadence.queues.report_stuck_cancelling().is_empty());

    // Beyond the 300s default it is reported but never auto-resolved.
    let later = Utc::now() + Duration::seconds(600);
    let reported = cadence.queue_service().report_stuck_cancelling(later);
    assert_eq!(reported, vec![run.id]);
    assert_eq!(recorder.0.lock().as_slice(), &[run.id]);
    assert_eq!(
        cadence.runs.get(&run.id).unwrap().state.kind,
        StateKind::Cancelling
    );
}

#[test]
fn cancel_handshake_through_the_facade() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    let run = cadence.runs.create(flow_spec()).unwrap();
    let worker = WorkerId::new("w1");

    cadence.queues.poll(&queue.id, &worker, 1).unwrap();
    cadence
        .runs
        .transition(&run.id, State::running(worker.clone()))
        .unwrap();

    // An operator requests cancellation; the worker observes and confirms.
    let outcome = cadence.runs.cancel(&run.id).unwrap();
    assert!(outcome.is_accepted());
    let outcome = cadence.runs.transition(&run.id, State::cancelled()).unwrap();
    assert!(outcome.is_accepted());
    assert!(cadence.runs.get(&run.id).unwrap().is_terminal());
}

#[test]
fn paused_deployment_holds_back_its_runs() {
    let cadence = Cadence::in_memory();
    let queue = cadence.queues.create("default", QueueFilter::all()).unwrap();
    let dep = cadence
        .deployments
        .create("nightly-etl", Default::default())
        .unwrap();
    cadence
        .runs
        .create(RunSpec::new(Parent::Deployment(dep.id)))
        .unwrap();

    cadence.deployments.pause(&dep.id).unwrap();
    assert!(cadence
        .queues
        .poll(&queue.id, &WorkerId::new("w1"), 10)
        .unwrap()
        .is_empty());

    cadence.deployments.resume(&dep.id).unwrap();
    assert_eq!(
        cadence
            .queues
            .poll(&queue.id, &WorkerId::new("w1"), 10)
            .unwrap()
            .len(),
        1
    );
}
