
use std::collections::HashSet;
use std::sync::Arc;

use fake_store::{FakeConnector, InsertMode};
use harness::BenchError;
use harness::dispatcher::Dispatcher;
use harness::metrics::counters::Counters;
use harness::plan::WorkPlan;
use store::RecordShape;

fn dispatcher(connector: &FakeConnector, fields: usize, counters: &Counters) -> Dispatcher {
    Dispatcher::new(
        Arc::new(connector.clone()),
        RecordShape::new(fields),
        counters.clone(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn successful_inserts_are_never_lost() {
    let connector = FakeConnector::always_ok();
    let counters = Counters::new();
    let plan = WorkPlan::new(16 * 500, 16).unwrap();

    let outcomes = dispatcher(&connector, 3, &counters).run(&plan).await.unwrap();

    let snap = counters.snapshot();
    assert_eq!(snap.completed, 16 * 500);
    assert_eq!(snap.failed, 0);
    assert_eq!(connector.records().len(), 16 * 500);

    // one independent connection per worker
    assert_eq!(connector.connects(), 16);
    assert_eq!(outcomes.len(), 16);
    assert!(outcomes.iter().all(|o| o.completed == 500 && o.failed == 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_store_counts_every_attempt_as_failed_and_terminates() {
    let connector = FakeConnector::always_fail();
    let counters = Counters::new();
    let plan = WorkPlan::new(8 * 200, 8).unwrap();

    dispatcher(&connector, 1, &counters).run(&plan).await.unwrap();

    let snap = counters.snapshot();
    assert_eq!(snap.completed, 0);
    assert_eq!(snap.failed, 8 * 200);
    assert!(connector.records().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn each_attempt_counts_exactly_once_under_mixed_results() {
    let connector = FakeConnector::new(InsertMode::FailEvery(7));
    let counters = Counters::new();
    let plan = WorkPlan::new(7_000, 5).unwrap();

    let outcomes = dispatcher(&connector, 2, &counters).run(&plan).await.unwrap();

    let snap = counters.snapshot();
    assert_eq!(snap.total(), 7_000);
    assert_eq!(snap.failed, 1_000);
    assert_eq!(snap.completed, connector.records().len() as u64);

    let local: u64 = outcomes.iter().map(|o| o.attempts()).sum();
    assert_eq!(local, snap.total());
}

#[tokio::test]
async fn four_workers_split_a_thousand_evenly() {
    let connector = FakeConnector::always_ok();
    let counters = Counters::new();
    let plan = WorkPlan::new(1_000, 4).unwrap();

    let outcomes = dispatcher(&connector, 1, &counters).run(&plan).await.unwrap();

    assert_eq!(
        outcomes.iter().map(|o| o.attempts()).collect::<Vec<_>>(),
        vec![250; 4]
    );
    assert_eq!(counters.snapshot().total(), 1_000);
}

#[tokio::test]
async fn three_workers_drop_the_remainder() {
    let connector = FakeConnector::always_ok();
    let counters = Counters::new();
    let plan = WorkPlan::new(1_000, 3).unwrap();

    let outcomes = dispatcher(&connector, 1, &counters).run(&plan).await.unwrap();

    assert_eq!(
        outcomes.iter().map(|o| o.worker_id).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(outcomes.iter().all(|o| o.attempts() == 333));
    assert_eq!(counters.snapshot().total(), 999);
}

#[tokio::test]
async fn records_share_one_value_per_record_and_vary_between_records() {
    let connector = FakeConnector::always_ok();
    let counters = Counters::new();
    let plan = WorkPlan::new(200, 2).unwrap();

    dispatcher(&connector, 5, &counters).run(&plan).await.unwrap();

    let records = connector.records();
    assert_eq!(records.len(), 200);

    let mut values = HashSet::new();
    for r in &records {
        assert_eq!(r.len(), 5);
        let first = r.get("field_0").unwrap();
        assert!(r.fields().all(|(_, v)| v == first));
        values.insert(first);
    }

    // 64-bit random values: a collision among 200 draws would be astronomically unlikely
    assert_eq!(values.len(), 200);
}

#[tokio::test]
async fn worker_connect_failure_aborts_the_run() {
    // the first two workers connect, the rest are refused
    let connector = FakeConnector::always_ok().refuse_connections_after(2);
    let counters = Counters::new();
    let plan = WorkPlan::new(4_000, 4).unwrap();

    let err = dispatcher(&connector, 1, &counters)
        .run(&plan)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::WorkerConnect { .. }));

    // every worker has been joined or aborted; nothing keeps counting afterwards
    let after = counters.snapshot();
    tokio::task::yield_now().await;
    assert_eq!(counters.snapshot(), after);
    assert!(after.total() <= plan.planned_operations());
}

#[tokio::test]
async fn zero_operations_spawns_workers_that_do_nothing() {
    let connector = FakeConnector::always_ok();
    let counters = Counters::new();
    let plan = WorkPlan::new(0, 3).unwrap();

    let outcomes = dispatcher(&connector, 1, &counters).run(&plan).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(counters.snapshot().total(), 0);
}
