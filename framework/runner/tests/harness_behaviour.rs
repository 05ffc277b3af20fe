use std::sync::Arc;
use std::time::Duration;

use fib_tunnel_runner::prelude::*;

fn small_config() -> HarnessConfig {
    HarnessConfig::default()
        .with_fibonacci_parameter(12)
        .with_fibonacci_iterations(25)
}

fn harness_with_collector() -> (TimedComputeHarness, Arc<InMemoryReporter>) {
    let collector = Arc::new(InMemoryReporter::new());
    let reporter = Arc::new(ReportConfig::default().add_collector(collector.clone()).init());
    let pool = Arc::new(WorkerPool::new().unwrap());

    (
        TimedComputeHarness::new(pool, small_config(), reporter),
        collector,
    )
}

fn on_worker() -> bool {
    std::thread::current().name() == Some(WORKER_THREAD_NAME)
}

fn fail_on_worker(n: u64) -> anyhow::Result<u64> {
    if on_worker() {
        anyhow::bail!("injected fault");
    }
    Ok(fibonacci(n))
}

fn fail_inline(n: u64) -> anyhow::Result<u64> {
    if !on_worker() {
        anyhow::bail!("injected fault");
    }
    Ok(fibonacci(n))
}

fn panic_on_worker(n: u64) -> anyhow::Result<u64> {
    if on_worker() {
        panic!("injected panic");
    }
    Ok(fibonacci(n))
}

fn slow_on_worker(n: u64) -> anyhow::Result<u64> {
    if on_worker() {
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(fibonacci(n))
}

#[test]
fn empty_event_records_samples_from_both_streams() {
    let (harness, collector) = harness_with_collector();

    let snapshot = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap();

    let timer = snapshot.timer(FIBONACCI_TIMER).unwrap();
    assert_eq!(timer.count as u64, small_config().expected_samples());
    assert_eq!(timer.count, 50);
    assert!(timer.min <= timer.p50 && timer.p50 <= timer.max);
    assert!(snapshot.gauge(ProcessUptimeGauge::NAME).is_some());

    let reported = collector.snapshots();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].1, snapshot);
}

#[test]
fn full_event_is_handled() {
    let (harness, _) = harness_with_collector();
    let event = EventRecord::from_json(
        r#"{
            "id": "cdc73f9d-aea9-11e3-9d5a-835b769c0d9c",
            "detail-type": "Scheduled Event",
            "source": "aws.events",
            "account": "123456789012",
            "time": "1970-01-01T00:00:00Z",
            "region": "us-east-1",
            "resources": ["arn:aws:events:us-east-1:123456789012:rule/ExampleRule"],
            "detail": {}
        }"#,
    )
    .unwrap();

    let snapshot = harness
        .handle(&event, &DiagnosticContext::for_request("full-event"))
        .unwrap();

    assert_eq!(snapshot.timer(FIBONACCI_TIMER).unwrap().count, 50);
}

#[test]
fn background_failure_fails_the_invocation_without_reporting() {
    let (harness, collector) = harness_with_collector();
    let harness = harness.with_compute(fail_on_worker);

    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();

    let err = err.downcast_ref::<WorkerTaskError>().unwrap();
    assert_eq!(err.message(), "Fibonacci iteration 0 failed: injected fault");
    assert!(collector.snapshots().is_empty());
}

#[test]
fn background_panic_fails_the_invocation() {
    let (harness, collector) = harness_with_collector();
    let harness = harness.with_compute(panic_on_worker);

    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();

    assert!(err.is::<WorkerTaskError>());
    assert!(err.to_string().contains("injected panic"));
    assert!(collector.snapshots().is_empty());
}

#[test]
fn inline_failure_fails_the_invocation() {
    let (harness, collector) = harness_with_collector();
    let harness = harness.with_compute(fail_inline);

    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();

    assert!(!err.is::<WorkerTaskError>());
    assert_eq!(
        format!("{err:#}"),
        "Inline fibonacci task failed: Fibonacci iteration 0 failed: injected fault"
    );
    assert!(collector.snapshots().is_empty());
}

#[test]
fn sequential_invocations_reuse_the_pool() {
    let (harness, collector) = harness_with_collector();

    for request in ["first", "second", "third"] {
        let snapshot = harness
            .handle(&EventRecord::default(), &DiagnosticContext::for_request(request))
            .unwrap();
        assert_eq!(snapshot.timer(FIBONACCI_TIMER).unwrap().count, 50);
    }

    let request_ids = collector
        .snapshots()
        .iter()
        .map(|(diagnostics, _)| diagnostics.request_id().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(request_ids, vec!["first", "second", "third"]);
}

#[test]
fn each_invocation_gets_a_fresh_snapshot() {
    let (harness, _) = harness_with_collector();

    let first = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap();
    let second = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap();

    assert_eq!(first.timer(FIBONACCI_TIMER).unwrap().count, 50);
    assert_eq!(second.timer(FIBONACCI_TIMER).unwrap().count, 50);
}

#[test]
fn interrupted_join_fails_the_invocation() {
    let pool = Arc::new(WorkerPool::new().unwrap());
    let reporter = Arc::new(ReportConfig::default().init());
    let harness = TimedComputeHarness::new(pool.clone(), small_config(), reporter)
        .with_compute(slow_on_worker);

    let interrupt = pool.interrupt_handle();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        interrupt.shutdown();
    });

    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();

    assert!(err.is::<JoinInterruptedError>());
}

#[test]
fn handle_fails_once_the_pool_is_shut_down() {
    let pool = Arc::new(WorkerPool::new().unwrap());
    pool.shutdown();

    let reporter = Arc::new(ReportConfig::default().init());
    let harness = TimedComputeHarness::new(pool, small_config(), reporter);
    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();

    assert!(err.is::<PoolShutdownError>());
}

#[test]
fn default_iterations_record_twice_the_iteration_count() {
    let collector = Arc::new(InMemoryReporter::new());
    let reporter = Arc::new(ReportConfig::default().add_collector(collector.clone()).init());
    let config = HarnessConfig::default().with_fibonacci_parameter(5);
    let harness = TimedComputeHarness::new(Arc::new(WorkerPool::new().unwrap()), config, reporter);

    let snapshot = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap();

    let timer = snapshot.timer(FIBONACCI_TIMER).unwrap();
    assert_eq!(timer.count as u64, 2 * FIBONACCI_ITERATIONS);
    assert_eq!(timer.count, 1000);
    assert_eq!(collector.snapshots().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_can_be_called_from_a_multi_thread_runtime() {
    let (harness, collector) = harness_with_collector();

    let snapshot = harness
        .handle(&EventRecord::default(), &DiagnosticContext::for_request("async"))
        .unwrap();

    assert_eq!(snapshot.timer(FIBONACCI_TIMER).unwrap().count, 50);
    assert_eq!(collector.snapshots().len(), 1);
}

#[tokio::test]
async fn handle_can_be_called_from_a_current_thread_runtime() {
    let (harness, _) = harness_with_collector();
    let harness = harness.with_compute(fail_on_worker);

    let err = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap_err();
    assert!(err.is::<WorkerTaskError>());

    let (harness, _) = harness_with_collector();
    let snapshot = harness
        .handle(&EventRecord::default(), &DiagnosticContext::new())
        .unwrap();
    assert_eq!(snapshot.timer(FIBONACCI_TIMER).unwrap().count, 50);
}
