mod support;

use std::collections::HashSet;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;

use spimex_trading::application::trading::TradingService;
use spimex_trading::domain::filter::{FilterCriteria, Pagination};
use spimex_trading::infra::telemetry;

use support::{InMemoryTradingRepo, UnreachableCache, august_fixture, memory_service, read_through};

#[tokio::test]
async fn read_through_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let repo = InMemoryTradingRepo::seeded(august_fixture()).await;

    // miss, then hit
    let (service, _) = memory_service(repo.clone());
    for _ in 0..2 {
        service
            .last_trading_dates(Pagination::default())
            .await
            .expect("dates");
    }
    service
        .filter_trading_results(&FilterCriteria::default())
        .await
        .expect("records");

    // backend failures
    let degraded = TradingService::new(repo.clone(), read_through(Arc::new(UnreachableCache)));
    degraded
        .last_trading_dates(Pagination::default())
        .await
        .expect("dates from storage");

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "spimex_cache_hit_total",
        "spimex_cache_miss_total",
        "spimex_cache_error_total",
        "spimex_storage_query_ms",
    ];
    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let labelled_operations: HashSet<String> = snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == "spimex_cache_miss_total")
        .flat_map(|(key, _, _, _)| {
            key.key()
                .labels()
                .filter(|label| label.key() == "operation")
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(labelled_operations.contains("get_last_trading_dates"));
    assert!(labelled_operations.contains("filter_trading_results"));

    let error_labels: HashSet<(String, String)> = snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == "spimex_cache_error_total")
        .flat_map(|(key, _, _, _)| {
            key.key()
                .labels()
                .map(|label| (label.key().to_string(), label.value().to_string()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(error_labels.contains(&(
        "operation".to_string(),
        "get_last_trading_dates".to_string()
    )));
    assert!(error_labels.contains(&("op".to_string(), "get".to_string())));
    assert!(error_labels.contains(&("op".to_string(), "set".to_string())));
}
