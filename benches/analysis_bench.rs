//! Benchmarks for the mood pattern analyzers
//!
//! Run with: cargo bench

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use echo_patterns::analysis::*;
use echo_patterns::service::{InMemoryEchoSource, NarrativeError, NarrativeGenerator, PatternService};
use echo_patterns::{Config, EchoRecord, EchoSeries};
use std::sync::Arc;

fn create_test_series(count: usize) -> EchoSeries {
    let start = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 30, 21, 0, 0)
        .unwrap();
    let records = (0..count)
        .map(|i| {
            let mood = ((i * 37 % 200) as f64 / 100.0) - 1.0;
            EchoRecord::new(start - Duration::hours(10 * i as i64), mood)
                .tags(["calm", "tired", "anxiety"].iter().take(1 + i % 3).copied())
        })
        .collect();
    EchoSeries::new(records).unwrap()
}

fn bench_weekday(c: &mut Criterion) {
    let mut group = c.benchmark_group("weekday");
    let aggregator = DayOfWeekAggregator::default();

    for size in [14, 60, 365] {
        let series = create_test_series(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("analyze_{}", size), |b| {
            b.iter(|| aggregator.analyze(black_box(&series)))
        });
    }

    group.finish();
}

fn bench_short_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("windows");
    let series = create_test_series(60);
    let as_of = Utc.with_ymd_and_hms(2024, 6, 30, 22, 0, 0).unwrap();
    let activities: Vec<_> = (0..40).map(|i| as_of - Duration::hours(6 * i)).collect();

    let trajectory = TrajectoryEstimator::default();
    group.bench_function("trajectory", |b| {
        b.iter(|| trajectory.analyze(black_box(&series), black_box(&activities), as_of))
    });

    let detector = InterventionDetector::default();
    group.bench_function("intervention", |b| {
        b.iter(|| detector.analyze(black_box(&series)))
    });

    let profiler = EmotionProfiler::default();
    group.bench_function("emotions", |b| {
        b.iter(|| profiler.profile(black_box(&series)))
    });

    group.finish();
}

struct NoopNarrator;

#[async_trait::async_trait]
impl NarrativeGenerator for NoopNarrator {
    async fn generate(&self, _report: &PatternReport) -> Result<serde_json::Value, NarrativeError> {
        Ok(serde_json::Value::Null)
    }

    fn fallback(&self, _report: &PatternReport) -> serde_json::Value {
        serde_json::Value::Null
    }
}

fn bench_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let as_of = Utc.with_ymd_and_hms(2024, 6, 30, 22, 0, 0).unwrap();

    let source = Arc::new(InMemoryEchoSource::new());
    rt.block_on(source.add_echoes("bench", create_test_series(120).records().to_vec()));
    let service = PatternService::new(source, Arc::new(NoopNarrator), Config::default());

    c.bench_function("service/analyze_all", |b| {
        b.iter(|| rt.block_on(service.analyze_all(black_box("bench"), as_of)).unwrap())
    });
}

criterion_group!(benches, bench_weekday, bench_short_windows, bench_service);
criterion_main!(benches);
