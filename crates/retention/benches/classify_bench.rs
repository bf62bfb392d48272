//! Classifier benchmark over large synthetic backup sets

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use retention::{classify, BackupRecord, BackupSet, RetentionPolicy};

fn synthetic_set(count: usize) -> BackupSet {
    let last = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let records = (0..count)
        .map(|i| {
            // Four backups a day to exercise within-bucket skipping
            let date = last - Duration::days((i / 4) as i64);
            let hour = 6 * (i % 4) as u32;
            let timestamp = date.and_hms_opt(hour, 0, 0).unwrap();
            let name = format!("bench-{}.zip", timestamp.format("%Y-%m-%d_%H-%M-%S"));
            BackupRecord {
                identifier: name.trim_end_matches(".zip").to_string(),
                prefix: "bench".to_string(),
                timestamp,
                raw_name: name,
            }
        })
        .collect();
    BackupSet::from_records(records)
}

fn bench_classify(c: &mut Criterion) {
    let policy = RetentionPolicy::default();
    let mut group = c.benchmark_group("classify");

    for count in [100usize, 1_000, 10_000] {
        let set = synthetic_set(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &set, |b, set| {
            b.iter(|| classify(black_box(set), black_box(&policy)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
