use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use neatrs::bmr::BmrCalculator;
use neatrs::models::{BiologicalSex, DayWindow, EnergyAggregate, ExerciseSession, UserProfile};
use neatrs::passive::PassiveEnergyCalculator;

/// Performance benchmarks for the energy balance core
///
/// The calculator runs on every dashboard load, so the pure compute path
/// should stay trivially cheap regardless of session count.

fn benchmark_profile() -> UserProfile {
    UserProfile {
        sex: BiologicalSex::Male,
        birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        weight_kg: 72.0,
        height_cm: 178.0,
    }
}

fn benchmark_window() -> DayWindow {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 15, 15, 0, 0).unwrap();
    DayWindow::for_instant(now, offset)
}

fn session_dataset(count: usize) -> Vec<ExerciseSession> {
    (0..count)
        .map(|i| ExerciseSession {
            active_kcal: 50.0 + (i % 7) as f64 * 25.0,
            data_origin: Some(if i % 2 == 0 { "watch" } else { "phone" }.to_string()),
        })
        .collect()
}

fn bench_passive_compute(c: &mut Criterion) {
    let profile = benchmark_profile();
    let window = benchmark_window();
    let now = window.start_instant + Duration::minutes(720);

    let mut group = c.benchmark_group("Passive Energy");

    for &count in &[0, 1, 10, 100] {
        let sessions = session_dataset(count);
        let aggregate = EnergyAggregate::from_sessions(2400.0, &sessions);

        group.bench_with_input(
            BenchmarkId::new("compute", count),
            &aggregate,
            |b, aggregate| {
                b.iter(|| {
                    PassiveEnergyCalculator::compute(
                        black_box(&profile),
                        black_box(&window),
                        black_box(now),
                        black_box(aggregate),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_aggregate_from_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Aggregate");

    for &count in &[10, 100, 1000] {
        let sessions = session_dataset(count);

        group.bench_with_input(
            BenchmarkId::new("from_sessions", count),
            &sessions,
            |b, sessions| {
                b.iter(|| EnergyAggregate::from_sessions(black_box(2400.0), black_box(sessions)));
            },
        );
    }

    group.finish();
}

fn bench_daily_bmr(c: &mut Criterion) {
    let profile = benchmark_profile();
    let on = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    c.bench_function("daily_bmr", |b| {
        b.iter(|| BmrCalculator::daily_bmr(black_box(&profile), black_box(on)));
    });
}

criterion_group!(
    benches,
    bench_passive_compute,
    bench_aggregate_from_sessions,
    bench_daily_bmr
);
criterion_main!(benches);
