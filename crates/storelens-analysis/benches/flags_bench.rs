//! Feature flagging benchmarks.
//!
//! Run with: cargo bench -p storelens-analysis --bench flags_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use storelens_analysis::confidence::ConfidenceScorer;
use storelens_analysis::flags::FeatureFlagDriver;
use storelens_analysis::patterns::PatternLibrary;
use storelens_analysis::reviews::ReviewCorpus;
use storelens_core::types::{AppRecord, FxHashMap, ReviewRecord};

const TITLES: [&str; 4] = [
    "Pomodoro Focus Timer",
    "Site Blocker Pro",
    "Habit Streaks",
    "Calm Wallpaper",
];

fn synthetic(apps: usize, reviews_per_app: usize) -> (Vec<AppRecord>, Vec<ReviewRecord>) {
    let mut out_apps = Vec::with_capacity(apps);
    let mut out_reviews = Vec::with_capacity(apps * reviews_per_app);
    for i in 0..apps {
        let key = format!("play:app{i:05}");
        let mut a = AppRecord::new(key.as_str());
        a.title = Some(TITLES[i % TITLES.len()].to_string());
        a.description = Some("Block distracting apps, run a pomodoro timer, and track habits.".into());
        out_apps.push(a);
        for j in 0..reviews_per_app {
            let mut r = ReviewRecord::new(key.as_str());
            r.body = Some(format!("review {j}: the timer helps me focus, blocking works"));
            out_reviews.push(r);
        }
    }
    (out_apps, out_reviews)
}

fn flags_run_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("flags_run_all");
    group.sample_size(10);
    let library = PatternLibrary::builtin().unwrap();

    for size in [100, 1000] {
        let (apps, reviews) = synthetic(size, 20);
        let corpus = ReviewCorpus::from_reviews(&reviews);
        let websites = FxHashMap::default();
        group.bench_with_input(BenchmarkId::new("apps", size), &size, |b, _| {
            b.iter(|| {
                let driver = FeatureFlagDriver::new(&library, ConfidenceScorer::default());
                driver.run_all(&apps, &websites, &corpus)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, flags_run_all);
criterion_main!(benches);
