use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gaze::analysis;
use gaze::classify::score::compute_score;
use gaze::config::Thresholds;
use gaze::crap::{classify_quadrant, formula};
use gaze::program::Package;
use gaze::taxonomy::Signal;

const FIXTURE: &str = r#"
pub struct Counter {
    count: u64,
    name: String,
}

impl Counter {
    pub fn increment(&mut self) {
        self.count += 1;
    }
}

pub fn fetch_records(limit: usize) -> Result<(Vec<u64>, usize), StoreError> {
    Ok((Vec::with_capacity(limit), 0))
}
"#;

fn bench_formula(c: &mut Criterion) {
    c.bench_function("crap_formula", |b| {
        b.iter(|| formula(black_box(10), black_box(50.0)))
    });
}

fn bench_quadrant(c: &mut Criterion) {
    c.bench_function("classify_quadrant", |b| {
        b.iter(|| classify_quadrant(black_box(20), black_box(10.0), 15, 15.0))
    });
}

fn bench_compute_score(c: &mut Criterion) {
    let thresholds = Thresholds::default();
    c.bench_function("compute_score", |b| {
        b.iter(|| {
            compute_score(
                vec![
                    Signal::new("interface", 30),
                    Signal::new("visibility", 10),
                    Signal::new("naming", -10),
                ],
                black_box(&thresholds),
            )
        })
    });
}

fn bench_analyze_function(c: &mut Criterion) {
    let package = Package::from_source("bench", FIXTURE).unwrap();
    let handle = package.find_function("fetch_records").unwrap();
    c.bench_function("analyze_function", |b| {
        b.iter(|| analysis::analyze_function(black_box(handle)))
    });
}

criterion_group!(
    benches,
    bench_formula,
    bench_quadrant,
    bench_compute_score,
    bench_analyze_function
);
criterion_main!(benches);
