use bus_rental_core::availability::{AvailabilityChecker, AvailabilitySet, DateInterval};
use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};

// Random availability windows spread over two years
fn random_availability(intervals: usize) -> AvailabilitySet {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut rng = thread_rng();
    (0..intervals)
        .map(|_| {
            let start = base + Days::new(rng.gen_range(0..730));
            let end = start + Days::new(rng.gen_range(0..21));
            DateInterval::new(start, end).unwrap()
        })
        .collect()
}

pub fn availability_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_availability");
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for intervals in [4, 64, 1024].iter() {
        let set = random_availability(*intervals);
        let merged = set.merged();

        let mut rng = thread_rng();
        let requests: Vec<(NaiveDate, NaiveDate)> = (0..200)
            .map(|_| {
                let start = base + Days::new(rng.gen_range(0..730));
                (start, start + Days::new(rng.gen_range(0..14)))
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("linear_scan", intervals),
            &requests,
            |b, requests| {
                let scan = set.scan();
                b.iter(|| {
                    for (start, end) in requests {
                        black_box(scan.is_range_available(*start, *end).unwrap());
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("merged", intervals),
            &requests,
            |b, requests| {
                b.iter(|| {
                    for (start, end) in requests {
                        black_box(merged.is_range_available(*start, *end).unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, availability_benchmark);
criterion_main!(benches);
