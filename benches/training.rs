use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rental_insights::inference::PricePredictor;
use rental_insights::optimizer::SearchConfig;
use rental_insights::pipeline::{PipelineConfig, PricePipeline};
use rental_insights::preprocessing::FeaturePreparer;
use std::collections::HashMap;

fn create_listings(n_rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let rooms = ["Entire home/apt", "Private room", "Shared room"];
    let areas = ["Centrum-Oost", "Centrum-West", "De Pijp", "Noord", "Oost", "Westerpark"];

    let accommodates: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(1..=8)).collect();
    let bedrooms: Vec<i64> = accommodates.iter().map(|a| (a + 1) / 2).collect();
    let bathrooms: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(1..=4) as f64 * 0.5).collect();
    let reviews: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..300)).collect();
    let rating: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(3.5..5.0)).collect();
    let value: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(3.5..5.0)).collect();
    let room_type: Vec<&str> = (0..n_rows).map(|_| rooms[rng.gen_range(0..rooms.len())]).collect();
    let area: Vec<&str> = (0..n_rows).map(|_| areas[rng.gen_range(0..areas.len())]).collect();

    // Price driven by capacity and room type plus noise
    let price: Vec<f64> = (0..n_rows)
        .map(|i| {
            let room = if room_type[i] == "Entire home/apt" { 40.0 } else { 0.0 };
            50.0 + 22.0 * accommodates[i] as f64 + 15.0 * bathrooms[i] + room + rng.gen_range(-10.0..10.0)
        })
        .collect();

    df!(
        "accommodates" => accommodates,
        "bedrooms" => bedrooms,
        "bathrooms" => bathrooms,
        "number_of_reviews" => reviews,
        "review_scores_rating" => rating,
        "review_scores_value" => value,
        "room_type" => room_type,
        "neighbourhood_cleansed" => area,
        "price" => price,
    )
    .unwrap()
}

fn bench_config() -> PipelineConfig {
    PipelineConfig::default().with_search(SearchConfig::new().with_n_iter(2).with_cv_folds(3))
}

fn bench_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("preparation");

    for n_rows in [1000, 10000].iter() {
        let df = create_listings(*n_rows);
        let preparer = FeaturePreparer::default();

        group.bench_with_input(BenchmarkId::new("prepare", n_rows), &df, |b, df| {
            b.iter(|| preparer.prepare(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [200, 1000].iter() {
        let df = create_listings(*n_rows);
        let pipeline = PricePipeline::new(bench_config());

        group.bench_with_input(BenchmarkId::new("run", n_rows), &df, |b, df| {
            b.iter(|| pipeline.run(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let report = PricePipeline::new(bench_config())
        .run(&create_listings(500))
        .unwrap()
        .into_report()
        .unwrap();
    let predictor = PricePredictor::with_bundle(report.bundle);

    let features = HashMap::from([
        ("accommodates".to_string(), 4.0),
        ("bedrooms".to_string(), 2.0),
        ("bathrooms".to_string(), 1.0),
        ("number_of_reviews".to_string(), 20.0),
    ]);

    c.bench_function("predict_single", |b| {
        b.iter(|| predictor.predict(black_box(&features)).unwrap())
    });
}

criterion_group!(benches, bench_preparation, bench_pipeline, bench_prediction);
criterion_main!(benches);
