// ABOUTME: Criterion benchmarks for candidate filtering, the weekly solver, and hybrid composition
// ABOUTME: Uses synthetic catalogs with spread-out macros so the solver has to search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Criterion benchmarks for weekly plan construction.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mealplan_core::models::{
    DietaryFlags, MacroTarget, Macros, MealType, PreferenceProfile, RecipeCandidate, UserHistory,
};
use mealplan_intelligence::{
    filter_candidates, DisabledSynthesizer, FilterConfig, HybridComposer, PlannerConfig,
    SolverConfig, WeeklySolver,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

const CATALOG_SIZES: [usize; 3] = [21, 60, 150];

/// Catalog with `per_bucket` recipes per main bucket whose calories vary by up to +/-15%
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn synthetic_catalog(per_bucket: usize) -> Vec<RecipeCandidate> {
    let buckets = [
        (MealType::Breakfast, Macros::new(500.0, 30.0, 50.0, 15.0)),
        (MealType::Lunch, Macros::new(750.0, 45.0, 75.0, 22.5)),
        (MealType::Dinner, Macros::new(750.0, 45.0, 75.0, 22.5)),
    ];
    buckets
        .iter()
        .flat_map(|(meal_type, base)| {
            (0..per_bucket).map(move |index| {
                let spread = 0.85 + ((index * 7) % 31) as f64 / 100.0;
                RecipeCandidate::new(
                    Uuid::new_v4(),
                    format!("{meal_type} {index}"),
                    *meal_type,
                    Macros::new(
                        base.calories * spread,
                        base.protein * spread,
                        base.carbs * spread,
                        base.fat * spread,
                    ),
                )
                .with_total_time(15 + (index % 4) as u32 * 10)
                .with_allergens(["none"])
                .with_dietary(DietaryFlags::vegetarian())
                .with_ingredients(["grain", "legume"])
                .with_instructions(["Cook."])
            })
        })
        .collect()
}

fn half_liked(catalog: &[RecipeCandidate]) -> UserHistory {
    UserHistory::default().with_liked(catalog.iter().step_by(2).map(|recipe| recipe.id))
}

fn target() -> MacroTarget {
    MacroTarget::new(2000.0, 120.0, 200.0, 60.0)
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_candidates");
    let profile = PreferenceProfile::default();
    let config = FilterConfig::default();

    for size in CATALOG_SIZES {
        let catalog = synthetic_catalog(size / 3);
        let history = half_liked(&catalog);
        group.throughput(Throughput::Elements(catalog.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| filter_candidates(black_box(catalog), &profile, &history, &config));
        });
    }
    group.finish();
}

fn bench_weekly_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("weekly_solve");
    group.sample_size(20);
    let profile = PreferenceProfile::default();
    let slots = profile.slots();
    let solver = WeeklySolver::new(SolverConfig::default());

    for size in CATALOG_SIZES {
        let catalog = synthetic_catalog(size / 3);
        let history = half_liked(&catalog);
        let pool = filter_candidates(&catalog, &profile, &history, &FilterConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(size), &pool, |b, pool| {
            b.iter(|| solver.solve(black_box(pool), &history, &target(), &slots));
        });
    }
    group.finish();
}

fn bench_hybrid_compose(c: &mut Criterion) {
    let Ok(runtime) = Runtime::new() else {
        return;
    };
    let mut group = c.benchmark_group("hybrid_compose");
    let profile = PreferenceProfile::default();
    let config = PlannerConfig::default();
    let synthesizer = DisabledSynthesizer;

    for size in CATALOG_SIZES {
        let catalog = synthetic_catalog(size / 3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.to_async(&runtime).iter(|| async {
                let mut composer =
                    HybridComposer::new(catalog, &profile, &synthesizer, &config.composer);
                composer.compose_week(&target()).await
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_filter,
    bench_weekly_solve,
    bench_hybrid_compose
);
criterion_main!(benches);
