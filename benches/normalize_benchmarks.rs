use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use geocomplete::normalizer::{extract, split_number_and_words};
use geocomplete::{Category, RawPlaceRecord, SuggestionListController};

fn record(place_type: &str, place_name: &str) -> RawPlaceRecord {
    RawPlaceRecord {
        place_type: vec![place_type.to_string()],
        place_name: place_name.to_string(),
        ..RawPlaceRecord::default()
    }
}

fn bench_extraction(c: &mut Criterion) {
    let address = record("address", "10 Rue de Paris, 75001 Paris, France");
    let poi = record(
        "poi",
        "Musée du Louvre, 99 Rue de Rivoli, Paris, 75001, France",
    );

    c.bench_function("split_number_and_words", |b| {
        b.iter(|| split_number_and_words(black_box("10 Rue de Paris")))
    });

    c.bench_function("extract_address", |b| {
        b.iter(|| extract(Category::Address, black_box(&address)))
    });

    c.bench_function("extract_poi", |b| {
        b.iter(|| extract(Category::Poi, black_box(&poi)))
    });
}

fn bench_dropdown(c: &mut Criterion) {
    let records: Vec<_> = (0..10)
        .map(|i| record("place", &format!("Ville {i}, France")))
        .collect();

    c.bench_function("show_and_cycle_focus", |b| {
        b.iter(|| {
            let mut list = SuggestionListController::new();
            list.show(black_box(records.clone()));
            for _ in 0..records.len() {
                list.focus_next();
            }
            list.state().focused_index()
        })
    });
}

criterion_group!(benches, bench_extraction, bench_dropdown);
criterion_main!(benches);
