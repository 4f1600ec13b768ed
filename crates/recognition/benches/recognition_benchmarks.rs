use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use scanventory_catalog::{Product, ProductCatalog};
use scanventory_core::ProductId;
use scanventory_recognition::parse_single_item_text;

fn description_with_items(count: usize) -> String {
    let mut text = String::from("Here is what I can see on the shelf.\n");
    for i in 0..count {
        text.push_str(&format!(
            "Item {}: Sample Product {}\nSize: {}lb bag\nQuantity: {}.5\nConfidence: 87%\n\n",
            i + 1,
            i,
            (i % 9) + 1,
            (i % 4) + 1,
        ));
    }
    text
}

fn catalog_with_products(count: usize) -> ProductCatalog {
    let products = (0..count)
        .map(|i| Product::new(ProductId::new(format!("p{i}")), format!("Sample Product {i}")))
        .collect();
    ProductCatalog::new(products)
}

fn bench_parse_single_item_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_single_item_text");

    for item_count in [1, 10, 100].iter() {
        let text = description_with_items(*item_count);
        group.throughput(Throughput::Elements(*item_count as u64));
        group.bench_with_input(
            BenchmarkId::new("items", item_count),
            &text,
            |b, text| {
                b.iter(|| black_box(parse_single_item_text(black_box(text))));
            },
        );
    }

    group.finish();
}

fn bench_catalog_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_resolve");

    for product_count in [10, 100, 1000].iter() {
        let catalog = catalog_with_products(*product_count);
        // Worst case: nothing matches, so every entry is compared.
        let needle = "a case of frozen shrimp";
        group.bench_with_input(
            BenchmarkId::new("products", product_count),
            &catalog,
            |b, catalog| {
                b.iter(|| black_box(catalog.resolve(black_box(needle))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_single_item_text, bench_catalog_resolve);
criterion_main!(benches);
