use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use comercia_catalog::{
    Category, CategoryRepository, Dimensions, LengthUnit, Price, StockQuantity,
};
use comercia_core::{CategoryId, Entity, ProductId, WarehouseId};
use comercia_infra::InMemoryDatabase;
use comercia_inventory::{
    Stock, StockBatch, StockRepository, Warehouse, WarehouseDetails, WarehouseRepository,
};

fn quantity(value: i64) -> StockQuantity {
    StockQuantity::new(value).unwrap()
}

/// A root with `fanout` children, each with `fanout` children of its own.
fn seed_tree(db: &Arc<InMemoryDatabase>, fanout: usize) -> CategoryId {
    let categories = db.categories();
    let root = categories
        .save(Category::create("Root", "", None).unwrap())
        .unwrap();
    for i in 0..fanout {
        let child = categories
            .save(Category::create(&format!("Child {i}"), "", Some(root.id())).unwrap())
            .unwrap();
        for j in 0..fanout {
            categories
                .save(Category::create(&format!("Leaf {i}-{j}"), "", Some(child.id())).unwrap())
                .unwrap();
        }
    }
    root.id()
}

fn seed_warehouse(db: &Arc<InMemoryDatabase>, code: &str) -> WarehouseId {
    let warehouse = Warehouse::create(
        &format!("Almacén {code}"),
        code,
        "Calle Industria 12, Monterrey",
        Dimensions::new(20.0, 10.0, 4.0, LengthUnit::M).unwrap(),
        quantity(1_000_000),
        WarehouseDetails::default(),
        false,
    )
    .unwrap();
    db.warehouses().save(warehouse).unwrap().id()
}

fn bench_category_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_move");

    for fanout in [5usize, 20, 50] {
        let db = InMemoryDatabase::new();
        let root = seed_tree(&db, fanout);
        let other = db
            .categories()
            .save(Category::create("Other", "", None).unwrap())
            .unwrap()
            .id();
        let subtree = 1 + fanout + fanout * fanout;
        group.throughput(Throughput::Elements(subtree as u64));
        group.bench_with_input(BenchmarkId::from_parameter(subtree), &fanout, |b, _| {
            let categories = db.categories();
            let mut under_other = false;
            b.iter(|| {
                let parent = if under_other { None } else { Some(other) };
                categories.move_category(black_box(root), parent).unwrap();
                under_other = !under_other;
            });
        });
    }

    group.finish();
}

fn bench_stock_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_transfer");

    for records in [10usize, 1_000] {
        let db = InMemoryDatabase::new();
        let main = seed_warehouse(&db, "MAIN");
        let north = seed_warehouse(&db, "NORTH");
        let stocks = db.stocks();
        let mut source = None;
        for product in 1..=records as u64 {
            let stock = Stock::create(
                ProductId::from(product),
                main,
                quantity(100),
                quantity(0),
                quantity(10_000),
                Price::from_cents(1_000).unwrap(),
                StockBatch::default(),
            )
            .unwrap();
            let saved = stocks.save(stock).unwrap();
            source.get_or_insert(saved.id());
        }
        let source = source.unwrap();
        let back = {
            let (_, to) = stocks.transfer_stock(source, north, quantity(1), None).unwrap();
            to.id()
        };

        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| {
                stocks
                    .transfer_stock(source, north, black_box(quantity(1)), None)
                    .unwrap();
                stocks.transfer_stock(back, main, quantity(1), None).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_category_move, bench_stock_transfer);
criterion_main!(benches);
