//! End-to-end checks across stores sharing one database: hierarchy moves,
//! cross-table delete guards, cached counters and stock transfers.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use comercia_catalog::{
    Brand, BrandDetails, BrandRepository, Category, CategoryRepository, CreateProduct, Dimensions,
    LengthUnit, Price, Product, ProductBuilder, ProductDetails, ProductFilter, ProductRepository,
    ProductService, StockQuantity, Unit, UnitRepository, UnitType,
};
use comercia_core::{CategoryId, Entity, WarehouseId};
use comercia_customers::{CustomerRepository, CustomerService, NewCustomer};
use comercia_inventory::{
    Stock, StockBatch, StockRepository, Warehouse, WarehouseDetails, WarehouseRepository,
};

use crate::database::InMemoryDatabase;

fn q(value: i64) -> StockQuantity {
    StockQuantity::new(value).unwrap()
}

fn category(db: &Arc<InMemoryDatabase>, name: &str, parent: Option<CategoryId>) -> Category {
    db.categories()
        .save(Category::create(name, "", parent).unwrap())
        .unwrap()
}

fn product(name: &str, sku: &str, category_id: Option<CategoryId>) -> Product {
    ProductBuilder::new(name, sku, Price::from_cents(15_000).unwrap(), Price::from_cents(10_000).unwrap())
        .unwrap()
        .with_category_id(category_id)
        .with_current_stock(5)
        .unwrap()
        .build()
        .unwrap()
}

fn warehouse(db: &Arc<InMemoryDatabase>, name: &str, code: &str, capacity: i64) -> Warehouse {
    let dimensions = Dimensions::new(20.0, 10.0, 4.0, LengthUnit::M).unwrap();
    let warehouse = Warehouse::create(
        name,
        code,
        "Calle Industria 12, Monterrey",
        dimensions,
        q(capacity),
        WarehouseDetails::default(),
        false,
    )
    .unwrap();
    db.warehouses().save(warehouse).unwrap()
}

fn stock(product: u64, warehouse: WarehouseId, quantity: i64, min: i64, max: i64) -> Stock {
    Stock::create(
        product.into(),
        warehouse,
        q(quantity),
        q(min),
        q(max),
        Price::from_cents(1_000).unwrap(),
        StockBatch::default(),
    )
    .unwrap()
}

#[test]
fn kilograms_convert_to_grams() {
    let db = InMemoryDatabase::new();
    let units = db.units();
    let kg = units
        .save(Unit::create("Kilogram", "kg", UnitType::Weight, 1.0, true).unwrap())
        .unwrap();
    let g = units
        .save(Unit::create("Gram", "g", UnitType::Weight, 0.001, false).unwrap())
        .unwrap();

    let grams = units.convert(kg.id(), g.id(), 2.5).unwrap();
    assert!((grams - 2500.0).abs() < 1e-9);

    let litre = units
        .save(Unit::create("Litre", "l", UnitType::Volume, 1.0, true).unwrap())
        .unwrap();
    assert!(units.convert(kg.id(), litre.id(), 1.0).unwrap_err().is_invalid_argument());

    let second_base = Unit::create("Pound", "lb", UnitType::Weight, 0.4536, true).unwrap();
    assert!(units.save(second_base).unwrap_err().is_invalid_argument());
}

#[test]
fn nested_category_gets_path_and_blocks_parent_delete() {
    let db = InMemoryDatabase::new();
    let electronics = category(&db, "Electronics", None);
    let phones = category(&db, "Phones", Some(electronics.id()));

    assert_eq!(electronics.path(), "1");
    assert_eq!(electronics.level(), 0);
    assert_eq!(phones.path(), "1/2");
    assert_eq!(phones.level(), 1);

    let categories = db.categories();
    let err = categories.delete(electronics.id()).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(categories.find_by_id(electronics.id()).unwrap().is_some());

    categories.delete(phones.id()).unwrap();
    categories.delete(electronics.id()).unwrap();
    assert!(categories.find_all().unwrap().is_empty());
}

#[test]
fn unknown_parent_is_not_found() {
    let db = InMemoryDatabase::new();
    let orphan = Category::create("Orphan", "", Some(CategoryId::from(42))).unwrap();
    assert!(db.categories().save(orphan).unwrap_err().is_not_found());
    assert!(db.categories().find_all().unwrap().is_empty());
}

#[test]
fn moving_a_category_rewrites_its_subtree() {
    let db = InMemoryDatabase::new();
    let categories = db.categories();
    let electronics = category(&db, "Electronics", None);
    let phones = category(&db, "Phones", Some(electronics.id()));
    let cases = category(&db, "Cases", Some(phones.id()));
    let accessories = category(&db, "Accessories", None);

    let moved = categories
        .move_category(phones.id(), Some(accessories.id()))
        .unwrap();
    assert_eq!(moved.path(), "4/2");
    assert_eq!(moved.level(), 1);
    assert_eq!(moved.parent_id(), Some(accessories.id()));

    let cases = categories.find_by_id(cases.id()).unwrap().unwrap();
    assert_eq!(cases.path(), "4/2/3");
    assert_eq!(cases.level(), 2);

    let ids: Vec<CategoryId> = categories
        .descendants(accessories.id())
        .unwrap()
        .iter()
        .map(Entity::id)
        .collect();
    assert_eq!(ids, vec![phones.id(), cases.id()]);
    assert!(categories.descendants(electronics.id()).unwrap().is_empty());

    let ancestors: Vec<String> = categories
        .ancestors(cases.id())
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(ancestors, vec!["Accessories", "Phones"]);

    let root = categories.move_category(phones.id(), None).unwrap();
    assert_eq!(root.path(), "2");
    let cases = categories.find_by_id(cases.id()).unwrap().unwrap();
    assert_eq!(cases.path(), "2/3");
    assert_eq!(cases.level(), 1);
}

#[test]
fn moving_under_a_descendant_changes_nothing() {
    let db = InMemoryDatabase::new();
    let categories = db.categories();
    let electronics = category(&db, "Electronics", None);
    let phones = category(&db, "Phones", Some(electronics.id()));
    let cases = category(&db, "Cases", Some(phones.id()));

    let err = categories
        .move_category(electronics.id(), Some(cases.id()))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(categories
        .move_category(electronics.id(), Some(electronics.id()))
        .unwrap_err()
        .is_invalid_argument());

    let stored: Vec<(String, u8)> = categories
        .find_all()
        .unwrap()
        .iter()
        .map(|c| (c.path().to_string(), c.level()))
        .collect();
    assert!(stored.contains(&("1".to_string(), 0)));
    assert!(stored.contains(&("1/2".to_string(), 1)));
    assert!(stored.contains(&("1/2/3".to_string(), 2)));
}

#[test]
fn hierarchy_view_nests_children() {
    let db = InMemoryDatabase::new();
    let electronics = category(&db, "Electronics", None);
    let phones = category(&db, "Phones", Some(electronics.id()));
    category(&db, "Cases", Some(phones.id()));
    category(&db, "Garden", None);

    let trees = db.categories().hierarchy(None).unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].category.name(), "Electronics");
    assert_eq!(trees[0].size(), 3);

    let sub = db.categories().hierarchy(Some(phones.id())).unwrap();
    assert_eq!(sub.len(), 1);
    assert_eq!(sub[0].size(), 2);
}

#[test]
fn product_writes_keep_category_and_brand_counts() {
    let db = InMemoryDatabase::new();
    let tools = category(&db, "Tools", None);
    let garden = category(&db, "Garden", None);
    let brand = db
        .brands()
        .save(Brand::create("Truper", BrandDetails::default()).unwrap())
        .unwrap();

    let products = db.products();
    let drill = products
        .save(
            ProductBuilder::new("Taladro", "TL-1", Price::from_cents(200).unwrap(), Price::from_cents(100).unwrap())
                .unwrap()
                .with_category_id(Some(tools.id()))
                .with_brand_id(Some(brand.id()))
                .build()
                .unwrap(),
        )
        .unwrap();
    products.save(product("Martillo", "MT-1", Some(tools.id()))).unwrap();

    let categories = db.categories();
    assert_eq!(categories.find_by_id(tools.id()).unwrap().unwrap().product_count(), 2);
    assert_eq!(db.brands().find_by_id(brand.id()).unwrap().unwrap().product_count(), 1);
    assert!(db.brands().delete(brand.id()).unwrap_err().is_invalid_argument());
    assert!(categories.delete(tools.id()).unwrap_err().is_invalid_argument());

    let moved = ProductBuilder::new("Taladro", "TL-1", Price::from_cents(200).unwrap(), Price::from_cents(100).unwrap())
        .unwrap()
        .with_id(drill.id())
        .with_created_at(drill.created_at())
        .with_category_id(Some(garden.id()))
        .build()
        .unwrap();
    products.save(moved).unwrap();
    assert_eq!(categories.find_by_id(tools.id()).unwrap().unwrap().product_count(), 1);
    assert_eq!(categories.find_by_id(garden.id()).unwrap().unwrap().product_count(), 1);
    assert_eq!(db.brands().find_by_id(brand.id()).unwrap().unwrap().product_count(), 0);

    assert!(products.delete(drill.id()).unwrap());
    assert_eq!(categories.find_by_id(garden.id()).unwrap().unwrap().product_count(), 0);
    assert_eq!(categories.count_products_in_hierarchy(tools.id()).unwrap(), 1);
}

#[test]
fn product_service_runs_against_the_store() {
    let db = InMemoryDatabase::new();
    let tools = category(&db, "Tools", None);
    let service = ProductService::new(db.products());

    let details: ProductDetails = serde_json::from_value(serde_json::json!({
        "name": "Pinza de Presión",
        "sku": "pz-10",
        "category_id": tools.id(),
        "cost_price": "80",
        "selling_price": "120.5",
    }))
    .unwrap();
    let created = service
        .create(CreateProduct {
            details: details.clone(),
            current_stock: 3,
            track_stock: true,
            allow_backorders: false,
            is_active: true,
        })
        .unwrap();
    assert_eq!(created.sku().value(), "PZ-10");
    assert_eq!(created.selling_price().value(), Decimal::new(12050, 2));

    let duplicate = service.create(CreateProduct {
        details,
        current_stock: 0,
        track_stock: true,
        allow_backorders: false,
        is_active: true,
    });
    assert!(duplicate.unwrap_err().is_invalid_argument());

    let filter = ProductFilter {
        search: Some("presión".to_string()),
        ..ProductFilter::default()
    };
    assert_eq!(service.list(&filter).unwrap().len(), 1);

    let stats = service.stats().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.low_stock, 1);
    assert_eq!(stats.total_inventory_value, Price::from_cents(24_000).unwrap());
    assert_eq!(db.categories().count_products(tools.id()).unwrap(), 1);
}

#[test]
fn customer_service_enforces_uniqueness_through_the_store() {
    let db = InMemoryDatabase::new();
    let service = CustomerService::new(db.customers());
    let input = |name: &str, rfc: &str, email: &str| NewCustomer {
        name: name.to_string(),
        rfc: rfc.to_string(),
        address: "Av. Reforma 222, Col. Juárez, CDMX 06600".to_string(),
        phone: "55 1234 5678".to_string(),
        email: email.to_string(),
    };

    let ana = service
        .create(input("Ana López", "LOPA800101AB1", "ana@example.com"))
        .unwrap();
    let err = service
        .create(input("Otra Ana", "lopa800101ab1", "otra@example.com"))
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(db.customers().find_all().unwrap().len(), 1);
    service.delete(ana.id()).unwrap();
    assert!(service.get_by_id(ana.id()).unwrap_err().is_not_found());
}

#[test]
fn removing_stock_respects_the_minimum_level() {
    let db = InMemoryDatabase::new();
    let main = warehouse(&db, "Principal", "MAIN", 1_000);
    let stocks = db.stocks();
    let saved = stocks.save(stock(1, main.id(), 5, 2, 20)).unwrap();

    assert!(stocks.adjust_stock(saved.id(), -4, "merma").unwrap_err().is_invalid_argument());
    assert_eq!(stocks.find_by_id(saved.id()).unwrap().unwrap().quantity(), q(5));

    let emptied = stocks.adjust_stock(saved.id(), -5, "venta").unwrap();
    assert!(emptied.quantity().is_zero());
    assert!(emptied.total_value().is_zero());
    assert_eq!(db.warehouses().find_by_id(main.id()).unwrap().unwrap().current_stock(), q(0));
}

#[test]
fn transfer_moves_quantity_between_warehouses() {
    let db = InMemoryDatabase::new();
    let main = warehouse(&db, "Principal", "MAIN", 1_000);
    let north = warehouse(&db, "Norte", "NORTH", 1_000);
    let stocks = db.stocks();
    let source = stocks.save(stock(7, main.id(), 30, 0, 100)).unwrap();

    let (from, to) = stocks
        .transfer_stock(source.id(), north.id(), q(12), Some("A-01".to_string()))
        .unwrap();
    assert_eq!(from.quantity(), q(18));
    assert_eq!(to.quantity(), q(12));
    assert_eq!(to.warehouse_id(), north.id());
    assert_eq!(to.location(), Some("A-01"));
    assert_eq!(to.unit_cost(), source.unit_cost());

    let warehouses = db.warehouses();
    assert_eq!(warehouses.find_by_id(main.id()).unwrap().unwrap().current_stock(), q(18));
    assert_eq!(warehouses.find_by_id(north.id()).unwrap().unwrap().current_stock(), q(12));

    let (_, to) = stocks.transfer_stock(source.id(), north.id(), q(3), None).unwrap();
    assert_eq!(to.quantity(), q(15));
    assert_eq!(stocks.find_by_product(7.into()).unwrap().len(), 2);

    let summary = stocks.summary_by_product().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].1.quantity, q(30));
}

#[test]
fn failed_transfer_leaves_both_sides_untouched() {
    let db = InMemoryDatabase::new();
    let main = warehouse(&db, "Principal", "MAIN", 1_000);
    let small = warehouse(&db, "Chico", "SMALL", 10);
    let stocks = db.stocks();
    let source = stocks.save(stock(7, main.id(), 30, 0, 100)).unwrap();

    let err = stocks.transfer_stock(source.id(), small.id(), q(12), None).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(stocks
        .transfer_stock(source.id(), main.id(), q(1), None)
        .unwrap_err()
        .is_invalid_argument());
    assert!(stocks
        .transfer_stock(source.id(), small.id(), q(31), None)
        .unwrap_err()
        .is_invalid_argument());

    assert_eq!(stocks.find_by_id(source.id()).unwrap().unwrap().quantity(), q(30));
    assert!(stocks.find_by_warehouse(small.id()).unwrap().is_empty());
    let warehouses = db.warehouses();
    assert_eq!(warehouses.find_by_id(main.id()).unwrap().unwrap().current_stock(), q(30));
    assert!(warehouses.find_by_id(small.id()).unwrap().unwrap().current_stock().is_zero());
}

#[test]
fn warehouses_hold_a_single_default_and_guard_deletes() {
    let db = InMemoryDatabase::new();
    let warehouses = db.warehouses();
    let main = warehouse(&db, "Principal", "MAIN", 100);
    let mut north = warehouse(&db, "Norte", "NORTH", 300);

    let mut main_default = main.clone();
    main_default.mark_as_default();
    warehouses.save(main_default).unwrap();
    north.mark_as_default();
    warehouses.save(north.clone()).unwrap();

    let default = warehouses.find_default().unwrap().unwrap();
    assert_eq!(default.id(), north.id());
    assert!(!warehouses.find_by_id(main.id()).unwrap().unwrap().is_default());

    let dup = Warehouse::create(
        "Otro",
        "MAIN",
        "Calle Industria 12, Monterrey",
        Dimensions::new(1.0, 1.0, 1.0, LengthUnit::M).unwrap(),
        q(10),
        WarehouseDetails::default(),
        false,
    )
    .unwrap();
    assert!(warehouses.save(dup).unwrap_err().is_invalid_argument());

    db.stocks().save(stock(1, main.id(), 50, 0, 100)).unwrap();
    assert!(warehouses.delete(main.id()).unwrap_err().is_invalid_argument());
    assert_eq!(warehouses.total_capacity().unwrap(), 400);
    assert_eq!(warehouses.total_current_stock().unwrap(), 50);
    assert!((warehouses.average_utilization().unwrap() - 25.0).abs() < 1e-9);
    assert_eq!(warehouses.by_utilization(40.0, 60.0).unwrap().len(), 1);
    assert_eq!(warehouses.with_capacity(q(200)).unwrap().len(), 1);

    warehouses.delete(north.id()).unwrap();
    assert!(warehouses.find_default().unwrap().is_none());
}

#[test]
fn expiry_queries_use_the_given_day() {
    let db = InMemoryDatabase::new();
    let main = warehouse(&db, "Principal", "MAIN", 1_000);
    let stocks = db.stocks();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let batch = |days: i64, number: &str| StockBatch {
        location: None,
        batch_number: Some(number.to_string()),
        expiration_date: today.checked_add_signed(chrono::Duration::days(days)),
    };
    let with_batch = |product: u64, b: StockBatch| {
        Stock::create(
            product.into(),
            main.id(),
            q(10),
            q(0),
            q(100),
            Price::from_cents(500).unwrap(),
            b,
        )
        .unwrap()
    };
    stocks.save(with_batch(1, batch(-1, "L-OLD"))).unwrap();
    stocks.save(with_batch(2, batch(5, "L-SOON"))).unwrap();
    stocks.save(with_batch(3, batch(60, "L-LATE"))).unwrap();

    assert_eq!(stocks.find_expired(today).unwrap().len(), 1);
    assert_eq!(stocks.find_expiring_within(7, today).unwrap().len(), 1);
    assert_eq!(stocks.find_expiring_within(i64::MAX, today).unwrap().len(), 2);
    assert!(stocks.find_expiring_within(i64::MIN, today).unwrap().is_empty());
    assert_eq!(stocks.find_by_batch_number("L-SOON").unwrap().len(), 1);
}
