use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use nexus_catalog::{CatalogStore, Category, Warehouse};
use nexus_core::{CategoryId, ItemId, WarehouseId};
use nexus_inventory::{ItemRegistry, ItemStatus, LandedCost, NewItem};
use nexus_workflow::{ApprovalWorkflow, TransactionLedger};
use rust_decimal::Decimal;

struct Setup {
    catalog: CatalogStore,
    registry: ItemRegistry,
    ledger: TransactionLedger,
    hub_b: WarehouseId,
    items: Vec<ItemId>,
}

fn setup(item_count: usize) -> Setup {
    let mut catalog = CatalogStore::new();
    let hub_a = catalog.add_warehouse(Warehouse::new("Hub A", "WHA").unwrap()).unwrap().id;
    let hub_b = catalog.add_warehouse(Warehouse::new("Hub B", "WHB").unwrap()).unwrap().id;
    let category: CategoryId = catalog
        .add_category(Category::root("Hardware", "HW").unwrap())
        .unwrap()
        .id;

    let mut registry = ItemRegistry::new();
    let items = (0..item_count)
        .map(|i| {
            registry
                .create_item(
                    &catalog,
                    NewItem {
                        name: format!("SKU {i}"),
                        warehouse_id: hub_a,
                        category_id: category,
                        status: ItemStatus::Raw,
                        quantity: 1_000_000,
                        cost: LandedCost::base_only(Decimal::from(1_000)).unwrap(),
                    },
                    Utc::now(),
                )
                .unwrap()
                .id_typed()
        })
        .collect();

    Setup {
        catalog,
        registry,
        ledger: TransactionLedger::new(),
        hub_b,
        items,
    }
}

fn bench_stock_out_approval(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_out_approval");

    for item_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("propose_and_approve", item_count),
            item_count,
            |b, &count| {
                let mut s = setup(count);
                let mut sink: Vec<(String, String)> = Vec::new();
                let mut i = 0usize;
                b.iter(|| {
                    let item = s.items[i % count];
                    i += 1;
                    let mut workflow =
                        ApprovalWorkflow::new(&s.catalog, &mut s.registry, &mut s.ledger, &mut sink);
                    let tx = workflow
                        .propose_stock_out(item, black_box(1), "bench", Utc::now())
                        .unwrap();
                    black_box(workflow.approve(tx.id_typed(), Utc::now()).unwrap());
                    s.registry.take_events();
                    s.ledger.take_events();
                    sink.clear();
                });
            },
        );
    }

    group.finish();
}

fn bench_transfer_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer_approval");
    group.throughput(Throughput::Elements(1));

    group.bench_function("merge_into_existing", |b| {
        let mut s = setup(100);
        let mut sink: Vec<(String, String)> = Vec::new();
        let hub_b = s.hub_b;
        let mut i = 0usize;
        b.iter(|| {
            let item = s.items[i % 100];
            i += 1;
            let mut workflow =
                ApprovalWorkflow::new(&s.catalog, &mut s.registry, &mut s.ledger, &mut sink);
            let tx = workflow
                .propose_transfer(item, hub_b, black_box(1), "bench", Utc::now())
                .unwrap();
            black_box(workflow.approve(tx.id_typed(), Utc::now()).unwrap());
            s.registry.take_events();
            s.ledger.take_events();
            sink.clear();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_stock_out_approval, bench_transfer_merge);
criterion_main!(benches);
