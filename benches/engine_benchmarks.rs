//! Performance benchmarks for the Order Reconstruction Engine.
//!
//! This benchmark suite tracks the hot paths: assembling one order from
//! rows, prorating a discounted item, taxing an order, and aggregating a
//! full day of orders into a report.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use order_engine::assembly::assemble_set;
use order_engine::business_day::default_day_boundary;
use order_engine::models::Order;
use order_engine::proration::prorate;
use order_engine::reporting::{aggregate, GroupBy};
use order_engine::rows::{DiscountRow, ItemRow, ModifierRow, OrderRow, OrderRowSet, PaymentRow};
use order_engine::tax::order_tax;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Builds one unsplit order with `item_count` discounted, modified
/// items and a single card payment.
fn build_row_set(order_id: i64, item_count: usize) -> OrderRowSet {
    let paid_at = NaiveDate::from_ymd_opt(2020, 6, 1)
        .unwrap()
        .and_hms_opt(19, 30, 0)
        .unwrap();
    let order = OrderRow {
        order_id,
        uuid: Uuid::new_v4(),
        order_number: 40000 + order_id,
        bill_number: Some(order_id),
        table_name: Some("Main 5".to_string()),
        party_name: None,
        party_size: Some(4),
        takeout_type: None,
        custom_takeout_type: None,
        waiter_name: Some("Dana".to_string()),
        tax_rate_1: dec("0.05"),
        tax_rate_2: dec("0.07"),
        tax_rate_3: Decimal::ZERO,
        stack_tax2_on_tax1: false,
        gratuity: Decimal::ZERO,
        gratuity_before_tax: false,
        paid_at,
        seated_at: None,
        outstanding_balance: Decimal::ZERO,
        payment_group_id: order_id,
    };

    let mut items = Vec::with_capacity(item_count);
    let mut modifiers = Vec::new();
    let mut discounts = Vec::new();
    for i in 0..item_count {
        let item_id = order_id * 1000 + i as i64;
        items.push(ItemRow {
            item_id,
            order_id,
            split_id: None,
            item_index: i as u32,
            name: format!("Item {i}"),
            sales_category: if i % 2 == 0 { "Food" } else { "Drinks" }.to_string(),
            unit_price: dec("14.50"),
            quantity: Decimal::ONE,
            open_price: None,
            course: None,
            was_sent: true,
            sent_at: None,
            waiter_name: None,
            is_return: false,
            exempt_tax1: false,
            exempt_tax2: false,
            exempt_tax3: false,
        });
        modifiers.push(ModifierRow {
            modifier_id: item_id * 10,
            item_id,
            modifier_index: 0,
            name: "Side Salad".to_string(),
            amount: dec("2.00"),
            sales_category: Some("Sides".to_string()),
        });
        discounts.push(DiscountRow {
            discount_id: item_id * 100,
            item_id: Some(item_id),
            modifier_id: None,
            discount_index: 0,
            amount: dec("1.25"),
            label: "Happy Hour".to_string(),
            kind_code: 1,
            taxable: false,
            returns_inventory: false,
            waiter_name: None,
            authorizer_name: None,
            applied_at: None,
        });
    }

    let total = dec("16.19") * Decimal::from(item_count as i64);
    let payments = vec![PaymentRow {
        uuid: Uuid::new_v4(),
        payment_group_id: order_id,
        sequence: 0,
        type_code: 1,
        amount: total,
        tip: Decimal::ZERO,
        change: Decimal::ZERO,
        refundable_amount: total,
        card_type: Some("VISA".to_string()),
        auth_number: None,
        customer_account_id: None,
        original_payment_uuid: None,
        paid_at: Some(paid_at),
    }];

    OrderRowSet {
        order,
        splits: vec![],
        items,
        modifiers,
        discounts,
        payments,
        loyalty: None,
    }
}

fn build_orders(count: usize) -> Vec<Order> {
    (0..count)
        .map(|i| assemble_set(&build_row_set(i as i64 + 1, 6)).unwrap())
        .collect()
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    for item_count in [1usize, 10, 50] {
        let set = build_row_set(1, item_count);
        group.throughput(Throughput::Elements(item_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(item_count),
            &set,
            |b, set| b.iter(|| assemble_set(black_box(set)).unwrap()),
        );
    }
    group.finish();
}

fn bench_proration(c: &mut Criterion) {
    let order = assemble_set(&build_row_set(1, 1)).unwrap();
    let item = &order.splits[0].line_items[0];
    c.bench_function("prorate_discounted_item", |b| {
        b.iter(|| prorate(black_box(item)))
    });
}

fn bench_tax(c: &mut Criterion) {
    let order = assemble_set(&build_row_set(1, 20)).unwrap();
    c.bench_function("order_tax_20_items", |b| {
        b.iter(|| order_tax(black_box(&order)))
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for order_count in [10usize, 100, 1000] {
        let orders = build_orders(order_count);
        group.throughput(Throughput::Elements(order_count as u64));
        group.bench_with_input(
            BenchmarkId::new("business_day", order_count),
            &orders,
            |b, orders| {
                b.iter(|| {
                    aggregate(
                        black_box(orders),
                        &GroupBy::BusinessDay(default_day_boundary()),
                    )
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("sales_category", order_count),
            &orders,
            |b, orders| b.iter(|| aggregate(black_box(orders), &GroupBy::SalesCategory)),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_assembly,
    bench_proration,
    bench_tax,
    bench_aggregation
);
criterion_main!(benches);
