use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use darkpool_core::{Book, Order, Side};
use rust_decimal::Decimal;
use std::time::Duration;
use uuid::Uuid;

fn place(book: &mut Book, user: &str, side: Side, price: Decimal, quantity: Decimal, seq: i64) -> Uuid {
    let order = Order::new(Uuid::new_v4(), user.to_string(), side, price, quantity, seq);
    let id = order.id;
    book.add(order).unwrap();
    id
}

// Mixed resting-order placement across many distinct users, interleaved with
// occasional cancels — closer to dark-pool order flow than a crossing-heavy
// lit-book benchmark since most resident liquidity never crosses.
fn simulate_pool_orders(book: &mut Book, order_count: usize) {
    let base_price = Decimal::from(50_000);
    let mut order_ids = Vec::new();

    for i in 0..order_count {
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let price_offset = (i % 10) as i64 - 5;
        let price = base_price + Decimal::from(price_offset);
        let quantity = Decimal::from(((i % 5) + 1) as i64);
        let user = format!("user{}", i % 50);

        let id = place(book, &user, side, price, quantity, i as i64);
        order_ids.push(id);

        if i % 10 == 0 && !order_ids.is_empty() {
            let cancel_idx = i % order_ids.len();
            book.remove(order_ids[cancel_idx]);
        }
    }
}

fn bench_mixed_order_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_simulation");

    for order_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*order_count as u64));

        group.bench_with_input(format!("{}_orders", order_count), order_count, |b, &count| {
            b.iter(|| {
                let mut book = Book::new();
                simulate_pool_orders(black_box(&mut book), black_box(count));
            });
        });
    }

    group.finish();
}

fn bench_limit_order_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("resident_orders");

    group.bench_function("place_limit_order", |b| {
        let mut book = Book::new();
        let price = Decimal::from(50_000);
        let quantity = Decimal::from(1);

        b.iter(|| {
            let order = Order::new(Uuid::new_v4(), "bench_user".into(), black_box(Side::Buy), black_box(price), black_box(quantity), 0);
            book.add(order).unwrap();
        });
    });

    group.finish();
}

fn bench_crossing_order_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossing_orders");

    group.bench_function("match_incoming_order", |b| {
        let quantity = Decimal::from(5);

        b.iter_batched(
            || {
                let mut book = Book::new();
                for i in 0..10 {
                    place(&mut book, &format!("maker{i}"), Side::Sell, Decimal::from(50_000 + i), Decimal::from(10), i as i64);
                }
                book
            },
            |mut book| {
                let mut incoming = Order::new(Uuid::new_v4(), "taker".into(), black_box(Side::Buy), Decimal::from(50_010), black_box(quantity), 0);
                book.match_incoming(&mut incoming, Uuid::new_v4, 0);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_deep_book_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_book");

    group.bench_function("match_across_levels", |b| {
        b.iter_batched(
            || {
                let mut book = Book::new();
                for i in 0..100 {
                    place(&mut book, &format!("maker{i}"), Side::Sell, Decimal::from(50_000 + i), Decimal::from(100), i as i64);
                }
                book
            },
            |mut book| {
                let mut incoming = Order::new(Uuid::new_v4(), "taker".into(), Side::Buy, Decimal::from(50_200), black_box(Decimal::from(5_000)), 0);
                book.match_incoming(&mut incoming, Uuid::new_v4, 0);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_high_frequency_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("high_frequency");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("hft_simulation", |b| {
        b.iter(|| {
            let mut book = Book::new();
            let base_price = Decimal::from(50_000);

            for i in 0..1000 {
                let price_offset = ((i % 10) as i64 - 5) / 10;
                let price = base_price + Decimal::from(price_offset);
                let quantity = Decimal::from(1);

                let id = place(&mut book, "hft_user", Side::Buy, price, quantity, i as i64);

                if i % 3 == 0 {
                    book.remove(id);
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mixed_order_throughput,
    bench_limit_order_placement,
    bench_crossing_order_execution,
    bench_deep_book_matching,
    bench_high_frequency_placement
);

criterion_main!(benches);
