use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use billflow_documents::{aggregate, line_totals, LineDraft, LineTotals};

fn drafts(n: usize) -> Vec<LineDraft> {
    (0..n)
        .map(|i| LineDraft {
            quantity: (i as u32 % 9) + 1,
            unit_price: Decimal::new(1999 + i as i64, 2),
            tax_rate: Decimal::new(10, 2),
        })
        .collect()
}

fn bench_line_totals(c: &mut Criterion) {
    let draft = LineDraft {
        quantity: 3,
        unit_price: Decimal::new(12_345, 2),
        tax_rate: Decimal::new(10, 2),
    };

    c.bench_function("line_totals/single", |b| {
        b.iter(|| line_totals(black_box(&draft)).unwrap())
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for size in [1usize, 10, 100, 1000] {
        let lines: Vec<LineTotals> = drafts(size)
            .iter()
            .map(|d| line_totals(d).unwrap())
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| aggregate(black_box(lines)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_line_totals, bench_aggregate);
criterion_main!(benches);
