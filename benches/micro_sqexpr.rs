#![forbid(unsafe_code)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sqexpr::query::builder::*;
use sqexpr::query::metadata::{ConceptualEntity, ConceptualProperty};
use sqexpr::query::{FederatedSchema, ScopeIdentityExtractor, SqExpr, ValueType};

fn schema(columns: usize) -> FederatedSchema {
    let entity = (0..columns).fold(ConceptualEntity::new(), |entity, idx| {
        entity.with_property(format!("K{idx}"), ConceptualProperty::column(ValueType::Integer))
    });
    FederatedSchema::new().with_entity("s", "Sales", entity)
}

fn identity(keys: usize) -> SqExpr {
    let sales = entity("s", "Sales", None);
    (0..keys)
        .map(|idx| equal(column_ref(sales.clone(), format!("K{idx}")), integer(idx as i64)))
        .reduce(and)
        .unwrap_or_else(now)
}

fn micro_sqexpr(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro/sqexpr");
    for keys in [4usize, 32, 256] {
        let schema = schema(keys);
        let left = identity(keys);
        let right = identity(keys);
        group.throughput(Throughput::Elements(keys as u64));
        group.bench_with_input(BenchmarkId::new("equals", keys), &keys, |b, _| {
            b.iter(|| SqExpr::equals(&left, &right, false));
        });
        group.bench_with_input(BenchmarkId::new("validate", keys), &keys, |b, _| {
            b.iter(|| left.validate(&schema));
        });
        group.bench_with_input(BenchmarkId::new("scope_identity", keys), &keys, |b, _| {
            b.iter(|| ScopeIdentityExtractor::in_expr(&left));
        });
    }
    group.finish();
}

criterion_group!(benches, micro_sqexpr);
criterion_main!(benches);
