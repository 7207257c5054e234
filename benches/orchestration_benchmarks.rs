use criterion::{black_box, criterion_group, criterion_main, Criterion};
use provision_core::lifecycle::SetDiff;
use provision_core::types::ExecutionStatus;
use provision_core::workflow::{after_execute, after_verify};

fn benchmark_transition_routing(c: &mut Criterion) {
    let statuses = [
        Some(ExecutionStatus::InProgress),
        Some(ExecutionStatus::Success),
        Some(ExecutionStatus::Failure),
        Some(ExecutionStatus::AlreadyExists),
        None,
    ];

    c.bench_function("transition_routing", |b| {
        b.iter(|| {
            for status in statuses {
                black_box(after_execute(black_box(status)));
                black_box(after_verify(black_box(status)));
            }
        })
    });
}

fn benchmark_set_diff(c: &mut Criterion) {
    let old: Vec<String> = (0..100).map(|index| format!("principal-{index}")).collect();
    let new: Vec<String> = (50..150).map(|index| format!("principal-{index}")).collect();

    c.bench_function("set_diff_100_members", |b| {
        b.iter(|| SetDiff::compute(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, benchmark_transition_routing, benchmark_set_diff);
criterion_main!(benches);
