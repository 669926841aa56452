use benches::{setup_group, SCHEMES};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use groupsig::Message;
use test_utils::{messages, sign_all};

fn join_benchmark(c: &mut Criterion) {
    let mut join_group = c.benchmark_group("Join");
    for code in SCHEMES {
        setup_group!(code, 0, ctx, rng, group, _members);
        join_group.bench_function(BenchmarkId::from_parameter(code), |b| {
            b.iter(|| test_utils::add_member(&ctx, &mut rng, &mut group).unwrap())
        });
    }
    join_group.finish();
}

fn sign_verify_benchmark(c: &mut Criterion) {
    let msg = Message::from("benchmark message");

    let mut sign_group = c.benchmark_group("Signing");
    for code in SCHEMES {
        setup_group!(code, 1, ctx, rng, group, members);
        sign_group.bench_function(BenchmarkId::from_parameter(code), |b| {
            b.iter(|| {
                ctx.sign(
                    &mut rng,
                    black_box(&msg),
                    black_box(&members[0]),
                    black_box(&group.grpkey),
                    0,
                )
                .unwrap()
            })
        });
    }
    sign_group.finish();

    let mut verify_group = c.benchmark_group("Verifying");
    for code in SCHEMES {
        setup_group!(code, 1, ctx, rng, group, members);
        let sig = ctx
            .sign(&mut rng, &msg, &members[0], &group.grpkey, 0)
            .unwrap();
        verify_group.bench_function(BenchmarkId::from_parameter(code), |b| {
            b.iter(|| {
                assert!(ctx
                    .verify(black_box(&sig), black_box(&msg), black_box(&group.grpkey))
                    .unwrap())
            })
        });
    }
    verify_group.finish();
}

fn verify_batch_benchmark(c: &mut Criterion) {
    // Hardcoding batch sizes. This should ideally be taken/updated from command line input
    let batch_sizes = [2, 8, 32];
    for code in SCHEMES {
        setup_group!(code, 1, ctx, rng, group, members);
        let mut batch_group = c.benchmark_group(format!("{} batch verifying", code));
        for size in batch_sizes {
            let msgs = messages(size);
            let sigs = sign_all(&ctx, &mut rng, &members[0], &group.grpkey, &msgs).unwrap();
            batch_group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
                b.iter(|| {
                    assert!(ctx
                        .verify_batch(black_box(&sigs), black_box(&msgs), &group.grpkey)
                        .unwrap())
                })
            });
        }
        batch_group.finish();
    }
}

criterion_group!(
    benches,
    join_benchmark,
    sign_verify_benchmark,
    verify_batch_benchmark
);
criterion_main!(benches);
