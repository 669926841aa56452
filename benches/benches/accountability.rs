use benches::setup_group;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use groupsig::{Message, SchemeCode};
use test_utils::{messages, sign_all};

fn open_benchmark(c: &mut Criterion) {
    let msg = Message::from("benchmark message");
    // Opening scans the membership list
    let mut open_group = c.benchmark_group("PS16 opening");
    for member_count in [1, 10, 50] {
        setup_group!(SchemeCode::PS16, member_count, ctx, rng, group, members);
        let sig = ctx
            .sign(&mut rng, &msg, &members[member_count - 1], &group.grpkey, 0)
            .unwrap();
        open_group.bench_with_input(
            BenchmarkId::from_parameter(member_count),
            &member_count,
            |b, _| {
                b.iter(|| {
                    ctx.open(
                        &mut rng,
                        black_box(&sig),
                        &group.grpkey,
                        &group.mgrkey,
                        &group.gml,
                    )
                    .unwrap()
                })
            },
        );
    }
    open_group.finish();
}

fn seqlink_benchmark(c: &mut Criterion) {
    let msg = Message::from("benchmark message");
    setup_group!(SchemeCode::DL21SEQ, 1, ctx, rng, group, members);
    let mut link_group = c.benchmark_group("DL21SEQ sequential linking");
    for size in [2, 8, 32] {
        let msgs = messages(size);
        let sigs = sign_all(&ctx, &mut rng, &members[0], &group.grpkey, &msgs).unwrap();
        let proof = ctx
            .seqlink(&mut rng, &group.grpkey, &members[0], &msg, &sigs, &msgs)
            .unwrap()
            .unwrap();
        link_group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                assert!(ctx
                    .verify_seqlink(&group.grpkey, black_box(&proof), &msg, &sigs, &msgs)
                    .unwrap())
            })
        });
    }
    link_group.finish();
}

fn convert_benchmark(c: &mut Criterion) {
    setup_group!(SchemeCode::GL19, 4, ctx, rng, group, members);
    let converter = group.converter.as_ref().unwrap();
    let bldkey = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();
    let mut convert_group = c.benchmark_group("GL19 conversion");
    for size in [4, 16, 64] {
        let msgs = messages(size);
        let bsigs = msgs
            .iter()
            .enumerate()
            .map(|(i, msg)| {
                let sig = ctx
                    .sign(&mut rng, msg, &members[i % members.len()], &group.grpkey, 0)
                    .unwrap();
                ctx.blind(&mut rng, &group.grpkey, &sig, msg, &bldkey)
                    .unwrap()
            })
            .collect::<Vec<_>>();
        convert_group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                ctx.convert(
                    &mut rng,
                    black_box(&bsigs),
                    &group.grpkey,
                    converter,
                    &bldkey,
                    None,
                )
                .unwrap()
            })
        });
    }
    convert_group.finish();
}

criterion_group!(benches, open_benchmark, seqlink_benchmark, convert_benchmark);
criterion_main!(benches);
