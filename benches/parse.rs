use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use millstream::{parse, to_vec, Arena, SerializeOptions, Serializer, StreamParser};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Builds a document of roughly `entries` object entries with mixed
/// value kinds.
fn synth_document(entries: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x6d696c6c);
    let mut out = Vec::new();
    out.push(b'{');
    for i in 0..entries {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(format!("\"key_{i}\":").as_bytes());
        match i % 4 {
            0 => out.extend_from_slice(format!("{}", rng.random::<i32>()).as_bytes()),
            1 => out.extend_from_slice(format!("{:.6}", rng.random::<f64>()).as_bytes()),
            2 => out.extend_from_slice(b"\"some string value with no escapes\""),
            _ => out.extend_from_slice(b"[1,2,3,true,null]"),
        }
    }
    out.push(b'}');
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for entries in [10usize, 100, 1000] {
        let doc = synth_document(entries);
        group.bench_with_input(BenchmarkId::new("one_shot", entries), &doc, |b, doc| {
            b.iter(|| {
                let arena = Arena::new();
                black_box(parse(doc, &arena).unwrap());
            });
        });
        group.bench_with_input(BenchmarkId::new("reused_arena", entries), &doc, |b, doc| {
            let mut arena = Arena::with_capacity(doc.len() * 2);
            b.iter(|| {
                {
                    let v = parse(doc, &arena).unwrap();
                    black_box(&v);
                }
                arena.reset();
            });
        });
        group.bench_with_input(
            BenchmarkId::new("chunked_4k", entries),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let arena = Arena::new();
                    let mut p = StreamParser::new(&arena);
                    for chunk in doc.chunks(4096) {
                        p.write(chunk).unwrap();
                    }
                    black_box(p.finish().unwrap());
                });
            },
        );
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for entries in [10usize, 100, 1000] {
        let doc = synth_document(entries);
        let arena = Arena::new();
        let value = parse(&doc, &arena).unwrap();
        group.bench_with_input(BenchmarkId::new("to_vec", entries), &value, |b, v| {
            b.iter(|| black_box(to_vec(v)));
        });
        group.bench_with_input(BenchmarkId::new("bounded_4k", entries), &value, |b, v| {
            let mut buf = vec![0u8; 4096];
            b.iter(|| {
                let mut ser = Serializer::with_options(v, SerializeOptions::default());
                let mut total = 0usize;
                while !ser.is_done() {
                    total += ser.read(&mut buf);
                }
                black_box(total)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_serialize);
criterion_main!(benches);
