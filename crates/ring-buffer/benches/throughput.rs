use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ring_buffer::{RingBuffer, DEFAULT_CAPACITY};

fn push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    group.throughput(Throughput::Bytes((DEFAULT_CAPACITY - 1) as u64));

    group.bench_function("push_then_pop", |b| {
        let mut ring = RingBuffer::<DEFAULT_CAPACITY>::new();
        b.iter(|| {
            for i in 0..DEFAULT_CAPACITY - 1 {
                let _ = ring.push(black_box(i as u8));
            }
            while let Some(byte) = ring.pop() {
                black_box(byte);
            }
        });
    });

    group.bench_function("push_then_read_into", |b| {
        let mut ring = RingBuffer::<DEFAULT_CAPACITY>::new();
        let mut chunk = [0u8; 64];
        b.iter(|| {
            for i in 0..DEFAULT_CAPACITY - 1 {
                let _ = ring.push(black_box(i as u8));
            }
            while ring.read_into(&mut chunk) > 0 {
                black_box(&chunk);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, push_pop);
criterion_main!(benches);
