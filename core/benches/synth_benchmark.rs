use chiptune_core::channel;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use criterion_cycles_per_byte::CyclesPerByte;

fn make_synth() -> chiptune_core::Synth {
    let mut synth = chiptune_core::Synth::default();
    synth.set_duty(0, 0x80);
    synth.set_step(0, 0x0400);
    synth.set_volume(0, 0x30);
    synth.set_step(1, 0x0600);
    synth.set_volume(1, 0x20);
    synth.set_step(2, 0x0200);
    synth.set_volume(2, 0x10);
    synth.set_noise_mode(false);
    synth.set_step(3, 0x4000);
    synth.set_volume(3, 0x10);
    synth
}

fn fill_frame_benchmark(c: &mut Criterion<CyclesPerByte>) {
    let (mut producer, _pump) = channel();
    let mut synth = make_synth();

    c.bench_function("fill one frame, all four voices active", |b| {
        b.iter(|| {
            producer.fill_inactive(|buf| synth.fill_frame(black_box(buf)));
        })
    });
}

fn single_tick_benchmark(c: &mut Criterion<CyclesPerByte>) {
    let mut synth = make_synth();
    c.bench_function("tick one sample", |b| b.iter(|| black_box(synth.tick())));
}

criterion_group!(
    name = benches;
    config = Criterion::default().with_measurement(CyclesPerByte);
    targets = fill_frame_benchmark, single_tick_benchmark
);
criterion_main!(benches);
