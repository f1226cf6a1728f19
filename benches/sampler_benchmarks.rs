use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use latte_sense::{
    report::FieldTable,
    sensors::{convert, read_raw},
    MemoryLog, PinSpec, Sampler, ScriptedBoard, SensorLayout, SimulatedBoard,
};
use std::time::Duration;

/// Benchmark the thermistor conversion across the ADC range
fn bench_steinhart_hart(c: &mut Criterion) {
    let fractions: Vec<f64> = (1..1023).map(|raw| raw as f64 / 1023.0).collect();

    c.bench_function("steinhart_hart_full_range", |b| {
        b.iter(|| {
            fractions
                .iter()
                .filter_map(|f| convert::steinhart_hart_celsius(black_box(*f)))
                .sum::<f64>()
        })
    });
}

/// Benchmark the bounded retry against a pin that never reports
fn bench_silent_pin_retry(c: &mut Criterion) {
    let board = ScriptedBoard::new();
    let mut pin = board.pin(PinSpec::analog_input(2));
    let mut log = MemoryLog::new();

    for retries in [1usize, 5, 20].iter() {
        c.bench_with_input(
            BenchmarkId::new("silent_pin_retry", retries),
            retries,
            |b, &retries| {
                b.iter(|| {
                    log.clear();
                    read_raw(&mut pin, retries, "scripted", &mut log)
                })
            },
        );
    }
}

/// Benchmark one sampling cycle on the simulated board
fn bench_sample_cycle(c: &mut Criterion) {
    let mut log = MemoryLog::new();
    let layout = SensorLayout::default()
        .with_flanks(PinSpec::analog_input(3), PinSpec::analog_input(4))
        .with_led(PinSpec::digital_output(13));
    let mut sampler =
        Sampler::initialize(SimulatedBoard::new(), layout, &mut log).expect("Should initialize sampler");

    c.bench_function("sample_cycle", |b| {
        b.iter(|| {
            log.clear();
            sampler.sample(&mut log).expect("Should sample").motion_count
        })
    });
}

/// Benchmark rendering the default field table
fn bench_field_render(c: &mut Criterion) {
    let mut log = MemoryLog::new();
    let sampler = Sampler::initialize(SimulatedBoard::new(), SensorLayout::default(), &mut log)
        .expect("Should initialize sampler");
    let table = FieldTable::for_layout(sampler.layout());

    c.bench_function("field_render", |b| {
        b.iter(|| {
            table
                .fields()
                .iter()
                .map(|field| {
                    field
                        .id
                        .value(sampler.state(), Duration::from_secs(93_784))
                        .render()
                        .expect("Should render")
                })
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(
    benches,
    bench_steinhart_hart,
    bench_silent_pin_retry,
    bench_sample_cycle,
    bench_field_render
);
criterion_main!(benches);
