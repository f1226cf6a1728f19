//! The sampler: polls the board, derives physical quantities and tracks
//! motion edges.

use crate::error::Result;
use crate::logging::LogSink;
use crate::sensors::{
    convert,
    data::{Reading, SamplerState},
    layout::SensorLayout,
    pin::{PinValue, PinSpec},
    traits::{Board, Pin},
};
use chrono::Utc;
use std::time::Instant;
use tracing::Level;

/// Poll attempts per pin per cycle before a reading is treated as unknown.
pub const READ_RETRIES: usize = 5;

/// Transition of the motion signal between two known levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEdge {
    Rising,
    Falling,
    Steady,
}

impl MotionEdge {
    /// Classify the change from the last known level to the current reading.
    ///
    /// An unknown current reading never forms an edge. With no previous level
    /// a high reading counts as rising.
    pub fn detect(previous: Reading<bool>, current: Reading<bool>) -> Self {
        match (previous, current) {
            (Some(true), Some(false)) => MotionEdge::Falling,
            (Some(true), Some(true)) | (_, None) => MotionEdge::Steady,
            (_, Some(true)) => MotionEdge::Rising,
            (_, Some(false)) => MotionEdge::Steady,
        }
    }
}

/// Poll `pin` up to `retries` times and return the first value it reports.
///
/// Exhausting the budget is expected while the board has not reported yet;
/// it yields `None` and a single warning record.
pub fn read_raw<P: Pin>(
    pin: &mut P,
    retries: usize,
    port: &str,
    log: &mut dyn LogSink,
) -> Reading<PinValue> {
    for _ in 0..retries {
        if let Some(value) = pin.read() {
            return Some(value);
        }
    }
    log.record(
        Level::WARN,
        &format!(
            "port {}: no signal from {} after {} retries",
            port,
            pin.spec(),
            retries
        ),
    );
    None
}

/// Temperature of the thermistor on `pin`, in Celsius.
pub fn read_temperature<P: Pin>(pin: &mut P, port: &str, log: &mut dyn LogSink) -> Reading<f64> {
    let fraction = read_raw(pin, READ_RETRIES, port, log)?.as_fraction();
    let celsius = convert::steinhart_hart_celsius(fraction);
    if celsius.is_none() {
        log.record(
            Level::WARN,
            &format!(
                "port {}: reading {} from {} is outside the thermistor range",
                port,
                fraction,
                pin.spec()
            ),
        );
    }
    celsius
}

/// Owns the pin handles and the latest [`SamplerState`].
pub struct Sampler<B: Board> {
    board: B,
    layout: SensorLayout,
    thermistors: Vec<B::Pin>,
    light: Vec<B::Pin>,
    motion: B::Pin,
    flanks: Option<(B::Pin, B::Pin)>,
    led: Option<B::Pin>,
    last_motion: Reading<bool>,
    last_sample_end: Instant,
    state: SamplerState,
}

impl<B: Board> Sampler<B> {
    /// Configure every pin in `layout`, discard the first read of each input
    /// and prime the state with one sampling cycle.
    pub fn initialize(mut board: B, layout: SensorLayout, log: &mut dyn LogSink) -> Result<Self> {
        layout.validate()?;

        let thermistors = get_pins(&mut board, &layout.thermistors)?;
        let light = get_pins(&mut board, &layout.light_sensors)?;
        let motion = board.get_pin(layout.motion)?;
        let flanks = match (layout.ldr_left, layout.ldr_right) {
            (Some(left), Some(right)) => Some((board.get_pin(left)?, board.get_pin(right)?)),
            _ => None,
        };
        let led = layout.led.map(|spec| board.get_pin(spec)).transpose()?;

        let mut sampler = Self {
            state: SamplerState::new(thermistors.len(), light.len()),
            board,
            layout,
            thermistors,
            light,
            motion,
            flanks,
            led,
            last_motion: None,
            last_sample_end: Instant::now(),
        };

        for pin in sampler.input_pins_mut() {
            pin.enable_reporting()?;
            // The first read after enabling reporting is usually empty.
            if pin.read().is_none() {
                log.record(
                    Level::DEBUG,
                    &format!("first read from {} was empty", pin.spec()),
                );
            }
        }

        sampler.sample(log)?;
        Ok(sampler)
    }

    /// Run one sampling cycle and return the refreshed state.
    ///
    /// Unknown readings are part of the state, not errors. The only failure
    /// is driving the indicator LED.
    pub fn sample(&mut self, log: &mut dyn LogSink) -> Result<&SamplerState> {
        let started = Instant::now();
        let since_last_sample = started.duration_since(self.last_sample_end).as_secs_f64();
        let port = self.board.port_name();

        let temperatures: Vec<Reading<f64>> = self
            .thermistors
            .iter_mut()
            .map(|pin| read_temperature(pin, port, log))
            .collect();

        let light: Vec<Reading<f64>> = self
            .light
            .iter_mut()
            .map(|pin| read_raw(pin, READ_RETRIES, port, log).map(|v| v.as_fraction()))
            .collect();

        let position_x = match &mut self.flanks {
            Some((left, right)) => {
                let left = read_raw(left, READ_RETRIES, port, log).map(|v| v.as_fraction());
                let right = read_raw(right, READ_RETRIES, port, log).map(|v| v.as_fraction());
                match (left, right) {
                    (Some(left), Some(right)) => convert::position_x(left, right),
                    _ => None,
                }
            }
            None => None,
        };

        let motion = read_raw(&mut self.motion, READ_RETRIES, port, log).map(|v| v.as_bool());
        let mut led_result = Ok(());
        match MotionEdge::detect(self.last_motion, motion) {
            MotionEdge::Rising => {
                self.state.motion_count += 1;
                log.record(Level::INFO, "PIR motion detected");
                if let Some(led) = &mut self.led {
                    led_result = led.write(PinValue::Digital(true));
                }
            }
            MotionEdge::Falling => {
                if let Some(led) = &mut self.led {
                    led_result = led.write(PinValue::Digital(false));
                }
            }
            MotionEdge::Steady => {}
        }
        if motion.is_some() {
            self.last_motion = motion;
        }

        self.state.temperatures = temperatures;
        self.state.light = light;
        self.state.motion = motion;
        self.state.position_x = position_x;
        self.state.since_last_sample = since_last_sample;
        self.state.cycle += 1;
        self.state.sampled_at = Utc::now();
        self.last_sample_end = Instant::now();

        led_result?;
        Ok(&self.state)
    }

    /// Latest readings.
    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    pub fn layout(&self) -> &SensorLayout {
        &self.layout
    }

    pub fn port_name(&self) -> &str {
        self.board.port_name()
    }

    fn input_pins_mut(&mut self) -> impl Iterator<Item = &mut B::Pin> {
        let flanks = self
            .flanks
            .iter_mut()
            .flat_map(|(left, right)| [left, right]);
        self.thermistors
            .iter_mut()
            .chain(self.light.iter_mut())
            .chain(std::iter::once(&mut self.motion))
            .chain(flanks)
    }
}

fn get_pins<B: Board>(board: &mut B, specs: &[PinSpec]) -> Result<Vec<B::Pin>> {
    specs.iter().map(|spec| board.get_pin(*spec)).collect()
}
