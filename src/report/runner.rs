//! The display loop: sample, render, report, sleep, repeat.

use crate::error::Result;
use crate::logging::LogSink;
use crate::report::display::FieldDisplay;
use crate::report::fields::{FieldId, FieldTable, UNKNOWN};
use crate::sensors::{Board, Sampler};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};
use tracing::Level;

/// Default pause between cycles.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(91);

/// Shortest pause the loop will take between cycles.
pub const MIN_CYCLE_INTERVAL: Duration = Duration::from_millis(1);

/// Default interval between summary log lines.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(600);

/// Timing of the display loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopConfig {
    /// Pause between sampling cycles
    pub cycle_interval: Duration,
    /// Interval between consolidated summary lines
    pub report_interval: Duration,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            max_cycles: None,
        }
    }
}

impl LoopConfig {
    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }
}

/// What happened over the life of a loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub reports: u64,
}

/// Consolidated `key=value` line over every field except the wall clock.
pub fn summary_line(table: &FieldTable, texts: &[String]) -> String {
    table
        .fields()
        .iter()
        .zip(texts)
        .filter(|(field, _)| field.id != FieldId::Elapsed)
        .map(|(field, text)| format!("{}={}", field.key, text))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drive `sampler` until `shutdown` resolves or `max_cycles` is reached.
///
/// Failures inside a cycle are logged and the loop carries on; only flushing
/// the log at the end can fail the call.
pub async fn run<B, F>(
    sampler: &mut Sampler<B>,
    table: &FieldTable,
    displays: &mut [Box<dyn FieldDisplay>],
    log: &mut dyn LogSink,
    config: &LoopConfig,
    shutdown: F,
) -> Result<LoopSummary>
where
    B: Board,
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let mut next_report = started;
    let mut texts = vec![UNKNOWN.to_string(); table.len()];
    let mut summary = LoopSummary::default();

    let mut ticker = time::interval(config.cycle_interval.max(MIN_CYCLE_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        if config.max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log.record(Level::INFO, "shutdown requested");
                break;
            }
            _ = ticker.tick() => {}
        }

        summary.cycles += 1;
        if let Err(e) = sampler.sample(log) {
            summary.failed_cycles += 1;
            log.record(
                Level::ERROR,
                &format!("sampling cycle {} failed: {}", summary.cycles, e),
            );
        }

        let elapsed = started.elapsed();
        for (field, text) in table.fields().iter().zip(texts.iter_mut()) {
            match field.id.value(sampler.state(), elapsed).render() {
                Ok(rendered) => *text = rendered,
                Err(e) => {
                    log.record(Level::ERROR, &format!("field {}: {}", field.key, e));
                    continue;
                }
            }
            for display in displays.iter_mut() {
                if let Err(e) = display.set_field(&field.key, text) {
                    log.record(Level::ERROR, &format!("field {}: {}", field.key, e));
                }
            }
        }

        let now = Instant::now();
        if now >= next_report {
            next_report = now + config.report_interval;
            summary.reports += 1;
            log.record(Level::INFO, &summary_line(table, &texts));
        }

        for display in displays.iter_mut() {
            if let Err(e) = display.pump_events() {
                log.record(Level::ERROR, &format!("display update failed: {}", e));
            }
        }
    }

    log.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ScriptedBoard;
    use crate::error::SamplerError;
    use crate::logging::MemoryLog;
    use crate::sensors::{PinSpec, PinValue, SensorLayout};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Display double keeping every update.
    #[derive(Clone, Default)]
    struct RecordingDisplay {
        updates: Rc<RefCell<Vec<(String, String)>>>,
        pumps: Rc<RefCell<usize>>,
        reject: Option<&'static str>,
    }

    impl FieldDisplay for RecordingDisplay {
        fn set_field(&mut self, key: &str, text: &str) -> Result<()> {
            if self.reject == Some(key) {
                return Err(SamplerError::config_error("rejected"));
            }
            self.updates.borrow_mut().push((key.to_string(), text.to_string()));
            Ok(())
        }

        fn pump_events(&mut self) -> Result<()> {
            *self.pumps.borrow_mut() += 1;
            Ok(())
        }
    }

    fn board() -> ScriptedBoard {
        let board = ScriptedBoard::new();
        board.set_fallback(PinSpec::analog_input(0), Some(PinValue::Analog(0.5)));
        board.set_fallback(PinSpec::analog_input(1), Some(PinValue::Analog(0.6)));
        board.set_fallback(PinSpec::digital_input(9), Some(PinValue::Digital(false)));
        // light sensor never reports
        board
    }

    fn fast(cycles: u64) -> LoopConfig {
        LoopConfig::default()
            .with_cycle_interval(Duration::from_millis(1))
            .with_max_cycles(Some(cycles))
    }

    #[tokio::test]
    async fn test_runs_bounded_cycles_and_reports_once() {
        let board = board();
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board, SensorLayout::default(), &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());
        let recorder = RecordingDisplay::default();
        let mut displays: Vec<Box<dyn FieldDisplay>> = vec![Box::new(recorder.clone())];
        log.clear();

        let summary = run(
            &mut sampler,
            &table,
            &mut displays,
            &mut log,
            &fast(3),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(summary.reports, 1);
        assert_eq!(*recorder.pumps.borrow(), 3);
        assert_eq!(sampler.state().cycle, 4);

        let updates = recorder.updates.borrow();
        assert!(updates.contains(&("LDR".to_string(), UNKNOWN.to_string())));
        assert!(updates.contains(&("T0".to_string(), "25.000".to_string())));

        let report = log
            .records()
            .iter()
            .find(|(_, m)| m.starts_with("T0="))
            .map(|(_, m)| m.clone())
            .unwrap();
        assert!(report.contains("LDR=unknown"));
        assert!(report.contains("pir_counter=0"));
        assert!(!report.contains("time="));
    }

    #[tokio::test]
    async fn test_zero_report_interval_reports_every_cycle() {
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board(), SensorLayout::default(), &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());
        let config = fast(4).with_report_interval(Duration::ZERO);

        let summary = run(&mut sampler, &table, &mut [], &mut log, &config, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.reports, 4);
    }

    #[tokio::test]
    async fn test_zero_cycle_interval_is_clamped() {
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board(), SensorLayout::default(), &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());
        let config = LoopConfig::default()
            .with_cycle_interval(Duration::ZERO)
            .with_max_cycles(Some(2));

        let summary = run(&mut sampler, &table, &mut [], &mut log, &config, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.failed_cycles, 0);
    }

    #[tokio::test]
    async fn test_failed_cycles_do_not_stop_the_loop() {
        let led = PinSpec::digital_output(13);
        let board = board();
        let layout = SensorLayout::default().with_led(led);
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board.clone(), layout, &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());

        board.fail_writes(true);
        board.push(
            PinSpec::digital_input(9),
            [true, false, true].map(|level| Some(PinValue::Digital(level))),
        );

        let summary = run(&mut sampler, &table, &mut [], &mut log, &fast(5), std::future::pending())
            .await
            .unwrap();

        // rising, falling, rising, falling: every LED write fails
        assert_eq!(summary.cycles, 5);
        assert_eq!(summary.failed_cycles, 4);
        assert_eq!(sampler.state().motion_count, 2);
        assert_eq!(log.count(Level::ERROR), 4);
    }

    #[tokio::test]
    async fn test_display_errors_are_logged() {
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board(), SensorLayout::default(), &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());
        let recorder = RecordingDisplay {
            reject: Some("PIR"),
            ..Default::default()
        };
        let mut displays: Vec<Box<dyn FieldDisplay>> = vec![Box::new(recorder.clone())];
        log.clear();

        let summary = run(&mut sampler, &table, &mut displays, &mut log, &fast(2), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(log.count(Level::ERROR), 2);
        assert!(recorder.updates.borrow().iter().all(|(k, _)| k != "PIR"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_sampling() {
        let mut log = MemoryLog::new();
        let mut sampler = Sampler::initialize(board(), SensorLayout::default(), &mut log).unwrap();
        let table = FieldTable::for_layout(sampler.layout());

        let summary = run(
            &mut sampler,
            &table,
            &mut [],
            &mut log,
            &LoopConfig::default(),
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(summary.cycles, 0);
        assert!(log.contains("shutdown requested"));
    }

    #[test]
    fn test_summary_line_skips_wall_clock() {
        let table = FieldTable::for_layout(&SensorLayout::default());
        let texts: Vec<String> = table.fields().iter().map(|f| format!("<{}>", f.key)).collect();
        assert_eq!(
            summary_line(&table, &texts),
            "T0=<T0> T1=<T1> LDR=<LDR> PIR=<PIR> pir_counter=<pir_counter> timestamp=<timestamp>"
        );
    }
}
