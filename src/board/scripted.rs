//! Board double driven by per-pin scripts.
//!
//! Each pin pops values from its queue on every read and falls back to a
//! fixed value once the queue is empty. Reads, writes and reporting requests
//! are recorded so callers can inspect how the board was used. Clones share
//! the same script.

use crate::error::{Result, SamplerError};
use crate::sensors::{Board, Pin, PinSpec, PinValue};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Script {
    queues: HashMap<PinSpec, VecDeque<Option<PinValue>>>,
    fallbacks: HashMap<PinSpec, Option<PinValue>>,
    reads: HashMap<PinSpec, usize>,
    writes: Vec<(PinSpec, PinValue)>,
    reporting: HashSet<PinSpec>,
    fail_writes: bool,
}

/// Scripted board.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBoard {
    script: Rc<RefCell<Script>>,
}

/// Pin handle handed out by [`ScriptedBoard`].
#[derive(Debug, Clone)]
pub struct ScriptedPin {
    spec: PinSpec,
    script: Rc<RefCell<Script>>,
}

impl ScriptedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue values to be returned by successive reads of `spec`.
    pub fn push(&self, spec: PinSpec, values: impl IntoIterator<Item = Option<PinValue>>) {
        self.script
            .borrow_mut()
            .queues
            .entry(spec)
            .or_default()
            .extend(values);
    }

    /// Value returned once the queue for `spec` is empty.
    pub fn set_fallback(&self, spec: PinSpec, value: Option<PinValue>) {
        self.script.borrow_mut().fallbacks.insert(spec, value);
    }

    /// Make every write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.script.borrow_mut().fail_writes = fail;
    }

    /// Handle for `spec` without going through pin configuration.
    pub fn pin(&self, spec: PinSpec) -> ScriptedPin {
        ScriptedPin {
            spec,
            script: Rc::clone(&self.script),
        }
    }

    /// Number of reads performed on `spec` so far.
    pub fn reads(&self, spec: PinSpec) -> usize {
        self.script.borrow().reads.get(&spec).copied().unwrap_or(0)
    }

    pub fn reset_reads(&self) {
        self.script.borrow_mut().reads.clear();
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(PinSpec, PinValue)> {
        self.script.borrow().writes.clone()
    }

    pub fn is_reporting(&self, spec: PinSpec) -> bool {
        self.script.borrow().reporting.contains(&spec)
    }
}

impl Board for ScriptedBoard {
    type Pin = ScriptedPin;

    fn port_name(&self) -> &str {
        "scripted"
    }

    fn get_pin(&mut self, spec: PinSpec) -> Result<ScriptedPin> {
        Ok(self.pin(spec))
    }
}

impl Pin for ScriptedPin {
    fn spec(&self) -> PinSpec {
        self.spec
    }

    fn enable_reporting(&mut self) -> Result<()> {
        self.script.borrow_mut().reporting.insert(self.spec);
        Ok(())
    }

    fn read(&mut self) -> Option<PinValue> {
        let mut script = self.script.borrow_mut();
        *script.reads.entry(self.spec).or_insert(0) += 1;
        let queued = script.queues.get_mut(&self.spec).and_then(|q| q.pop_front());
        match queued {
            Some(value) => value,
            None => script.fallbacks.get(&self.spec).copied().flatten(),
        }
    }

    fn write(&mut self, value: PinValue) -> Result<()> {
        let mut script = self.script.borrow_mut();
        if script.fail_writes {
            return Err(SamplerError::pin_error(format!(
                "write to {} rejected",
                self.spec
            )));
        }
        script.writes.push((self.spec, value));
        Ok(())
    }
}
