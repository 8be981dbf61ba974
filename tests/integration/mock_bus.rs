//! Simulated auxiliary controller for integration tests.
//!
//! Implements [`BusPort`] over an in-memory register file so the whole
//! controller stack runs on the host.  Valves take a configurable number
//! of status polls to settle, any register can be made to fail, and every
//! transaction lands in a log.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use poolctl::BusError;
use poolctl::app::events::AppEvent;
use poolctl::app::ports::{BusPort, DelayPort, EventSink};
use poolctl::app::service::Controller;
use poolctl::config::SystemConfig;

// ── Transaction log ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Write,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: Kind,
    pub register: u8,
    /// Wire bytes of a write, empty for a read.
    pub frame: Vec<u8>,
    pub ok: bool,
}

// ── Simulated equipment ───────────────────────────────────────

const MOVING: u8 = 210;
const CALIBRATING: u8 = 100;

#[derive(Debug, Clone, Copy)]
pub struct SimValve {
    pub position: u16,
    pub target: u16,
    pub state: u8,
    pub prev: u8,
    polls_left: u32,
    /// Tenths of a second: `(pos, neg)`.
    pub travel: (u16, u16),
    pub limits: (u16, u16),
    /// Never settles.
    pub stuck: bool,
}

impl Default for SimValve {
    fn default() -> Self {
        Self {
            position: 0,
            target: 0,
            state: 0,
            prev: 0,
            polls_left: 0,
            travel: (30, 30),
            limits: (0, 180),
            stuck: false,
        }
    }
}

impl SimValve {
    fn start(&mut self, state: u8, target: u16, polls: u32) {
        self.prev = self.state;
        self.state = state;
        self.target = target;
        self.polls_left = polls;
    }

    fn poll(&mut self) -> [u8; 4] {
        if self.state != 0 && !self.stuck {
            if self.polls_left == 0 {
                self.prev = self.state;
                self.state = 0;
                self.position = self.target;
            } else {
                self.polls_left -= 1;
            }
        }
        let [hi, lo] = self.position.to_be_bytes();
        [self.state, self.prev, hi, lo]
    }
}

#[derive(Debug, Default)]
pub struct AuxState {
    pub valves: [SimValve; 2],
    pub pumps: [u8; 2],
    pub heater_enabled: u8,
    pub heater_set_point: u16,
    pub light: u8,
    /// Tenths of a degree.
    pub temperature: u16,
    pub coefficients: Option<Vec<u8>>,
    pub resets: u32,
    /// Status polls a valve reports "moving" after a move.
    pub settle_polls: u32,
    pub failing: Vec<u8>,
    pub fail_all: bool,
    pub log: Vec<Transaction>,
}

impl AuxState {
    fn fails(&self, register: u8) -> bool {
        self.fail_all || self.failing.contains(&register)
    }

    fn apply_write(&mut self, bytes: &[u8]) {
        let register = bytes[0];
        let index = usize::from(register & 0x03);
        let arg = (register >> 2) & 0x03;
        let data = u16::from_be_bytes([
            bytes.get(1).copied().unwrap_or(0),
            bytes.get(2).copied().unwrap_or(0),
        ]);
        let settle = self.settle_polls;
        match register & 0xF0 {
            0x30 => {
                let v = &mut self.valves[index];
                let here = v.position;
                v.start(CALIBRATING, here, settle);
            }
            0x50 => self.valves[index].start(MOVING, data, settle),
            0x70 => self.pumps[index] = arg,
            0x90 => self.coefficients = Some(bytes[1..].to_vec()),
            0xB0 if register & 0x08 == 0 => self.heater_enabled = arg & 0x01,
            0xB0 => self.heater_set_point = data,
            0xD0 => self.light = arg & 0x01,
            0xF0 => {
                self.pumps = [0; 2];
                self.heater_enabled = 0;
                self.light = 0;
                for v in &mut self.valves {
                    v.state = 0;
                    v.polls_left = 0;
                }
                self.resets += 1;
            }
            _ => {}
        }
    }

    fn answer(&mut self, register: u8, buf: &mut [u8]) {
        let index = usize::from(register & 0x03);
        let reply: Vec<u8> = match register & 0xFC {
            0x00 => self.valves[index].poll().to_vec(),
            0x04 => {
                let (pos, neg) = self.valves[index].travel;
                [pos.to_be_bytes(), neg.to_be_bytes()].concat()
            }
            0x08 => self.valves[index].limits.0.to_be_bytes().to_vec(),
            0x0C => self.valves[index].limits.1.to_be_bytes().to_vec(),
            0x60 => vec![self.pumps[index]],
            0x80 => self.temperature.to_be_bytes().to_vec(),
            0xA0 => {
                let active = u8::from(self.heater_enabled != 0 && self.pumps[0] != 0);
                let [hi, lo] = self.heater_set_point.to_be_bytes();
                vec![self.heater_enabled, active, hi, lo]
            }
            0xC0 => vec![self.light],
            _ => Vec::new(),
        };
        for (dst, src) in buf.iter_mut().zip(reply.iter().chain(core::iter::repeat(&0))) {
            *dst = *src;
        }
    }

    fn record(&mut self, kind: Kind, register: u8, frame: &[u8], ok: bool) {
        self.log.push(Transaction {
            kind,
            register,
            frame: frame.to_vec(),
            ok,
        });
    }
}

// ── Port ──────────────────────────────────────────────────────

/// Cloneable handle: the controller owns one clone, the test keeps another
/// to inspect and steer the simulation.
#[derive(Clone, Default)]
pub struct MockAux {
    state: Rc<RefCell<AuxState>>,
}

#[allow(dead_code)]
impl MockAux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valves report "moving" for `polls` status reads after each move.
    pub fn with_settle_polls(self, polls: u32) -> Self {
        self.state.borrow_mut().settle_polls = polls;
        self
    }

    pub fn state(&self) -> std::cell::RefMut<'_, AuxState> {
        self.state.borrow_mut()
    }

    pub fn fail_register(&self, register: u8) {
        self.state.borrow_mut().failing.push(register);
    }

    pub fn heal(&self) {
        let mut s = self.state.borrow_mut();
        s.failing.clear();
        s.fail_all = false;
    }

    pub fn log(&self) -> Vec<Transaction> {
        self.state.borrow().log.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|t| t.kind == Kind::Write && t.ok)
            .map(|t| t.frame.clone())
            .collect()
    }

    /// Successful writes to registers in `family` (high nibble).
    pub fn writes_to(&self, family: u8) -> Vec<Vec<u8>> {
        self.writes()
            .into_iter()
            .filter(|f| f[0] & 0xF0 == family)
            .collect()
    }

    pub fn reads_of(&self, register: u8) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|t| t.kind == Kind::Read && t.register == register)
            .count()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }
}

impl BusPort for MockAux {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        let mut s = self.state.borrow_mut();
        let register = bytes[0];
        let ok = !s.fails(register);
        s.record(Kind::Write, register, bytes, ok);
        if !ok {
            return Err(BusError::Nack);
        }
        s.apply_write(bytes);
        Ok(())
    }

    fn write_read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let mut s = self.state.borrow_mut();
        let ok = !s.fails(register);
        s.record(Kind::Read, register, &[], ok);
        if !ok {
            return Err(BusError::Io);
        }
        s.answer(register, buf);
        Ok(())
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Returns after one scheduler yield and tallies the requested time, so
/// concurrent flows interleave without wall-clock waits.
#[derive(Clone, Default)]
pub struct SimDelay {
    calls: Rc<Cell<u32>>,
    total: Rc<Cell<Duration>>,
}

#[allow(dead_code)]
impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub fn total(&self) -> Duration {
        self.total.get()
    }
}

impl DelayPort for SimDelay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        self.calls.set(self.calls.get() + 1);
        self.total.set(self.total.get() + duration);
        futures_lite::future::yield_now()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type Rig = Controller<MockAux, SimDelay, RecordingSink>;

/// A controller wired to the simulator, plus handles onto its adapters.
#[allow(dead_code)]
pub struct Harness {
    pub aux: MockAux,
    pub delay: SimDelay,
    pub sink: RecordingSink,
    pub ctl: Rig,
}

pub fn harness(aux: MockAux) -> Harness {
    harness_with(aux, &SystemConfig::default())
}

#[allow(dead_code)]
pub fn harness_with(aux: MockAux, config: &SystemConfig) -> Harness {
    let delay = SimDelay::new();
    let sink = RecordingSink::new();
    let ctl = Controller::new(aux.clone(), delay.clone(), sink.clone(), config);
    Harness {
        aux,
        delay,
        sink,
        ctl,
    }
}
