//! Serialized access to the auxiliary controller bus.
//!
//! The bus is half-duplex and the auxiliary controller keeps a single
//! "selected register" between the write and read halves of a query, so
//! two interleaved commands would read each other's replies.  Every
//! command therefore runs under one async mutex:
//!
//! ```text
//!   caller A ─┐                      ┌───────────┐
//!   caller B ─┼──▶ Mutex<BusPort> ──▶│ aux ctrl  │
//!   caller C ─┘   (one in flight)    └───────────┘
//! ```
//!
//! [`SharedBus::execute`] queues behind the outstanding command;
//! [`SharedBus::try_execute`] refuses with [`Error::BusContention`]
//! instead of waiting.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use heapless::Vec;
use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::BusPort;
use crate::error::{BusError, Error};
use crate::protocol::Command;
use crate::protocol::reply::{MAX_REPLY, Reply};

/// Raw bytes returned by a register read.
pub type ReplyBytes = Vec<u8, MAX_REPLY>;

/// Counters reported with telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStats {
    pub transactions: u32,
    pub read_failures: u32,
    pub write_failures: u32,
}

/// The single shared bus, guarded so at most one [`Command`] is in flight.
pub struct SharedBus<B> {
    port: Mutex<CriticalSectionRawMutex, B>,
    transactions: AtomicU32,
    read_failures: AtomicU32,
    write_failures: AtomicU32,
}

impl<B: BusPort> SharedBus<B> {
    pub fn new(port: B) -> Self {
        Self {
            port: Mutex::new(port),
            transactions: AtomicU32::new(0),
            read_failures: AtomicU32::new(0),
            write_failures: AtomicU32::new(0),
        }
    }

    /// Issue one command, waiting for any outstanding command to finish first.
    pub async fn execute(&self, cmd: &Command) -> Result<ReplyBytes, BusError> {
        let mut port = self.port.lock().await;
        self.issue(&mut port, cmd)
    }

    /// Issue one command only if the bus is idle right now.
    pub fn try_execute(&self, cmd: &Command) -> Result<ReplyBytes, Error> {
        let mut port = self.port.try_lock().map_err(|_| Error::BusContention)?;
        Ok(self.issue(&mut port, cmd)?)
    }

    /// Read a typed reply.
    ///
    /// A failed read is not an error: the zero reply is substituted and
    /// flagged stale.  The transport is flaky by nature and callers
    /// tolerate stale readings.
    pub async fn read<R: Reply>(&self, cmd: &Command) -> R {
        if let Command::Read { register, len } = cmd {
            debug_assert_eq!(
                *len,
                R::LEN,
                "reply type does not fit register 0x{:02x}",
                register
            );
        }
        match self.execute(cmd).await {
            Ok(raw) => R::decode(&raw),
            Err(e) => {
                warn!(
                    "read of register 0x{:02x} failed ({}), using zero",
                    cmd.register(),
                    e
                );
                R::stale()
            }
        }
    }

    /// Issue a write command.
    pub async fn write(&self, cmd: &Command) -> Result<(), Error> {
        self.execute(cmd).await?;
        Ok(())
    }

    /// Run `f` with the port held, e.g. to reconfigure or inspect it.
    /// Counts as no transaction.
    pub async fn with_port<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut port = self.port.lock().await;
        f(&mut port)
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            transactions: self.transactions.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Commands issued since startup.
    pub fn transaction_count(&self) -> u32 {
        self.transactions.load(Ordering::Relaxed)
    }

    fn issue(&self, port: &mut B, cmd: &Command) -> Result<ReplyBytes, BusError> {
        self.transactions.fetch_add(1, Ordering::Relaxed);
        match cmd {
            Command::Write { .. } => {
                let frame = cmd.frame();
                debug!("bus write {:02x?}", frame.as_slice());
                port.write(&frame).inspect_err(|_| {
                    self.write_failures.fetch_add(1, Ordering::Relaxed);
                })?;
                Ok(ReplyBytes::new())
            }
            Command::Read { register, len } => {
                let mut buf = [0u8; MAX_REPLY];
                let len = (*len).min(MAX_REPLY);
                port.write_read(*register, &mut buf[..len]).inspect_err(|_| {
                    self.read_failures.fetch_add(1, Ordering::Relaxed);
                })?;
                let mut raw = ReplyBytes::new();
                let _ = raw.extend_from_slice(&buf[..len]);
                Ok(raw)
            }
        }
    }
}
