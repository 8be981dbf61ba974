//! Single-command-in-flight guarantee of `SharedBus`, checked from
//! inside the port while a command is on the wire.

use std::cell::{Cell, OnceCell};
use std::rc::{Rc, Weak};

use futures_lite::future::{block_on, yield_now, zip};

use poolctl::BusError;
use poolctl::app::ports::BusPort;
use poolctl::bus::SharedBus;
use poolctl::error::Error;
use poolctl::protocol::{Command, Operation, PumpStatus, encode};

/// Tracks how many transactions are open at once, and from inside each
/// one tries to start another through the bus it sits behind.
#[derive(Clone, Default)]
struct NestingPort {
    bus: Rc<OnceCell<Weak<SharedBus<NestingPort>>>>,
    open: Rc<Cell<u32>>,
    peak: Rc<Cell<u32>>,
    entered: Rc<Cell<u32>>,
    refused: Rc<Cell<u32>>,
}

impl NestingPort {
    fn transaction(&self) {
        self.entered.set(self.entered.get() + 1);
        self.open.set(self.open.get() + 1);
        self.peak.set(self.peak.get().max(self.open.get()));

        // Only the outermost transaction tries to nest.
        if self.open.get() == 1 {
            if let Some(bus) = self.bus.get().and_then(Weak::upgrade) {
                let nested = bus.try_execute(&encode(Operation::PumpStatus { pump: 1 }));
                if nested == Err(Error::BusContention) {
                    self.refused.set(self.refused.get() + 1);
                }
            }
        }

        self.open.set(self.open.get() - 1);
    }
}

impl BusPort for NestingPort {
    fn write(&mut self, _bytes: &[u8]) -> Result<(), BusError> {
        self.transaction();
        Ok(())
    }

    fn write_read(&mut self, _register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.transaction();
        buf.fill(1);
        Ok(())
    }
}

fn nesting_bus() -> (Rc<SharedBus<NestingPort>>, NestingPort) {
    let port = NestingPort::default();
    let bus = Rc::new(SharedBus::new(port.clone()));
    let _ = port.bus.set(Rc::downgrade(&bus));
    (bus, port)
}

/// Issue `cmds` one after another, yielding to the other flow between them.
async fn flow(bus: &SharedBus<NestingPort>, cmds: &[Command]) -> u32 {
    let mut ok = 0;
    for cmd in cmds {
        if bus.execute(cmd).await.is_ok() {
            ok += 1;
        }
        yield_now().await;
    }
    ok
}

#[test]
fn no_command_starts_while_another_is_on_the_wire() {
    let (bus, port) = nesting_bus();
    let plan = [
        encode(Operation::ValveMove {
            valve: 0,
            degrees: 90,
        }),
        encode(Operation::ValveStatus { valve: 0 }),
        encode(Operation::PumpSetSpeed { pump: 0, speed: 2 }),
        encode(Operation::HeaterEnable { heater: 0, on: true }),
    ];
    let check = [
        encode(Operation::PumpStatus { pump: 0 }),
        encode(Operation::PumpStatus { pump: 1 }),
        encode(Operation::LightStatus { light: 0 }),
        encode(Operation::HeaterStatus { heater: 0 }),
        encode(Operation::ThermometerRead { thermometer: 0 }),
    ];

    let (a, b) = block_on(zip(flow(&bus, &plan), flow(&bus, &check)));

    assert_eq!((a, b), (4, 5));
    assert_eq!(port.peak.get(), 1);
    // Every transaction tried to nest one more and was turned away.
    assert_eq!(port.entered.get(), 9);
    assert_eq!(port.refused.get(), 9);
    assert_eq!(bus.transaction_count(), 9);
}

#[test]
fn typed_read_through_a_busy_check_still_decodes() {
    let (bus, port) = nesting_bus();
    let status: PumpStatus = block_on(bus.read(&encode(Operation::PumpStatus { pump: 0 })));
    assert_eq!(status.status, 1);
    assert!(!status.stale);
    assert_eq!(port.refused.get(), 1);
}
