//! I2C bus adapter.
//!
//! Implements [`BusPort`] on top of any `embedded-hal` 1.0 [`I2c`]
//! implementation, addressed at the auxiliary controller's slave
//! address.  Register reads go out as one `write_read` (repeated start,
//! no stop in between), which the auxiliary controller needs to keep its
//! register selection across the two halves.
//!
//! On Linux hosts (feature `linux-i2c`) [`LinuxI2cBus`] wraps the
//! `/dev/i2c-N` character device; `write_read` there maps to a single
//! `I2C_RDWR` ioctl.

use embedded_hal::i2c::{Error as _, I2c};
use log::debug;

use crate::app::ports::BusPort;
use crate::error::BusError;

/// [`BusPort`] over an `embedded-hal` I2C master.
pub struct HalBus<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> HalBus<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give the underlying I2C master back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> BusPort for HalBus<I> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.i2c.write(self.address, bytes).map_err(|e| {
            debug!("i2c write to 0x{:02x} failed: {:?}", self.address, e.kind());
            BusError::from(e.kind())
        })
    }

    fn write_read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(|e| {
                debug!(
                    "i2c read of 0x{:02x} at 0x{:02x} failed: {:?}",
                    register,
                    self.address,
                    e.kind()
                );
                BusError::from(e.kind())
            })
    }
}

#[cfg(feature = "linux-i2c")]
pub use linux::LinuxI2cBus;

#[cfg(feature = "linux-i2c")]
mod linux {
    use std::io;

    use linux_embedded_hal::I2cdev;
    use log::info;

    use super::HalBus;

    /// The auxiliary controller on a Linux `/dev/i2c-N` bus.
    pub type LinuxI2cBus = HalBus<I2cdev>;

    impl HalBus<I2cdev> {
        /// Open `path` and address the auxiliary controller at `address`.
        pub fn open(path: &str, address: u8) -> io::Result<Self> {
            let dev = I2cdev::new(path).map_err(io::Error::other)?;
            info!("opened {} for slave 0x{:02x}", path, address);
            Ok(Self::new(dev, address))
        }
    }
}
