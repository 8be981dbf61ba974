//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements  | Connects to                     |
//! |---------------|-------------|---------------------------------|
//! | `i2c`         | BusPort     | embedded-hal I2C, `/dev/i2c-N`  |
//! | `time`        | DelayPort   | async-io-mini timers            |
//! | `log_sink`    | EventSink   | `log` facade                    |
//! | `config_file` | ConfigPort  | JSON file on disk               |

pub mod config_file;
pub mod i2c;
pub mod log_sink;
pub mod time;
