//! # u2if-hid
//!
//! A Rust crate for the signal-measurement peripherals of the u2if RP2040
//! firmware, driven over its USB HID interface.
//!
//! This crate uses the `hidapi` crate for cross-platform USB HID communication.
//!
//! ## Features
//!
//! *   Device discovery (`device_find_all`, `device_find`).
//! *   Flexible device opening (`U2if::open`, `open_first`, `open_by_serial`, `open_by_vid_pid`, `connect`).
//! *   PIO frequency counter (`FreqCounter`):
//!     *   Frequency and duty cycle from high/low cycle counts.
//!     *   System clock rate read from the firmware at init.
//!     *   Raw cycle counts (`measure_cycles`).
//! *   PWM/DMA frequency meter (`FreqMeter`):
//!     *   Arming a capture (`start`).
//!     *   Average period in microsecond ticks (`read_period_ticks`) or Hz (`frequency`).
//!     *   Scoped use with guaranteed release (`FreqMeter::scoped`).
//! *   A [`Transport`] trait so the drivers can run over any request/response channel.
//!
//! ## Resource Lifecycle
//!
//! Both peripherals claim hardware on the RP2040 (a PIO state machine, or a
//! PWM slice plus a DMA channel). A handle is only returned once the
//! firmware has accepted the init command. The hardware is released by
//! `deinit()` or when the handle is dropped; release never fails from the
//! caller's point of view, problems are logged with `log::warn!`.
//!
//! Pin ownership and resource limits are tracked by the firmware only.
//! Conflicts come back as typed errors such as [`Error::PinBusy`] or
//! [`Error::NoDmaChannelAvailable`]. Firmware error codes are scoped to the
//! command, so code `0x02` means "pin busy" for the counter but "no DMA
//! channel" for the meter.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use hidapi::HidApi;
//! use u2if_hid::{FreqCounter, FreqMeter, Pin, Result, U2if};
//!
//! fn main() -> Result<()> {
//!     let hid_api = HidApi::new()?;
//!     let device = U2if::connect(&hid_api, None)?;
//!
//!     // Both peripherals share the same connection.
//!     let counter = FreqCounter::new(&device, Pin::new(15)?)?;
//!     let (freq, duty) = counter.measure()?;
//!     println!("GP15: {:.2} Hz, {:.2} %", freq, duty);
//!
//!     let hz = FreqMeter::scoped(&device, 7, |meter| {
//!         meter.start()?;
//!         std::thread::sleep(std::time::Duration::from_millis(100));
//!         meter.frequency()
//!     })?;
//!     println!("GP7: {:.2} Hz", hz);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every operation is one blocking write followed by one read. `U2if` is
//! `!Sync`; share it between handles on one thread with `&U2if` or `Rc<U2if>`.
//! There is no timeout at the driver level beyond the transport's read
//! timeout, and nothing is retried.
//!
//! ## Hardware Setup Notes
//!
//! *   **Linux udev Rules:** Grant user permission to the HID device. Create `/etc/udev/rules.d/99-u2if.rules`:
//!     ```udev
//!     SUBSYSTEM=="hidraw", ATTRS{idVendor}=="cafe", ATTRS{idProduct}=="4005", MODE="0666", GROUP="plugdev"
//!     ```
//! *   **FreqMeter pins:** Only pins on a PWM "B" channel (odd GPIO numbers) can be measured.

mod consts;
pub mod device;
mod error;
pub mod freq_counter;
pub mod freq_meter;
pub mod pin;
pub mod report;

#[cfg(test)]
mod mock;

pub use device::{device_find, device_find_all, Transport, U2if, U2ifDeviceDetails, U2ifDeviceInfo};
pub use error::{Error, Result};
pub use freq_counter::{cycles_to_frequency_duty, CycleCounts, FreqCounter};
pub use freq_meter::{ticks_to_frequency, FreqMeter};
pub use pin::{Pin, PinArg};
// Re-export only essential public constants
pub use consts::{STATUS_NOK, STATUS_OK, U2IF_PID, U2IF_VID};

/// Wire-level opcodes, for custom [`Transport`] implementations and tests.
pub mod opcodes {
    pub mod freq_counter {
        pub use crate::consts::freq_counter::{OP_DEINIT, OP_GET_MEASUREMENT, OP_INIT};
    }
    pub mod freq_meter {
        pub use crate::consts::freq_meter::{OP_DEINIT, OP_GET_PERIOD_TICKS, OP_INIT, OP_START};
    }
}
