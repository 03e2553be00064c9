//! PIO-based frequency and duty-cycle counter.
//!
//! The firmware runs a PIO state machine on the pin that counts system
//! clock cycles spent high and low during one signal period. The host
//! converts those counts using the clock rate the firmware reported when
//! the counter was initialized.

use crate::consts::{self, freq_counter as fc};
use crate::device::{Transport, U2if};
use crate::error::{Error, Result};
use crate::pin::PinArg;
use crate::report::{encode_command, Response, Status};
use hidapi::HidApi;
use log::{debug, trace, warn};

/// Raw cycle counts of one signal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleCounts {
    /// System clock cycles the signal was high.
    pub high: u32,
    /// System clock cycles the signal was low.
    pub low: u32,
}

impl CycleCounts {
    pub fn total(&self) -> u64 {
        self.high as u64 + self.low as u64
    }
}

/// Converts cycle counts into `(frequency_hz, duty_percent)`.
///
/// A zero total (no complete period captured, or an idle line) yields
/// `(0.0, 0.0)`.
pub fn cycles_to_frequency_duty(sys_clk_hz: u32, counts: CycleCounts) -> (f64, f64) {
    let total = counts.total();
    if total == 0 {
        return (0.0, 0.0);
    }
    let total = total as f64;
    (
        sys_clk_hz as f64 / total,
        100.0 * counts.high as f64 / total,
    )
}

/// Frequency and duty-cycle counter bound to one pin.
///
/// Created already initialized; the PIO state machine is released by
/// [`FreqCounter::deinit`] or when the handle is dropped.
#[derive(Debug)]
pub struct FreqCounter<T: Transport> {
    transport: T,
    pin_id: u8,
    sys_clk_hz: u32,
    initialized: bool,
}

impl FreqCounter<U2if> {
    /// Connects to a device (first found, or by serial number) and starts a counter on `pin`.
    pub fn open(hid_api: &HidApi, pin: impl Into<PinArg>, serial: Option<&str>) -> Result<Self> {
        let pin = pin.into();
        // Reject a bad pin before touching USB.
        pin.resolve()?;
        FreqCounter::new(U2if::connect(hid_api, serial)?, pin)
    }
}

impl<T: Transport> FreqCounter<T> {
    /// Claims a PIO state machine for `pin` and caches the firmware's system clock rate.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if the pin id does not fit the wire format.
    /// * [`Error::NoResourcesAvailable`] if no PIO state machine is free.
    /// * [`Error::PinBusy`] if a counter already runs on the pin.
    /// * [`Error::UnknownFirmwareError`] for any other NOK code.
    /// * Transport and response-shape errors as returned by the exchange.
    pub fn new(transport: T, pin: impl Into<PinArg>) -> Result<Self> {
        let pin_id = pin.into().resolve()?;
        let op = fc::OP_INIT;
        let bytes = transport.send_report(&encode_command(op, pin_id))?;
        let resp = Response::parse(op, &bytes)?;
        match resp.status() {
            Status::Ok => {}
            Status::Nok => return Err(init_error(pin_id, resp.error_code())),
            Status::Other(_) => return Err(resp.unexpected()),
        }
        resp.require_len(fc::INIT_RESP_LEN)?;
        let sys_clk_hz = resp.u32_le_at(consts::RESP_OFFSET_PAYLOAD)?;
        debug!(
            "FreqCounter initialized on pin {} (sys_clk={} Hz)",
            pin_id, sys_clk_hz
        );
        Ok(Self {
            transport,
            pin_id,
            sys_clk_hz,
            initialized: true,
        })
    }

    #[inline]
    pub fn pin_id(&self) -> u8 {
        self.pin_id
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// System clock frequency reported by the firmware at init.
    #[inline]
    pub fn sys_clk_hz(&self) -> u32 {
        self.sys_clk_hz
    }

    /// Reads the latest high/low cycle counts without converting them.
    pub fn measure_cycles(&self) -> Result<CycleCounts> {
        if !self.initialized {
            return Err(Error::NotInitialized { pin: self.pin_id });
        }
        let op = fc::OP_GET_MEASUREMENT;
        let bytes = self
            .transport
            .send_report(&encode_command(op, self.pin_id))?;
        let resp = Response::parse(op, &bytes)?;
        match resp.status() {
            Status::Ok => {}
            Status::Nok => return Err(Error::MeasurementFailed { pin: self.pin_id }),
            Status::Other(_) => return Err(resp.unexpected()),
        }
        resp.require_len(fc::MEASUREMENT_RESP_LEN)?;
        let counts = CycleCounts {
            high: resp.u32_le_at(consts::RESP_OFFSET_PAYLOAD)?,
            low: resp.u32_le_at(consts::RESP_OFFSET_PAYLOAD + 4)?,
        };
        trace!("FreqCounter pin {} counts: {:?}", self.pin_id, counts);
        Ok(counts)
    }

    /// Returns `(frequency_hz, duty_percent)` of the last captured period.
    ///
    /// `(0.0, 0.0)` means no complete period was seen; it is not an error.
    /// No retry happens here, poll again if needed.
    ///
    /// If the firmware reported a 0 Hz system clock at init, nothing is sent
    /// and `(0.0, 0.0)` is returned.
    pub fn measure(&self) -> Result<(f64, f64)> {
        if !self.initialized {
            return Err(Error::NotInitialized { pin: self.pin_id });
        }
        if self.sys_clk_hz == 0 {
            warn!(
                "FreqCounter on pin {} has no system clock rate; skipping measurement",
                self.pin_id
            );
            return Ok((0.0, 0.0));
        }
        let counts = self.measure_cycles()?;
        Ok(cycles_to_frequency_duty(self.sys_clk_hz, counts))
    }

    /// Releases the firmware counter. Safe to call more than once.
    ///
    /// Failures are logged as warnings; the handle always ends up
    /// uninitialized.
    pub fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        let op = fc::OP_DEINIT;
        match self
            .transport
            .send_report(&encode_command(op, self.pin_id))
            .and_then(|bytes| Response::parse(op, &bytes).map(|r| r.status()))
        {
            Ok(Status::Ok) => debug!("FreqCounter deinitialized on pin {}", self.pin_id),
            Ok(status) => warn!(
                "FreqCounter deinit failed on pin {} ({:?}); resource may already be released",
                self.pin_id, status
            ),
            Err(e) => warn!(
                "Error during FreqCounter deinit on pin {}: {}",
                self.pin_id, e
            ),
        }
    }
}

impl<T: Transport> Drop for FreqCounter<T> {
    fn drop(&mut self) {
        self.deinit();
    }
}

fn init_error(pin: u8, code: u8) -> Error {
    match code {
        fc::init_err::NO_RESOURCES => Error::NoResourcesAvailable { pin },
        fc::init_err::PIN_BUSY => Error::PinBusy { pin },
        code => Error::UnknownFirmwareError { pin, code },
    }
}
