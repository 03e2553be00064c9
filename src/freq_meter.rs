//! PWM/DMA-based frequency meter.
//!
//! The firmware configures the pin's PWM slice as an edge counter and lets
//! a DMA channel timestamp edges with the 1 MHz system timer. The reported
//! period is the average edge-to-edge time in microsecond ticks.
//!
//! Each meter holds one PWM slice and one DMA channel on the device until
//! it is deinitialized. The input pin must map to a PWM "B" channel.

use crate::consts::{self, freq_meter as fm};
use crate::device::{Transport, U2if};
use crate::error::{Error, Result};
use crate::pin::PinArg;
use crate::report::{encode_command, Response, Status};
use hidapi::HidApi;
use log::{debug, trace, warn};

/// Converts a period in 1 µs ticks to Hz; 0 ticks (no edges) gives 0.0.
pub fn ticks_to_frequency(ticks: u32) -> f64 {
    if ticks > 0 {
        fm::TIMER_HZ / ticks as f64
    } else {
        0.0
    }
}

/// Edge-timing frequency meter bound to one pin.
#[derive(Debug)]
pub struct FreqMeter<T: Transport> {
    transport: T,
    pin_id: u8,
    initialized: bool,
}

impl FreqMeter<U2if> {
    /// Connects to a device (first found, or by serial number) and starts a meter on `pin_id`.
    pub fn open(hid_api: &HidApi, pin_id: u32, serial: Option<&str>) -> Result<Self> {
        PinArg::RawPinId(pin_id).resolve()?;
        FreqMeter::new(U2if::connect(hid_api, serial)?, pin_id)
    }
}

impl<T: Transport> FreqMeter<T> {
    /// Claims a PWM slice and DMA channel for `pin_id`.
    ///
    /// On any failure no handle is returned and nothing needs releasing.
    pub fn new(transport: T, pin_id: u32) -> Result<Self> {
        let pin_id = PinArg::RawPinId(pin_id).resolve()?;
        let op = fm::OP_INIT;
        let bytes = transport.send_report(&encode_command(op, pin_id))?;
        let resp = Response::parse(op, &bytes)?;
        match resp.status() {
            Status::Ok => {
                debug!("FreqMeter initialized on pin {}", pin_id);
                Ok(Self {
                    transport,
                    pin_id,
                    initialized: true,
                })
            }
            Status::Nok => Err(init_error(pin_id, resp.error_code())),
            Status::Other(_) => Err(resp.unexpected()),
        }
    }

    /// Runs `f` against a freshly initialized meter and deinitializes it
    /// afterwards, whether `f` succeeds, fails or panics.
    pub fn scoped<R, F>(transport: T, pin_id: u32, f: F) -> Result<R>
    where
        F: FnOnce(&mut FreqMeter<T>) -> Result<R>,
    {
        let mut meter = FreqMeter::new(transport, pin_id)?;
        let result = f(&mut meter);
        meter.deinit();
        result
    }

    #[inline]
    pub fn pin_id(&self) -> u8 {
        self.pin_id
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized { pin: self.pin_id })
        }
    }

    /// Clears previously captured edges and arms a new capture.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        let op = fm::OP_START;
        let bytes = self
            .transport
            .send_report(&encode_command(op, self.pin_id))?;
        let resp = Response::parse(op, &bytes)?;
        match resp.status() {
            Status::Ok => {
                trace!("FreqMeter capture started on pin {}", self.pin_id);
                Ok(())
            }
            Status::Nok => match resp.error_code() {
                fm::start_err::NOT_INITIALIZED => {
                    Err(Error::NotInitializedOnFirmware { pin: self.pin_id })
                }
                _ => Err(Error::StartFailed { pin: self.pin_id }),
            },
            Status::Other(_) => Err(resp.unexpected()),
        }
    }

    /// Reads the average period between captured edges, in 1 µs ticks.
    pub fn read_period_ticks(&self) -> Result<u32> {
        self.ensure_initialized()?;
        let op = fm::OP_GET_PERIOD_TICKS;
        let bytes = self
            .transport
            .send_report(&encode_command(op, self.pin_id))?;
        let resp = Response::parse(op, &bytes)?;
        match resp.status() {
            Status::Ok => {
                resp.require_len(fm::PERIOD_RESP_LEN)?;
                let ticks = resp.u32_le_at(consts::RESP_OFFSET_PAYLOAD)?;
                trace!("FreqMeter pin {} period: {} ticks", self.pin_id, ticks);
                Ok(ticks)
            }
            Status::Nok => Err(read_error(self.pin_id, resp.error_code())),
            Status::Other(_) => Err(resp.unexpected()),
        }
    }

    /// Measured frequency in Hz; 0.0 when the firmware saw no edges.
    pub fn frequency(&self) -> Result<f64> {
        Ok(ticks_to_frequency(self.read_period_ticks()?))
    }

    /// Releases the PWM slice and DMA channel. Safe to call more than once.
    ///
    /// Failures are logged as warnings; the handle always ends up
    /// uninitialized.
    pub fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        let op = fm::OP_DEINIT;
        match self
            .transport
            .send_report(&encode_command(op, self.pin_id))
            .and_then(|bytes| Response::parse(op, &bytes).map(|r| r.status()))
        {
            Ok(Status::Ok) => debug!("FreqMeter deinitialized on pin {}", self.pin_id),
            Ok(status) => warn!(
                "FreqMeter firmware deinit for pin {} failed ({:?})",
                self.pin_id, status
            ),
            Err(e) => warn!(
                "Error during FreqMeter firmware deinit for pin {}: {}",
                self.pin_id, e
            ),
        }
    }
}

impl<T: Transport> Drop for FreqMeter<T> {
    fn drop(&mut self) {
        self.deinit();
    }
}

fn init_error(pin: u8, code: u8) -> Error {
    match code {
        fm::init_err::PIN_OR_SLICE_BUSY => Error::PinOrSliceBusy { pin },
        fm::init_err::NO_DMA_CHANNEL => Error::NoDmaChannelAvailable { pin },
        fm::init_err::MAX_MEASUREMENTS => Error::MaxConcurrentMeasurementsReached { pin },
        fm::init_err::WRONG_PWM_CHANNEL => Error::WrongPwmChannel { pin },
        code => Error::UnknownFirmwareError { pin, code },
    }
}

fn read_error(pin: u8, code: u8) -> Error {
    match code {
        fm::read_err::NOT_INITIALIZED => Error::NotInitializedOnFirmware { pin },
        fm::read_err::TIMEOUT_OR_ERROR => Error::MeasurementTimeoutOrError { pin },
        code => Error::UnknownFirmwareError { pin, code },
    }
}
