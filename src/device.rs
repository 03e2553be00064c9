//! Device discovery and the HID request/response transport.

use crate::consts;
use crate::error::{Error, Result};
use hidapi::{HidApi, HidDevice};
use log::{debug, trace};
use std::ffi::CString;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One blocking command/response exchange with the firmware.
///
/// The peripheral drivers only need this primitive. [`U2if`] implements it
/// over hidapi; tests and alternative transports can implement it directly.
/// Implementations are not expected to serialize concurrent callers.
pub trait Transport {
    /// Sends `report` (opcode first) and returns the matching response bytes.
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        (**self).send_report(report)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        (**self).send_report(report)
    }
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        (**self).send_report(report)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        (**self).send_report(report)
    }
}

/// Information about a discovered u2if device.
#[derive(Debug, Clone)]
pub struct U2ifDeviceInfo {
    pub vid: u16,
    pub pid: u16,
    /// The unique, platform-specific path to the HID device.
    pub path: CString,
    pub serial_number: Option<String>,
    pub product_string: Option<String>,
    pub interface_number: i32,
}

/// Finds all u2if devices with the default VID/PID, ordered by serial number.
pub fn device_find_all(hid_api: &HidApi) -> Result<Vec<U2ifDeviceInfo>> {
    device_find(hid_api, consts::U2IF_VID, consts::U2IF_PID)
}

/// Finds devices matching a specific VID and PID, ordered by serial number.
/// Devices without a serial number come last.
pub fn device_find(hid_api: &HidApi, vid: u16, pid: u16) -> Result<Vec<U2ifDeviceInfo>> {
    let mut devices: Vec<U2ifDeviceInfo> = hid_api
        .device_list()
        .filter(|info| info.vendor_id() == vid && info.product_id() == pid)
        .map(|info| {
            debug!(
                "Found u2if device: VID={:04X}, PID={:04X}, Path={:?}, SN={:?}",
                info.vendor_id(),
                info.product_id(),
                info.path(),
                info.serial_number()
            );
            U2ifDeviceInfo {
                vid: info.vendor_id(),
                pid: info.product_id(),
                path: info.path().to_owned(),
                serial_number: info.serial_number().map(String::from),
                product_string: info.product_string().map(String::from),
                interface_number: info.interface_number(),
            }
        })
        .collect();

    devices.sort_by(|a, b| match (&a.serial_number, &b.serial_number) {
        (Some(a_serial), Some(b_serial)) => a_serial.cmp(b_serial),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    Ok(devices)
}

/// Identification strings read from an opened device.
#[derive(Debug, Clone)]
pub struct U2ifDeviceDetails {
    pub serial_number: Option<String>,
    pub product_string: Option<String>,
    pub manufacturer_string: Option<String>,
}

/// A handle to an opened u2if device.
///
/// Several peripheral handles may share one `U2if` by reference or through
/// `Rc`. **Note:** This handle is not thread-safe (`!Sync`); callers must
/// serialize access themselves.
#[derive(Debug)]
pub struct U2if {
    device: HidDevice,
    info: U2ifDeviceDetails,
    read_timeout_ms: i32,
}

impl U2if {
    // --- Constructors and Info ---

    /// Opens a device using its discovery info. Recommended method.
    pub fn open(hid_api: &HidApi, info: &U2ifDeviceInfo) -> Result<Self> {
        Self::from_hid_device(hid_api.open_path(&info.path)?)
    }

    /// Opens the first discovered device. **Warning:** Ambiguous if multiple devices exist.
    pub fn open_first(hid_api: &HidApi) -> Result<Self> {
        let info = device_find_all(hid_api)?
            .into_iter()
            .next()
            .ok_or(Error::DeviceNotFound)?;
        Self::open(hid_api, &info)
    }

    /// Opens a device by its Vendor ID and Product ID. **Warning:** Ambiguous if multiple devices match.
    pub fn open_by_vid_pid(hid_api: &HidApi, vid: u16, pid: u16) -> Result<Self> {
        Self::from_hid_device(hid_api.open(vid, pid)?)
    }

    /// Opens the device whose USB serial number matches `serial`.
    pub fn open_by_serial(hid_api: &HidApi, serial: &str) -> Result<Self> {
        let devices = device_find_all(hid_api)?;
        match devices
            .iter()
            .find(|d| d.serial_number.as_deref() == Some(serial))
        {
            Some(info) => Self::open(hid_api, info),
            None => Err(Error::DeviceNotFoundBySerial {
                serial: serial.to_string(),
                message: format!(
                    "No u2if device found with this serial number ({} devices present)",
                    devices.len()
                ),
            }),
        }
    }

    /// Opens the device selected by `serial`, or the first one when `None`.
    pub fn connect(hid_api: &HidApi, serial: Option<&str>) -> Result<Self> {
        match serial {
            Some(sn) => Self::open_by_serial(hid_api, sn),
            None => Self::open_first(hid_api),
        }
    }

    /// Wraps an already opened hidapi device.
    pub fn from_hid_device(device: HidDevice) -> Result<Self> {
        let info = U2ifDeviceDetails {
            serial_number: device.get_serial_number_string()?,
            product_string: device.get_product_string()?,
            manufacturer_string: device.get_manufacturer_string()?,
        };
        debug!("Opened u2if device: {:?}", info);
        Ok(Self {
            device,
            info,
            read_timeout_ms: consts::DEFAULT_READ_TIMEOUT_MS,
        })
    }

    /// Gets basic information about the opened device.
    pub fn get_device_info(&self) -> U2ifDeviceDetails {
        self.info.clone()
    }

    /// Sets how long [`Transport::send_report`] waits for the response.
    pub fn set_read_timeout_ms(&mut self, timeout_ms: i32) -> Result<()> {
        if timeout_ms <= 0 {
            return Err(Error::InvalidArgument(format!(
                "read timeout must be positive (got {} ms)",
                timeout_ms
            )));
        }
        self.read_timeout_ms = timeout_ms;
        Ok(())
    }

    pub fn read_timeout_ms(&self) -> i32 {
        self.read_timeout_ms
    }
}

/// Builds the output report: report ID 0 followed by `report` zero-padded
/// to [`consts::HID_REPORT_SIZE`] bytes.
pub(crate) fn frame_command(report: &[u8]) -> Result<[u8; consts::HID_REPORT_SIZE + 1]> {
    if report.is_empty() {
        return Err(Error::InvalidArgument("empty command report".into()));
    }
    if report.len() > consts::HID_REPORT_SIZE {
        return Err(Error::InvalidArgument(format!(
            "command report too large (max {}, got {})",
            consts::HID_REPORT_SIZE,
            report.len()
        )));
    }
    let mut out_buf = [0u8; consts::HID_REPORT_SIZE + 1];
    out_buf[1..=report.len()].copy_from_slice(report);
    Ok(out_buf)
}

/// Reads input reports with `read` until one echoes `opcode` or `timeout`
/// elapses. `read` gets the buffer and the remaining milliseconds and
/// returns the report length, 0 meaning nothing arrived in time.
pub(crate) fn read_until_echo<F>(opcode: u8, timeout: Duration, mut read: F) -> Result<Vec<u8>>
where
    F: FnMut(&mut [u8], i32) -> Result<usize>,
{
    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; consts::HID_REPORT_SIZE];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::Timeout { opcode });
        }
        // A sub-millisecond remainder still waits 1 ms instead of polling.
        let remaining_ms = remaining.as_millis().clamp(1, i32::MAX as u128) as i32;
        let len = read(&mut buf, remaining_ms)?;
        if len == 0 {
            return Err(Error::Timeout { opcode });
        }
        trace!("IN report ({} bytes): {:02X?}", len, &buf[..len]);
        if buf[consts::RESP_OFFSET_OPCODE] == opcode {
            return Ok(buf[..len].to_vec());
        }
        trace!(
            "Discarding stale report for opcode 0x{:02X} while waiting for 0x{:02X}",
            buf[consts::RESP_OFFSET_OPCODE],
            opcode
        );
    }
}

impl Transport for U2if {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        let out_buf = frame_command(report)?;
        let opcode = report[0];
        trace!("OUT report: {:02X?}", report);
        let written = self.device.write(&out_buf)?;
        if written != out_buf.len() {
            return Err(Error::ShortWrite {
                written,
                expected: out_buf.len(),
            });
        }
        let timeout = Duration::from_millis(self.read_timeout_ms as u64);
        read_until_echo(opcode, timeout, |buf, timeout_ms| {
            Ok(self.device.read_timeout(buf, timeout_ms)?)
        })
    }
}
