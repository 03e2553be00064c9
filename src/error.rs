use thiserror::Error;

/// Errors that can occur when talking to u2if firmware.
///
/// Variants fall into four groups: bad caller input, transport failures
/// (see [`Error::is_transport_error`]), malformed responses, and
/// conditions the firmware reported for a specific pin. Firmware error
/// codes are scoped to the command that produced them, so the same raw
/// code maps to different variants for different peripherals.
#[derive(Error, Debug)]
pub enum Error {
    /// Constructor or method argument is not acceptable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // --- Transport ---
    /// Error from the underlying HID API layer.
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// No u2if device was found with the default VID/PID.
    #[error("No u2if device found with specified VID/PID")]
    DeviceNotFound,
    /// No u2if device was found with the specified serial number.
    #[error("Device not found with serial number '{serial}': {message}")]
    DeviceNotFoundBySerial {
        /// The serial number that was searched for.
        serial: String,
        /// Additional error details.
        message: String,
    },
    /// The HID write did not transfer the whole report.
    #[error("Short HID write: {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted by hidapi.
        written: usize,
        /// Full report size including report ID.
        expected: usize,
    },
    /// No response report arrived within the read timeout.
    #[error("Timeout waiting for response to opcode 0x{opcode:02X}")]
    Timeout {
        /// Opcode of the command that went unanswered.
        opcode: u8,
    },

    // --- Handle state ---
    /// Operation on a handle that was never initialized or already deinitialized.
    #[error("Peripheral on pin {pin} is not initialized")]
    NotInitialized {
        /// Pin the handle is bound to.
        pin: u8,
    },

    // --- Response shape ---
    /// Response is shorter than the opcode requires.
    #[error(
        "Incomplete response to opcode 0x{opcode:02X}: expected at least {expected} bytes, got {actual}"
    )]
    IncompleteResponse {
        /// Opcode of the command.
        opcode: u8,
        /// Minimum length for this opcode.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// Status byte is neither OK nor NOK.
    #[error("Unexpected firmware response to opcode 0x{opcode:02X} (status 0x{status:02X})")]
    UnexpectedFirmwareResponse {
        /// Opcode of the command.
        opcode: u8,
        /// Raw status byte.
        status: u8,
    },

    // --- Firmware-reported ---
    /// The frequency counter answered a measurement request with NOK.
    #[error("Frequency counter measurement failed on pin {pin}")]
    MeasurementFailed { pin: u8 },
    /// The frequency meter rejected a start request.
    #[error("Frequency meter failed to start measurement on pin {pin}")]
    StartFailed { pin: u8 },
    /// Pin is already claimed by another frequency counter.
    #[error("Pin {pin} is already in use")]
    PinBusy { pin: u8 },
    /// No PIO state machine left for a frequency counter.
    #[error("No PIO resources available for pin {pin}")]
    NoResourcesAvailable { pin: u8 },
    /// Pin or its PWM slice is already used (PWM output or another meter).
    #[error("Pin {pin} or its PWM slice is busy")]
    PinOrSliceBusy { pin: u8 },
    #[error("No free DMA channel available for pin {pin}")]
    NoDmaChannelAvailable { pin: u8 },
    #[error("Maximum concurrent frequency measurements reached (pin {pin})")]
    MaxConcurrentMeasurementsReached { pin: u8 },
    /// Frequency meter input must be on a PWM "B" channel pin.
    #[error("Pin {pin} must map to PWM channel B")]
    WrongPwmChannel { pin: u8 },
    /// Host believes the pin is initialized but the firmware does not.
    #[error("Pin {pin} is not initialized on the firmware side")]
    NotInitializedOnFirmware { pin: u8 },
    /// No edges captured, or the capture failed.
    #[error("Measurement error or timeout on pin {pin} (e.g., no edges detected)")]
    MeasurementTimeoutOrError { pin: u8 },
    #[error("Unknown firmware error code {code} on pin {pin}")]
    UnknownFirmwareError {
        /// Pin the command targeted.
        pin: u8,
        /// Raw error byte from the response.
        code: u8,
    },
}

impl Error {
    /// Returns `true` for connection, enumeration and send/receive failures.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Error::Hid(_)
                | Error::DeviceNotFound
                | Error::DeviceNotFoundBySerial { .. }
                | Error::ShortWrite { .. }
                | Error::Timeout { .. }
        )
    }
}

/// Result type alias for u2if operations.
pub type Result<T> = std::result::Result<T, Error>;
