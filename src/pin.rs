use crate::consts::MAX_GPIO_ID;
use crate::error::{Error, Result};

/// Represents a valid RP2040 GPIO pin (GP0-GP29).
/// Use `Pin::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(u8);

impl Pin {
    /// Creates a new Pin, returning an error if the number is out of range (0-29).
    pub fn new(pin_num: u8) -> Result<Self> {
        if pin_num <= MAX_GPIO_ID {
            Ok(Pin(pin_num))
        } else {
            Err(Error::InvalidArgument(format!(
                "GPIO {} out of range (0-{})",
                pin_num, MAX_GPIO_ID
            )))
        }
    }

    /// Returns the underlying GPIO number.
    #[inline]
    pub fn id(&self) -> u8 {
        self.0
    }
}

/// Pin argument accepted by peripheral constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinArg {
    /// Bare GPIO number; only checked to fit the one-byte wire field.
    RawPinId(u32),
    PinHandle(Pin),
}

impl PinArg {
    /// Resolves to the pin id sent on the wire.
    pub fn resolve(self) -> Result<u8> {
        match self {
            PinArg::RawPinId(id) => u8::try_from(id).map_err(|_| {
                Error::InvalidArgument(format!("pin id {} does not fit in one byte", id))
            }),
            PinArg::PinHandle(pin) => Ok(pin.id()),
        }
    }
}

impl From<u8> for PinArg {
    fn from(id: u8) -> Self {
        PinArg::RawPinId(id as u32)
    }
}

impl From<u32> for PinArg {
    fn from(id: u32) -> Self {
        PinArg::RawPinId(id)
    }
}

impl From<Pin> for PinArg {
    fn from(pin: Pin) -> Self {
        PinArg::PinHandle(pin)
    }
}
