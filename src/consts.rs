//! Internal constants, report layout, opcodes and firmware error codes.

// Default Vendor/Product IDs (TinyUSB defaults used by the u2if firmware)
/// Vendor ID reported by u2if firmware.
pub const U2IF_VID: u16 = 0xCAFE;
/// Product ID reported by u2if firmware.
pub const U2IF_PID: u16 = 0x4005;

/// Size of every HID report exchanged with the firmware (without report ID).
pub const HID_REPORT_SIZE: usize = 64;

/// Default time to wait for a response report.
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 1000;

// --- Response Header ---
pub const RESP_OFFSET_OPCODE: usize = 0;
pub const RESP_OFFSET_STATUS: usize = 1;
pub const RESP_OFFSET_PIN: usize = 2;
pub const RESP_OFFSET_PAYLOAD: usize = 3;
/// Opcode echo + status.
pub const RESP_HEADER_MIN_LEN: usize = 2;

// Status sentinels (byte 1)
pub const STATUS_OK: u8 = 0x01;
pub const STATUS_NOK: u8 = 0x02;

// --- PIO Frequency Counter ---
pub mod freq_counter {
    pub const OP_INIT: u8 = 0xC0;
    pub const OP_DEINIT: u8 = 0xC1;
    pub const OP_GET_MEASUREMENT: u8 = 0xC2;

    // Opcode(1) + Status(1) + Pin(1) + SysClkHz(4)
    pub const INIT_RESP_LEN: usize = 7;
    // Opcode(1) + Status(1) + Pin(1) + HighCycles(4) + LowCycles(4)
    pub const MEASUREMENT_RESP_LEN: usize = 11;

    pub mod init_err {
        /// No free PIO state machine.
        pub const NO_RESOURCES: u8 = 0x01;
        pub const PIN_BUSY: u8 = 0x02;
    }
}

// --- PWM/DMA Frequency Meter ---
pub mod freq_meter {
    pub const OP_INIT: u8 = 0xC8;
    pub const OP_DEINIT: u8 = 0xC9;
    pub const OP_START: u8 = 0xCA;
    pub const OP_GET_PERIOD_TICKS: u8 = 0xCB;

    // Opcode(1) + Status(1) + Pin(1) + Ticks(4)
    pub const PERIOD_RESP_LEN: usize = 7;

    /// Firmware edge timer rate: 1 tick = 1 µs.
    pub const TIMER_HZ: f64 = 1_000_000.0;

    pub mod init_err {
        pub const PIN_OR_SLICE_BUSY: u8 = 0x01;
        pub const NO_DMA_CHANNEL: u8 = 0x02;
        pub const MAX_MEASUREMENTS: u8 = 0x03;
        /// Pin does not map to a PWM "B" channel.
        pub const WRONG_PWM_CHANNEL: u8 = 0x04;
    }

    pub mod start_err {
        pub const NOT_INITIALIZED: u8 = 0x01;
    }

    pub mod read_err {
        pub const NOT_INITIALIZED: u8 = 0x01;
        pub const TIMEOUT_OR_ERROR: u8 = 0x02;
    }
}

// RP2040 exposes GP0-GP29.
pub const MAX_GPIO_ID: u8 = 29;
