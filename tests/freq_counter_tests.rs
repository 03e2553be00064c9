//! FreqCounter behaviour against a scripted device.
//!
//! These tests run without hardware.

mod common;

use approx::assert_relative_eq;
use common::{counts, ScriptedDevice, SYS_CLK_125MHZ};
use std::rc::Rc;
use u2if_hid::opcodes::freq_counter::{OP_DEINIT, OP_GET_MEASUREMENT, OP_INIT};
use u2if_hid::{Error, FreqCounter, Pin, PinArg};

const PIN: u8 = 15;

fn counter_on(device: &ScriptedDevice) -> FreqCounter<&ScriptedDevice> {
    device.ok(OP_INIT, PIN, &SYS_CLK_125MHZ);
    FreqCounter::new(device, PIN).expect("init should succeed")
}

#[test]
fn test_init_reads_sys_clock_from_firmware() {
    let device = ScriptedDevice::new();
    // A board clocked at 133 MHz must not be treated as 125 MHz.
    device.ok(OP_INIT, PIN, &133_000_000u32.to_le_bytes());
    let counter = FreqCounter::new(&device, PIN).unwrap();
    assert_eq!(counter.sys_clk_hz(), 133_000_000);

    device.ok(OP_GET_MEASUREMENT, PIN, &counts(50, 50));
    let (freq, _) = counter.measure().unwrap();
    assert_relative_eq!(freq, 1_330_000.0);
}

#[test]
fn test_measure_example_values() {
    let device = ScriptedDevice::new();
    let counter = counter_on(&device);
    assert_eq!(counter.sys_clk_hz(), 125_000_000);

    device.ok(OP_GET_MEASUREMENT, PIN, &counts(25, 25));
    let (freq, duty) = counter.measure().unwrap();
    assert_relative_eq!(freq, 2_500_000.0);
    assert_eq!(duty, 50.0);

    device.ok(OP_GET_MEASUREMENT, PIN, &counts(30, 70));
    let (freq, duty) = counter.measure().unwrap();
    assert_relative_eq!(freq, 1_250_000.0);
    assert_relative_eq!(duty, 30.0);

    assert_eq!(
        device.sent()[1..].to_vec(),
        vec![vec![OP_GET_MEASUREMENT, PIN], vec![OP_GET_MEASUREMENT, PIN]]
    );
}

#[test]
fn test_measure_zero_cycles_is_not_an_error() {
    let device = ScriptedDevice::new();
    let counter = counter_on(&device);
    device.ok(OP_GET_MEASUREMENT, PIN, &counts(0, 0));
    assert_eq!(counter.measure().unwrap(), (0.0, 0.0));
}

#[test]
fn test_measure_cycles_raw() {
    let device = ScriptedDevice::new();
    let counter = counter_on(&device);
    device.ok(OP_GET_MEASUREMENT, PIN, &counts(u32::MAX, u32::MAX));
    let raw = counter.measure_cycles().unwrap();
    assert_eq!(raw.high, u32::MAX);
    assert_eq!(raw.low, u32::MAX);
    assert_eq!(raw.total(), 2 * u32::MAX as u64);
}

#[test]
fn test_measure_incomplete_response() {
    let device = ScriptedDevice::new();
    let counter = counter_on(&device);
    // Low-cycle field cut short by one byte.
    device.ok(OP_GET_MEASUREMENT, PIN, &counts(25, 25)[..7]);
    match counter.measure() {
        Err(Error::IncompleteResponse {
            opcode,
            expected,
            actual,
        }) => {
            assert_eq!(opcode, OP_GET_MEASUREMENT);
            assert_eq!(expected, 11);
            assert_eq!(actual, 10);
        }
        other => panic!("Expected IncompleteResponse, got {:?}", other),
    }
}

#[test]
fn test_measure_nok_and_unknown_status() {
    let device = ScriptedDevice::new();
    let counter = counter_on(&device);
    device.nok(OP_GET_MEASUREMENT, PIN, 0);
    assert!(matches!(
        counter.measure(),
        Err(Error::MeasurementFailed { pin: PIN })
    ));

    device.reply(vec![OP_GET_MEASUREMENT, 0x55, PIN]);
    assert!(matches!(
        counter.measure(),
        Err(Error::UnexpectedFirmwareResponse {
            opcode: OP_GET_MEASUREMENT,
            status: 0x55
        })
    ));
}

#[test]
fn test_init_failures_return_no_handle() {
    let device = ScriptedDevice::new();
    device.nok(OP_INIT, PIN, 0x02);
    assert!(matches!(
        FreqCounter::new(&device, PIN),
        Err(Error::PinBusy { pin: PIN })
    ));

    device.nok(OP_INIT, PIN, 0x01);
    assert!(matches!(
        FreqCounter::new(&device, PIN),
        Err(Error::NoResourcesAvailable { pin: PIN })
    ));

    // NOK without an error byte.
    device.reply(vec![OP_INIT, u2if_hid::STATUS_NOK, PIN]);
    assert!(matches!(
        FreqCounter::new(&device, PIN),
        Err(Error::UnknownFirmwareError { pin: PIN, code: 0 })
    ));

    device.fail(Error::DeviceNotFound);
    let err = FreqCounter::new(&device, PIN).unwrap_err();
    assert!(err.is_transport_error());

    // Only the four init commands went out; nothing was deinitialized.
    assert_eq!(device.sent().len(), 4);
    assert!(device.sent().iter().all(|c| c[0] == OP_INIT));
}

#[test]
fn test_init_unknown_status_ignores_error_byte() {
    let device = ScriptedDevice::new();
    // 0x01 would read as NoResourcesAvailable under a NOK status.
    device.reply(vec![OP_INIT, 0x7F, PIN, 0x01]);
    assert!(matches!(
        FreqCounter::new(&device, PIN),
        Err(Error::UnexpectedFirmwareResponse {
            opcode: OP_INIT,
            status: 0x7F
        })
    ));
    assert_eq!(device.sent(), vec![vec![OP_INIT, PIN]]);
}

#[test]
fn test_zero_sys_clock_measures_nothing() {
    let device = ScriptedDevice::new();
    device.ok(OP_INIT, PIN, &0u32.to_le_bytes());
    let counter = FreqCounter::new(&device, PIN).unwrap();
    device.ok(OP_GET_MEASUREMENT, PIN, &counts(30, 70));
    assert_eq!(counter.measure().unwrap(), (0.0, 0.0));
    assert_eq!(device.sent().len(), 1);
    assert_eq!(device.pending(), 1);
}

#[test]
fn test_invalid_pin_argument_sends_nothing() {
    let device = ScriptedDevice::new();
    let err = FreqCounter::new(&device, PinArg::RawPinId(300)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(device.sent().is_empty());
}

#[test]
fn test_pin_handle_and_raw_id_are_equivalent() {
    let device = ScriptedDevice::new();
    device.ok(OP_INIT, PIN, &SYS_CLK_125MHZ);
    let from_pin = FreqCounter::new(&device, Pin::new(PIN).unwrap()).unwrap();
    assert_eq!(from_pin.pin_id(), PIN);
    assert_eq!(device.sent()[0], vec![OP_INIT, PIN]);
}

#[test]
fn test_deinit_is_idempotent() {
    let device = ScriptedDevice::new();
    let mut counter = counter_on(&device);
    device.ok(OP_DEINIT, PIN, &[]);
    counter.deinit();
    counter.deinit();
    drop(counter);
    let sent = device.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1], vec![OP_DEINIT, PIN]);
}

#[test]
fn test_deinit_failures_are_swallowed() {
    let device = ScriptedDevice::new();
    let mut counter = counter_on(&device);
    device.nok(OP_DEINIT, PIN, 0);
    counter.deinit();
    assert!(!counter.is_initialized());

    let mut counter = counter_on(&device);
    device.fail(Error::Timeout { opcode: OP_DEINIT });
    counter.deinit();
    assert!(!counter.is_initialized());

    let mut counter = counter_on(&device);
    device.reply(vec![]);
    counter.deinit();
    assert!(!counter.is_initialized());
    assert_eq!(device.pending(), 0);
}

#[test]
fn test_measure_after_deinit() {
    let device = ScriptedDevice::new();
    let mut counter = counter_on(&device);
    device.ok(OP_DEINIT, PIN, &[]);
    counter.deinit();
    assert!(matches!(
        counter.measure(),
        Err(Error::NotInitialized { pin: PIN })
    ));
    // No measurement command was sent.
    assert_eq!(device.sent().len(), 2);
}

#[test]
fn test_drop_deinitializes_once() {
    let device = Rc::new(ScriptedDevice::new());
    device.ok(OP_INIT, PIN, &SYS_CLK_125MHZ);
    device.ok(OP_DEINIT, PIN, &[]);
    {
        let _counter = FreqCounter::new(Rc::clone(&device), PIN).unwrap();
    }
    assert_eq!(device.sent(), vec![vec![OP_INIT, PIN], vec![OP_DEINIT, PIN]]);
}
