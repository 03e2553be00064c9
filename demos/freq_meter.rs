//! Measures a signal with the PWM/DMA frequency meter.
//!
//! Usage: `cargo run --example freq_meter -- [GPIO] [SERIAL]`
//! The GPIO must be on a PWM channel B (odd number).
use hidapi::HidApi;
use std::{env, thread, time::Duration};
use u2if_hid::{Error, FreqMeter, Result, U2if};

const DEFAULT_PIN: u32 = 7; // GP7

fn main() -> Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let pin_num = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_PIN);
    let serial = args.next();

    let hid_api = HidApi::new()?;
    let device = U2if::connect(&hid_api, serial.as_deref())?;

    FreqMeter::scoped(&device, pin_num, |meter| {
        for _ in 0..10 {
            meter.start()?;
            thread::sleep(Duration::from_millis(200));
            match meter.read_period_ticks() {
                Ok(ticks) => println!(
                    "GP{}: period = {} us, frequency = {:.2} Hz",
                    pin_num,
                    ticks,
                    u2if_hid::ticks_to_frequency(ticks)
                ),
                Err(Error::MeasurementTimeoutOrError { .. }) => {
                    println!("GP{}: no edges detected", pin_num)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    })
}
