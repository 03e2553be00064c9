//! Polls a PIO frequency counter once per second.
//!
//! Usage: `cargo run --example freq_dutycycle -- [GPIO] [SERIAL]`
use hidapi::HidApi;
use std::{env, thread, time::Duration, time::Instant};
use u2if_hid::{FreqCounter, Pin, Result};

const DEFAULT_PIN: u8 = 15; // GP15

fn main() -> Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let pin_num = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_PIN);
    let serial = args.next();

    let hid_api = HidApi::new()?;
    println!("Initializing frequency counter on GP{}", pin_num);
    let counter = FreqCounter::open(&hid_api, Pin::new(pin_num)?, serial.as_deref())?;
    println!(
        "Frequency counter initialized (sys_clk = {} Hz).",
        counter.sys_clk_hz()
    );

    let start = Instant::now();
    println!("\nStarting measurements (Ctrl+C to stop):");
    for _ in 0..30 {
        match counter.measure() {
            Ok((freq, duty)) => println!(
                "Measured: Freq = {:.2} Hz, Duty = {:.2} %, Elapsed time = {}s",
                freq,
                duty,
                start.elapsed().as_secs()
            ),
            Err(e) => {
                eprintln!("Measurement error: {}", e);
                break;
            }
        }
        thread::sleep(Duration::from_secs(1));
    }

    // The counter is released when it goes out of scope.
    println!("Done.");
    Ok(())
}
