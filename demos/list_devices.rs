use hidapi::HidApi;
use u2if_hid::{self, Result, U2if};

fn main() -> Result<()> {
    env_logger::init();
    let hid_api = HidApi::new()?;

    println!(
        "Searching for u2if HID devices (VID=0x{:04X}, PID=0x{:04X})...",
        u2if_hid::U2IF_VID,
        u2if_hid::U2IF_PID
    );
    let devices = u2if_hid::device_find_all(&hid_api)?;

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (i, info) in devices.iter().enumerate() {
        println!(
            "  {}: Interface={}, Path={:?}, Serial='{}', Product='{}'",
            i,
            info.interface_number,
            info.path,
            info.serial_number.as_deref().unwrap_or("N/A"),
            info.product_string.as_deref().unwrap_or("N/A"),
        );
    }

    let device = U2if::open(&hid_api, &devices[0])?;
    println!("Opened device 0: {:?}", device.get_device_info());
    Ok(())
}
