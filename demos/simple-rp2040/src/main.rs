//! Example of driving a common-anode TM1638 board from an RP2040 like the
//! Pi Pico: a counter on the digits, buttons mirrored onto the LEDs.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Bit-bang the TM1638 bus over three plain GPIOs; adjust the pins to
    // match your wiring.  The board also needs 5V and ground.
    let mut display = tm1638_anode::Tm1638::builder()
        .with_embassy_rp_pins(p.PIN_6, p.PIN_7, p.PIN_8)
        .build()
        .unwrap();

    display.init().unwrap();
    display.set_text("HELLO.42").unwrap();
    Timer::after_millis(1500).await;

    debug!("Hello!  Press one of the buttons on the board!");

    let mut count: u32 = 0;
    loop {
        // Mirror the pressed buttons onto the LED row above them
        let mut buttons = display.read_buttons().unwrap();
        if buttons != 0 {
            debug!("buttons = {=u32:x}", buttons);
        }
        for led in 0..8 {
            display.set_led(led, (buttons & 1) as u8).unwrap();
            buttons >>= 1;
        }

        // Sweep a counter across the digits, one position at a time
        let digit = char::from_digit(count % 10, 10).unwrap();
        display
            .set_digit(((count / 10) % 8) as u8, digit, false)
            .unwrap();
        count = count.wrapping_add(1);

        Timer::after_millis(250).await;
    }
}
