//! The [`Pins`] and [`BusDriver`] seams and the bit-banging transport built
//! on top of them.
//!
//! The TM1638 uses a three-wire bus similar to SPI, but not so similar that
//! an SPI peripheral can speak it: the single data line changes direction
//! mid-transaction when keys are scanned.  [`BusDriver`] exposes the
//! byte-level protocol; [`Pins`] is the platform capability it is bit-banged
//! over.
//!
//! No delays are inserted between edges.  The chip tolerates clock rates far
//! above what software-timed GPIO reaches, so pacing is left to the platform;
//! a [`Pins`] implementation that needs settle time can add it inside its pin
//! operations.

/// Byte-level implementation of the TM1638 bus interface.
///
/// Implemented by [`BitBangBus`] for any [`Pins`]; an alternative
/// implementation (PIO, a logic-analyzer capture, a test mock) can be
/// injected instead.
pub trait BusDriver {
    type Error;

    /// Send a single command, with no payload, and no response expected.
    fn send_command(&mut self, b: u8) -> Result<(), Self::Error>;

    /// Send a command with a data payload, but no response expected.
    fn send_command_write_data(&mut self, b: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Send a command which is expected to generate a response.
    ///
    /// The expected size of the response (in bytes) is determined by the size
    /// of the `data` slice.
    fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) -> Result<(), Self::Error>;
}

/// The three GPIO lines the controller owns, as a platform capability.
///
/// An implementation must provide synchronous, unbuffered writes: when a
/// `set_*` call returns, the line has assumed its level as far as software
/// can know.  The data line must be switchable between push-pull output and
/// pulled-up input, because the chip drives it during key scans.
pub trait Pins {
    type Error;

    /// Configure all three lines as outputs and release strobe and clock to
    /// their idle high levels.  Called once when the transport is built.
    fn configure(&mut self) -> Result<(), Self::Error>;

    fn set_strobe(&mut self, high: bool) -> Result<(), Self::Error>;

    fn set_clock(&mut self, high: bool) -> Result<(), Self::Error>;

    fn set_dio(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Reconfigure the data line as an input with a pull-up.
    fn dio_as_input(&mut self) -> Result<(), Self::Error>;

    /// Return the data line to push-pull output mode.
    fn dio_as_output(&mut self) -> Result<(), Self::Error>;

    fn read_dio(&mut self) -> Result<bool, Self::Error>;
}

/// Bit-banging [`BusDriver`] over any [`Pins`] implementation.
pub struct BitBangBus<P: Pins> {
    pins: P,
}

impl<P: Pins> BitBangBus<P> {
    /// Take ownership of the pins and put the bus in its idle state.
    pub fn new(mut pins: P) -> Result<Self, P::Error> {
        pins.configure()?;
        Ok(Self { pins })
    }

    /// Shift one byte out on the data line, least significant bit first.
    ///
    /// Per bit: clock low, data line to the bit value, clock high.  The chip
    /// samples on the rising clock edge.  Must be called with strobe held
    /// low.
    fn send_byte(&mut self, b: u8) -> Result<(), P::Error> {
        for bit in 0..8 {
            self.pins.set_clock(false)?;
            self.pins.set_dio(b & (1 << bit) != 0)?;
            self.pins.set_clock(true)?;
        }
        Ok(())
    }

    /// Shift one byte in from the data line.
    ///
    /// The data line is flipped to a pulled-up input for the duration and
    /// restored to output afterwards.  Each sampled bit enters at bit 7 and
    /// is shifted down as later bits arrive, so the first bit on the wire
    /// ends up in bit 0.
    fn receive_byte(&mut self) -> Result<u8, P::Error> {
        self.pins.dio_as_input()?;

        let mut value = 0u8;
        for _ in 0..8 {
            value >>= 1;
            self.pins.set_clock(false)?;
            if self.pins.read_dio()? {
                value |= 0x80;
            }
            self.pins.set_clock(true)?;
        }

        self.pins.dio_as_output()?;
        Ok(value)
    }
}

impl<P: Pins> BusDriver for BitBangBus<P> {
    type Error = P::Error;

    /// Send a single byte that represents a command, so strobe will be pulled
    /// low before the command's bits are sent, and then pulled high again
    /// after.
    fn send_command(&mut self, b: u8) -> Result<(), Self::Error> {
        self.pins.set_strobe(false)?;
        self.send_byte(b)?;
        self.pins.set_strobe(true)
    }

    /// Send a single byte that represents a command followed by one or more
    /// data bytes, so strobe will be pulled low before the command's bits are
    /// sent, and not pulled high again until after the data bytes are sent.
    fn send_command_write_data(&mut self, b: u8, data: &[u8]) -> Result<(), Self::Error> {
        debug_assert!(!data.is_empty());
        self.pins.set_strobe(false)?;
        self.send_byte(b)?;
        for b in data {
            #[cfg(feature = "defmt")]
            defmt::trace!("data byte = {=u8:x}", *b);
            self.send_byte(*b)?;
        }
        self.pins.set_strobe(true)
    }

    /// Send a single byte that represents a command and which expects a
    /// response back from the controller, so strobe will be pulled low before
    /// the command's bits are sent, and then pulled high again after all
    /// bytes are read.
    fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.pins.set_strobe(false)?;
        self.send_byte(b)?;

        for byte in data.iter_mut() {
            *byte = self.receive_byte()?;
        }

        self.pins.set_strobe(true)
    }
}

mod embedded_hal_pins {
    use embedded_hal_1::digital::{Error as _, ErrorKind, InputPin, OutputPin, PinState};

    /// [`super::Pins`] over `embedded-hal` digital traits, for platforms
    /// whose data pin can be read back while configured as an open-drain
    /// output.
    ///
    /// The direction switch is logical rather than electrical: "input mode"
    /// releases the line high and lets the pull-up or the chip drive it,
    /// which is exactly how the chip's bidirectional data line is meant to be
    /// shared.  Platforms with true direction registers are better served by
    /// a dedicated [`super::Pins`] implementation such as
    /// [`crate::EmbassyRpPins`].
    pub struct EmbeddedHalPins<Stb, Clk, Dio> {
        strobe: Stb,
        clock: Clk,
        dio: Dio,
    }

    impl<Stb, Clk, Dio> EmbeddedHalPins<Stb, Clk, Dio>
    where
        Stb: OutputPin,
        Clk: OutputPin,
        Dio: InputPin + OutputPin,
    {
        pub fn new(strobe: Stb, clock: Clk, dio: Dio) -> Self {
            Self { strobe, clock, dio }
        }
    }

    impl<Stb, Clk, Dio> super::Pins for EmbeddedHalPins<Stb, Clk, Dio>
    where
        Stb: OutputPin,
        Clk: OutputPin,
        Dio: InputPin + OutputPin,
    {
        // The three pins may have three distinct error types; fold them all
        // into the portable kind.
        type Error = ErrorKind;

        fn configure(&mut self) -> Result<(), Self::Error> {
            self.strobe.set_high().map_err(|e| e.kind())?;
            self.clock.set_high().map_err(|e| e.kind())?;
            self.dio.set_high().map_err(|e| e.kind())
        }

        fn set_strobe(&mut self, high: bool) -> Result<(), Self::Error> {
            self.strobe
                .set_state(PinState::from(high))
                .map_err(|e| e.kind())
        }

        fn set_clock(&mut self, high: bool) -> Result<(), Self::Error> {
            self.clock
                .set_state(PinState::from(high))
                .map_err(|e| e.kind())
        }

        fn set_dio(&mut self, high: bool) -> Result<(), Self::Error> {
            self.dio
                .set_state(PinState::from(high))
                .map_err(|e| e.kind())
        }

        fn dio_as_input(&mut self) -> Result<(), Self::Error> {
            // Release the line; the pull-up takes over until the chip drives it.
            self.dio.set_high().map_err(|e| e.kind())
        }

        fn dio_as_output(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_dio(&mut self) -> Result<bool, Self::Error> {
            self.dio.is_high().map_err(|e| e.kind())
        }
    }
}

pub use embedded_hal_pins::EmbeddedHalPins;

#[cfg(feature = "embassy-rp")]
mod embassy_rp_pins {
    use core::convert::Infallible;
    use embassy_rp::gpio;

    /// [`super::Pins`] implementation using the Embassy RP HAL for the RP2040
    /// microcontroller, with the data line on a [`gpio::Flex`] pin so it can
    /// change direction during key scans.
    pub struct EmbassyRpPins<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin> {
        strobe: gpio::Output<'a, StrobePin>,
        clock: gpio::Output<'a, ClockPin>,
        dio: gpio::Flex<'a, DioPin>,
    }

    impl<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin>
        EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>
    {
        pub fn new(strobe: StrobePin, clock: ClockPin, dio: DioPin) -> Self {
            Self {
                strobe: gpio::Output::new(strobe, gpio::Level::High),
                clock: gpio::Output::new(clock, gpio::Level::High),
                dio: gpio::Flex::new(dio),
            }
        }
    }

    impl<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin> super::Pins
        for EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>
    {
        type Error = Infallible;

        fn configure(&mut self) -> Result<(), Self::Error> {
            self.dio.set_as_output();
            self.dio.set_low();
            self.strobe.set_high();
            self.clock.set_high();
            Ok(())
        }

        fn set_strobe(&mut self, high: bool) -> Result<(), Self::Error> {
            self.strobe.set_level(gpio::Level::from(high));
            Ok(())
        }

        fn set_clock(&mut self, high: bool) -> Result<(), Self::Error> {
            self.clock.set_level(gpio::Level::from(high));
            Ok(())
        }

        fn set_dio(&mut self, high: bool) -> Result<(), Self::Error> {
            self.dio.set_level(gpio::Level::from(high));
            Ok(())
        }

        fn dio_as_input(&mut self) -> Result<(), Self::Error> {
            self.dio.set_pull(gpio::Pull::Up);
            self.dio.set_as_input();
            Ok(())
        }

        fn dio_as_output(&mut self) -> Result<(), Self::Error> {
            self.dio.set_pull(gpio::Pull::None);
            self.dio.set_as_output();
            Ok(())
        }

        fn read_dio(&mut self) -> Result<bool, Self::Error> {
            Ok(self.dio.is_high())
        }
    }
}

#[cfg(feature = "embassy-rp")]
pub use embassy_rp_pins::EmbassyRpPins;
