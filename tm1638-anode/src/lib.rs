//! Driver for TM1638 display-and-keypad controllers on common-anode boards.
//!
//! On these boards the LED matrix is wired transposed: an even display RAM
//! address does not hold one digit's segments, it holds one *segment plane* —
//! the state of a single segment across all 8 digits.  On top of that the two
//! 4-digit modules are daisy chained in reverse order and the segment rows
//! reach the chip through swapped nibbles.  This crate owns all of those
//! transforms, so callers deal in characters, text and button masks.
//!
//! The implementation is generalized over the bus protocol behind the
//! [`BusDriver`] trait, with a bit-banging implementation over any three GPIO
//! lines exposed through the [`Pins`] trait.  The most straightforward way to
//! instantiate the driver is [`Tm1638::builder`]:
//!
//! ```
//! # struct LoopbackPins;
//! # impl tm1638_anode::Pins for LoopbackPins {
//! #     type Error = core::convert::Infallible;
//! #     fn configure(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_strobe(&mut self, _high: bool) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_clock(&mut self, _high: bool) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_dio(&mut self, _high: bool) -> Result<(), Self::Error> { Ok(()) }
//! #     fn dio_as_input(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn dio_as_output(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn read_dio(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! let mut display = tm1638_anode::Tm1638::builder()
//!     .with_bit_banging_pins(LoopbackPins)
//!     .build()
//!     .unwrap();
//!
//! display.init().unwrap();
//! display.set_text("HELLO.42").unwrap();
//! ```
//!
//! Every operation is a complete, self-contained bus transaction; the driver
//! keeps no mirror of the display RAM and no addressing-mode state.  The bus
//! is a shared three-wire affair, so a controller instance must not be used
//! from more than one thread of execution without external serialization.

#![no_std]

#[cfg(test)]
extern crate std;

mod bus;
mod font;
mod keys;
mod text;

use core::num::NonZeroU8;

pub use bus::*;
pub use font::glyph;
pub use keys::*;
pub use text::rotate_nibbles;

/// Highest brightness level the chip supports.  [`Tm1638::init`] uses it as
/// the default; anything larger passed to [`Tm1638::enable`] saturates here.
pub const MAX_BRIGHTNESS: u8 = 7;

/// One byte per display RAM address; streaming all of it in auto-increment
/// mode blanks every digit and LED.
const BLANK_RAM: &[u8; 16] = &[0; 16];

/// Failures surfaced by the display operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The font has no segment pattern for this character.  Pre-validate
    /// text with [`glyph`] if failing is undesirable.
    #[display("no segment pattern for {_0:?}")]
    UnsupportedChar(char),

    /// The underlying pins reported a failure.
    #[display("bus error: {_0:?}")]
    Bus(E),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Builder entry point returned by [`Tm1638::builder`]; pick a transport.
pub struct Tm1638Builder;

impl Tm1638Builder {
    /// Use an arbitrary [`BusDriver`] implementation; nothing more needs to
    /// be specified.
    pub fn with_bus_driver<D: BusDriver>(self, driver: D) -> Tm1638BusBuilder<D> {
        Tm1638BusBuilder { driver }
    }

    /// Use the bit-banging transport, with an arbitrary implementation of
    /// [`Pins`] specific to your target platform.
    pub fn with_bit_banging_pins<P: Pins>(self, pins: P) -> Tm1638PinsBuilder<P> {
        Tm1638PinsBuilder { pins }
    }

    /// Use the bit-banging transport over the specified Embassy RP HAL pins.
    #[cfg(feature = "embassy-rp")]
    pub fn with_embassy_rp_pins<
        'a,
        StrobePin: embassy_rp::gpio::Pin,
        ClockPin: embassy_rp::gpio::Pin,
        DioPin: embassy_rp::gpio::Pin,
    >(
        self,
        strobe: StrobePin,
        clock: ClockPin,
        dio: DioPin,
    ) -> Tm1638PinsBuilder<EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>> {
        self.with_bit_banging_pins(EmbassyRpPins::new(strobe, clock, dio))
    }
}

pub struct Tm1638PinsBuilder<P: Pins> {
    pins: P,
}

impl<P: Pins> Tm1638PinsBuilder<P> {
    /// Construct the [`Tm1638`] instance using the bit-banging transport.
    ///
    /// This is fallible if the underlying I/O implementation is.
    pub fn build(self) -> Result<Tm1638<BitBangBus<P>>, P::Error> {
        Ok(Tm1638::new(BitBangBus::new(self.pins)?))
    }
}

pub struct Tm1638BusBuilder<D: BusDriver> {
    driver: D,
}

impl<D: BusDriver> Tm1638BusBuilder<D> {
    /// Construct the [`Tm1638`] instance using the selected driver.
    pub fn build(self) -> Tm1638<D> {
        Tm1638::new(self.driver)
    }
}

/// Driver for a common-anode TM1638 board: 8 digits, 8 LEDs, up to 24 keys.
pub struct Tm1638<Driver> {
    driver: Driver,
}

impl Tm1638<()> {
    /// Return a builder pattern implementation to ease some of the type
    /// parameter complexity around creating the bus driver.
    pub fn builder() -> Tm1638Builder {
        Tm1638Builder
    }
}

impl<Driver: BusDriver> Tm1638<Driver> {
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    /// Initialize the chip at maximum brightness, leaving every digit and
    /// LED blank.
    pub fn init(&mut self) -> Result<(), Error<Driver::Error>> {
        self.enable(MAX_BRIGHTNESS)
    }

    /// Initialize the chip: auto-increment data mode, display on at the
    /// requested `brightness` (saturating at [`MAX_BRIGHTNESS`]), and all 16
    /// display RAM bytes cleared.
    pub fn enable(&mut self, brightness: u8) -> Result<(), Error<Driver::Error>> {
        self.apply_write_command(WriteCommand::SetAutoIncrementAddressing)?;
        self.apply_write_command(WriteCommand::ActivateDisplay { brightness })?;
        self.apply_write_command(WriteCommand::WriteRange {
            start_address: 0,
            data: BLANK_RAM,
        })?;

        Ok(())
    }

    /// Turn the display outputs on at the given brightness without touching
    /// the RAM contents.
    pub fn activate_display(&mut self, brightness: u8) -> Result<(), Error<Driver::Error>> {
        self.apply_write_command(WriteCommand::ActivateDisplay { brightness })?;
        Ok(())
    }

    /// Turn the display outputs off.  The RAM contents survive and reappear
    /// on the next activation.
    pub fn deactivate_display(&mut self) -> Result<(), Error<Driver::Error>> {
        self.apply_write_command(WriteCommand::DeactivateDisplay)?;
        Ok(())
    }

    /// Blank the display state, including all digits and LEDs.
    pub fn blank_display(&mut self) -> Result<(), Error<Driver::Error>> {
        self.apply_write_command(WriteCommand::SetAutoIncrementAddressing)?;
        self.apply_write_command(WriteCommand::WriteRange {
            start_address: 0,
            data: BLANK_RAM,
        })?;

        Ok(())
    }

    /// Set the LED at `position` (`0` is leftmost) to `color`.
    ///
    /// Boards with single-color LEDs treat any non-zero value as "on";
    /// two-color boards use bits 0 and 1 for the two dies.
    pub fn set_led(&mut self, position: u8, color: u8) -> Result<(), Error<Driver::Error>> {
        self.apply_write_command(WriteCommand::SetFixedAddressing)?;
        self.apply_write_command(WriteCommand::WriteLed { position, color })?;
        Ok(())
    }

    /// Write a raw byte to the digit cell at `position`, forcing the decimal
    /// point bit on when `dot` is set.
    ///
    /// On this board family a cell is a segment plane, not a glyph; the
    /// higher-level [`Self::set_digit`] and [`Self::set_text`] are what
    /// callers usually want.
    pub fn set_char(&mut self, position: u8, mask: u8, dot: bool) -> Result<(), Error<Driver::Error>> {
        let mask = if dot { mask | 0x80 } else { mask };
        self.apply_write_command(WriteCommand::SetFixedAddressing)?;
        self.apply_write_command(WriteCommand::WriteCell { position, mask })?;
        Ok(())
    }

    /// Render one character at `position` (`0` is leftmost).
    ///
    /// Fails with [`Error::UnsupportedChar`] before touching the bus when the
    /// font has no pattern for `character`.  Otherwise issues one write per
    /// driven segment plane; note that this *replaces* each plane byte, so
    /// the other positions go dark — the board wiring offers no cheaper
    /// single-digit update.
    pub fn set_digit(
        &mut self,
        position: u8,
        character: char,
        dot: bool,
    ) -> Result<(), Error<Driver::Error>> {
        let pattern = font::glyph(character).ok_or(Error::UnsupportedChar(character))?;

        for plane in 0..6 {
            self.set_char(plane, text::bit_mask(position, pattern, plane), dot)?;
        }

        Ok(())
    }

    /// Render up to 8 characters of `source`, plus at most one decimal
    /// point.
    ///
    /// The text is right-aligned the way the original boards did it:
    /// truncated to 8 renderable characters, reversed, space-padded, and the
    /// two 4-character halves exchanged to match the reversed module chain.
    /// A `.` occupies no digit; it is translated through the board's
    /// non-linear dot wiring onto segment plane 7.  A dot that would land
    /// left of the display is dropped with a diagnostic while the rest of
    /// the text still renders.
    ///
    /// Fails with [`Error::UnsupportedChar`] on the first character without a
    /// font pattern; the dot plane has been written by then, the digit
    /// planes have not.
    pub fn set_text(&mut self, source: &str) -> Result<(), Error<Driver::Error>> {
        let mut dots = 0u8;
        if let Some(dot_index) = source.chars().position(|c| c == '.') {
            let rendered_len = source.chars().filter(|&c| c != '.').count();
            match text::dot_plane(dot_index, rendered_len) {
                Some(mask) => dots |= mask,
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "decimal point in {=str} falls left of the display, dropping it",
                        source
                    );
                }
            }
        }

        self.set_char(7, text::rotate_nibbles(dots), false)?;

        let cells = text::layout(source);
        let mut glyphs = [0u8; text::POSITIONS];
        for (slot, c) in glyphs.iter_mut().zip(cells) {
            if c != ' ' {
                *slot = font::glyph(c).ok_or(Error::UnsupportedChar(c))?;
            }
        }

        for plane in 0..7 {
            let row = text::row_plane(&glyphs, plane);
            self.set_char(plane, text::rotate_nibbles(row), false)?;
        }

        Ok(())
    }

    /// Read the raw key scan state from the controller.
    pub fn read_keys(&mut self) -> Result<Keys, Error<Driver::Error>> {
        let mut buffer = [0u8; keys::KEY_BYTES];

        self.apply_read_command(ReadCommand::ReadKeys, &mut buffer)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("keys = {:?}", buffer);

        Ok(Keys::new(buffer))
    }

    /// Poll the keypad and fold the scan bytes into the overlapping bitmask
    /// (see [`Keys::overlapping_bitmask`]).
    pub fn read_buttons(&mut self) -> Result<u32, Error<Driver::Error>> {
        Ok(self.read_keys()?.overlapping_bitmask())
    }

    /// Poll the keypad and concatenate the scan bytes into disjoint 8-bit
    /// groups (see [`Keys::concatenated_bitmask`]).
    pub fn read_buttons_wide(&mut self) -> Result<u32, Error<Driver::Error>> {
        Ok(self.read_keys()?.concatenated_bitmask())
    }

    /// Apply the command to the controller.
    fn apply_write_command(&mut self, command: WriteCommand<'_>) -> Result<(), Driver::Error> {
        let (command_byte, data_bytes) = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        if let Some(data_bytes) = data_bytes {
            self.driver.send_command_write_data(command_byte, data_bytes)
        } else {
            self.driver.send_command(command_byte)
        }
    }

    fn apply_read_command(
        &mut self,
        command: ReadCommand,
        read_buffer: &mut [u8],
    ) -> Result<(), Driver::Error> {
        let (command_byte, read_bytes) = command.encode();

        debug_assert!(read_bytes.get() as usize <= read_buffer.len());

        // Limit the read buffer to just the range needed to store these results
        let read_buffer = &mut read_buffer[0..read_bytes.get() as usize];

        self.driver.send_command_read_data(command_byte, read_buffer)
    }
}

/// Represents possible write-only commands sent to the TM1638 as Rust enums
/// for greater readability.
enum WriteCommand<'a> {
    /// Turn on the display outputs at the given brightness.
    ActivateDisplay {
        /// Brightness from 0 to 7; larger values saturate at 7.
        brightness: u8,
    },

    /// Turn off the display outputs.  The RAM contents are retained.
    DeactivateDisplay,

    /// Data mode in which the target address automatically increments after
    /// each written byte; used when streaming a full RAM image.
    SetAutoIncrementAddressing,

    /// Data mode in which every write names its target address explicitly.
    SetFixedAddressing,

    /// Write the LED byte for one position.  LEDs live at the odd addresses,
    /// interleaved with the digit cells.
    WriteLed { position: u8, color: u8 },

    /// Write the digit cell byte for one position (the even addresses).
    WriteCell { position: u8, mask: u8 },

    /// Write consecutive RAM bytes starting at `start_address`.  Only
    /// meaningful in auto-increment mode.
    WriteRange { start_address: u8, data: &'a [u8] },
}

impl<'a> WriteCommand<'a> {
    /// Convert this command into the appropriate byte sequence to send to the
    /// controller.
    ///
    /// Return value is a tuple consisting of the following:
    ///
    /// - Command byte to send to controller
    /// - (Optional) slice of data bytes to send along with command byte
    ///
    /// The command byte and data bytes (if any) are sent together, during a
    /// single interval in which the strobe pin is pulled low.
    fn encode<'me>(&'me self) -> (u8, Option<&'me [u8]>)
    where
        'a: 'me,
    {
        match self {
            WriteCommand::ActivateDisplay { brightness } => {
                // "Display on" is a single command byte with the brightness
                // in the lowest three bits
                (0b1000_1000 | (*brightness).min(MAX_BRIGHTNESS), None)
            }
            WriteCommand::DeactivateDisplay => (0b1000_0000, None),
            WriteCommand::SetAutoIncrementAddressing => (0b0100_0000, None),
            WriteCommand::SetFixedAddressing => (0b0100_0100, None),
            WriteCommand::WriteLed { position, color } => {
                debug_assert!(*position < 8);
                (
                    0b1100_0000 | (((position << 1) + 1) & 0b0000_1111),
                    Some(core::slice::from_ref(color)),
                )
            }
            WriteCommand::WriteCell { position, mask } => {
                debug_assert!(*position < 8);
                (
                    0b1100_0000 | ((position << 1) & 0b0000_1111),
                    Some(core::slice::from_ref(mask)),
                )
            }
            WriteCommand::WriteRange {
                start_address,
                data,
            } => {
                debug_assert!(*start_address as usize + data.len() <= 16);
                (
                    0b1100_0000 | (start_address & 0b0000_1111),
                    Some(data),
                )
            }
        }
    }
}

/// Represents possible read commands sent to the TM1638 which read data from
/// the controller.
enum ReadCommand {
    /// Request the controller to send four bytes of key scanning data
    /// reflecting the current state of the keys.
    ReadKeys,
}

impl ReadCommand {
    /// Convert this command into the command byte to send and the number of
    /// response bytes to read back, all within a single strobe-low interval.
    fn encode(&self) -> (u8, NonZeroU8) {
        match self {
            ReadCommand::ReadKeys => {
                const KEY_BYTES: NonZeroU8 = match NonZeroU8::new(keys::KEY_BYTES as u8) {
                    Some(n) => n,
                    None => panic!("key scan response is never empty"),
                };

                (0b0100_0010, KEY_BYTES)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Debug, PartialEq, Eq, Clone)]
    enum BusOp {
        Command(u8),
        Write(u8, Vec<u8>),
        Read(u8, usize),
    }

    #[derive(Default)]
    struct MockBus {
        ops: Vec<BusOp>,
        responses: VecDeque<u8>,
    }

    impl BusDriver for MockBus {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, b: u8) -> Result<(), Self::Error> {
            self.ops.push(BusOp::Command(b));
            Ok(())
        }

        fn send_command_write_data(&mut self, b: u8, data: &[u8]) -> Result<(), Self::Error> {
            self.ops.push(BusOp::Write(b, data.to_vec()));
            Ok(())
        }

        fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) -> Result<(), Self::Error> {
            for slot in data.iter_mut() {
                *slot = self.responses.pop_front().unwrap_or(0);
            }
            self.ops.push(BusOp::Read(b, data.len()));
            Ok(())
        }
    }

    fn controller() -> Tm1638<MockBus> {
        Tm1638::new(MockBus::default())
    }

    /// Pull the data byte out of the `index`th bus operation, asserting it is
    /// an addressed single-byte write to `address`.
    fn written_byte(ops: &[BusOp], index: usize, address: u8) -> u8 {
        match &ops[index] {
            BusOp::Write(cmd, data) if *cmd == (0xC0 | address) && data.len() == 1 => data[0],
            other => panic!("expected write to {address:#x}, got {other:?}"),
        }
    }

    #[test]
    fn init_clears_the_ram_at_maximum_brightness() {
        let mut tm = controller();
        tm.init().unwrap();

        assert_eq!(
            tm.driver.ops,
            [
                BusOp::Command(0x40),
                BusOp::Command(0x8F),
                BusOp::Write(0xC0, [0u8; 16].to_vec()),
            ]
        );
    }

    #[test]
    fn brightness_is_clamped_not_masked() {
        let mut tm = controller();
        tm.enable(99).unwrap();
        assert_eq!(tm.driver.ops[1], BusOp::Command(0x8F));

        tm.driver.ops.clear();
        tm.enable(2).unwrap();
        assert_eq!(tm.driver.ops[1], BusOp::Command(0x8A));
    }

    #[test]
    fn deactivate_is_a_bare_command() {
        let mut tm = controller();
        tm.deactivate_display().unwrap();
        assert_eq!(tm.driver.ops, [BusOp::Command(0x80)]);
    }

    #[test]
    fn blank_streams_sixteen_zeros() {
        let mut tm = controller();
        tm.blank_display().unwrap();
        assert_eq!(
            tm.driver.ops,
            [
                BusOp::Command(0x40),
                BusOp::Write(0xC0, [0u8; 16].to_vec()),
            ]
        );
    }

    #[test]
    fn leds_live_at_the_odd_addresses() {
        let mut tm = controller();
        tm.set_led(3, 1).unwrap();

        assert_eq!(
            tm.driver.ops,
            [BusOp::Command(0x44), BusOp::Write(0xC7, std::vec![1])]
        );
    }

    #[test]
    fn set_char_forces_the_dot_bit() {
        let mut tm = controller();
        tm.set_char(2, 0x3F, true).unwrap();

        assert_eq!(
            tm.driver.ops,
            [BusOp::Command(0x44), BusOp::Write(0xC4, std::vec![0xBF])]
        );
    }

    #[test]
    fn set_digit_planes_reassemble_the_font_pattern() {
        let mut tm = controller();
        tm.set_digit(2, '0', false).unwrap();

        // one fixed-addressing command and one write per driven plane
        assert_eq!(tm.driver.ops.len(), 12);

        let mut pattern = 0u8;
        for plane in 0..6u8 {
            assert_eq!(tm.driver.ops[plane as usize * 2], BusOp::Command(0x44));
            let byte = written_byte(&tm.driver.ops, plane as usize * 2 + 1, plane << 1);
            pattern |= ((byte >> 2) & 1) << plane;
        }

        assert_eq!(pattern, glyph('0').unwrap());
    }

    #[test]
    fn set_digit_dot_rides_along_in_every_plane() {
        let mut tm = controller();
        tm.set_digit(0, '1', true).unwrap();

        let bytes: Vec<u8> = (0..6u8)
            .map(|plane| written_byte(&tm.driver.ops, plane as usize * 2 + 1, plane << 1))
            .collect();

        // '1' is segments b and c (planes 1 and 2) at position 0, dot bit on top
        assert_eq!(bytes, [0x80, 0x81, 0x81, 0x80, 0x80, 0x80]);
    }

    #[test]
    fn set_digit_rejects_unknown_characters_before_writing() {
        let mut tm = controller();
        assert_eq!(
            tm.set_digit(0, '#', false),
            Err(Error::UnsupportedChar('#'))
        );
        assert!(tm.driver.ops.is_empty());
    }

    #[test]
    fn full_width_text_is_reversed_half_swapped_and_rotated() {
        let mut tm = controller();
        tm.set_text("12345678").unwrap();

        // dot plane first, always
        assert_eq!(tm.driver.ops[0], BusOp::Command(0x44));
        assert_eq!(tm.driver.ops[1], BusOp::Write(0xCE, std::vec![0x00]));

        // then the seven glyph planes of layout "4321" + "8765"
        let expected_rows = [0x6F, 0xF3, 0xBF, 0x6D, 0x45, 0x1D, 0x7D];
        for (plane, row) in expected_rows.iter().enumerate() {
            assert_eq!(tm.driver.ops[2 + plane * 2], BusOp::Command(0x44));
            assert_eq!(
                written_byte(&tm.driver.ops, 3 + plane * 2, (plane as u8) << 1),
                *row
            );
        }

        assert_eq!(tm.driver.ops.len(), 16);
    }

    #[test]
    fn decimal_point_resolves_through_the_nonlinear_map() {
        let mut tm = controller();
        tm.set_text("1.5").unwrap();

        // "1.5": dot index 1, 2 rendered characters, so the dot sits at
        // physical position 7 and its plane byte is 128 >> 3 = 16,
        // nibble-rotated on the way out
        assert_eq!(
            tm.driver.ops[1],
            BusOp::Write(0xCE, std::vec![rotate_nibbles(16)])
        );

        // "15" lands on positions 4 and 5 after the half swap
        assert_eq!(written_byte(&tm.driver.ops, 3, 0x00), 0x01);
        assert_eq!(written_byte(&tm.driver.ops, 5, 0x02), 0x02);
        assert_eq!(written_byte(&tm.driver.ops, 7, 0x04), 0x03);
    }

    #[test]
    fn unrenderable_dot_is_dropped_but_the_text_still_renders() {
        let mut tm = controller();
        tm.set_text(".123456789").unwrap();

        // the dot would land left of the display; plane 7 stays dark
        assert_eq!(tm.driver.ops[1], BusOp::Write(0xCE, std::vec![0x00]));
        // all seven glyph planes still went out
        assert_eq!(tm.driver.ops.len(), 16);
    }

    #[test]
    fn unknown_character_in_text_faults_after_the_dot_write() {
        let mut tm = controller();
        assert_eq!(tm.set_text("1#5"), Err(Error::UnsupportedChar('#')));

        // the plane-7 transaction already happened, no glyph plane did
        assert_eq!(
            tm.driver.ops,
            [BusOp::Command(0x44), BusOp::Write(0xCE, std::vec![0x00])]
        );
    }

    #[test]
    fn empty_text_blanks_all_planes() {
        let mut tm = controller();
        tm.set_text("").unwrap();

        assert_eq!(tm.driver.ops.len(), 16);
        // dot plane, then the seven glyph planes, all zero
        assert_eq!(written_byte(&tm.driver.ops, 1, 0x0E), 0);
        for plane in 0..7u8 {
            assert_eq!(
                written_byte(&tm.driver.ops, plane as usize * 2 + 3, plane << 1),
                0
            );
        }
    }

    #[test]
    fn key_scan_is_one_read_transaction() {
        let mut tm = controller();
        tm.driver.responses = VecDeque::from([0x01, 0x02, 0x04, 0x08]);

        let keys = tm.read_keys().unwrap();

        assert_eq!(tm.driver.ops, [BusOp::Read(0x42, 4)]);
        let raw: &[u8] = keys.as_ref();
        assert_eq!(raw, [0x01, 0x02, 0x04, 0x08]);
    }

    #[test]
    fn button_masks_combine_the_two_documented_ways() {
        let mut tm = controller();
        tm.driver.responses = VecDeque::from([0x01, 0x02, 0x04, 0x08]);
        assert_eq!(tm.read_buttons().unwrap(), 0x55);

        tm.driver.responses = VecDeque::from([0x01, 0x02, 0x04, 0x08]);
        assert_eq!(tm.read_buttons_wide().unwrap(), 0x0804_0201);
    }

    #[test]
    fn builder_accepts_a_custom_bus_driver() {
        let mut tm = Tm1638::builder().with_bus_driver(MockBus::default()).build();
        tm.deactivate_display().unwrap();
        assert_eq!(tm.driver.ops, [BusOp::Command(0x80)]);
    }
}
