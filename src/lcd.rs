/*
 * HD44780 (LCD1602) character display on a 4-bit parallel bus: RS, EN and
 * D4..D7, with RW tied to ground. Every byte goes over as two nibbles, high
 * nibble first, latched on the falling edge of EN.
 *
 * The driver is generic over `embedded-hal` pins and an async delay so that
 * the bus protocol can be checked on the host.
 */

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::display::{COLUMNS, Frame, ROWS};

pub mod commands {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_DDRAM_ADDR: u8 = 0x80;

    pub const ENTRY_LEFT: u8 = 0x02;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const TWO_LINE: u8 = 0x08;
    pub const FONT_5X8: u8 = 0x00;
}

// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40];

pub struct Lcd1602<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Lcd1602<P, D> {
    /// `data` is D4, D5, D6, D7.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Lcd1602 { rs, en, data, delay }
    }

    /*
     * The power-on sequence from the datasheet. The controller may come up in
     * either bus width, so it is forced into 8-bit mode three times before
     * being switched to 4-bit.
     */
    pub async fn init(&mut self) -> Result<(), P::Error> {
        self.delay.delay_ms(50).await;

        self.send_nibble(0x03, false).await?;
        self.delay.delay_ms(5).await;
        self.send_nibble(0x03, false).await?;
        self.delay.delay_ms(1).await;
        self.send_nibble(0x03, false).await?;
        self.delay.delay_ms(1).await;
        self.send_nibble(0x02, false).await?;
        self.delay.delay_ms(1).await;

        self.command(commands::FUNCTION_SET | commands::TWO_LINE | commands::FONT_5X8)
            .await?;
        self.command(commands::DISPLAY_CONTROL | commands::DISPLAY_ON)
            .await?;
        self.clear().await?;
        self.command(commands::ENTRY_MODE_SET | commands::ENTRY_LEFT)
            .await
    }

    pub async fn clear(&mut self) -> Result<(), P::Error> {
        self.send_byte(commands::CLEAR_DISPLAY, false).await?;
        self.delay.delay_ms(2).await;
        Ok(())
    }

    pub async fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), P::Error> {
        let row = (row as usize).min(ROWS - 1);
        let col = col.min(COLUMNS as u8 - 1);
        self.command(commands::SET_DDRAM_ADDR | (ROW_OFFSETS[row] + col))
            .await
    }

    pub async fn print(&mut self, text: &str) -> Result<(), P::Error> {
        for byte in text.bytes() {
            self.send_byte(byte, true).await?;
        }
        Ok(())
    }

    /// Overwrite the whole panel with `frame`. Full rows are written, so no
    /// clear is needed and the panel does not blank in between.
    pub async fn show(&mut self, frame: &Frame) -> Result<(), P::Error> {
        for row in 0..ROWS {
            self.set_cursor(0, row as u8).await?;
            for byte in frame.row(row) {
                self.send_byte(*byte, true).await?;
            }
        }
        Ok(())
    }

    async fn command(&mut self, command: u8) -> Result<(), P::Error> {
        self.send_byte(command, false).await
    }

    async fn send_byte(&mut self, value: u8, rs: bool) -> Result<(), P::Error> {
        self.send_nibble(value >> 4, rs).await?;
        self.send_nibble(value & 0x0F, rs).await
    }

    async fn send_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), P::Error> {
        self.rs.set_state(rs.into())?;
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state((nibble & (1 << bit) != 0).into())?;
        }

        self.en.set_high()?;
        self.delay.delay_us(1).await;
        self.en.set_low()?;
        // longest regular instruction is 37 us
        self.delay.delay_us(50).await;
        Ok(())
    }
}
