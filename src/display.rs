/*
 * The two-row character display, as seen by the billboard.
 *
 * Writing to the LCD takes milliseconds, far too long for the control loop.
 * The loop draws into a `FrameBuffer` instead, and whoever owns the panel
 * picks up finished frames with `take_frame`.
 */

pub const COLUMNS: usize = 16;
pub const ROWS: usize = 2;

pub trait TextDisplay {
    fn clear(&mut self);
    /// Text that runs past the last column is cut off.
    fn write_at(&mut self, col: u8, row: u8, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    cells: [[u8; COLUMNS]; ROWS],
}

impl Frame {
    pub const fn blank() -> Self {
        Frame {
            cells: [[b' '; COLUMNS]; ROWS],
        }
    }

    pub fn row(&self, row: usize) -> &[u8; COLUMNS] {
        &self.cells[row]
    }

    /// Row text without the trailing padding.
    pub fn row_text(&self, row: usize) -> &str {
        let cells = &self.cells[row];
        let len = cells.iter().rposition(|c| *c != b' ').map_or(0, |i| i + 1);
        // only ASCII is ever stored
        core::str::from_utf8(&cells[..len]).unwrap_or("")
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::blank()
    }
}

#[derive(Debug, Default)]
pub struct FrameBuffer {
    frame: Frame,
    dirty: bool,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        FrameBuffer {
            frame: Frame::blank(),
            dirty: false,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The current frame, if anything was drawn since the last call.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.frame)
    }
}

impl TextDisplay for FrameBuffer {
    fn clear(&mut self) {
        self.frame = Frame::blank();
        self.dirty = true;
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let (col, row) = (col as usize, row as usize);
        if row >= ROWS || col >= COLUMNS {
            return;
        }

        let cells = &mut self.frame.cells[row][col..];
        for (cell, c) in cells.iter_mut().zip(text.chars()) {
            // the panel's character ROM is ASCII
            *cell = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
        }
        self.dirty = true;
    }
}
