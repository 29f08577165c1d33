/*
 * The roadside billboard: a fixed rotation of messages under a greeting,
 * interrupted for a few seconds whenever the speed trap has a reading.
 *
 * Drawing only happens when the text changes. Redrawing the same text every
 * loop makes the LCD flicker.
 */

use core::fmt::Write;

use heapless::String;

use crate::config::Config;
use crate::display::{COLUMNS, TextDisplay};

pub const GREETING: &str = "Welcome to City";
pub const MESSAGES: [&str; 4] = [
    "Drive Safely",
    "Buckle Up!",
    "Don't Text & Drive",
    "Speed Limit 50",
];
pub const SPEED_HEADING: &str = "Vehicle Speed:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Messages,
    Speed,
}

#[derive(Debug)]
pub struct Billboard {
    current_message: usize,
    last_message_change_ms: u64,
    speed_display_active: bool,
    // `None` until the reading of the current episode has been drawn.
    speed_display_started_ms: Option<u64>,
    speed_kmh: f32,
    message_interval_ms: u64,
    speed_window_ms: u64,
}

impl Billboard {
    pub fn new(config: &Config) -> Self {
        Billboard {
            current_message: 0,
            last_message_change_ms: 0,
            speed_display_active: false,
            speed_display_started_ms: None,
            speed_kmh: 0.0,
            message_interval_ms: config.message_interval_ms,
            speed_window_ms: config.speed_window_ms,
        }
    }

    /// Show the first message as of `now_ms`.
    pub fn start<D: TextDisplay + ?Sized>(&mut self, now_ms: u64, display: &mut D) {
        self.current_message = 0;
        self.last_message_change_ms = now_ms;
        self.draw_message(display);
    }

    /*
     * Queue a reading for display. It is drawn on the next tick. While a
     * reading is already on screen, a newer one is stored but neither redrawn
     * nor given a window of its own.
     */
    pub fn show_speed(&mut self, kmh: f32) {
        self.speed_kmh = kmh;
        self.speed_display_active = true;
    }

    /// Returns whether anything was drawn.
    pub fn tick<D: TextDisplay + ?Sized>(&mut self, now_ms: u64, display: &mut D) -> bool {
        if self.speed_display_active {
            let mut drew = false;
            let started_ms = match self.speed_display_started_ms {
                Some(started_ms) => started_ms,
                None => {
                    self.draw_speed(display);
                    self.speed_display_started_ms = Some(now_ms);
                    drew = true;
                    now_ms
                }
            };

            if now_ms.saturating_sub(started_ms) >= self.speed_window_ms {
                self.speed_display_active = false;
                self.speed_display_started_ms = None;
            }
            return drew;
        }

        // Timed from the last message change, which is not moved by a speed
        // episode: the first message after a reading can come early.
        if now_ms.saturating_sub(self.last_message_change_ms) < self.message_interval_ms {
            return false;
        }

        self.current_message = (self.current_message + 1) % MESSAGES.len();
        self.draw_message(display);
        self.last_message_change_ms = now_ms;
        true
    }

    pub fn mode(&self) -> Mode {
        if self.speed_display_active {
            Mode::Speed
        } else {
            Mode::Messages
        }
    }

    pub fn current_message(&self) -> usize {
        self.current_message
    }

    pub fn last_message_change_ms(&self) -> u64 {
        self.last_message_change_ms
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed_kmh
    }

    fn draw_message<D: TextDisplay + ?Sized>(&self, display: &mut D) {
        display.clear();
        display.write_at(0, 0, GREETING);
        display.write_at(0, 1, MESSAGES[self.current_message]);
    }

    fn draw_speed<D: TextDisplay + ?Sized>(&self, display: &mut D) {
        let mut reading: String<COLUMNS> = String::new();
        // out of range readings are cut short rather than dropped
        let _ = write!(reading, "{:.1} km/h", self.speed_kmh);

        display.clear();
        display.write_at(0, 0, SPEED_HEADING);
        display.write_at(0, 1, &reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::FrameBuffer;

    fn started_at(now_ms: u64) -> (Billboard, FrameBuffer) {
        let mut billboard = Billboard::new(&Config::DEFAULT);
        let mut display = FrameBuffer::new();
        billboard.start(now_ms, &mut display);
        (billboard, display)
    }

    #[test]
    fn start_draws_the_first_message() {
        let (billboard, mut display) = started_at(2_000);
        let frame = display.take_frame().unwrap();
        assert_eq!(frame.row_text(0), GREETING);
        assert_eq!(frame.row_text(1), "Drive Safely");
        assert_eq!(billboard.current_message(), 0);
        assert_eq!(billboard.mode(), Mode::Messages);
    }

    #[test]
    fn messages_rotate_every_five_seconds() {
        let (mut billboard, mut display) = started_at(0);
        let _ = display.take_frame();

        for (i, now) in (1..=8u64).map(|n| n * 5_000).enumerate() {
            assert!(!billboard.tick(now - 1, &mut display));
            assert_eq!(display.take_frame(), None);

            assert!(billboard.tick(now, &mut display));
            let expected = (i + 1) % MESSAGES.len();
            assert_eq!(billboard.current_message(), expected);
            let frame = display.take_frame().unwrap();
            assert_eq!(frame.row_text(0), GREETING);
            assert_eq!(frame.row_text(1), &MESSAGES[expected][..MESSAGES[expected].len().min(COLUMNS)]);
        }
    }

    #[test]
    fn speed_is_drawn_once_with_one_decimal() {
        let (mut billboard, mut display) = started_at(0);
        let _ = display.take_frame();

        billboard.show_speed(3.6);
        assert_eq!(billboard.mode(), Mode::Speed);
        assert!(billboard.tick(1_000, &mut display));
        let frame = display.take_frame().unwrap();
        assert_eq!(frame.row_text(0), SPEED_HEADING);
        assert_eq!(frame.row_text(1), "3.6 km/h");

        assert!(!billboard.tick(1_010, &mut display));
        assert_eq!(display.take_frame(), None);
    }

    #[test]
    fn speed_window_suspends_the_rotation() {
        let (mut billboard, mut display) = started_at(0);
        billboard.show_speed(42.0);
        billboard.tick(1_000, &mut display);

        // 5 s after the last message change, but the reading is still up
        assert!(!billboard.tick(5_000, &mut display));
        assert_eq!(billboard.current_message(), 0);
        assert_eq!(billboard.mode(), Mode::Speed);

        // window over
        assert!(!billboard.tick(6_000, &mut display));
        assert_eq!(billboard.mode(), Mode::Messages);
        assert_eq!(billboard.current_message(), 0);
    }

    #[test]
    fn rotation_resumes_from_the_old_message_time() {
        let (mut billboard, mut display) = started_at(0);
        billboard.show_speed(42.0);
        billboard.tick(4_000, &mut display);
        billboard.tick(9_000, &mut display);
        assert_eq!(billboard.mode(), Mode::Messages);
        let _ = display.take_frame();

        // 9 s since the last change: the next message is due right away
        assert!(billboard.tick(9_010, &mut display));
        assert_eq!(billboard.current_message(), 1);
        assert_eq!(billboard.last_message_change_ms(), 9_010);
        assert_eq!(display.take_frame().unwrap().row_text(1), "Buckle Up!");
    }

    #[test]
    fn newer_reading_during_the_window_is_not_redrawn() {
        let (mut billboard, mut display) = started_at(0);
        billboard.show_speed(20.0);
        billboard.tick(1_000, &mut display);
        let _ = display.take_frame();

        billboard.show_speed(30.0);
        assert!(!billboard.tick(2_000, &mut display));
        assert_eq!(display.take_frame(), None);
        assert_eq!(billboard.speed_kmh(), 30.0);

        // the window still closes five seconds after the first reading
        billboard.tick(6_000, &mut display);
        assert_eq!(billboard.mode(), Mode::Messages);
    }

    #[test]
    fn reading_after_the_window_starts_a_new_episode() {
        let (mut billboard, mut display) = started_at(0);
        billboard.show_speed(20.0);
        billboard.tick(1_000, &mut display);
        billboard.tick(6_000, &mut display);
        let _ = display.take_frame();

        billboard.show_speed(12.3);
        assert!(billboard.tick(6_010, &mut display));
        assert_eq!(display.take_frame().unwrap().row_text(1), "12.3 km/h");
        assert!(!billboard.tick(11_009, &mut display));
        assert_eq!(billboard.mode(), Mode::Speed);
        billboard.tick(11_010, &mut display);
        assert_eq!(billboard.mode(), Mode::Messages);
    }
}
