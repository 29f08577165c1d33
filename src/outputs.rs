/*
 * The six signal lamp lines of the crossing.
 *
 * The control logic never touches a GPIO. It asks for a logical line to be
 * on or off through `SignalLines`, and the sink decides what that means
 * electrically. `PinBank` is the sink for real `embedded-hal` pins, and
 * takes care of lamps that are wired active-low. `LineStates` is the sink
 * for the simulation and the tests: it just remembers what was asked.
 */

use embedded_hal::digital::{OutputPin, PinState};
use enum_ordinalize::Ordinalize;

use crate::trafficlight::{HeadColor, Leg, SignalState};

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Pins {
    // Head 1, on leg A.
    ARed,
    AAmber,
    AGreen,

    // Head 2, on leg B.
    BRed,
    BAmber,
    BGreen,
}

impl Pins {
    pub fn for_head(leg: Leg, color: HeadColor) -> Pins {
        match (leg, color) {
            (Leg::A, HeadColor::Red) => Pins::ARed,
            (Leg::A, HeadColor::Yellow) => Pins::AAmber,
            (Leg::A, HeadColor::Green) => Pins::AGreen,
            (Leg::B, HeadColor::Red) => Pins::BRed,
            (Leg::B, HeadColor::Yellow) => Pins::BAmber,
            (Leg::B, HeadColor::Green) => Pins::BGreen,
        }
    }
}

pub trait SignalLines {
    fn set_line(&mut self, pin: Pins, on: bool);
}

fn all_off<L: SignalLines + ?Sized>(lines: &mut L) {
    for pin in Pins::VARIANTS.iter().copied() {
        lines.set_line(pin, false);
    }
}

/*
 * Everything goes dark first, then exactly one lamp per head comes on. There
 * is no moment where a head shows two colors.
 */
pub fn drive_heads<L: SignalLines + ?Sized>(lines: &mut L, state: SignalState) {
    all_off(lines);
    lines.set_line(Pins::for_head(Leg::A, state.head(Leg::A)), true);
    lines.set_line(Pins::for_head(Leg::B, state.head(Leg::B)), true);
}

pub fn drive_all_red<L: SignalLines + ?Sized>(lines: &mut L) {
    all_off(lines);
    lines.set_line(Pins::ARed, true);
    lines.set_line(Pins::BRed, true);
}

pub struct PinBank<P> {
    pins: [P; Pins::VARIANT_COUNT],
    active_lows: [bool; Pins::VARIANT_COUNT],
}

impl<P: OutputPin> PinBank<P> {
    /// `pins` and `active_lows` are indexed by `Pins` ordinal.
    pub fn new(pins: [P; Pins::VARIANT_COUNT], active_lows: [bool; Pins::VARIANT_COUNT]) -> Self {
        PinBank { pins, active_lows }
    }

    pub fn release(self) -> [P; Pins::VARIANT_COUNT] {
        self.pins
    }
}

impl<P: OutputPin> SignalLines for PinBank<P> {
    fn set_line(&mut self, pin: Pins, on: bool) {
        let i = pin.ordinal();
        let level = if self.active_lows[i] { !on } else { on };
        // A pin that refuses a level is a hardware fault, which nothing here
        // can recover from.
        let _ = self.pins[i].set_state(PinState::from(level));
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStates {
    on: [bool; Pins::VARIANT_COUNT],
}

impl LineStates {
    pub fn is_on(&self, pin: Pins) -> bool {
        self.on[pin.ordinal()]
    }

    pub fn lit_count(&self) -> usize {
        self.on.iter().filter(|on| **on).count()
    }

    /// The color shown by the head on `leg`, if exactly one of its lamps is lit.
    pub fn head(&self, leg: Leg) -> Option<HeadColor> {
        let mut shown = None;
        for color in [HeadColor::Red, HeadColor::Yellow, HeadColor::Green] {
            if self.is_on(Pins::for_head(leg, color)) {
                if shown.is_some() {
                    return None;
                }
                shown = Some(color);
            }
        }
        shown
    }
}

impl SignalLines for LineStates {
    fn set_line(&mut self, pin: Pins, on: bool) {
        self.on[pin.ordinal()] = on;
    }
}
