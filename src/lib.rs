#![cfg_attr(not(test), no_std)]

/*
 * Control logic for a two-leg traffic crossing with a speed trap and a
 * roadside billboard. Nothing in this library touches the hardware
 * directly: time, lamp lines and the display are passed in, so the same
 * code runs in the firmware, in the host simulation and in the tests.
 */

pub mod billboard;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod lcd;
pub mod outputs;
pub mod speedtrap;
pub mod trafficlight;

pub use clock::{Clock, ManualClock};
pub use config::Config;
pub use controller::Controller;
pub use speedtrap::{EdgeOutcome, Sensor, SensorEdge};
pub use trafficlight::{HeadColor, Leg, SignalState};
