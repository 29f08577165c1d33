/*
 * Everything the main loop owns: the signal timer, the speed trap and the
 * billboard. There is no global state; the firmware and the simulation each
 * keep one `Controller` and hand it the clock, the lamp lines and the
 * display.
 */

use crate::billboard::Billboard;
use crate::clock::Clock;
use crate::config::Config;
use crate::display::TextDisplay;
use crate::outputs::{SignalLines, drive_all_red, drive_heads};
use crate::speedtrap::{EdgeOutcome, SensorEdge, SpeedTrap};
use crate::trafficlight::{SignalState, SignalTimer};

pub const SPLASH: [&str; 2] = ["Traffic System", "Initializing..."];

#[derive(Debug)]
pub struct Controller {
    config: Config,
    signals: SignalTimer,
    trap: SpeedTrap,
    billboard: Billboard,
}

impl Controller {
    pub fn new(config: &Config) -> Self {
        Controller {
            config: *config,
            signals: SignalTimer::new(config),
            trap: SpeedTrap::new(config.sensor_distance_m),
            billboard: Billboard::new(config),
        }
    }

    /// Both heads red and the splash screen, to be held for
    /// `Config::boot_hold_ms` before `start`.
    pub fn boot<L, D>(&mut self, lines: &mut L, display: &mut D)
    where
        L: SignalLines + ?Sized,
        D: TextDisplay + ?Sized,
    {
        drive_all_red(lines);
        display.clear();
        display.write_at(0, 0, SPLASH[0]);
        display.write_at(0, 1, SPLASH[1]);
    }

    /// First green for leg A and the first billboard message, as of `now_ms`.
    pub fn start<L, D>(&mut self, now_ms: u64, lines: &mut L, display: &mut D)
    where
        L: SignalLines + ?Sized,
        D: TextDisplay + ?Sized,
    {
        self.signals.restart(now_ms);
        drive_heads(lines, self.signals.state());
        self.billboard.start(now_ms, display);
    }

    pub fn on_edge(&mut self, edge: SensorEdge) -> EdgeOutcome {
        let outcome = self.trap.on_edge(edge);
        if let EdgeOutcome::Measured(kmh) = outcome {
            self.billboard.show_speed(kmh);
        }
        outcome
    }

    /*
     * One pass of the main loop. The clock is read once so that the signals
     * and the billboard agree on the time. Returns the new signal state if
     * the heads changed.
     */
    pub fn poll<C, L, D>(&mut self, clock: &C, lines: &mut L, display: &mut D) -> Option<SignalState>
    where
        C: Clock + ?Sized,
        L: SignalLines + ?Sized,
        D: TextDisplay + ?Sized,
    {
        let now_ms = clock.now_ms();

        let transition = self.signals.advance(now_ms);
        if let Some(state) = transition {
            drive_heads(lines, state);
        }

        self.billboard.tick(now_ms, display);
        transition
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn signal_state(&self) -> SignalState {
        self.signals.state()
    }

    pub fn signals(&self) -> &SignalTimer {
        &self.signals
    }

    pub fn speed_trap(&self) -> &SpeedTrap {
        &self.trap
    }

    pub fn billboard(&self) -> &Billboard {
        &self.billboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billboard::{GREETING, MESSAGES, Mode, SPEED_HEADING};
    use crate::clock::ManualClock;
    use crate::display::FrameBuffer;
    use crate::outputs::LineStates;
    use crate::speedtrap::Sensor;
    use crate::trafficlight::{HeadColor, Leg};

    struct Rig {
        controller: Controller,
        clock: ManualClock,
        lines: LineStates,
        display: FrameBuffer,
    }

    impl Rig {
        fn started() -> Self {
            let mut rig = Rig {
                controller: Controller::new(&Config::DEFAULT),
                clock: ManualClock::new(0),
                lines: LineStates::default(),
                display: FrameBuffer::new(),
            };
            rig.controller.start(0, &mut rig.lines, &mut rig.display);
            rig
        }

        fn poll_at(&mut self, now_ms: u64) -> Option<SignalState> {
            self.clock.set(now_ms);
            self.controller
                .poll(&self.clock, &mut self.lines, &mut self.display)
        }

        fn edge(&mut self, sensor: Sensor, at_ms: u64) -> EdgeOutcome {
            self.controller.on_edge(SensorEdge { sensor, at_ms })
        }
    }

    #[test]
    fn fresh_controller_is_phase1_green_at_zero() {
        let controller = Controller::new(&Config::DEFAULT);
        assert_eq!(controller.signal_state(), SignalState::Phase1Green);
        assert_eq!(controller.signals().state_entered_at_ms(), 0);
        assert_eq!(controller.billboard().mode(), Mode::Messages);
    }

    #[test]
    fn boot_shows_all_red_and_the_splash() {
        let mut controller = Controller::new(&Config::DEFAULT);
        let mut lines = LineStates::default();
        let mut display = FrameBuffer::new();
        controller.boot(&mut lines, &mut display);

        assert_eq!(lines.head(Leg::A), Some(HeadColor::Red));
        assert_eq!(lines.head(Leg::B), Some(HeadColor::Red));
        let frame = display.take_frame().unwrap();
        assert_eq!(frame.row_text(0), "Traffic System");
        assert_eq!(frame.row_text(1), "Initializing...");
    }

    #[test]
    fn start_after_the_boot_hold() {
        let mut controller = Controller::new(&Config::DEFAULT);
        let mut lines = LineStates::default();
        let mut display = FrameBuffer::new();
        let clock = ManualClock::new(0);
        controller.boot(&mut lines, &mut display);

        clock.set(controller.config().boot_hold_ms);
        controller.start(clock.now_ms(), &mut lines, &mut display);

        assert_eq!(lines.head(Leg::A), Some(HeadColor::Green));
        assert_eq!(lines.head(Leg::B), Some(HeadColor::Red));
        assert_eq!(controller.signals().state_entered_at_ms(), 2_000);
        assert_eq!(display.take_frame().unwrap().row_text(0), GREETING);

        // green is timed from the start, not from power-on
        clock.set(11_999);
        assert_eq!(controller.poll(&clock, &mut lines, &mut display), None);
        clock.set(12_000);
        assert_eq!(
            controller.poll(&clock, &mut lines, &mut display),
            Some(SignalState::Phase1Yellow)
        );
    }

    #[test]
    fn full_cycle_drives_the_heads() {
        let mut rig = Rig::started();
        let timeline = [
            (10_000, SignalState::Phase1Yellow, HeadColor::Yellow, HeadColor::Red),
            (13_000, SignalState::Phase1Red, HeadColor::Red, HeadColor::Red),
            (15_000, SignalState::Phase2Green, HeadColor::Red, HeadColor::Green),
            (25_000, SignalState::Phase2Yellow, HeadColor::Red, HeadColor::Yellow),
            (28_000, SignalState::Phase2Red, HeadColor::Red, HeadColor::Red),
            (30_000, SignalState::Phase1Green, HeadColor::Green, HeadColor::Red),
        ];

        for (now, state, head1, head2) in timeline {
            assert_eq!(rig.poll_at(now - 1), None);
            assert_eq!(rig.poll_at(now), Some(state));
            assert_eq!(rig.lines.head(Leg::A), Some(head1));
            assert_eq!(rig.lines.head(Leg::B), Some(head2));
            assert_eq!(rig.lines.lit_count(), 2);
        }
    }

    #[test]
    fn heads_are_never_both_green_while_polling() {
        let mut rig = Rig::started();
        for now in (0..=65_000).step_by(10) {
            rig.poll_at(now);
            let both_green = rig.lines.head(Leg::A) == Some(HeadColor::Green)
                && rig.lines.head(Leg::B) == Some(HeadColor::Green);
            assert!(!both_green, "both legs green at {now} ms");
        }
    }

    #[test]
    fn vehicle_reading_interrupts_the_billboard() {
        let mut rig = Rig::started();
        let _ = rig.display.take_frame();

        assert_eq!(rig.edge(Sensor::First, 3_000), EdgeOutcome::Armed);
        match rig.edge(Sensor::Second, 3_200) {
            EdgeOutcome::Measured(kmh) => assert!((kmh - 18.0).abs() < 1e-4, "got {kmh}"),
            other => panic!("expected a measurement, got {other:?}"),
        }
        rig.poll_at(3_210);

        let frame = rig.display.take_frame().unwrap();
        assert_eq!(frame.row_text(0), SPEED_HEADING);
        assert_eq!(frame.row_text(1), "18.0 km/h");

        // message due at 5 s is held back by the reading
        rig.poll_at(5_000);
        assert_eq!(rig.controller.billboard().current_message(), 0);
        assert_eq!(rig.display.take_frame(), None);

        rig.poll_at(8_210);
        assert_eq!(rig.controller.billboard().mode(), Mode::Messages);
        rig.poll_at(8_220);
        assert_eq!(rig.controller.billboard().current_message(), 1);
        assert_eq!(rig.display.take_frame().unwrap().row_text(1), MESSAGES[1]);
    }

    #[test]
    fn stray_second_edge_changes_nothing() {
        let mut rig = Rig::started();
        let _ = rig.display.take_frame();

        assert_eq!(rig.edge(Sensor::Second, 1_000), EdgeOutcome::Ignored);
        assert_eq!(rig.controller.speed_trap().result_kmh(), 0.0);
        assert_eq!(rig.controller.billboard().mode(), Mode::Messages);

        rig.poll_at(1_010);
        assert_eq!(rig.display.take_frame(), None);
    }

    #[test]
    fn signals_keep_cycling_during_a_reading() {
        let mut rig = Rig::started();
        rig.edge(Sensor::First, 9_000);
        rig.edge(Sensor::Second, 9_500);
        rig.poll_at(9_510);
        assert_eq!(rig.poll_at(10_000), Some(SignalState::Phase1Yellow));
        assert_eq!(rig.controller.billboard().mode(), Mode::Speed);
    }
}
