/*
 * Host-side run of the crossing. The clock is stepped by hand, the lamps and
 * the display are in memory, and the sensor edges come from a script of
 * passing vehicles. Everything the firmware would log goes to stdout, plus
 * every frame the LCD would show.
 */

use despi_m02_speedtrap::{
    Clock, Config, Controller, EdgeOutcome, Leg, ManualClock, Sensor, SensorEdge,
    display::FrameBuffer, outputs::LineStates,
};

const STEP_MS: u64 = 10;
const RUN_MS: u64 = 65_000;

// Sorted by time.
const EDGES: [SensorEdge; 5] = [
    // 50 km/h
    SensorEdge {
        sensor: Sensor::First,
        at_ms: 20_000,
    },
    SensorEdge {
        sensor: Sensor::Second,
        at_ms: 20_072,
    },
    // a second barrier with nobody in the trap
    SensorEdge {
        sensor: Sensor::Second,
        at_ms: 33_000,
    },
    // 14.4 km/h
    SensorEdge {
        sensor: Sensor::First,
        at_ms: 41_000,
    },
    SensorEdge {
        sensor: Sensor::Second,
        at_ms: 41_250,
    },
];

pub fn run() {
    let config = Config::DEFAULT;
    let clock = ManualClock::new(0);
    let mut controller = Controller::new(&config);
    let mut lines = LineStates::default();
    let mut display = FrameBuffer::new();

    controller.boot(&mut lines, &mut display);
    print_frame(&clock, &mut display);

    clock.advance(config.boot_hold_ms);
    controller.start(clock.now_ms(), &mut lines, &mut display);
    print_heads(&clock, &controller, &lines);
    print_frame(&clock, &mut display);

    let mut pending = EDGES.iter().peekable();
    while clock.now_ms() < RUN_MS {
        clock.advance(STEP_MS);

        while let Some(edge) = pending.next_if(|edge| edge.at_ms <= clock.now_ms()) {
            match controller.on_edge(*edge) {
                EdgeOutcome::Armed => println!("[{:>6}] first sensor triggered", edge.at_ms),
                EdgeOutcome::Measured(kmh) => {
                    println!("[{:>6}] speed: {:.1} km/h", edge.at_ms, kmh)
                }
                EdgeOutcome::Ignored => {
                    println!("[{:>6}] second sensor without first, ignored", edge.at_ms)
                }
            }
        }

        if controller
            .poll(&clock, &mut lines, &mut display)
            .is_some()
        {
            print_heads(&clock, &controller, &lines);
        }
        print_frame(&clock, &mut display);
    }
}

fn print_heads(clock: &ManualClock, controller: &Controller, lines: &LineStates) {
    println!(
        "[{:>6}] signal state -> {:?} (head 1 {:?}, head 2 {:?})",
        clock.now_ms(),
        controller.signal_state(),
        lines.head(Leg::A),
        lines.head(Leg::B),
    );
}

fn print_frame(clock: &ManualClock, display: &mut FrameBuffer) {
    if let Some(frame) = display.take_frame() {
        println!(
            "[{:>6}] lcd |{}|{}|",
            clock.now_ms(),
            frame.row_text(0),
            frame.row_text(1)
        );
    }
}
