/*
 * The I/O module for the crossing.
 *
 * This is the only part of the program that is device-specific. It owns the
 * pin assignments of the DESPI-M02 board and the embassy tasks that talk to
 * slow or asynchronous hardware:
 *
 * - one task per speed trap sensor, which timestamps falling edges and
 *   queues them for the main loop,
 * - the LCD task, which draws whatever frame the main loop last published,
 * - the console task, which writes log lines to USART1.
 *
 * The main loop itself never waits on any of these; it only uses the
 * non-blocking ends of the queues.
 */

use core::fmt::Write;

use despi_m02_speedtrap::{
    Clock, Sensor, SensorEdge,
    display::{Frame, FrameBuffer},
    lcd::Lcd1602,
    outputs::Pins,
};
use embassy_stm32::{exti::ExtiInput, gpio::Output, mode::Async, usart::Uart};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex, channel::Channel, signal::Signal,
};
use embassy_time::{Delay, Instant};
use enum_ordinalize::Ordinalize;
use heapless::String;

pub const EDGE_QUEUE_DEPTH: usize = 8;
pub const CONSOLE_QUEUE_DEPTH: usize = 8;
pub const CONSOLE_LINE_LENGTH: usize = 64;

// The lamps on this board are driven active-high.
pub const ACTIVE_LOWS: [bool; Pins::VARIANT_COUNT] = [false; Pins::VARIANT_COUNT];

type ConsoleLine = String<CONSOLE_LINE_LENGTH>;

pub static EDGES: Channel<ThreadModeRawMutex, SensorEdge, EDGE_QUEUE_DEPTH> = Channel::new();
static FRAMES: Signal<ThreadModeRawMutex, Frame> = Signal::new();
static CONSOLE: Channel<ThreadModeRawMutex, ConsoleLine, CONSOLE_QUEUE_DEPTH> = Channel::new();

pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/*
 * Queue a line for the serial console. Never waits: if the console is
 * behind, the line is dropped. Overlong lines are cut short.
 */
pub fn log(args: core::fmt::Arguments) {
    let mut line = ConsoleLine::new();
    let _ = line.write_fmt(args);
    let _ = line.push_str("\r\n");
    let _ = CONSOLE.try_send(line);
}

/// Hand the frame to the LCD task if anything was drawn. Only the latest
/// frame matters, an older one still waiting is replaced.
pub fn publish(frame_buffer: &mut FrameBuffer) {
    if let Some(frame) = frame_buffer.take_frame() {
        FRAMES.signal(frame);
    }
}

#[embassy_executor::task(pool_size = 2)]
pub async fn sensor_task(sensor: Sensor, mut input: ExtiInput<'static>) -> ! {
    loop {
        // the barrier is active-low: falling edge is "vehicle has passed"
        input.wait_for_falling_edge().await;

        let edge = SensorEdge {
            sensor,
            at_ms: Instant::now().as_millis(),
        };
        if EDGES.try_send(edge).is_err() {
            log(format_args!("edge queue full, dropped {:?}", edge));
        }
    }
}

#[embassy_executor::task]
pub async fn lcd_task(mut lcd: Lcd1602<Output<'static>, Delay>) -> ! {
    if lcd.init().await.is_err() {
        log(format_args!("lcd init failed"));
    }

    loop {
        let frame = FRAMES.wait().await;
        if lcd.show(&frame).await.is_err() {
            log(format_args!("lcd write failed"));
        }
    }
}

#[embassy_executor::task]
pub async fn console_task(mut usart: Uart<'static, Async>) -> ! {
    loop {
        let line = CONSOLE.receive().await;
        // nowhere to report a console that cannot write
        let _ = usart.write(line.as_bytes()).await;
    }
}
