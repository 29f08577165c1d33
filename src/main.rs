#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

// On the board this is the firmware. On the host it runs the simulation, so
// that the control logic can be watched without hardware.

#[cfg(target_os = "none")]
mod io;
#[cfg(not(target_os = "none"))]
mod simulation;

#[cfg(target_os = "none")]
use {
    despi_m02_speedtrap::{
        Clock, Config, Controller, EdgeOutcome, Sensor, display::FrameBuffer, lcd::Lcd1602,
        outputs::PinBank,
    },
    embassy_executor::Spawner,
    embassy_stm32::exti::{Channel, ExtiInput},
    embassy_stm32::gpio::{Level, Output, Pin, Pull, Speed},
    embassy_stm32::usart::{Config as UartConfig, Uart},
    embassy_stm32::{bind_interrupts, peripherals, usart},
    embassy_time::{Delay, Duration, Ticker, Timer},
    panic_halt as _,
};

#[cfg(target_os = "none")]
const MAIN_LOOP_PERIOD_MS: u64 = 10;

#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());

    bind_interrupts!(struct Irqs {
        USART1 => usart::InterruptHandler<peripherals::USART1>;
    });
    let usart = Uart::new(
        peripherals.USART1,
        peripherals.PA10,
        peripherals.PA9,
        Irqs,
        peripherals.DMA1_CH4,
        peripherals.DMA1_CH5,
        UartConfig::default(), // 115200 baud
    )
    .unwrap();
    spawner.spawn(io::console_task(usart)).unwrap();

    // Indexed by `Pins`: leg A red, amber, green, then leg B.
    let mut lines = PinBank::new(
        [
            Output::new(peripherals.PE1, Level::Low, Speed::Low),
            Output::new(peripherals.PB9, Level::Low, Speed::Low),
            Output::new(peripherals.PB7, Level::Low, Speed::Low),
            Output::new(peripherals.PB6, Level::Low, Speed::Low),
            Output::new(peripherals.PB8, Level::Low, Speed::Low),
            Output::new(peripherals.PE0, Level::Low, Speed::Low),
        ],
        io::ACTIVE_LOWS,
    );

    let lcd = Lcd1602::new(
        Output::new(peripherals.PD8, Level::Low, Speed::Low),
        Output::new(peripherals.PD9, Level::Low, Speed::Low),
        [
            Output::new(peripherals.PD10, Level::Low, Speed::Low),
            Output::new(peripherals.PD11, Level::Low, Speed::Low),
            Output::new(peripherals.PD12, Level::Low, Speed::Low),
            Output::new(peripherals.PD13, Level::Low, Speed::Low),
        ],
        Delay,
    );
    spawner.spawn(io::lcd_task(lcd)).unwrap();

    let sensor1 = ExtiInput::new(
        peripherals.PC0.degrade(),
        peripherals.EXTI0.degrade(),
        Pull::Up,
    );
    let sensor2 = ExtiInput::new(
        peripherals.PC1.degrade(),
        peripherals.EXTI1.degrade(),
        Pull::Up,
    );
    spawner.spawn(io::sensor_task(Sensor::First, sensor1)).unwrap();
    spawner.spawn(io::sensor_task(Sensor::Second, sensor2)).unwrap();

    let config = Config::DEFAULT;
    let clock = io::EmbassyClock;
    let mut controller = Controller::new(&config);
    let mut frame_buffer = FrameBuffer::new();

    controller.boot(&mut lines, &mut frame_buffer);
    io::publish(&mut frame_buffer);
    io::log(format_args!("traffic system initializing"));
    Timer::after_millis(config.boot_hold_ms).await;

    controller.start(clock.now_ms(), &mut lines, &mut frame_buffer);
    io::publish(&mut frame_buffer);
    io::log(format_args!(
        "signal state -> {:?}",
        controller.signal_state()
    ));

    let mut ticker = Ticker::every(Duration::from_millis(MAIN_LOOP_PERIOD_MS));
    loop {
        while let Ok(edge) = io::EDGES.try_receive() {
            match controller.on_edge(edge) {
                EdgeOutcome::Armed => io::log(format_args!("first sensor triggered")),
                EdgeOutcome::Measured(kmh) => io::log(format_args!("speed: {:.1} km/h", kmh)),
                EdgeOutcome::Ignored => {
                    io::log(format_args!("second sensor without first, ignored"))
                }
            }
        }

        if let Some(state) = controller.poll(&clock, &mut lines, &mut frame_buffer) {
            io::log(format_args!("signal state -> {:?}", state));
        }
        io::publish(&mut frame_buffer);

        ticker.next().await;
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    simulation::run();
}
