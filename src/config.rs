/*
 * All the timing and geometry of the crossing in one place. The values are
 * fixed for the device; tests are free to build other ones.
 */

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub green_ms: u64,
    pub yellow_ms: u64,
    // Each of the two both-red interstitial phases.
    pub all_red_ms: u64,
    // Distance between the two speed trap sensors.
    pub sensor_distance_m: f32,
    pub message_interval_ms: u64,
    pub speed_window_ms: u64,
    // How long the heads stay red with the splash screen before the first
    // green.
    pub boot_hold_ms: u64,
}

impl Config {
    pub const DEFAULT: Config = Config {
        green_ms: 10_000,
        yellow_ms: 3_000,
        all_red_ms: 2_000,
        sensor_distance_m: 1.0,
        message_interval_ms: 5_000,
        speed_window_ms: 5_000,
        boot_hold_ms: 2_000,
    };

    pub const fn cycle_ms(&self) -> u64 {
        2 * (self.green_ms + self.yellow_ms + self.all_red_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}
