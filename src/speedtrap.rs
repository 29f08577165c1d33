/*
 * Vehicle speed from the time of flight between two light barriers a known
 * distance apart.
 *
 * The sensors are never read here. The edge handlers only timestamp the
 * falling edge and queue a `SensorEdge`; the main loop drains that queue
 * into `SpeedTrap::on_edge`. The trap therefore has a single owner, and the
 * reading the billboard gets can never be half-written.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEdge {
    pub sensor: Sensor,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOutcome {
    Armed,
    Measured(f32),
    // A second-sensor edge with no measurement in progress.
    Ignored,
}

/// Speed in km/h of something covering `distance_m` in `second_ms - first_ms`.
/// Zero elapsed time gives zero rather than a division by zero.
pub fn speed_kmh(distance_m: f32, first_ms: u64, second_ms: u64) -> f32 {
    let time_diff_ms = second_ms.saturating_sub(first_ms);
    if time_diff_ms == 0 {
        return 0.0;
    }

    let metres_per_second = distance_m * 1000.0 / time_diff_ms as f32;
    metres_per_second * 3.6
}

#[derive(Debug)]
pub struct SpeedTrap {
    sensor_distance_m: f32,
    first_edge_ms: u64,
    second_edge_ms: u64,
    measurement_active: bool,
    result_kmh: f32,
}

impl SpeedTrap {
    pub fn new(sensor_distance_m: f32) -> Self {
        SpeedTrap {
            sensor_distance_m,
            first_edge_ms: 0,
            second_edge_ms: 0,
            measurement_active: false,
            result_kmh: 0.0,
        }
    }

    pub fn on_edge(&mut self, edge: SensorEdge) -> EdgeOutcome {
        match edge.sensor {
            Sensor::First => {
                self.on_sensor1(edge.at_ms);
                EdgeOutcome::Armed
            }
            Sensor::Second => match self.on_sensor2(edge.at_ms) {
                Some(kmh) => EdgeOutcome::Measured(kmh),
                None => EdgeOutcome::Ignored,
            },
        }
    }

    /*
     * Always (re)arms, even halfway through a measurement. If the first
     * barrier trips twice before the second one trips once, the later time
     * wins.
     */
    pub fn on_sensor1(&mut self, now_ms: u64) {
        self.first_edge_ms = now_ms;
        self.measurement_active = true;
    }

    pub fn on_sensor2(&mut self, now_ms: u64) -> Option<f32> {
        if !self.measurement_active {
            return None;
        }

        self.second_edge_ms = now_ms;
        self.result_kmh = self.calculate_speed();
        self.measurement_active = false;
        Some(self.result_kmh)
    }

    pub fn calculate_speed(&self) -> f32 {
        speed_kmh(
            self.sensor_distance_m,
            self.first_edge_ms,
            self.second_edge_ms,
        )
    }

    pub fn measurement_active(&self) -> bool {
        self.measurement_active
    }

    /// The last completed reading.
    pub fn result_kmh(&self) -> f32 {
        self.result_kmh
    }
}
