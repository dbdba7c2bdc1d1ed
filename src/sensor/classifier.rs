/// Light source identification from raw colour channel readings
use log::debug;
use std::collections::HashMap;

use crate::models::{BdAddr, LightType, SensorReading};

// Thresholds calibrated against colour graphs of the control bulbs
// (incandescent, fluorescent, LED) and daylight.
const INCANDESCENT_MIN_MAX_RATIO: f64 = 1.15; // red clearly above the other two
const INCANDESCENT_MAX_MIN_RATIO: f64 = 1.05; // green and blue almost on top of each other
const FLUORESCENT_MAX_MAX_RATIO: f64 = 1.10;
const FLUORESCENT_MAX_CHANNEL: f64 = 10000.0;
const LED_MAX_NET_CHANGE: f64 = 200.0; // LEDs hold steady colour values
const LED_MAX_LUX: f64 = 2000.0; // and are the dimmest sources measured
const SUNLIGHT_MAX_MAX_RATIO: f64 = 1.05;

/// Sequence number the firmware starts counting from after a reset
const STREAM_RESTART_SEQUENCE: u16 = 1;

/// Per-channel values for clear, red, green and blue
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Channels {
    pub clear: f64,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Channels {
    fn from_reading(reading: &SensorReading) -> Self {
        Self {
            clear: reading.clear as f64,
            red: reading.red as f64,
            green: reading.green as f64,
            blue: reading.blue as f64,
        }
    }
}

/// Running statistics for one sensor stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierState {
    pub previous: Channels,
    /// Sum of signed changes since the stream restarted
    pub net_change: Channels,
    /// Sum of absolute changes since the stream restarted
    pub total_change: Channels,
}

/// Label for one reading together with the ratios behind it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub light_type: LightType,
    pub max_ratio: f64,
    pub min_ratio: f64,
    pub ratio_compare: f64,
}

/// Max, median and min of three values
fn order3(a: f64, b: f64, c: f64) -> (f64, f64, f64) {
    let mut v = [a, b, c];
    v.sort_by(|x, y| x.total_cmp(y));
    (v[2], v[1], v[0])
}

impl ClassifierState {
    /// Fold a reading into the running statistics and label it
    ///
    /// A reading with sequence number 1 marks a restarted stream: the
    /// accumulators are zeroed instead of updated. The reading always becomes
    /// the new baseline for the next delta.
    pub fn update(&mut self, reading: &SensorReading) -> Classification {
        let current = Channels::from_reading(reading);

        if reading.sequence_no != STREAM_RESTART_SEQUENCE {
            let delta = Channels {
                clear: current.clear - self.previous.clear,
                red: current.red - self.previous.red,
                green: current.green - self.previous.green,
                blue: current.blue - self.previous.blue,
            };

            self.net_change.clear += delta.clear;
            self.net_change.red += delta.red;
            self.net_change.green += delta.green;
            self.net_change.blue += delta.blue;

            self.total_change.clear += delta.clear.abs();
            self.total_change.red += delta.red.abs();
            self.total_change.green += delta.green.abs();
            self.total_change.blue += delta.blue.abs();
        } else {
            *self = Self::default();
        }

        self.previous = current;

        self.classify(&current, reading.lux as f64)
    }

    fn classify(&self, c: &Channels, lux: f64) -> Classification {
        let (red, green, blue) = (c.red, c.green, c.blue);
        let (max, median, min) = order3(red, green, blue);

        // Division by a zero channel yields inf/NaN, which fails every ratio test
        let max_ratio = max / median;
        let min_ratio = median / min;
        let ratio_compare = max_ratio.max(min_ratio) / max_ratio.min(min_ratio);

        let net = &self.net_change;

        let light_type = if red == max
            && max_ratio >= INCANDESCENT_MIN_MAX_RATIO
            && min_ratio <= INCANDESCENT_MAX_MIN_RATIO
        {
            LightType::Incandescent
        } else if (green == max
            || (red == max && green == median && max_ratio <= FLUORESCENT_MAX_MAX_RATIO))
            && max < FLUORESCENT_MAX_CHANNEL
        {
            LightType::Fluorescent
        } else if net.red.abs() <= LED_MAX_NET_CHANGE
            && net.green.abs() <= LED_MAX_NET_CHANGE
            && net.blue.abs() <= LED_MAX_NET_CHANGE
            && lux <= LED_MAX_LUX
        {
            LightType::Led
        } else if blue == max || (blue == median && max_ratio <= SUNLIGHT_MAX_MAX_RATIO) {
            LightType::Sunlight
        } else {
            LightType::Unknown
        };

        debug!(
            "net change r={} g={} b={}, rgb=({}, {}, {}), lux={} -> {}",
            net.red, net.green, net.blue, red, green, blue, lux, light_type
        );

        Classification {
            light_type,
            max_ratio,
            min_ratio,
            ratio_compare,
        }
    }
}

/// Classifier state for every sensor stream seen so far, keyed by sender address
#[derive(Debug, Default)]
pub struct LightClassifier {
    streams: HashMap<BdAddr, ClassifierState>,
}

impl LightClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, stream: BdAddr, reading: &SensorReading) -> Classification {
        self.streams.entry(stream).or_default().update(reading)
    }

    pub fn state(&self, stream: &BdAddr) -> Option<&ClassifierState> {
        self.streams.get(stream)
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}
