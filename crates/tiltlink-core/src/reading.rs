//! Accelerometer samples in raw counts and standard gravity.

/// Counts per standard gravity at the +/-2 g full-scale range.
///
/// The sensor driver must be configured for the matching range; the firmware
/// checks this at compile time.
pub const SENSITIVITY_LSB_PER_G: u16 = 16_384;

/// One tri-axis sample as returned by the sensor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawAcceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawAcceleration {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl From<[i16; 3]> for RawAcceleration {
    fn from([x, y, z]: [i16; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One tri-axis sample in units of standard gravity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Reading {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Converts raw counts using [`SENSITIVITY_LSB_PER_G`].
    pub fn from_raw(raw: RawAcceleration) -> Self {
        Self {
            x: counts_to_g(raw.x),
            y: counts_to_g(raw.y),
            z: counts_to_g(raw.z),
        }
    }
}

#[inline]
fn counts_to_g(counts: i16) -> f32 {
    counts as f32 / SENSITIVITY_LSB_PER_G as f32
}
