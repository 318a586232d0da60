//! Register map and bit-field helpers for the MPU-6050.

/// Default 7-bit bus address (AD0 low).
pub const ADDRESS_AD0_LOW: u8 = 0x68;
/// Alternate 7-bit bus address (AD0 high).
pub const ADDRESS_AD0_HIGH: u8 = 0x69;

pub const GYRO_CONFIG: u8 = 0x1B;
pub const ACCEL_CONFIG: u8 = 0x1C;
/// First of six accelerometer output bytes (X high, X low, Y high, ...).
pub const ACCEL_XOUT_H: u8 = 0x3B;
pub const PWR_MGMT_1: u8 = 0x6B;
pub const WHO_AM_I: u8 = 0x75;

/// Number of bytes in one accelerometer burst read.
pub const ACCEL_BURST_LEN: usize = 6;

/// Identity stored in `WHO_AM_I[6:1]`.
pub const DEVICE_ID: u8 = 0x34;

const PWR_SLEEP_BIT: u8 = 1 << 6;
const PWR_CLKSEL_MASK: u8 = 0b0000_0111;
/// Full-scale select lives in bits [4:3] of both GYRO_CONFIG and ACCEL_CONFIG.
const FS_SEL_SHIFT: u8 = 3;
const FS_SEL_MASK: u8 = 0b11 << FS_SEL_SHIFT;

/// Clock source selection (`PWR_MGMT_1[2:0]`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ClockSource {
    Internal8Mhz = 0,
    PllXGyro = 1,
    PllYGyro = 2,
    PllZGyro = 3,
}

/// Accelerometer full-scale range (`ACCEL_CONFIG.AFS_SEL`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum AccelRange {
    G2 = 0,
    G4 = 1,
    G8 = 2,
    G16 = 3,
}

impl AccelRange {
    /// Counts per standard gravity for this range.
    pub const fn lsb_per_g(self) -> u16 {
        match self {
            Self::G2 => 16_384,
            Self::G4 => 8_192,
            Self::G8 => 4_096,
            Self::G16 => 2_048,
        }
    }
}

/// Gyroscope full-scale range (`GYRO_CONFIG.FS_SEL`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum GyroRange {
    Dps250 = 0,
    Dps500 = 1,
    Dps1000 = 2,
    Dps2000 = 3,
}

/// Returns `PWR_MGMT_1` with the clock source replaced.
#[inline]
pub const fn with_clock_source(pwr_mgmt_1: u8, source: ClockSource) -> u8 {
    (pwr_mgmt_1 & !PWR_CLKSEL_MASK) | source as u8
}

/// Returns `PWR_MGMT_1` with the sleep bit set or cleared.
#[inline]
pub const fn with_sleep(pwr_mgmt_1: u8, sleep: bool) -> u8 {
    if sleep {
        pwr_mgmt_1 | PWR_SLEEP_BIT
    } else {
        pwr_mgmt_1 & !PWR_SLEEP_BIT
    }
}

/// Returns a `GYRO_CONFIG`/`ACCEL_CONFIG` value with the full-scale field replaced.
///
/// Self-test bits [7:5] are preserved.
#[inline]
pub const fn with_full_scale(config: u8, fs_sel: u8) -> u8 {
    (config & !FS_SEL_MASK) | ((fs_sel << FS_SEL_SHIFT) & FS_SEL_MASK)
}

/// Extracts the identity field from a raw `WHO_AM_I` value.
#[inline]
pub const fn device_id(who_am_i: u8) -> u8 {
    (who_am_i >> 1) & 0b0011_1111
}

/// Decodes a big-endian accelerometer burst into `[x, y, z]` counts.
#[inline]
pub fn decode_axes(burst: &[u8; ACCEL_BURST_LEN]) -> [i16; 3] {
    [
        i16::from_be_bytes([burst[0], burst[1]]),
        i16::from_be_bytes([burst[2], burst[3]]),
        i16::from_be_bytes([burst[4], burst[5]]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_sequence_clears_sleep_and_selects_pll() {
        // Power-on reset value has SLEEP set.
        let reset = 0x40;
        let value = with_sleep(with_clock_source(reset, ClockSource::PllXGyro), false);
        assert_eq!(value, 0x01);
    }

    #[test]
    fn full_scale_field_preserves_self_test_bits() {
        assert_eq!(with_full_scale(0b1110_0000, AccelRange::G16 as u8), 0b1111_1000);
        assert_eq!(with_full_scale(0b0001_1000, AccelRange::G2 as u8), 0x00);
        assert_eq!(with_full_scale(0x00, GyroRange::Dps500 as u8), 0b0000_1000);
    }

    #[test]
    fn who_am_i_identity_matches_datasheet() {
        assert_eq!(device_id(0x68), DEVICE_ID);
        assert_eq!(device_id(0xE8), DEVICE_ID);
        assert_ne!(device_id(0x70), DEVICE_ID);
    }

    #[test]
    fn burst_is_big_endian_per_axis() {
        let burst = [0x40, 0x00, 0xE0, 0x00, 0x00, 0x00];
        assert_eq!(decode_axes(&burst), [16_384, -8_192, 0]);

        let extremes = [0x7F, 0xFF, 0x80, 0x00, 0xFF, 0xFF];
        assert_eq!(decode_axes(&extremes), [i16::MAX, i16::MIN, -1]);
    }

    #[test]
    fn sensitivity_halves_with_each_range_step() {
        assert_eq!(AccelRange::G2.lsb_per_g(), 16_384);
        assert_eq!(AccelRange::G4.lsb_per_g(), 8_192);
        assert_eq!(AccelRange::G8.lsb_per_g(), 4_096);
        assert_eq!(AccelRange::G16.lsb_per_g(), 2_048);
    }
}
