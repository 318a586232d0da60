//! Sensor bring-up and per-cycle sampling.

use core::fmt::Debug;

use log::{info, warn};

use crate::reading::{RawAcceleration, Reading};

/// Accelerometer driver seam.
pub trait AccelSensor {
    type Error: Debug;

    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Self-test: true when the expected device answers.
    fn test_connection(&mut self) -> bool;

    fn acceleration(&mut self) -> Result<RawAcceleration, Self::Error>;
}

/// Result of [`Sampler::prepare`]. Only `Ready` means readings can be trusted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SensorStatus {
    Ready,
    InitFailed,
    SelfTestFailed,
}

#[derive(Debug)]
pub struct Sampler<S> {
    sensor: S,
    last_raw: RawAcceleration,
}

impl<S> Sampler<S>
where
    S: AccelSensor,
{
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            last_raw: RawAcceleration::ZERO,
        }
    }

    /// Initializes and self-tests the sensor. Failures are logged, never fatal.
    pub fn prepare(&mut self) -> SensorStatus {
        if let Err(err) = self.sensor.initialize() {
            warn!("sensor initialize failed: {:?}", err);
            return SensorStatus::InitFailed;
        }
        if !self.sensor.test_connection() {
            warn!("sensor connection failed; readings are unverified");
            return SensorStatus::SelfTestFailed;
        }
        info!("sensor ready");
        SensorStatus::Ready
    }

    /// Reads one sample and converts it to standard gravity.
    ///
    /// A failed read reuses the previous raw sample (zeros before the first
    /// good read).
    pub fn acquire(&mut self) -> Reading {
        match self.sensor.acceleration() {
            Ok(raw) => self.last_raw = raw,
            Err(err) => warn!(
                "sensor read failed: {:?}; reusing raw={:?}",
                err, self.last_raw
            ),
        }
        Reading::from_raw(self.last_raw)
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn release(self) -> S {
        self.sensor
    }
}
