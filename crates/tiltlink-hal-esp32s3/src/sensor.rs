//! MPU-6050 behind the core accelerometer seam.

use embedded_hal::i2c::I2c;
use log::warn;
use mpu6050::{AccelRange, Config, Mpu6050};
use tiltlink_core::{
    acquisition::AccelSensor,
    reading::{RawAcceleration, SENSITIVITY_LSB_PER_G},
};

/// Range programmed into the sensor; readings are scaled for exactly this range.
pub const ACCEL_RANGE: AccelRange = AccelRange::G2;

const _: () = assert!(ACCEL_RANGE.lsb_per_g() == SENSITIVITY_LSB_PER_G);

#[derive(Debug)]
pub struct ImuSensor<I2C> {
    imu: Mpu6050<I2C>,
}

impl<I2C> ImuSensor<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        let config = Config {
            address,
            accel_range: ACCEL_RANGE,
            ..Config::default()
        };
        Self {
            imu: Mpu6050::new(i2c, config),
        }
    }
}

impl<I2C> AccelSensor for ImuSensor<I2C>
where
    I2C: I2c,
{
    type Error = mpu6050::Error<I2C::Error>;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        self.imu.initialize()
    }

    fn test_connection(&mut self) -> bool {
        match self.imu.verify_identity() {
            Ok(()) => true,
            Err(err) => {
                warn!("mpu6050 identity check failed: {:?}", err);
                false
            }
        }
    }

    fn acceleration(&mut self) -> Result<RawAcceleration, Self::Error> {
        self.imu.acceleration().map(RawAcceleration::from)
    }
}
