#![cfg_attr(not(test), no_std)]

//! MPU-6050 (6-axis inertial sensor) driver primitives.

pub mod registers;

pub use registers::{AccelRange, ClockSource, GyroRange};

use embedded_hal::i2c::I2c;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit bus address.
    pub address: u8,
    /// Clock source selected on wake.
    pub clock: ClockSource,
    /// Accelerometer full-scale range.
    pub accel_range: AccelRange,
    /// Gyroscope full-scale range.
    pub gyro_range: GyroRange,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: registers::ADDRESS_AD0_LOW,
            clock: ClockSource::PllXGyro,
            accel_range: AccelRange::G2,
            gyro_range: GyroRange::Dps250,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<I2cErr> {
    /// Bus transaction failed.
    I2c(I2cErr),
    /// `WHO_AM_I` did not carry the MPU-6050 identity.
    UnexpectedDevice(u8),
}

pub type DriverResult<T, I2cErr> = Result<T, Error<I2cErr>>;

/// MPU-6050 driver.
#[derive(Debug)]
pub struct Mpu6050<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> Mpu6050<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance. No bus traffic happens until [`Self::initialize`].
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self { i2c, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Selects the clock, programs both full-scale ranges and wakes the device.
    pub fn initialize(&mut self) -> DriverResult<(), I2C::Error> {
        let pwr = self.read_register(registers::PWR_MGMT_1)?;
        self.write_register(
            registers::PWR_MGMT_1,
            registers::with_clock_source(pwr, self.config.clock),
        )?;

        let gyro = self.read_register(registers::GYRO_CONFIG)?;
        self.write_register(
            registers::GYRO_CONFIG,
            registers::with_full_scale(gyro, self.config.gyro_range as u8),
        )?;

        let accel = self.read_register(registers::ACCEL_CONFIG)?;
        self.write_register(
            registers::ACCEL_CONFIG,
            registers::with_full_scale(accel, self.config.accel_range as u8),
        )?;

        let pwr = self.read_register(registers::PWR_MGMT_1)?;
        self.write_register(registers::PWR_MGMT_1, registers::with_sleep(pwr, false))
    }

    /// Reads `WHO_AM_I` and checks the identity field.
    pub fn verify_identity(&mut self) -> DriverResult<(), I2C::Error> {
        let who_am_i = self.read_register(registers::WHO_AM_I)?;
        if registers::device_id(who_am_i) != registers::DEVICE_ID {
            return Err(Error::UnexpectedDevice(who_am_i));
        }
        Ok(())
    }

    /// Reads raw accelerometer counts as `[x, y, z]`.
    pub fn acceleration(&mut self) -> DriverResult<[i16; 3], I2C::Error> {
        let mut burst = [0u8; registers::ACCEL_BURST_LEN];
        self.i2c
            .write_read(self.config.address, &[registers::ACCEL_XOUT_H], &mut burst)
            .map_err(Error::I2c)?;
        Ok(registers::decode_axes(&burst))
    }

    fn read_register(&mut self, register: u8) -> DriverResult<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.config.address, &[register], &mut value)
            .map_err(Error::I2c)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> DriverResult<(), I2C::Error> {
        self.i2c
            .write(self.config.address, &[register, value])
            .map_err(Error::I2c)
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;

    /// Register-file backed bus; a write of `[reg]` sets the read pointer.
    struct FakeBus {
        address: u8,
        regs: [u8; 128],
        pointer: usize,
        fail: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut regs = [0u8; 128];
            regs[registers::PWR_MGMT_1 as usize] = 0x40;
            regs[registers::WHO_AM_I as usize] = 0x68;
            Self {
                address: registers::ADDRESS_AD0_LOW,
                regs,
                pointer: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail || address != self.address {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let Some((&reg, values)) = bytes.split_first() else {
                            continue;
                        };
                        self.pointer = reg as usize;
                        for value in values {
                            self.regs[self.pointer] = *value;
                            self.pointer += 1;
                        }
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.regs[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn initialize_wakes_device_with_configured_ranges() {
        let mut imu = Mpu6050::new(FakeBus::new(), Config::default());
        imu.initialize().unwrap();

        let bus = imu.release();
        assert_eq!(bus.regs[registers::PWR_MGMT_1 as usize], 0x01);
        assert_eq!(bus.regs[registers::ACCEL_CONFIG as usize], 0x00);
        assert_eq!(bus.regs[registers::GYRO_CONFIG as usize], 0x00);
    }

    #[test]
    fn non_default_accel_range_lands_in_afs_sel() {
        let config = Config {
            accel_range: AccelRange::G8,
            ..Config::default()
        };
        let mut imu = Mpu6050::new(FakeBus::new(), config);
        imu.initialize().unwrap();

        assert_eq!(imu.release().regs[registers::ACCEL_CONFIG as usize], 0b0001_0000);
    }

    #[test]
    fn identity_check_rejects_foreign_device() {
        let mut bus = FakeBus::new();
        bus.regs[registers::WHO_AM_I as usize] = 0x70;
        let mut imu = Mpu6050::new(bus, Config::default());

        assert_eq!(imu.verify_identity(), Err(Error::UnexpectedDevice(0x70)));
    }

    #[test]
    fn acceleration_reads_six_byte_burst() {
        let mut bus = FakeBus::new();
        let base = registers::ACCEL_XOUT_H as usize;
        bus.regs[base..base + 6].copy_from_slice(&[0x40, 0x00, 0xE0, 0x00, 0x00, 0x00]);
        let mut imu = Mpu6050::new(bus, Config::default());

        assert_eq!(imu.acceleration(), Ok([16_384, -8_192, 0]));
    }

    #[test]
    fn bus_errors_are_wrapped() {
        let mut bus = FakeBus::new();
        bus.fail = true;
        let mut imu = Mpu6050::new(bus, Config::default());

        assert_eq!(imu.acceleration(), Err(Error::I2c(ErrorKind::Other)));
        assert_eq!(imu.initialize(), Err(Error::I2c(ErrorKind::Other)));
    }
}
