#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Delay, Timer};
use esp_hal::{
    clock::CpuClock,
    i2c::master::{Config as I2cConfig, I2c},
    time::Rate,
    timer::timg::TimerGroup,
};
use log::{LevelFilter, info};
use static_cell::StaticCell;
use tiltlink_core::{
    agent::TelemetryAgent,
    config::{AgentConfig, WifiConfig},
};
use tiltlink_hal_esp32s3::{
    network::{EspWifiLink, HttpTransport},
    sensor::ImuSensor,
};

const IMU_I2C_KHZ: u32 = 400;
const IMU_ADDRESS: u8 = mpu6050::registers::ADDRESS_AD0_LOW;

const WIFI_SSID: &str = env!(
    "TILTLINK_WIFI_SSID",
    "Set TILTLINK_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "TILTLINK_WIFI_PASSWORD",
    "Set TILTLINK_WIFI_PASSWORD in your environment before building/flashing."
);
const COLLECTOR_URL: &str = env!(
    "TILTLINK_COLLECTOR_URL",
    "Set TILTLINK_COLLECTOR_URL (e.g. http://192.168.1.20:5000/accelerometer) before building/flashing."
);
const AGENT_CONFIG: AgentConfig =
    AgentConfig::new(WifiConfig::new(WIFI_SSID, WIFI_PASSWORD), COLLECTOR_URL);

static NET_RESOURCES: StaticCell<embassy_net::StackResources<3>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Nothing useful can run without the radio or a valid config; stay alive for the log.
async fn park() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "the agent owns the HTTP socket buffers for the device lifetime"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: tiltlink starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // MPU-6050 wiring: SDA=GPIO8, SCL=GPIO9, AD0 low.
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(IMU_I2C_KHZ));
    let i2c = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => i2c.with_sda(peripherals.GPIO8).with_scl(peripherals.GPIO9),
        Err(err) => {
            info!("i2c init failed: {:?}", err);
            park().await
        }
    };
    let sensor = ImuSensor::new(i2c, IMU_ADDRESS);

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            park().await
        }
    };

    let (wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                park().await
            }
        };

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<3>::new()),
        0x7A11_71C4_0B5E_D00D,
    );

    let link = EspWifiLink::new(wifi_controller, stack);
    let transport: HttpTransport<'_> = HttpTransport::new(stack);

    let mut agent = match TelemetryAgent::new(&AGENT_CONFIG, link, sensor, transport, Delay) {
        Ok(agent) => agent,
        Err(err) => {
            info!("invalid agent config: {:?}", err);
            park().await
        }
    };

    info!(
        "tiltlink configured ssid={} collector={} cycle_ms={} connect_retry_ms={}",
        AGENT_CONFIG.wifi.ssid,
        AGENT_CONFIG.collector_url,
        AGENT_CONFIG.cycle_delay_ms,
        AGENT_CONFIG.connect_retry_ms
    );
    info!("IMU pins: SDA=GPIO8 SCL=GPIO9 addr=0x{:02x}", IMU_ADDRESS);

    let net_future = net_runner.run();
    let agent_future = async {
        match agent.run().await {
            Ok(never) => match never {},
            Err(err) => {
                info!("agent stopped: {:?}", err);
                park().await
            }
        }
    };

    let _ = embassy_futures::join::join(net_future, agent_future).await;
    unreachable!()
}
