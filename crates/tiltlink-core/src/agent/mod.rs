//! Cycle orchestration: connect once, then check -> acquire -> deliver -> wait.

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    acquisition::{AccelSensor, Sampler, SensorStatus},
    config::{AgentConfig, ConfigError, ReconnectPolicy},
    delivery::{DeliveryClient, DeliveryOutcome, Transport},
    reading::Reading,
    session::{Session, SessionError, WifiLink},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AgentState {
    Initializing,
    IdleConnected,
    IdleDisconnected,
}

/// What happened to a reassociation attempt in a skipped cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reassociation {
    NotAttempted,
    Associated,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CycleReport {
    Delivered {
        reading: Reading,
        outcome: DeliveryOutcome,
    },
    Skipped {
        reassociation: Reassociation,
    },
}

/// Running counters since boot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CycleStats {
    pub cycles: u32,
    /// 2xx responses.
    pub delivered: u32,
    /// Non-2xx responses.
    pub rejected: u32,
    pub transport_failures: u32,
    pub skipped: u32,
}

impl CycleStats {
    fn record(&mut self, report: &CycleReport) {
        self.cycles = self.cycles.wrapping_add(1);
        let counter = match report {
            CycleReport::Delivered { outcome, .. } if outcome.is_success() => &mut self.delivered,
            CycleReport::Delivered {
                outcome: DeliveryOutcome::Status(_),
                ..
            } => &mut self.rejected,
            CycleReport::Delivered { .. } => &mut self.transport_failures,
            CycleReport::Skipped { .. } => &mut self.skipped,
        };
        *counter = counter.wrapping_add(1);
    }
}

/// Owns the link, sensor, transport and delay for the lifetime of the device.
pub struct TelemetryAgent<L, S, T, D>
where
    L: WifiLink,
    S: AccelSensor,
    T: Transport,
    D: DelayNs,
{
    session: Session<L>,
    sampler: Sampler<S>,
    client: DeliveryClient<T>,
    delay: D,
    cycle_delay_ms: u32,
    reconnect_policy: ReconnectPolicy,
    stats_every: u32,
    state: AgentState,
    sensor_status: Option<SensorStatus>,
    stats: CycleStats,
}

impl<L, S, T, D> TelemetryAgent<L, S, T, D>
where
    L: WifiLink,
    S: AccelSensor,
    T: Transport,
    D: DelayNs,
{
    pub fn new(
        config: &AgentConfig,
        link: L,
        sensor: S,
        transport: T,
        delay: D,
    ) -> Result<Self, ConfigError> {
        let url = config.validate()?;
        Ok(Self {
            session: Session::new(
                link,
                config.wifi,
                config.connect_retry_ms,
                config.connect_policy,
            ),
            sampler: Sampler::new(sensor),
            client: DeliveryClient::new(transport, url),
            delay,
            cycle_delay_ms: config.cycle_delay_ms,
            reconnect_policy: config.reconnect_policy,
            stats_every: config.stats_every,
            state: AgentState::Initializing,
            sensor_status: None,
            stats: CycleStats::default(),
        })
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// `None` until [`Self::start`] has prepared the sensor.
    pub fn sensor_status(&self) -> Option<SensorStatus> {
        self.sensor_status
    }

    /// Connects Wi-Fi (blocking per the connect policy), then prepares the
    /// sensor. A sensor failure is logged and does not stop the agent.
    pub async fn start(&mut self) -> Result<SensorStatus, SessionError> {
        self.state = AgentState::Initializing;
        self.session.connect(&mut self.delay).await?;

        let sensor_status = self.sampler.prepare();
        self.sensor_status = Some(sensor_status);
        self.state = AgentState::IdleConnected;
        info!(
            "agent started collector={}:{}{} sensor={:?}",
            self.client.url().host(),
            self.client.url().port(),
            self.client.url().path(),
            sensor_status
        );
        Ok(sensor_status)
    }

    /// Runs one cycle, including the trailing delay.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let report = if self.session.is_connected() {
            self.state = AgentState::IdleConnected;
            let reading = self.sampler.acquire();
            let outcome = self.client.deliver(&reading).await;
            CycleReport::Delivered { reading, outcome }
        } else {
            if self.state != AgentState::IdleDisconnected {
                warn!("wifi disconnected");
            } else {
                info!("wifi disconnected");
            }
            self.state = AgentState::IdleDisconnected;
            let reassociation = self.reassociate().await;
            CycleReport::Skipped { reassociation }
        };

        self.stats.record(&report);
        debug!("cycle={} state={:?}", self.stats.cycles, self.state);
        if self.stats_every != 0 && self.stats.cycles % self.stats_every == 0 {
            self.log_stats();
        }

        self.delay.delay_ms(self.cycle_delay_ms).await;
        report
    }

    /// Starts, then cycles forever. Only returns if a bounded connect policy
    /// gives up during start.
    pub async fn run(&mut self) -> Result<Infallible, SessionError> {
        self.start().await?;
        loop {
            self.run_cycle().await;
        }
    }

    pub fn release(self) -> (L, S, T, D) {
        (
            self.session.release(),
            self.sampler.release(),
            self.client.release(),
            self.delay,
        )
    }

    async fn reassociate(&mut self) -> Reassociation {
        match self.reconnect_policy {
            ReconnectPolicy::ObserveOnly => Reassociation::NotAttempted,
            ReconnectPolicy::Reassociate => {
                if self.session.try_reassociate().await {
                    info!("wifi reassociated; delivery resumes next cycle");
                    Reassociation::Associated
                } else {
                    Reassociation::Failed
                }
            }
        }
    }

    fn log_stats(&self) {
        info!(
            "stats cycles={} delivered={} rejected={} failed={} skipped={}",
            self.stats.cycles,
            self.stats.delivered,
            self.stats.rejected,
            self.stats.transport_failures,
            self.stats.skipped
        );
    }
}
