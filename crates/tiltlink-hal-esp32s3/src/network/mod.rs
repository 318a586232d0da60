//! Wi-Fi association over `esp-radio` + `embassy-net`.

mod http;

pub use http::{DEFAULT_HTTP_RX_BYTES, DEFAULT_HTTP_TX_BYTES, HttpTransport};

use embassy_net::Stack;
use embassy_time::{Duration, WithTimeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiError};
use log::{debug, info};
use tiltlink_core::{
    config::WifiConfig,
    session::{ConnectivityState, WifiLink},
};

const DHCP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug)]
pub enum WifiLinkError {
    Config(WifiError),
    Start(WifiError),
    Connect(WifiError),
    /// Associated, but no IPv4 lease in time.
    DhcpTimeout,
}

/// Station-mode link. Connected means radio association, link up and an IPv4
/// lease, all at once.
pub struct EspWifiLink<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    configured_ssid: Option<&'static str>,
}

impl<'d> EspWifiLink<'d> {
    pub fn new(controller: WifiController<'d>, stack: Stack<'d>) -> Self {
        Self {
            controller,
            stack,
            configured_ssid: None,
        }
    }

    pub fn stack(&self) -> Stack<'d> {
        self.stack
    }

    fn apply_credentials(&mut self, credentials: &WifiConfig) -> Result<(), WifiLinkError> {
        if self.configured_ssid == Some(credentials.ssid) {
            return Ok(());
        }

        let client_config = ClientConfig::default()
            .with_ssid(credentials.ssid.into())
            .with_password(credentials.password.into());
        self.controller
            .set_config(&ModeConfig::Client(client_config))
            .map_err(WifiLinkError::Config)?;
        self.configured_ssid = Some(credentials.ssid);
        Ok(())
    }

    fn snapshot(&self) -> (bool, bool, bool) {
        (
            self.stack.is_link_up(),
            self.stack.config_v4().is_some(),
            matches!(self.controller.is_connected(), Ok(true)),
        )
    }
}

fn state_for(link_up: bool, has_ipv4: bool, associated: bool) -> ConnectivityState {
    if link_up && has_ipv4 && associated {
        ConnectivityState::Connected
    } else {
        ConnectivityState::Disconnected
    }
}

impl WifiLink for EspWifiLink<'_> {
    type Error = WifiLinkError;

    async fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error> {
        self.apply_credentials(credentials)?;

        if !self.controller.is_started().unwrap_or(false) {
            self.controller
                .start_async()
                .await
                .map_err(WifiLinkError::Start)?;
        }

        let (link_up, has_ipv4, associated) = self.snapshot();
        if state_for(link_up, has_ipv4, associated) == ConnectivityState::Connected {
            return Ok(());
        }
        if associated {
            // Half-up session (e.g. lease lost); start over from a clean association.
            let _ = self.controller.disconnect_async().await;
        }

        if let Err(err) = self.controller.connect_async().await {
            let _ = self.controller.disconnect_async().await;
            return Err(WifiLinkError::Connect(err));
        }

        match self
            .stack
            .wait_config_up()
            .with_timeout(Duration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                if let Some(config) = self.stack.config_v4() {
                    info!("wifi dhcp ready address={}", config.address);
                }
                Ok(())
            }
            Err(_) => {
                let _ = self.controller.disconnect_async().await;
                Err(WifiLinkError::DhcpTimeout)
            }
        }
    }

    fn status(&mut self) -> ConnectivityState {
        let (link_up, has_ipv4, associated) = self.snapshot();
        let state = state_for(link_up, has_ipv4, associated);
        if state == ConnectivityState::Disconnected {
            debug!(
                "wifi state link_up={} has_ipv4={} connected={}",
                link_up, has_ipv4, associated
            );
        }
        state
    }
}
