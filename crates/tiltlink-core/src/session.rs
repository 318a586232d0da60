//! Wi-Fi association: initial connect and per-cycle status.

use core::fmt::Debug;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::config::{ConnectPolicy, WifiConfig};

/// Association state as reported by the radio stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectivityState {
    Disconnected,
    Connected,
}

/// Wireless stack seam.
#[allow(async_fn_in_trait)]
pub trait WifiLink {
    type Error: Debug;

    /// Makes one association attempt with `credentials`.
    async fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error>;

    /// Current association state; must not block.
    fn status(&mut self) -> ConnectivityState;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionError {
    /// `ConnectPolicy::MaxAttempts` ran out.
    AttemptsExhausted { attempts: u32 },
}

/// Owns the link and the credentials used to (re)associate.
#[derive(Debug)]
pub struct Session<L> {
    link: L,
    credentials: WifiConfig,
    retry_interval_ms: u32,
    policy: ConnectPolicy,
}

impl<L> Session<L>
where
    L: WifiLink,
{
    pub fn new(
        link: L,
        credentials: WifiConfig,
        retry_interval_ms: u32,
        policy: ConnectPolicy,
    ) -> Self {
        Self {
            link,
            credentials,
            retry_interval_ms,
            policy,
        }
    }

    /// Retries at a fixed interval until associated.
    ///
    /// Under [`ConnectPolicy::Forever`] this only returns once connected.
    /// Returns the number of attempts used.
    pub async fn connect<D>(&mut self, delay: &mut D) -> Result<u32, SessionError>
    where
        D: DelayNs,
    {
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);

            if let Err(err) = self.link.begin(&self.credentials).await {
                warn!("wifi begin failed attempt={} err={:?}", attempts, err);
            }

            if self.is_connected() {
                info!(
                    "wifi connected ssid={} attempts={}",
                    self.credentials.ssid, attempts
                );
                return Ok(attempts);
            }

            if let ConnectPolicy::MaxAttempts(max) = self.policy
                && attempts >= max.max(1)
            {
                warn!("wifi giving up after {} attempts", attempts);
                return Err(SessionError::AttemptsExhausted { attempts });
            }

            info!("connecting to wifi... attempt={}", attempts);
            delay.delay_ms(self.retry_interval_ms).await;
        }
    }

    /// Fresh status query; never cached.
    pub fn is_connected(&mut self) -> bool {
        self.link.status() == ConnectivityState::Connected
    }

    /// One association attempt without retry or delay.
    pub async fn try_reassociate(&mut self) -> bool {
        match self.link.begin(&self.credentials).await {
            Ok(()) => self.is_connected(),
            Err(err) => {
                warn!("wifi reassociate failed err={:?}", err);
                false
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn release(self) -> L {
        self.link
    }
}
