//! Scripted stand-ins for the hardware seams.

use std::collections::VecDeque;

use embedded_hal_async::delay::DelayNs;

use crate::{
    acquisition::AccelSensor,
    config::WifiConfig,
    delivery::{Transport, TransportFailure},
    http::Header,
    reading::RawAcceleration,
    session::{ConnectivityState, WifiLink},
    url::CollectorUrl,
};

/// Associates once `failing_begins` attempts have been used up. Scripted
/// statuses are served first; after that `status` reflects association.
#[derive(Debug, Default)]
pub(crate) struct ScriptedLink {
    pub failing_begins: u32,
    pub associated: bool,
    pub statuses: VecDeque<ConnectivityState>,
    pub begin_calls: u32,
    pub status_calls: u32,
    pub last_ssid: Option<&'static str>,
}

impl ScriptedLink {
    pub fn failing_begins(count: u32) -> Self {
        Self {
            failing_begins: count,
            ..Self::default()
        }
    }

    pub fn push_status(&mut self, state: ConnectivityState) {
        self.statuses.push_back(state);
    }
}

impl WifiLink for ScriptedLink {
    type Error = ();

    async fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error> {
        self.begin_calls += 1;
        self.last_ssid = Some(credentials.ssid);
        if self.failing_begins > 0 {
            self.failing_begins -= 1;
            self.associated = false;
            return Err(());
        }
        self.associated = true;
        Ok(())
    }

    fn status(&mut self) -> ConnectivityState {
        self.status_calls += 1;
        match self.statuses.pop_front() {
            Some(state) => state,
            None if self.associated => ConnectivityState::Connected,
            None => ConnectivityState::Disconnected,
        }
    }
}

/// Serves scripted samples, then repeats `[0, 0, 16384]` (flat, 1 g on z).
#[derive(Debug)]
pub(crate) struct ScriptedSensor {
    pub init_ok: bool,
    pub self_test_ok: bool,
    pub samples: VecDeque<Result<[i16; 3], ()>>,
    pub reads: u32,
}

impl Default for ScriptedSensor {
    fn default() -> Self {
        Self {
            init_ok: true,
            self_test_ok: true,
            samples: VecDeque::new(),
            reads: 0,
        }
    }
}

impl ScriptedSensor {
    pub fn push_sample(&mut self, axes: [i16; 3]) {
        self.samples.push_back(Ok(axes));
    }

    pub fn push_failure(&mut self) {
        self.samples.push_back(Err(()));
    }
}

impl AccelSensor for ScriptedSensor {
    type Error = ();

    fn initialize(&mut self) -> Result<(), Self::Error> {
        if self.init_ok { Ok(()) } else { Err(()) }
    }

    fn test_connection(&mut self) -> bool {
        self.self_test_ok
    }

    fn acceleration(&mut self) -> Result<RawAcceleration, Self::Error> {
        self.reads += 1;
        self.samples
            .pop_front()
            .unwrap_or(Ok([0, 0, 16_384]))
            .map(RawAcceleration::from)
    }
}

/// Records every call; `post` answers from `responses`, then 200.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    pub begin_failure: Option<TransportFailure>,
    pub header_failure: Option<TransportFailure>,
    pub responses: VecDeque<Result<u16, TransportFailure>>,
    pub begins: Vec<&'static str>,
    pub headers: Vec<(&'static str, &'static str)>,
    pub bodies: Vec<Vec<u8>>,
    pub ends: u32,
}

impl ScriptedTransport {
    pub fn push_response(&mut self, response: Result<u16, TransportFailure>) {
        self.responses.push_back(response);
    }
}

impl Transport for ScriptedTransport {
    async fn begin(&mut self, url: &CollectorUrl) -> Result<(), TransportFailure> {
        self.begins.push(url.path());
        match self.begin_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn add_header(&mut self, header: Header) -> Result<(), TransportFailure> {
        if let Some(failure) = self.header_failure {
            return Err(failure);
        }
        self.headers.push((header.name, header.value));
        Ok(())
    }

    async fn post(&mut self, body: &[u8]) -> Result<u16, TransportFailure> {
        self.bodies.push(body.to_vec());
        self.responses.pop_front().unwrap_or(Ok(200))
    }

    fn end(&mut self) {
        self.ends += 1;
    }
}

/// Returns immediately and records each requested wait in milliseconds.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}
