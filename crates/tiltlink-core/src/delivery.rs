//! One request/response exchange with the collector per reading.

use log::{info, warn};

use crate::{
    http::Header,
    payload::{CONTENT_TYPE, Payload},
    reading::Reading,
    url::CollectorUrl,
};

/// Where a transport exchange broke down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportFailure {
    /// Name resolution or TCP connect failed.
    Connect,
    SendHeader,
    SendPayload,
    /// `post` without a successful `begin`.
    NotConnected,
    /// Peer closed before a full status line arrived.
    ConnectionLost,
    /// Response did not start with an HTTP status line.
    NoHttpServer,
    /// Request or payload did not fit its buffer.
    OutOfMemory,
    ReadTimeout,
}

impl TransportFailure {
    /// Negative sentinel reported in place of a status code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Connect => -1,
            Self::SendHeader => -2,
            Self::SendPayload => -3,
            Self::NotConnected => -4,
            Self::ConnectionLost => -5,
            Self::NoHttpServer => -7,
            Self::OutOfMemory => -8,
            Self::ReadTimeout => -11,
        }
    }
}

/// HTTP client seam. A request is opened by `begin`, used by `add_header` and
/// `post`, and released by `end`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn begin(&mut self, url: &CollectorUrl) -> Result<(), TransportFailure>;

    fn add_header(&mut self, header: Header) -> Result<(), TransportFailure>;

    /// Sends `body` and returns the response status code.
    async fn post(&mut self, body: &[u8]) -> Result<u16, TransportFailure>;

    /// Releases everything `begin` acquired. Must be safe to call at any point.
    fn end(&mut self);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeliveryOutcome {
    /// The collector answered; any status, including errors.
    Status(u16),
    Failed(TransportFailure),
}

impl DeliveryOutcome {
    /// Status code, or the failure's negative sentinel.
    pub const fn code(self) -> i32 {
        match self {
            Self::Status(status) => status as i32,
            Self::Failed(failure) => failure.code(),
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Status(200..=299))
    }
}

/// Calls [`Transport::end`] on drop so every exit path releases the request.
struct OpenRequest<'t, T>
where
    T: Transport,
{
    transport: &'t mut T,
}

impl<T> Drop for OpenRequest<'_, T>
where
    T: Transport,
{
    fn drop(&mut self) {
        self.transport.end();
    }
}

#[derive(Debug)]
pub struct DeliveryClient<T> {
    transport: T,
    url: CollectorUrl,
}

impl<T> DeliveryClient<T>
where
    T: Transport,
{
    pub fn new(transport: T, url: CollectorUrl) -> Self {
        Self { transport, url }
    }

    pub fn url(&self) -> &CollectorUrl {
        &self.url
    }

    /// Serializes `reading` and posts it once. Never retries.
    pub async fn deliver(&mut self, reading: &Reading) -> DeliveryOutcome {
        let payload = match Payload::encode(reading) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("payload encode failed: {:?} reading={:?}", err, reading);
                return DeliveryOutcome::Failed(TransportFailure::OutOfMemory);
            }
        };

        let outcome = match self.exchange(&payload).await {
            Ok(status) => DeliveryOutcome::Status(status),
            Err(failure) => DeliveryOutcome::Failed(failure),
        };

        info!("sent data: {}", payload.as_str());
        match outcome {
            DeliveryOutcome::Status(status) => info!("response code: {}", status),
            DeliveryOutcome::Failed(failure) => {
                warn!("response code: {} ({:?})", failure.code(), failure)
            }
        }
        outcome
    }

    async fn exchange(&mut self, payload: &Payload) -> Result<u16, TransportFailure> {
        let mut request = OpenRequest {
            transport: &mut self.transport,
        };
        request.transport.begin(&self.url).await?;
        request
            .transport
            .add_header(Header::new("Content-Type", CONTENT_TYPE))?;
        request.transport.post(payload.as_bytes()).await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn release(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::fakes::ScriptedTransport;

    fn client(transport: ScriptedTransport) -> DeliveryClient<ScriptedTransport> {
        let url = CollectorUrl::parse("http://collector:5000/accelerometer").unwrap();
        DeliveryClient::new(transport, url)
    }

    #[test]
    fn successful_post_reports_status_and_releases() {
        let mut client = client(ScriptedTransport::default());

        let outcome = block_on(client.deliver(&Reading::new(1.0, -0.5, 0.0)));
        assert_eq!(outcome, DeliveryOutcome::Status(200));
        assert_eq!(outcome.code(), 200);
        assert!(outcome.is_success());

        let transport = client.release();
        assert_eq!(transport.begins, ["/accelerometer"]);
        assert_eq!(transport.headers, [("Content-Type", "application/json")]);
        assert_eq!(transport.bodies, [br#"{"x":1.00, "y":-0.50, "z":0.00}"#.to_vec()]);
        assert_eq!(transport.ends, 1);
    }

    #[test]
    fn connect_error_yields_sentinel_and_releases() {
        let mut transport = ScriptedTransport::default();
        transport.begin_failure = Some(TransportFailure::Connect);
        let mut client = client(transport);

        let outcome = block_on(client.deliver(&Reading::default()));
        assert_eq!(outcome, DeliveryOutcome::Failed(TransportFailure::Connect));
        assert_eq!(outcome.code(), -1);

        let transport = client.release();
        assert!(transport.bodies.is_empty());
        assert_eq!(transport.ends, 1);
    }

    #[test]
    fn post_failure_is_not_retried() {
        let mut transport = ScriptedTransport::default();
        transport.push_response(Err(TransportFailure::ReadTimeout));
        let mut client = client(transport);

        let outcome = block_on(client.deliver(&Reading::default()));
        assert_eq!(outcome.code(), -11);

        let transport = client.release();
        assert_eq!(transport.bodies.len(), 1);
        assert_eq!(transport.ends, 1);
    }

    #[test]
    fn header_failure_skips_post_and_releases() {
        let mut transport = ScriptedTransport::default();
        transport.header_failure = Some(TransportFailure::OutOfMemory);
        let mut client = client(transport);

        let outcome = block_on(client.deliver(&Reading::default()));
        assert_eq!(outcome, DeliveryOutcome::Failed(TransportFailure::OutOfMemory));

        let transport = client.release();
        assert!(transport.bodies.is_empty());
        assert_eq!(transport.ends, 1);
    }

    #[test]
    fn server_error_status_is_reported_not_treated_as_failure() {
        let mut transport = ScriptedTransport::default();
        transport.push_response(Ok(503));
        let mut client = client(transport);

        let outcome = block_on(client.deliver(&Reading::default()));
        assert_eq!(outcome, DeliveryOutcome::Status(503));
        assert!(!outcome.is_success());
    }

    #[test]
    fn unencodable_reading_never_opens_a_request() {
        let mut client = client(ScriptedTransport::default());

        let outcome = block_on(client.deliver(&Reading::new(f32::MAX, 0.0, 0.0)));
        assert_eq!(outcome.code(), -8);
        assert!(client.transport().begins.is_empty());
        assert_eq!(client.transport().ends, 0);
    }

    #[test]
    fn sentinels_are_distinct_and_negative() {
        let all = [
            TransportFailure::Connect,
            TransportFailure::SendHeader,
            TransportFailure::SendPayload,
            TransportFailure::NotConnected,
            TransportFailure::ConnectionLost,
            TransportFailure::NoHttpServer,
            TransportFailure::OutOfMemory,
            TransportFailure::ReadTimeout,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(a.code() < 0);
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
