use core::{net::Ipv4Addr, task::Poll};

use embassy_net::{
    IpAddress, IpEndpoint, Stack,
    dns::DnsQueryType,
    tcp::{ConnectError, TcpSocket},
};
use embassy_time::{Duration, with_timeout};
use embedded_io_async::Write;
use heapless::Vec;
use log::{debug, warn};
use tiltlink_core::{
    delivery::{Transport, TransportFailure},
    http::{self, Header, StatusLineReader},
    url::CollectorUrl,
};

pub const DEFAULT_HTTP_RX_BYTES: usize = 512;
pub const DEFAULT_HTTP_TX_BYTES: usize = 1024;

const MAX_HEADERS: usize = 4;
const READ_CHUNK_BYTES: usize = 64;
const SOCKET_TIMEOUT_SECS: u64 = 10;
const CLOSE_GRACE_MS: u64 = 500;

#[derive(Clone, Copy, Debug)]
struct Target {
    url: CollectorUrl,
    endpoint: IpEndpoint,
}

/// Plain HTTP/1.1 POST client on one `embassy-net` TCP socket.
///
/// The socket only lives inside `post`; `begin` resolves the endpoint and
/// `end` forgets it together with any headers.
pub struct HttpTransport<
    'd,
    const RX: usize = DEFAULT_HTTP_RX_BYTES,
    const TX: usize = DEFAULT_HTTP_TX_BYTES,
> {
    stack: Stack<'d>,
    rx_buffer: [u8; RX],
    tx_buffer: [u8; TX],
    target: Option<Target>,
    headers: Vec<Header, MAX_HEADERS>,
}

impl<'d, const RX: usize, const TX: usize> HttpTransport<'d, RX, TX> {
    pub fn new(stack: Stack<'d>) -> Self {
        Self {
            stack,
            rx_buffer: [0; RX],
            tx_buffer: [0; TX],
            target: None,
            headers: Vec::new(),
        }
    }

    async fn resolve(&self, host: &str) -> Result<IpAddress, TransportFailure> {
        if let Ok(addr) = host.parse::<Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(addr));
        }

        let addrs = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|err| {
                warn!("dns lookup for {} failed: {:?}", host, err);
                TransportFailure::Connect
            })?;
        addrs.first().copied().ok_or_else(|| {
            warn!("dns lookup for {} returned no address", host);
            TransportFailure::Connect
        })
    }
}

impl<const RX: usize, const TX: usize> Transport for HttpTransport<'_, RX, TX> {
    async fn begin(&mut self, url: &CollectorUrl) -> Result<(), TransportFailure> {
        let address = self.resolve(url.host()).await?;
        self.target = Some(Target {
            url: *url,
            endpoint: IpEndpoint::new(address, url.port()),
        });
        Ok(())
    }

    fn add_header(&mut self, header: Header) -> Result<(), TransportFailure> {
        self.headers
            .push(header)
            .map_err(|_| TransportFailure::OutOfMemory)
    }

    async fn post(&mut self, body: &[u8]) -> Result<u16, TransportFailure> {
        let Some(target) = self.target else {
            return Err(TransportFailure::NotConnected);
        };
        let head = http::write_post_head(&target.url, &self.headers, body.len())
            .map_err(|_| TransportFailure::OutOfMemory)?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)));

        let result = exchange(&mut socket, target.endpoint, head.as_bytes(), body).await;

        socket.close();
        let _ = with_timeout(Duration::from_millis(CLOSE_GRACE_MS), socket.flush()).await;
        result
    }

    fn end(&mut self) {
        self.target = None;
        self.headers.clear();
    }
}

async fn exchange(
    socket: &mut TcpSocket<'_>,
    endpoint: IpEndpoint,
    head: &[u8],
    body: &[u8],
) -> Result<u16, TransportFailure> {
    socket.connect(endpoint).await.map_err(|err| {
        match err {
            ConnectError::TimedOut => warn!("tcp connect to {} timed out", endpoint),
            other => warn!("tcp connect to {} failed: {:?}", endpoint, other),
        }
        TransportFailure::Connect
    })?;

    socket
        .write_all(head)
        .await
        .map_err(|_| TransportFailure::SendHeader)?;
    socket
        .write_all(body)
        .await
        .map_err(|_| TransportFailure::SendPayload)?;
    socket
        .flush()
        .await
        .map_err(|_| TransportFailure::SendPayload)?;

    with_timeout(Duration::from_secs(SOCKET_TIMEOUT_SECS), read_status(socket))
        .await
        .map_err(|_| TransportFailure::ReadTimeout)?
}

async fn read_status(socket: &mut TcpSocket<'_>) -> Result<u16, TransportFailure> {
    let mut reader = StatusLineReader::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        let read = socket
            .read(&mut chunk)
            .await
            .map_err(|_| TransportFailure::ConnectionLost)?;
        if let Poll::Ready(result) = reader.push(&chunk[..read]) {
            debug!("http status decided after bytes={}", reader.buffered());
            return result;
        }
    }
}
