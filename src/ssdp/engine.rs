use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::ssdp::messages::{Advertisement, NotifyTarget, MAX_NOTIFY_INTERVAL, SSDP_ADDR, SSDP_DISCOVER};
use crate::ssdp::request::{self, RequestError, SsdpRequest};
use crate::ssdp::socket::{self, BindError, NetworkInterface};

/// Spread window for each multicast NOTIFY.
pub const NOTIFY_JITTER: Duration = Duration::from_millis(100);

/// Uniform random delay in `[0, window)`; zero when the window is empty.
pub fn jitter(window: Duration) -> Duration {
    let micros = window.as_micros().min(u64::MAX as u128) as u64;
    if micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::rng().random_range(0..micros))
}

/// Response-spread window for an M-SEARCH.
///
/// `MX` is only honoured when the request was sent to the multicast group;
/// anything else gets one second. A missing or malformed `MX` on a multicast
/// search is an error and the search is dropped.
pub fn search_window(req: &SsdpRequest) -> Result<Duration, RequestError> {
    if req.header("HOST") != Some(SSDP_ADDR) {
        return Ok(Duration::from_secs(1));
    }
    let mx = req.header("MX").unwrap_or_default();
    mx.parse::<u32>()
        .map(|secs| Duration::from_secs(u64::from(secs)))
        .map_err(|_| RequestError::Header(format!("MX: {mx}")))
}

/// SSDP responder for a single network interface.
///
/// Owns one socket and one shutdown token. `serve` runs the announce and
/// receive loops until the token fires; `close` sends byebye and waits for
/// every delayed send to settle before the socket is released.
pub struct SsdpEngine {
    iface: NetworkInterface,
    socket: Arc<UdpSocket>,
    adv: Arc<Advertisement>,
    shutdown: CancellationToken,
    pending: TaskTracker,
    group: SocketAddr,
}

impl SsdpEngine {
    pub fn init(
        iface: NetworkInterface,
        adv: Arc<Advertisement>,
        shutdown: CancellationToken,
    ) -> Result<Self, BindError> {
        let socket = socket::bind_multicast(&iface)?;
        Ok(Self::with_socket(iface, socket, adv, shutdown))
    }

    /// Wrap an already-bound socket. Multicast traffic goes to the SSDP group.
    pub fn with_socket(
        iface: NetworkInterface,
        socket: UdpSocket,
        adv: Arc<Advertisement>,
        shutdown: CancellationToken,
    ) -> Self {
        SsdpEngine {
            iface,
            socket: Arc::new(socket),
            adv,
            shutdown,
            pending: TaskTracker::new(),
            group: socket::ssdp_group(),
        }
    }

    /// Redirect "multicast" sends (NOTIFY alive/byebye) to another address.
    pub fn with_group(mut self, group: SocketAddr) -> Self {
        self.group = group;
        self
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until shutdown. A socket read error ends only the receive loop;
    /// announcements continue until the token fires.
    pub async fn serve(&self) {
        tokio::join!(self.announce_loop(), self.receive_loop());
    }

    pub async fn close(self) {
        self.shutdown.cancel();

        for target in &self.adv.targets {
            let msg = self.adv.notify_byebye(target);
            send(&self.socket, msg.as_bytes(), self.group, &self.iface.name).await;
        }

        self.pending.close();
        self.pending.wait().await;
        tracing::debug!("SSDP: {}: closed", self.iface.name);
    }

    async fn announce_loop(&self) {
        // tokio panics on a zero period and overflows on a huge one.
        let period = self.adv.notify_interval.clamp(Duration::from_secs(1), MAX_NOTIFY_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = ticker.tick() => {
                    self.notify_alive();
                }
            }
        }
    }

    /// One jittered `ssdp:alive` per target for every advertisable address.
    pub fn notify_alive(&self) -> usize {
        let mut scheduled = 0;
        for ip in self.iface.announce_addrs() {
            let location = self.adv.location(ip);
            for target in &self.adv.targets {
                let msg = self.adv.notify_alive(target, &location);
                self.delayed_send(jitter(NOTIFY_JITTER), msg.into_bytes(), self.group);
                scheduled += 1;
            }
        }
        scheduled
    }

    async fn receive_loop(&self) {
        let mut buf = vec![0u8; self.iface.recv_buffer_len()];
        loop {
            let received = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                r = self.socket.recv_from(&mut buf) => r,
            };
            match received {
                Ok((len, sender)) => {
                    self.handle_datagram(&buf[..len], sender);
                }
                Err(e) => {
                    if !self.shutdown.is_cancelled() {
                        tracing::warn!(
                            "SSDP: {}: error reading from UDP socket, no longer answering searches: {}",
                            self.iface.name,
                            e
                        );
                    }
                    return;
                }
            }
        }
    }

    /// Answer one inbound datagram. Returns the number of responses scheduled.
    ///
    /// Anything that is not a well-formed `M-SEARCH` for `ssdp:discover` is
    /// ignored; LANs carry plenty of such noise.
    pub fn handle_datagram(&self, datagram: &[u8], sender: SocketAddr) -> usize {
        let req = match request::parse(datagram) {
            Ok(req) => req,
            Err(e) => {
                tracing::trace!("SSDP: {}: dropping datagram from {}: {}", self.iface.name, sender, e);
                return 0;
            }
        };
        if req.method != "M-SEARCH" || req.header("MAN") != Some(SSDP_DISCOVER) {
            return 0;
        }
        let window = match search_window(&req) {
            Ok(window) => window,
            Err(e) => {
                tracing::debug!("SSDP: {}: invalid search from {}: {}", self.iface.name, sender, e);
                return 0;
            }
        };

        let st = req.header("ST").unwrap_or_default();
        let targets: Vec<&NotifyTarget> = self.adv.resolve(st);
        if targets.is_empty() {
            return 0;
        }

        let mut scheduled = 0;
        for ip in self.iface.response_addrs(sender.ip()) {
            let location = self.adv.location(ip);
            for target in &targets {
                let msg = self.adv.search_response(target, &location);
                self.delayed_send(jitter(window), msg.into_bytes(), sender);
                scheduled += 1;
            }
        }
        if scheduled > 0 {
            tracing::debug!(
                "SSDP: {}: answering M-SEARCH ST={} from {} ({} responses)",
                self.iface.name,
                st,
                sender,
                scheduled
            );
        }
        scheduled
    }

    /// Send `payload` to `dest` after `delay`, unless shutdown fires first.
    /// The token is checked again right before the write.
    pub fn delayed_send(&self, delay: Duration, payload: Vec<u8>, dest: SocketAddr) {
        let socket = Arc::clone(&self.socket);
        let shutdown = self.shutdown.clone();
        let iface = self.iface.name.clone();
        self.pending.spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !shutdown.is_cancelled() {
                        send(&socket, &payload, dest, &iface).await;
                    }
                }
            }
        });
    }
}

async fn send(socket: &UdpSocket, payload: &[u8], dest: SocketAddr, iface: &str) {
    match socket.send_to(payload, dest).await {
        Ok(n) if n != payload.len() => {
            tracing::warn!("SSDP: {}: short write to {}: {}/{} bytes", iface, dest, n, payload.len());
        }
        Ok(_) => {}
        Err(e) => {
            tracing::debug!("SSDP: {}: error writing to {}: {}", iface, dest, e);
        }
    }
}
