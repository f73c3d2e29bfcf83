//! Runtime settings.
//!
//! [`PeerSettings`] is the single source of truth for a running peer.  It is
//! assembled once at startup from the configuration file and the command
//! line, then split into the pieces each task needs.  Nothing in here reads
//! the environment; that is done by the binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clipsync_core::{DEFAULT_BACKOFF_CAP, DEFAULT_BACKOFF_FLOOR};

use crate::domain::address::PeerAddress;

/// Port both peers listen on unless told otherwise.
pub const DEFAULT_LISTEN_PORT: u16 = 9999;

/// Keepalive intervals an inbound connection may stay silent before it is
/// treated as dead.  Both peers are assumed to use the same interval.
pub const INBOUND_IDLE_KEEPALIVES: u32 = 3;

/// Timing knobs for the outbound connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorSettings {
    /// Upper bound on a single connect attempt.
    pub connect_timeout: Duration,
    /// Upper bound on writing one frame; a timed-out send counts as a failure.
    pub send_timeout: Duration,
    /// Idle time after which an empty frame is sent to probe the connection.
    pub keepalive_interval: Duration,
    /// First reconnect delay after a failure.
    pub backoff_floor: Duration,
    /// Largest reconnect delay.
    pub backoff_cap: Duration,
}

impl Default for ConnectorSettings {
    /// | Field              | Default |
    /// |--------------------|---------|
    /// | connect_timeout    | 3 s     |
    /// | send_timeout       | 10 s    |
    /// | keepalive_interval | 10 s    |
    /// | backoff_floor      | 500 ms  |
    /// | backoff_cap        | 8 s     |
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            send_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(10),
            backoff_floor: DEFAULT_BACKOFF_FLOOR,
            backoff_cap: DEFAULT_BACKOFF_CAP,
        }
    }
}

/// Everything a peer needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSettings {
    /// Where the outbound connector dials.
    pub peer: PeerAddress,
    /// Where the inbound listener binds.
    pub listen_addr: SocketAddr,
    /// How often the local clipboard is polled.
    pub poll_interval: Duration,
    /// Send the clipboard content found at startup instead of only using it
    /// as the change-detection baseline.
    pub sync_on_start: bool,
    pub connector: ConnectorSettings,
}

impl PeerSettings {
    /// Settings with every default applied and the given dial target.
    pub fn with_peer(peer: PeerAddress) -> Self {
        Self {
            peer,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_LISTEN_PORT),
            poll_interval: Duration::from_millis(500),
            sync_on_start: false,
            connector: ConnectorSettings::default(),
        }
    }

    /// How long an inbound connection may go without a frame, keepalives
    /// included, before the handler closes it.
    pub fn inbound_idle_timeout(&self) -> Duration {
        self.connector
            .keepalive_interval
            .saturating_mul(INBOUND_IDLE_KEEPALIVES)
    }
}

/// Parses a human-written duration.
///
/// Accepts an integer followed by `ms`, `s`, or `m`, or a bare integer of
/// milliseconds: `250ms`, `2s`, `1m`, `750`.  Zero is rejected because every
/// duration here drives a timer.
///
/// The `Result<_, String>` shape lets clap use it directly as a value parser.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    let (digits, unit_ms): (&str, u64) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else {
        (s, 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration '{input}' (expected e.g. 500ms, 2s, 1m)"))?;
    let millis = value
        .checked_mul(unit_ms)
        .ok_or_else(|| format!("duration '{input}' is too large"))?;
    if millis == 0 {
        return Err(format!("duration '{input}' must be greater than zero"));
    }
    Ok(Duration::from_millis(millis))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> PeerAddress {
        PeerAddress {
            host: "10.0.0.5".to_string(),
            port: 9999,
        }
    }

    #[test]
    fn test_default_connector_timings() {
        let s = ConnectorSettings::default();
        assert_eq!(s.connect_timeout, Duration::from_secs(3));
        assert_eq!(s.send_timeout, Duration::from_secs(10));
        assert_eq!(s.keepalive_interval, Duration::from_secs(10));
        assert_eq!(s.backoff_floor, Duration::from_millis(500));
        assert_eq!(s.backoff_cap, Duration::from_secs(8));
    }

    #[test]
    fn test_with_peer_applies_defaults() {
        // Arrange / Act
        let s = PeerSettings::with_peer(peer());

        // Assert
        assert_eq!(s.listen_addr.to_string(), "0.0.0.0:9999");
        assert_eq!(s.poll_interval, Duration::from_millis(500));
        assert!(!s.sync_on_start);
        assert_eq!(s.peer.to_string(), "10.0.0.5:9999");
    }

    #[test]
    fn test_inbound_idle_timeout_spans_several_keepalives() {
        let mut s = PeerSettings::with_peer(peer());
        assert_eq!(s.inbound_idle_timeout(), Duration::from_secs(30));

        s.connector.keepalive_interval = Duration::from_millis(200);
        assert_eq!(s.inbound_idle_timeout(), Duration::from_millis(600));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_duration_bare_number_is_milliseconds() {
        assert_eq!(parse_duration("750"), Ok(Duration::from_millis(750)));
    }

    #[test]
    fn test_parse_duration_tolerates_whitespace() {
        assert_eq!(parse_duration(" 3 s "), Ok(Duration::from_secs(3)));
    }

    #[test]
    fn test_parse_duration_rejects_zero() {
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("0").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("1.5s").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("5h").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
    }
}
