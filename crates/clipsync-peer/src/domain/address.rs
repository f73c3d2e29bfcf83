//! Peer address normalization.
//!
//! Users type the other machine's address in several shapes.  All of them
//! resolve to a `host:port` dial target; when no port is given the local
//! listen port is used, since both peers normally run on the same port.
//!
//! | Input                  | Result (default port 9999) |
//! |------------------------|----------------------------|
//! | `192.168.1.100`        | `192.168.1.100:9999`       |
//! | `desk.local:7000`      | `desk.local:7000`          |
//! | `[fe80::1]:7000`       | `[fe80::1]:7000`           |
//! | `[fe80::1]`            | `[fe80::1]:9999`           |
//! | `fe80::1`              | `[fe80::1]:9999`           |

use std::fmt;
use std::net::Ipv6Addr;

use thiserror::Error;

/// Reasons a peer address cannot be turned into a dial target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Nothing was supplied.
    #[error("peer address is empty")]
    Empty,

    /// A port separator was present but the host part was empty.
    #[error("peer address '{0}' has no host")]
    MissingHost(String),

    /// The port is not a number in `1..=65535`.
    #[error("invalid port '{port}' in peer address '{input}'")]
    InvalidPort { input: String, port: String },

    /// The text is neither `host`, `host:port`, nor a bracketed or bare IPv6 literal.
    #[error("malformed peer address '{0}'")]
    Malformed(String),
}

/// A resolved `host:port` dial target.
///
/// `host` never carries brackets; [`fmt::Display`] adds them back for IPv6
/// literals so the output can be handed straight to `TcpStream::connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Turns user input into a [`PeerAddress`], applying `default_port` when the
/// input does not name one.
///
/// Surrounding whitespace is ignored.  Host names are not resolved here; that
/// happens on every connect attempt so a peer whose address changes is
/// picked up without a restart.
///
/// # Errors
///
/// Returns an [`AddressError`] describing the first problem found.
pub fn normalize_peer_addr(input: &str, default_port: u16) -> Result<PeerAddress, AddressError> {
    let peer = input.trim();
    if peer.is_empty() {
        return Err(AddressError::Empty);
    }

    // Bracketed IPv6, with or without a port.
    if let Some(rest) = peer.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| AddressError::Malformed(peer.to_string()))?;
        if host.parse::<Ipv6Addr>().is_err() {
            return Err(AddressError::Malformed(peer.to_string()));
        }
        let port = match after {
            "" => default_port,
            _ => {
                let port = after
                    .strip_prefix(':')
                    .ok_or_else(|| AddressError::Malformed(peer.to_string()))?;
                parse_port(peer, port)?
            }
        };
        return Ok(PeerAddress {
            host: host.to_string(),
            port,
        });
    }

    match peer.matches(':').count() {
        0 => Ok(PeerAddress {
            host: peer.to_string(),
            port: default_port,
        }),
        1 => {
            let (host, port) = peer
                .split_once(':')
                .ok_or_else(|| AddressError::Malformed(peer.to_string()))?;
            if host.is_empty() {
                return Err(AddressError::MissingHost(peer.to_string()));
            }
            Ok(PeerAddress {
                host: host.to_string(),
                port: parse_port(peer, port)?,
            })
        }
        // More than one colon: only valid as a bare IPv6 literal.
        _ => match peer.parse::<Ipv6Addr>() {
            Ok(_) => Ok(PeerAddress {
                host: peer.to_string(),
                port: default_port,
            }),
            Err(_) => Err(AddressError::Malformed(peer.to_string())),
        },
    }
}

fn parse_port(input: &str, port: &str) -> Result<u16, AddressError> {
    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(AddressError::InvalidPort {
            input: input.to_string(),
            port: port.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
