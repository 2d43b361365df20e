//! Wire protocol spoken between a resolver task and its fork()ed lookup
//! helper when synchronous libc resolution is pushed off the scheduler's
//! thread.
//!
//! A message is a single tag byte followed by a payload:
//!
//! - `b'E'`: hostname resolution failed; the payload is the UTF-8 error
//!   text, and the caller prefixes it with the hostname being looked up.
//! - `b'P'`: port or service lookup failed; the payload is the UTF-8 error
//!   text, and the caller prefixes it with the port or service name.
//! - anything else: the whole message (tag byte included) is address data —
//!   a sequence of encoded [`SocketAddr`] entries with no leading tag
//!   consumed for the success case.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

const TAG_HOST_ERROR: u8 = b'E';
const TAG_PORT_ERROR: u8 = b'P';

const FAMILY_V4: u8 = 4;
const FAMILY_V6: u8 = 6;

/// A decoded child-protocol message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChildMessage {
    /// The hostname could not be resolved.
    HostError(String),
    /// The port or service name could not be resolved.
    PortError(String),
    /// Resolved addresses, in the order the child produced them.
    Addresses(Vec<SocketAddr>),
}

/// Errors decoding a raw child message.
#[derive(Debug, thiserror::Error)]
pub enum ChildProtocolError {
    #[error("truncated child message")]
    Truncated,
    #[error("unknown address family tag {0}")]
    UnknownFamily(u8),
    #[error("child message was not valid UTF-8")]
    InvalidText,
}

/// Encodes a host-error message: tag `E` followed by the error text.
#[must_use]
pub fn encode_host_error(text: &str) -> Vec<u8> {
    let mut out = vec![TAG_HOST_ERROR];
    out.extend_from_slice(text.as_bytes());
    out
}

/// Encodes a port-error message: tag `P` followed by the error text.
#[must_use]
pub fn encode_port_error(text: &str) -> Vec<u8> {
    let mut out = vec![TAG_PORT_ERROR];
    out.extend_from_slice(text.as_bytes());
    out
}

/// Encodes a successful lookup as a flat sequence of address entries, each
/// `family(1) + port(2 BE) + address bytes(4 or 16)`.
#[must_use]
pub fn encode_addresses(addresses: &[SocketAddr]) -> Vec<u8> {
    let mut out = Vec::new();
    for addr in addresses {
        match addr {
            SocketAddr::V4(v4) => {
                out.push(FAMILY_V4);
                out.extend_from_slice(&v4.port().to_be_bytes());
                out.extend_from_slice(&v4.ip().octets());
            }
            SocketAddr::V6(v6) => {
                out.push(FAMILY_V6);
                out.extend_from_slice(&v6.port().to_be_bytes());
                out.extend_from_slice(&v6.ip().octets());
            }
        }
    }
    out
}

/// Decodes a raw child message. The first byte disambiguates error tags
/// from address data; anything not `E` or `P` is parsed as a sequence of
/// address entries starting at byte 0 (the success path consumes no tag
/// byte, matching the wire format the forked helper actually writes).
pub fn decode(raw: &[u8]) -> Result<ChildMessage, ChildProtocolError> {
    if let Some(&first) = raw.first() {
        if first == TAG_HOST_ERROR {
            let text = std::str::from_utf8(&raw[1..]).map_err(|_| ChildProtocolError::InvalidText)?;
            return Ok(ChildMessage::HostError(text.to_string()));
        }
        if first == TAG_PORT_ERROR {
            let text = std::str::from_utf8(&raw[1..]).map_err(|_| ChildProtocolError::InvalidText)?;
            return Ok(ChildMessage::PortError(text.to_string()));
        }
    }
    decode_addresses(raw).map(ChildMessage::Addresses)
}

fn decode_addresses(raw: &[u8]) -> Result<Vec<SocketAddr>, ChildProtocolError> {
    let mut addresses = Vec::new();
    let mut cursor = 0usize;
    while cursor < raw.len() {
        let family = *raw.get(cursor).ok_or(ChildProtocolError::Truncated)?;
        cursor += 1;
        let port_bytes = raw
            .get(cursor..cursor + 2)
            .ok_or(ChildProtocolError::Truncated)?;
        let port = u16::from_be_bytes([port_bytes[0], port_bytes[1]]);
        cursor += 2;
        match family {
            FAMILY_V4 => {
                let octets = raw.get(cursor..cursor + 4).ok_or(ChildProtocolError::Truncated)?;
                let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
                addresses.push(SocketAddr::new(IpAddr::V4(ip), port));
                cursor += 4;
            }
            FAMILY_V6 => {
                let bytes = raw.get(cursor..cursor + 16).ok_or(ChildProtocolError::Truncated)?;
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                let ip = Ipv6Addr::from(octets);
                addresses.push(SocketAddr::new(IpAddr::V6(ip), port));
                cursor += 16;
            }
            other => return Err(ChildProtocolError::UnknownFamily(other)),
        }
    }
    Ok(addresses)
}
