//! Data-channel negotiation: `PASV`/`EPSV`/`PORT`/`EPRT` address decoding
//! and the address-fixup security check.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::error::DataChannelError;

/// How the data connection for a transfer is established.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DataChannelMode {
    /// The session asked the server to listen (`PASV`/`EPSV`) and connects to it.
    Passive,
    /// The session listens and told the server where to connect (`PORT`/`EPRT`).
    Active,
    /// Server-to-server transfer: both peers are FTP servers, negotiated
    /// with `PASV` on one leg and `PORT`/`EPRT` on the other, optionally
    /// preceded by a `PRET` if the destination advertised support for it.
    Fxp,
}

/// Parses a `227` PASV reply body into the six comma-separated integers
/// `h1,h2,h3,h4,p1,p2` and combines them into an address.
///
/// # Errors
///
/// Returns [`DataChannelError::MalformedPasv`] if fewer than six integers
/// can be extracted from the text, or any integer doesn't fit a `u8`/port.
pub fn parse_pasv_reply(text: &str) -> Result<SocketAddr, DataChannelError> {
    let numbers = extract_u16_sequence(text, 6)
        .ok_or_else(|| DataChannelError::MalformedPasv(text.to_string()))?;
    let octets = [numbers[0], numbers[1], numbers[2], numbers[3]];
    for octet in octets {
        if octet > u16::from(u8::MAX) {
            return Err(DataChannelError::MalformedPasv(text.to_string()));
        }
    }
    let ip = Ipv4Addr::new(
        octets[0] as u8,
        octets[1] as u8,
        octets[2] as u8,
        octets[3] as u8,
    );
    let port = numbers[4] * 256 + numbers[5];
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Parses a `229` EPSV reply body: a port number between three identical
/// delimiter characters, e.g. `(|||5282|)`. The address family and host are
/// not included in EPSV replies; the caller supplies the control
/// connection's own peer address for the host part.
///
/// # Errors
///
/// Returns [`DataChannelError::MalformedEpsv`] if no `<delim><delim><delim><port><delim>`
/// pattern is found.
pub fn parse_epsv_reply(text: &str) -> Result<u16, DataChannelError> {
    let open = text
        .find('(')
        .ok_or_else(|| DataChannelError::MalformedEpsv(text.to_string()))?;
    let close = text[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or_else(|| DataChannelError::MalformedEpsv(text.to_string()))?;
    let body = &text[open + 1..close];
    let delim = body
        .chars()
        .next()
        .ok_or_else(|| DataChannelError::MalformedEpsv(text.to_string()))?;
    let mut parts = body.split(delim);
    let (first, second, port_str, _) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    );
    if first != Some("") || second != Some("") {
        return Err(DataChannelError::MalformedEpsv(text.to_string()));
    }
    port_str
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| DataChannelError::MalformedEpsv(text.to_string()))
}

/// Encodes a `PORT` command argument for an IPv4 address:
/// `h1,h2,h3,h4,p1,p2`.
#[must_use]
pub fn encode_port(addr: &std::net::SocketAddrV4) -> String {
    let octets = addr.ip().octets();
    let port = addr.port();
    format!(
        "{},{},{},{},{},{}",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port >> 8,
        port & 0xff
    )
}

/// Encodes an `EPRT` command argument: `|<family>|<address>|<port>|`, with
/// family `1` for IPv4 and `2` for IPv6.
#[must_use]
pub fn encode_eprt(addr: &SocketAddr) -> String {
    match addr {
        SocketAddr::V4(v4) => format!("|1|{}|{}|", v4.ip(), v4.port()),
        SocketAddr::V6(v6) => format!("|2|{}|{}|", v6.ip(), v6.port()),
    }
}

/// Parses an `EPRT` command argument back into an address, the form a
/// server-side peer (or a test double acting as one) would decode.
///
/// # Errors
///
/// Returns [`DataChannelError::UnsupportedFamily`] for any family digit
/// other than `1` or `2`.
pub fn decode_eprt(arg: &str) -> Result<SocketAddr, DataChannelError> {
    let trimmed = arg.trim();
    let delim = trimmed
        .chars()
        .next()
        .ok_or_else(|| DataChannelError::UnsupportedFamily(arg.to_string()))?;
    let mut parts = trimmed.trim_matches(delim).split(delim);
    let family = parts
        .next()
        .ok_or_else(|| DataChannelError::UnsupportedFamily(arg.to_string()))?;
    let host = parts
        .next()
        .ok_or_else(|| DataChannelError::UnsupportedFamily(arg.to_string()))?;
    let port: u16 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| DataChannelError::UnsupportedFamily(arg.to_string()))?;
    match family {
        "1" => {
            let ip: Ipv4Addr = host
                .parse()
                .map_err(|_| DataChannelError::UnsupportedFamily(arg.to_string()))?;
            Ok(SocketAddr::new(IpAddr::V4(ip), port))
        }
        "2" => {
            let ip: Ipv6Addr = host
                .parse()
                .map_err(|_| DataChannelError::UnsupportedFamily(arg.to_string()))?;
            Ok(SocketAddr::new(IpAddr::V6(ip), port))
        }
        other => Err(DataChannelError::UnsupportedFamily(other.to_string())),
    }
}

/// Checks a data connection's peer address against the control connection's
/// peer address and the port a `PASV`/`EPSV` reply actually advertised,
/// guarding against an `FTP bounce` style attack where a malicious server
/// points the data channel at an unrelated third host.
///
/// `verify_address` rejects a data peer whose IP differs from the control
/// peer's IP (the common case: trust `PASV`/`EPSV` addresses only when they
/// match where the control connection is actually talking to).
/// `verify_port` rejects a data peer whose port differs from
/// `advertised_port`; when `false`, a peer reached through a different port
/// than advertised is still accepted (some load balancers rewrite the port
/// in flight while leaving the address intact), so only `verify_address`
/// need hold.
#[must_use]
pub fn data_address_ok(
    observed: SocketAddr,
    control_peer: IpAddr,
    advertised_port: u16,
    verify_address: bool,
    verify_port: bool,
) -> bool {
    if verify_address && observed.ip() != control_peer {
        return false;
    }
    if verify_port && observed.port() != advertised_port {
        return false;
    }
    true
}

fn extract_u16_sequence(text: &str, count: usize) -> Option<Vec<u16>> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for ch in text.chars().chain(std::iter::once(',')) {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            numbers.push(current.parse::<u16>().ok()?);
            current.clear();
            if numbers.len() == count {
                return Some(numbers);
            }
        }
    }
    None
}
