//! Peer address normalization.
//!
//! Transport layers hand out remote addresses as `host:port` strings
//! (`198.51.100.7:8443`, `[2001:db8::1]:443`). Rules are matched against the
//! bare address, so the port has to go first.

use std::net::IpAddr;

use super::{AccessError, Result};

const MISSING_PORT: &str = "missing port in address";
const MISSING_BRACKET: &str = "missing ']' in address";
const TOO_MANY_COLONS: &str = "too many colons in address";
const UNEXPECTED_OPEN_BRACKET: &str = "unexpected '[' in address";
const UNEXPECTED_CLOSE_BRACKET: &str = "unexpected ']' in address";

/// Extract the bare address from a raw peer address.
///
/// - `"host:port"` and `"[v6]:port"` yield the host part.
/// - A bare IP literal without a port is returned unchanged.
/// - Anything else yields an empty string, which every configured checker
///   rejects as an invalid address.
pub fn extract_address(raw: &str) -> &str {
    match split_host_port(raw) {
        Ok((host, _)) => host,
        Err(_) if raw.parse::<IpAddr>().is_ok() => raw,
        Err(_) => "",
    }
}

/// Split a `host:port`, `[host]:port` or `[host%zone]:port` string.
///
/// The host is returned without brackets and is not validated as an IP
/// literal. The port may be empty.
pub fn split_host_port(hostport: &str) -> Result<(&str, &str)> {
    let Some(colon) = hostport.rfind(':') else {
        return invalid(hostport, MISSING_PORT);
    };

    // Offsets after which stray '[' / ']' are not allowed.
    let (host, open_from, close_from) = if hostport.starts_with('[') {
        let Some(end) = hostport.find(']') else {
            return invalid(hostport, MISSING_BRACKET);
        };
        let after = end + 1;
        if after == hostport.len() {
            return invalid(hostport, MISSING_PORT);
        }
        if after != colon {
            // "[::1]x:80" or "[::1]::80"
            if hostport.as_bytes()[after] == b':' {
                return invalid(hostport, TOO_MANY_COLONS);
            }
            return invalid(hostport, MISSING_PORT);
        }
        (&hostport[1..end], 1, after)
    } else {
        let host = &hostport[..colon];
        if host.contains(':') {
            return invalid(hostport, TOO_MANY_COLONS);
        }
        (host, 0, 0)
    };

    if hostport[open_from..].contains('[') {
        return invalid(hostport, UNEXPECTED_OPEN_BRACKET);
    }
    if hostport[close_from..].contains(']') {
        return invalid(hostport, UNEXPECTED_CLOSE_BRACKET);
    }

    Ok((host, &hostport[colon + 1..]))
}

fn invalid<T>(hostport: &str, reason: &'static str) -> Result<T> {
    Err(AccessError::InvalidPeerAddress(hostport.to_string(), reason))
}
