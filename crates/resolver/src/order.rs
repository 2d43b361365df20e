//! Address-family preference ordering (`dns:order`).

/// An address family a resolver may prefer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AddressFamily {
    /// IPv4.
    Inet,
    /// IPv6.
    Inet6,
}

/// Parses the `dns:order` resource (a comma-separated preference list,
/// e.g. `"inet6,inet"`) into an ordered family list. Unknown tokens are
/// skipped rather than rejected, since a future family name should degrade
/// gracefully instead of breaking every session that inherited an old
/// config.
#[must_use]
pub fn parse_order(spec: &str) -> Vec<AddressFamily> {
    spec.split(',')
        .filter_map(|token| match token.trim().to_ascii_lowercase().as_str() {
            "inet" | "ipv4" => Some(AddressFamily::Inet),
            "inet6" | "ipv6" => Some(AddressFamily::Inet6),
            _ => None,
        })
        .collect()
}

/// The default preference order when `dns:order` is unset: IPv4 before IPv6.
#[must_use]
pub fn default_order() -> Vec<AddressFamily> {
    vec![AddressFamily::Inet, AddressFamily::Inet6]
}

/// Sorts `addresses` so families appear in `order`'s preference, with any
/// family not mentioned in `order` sorted last, relative order preserved
/// within each family (a stable sort).
pub fn sort_by_preference<T>(addresses: &mut [T], order: &[AddressFamily], family_of: impl Fn(&T) -> AddressFamily) {
    addresses.sort_by_key(|addr| {
        let family = family_of(addr);
        order.iter().position(|f| *f == family).unwrap_or(order.len())
    });
}
