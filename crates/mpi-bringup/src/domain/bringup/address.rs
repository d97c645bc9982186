use std::net::IpAddr;
use std::net::Ipv4Addr;

use error_stack::Report;

use super::traits::AddressError;
use super::traits::AddressSource;

/// Returns the first non-loopback IPv4 address in enumeration order.
///
/// Order matters: the first match wins, not the lowest or most preferred one.
pub fn resolve_local_address<S: AddressSource + ?Sized>(
    source: &S,
) -> Result<Ipv4Addr, Report<AddressError>> {
    let addresses = source.interface_addresses()?;
    addresses
        .iter()
        .find_map(|address| match address {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(*v4),
            _ => None,
        })
        .ok_or_else(|| {
            Report::new(AddressError::NoAddressFound)
                .attach_printable(format!("scanned {} interface addresses", addresses.len()))
        })
}
