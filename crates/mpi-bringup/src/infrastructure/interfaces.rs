use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;

use error_stack::Report;

use crate::domain::bringup::AddressError;
use crate::domain::bringup::AddressSource;

/// Interface addresses of this host, read with `getifaddrs(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl AddressSource for SystemInterfaces {
    fn interface_addresses(&self) -> Result<Vec<IpAddr>, Report<AddressError>> {
        let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
        // SAFETY: on success `head` points to a list owned by libc until freeifaddrs.
        if unsafe { libc::getifaddrs(&mut head) } != 0 {
            return Err(Report::new(AddressError::EnumerationFailed)
                .attach_printable(std::io::Error::last_os_error()));
        }

        let mut addresses = Vec::new();
        let mut cursor = head;
        while !cursor.is_null() {
            // SAFETY: `cursor` is a non-null node of the list returned above.
            let entry = unsafe { &*cursor };
            if let Some(address) = unsafe { sockaddr_to_ip(entry.ifa_addr) } {
                addresses.push(address);
            }
            cursor = entry.ifa_next;
        }

        // SAFETY: `head` came from a successful getifaddrs and is freed once.
        unsafe { libc::freeifaddrs(head) };
        Ok(addresses)
    }
}

/// # Safety
///
/// `addr` must be null or point to a valid `sockaddr` whose family matches its
/// actual layout.
unsafe fn sockaddr_to_ip(addr: *const libc::sockaddr) -> Option<IpAddr> {
    if addr.is_null() {
        return None;
    }
    match i32::from((*addr).sa_family) {
        libc::AF_INET => {
            let sin = &*(addr as *const libc::sockaddr_in);
            Some(IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr))))
        }
        libc::AF_INET6 => {
            let sin6 = &*(addr as *const libc::sockaddr_in6);
            Some(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)))
        }
        _ => None,
    }
}
