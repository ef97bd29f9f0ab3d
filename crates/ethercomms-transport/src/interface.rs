use tracing::debug;

use crate::addr::MacAddr;
use crate::error::{Result, TransportError};

/// Kernel limit on interface names, including the trailing NUL.
pub const IFNAMSIZ: usize = 16;

#[cfg(target_os = "linux")]
const SYSFS_NET: &str = "/sys/class/net";

/// A resolved network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Kernel interface name (e.g. `eth0`, `lo`).
    pub name: String,
    /// Kernel interface index.
    pub index: u32,
    /// Maximum transmission unit in bytes (payload, excluding the link header).
    pub mtu: usize,
    /// Hardware address of the interface (all zeros for loopback).
    pub hardware: MacAddr,
}

impl Interface {
    /// Resolve an interface by name.
    pub fn by_name(name: &str) -> Result<Self> {
        validate_name(name)?;
        Self::lookup(name)
    }

    /// List all interfaces known to the kernel, ordered by index.
    #[cfg(target_os = "linux")]
    pub fn list() -> Result<Vec<Self>> {
        let entries = std::fs::read_dir(SYSFS_NET).map_err(|source| TransportError::Interface {
            name: SYSFS_NET.to_string(),
            source,
        })?;

        let mut interfaces = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            match Self::by_name(&name) {
                Ok(iface) => interfaces.push(iface),
                // Interfaces can disappear between readdir and lookup.
                Err(TransportError::InterfaceNotFound { .. }) => {
                    debug!(%name, "interface vanished while listing");
                }
                Err(err) => return Err(err),
            }
        }
        interfaces.sort_by_key(|iface| iface.index);
        Ok(interfaces)
    }

    /// List all interfaces known to the kernel.
    #[cfg(not(target_os = "linux"))]
    pub fn list() -> Result<Vec<Self>> {
        Err(TransportError::Unsupported)
    }

    #[cfg(target_os = "linux")]
    fn lookup(name: &str) -> Result<Self> {
        let index = sys::index(name).map_err(|source| {
            if source.raw_os_error() == Some(libc::ENODEV) {
                TransportError::InterfaceNotFound {
                    name: name.to_string(),
                }
            } else {
                TransportError::Interface {
                    name: name.to_string(),
                    source,
                }
            }
        })?;
        let query_err = |source| TransportError::Interface {
            name: name.to_string(),
            source,
        };
        let mtu = sys::mtu(name).map_err(query_err)?;
        let hardware = sys::hardware(name).map_err(query_err)?;

        debug!(%name, index, mtu, %hardware, "resolved interface");
        Ok(Self {
            name: name.to_string(),
            index,
            mtu,
            hardware,
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn lookup(_name: &str) -> Result<Self> {
        Err(TransportError::Unsupported)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.len() >= IFNAMSIZ {
        "name is longer than 15 bytes"
    } else if name
        .bytes()
        .any(|b| b == b'/' || b == 0 || b.is_ascii_whitespace())
    {
        "name contains '/', NUL or whitespace"
    } else {
        return Ok(());
    };
    Err(TransportError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

#[cfg(target_os = "linux")]
mod sys {
    use std::ffi::CString;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    use super::IFNAMSIZ;
    use crate::addr::MacAddr;

    /// `struct ifreq`: the name followed by the request union.
    #[repr(C)]
    struct IfReq {
        name: [libc::c_char; IFNAMSIZ],
        data: [u8; 24],
    }

    impl IfReq {
        fn new(name: &str) -> Self {
            let mut req = Self {
                name: [0; IFNAMSIZ],
                data: [0; 24],
            };
            for (dst, src) in req.name.iter_mut().zip(name.as_bytes()) {
                *dst = *src as libc::c_char;
            }
            req
        }
    }

    pub(super) fn index(name: &str) -> io::Result<u32> {
        let cname =
            CString::new(name).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        // SAFETY: `cname` is a valid NUL-terminated string for the duration of the call.
        let index = unsafe { libc::if_nametoindex(cname.as_ptr()) };
        if index == 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(index)
        }
    }

    pub(super) fn mtu(name: &str) -> io::Result<usize> {
        let fd = control_socket()?;
        let mut req = IfReq::new(name);
        // SAFETY: `req` is a writable `struct ifreq`-sized buffer and `fd` is open.
        let rc = unsafe {
            libc::ioctl(
                fd.as_raw_fd(),
                libc::SIOCGIFMTU as _,
                &mut req as *mut IfReq,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&req.data[..4]);
        Ok(i32::from_ne_bytes(raw).max(0) as usize)
    }

    pub(super) fn hardware(name: &str) -> io::Result<MacAddr> {
        let fd = control_socket()?;
        let mut req = IfReq::new(name);
        // SAFETY: `req` is a writable `struct ifreq`-sized buffer and `fd` is open.
        let rc = unsafe {
            libc::ioctl(
                fd.as_raw_fd(),
                libc::SIOCGIFHWADDR as _,
                &mut req as *mut IfReq,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        // `struct sockaddr`: 2-byte family, then the address bytes.
        MacAddr::from_slice(&req.data[2..8])
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "short hardware address"))
    }

    fn control_socket() -> io::Result<OwnedFd> {
        // SAFETY: plain socket(2) call; the result is checked before use.
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `fd` is a freshly created descriptor owned by nobody else.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let err = Interface::by_name("").unwrap_err();
        assert!(matches!(err, TransportError::InvalidName { .. }));
    }

    #[test]
    fn rejects_long_name() {
        let err = Interface::by_name(&"x".repeat(IFNAMSIZ)).unwrap_err();
        assert!(matches!(err, TransportError::InvalidName { .. }));
    }

    #[test]
    fn rejects_path_like_name() {
        let err = Interface::by_name("../eth0").unwrap_err();
        assert!(matches!(err, TransportError::InvalidName { .. }));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn unknown_interface_is_not_found() {
        let err = Interface::by_name("ecnope0").unwrap_err();
        assert!(matches!(err, TransportError::InterfaceNotFound { name } if name == "ecnope0"));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn listed_interfaces_resolve_by_name() {
        let interfaces = Interface::list().unwrap();
        for iface in &interfaces {
            let again = Interface::by_name(&iface.name).unwrap();
            assert_eq!(again.index, iface.index);
            assert!(iface.index > 0);
        }
        assert!(interfaces.windows(2).all(|w| w[0].index <= w[1].index));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn loopback_has_nil_hardware_address() {
        let Ok(lo) = Interface::by_name("lo") else {
            return;
        };
        assert!(lo.hardware.is_nil());
        assert!(lo.mtu > 0);
    }
}
