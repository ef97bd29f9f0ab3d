use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{debug, info};

use crate::addr::{MacAddr, PeerAddr, MAC_ADDR_LEN};
use crate::error::{Result, TransportError};
use crate::interface::Interface;
use crate::traits::LinkSocket;

/// Raw `AF_PACKET` socket bound to one interface and one EtherType.
///
/// Frames are read and written whole, link header included. The kernel only
/// delivers frames whose EtherType matches the filter given to [`open`].
///
/// `recvfrom(2)` and `sendto(2)` on the same descriptor are safe from two
/// threads, so one reader and one writer may share a `PacketSocket`.
///
/// [`open`]: PacketSocket::open
pub struct PacketSocket {
    fd: OwnedFd,
    interface: Interface,
    ether_type: u16,
}

impl PacketSocket {
    /// Open a packet socket on `interface` that only receives `ether_type` frames.
    ///
    /// Requires `CAP_NET_RAW`.
    pub fn open(interface: &Interface, ether_type: u16) -> Result<Self> {
        let protocol = libc::c_int::from(ether_type.to_be());
        // SAFETY: plain socket(2) call; the result is checked before use.
        let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW | libc::SOCK_CLOEXEC, protocol) };
        if fd < 0 {
            return Err(TransportError::Open {
                interface: interface.name.clone(),
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `fd` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let addr = link_addr(interface.index, ether_type, MacAddr::nil());
        // SAFETY: `addr` is a fully initialised `sockaddr_ll` and the length matches it.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const libc::sockaddr_ll).cast::<libc::sockaddr>(),
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(TransportError::Bind {
                interface: interface.name.clone(),
                source: io::Error::last_os_error(),
            });
        }

        info!(
            interface = %interface.name,
            index = interface.index,
            ether_type = format_args!("{ether_type:#06x}"),
            "opened packet socket"
        );

        Ok(Self {
            fd,
            interface: interface.clone(),
            ether_type,
        })
    }

    /// The interface this socket is bound to.
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// The EtherType filter this socket was opened with.
    pub fn ether_type(&self) -> u16 {
        self.ether_type
    }

    fn wait_readable(&self, deadline: Duration) -> Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout = deadline.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int;
        // SAFETY: `pollfd` is a valid, writable array of length one.
        let rc = unsafe { libc::poll(&mut pollfd, 1, timeout) };
        match rc {
            0 => Ok(false),
            n if n > 0 => Ok(true),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(false)
                } else {
                    Err(err.into())
                }
            }
        }
    }
}

impl LinkSocket for PacketSocket {
    fn read_with_deadline(&self, buf: &mut [u8], deadline: Duration) -> Result<(usize, PeerAddr)> {
        if !self.wait_readable(deadline)? {
            return Err(TransportError::Timeout(deadline));
        }

        // SAFETY: all-zero is a valid `sockaddr_ll`.
        let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        let mut addr_len = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;
        // SAFETY: `buf` is writable for `buf.len()` bytes; `addr`/`addr_len` are
        // valid writable pointers sized for `sockaddr_ll`.
        // MSG_TRUNC makes the kernel return the full frame length even when
        // only `buf.len()` bytes were copied.
        let read = unsafe {
            libc::recvfrom(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                libc::MSG_DONTWAIT | libc::MSG_TRUNC,
                (&mut addr as *mut libc::sockaddr_ll).cast::<libc::sockaddr>(),
                &mut addr_len,
            )
        };
        if read < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                    Err(TransportError::Timeout(deadline))
                }
                _ => Err(err.into()),
            };
        }

        let peer = PeerAddr {
            interface_index: addr.sll_ifindex.max(0) as u32,
            hardware: MacAddr::from_slice(&addr.sll_addr).unwrap_or_default(),
            protocol: u16::from_be(addr.sll_protocol),
            packet_type: addr.sll_pkttype,
        };
        Ok((read as usize, peer))
    }

    fn write_to(&self, frame: &[u8], destination: MacAddr) -> Result<usize> {
        let addr = link_addr(self.interface.index, self.ether_type, destination);
        // SAFETY: `frame` is readable for `frame.len()` bytes and `addr` is a fully
        // initialised `sockaddr_ll` whose length is passed alongside it.
        let written = unsafe {
            libc::sendto(
                self.fd.as_raw_fd(),
                frame.as_ptr().cast::<libc::c_void>(),
                frame.len(),
                0,
                (&addr as *const libc::sockaddr_ll).cast::<libc::sockaddr>(),
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if written < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(written as usize)
    }
}

impl Drop for PacketSocket {
    fn drop(&mut self) {
        debug!(interface = %self.interface.name, "closing packet socket");
    }
}

impl std::fmt::Debug for PacketSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketSocket")
            .field("interface", &self.interface.name)
            .field("ether_type", &format_args!("{:#06x}", self.ether_type))
            .finish()
    }
}

fn link_addr(index: u32, ether_type: u16, hardware: MacAddr) -> libc::sockaddr_ll {
    let mut sll_addr = [0u8; 8];
    sll_addr[..MAC_ADDR_LEN].copy_from_slice(hardware.as_bytes());
    libc::sockaddr_ll {
        sll_family: libc::AF_PACKET as libc::c_ushort,
        sll_protocol: ether_type.to_be(),
        sll_ifindex: index as libc::c_int,
        sll_hatype: 0,
        sll_pkttype: 0,
        sll_halen: MAC_ADDR_LEN as libc::c_uchar,
        sll_addr,
    }
}
