//! Safe Rust binding for libtoxcore, the peer-to-peer encrypted messaging
//! library. All protocol behavior (DHT bootstrap, friend-request handshake,
//! NAT traversal, onion routing) stays inside the wrapped library; this
//! crate only marshals calls, strings, and error codes, and drives the
//! library's event loop from one polling thread.

pub mod address;
pub mod codec;
pub mod error;
pub mod event;
pub mod options;
pub mod session;
pub mod tox;

use std::fmt;
use std::sync::OnceLock;

use toxide_sys as sys;

pub use address::{Address, ParseAddressError, PublicKey};
pub use codec::{bin_to_hex, hex_to_bin, CodecError};
pub use error::{
    BootstrapError, FriendAddError, FriendNotFoundError, NewError, SendMessageError, SetInfoError,
};
pub use event::{Connection, Event, MessageKind};
pub use options::Options;
pub use session::{Session, ToxHandle};
pub use tox::Tox;
pub use toxide_sys::LoadError;

static API: OnceLock<Result<sys::ToxApi, sys::LoadError>> = OnceLock::new();

/// The process-wide symbol table, loaded on first use.
pub(crate) fn api() -> Result<&'static sys::ToxApi, &'static sys::LoadError> {
    API.get_or_init(sys::ToxApi::load).as_ref()
}

/// Version of the loaded libtoxcore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Report the version of the installed library.
pub fn version() -> Result<Version, &'static LoadError> {
    let api = api()?;
    unsafe {
        Ok(Version {
            major: (api.tox_version_major)(),
            minor: (api.tox_version_minor)(),
            patch: (api.tox_version_patch)(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_display() {
        let v = Version {
            major: 0,
            minor: 2,
            patch: 18,
        };
        assert_eq!(v.to_string(), "0.2.18");
    }

    #[test]
    fn version_queries_library_when_present() {
        match version() {
            Ok(v) => assert!(v.major > 0 || v.minor > 0),
            Err(e) => eprintln!("skipping: {e}"),
        }
    }
}
