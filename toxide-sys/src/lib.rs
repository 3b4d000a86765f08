//! Raw libtoxcore C API surface.
//!
//! Mirrors the subset of `tox/tox.h` the binding uses: opaque handle types,
//! size and error-code constants, callback signatures, and a [`ToxApi`]
//! table of function pointers resolved from the installed shared library at
//! runtime. No call here does anything beyond symbol resolution; all
//! semantics live in libtoxcore.

use std::ffi::{c_char, c_int, c_void};

use libloading::Library;

/// Opaque Tox instance. Only ever handled behind a raw pointer.
#[repr(C)]
pub struct Tox {
    _private: [u8; 0],
}

/// Opaque startup options object (`tox_options_new` / `tox_options_free`).
#[repr(C)]
pub struct ToxOptions {
    _private: [u8; 0],
}

pub const TOX_PUBLIC_KEY_SIZE: usize = 32;
pub const TOX_SECRET_KEY_SIZE: usize = 32;
pub const TOX_NOSPAM_SIZE: usize = 4;
/// Full Tox ID: public key + nospam + 2-byte checksum.
pub const TOX_ADDRESS_SIZE: usize = TOX_PUBLIC_KEY_SIZE + TOX_NOSPAM_SIZE + 2;
pub const TOX_MAX_NAME_LENGTH: usize = 128;
pub const TOX_MAX_STATUS_MESSAGE_LENGTH: usize = 1007;
pub const TOX_MAX_FRIEND_REQUEST_LENGTH: usize = 1016;
pub const TOX_MAX_MESSAGE_LENGTH: usize = 1372;

// Error codes are kept as plain c_int aliases rather than #[repr(C)] enums:
// a newer library returning a code we do not know about must stay
// representable instead of being undefined behavior.

pub type ToxErrOptionsNew = c_int;
pub const TOX_ERR_OPTIONS_NEW_OK: ToxErrOptionsNew = 0;
pub const TOX_ERR_OPTIONS_NEW_MALLOC: ToxErrOptionsNew = 1;

pub type ToxErrNew = c_int;
pub const TOX_ERR_NEW_OK: ToxErrNew = 0;
pub const TOX_ERR_NEW_NULL: ToxErrNew = 1;
pub const TOX_ERR_NEW_MALLOC: ToxErrNew = 2;
pub const TOX_ERR_NEW_PORT_ALLOC: ToxErrNew = 3;
pub const TOX_ERR_NEW_PROXY_BAD_TYPE: ToxErrNew = 4;
pub const TOX_ERR_NEW_PROXY_BAD_HOST: ToxErrNew = 5;
pub const TOX_ERR_NEW_PROXY_BAD_PORT: ToxErrNew = 6;
pub const TOX_ERR_NEW_PROXY_NOT_FOUND: ToxErrNew = 7;
pub const TOX_ERR_NEW_LOAD_ENCRYPTED: ToxErrNew = 8;
pub const TOX_ERR_NEW_LOAD_BAD_FORMAT: ToxErrNew = 9;

pub type ToxErrBootstrap = c_int;
pub const TOX_ERR_BOOTSTRAP_OK: ToxErrBootstrap = 0;
pub const TOX_ERR_BOOTSTRAP_NULL: ToxErrBootstrap = 1;
pub const TOX_ERR_BOOTSTRAP_BAD_HOST: ToxErrBootstrap = 2;
pub const TOX_ERR_BOOTSTRAP_BAD_PORT: ToxErrBootstrap = 3;

pub type ToxErrSetInfo = c_int;
pub const TOX_ERR_SET_INFO_OK: ToxErrSetInfo = 0;
pub const TOX_ERR_SET_INFO_NULL: ToxErrSetInfo = 1;
pub const TOX_ERR_SET_INFO_TOO_LONG: ToxErrSetInfo = 2;

pub type ToxErrFriendAdd = c_int;
pub const TOX_ERR_FRIEND_ADD_OK: ToxErrFriendAdd = 0;
pub const TOX_ERR_FRIEND_ADD_NULL: ToxErrFriendAdd = 1;
pub const TOX_ERR_FRIEND_ADD_TOO_LONG: ToxErrFriendAdd = 2;
pub const TOX_ERR_FRIEND_ADD_NO_MESSAGE: ToxErrFriendAdd = 3;
pub const TOX_ERR_FRIEND_ADD_OWN_KEY: ToxErrFriendAdd = 4;
pub const TOX_ERR_FRIEND_ADD_ALREADY_SENT: ToxErrFriendAdd = 5;
pub const TOX_ERR_FRIEND_ADD_BAD_CHECKSUM: ToxErrFriendAdd = 6;
pub const TOX_ERR_FRIEND_ADD_SET_NEW_NOSPAM: ToxErrFriendAdd = 7;
pub const TOX_ERR_FRIEND_ADD_MALLOC: ToxErrFriendAdd = 8;

pub type ToxErrFriendDelete = c_int;
pub const TOX_ERR_FRIEND_DELETE_OK: ToxErrFriendDelete = 0;
pub const TOX_ERR_FRIEND_DELETE_FRIEND_NOT_FOUND: ToxErrFriendDelete = 1;

pub type ToxErrFriendGetPublicKey = c_int;
pub const TOX_ERR_FRIEND_GET_PUBLIC_KEY_OK: ToxErrFriendGetPublicKey = 0;
pub const TOX_ERR_FRIEND_GET_PUBLIC_KEY_FRIEND_NOT_FOUND: ToxErrFriendGetPublicKey = 1;

pub type ToxErrFriendSendMessage = c_int;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_OK: ToxErrFriendSendMessage = 0;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_NULL: ToxErrFriendSendMessage = 1;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_FRIEND_NOT_FOUND: ToxErrFriendSendMessage = 2;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_FRIEND_NOT_CONNECTED: ToxErrFriendSendMessage = 3;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_SENDQ: ToxErrFriendSendMessage = 4;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_TOO_LONG: ToxErrFriendSendMessage = 5;
pub const TOX_ERR_FRIEND_SEND_MESSAGE_EMPTY: ToxErrFriendSendMessage = 6;

pub type ToxConnection = c_int;
pub const TOX_CONNECTION_NONE: ToxConnection = 0;
pub const TOX_CONNECTION_TCP: ToxConnection = 1;
pub const TOX_CONNECTION_UDP: ToxConnection = 2;

pub type ToxMessageType = c_int;
pub const TOX_MESSAGE_TYPE_NORMAL: ToxMessageType = 0;
pub const TOX_MESSAGE_TYPE_ACTION: ToxMessageType = 1;

pub type ToxSavedataType = c_int;
pub const TOX_SAVEDATA_TYPE_NONE: ToxSavedataType = 0;
pub const TOX_SAVEDATA_TYPE_TOX_SAVE: ToxSavedataType = 1;
pub const TOX_SAVEDATA_TYPE_SECRET_KEY: ToxSavedataType = 2;

pub type ToxFriendRequestCb = unsafe extern "C" fn(
    tox: *mut Tox,
    public_key: *const u8,
    message: *const u8,
    length: usize,
    user_data: *mut c_void,
);

pub type ToxFriendMessageCb = unsafe extern "C" fn(
    tox: *mut Tox,
    friend_number: u32,
    message_type: ToxMessageType,
    message: *const u8,
    length: usize,
    user_data: *mut c_void,
);

pub type ToxFriendConnectionStatusCb = unsafe extern "C" fn(
    tox: *mut Tox,
    friend_number: u32,
    connection_status: ToxConnection,
    user_data: *mut c_void,
);

pub type ToxSelfConnectionStatusCb =
    unsafe extern "C" fn(tox: *mut Tox, connection_status: ToxConnection, user_data: *mut c_void);

/// Failed to open the shared library or resolve a symbol from it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not open libtoxcore (tried {tried:?}): {source}")]
    Open {
        tried: Vec<String>,
        source: libloading::Error,
    },
    #[error("libtoxcore is missing symbol {symbol}: {source}")]
    Symbol {
        symbol: &'static str,
        source: libloading::Error,
    },
}

/// Candidate library names, most specific first.
const LIBRARY_NAMES: &[&str] = &["libtoxcore.so.2", "libtoxcore.so", "libtoxcore.dylib"];

// Declares the ToxApi struct and its loader in one place so a signature and
// the symbol it is resolved from can never drift apart.
macro_rules! tox_api {
    ($( fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?; )*) => {
        /// Function-pointer table over the loaded library.
        ///
        /// The `Library` stays owned here, so every pointer remains valid
        /// for as long as the table itself.
        pub struct ToxApi {
            _lib: Library,
            $( pub $name: unsafe extern "C" fn($($arg: $ty),*) $(-> $ret)?, )*
        }

        impl ToxApi {
            /// Resolve every symbol from an already opened library.
            ///
            /// # Safety
            /// The library must actually be libtoxcore (or ABI compatible);
            /// resolving symbols with mismatched signatures is undefined
            /// behavior when they are later called.
            pub unsafe fn from_library(lib: Library) -> Result<Self, LoadError> {
                $(
                    let $name = *lib
                        .get(concat!(stringify!($name), "\0").as_bytes())
                        .map_err(|source| LoadError::Symbol {
                            symbol: stringify!($name),
                            source,
                        })?;
                )*
                Ok(Self { _lib: lib, $( $name, )* })
            }
        }
    };
}

tox_api! {
    fn tox_version_major() -> u32;
    fn tox_version_minor() -> u32;
    fn tox_version_patch() -> u32;
    fn tox_version_is_compatible(major: u32, minor: u32, patch: u32) -> bool;

    fn tox_options_new(error: *mut ToxErrOptionsNew) -> *mut ToxOptions;
    fn tox_options_free(options: *mut ToxOptions);
    fn tox_options_set_ipv6_enabled(options: *mut ToxOptions, ipv6_enabled: bool);
    fn tox_options_set_udp_enabled(options: *mut ToxOptions, udp_enabled: bool);
    fn tox_options_set_local_discovery_enabled(options: *mut ToxOptions, enabled: bool);
    fn tox_options_set_start_port(options: *mut ToxOptions, start_port: u16);
    fn tox_options_set_end_port(options: *mut ToxOptions, end_port: u16);
    fn tox_options_set_tcp_port(options: *mut ToxOptions, tcp_port: u16);
    fn tox_options_set_savedata_type(options: *mut ToxOptions, savedata_type: ToxSavedataType);
    fn tox_options_set_savedata_data(options: *mut ToxOptions, data: *const u8, length: usize);

    fn tox_new(options: *const ToxOptions, error: *mut ToxErrNew) -> *mut Tox;
    fn tox_kill(tox: *mut Tox);
    fn tox_get_savedata_size(tox: *const Tox) -> usize;
    fn tox_get_savedata(tox: *const Tox, savedata: *mut u8);

    fn tox_iterate(tox: *mut Tox, user_data: *mut c_void);
    fn tox_iteration_interval(tox: *const Tox) -> u32;

    fn tox_bootstrap(
        tox: *mut Tox,
        host: *const c_char,
        port: u16,
        public_key: *const u8,
        error: *mut ToxErrBootstrap,
    ) -> bool;
    fn tox_add_tcp_relay(
        tox: *mut Tox,
        host: *const c_char,
        port: u16,
        public_key: *const u8,
        error: *mut ToxErrBootstrap,
    ) -> bool;

    fn tox_self_get_address(tox: *const Tox, address: *mut u8);
    fn tox_self_get_public_key(tox: *const Tox, public_key: *mut u8);
    fn tox_self_get_nospam(tox: *const Tox) -> u32;
    fn tox_self_set_nospam(tox: *mut Tox, nospam: u32);
    fn tox_self_get_connection_status(tox: *const Tox) -> ToxConnection;

    fn tox_self_set_name(
        tox: *mut Tox,
        name: *const u8,
        length: usize,
        error: *mut ToxErrSetInfo,
    ) -> bool;
    fn tox_self_get_name_size(tox: *const Tox) -> usize;
    fn tox_self_get_name(tox: *const Tox, name: *mut u8);
    fn tox_self_set_status_message(
        tox: *mut Tox,
        status_message: *const u8,
        length: usize,
        error: *mut ToxErrSetInfo,
    ) -> bool;
    fn tox_self_get_status_message_size(tox: *const Tox) -> usize;
    fn tox_self_get_status_message(tox: *const Tox, status_message: *mut u8);

    fn tox_friend_add(
        tox: *mut Tox,
        address: *const u8,
        message: *const u8,
        length: usize,
        error: *mut ToxErrFriendAdd,
    ) -> u32;
    fn tox_friend_add_norequest(
        tox: *mut Tox,
        public_key: *const u8,
        error: *mut ToxErrFriendAdd,
    ) -> u32;
    fn tox_friend_delete(
        tox: *mut Tox,
        friend_number: u32,
        error: *mut ToxErrFriendDelete,
    ) -> bool;
    fn tox_friend_get_public_key(
        tox: *const Tox,
        friend_number: u32,
        public_key: *mut u8,
        error: *mut ToxErrFriendGetPublicKey,
    ) -> bool;
    fn tox_self_get_friend_list_size(tox: *const Tox) -> usize;
    fn tox_self_get_friend_list(tox: *const Tox, friend_list: *mut u32);

    fn tox_friend_send_message(
        tox: *mut Tox,
        friend_number: u32,
        message_type: ToxMessageType,
        message: *const u8,
        length: usize,
        error: *mut ToxErrFriendSendMessage,
    ) -> u32;

    fn tox_callback_friend_request(tox: *mut Tox, callback: Option<ToxFriendRequestCb>);
    fn tox_callback_friend_message(tox: *mut Tox, callback: Option<ToxFriendMessageCb>);
    fn tox_callback_friend_connection_status(
        tox: *mut Tox,
        callback: Option<ToxFriendConnectionStatusCb>,
    );
    fn tox_callback_self_connection_status(
        tox: *mut Tox,
        callback: Option<ToxSelfConnectionStatusCb>,
    );
}

impl ToxApi {
    /// Open the system libtoxcore and resolve the full symbol table.
    pub fn load() -> Result<Self, LoadError> {
        let mut last = None;
        for name in LIBRARY_NAMES {
            // Safety: we only accept a library that exports the tox_* symbol
            // set with the tox.h signatures declared above.
            match unsafe { Library::new(name) } {
                Ok(lib) => return unsafe { Self::from_library(lib) },
                Err(e) => last = Some(e),
            }
        }
        Err(LoadError::Open {
            tried: LIBRARY_NAMES.iter().map(|s| s.to_string()).collect(),
            source: last.expect("LIBRARY_NAMES is non-empty"),
        })
    }

    /// Open libtoxcore from an explicit path instead of the system search path.
    pub fn load_from(path: &std::path::Path) -> Result<Self, LoadError> {
        let lib = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
            tried: vec![path.display().to_string()],
            source,
        })?;
        unsafe { Self::from_library(lib) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_key_plus_nospam_plus_checksum() {
        assert_eq!(TOX_ADDRESS_SIZE, 38);
        assert_eq!(TOX_ADDRESS_SIZE, TOX_PUBLIC_KEY_SIZE + TOX_NOSPAM_SIZE + 2);
    }

    #[test]
    fn load_reports_missing_library() {
        match ToxApi::load_from(std::path::Path::new("/nonexistent/libtoxcore.so")) {
            Ok(_) => panic!("expected open failure"),
            Err(LoadError::Open { tried, .. }) => {
                assert_eq!(tried, vec!["/nonexistent/libtoxcore.so".to_string()]);
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
