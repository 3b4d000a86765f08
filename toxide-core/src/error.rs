//! Translation of libtoxcore error enums into Rust error types.
//!
//! One small enum per fallible library operation, mirroring the `TOX_ERR_*`
//! enums in `tox.h`. Each `from_raw` maps the code the library wrote into an
//! out-parameter; a code we do not know about becomes `Unexpected` rather
//! than a panic, so a newer library stays usable.

use std::ffi::c_int;

use toxide_sys as sys;

/// Error creating a Tox instance (`tox_new`).
#[derive(Debug, thiserror::Error)]
pub enum NewError {
    #[error("libtoxcore could not be loaded: {0}")]
    Load(#[from] &'static sys::LoadError),
    #[error("one of the arguments was null")]
    Null,
    #[error("out of memory")]
    Malloc,
    #[error("could not bind to a port in the requested range")]
    PortAlloc,
    #[error("invalid proxy type")]
    ProxyBadType,
    #[error("invalid proxy host")]
    ProxyBadHost,
    #[error("invalid proxy port")]
    ProxyBadPort,
    #[error("proxy host could not be resolved")]
    ProxyNotFound,
    #[error("savedata is encrypted")]
    LoadEncrypted,
    #[error("savedata format not recognized")]
    LoadBadFormat,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl NewError {
    pub(crate) fn from_raw(raw: sys::ToxErrNew) -> Self {
        match raw {
            sys::TOX_ERR_NEW_NULL => NewError::Null,
            sys::TOX_ERR_NEW_MALLOC => NewError::Malloc,
            sys::TOX_ERR_NEW_PORT_ALLOC => NewError::PortAlloc,
            sys::TOX_ERR_NEW_PROXY_BAD_TYPE => NewError::ProxyBadType,
            sys::TOX_ERR_NEW_PROXY_BAD_HOST => NewError::ProxyBadHost,
            sys::TOX_ERR_NEW_PROXY_BAD_PORT => NewError::ProxyBadPort,
            sys::TOX_ERR_NEW_PROXY_NOT_FOUND => NewError::ProxyNotFound,
            sys::TOX_ERR_NEW_LOAD_ENCRYPTED => NewError::LoadEncrypted,
            sys::TOX_ERR_NEW_LOAD_BAD_FORMAT => NewError::LoadBadFormat,
            other => NewError::Unexpected(other),
        }
    }
}

/// Error resolving or contacting a bootstrap node (`tox_bootstrap`,
/// `tox_add_tcp_relay`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("one of the arguments was null")]
    Null,
    #[error("host could not be resolved or was invalid")]
    BadHost,
    #[error("port was invalid")]
    BadPort,
    #[error("host contains an interior NUL byte")]
    HostContainsNul,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl BootstrapError {
    pub(crate) fn from_raw(raw: sys::ToxErrBootstrap) -> Self {
        match raw {
            sys::TOX_ERR_BOOTSTRAP_NULL => BootstrapError::Null,
            sys::TOX_ERR_BOOTSTRAP_BAD_HOST => BootstrapError::BadHost,
            sys::TOX_ERR_BOOTSTRAP_BAD_PORT => BootstrapError::BadPort,
            other => BootstrapError::Unexpected(other),
        }
    }
}

/// Error setting the display name or status message (`tox_self_set_name`,
/// `tox_self_set_status_message`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetInfoError {
    #[error("one of the arguments was null")]
    Null,
    #[error("string exceeds the library maximum")]
    TooLong,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl SetInfoError {
    pub(crate) fn from_raw(raw: sys::ToxErrSetInfo) -> Self {
        match raw {
            sys::TOX_ERR_SET_INFO_NULL => SetInfoError::Null,
            sys::TOX_ERR_SET_INFO_TOO_LONG => SetInfoError::TooLong,
            other => SetInfoError::Unexpected(other),
        }
    }
}

/// Error adding a friend (`tox_friend_add`, `tox_friend_add_norequest`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FriendAddError {
    #[error("one of the arguments was null")]
    Null,
    #[error("request message exceeds the library maximum")]
    TooLong,
    #[error("request message is empty")]
    NoMessage,
    #[error("address is our own")]
    OwnKey,
    #[error("a request to this address was already sent")]
    AlreadySent,
    #[error("address checksum mismatch")]
    BadChecksum,
    #[error("friend is known under a different nospam")]
    SetNewNospam,
    #[error("out of memory")]
    Malloc,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl FriendAddError {
    pub(crate) fn from_raw(raw: sys::ToxErrFriendAdd) -> Self {
        match raw {
            sys::TOX_ERR_FRIEND_ADD_NULL => FriendAddError::Null,
            sys::TOX_ERR_FRIEND_ADD_TOO_LONG => FriendAddError::TooLong,
            sys::TOX_ERR_FRIEND_ADD_NO_MESSAGE => FriendAddError::NoMessage,
            sys::TOX_ERR_FRIEND_ADD_OWN_KEY => FriendAddError::OwnKey,
            sys::TOX_ERR_FRIEND_ADD_ALREADY_SENT => FriendAddError::AlreadySent,
            sys::TOX_ERR_FRIEND_ADD_BAD_CHECKSUM => FriendAddError::BadChecksum,
            sys::TOX_ERR_FRIEND_ADD_SET_NEW_NOSPAM => FriendAddError::SetNewNospam,
            sys::TOX_ERR_FRIEND_ADD_MALLOC => FriendAddError::Malloc,
            other => FriendAddError::Unexpected(other),
        }
    }
}

/// Error removing a friend (`tox_friend_delete`) or querying its key.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FriendNotFoundError {
    #[error("no friend with this number")]
    NotFound,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl FriendNotFoundError {
    pub(crate) fn from_raw(raw: c_int) -> Self {
        // TOX_ERR_FRIEND_DELETE and TOX_ERR_FRIEND_GET_PUBLIC_KEY share the
        // same single-variant shape.
        match raw {
            1 => FriendNotFoundError::NotFound,
            other => FriendNotFoundError::Unexpected(other),
        }
    }
}

/// Error sending a message to a friend (`tox_friend_send_message`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("one of the arguments was null")]
    Null,
    #[error("no friend with this number")]
    FriendNotFound,
    #[error("friend is not connected")]
    FriendNotConnected,
    #[error("send queue allocation failed")]
    SendQueue,
    #[error("message exceeds the library maximum")]
    TooLong,
    #[error("message is empty")]
    Empty,
    #[error("unexpected error code {0}")]
    Unexpected(c_int),
}

impl SendMessageError {
    pub(crate) fn from_raw(raw: sys::ToxErrFriendSendMessage) -> Self {
        match raw {
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_NULL => SendMessageError::Null,
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_FRIEND_NOT_FOUND => SendMessageError::FriendNotFound,
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_FRIEND_NOT_CONNECTED => {
                SendMessageError::FriendNotConnected
            }
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_SENDQ => SendMessageError::SendQueue,
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_TOO_LONG => SendMessageError::TooLong,
            sys::TOX_ERR_FRIEND_SEND_MESSAGE_EMPTY => SendMessageError::Empty,
            other => SendMessageError::Unexpected(other),
        }
    }
}
