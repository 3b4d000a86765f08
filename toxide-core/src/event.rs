//! Callback bridge: the `extern "C"` trampolines libtoxcore invokes during
//! `tox_iterate` push decoded [`Event`]s into a `Vec` threaded through the
//! `user_data` pointer. Nothing here may unwind across the C boundary.

use std::ffi::c_void;
use std::slice;

use toxide_sys as sys;

use crate::address::PublicKey;

/// Transport a peer (or we ourselves) are reachable over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// Not connected.
    None,
    /// Connected through a TCP relay.
    Tcp,
    /// Direct UDP connection.
    Udp,
}

impl Connection {
    pub(crate) fn from_raw(raw: sys::ToxConnection) -> Self {
        match raw {
            sys::TOX_CONNECTION_NONE => Connection::None,
            sys::TOX_CONNECTION_TCP => Connection::Tcp,
            sys::TOX_CONNECTION_UDP => Connection::Udp,
            // Unknown transport from a newer library: report connected, the
            // conservative reading of a non-zero status.
            _ => Connection::Tcp,
        }
    }

    pub fn is_connected(self) -> bool {
        self != Connection::None
    }
}

/// Kind of a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Normal,
    /// IRC-style `/me` action.
    Action,
}

impl MessageKind {
    pub(crate) fn from_raw(raw: sys::ToxMessageType) -> Self {
        match raw {
            sys::TOX_MESSAGE_TYPE_ACTION => MessageKind::Action,
            _ => MessageKind::Normal,
        }
    }

    pub(crate) fn to_raw(self) -> sys::ToxMessageType {
        match self {
            MessageKind::Normal => sys::TOX_MESSAGE_TYPE_NORMAL,
            MessageKind::Action => sys::TOX_MESSAGE_TYPE_ACTION,
        }
    }
}

/// Something the library reported during an iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Someone sent us a friend request with this key and greeting.
    FriendRequest { public_key: PublicKey, message: String },
    /// A friend sent us a text message.
    FriendMessage {
        friend: u32,
        kind: MessageKind,
        message: String,
    },
    /// A friend's connection came up or went down.
    FriendConnectionStatus { friend: u32, status: Connection },
    /// Our own DHT connection changed.
    ConnectionStatus(Connection),
}

/// Decode a byte region owned by the library into a lossy string.
unsafe fn lossy_string(data: *const u8, length: usize) -> String {
    if data.is_null() || length == 0 {
        return String::new();
    }
    String::from_utf8_lossy(slice::from_raw_parts(data, length)).into_owned()
}

unsafe fn queue<'a>(user_data: *mut c_void) -> Option<&'a mut Vec<Event>> {
    (user_data as *mut Vec<Event>).as_mut()
}

pub(crate) unsafe extern "C" fn on_friend_request(
    _tox: *mut sys::Tox,
    public_key: *const u8,
    message: *const u8,
    length: usize,
    user_data: *mut c_void,
) {
    let Some(events) = queue(user_data) else { return };
    if public_key.is_null() {
        return;
    }
    let mut key = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
    key.copy_from_slice(slice::from_raw_parts(public_key, sys::TOX_PUBLIC_KEY_SIZE));
    events.push(Event::FriendRequest {
        public_key: PublicKey::from_bytes(key),
        message: lossy_string(message, length),
    });
}

pub(crate) unsafe extern "C" fn on_friend_message(
    _tox: *mut sys::Tox,
    friend_number: u32,
    message_type: sys::ToxMessageType,
    message: *const u8,
    length: usize,
    user_data: *mut c_void,
) {
    let Some(events) = queue(user_data) else { return };
    events.push(Event::FriendMessage {
        friend: friend_number,
        kind: MessageKind::from_raw(message_type),
        message: lossy_string(message, length),
    });
}

pub(crate) unsafe extern "C" fn on_friend_connection_status(
    _tox: *mut sys::Tox,
    friend_number: u32,
    connection_status: sys::ToxConnection,
    user_data: *mut c_void,
) {
    let Some(events) = queue(user_data) else { return };
    events.push(Event::FriendConnectionStatus {
        friend: friend_number,
        status: Connection::from_raw(connection_status),
    });
}

pub(crate) unsafe extern "C" fn on_self_connection_status(
    _tox: *mut sys::Tox,
    connection_status: sys::ToxConnection,
    user_data: *mut c_void,
) {
    let Some(events) = queue(user_data) else { return };
    events.push(Event::ConnectionStatus(Connection::from_raw(
        connection_status,
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn trampolines_push_decoded_events() {
        let mut events: Vec<Event> = Vec::new();
        let user_data = &mut events as *mut Vec<Event> as *mut c_void;
        let key = [7u8; sys::TOX_PUBLIC_KEY_SIZE];
        let greeting = b"hi there";
        unsafe {
            on_friend_request(
                ptr::null_mut(),
                key.as_ptr(),
                greeting.as_ptr(),
                greeting.len(),
                user_data,
            );
            on_friend_message(
                ptr::null_mut(),
                3,
                sys::TOX_MESSAGE_TYPE_ACTION,
                greeting.as_ptr(),
                greeting.len(),
                user_data,
            );
            on_friend_connection_status(ptr::null_mut(), 3, sys::TOX_CONNECTION_UDP, user_data);
            on_self_connection_status(ptr::null_mut(), sys::TOX_CONNECTION_NONE, user_data);
        }
        assert_eq!(
            events,
            vec![
                Event::FriendRequest {
                    public_key: PublicKey::from_bytes(key),
                    message: "hi there".into(),
                },
                Event::FriendMessage {
                    friend: 3,
                    kind: MessageKind::Action,
                    message: "hi there".into(),
                },
                Event::FriendConnectionStatus {
                    friend: 3,
                    status: Connection::Udp,
                },
                Event::ConnectionStatus(Connection::None),
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let mut events: Vec<Event> = Vec::new();
        let user_data = &mut events as *mut Vec<Event> as *mut c_void;
        let bad = [0xff, 0xfe, b'a'];
        unsafe {
            on_friend_message(
                ptr::null_mut(),
                0,
                sys::TOX_MESSAGE_TYPE_NORMAL,
                bad.as_ptr(),
                bad.len(),
                user_data,
            );
        }
        match &events[0] {
            Event::FriendMessage { message, .. } => assert!(message.ends_with('a')),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn null_user_data_is_ignored() {
        let key = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
        unsafe {
            on_friend_request(ptr::null_mut(), key.as_ptr(), ptr::null(), 0, ptr::null_mut());
        }
    }

    #[test]
    fn unknown_connection_status_reads_as_connected() {
        assert_eq!(Connection::from_raw(9), Connection::Tcp);
        assert!(Connection::Tcp.is_connected());
        assert!(!Connection::None.is_connected());
    }
}
