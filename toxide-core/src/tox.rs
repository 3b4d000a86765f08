//! The state handle: a `Tox` owns the library instance pointer and exposes
//! each wrapped operation as a thin call plus error translation.

use std::ffi::{c_void, CString};
use std::ptr::NonNull;
use std::time::Duration;

use toxide_sys as sys;

use crate::address::{Address, PublicKey};
use crate::error::{
    BootstrapError, FriendAddError, FriendNotFoundError, NewError, SendMessageError, SetInfoError,
};
use crate::event::{self, Connection, Event, MessageKind};
use crate::options::Options;

/// A live libtoxcore instance. Dropping it calls `tox_kill`.
///
/// The handle is `Send` but not `Sync`: the library is not thread safe, so
/// cross-thread use goes through [`crate::Session`]'s mutex.
pub struct Tox {
    ptr: NonNull<sys::Tox>,
    api: &'static sys::ToxApi,
}

// The instance pointer is only ever dereferenced through &mut self (or &self
// on one thread at a time under the session mutex).
unsafe impl Send for Tox {}

impl Tox {
    /// Create an instance with the given startup options and register the
    /// event callbacks.
    pub fn new(options: &Options) -> Result<Self, NewError> {
        let api = crate::api()?;

        let mut opts_err: sys::ToxErrOptionsNew = sys::TOX_ERR_OPTIONS_NEW_OK;
        let raw_opts = unsafe { (api.tox_options_new)(&mut opts_err) };
        if raw_opts.is_null() {
            return Err(NewError::Malloc);
        }

        let mut err: sys::ToxErrNew = sys::TOX_ERR_NEW_OK;
        // Safety: raw_opts is live; options (and its savedata buffer) outlive
        // the tox_new call.
        let raw = unsafe {
            options.apply(api, raw_opts);
            let raw = (api.tox_new)(raw_opts, &mut err);
            (api.tox_options_free)(raw_opts);
            raw
        };

        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => return Err(NewError::from_raw(err)),
        };

        // Callbacks stay registered for the lifetime of the instance; the
        // event queue is passed per-iteration as user_data.
        unsafe {
            (api.tox_callback_friend_request)(ptr.as_ptr(), Some(event::on_friend_request));
            (api.tox_callback_friend_message)(ptr.as_ptr(), Some(event::on_friend_message));
            (api.tox_callback_friend_connection_status)(
                ptr.as_ptr(),
                Some(event::on_friend_connection_status),
            );
            (api.tox_callback_self_connection_status)(
                ptr.as_ptr(),
                Some(event::on_self_connection_status),
            );
        }

        Ok(Self { ptr, api })
    }

    /// Run one library iteration and return the events it produced.
    pub fn iterate(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = Vec::new();
        unsafe {
            (self.api.tox_iterate)(
                self.ptr.as_ptr(),
                &mut events as *mut Vec<Event> as *mut c_void,
            );
        }
        events
    }

    /// Library-recommended delay before the next [`Self::iterate`].
    pub fn iteration_interval(&self) -> Duration {
        let millis = unsafe { (self.api.tox_iteration_interval)(self.ptr.as_ptr()) };
        Duration::from_millis(u64::from(millis))
    }

    /// Our full Tox ID to hand out to contacts.
    pub fn address(&self) -> Address {
        let mut bytes = [0u8; sys::TOX_ADDRESS_SIZE];
        unsafe { (self.api.tox_self_get_address)(self.ptr.as_ptr(), bytes.as_mut_ptr()) };
        Address::from_raw(bytes)
    }

    /// Our long-term public key (the first 32 bytes of the address).
    pub fn public_key(&self) -> PublicKey {
        let mut bytes = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
        unsafe { (self.api.tox_self_get_public_key)(self.ptr.as_ptr(), bytes.as_mut_ptr()) };
        PublicKey::from_bytes(bytes)
    }

    pub fn nospam(&self) -> u32 {
        unsafe { (self.api.tox_self_get_nospam)(self.ptr.as_ptr()) }
    }

    /// Change the nospam, invalidating the previously handed out address.
    pub fn set_nospam(&mut self, nospam: u32) {
        unsafe { (self.api.tox_self_set_nospam)(self.ptr.as_ptr(), nospam) };
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), SetInfoError> {
        let bytes = name.as_bytes();
        let mut err: sys::ToxErrSetInfo = sys::TOX_ERR_SET_INFO_OK;
        let ok = unsafe {
            (self.api.tox_self_set_name)(self.ptr.as_ptr(), bytes.as_ptr(), bytes.len(), &mut err)
        };
        if ok {
            Ok(())
        } else {
            Err(SetInfoError::from_raw(err))
        }
    }

    pub fn name(&self) -> String {
        let size = unsafe { (self.api.tox_self_get_name_size)(self.ptr.as_ptr()) };
        let mut bytes = vec![0u8; size];
        if size > 0 {
            unsafe { (self.api.tox_self_get_name)(self.ptr.as_ptr(), bytes.as_mut_ptr()) };
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn set_status_message(&mut self, message: &str) -> Result<(), SetInfoError> {
        let bytes = message.as_bytes();
        let mut err: sys::ToxErrSetInfo = sys::TOX_ERR_SET_INFO_OK;
        let ok = unsafe {
            (self.api.tox_self_set_status_message)(
                self.ptr.as_ptr(),
                bytes.as_ptr(),
                bytes.len(),
                &mut err,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(SetInfoError::from_raw(err))
        }
    }

    pub fn status_message(&self) -> String {
        let size = unsafe { (self.api.tox_self_get_status_message_size)(self.ptr.as_ptr()) };
        let mut bytes = vec![0u8; size];
        if size > 0 {
            unsafe { (self.api.tox_self_get_status_message)(self.ptr.as_ptr(), bytes.as_mut_ptr()) };
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Our own DHT connection state.
    pub fn connection_status(&self) -> Connection {
        let raw = unsafe { (self.api.tox_self_get_connection_status)(self.ptr.as_ptr()) };
        Connection::from_raw(raw)
    }

    /// Seed the DHT with a known node.
    pub fn bootstrap(
        &mut self,
        host: &str,
        port: u16,
        public_key: &PublicKey,
    ) -> Result<(), BootstrapError> {
        let host = CString::new(host).map_err(|_| BootstrapError::HostContainsNul)?;
        let mut err: sys::ToxErrBootstrap = sys::TOX_ERR_BOOTSTRAP_OK;
        let ok = unsafe {
            (self.api.tox_bootstrap)(
                self.ptr.as_ptr(),
                host.as_ptr(),
                port,
                public_key.as_bytes().as_ptr(),
                &mut err,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(BootstrapError::from_raw(err))
        }
    }

    /// Register a TCP relay for when UDP is blocked.
    pub fn add_tcp_relay(
        &mut self,
        host: &str,
        port: u16,
        public_key: &PublicKey,
    ) -> Result<(), BootstrapError> {
        let host = CString::new(host).map_err(|_| BootstrapError::HostContainsNul)?;
        let mut err: sys::ToxErrBootstrap = sys::TOX_ERR_BOOTSTRAP_OK;
        let ok = unsafe {
            (self.api.tox_add_tcp_relay)(
                self.ptr.as_ptr(),
                host.as_ptr(),
                port,
                public_key.as_bytes().as_ptr(),
                &mut err,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(BootstrapError::from_raw(err))
        }
    }

    /// Send a friend request. Returns the friend number on success.
    pub fn friend_add(&mut self, address: &Address, message: &str) -> Result<u32, FriendAddError> {
        let bytes = message.as_bytes();
        let mut err: sys::ToxErrFriendAdd = sys::TOX_ERR_FRIEND_ADD_OK;
        let friend = unsafe {
            (self.api.tox_friend_add)(
                self.ptr.as_ptr(),
                address.as_bytes().as_ptr(),
                bytes.as_ptr(),
                bytes.len(),
                &mut err,
            )
        };
        if err == sys::TOX_ERR_FRIEND_ADD_OK {
            Ok(friend)
        } else {
            Err(FriendAddError::from_raw(err))
        }
    }

    /// Accept a received friend request by key, skipping the handshake.
    pub fn friend_add_norequest(&mut self, public_key: &PublicKey) -> Result<u32, FriendAddError> {
        let mut err: sys::ToxErrFriendAdd = sys::TOX_ERR_FRIEND_ADD_OK;
        let friend = unsafe {
            (self.api.tox_friend_add_norequest)(
                self.ptr.as_ptr(),
                public_key.as_bytes().as_ptr(),
                &mut err,
            )
        };
        if err == sys::TOX_ERR_FRIEND_ADD_OK {
            Ok(friend)
        } else {
            Err(FriendAddError::from_raw(err))
        }
    }

    pub fn friend_delete(&mut self, friend: u32) -> Result<(), FriendNotFoundError> {
        let mut err: std::ffi::c_int = 0;
        let ok = unsafe { (self.api.tox_friend_delete)(self.ptr.as_ptr(), friend, &mut err) };
        if ok {
            Ok(())
        } else {
            Err(FriendNotFoundError::from_raw(err))
        }
    }

    pub fn friend_public_key(&self, friend: u32) -> Result<PublicKey, FriendNotFoundError> {
        let mut bytes = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
        let mut err: std::ffi::c_int = 0;
        let ok = unsafe {
            (self.api.tox_friend_get_public_key)(
                self.ptr.as_ptr(),
                friend,
                bytes.as_mut_ptr(),
                &mut err,
            )
        };
        if ok {
            Ok(PublicKey::from_bytes(bytes))
        } else {
            Err(FriendNotFoundError::from_raw(err))
        }
    }

    /// Friend numbers of every known friend.
    pub fn friend_list(&self) -> Vec<u32> {
        let size = unsafe { (self.api.tox_self_get_friend_list_size)(self.ptr.as_ptr()) };
        let mut friends = vec![0u32; size];
        if size > 0 {
            unsafe { (self.api.tox_self_get_friend_list)(self.ptr.as_ptr(), friends.as_mut_ptr()) };
        }
        friends
    }

    /// Queue a text message to a friend. Returns the message id the friend
    /// will acknowledge with a read receipt.
    pub fn send_message(
        &mut self,
        friend: u32,
        kind: MessageKind,
        message: &str,
    ) -> Result<u32, SendMessageError> {
        let bytes = message.as_bytes();
        let mut err: sys::ToxErrFriendSendMessage = sys::TOX_ERR_FRIEND_SEND_MESSAGE_OK;
        let id = unsafe {
            (self.api.tox_friend_send_message)(
                self.ptr.as_ptr(),
                friend,
                kind.to_raw(),
                bytes.as_ptr(),
                bytes.len(),
                &mut err,
            )
        };
        if err == sys::TOX_ERR_FRIEND_SEND_MESSAGE_OK {
            Ok(id)
        } else {
            Err(SendMessageError::from_raw(err))
        }
    }

    /// Serialize the full instance state (keys, friends, DHT nodes) for
    /// [`Options::with_savedata`].
    pub fn savedata(&self) -> Vec<u8> {
        let size = unsafe { (self.api.tox_get_savedata_size)(self.ptr.as_ptr()) };
        let mut bytes = vec![0u8; size];
        if size > 0 {
            unsafe { (self.api.tox_get_savedata)(self.ptr.as_ptr(), bytes.as_mut_ptr()) };
        }
        bytes
    }
}

impl Drop for Tox {
    fn drop(&mut self) {
        unsafe { (self.api.tox_kill)(self.ptr.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These exercise the real library; when libtoxcore is not installed the
    // tests return early instead of failing.
    fn tox() -> Option<Tox> {
        match Tox::new(&Options::default()) {
            Ok(tox) => Some(tox),
            Err(NewError::Load(e)) => {
                eprintln!("skipping: {e}");
                None
            }
            Err(e) => panic!("tox_new failed: {e}"),
        }
    }

    #[test]
    fn address_matches_public_key_and_nospam() {
        let Some(tox) = tox() else { return };
        let addr = tox.address();
        assert_eq!(addr.public_key(), tox.public_key());
        assert_eq!(u32::from_be_bytes(addr.nospam()), tox.nospam());
        // Address bytes coming from the library carry a valid checksum.
        assert!(Address::from_bytes(*addr.as_bytes()).is_ok());
    }

    #[test]
    fn name_and_status_roundtrip() {
        let Some(mut tox) = tox() else { return };
        assert_eq!(tox.name(), "");
        tox.set_name("toxide").unwrap();
        assert_eq!(tox.name(), "toxide");
        tox.set_status_message("echoing").unwrap();
        assert_eq!(tox.status_message(), "echoing");
        let too_long = "x".repeat(sys::TOX_MAX_NAME_LENGTH + 1);
        assert!(matches!(
            tox.set_name(&too_long),
            Err(SetInfoError::TooLong)
        ));
    }

    #[test]
    fn savedata_restores_identity() {
        let Some(mut tox) = tox() else { return };
        tox.set_name("keeper").unwrap();
        let saved = tox.savedata();
        assert!(!saved.is_empty());
        let restored = Tox::new(&Options::with_savedata(saved)).unwrap();
        assert_eq!(restored.public_key(), tox.public_key());
        assert_eq!(restored.name(), "keeper");
    }

    #[test]
    fn friend_add_rejects_own_address() {
        let Some(mut tox) = tox() else { return };
        let own = tox.address();
        assert!(matches!(
            tox.friend_add(&own, "hello me"),
            Err(FriendAddError::OwnKey)
        ));
    }

    #[test]
    fn friend_add_norequest_and_delete() {
        let Some(mut tox) = tox() else { return };
        let other = Tox::new(&Options::default()).unwrap();
        let friend = tox.friend_add_norequest(&other.public_key()).unwrap();
        assert_eq!(tox.friend_list(), vec![friend]);
        assert_eq!(tox.friend_public_key(friend).unwrap(), other.public_key());
        // Offline friend: messages are rejected, not queued.
        assert!(matches!(
            tox.send_message(friend, MessageKind::Normal, "ping"),
            Err(SendMessageError::FriendNotConnected)
        ));
        tox.friend_delete(friend).unwrap();
        assert!(tox.friend_list().is_empty());
        assert!(matches!(
            tox.friend_delete(friend),
            Err(FriendNotFoundError::NotFound)
        ));
    }

    #[test]
    fn bootstrap_rejects_bad_input() {
        let Some(mut tox) = tox() else { return };
        let key = tox.public_key();
        assert_eq!(
            tox.bootstrap("node\0host", 33445, &key),
            Err(BootstrapError::HostContainsNul)
        );
        assert_eq!(
            tox.bootstrap("127.0.0.1", 0, &key),
            Err(BootstrapError::BadPort)
        );
    }

    #[test]
    fn iterate_returns_and_interval_is_sane() {
        let Some(mut tox) = tox() else { return };
        let _ = tox.iterate();
        let interval = tox.iteration_interval();
        assert!(interval > Duration::ZERO && interval < Duration::from_secs(1));
    }
}
