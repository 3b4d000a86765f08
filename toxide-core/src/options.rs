//! Startup options applied to `tox_options_new` right before `tox_new`.

use toxide_sys as sys;

/// Options for creating a [`crate::Tox`] instance. `Default` mirrors the
/// library defaults.
#[derive(Debug, Clone)]
pub struct Options {
    /// Bind to IPv6 as well as IPv4.
    pub ipv6_enabled: bool,
    /// Use UDP for the DHT; disable to force TCP relays only.
    pub udp_enabled: bool,
    /// Announce and listen on the local network (LAN discovery).
    pub local_discovery_enabled: bool,
    /// First port to try binding to; 0 lets the library pick.
    pub start_port: u16,
    /// Last port of the bind range; 0 mirrors `start_port`.
    pub end_port: u16,
    /// Port for incoming TCP relay connections; 0 disables the relay.
    pub tcp_port: u16,
    /// Serialized state from [`crate::Tox::savedata`] to resume an identity.
    pub savedata: Option<Vec<u8>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ipv6_enabled: true,
            udp_enabled: true,
            local_discovery_enabled: true,
            start_port: 0,
            end_port: 0,
            tcp_port: 0,
            savedata: None,
        }
    }
}

impl Options {
    /// Options resuming from previously serialized state.
    pub fn with_savedata(savedata: Vec<u8>) -> Self {
        Self {
            savedata: Some(savedata),
            ..Self::default()
        }
    }

    /// Copy the settings onto a native options object.
    ///
    /// # Safety
    /// `raw` must be a live pointer from `tox_options_new`. The savedata
    /// buffer is not copied by the library; `self` must outlive the
    /// `tox_new` call the options are passed to.
    pub(crate) unsafe fn apply(&self, api: &sys::ToxApi, raw: *mut sys::ToxOptions) {
        (api.tox_options_set_ipv6_enabled)(raw, self.ipv6_enabled);
        (api.tox_options_set_udp_enabled)(raw, self.udp_enabled);
        (api.tox_options_set_local_discovery_enabled)(raw, self.local_discovery_enabled);
        (api.tox_options_set_start_port)(raw, self.start_port);
        (api.tox_options_set_end_port)(raw, self.end_port);
        (api.tox_options_set_tcp_port)(raw, self.tcp_port);
        if let Some(savedata) = &self.savedata {
            (api.tox_options_set_savedata_type)(raw, sys::TOX_SAVEDATA_TYPE_TOX_SAVE);
            (api.tox_options_set_savedata_data)(raw, savedata.as_ptr(), savedata.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_library() {
        let o = Options::default();
        assert!(o.ipv6_enabled);
        assert!(o.udp_enabled);
        assert!(o.local_discovery_enabled);
        assert_eq!((o.start_port, o.end_port, o.tcp_port), (0, 0, 0));
        assert!(o.savedata.is_none());
    }

    #[test]
    fn with_savedata_keeps_defaults() {
        let o = Options::with_savedata(vec![1, 2, 3]);
        assert!(o.udp_enabled);
        assert_eq!(o.savedata.as_deref(), Some(&[1u8, 2, 3][..]));
    }
}
