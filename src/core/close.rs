use crate::core::uri::Uri;

#[derive(Debug, Default, Clone, Copy)]
pub enum CloseReason {
    #[default]
    Normal,
    SystemShutdown,
    CloseRealm,
    Killed,
    TimedOut,
    GoodbyeAndOut,
    /// The client is logging out; cookie bindings for this session should be torn down and any
    /// other transport sharing the same cookie kicked.
    LogOut,
}

impl CloseReason {
    fn uri_component(&self) -> &str {
        match self {
            Self::Normal => "normal",
            Self::SystemShutdown => "system_shutdown",
            Self::CloseRealm => "close_realm",
            Self::Killed => "killed",
            Self::TimedOut => "timed_out",
            Self::GoodbyeAndOut => "goodbye_and_out",
            Self::LogOut => "logout",
        }
    }

    pub fn uri(&self) -> Uri {
        Uri::from_known(format!("wamp.close.{}", self.uri_component()))
    }

    /// Recovers the well-known close reason from a wire URI, if recognized.
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        match uri.as_ref() {
            "wamp.close.normal" => Some(Self::Normal),
            "wamp.close.system_shutdown" => Some(Self::SystemShutdown),
            "wamp.close.close_realm" => Some(Self::CloseRealm),
            "wamp.close.killed" => Some(Self::Killed),
            "wamp.close.timed_out" => Some(Self::TimedOut),
            "wamp.close.goodbye_and_out" => Some(Self::GoodbyeAndOut),
            "wamp.close.logout" => Some(Self::LogOut),
            _ => None,
        }
    }
}

#[cfg(test)]
mod close_reason_test {
    use crate::core::close::CloseReason;

    #[test]
    fn round_trips_through_uri() {
        for reason in [
            CloseReason::Normal,
            CloseReason::SystemShutdown,
            CloseReason::CloseRealm,
            CloseReason::Killed,
            CloseReason::TimedOut,
            CloseReason::GoodbyeAndOut,
            CloseReason::LogOut,
        ] {
            let uri = reason.uri();
            assert_matches::assert_matches!(CloseReason::from_uri(&uri), Some(_));
        }
    }

    #[test]
    fn logout_maps_to_well_known_uri() {
        assert_eq!(CloseReason::LogOut.uri().as_ref(), "wamp.close.logout");
    }
}