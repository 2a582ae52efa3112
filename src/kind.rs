//! The closed set of transaction kinds a context can run.
//!
//! Dispatch to the matching URL formatter and response parser is a tagged
//! variant (§9 "Dynamic dispatch" design note): the kind is known at
//! compile time, so a `match` replaces what the original expresses as a
//! `switch` over an enum tag plus function-pointer table.

/// What a context is currently doing, or did last. `None` is the only kind
/// allowed while idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    None,
    Publish,
    Subscribe,
    SubscribeV2,
    Leave,
    Time,
    History,
    HistoryV2,
    Heartbeat,
    HereNow,
    GlobalHereNow,
    WhereNow,
    SetState,
    StateGet,
    AddChannelToGroup,
    RemoveChannelFromGroup,
    ListChannelGroup,
    RemoveChannelGroup,
    GrantToken,
    RevokeToken,
    ObjectOps,
    MessageActionOps,
}

impl TransactionKind {
    /// Transactions that carry a channel/group list the auto-heartbeat
    /// subsystem should remember (§4.5: "on every subscribe/heartbeat the
    /// core stores an owned copy ... into the user context").
    pub fn tracks_channel_info(self) -> bool {
        matches!(
            self,
            TransactionKind::Subscribe | TransactionKind::SubscribeV2 | TransactionKind::Heartbeat
        )
    }

    /// Transactions whose completion re-arms (rather than merely ignores)
    /// the paired thumper's period timer (§4.5, `pbauto_heartbeat_start_timer`).
    pub fn arms_heartbeat_timer(self) -> bool {
        self.tracks_channel_info()
    }
}

impl Default for TransactionKind {
    fn default() -> Self {
        TransactionKind::None
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
