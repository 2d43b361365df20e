//! The control-protocol session's top-level state machine.

/// A control-protocol session's coarse state.
///
/// Mirrors a single FTP-style control connection's lifecycle: closed, then
/// connecting, then an alternating cycle of issuing a command and waiting
/// for its reply, then either idling (`Eof`) or driving a data connection.
/// Any state can fall back to [`SessionState::Initial`] on a fatal error or
/// disconnect; [`SessionState::can_transition_to`] encodes which forward
/// transitions are legal so a session bug shows up as a rejected transition
/// rather than a silently wrong wire exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SessionState {
    /// All connections are closed.
    Initial,
    /// The control socket is connecting.
    Connecting,
    /// Connected to an HTTP proxy, reply not yet seen.
    HttpProxyConnected,
    /// Just after the control socket connected.
    Connected,
    /// Waiting for the reply to a `USER` command.
    UserRespWaiting,
    /// Waiting for the reply to a `CWD` command.
    CwdCwdWaiting,
    /// Control connection open, idle.
    Eof,
    /// Waiting for a reply with a pending data transfer.
    Waiting,
    /// Waiting for an incoming (passive-mode peer) data connection.
    Accepting,
    /// Waiting for the data socket to finish connecting (active mode).
    DatasocketConnecting,
    /// The data connection is open for read or write.
    DataOpen,
}

impl SessionState {
    /// Reports whether moving from `self` to `next` is a legal forward
    /// transition. Every state may additionally fall back to
    /// [`SessionState::Initial`], which callers should check separately
    /// (any state, any time, on disconnect) rather than through this table.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use SessionState::{
            Accepting, Connected, Connecting, CwdCwdWaiting, DataOpen, DatasocketConnecting, Eof,
            HttpProxyConnected, Initial, UserRespWaiting, Waiting,
        };
        matches!(
            (self, next),
            (Initial, Connecting)
                | (Connecting, HttpProxyConnected)
                | (Connecting, Connected)
                | (HttpProxyConnected, Connected)
                | (Connected, UserRespWaiting)
                | (UserRespWaiting, Eof)
                | (UserRespWaiting, CwdCwdWaiting)
                | (Eof, CwdCwdWaiting)
                | (CwdCwdWaiting, Eof)
                | (Eof, Waiting)
                | (Waiting, Eof)
                | (Waiting, Accepting)
                | (Waiting, DatasocketConnecting)
                | (Accepting, DataOpen)
                | (DatasocketConnecting, DataOpen)
                | (DataOpen, Eof)
        )
    }

    /// Reports whether a data connection is open or being set up in this state.
    #[must_use]
    pub const fn is_data_active(self) -> bool {
        matches!(
            self,
            Self::Accepting | Self::DatasocketConnecting | Self::DataOpen
        )
    }
}
