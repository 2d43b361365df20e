//! The `USER`/`PASS`/`TYPE I` login sequence shared by every job that needs
//! an authenticated, binary-mode session before it can negotiate a data
//! channel.

use protocol::session::Session;
use protocol::state::SessionState;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    AwaitingWelcome,
    AwaitingUserReply,
    AwaitingPassReply,
    AwaitingTypeReply,
    Ready,
}

/// Drives a freshly connected [`Session`] through login and `TYPE I`.
/// Call [`Login::step`] once per scheduler pass, after polling the control
/// connection and feeding every newly complete line to the session.
pub struct Login {
    phase: Phase,
}

impl Login {
    /// Starts a new login sequence. Assumes the caller has already called
    /// [`Session::begin_connect`] and [`Session::control_connected`].
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: Phase::AwaitingWelcome }
    }

    /// Advances login by one step. Returns `true` once the session is
    /// authenticated and in binary mode.
    pub fn step(&mut self, session: &mut Session, user: &str, password: &str) -> bool {
        match self.phase {
            Phase::AwaitingWelcome => {
                if session.state() == SessionState::Connected && session.pending_replies() == 0 {
                    session.send_user(user);
                    self.phase = Phase::AwaitingUserReply;
                }
            }
            Phase::AwaitingUserReply => {
                if session.pending_replies() == 0 {
                    if session.state() == SessionState::Eof {
                        session.send_type_binary();
                        self.phase = Phase::AwaitingTypeReply;
                    } else {
                        session.send_pass(password);
                        self.phase = Phase::AwaitingPassReply;
                    }
                }
            }
            Phase::AwaitingPassReply => {
                if session.pending_replies() == 0 && session.state() == SessionState::Eof {
                    session.send_type_binary();
                    self.phase = Phase::AwaitingTypeReply;
                }
            }
            Phase::AwaitingTypeReply => {
                if session.pending_replies() == 0 {
                    self.phase = Phase::Ready;
                }
            }
            Phase::Ready => {}
        }
        matches!(self.phase, Phase::Ready)
    }
}

impl Default for Login {
    fn default() -> Self {
        Self::new()
    }
}
