//! Ticket-based user authentication for Vapor.
//!
//! Each side of a peer connection proves who it is with a ticket:
//!
//! 1. **Issue**: [`AuthSessions::create_ticket`] produces an
//!    [`AuthTicket`] whose bytes are sent to the peer
//! 2. **Verify**: the peer calls [`AuthSessions::begin_session`] with those
//!    bytes and gets an [`AuthSession`] in [`SessionStatus::Unknown`]
//! 3. **Verdict**: the platform answers asynchronously; the new status
//!    shows up in [`AuthSession::status`] and [`AuthSession::changes`]
//! 4. **Close**: [`AuthSession::close`] when the peer leaves
//!
//! The verdict is delivered through the callback registry, so something
//! has to pump callbacks for sessions to leave `Unknown`.

mod error;
mod session;
mod status;
mod ticket;

pub use error::{AuthError, BeginSessionError};
pub use session::{AuthSession, AuthSessions, StatusChanges};
pub use status::SessionStatus;
pub use ticket::AuthTicket;
