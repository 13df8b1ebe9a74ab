//! The auth session table.
//!
//! One entry per claimed identity. Every handle to a session refers to
//! its entry by `(claimed id, generation)`; a handle whose generation no
//! longer matches the table belongs to a session that has been closed,
//! even if a new session for the same user has started since.
//!
//! # Lifecycle
//!
//! ```text
//! begin_session() ──→ [Unknown] ──verdict──→ [Ok | rejected] ──┐
//!                          │                                  │
//!                          └──────── close() / last drop ─────┴──→ [Closed]
//! ```
//!
//! # Locking
//!
//! The table has one mutex. `begin_session` takes it before the lazy
//! callback registration, so the lock order is table → once group →
//! callback registry. The verdict handler only takes the table lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{info, trace, warn};
use vapor_native::{
    AuthTicketHandle, BeginAuthSessionResult, UserHasLicense, ValidateAuthTicketResponse,
};
use vapor_runtime::{Context, ResettableOnce};
use vapor_types::{AppId, SteamId};

use crate::{AuthError, AuthTicket, BeginSessionError, SessionStatus};

/// Size of the buffer handed to the SDK for a new ticket.
const TICKET_BUFFER_LEN: usize = 1024;

struct Entry {
    generation: u64,
    owner: Option<SteamId>,
    status: SessionStatus,
    tx: watch::Sender<SessionStatus>,
    /// Live handles that have not been closed.
    handles: usize,
}

struct Shared {
    ctx: Context,
    sessions: Mutex<HashMap<SteamId, Entry>>,
    next_generation: AtomicU64,
    callback_once: ResettableOnce,
    leaked: AtomicUsize,
}

impl Shared {
    fn sessions(&self) -> MutexGuard<'_, HashMap<SteamId, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_callback(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.callback_once.call_once(|hooks| {
            let reg = self
                .ctx
                .register(move |resp: ValidateAuthTicketResponse| on_validate(&weak, resp));
            hooks.push(move || reg.unregister());
        });
    }

    /// Ends the native session and removes the entry. Caller holds the lock.
    fn end(&self, sessions: &mut HashMap<SteamId, Entry>, claimed: SteamId) {
        if let Some(entry) = sessions.remove(&claimed) {
            {
                let _guard = self.ctx.guard();
                self.ctx.native().end_auth_session(claimed);
            }
            entry.tx.send_replace(SessionStatus::Closed);
        }
    }
}

fn on_validate(shared: &Weak<Shared>, resp: ValidateAuthTicketResponse) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let claimed = resp.steam_id();
    let mut sessions = shared.sessions();
    let Some(entry) = sessions.get_mut(&claimed) else {
        trace!(%claimed, "verdict for unknown auth session ignored");
        return;
    };

    let status = SessionStatus::from(resp.response());
    entry.owner = Some(resp.owner_steam_id());
    entry.status = status;
    entry.tx.send_replace(status);

    info!(%claimed, owner = %resp.owner_steam_id(), %status, "auth ticket verdict");
}

/// Tracks authentication sessions with remote users.
///
/// Cheap to clone; clones share one session table.
#[derive(Clone)]
pub struct AuthSessions {
    shared: Arc<Shared>,
}

impl AuthSessions {
    pub fn new(ctx: Context) -> Self {
        Self {
            shared: Arc::new(Shared {
                callback_once: ctx.new_once(),
                ctx,
                sessions: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                leaked: AtomicUsize::new(0),
            }),
        }
    }

    /// Submits a ticket from `claimed` for verification.
    ///
    /// On success the session starts in [`SessionStatus::Unknown`]; the
    /// verdict arrives later through [`AuthSession::changes`].
    ///
    /// # Errors
    ///
    /// Returns [`BeginSessionError::DuplicateRequest`] when `claimed`
    /// already has an active session; the error carries a handle to it.
    /// An empty ticket is rejected as invalid without asking the platform.
    pub fn begin_session(&self, ticket: &[u8], claimed: SteamId) -> Result<AuthSession, BeginSessionError> {
        if ticket.is_empty() {
            return Err(BeginSessionError::InvalidTicket);
        }

        let mut sessions = self.shared.sessions();
        self.shared.ensure_callback();

        let result = {
            let _guard = self.shared.ctx.guard();
            self.shared.ctx.native().begin_auth_session(ticket, claimed)
        };

        match result {
            BeginAuthSessionResult::Ok => {
                let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(SessionStatus::Unknown);
                let entry = Entry {
                    generation,
                    owner: None,
                    status: SessionStatus::Unknown,
                    tx,
                    handles: 1,
                };
                if let Some(stale) = sessions.insert(claimed, entry) {
                    // The platform forgot a session we still tracked.
                    warn!(%claimed, generation = stale.generation, "replacing stale auth session");
                    stale.tx.send_replace(SessionStatus::Closed);
                }
                info!(%claimed, "auth session started");
                Ok(AuthSession::new(&self.shared, claimed, generation, rx))
            }
            BeginAuthSessionResult::DuplicateRequest => {
                let existing = sessions.get_mut(&claimed).map(|entry| {
                    entry.handles += 1;
                    AuthSession::new(&self.shared, claimed, entry.generation, entry.tx.subscribe())
                });
                Err(BeginSessionError::DuplicateRequest { existing })
            }
            BeginAuthSessionResult::InvalidTicket => Err(BeginSessionError::InvalidTicket),
            BeginAuthSessionResult::InvalidVersion => Err(BeginSessionError::InvalidVersion),
            BeginAuthSessionResult::GameMismatch => Err(BeginSessionError::GameMismatch),
            BeginAuthSessionResult::ExpiredTicket => Err(BeginSessionError::ExpiredTicket),
            BeginAuthSessionResult::Unknown(raw) => Err(BeginSessionError::Unknown(raw)),
        }
    }

    /// Issues a ticket proving the local user's identity to a peer.
    pub fn create_ticket(&self) -> Result<AuthTicket, AuthError> {
        let mut buffer = vec![0u8; TICKET_BUFFER_LEN];
        let (handle, len) = {
            let _guard = self.shared.ctx.guard();
            self.shared.ctx.native().get_auth_session_ticket(&mut buffer)
        };
        if handle == AuthTicketHandle::INVALID {
            return Err(AuthError::TicketUnavailable);
        }
        buffer.truncate(len);
        Ok(AuthTicket::new(Arc::clone(self.shared.ctx.native()), handle, buffer))
    }

    /// Number of sessions in the table.
    pub fn active_sessions(&self) -> usize {
        self.shared.sessions().len()
    }

    /// Number of sessions closed because their last handle was dropped
    /// without [`AuthSession::close`].
    pub fn leaked_sessions(&self) -> usize {
        self.shared.leaked.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for AuthSessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSessions")
            .field("active", &self.active_sessions())
            .field("leaked", &self.leaked_sessions())
            .finish()
    }
}

/// Handle to one authentication session.
///
/// Sessions must be closed with [`close`](Self::close) when the peer
/// leaves. When the last unclosed handle to a session is dropped instead,
/// the session is still ended, but a developer error is logged and
/// counted in [`AuthSessions::leaked_sessions`].
pub struct AuthSession {
    shared: Arc<Shared>,
    claimed: SteamId,
    generation: u64,
    rx: watch::Receiver<SessionStatus>,
    closed: AtomicBool,
}

impl AuthSession {
    fn new(shared: &Arc<Shared>, claimed: SteamId, generation: u64, rx: watch::Receiver<SessionStatus>) -> Self {
        Self {
            shared: Arc::clone(shared),
            claimed,
            generation,
            rx,
            closed: AtomicBool::new(false),
        }
    }

    /// The identity the ticket claims. Only trust it once the status is
    /// [`SessionStatus::Ok`].
    pub fn claimed_id(&self) -> SteamId {
        self.claimed
    }

    /// The license owner, once the platform has answered. Differs from
    /// the claimed identity when the game is family-shared.
    pub fn owner_id(&self) -> Option<SteamId> {
        let sessions = self.shared.sessions();
        match sessions.get(&self.claimed) {
            Some(entry) if entry.generation == self.generation => entry.owner,
            _ => None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.closed.load(Ordering::Acquire) {
            return SessionStatus::Closed;
        }
        let sessions = self.shared.sessions();
        match sessions.get(&self.claimed) {
            Some(entry) if entry.generation == self.generation => entry.status,
            _ => SessionStatus::Closed,
        }
    }

    /// Subscribes to status changes.
    pub fn changes(&self) -> StatusChanges {
        StatusChanges { rx: self.rx.clone() }
    }

    /// Whether the user owns `dlc`. `false` until the session is verified.
    pub fn owns_dlc(&self, dlc: AppId) -> bool {
        let _guard = self.shared.ctx.guard();
        self.shared.ctx.native().user_has_license_for_app(self.claimed, dlc) == UserHasLicense::HasLicense
    }

    /// Ends the session for every handle that refers to it.
    ///
    /// # Errors
    ///
    /// [`AuthError::AlreadyClosed`] if this handle, or any other handle
    /// to the same session, already closed it. Other sessions are not
    /// touched in that case.
    pub fn close(&self) -> Result<(), AuthError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(AuthError::AlreadyClosed);
        }
        let mut sessions = self.shared.sessions();
        let current = sessions
            .get(&self.claimed)
            .is_some_and(|entry| entry.generation == self.generation);
        if !current {
            return Err(AuthError::AlreadyClosed);
        }

        self.shared.end(&mut sessions, self.claimed);
        info!(claimed = %self.claimed, "auth session closed");
        Ok(())
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        if *self.closed.get_mut() {
            return;
        }
        let mut sessions = self.shared.sessions();
        let Some(entry) = sessions.get_mut(&self.claimed) else {
            return;
        };
        if entry.generation != self.generation {
            return;
        }
        if entry.handles > 1 {
            entry.handles -= 1;
            return;
        }

        self.shared.end(&mut sessions, self.claimed);
        self.shared.leaked.fetch_add(1, Ordering::Relaxed);
        warn!(
            claimed = %self.claimed,
            "[DEVELOPER ERROR] auth sessions must be closed when they are no longer in use"
        );
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("claimed", &self.claimed)
            .field("generation", &self.generation)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

/// Stream of status changes for one session.
///
/// Holds at most one pending value: a verdict that arrives before the
/// previous one was read replaces it. After the session is closed, every
/// read yields [`SessionStatus::Closed`].
#[derive(Debug, Clone)]
pub struct StatusChanges {
    rx: watch::Receiver<SessionStatus>,
}

impl StatusChanges {
    /// Waits for the next status.
    pub async fn next(&mut self) -> SessionStatus {
        match self.rx.changed().await {
            Ok(()) => *self.rx.borrow_and_update(),
            Err(_) => SessionStatus::Closed,
        }
    }

    /// The pending status, if one arrived since the last read.
    pub fn try_next(&mut self) -> Option<SessionStatus> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            Ok(false) => None,
            Err(_) => Some(SessionStatus::Closed),
        }
    }

    /// The most recent status, read or not.
    pub fn latest(&self) -> SessionStatus {
        *self.rx.borrow()
    }
}
