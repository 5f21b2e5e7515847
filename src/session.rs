//! Session state container.
//!
//! Owns the authenticated identity: the current session token, the profile
//! row, a single in-flight loading flag, and the last retained error. All
//! operations are async, bracket the loading flag, and publish a transient
//! notification on completion. Overlapping calls are neither queued nor
//! coalesced; the view layer is expected to disable triggers while loading
//! is set, and concurrent results apply in resolution order.
//!
//! Phase machine: `Initializing -> Unauthenticated <-> Authenticated`.
//! The container starts in `Initializing` until `restore` has decided
//! whether a persisted token is still good, so views can defer redirect
//! decisions until the phase settles.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::profile::{Profile, ProfilePatch, Session};
use crate::store::{AuthService, SignUp};
use crate::theme::ThemeFlag;
use crate::token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Unauthenticated,
    Authenticated,
}

/// Outcome of `register`: either a live session or a pending verification
/// that leaves the container unauthenticated until a later login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    SignedIn,
    VerificationPending,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    session: Option<Session>,
    profile: Option<Profile>,
    loading: bool,
    error: Option<String>,
}

/// Read-only view of the container for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct SessionState {
    auth: Arc<dyn AuthService>,
    notifier: Notifier,
    theme: ThemeFlag,
    data_dir: PathBuf,
    inner: RwLock<Inner>,
}

impl SessionState {
    pub fn new(
        auth: Arc<dyn AuthService>,
        notifier: Notifier,
        theme: ThemeFlag,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            auth,
            notifier,
            theme,
            data_dir,
            inner: RwLock::new(Inner {
                phase: Phase::Initializing,
                session: None,
                profile: None,
                loading: true,
                error: None,
            }),
        }
    }

    /// Attempt to hydrate an authenticated session from the persisted token.
    ///
    /// Resolves the `Initializing` phase either way. A token the service no
    /// longer accepts is cleared; a transport failure leaves the token on
    /// disk for the next run but this run stays unauthenticated.
    pub async fn restore(&self) -> Result<()> {
        self.begin();

        let Some(saved) = token::load_session(&self.data_dir) else {
            self.settle_unauthenticated(None);
            return Ok(());
        };

        match self.auth.restore(&saved).await {
            Ok((session, profile)) => {
                debug!(user_id = %session.user_id, "session restored");
                self.settle_authenticated(session, profile);
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "session restore failed");
                if matches!(err, Error::InvalidCredentials | Error::NotAuthenticated) {
                    let _ = token::clear_session(&self.data_dir);
                }
                self.settle_unauthenticated(None);
                Ok(())
            }
        }
    }

    /// Validate credentials and establish a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.begin();

        match self.auth.sign_in(email, password).await {
            Ok((session, profile)) => {
                if let Err(err) = token::store_session(&self.data_dir, &session) {
                    debug!(error = %err, "failed to persist session token");
                }
                self.settle_authenticated(session, profile);
                self.notifier.success("Logged in");
                Ok(())
            }
            Err(err) => {
                self.settle_failure(&err);
                self.notifier.error(format!("Login failed: {err}"));
                Err(err)
            }
        }
    }

    /// Create an account. Services gated on email verification report
    /// `VerificationPending`, which leaves this container unauthenticated.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<RegisterOutcome> {
        self.begin();

        match self.auth.sign_up(email, password, username).await {
            Ok(SignUp::SignedIn { session, profile }) => {
                if let Err(err) = token::store_session(&self.data_dir, &session) {
                    debug!(error = %err, "failed to persist session token");
                }
                self.settle_authenticated(session, profile);
                self.notifier.success("Registered and logged in");
                Ok(RegisterOutcome::SignedIn)
            }
            Ok(SignUp::VerificationPending) => {
                self.settle_unauthenticated(None);
                self.notifier
                    .info("Registered; confirm your email before logging in");
                Ok(RegisterOutcome::VerificationPending)
            }
            Err(err) => {
                self.settle_failure(&err);
                self.notifier.error(format!("Registration failed: {err}"));
                Err(err)
            }
        }
    }

    /// End the session. The client-side "logged out" guarantee is
    /// unconditional: local state and the persisted token are cleared even
    /// when the remote sign-out fails.
    pub async fn logout(&self) -> Result<()> {
        self.begin();

        let session = {
            let inner = self.read();
            inner.session.clone()
        };

        if let Some(session) = session {
            if let Err(err) = self.auth.sign_out(&session).await {
                debug!(error = %err, "remote sign-out failed; clearing local state anyway");
                self.notifier.error(format!("Sign-out failed remotely: {err}"));
            }
        }

        if let Err(err) = token::clear_session(&self.data_dir) {
            debug!(error = %err, "failed to remove session token");
        }

        self.settle_unauthenticated(None);
        self.notifier.info("Logged out");
        Ok(())
    }

    /// Send changed profile fields to the service and merge the echoed row.
    /// Re-applies the theme flag when the patch touched the theme.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile> {
        let session = {
            let inner = self.read();
            inner.session.clone()
        };
        let Some(session) = session else {
            let err = Error::NotAuthenticated;
            self.settle_failure(&err);
            self.notifier.error(format!("Profile update failed: {err}"));
            return Err(err);
        };

        self.begin();

        match self.auth.update_profile(&session, patch).await {
            Ok(profile) => {
                if patch.theme.is_some() {
                    self.theme.apply(profile.theme);
                }
                {
                    let mut inner = self.write();
                    inner.profile = Some(profile.clone());
                    inner.loading = false;
                    inner.error = None;
                }
                self.notifier.success("Profile updated");
                Ok(profile)
            }
            Err(err) => {
                self.settle_failure(&err);
                self.notifier.error(format!("Profile update failed: {err}"));
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.read();
        SessionSnapshot {
            phase: inner.phase,
            profile: inner.profile.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.read().phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().phase == Phase::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn profile(&self) -> Option<Profile> {
        self.read().profile.clone()
    }

    /// The live session token, for the task container and the views.
    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    fn begin(&self) {
        self.write().loading = true;
    }

    fn settle_authenticated(&self, session: Session, profile: Profile) {
        self.theme.apply(profile.theme);
        let mut inner = self.write();
        inner.phase = Phase::Authenticated;
        inner.session = Some(session);
        inner.profile = Some(profile);
        inner.loading = false;
        inner.error = None;
    }

    fn settle_unauthenticated(&self, error: Option<String>) {
        let mut inner = self.write();
        inner.phase = Phase::Unauthenticated;
        inner.session = None;
        inner.profile = None;
        inner.loading = false;
        inner.error = error;
    }

    /// Record a failed operation without touching the phase: a failed login
    /// stays unauthenticated, a failed profile update stays authenticated.
    fn settle_failure(&self, err: &Error) {
        let mut inner = self.write();
        if inner.phase == Phase::Initializing {
            inner.phase = Phase::Unauthenticated;
        }
        inner.loading = false;
        inner.error = Some(err.to_string());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("session state poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("session state poisoned")
    }
}
