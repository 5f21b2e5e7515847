//! Backend service contract.
//!
//! One interface, two interchangeable implementations picked at composition
//! time: `MemoryStore` (in-process fake for tests and offline use) and
//! `RemoteStore` (the hosted auth/data service). Containers only ever see
//! these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::profile::{Profile, ProfilePatch, Session};
use crate::task::{NewTask, Task, TaskPatch};

/// Outcome of a sign-up request. Services that require out-of-band email
/// verification return `VerificationPending` instead of a session; that is a
/// distinct non-success, not an error.
#[derive(Debug, Clone)]
pub enum SignUp {
    SignedIn { session: Session, profile: Profile },
    VerificationPending,
}

/// Authentication and profile operations.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate credentials and establish a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Profile)>;

    /// Create an account. May require verification before a session exists.
    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<SignUp>;

    /// Invalidate the session on the service side.
    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Re-validate a previously persisted session token.
    async fn restore(&self, session: &Session) -> Result<(Session, Profile)>;

    /// Read the profile row belonging to the session's user.
    async fn fetch_profile(&self, session: &Session) -> Result<Profile>;

    /// Update the profile row; only set fields are sent. Returns the echoed
    /// row.
    async fn update_profile(&self, session: &Session, patch: &ProfilePatch) -> Result<Profile>;
}

/// Task CRUD scoped to the session's user.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Fetch the full task set, oldest first.
    async fn list(&self, session: &Session) -> Result<Vec<Task>>;

    /// Create a task; the service assigns id, timestamp, and owner.
    async fn insert(&self, session: &Session, new: &NewTask) -> Result<Task>;

    /// Patch an existing task. `TaskNotFound` when the row is missing.
    async fn update(&self, session: &Session, id: Uuid, patch: &TaskPatch) -> Result<Task>;

    /// Delete a task. `TaskNotFound` when the row is already gone.
    async fn delete(&self, session: &Session, id: Uuid) -> Result<()>;
}
