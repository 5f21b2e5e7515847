//! In-memory backend.
//!
//! Implements the full service contract against process-local tables. Used
//! by tests and by the `backend = "memory"` configuration, where an optional
//! JSON state file lets separate CLI invocations share one fake backend.
//! Writes to the state file go through a temp file and rename so a crashed
//! process never leaves a torn file behind.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::profile::{Profile, ProfilePatch, Session};
use crate::store::{AuthService, SignUp, TaskService};
use crate::task::{NewTask, Status, Task, TaskPatch};
use crate::theme::Theme;

const STATE_SCHEMA_VERSION: &str = "taskdeck.state.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    id: Uuid,
    email: String,
    password: String,
    verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    access_token: String,
    refresh_token: String,
    user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemoryState {
    schema_version: String,
    users: Vec<UserRecord>,
    profiles: Vec<Profile>,
    tasks: Vec<Task>,
    sessions: Vec<SessionRecord>,
}

impl MemoryState {
    fn empty() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION.to_string(),
            users: Vec::new(),
            profiles: Vec::new(),
            tasks: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

pub struct MemoryStore {
    state: Mutex<MemoryState>,
    state_file: Option<PathBuf>,
    require_verification: bool,
}

impl MemoryStore {
    /// Backend that lives and dies with the process.
    pub fn ephemeral() -> Self {
        Self {
            state: Mutex::new(MemoryState::empty()),
            state_file: None,
            require_verification: false,
        }
    }

    /// Backend persisted to a JSON state file, shared across invocations.
    pub fn with_state_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path)?;
        Ok(Self {
            state: Mutex::new(state),
            state_file: Some(path),
            require_verification: false,
        })
    }

    /// Gate sign-up behind email verification, so both register outcomes are
    /// reachable.
    pub fn require_verification(mut self, required: bool) -> Self {
        self.require_verification = required;
        self
    }

    /// Create a verified account directly, bypassing sign-up. Returns the
    /// new user id.
    pub fn seed_user(&self, email: &str, password: &str, username: &str) -> Uuid {
        let mut state = self.lock();
        let id = Uuid::new_v4();
        state.users.push(UserRecord {
            id,
            email: email.to_string(),
            password: password.to_string(),
            verified: true,
        });
        state.profiles.push(Profile {
            id,
            username: username.to_string(),
            avatar_url: None,
            theme: Theme::default(),
        });
        self.persist(&state);
        id
    }

    /// Insert a task row directly, bypassing the service contract.
    pub fn seed_task(&self, user_id: Uuid, title: &str, priority: crate::task::Priority) -> Task {
        let mut state = self.lock();
        let task = Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            priority,
            status: Status::Todo,
            created_at: Utc::now(),
            user_id,
        };
        state.tasks.push(task.clone());
        self.persist(&state);
        task
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store poisoned")
    }

    fn persist(&self, state: &MemoryState) {
        let Some(path) = &self.state_file else {
            return;
        };
        if let Err(err) = save_state(path, state) {
            debug!(error = %err, path = %path.display(), "failed to persist memory state");
        }
    }

    fn issue_session(state: &mut MemoryState, user_id: Uuid) -> Session {
        let record = SessionRecord {
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Uuid::new_v4().simple().to_string(),
            user_id,
        };
        state.sessions.push(record.clone());
        Session {
            user_id,
            access_token: record.access_token,
            refresh_token: Some(record.refresh_token),
        }
    }

    /// Resolve the session token to its owning user, rejecting revoked or
    /// unknown tokens.
    fn authorize(state: &MemoryState, session: &Session) -> Result<Uuid> {
        state
            .sessions
            .iter()
            .find(|record| record.access_token == session.access_token)
            .map(|record| record.user_id)
            .ok_or(Error::NotAuthenticated)
    }

    fn profile_for(state: &MemoryState, user_id: Uuid) -> Result<Profile> {
        state
            .profiles
            .iter()
            .find(|profile| profile.id == user_id)
            .cloned()
            .ok_or(Error::ProfileNotFound)
    }
}

#[async_trait::async_trait]
impl AuthService for MemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Profile)> {
        let mut state = self.lock();
        let user = state
            .users
            .iter()
            .find(|user| user.email == email && user.password == password)
            .cloned()
            .ok_or(Error::InvalidCredentials)?;
        if !user.verified {
            return Err(Error::InvalidCredentials);
        }

        let session = Self::issue_session(&mut state, user.id);
        let profile = Self::profile_for(&state, user.id)?;
        self.persist(&state);
        Ok((session, profile))
    }

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<SignUp> {
        let mut state = self.lock();
        if state.users.iter().any(|user| user.email == email) {
            return Err(Error::Service(format!("email already registered: {email}")));
        }

        let id = Uuid::new_v4();
        state.users.push(UserRecord {
            id,
            email: email.to_string(),
            password: password.to_string(),
            verified: !self.require_verification,
        });
        state.profiles.push(Profile {
            id,
            username: username.to_string(),
            avatar_url: None,
            theme: Theme::default(),
        });

        if self.require_verification {
            self.persist(&state);
            return Ok(SignUp::VerificationPending);
        }

        let session = Self::issue_session(&mut state, id);
        let profile = Self::profile_for(&state, id)?;
        self.persist(&state);
        Ok(SignUp::SignedIn { session, profile })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let mut state = self.lock();
        state
            .sessions
            .retain(|record| record.access_token != session.access_token);
        self.persist(&state);
        Ok(())
    }

    async fn restore(&self, session: &Session) -> Result<(Session, Profile)> {
        let state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        let profile = Self::profile_for(&state, user_id)?;
        Ok((session.clone(), profile))
    }

    async fn fetch_profile(&self, session: &Session) -> Result<Profile> {
        let state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        Self::profile_for(&state, user_id)
    }

    async fn update_profile(&self, session: &Session, patch: &ProfilePatch) -> Result<Profile> {
        let mut state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        let profile = state
            .profiles
            .iter_mut()
            .find(|profile| profile.id == user_id)
            .ok_or(Error::ProfileNotFound)?;
        patch.apply_to(profile);
        let updated = profile.clone();
        self.persist(&state);
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl TaskService for MemoryStore {
    async fn list(&self, session: &Session) -> Result<Vec<Task>> {
        let state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, session: &Session, new: &NewTask) -> Result<Task> {
        new.validate()?;
        let mut state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            status: Status::Todo,
            created_at: Utc::now(),
            user_id,
        };
        state.tasks.push(task.clone());
        self.persist(&state);
        Ok(task)
    }

    async fn update(&self, session: &Session, id: Uuid, patch: &TaskPatch) -> Result<Task> {
        let mut state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id && task.user_id == user_id)
            .ok_or(Error::TaskNotFound(id))?;
        patch.apply_to(task);
        let updated = task.clone();
        self.persist(&state);
        Ok(updated)
    }

    async fn delete(&self, session: &Session, id: Uuid) -> Result<()> {
        let mut state = self.lock();
        let user_id = Self::authorize(&state, session)?;
        let index = state
            .tasks
            .iter()
            .position(|task| task.id == id && task.user_id == user_id)
            .ok_or(Error::TaskNotFound(id))?;
        state.tasks.remove(index);
        self.persist(&state);
        Ok(())
    }
}

fn load_state(path: &Path) -> Result<MemoryState> {
    if !path.exists() {
        return Ok(MemoryState::empty());
    }

    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(MemoryState::empty());
    }

    let state: MemoryState = serde_json::from_str(&raw)?;
    if state.schema_version != STATE_SCHEMA_VERSION {
        return Err(Error::InvalidConfig(format!(
            "unsupported state schema: {}",
            state.schema_version
        )));
    }
    Ok(state)
}

fn save_state(path: &Path, state: &MemoryState) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut file, state)?;
    file.persist(path)
        .map_err(|err| Error::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    #[tokio::test]
    async fn state_survives_a_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let store = MemoryStore::with_state_file(&path).expect("open");
        let user_id = store.seed_user("demo@example.com", "password", "demo");
        store.seed_task(user_id, "Persisted", Priority::Low);

        let reopened = MemoryStore::with_state_file(&path).expect("reopen");
        let (session, _) = reopened
            .sign_in("demo@example.com", "password")
            .await
            .expect("sign in");
        let tasks = reopened.list(&session).await.expect("list");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Persisted");
    }

    #[tokio::test]
    async fn stale_token_is_rejected() {
        let store = MemoryStore::ephemeral();
        store.seed_user("demo@example.com", "password", "demo");
        let (session, _) = store
            .sign_in("demo@example.com", "password")
            .await
            .expect("sign in");

        store.sign_out(&session).await.expect("sign out");

        let err = store.list(&session).await.expect_err("revoked");
        assert!(matches!(err, Error::NotAuthenticated));
    }
}
