use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use taskdeck::collection::TaskCollection;
use taskdeck::error::{Error, Result};
use taskdeck::memory::MemoryStore;
use taskdeck::notify::{MemorySink, Notifier};
use taskdeck::profile::{Profile, ProfilePatch, Session};
use taskdeck::session::SessionState;
use taskdeck::store::{AuthService, SignUp};
use taskdeck::theme::{Theme, ThemeFlag};
use tempfile::TempDir;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";
pub const DEMO_USERNAME: &str = "demo";

/// Containers wired to an in-memory backend with an isolated data dir.
pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub session: Arc<SessionState>,
    pub tasks: Arc<TaskCollection>,
    pub sink: Arc<MemorySink>,
    pub theme: ThemeFlag,
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::ephemeral())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self::wire(store.clone(), store)
    }

    /// Wire containers with a custom auth implementation (e.g. one that
    /// fails sign-out) on top of the shared memory store.
    pub fn with_auth(store: Arc<MemoryStore>, auth: Arc<dyn AuthService>) -> Self {
        Self::wire(store, auth)
    }

    fn wire(store: Arc<MemoryStore>, auth: Arc<dyn AuthService>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let notifier = Notifier::new();
        let sink = Arc::new(MemorySink::new());
        notifier.subscribe(sink.clone());
        let theme = ThemeFlag::new(Theme::Dark);

        let session = Arc::new(SessionState::new(
            auth,
            notifier.clone(),
            theme.clone(),
            dir.path().to_path_buf(),
        ));
        let tasks = Arc::new(TaskCollection::new(store.clone(), session.clone(), notifier));

        Self {
            store,
            session,
            tasks,
            sink,
            theme,
            dir,
        }
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Seed the demo account and log in.
    pub async fn login_demo(&self) {
        self.store
            .seed_user(DEMO_EMAIL, DEMO_PASSWORD, DEMO_USERNAME);
        self.session
            .login(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .expect("demo login failed");
    }
}

/// Auth wrapper whose sign-out can be made to fail, for exercising the
/// best-effort logout guarantee.
pub struct FlakyAuth {
    inner: Arc<MemoryStore>,
    fail_sign_out: AtomicBool,
}

impl FlakyAuth {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_sign_out: AtomicBool::new(false),
        }
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl AuthService for FlakyAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Profile)> {
        self.inner.sign_in(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<SignUp> {
        self.inner.sign_up(email, password, username).await
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(Error::Service("sign-out endpoint unavailable".to_string()));
        }
        self.inner.sign_out(session).await
    }

    async fn restore(&self, session: &Session) -> Result<(Session, Profile)> {
        self.inner.restore(session).await
    }

    async fn fetch_profile(&self, session: &Session) -> Result<Profile> {
        self.inner.fetch_profile(session).await
    }

    async fn update_profile(&self, session: &Session, patch: &ProfilePatch) -> Result<Profile> {
        self.inner.update_profile(session, patch).await
    }
}
