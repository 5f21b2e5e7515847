//! Application composition.
//!
//! Picks the backend implementation from configuration and wires the two
//! state containers to it, to the notifier, and to the theme flag. Both the
//! CLI and the dashboard start from an `App`.

use std::sync::Arc;

use crate::collection::TaskCollection;
use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::memory::MemoryStore;
use crate::notify::Notifier;
use crate::remote::RemoteStore;
use crate::session::SessionState;
use crate::store::{AuthService, TaskService};
use crate::theme::ThemeFlag;

pub struct App {
    pub session: Arc<SessionState>,
    pub tasks: Arc<TaskCollection>,
    pub notifier: Notifier,
    pub theme: ThemeFlag,
}

impl App {
    /// Wire containers to the configured backend.
    pub fn compose(config: &Config) -> Result<App> {
        let (auth, tasks_service): (Arc<dyn AuthService>, Arc<dyn TaskService>) =
            match config.service.backend {
                BackendKind::Memory => {
                    let store = match &config.service.state_file {
                        Some(path) => MemoryStore::with_state_file(path)?,
                        None => MemoryStore::ephemeral(),
                    };
                    let store = Arc::new(store);
                    (store.clone(), store)
                }
                BackendKind::Remote => {
                    let store = Arc::new(RemoteStore::new(
                        &config.service.url,
                        &config.service.api_key,
                    )?);
                    (store.clone(), store)
                }
            };

        let notifier = Notifier::new();
        let theme = ThemeFlag::new(config.ui.default_theme);
        let data_dir = crate::config::resolve_data_dir();

        let session = Arc::new(SessionState::new(
            auth,
            notifier.clone(),
            theme.clone(),
            data_dir,
        ));
        let tasks = Arc::new(TaskCollection::new(
            tasks_service,
            session.clone(),
            notifier.clone(),
        ));

        Ok(App {
            session,
            tasks,
            notifier,
            theme,
        })
    }
}
