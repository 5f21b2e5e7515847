//! Persisted session token.
//!
//! The session issued at login is stored as `session.json` in the data
//! directory so the next invocation can restore it without re-prompting for
//! credentials. The file is opaque client state: written atomically, read
//! leniently (a corrupt or unreadable file simply means "no session"), and
//! removed on logout or on a failed restore.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::profile::Session;

const SESSION_FILENAME: &str = "session.json";

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILENAME)
}

/// Load the persisted session, if one exists and parses.
pub fn load_session(data_dir: &Path) -> Option<Session> {
    let path = session_path(data_dir);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(_) => None,
    }
}

/// Persist the session for later restoration.
pub fn store_session(data_dir: &Path, session: &Session) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;

    let mut file = tempfile::NamedTempFile::new_in(data_dir)?;
    serde_json::to_writer_pretty(&mut file, session)?;
    file.persist(session_path(data_dir))
        .map_err(|err| Error::Io(err.error))?;
    Ok(())
}

/// Remove the persisted session. Removing a missing file is not an error.
pub fn clear_session(data_dir: &Path) -> Result<()> {
    match std::fs::remove_file(session_path(data_dir)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Io(err)),
    }
}
