//! Signed-in user and pending sign-in state, kept as JSON files.
//!
//! `user.json` holds the [`UserRecord`] with its stored credential.
//! `pending_flow.json` holds the [`AuthorizationFlow`] between `auth url` and
//! `auth login`.

use std::fs;
use std::path::{Path, PathBuf};

use mixir_sheets::BoxFuture;
use mixir_sheets::google::AuthorizationFlow;
use mixir_store::{PrincipalError, PrincipalResolver, UserRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CliResult;

const USER_FILE: &str = "user.json";
const FLOW_FILE: &str = "pending_flow.json";

/// File-backed session state under one directory.
#[derive(Debug, Clone)]
pub struct Session {
    dir: PathBuf,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    pub fn flow_path(&self) -> PathBuf {
        self.dir.join(FLOW_FILE)
    }

    pub fn load_user(&self) -> CliResult<Option<UserRecord>> {
        read_json(&self.user_path())
    }

    pub fn save_user(&self, user: &UserRecord) -> CliResult<()> {
        write_json(&self.user_path(), user)
    }

    pub fn load_flow(&self) -> CliResult<Option<AuthorizationFlow>> {
        read_json(&self.flow_path())
    }

    pub fn save_flow(&self, flow: &AuthorizationFlow) -> CliResult<()> {
        write_json(&self.flow_path(), flow)
    }

    pub fn clear_flow(&self) -> CliResult<()> {
        remove(&self.flow_path())
    }
}

impl PrincipalResolver for Session {
    fn resolve(&self) -> BoxFuture<'_, Result<UserRecord, PrincipalError>> {
        Box::pin(async move {
            match self.load_user() {
                Ok(Some(user)) => Ok(user),
                Ok(None) => Err(PrincipalError::Anonymous),
                Err(e) => Err(PrincipalError::Load(e.to_string())),
            }
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "no session file");
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Writes through a temp file and a rename, readable by the owner only.
fn write_json<T: Serialize>(path: &Path, value: &T) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, serde_json::to_string_pretty(value)?)?;
    fs::rename(&temp_path, path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), "saved session file");
    Ok(())
}

fn remove(path: &Path) -> CliResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
