// src/session.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::editor::FormEditor;
use crate::models::ReportData;

pub type SessionId = Uuid;

/// Decides whether a username/password pair may open a session.
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single account configured at startup; the password is kept as a SHA-256 digest.
pub struct StaticCredentials {
    username: String,
    password_sha256: [u8; 32],
}

pub fn sha256(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password_sha256: [u8; 32]) -> Self {
        Self { username: username.into(), password_sha256 }
    }

    #[cfg(test)]
    pub fn from_plain(username: impl Into<String>, password: &str) -> Self {
        Self::new(username, sha256(password))
    }
}

impl Authenticator for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && sha256(password) == self.password_sha256
    }
}

/// Everything one signed-in user is working on.
#[derive(Debug, Default)]
pub struct Workspace {
    pub editor: FormEditor,
    pub submitted: Option<ReportData>,
    pub editing: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self { editor: FormEditor::new(), submitted: None, editing: false }
    }

    /// Form is shown until a report is submitted, and again while revising.
    pub fn shows_form(&self) -> bool {
        self.submitted.is_none() || self.editing
    }

    pub fn begin_edit(&mut self) {
        if let Some(report) = &self.submitted {
            self.editor = FormEditor::from_report(report.clone());
            self.editing = true;
        }
    }

    pub fn accept(&mut self, report: ReportData) {
        self.submitted = Some(report);
        self.editing = false;
    }
}

struct Session {
    workspace: Workspace,
    last_seen: Instant,
}

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// In-memory session table. Nothing survives a restart.
///
/// A session idle for `idle_timeout` counts as signed out; expired entries
/// are dropped when touched and swept on every login.
#[derive(Clone)]
pub struct SessionStore {
    auth: Arc<dyn Authenticator>,
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth, sessions: Arc::new(Mutex::new(HashMap::new())), idle_timeout: DEFAULT_IDLE_TIMEOUT }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    fn table(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live session for `id`, touched; an expired one is removed.
    fn live<'t>(&self, table: &'t mut HashMap<SessionId, Session>, id: SessionId) -> Option<&'t mut Session> {
        let now = Instant::now();
        if table.get(&id).is_some_and(|s| now.duration_since(s.last_seen) >= self.idle_timeout) {
            table.remove(&id);
            tracing::debug!("session expired");
            return None;
        }
        let session = table.get_mut(&id)?;
        session.last_seen = now;
        Some(session)
    }

    /// Opens a fresh session with a default-valued form.
    pub fn login(&self, username: &str, password: &str) -> Option<SessionId> {
        if !self.auth.verify(username, password) {
            return None;
        }
        let now = Instant::now();
        let id = Uuid::new_v4();
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, s| now.duration_since(s.last_seen) < self.idle_timeout);
        if table.len() < before {
            tracing::debug!(expired = before - table.len(), "swept idle sessions");
        }
        table.insert(id, Session { workspace: Workspace::new(), last_seen: now });
        Some(id)
    }

    /// Drops the session and any report it held.
    pub fn logout(&self, id: SessionId) -> bool {
        self.table().remove(&id).is_some()
    }

    pub fn is_authenticated(&self, id: SessionId) -> bool {
        self.live(&mut self.table(), id).is_some()
    }

    /// Runs `f` against the session's workspace; `None` when signed out or expired.
    pub fn with_workspace<R>(&self, id: SessionId, f: impl FnOnce(&mut Workspace) -> R) -> Option<R> {
        let mut table = self.table();
        self.live(&mut table, id).map(|s| f(&mut s.workspace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BranchField;

    struct AllowAll;
    impl Authenticator for AllowAll {
        fn verify(&self, _: &str, _: &str) -> bool {
            true
        }
    }

    #[test]
    fn static_credentials_compare_digests() {
        let creds = StaticCredentials::from_plain("admin", "s3cret");
        assert!(creds.verify("admin", "s3cret"));
        assert!(!creds.verify("admin", "S3cret"));
        assert!(!creds.verify("root", "s3cret"));
    }

    #[test]
    fn failed_login_opens_nothing() {
        let store = SessionStore::new(Arc::new(StaticCredentials::from_plain("a", "b")));
        assert!(store.login("a", "wrong").is_none());
        assert!(store.table().is_empty());
    }

    #[test]
    fn logout_discards_in_progress_report() {
        let store = SessionStore::new(Arc::new(AllowAll));
        let id = store.login("x", "y").unwrap();
        store
            .with_workspace(id, |ws| {
                ws.editor.update_branch_field(BranchField::Name, "Draft branch");
                ws.editor.add_activity();
            })
            .unwrap();

        assert!(store.logout(id));
        assert!(!store.is_authenticated(id));
        assert!(store.with_workspace(id, |_| ()).is_none());

        let fresh = store.login("x", "y").unwrap();
        let draft = store.with_workspace(fresh, |ws| ws.editor.draft().clone()).unwrap();
        assert_eq!(draft, ReportData::default());
    }

    #[test]
    fn idle_sessions_expire() {
        let store = SessionStore::new(Arc::new(AllowAll)).with_idle_timeout(Duration::ZERO);
        let id = store.login("x", "y").unwrap();
        assert!(!store.is_authenticated(id));
        assert!(store.with_workspace(id, |_| ()).is_none());
        assert!(store.table().is_empty());
    }

    #[test]
    fn login_sweeps_abandoned_sessions() {
        let store = SessionStore::new(Arc::new(AllowAll)).with_idle_timeout(Duration::ZERO);
        for _ in 0..5 {
            store.login("x", "y").unwrap();
        }
        assert_eq!(store.table().len(), 1);
    }

    #[test]
    fn active_sessions_stay_signed_in() {
        let store = SessionStore::new(Arc::new(AllowAll)).with_idle_timeout(Duration::from_secs(3600));
        let a = store.login("x", "y").unwrap();
        let b = store.login("x", "y").unwrap();
        assert!(store.is_authenticated(a));
        assert!(store.is_authenticated(b));
        assert_eq!(store.table().len(), 2);
    }

    #[test]
    fn begin_edit_prefills_from_submitted() {
        let mut ws = Workspace::default();
        assert!(ws.shows_form());

        let mut report = ReportData::default();
        report.period = "2024".into();
        ws.accept(report.clone());
        assert!(!ws.shows_form());

        ws.begin_edit();
        assert!(ws.shows_form());
        assert_eq!(ws.editor.draft(), &report);
    }
}
