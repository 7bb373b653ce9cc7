// src/session.rs
//! Per-session working state: current template, current upload, last result

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{FormatterError, FormatterResult};
use crate::types::resume::{ProcessingOutcome, ResumeUpload};

#[derive(Debug, Clone)]
pub struct SelectedTemplate {
    /// File name in the store, `None` for manually entered content
    pub name: Option<String>,
    pub content: String,
}

/// The upload and outcome of the most recent successful run
#[derive(Debug, Clone)]
pub struct LastRun {
    pub upload: ResumeUpload,
    pub outcome: ProcessingOutcome,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    template: Option<SelectedTemplate>,
    upload: Option<ResumeUpload>,
    last_run: Option<LastRun>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub template_name: Option<String>,
    pub template_loaded: bool,
    pub resume_filename: Option<String>,
    pub resume_size: Option<usize>,
    pub has_result: bool,
    pub data_keys: Vec<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            template: None,
            upload: None,
            last_run: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn select_template(&mut self, name: impl Into<String>, content: String) {
        self.template = Some(SelectedTemplate {
            name: Some(name.into()),
            content,
        });
    }

    pub fn set_template_content(&mut self, content: String) {
        self.template = Some(SelectedTemplate {
            name: None,
            content,
        });
    }

    pub fn template(&self) -> Option<&SelectedTemplate> {
        self.template.as_ref()
    }

    pub fn attach_upload(&mut self, upload: ResumeUpload) {
        self.upload = Some(upload);
    }

    pub fn upload(&self) -> Option<&ResumeUpload> {
        self.upload.as_ref()
    }

    pub fn record_result(&mut self, upload: ResumeUpload, outcome: ProcessingOutcome) {
        self.last_run = Some(LastRun {
            upload,
            outcome,
            processed_at: Utc::now(),
        });
    }

    pub fn last_run(&self) -> Option<&LastRun> {
        self.last_run.as_ref()
    }

    pub fn clear_result(&mut self) {
        self.last_run = None;
    }

    /// Drop everything except identity
    pub fn clear(&mut self) {
        self.template = None;
        self.upload = None;
        self.last_run = None;
    }

    /// Snapshot of what a processing run needs: the upload and a non-empty
    /// template. Cloned so no lock is held while the request is in flight.
    pub fn prepare_run(&self) -> FormatterResult<(ResumeUpload, String)> {
        let template = self
            .template
            .as_ref()
            .filter(|t| !t.content.trim().is_empty())
            .ok_or(FormatterError::MissingInput("no template selected"))?;
        let upload = self
            .upload
            .as_ref()
            .ok_or(FormatterError::MissingInput("no resume uploaded"))?;
        Ok((upload.clone(), template.content.clone()))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.to_string(),
            created_at: self.created_at,
            template_name: self.template.as_ref().and_then(|t| t.name.clone()),
            template_loaded: self.template.is_some(),
            resume_filename: self.upload.as_ref().map(|u| u.filename.clone()),
            resume_size: self.upload.as_ref().map(ResumeUpload::size),
            has_result: self.last_run.is_some(),
            data_keys: self
                .last_run
                .as_ref()
                .map(|run| run.outcome.data.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 100;

/// Bounds on how long and how many sessions are kept in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for longer than this are dropped
    pub idle_ttl_minutes: i64,
    /// The least recently used session is dropped to make room past this
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionContext>>,
    idle_ttl: TimeDelta,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SessionLimits::default())
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl: TimeDelta::minutes(limits.idle_ttl_minutes.max(1)),
            max_sessions: limits.max_sessions.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionContext>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, SessionContext>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_active <= self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Drop every session idle since before `now - ttl`; returns how many went
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        self.prune(&mut sessions, now)
    }

    pub fn create(&self) -> SessionSummary {
        let session = SessionContext::new();
        let summary = session.summary();

        let mut sessions = self.lock();
        self.prune(&mut sessions, session.created_at);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.last_active)
                .map(|s| s.id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!("Session limit {} reached, dropped {}", self.max_sessions, oldest);
        }

        info!("Created session {}", session.id());
        sessions.insert(session.id(), session);
        summary
    }

    /// Run `f` against the session while holding the store lock.
    ///
    /// Idle sessions are evicted first; a hit marks the session as active.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut SessionContext) -> R,
    ) -> FormatterResult<R> {
        let key = parse_id(id)?;
        let now = Utc::now();
        let mut sessions = self.lock();
        self.prune(&mut sessions, now);

        let session = sessions
            .get_mut(&key)
            .ok_or_else(|| FormatterError::SessionNotFound(id.to_string()))?;
        session.last_active = now;
        Ok(f(session))
    }

    pub fn remove(&self, id: &str) -> FormatterResult<()> {
        let key = parse_id(id)?;
        match self.lock().remove(&key) {
            Some(mut session) => {
                session.clear();
                info!("Removed session {}", id);
                Ok(())
            }
            None => Err(FormatterError::SessionNotFound(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_id(id: &str) -> FormatterResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| FormatterError::SessionNotFound(id.to_string()))
}
