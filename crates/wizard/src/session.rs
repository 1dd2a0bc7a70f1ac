use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Display,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use common::types::UserId;

use crate::{graph::key, FieldDefinition, Step, WizardError, WizardKind};

/// Provisional value of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Flag(bool),
    Int(i64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Answer {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(true) => "yes".fmt(f),
            Self::Flag(false) => "no".fmt(f),
            Self::Int(n) => n.fmt(f),
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => s.fmt(f),
            Self::List(l) => l.join(", ").fmt(f),
        }
    }
}

pub type Answers = BTreeMap<String, Answer>;

/// In-progress conversation of one user
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub subject_id: UserId,
    pub kind: WizardKind,
    pub current_step: Step,
    pub answers: Answers,
    /// Visited steps, most recent last
    pub history: Vec<Step>,
    /// Fields the wizard works against: custom fields of the chosen service
    /// type, or existing fields of the edited type
    pub fields: Vec<FieldDefinition>,
    /// Keys provided when the wizard began
    pub seeded: BTreeSet<String>,
    touched_at: Instant,
}

impl WizardSession {
    pub fn new(subject_id: UserId, kind: WizardKind, seed: Answers) -> Self {
        Self {
            subject_id,
            kind,
            current_step: kind.entry(),
            seeded: seed.keys().cloned().collect(),
            answers: seed,
            history: vec![],
            fields: vec![],
            touched_at: Instant::now(),
        }
    }
    /// Custom field asked at the current step
    pub fn current_field(&self) -> Option<&FieldDefinition> {
        match self.current_step {
            Step::Custom(i) => self.fields.get(i),
            Step::EditValue => {
                let name = self.answers.get(key::ATTRIBUTE)?.as_str()?;
                self.fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    fn answer(&self, key: &str) -> Result<&Answer, WizardError> {
        self.answers
            .get(key)
            .ok_or_else(|| WizardError::Incomplete(key.to_string()))
    }
    pub(crate) fn text(&self, key: &str) -> Result<&str, WizardError> {
        self.answer(key)?
            .as_str()
            .ok_or_else(|| WizardError::Incomplete(key.to_string()))
    }
    pub(crate) fn int(&self, key: &str) -> Result<i64, WizardError> {
        self.answer(key)?
            .as_int()
            .ok_or_else(|| WizardError::Incomplete(key.to_string()))
    }
    pub(crate) fn number(&self, key: &str) -> Result<f64, WizardError> {
        self.answer(key)?
            .as_f64()
            .ok_or_else(|| WizardError::Incomplete(key.to_string()))
    }
    pub(crate) fn flag(&self, key: &str) -> Result<bool, WizardError> {
        self.answer(key)?
            .as_bool()
            .ok_or_else(|| WizardError::Incomplete(key.to_string()))
    }
    pub(crate) fn optional_text(&self, key: &str) -> Option<&str> {
        self.answers.get(key).and_then(Answer::as_str)
    }
}

/// Active sessions keyed by subject. The lock is never held across await,
/// callers work on a copy and put it back
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, WizardSession>>,
    /// `None` keeps idle sessions forever
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::default(),
            ttl,
        }
    }
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, WizardSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn is_expired(&self, session: &WizardSession) -> bool {
        self.ttl.is_some_and(|ttl| session.touched_at.elapsed() >= ttl)
    }
    pub fn get(&self, subject_id: UserId) -> Option<WizardSession> {
        let mut sessions = self.lock();
        let session = sessions.get(&subject_id)?;
        if self.is_expired(session) {
            log::debug!("session of {subject_id} expired");
            sessions.remove(&subject_id);
            return None;
        }
        Some(session.clone())
    }
    /// Replace session of the subject
    pub fn put(&self, mut session: WizardSession) {
        session.touched_at = Instant::now();
        self.lock().insert(session.subject_id, session);
    }
    pub fn remove(&self, subject_id: UserId) -> Option<WizardSession> {
        self.lock().remove(&subject_id)
    }
    pub fn is_active(&self, subject_id: UserId) -> bool {
        self.get(subject_id).is_some()
    }
    /// Drop idle sessions, returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session));
        before - sessions.len()
    }
    pub fn len(&self) -> usize {
        self.lock().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
