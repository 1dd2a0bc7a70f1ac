use std::time::Duration;

use common::types::{Id, UserId};

use crate::{
    error::not_found,
    graph::{self, choice, key},
    prompt::{self, Choice},
    rule::{self, Accepted},
    validation::validate_service_type_name,
    Answer, Answers, CapacityError, ComplaintTarget, Event, EventKind, Navigation, Policy, Prompt,
    Record, RecordStore, Refusal, ServiceType, SessionStore, Step, StoreError, ValidationError,
    WizardError, WizardKind, WizardSession,
};

type Checked = Result<Result<Accepted, ValidationError>, WizardError>;

/// Result of one turn of a conversation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Ask the next question
    Prompt(Prompt),
    /// Input didn't pass validation, the same step is asked again
    Rejected { error: ValidationError, prompt: Prompt },
    /// Wizard was not started
    Refused(Refusal),
    Committed {
        record: Record,
        /// Prompt of the wizard resumed after commit
        next: Option<Prompt>,
    },
    Cancelled {
        /// Prompt of the parent wizard, if any
        resumed: Option<Prompt>,
    },
    /// Management hub closed
    Finished,
    /// Wizard dropped, user asked for main menu
    Menu,
}

/// Runs wizards of all users against one record store
pub struct Wizard<S> {
    pub(crate) store: S,
    pub(crate) sessions: SessionStore,
    pub(crate) policy: Policy,
}

impl<S: RecordStore> Wizard<S> {
    pub fn new(store: S, policy: Policy, session_ttl: Option<Duration>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(session_ttl),
            policy,
        }
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub async fn start_wizard(&self, kind: WizardKind, subject_id: UserId) -> Result<Outcome, WizardError> {
        let result = self.begin(subject_id, kind, Answers::new()).await;
        if let Err(e) = &result {
            log::error!("failed to start {kind:?} for {subject_id}: {e}");
            self.drop_if_missing(subject_id, e);
        }
        result
    }

    pub async fn handle_reply(&self, event: Event) -> Result<Outcome, WizardError> {
        let subject_id = event.subject_id;
        let result = self.accept_input(event).await;
        match &result {
            Err(WizardError::NoActiveWizard) | Ok(_) => {}
            Err(e) => {
                log::error!("wizard of {subject_id} failed: {e}");
                self.drop_if_missing(subject_id, e);
            }
        }
        result
    }

    /// A wizard can't go on once its record is gone
    fn drop_if_missing(&self, subject_id: UserId, e: &WizardError) {
        if matches!(e, WizardError::NotFound(_)) && self.sessions.remove(subject_id).is_some() {
            log::debug!("dropped wizard of {subject_id}: {e}");
        }
    }

    /// Start a wizard, replacing any active one of the subject
    pub async fn begin(&self, subject_id: UserId, kind: WizardKind, seed: Answers) -> Result<Outcome, WizardError> {
        let session = match self.open(subject_id, kind, seed).await? {
            Ok(session) => session,
            Err(refusal) => {
                log::debug!("{kind:?} refused for {subject_id}: {refusal}");
                return Ok(Outcome::Refused(refusal));
            }
        };
        log::debug!("{subject_id} began {kind:?}");

        let prompt = self.prompt_for(&session).await?;
        self.sessions.put(session);
        Ok(Outcome::Prompt(prompt))
    }

    pub async fn accept_input(&self, event: Event) -> Result<Outcome, WizardError> {
        let subject_id = event.subject_id;
        let mut session = self.sessions.get(subject_id).ok_or(WizardError::NoActiveWizard)?;

        if let Some(nav) = Navigation::parse(&event) {
            return self.navigate(session, nav).await;
        }
        match session.current_step {
            Step::Management => return self.manage(session, &event).await,
            Step::Confirm => return self.confirm(session, &event).await,
            _ => {}
        }

        let step = session.current_step;
        let accepted = match self.check(&session, &event).await? {
            Ok(accepted) => accepted,
            Err(error) => return self.reject(&session, error).await,
        };
        let key = step
            .key(&session)
            .ok_or_else(|| WizardError::Incomplete(format!("{step:?}")))?
            .to_string();
        match accepted {
            Accepted::Value(value) => {
                session.answers.insert(key, value);
            }
            Accepted::Skip => {
                session.answers.remove(&key);
            }
        }
        if step == Step::ServiceType {
            let service_type_id = session.int(key::SERVICE_TYPE_ID)?;
            session.fields = self.store.list_fields(service_type_id).await?;
        }

        session.history.push(step);
        session.current_step = graph::next(&session, step);
        log::debug!(
            "{subject_id} {:?}: {step:?} -> {:?}",
            session.kind,
            session.current_step
        );

        let prompt = self.prompt_for(&session).await?;
        self.sessions.put(session);
        Ok(Outcome::Prompt(prompt))
    }

    /// Return to the previous step, answer of the current one is kept.
    /// Without history the wizard is cancelled
    pub async fn go_back(&self, subject_id: UserId) -> Result<Outcome, WizardError> {
        let mut session = self.sessions.get(subject_id).ok_or(WizardError::NoActiveWizard)?;
        match session.history.pop() {
            Some(step) => {
                session.current_step = step;
                let prompt = self.prompt_for(&session).await?;
                self.sessions.put(session);
                Ok(Outcome::Prompt(prompt))
            }
            None => self.discard(subject_id, session.kind).await,
        }
    }

    /// Drop the session if any
    pub fn cancel(&self, subject_id: UserId) -> Outcome {
        if self.sessions.remove(subject_id).is_some() {
            log::debug!("{subject_id} cancelled wizard");
        }
        Outcome::Cancelled { resumed: None }
    }

    pub async fn prompt(&self, subject_id: UserId) -> Result<Prompt, WizardError> {
        let session = self.sessions.get(subject_id).ok_or(WizardError::NoActiveWizard)?;
        self.prompt_for(&session).await
    }

    pub(crate) async fn prompt_for(&self, session: &WizardSession) -> Result<Prompt, WizardError> {
        let choices = match session.current_step {
            Step::ServiceType => self
                .store
                .list_service_types()
                .await?
                .iter()
                .map(Choice::service_type)
                .collect(),
            _ => prompt::choices(session, &self.policy),
        };
        Ok(Prompt::new(session, &self.policy, choices))
    }

    /// Prepare a new session, or explain why it can't be started
    async fn open(
        &self,
        subject_id: UserId,
        kind: WizardKind,
        seed: Answers,
    ) -> Result<Result<WizardSession, Refusal>, WizardError> {
        let mut session = WizardSession::new(subject_id, kind, seed);

        let refusal: Option<Refusal> = match kind {
            WizardKind::CreateServiceType | WizardKind::EditProfile { .. } => None,
            WizardKind::ManageServiceType { service_type_id } => {
                let service_type = self.active_service_type(service_type_id).await?;
                session
                    .answers
                    .insert(key::NAME.to_string(), service_type.name.into());
                session.answers.insert(
                    key::PRICE_TIER.to_string(),
                    Answer::Int(i64::from(service_type.price_tier)),
                );
                session.fields = self.store.list_fields(service_type_id).await?;
                None
            }
            WizardKind::AddField { service_type_id } => {
                self.active_service_type(service_type_id).await?;
                session.fields = self.store.list_fields(service_type_id).await?;

                let max = self.policy.max_fields_per_type;
                (session.fields.len() >= max).then(|| CapacityError::FieldLimit { max }.into())
            }
            WizardKind::PostService => {
                if self.is_banned(ComplaintTarget::User(subject_id)).await? {
                    Some(ValidationError::Banned.into())
                } else if self.store.list_service_types().await?.is_empty() {
                    Some(ValidationError::NoServiceTypes.into())
                } else {
                    None
                }
            }
            WizardKind::EditService { service_id } => {
                let service = self.store.service(service_id).await.map_err(not_found("service"))?;
                if service.owner != subject_id {
                    Some(ValidationError::NotOwner.into())
                } else {
                    session.fields = self.store.list_fields(service.service_type_id).await?;
                    None
                }
            }
            WizardKind::Complaint { target } => {
                let owner = match target {
                    ComplaintTarget::User(user) => user,
                    ComplaintTarget::Service(id) => {
                        self.store.service(id).await.map_err(not_found("service"))?.owner
                    }
                };
                if owner == subject_id {
                    Some(ValidationError::SelfComplaint.into())
                } else if self.is_banned(target).await? {
                    Some(ValidationError::AlreadyBanned.into())
                } else {
                    None
                }
            }
            WizardKind::IssueBan { target, .. } => self
                .is_banned(target)
                .await?
                .then(|| ValidationError::AlreadyBanned.into()),
        };

        Ok(match refusal {
            Some(refusal) => Err(refusal),
            None => Ok(session),
        })
    }

    /// Deactivated service types are treated as missing
    pub(crate) async fn active_service_type(&self, id: Id) -> Result<ServiceType, WizardError> {
        let service_type = self.store.service_type(id).await.map_err(not_found("service type"))?;
        if !service_type.is_active {
            return Err(WizardError::NotFound("service type"));
        }
        Ok(service_type)
    }

    async fn is_banned(&self, target: ComplaintTarget) -> Result<bool, WizardError> {
        Ok(self.store.active_ban(target).await?.is_some())
    }

    /// Open a wizard after another one ended. Refusal ends the conversation
    pub(crate) async fn resume(&self, subject_id: UserId, kind: WizardKind) -> Result<Option<Prompt>, WizardError> {
        match self.open(subject_id, kind, Answers::new()).await? {
            Ok(session) => {
                let prompt = self.prompt_for(&session).await?;
                self.sessions.put(session);
                Ok(Some(prompt))
            }
            Err(refusal) => {
                log::debug!("not resuming {kind:?} for {subject_id}: {refusal}");
                Ok(None)
            }
        }
    }

    /// End the wizard without commit and return to its parent
    async fn discard(&self, subject_id: UserId, kind: WizardKind) -> Result<Outcome, WizardError> {
        self.sessions.remove(subject_id);
        let resumed = match kind.parent() {
            Some(parent) => self.resume(subject_id, parent).await?,
            None => None,
        };
        Ok(Outcome::Cancelled { resumed })
    }

    async fn reject(&self, session: &WizardSession, error: ValidationError) -> Result<Outcome, WizardError> {
        log::debug!(
            "{} rejected at {:?}: {error}",
            session.subject_id,
            session.current_step
        );
        Ok(Outcome::Rejected {
            error,
            prompt: self.prompt_for(session).await?,
        })
    }

    async fn navigate(&self, session: WizardSession, nav: Navigation) -> Result<Outcome, WizardError> {
        let subject_id = session.subject_id;
        match nav {
            Navigation::Back => self.go_back(subject_id).await,
            Navigation::Cancel => Ok(self.cancel(subject_id)),
            Navigation::Menu => {
                self.sessions.remove(subject_id);
                Ok(Outcome::Menu)
            }
            Navigation::Finish => match session.current_step {
                Step::Management | Step::Confirm => {
                    self.sessions.remove(subject_id);
                    log::debug!("{subject_id} finished {:?}", session.kind);
                    Ok(Outcome::Finished)
                }
                _ => self.reject(&session, ValidationError::FinishUnavailable).await,
            },
        }
    }

    async fn manage(&self, mut session: WizardSession, event: &Event) -> Result<Outcome, WizardError> {
        let WizardKind::ManageServiceType { service_type_id } = session.kind else {
            return self.reject(&session, ValidationError::UnknownChoice).await;
        };
        if event.kind == EventKind::Media {
            return self.reject(&session, ValidationError::UnknownChoice).await;
        }

        match event.payload.trim() {
            choice::ADD_FIELD => {
                self.begin(
                    session.subject_id,
                    WizardKind::AddField { service_type_id },
                    Answers::new(),
                )
                .await
            }
            choice::DELETE_LAST => {
                if !self.store.remove_last_field(service_type_id).await? {
                    log::debug!("service type {service_type_id} has no fields to delete");
                }
                session.fields = self.store.list_fields(service_type_id).await?;
                let prompt = self.prompt_for(&session).await?;
                self.sessions.put(session);
                Ok(Outcome::Prompt(prompt))
            }
            _ => self.reject(&session, ValidationError::UnknownChoice).await,
        }
    }

    async fn confirm(&self, session: WizardSession, event: &Event) -> Result<Outcome, WizardError> {
        let answer = match rule::choose(&prompt::choices(&session, &self.policy), event) {
            Ok(answer) => answer,
            Err(error) => return self.reject(&session, error).await,
        };
        match answer.as_str() {
            Some(choice::CONFIRM) => self.commit(session.subject_id).await,
            Some(choice::DISCARD) => self.discard(session.subject_id, session.kind).await,
            _ => self.reject(&session, ValidationError::UnknownChoice).await,
        }
    }

    async fn check(&self, session: &WizardSession, event: &Event) -> Checked {
        match session.current_step {
            Step::TypeName => self.check_type_name(event).await,
            Step::ServiceType => self.check_service_type(event).await,
            _ => Ok(rule::check(session, event, &self.policy)),
        }
    }

    async fn check_type_name(&self, event: &Event) -> Checked {
        let name = match event
            .as_text()
            .ok_or(ValidationError::ExpectedText)
            .and_then(validate_service_type_name)
        {
            Ok(name) => name,
            Err(e) => return Ok(Err(e)),
        };
        match self.store.service_type_by_name(&name).await {
            Ok(_) => Ok(Err(ValidationError::ServiceTypeNameTaken)),
            Err(StoreError::NotFound) => Ok(Ok(name.into())),
            Err(e) => Err(e.into()),
        }
    }

    /// Service type is chosen by button, or typed by name
    async fn check_service_type(&self, event: &Event) -> Checked {
        let found = match event.kind {
            EventKind::Button => match event.payload.parse::<Id>() {
                Ok(id) => self.store.service_type(id).await,
                Err(_) => Err(StoreError::NotFound),
            },
            EventKind::Text => self.store.service_type_by_name(event.payload.trim()).await,
            EventKind::Media => Err(StoreError::NotFound),
        };
        match found {
            Ok(service_type) if service_type.is_active => Ok(Ok(Answer::Int(service_type.id).into())),
            Ok(_) | Err(StoreError::NotFound) => Ok(Err(ValidationError::UnknownServiceType)),
            Err(e) => Err(e.into()),
        }
    }
}
