use common::{
    types::{Id, UserId},
    LogError,
};

use crate::{
    error::not_found,
    graph::{choice, key},
    Answer, ComplaintTarget, FieldDefinition, FieldType, NewBan, NewComplaint, NewService, Outcome,
    PriceTier, ProfileAttribute, Record, RecordStore, ServicePatch, ServiceStatus, Step, StoreError,
    UserPatch, Wizard, WizardError, WizardKind, WizardSession, NO_ANSWER_BAN_HOURS, NO_ANSWER_REASON,
};

fn incomplete(key: &'static str) -> impl FnOnce(&'static str) -> WizardError {
    move |_| WizardError::Incomplete(key.to_string())
}

impl<S: RecordStore> Wizard<S> {
    /// Write answers of a wizard at confirmation step into the store.
    ///
    /// On success the session is closed, or replaced by the wizard to
    /// return to. A missing record closes the session as well, other store
    /// failures keep it so the commit can be retried.
    pub async fn commit(&self, subject_id: UserId) -> Result<Outcome, WizardError> {
        let session = self.sessions.get(subject_id).ok_or(WizardError::NoActiveWizard)?;
        if session.current_step != Step::Confirm {
            return Err(WizardError::NotAtConfirmation);
        }

        let record = match self.persist(&session).await {
            Ok(record) => record,
            Err(e @ WizardError::NotFound(_)) => {
                self.sessions.remove(subject_id);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        log::info!("{subject_id} committed {:?}: {record:?}", session.kind);
        self.sessions.remove(subject_id);

        let next = match (&record, session.kind.parent()) {
            (Record::ServiceType(id), _) => Some(WizardKind::ManageServiceType { service_type_id: *id }),
            (_, parent) => parent,
        };
        let next = match next {
            Some(kind) => self
                .resume(subject_id, kind)
                .await
                .ok_or_log(format!("failed to resume {kind:?} for {subject_id}"))
                .flatten(),
            None => None,
        };
        Ok(Outcome::Committed { record, next })
    }

    async fn persist(&self, session: &WizardSession) -> Result<Record, WizardError> {
        let subject_id = session.subject_id;
        match session.kind {
            WizardKind::CreateServiceType => {
                let name = session.text(key::NAME)?;
                let price_tier =
                    PriceTier::try_from(session.int(key::PRICE_TIER)?).map_err(incomplete(key::PRICE_TIER))?;
                match self.store.create_service_type(name, price_tier, subject_id).await {
                    Ok(id) => Ok(Record::ServiceType(id)),
                    Err(StoreError::Conflict) => Err(WizardError::NameTaken),
                    Err(e) => Err(e.into()),
                }
            }
            WizardKind::AddField { service_type_id } => self.persist_field(session, service_type_id).await,
            WizardKind::PostService => self.persist_service(session).await,
            WizardKind::EditService { service_id } => {
                self.update_service(service_id, &service_patch(session)?).await?;
                Ok(Record::ServiceUpdated(service_id))
            }
            WizardKind::Complaint { target } => match session.text(key::REASON)? {
                choice::NO_ANSWER => {
                    let ban = NewBan {
                        target,
                        admin: None,
                        hours: NO_ANSWER_BAN_HOURS,
                        permanent: false,
                        reason: NO_ANSWER_REASON.to_string(),
                    };
                    self.apply_ban(ban).await
                }
                _ => {
                    let complaint = NewComplaint {
                        target,
                        creator: subject_id,
                        text: session.text(key::TEXT)?.to_string(),
                    };
                    let id = self.store.create_complaint(&complaint).await?;
                    Ok(Record::Complaint(id))
                }
            },
            WizardKind::IssueBan { complaint_id, target } => {
                self.persist_ban(session, complaint_id, target).await
            }
            WizardKind::EditProfile { attribute } => {
                let value = session.text(key::VALUE)?.to_string();
                let patch = match attribute {
                    ProfileAttribute::Phone => UserPatch::Phone(value),
                    ProfileAttribute::Name => UserPatch::Name(value),
                };
                if !self.store.update_user(subject_id, &patch).await? {
                    return Err(WizardError::NotFound("user"));
                }
                Ok(Record::Profile(patch))
            }
            WizardKind::ManageServiceType { .. } => Err(WizardError::NotAtConfirmation),
        }
    }

    async fn persist_field(&self, session: &WizardSession, service_type_id: Id) -> Result<Record, WizardError> {
        let field_type: FieldType = session.text(key::TYPE)?.parse().map_err(incomplete(key::TYPE))?;
        let options = match field_type {
            FieldType::Select => session
                .answers
                .get(key::OPTIONS)
                .and_then(Answer::as_list)
                .ok_or_else(|| WizardError::Incomplete(key::OPTIONS.to_string()))?
                .to_vec(),
            _ => vec![],
        };
        let field = FieldDefinition::builder()
            .name(session.text(key::NAME)?)
            .label(session.text(key::LABEL)?)
            .field_type(field_type)
            .maybe_description(session.optional_text(key::DESCRIPTION))
            .required(session.flag(key::REQUIRED)?)
            .options(options)
            .build();

        self.active_service_type(service_type_id).await?;
        // position is taken from the current count, concurrent commits may get the same one
        let existing = self.store.list_fields(service_type_id).await?;
        let order_position = existing.len() as i64 + 1;

        if !self.store.append_field(service_type_id, &field, order_position).await? {
            return Err(WizardError::NotFound("service type"));
        }
        Ok(Record::Field {
            service_type_id,
            order_position,
        })
    }

    async fn persist_service(&self, session: &WizardSession) -> Result<Record, WizardError> {
        let service_type_id = session.int(key::SERVICE_TYPE_ID)?;
        let service_type = self.active_service_type(service_type_id).await?;

        let custom_fields = session
            .fields
            .iter()
            .filter_map(|f| Some((f.name.clone(), session.answers.get(&f.name)?.clone())))
            .collect();
        let service = NewService {
            owner: session.subject_id,
            service_type_id,
            title: service_type.name,
            price: session.number(key::PRICE)?,
            city: session.text(key::CITY)?.to_string(),
            district: session.text(key::DISTRICT)?.to_string(),
            street: session.text(key::STREET)?.to_string(),
            house: session.optional_text(key::HOUSE).map(ToOwned::to_owned),
            number_phone: session.text(key::PHONE)?.to_string(),
            photo: session.text(key::PHOTO)?.to_string(),
            custom_fields,
        };
        let id = self.store.create_service(&service).await?;
        Ok(Record::Service(id))
    }

    async fn persist_ban(
        &self,
        session: &WizardSession,
        complaint_id: Id,
        target: ComplaintTarget,
    ) -> Result<Record, WizardError> {
        let action = session.text(key::ACTION)?;
        if action == choice::WARNING {
            if !self.store.delete_complaint(complaint_id).await? {
                return Err(WizardError::NotFound("complaint"));
            }
            return Ok(Record::Warning { complaint_id, target });
        }

        let permanent = action == choice::PERM_BAN;
        let hours = if permanent {
            0
        } else {
            u32::try_from(session.int(key::DURATION)?)
                .map_err(|_| WizardError::Incomplete(key::DURATION.to_string()))?
        };
        let ban = NewBan {
            target,
            admin: Some(session.subject_id),
            hours,
            permanent,
            reason: session.text(key::REASON)?.to_string(),
        };
        let record = self.apply_ban(ban).await?;

        if !self.store.delete_complaint(complaint_id).await? {
            log::warn!("complaint {complaint_id} was already closed");
        }
        Ok(record)
    }

    /// Write ban and hide the banned service
    async fn apply_ban(&self, ban: NewBan) -> Result<Record, WizardError> {
        let id = self.store.ban(&ban).await?;
        if let ComplaintTarget::Service(service_id) = ban.target {
            self.update_service(service_id, &ServicePatch::Status(ServiceStatus::Blocked))
                .await?;
        }
        Ok(Record::Ban { id, ban })
    }

    async fn update_service(&self, id: Id, patch: &ServicePatch) -> Result<(), WizardError> {
        let updated = self
            .store
            .update_service(id, patch)
            .await
            .map_err(not_found("service"))?;
        if updated {
            Ok(())
        } else {
            Err(WizardError::NotFound("service"))
        }
    }
}

fn service_patch(session: &WizardSession) -> Result<ServicePatch, WizardError> {
    let text = || session.text(key::VALUE).map(ToOwned::to_owned);
    let patch = match session.text(key::ATTRIBUTE)? {
        key::PRICE => ServicePatch::Price(session.number(key::VALUE)?),
        key::CITY => ServicePatch::City(text()?),
        key::DISTRICT => ServicePatch::District(text()?),
        key::STREET => ServicePatch::Street(text()?),
        key::HOUSE => ServicePatch::House(session.optional_text(key::VALUE).map(ToOwned::to_owned)),
        key::PHONE => ServicePatch::Phone(text()?),
        key::PHOTO => ServicePatch::Photo(text()?),
        name => ServicePatch::Custom {
            name: name.to_string(),
            value: session.answers.get(key::VALUE).cloned(),
        },
    };
    Ok(patch)
}
