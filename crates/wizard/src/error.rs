/// User-correctable rejection. The step is retried, session is untouched
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("❌ Value can't be empty")]
    Empty,
    #[error("❌ This field name is reserved")]
    Reserved,
    #[error("❌ Must be at most {max} characters")]
    TooLong { max: usize },
    #[error("❌ Must be at least {min} characters")]
    TooShort { min: usize },
    #[error("❌ Field name must start with a latin letter and contain only lowercase latin letters, digits and _")]
    FieldNameCharset,
    #[error("❌ Field with this name already exists")]
    DuplicateFieldName,
    #[error("❌ Service type with this name already exists")]
    ServiceTypeNameTaken,
    #[error("❌ Enter from {min} to {max} options separated by commas")]
    OptionCount { min: usize, max: usize },
    #[error("❌ Phone number must be +7 followed by 10 digits")]
    Phone,
    #[error("❌ Price must be a non-negative number")]
    Price,
    #[error("❌ Enter a number")]
    Number,
    #[error("❌ Enter date as dd.mm.yyyy")]
    Date,
    #[error("❌ Send a photo")]
    ExpectedMedia,
    #[error("❌ Send a text message")]
    ExpectedText,
    #[error("❌ Choose one of the options")]
    UnknownChoice,
    #[error("❌ This field is required")]
    Required,
    #[error("❌ Finish is only available at confirmation")]
    FinishUnavailable,
    #[error("❌ Service type not found")]
    UnknownServiceType,
    #[error("❌ There are no service types yet")]
    NoServiceTypes,
    #[error("❌ You can't complain about yourself")]
    SelfComplaint,
    #[error("❌ Already banned")]
    AlreadyBanned,
    #[error("❌ You are banned")]
    Banned,
    #[error("❌ It's not your service")]
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("❌ Maximum number of fields reached ({max})")]
    FieldLimit { max: usize },
}

/// Reason why a wizard was not started
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Refusal {
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Failure of the record store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated")]
    Conflict,
    #[error("store failure: {0}")]
    Backend(String),
}

/// Unexpected fault, shown to user as a generic message
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("no active wizard")]
    NoActiveWizard,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("service type name already taken")]
    NameTaken,
    #[error("answer for {0} is missing")]
    Incomplete(String),
    #[error("wizard is not at confirmation step")]
    NotAtConfirmation,
    /// Session is kept, the commit may be retried
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Map missing record to [`WizardError::NotFound`]
pub(crate) fn not_found(what: &'static str) -> impl FnOnce(StoreError) -> WizardError {
    move |e| match e {
        StoreError::NotFound => WizardError::NotFound(what),
        e => WizardError::Persistence(e),
    }
}
