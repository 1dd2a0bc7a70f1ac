//! Conversation wizards: per-user step machines collecting answers across
//! chat turns and committing them into the record store at confirmation.

mod commit;
mod engine;
mod error;
mod event;
mod field;
mod graph;
mod navigation;
mod policy;
mod prompt;
mod record;
mod rule;
mod session;
mod store;
pub mod validation;


pub use engine::{Outcome, Wizard};
pub use error::{CapacityError, Refusal, StoreError, ValidationError, WizardError};
pub use event::{Event, EventKind};
pub use field::{FieldDefinition, FieldType, PriceTier, ServiceType};
pub use graph::{choice, key, Step, WizardKind};
pub use navigation::Navigation;
pub use policy::*;
pub use prompt::{attribute_caption, Choice, Prompt};
pub use record::*;
pub use session::{Answer, Answers, SessionStore, WizardSession};
pub use store::{RecordStore, StoreResult};
