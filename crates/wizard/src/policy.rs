use std::collections::BTreeSet;

/// Service type name length bounds
pub const SERVICE_TYPE_NAME_LEN: (usize, usize) = (3, 100);
/// Profile name length bounds
pub const PERSON_NAME_LEN: (usize, usize) = (2, 50);
pub const COMPLAINT_TEXT_MIN_LEN: usize = 10;
pub const MAX_TEXT_LEN: usize = 500;
/// Temporary ban durations offered to admins, in hours
pub const BAN_DURATIONS: [u32; 3] = [1, 24, 72];
/// Ban issued automatically for "does not answer calls" complaint
pub const NO_ANSWER_BAN_HOURS: u32 = 2;
pub const NO_ANSWER_REASON: &str = "Does not answer calls";

/// Reserved for base attributes of a service
pub const DEFAULT_RESERVED_NAMES: [&str; 9] = [
    "title",
    "photo",
    "address",
    "price",
    "district",
    "number_phone",
    "city",
    "house",
    "street",
];

/// Limits which differ between wizard variants, pinned here instead of in
/// each handler
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct Policy {
    #[builder(default = DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect())]
    pub reserved_names: BTreeSet<String>,
    #[builder(default = 50)]
    pub max_field_name_len: usize,
    #[builder(default)]
    pub min_label_len: usize,
    #[builder(default = 100)]
    pub max_label_len: usize,
    /// Zero means description may be empty
    #[builder(default)]
    pub min_description_len: usize,
    #[builder(default = 500)]
    pub max_description_len: usize,
    #[builder(default = 2)]
    pub min_select_options: usize,
    #[builder(default = 20)]
    pub max_select_options: usize,
    #[builder(default = 15)]
    pub max_fields_per_type: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self::builder().build()
    }
}
