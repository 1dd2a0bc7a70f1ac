use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use common::types::{Id, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Date,
    Image,
}

impl FieldType {
    pub const ALL: [Self; 5] = [Self::Text, Self::Number, Self::Select, Self::Date, Self::Image];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Date => "date",
            Self::Image => "image",
        }
    }
    /// Caption for users
    pub fn caption(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Select => "Choice from list",
            Self::Date => "Date",
            Self::Image => "Image",
        }
    }
}

impl FromStr for FieldType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or("unknown field type")
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Schema of one custom field of a service type
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct FieldDefinition {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub label: String,
    pub field_type: FieldType,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(default)]
    pub required: bool,
    /// Only for [`FieldType::Select`]
    #[builder(default)]
    pub options: Vec<String>,
}

/// Price band of a service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PriceTier {
    #[default]
    Thousands = 0,
    TensOfThousands = 1,
}

impl PriceTier {
    pub const ALL: [Self; 2] = [Self::Thousands, Self::TensOfThousands];

    pub fn caption(self) -> &'static str {
        match self {
            Self::Thousands => "Thousands of rubles",
            Self::TensOfThousands => "Tens of thousands of rubles",
        }
    }
}

impl TryFrom<i64> for PriceTier {
    type Error = &'static str;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Thousands),
            1 => Ok(Self::TensOfThousands),
            _ => Err("unknown price tier"),
        }
    }
}

impl From<PriceTier> for i64 {
    fn from(value: PriceTier) -> Self {
        value as u8 as i64
    }
}

/// Category of listings with its own set of custom fields
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceType {
    pub id: Id,
    pub name: String,
    pub created_by: UserId,
    pub price_tier: PriceTier,
    pub is_active: bool,
}
