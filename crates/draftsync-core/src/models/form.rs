//! Campaign form payload with uniform field access.
//!
//! `FormField`/`FieldValue` give the sync coordinator and the conflict policy
//! table a single, type-checked way to read and write any field without
//! per-field branching.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The flat business payload of one campaign draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignFormData {
    pub title: String,
    pub description: String,
    pub bitcoin_address: String,
    pub lightning_address: String,
    pub website_url: String,
    /// Funding goal in satoshis
    pub goal_amount: u64,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
}

/// Names of the form fields, used for uniform access and conflict tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Title,
    Description,
    BitcoinAddress,
    LightningAddress,
    WebsiteUrl,
    GoalAmount,
    Categories,
    Images,
    Tags,
}

impl FormField {
    /// Every field, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Title,
        Self::Description,
        Self::BitcoinAddress,
        Self::LightningAddress,
        Self::WebsiteUrl,
        Self::GoalAmount,
        Self::Categories,
        Self::Images,
        Self::Tags,
    ];

    /// Fields compared during conflict detection.
    ///
    /// Media references are excluded: they merge trivially by upsert and a
    /// byte-wise comparison of attachment lists would only produce noise.
    pub const TRACKED: [Self; 8] = [
        Self::Title,
        Self::Description,
        Self::BitcoinAddress,
        Self::LightningAddress,
        Self::WebsiteUrl,
        Self::GoalAmount,
        Self::Categories,
        Self::Tags,
    ];

    /// Snake-case name as it appears on the wire and in event payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::BitcoinAddress => "bitcoin_address",
            Self::LightningAddress => "lightning_address",
            Self::WebsiteUrl => "website_url",
            Self::GoalAmount => "goal_amount",
            Self::Categories => "categories",
            Self::Images => "images",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown form field: {s}")))
    }
}

/// A dynamically-typed field value, structurally comparable across copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Amount(u64),
    List(Vec<String>),
}

impl FieldValue {
    /// Character length of a text value, zero for other variants
    pub fn text_len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Amount(_) | Self::List(_) => 0,
        }
    }

    /// Whether the value counts as "filled in" for completion tracking
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.trim().is_empty(),
            Self::Amount(amount) => *amount > 0,
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Parse raw user input into the value shape `field` expects.
    ///
    /// List fields split on commas; amounts parse as whole satoshis.
    pub fn parse_for(field: FormField, raw: &str) -> Result<Self> {
        match field {
            FormField::GoalAmount => raw
                .trim()
                .parse::<u64>()
                .map(Self::Amount)
                .map_err(|_| Error::InvalidInput(format!("invalid amount: {raw}"))),
            FormField::Categories | FormField::Images | FormField::Tags => Ok(Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            )),
            _ => Ok(Self::Text(raw.to_string())),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Amount(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl CampaignFormData {
    /// Read one field as a [`FieldValue`]
    pub fn get(&self, field: FormField) -> FieldValue {
        match field {
            FormField::Title => FieldValue::Text(self.title.clone()),
            FormField::Description => FieldValue::Text(self.description.clone()),
            FormField::BitcoinAddress => FieldValue::Text(self.bitcoin_address.clone()),
            FormField::LightningAddress => FieldValue::Text(self.lightning_address.clone()),
            FormField::WebsiteUrl => FieldValue::Text(self.website_url.clone()),
            FormField::GoalAmount => FieldValue::Amount(self.goal_amount),
            FormField::Categories => FieldValue::List(self.categories.clone()),
            FormField::Images => FieldValue::List(self.images.clone()),
            FormField::Tags => FieldValue::List(self.tags.clone()),
        }
    }

    /// Write one field, rejecting values of the wrong shape
    pub fn set(&mut self, field: FormField, value: FieldValue) -> Result<()> {
        match (field, value) {
            (FormField::Title, FieldValue::Text(text)) => self.title = text,
            (FormField::Description, FieldValue::Text(text)) => self.description = text,
            (FormField::BitcoinAddress, FieldValue::Text(text)) => self.bitcoin_address = text,
            (FormField::LightningAddress, FieldValue::Text(text)) => self.lightning_address = text,
            (FormField::WebsiteUrl, FieldValue::Text(text)) => self.website_url = text,
            (FormField::GoalAmount, FieldValue::Amount(amount)) => self.goal_amount = amount,
            (FormField::Categories, FieldValue::List(items)) => self.categories = items,
            (FormField::Images, FieldValue::List(items)) => self.images = items,
            (FormField::Tags, FieldValue::List(items)) => self.tags = items,
            (field, value) => {
                return Err(Error::InvalidInput(format!(
                    "field {field} cannot hold {value:?}"
                )))
            }
        }
        Ok(())
    }
}
