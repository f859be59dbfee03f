use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{GenerationError, Result};

/// Who is the protagonist of the thumbnail. Every subject has its own
/// fine-tuned model on the provider side.
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumString,
    EnumIter,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    WillyrexAvatar,
    MarcurgellAvatar,
}

impl Subject {
    pub fn parse(id: &str) -> Result<Self> {
        Subject::from_str(id).map_err(|_| GenerationError::UnknownSubject(id.to_string()))
    }

    fn default_model(&self) -> &'static str {
        match self {
            Subject::WillyrexAvatar => {
                "ericrisco-at/willyrex:cf3f35c9fc7c495596ff94b6a1e0b8ec263b46c9be0610d33088d65a5dbc3471"
            }
            Subject::MarcurgellAvatar => {
                "ericrisco-at/marcurgell:d31340ddc9a3b242d7835de9db42b0fabdac8421e1d4187c2b804c0672b06580"
            }
        }
    }
}

/// A provider model reference of the form `owner/name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl FromStr for ModelRef {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GenerationError::InvalidInput(format!("Invalid model reference: {s}"));
        let (path, version) = s.split_once(':').ok_or_else(invalid)?;
        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || version.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.into(),
            name: name.into(),
            version: version.into(),
        })
    }
}

impl TryFrom<String> for ModelRef {
    type Error = GenerationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModelRef> for String {
    fn from(value: ModelRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.name, self.version)
    }
}

/// Maps subjects to the model that renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: BTreeMap<Subject, ModelRef>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let models = Subject::iter()
            .map(|s| {
                let model = s
                    .default_model()
                    .parse()
                    .expect("built-in model references are well formed");
                (s, model)
            })
            .collect();
        Self { models }
    }
}

impl ModelCatalog {
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// Built-in table with `overrides` replacing individual entries.
    pub fn with_overrides(overrides: &BTreeMap<Subject, ModelRef>) -> Self {
        let mut catalog = Self::default();
        for (subject, model) in overrides {
            catalog.insert(*subject, model.clone());
        }
        catalog
    }

    pub fn insert(&mut self, subject: Subject, model: ModelRef) {
        self.models.insert(subject, model);
    }

    pub fn get(&self, subject: Subject) -> Option<&ModelRef> {
        self.models.get(&subject)
    }

    /// Resolves a textual subject id. Anything that is not in the table is
    /// an `UnknownSubject`.
    pub fn resolve(&self, subject_id: &str) -> Result<(Subject, &ModelRef)> {
        let subject = Subject::parse(subject_id.trim())?;
        let model = self
            .get(subject)
            .ok_or_else(|| GenerationError::UnknownSubject(subject_id.to_string()))?;
        Ok((subject, model))
    }

    pub fn subjects(&self) -> impl Iterator<Item = (Subject, &ModelRef)> {
        self.models.iter().map(|(s, m)| (*s, m))
    }
}
