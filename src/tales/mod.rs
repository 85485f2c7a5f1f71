use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

pub mod collection;
pub mod feed;
pub mod generator;
mod in_flight;

/// Opaque tale identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaleId(String);

impl TaleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl FromStr for TaleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("tale id cannot be empty".to_string());
        }
        Ok(Self::new(s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildAge {
    #[serde(rename = "3-4")]
    Preschool,
    #[default]
    #[serde(rename = "5-8")]
    EarlyElementary,
    #[serde(rename = "9-12")]
    UpperElementary,
}

impl ChildAge {
    pub const ALL: [ChildAge; 3] = [
        ChildAge::Preschool,
        ChildAge::EarlyElementary,
        ChildAge::UpperElementary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChildAge::Preschool => "3-4",
            ChildAge::EarlyElementary => "5-8",
            ChildAge::UpperElementary => "9-12",
        }
    }
}

impl fmt::Display for ChildAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years", self.as_str())
    }
}

impl FromStr for ChildAge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChildAge::ALL
            .into_iter()
            .find(|age| age.as_str() == s)
            .ok_or_else(|| format!("unknown age range {s:?}, expected 3-4, 5-8 or 9-12"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Adventurous,
    Educational,
    Calming,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Adventurous, Mood::Educational, Mood::Calming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Adventurous => "adventurous",
            Mood::Educational => "educational",
            Mood::Calming => "calming",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| format!("unknown mood {s:?}"))
    }
}

/// The `author` field is a populated profile on most endpoints and a bare
/// user id on others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Profile {
        #[serde(default)]
        name: Option<String>,
    },
    Reference(String),
}

impl Author {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Author::Profile { name: Some(name) } if !name.trim().is_empty() => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tale {
    #[serde(rename = "_id", alias = "id")]
    pub id: TaleId,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub child_age: ChildAge,
    pub mood: Mood,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
}

impl Tale {
    pub fn paragraphs(&self) -> Vec<&str> {
        paragraphs(&self.content)
    }

    pub fn excerpt(&self, max_chars: usize) -> String {
        excerpt(&self.content, max_chars)
    }

    pub fn byline(&self) -> String {
        let name = self
            .author
            .as_ref()
            .and_then(Author::display_name)
            .unwrap_or("Anonymous");
        format!("By {name}")
    }

    pub fn created_on(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

/// Splits story text on blank lines.
pub fn paragraphs(content: &str) -> Vec<&str> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// First `max_chars` characters followed by `...`.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let mut preview: String = content.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Please enter a topic".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[validate(required(message = "Please select an age range"))]
    pub child_age: Option<ChildAge>,
    #[validate(custom(function = "validate_not_blank"))]
    pub topic: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub is_public: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            child_age: Some(ChildAge::default()),
            topic: String::new(),
            setting: String::new(),
            characters: String::new(),
            mood: Mood::default(),
            is_public: false,
        }
    }
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }
}

/// Body of a successful `POST /api/tales/generate`. Fields the client does
/// not model are kept so they travel back with the save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTale {
    pub title: String,
    pub content: String,
    pub topic: String,
    pub child_age: ChildAge,
    pub mood: Mood,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An unsaved tale held between generation and an explicit save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub topic: String,
    pub child_age: ChildAge,
    pub mood: Mood,
    pub is_public: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Draft {
    pub fn from_generated(generated: GeneratedTale, is_public: bool) -> Self {
        let GeneratedTale {
            title,
            content,
            topic,
            child_age,
            mood,
            mut extra,
        } = generated;
        extra.remove("isPublic");

        Self {
            title,
            content,
            topic,
            child_age,
            mood,
            is_public,
            extra,
        }
    }

    pub fn paragraphs(&self) -> Vec<&str> {
        paragraphs(&self.content)
    }
}
