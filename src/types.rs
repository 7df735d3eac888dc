use crate::patient_age::display_age;
use crate::sanitize::strip_control;
use aliri_braid::braid;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A normalized (core) accession number, see [crate::normalize].
#[braid(serde)]
pub struct Accession;

/// DICOM PatientSex, restricted to the defined terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    Male,
    Female,
    Other,
    #[default]
    Unknown,
}

impl From<&str> for Sex {
    fn from(value: &str) -> Self {
        match value.trim() {
            "M" => Self::Male,
            "F" => Self::Female,
            "O" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

impl Sex {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
            Self::Unknown => "U",
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Demographics read from one study. `patient_name` is kept only for the
/// cross-check against the viewer and never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudyFields {
    pub accession: String,
    pub patient_name: String,
    pub sex: Sex,
    pub age: String,
    pub modality: String,
    pub study_description: String,
}

/// The document exposed to downstream consumers.
///
/// There is deliberately no patient name field: whatever is published can be
/// produced only from these five values. The default value is the empty document
/// `{}`, meaning "no study locked".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublishedState {
    #[serde(rename = "Acc", default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(rename = "Sex", default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(rename = "Age", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(rename = "Mod", default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(rename = "StudyDesc", default, skip_serializing_if = "Option::is_none")]
    pub study_description: Option<String>,
}

impl PublishedState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Age for display, e.g. `65Y` for a stored `065Y`.
    pub fn display_age(&self) -> Option<String> {
        self.age.as_deref().map(display_age)
    }

    /// Sex spelled out for display. Unrecognized codes are returned unchanged.
    pub fn display_sex(&self) -> Option<&str> {
        self.sex.as_deref().map(|sex| match sex {
            "M" => "Male",
            "F" => "Female",
            "O" => "Other",
            other => other,
        })
    }
}

impl From<&StudyFields> for PublishedState {
    fn from(fields: &StudyFields) -> Self {
        Self {
            accession: publishable(&fields.accession),
            sex: publishable(fields.sex.code()),
            age: publishable(&fields.age),
            modality: publishable(&fields.modality),
            study_description: publishable(&fields.study_description),
        }
    }
}

/// Strip control characters; values which end up empty are omitted.
fn publishable(value: &str) -> Option<String> {
    let clean = strip_control(value);
    if clean.is_empty() { None } else { Some(clean) }
}
