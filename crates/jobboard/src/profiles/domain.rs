use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::PrincipalId;

/// Identifier wrapper for job-seeker profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job seeker's profile. Exactly one per principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerProfile {
    pub id: ProfileId,
    pub owner: PrincipalId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound profile payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ProfileDraft {
    pub fn validate(self) -> Result<ValidatedProfileDraft, ProfileValidationError> {
        let first_name = self
            .first_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ProfileValidationError::MissingField("firstName"))?;
        let last_name = self
            .last_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ProfileValidationError::MissingField("lastName"))?;

        Ok(ValidatedProfileDraft {
            first_name,
            last_name,
            phone: self.phone.unwrap_or_default(),
            skills: self.skills,
            experience: self.experience.unwrap_or_default(),
            education: self.education.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
}

/// Partial update. `owner` is not patchable; unknown fields are rejected at
/// the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut JobSeekerProfile, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            profile.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            profile.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            profile.phone = phone;
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(experience) = self.experience {
            profile.experience = experience;
        }
        if let Some(education) = self.education {
            profile.education = education;
        }
        profile.updated_at = now;
    }
}
