use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::PrincipalId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default applied when a draft omits `requirements`.
pub const DEFAULT_REQUIREMENTS: &str = "No specific requirements";
/// Default applied when a draft omits `industry`.
pub const DEFAULT_INDUSTRY: &str = "Technology";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "full-time" => Some(JobType::FullTime),
            "part-time" => Some(JobType::PartTime),
            "contract" => Some(JobType::Contract),
            "internship" => Some(JobType::Internship),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "entry" => Some(ExperienceLevel::Entry),
            "mid" => Some(ExperienceLevel::Mid),
            "senior" => Some(ExperienceLevel::Senior),
            "lead" => Some(ExperienceLevel::Lead),
            "executive" => Some(ExperienceLevel::Executive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

/// A published job posting. `owner` and `request_id` never change after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub salary: f64,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub company_name: String,
    pub industry: String,
    pub expired_at: DateTime<Utc>,
    pub owner: PrincipalId,
    pub request_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_at <= now
    }
}

/// Inbound creation payload. The transport layer normalizes every request
/// body into this shape before the manager sees it; enum fields stay raw so
/// validation can name the offending value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub request_id: Option<String>,
}

/// A draft that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary: f64,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub company_name: String,
    pub industry: Option<String>,
    pub expired_at: DateTime<Utc>,
    pub request_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum JobValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid job type: {0}")]
    InvalidJobType(String),
    #[error("invalid experience level: {0}")]
    InvalidExperienceLevel(String),
}

fn required(value: Option<String>, field: &'static str) -> Result<String, JobValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(JobValidationError::MissingField(field))
}

impl JobDraft {
    /// Check the required-field set and enum labels, in the same order the
    /// fields are documented.
    pub fn validate(self) -> Result<ValidatedDraft, JobValidationError> {
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let salary = self.salary.ok_or(JobValidationError::MissingField("salary"))?;
        let location = required(self.location, "location")?;

        let raw_job_type = required(self.job_type, "jobType")?;
        let job_type = JobType::parse(&raw_job_type)
            .ok_or(JobValidationError::InvalidJobType(raw_job_type))?;

        let raw_level = required(self.experience_level, "experienceLevel")?;
        let experience_level = ExperienceLevel::parse(&raw_level)
            .ok_or(JobValidationError::InvalidExperienceLevel(raw_level))?;

        let company_name = required(self.company_name, "companyName")?;
        let expired_at = self
            .expired_at
            .ok_or(JobValidationError::MissingField("expiredAt"))?;

        Ok(ValidatedDraft {
            title,
            description,
            requirements: self.requirements.filter(|r| !r.trim().is_empty()),
            salary,
            location,
            job_type,
            experience_level,
            company_name,
            industry: self.industry.filter(|i| !i.trim().is_empty()),
            expired_at,
            request_id: self.request_id.filter(|r| !r.trim().is_empty()),
        })
    }
}

/// Partial update for a job. `owner` and `request_id` are not patchable by
/// construction; unknown JSON fields are rejected at the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn apply(self, job: &mut Job, now: DateTime<Utc>) -> Result<(), JobValidationError> {
        if let Some(raw) = self.job_type {
            job.job_type =
                JobType::parse(&raw).ok_or(JobValidationError::InvalidJobType(raw))?;
        }
        if let Some(raw) = self.experience_level {
            job.experience_level = ExperienceLevel::parse(&raw)
                .ok_or(JobValidationError::InvalidExperienceLevel(raw))?;
        }
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(salary) = self.salary {
            job.salary = salary;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(company_name) = self.company_name {
            job.company_name = company_name;
        }
        if let Some(industry) = self.industry {
            job.industry = industry;
        }
        if let Some(expired_at) = self.expired_at {
            job.expired_at = expired_at;
        }
        job.updated_at = now;
        Ok(())
    }
}
