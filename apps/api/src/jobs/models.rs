use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where an application currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Applied,
    Interviewing,
    Rejected,
    Offer,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::Rejected,
        JobStatus::Offer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interviewing => "Interviewing",
            JobStatus::Rejected => "Rejected",
            JobStatus::Offer => "Offer",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!("status must be one of Applied, Interviewing, Rejected, Offer (got '{s}')")
            })
    }
}

/// One tracked job application as stored in the collection file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub application_link: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Builds a fresh record. Both timestamps are the same instant.
    pub fn new(id: String, new_job: NewJob, now: DateTime<Utc>) -> Self {
        Job {
            id,
            title: new_job.title,
            company: new_job.company,
            application_link: new_job.application_link,
            status: new_job.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the present fields of `update` and bumps `updated_at`.
    /// `id` and `created_at` are never touched.
    pub fn apply(&mut self, update: JobUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(company) = update.company {
            self.company = company;
        }
        if let Some(link) = update.application_link {
            self.application_link = link;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        // updated_at must strictly increase even if the clock did not move
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Body of `POST /jobs`. Every field is optional on the wire so that a missing
/// field is reported as a validation error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub application_link: Option<String>,
    pub status: Option<String>,
}

/// Body of `PUT /jobs/:id`. Unknown keys such as `id` or `createdAt` are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub application_link: Option<String>,
    pub status: Option<String>,
}

/// A validated create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub application_link: String,
    pub status: JobStatus,
}

impl NewJob {
    /// Checks the free-text fields. Used again by stores on `create`.
    pub fn validate(&self) -> Result<(), String> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("company", &self.company),
            ("applicationLink", &self.application_link),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required fields: {}", missing.join(", ")))
        }
    }
}

impl TryFrom<CreateJobRequest> for NewJob {
    type Error = String;

    fn try_from(req: CreateJobRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let mut required = |name: &'static str, value: Option<String>| match value {
            Some(v) if !is_blank(&v) => v,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let title = required("title", req.title);
        let company = required("company", req.company);
        let application_link = required("applicationLink", req.application_link);
        let status = required("status", req.status);

        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        Ok(NewJob {
            title,
            company,
            application_link,
            status: status.parse::<JobStatus>()?,
        })
    }
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub application_link: Option<String>,
    pub status: Option<JobStatus>,
}

impl TryFrom<UpdateJobRequest> for JobUpdate {
    type Error = String;

    fn try_from(req: UpdateJobRequest) -> Result<Self, Self::Error> {
        let empty: Vec<&str> = [
            ("title", &req.title),
            ("company", &req.company),
            ("applicationLink", &req.application_link),
            ("status", &req.status),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(is_blank))
        .map(|(name, _)| name)
        .collect();

        if !empty.is_empty() {
            return Err(format!("Fields cannot be empty: {}", empty.join(", ")));
        }

        Ok(JobUpdate {
            title: req.title,
            company: req.company,
            application_link: req.application_link,
            status: req.status.as_deref().map(str::parse::<JobStatus>).transpose()?,
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(title: &str, status: &str) -> CreateJobRequest {
        CreateJobRequest {
            title: Some(title.to_string()),
            company: Some("Acme".to_string()),
            application_link: Some("https://acme.example/jobs/1".to_string()),
            status: Some(status.to_string()),
        }
    }

    fn sample_job() -> Job {
        let new_job = NewJob::try_from(create_request("Backend Engineer", "Applied")).unwrap();
        Job::new("job-1".to_string(), new_job, Utc::now())
    }

    #[test]
    fn test_status_serde_uses_wire_names() {
        let json = serde_json::to_string(&JobStatus::Interviewing).unwrap();
        assert_eq!(json, r#""Interviewing""#);
        let status: JobStatus = serde_json::from_str(r#""Offer""#).unwrap();
        assert_eq!(status, JobStatus::Offer);
    }

    #[test]
    fn test_status_from_str_rejects_unknown() {
        assert_eq!("Rejected".parse::<JobStatus>().unwrap(), JobStatus::Rejected);
        assert!("applied".parse::<JobStatus>().is_err());
        assert!("Ghosted".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_serializes_camel_case() {
        let value = serde_json::to_value(sample_job()).unwrap();
        assert!(value.get("applicationLink").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["status"], "Applied");
    }

    #[test]
    fn test_new_job_has_equal_timestamps() {
        let job = sample_job();
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn test_create_request_missing_fields_listed() {
        let req = CreateJobRequest {
            title: Some("".to_string()),
            company: None,
            application_link: Some("https://x".to_string()),
            status: Some("Applied".to_string()),
        };
        let err = NewJob::try_from(req).unwrap_err();
        assert_eq!(err, "Missing required fields: title, company");
    }

    #[test]
    fn test_create_request_whitespace_is_missing() {
        let err = NewJob::try_from(create_request("   ", "Applied")).unwrap_err();
        assert!(err.contains("title"));
    }

    #[test]
    fn test_create_request_bad_status() {
        let err = NewJob::try_from(create_request("Engineer", "Hired")).unwrap_err();
        assert!(err.contains("status must be one of"));
    }

    #[test]
    fn test_update_request_rejects_empty_present_field() {
        let req = UpdateJobRequest {
            company: Some("".to_string()),
            ..Default::default()
        };
        assert!(JobUpdate::try_from(req).is_err());
    }

    #[test]
    fn test_update_request_empty_body_is_noop_update() {
        let update = JobUpdate::try_from(UpdateJobRequest::default()).unwrap();
        assert_eq!(update, JobUpdate::default());
    }

    #[test]
    fn test_update_request_ignores_immutable_keys() {
        let req: UpdateJobRequest = serde_json::from_str(
            r#"{"id": "other", "createdAt": "2020-01-01T00:00:00Z", "status": "Offer"}"#,
        )
        .unwrap();
        let update = JobUpdate::try_from(req).unwrap();
        assert_eq!(update.status, Some(JobStatus::Offer));
        assert_eq!(update.title, None);
    }

    #[test]
    fn test_apply_changes_only_submitted_fields() {
        let mut job = sample_job();
        let before = job.clone();
        job.apply(
            JobUpdate {
                status: Some(JobStatus::Interviewing),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(job.status, JobStatus::Interviewing);
        assert_eq!(job.id, before.id);
        assert_eq!(job.title, before.title);
        assert_eq!(job.company, before.company);
        assert_eq!(job.application_link, before.application_link);
        assert_eq!(job.created_at, before.created_at);
        assert!(job.updated_at > before.updated_at);
    }

    #[test]
    fn test_apply_bumps_updated_at_when_clock_stalls() {
        let mut job = sample_job();
        let stale = job.updated_at - Duration::seconds(5);
        let before = job.updated_at;
        job.apply(JobUpdate::default(), stale);
        assert!(job.updated_at > before);
    }
}
