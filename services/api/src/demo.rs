use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::infra::{InMemoryBackend, InMemoryResumeStorage};
use crate::AppError;
use jobboard::applications::domain::{ResumeUpload, SubmitApplication};
use jobboard::applications::service::ApplicationService;
use jobboard::identity::{Principal, PrincipalId, Role};
use jobboard::jobs::domain::JobDraft;
use jobboard::jobs::service::JobService;

fn principal(id: &str, role: Role) -> Principal {
    Principal {
        id: PrincipalId(id.to_string()),
        role,
    }
}

/// Scripted end-to-end walkthrough of the job and application lifecycle,
/// exercising the same services the HTTP surface wires up.
pub(crate) fn run_demo() -> Result<(), AppError> {
    println!("Job board lifecycle demo");

    let backend = Arc::new(InMemoryBackend::default());
    backend.register_account("employer-token", "employer-1", "acme-hr", "hr@acme.example", "Employer");
    backend.register_account("seeker-token", "seeker-1", "casey", "casey@example.com", "Job Seeker");

    let jobs = JobService::new(backend.clone(), backend.clone(), 25);
    let storage = Arc::new(InMemoryResumeStorage::default());
    let applications = ApplicationService::new(backend.clone(), backend.clone(), storage.clone());

    let employer = principal("employer-1", Role::Employer);
    let rival = principal("employer-2", Role::Employer);
    let seeker = principal("seeker-1", Role::JobSeeker);

    let draft = JobDraft {
        title: Some("Backend Engineer".to_string()),
        description: Some("Own the job-board services end to end".to_string()),
        salary: Some(120_000.0),
        location: Some("Remote".to_string()),
        job_type: Some("full-time".to_string()),
        experience_level: Some("mid".to_string()),
        company_name: Some("Acme".to_string()),
        expired_at: Some(Utc::now() + Duration::days(30)),
        request_id: Some("demo-request-1".to_string()),
        ..JobDraft::default()
    };

    let job = match jobs.create(&employer, draft.clone()) {
        Ok(job) => job,
        Err(err) => {
            println!("  Job creation rejected: {err}");
            return Ok(());
        }
    };
    println!("- Posted job {} ({} at {})", job.id, job.title, job.company_name);

    let replayed = jobs.create(&employer, draft)?;
    println!(
        "- Replayed the same request id -> still job {} (idempotent create)",
        replayed.id
    );

    let submission = SubmitApplication {
        job: job.id.clone(),
        cover_letter: Some("I am interested".to_string()),
        resume: ResumeUpload {
            file_name: "resume.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4 demo resume".to_vec(),
        },
    };
    let application = match applications.submit(&seeker, submission.clone()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Application rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- {} applied -> application {} with status {}",
        seeker.id, application.id, application.status
    );

    if let Err(err) = applications.submit(&seeker, submission) {
        println!("- Second application rejected: {err}");
    }

    let incoming = applications.list(&employer)?;
    println!("- Employer sees {} application(s) for their postings", incoming.len());
    println!("- Blob storage holds {} resume file(s)", storage.file_count());

    if let Err(err) = applications.update_status(&rival, &application.id, "accepted") {
        println!("- Rival employer cannot decide the application: {err}");
    }
    let accepted = applications.update_status(&employer, &application.id, "accepted")?;
    println!("- Owning employer accepted -> status {}", accepted.status);

    let deleted = jobs.delete(&employer, &job.id)?;
    println!("- Deleted job {} (applications cascade with it)", deleted.id);
    let remaining = applications.list(&seeker)?;
    println!("- Seeker now sees {} application(s)", remaining.len());

    Ok(())
}
