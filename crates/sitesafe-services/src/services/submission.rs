//! Submission flow
//!
//! A submission runs as explicit, ordered steps:
//!
//! 1. normalize and validate the record (nothing is uploaded for invalid input)
//! 2. personnel only: evaluate the repeat-offender status as it stands before this record
//! 3. upload the evidence file, if any
//! 4. insert the record carrying the new pointer
//! 5. resolve a display link for the stored evidence
//!
//! When step 3 fails, `UploadFailurePolicy::Block` aborts with a storage error and
//! nothing is persisted; `UploadFailurePolicy::Continue`, the default, inserts the
//! record with no pointer and reports the failure on the receipt. Any pointer set on
//! the incoming record is replaced whenever a file was supplied. When step 4 fails after a
//! successful upload, the uploaded object is deleted on a best-effort basis.

use serde::Serialize;
use sitesafe_core::models::{NewPersonnelViolation, NewSiteIssue, RecordId, RecordKind};
use sitesafe_core::{AppError, AuthorizedSession, UploadFailurePolicy};
use sitesafe_db::RecordStore;
use sitesafe_storage::{personnel_folder, site_folder};

use super::evidence::{EvidenceResolver, EvidenceUpload};
use super::repeat_offender::{OffenderStatus, RepeatOffenderAggregator};

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub id: RecordId,
    pub kind: RecordKind,
    /// Status before this record was added. Personnel submissions only.
    pub escalation: Option<OffenderStatus>,
    pub evidence_pointer: Option<String>,
    pub evidence_link: Option<String>,
    /// Set when the upload failed and the record was saved without evidence.
    pub upload_error: Option<String>,
}

#[derive(Clone)]
pub struct SubmissionService {
    store: RecordStore,
    aggregator: RepeatOffenderAggregator,
    evidence: EvidenceResolver,
    policy: UploadFailurePolicy,
}

struct UploadOutcome {
    pointer: Option<String>,
    error: Option<String>,
}

impl SubmissionService {
    pub fn new(
        store: RecordStore,
        aggregator: RepeatOffenderAggregator,
        evidence: EvidenceResolver,
        policy: UploadFailurePolicy,
    ) -> Self {
        Self {
            store,
            aggregator,
            evidence,
            policy,
        }
    }

    pub fn policy(&self) -> UploadFailurePolicy {
        self.policy
    }

    async fn upload(
        &self,
        upload: Option<EvidenceUpload>,
        folder: &str,
    ) -> Result<UploadOutcome, AppError> {
        let Some(upload) = upload else {
            return Ok(UploadOutcome {
                pointer: None,
                error: None,
            });
        };

        match self.evidence.store(&upload, folder).await {
            Ok(pointer) => Ok(UploadOutcome {
                pointer: Some(pointer),
                error: None,
            }),
            Err(e) => match self.policy {
                UploadFailurePolicy::Block => Err(e),
                UploadFailurePolicy::Continue => {
                    tracing::warn!(error = %e, folder = %folder, "Saving record without evidence");
                    Ok(UploadOutcome {
                        pointer: None,
                        error: Some(e.to_string()),
                    })
                }
            },
        }
    }

    async fn discard_on_failure<T>(
        &self,
        result: Result<T, AppError>,
        pointer: Option<&str>,
    ) -> Result<T, AppError> {
        if result.is_err() {
            if let Some(pointer) = pointer {
                self.evidence.discard(pointer).await;
            }
        }
        result
    }

    pub async fn submit_personnel(
        &self,
        session: &AuthorizedSession,
        record: NewPersonnelViolation,
        evidence: Option<EvidenceUpload>,
    ) -> Result<SubmissionReceipt, AppError> {
        let mut record = record.into_validated()?;
        let escalation = self
            .aggregator
            .evaluate(session, &record.hard_hat_number)
            .await?;

        let folder = personnel_folder(&record.hard_hat_number);
        let attempted = evidence.is_some();
        let upload = self.upload(evidence, &folder).await?;
        if attempted {
            record.evidence_pointer = upload.pointer.clone();
        }
        let pointer = record.evidence_pointer.clone();

        let inserted = self.store.insert_personnel(session, record).await;
        let id = self
            .discard_on_failure(inserted, upload.pointer.as_deref())
            .await?;
        let evidence_link = self.evidence.resolve(pointer.as_deref()).await;

        Ok(SubmissionReceipt {
            id,
            kind: RecordKind::PersonnelViolation,
            escalation: Some(escalation),
            evidence_pointer: pointer,
            evidence_link,
            upload_error: upload.error,
        })
    }

    pub async fn submit_site(
        &self,
        session: &AuthorizedSession,
        record: NewSiteIssue,
        photo: Option<EvidenceUpload>,
    ) -> Result<SubmissionReceipt, AppError> {
        let mut record = record.into_validated()?;

        let folder = site_folder(&record.building, &record.floor);
        let attempted = photo.is_some();
        let upload = self.upload(photo, &folder).await?;
        if attempted {
            record.photo_pointer = upload.pointer.clone();
        }
        let pointer = record.photo_pointer.clone();

        let inserted = self.store.insert_site(session, record).await;
        let id = self
            .discard_on_failure(inserted, upload.pointer.as_deref())
            .await?;
        let evidence_link = self.evidence.resolve(pointer.as_deref()).await;

        Ok(SubmissionReceipt {
            id,
            kind: RecordKind::SiteIssue,
            escalation: None,
            evidence_pointer: pointer,
            evidence_link,
            upload_error: upload.error,
        })
    }
}
