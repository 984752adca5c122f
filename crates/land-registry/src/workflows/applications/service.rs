use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::blob::{BlobError, BlobStorage};
use super::catalog::{ServiceCatalog, StatusCatalog};
use super::domain::{
    Application, ApplicationId, ApplicationLog, Document, DocumentId, Officer, Payment,
    PaymentStatus, ServiceDetail, ServiceId, StatusId, UserId, VerificationStatus,
};
use super::identity::IdentityError;
use super::repository::{
    AuditEntry, NewApplication, NewDocument, NewPayment, RegistryRepository, RepositoryError,
};

/// Error raised by the workflow service. The HTTP layer maps variants to
/// status codes; unexpected storage detail never reaches the caller body.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error("invalid status id {0}")]
    InvalidStatus(StatusId),
    #[error("missing or invalid credential")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<BlobError> for WorkflowError {
    fn from(value: BlobError) -> Self {
        WorkflowError::Storage(value.to_string())
    }
}

impl From<IdentityError> for WorkflowError {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::Unauthenticated => WorkflowError::Unauthenticated,
            IdentityError::Unavailable(message) => WorkflowError::Storage(message),
        }
    }
}

/// Request payload for opening an application. Detail and document ids ride
/// along so a single submission can carry the whole intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApplicationRequest {
    pub service_id: ServiceId,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub detail: Option<ServiceDetail>,
    #[serde(default)]
    pub documents: Vec<DocumentId>,
}

/// Upload payload after the HTTP layer has decoded the body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDocumentRequest {
    pub document_type: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Request payload for recording a fee payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub application_id: ApplicationId,
    pub amount_cents: u64,
    pub payment_method: String,
    #[serde(default)]
    pub transaction_reference: Option<String>,
}

/// Created document plus the presigned URL it is retrievable under, when the
/// store can mint one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReceipt {
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Officer-facing projection joining the application with the names a review
/// screen displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub user_id: UserId,
    pub user_full_name: String,
    pub service_id: ServiceId,
    pub service_name: String,
    pub status_id: StatusId,
    pub status_name: String,
    pub application_date: DateTime<Utc>,
    pub reference_number: String,
}

static REFERENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static OBJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_reference_number(now: DateTime<Utc>) -> String {
    let sequence = REFERENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("REF-{}-{:04}", now.timestamp(), sequence)
}

/// Service composing the status/service catalogs, the registry store, and
/// blob storage into the application lifecycle operations.
pub struct RegistryApplicationService<R, B> {
    repository: Arc<R>,
    blobs: Arc<B>,
    statuses: StatusCatalog,
    services: ServiceCatalog,
}

impl<R, B> RegistryApplicationService<R, B>
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
{
    pub fn new(repository: Arc<R>, blobs: Arc<B>) -> Self {
        Self::with_catalogs(
            repository,
            blobs,
            StatusCatalog::standard(),
            ServiceCatalog::standard(),
        )
    }

    pub fn with_catalogs(
        repository: Arc<R>,
        blobs: Arc<B>,
        statuses: StatusCatalog,
        services: ServiceCatalog,
    ) -> Self {
        Self {
            repository,
            blobs,
            statuses,
            services,
        }
    }

    pub fn status_catalog(&self) -> &StatusCatalog {
        &self.statuses
    }

    pub fn service_catalog(&self) -> &ServiceCatalog {
        &self.services
    }

    /// Open a new application for the calling citizen. The base row and its
    /// creation log commit first; detail attachment and document
    /// re-parenting then run best-effort and never fail the call.
    pub fn create_application(
        &self,
        user_id: UserId,
        request: CreateApplicationRequest,
    ) -> Result<Application, WorkflowError> {
        self.require_user(user_id)?;

        if self.services.get(request.service_id).is_none() {
            return Err(WorkflowError::InvalidInput("service not found".to_string()));
        }

        let now = Utc::now();
        let reference_number = match request.reference_number {
            Some(reference) if !reference.trim().is_empty() => reference,
            _ => next_reference_number(now),
        };

        let application = self
            .repository
            .insert_application(
                NewApplication {
                    user_id,
                    service_id: request.service_id,
                    status_id: self.statuses.initial().id,
                    reference_number,
                    application_date: now,
                },
                AuditEntry::citizen("Created by user"),
            )
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    WorkflowError::Conflict("reference number already in use".to_string())
                }
                other => storage(other),
            })?;

        if request.detail.is_some() || !request.documents.is_empty() {
            if let Err(err) =
                self.attach_service_detail(&application, request.detail, &request.documents)
            {
                warn!(
                    application_id = application.id.0,
                    error = %err,
                    "service detail attachment failed; application kept"
                );
            }
        }

        Ok(application)
    }

    /// Attach the service-specific detail record and re-parent previously
    /// uploaded documents. `create_application` runs this best-effort;
    /// invoked directly it surfaces its errors.
    pub fn attach_service_detail(
        &self,
        application: &Application,
        detail: Option<ServiceDetail>,
        documents: &[DocumentId],
    ) -> Result<(), WorkflowError> {
        if let Some(detail) = detail {
            let service = self
                .services
                .get(application.service_id)
                .ok_or(WorkflowError::NotFound("service"))?;
            if detail.kind() != service.kind {
                return Err(WorkflowError::InvalidInput(format!(
                    "detail kind {} does not match service {}",
                    detail.kind().label(),
                    service.code
                )));
            }
            self.repository
                .insert_detail(application.id, detail)
                .map_err(|err| match err {
                    RepositoryError::Conflict => WorkflowError::Conflict(
                        "application already has a detail record".to_string(),
                    ),
                    RepositoryError::NotFound => WorkflowError::NotFound("application"),
                    other => storage(other),
                })?;
        }

        for document_id in documents {
            self.repository
                .reparent_document(*document_id, application.id)
                .map_err(|err| match err {
                    RepositoryError::NotFound => WorkflowError::NotFound("document"),
                    other => storage(other),
                })?;
        }

        Ok(())
    }

    pub fn list_applications(&self, user_id: UserId) -> Result<Vec<Application>, WorkflowError> {
        self.repository
            .applications_for_user(user_id)
            .map_err(storage)
    }

    /// Owner-scoped read; a foreign application id resolves like a missing
    /// one.
    pub fn get_application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Application, WorkflowError> {
        self.repository
            .application_for_user(application_id, user_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))
    }

    pub fn service_detail(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Option<ServiceDetail>, WorkflowError> {
        self.get_application(user_id, application_id)?;
        self.repository
            .detail_for_application(application_id)
            .map_err(storage)
    }

    pub fn upload_document(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
        request: UploadDocumentRequest,
    ) -> Result<DocumentReceipt, WorkflowError> {
        let application = self
            .repository
            .application_for_user(application_id, user_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;

        let document_type = request.document_type.trim();
        if document_type.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "document type is required".to_string(),
            ));
        }
        let file_name = request.file_name.trim();
        if file_name.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "file name is required".to_string(),
            ));
        }

        let content_type = request
            .content_type
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        let sequence = OBJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let key = format!(
            "applications/{}/{:06}-{}",
            application.id.0, sequence, file_name
        );
        let storage_key = self.blobs.put(&key, request.bytes, &content_type)?;

        let document = self
            .repository
            .insert_document(NewDocument {
                application_id: application.id,
                document_type: document_type.to_string(),
                file_name: file_name.to_string(),
                storage_key: storage_key.clone(),
            })
            .map_err(storage)?;

        let download_url = self.blobs.presigned_get(&storage_key)?;
        Ok(DocumentReceipt {
            document,
            download_url,
        })
    }

    /// Presigned download link for a document the caller owns.
    pub fn download_document(
        &self,
        user_id: UserId,
        document_id: DocumentId,
    ) -> Result<String, WorkflowError> {
        let document = self
            .repository
            .fetch_document(document_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("document"))?;

        let application = self
            .repository
            .fetch_application(document.application_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;
        if application.user_id != user_id {
            return Err(WorkflowError::Forbidden);
        }

        self.blobs
            .presigned_get(&document.storage_key)?
            .ok_or_else(|| {
                WorkflowError::Storage("stored object has no retrievable key".to_string())
            })
    }

    /// Documents of one application. The ownership check inspects the first
    /// returned row; an empty result passes through without one.
    pub fn list_application_documents(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Vec<Document>, WorkflowError> {
        let documents = self
            .repository
            .documents_for_application(application_id)
            .map_err(storage)?;

        if let Some(first) = documents.first() {
            let application = self
                .repository
                .fetch_application(first.application_id)
                .map_err(storage)?
                .ok_or(WorkflowError::NotFound("application"))?;
            if application.user_id != user_id {
                return Err(WorkflowError::Forbidden);
            }
        }

        Ok(documents)
    }

    pub fn list_my_documents(&self, user_id: UserId) -> Result<Vec<Document>, WorkflowError> {
        self.repository.documents_for_user(user_id).map_err(storage)
    }

    pub fn create_payment(
        &self,
        user_id: UserId,
        request: PaymentRequest,
    ) -> Result<Payment, WorkflowError> {
        self.repository
            .application_for_user(request.application_id, user_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;

        self.repository
            .insert_payment(NewPayment {
                application_id: request.application_id,
                amount_cents: request.amount_cents,
                payment_method: request.payment_method,
                transaction_reference: request.transaction_reference,
                status: PaymentStatus::Completed,
            })
            .map_err(storage)
    }

    /// Payments of one application, with the same first-row ownership check
    /// as document listing.
    pub fn list_payments(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Vec<Payment>, WorkflowError> {
        let payments = self
            .repository
            .payments_for_application(application_id)
            .map_err(storage)?;

        if let Some(first) = payments.first() {
            let application = self
                .repository
                .fetch_application(first.application_id)
                .map_err(storage)?
                .ok_or(WorkflowError::NotFound("application"))?;
            if application.user_id != user_id {
                return Err(WorkflowError::Forbidden);
            }
        }

        Ok(payments)
    }

    /// Global review queue; officers see every application.
    pub fn list_all_applications(
        &self,
        acting_user: UserId,
    ) -> Result<Vec<ApplicationSummary>, WorkflowError> {
        self.require_officer(acting_user)?;
        let applications = self.repository.all_applications().map_err(storage)?;
        applications
            .iter()
            .map(|application| self.summarize(application))
            .collect()
    }

    pub fn application_detail(
        &self,
        acting_user: UserId,
        application_id: ApplicationId,
    ) -> Result<ApplicationSummary, WorkflowError> {
        self.require_officer(acting_user)?;
        let application = self
            .repository
            .fetch_application(application_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;
        self.summarize(&application)
    }

    /// Move an application to another catalog status. Any status may move to
    /// any other; the catalog is the only gate.
    pub fn update_status(
        &self,
        acting_user: UserId,
        application_id: ApplicationId,
        status_id: StatusId,
        remarks: Option<String>,
    ) -> Result<(), WorkflowError> {
        let officer = self.require_officer(acting_user)?;

        let mut application = self
            .repository
            .fetch_application(application_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;

        let status = self
            .statuses
            .get(status_id)
            .ok_or(WorkflowError::InvalidStatus(status_id))?;

        application.status_id = status.id;
        application.assigned_officer_id = Some(officer.id);
        application.last_updated_at = Utc::now();

        self.repository
            .update_application(
                &application,
                AuditEntry::officer(
                    officer.id,
                    format!("Status set to {}", status.name),
                    remarks,
                ),
            )
            .map_err(storage)
    }

    /// Audit trail for one application, newest first.
    pub fn application_logs(
        &self,
        acting_user: UserId,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, WorkflowError> {
        self.require_officer(acting_user)?;
        self.repository
            .fetch_application(application_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("application"))?;
        self.repository
            .logs_for_application(application_id)
            .map_err(storage)
    }

    /// Record a verification outcome on a document and log it against the
    /// owning application.
    pub fn verify_document(
        &self,
        acting_user: UserId,
        document_id: DocumentId,
        status: VerificationStatus,
        remarks: Option<String>,
    ) -> Result<(), WorkflowError> {
        let officer = self.require_officer(acting_user)?;

        let mut document = self
            .repository
            .fetch_document(document_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("document"))?;

        document.verification_status = status;
        self.repository
            .update_document(
                &document,
                AuditEntry::officer(
                    officer.id,
                    format!("Document {} set to {}", document.id, status.label()),
                    remarks,
                ),
            )
            .map_err(storage)
    }

    pub fn list_all_documents(
        &self,
        acting_user: UserId,
    ) -> Result<Vec<Document>, WorkflowError> {
        self.require_officer(acting_user)?;
        self.repository.all_documents().map_err(storage)
    }

    fn require_user(&self, user_id: UserId) -> Result<(), WorkflowError> {
        match self.repository.fetch_user(user_id).map_err(storage)? {
            Some(user) if user.is_active => Ok(()),
            _ => Err(WorkflowError::Unauthenticated),
        }
    }

    /// Officer membership gate: an authenticated user without an officer row
    /// is forbidden, not unauthenticated.
    fn require_officer(&self, user_id: UserId) -> Result<Officer, WorkflowError> {
        self.require_user(user_id)?;
        self.repository
            .officer_for_user(user_id)
            .map_err(storage)?
            .ok_or(WorkflowError::Forbidden)
    }

    fn summarize(&self, application: &Application) -> Result<ApplicationSummary, WorkflowError> {
        let user = self
            .repository
            .fetch_user(application.user_id)
            .map_err(storage)?
            .ok_or(WorkflowError::NotFound("user"))?;
        let service = self
            .services
            .get(application.service_id)
            .ok_or(WorkflowError::NotFound("service"))?;
        let status = self
            .statuses
            .get(application.status_id)
            .ok_or(WorkflowError::InvalidStatus(application.status_id))?;

        Ok(ApplicationSummary {
            application_id: application.id,
            user_id: application.user_id,
            user_full_name: user.full_name,
            service_id: service.id,
            service_name: service.name.clone(),
            status_id: status.id,
            status_name: status.name.clone(),
            application_date: application.application_date,
            reference_number: application.reference_number.clone(),
        })
    }
}

fn storage(err: RepositoryError) -> WorkflowError {
    match err {
        RepositoryError::NotFound => WorkflowError::NotFound("record"),
        RepositoryError::Conflict => WorkflowError::Conflict("record already exists".to_string()),
        RepositoryError::Unavailable(message) => WorkflowError::Storage(message),
    }
}
