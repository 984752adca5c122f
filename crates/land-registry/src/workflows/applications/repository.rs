use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationLog, Document, DocumentId, Officer, OfficerId, Payment,
    PaymentStatus, ServiceDetail, ServiceId, StatusId, User, UserId, UserRole,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Audit-log payload coupled to a state-changing write. The store appends the
/// corresponding [`ApplicationLog`] row in the same transaction as the
/// mutation, which keeps the trail complete even if the process dies between
/// steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub officer_id: Option<OfficerId>,
    pub action_taken: String,
    pub remarks: Option<String>,
}

impl AuditEntry {
    pub fn citizen(action_taken: impl Into<String>) -> Self {
        Self {
            officer_id: None,
            action_taken: action_taken.into(),
            remarks: None,
        }
    }

    pub fn officer(
        officer_id: OfficerId,
        action_taken: impl Into<String>,
        remarks: Option<String>,
    ) -> Self {
        Self {
            officer_id: Some(officer_id),
            action_taken: action_taken.into(),
            remarks,
        }
    }
}

/// Insert payload for user accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub nic_number: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
}

/// Insert payload for officer profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOfficer {
    pub user_id: UserId,
    pub employee_id: String,
    pub assigned_office: Option<String>,
    pub role: Option<String>,
}

/// Insert payload for applications.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub status_id: StatusId,
    pub reference_number: String,
    pub application_date: DateTime<Utc>,
}

/// Insert payload for uploaded documents.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub application_id: ApplicationId,
    pub document_type: String,
    pub file_name: String,
    pub storage_key: String,
}

/// Insert payload for payments.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub application_id: ApplicationId,
    pub amount_cents: u64,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub status: PaymentStatus,
}

/// Storage abstraction over the registry entities, so the workflow service
/// can be exercised against an in-memory store in tests and against a real
/// relational backend in deployment.
///
/// Required guarantees: unique enforcement on user email/NIC, officer
/// employee id, and application reference number; cascade delete from an
/// application to its documents, payments, logs, and detail record; and the
/// combined mutation+audit methods commit both writes atomically.
pub trait RegistryRepository: Send + Sync {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    fn insert_officer(&self, officer: NewOfficer) -> Result<Officer, RepositoryError>;
    fn officer_for_user(&self, user_id: UserId) -> Result<Option<Officer>, RepositoryError>;

    /// Inserts the application and its creation log row together.
    fn insert_application(
        &self,
        application: NewApplication,
        audit: AuditEntry,
    ) -> Result<Application, RepositoryError>;
    /// Persists the supplied application snapshot and its log row together.
    fn update_application(
        &self,
        application: &Application,
        audit: AuditEntry,
    ) -> Result<(), RepositoryError>;
    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Owner-scoped fetch: resolves only when the application belongs to
    /// `user_id`, so foreign ids are indistinguishable from absent ones.
    fn application_for_user(
        &self,
        id: ApplicationId,
        user_id: UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn applications_for_user(&self, user_id: UserId)
        -> Result<Vec<Application>, RepositoryError>;
    fn all_applications(&self) -> Result<Vec<Application>, RepositoryError>;
    /// Removes the application and all dependent rows.
    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError>;

    /// At most one detail record per application; a second insert conflicts.
    fn insert_detail(
        &self,
        application_id: ApplicationId,
        detail: ServiceDetail,
    ) -> Result<(), RepositoryError>;
    fn detail_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ServiceDetail>, RepositoryError>;

    fn insert_document(&self, document: NewDocument) -> Result<Document, RepositoryError>;
    /// Persists the supplied document snapshot and its log row together.
    fn update_document(
        &self,
        document: &Document,
        audit: AuditEntry,
    ) -> Result<(), RepositoryError>;
    fn fetch_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;
    /// Moves a previously uploaded document onto another application.
    fn reparent_document(
        &self,
        id: DocumentId,
        application_id: ApplicationId,
    ) -> Result<(), RepositoryError>;
    fn documents_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<Document>, RepositoryError>;
    fn documents_for_user(&self, user_id: UserId) -> Result<Vec<Document>, RepositoryError>;
    fn all_documents(&self) -> Result<Vec<Document>, RepositoryError>;

    /// Newest first.
    fn logs_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, RepositoryError>;

    fn insert_payment(&self, payment: NewPayment) -> Result<Payment, RepositoryError>;
    fn payments_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<Payment>, RepositoryError>;
}
