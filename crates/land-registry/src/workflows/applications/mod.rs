//! Application lifecycle workflow: intake, service-detail attachment,
//! document upload/verification, payments, officer review, and the
//! append-only audit trail.
//!
//! Storage, identity resolution, and blob bytes live behind the provider
//! traits in `repository`, `identity`, and `blob`; `memory` carries the
//! map-backed implementations the service binary and tests run on.

pub mod blob;
pub mod catalog;
pub mod domain;
pub mod identity;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use blob::{BlobError, BlobStorage};
pub use catalog::{ServiceCatalog, StatusCatalog, StatusEntry};
pub use domain::{
    Application, ApplicationId, ApplicationLog, Document, DocumentId, FolioRequest, LogId,
    Officer, OfficerId, PartyDetails, Payment, PaymentId, PaymentStatus, Service, ServiceDetail,
    ServiceId, ServiceKind, StatusId, User, UserId, UserRole, VerificationStatus,
};
pub use identity::{IdentityError, IdentityProvider};
pub use memory::{InMemoryBlobStore, InMemoryRegistry, StaticBearerIdentity};
pub use repository::{
    AuditEntry, NewApplication, NewDocument, NewOfficer, NewPayment, NewUser, RegistryRepository,
    RepositoryError,
};
pub use router::{application_router, ApiContext};
pub use service::{
    ApplicationSummary, CreateApplicationRequest, DocumentReceipt, PaymentRequest,
    RegistryApplicationService, UploadDocumentRequest, WorkflowError,
};
