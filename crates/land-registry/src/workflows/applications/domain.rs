use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for citizen/staff accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier wrapper for land-registry officers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfficerId(pub u64);

/// Identifier wrapper for catalog services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub u64);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

/// Identifier wrapper for uploaded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// Identifier wrapper for audit-log rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId(pub u64);

/// Identifier wrapper for fee payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(pub u64);

/// Identifier wrapper for entries of the application-status catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role; officers additionally hold an [`Officer`] profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Citizen,
    Officer,
    Admin,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Citizen => "citizen",
            UserRole::Officer => "officer",
            UserRole::Admin => "admin",
        }
    }
}

/// Citizen or staff identity. Deactivated rather than deleted, since
/// applications keep referencing the owning account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub nic_number: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Staff capability attached 1:1 to a user account; required for every
/// administrative operation on applications and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub id: OfficerId,
    pub user_id: UserId,
    pub employee_id: String,
    pub assigned_office: Option<String>,
    pub role: Option<String>,
}

/// Which of the five request families a catalog service belongs to. Drives
/// which [`ServiceDetail`] variant an application may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    LandTransfer,
    CopyOfRegister,
    SearchOfRegister,
    DuplicateDeeds,
    CopyOfDocument,
}

impl ServiceKind {
    pub const fn label(self) -> &'static str {
        match self {
            ServiceKind::LandTransfer => "land_transfer",
            ServiceKind::CopyOfRegister => "copy_of_register",
            ServiceKind::SearchOfRegister => "search_of_register",
            ServiceKind::DuplicateDeeds => "duplicate_deeds",
            ServiceKind::CopyOfDocument => "copy_of_document",
        }
    }
}

/// Immutable catalog entry describing a request type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub code: String,
    pub kind: ServiceKind,
    pub base_fee_cents: u64,
}

/// The central entity: one citizen request for one catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub application_date: DateTime<Utc>,
    pub status_id: StatusId,
    /// Last officer who acted on the application, not a permanent owner.
    pub assigned_officer_id: Option<OfficerId>,
    pub reference_number: String,
    pub last_updated_at: DateTime<Utc>,
}

/// Verification state of an uploaded document. Starts at `Pending`; only the
/// verification operation may move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Rejected",
        }
    }
}

/// A stored file reference attached to exactly one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub application_id: ApplicationId,
    pub document_type: String,
    pub file_name: String,
    pub storage_key: String,
    pub verification_status: VerificationStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// Append-only audit record. `officer_id` is `None` for citizen-initiated
/// actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationLog {
    pub id: LogId,
    pub application_id: ApplicationId,
    pub officer_id: Option<OfficerId>,
    pub action_taken: String,
    pub remarks: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

/// A fee payment recorded against an application. Independent of the
/// review-status track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub application_id: ApplicationId,
    pub amount_cents: u64,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
}

/// Party snapshot used by land-transfer requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDetails {
    pub full_name: String,
    pub nic_number: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// One folio the registry staff should search for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioRequest {
    pub register_name: Option<String>,
    pub volume_number: Option<String>,
    pub folio_number: Option<String>,
}

/// Service-specific form fields. Tagged by request family so dispatch is
/// explicit rather than inferred from field presence; an application carries
/// at most one variant, and it must match the selected service's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceDetail {
    LandTransfer {
        seller: PartyDetails,
        buyer: PartyDetails,
        guarantor1_nic: Option<String>,
        guarantor2_nic: Option<String>,
    },
    CopyOfRegister {
        land_district: Option<String>,
        extract_folio: Option<String>,
        property_village: Option<String>,
        property_names: Option<String>,
        extent: Option<String>,
        reason_for_request: Option<String>,
    },
    SearchOfRegister {
        property_village: Option<String>,
        property_name: Option<String>,
        extent: Option<String>,
        korale: Option<String>,
        pattu: Option<String>,
        gn_division: Option<String>,
        ds_division: Option<String>,
        folios: Vec<FolioRequest>,
    },
    DuplicateDeeds {
        notary_public_name: Option<String>,
        deed_number: Option<String>,
        district_of_station: Option<String>,
        number_of_deeds: Option<u32>,
        date_of_deed: Option<String>,
        village: Option<String>,
        property_name: Option<String>,
        extent: Option<String>,
        reason_for_search: Option<String>,
        court_case_no: Option<String>,
    },
    CopyOfDocument {
        deed_number: Option<String>,
        date_of_deed_attestation: Option<String>,
        notary_public_name: Option<String>,
        notary_address: Option<String>,
        reason_for_request: Option<String>,
    },
}

impl ServiceDetail {
    pub const fn kind(&self) -> ServiceKind {
        match self {
            ServiceDetail::LandTransfer { .. } => ServiceKind::LandTransfer,
            ServiceDetail::CopyOfRegister { .. } => ServiceKind::CopyOfRegister,
            ServiceDetail::SearchOfRegister { .. } => ServiceKind::SearchOfRegister,
            ServiceDetail::DuplicateDeeds { .. } => ServiceKind::DuplicateDeeds,
            ServiceDetail::CopyOfDocument { .. } => ServiceKind::CopyOfDocument,
        }
    }
}
