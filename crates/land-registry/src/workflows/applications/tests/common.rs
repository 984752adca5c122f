use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::applications::blob::{BlobError, BlobStorage};
use crate::workflows::applications::domain::{
    Application, DocumentId, Officer, PartyDetails, ServiceDetail, ServiceId, User, UserId,
    UserRole,
};
use crate::workflows::applications::memory::{
    InMemoryBlobStore, InMemoryRegistry, StaticBearerIdentity,
};
use crate::workflows::applications::repository::{NewOfficer, NewUser, RegistryRepository};
use crate::workflows::applications::router::{application_router, ApiContext};
use crate::workflows::applications::service::{
    CreateApplicationRequest, RegistryApplicationService, UploadDocumentRequest,
};

pub(super) const CITIZEN_TOKEN: &str = "token-anura";
pub(super) const OTHER_CITIZEN_TOKEN: &str = "token-bimal";
pub(super) const OFFICER_TOKEN: &str = "token-kumari";

pub(super) struct Fixture {
    pub(super) service: Arc<RegistryApplicationService<InMemoryRegistry, InMemoryBlobStore>>,
    pub(super) repository: Arc<InMemoryRegistry>,
    pub(super) blobs: Arc<InMemoryBlobStore>,
    pub(super) identity: Arc<StaticBearerIdentity>,
    pub(super) citizen: User,
    pub(super) other_citizen: User,
    pub(super) officer_user: User,
    pub(super) officer: Officer,
}

impl Fixture {
    pub(super) fn router(&self) -> axum::Router {
        application_router(ApiContext {
            service: Arc::clone(&self.service),
            identity: Arc::clone(&self.identity),
        })
    }
}

pub(super) fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryRegistry::default());
    let blobs = Arc::new(InMemoryBlobStore::new("http://files.test/blob"));
    let identity = Arc::new(StaticBearerIdentity::default());
    let service = Arc::new(RegistryApplicationService::new(
        Arc::clone(&repository),
        Arc::clone(&blobs),
    ));

    let citizen = repository
        .insert_user(new_user("Anura Perera", "901234567V", "anura@example.com"))
        .expect("citizen inserted");
    let other_citizen = repository
        .insert_user(new_user("Bimal Silva", "881234567V", "bimal@example.com"))
        .expect("second citizen inserted");
    let mut officer_seed = new_user("Kumari Fernando", "791234567V", "kumari@lro.example.gov");
    officer_seed.role = UserRole::Officer;
    let officer_user = repository
        .insert_user(officer_seed)
        .expect("officer user inserted");
    let officer = repository
        .insert_officer(NewOfficer {
            user_id: officer_user.id,
            employee_id: "LRO-0042".to_string(),
            assigned_office: Some("Colombo".to_string()),
            role: Some("Senior Registrar".to_string()),
        })
        .expect("officer profile inserted");

    identity.register_token(CITIZEN_TOKEN, citizen.id);
    identity.register_token(OTHER_CITIZEN_TOKEN, other_citizen.id);
    identity.register_token(OFFICER_TOKEN, officer_user.id);

    Fixture {
        service,
        repository,
        blobs,
        identity,
        citizen,
        other_citizen,
        officer_user,
        officer,
    }
}

pub(super) fn new_user(full_name: &str, nic: &str, email: &str) -> NewUser {
    NewUser {
        full_name: full_name.to_string(),
        nic_number: nic.to_string(),
        email: email.to_string(),
        phone_number: Some("+94 71 000 0000".to_string()),
        password_hash: "$argon2id$stub".to_string(),
        role: UserRole::Citizen,
    }
}

pub(super) fn land_transfer_request() -> CreateApplicationRequest {
    CreateApplicationRequest {
        service_id: ServiceId(1),
        reference_number: None,
        detail: Some(land_transfer_detail()),
        documents: Vec::new(),
    }
}

pub(super) fn land_transfer_detail() -> ServiceDetail {
    ServiceDetail::LandTransfer {
        seller: PartyDetails {
            full_name: "Sunil Jayawardena".to_string(),
            nic_number: Some("751234567V".to_string()),
            email: Some("sunil@example.com".to_string()),
            phone_number: None,
        },
        buyer: PartyDetails {
            full_name: "Anura Perera".to_string(),
            nic_number: Some("901234567V".to_string()),
            email: None,
            phone_number: Some("+94 71 000 0000".to_string()),
        },
        guarantor1_nic: Some("701234567V".to_string()),
        guarantor2_nic: None,
    }
}

pub(super) fn copy_of_document_detail() -> ServiceDetail {
    ServiceDetail::CopyOfDocument {
        deed_number: Some("D-1984/17".to_string()),
        date_of_deed_attestation: Some("1984-03-02".to_string()),
        notary_public_name: Some("N. Gunasekara".to_string()),
        notary_address: None,
        reason_for_request: Some("Bank valuation".to_string()),
    }
}

pub(super) fn upload_request(file_name: &str) -> UploadDocumentRequest {
    UploadDocumentRequest {
        document_type: "deed".to_string(),
        file_name: file_name.to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4 stub".to_vec(),
    }
}

pub(super) fn create_application_for(fixture: &Fixture, user_id: UserId) -> Application {
    fixture
        .service
        .create_application(user_id, land_transfer_request())
        .expect("application created")
}

/// Blob store that rejects every call, for exercising the 500 path.
pub(super) struct FailingBlobStore;

impl BlobStorage for FailingBlobStore {
    fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, BlobError> {
        Err(BlobError::Unavailable("object store offline".to_string()))
    }

    fn presigned_get(&self, _key: &str) -> Result<Option<String>, BlobError> {
        Err(BlobError::Unavailable("object store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn unassigned_document(fixture: &Fixture, owner: UserId) -> DocumentId {
    // Documents always belong to an application; "unassigned" in practice
    // means parked on an earlier application until intake re-parents them.
    let holding = create_application_for(fixture, owner);
    fixture
        .service
        .upload_document(owner, holding.id, upload_request("signature.png"))
        .expect("document uploaded")
        .document
        .id
}
