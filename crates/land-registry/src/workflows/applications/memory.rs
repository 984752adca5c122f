//! In-memory provider implementations backing the service binary, the CLI
//! demo, and the test suites.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::Utc;

use super::blob::{BlobError, BlobStorage};
use super::domain::{
    Application, ApplicationId, ApplicationLog, Document, DocumentId, LogId, Officer, OfficerId,
    Payment, PaymentId, ServiceDetail, User, UserId, VerificationStatus,
};
use super::identity::{IdentityError, IdentityProvider};
use super::repository::{
    AuditEntry, NewApplication, NewDocument, NewOfficer, NewPayment, NewUser, RegistryRepository,
    RepositoryError,
};

#[derive(Debug, Default)]
struct RegistryState {
    users: BTreeMap<UserId, User>,
    officers: BTreeMap<OfficerId, Officer>,
    applications: BTreeMap<ApplicationId, Application>,
    details: BTreeMap<ApplicationId, ServiceDetail>,
    documents: BTreeMap<DocumentId, Document>,
    logs: BTreeMap<LogId, ApplicationLog>,
    payments: BTreeMap<PaymentId, Payment>,
    next_user: u64,
    next_officer: u64,
    next_application: u64,
    next_document: u64,
    next_log: u64,
    next_payment: u64,
}

impl RegistryState {
    fn append_log(&mut self, application_id: ApplicationId, audit: AuditEntry) -> ApplicationLog {
        self.next_log += 1;
        let log = ApplicationLog {
            id: LogId(self.next_log),
            application_id,
            officer_id: audit.officer_id,
            action_taken: audit.action_taken,
            remarks: audit.remarks,
            timestamp: Utc::now(),
        };
        self.logs.insert(log.id, log.clone());
        log
    }
}

/// Mutex-guarded map-backed store. Each trait method takes the lock once, so
/// the coupled mutation+audit writes commit as a single step.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

impl RegistryRepository for InMemoryRegistry {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        let duplicate = state.users.values().any(|existing| {
            existing.email.eq_ignore_ascii_case(&user.email)
                || existing.nic_number == user.nic_number
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        state.next_user += 1;
        let user = User {
            id: UserId(state.next_user),
            full_name: user.full_name,
            nic_number: user.nic_number,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.users.get(&id).cloned())
    }

    fn insert_officer(&self, officer: NewOfficer) -> Result<Officer, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.users.contains_key(&officer.user_id) {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = state
            .officers
            .values()
            .any(|existing| existing.employee_id == officer.employee_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        state.next_officer += 1;
        let officer = Officer {
            id: OfficerId(state.next_officer),
            user_id: officer.user_id,
            employee_id: officer.employee_id,
            assigned_office: officer.assigned_office,
            role: officer.role,
        };
        state.officers.insert(officer.id, officer.clone());
        Ok(officer)
    }

    fn officer_for_user(&self, user_id: UserId) -> Result<Option<Officer>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state
            .officers
            .values()
            .find(|officer| officer.user_id == user_id)
            .cloned())
    }

    fn insert_application(
        &self,
        application: NewApplication,
        audit: AuditEntry,
    ) -> Result<Application, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        let duplicate = state
            .applications
            .values()
            .any(|existing| existing.reference_number == application.reference_number);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        state.next_application += 1;
        let application = Application {
            id: ApplicationId(state.next_application),
            user_id: application.user_id,
            service_id: application.service_id,
            application_date: application.application_date,
            status_id: application.status_id,
            assigned_officer_id: None,
            reference_number: application.reference_number,
            last_updated_at: application.application_date,
        };
        state.applications.insert(application.id, application.clone());
        state.append_log(application.id, audit);
        Ok(application)
    }

    fn update_application(
        &self,
        application: &Application,
        audit: AuditEntry,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.applications.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        state
            .applications
            .insert(application.id, application.clone());
        state.append_log(application.id, audit);
        Ok(())
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.applications.get(&id).cloned())
    }

    fn application_for_user(
        &self,
        id: ApplicationId,
        user_id: UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state
            .applications
            .get(&id)
            .filter(|application| application.user_id == user_id)
            .cloned())
    }

    fn applications_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| application.user_id == user_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.application_date.cmp(&a.application_date));
        Ok(applications)
    }

    fn all_applications(&self) -> Result<Vec<Application>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        let mut applications: Vec<Application> = state.applications.values().cloned().collect();
        applications.sort_by(|a, b| b.application_date.cmp(&a.application_date));
        Ok(applications)
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if state.applications.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.details.remove(&id);
        state.documents.retain(|_, doc| doc.application_id != id);
        state.logs.retain(|_, log| log.application_id != id);
        state
            .payments
            .retain(|_, payment| payment.application_id != id);
        Ok(())
    }

    fn insert_detail(
        &self,
        application_id: ApplicationId,
        detail: ServiceDetail,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.applications.contains_key(&application_id) {
            return Err(RepositoryError::NotFound);
        }
        if state.details.contains_key(&application_id) {
            return Err(RepositoryError::Conflict);
        }
        state.details.insert(application_id, detail);
        Ok(())
    }

    fn detail_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ServiceDetail>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.details.get(&application_id).cloned())
    }

    fn insert_document(&self, document: NewDocument) -> Result<Document, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.applications.contains_key(&document.application_id) {
            return Err(RepositoryError::NotFound);
        }

        state.next_document += 1;
        let document = Document {
            id: DocumentId(state.next_document),
            application_id: document.application_id,
            document_type: document.document_type,
            file_name: document.file_name,
            storage_key: document.storage_key,
            verification_status: VerificationStatus::Pending,
            uploaded_at: Utc::now(),
        };
        state.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn update_document(
        &self,
        document: &Document,
        audit: AuditEntry,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.documents.contains_key(&document.id) {
            return Err(RepositoryError::NotFound);
        }
        state.documents.insert(document.id, document.clone());
        state.append_log(document.application_id, audit);
        Ok(())
    }

    fn fetch_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.documents.get(&id).cloned())
    }

    fn reparent_document(
        &self,
        id: DocumentId,
        application_id: ApplicationId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.applications.contains_key(&application_id) {
            return Err(RepositoryError::NotFound);
        }
        match state.documents.get_mut(&id) {
            Some(document) => {
                document.application_id = application_id;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn documents_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state
            .documents
            .values()
            .filter(|document| document.application_id == application_id)
            .cloned()
            .collect())
    }

    fn documents_for_user(&self, user_id: UserId) -> Result<Vec<Document>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state
            .documents
            .values()
            .filter(|document| {
                state
                    .applications
                    .get(&document.application_id)
                    .is_some_and(|application| application.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    fn all_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        let mut documents: Vec<Document> = state.documents.values().cloned().collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(documents)
    }

    fn logs_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        let mut logs: Vec<ApplicationLog> = state
            .logs
            .values()
            .filter(|log| log.application_id == application_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(logs)
    }

    fn insert_payment(&self, payment: NewPayment) -> Result<Payment, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        if !state.applications.contains_key(&payment.application_id) {
            return Err(RepositoryError::NotFound);
        }

        state.next_payment += 1;
        let payment = Payment {
            id: PaymentId(state.next_payment),
            application_id: payment.application_id,
            amount_cents: payment.amount_cents,
            payment_method: payment.payment_method,
            transaction_reference: payment.transaction_reference,
            status: payment.status,
            payment_date: Utc::now(),
        };
        state.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    fn payments_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state
            .payments
            .values()
            .filter(|payment| payment.application_id == application_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Map-backed blob store that mints deterministic download URLs under a
/// configurable public base.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, StoredBlob>>,
    public_base_url: String,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("blob mutex poisoned").len()
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("blob mutex poisoned")
            .get(key)
            .map(|blob| blob.content_type.clone())
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("http://127.0.0.1:3000/blob")
    }
}

impl BlobStorage for InMemoryBlobStore {
    fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        let mut objects = self.objects.lock().expect("blob mutex poisoned");
        objects.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }

    fn presigned_get(&self, key: &str) -> Result<Option<String>, BlobError> {
        let objects = self.objects.lock().expect("blob mutex poisoned");
        Ok(objects.get(key).map(|blob| {
            format!(
                "{}/{}?expires=900&len={}",
                self.public_base_url.trim_end_matches('/'),
                key,
                blob.bytes.len()
            )
        }))
    }
}

/// Bearer-token table for environments without a real token issuer. Tokens
/// are opaque strings registered at bootstrap.
#[derive(Debug, Default)]
pub struct StaticBearerIdentity {
    tokens: Mutex<HashMap<String, UserId>>,
}

impl StaticBearerIdentity {
    pub fn register_token(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .insert(token.into(), user_id);
    }
}

impl IdentityProvider for StaticBearerIdentity {
    fn resolve_bearer(&self, token: &str) -> Result<UserId, IdentityError> {
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .get(token)
            .copied()
            .ok_or(IdentityError::Unauthenticated)
    }
}
