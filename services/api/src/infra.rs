use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use land_registry::config::StorageConfig;
use land_registry::workflows::applications::{
    InMemoryBlobStore, InMemoryRegistry, NewOfficer, NewUser, RegistryApplicationService,
    RegistryRepository, StaticBearerIdentity, UserRole,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) struct Providers {
    pub(crate) repository: Arc<InMemoryRegistry>,
    pub(crate) identity: Arc<StaticBearerIdentity>,
    pub(crate) service: Arc<RegistryApplicationService<InMemoryRegistry, InMemoryBlobStore>>,
}

/// Wire the in-memory providers and seed the accounts the portal needs to be
/// usable out of the box: one demo citizen and one provisioned officer, each
/// reachable under a fixed bearer token. A real deployment swaps the identity
/// provider for the office's token issuer.
pub(crate) fn bootstrap_providers(storage: &StorageConfig) -> Providers {
    let repository = Arc::new(InMemoryRegistry::default());
    let blobs = Arc::new(InMemoryBlobStore::new(storage.public_base_url.clone()));
    let identity = Arc::new(StaticBearerIdentity::default());
    let service = Arc::new(RegistryApplicationService::new(
        Arc::clone(&repository),
        Arc::clone(&blobs),
    ));

    seed_accounts(&repository, &identity);

    Providers {
        repository,
        identity,
        service,
    }
}

pub(crate) const DEMO_CITIZEN_TOKEN: &str = "demo-citizen";
pub(crate) const DEMO_OFFICER_TOKEN: &str = "demo-officer";

fn seed_accounts(repository: &Arc<InMemoryRegistry>, identity: &Arc<StaticBearerIdentity>) {
    let citizen = repository
        .insert_user(NewUser {
            full_name: "Demo Citizen".to_string(),
            nic_number: "900000000V".to_string(),
            email: "citizen@demo.local".to_string(),
            phone_number: None,
            password_hash: "$argon2id$seed".to_string(),
            role: UserRole::Citizen,
        })
        .expect("seed citizen inserted into empty store");
    identity.register_token(DEMO_CITIZEN_TOKEN, citizen.id);

    let officer_user = repository
        .insert_user(NewUser {
            full_name: "Demo Officer".to_string(),
            nic_number: "800000000V".to_string(),
            email: "officer@demo.local".to_string(),
            phone_number: None,
            password_hash: "$argon2id$seed".to_string(),
            role: UserRole::Officer,
        })
        .expect("seed officer user inserted into empty store");
    repository
        .insert_officer(NewOfficer {
            user_id: officer_user.id,
            employee_id: "LRO-0001".to_string(),
            assigned_office: Some("Head Office".to_string()),
            role: Some("Registrar".to_string()),
        })
        .expect("seed officer profile inserted into empty store");
    identity.register_token(DEMO_OFFICER_TOKEN, officer_user.id);
}

pub(crate) fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
