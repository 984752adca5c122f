use serde::{Deserialize, Serialize};

use super::domain::{Service, ServiceId, ServiceKind, StatusId};

/// One entry of the application-status catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: StatusId,
    pub name: String,
}

/// Ordered reference data for application statuses. The first entry is the
/// status every new application starts in; transition targets must resolve
/// here.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    entries: Vec<StatusEntry>,
}

impl StatusCatalog {
    pub fn new(entries: Vec<StatusEntry>) -> Self {
        Self { entries }
    }

    /// Pending, Under Review, Approved, Rejected.
    pub fn standard() -> Self {
        let entries = ["Pending", "Under Review", "Approved", "Rejected"]
            .into_iter()
            .enumerate()
            .map(|(index, name)| StatusEntry {
                id: StatusId(index as u64 + 1),
                name: name.to_string(),
            })
            .collect();
        Self { entries }
    }

    pub fn initial(&self) -> &StatusEntry {
        &self.entries[0]
    }

    pub fn get(&self, id: StatusId) -> Option<&StatusEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }
}

/// Immutable service reference data.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: Vec<Service>,
}

impl ServiceCatalog {
    pub fn new(entries: Vec<Service>) -> Self {
        Self { entries }
    }

    /// The five request families offered by the registry office.
    pub fn standard() -> Self {
        let seeds = [
            ("Land Transfer", "LT", ServiceKind::LandTransfer, 100_000),
            (
                "Copy of Land Registers",
                "CR",
                ServiceKind::CopyOfRegister,
                50_000,
            ),
            (
                "Search of Land Registers",
                "SR",
                ServiceKind::SearchOfRegister,
                25_000,
            ),
            (
                "Search/Duplicate of Deeds",
                "DD",
                ServiceKind::DuplicateDeeds,
                75_000,
            ),
            ("Copy of Document", "CD", ServiceKind::CopyOfDocument, 30_000),
        ];

        let entries = seeds
            .into_iter()
            .enumerate()
            .map(|(index, (name, code, kind, base_fee_cents))| Service {
                id: ServiceId(index as u64 + 1),
                name: name.to_string(),
                code: code.to_string(),
                kind,
                base_fee_cents,
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: ServiceId) -> Option<&Service> {
        self.entries.iter().find(|service| service.id == id)
    }

    pub fn by_code(&self, code: &str) -> Option<&Service> {
        self.entries
            .iter()
            .find(|service| service.code.eq_ignore_ascii_case(code))
    }

    pub fn entries(&self) -> &[Service] {
        &self.entries
    }
}
