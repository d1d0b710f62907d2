// Candidate pool: the faction/role pairs and contracts still available.

use barrage_core::catalog::CatalogItem;
use serde::{Deserialize, Serialize};

/// A faction and a role offered together. Picked and removed as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    /// `"<faction id>+<role id>"`, unique within a pool.
    pub id: String,
    pub faction: CatalogItem,
    pub role: CatalogItem,
}

impl CandidatePair {
    pub fn new(faction: CatalogItem, role: CatalogItem) -> Self {
        CandidatePair {
            id: format!("{}+{}", faction.id, role.id),
            faction,
            role,
        }
    }

    /// "Faction / Role", as shown in lists.
    pub fn label(&self) -> String {
        format!("{} / {}", self.faction.name, self.role.name)
    }
}

/// What is left to pick. Items only ever leave the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    pairs: Vec<CandidatePair>,
    contracts: Vec<CatalogItem>,
}

impl CandidatePool {
    pub fn new(pairs: Vec<CandidatePair>, contracts: Vec<CatalogItem>) -> Self {
        CandidatePool { pairs, contracts }
    }

    pub fn pairs(&self) -> &[CandidatePair] {
        &self.pairs
    }

    pub fn contracts(&self) -> &[CatalogItem] {
        &self.contracts
    }

    pub fn pair(&self, id: &str) -> Option<&CandidatePair> {
        self.pairs.iter().find(|p| p.id == id)
    }

    pub fn contract(&self, id: &str) -> Option<&CatalogItem> {
        self.contracts.iter().find(|c| c.id == id)
    }

    /// Remove and return the pair with `id`.
    pub fn take_pair(&mut self, id: &str) -> Option<CandidatePair> {
        let idx = self.pairs.iter().position(|p| p.id == id)?;
        Some(self.pairs.remove(idx))
    }

    /// Remove and return the contract with `id`.
    pub fn take_contract(&mut self, id: &str) -> Option<CatalogItem> {
        let idx = self.contracts.iter().position(|c| c.id == id)?;
        Some(self.contracts.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.contracts.is_empty()
    }
}
