// Catalog master data: factions, roles, and starting contracts.
//
// Each catalog is a CSV file with the columns `id,name,description,icon,
// effective_from`. A faction or role may appear on several rows with the same
// id and different `effective_from` dates; only the latest revision in effect
// on the requested date is handed to the engine.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CatalogFilter, DataPaths};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which master table an item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKind {
    Faction,
    Role,
    Contract,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogKind::Faction => "faction",
            CatalogKind::Role => "role",
            CatalogKind::Contract => "contract",
        };
        f.write_str(s)
    }
}

/// The resolved, current view of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// File name of the icon, relative to the image directory.
    pub icon_ref: Option<String>,
}

impl CatalogItem {
    /// Build an item with only an id and name (descriptions and icons unset).
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CatalogItem {
            id: id.into(),
            name: name.into(),
            description: None,
            icon_ref: None,
        }
    }
}

/// One dated row of a catalog file. `effective_from == None` means the
/// revision has always been in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRevision {
    pub effective_from: Option<NaiveDate>,
    pub item: CatalogItem,
}

/// All three catalogs, already resolved to a single date.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub factions: Vec<CatalogItem>,
    pub roles: Vec<CatalogItem>,
    pub contracts: Vec<CatalogItem>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{kind} catalog {path} has no entries in effect")]
    Empty { kind: CatalogKind, path: PathBuf },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawCatalogRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    effective_from: String,
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse every revision row from a catalog CSV. Malformed rows are skipped
/// with a warning.
pub fn load_revisions_from_reader<R: Read>(
    rdr: R,
    kind: CatalogKind,
) -> Result<Vec<CatalogRevision>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut revisions = Vec::new();
    for result in reader.deserialize::<RawCatalogRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed {} row: {}", kind, e);
                continue;
            }
        };

        let id = raw.id.trim().to_string();
        let name = raw.name.trim().to_string();
        if id.is_empty() || name.is_empty() {
            warn!("skipping {} row with empty id or name", kind);
            continue;
        }

        let effective_from = match non_empty(&raw.effective_from) {
            None => None,
            Some(text) => match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("skipping {} '{}': bad effective_from '{}': {}", kind, name, text, e);
                    continue;
                }
            },
        };

        revisions.push(CatalogRevision {
            effective_from,
            item: CatalogItem {
                id,
                name,
                description: non_empty(&raw.description),
                icon_ref: non_empty(&raw.icon),
            },
        });
    }
    Ok(revisions)
}

/// Collapse revision rows into the current view as of `as_of`.
///
/// For each id the latest revision whose `effective_from` is on or before
/// `as_of` wins; undated revisions count as the earliest. Ids with no
/// revision in effect yet are dropped. Output order follows the first
/// appearance of each id in the input.
pub fn resolve_current(revisions: Vec<CatalogRevision>, as_of: NaiveDate) -> Vec<CatalogItem> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, CatalogRevision> = HashMap::new();

    for rev in revisions {
        if !order.contains(&rev.item.id) {
            order.push(rev.item.id.clone());
        }
        if rev.effective_from.is_some_and(|d| d > as_of) {
            continue;
        }
        let replace = match best.get(&rev.item.id) {
            None => true,
            Some(current) => rev.effective_from >= current.effective_from,
        };
        if replace {
            best.insert(rev.item.id.clone(), rev);
        }
    }

    order
        .into_iter()
        .filter_map(|id| best.remove(&id).map(|rev| rev.item))
        .collect()
}

/// Load one catalog file and resolve it to `as_of`.
pub fn load_catalog(
    path: &Path,
    kind: CatalogKind,
    as_of: NaiveDate,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let revisions = load_revisions_from_reader(file, kind).map_err(|e| CatalogError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    let items = resolve_current(revisions, as_of);
    if items.is_empty() {
        return Err(CatalogError::Empty {
            kind,
            path: path.to_path_buf(),
        });
    }
    debug!("loaded {} {} entries from {}", items.len(), kind, path.display());
    Ok(items)
}

impl Catalog {
    /// Load all three catalogs from the configured paths, relative to `base_dir`.
    pub fn load(base_dir: &Path, paths: &DataPaths, as_of: NaiveDate) -> Result<Self, CatalogError> {
        Ok(Catalog {
            factions: load_catalog(&base_dir.join(&paths.factions), CatalogKind::Faction, as_of)?,
            roles: load_catalog(&base_dir.join(&paths.roles), CatalogKind::Role, as_of)?,
            contracts: load_catalog(&base_dir.join(&paths.contracts), CatalogKind::Contract, as_of)?,
        })
    }

    /// Factions allowed by the session's filter. An empty include list keeps all.
    pub fn selected_factions(&self, filter: &CatalogFilter) -> Vec<CatalogItem> {
        apply_filter(&self.factions, &filter.factions, CatalogKind::Faction)
    }

    /// Roles allowed by the session's filter. An empty include list keeps all.
    pub fn selected_roles(&self, filter: &CatalogFilter) -> Vec<CatalogItem> {
        apply_filter(&self.roles, &filter.roles, CatalogKind::Role)
    }

    /// Look up any catalog item by kind and display name.
    pub fn find(&self, kind: CatalogKind, name: &str) -> Option<&CatalogItem> {
        let items = match kind {
            CatalogKind::Faction => &self.factions,
            CatalogKind::Role => &self.roles,
            CatalogKind::Contract => &self.contracts,
        };
        items.iter().find(|i| i.name == name)
    }
}

fn apply_filter(items: &[CatalogItem], include: &[String], kind: CatalogKind) -> Vec<CatalogItem> {
    if include.is_empty() {
        return items.to_vec();
    }
    for name in include {
        if !items.iter().any(|i| &i.name == name) {
            warn!("{} filter names unknown entry '{}'", kind, name);
        }
    }
    items
        .iter()
        .filter(|i| include.contains(&i.name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const ROLES_CSV: &str = "\
id,name,description,icon,effective_from
E1,Viktor Fiesler,Old text,viktor.png,
E2,Jill McDowell,,jill.png,
E1,Viktor Fiesler,Errata text,viktor_v2.png,2025-09-01
E3,Future Exec,Not out yet,,2030-01-01
";

    #[test]
    fn loads_rows_and_blanks_become_none() {
        let revs = load_revisions_from_reader(ROLES_CSV.as_bytes(), CatalogKind::Role).unwrap();
        assert_eq!(revs.len(), 4);
        assert_eq!(revs[1].item.name, "Jill McDowell");
        assert!(revs[1].item.description.is_none());
        assert_eq!(revs[1].item.icon_ref.as_deref(), Some("jill.png"));
        assert!(revs[0].effective_from.is_none());
        assert_eq!(revs[2].effective_from, Some(date("2025-09-01")));
    }

    #[test]
    fn resolve_picks_latest_revision_in_effect() {
        let revs = load_revisions_from_reader(ROLES_CSV.as_bytes(), CatalogKind::Role).unwrap();
        let items = resolve_current(revs, date("2026-01-01"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "E1");
        assert_eq!(items[0].description.as_deref(), Some("Errata text"));
        assert_eq!(items[1].id, "E2");
    }

    #[test]
    fn resolve_before_errata_keeps_original_text() {
        let revs = load_revisions_from_reader(ROLES_CSV.as_bytes(), CatalogKind::Role).unwrap();
        let items = resolve_current(revs, date("2025-08-31"));
        assert_eq!(items[0].description.as_deref(), Some("Old text"));
        assert_eq!(items[0].icon_ref.as_deref(), Some("viktor.png"));
    }

    #[test]
    fn future_only_entries_are_hidden() {
        let revs = load_revisions_from_reader(ROLES_CSV.as_bytes(), CatalogKind::Role).unwrap();
        let items = resolve_current(revs, date("2026-01-01"));
        assert!(items.iter().all(|i| i.id != "E3"));
        let later = load_revisions_from_reader(ROLES_CSV.as_bytes(), CatalogKind::Role).unwrap();
        let items = resolve_current(later, date("2030-06-01"));
        assert!(items.iter().any(|i| i.id == "E3"));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let csv = "id,name,description,icon,effective_from\n\
                   F1,USA,,,\n\
                   ,Nameless,,,\n\
                   F2,Italy,,,not-a-date\n\
                   F3,France,,,\n";
        let revs = load_revisions_from_reader(csv.as_bytes(), CatalogKind::Faction).unwrap();
        let names: Vec<&str> = revs.iter().map(|r| r.item.name.as_str()).collect();
        assert_eq!(names, vec!["USA", "France"]);
    }

    #[test]
    fn missing_optional_columns_default() {
        let csv = "id,name\nK1,Contract One\n";
        let revs = load_revisions_from_reader(csv.as_bytes(), CatalogKind::Contract).unwrap();
        assert_eq!(revs.len(), 1);
        assert!(revs[0].item.description.is_none());
        assert!(revs[0].effective_from.is_none());
    }

    #[test]
    fn filter_keeps_only_included_names() {
        let catalog = Catalog {
            factions: vec![
                CatalogItem::new("F1", "USA"),
                CatalogItem::new("F2", "Germany"),
                CatalogItem::new("F3", "Italy"),
            ],
            roles: vec![CatalogItem::new("E1", "Viktor Fiesler")],
            contracts: vec![],
        };
        let filter = CatalogFilter {
            factions: vec!["Italy".into(), "USA".into()],
            roles: vec![],
        };
        let factions = catalog.selected_factions(&filter);
        let names: Vec<&str> = factions.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["USA", "Italy"]);
        assert_eq!(catalog.selected_roles(&filter).len(), 1);
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let err = load_catalog(
            Path::new("/nonexistent/factions.csv"),
            CatalogKind::Faction,
            date("2026-01-01"),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn load_catalog_rejects_file_with_nothing_in_effect() {
        let tmp = std::env::temp_dir().join("catalog_test_nothing_in_effect");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("roles.csv");
        std::fs::write(&path, "id,name,description,icon,effective_from\nE9,Later,,,2099-01-01\n")
            .unwrap();

        let err = load_catalog(&path, CatalogKind::Role, date("2026-01-01")).unwrap_err();
        assert!(matches!(err, CatalogError::Empty { kind: CatalogKind::Role, .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
