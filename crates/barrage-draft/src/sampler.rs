// Candidate pool sampler.
//
// Factions and roles are drawn without replacement with weight
// 1 / (recent_count + 1), so items seen in recent sessions come up less
// often. The two draws are independent and paired by position; the
// combination itself is not weighted. Contracts are drawn uniformly.

use barrage_core::catalog::{CatalogItem, CatalogKind};
use barrage_core::record::{UsageCounts, MAX_EXTRA_CANDIDATES, MAX_PLAYERS};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::pool::{CandidatePair, CandidatePool};

/// Everything the sampler needs for one session.
#[derive(Debug, Clone, Copy)]
pub struct PoolRequest<'a> {
    /// Filtered faction catalog.
    pub factions: &'a [CatalogItem],
    /// Filtered role catalog.
    pub roles: &'a [CatalogItem],
    pub contracts: &'a [CatalogItem],
    /// Appearance counts over the recent history window, keyed by name.
    pub usage: &'a UsageCounts,
    pub player_count: usize,
    /// Surplus pairs on top of one per player.
    pub extra: usize,
}

/// Selection weight for an item seen `count` times recently.
pub fn usage_weight(count: u32) -> f64 {
    1.0 / (f64::from(count) + 1.0)
}

/// Draw `n` items without replacement, weighting each by its recent usage.
/// The result is in random order.
pub fn weighted_sample<R, F>(
    items: &[CatalogItem],
    n: usize,
    kind: CatalogKind,
    count_of: F,
    rng: &mut R,
) -> Result<Vec<CatalogItem>, ConfigurationError>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> u32,
{
    if items.len() < n {
        return Err(ConfigurationError::InsufficientCandidates {
            kind,
            available: items.len(),
            required: n,
        });
    }

    let mut picked: Vec<CatalogItem> = items
        .choose_multiple_weighted(rng, n, |item| usage_weight(count_of(&item.name)))
        .map_err(|e| ConfigurationError::Sampling {
            kind,
            message: e.to_string(),
        })?
        .cloned()
        .collect();
    picked.shuffle(rng);
    Ok(picked)
}

/// Build the session's candidate pool.
pub fn sample_pool<R: Rng + ?Sized>(
    request: &PoolRequest<'_>,
    rng: &mut R,
) -> Result<CandidatePool, ConfigurationError> {
    if request.player_count == 0 || request.player_count > MAX_PLAYERS {
        return Err(ConfigurationError::PlayerCount {
            count: request.player_count,
            max: MAX_PLAYERS,
        });
    }
    if request.extra > MAX_EXTRA_CANDIDATES {
        return Err(ConfigurationError::ExtraCandidates {
            extra: request.extra,
            max: MAX_EXTRA_CANDIDATES,
        });
    }

    let n = request.player_count + request.extra;
    let usage = request.usage;

    let factions = weighted_sample(
        request.factions,
        n,
        CatalogKind::Faction,
        |name| usage.faction_count(name),
        rng,
    )?;
    let roles = weighted_sample(
        request.roles,
        n,
        CatalogKind::Role,
        |name| usage.role_count(name),
        rng,
    )?;

    if request.contracts.len() < request.player_count {
        return Err(ConfigurationError::InsufficientCandidates {
            kind: CatalogKind::Contract,
            available: request.contracts.len(),
            required: request.player_count,
        });
    }
    let contracts: Vec<CatalogItem> = request
        .contracts
        .choose_multiple(rng, request.player_count)
        .cloned()
        .collect();

    let pairs: Vec<CandidatePair> = factions
        .into_iter()
        .zip(roles)
        .map(|(faction, role)| CandidatePair::new(faction, role))
        .collect();

    debug!("sampled {} pairs and {} contracts", pairs.len(), contracts.len());
    Ok(CandidatePool::new(pairs, contracts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn items(prefix: &str, names: &[&str]) -> Vec<CatalogItem> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| CatalogItem::new(format!("{prefix}{}", i + 1), *name))
            .collect()
    }

    fn factions() -> Vec<CatalogItem> {
        items("F", &["USA", "Germany", "Italy", "France", "Netherlands"])
    }

    fn roles() -> Vec<CatalogItem> {
        items("E", &["Viktor", "Jill", "Graziano", "Wu", "Mahiri", "Anton"])
    }

    fn contracts() -> Vec<CatalogItem> {
        items("K", &["K-a", "K-b", "K-c", "K-d", "K-e"])
    }

    fn request<'a>(
        f: &'a [CatalogItem],
        r: &'a [CatalogItem],
        c: &'a [CatalogItem],
        usage: &'a UsageCounts,
        player_count: usize,
        extra: usize,
    ) -> PoolRequest<'a> {
        PoolRequest {
            factions: f,
            roles: r,
            contracts: c,
            usage,
            player_count,
            extra,
        }
    }

    #[test]
    fn usage_weight_values() {
        assert_eq!(usage_weight(0), 1.0);
        assert_eq!(usage_weight(1), 0.5);
        assert!((usage_weight(2) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn pool_sizes_match_request() {
        let (f, r, c) = (factions(), roles(), contracts());
        let usage = UsageCounts::default();
        let mut rng = StdRng::seed_from_u64(1);
        for extra in 0..=2 {
            let pool = sample_pool(&request(&f, &r, &c, &usage, 3, extra), &mut rng).unwrap();
            assert_eq!(pool.pairs().len(), 3 + extra);
            assert_eq!(pool.contracts().len(), 3);
        }
    }

    #[test]
    fn pool_has_no_repeated_items() {
        let (f, r, c) = (factions(), roles(), contracts());
        let usage = UsageCounts::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let pool = sample_pool(&request(&f, &r, &c, &usage, 4, 1), &mut rng).unwrap();
            let fs: HashSet<_> = pool.pairs().iter().map(|p| p.faction.id.clone()).collect();
            let rs: HashSet<_> = pool.pairs().iter().map(|p| p.role.id.clone()).collect();
            let cs: HashSet<_> = pool.contracts().iter().map(|c| c.id.clone()).collect();
            assert_eq!(fs.len(), 5);
            assert_eq!(rs.len(), 5);
            assert_eq!(cs.len(), 4);
        }
    }

    #[test]
    fn insufficient_factions() {
        let (f, r, c) = (factions(), roles(), contracts());
        let usage = UsageCounts::default();
        let err = sample_pool(&request(&f, &r, &c, &usage, 4, 2), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InsufficientCandidates {
                kind: CatalogKind::Faction,
                available: 5,
                required: 6,
            }
        );
    }

    #[test]
    fn insufficient_roles() {
        let f = factions();
        let r = items("E", &["Viktor", "Jill"]);
        let c = contracts();
        let usage = UsageCounts::default();
        let err = sample_pool(&request(&f, &r, &c, &usage, 3, 0), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InsufficientCandidates { kind: CatalogKind::Role, available: 2, required: 3 }
        ));
    }

    #[test]
    fn insufficient_contracts() {
        let (f, r) = (factions(), roles());
        let c = items("K", &["only"]);
        let usage = UsageCounts::default();
        let err = sample_pool(&request(&f, &r, &c, &usage, 2, 0), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InsufficientCandidates { kind: CatalogKind::Contract, .. }
        ));
    }

    #[test]
    fn rejects_bad_player_and_extra_counts() {
        let (f, r, c) = (factions(), roles(), contracts());
        let usage = UsageCounts::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_pool(&request(&f, &r, &c, &usage, 0, 0), &mut rng),
            Err(ConfigurationError::PlayerCount { .. })
        ));
        assert!(matches!(
            sample_pool(&request(&f, &r, &c, &usage, 2, 3), &mut rng),
            Err(ConfigurationError::ExtraCandidates { extra: 3, .. })
        ));
    }

    fn share_of_a(counts_b: u32, seed: u64) -> f64 {
        let ab = items("X", &["A", "B"]);
        let mut usage = UsageCounts::default();
        usage.factions.insert("A".into(), 0);
        usage.factions.insert("B".into(), counts_b);
        let mut rng = StdRng::seed_from_u64(seed);
        let trials = 20_000;
        let mut a = 0;
        for _ in 0..trials {
            let picked = weighted_sample(
                &ab,
                1,
                CatalogKind::Faction,
                |name| usage.faction_count(name),
                &mut rng,
            )
            .unwrap();
            if picked[0].name == "A" {
                a += 1;
            }
        }
        f64::from(a) / f64::from(trials)
    }

    #[test]
    fn weighted_draw_favours_unseen_item() {
        // A weight 1, B weight 1/2.
        let p = share_of_a(1, 11);
        assert!((p - 2.0 / 3.0).abs() < 0.02, "P(A) = {p}");
    }

    #[test]
    fn weighted_draw_with_b_seen_twice() {
        // A weight 1, B weight 1/3.
        let p = share_of_a(2, 12);
        assert!((p - 0.75).abs() < 0.02, "P(A) = {p}");
    }

    #[test]
    fn pairing_is_positional_and_deterministic_per_seed() {
        let (f, r, c) = (factions(), roles(), contracts());
        let usage = UsageCounts::default();
        let a = sample_pool(&request(&f, &r, &c, &usage, 2, 1), &mut StdRng::seed_from_u64(5)).unwrap();
        let b = sample_pool(&request(&f, &r, &c, &usage, 2, 1), &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
        for pair in a.pairs() {
            assert_eq!(pair.id, format!("{}+{}", pair.faction.id, pair.role.id));
        }
    }
}
