//! Affiliate link ranking for a substance.
//!
//! Given pre-fetched provider and link records, the ranking function
//! filters by hard eligibility rules and orders the survivors by a
//! weighted composite score:
//!
//! - base: provider quality score (0-100)
//! - +20 for a verified provider
//! - +15 / -10 for a regional match/mismatch against the requested region
//!   (no adjustment for "global" providers)
//! - +10 / +5 / +0 for budget / mid / premium price tiers
//! - plus the link's manual priority adjustment (may be negative)
//!
//! Ties are broken by provider name so the output is deterministic. An
//! empty result means "no promotable content", not an error.

use kompendium_core::types::{AffiliateLink, AffiliateProvider, PriceTier, ProviderId, SubstanceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default number of ranked links returned.
pub const DEFAULT_LIMIT: usize = 3;

/// Score bonus for verified providers.
pub const VERIFIED_BONUS: i32 = 20;

/// Score bonus for an exact regional match.
pub const REGION_MATCH_BONUS: i32 = 15;

/// Score penalty for a regional mismatch.
pub const REGION_MISMATCH_PENALTY: i32 = 10;

/// Region value meaning "ships everywhere"; exempt from regional scoring.
const GLOBAL_REGION: &str = "global";

/// Query parameters for ranking affiliate links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuery {
    /// The substance whose links are ranked.
    pub substance_id: SubstanceId,

    /// Requested shipping region, if any.
    pub region: Option<String>,

    /// Maximum number of results.
    pub limit: usize,

    /// Inclusive minimum provider quality score.
    pub min_quality: u8,

    /// Whether unverified providers are excluded outright.
    pub require_verified: bool,
}

impl RankQuery {
    /// Creates a query with the default limit and no further restrictions.
    #[must_use]
    pub fn new(substance_id: SubstanceId) -> Self {
        Self {
            substance_id,
            region: None,
            limit: DEFAULT_LIMIT,
            min_quality: 0,
            require_verified: false,
        }
    }

    /// Sets the requested region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the minimum provider quality score.
    #[must_use]
    pub fn with_min_quality(mut self, min_quality: u8) -> Self {
        self.min_quality = min_quality;
        self
    }

    /// Excludes unverified providers.
    #[must_use]
    pub fn verified_only(mut self) -> Self {
        self.require_verified = true;
        self
    }
}

/// A ranked affiliate link ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLink {
    /// The provider behind the link.
    pub provider_id: ProviderId,

    /// Provider display name.
    pub provider_name: String,

    /// Destination URL.
    pub url: String,

    /// Display label (custom label or the provider name).
    pub label: String,

    /// The composite score the entry was ranked by.
    pub score: i32,
}

/// Ranks candidate affiliate links for a substance.
///
/// Links are skipped when inactive, when they belong to a different
/// substance, when their provider is missing from the active set, when the
/// provider is unverified under `require_verified`, or when the provider's
/// quality score is below `min_quality`. Survivors are ordered by composite
/// score descending (provider name ascending on ties) and truncated to the
/// query limit.
#[must_use]
pub fn rank(
    query: &RankQuery,
    providers: &[AffiliateProvider],
    links: &[AffiliateLink],
) -> Vec<RankedLink> {
    let active_providers: HashMap<ProviderId, &AffiliateProvider> = providers
        .iter()
        .filter(|provider| provider.active)
        .map(|provider| (provider.id, provider))
        .collect();

    let mut ranked: Vec<RankedLink> = links
        .iter()
        .filter(|link| link.active && link.substance_id == query.substance_id)
        .filter_map(|link| {
            let provider = active_providers.get(&link.provider_id)?;
            if query.require_verified && !provider.verified {
                return None;
            }
            if provider.quality_score < query.min_quality {
                return None;
            }

            Some(RankedLink {
                provider_id: provider.id,
                provider_name: provider.name.clone(),
                url: link.url.clone(),
                label: link
                    .label
                    .clone()
                    .unwrap_or_else(|| provider.name.clone()),
                score: composite_score(link, provider, query.region.as_deref()),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.provider_name.cmp(&b.provider_name))
    });
    ranked.truncate(query.limit);

    debug!(
        substance = %query.substance_id,
        results = ranked.len(),
        "ranked affiliate links"
    );
    ranked
}

/// Computes the weighted composite score for one surviving link.
fn composite_score(
    link: &AffiliateLink,
    provider: &AffiliateProvider,
    region: Option<&str>,
) -> i32 {
    let mut score = i32::from(provider.quality_score);

    if provider.verified {
        score += VERIFIED_BONUS;
    }

    if let Some(requested) = region {
        if !provider.region.eq_ignore_ascii_case(GLOBAL_REGION) {
            if provider.region.eq_ignore_ascii_case(requested) {
                score += REGION_MATCH_BONUS;
            } else {
                score -= REGION_MISMATCH_PENALTY;
            }
        }
    }

    if let Some(tier) = provider.price_tier {
        score += tier_bonus(tier);
    }

    score + link.priority
}

const fn tier_bonus(tier: PriceTier) -> i32 {
    match tier {
        PriceTier::Budget => 10,
        PriceTier::Mid => 5,
        PriceTier::Premium => 0,
    }
}
