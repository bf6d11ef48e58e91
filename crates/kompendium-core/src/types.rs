//! Domain types for the contextual entity linking subsystem.
//!
//! The catalog system owns the persistent representation of these records;
//! within this workspace they are read-only snapshots:
//!
//! - A substance carries its display name, routable slug, synonyms, and the
//!   curation metadata (evidence score, risk classification, monetization
//!   gates) that drives linking eligibility.
//! - Affiliate providers and links are supplied pre-fetched by the caller
//!   and only ever filtered and scored here.
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a substance in the catalog.
///
/// Wraps a UUID v4, providing type safety to distinguish substance IDs from
/// other UUID-based identifiers in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstanceId(pub Uuid);

impl SubstanceId {
    /// Creates a new random SubstanceId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SubstanceId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubstanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for an affiliate provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub Uuid);

impl ProviderId {
    /// Creates a new random ProviderId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ProviderId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProviderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ============================================================================
// Classification Types
// ============================================================================

/// Risk classification of a substance.
///
/// Ordered from lowest to highest concern; `Unknown` sorts above `High`
/// because an unclassified substance must not be treated as safe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low-risk, well-characterized substance.
    Low,
    /// Moderate risk.
    Moderate,
    /// High risk; excluded from autolinking unless explicitly whitelisted
    /// or the caller opts in.
    High,
    /// Not yet classified.
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Returns true for the high-risk classification.
    #[must_use]
    pub const fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Price positioning of an affiliate provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    /// Lowest price segment.
    Budget,
    /// Middle price segment.
    Mid,
    /// Highest price segment.
    Premium,
}

// ============================================================================
// Core Domain Types
// ============================================================================

/// A catalog-backed substance record.
///
/// Substances are created and updated by the external catalog system and
/// treated as read-only snapshots for the duration of one dictionary build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substance {
    /// Unique identifier for this substance.
    pub id: SubstanceId,

    /// Display name (e.g. "Psilocybin").
    pub name: String,

    /// Routable slug for the detail page (e.g. "psilocybin").
    pub slug: String,

    /// Curation/confidence metric, 0-100. Higher values indicate more
    /// curated and verified content.
    pub evidence_score: u8,

    /// Risk classification.
    pub risk_level: RiskLevel,

    /// Whether this substance may be monetized (and therefore autolinked).
    pub monetization_enabled: bool,

    /// Explicit override allowing a high-risk substance to be autolinked.
    pub autolink_whitelisted: bool,

    /// Alternate names the substance is known under.
    pub synonyms: Vec<String>,

    /// When the catalog last updated this record.
    pub updated_at: DateTime<Utc>,
}

impl Substance {
    /// Creates a builder for constructing a Substance.
    #[must_use]
    pub fn builder() -> SubstanceBuilder {
        SubstanceBuilder::default()
    }
}

/// Builder for constructing Substance instances.
///
/// Defaults produce an ineligible record (zero evidence, monetization off,
/// unknown risk); callers opt fields in explicitly.
#[derive(Debug, Default)]
pub struct SubstanceBuilder {
    id: Option<SubstanceId>,
    name: String,
    slug: String,
    evidence_score: u8,
    risk_level: RiskLevel,
    monetization_enabled: bool,
    autolink_whitelisted: bool,
    synonyms: Vec<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl SubstanceBuilder {
    /// Sets the substance ID (generates a new one if not set).
    #[must_use]
    pub fn id(mut self, id: SubstanceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the routable slug.
    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Sets the evidence score (0-100).
    #[must_use]
    pub fn evidence_score(mut self, score: u8) -> Self {
        self.evidence_score = score;
        self
    }

    /// Sets the risk classification.
    #[must_use]
    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    /// Enables or disables monetization.
    #[must_use]
    pub fn monetization_enabled(mut self, enabled: bool) -> Self {
        self.monetization_enabled = enabled;
        self
    }

    /// Sets the autolink whitelist override.
    #[must_use]
    pub fn autolink_whitelisted(mut self, whitelisted: bool) -> Self {
        self.autolink_whitelisted = whitelisted;
        self
    }

    /// Sets the synonym list.
    #[must_use]
    pub fn synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Adds a single synonym.
    #[must_use]
    pub fn synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    /// Sets the catalog update timestamp (defaults to now).
    #[must_use]
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the Substance.
    #[must_use]
    pub fn build(self) -> Substance {
        Substance {
            id: self.id.unwrap_or_default(),
            name: self.name,
            slug: self.slug,
            evidence_score: self.evidence_score,
            risk_level: self.risk_level,
            monetization_enabled: self.monetization_enabled,
            autolink_whitelisted: self.autolink_whitelisted,
            synonyms: self.synonyms,
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

/// An affiliate provider offering products related to catalog substances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateProvider {
    /// Unique identifier for this provider.
    pub id: ProviderId,

    /// Display name of the provider.
    pub name: String,

    /// Whether the provider has passed manual verification.
    pub verified: bool,

    /// Editorial quality score, 0-100.
    pub quality_score: u8,

    /// Geographic region the provider ships to, or "global".
    pub region: String,

    /// Price positioning, if known.
    pub price_tier: Option<PriceTier>,

    /// Whether the provider is currently active. Inactive providers
    /// disqualify all of their links.
    pub active: bool,
}

/// A candidate affiliate link connecting a substance to a provider offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateLink {
    /// The provider this link belongs to.
    pub provider_id: ProviderId,

    /// The substance this link promotes.
    pub substance_id: SubstanceId,

    /// Destination URL.
    pub url: String,

    /// Optional custom label; falls back to the provider name.
    pub label: Option<String>,

    /// Manual ranking adjustment, may be negative.
    pub priority: i32,

    /// Whether the link is currently active.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substance_id_display_roundtrip() {
        let id = SubstanceId::new();
        let parsed: SubstanceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn substance_id_from_str_invalid() {
        assert!("not-a-uuid".parse::<SubstanceId>().is_err());
    }

    #[test]
    fn provider_id_display_roundtrip() {
        let id = ProviderId::new();
        let parsed: ProviderId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn substance_id_serde_transparent() {
        let id = SubstanceId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));

        let parsed: SubstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn risk_level_serde_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
        let parsed: RiskLevel = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(parsed, RiskLevel::Moderate);
    }

    #[test]
    fn risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Unknown);
    }

    #[test]
    fn risk_level_is_high() {
        assert!(RiskLevel::High.is_high());
        assert!(!RiskLevel::Unknown.is_high());
        assert!(!RiskLevel::Low.is_high());
    }

    #[test]
    fn risk_level_display() {
        assert_eq!(RiskLevel::Low.to_string(), "low");
        assert_eq!(RiskLevel::Unknown.to_string(), "unknown");
    }

    #[test]
    fn price_tier_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PriceTier::Budget).unwrap(),
            "\"budget\""
        );
        let parsed: PriceTier = serde_json::from_str("\"premium\"").unwrap();
        assert_eq!(parsed, PriceTier::Premium);
    }

    #[test]
    fn substance_builder_defaults() {
        let substance = Substance::builder().name("Psilocybin").build();

        assert_eq!(substance.name, "Psilocybin");
        assert_eq!(substance.slug, "");
        assert_eq!(substance.evidence_score, 0);
        assert_eq!(substance.risk_level, RiskLevel::Unknown);
        assert!(!substance.monetization_enabled);
        assert!(!substance.autolink_whitelisted);
        assert!(substance.synonyms.is_empty());
    }

    #[test]
    fn substance_builder_full() {
        let id = SubstanceId::new();
        let substance = Substance::builder()
            .id(id)
            .name("MDMA")
            .slug("mdma")
            .evidence_score(85)
            .risk_level(RiskLevel::Moderate)
            .monetization_enabled(true)
            .synonym("Ecstasy")
            .synonym("Molly")
            .build();

        assert_eq!(substance.id, id);
        assert_eq!(substance.slug, "mdma");
        assert_eq!(substance.evidence_score, 85);
        assert_eq!(substance.synonyms, vec!["Ecstasy", "Molly"]);
    }

    #[test]
    fn substance_serde_roundtrip() {
        let substance = Substance::builder()
            .name("Ketamin")
            .slug("ketamin")
            .evidence_score(60)
            .risk_level(RiskLevel::High)
            .monetization_enabled(true)
            .autolink_whitelisted(true)
            .build();

        let json = serde_json::to_string(&substance).unwrap();
        let parsed: Substance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, substance);
    }
}
