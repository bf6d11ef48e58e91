//! Core domain types for the kompendium entity linking subsystem.
//!
//! This crate defines the catalog-backed records shared by the dictionary,
//! autolink, and ranking components: substances with their synonyms and
//! curation metadata, and the affiliate provider/link records consumed by
//! the ranking function.

pub mod types;

pub use types::{
    AffiliateLink, AffiliateProvider, PriceTier, ProviderId, RiskLevel, Substance,
    SubstanceBuilder, SubstanceId,
};
