//! Contextual entity linking and ranking for the kompendium platform.
//!
//! Three components share one concern, substance-centric content
//! enrichment:
//!
//! - [`dictionary`] builds and caches the case-folded lookup map from every
//!   known substance name, slug, and synonym to its catalog record.
//! - [`autolink`] annotates markdown/MDX source text with links to
//!   substance detail pages, first mention only, respecting structural
//!   protected zones.
//! - [`ranking`] selects the best affiliate provider links for a substance
//!   via hard eligibility filters and a weighted composite score.
//!
//! Build, autolink, and rank are synchronous pure functions over their
//! inputs; the only shared mutable state is the dictionary cache, which
//! publishes whole snapshots atomically.

pub mod autolink;
pub mod dictionary;
pub mod error;
pub mod ranking;

pub use autolink::{autolink, AutolinkConfig, AutolinkOutcome};
pub use dictionary::{CatalogSource, DictionaryCache, DictionaryConfig, SubstanceDictionary};
pub use error::{LinkerError, LinkerResult};
pub use ranking::{rank, RankQuery, RankedLink};
