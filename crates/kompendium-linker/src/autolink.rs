//! First-mention autolinking of substance names in markdown/MDX source.
//!
//! The engine scans a document line by line, classifies each line as
//! linkable or protected, and rewrites the first unlinked mention of each
//! eligible substance into a link to its detail page. Matching is
//! exact-substring, case-insensitive, and word-boundary-delimited; there is
//! no fuzzy matching and no regex. The scanner is an explicit state machine
//! over lines plus a manual substring search with boundary checks.
//!
//! ## Protected zones
//!
//! Never rewritten:
//! - fenced code blocks (``` or ~~~) and the fence lines themselves
//! - explicit no-link spans delimited by [`NOLINK_OPEN`] / [`NOLINK_CLOSE`]
//! - headings, `import`/`export` directives, upper-case-initial component
//!   tags (MDX)
//! - existing markdown link spans and inline code within a line
//!
//! ## Determinism
//!
//! Candidates are pre-sorted (longest key first, ties by key order) before
//! any mutation begins, so the output is a pure function of
//! (source, dictionary, config). Running the engine over its own output
//! changes nothing: substances whose destination link already occurs in the
//! document are skipped, and occurrences inside generated link markup are
//! rejected by the overlap checks.

use crate::dictionary::SubstanceDictionary;
use kompendium_core::types::{Substance, SubstanceId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Default inclusive minimum evidence score for linkable substances.
pub const DEFAULT_MIN_EVIDENCE_SCORE: u8 = 40;

/// Default route prefix for substance detail pages.
pub const DEFAULT_ROUTE_PREFIX: &str = "/substanzen";

/// Marker line opening an explicit no-link span.
pub const NOLINK_OPEN: &str = "<!-- autolink:off -->";

/// Marker line closing an explicit no-link span.
pub const NOLINK_CLOSE: &str = "<!-- autolink:on -->";

/// Minimum key length (in characters) considered for matching. Shorter keys
/// produce pathological single-character matches and are dropped.
const MIN_KEY_CHARS: usize = 2;

/// Line prefixes that toggle fenced-code state.
const FENCE_MARKERS: [&str; 2] = ["```", "~~~"];

/// Characters that delimit a word besides whitespace.
const BOUNDARY_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '<', '>', '"', '\'', '/', '-',
    '*', '_', '„', '“', '”', '«', '»',
];

/// Configuration for the autolink engine.
#[derive(Debug, Clone)]
pub struct AutolinkConfig {
    /// Inclusive minimum evidence score a substance needs to be linked.
    pub min_evidence_score: u8,

    /// Whether high-risk substances may be linked without an explicit
    /// whitelist entry.
    pub allow_high_risk: bool,

    /// Route prefix the generated links point at.
    pub route_prefix: String,
}

impl Default for AutolinkConfig {
    fn default() -> Self {
        Self {
            min_evidence_score: DEFAULT_MIN_EVIDENCE_SCORE,
            allow_high_risk: false,
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
        }
    }
}

impl AutolinkConfig {
    /// Creates a configuration with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum evidence score.
    #[must_use]
    pub fn with_min_evidence_score(mut self, score: u8) -> Self {
        self.min_evidence_score = score;
        self
    }

    /// Allows or forbids linking high-risk substances without a whitelist.
    #[must_use]
    pub fn with_allow_high_risk(mut self, allow: bool) -> Self {
        self.allow_high_risk = allow;
        self
    }

    /// Sets the route prefix for generated links.
    #[must_use]
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }
}

/// Result of one autolink pass: the annotated text plus the substances that
/// were linked, ordered by first appearance.
///
/// Produced fresh per invocation; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AutolinkOutcome {
    /// The annotated source text.
    pub text: String,

    /// Substances linked by this pass, ordered by first appearance in the
    /// document, deduplicated.
    pub linked: Vec<SubstanceId>,
}

impl AutolinkOutcome {
    fn unchanged(source: &str) -> Self {
        Self {
            text: source.to_string(),
            linked: Vec::new(),
        }
    }
}

/// A linkable substance with the single key it is matched under.
#[derive(Debug)]
struct Candidate<'a> {
    id: SubstanceId,
    key: &'a str,
    slug: &'a str,
}

/// Annotates `source` with links to substance detail pages.
///
/// Each eligible substance is linked at most once, on the first line (in
/// document order) where an eligible, unprotected, non-overlapping
/// occurrence of its key is found. The match is replaced preserving its
/// surface casing. Empty source or empty dictionary short-circuits to
/// "no change, no links".
#[must_use]
pub fn autolink(
    source: &str,
    dictionary: &SubstanceDictionary,
    config: &AutolinkConfig,
) -> AutolinkOutcome {
    if source.is_empty() || dictionary.is_empty() {
        return AutolinkOutcome::unchanged(source);
    }

    let candidates = select_candidates(dictionary, config, source);
    if candidates.is_empty() {
        return AutolinkOutcome::unchanged(source);
    }

    let mut linked: Vec<SubstanceId> = Vec::new();
    let mut linked_set: HashSet<SubstanceId> = HashSet::new();
    let mut in_fence = false;
    let mut in_nolink = false;
    let mut out: Vec<String> = Vec::new();

    for raw in source.split('\n') {
        let trimmed = raw.trim();

        // Fence toggles and no-link markers always pass through unmodified.
        if is_fence(trimmed) {
            in_fence = !in_fence;
            out.push(raw.to_string());
            continue;
        }
        if in_fence {
            out.push(raw.to_string());
            continue;
        }
        if trimmed == NOLINK_OPEN {
            in_nolink = true;
            out.push(raw.to_string());
            continue;
        }
        if trimmed == NOLINK_CLOSE {
            in_nolink = false;
            out.push(raw.to_string());
            continue;
        }
        if in_nolink || is_protected_line(trimmed) {
            out.push(raw.to_string());
            continue;
        }

        let mut line = raw.to_string();
        let mut line_links: Vec<(usize, SubstanceId)> = Vec::new();

        for candidate in &candidates {
            if linked_set.contains(&candidate.id) {
                continue;
            }
            if let Some((start, len)) = find_linkable(&line, candidate.key) {
                let matched = line[start..start + len].to_string();
                let replacement =
                    format!("[{}]({}/{})", matched, config.route_prefix, candidate.slug);
                line.replace_range(start..start + len, &replacement);
                linked_set.insert(candidate.id);
                line_links.push((start, candidate.id));
            }
        }

        // Report links in appearance order, not candidate order.
        line_links.sort_by_key(|(start, _)| *start);
        linked.extend(line_links.into_iter().map(|(_, id)| id));
        out.push(line);
    }

    AutolinkOutcome {
        text: out.join("\n"),
        linked,
    }
}

/// Selects and orders the linkable candidates for one pass.
///
/// Dictionary iteration order is made deterministic by sorting keys before
/// selection; per substance only the longest key survives (ties keep the
/// first in key order). The final list is sorted longest key first so a
/// multi-word synonym is matched before a shorter substring it contains.
fn select_candidates<'a>(
    dictionary: &'a SubstanceDictionary,
    config: &AutolinkConfig,
    source: &str,
) -> Vec<Candidate<'a>> {
    let mut entries: Vec<(&'a String, &'a Substance)> = dictionary.entries().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut candidates: Vec<Candidate<'a>> = Vec::new();
    let mut position: HashMap<SubstanceId, usize> = HashMap::new();

    for (key, substance) in entries {
        if !substance.monetization_enabled {
            continue;
        }
        if substance.evidence_score < config.min_evidence_score {
            continue;
        }
        if substance.risk_level.is_high()
            && !config.allow_high_risk
            && !substance.autolink_whitelisted
        {
            continue;
        }
        if substance.slug.trim().is_empty() {
            debug!(substance = %substance.id, "skipping substance without slug");
            continue;
        }
        if key.chars().count() < MIN_KEY_CHARS {
            debug!(key = %key, "skipping too-short dictionary key");
            continue;
        }

        match position.get(&substance.id) {
            Some(&idx) => {
                if key.chars().count() > candidates[idx].key.chars().count() {
                    candidates[idx].key = key.as_str();
                }
            }
            None => {
                position.insert(substance.id, candidates.len());
                candidates.push(Candidate {
                    id: substance.id,
                    key: key.as_str(),
                    slug: substance.slug.as_str(),
                });
            }
        }
    }

    // A substance whose destination link already occurs in the document is
    // considered linked; this makes a second pass over our own output a
    // no-op.
    candidates.retain(|candidate| {
        !source.contains(&format!("]({}/{})", config.route_prefix, candidate.slug))
    });

    candidates.sort_by(|a, b| b.key.chars().count().cmp(&a.key.chars().count()));
    candidates
}

fn is_fence(trimmed: &str) -> bool {
    FENCE_MARKERS.iter().any(|marker| trimmed.starts_with(marker))
}

/// Protected independent of scanner state: headings, module directives, and
/// upper-case-initial component tags.
fn is_protected_line(trimmed: &str) -> bool {
    trimmed.starts_with('#')
        || trimmed.starts_with("import ")
        || trimmed.starts_with("export ")
        || is_component_tag(trimmed)
}

fn is_component_tag(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Finds the first valid occurrence of `key` in `line`.
///
/// Returns the byte offset and byte length of the match. A position is
/// valid if both sides sit on a word boundary and the position is neither
/// inside an existing markdown link span nor inside inline code.
fn find_linkable(line: &str, key: &str) -> Option<(usize, usize)> {
    for (i, _) in line.char_indices() {
        if !boundary_before(line, i) {
            continue;
        }
        let Some(len) = match_ignore_case(&line[i..], key) else {
            continue;
        };
        if !boundary_after(line, i + len) {
            continue;
        }
        if inside_link_span(line, i) || inside_inline_code(line, i) {
            continue;
        }
        return Some((i, len));
    }
    None
}

/// Case-insensitively matches `needle` at the start of `haystack`,
/// returning the number of haystack bytes consumed.
fn match_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let mut haystack_chars = haystack.chars();
    let mut consumed = 0;

    for needle_char in needle.chars() {
        let haystack_char = haystack_chars.next()?;
        if !haystack_char.to_lowercase().eq(needle_char.to_lowercase()) {
            return None;
        }
        consumed += haystack_char.len_utf8();
    }

    Some(consumed)
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c)
}

fn boundary_before(line: &str, pos: usize) -> bool {
    match line[..pos].chars().next_back() {
        Some(c) => is_boundary(c),
        None => true,
    }
}

fn boundary_after(line: &str, end: usize) -> bool {
    match line[end..].chars().next() {
        Some(c) => is_boundary(c),
        None => true,
    }
}

/// Detects whether `pos` falls inside an existing markdown link, either in
/// the anchor text (`[here](...)`) or the destination (`[...](here)`).
fn inside_link_span(line: &str, pos: usize) -> bool {
    let before = &line[..pos];

    // Unmatched opening bracket behind us plus a link-destination marker
    // ahead: we are inside the anchor text.
    if let Some(open) = before.rfind('[') {
        if !before[open..].contains(']') {
            let after = &line[pos..];
            if let Some(close) = after.find(']') {
                if after[close..].starts_with("](") {
                    return true;
                }
            }
        }
    }

    // Unclosed "](" behind us: we are inside the destination.
    if let Some(dest) = before.rfind("](") {
        if !before[dest..].contains(')') {
            return true;
        }
    }

    false
}

/// An odd number of backtick delimiters before `pos` puts the position
/// inside an inline code span.
fn inside_inline_code(line: &str, pos: usize) -> bool {
    line[..pos].chars().filter(|c| *c == '`').count() % 2 == 1
}
