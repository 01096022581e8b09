//! Tag rule engine
//!
//! Rules are plain data evaluated in declaration order by one loop. Only the
//! first `max_tags` tags survive, so declaration order doubles as priority:
//! the city and pricing tags come first and are never truncated away.

use serde::{Deserialize, Serialize};

use crate::model::ListingAttributes;

/// Characters removed from a city name to build its tag
const CITY_STRIP: [char; 3] = [' ', '-', '\''];

/// What makes a rule fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Any phrase appears in the listing text
    Phrases { any: Vec<String> },
    /// Every group has at least one phrase in the listing text
    Together { groups: Vec<Vec<String>> },
    /// A phrase appears and none of `unless` does
    Excluding {
        phrases: Vec<String>,
        unless: Vec<String>,
    },
    /// Price is known and at least `amount`
    PriceAtLeast { amount: f64 },
    /// Any of the nested triggers fires
    Either { triggers: Vec<Trigger> },
}

impl Trigger {
    fn fires(&self, text: &str, price: Option<f64>) -> bool {
        let any_in = |phrases: &[String]| phrases.iter().any(|p| text.contains(p.as_str()));

        match self {
            Trigger::Phrases { any } => any_in(any),
            Trigger::Together { groups } => {
                !groups.is_empty() && groups.iter().all(|group| any_in(group))
            }
            Trigger::Excluding { phrases, unless } => any_in(phrases) && !any_in(unless),
            Trigger::PriceAtLeast { amount } => price.is_some_and(|p| p >= *amount),
            Trigger::Either { triggers } => triggers.iter().any(|t| t.fires(text, price)),
        }
    }

    /// Every phrase this trigger looks for
    pub fn phrases(&self) -> Vec<&str> {
        match self {
            Trigger::Phrases { any } => any.iter().map(String::as_str).collect(),
            Trigger::Together { groups } => groups.iter().flatten().map(String::as_str).collect(),
            Trigger::Excluding { phrases, unless } => {
                phrases.iter().chain(unless).map(String::as_str).collect()
            }
            Trigger::PriceAtLeast { .. } => vec![],
            Trigger::Either { triggers } => triggers.iter().flat_map(Trigger::phrases).collect(),
        }
    }
}

/// Price precondition that enables or suppresses a rule
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceGate {
    #[default]
    Always,
    /// Price unknown or strictly below `amount`
    Below { amount: f64 },
}

impl PriceGate {
    fn admits(&self, price: Option<f64>) -> bool {
        match self {
            PriceGate::Always => true,
            PriceGate::Below { amount } => price.is_none_or(|p| p < *amount),
        }
    }
}

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    /// `#`-prefixed tag emitted when the rule fires
    pub tag: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub gate: PriceGate,
}

/// One rung of the price ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    /// Exclusive upper bound; `None` for the final catch-all band
    #[serde(default)]
    pub below: Option<f64>,
    pub tag: String,
}

/// Tag emitted from the bedroom count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedroomRule {
    pub bedrooms: u32,
    pub tag: String,
}

/// The complete, ordered tagging table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingRules {
    /// Output cap; later matches are dropped
    pub max_tags: usize,
    /// Listing types (case-insensitive) that get `lease_tag` instead of a price band
    pub lease_types: Vec<String>,
    pub lease_tag: String,
    /// Ascending price ladder
    pub price_ladder: Vec<PriceBand>,
    /// Keyword rules in priority order
    pub rules: Vec<TagRule>,
    /// Emitted when bedrooms are at least this many
    pub large_property: BedroomRule,
    /// Emitted when bedrooms are at most this many
    pub studio: BedroomRule,
}

impl Default for TaggingRules {
    fn default() -> Self {
        crate::rulebook::builtin::tagging_rules()
    }
}

/// Derives discovery tags from listing attributes
#[derive(Debug, Clone)]
pub struct TagEngine {
    rules: TaggingRules,
}

impl TagEngine {
    pub fn new(rules: TaggingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TaggingRules {
        &self.rules
    }

    /// Ordered tags for a listing, capped at `max_tags`
    pub fn generate_tags(&self, listing: &ListingAttributes) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        let price = listing.price.filter(|p| p.is_finite());

        if let Some(tag) = listing.city.as_deref().and_then(city_tag) {
            push_tag(&mut tags, tag);
        }

        if let Some(tag) = self.pricing_tag(listing.listing_type.as_deref(), price) {
            push_tag(&mut tags, tag.to_string());
        }

        let text = format!(
            "{} {}",
            listing.title,
            listing.description.as_deref().unwrap_or("")
        )
        .to_lowercase();

        for rule in &self.rules.rules {
            if rule.gate.admits(price) && rule.trigger.fires(&text, price) {
                tracing::trace!(tag = %rule.tag, "Tag rule matched");
                push_tag(&mut tags, rule.tag.clone());
            }
        }

        if let Some(tag) = self.bedroom_tag(listing.bedrooms) {
            push_tag(&mut tags, tag.to_string());
        }

        if tags.len() > self.rules.max_tags {
            tracing::debug!(
                dropped = ?&tags[self.rules.max_tags..],
                "Truncating tags to cap"
            );
            tags.truncate(self.rules.max_tags);
        }

        tags
    }

    /// `lease_tag` for rental-like listings, otherwise the price band
    pub fn pricing_tag(&self, listing_type: Option<&str>, price: Option<f64>) -> Option<&str> {
        let is_lease = listing_type.is_some_and(|t| {
            let t = t.trim();
            self.rules
                .lease_types
                .iter()
                .any(|lease| lease.eq_ignore_ascii_case(t))
        });
        if is_lease {
            return Some(&self.rules.lease_tag);
        }

        let price = price.filter(|p| p.is_finite())?;
        self.rules
            .price_ladder
            .iter()
            .find(|band| band.below.is_none_or(|bound| price < bound))
            .map(|band| band.tag.as_str())
    }

    fn bedroom_tag(&self, bedrooms: Option<u32>) -> Option<&str> {
        let bedrooms = bedrooms?;
        if bedrooms >= self.rules.large_property.bedrooms {
            Some(&self.rules.large_property.tag)
        } else if bedrooms <= self.rules.studio.bedrooms {
            Some(&self.rules.studio.tag)
        } else {
            None
        }
    }
}

impl Default for TagEngine {
    fn default() -> Self {
        Self::new(TaggingRules::default())
    }
}

/// `#` + city name with spaces, hyphens and apostrophes removed
pub fn city_tag(city: &str) -> Option<String> {
    let compact: String = city.trim().chars().filter(|c| !CITY_STRIP.contains(c)).collect();
    if compact.is_empty() {
        None
    } else {
        Some(format!("#{}", compact))
    }
}

fn push_tag(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}
