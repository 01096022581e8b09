//! Compiled-in rule tables

use std::collections::{BTreeMap, BTreeSet};

use crate::keywords::KeywordIndex;
use crate::moderation::ModerationVocabulary;
use crate::tagging::{BedroomRule, PriceBand, PriceGate, TagRule, TaggingRules, Trigger};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn phrases(items: &[&str]) -> Trigger {
    Trigger::Phrases { any: strings(items) }
}

fn together(groups: &[&[&str]]) -> Trigger {
    Trigger::Together {
        groups: groups.iter().map(|g| strings(g)).collect(),
    }
}

fn either(triggers: Vec<Trigger>) -> Trigger {
    Trigger::Either { triggers }
}

fn rule(tag: &str, trigger: Trigger) -> TagRule {
    TagRule {
        tag: tag.to_string(),
        trigger,
        gate: PriceGate::Always,
    }
}

fn gated(tag: &str, below: f64, trigger: Trigger) -> TagRule {
    TagRule {
        tag: tag.to_string(),
        trigger,
        gate: PriceGate::Below { amount: below },
    }
}

fn band(below: Option<f64>, tag: &str) -> PriceBand {
    PriceBand {
        below,
        tag: tag.to_string(),
    }
}

pub(crate) fn moderation_vocabulary() -> ModerationVocabulary {
    ModerationVocabulary {
        // Every term here also matches its truncations and vowel skeleton, so
        // a term whose short forms occur in listing vocabulary ("reta" in
        // "retail", "assho" in "glass house", "fuc" in "fuchsia") is left out
        // or replaced by a longer form whose truncation still covers the root.
        blocked_terms: strings(&[
            "fucker",
            "motherfucker",
            "bullshit",
            "shithead",
            "bitches",
            "dickhead",
            "cocksucker",
            "niggers",
            "faggot",
        ]),
        flagged_phrases: strings(&[
            // contact redirects
            "telegram",
            "whatsapp",
            "dm me",
            "text me at",
            "email me at",
            "contact me directly",
            "signal app",
            // payment scams
            "wire transfer",
            "western union",
            "moneygram",
            "gift card",
            "cashier's check",
            "send the deposit",
            "deposit before viewing",
            "pay before viewing",
            "owner is overseas",
            "out of the country",
            "keys will be mailed",
            "bitcoin",
            "crypto only",
            // fair housing
            "no children",
            "no kids",
            "adults only",
            "singles only",
            "christians only",
            "no section 8",
            "english speakers only",
            "no immigrants",
            "perfect for young professionals",
        ]),
        url_markers: strings(&[
            "http://", "https://", "www.", ".com", ".org", ".net", ".ru", ".tk", ".ml", ".ga",
            "bit.ly", "tinyurl", "goo.gl", "t.co/", "ow.ly", "is.gd",
        ]),
        allowed_domains: strings(&["listingguard.com"]),
        caps_ratio: 0.6,
        caps_min_length: 10,
        blocked_message: "This content contains language that isn't allowed on our platform. \
                          Please revise it and try again."
            .to_string(),
        vowel_stripped_matching: true,
    }
}

pub(crate) fn tagging_rules() -> TaggingRules {
    TaggingRules {
        max_tags: 5,
        lease_types: strings(&["rental", "lease"]),
        lease_tag: "#ForLease".to_string(),
        price_ladder: vec![
            band(Some(100_000.0), "#Under100K"),
            band(Some(200_000.0), "#Under200K"),
            band(Some(300_000.0), "#Under300K"),
            band(Some(400_000.0), "#Under400K"),
            band(Some(500_000.0), "#Under500K"),
            band(Some(1_000_000.0), "#Over500K"),
            band(Some(5_000_000.0), "#Over1M"),
            band(Some(10_000_000.0), "#Over5M"),
            band(None, "#Over10M"),
        ],
        rules: tag_rules(),
        large_property: BedroomRule {
            bedrooms: 4,
            tag: "#LargeProperty".to_string(),
        },
        studio: BedroomRule {
            bedrooms: 1,
            tag: "#Studio".to_string(),
        },
    }
}

fn tag_rules() -> Vec<TagRule> {
    vec![
        rule(
            "#Waterfront",
            phrases(&[
                "waterfront",
                "water front",
                "lakefront",
                "lake front",
                "oceanfront",
                "ocean front",
                "beachfront",
                "riverfront",
                "bayfront",
                "canal front",
                "intracoastal",
                "dock",
                "boat lift",
                "seawall",
                "deeded water access",
            ]),
        ),
        // personas
        rule(
            "#Flippers",
            phrases(&[
                "investor special",
                "investment opportunity",
                "flip",
                "sold as-is",
                "sold as is",
                "cash only",
                "cash buyers",
                "handyman special",
                "distressed",
                "foreclosure",
                "bank owned",
                "short sale",
            ]),
        ),
        gated(
            "#CashFlow",
            2_000_000.0,
            phrases(&[
                "rental income",
                "cash flow",
                "cashflow",
                "income producing",
                "income property",
                "tenant occupied",
                "tenants in place",
                "duplex",
                "triplex",
                "fourplex",
                "quadplex",
                "multi-family",
                "multifamily",
                "cap rate",
                "rent roll",
                "short-term rental",
                "short term rental",
                "airbnb",
            ]),
        ),
        rule(
            "#Vacation",
            phrases(&[
                "vacation",
                "getaway",
                "beach",
                "resort",
                "ski-in",
                "ski in",
                "cabin",
                "lake house",
                "lakehouse",
                "second home",
                "waterfront",
                "oceanfront",
            ]),
        ),
        gated(
            "#ForeverHome",
            2_000_000.0,
            phrases(&[
                "forever home",
                "family home",
                "room to grow",
                "cul-de-sac",
                "cul de sac",
                "top-rated school",
                "top rated school",
                "great schools",
                "school district",
                "playroom",
                "bonus room",
                "fenced backyard",
                "quiet neighborhood",
                "established neighborhood",
            ]),
        ),
        rule(
            "#Lifestyle",
            phrases(&[
                "golf",
                "country club",
                "gated community",
                "clubhouse",
                "walkable",
                "walk to",
                "downtown",
                "nightlife",
                "restaurants",
                "55+",
                "active adult",
                "resort-style",
                "tennis",
                "pickleball",
                "marina",
                "equestrian",
            ]),
        ),
        gated(
            "#StarterHome",
            750_000.0,
            phrases(&[
                "starter home",
                "starter",
                "first home",
                "first-time buyer",
                "first time buyer",
                "first-time homebuyer",
                "first time homebuyer",
                "cozy",
                "affordable",
                "move-in ready",
                "move in ready",
                "condo",
                "townhome",
                "townhouse",
                "low hoa",
                "fha",
            ]),
        ),
        rule(
            "#PetFriendly",
            either(vec![
                phrases(&[
                    "pet friendly",
                    "pet-friendly",
                    "pets allowed",
                    "pets welcome",
                    "dog park",
                    "dog run",
                    "dog door",
                    "doggy door",
                    "pet wash",
                    "fenced yard",
                    "fenced-in yard",
                ]),
                together(&[&["large yard", "private yard"], &["pets"]]),
            ]),
        ),
        rule(
            "#Luxury",
            either(vec![
                Trigger::PriceAtLeast {
                    amount: 10_000_000.0,
                },
                phrases(&[
                    "luxury",
                    "luxurious",
                    "mansion",
                    "penthouse",
                    "estate home",
                    "gated estate",
                    "gourmet kitchen",
                    "chef's kitchen",
                    "wine cellar",
                    "home theater",
                    "infinity pool",
                    "private elevator",
                    "guest house",
                    "guesthouse",
                    "panoramic views",
                    "designer finishes",
                    "high-end",
                    "custom-built",
                    "custom built",
                ]),
                together(&[&["residence"], &["luxury", "custom"]]),
            ]),
        ),
        rule(
            "#NewConstruction",
            phrases(&[
                "new construction",
                "newly constructed",
                "newly built",
                "new build",
                "brand new home",
                "brand-new home",
                "never lived in",
                "never occupied",
                "builder warranty",
                "pre-construction",
                "preconstruction",
                "under construction",
                "to be built",
            ]),
        ),
        rule(
            "#EscapeTheCity",
            either(vec![
                phrases(&[
                    "acreage",
                    "acres",
                    "rural",
                    "farmhouse",
                    "farmland",
                    "ranch",
                    "homestead",
                    "off-grid",
                    "off grid",
                    "secluded",
                    "country living",
                    "wooded lot",
                    "barn",
                    "pasture",
                ]),
                together(&[&["pond"], &["property"]]),
                together(&[&["well"], &["septic"]]),
            ]),
        ),
        rule(
            "#Historic",
            phrases(&[
                "historic district",
                "historic home",
                "historical home",
                "historic landmark",
                "national register",
                "historic register",
                "historical society",
                "circa 18",
                "circa 190",
                "circa 191",
                "circa 192",
                "circa 193",
                "built in 18",
                "built in 190",
                "built in 191",
                "built in 192",
                "built in 193",
                "century-old",
                "century old",
                "antebellum",
                "pre-war",
                "prewar",
            ]),
        ),
        // features
        rule(
            "#Pool",
            Trigger::Excluding {
                phrases: strings(&["pool"]),
                unless: strings(&["community pool"]),
            },
        ),
        rule(
            "#FixerUpper",
            phrases(&[
                "fixer upper",
                "fixer-upper",
                "fixer",
                "needs tlc",
                "needs work",
                "needs some work",
                "handyman special",
                "sweat equity",
                "bring your contractor",
                "bring your tools",
            ]),
        ),
        rule(
            "#ValueAdd",
            phrases(&[
                "value add",
                "value-add",
                "add value",
                "upside",
                "build equity",
                "instant equity",
                "expansion potential",
                "room for improvement",
            ]),
        ),
        rule(
            "#GoodBones",
            phrases(&[
                "good bones",
                "great bones",
                "solid bones",
                "structurally sound",
                "solid construction",
                "well built",
                "well-built",
            ]),
        ),
        rule(
            "#BelowMarket",
            phrases(&[
                "below market",
                "under market",
                "below appraisal",
                "under appraisal",
                "below assessed",
                "priced to sell",
                "motivated seller",
                "price reduced",
                "reduced price",
                "price drop",
                "bargain",
            ]),
        ),
        rule(
            "#Potential",
            phrases(&[
                "potential",
                "opportunity",
                "possibilities",
                "blank canvas",
                "make it your own",
                "make it yours",
                "envision",
            ]),
        ),
        rule(
            "#Renovation",
            phrases(&["renovat", "remodel", "updat", "modern"]),
        ),
    ]
}

pub(crate) fn keyword_index() -> KeywordIndex {
    let entries: [(&str, &[&str]); 22] = [
        (
            "Waterfront",
            &["waterfront", "lakefront", "oceanfront", "beachfront", "riverfront", "dock", "water view", "canal"],
        ),
        (
            "Flippers",
            &["flip", "flipper", "investor special", "as-is", "distressed", "foreclosure", "short sale"],
        ),
        (
            "CashFlow",
            &["cash flow", "rental income", "income property", "duplex", "triplex", "multifamily", "investment"],
        ),
        (
            "Vacation",
            &["vacation", "getaway", "beach", "cabin", "resort", "second home", "ski"],
        ),
        (
            "ForeverHome",
            &["forever home", "family home", "schools", "cul-de-sac", "room to grow"],
        ),
        (
            "Lifestyle",
            &["golf", "country club", "walkable", "downtown", "gated community", "55+", "marina"],
        ),
        (
            "StarterHome",
            &["starter home", "first home", "first-time buyer", "affordable", "condo", "townhome"],
        ),
        (
            "PetFriendly",
            &["pet friendly", "pets", "dog", "cat", "fenced yard", "dog park"],
        ),
        (
            "Luxury",
            &["luxury", "mansion", "penthouse", "estate", "high-end", "custom home", "wine cellar"],
        ),
        (
            "NewConstruction",
            &["new construction", "new build", "newly built", "brand new", "builder"],
        ),
        (
            "EscapeTheCity",
            &["acreage", "rural", "farm", "ranch", "homestead", "off-grid", "secluded", "country"],
        ),
        (
            "Historic",
            &["historic", "historical", "national register", "antebellum", "century-old", "landmark"],
        ),
        ("Pool", &["pool", "swimming pool", "heated pool", "spa"]),
        (
            "FixerUpper",
            &["fixer upper", "fixer-upper", "needs work", "tlc", "handyman"],
        ),
        (
            "ValueAdd",
            &["value add", "upside", "equity", "expansion"],
        ),
        (
            "GoodBones",
            &["good bones", "great bones", "solid bones", "structurally sound"],
        ),
        (
            "BelowMarket",
            &["below market", "bargain", "priced to sell", "motivated seller", "price reduced", "deal"],
        ),
        (
            "Potential",
            &["potential", "opportunity", "blank canvas", "possibilities"],
        ),
        (
            "Renovation",
            &["renovated", "renovation", "remodeled", "updated", "modern", "upgraded"],
        ),
        ("ForLease", &["lease", "rental", "for rent", "rent"]),
        (
            "LargeProperty",
            &["large home", "4 bedroom", "5 bedroom", "big family", "spacious"],
        ),
        ("Studio", &["studio", "1 bedroom", "one bedroom", "efficiency", "loft"]),
    ];

    let map: BTreeMap<String, BTreeSet<String>> = entries
        .iter()
        .map(|(tag, synonyms)| {
            (
                tag.to_string(),
                synonyms.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect();

    KeywordIndex::new(map)
}
