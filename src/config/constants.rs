//! Fixed plan limits and core timing constants.
//!
//! Free-tier counters are lifetime totals; there is no reset window.

/// Lifetime number of text-class operations allowed on the free plan
pub const FREE_TEXT_LIMIT: u32 = 10;

/// Lifetime number of media-class operations allowed on the free plan
pub const FREE_MEDIA_LIMIT: u32 = 3;

/// User session validity window in hours, checked lazily at point of use
pub const SESSION_TTL_HOURS: i64 = 24;

/// Admin session validity window in minutes
pub const ADMIN_SESSION_TTL_MINUTES: i64 = 60;

/// Feature tags tracked in the per-feature usage breakdown. Tags outside
/// this list are accepted on commit but not counted.
pub const RECOGNIZED_FEATURES: &[&str] = &[
    "article",
    "ad_copy",
    "social_post",
    "rewrite",
    "image",
    "voiceover",
];

/// Check whether a feature tag participates in the usage breakdown
pub fn is_recognized_feature(tag: &str) -> bool {
    RECOGNIZED_FEATURES.contains(&tag)
}
