//! ProgressEngine: pure functions from stored state to derived progress.
//!
//! No I/O, no caching. Everything here is cheap enough to recompute on every
//! call, which is what keeps the derived fields consistent with the stored
//! state they came from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{AchievementId, Anchor, Message, Profile};

/// XP needed per level.
pub const XP_PER_LEVEL: u64 = 1000;

/// Coarse tier label derived from XP and message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Novice,
    Apprentice,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Novice => "Novice",
            Rank::Apprentice => "Apprentice",
            Rank::Intermediate => "Intermediate",
            Rank::Advanced => "Advanced",
            Rank::Expert => "Expert",
            Rank::Master => "Master",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rank thresholds, highest tier first. A tier is reached when *either* the
/// XP or the message-count threshold is met.
const RANK_THRESHOLDS: [(Rank, u64, u64); 5] = [
    (Rank::Master, 10_000, 1_000),
    (Rank::Expert, 5_000, 500),
    (Rank::Advanced, 2_000, 200),
    (Rank::Intermediate, 1_000, 100),
    (Rank::Apprentice, 500, 50),
];

/// Derived view of a wallet's progress. Never persisted; recomputed on
/// demand from (profile, messages, anchors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub level: u32,
    pub xp: u64,
    pub rank: Rank,
    pub total_messages: u64,
    pub topics_mastered: u32,
    pub blockchain_anchors: u64,
    pub learning_streak: u32,
    pub achievements: BTreeSet<AchievementId>,
    pub next_level: u32,
    pub progress_percent: f64,
}

/// The level implied by an XP total: one level per 1000 XP, starting at 1.
pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL + 1) as u32
}

/// Compute the rank for the given XP and message count.
///
/// Thresholds are evaluated from highest to lowest; the first tier satisfied
/// by either condition wins.
pub fn rank(xp: u64, total_messages: u64) -> Rank {
    for (tier, xp_min, messages_min) in RANK_THRESHOLDS {
        if xp >= xp_min || total_messages >= messages_min {
            return tier;
        }
    }
    Rank::Novice
}

/// Count distinct calendar dates with at least one anchor.
///
/// Note this is *not* a consecutive-day streak despite the name; the metric
/// is the number of distinct UTC dates across all anchors.
pub fn streak(anchors: &[Anchor]) -> u32 {
    let dates: BTreeSet<chrono::NaiveDate> =
        anchors.iter().map(|a| a.anchored_at.date_naive()).collect();
    dates.len() as u32
}

/// Evaluate the unlock predicates against the current counters.
///
/// Each predicate is monotonic in its inputs, so achievements never regress
/// as counters grow.
pub fn achievements(
    profile: &Profile,
    messages: &[Message],
    anchors: &[Anchor],
) -> BTreeSet<AchievementId> {
    let mut unlocked = BTreeSet::new();

    if !messages.is_empty() {
        unlocked.insert(AchievementId::FirstMessage);
    }
    if !anchors.is_empty() {
        unlocked.insert(AchievementId::FirstAnchor);
    }
    if messages.len() >= 100 {
        unlocked.insert(AchievementId::Messages100);
    }
    if profile.level >= 10 {
        unlocked.insert(AchievementId::Level10);
    }
    if rank(profile.xp, messages.len() as u64) == Rank::Master {
        unlocked.insert(AchievementId::MasterRank);
    }
    if streak(anchors) >= 7 {
        unlocked.insert(AchievementId::Streak7);
    }

    unlocked
}

/// Percentage of progress toward the next level, clamped to [0, 100].
///
/// Guards against stale level values producing negative or >100 results.
pub fn level_progress_percent(xp: u64, level: u32) -> f64 {
    let level_floor = (level.saturating_sub(1) as f64) * XP_PER_LEVEL as f64;
    let percent = (xp as f64 - level_floor) / XP_PER_LEVEL as f64 * 100.0;
    percent.clamp(0.0, 100.0)
}

/// Compose the full summary from already-fetched state.
pub fn summary(profile: &Profile, messages: &[Message], anchors: &[Anchor]) -> ProgressSummary {
    ProgressSummary {
        level: profile.level,
        xp: profile.xp,
        rank: rank(profile.xp, messages.len() as u64),
        total_messages: messages.len() as u64,
        topics_mastered: profile.topics_mastered.len() as u32,
        blockchain_anchors: anchors.len() as u64,
        learning_streak: streak(anchors),
        achievements: achievements(profile, messages, anchors),
        next_level: profile.level + 1,
        progress_percent: level_progress_percent(profile.xp, profile.level),
    }
}
