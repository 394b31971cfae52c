//! CredentialMinter metadata: versioned documents for progress snapshots and
//! achievement unlocks.
//!
//! Attribute ordering is part of the contract: consumers index attributes by
//! position as well as by trait name, so the builders emit a fixed order.
//! Documents are immutable once built; [`metadata_hash`] is the digest that
//! gets anchored on-chain as the proof of mint.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::progress::{rank, streak, Rank};
use crate::types::{AchievementId, Anchor, Profile, Sha256Hash};

/// An attribute value: numeric for counters, text for labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(u64),
    Text(String),
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

/// One (trait, value) pair in the attribute list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: AttributeValue,
}

impl Attribute {
    fn new(trait_type: &str, value: impl Into<AttributeValue>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

/// Royalty-style creator entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    pub share: u8,
}

/// A referenced media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialProperties {
    pub category: String,
    pub creators: Vec<Creator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<MediaFile>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub family: String,
}

/// A versioned credential metadata document.
///
/// Field order is fixed by the struct definition; serializing with
/// `serde_json` yields deterministic bytes for hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
    pub properties: CredentialProperties,
    pub external_url: String,
    pub collection: CollectionInfo,
}

/// Static definition of one achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub rarity: &'static str,
}

/// Look up the static definition for a registered achievement id.
pub fn achievement_definition(id: AchievementId) -> &'static AchievementDefinition {
    match id {
        AchievementId::FirstMessage => &AchievementDefinition {
            name: "First Steps",
            description: "Sent your first message to Sovereign AI",
            image: "https://via.placeholder.com/400/9945FF/FFFFFF?text=First+Steps",
            rarity: "Common",
        },
        AchievementId::FirstAnchor => &AchievementDefinition {
            name: "Blockchain Pioneer",
            description: "Anchored your first learning session to the ledger",
            image: "https://via.placeholder.com/400/14F195/FFFFFF?text=Blockchain+Pioneer",
            rarity: "Uncommon",
        },
        AchievementId::Streak7 => &AchievementDefinition {
            name: "Week Warrior",
            description: "Maintained a 7-day learning streak",
            image: "https://via.placeholder.com/400/00D4FF/FFFFFF?text=Week+Warrior",
            rarity: "Rare",
        },
        AchievementId::Messages100 => &AchievementDefinition {
            name: "Conversationalist",
            description: "Exchanged 100 messages with Sovereign AI",
            image: "https://via.placeholder.com/400/FFD700/FFFFFF?text=Conversationalist",
            rarity: "Rare",
        },
        AchievementId::Level10 => &AchievementDefinition {
            name: "Rising Star",
            description: "Reached Level 10",
            image: "https://via.placeholder.com/400/FF6B6B/FFFFFF?text=Rising+Star",
            rarity: "Epic",
        },
        AchievementId::MasterRank => &AchievementDefinition {
            name: "Grand Master",
            description: "Achieved Master rank in learning",
            image: "https://via.placeholder.com/400/FF00FF/FFFFFF?text=Grand+Master",
            rarity: "Legendary",
        },
    }
}

/// Placeholder badge image for a rank/level pair.
fn progress_image(rank: Rank, level: u32) -> String {
    let color = match rank {
        Rank::Novice => "9945FF",
        Rank::Apprentice => "14F195",
        Rank::Intermediate => "00D4FF",
        Rank::Advanced => "FFD700",
        Rank::Expert => "FF6B6B",
        Rank::Master => "FF00FF",
    };
    format!(
        "https://via.placeholder.com/400/{color}/FFFFFF?text={}+Level+{level}",
        rank.as_str()
    )
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build a progress-snapshot credential.
///
/// `Total Messages` here is the sum of *anchored* message counts, and the
/// rank is computed against that sum: this credential describes the anchored
/// record, not whatever is currently sitting in the chat table.
pub fn build_progress_credential(profile: &Profile, anchors: &[Anchor]) -> CredentialMetadata {
    let total_messages: u64 = anchors.iter().map(|a| a.message_count as u64).sum();
    let learning_streak = streak(anchors);
    let rank = rank(profile.xp, total_messages);

    let last_anchor = anchors
        .iter()
        .max_by_key(|a| a.anchored_at)
        .map(|a| rfc3339(a.anchored_at))
        .unwrap_or_else(|| "Never".to_string());
    let memory_hash = profile
        .current_memory_hash
        .map(|h| h.to_hex())
        .unwrap_or_else(|| "None".to_string());

    let image = progress_image(rank, profile.level);

    CredentialMetadata {
        name: format!("Sovereign Progress #{}", profile.level),
        symbol: "SOVPROG".to_string(),
        description: format!(
            "Learning Progress NFT - Level {} | {} XP | {} messages",
            profile.level, profile.xp, total_messages
        ),
        image: image.clone(),
        attributes: vec![
            Attribute::new("Level", profile.level as u64),
            Attribute::new("XP", profile.xp),
            Attribute::new("Rank", rank.as_str()),
            Attribute::new("Total Messages", total_messages),
            Attribute::new("Topics Mastered", profile.topics_mastered.len() as u64),
            Attribute::new("Learning Streak", learning_streak as u64),
            Attribute::new("Blockchain Anchors", anchors.len() as u64),
            Attribute::new("Last Anchor", last_anchor),
            Attribute::new("Memory Hash", memory_hash),
        ],
        properties: CredentialProperties {
            category: "Education".to_string(),
            creators: vec![Creator {
                address: profile.wallet_address.as_str().to_string(),
                share: 100,
            }],
            files: Some(vec![MediaFile {
                uri: image,
                media_type: "image/png".to_string(),
            }]),
        },
        external_url: format!(
            "https://sovereign.app/profile/{}",
            profile.wallet_address
        ),
        collection: CollectionInfo {
            name: "Sovereign Learning Progress".to_string(),
            family: "Sovereign".to_string(),
        },
    }
}

/// Build an achievement-unlock credential.
///
/// `earned_at` is passed in so the document stays a pure function of its
/// inputs.
pub fn build_achievement_credential(
    id: AchievementId,
    profile: &Profile,
    earned_at: DateTime<Utc>,
) -> CredentialMetadata {
    let def = achievement_definition(id);

    CredentialMetadata {
        name: def.name.to_string(),
        symbol: "SOVACH".to_string(),
        description: def.description.to_string(),
        image: def.image.to_string(),
        attributes: vec![
            Attribute::new("Achievement", id.as_str()),
            Attribute::new("Rarity", def.rarity),
            Attribute::new("Earned By", profile.wallet_address.as_str()),
            Attribute::new("Earned At", rfc3339(earned_at)),
            Attribute::new("User Level", profile.level as u64),
            Attribute::new("User XP", profile.xp),
        ],
        properties: CredentialProperties {
            category: "Achievement".to_string(),
            creators: vec![Creator {
                address: profile.wallet_address.as_str().to_string(),
                share: 100,
            }],
            files: None,
        },
        external_url: format!("https://sovereign.app/achievement/{}", id.as_str()),
        collection: CollectionInfo {
            name: "Sovereign Achievements".to_string(),
            family: "Sovereign".to_string(),
        },
    }
}

/// Serialize a metadata document to its canonical bytes.
pub fn metadata_bytes(metadata: &CredentialMetadata) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(metadata).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Hash a metadata document with the same digest algorithm used for chat
/// history.
pub fn metadata_hash(metadata: &CredentialMetadata) -> Result<Sha256Hash, CoreError> {
    Ok(Sha256Hash::hash(&metadata_bytes(metadata)?))
}
