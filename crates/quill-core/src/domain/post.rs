use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Post identifier as assigned by the remote service (or allocated locally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User identifier. Not validated against the user directory at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The fixed set of reaction counters. Always fully populated - a post never
/// carries a partial counter map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub thumbs_up: u32,
    pub wow: u32,
    pub heart: u32,
    pub rocket: u32,
    pub coffee: u32,
}

impl Reactions {
    /// Increment a single counter.
    pub fn bump(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::ThumbsUp => self.thumbs_up += 1,
            Reaction::Wow => self.wow += 1,
            Reaction::Heart => self.heart += 1,
            Reaction::Rocket => self.rocket += 1,
            Reaction::Coffee => self.coffee += 1,
        }
    }

    pub fn get(&self, reaction: Reaction) -> u32 {
        match reaction {
            Reaction::ThumbsUp => self.thumbs_up,
            Reaction::Wow => self.wow,
            Reaction::Heart => self.heart,
            Reaction::Rocket => self.rocket,
            Reaction::Coffee => self.coffee,
        }
    }
}

/// One of the five reaction kinds. Never crosses the wire on its own; only
/// the full [`Reactions`] map is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    ThumbsUp,
    Wow,
    Heart,
    Rocket,
    Coffee,
}

impl Reaction {
    pub const ALL: [Reaction; 5] = [
        Reaction::ThumbsUp,
        Reaction::Wow,
        Reaction::Heart,
        Reaction::Rocket,
        Reaction::Coffee,
    ];

    /// The wire name of this reaction (camelCase, matching the JSON keys).
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "thumbsUp",
            Reaction::Wow => "wow",
            Reaction::Heart => "heart",
            Reaction::Rocket => "rocket",
            Reaction::Coffee => "coffee",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a reaction name is not one of the five fixed keys.
#[derive(Debug, Error)]
#[error("unknown reaction `{0}`")]
pub struct UnknownReaction(pub String);

impl FromStr for Reaction {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reaction::ALL
            .into_iter()
            .find(|reaction| reaction.as_str() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

/// Post entity - a blog post with its reaction counters.
///
/// The collection's display order is derived from `date` (descending) at
/// read time; no order is stored on the entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub reactions: Reactions,
}

/// Fields accepted by a post update. `None` leaves the field untouched;
/// reactions are never updatable through this path.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub user_id: Option<UserId>,
}
