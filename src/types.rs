use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Codeforces wire types
// ---------------------------------------------------------------------------

/// Every Codeforces API response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub comment: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    Contestant,
    Practice,
    Virtual,
    Manager,
    OutOfCompetition,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub handle: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub participant_type: ParticipantType,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// One line of `contest.standings`. Everything is defaulted and `rank` /
/// `oldRating` accept any JSON value, so a malformed row deserializes and gets
/// dropped by the normalizer instead of failing the contest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    #[serde(default)]
    pub party: Party,
    /// 0 when missing or not a positive integer.
    #[serde(default, deserialize_with = "lenient_rank")]
    pub rank: u32,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub old_rating: Option<i32>,
}

fn lenient_rank<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
}

fn lenient_rating<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i32>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_i64().and_then(|n| i32::try_from(n).ok()))
}

#[derive(Debug, Deserialize)]
pub struct StandingsResult {
    #[serde(default)]
    pub rows: Vec<StandingsRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    pub phase: ContestPhase,
}

impl Contest {
    /// Finished and not announced as unrated.
    pub fn is_rated_and_finished(&self) -> bool {
        self.phase == ContestPhase::Finished && !self.name.starts_with("Unrated")
    }
}

// ---------------------------------------------------------------------------
// Derived / persisted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub handle: String,
    pub rank: u32,
    pub old_rating: i32,
    /// `None` until the solver has run.
    pub performance: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRecord {
    pub contest_id: i64,
    pub division: String,
    pub data: Vec<Participant>,
}
