// ===============================
// src/domain.rs
// ===============================
use serde::{Deserialize, Serialize};

/// One NYC listing as served by the backend.
/// `rent` is withheld on fetch and only appears once a guess was validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    pub id: i64,
    pub listing_url: String,
    #[serde(default)]
    pub rent: Option<u32>,
    pub sqft: Option<u32>,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub neighborhood: String,
    pub borough: String,
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub year_built: Option<u32>,
    pub photo_count: u32,
    #[serde(default)]
    pub home_features: Vec<String>,
    pub listing_id: i64,
    pub property_id: i64,
}

/// Backend verdict on one guess. Score and actual rent come from the
/// backend only; the client never recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResult {
    pub apartment_id: i64,
    pub guessed_rent: u32,
    pub actual_rent: u32,
    pub difference: u32,
    pub percentage_off: f64,
    pub score: u32,
}

/// Payload for posting a finished session to the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub total_score: u32,
    pub rounds_played: u32,
}

/// One ranked row of the public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub player_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub total_score: u32,
    pub rounds_played: u32,
    #[serde(default)]
    pub average_score: f64,
}

/// Session events for the optional JSONL recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted { round: u32, apartment_id: i64 },
    GuessSubmitted { round: u32, apartment_id: i64, guessed_rent: u32 },
    ResultReceived { round: u32, result: GuessResult },
    SessionFinished { total_score: u32, rounds_played: u32 },
}
