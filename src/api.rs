// ===============================
// src/api.rs
// ===============================
//
// Thin client over the game backend REST API:
// - GET  /apartments/random?count=1   -> { apartments: [...] }
// - POST /apartments/validate-guess   -> GuessResult
// - POST /leaderboard                 -> submit finished session
// - GET  /leaderboard?limit=N         -> { leaderboard: [...] }
//
// No retries; callers decide what to do with a failure.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::domain::{Apartment, GuessResult, LeaderboardEntry, LeaderboardRow};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad api url: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend sent an empty apartment batch")]
    EmptyBatch,
}

/// Seam between the store and the HTTP layer, so the session logic can be
/// driven by a scripted backend in tests.
#[allow(async_fn_in_trait)]
pub trait GuessBackend {
    async fn fetch_random_apartment(&self) -> Result<Apartment, ApiError>;
    async fn submit_guess(
        &self,
        apartment_id: i64,
        guessed_rent: u32,
    ) -> Result<GuessResult, ApiError>;
}

#[derive(Deserialize)]
struct RandomApartments {
    apartments: Vec<Apartment>,
}

#[derive(Deserialize)]
struct LeaderboardPage {
    leaderboard: Vec<LeaderboardRow>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String, // origin without trailing slash
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        Url::parse(base)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub async fn submit_score(&self, entry: &LeaderboardEntry) -> Result<(), ApiError> {
        let url = format!("{}/leaderboard", self.base);
        let rsp = self.http.post(url).json(entry).send().await?;
        check(rsp).await?;
        Ok(())
    }

    pub async fn fetch_leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, ApiError> {
        let url = format!("{}/leaderboard?limit={limit}", self.base);
        let rsp = self.http.get(url).send().await?;
        let page: LeaderboardPage = check(rsp).await?.json().await?;
        Ok(page.leaderboard)
    }
}

impl GuessBackend for ApiClient {
    async fn fetch_random_apartment(&self) -> Result<Apartment, ApiError> {
        let url = format!("{}/apartments/random?count=1", self.base);
        let rsp = self.http.get(url).send().await?;
        let batch: RandomApartments = check(rsp).await?.json().await?;
        batch.apartments.into_iter().next().ok_or(ApiError::EmptyBatch)
    }

    async fn submit_guess(
        &self,
        apartment_id: i64,
        guessed_rent: u32,
    ) -> Result<GuessResult, ApiError> {
        let url = format!("{}/apartments/validate-guess", self.base);
        // guessed_rent goes through as-is; range checks are the backend's call
        let rsp = self
            .http
            .post(url)
            .json(&json!({
                "apartment_id": apartment_id,
                "guessed_rent": guessed_rent,
            }))
            .send()
            .await?;
        Ok(check(rsp).await?.json().await?)
    }
}

async fn check(rsp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if rsp.status().is_success() {
        return Ok(rsp);
    }
    let status = rsp.status();
    let body = rsp.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

/// Derive the photo URL for a listing. Pure; no I/O.
///
/// Photos live at `{origin}/images/{listing_id}_{index}.webp` on the backend
/// origin itself (not under an `/api` prefix), with a fixed placeholder for
/// indices outside `[0, photo_count)`.
pub fn image_url_for(api_base: &str, apartment: &Apartment, photo_index: i64) -> String {
    let origin = api_base.trim_end_matches('/');
    let origin = origin.strip_suffix("/api").unwrap_or(origin);
    if photo_index < 0 || photo_index >= apartment.photo_count as i64 {
        return format!("{origin}/placeholder.png");
    }
    format!("{origin}/images/{}_{photo_index}.webp", apartment.listing_id)
}
