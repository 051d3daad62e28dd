// ===============================
// src/store.rs
// ===============================
//
// Single source of truth for one play-through. The store owns the session
// behind a mutex and is mutated only through its own actions; callers get
// snapshots. The mutex is never held across an await.
//
// Overlapping fetches are legal (no queue, no cancellation): each fetch
// carries a generation token, and a resolution whose generation has been
// superseded is dropped instead of overwriting newer state.
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::api::GuessBackend;
use crate::domain::{Apartment, GuessResult};

#[derive(Debug, Clone)]
pub struct GameSession {
    pub current_apartment: Option<Apartment>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub total_score: u32,
    pub guesses: Vec<GuessResult>,
    pub submitted: bool,
    pub loading: bool,
    pub error: Option<String>,
    fetch_gen: u64,
}

impl GameSession {
    fn new(total_rounds: u32) -> Self {
        Self {
            current_apartment: None,
            current_round: 1,
            total_rounds,
            total_score: 0,
            guesses: Vec::new(),
            submitted: false,
            loading: false,
            error: None,
            fetch_gen: 0,
        }
    }

    pub fn is_last_round(&self) -> bool {
        self.current_round >= self.total_rounds
    }
}

pub struct GameStore<B: GuessBackend> {
    backend: B,
    session: Mutex<GameSession>,
}

impl<B: GuessBackend> GameStore<B> {
    pub fn new(backend: B, total_rounds: u32) -> Self {
        Self {
            backend,
            session: Mutex::new(GameSession::new(total_rounds)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> GameSession {
        self.lock().clone()
    }

    /// Back to round 1, score 0, empty history, then fetch the first
    /// apartment. Any in-flight fetch is invalidated by the generation bump.
    pub async fn reset_game(&self, rounds: Option<u32>) {
        {
            let mut s = self.lock();
            let total = rounds.unwrap_or(s.total_rounds);
            let gen = s.fetch_gen;
            *s = GameSession::new(total);
            s.fetch_gen = gen;
        }
        self.load_new_apartment().await;
    }

    /// Fetch a fresh apartment for the current round. On failure the error
    /// message is stored and the previous apartment (if any) stays put.
    pub async fn load_new_apartment(&self) {
        let gen = {
            let mut s = self.lock();
            s.fetch_gen += 1;
            s.loading = true;
            s.error = None;
            s.fetch_gen
        };

        let fetched = self.backend.fetch_random_apartment().await;

        let mut s = self.lock();
        if s.fetch_gen != gen {
            debug!(gen, "stale apartment fetch dropped");
            return;
        }
        match fetched {
            Ok(apartment) => {
                debug!(apartment_id = apartment.id, "round apartment loaded");
                s.current_apartment = Some(apartment);
                s.submitted = false;
                s.loading = false;
            }
            Err(e) => {
                warn!(%e, "apartment fetch failed");
                s.error = Some(e.to_string());
                s.loading = false;
            }
        }
    }

    /// Send the guess for the current apartment to the backend. On success
    /// the result is appended to the history and its score added to the
    /// running total; on failure the round stays active with an error set.
    /// Returns `None` when there is nothing to submit (no apartment, or the
    /// round was already submitted) or when the call failed.
    pub async fn submit_guess(&self, guessed_rent: u32) -> Option<GuessResult> {
        let apartment_id = {
            let mut s = self.lock();
            if s.submitted {
                return None;
            }
            let id = s.current_apartment.as_ref()?.id;
            s.loading = true;
            s.error = None;
            id
        };

        match self.backend.submit_guess(apartment_id, guessed_rent).await {
            Ok(result) => {
                let mut s = self.lock();
                s.guesses.push(result.clone());
                s.total_score += result.score;
                s.submitted = true;
                s.loading = false;
                Some(result)
            }
            Err(e) => {
                warn!(%e, apartment_id, "guess submission failed");
                let mut s = self.lock();
                s.error = Some(e.to_string());
                s.loading = false;
                None
            }
        }
    }

    /// Advance to the next round and fetch its apartment. At the last round
    /// this refuses and returns `false` without touching any state; the
    /// caller is expected to present the end-of-game view.
    pub async fn next_round(&self) -> bool {
        {
            let mut s = self.lock();
            if s.is_last_round() {
                return false;
            }
            s.current_round += 1;
            s.submitted = false;
        }
        self.load_new_apartment().await;
        true
    }

    /// Clears the error message only; every other field keeps its value.
    pub fn clear_error(&self) {
        self.lock().error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn apartment(id: i64) -> Apartment {
        Apartment {
            id,
            listing_url: format!("https://streeteasy.com/rental/{id}"),
            rent: None,
            sqft: Some(700),
            bedrooms: 2.0,
            bathrooms: 1.0,
            neighborhood: "Bushwick".into(),
            borough: "Brooklyn".into(),
            address: "123 Troutman St".into(),
            amenities: vec![],
            year_built: Some(1920),
            photo_count: 3,
            home_features: vec![],
            listing_id: id * 1000,
            property_id: id * 10,
        }
    }

    fn result(apartment_id: i64, guessed: u32, actual: u32, score: u32) -> GuessResult {
        let difference = guessed.abs_diff(actual);
        GuessResult {
            apartment_id,
            guessed_rent: guessed,
            actual_rent: actual,
            difference,
            percentage_off: f64::from(difference) / f64::from(actual) * 100.0,
            score,
        }
    }

    fn network_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    /// Backend that replays queued responses; a fetch can optionally be
    /// parked behind a `Notify` gate to script interleavings.
    #[derive(Default)]
    struct ScriptedBackend {
        fetches: Mutex<VecDeque<(Option<Arc<Notify>>, Result<Apartment, ApiError>)>>,
        verdicts: Mutex<VecDeque<Result<GuessResult, ApiError>>>,
    }

    impl ScriptedBackend {
        fn push_fetch(&self, rsp: Result<Apartment, ApiError>) {
            self.fetches.lock().unwrap().push_back((None, rsp));
        }

        fn push_gated_fetch(&self, rsp: Result<Apartment, ApiError>) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.fetches
                .lock()
                .unwrap()
                .push_back((Some(gate.clone()), rsp));
            gate
        }

        fn push_verdict(&self, rsp: Result<GuessResult, ApiError>) {
            self.verdicts.lock().unwrap().push_back(rsp);
        }
    }

    impl GuessBackend for ScriptedBackend {
        async fn fetch_random_apartment(&self) -> Result<Apartment, ApiError> {
            let (gate, rsp) = self
                .fetches
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch");
            if let Some(gate) = gate {
                gate.notified().await;
            }
            rsp
        }

        async fn submit_guess(&self, _id: i64, _rent: u32) -> Result<GuessResult, ApiError> {
            self.verdicts
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected guess")
        }
    }

    #[tokio::test]
    async fn reset_yields_fresh_session() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(1)));
        backend.push_verdict(Ok(result(1, 3000, 3100, 97)));
        backend.push_fetch(Ok(apartment(2)));

        let store = GameStore::new(backend, 5);
        store.reset_game(None).await;
        store.submit_guess(3000).await.unwrap();

        let s = store.snapshot();
        assert_eq!(s.current_round, 1);
        assert_eq!(s.total_score, 97);
        assert_eq!(s.guesses.len(), 1);

        store.reset_game(Some(3)).await;
        let s = store.snapshot();
        assert_eq!(s.current_round, 1);
        assert_eq!(s.total_rounds, 3);
        assert_eq!(s.total_score, 0);
        assert!(s.guesses.is_empty());
        assert!(!s.submitted);
        assert_eq!(s.current_apartment.as_ref().map(|a| a.id), Some(2));
    }

    #[tokio::test]
    async fn failed_fetch_sets_error_and_keeps_prior_state() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(1)));
        backend.push_fetch(Err(network_error()));

        let store = GameStore::new(backend, 5);
        store.load_new_apartment().await;
        store.load_new_apartment().await;

        let s = store.snapshot();
        assert!(s.error.as_deref().unwrap().contains("500"));
        assert!(!s.loading);
        // prior apartment survives the failed refresh
        assert_eq!(s.current_apartment.as_ref().map(|a| a.id), Some(1));

        store.clear_error();
        let s = store.snapshot();
        assert!(s.error.is_none());
        assert_eq!(s.current_apartment.as_ref().map(|a| a.id), Some(1));
    }

    #[tokio::test]
    async fn successful_guess_extends_history_and_score() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(7)));
        backend.push_verdict(Ok(result(7, 2500, 2000, 75)));

        let store = GameStore::new(backend, 5);
        store.load_new_apartment().await;
        let r = store.submit_guess(2500).await.unwrap();
        assert_eq!(r.score, 75);

        let s = store.snapshot();
        assert_eq!(s.guesses.len(), 1);
        assert_eq!(s.total_score, 75);
        assert!(s.submitted);
        assert!(!s.loading);

        // same round cannot be submitted twice
        assert!(store.submit_guess(2500).await.is_none());
        assert_eq!(store.snapshot().guesses.len(), 1);
    }

    #[tokio::test]
    async fn failed_guess_leaves_round_active() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(7)));
        backend.push_verdict(Err(network_error()));

        let store = GameStore::new(backend, 5);
        store.load_new_apartment().await;
        assert!(store.submit_guess(2500).await.is_none());

        let s = store.snapshot();
        assert!(s.error.is_some());
        assert!(!s.submitted);
        assert!(s.guesses.is_empty());
        assert_eq!(s.total_score, 0);
    }

    #[tokio::test]
    async fn submit_without_apartment_is_refused() {
        let store = GameStore::new(ScriptedBackend::default(), 5);
        assert!(store.submit_guess(1000).await.is_none());
        assert!(store.snapshot().guesses.is_empty());
    }

    #[tokio::test]
    async fn next_round_advances_until_the_last() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(1)));
        backend.push_verdict(Ok(result(1, 3000, 3000, 100)));
        backend.push_fetch(Ok(apartment(2)));

        let store = GameStore::new(backend, 2);
        store.reset_game(None).await;
        store.submit_guess(3000).await.unwrap();

        assert!(store.next_round().await);
        let s = store.snapshot();
        assert_eq!(s.current_round, 2);
        assert!(!s.submitted);
        assert_eq!(s.current_apartment.as_ref().map(|a| a.id), Some(2));

        // last round: refusal, nothing changes, no fetch happens
        assert!(!store.next_round().await);
        let s = store.snapshot();
        assert_eq!(s.current_round, 2);
        assert_eq!(s.current_apartment.as_ref().map(|a| a.id), Some(2));
    }

    #[tokio::test]
    async fn superseded_fetch_resolution_is_discarded() {
        let backend = ScriptedBackend::default();
        let gate = backend.push_gated_fetch(Ok(apartment(1)));
        backend.push_fetch(Ok(apartment(2)));

        let store = Arc::new(GameStore::new(backend, 5));

        // First fetch parks on the gate inside the backend
        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.load_new_apartment().await }
        });
        tokio::task::yield_now().await;

        // Reset supersedes it and completes with apartment 2
        store.reset_game(None).await;
        assert_eq!(
            store.snapshot().current_apartment.as_ref().map(|a| a.id),
            Some(2)
        );

        // Late resolution of the superseded fetch must not win
        gate.notify_one();
        slow.await.unwrap();
        assert_eq!(
            store.snapshot().current_apartment.as_ref().map(|a| a.id),
            Some(2)
        );
    }

    // Spec'd end-to-end scenario: 5 rounds, guess 3000 against 4200.
    #[tokio::test]
    async fn first_round_scenario() {
        let backend = ScriptedBackend::default();
        backend.push_fetch(Ok(apartment(42)));
        backend.push_verdict(Ok(result(42, 3000, 4200, 71)));

        let store = GameStore::new(backend, 5);
        store.reset_game(Some(5)).await;

        let snap = store.snapshot();
        assert!(snap.current_apartment.as_ref().unwrap().rent.is_none());

        let r = store.submit_guess(3000).await.unwrap();
        assert_eq!(r.difference, 1200);
        assert!((r.percentage_off - 28.571_428_571).abs() < 1e-6);
        assert!(r.score > 0);

        let snap = store.snapshot();
        assert!(snap.submitted);
        assert_eq!(snap.guesses.len(), 1);
        assert_eq!(snap.total_score, r.score);
    }
}
