// ===============================
// src/render.rs
// ===============================
//
// Terminal presentation. Pure string builders over domain values; the
// formerly separate panel/card/modal variants collapse into one function
// each. No scoring math here: difference, percentage and score are shown
// exactly as the backend sent them.
use crate::api::image_url_for;
use crate::domain::{Apartment, GuessResult, LeaderboardRow};
use crate::slider;
use crate::store::GameSession;

const BAR_WIDTH: usize = 30;

/// "$3,000" style money formatting.
pub fn fmt_usd(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn fmt_count(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn round_header(session: &GameSession) -> String {
    format!(
        "━━━ Round {}/{} · Score {} ━━━",
        session.current_round, session.total_rounds, session.total_score
    )
}

/// Listing details panel; photo URLs stand in for the carousel.
pub fn apartment_panel(apartment: &Apartment, api_base: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} — {}, {}",
        apartment.address, apartment.neighborhood, apartment.borough
    ));

    let beds = if apartment.bedrooms == 0.0 {
        "Studio".to_string()
    } else {
        format!("{} bd", fmt_count(apartment.bedrooms))
    };
    let mut specs = format!("{beds} · {} ba", fmt_count(apartment.bathrooms));
    if let Some(sqft) = apartment.sqft {
        specs.push_str(&format!(" · {sqft} ft²"));
    }
    if let Some(year) = apartment.year_built {
        specs.push_str(&format!(" · built {year}"));
    }
    lines.push(specs);

    if !apartment.amenities.is_empty() {
        lines.push(format!("Amenities: {}", apartment.amenities.join(", ")));
    }
    if !apartment.home_features.is_empty() {
        lines.push(format!("Features:  {}", apartment.home_features.join(", ")));
    }
    for idx in 0..apartment.photo_count.min(3) {
        lines.push(format!("Photo: {}", image_url_for(api_base, apartment, idx as i64)));
    }
    lines.join("\n")
}

/// One-line slider readout for the guess prompt.
pub fn slider_readout(pos: f64, price: u32) -> String {
    let filled = ((pos / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{:>8}  [{}{}] {:.0}",
        fmt_usd(price),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        pos
    )
}

pub fn result_card(result: &GuessResult) -> String {
    format!(
        "You guessed {} — actual rent {}\nOff by {} ({:.2}%) → {} points",
        fmt_usd(result.guessed_rent),
        fmt_usd(result.actual_rent),
        fmt_usd(result.difference),
        result.percentage_off,
        result.score
    )
}

pub fn game_over(session: &GameSession) -> String {
    let mut lines = vec!["━━━ Game over ━━━".to_string()];
    for (i, g) in session.guesses.iter().enumerate() {
        lines.push(format!(
            "Round {}: guessed {} / actual {} → {} pts",
            i + 1,
            fmt_usd(g.guessed_rent),
            fmt_usd(g.actual_rent),
            g.score
        ));
    }
    let rounds = session.guesses.len().max(1) as f64;
    lines.push(format!(
        "Total: {} points ({:.1} avg over {} rounds)",
        session.total_score,
        f64::from(session.total_score) / rounds,
        session.guesses.len()
    ));
    lines.join("\n")
}

pub fn leaderboard_table(rows: &[LeaderboardRow]) -> String {
    if rows.is_empty() {
        return "Leaderboard is empty — set the first score!".to_string();
    }
    let mut lines = vec![format!("{:<5} {:<20} {:>7} {:>7}", "Rank", "Player", "Score", "Avg")];
    for row in rows {
        lines.push(format!(
            "{:<5} {:<20} {:>7} {:>7.1}",
            row.rank, row.player_name, row.total_score, row.average_score
        ));
    }
    lines.join("\n")
}

/// Initial guess position: the slider starts at a typical NYC rent rather
/// than the bottom of the track.
pub fn initial_slider_pos() -> f64 {
    slider::price_to_slider(3_000.0)
}
