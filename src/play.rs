// ===============================
// src/play.rs
// ===============================
//
// Interactive session runner: drives the store from stdin, renders to
// stdout, and feeds the optional event recorder. Network failures never
// end the session; the player retries or quits.
use std::io;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiClient;
use crate::config::Args;
use crate::domain::{GameEvent, LeaderboardEntry};
use crate::render;
use crate::slider;
use crate::store::GameStore;

#[derive(Debug, PartialEq)]
enum GuessCmd {
    Nudge(f64),
    Set(u32),
    Submit,
    Quit,
}

fn parse_cmd(line: &str) -> Option<GuessCmd> {
    let t = line.trim();
    match t {
        "" | "ok" => Some(GuessCmd::Submit),
        "q" | "quit" => Some(GuessCmd::Quit),
        "+" => Some(GuessCmd::Nudge(1.0)),
        "-" => Some(GuessCmd::Nudge(-1.0)),
        "++" => Some(GuessCmd::Nudge(5.0)),
        "--" => Some(GuessCmd::Nudge(-5.0)),
        _ => t
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .ok()
            .map(GuessCmd::Set),
    }
}

fn emit(events: &Option<mpsc::Sender<GameEvent>>, event: GameEvent) {
    if let Some(tx) = events {
        if tx.try_send(event).is_err() {
            debug!("recorder channel full or gone, event dropped");
        }
    }
}

/// Slider-driven guess input. `+`/`-` walk the nonlinear track, a typed
/// dollar amount is taken as-is (no clamping — the backend owns validation),
/// enter submits, `q` bails out. Returns `None` when the player quits or
/// stdin closes.
async fn guess_prompt(input: &mut Lines<BufReader<Stdin>>) -> io::Result<Option<u32>> {
    let mut pos = render::initial_slider_pos();
    let mut price = slider::slider_to_price(pos);
    loop {
        println!("{}", render::slider_readout(pos, price));
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match parse_cmd(&line) {
            Some(GuessCmd::Submit) => return Ok(Some(price)),
            Some(GuessCmd::Quit) => return Ok(None),
            Some(GuessCmd::Nudge(step)) => {
                pos = (pos + step).clamp(0.0, 100.0);
                price = slider::slider_to_price(pos);
            }
            Some(GuessCmd::Set(p)) => {
                price = p;
                pos = slider::price_to_slider(f64::from(p));
            }
            None => println!("Use +/- (or ++/--), a dollar amount, enter to submit, q to quit."),
        }
    }
}

pub async fn run(
    store: &GameStore<ApiClient>,
    client: &ApiClient,
    args: &Args,
    events: Option<mpsc::Sender<GameEvent>>,
) -> io::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("RentQuest — guess the rent of real NYC listings.");
    println!("Nudge the slider with +/- (++/-- for big steps), type a dollar amount,");
    println!("press enter to lock in your guess, q to quit.");

    store.reset_game(Some(args.total_rounds)).await;
    let mut completed = false;

    'game: loop {
        // A failed fetch leaves an error in the store; offer a retry
        while let Some(err) = store.snapshot().error {
            println!("Problem loading a listing: {err}");
            println!("Press enter to retry, q to quit.");
            match input.next_line().await? {
                Some(line) if line.trim() == "q" => break 'game,
                Some(_) => {
                    store.clear_error();
                    store.load_new_apartment().await;
                }
                None => break 'game,
            }
        }

        let snap = store.snapshot();
        let Some(apartment) = snap.current_apartment.clone() else {
            debug!("no apartment and no error, ending session");
            break;
        };

        println!();
        println!("{}", render::round_header(&snap));
        println!("{}", render::apartment_panel(&apartment, client.base()));
        emit(
            &events,
            GameEvent::RoundStarted {
                round: snap.current_round,
                apartment_id: apartment.id,
            },
        );

        let Some(guess) = guess_prompt(&mut input).await? else {
            break;
        };
        emit(
            &events,
            GameEvent::GuessSubmitted {
                round: snap.current_round,
                apartment_id: apartment.id,
                guessed_rent: guess,
            },
        );

        match store.submit_guess(guess).await {
            Some(result) => {
                println!("{}", render::result_card(&result));
                emit(
                    &events,
                    GameEvent::ResultReceived {
                        round: snap.current_round,
                        result,
                    },
                );
            }
            None => {
                if let Some(err) = store.snapshot().error {
                    println!("Could not submit the guess: {err}");
                    println!("Press enter to try this round again, q to quit.");
                    match input.next_line().await? {
                        Some(line) if line.trim() == "q" => break 'game,
                        Some(_) => store.clear_error(),
                        None => break 'game,
                    }
                }
                continue 'game;
            }
        }

        if !store.next_round().await {
            completed = true;
            break;
        }
    }

    if completed {
        let snap = store.snapshot();
        println!();
        println!("{}", render::game_over(&snap));
        emit(
            &events,
            GameEvent::SessionFinished {
                total_score: snap.total_score,
                rounds_played: snap.guesses.len() as u32,
            },
        );

        let name = match &args.player_name {
            Some(n) => Some(n.clone()),
            None => {
                println!();
                println!("Name for the leaderboard (enter to skip):");
                input
                    .next_line()
                    .await?
                    .map(|l| l.trim().to_string())
                    .filter(|s| !s.is_empty())
            }
        };

        if let Some(player_name) = name {
            let entry = LeaderboardEntry {
                player_name,
                location: None,
                total_score: snap.total_score,
                rounds_played: snap.guesses.len() as u32,
            };
            match client.submit_score(&entry).await {
                Ok(()) => {
                    println!("Score submitted. Top of the board right now:");
                    match client.fetch_leaderboard(10).await {
                        Ok(rows) => println!("{}", render::leaderboard_table(&rows)),
                        Err(e) => println!("Could not fetch the leaderboard: {e}"),
                    }
                }
                Err(e) => println!("Could not submit the score: {e}"),
            }
        }
    }

    println!("Thanks for playing!");
    Ok(())
}
