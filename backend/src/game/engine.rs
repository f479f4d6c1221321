use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attempts granted when a new game request does not name a number
pub const DEFAULT_MAX_TRIES: u32 = 5;

const BLANK: char = '_';

/// Lifecycle of a single game.
///
/// `Deleted` is only reachable from `Active`; the other terminal states are
/// reached by playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Won,
    Lost,
    Deleted,
}

/// Why a transition was refused. Refused transitions never mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{0}")]
    InvalidGuess(String),
    #[error("game is no longer playable")]
    GameFinished { deleted: bool },
    #[error("cannot delete completed games")]
    AlreadyFinished,
}

/// One entry of a game's append-only move history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveRecord {
    Guess { guess: String, correct: bool },
    /// Appended once when the last try is used up
    OutOfTries,
}

/// Per-position cells of the hidden word, either revealed or blank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealTracker {
    cells: Vec<Option<char>>,
}

impl RevealTracker {
    /// All-blank tracker with one cell per letter of the word
    pub fn blank(word: &str) -> Self {
        Self {
            cells: vec![None; word.chars().count()],
        }
    }

    /// The tracker stays empty until the first guess is applied
    pub fn is_initialized(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Reveal every position holding `letter`. Returns whether the letter occurs at all.
    pub fn reveal(&mut self, word: &str, letter: char) -> bool {
        let mut found = false;
        for (cell, c) in self.cells.iter_mut().zip(word.chars()) {
            if c.eq_ignore_ascii_case(&letter) {
                *cell = Some(c);
                found = true;
            }
        }
        found
    }

    pub fn reveal_word(&mut self, word: &str) {
        for (cell, c) in self.cells.iter_mut().zip(word.chars()) {
            *cell = Some(c);
        }
    }

    pub fn blanks(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.is_initialized() && self.blanks() == 0
    }

    /// Render progress such as `a__l_`
    pub fn pattern(&self) -> String {
        self.cells.iter().map(|cell| cell.unwrap_or(BLANK)).collect()
    }
}

/// How a finished game ended by play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Won,
    Lost,
}

impl Ending {
    pub fn won(self) -> bool {
        matches!(self, Ending::Won)
    }
}

/// Result of applying one guess
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub correct: bool,
    pub message: String,
    /// Set when this guess moved the game into `Won` or `Lost`
    pub ending: Option<Ending>,
}

/// Complete rule state of one game, independent of storage and transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub game_word: String,
    pub max_tries: u32,
    pub tries_remaining: u32,
    pub game_over: bool,
    pub game_deleted: bool,
    pub current_guesses: RevealTracker,
    pub move_history: Vec<MoveRecord>,
}

impl GameState {
    /// Start a game. `max_tries` must be positive; callers validate it.
    pub fn new(game_word: impl Into<String>, max_tries: u32) -> Self {
        Self {
            game_word: game_word.into(),
            max_tries,
            tries_remaining: max_tries,
            game_over: false,
            game_deleted: false,
            current_guesses: RevealTracker::default(),
            move_history: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.game_deleted {
            GameStatus::Deleted
        } else if !self.game_over {
            GameStatus::Active
        } else if self.tries_remaining == 0 {
            GameStatus::Lost
        } else {
            GameStatus::Won
        }
    }

    pub fn word_length(&self) -> usize {
        self.game_word.chars().count()
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.max_tries.saturating_sub(self.tries_remaining)
    }

    fn ensure_playable(&self) -> Result<(), RuleError> {
        match self.status() {
            GameStatus::Active => Ok(()),
            GameStatus::Deleted => Err(RuleError::GameFinished { deleted: true }),
            GameStatus::Won | GameStatus::Lost => Err(RuleError::GameFinished { deleted: false }),
        }
    }

    /// Apply a guess and return the next state.
    ///
    /// A guess is either the whole answer or a single letter. The whole-word
    /// comparison runs first so that an answer made of one repeated letter is
    /// still an immediate win.
    pub fn apply_guess(&self, raw_guess: &str) -> Result<Transition, RuleError> {
        self.ensure_playable()?;
        let guess = normalize_guess(raw_guess)?;

        let mut next = self.clone();
        if !next.current_guesses.is_initialized() {
            next.current_guesses = RevealTracker::blank(&next.game_word);
        }

        let correct = if guess.eq_ignore_ascii_case(&next.game_word) {
            next.current_guesses.reveal_word(&next.game_word);
            true
        } else {
            let mut letters = guess.chars();
            match (letters.next(), letters.next()) {
                (Some(letter), None) => next.current_guesses.reveal(&next.game_word, letter),
                _ => {
                    return Err(RuleError::InvalidGuess(format!(
                        "'{}' is neither a single letter nor the answer",
                        raw_guess.trim()
                    )))
                }
            }
        };

        next.move_history.push(MoveRecord::Guess { guess, correct });

        let mut message = if correct {
            format!("Correct guess! {}", next.current_guesses.pattern())
        } else {
            next.tries_remaining = next.tries_remaining.saturating_sub(1);
            format!("Wrong guess, {} tries remaining", next.tries_remaining)
        };

        let ending = if next.tries_remaining == 0 {
            next.game_over = true;
            next.move_history.push(MoveRecord::OutOfTries);
            message.push_str(" Game over!");
            Some(Ending::Lost)
        } else if next.current_guesses.is_complete() {
            next.game_over = true;
            message.push_str(&format!(" You win, the word was {}", next.game_word));
            Some(Ending::Won)
        } else {
            None
        };

        Ok(Transition {
            state: next,
            correct,
            message,
            ending,
        })
    }

    /// Soft-delete an active game
    pub fn delete(&self) -> Result<GameState, RuleError> {
        if self.status() != GameStatus::Active {
            return Err(RuleError::AlreadyFinished);
        }
        let mut next = self.clone();
        next.game_deleted = true;
        next.game_over = true;
        Ok(next)
    }
}

/// Trim and lowercase a guess, rejecting anything that isn't ASCII letters
fn normalize_guess(raw: &str) -> Result<String, RuleError> {
    let guess = raw.trim();
    if guess.is_empty() {
        return Err(RuleError::InvalidGuess("a guess is required".to_string()));
    }
    if !guess.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RuleError::InvalidGuess("Only a-z allowed".to_string()));
    }
    Ok(guess.to_ascii_lowercase())
}
