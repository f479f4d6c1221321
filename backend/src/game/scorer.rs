use super::engine::GameState;

/// Result of scoring a finished game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    /// Points awarded for the game
    pub points: i32,
    /// Tries used up by wrong guesses
    pub wrong_guesses: i32,
    pub won: bool,
}

pub struct Scorer;

impl Scorer {
    /// Calculate the points for a finished game.
    ///
    /// Scoring rules:
    /// - Word length times tries left rewards long words solved with few mistakes
    /// - Dividing by max tries discounts games played on an easier setting
    /// - Integer division, so a loss (0 tries left) is always worth 0
    /// - Winning carries no separate bonus
    pub fn points(word_length: usize, tries_remaining: u32, max_tries: u32, _won: bool) -> i32 {
        if max_tries == 0 {
            return 0;
        }
        let product = word_length as u64 * u64::from(tries_remaining);
        i32::try_from(product / u64::from(max_tries)).unwrap_or(i32::MAX)
    }

    /// Score a game that just reached `Won` or `Lost`
    pub fn score_game(state: &GameState, won: bool) -> ScoreResult {
        ScoreResult {
            points: Self::points(state.word_length(), state.tries_remaining, state.max_tries, won),
            wrong_guesses: i32::try_from(state.wrong_guesses()).unwrap_or(i32::MAX),
            won,
        }
    }
}
