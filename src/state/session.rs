use thiserror::Error;

/// Number of lives a freshly started game begins with.
pub const INITIAL_LIVES: u32 = 5;
/// Marker shown for letters that have not been guessed yet.
pub const PLACEHOLDER: char = '_';
/// Guesses containing this token end the game immediately.
pub const FORFEIT: &str = "forfeit";

/// Lifecycle of a single Hangman game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The player can keep guessing.
    InProgress,
    /// The secret was fully revealed or guessed outright.
    Won,
    /// The player ran out of lives or forfeited.
    Lost,
}

/// Result of applying one guess, used to pick the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// At least one letter was revealed and the game continues.
    Correct,
    /// The guess was recorded as a mistake and the game continues.
    Incorrect,
    /// The game ended with a win.
    Won,
    /// The game ended with a loss.
    Lost,
}

/// Errors raised by the session state machine and the store around it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A guess or finish was attempted for a user without a running game.
    #[error("no active session for `{0}`")]
    NoActiveSession(String),
    /// The session already reached a terminal state.
    #[error("session already finished as {0:?}")]
    Finished(SessionStatus),
    /// Persisted fields do not describe a consistent game.
    #[error("invalid session: {0}")]
    Invalid(String),
}

/// State of one player's Hangman game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    secret: String,
    lives: u32,
    word_state: Vec<char>,
    mistakes: Vec<String>,
    status: SessionStatus,
}

impl GameSession {
    /// Start a game for `secret` with every position masked.
    pub fn new(secret: impl Into<String>, lives: u32) -> Self {
        let secret = secret.into();
        let word_state = vec![PLACEHOLDER; secret.chars().count()];
        Self {
            secret,
            lives,
            word_state,
            mistakes: Vec::new(),
            status: SessionStatus::InProgress,
        }
    }

    /// Rebuild an in-progress session from persisted fields.
    ///
    /// Every position of `word_state` must be either the placeholder or the
    /// matching letter of `secret`.
    pub fn restore(
        secret: String,
        lives: u32,
        word_state: Vec<char>,
        mistakes: Vec<String>,
    ) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::Invalid("secret must not be empty".into()));
        }

        let secret_len = secret.chars().count();
        if word_state.len() != secret_len {
            return Err(SessionError::Invalid(format!(
                "word_state has {} entries but secret has {secret_len} letters",
                word_state.len()
            )));
        }

        if let Some((index, shown)) = secret
            .chars()
            .zip(word_state.iter())
            .enumerate()
            .find_map(|(index, (letter, shown))| {
                (*shown != PLACEHOLDER && *shown != letter).then_some((index, *shown))
            })
        {
            return Err(SessionError::Invalid(format!(
                "word_state[{index}] shows `{shown}` which is not in the secret at that position"
            )));
        }

        Ok(Self {
            secret,
            lives,
            word_state,
            mistakes,
            status: SessionStatus::InProgress,
        })
    }

    /// The word being guessed.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Remaining lives.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Revealed letters and placeholders, one per secret letter.
    pub fn word_state(&self) -> &[char] {
        &self.word_state
    }

    /// Incorrect guesses in the order they were made.
    pub fn mistakes(&self) -> &[String] {
        &self.mistakes
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether every letter of the secret has been revealed.
    pub fn is_solved(&self) -> bool {
        self.word_state.iter().copied().eq(self.secret.chars())
    }

    /// Apply an already-normalized guess and move the state machine forward.
    pub fn apply_guess(&mut self, guess: &str) -> Result<GuessOutcome, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::Finished(self.status));
        }

        if guess == self.secret {
            self.status = SessionStatus::Won;
            return Ok(GuessOutcome::Won);
        }

        // Nothing to reveal; the player just gets the current state back.
        if guess.is_empty() {
            return Ok(GuessOutcome::Correct);
        }

        if let Some(letter) = single_char(guess).filter(|letter| self.secret.contains(*letter)) {
            self.reveal_letter(letter);
            if self.is_solved() {
                self.status = SessionStatus::Won;
                return Ok(GuessOutcome::Won);
            }
            return Ok(GuessOutcome::Correct);
        }

        // The lives check runs before the mistake is recorded, so the last
        // wrong guess never shows up in `mistakes`.
        if self.lives <= 1 || guess.contains(FORFEIT) {
            self.status = SessionStatus::Lost;
            return Ok(GuessOutcome::Lost);
        }

        self.record_mistake(guess);
        Ok(GuessOutcome::Incorrect)
    }

    /// Reveal every position holding `letter`.
    pub fn reveal_letter(&mut self, letter: char) {
        for (shown, actual) in self.word_state.iter_mut().zip(self.secret.chars()) {
            if actual == letter {
                *shown = letter;
            }
        }
    }

    fn record_mistake(&mut self, guess: &str) {
        self.mistakes.push(guess.to_owned());
        self.lives = self.lives.saturating_sub(1);
    }

    /// Markdown state dump embedded in replies.
    pub fn render(&self) -> String {
        let pattern = self
            .word_state
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "\n\nlives: {}\n\n#{}\n\nmistakes: {}",
            self.lives,
            pattern,
            self.mistakes.join(", ")
        )
    }
}

fn single_char(guess: &str) -> Option<char> {
    let mut chars = guess.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Some(letter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(session: &GameSession) -> String {
        session.word_state().iter().collect()
    }

    #[test]
    fn new_session_is_fully_masked() {
        let session = GameSession::new("kite", INITIAL_LIVES);
        assert_eq!(pattern(&session), "____");
        assert_eq!(session.lives(), 5);
        assert!(session.mistakes().is_empty());
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn kite_scenario_reaches_win() {
        let mut session = GameSession::new("kite", INITIAL_LIVES);

        assert_eq!(session.apply_guess("k").unwrap(), GuessOutcome::Correct);
        assert_eq!(pattern(&session), "k___");
        assert_eq!(session.lives(), 5);

        assert_eq!(session.apply_guess("x").unwrap(), GuessOutcome::Incorrect);
        assert_eq!(pattern(&session), "k___");
        assert_eq!(session.lives(), 4);
        assert_eq!(session.mistakes(), ["x".to_string()]);

        assert_eq!(session.apply_guess("i").unwrap(), GuessOutcome::Correct);
        assert_eq!(session.apply_guess("t").unwrap(), GuessOutcome::Correct);
        assert_eq!(session.apply_guess("e").unwrap(), GuessOutcome::Won);
        assert_eq!(pattern(&session), "kite");
        assert_eq!(session.status(), SessionStatus::Won);
        assert!(!session.render().contains(PLACEHOLDER));
    }

    #[test]
    fn repeated_letters_are_revealed_together() {
        let mut session = GameSession::new("banana", INITIAL_LIVES);
        session.apply_guess("a").unwrap();
        assert_eq!(pattern(&session), "_a_a_a");
        session.apply_guess("n").unwrap();
        assert_eq!(session.apply_guess("b").unwrap(), GuessOutcome::Won);
    }

    #[test]
    fn reveal_letter_is_idempotent() {
        let mut session = GameSession::new("level", INITIAL_LIVES);
        session.reveal_letter('l');
        let once = session.clone();
        session.reveal_letter('l');
        assert_eq!(session, once);
        assert_eq!(pattern(&session), "l___l");
    }

    #[test]
    fn full_word_wins_even_on_last_life() {
        let mut session = GameSession::new("kite", 1);
        assert_eq!(session.apply_guess("kite").unwrap(), GuessOutcome::Won);
        assert_eq!(session.status(), SessionStatus::Won);
    }

    #[test]
    fn wrong_guess_on_last_life_loses_without_recording_mistake() {
        let mut session = GameSession::new("kite", 2);
        session.apply_guess("x").unwrap();
        assert_eq!(session.lives(), 1);

        assert_eq!(session.apply_guess("z").unwrap(), GuessOutcome::Lost);
        assert_eq!(session.status(), SessionStatus::Lost);
        assert_eq!(session.mistakes(), ["x".to_string()]);
        assert_eq!(session.lives(), 1);
    }

    #[test]
    fn forfeit_substring_loses_from_full_lives() {
        let mut session = GameSession::new("forfeiture", INITIAL_LIVES);
        assert_eq!(session.apply_guess("iforfeit").unwrap(), GuessOutcome::Lost);
        assert!(session.mistakes().is_empty());
    }

    #[test]
    fn multi_letter_miss_is_recorded_as_mistake() {
        let mut session = GameSession::new("kite", INITIAL_LIVES);
        assert_eq!(session.apply_guess("ki").unwrap(), GuessOutcome::Incorrect);
        assert_eq!(session.mistakes(), ["ki".to_string()]);
        assert_eq!(session.lives(), 4);
    }

    #[test]
    fn empty_guess_changes_nothing() {
        let mut session = GameSession::new("kite", 1);
        let before = session.clone();
        assert_eq!(session.apply_guess("").unwrap(), GuessOutcome::Correct);
        assert_eq!(session, before);
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn finished_session_rejects_guesses() {
        let mut session = GameSession::new("kite", INITIAL_LIVES);
        session.apply_guess("kite").unwrap();
        let err = session.apply_guess("k").unwrap_err();
        assert_eq!(err, SessionError::Finished(SessionStatus::Won));
    }

    #[test]
    fn render_lists_lives_pattern_and_mistakes() {
        let mut session = GameSession::new("kite", INITIAL_LIVES);
        session.apply_guess("k").unwrap();
        session.apply_guess("x").unwrap();
        session.apply_guess("y").unwrap();
        assert_eq!(
            session.render(),
            "\n\nlives: 3\n\n#k _ _ _\n\nmistakes: x, y"
        );
    }

    #[test]
    fn restore_rejects_inconsistent_word_state() {
        let err = GameSession::restore("kite".into(), 5, vec!['_', '_'], Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(_)));

        let err =
            GameSession::restore("kite".into(), 5, vec!['x', '_', '_', '_'], Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(_)));
    }

    #[test]
    fn restore_keeps_all_fields() {
        let session = GameSession::restore(
            "kite".into(),
            4,
            vec!['k', '_', '_', '_'],
            vec!["x".into()],
        )
        .unwrap();
        assert_eq!(session.secret(), "kite");
        assert_eq!(session.lives(), 4);
        assert_eq!(pattern(&session), "k___");
        assert_eq!(session.mistakes(), ["x".to_string()]);
    }
}
