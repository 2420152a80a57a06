/// Single-player Hangman state machine.
pub mod session;
/// Keyed collection of running games and their persistence.
pub mod store;

pub use self::session::{GameSession, GuessOutcome, SessionError};
pub use self::store::SessionStore;
