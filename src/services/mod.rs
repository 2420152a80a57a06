/// Inbox polling driver.
pub mod poll_loop;
/// Reply texts sent back to players.
pub mod reply;
/// Turn processing: new games and guesses.
pub mod turn_service;
/// Secret word supply.
pub mod word_source;
