use crate::state::GameSession;

/// Text sent when the player wins.
pub const WIN_TEXT: &str = "You win! Big-brained, you are.";
/// Text sent when the player loses, followed by the secret.
pub const LOSS_TEXT: &str = "You lose. Try again.";
/// Default footer appended to every reply.
pub const DEFAULT_FOOTER: &str = "[Source](https://github.students.cs.ubc.ca/azhou02/hangman-bot)";

/// Situation a reply is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyContext {
    /// A game was just started.
    New,
    /// A guess revealed at least one letter.
    Correct,
    /// A guess was recorded as a mistake.
    Incorrect,
    /// The game ended in a win.
    Win,
    /// The game ended in a loss.
    Loss,
}

/// Message to post back to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Why the reply was produced.
    pub context: ReplyContext,
    /// Markdown body, footer included.
    pub text: String,
}

impl Reply {
    /// Build the reply for `game` in the given context.
    pub fn render(context: ReplyContext, game: &GameSession, footer: &str) -> Self {
        let body = match context {
            ReplyContext::New => game.render(),
            ReplyContext::Correct => format!("Correct!{}", game.render()),
            ReplyContext::Incorrect => format!("Incorrect!{}", game.render()),
            ReplyContext::Loss => format!("{LOSS_TEXT}\n\nWord: {}", game.secret()),
            ReplyContext::Win => WIN_TEXT.to_owned(),
        };
        Self {
            context,
            text: format!("{body}\n\n{footer}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::INITIAL_LIVES;

    #[test]
    fn loss_reveals_secret() {
        let game = GameSession::new("kite", INITIAL_LIVES);
        let reply = Reply::render(ReplyContext::Loss, &game, "footer");
        assert_eq!(reply.text, "You lose. Try again.\n\nWord: kite\n\nfooter");
    }

    #[test]
    fn win_has_no_state_dump() {
        let game = GameSession::new("kite", INITIAL_LIVES);
        let reply = Reply::render(ReplyContext::Win, &game, "footer");
        assert_eq!(reply.text, format!("{WIN_TEXT}\n\nfooter"));
    }

    #[test]
    fn progress_replies_embed_state() {
        let game = GameSession::new("kite", INITIAL_LIVES);
        let reply = Reply::render(ReplyContext::Incorrect, &game, "footer");
        assert!(reply.text.starts_with("Incorrect!\n\nlives: 5"));
        assert!(reply.text.ends_with("\n\nfooter"));
    }

    #[test]
    fn default_footer_links_source_repository() {
        let game = GameSession::new("kite", INITIAL_LIVES);
        let reply = Reply::render(ReplyContext::New, &game, DEFAULT_FOOTER);
        assert!(
            reply
                .text
                .ends_with("\n\n[Source](https://github.students.cs.ubc.ca/azhou02/hangman-bot)")
        );
    }
}
