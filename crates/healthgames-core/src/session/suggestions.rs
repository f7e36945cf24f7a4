use chrono::Utc;

use crate::events::Event;
use crate::games::{find_game, GameInfo};

/// Holds the games the assistant most recently suggested.
///
/// The list is replaced wholesale on every call and kept verbatim; ids are
/// only resolved against the catalog when the picker asks for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionRelay {
    game_ids: Vec<String>,
}

impl SuggestionRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggest<I, T>(&mut self, game_ids: I) -> Event
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.game_ids = game_ids.into_iter().map(Into::into).collect();
        Event::SuggestionsUpdated {
            game_ids: self.game_ids.clone(),
            at: Utc::now(),
        }
    }

    pub fn current(&self) -> &[String] {
        &self.game_ids
    }

    pub fn clear(&mut self) {
        self.game_ids.clear();
    }

    /// Catalog entries for the suggested ids that name a known game, in
    /// suggestion order.
    pub fn highlighted(&self) -> Vec<&'static GameInfo> {
        self.game_ids.iter().filter_map(|id| find_game(id)).collect()
    }

    pub fn is_highlighted(&self, game_id: &str) -> bool {
        self.game_ids.iter().any(|id| id == game_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameId;

    #[test]
    fn suggest_replaces_without_dedupe() {
        let mut relay = SuggestionRelay::new();
        relay.suggest(["memory", "breathing"]);
        relay.suggest(["reaction", "reaction", "not-a-game"]);
        assert_eq!(relay.current(), ["reaction", "reaction", "not-a-game"]);
        assert!(relay.is_highlighted("not-a-game"));
        assert!(!relay.is_highlighted("memory"));
    }

    #[test]
    fn highlighted_skips_unknown_ids_in_order() {
        let mut relay = SuggestionRelay::new();
        let event = relay.suggest(vec![
            "music-therapy".to_string(),
            "yoga".to_string(),
            "memory".to_string(),
        ]);
        assert!(matches!(event, Event::SuggestionsUpdated { ref game_ids, .. } if game_ids.len() == 3));

        let ids: Vec<GameId> = relay.highlighted().iter().map(|g| g.id).collect();
        assert_eq!(ids, [GameId::MusicTherapy, GameId::Memory]);
    }
}
