//! Static metadata shown by the game picker.

use serde::Serialize;

use super::GameId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub id: GameId,
    pub name: &'static str,
    pub description: &'static str,
    pub benefits: [&'static str; 3],
}

static CATALOG: [GameInfo; 9] = [
    GameInfo {
        id: GameId::Memory,
        name: "Memory Match",
        description: "Exercise your memory by matching pairs of cards",
        benefits: [
            "Improves cognitive function",
            "Enhances memory",
            "Helps with focus and concentration",
        ],
    },
    GameInfo {
        id: GameId::Reaction,
        name: "Reaction Time",
        description: "Test and improve your reaction time",
        benefits: [
            "Improves cognitive processing speed",
            "Enhances hand-eye coordination",
            "Fun way to stay mentally sharp",
        ],
    },
    GameInfo {
        id: GameId::WordScramble,
        name: "Word Scramble",
        description: "Unscramble words to boost vocabulary and cognitive skills",
        benefits: [
            "Expands vocabulary",
            "Improves cognitive flexibility",
            "Enhances problem-solving skills",
        ],
    },
    GameInfo {
        id: GameId::ColorRelaxation,
        name: "Color Therapy",
        description: "Interactive color-based relaxation exercise",
        benefits: [
            "Reduces stress and anxiety",
            "Improves mood",
            "Enhances focus and mindfulness",
        ],
    },
    GameInfo {
        id: GameId::PatternMatch,
        name: "Pattern Matching",
        description: "Find and match visual patterns quickly",
        benefits: [
            "Improves visual processing",
            "Enhances pattern recognition",
            "Boosts cognitive speed",
        ],
    },
    GameInfo {
        id: GameId::FocusCounter,
        name: "Focus Counter",
        description: "Count specific objects while ignoring distractions",
        benefits: [
            "Improves selective attention",
            "Enhances concentration",
            "Trains visual discrimination",
        ],
    },
    GameInfo {
        id: GameId::MathChallenge,
        name: "Mental Math",
        description: "Quick arithmetic challenges to boost brain power",
        benefits: [
            "Enhances numerical reasoning",
            "Improves mental calculation speed",
            "Keeps the brain active",
        ],
    },
    GameInfo {
        id: GameId::MusicTherapy,
        name: "Musical Memory",
        description: "Remember and replay musical patterns",
        benefits: [
            "Improves auditory memory",
            "Enhances concentration",
            "Provides stress relief through music",
        ],
    },
    GameInfo {
        id: GameId::Breathing,
        name: "Breathing Exercise",
        description: "Guided breathing exercise for stress and anxiety relief",
        benefits: [
            "Reduces stress and anxiety",
            "Improves lung function",
            "Helps with mindfulness",
        ],
    },
];

/// Every game in picker order.
pub fn catalog() -> &'static [GameInfo] {
    &CATALOG
}

/// Look up a game by its string id. Unknown ids resolve to `None`.
pub fn find_game(id: &str) -> Option<&'static GameInfo> {
    CATALOG.iter().find(|info| info.id.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_game() {
        let mut ids: Vec<GameId> = catalog().iter().map(|g| g.id).collect();
        ids.sort();
        let mut all = GameId::ALL.to_vec();
        all.sort();
        assert_eq!(ids, all);
    }

    #[test]
    fn lookup_by_string_id() {
        assert_eq!(find_game("math-challenge").unwrap().name, "Mental Math");
        assert!(find_game("body-scan").is_none());
    }
}
