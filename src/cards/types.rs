//! Card and season enumerations.

use serde::{Deserialize, Serialize};

/// Every card in the base set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardName {
    Architect,
    Bard,
    BargeToad,
    Castle,
    Cemetery,
    Chapel,
    ChipSweep,
    ClockTower,
    Courthouse,
    Crane,
    Doctor,
    Dungeon,
    Evertree,
    Fairgrounds,
    Farm,
    Fool,
    GeneralStore,
    Historian,
    Husband,
    Inn,
    Innkeeper,
    Judge,
    King,
    Lookout,
    Mine,
    MinerMole,
    Monastery,
    Monk,
    Palace,
    Peddler,
    PostOffice,
    PostalPigeon,
    Queen,
    Ranger,
    ResinRefinery,
    Ruins,
    School,
    Shepherd,
    Shopkeeper,
    Storehouse,
    Teacher,
    Theatre,
    TwigBarge,
    Undertaker,
    University,
    Wanderer,
    Wife,
    Woodcarver,
}

impl CardName {
    /// Every card name, in catalog order.
    pub const ALL: [CardName; 48] = [
        CardName::Architect,
        CardName::Bard,
        CardName::BargeToad,
        CardName::Castle,
        CardName::Cemetery,
        CardName::Chapel,
        CardName::ChipSweep,
        CardName::ClockTower,
        CardName::Courthouse,
        CardName::Crane,
        CardName::Doctor,
        CardName::Dungeon,
        CardName::Evertree,
        CardName::Fairgrounds,
        CardName::Farm,
        CardName::Fool,
        CardName::GeneralStore,
        CardName::Historian,
        CardName::Husband,
        CardName::Inn,
        CardName::Innkeeper,
        CardName::Judge,
        CardName::King,
        CardName::Lookout,
        CardName::Mine,
        CardName::MinerMole,
        CardName::Monastery,
        CardName::Monk,
        CardName::Palace,
        CardName::Peddler,
        CardName::PostOffice,
        CardName::PostalPigeon,
        CardName::Queen,
        CardName::Ranger,
        CardName::ResinRefinery,
        CardName::Ruins,
        CardName::School,
        CardName::Shepherd,
        CardName::Shopkeeper,
        CardName::Storehouse,
        CardName::Teacher,
        CardName::Theatre,
        CardName::TwigBarge,
        CardName::Undertaker,
        CardName::University,
        CardName::Wanderer,
        CardName::Wife,
        CardName::Woodcarver,
    ];
}

impl std::fmt::Display for CardName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The five card categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    /// Tan: one-shot effects on play.
    Traveler,
    /// Green: activated on play and at each production season.
    Production,
    /// Red: hosts visiting workers.
    Destination,
    /// Blue: passive rules modifiers.
    Governance,
    /// Purple: end-game scoring.
    Prosperity,
}

impl CardType {
    pub const ALL: [CardType; 5] = [
        CardType::Traveler,
        CardType::Production,
        CardType::Destination,
        CardType::Governance,
        CardType::Prosperity,
    ];
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The four seasons a player moves through, in order. Seasons never wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// The season after this one, or `None` after autumn.
    #[must_use]
    pub fn next(self) -> Option<Season> {
        match self {
            Season::Winter => Some(Season::Spring),
            Season::Spring => Some(Season::Summer),
            Season::Summer => Some(Season::Autumn),
            Season::Autumn => None,
        }
    }

    /// Workers gained when a player's season advances *into* this season.
    #[must_use]
    pub fn workers_granted(self) -> u8 {
        match self {
            Season::Winter => 0,
            Season::Spring | Season::Summer => 1,
            Season::Autumn => 2,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_progression_never_wraps() {
        assert_eq!(Season::Winter.next(), Some(Season::Spring));
        assert_eq!(Season::Spring.next(), Some(Season::Summer));
        assert_eq!(Season::Summer.next(), Some(Season::Autumn));
        assert_eq!(Season::Autumn.next(), None);
    }

    #[test]
    fn test_worker_grants_total_six() {
        // 2 starting workers + grants across the three advances = 6.
        let total: u8 = 2 + Season::Spring.workers_granted()
            + Season::Summer.workers_granted()
            + Season::Autumn.workers_granted();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_card_name_serde_format() {
        let json = serde_json::to_string(&CardName::BargeToad).unwrap();
        assert_eq!(json, "\"BARGE_TOAD\"");
        let back: CardName = serde_json::from_str("\"POSTAL_PIGEON\"").unwrap();
        assert_eq!(back, CardName::PostalPigeon);
    }

    #[test]
    fn test_all_names_unique() {
        let mut names = CardName::ALL.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 48);
    }
}
