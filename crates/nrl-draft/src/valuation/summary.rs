// Dashboard summary: draft progress counts and the best players still on the board.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::catalog::player::{Player, Position, ALL_POSITIONS};
use crate::catalog::Catalog;
use crate::draft::selection::SelectionSets;

/// How many best-available players the dashboard lists.
pub const BEST_AVAILABLE_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSummary<'a> {
    pub total_players: usize,
    pub drafted: usize,
    pub prioritized: usize,
    /// `total_players - drafted`, floored at zero.
    pub available: usize,
    /// Undrafted players with a real ADP, cheapest ADP first.
    pub best_available: Vec<&'a Player>,
    /// Drafted count per assigned roster position, reserve included.
    pub drafted_by_position: BTreeMap<Position, usize>,
}

pub fn summary<'a>(catalog: &'a Catalog, sets: &SelectionSets) -> DraftSummary<'a> {
    let total_players = catalog.len();
    let drafted = sets.roster_len();

    let mut best_available: Vec<&Player> = catalog
        .players()
        .iter()
        .filter(|p| p.has_adp() && !sets.is_drafted(p.id))
        .collect();
    best_available.sort_by(|a, b| {
        a.stats
            .adp
            .partial_cmp(&b.stats.adp)
            .unwrap_or(Ordering::Equal)
    });
    best_available.truncate(BEST_AVAILABLE_LIMIT);

    let drafted_by_position = ALL_POSITIONS
        .iter()
        .map(|&pos| (pos, sets.roster_bucket(pos).len()))
        .collect();

    DraftSummary {
        total_players,
        drafted,
        prioritized: sets.priority_len(),
        available: total_players.saturating_sub(drafted),
        best_available,
        drafted_by_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::player::{PlayerId, PlayerStats};

    fn player(id: PlayerId, pos: Position, adp: f64) -> Player {
        Player {
            id,
            first_name: format!("P{id}"),
            last_name: String::new(),
            positions: vec![pos],
            stats: PlayerStats {
                adp: Some(adp),
                ..PlayerStats::default()
            },
            status: None,
        }
    }

    #[test]
    fn empty_catalog_summary() {
        let catalog = Catalog::empty();
        let s = summary(&catalog, &SelectionSets::new());
        assert_eq!(s.total_players, 0);
        assert_eq!(s.available, 0);
        assert!(s.best_available.is_empty());
        assert_eq!(s.drafted_by_position.len(), ALL_POSITIONS.len());
        assert!(s.drafted_by_position.values().all(|&n| n == 0));
    }

    #[test]
    fn counts_and_best_available() {
        let mut players: Vec<Player> = (1..=12)
            .map(|id| player(id, Position::Centre, 100.0 - id as f64))
            .collect();
        let mut unranked = player(13, Position::Half, 0.0);
        unranked.stats.adp = None;
        players.push(unranked);
        let catalog = Catalog::new(players);

        let mut sets = SelectionSets::new();
        sets.assign_to_roster(&catalog, 12, Position::Centre);
        sets.assign_to_roster(&catalog, 13, Position::Reserve);
        sets.assign_to_priority(&catalog, 1, Position::Centre);

        let s = summary(&catalog, &sets);
        assert_eq!(s.total_players, 13);
        assert_eq!(s.drafted, 2);
        assert_eq!(s.prioritized, 1);
        assert_eq!(s.available, 11);
        assert_eq!(s.drafted_by_position[&Position::Centre], 1);
        assert_eq!(s.drafted_by_position[&Position::Reserve], 1);
        assert_eq!(s.drafted_by_position[&Position::Hooker], 0);

        let best: Vec<PlayerId> = s.best_available.iter().map(|p| p.id).collect();
        assert_eq!(best, vec![11, 10, 9, 8, 7, 6, 5, 4]);
    }
}
