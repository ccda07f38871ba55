// Player database query: filter, name search, and column sort.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::player::{Player, PlayerId, Position};
use super::Catalog;

/// Sortable player-table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Adp,
    FirstName,
    Positions,
    GamesPlayed,
    TotalPoints,
    AvgPoints,
    CareerAvg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Current column sort. Selecting the active column flips its direction;
/// selecting a new column starts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub active: Option<(SortKey, SortDirection)>,
}

impl SortState {
    pub fn toggle(&mut self, key: SortKey) {
        let next = match self.active {
            Some((current, SortDirection::Ascending)) if current == key => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.active = Some((key, next));
    }
}

/// Filters applied to the catalog before sorting.
#[derive(Debug, Clone, Default)]
pub struct PlayerQuery {
    /// Case-insensitive substring of "first last".
    pub search: String,
    pub position: Option<Position>,
    pub min_games: Option<f64>,
    pub injured_only: bool,
    /// Hide players with zero games played or a zero ADP.
    pub hide_zero: bool,
    pub multi_position_only: bool,
    pub sort: SortState,
}

impl PlayerQuery {
    pub fn matches(&self, player: &Player) -> bool {
        if let Some(pos) = self.position {
            if !player.plays(pos) {
                return false;
            }
        }
        if let Some(min) = self.min_games {
            if player.stats.games_played < min {
                return false;
            }
        }
        if self.injured_only && !player.is_injured() {
            return false;
        }
        if self.hide_zero && (player.stats.games_played == 0.0 || player.stats.adp == Some(0.0)) {
            return false;
        }
        if self.multi_position_only && !player.is_multi_position() {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || player.full_name().to_lowercase().contains(&needle)
    }

    /// Run the query over the catalog. Hidden players never appear.
    pub fn run<'a>(&self, catalog: &'a Catalog, hidden: &BTreeSet<PlayerId>) -> Vec<&'a Player> {
        let mut result: Vec<&Player> = catalog
            .players()
            .iter()
            .filter(|p| !hidden.contains(&p.id) && self.matches(p))
            .collect();

        if let Some((key, direction)) = self.sort.active {
            result.sort_by(|a, b| {
                let ord = compare_by(a, b, key);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        result
    }
}

fn compare_by(a: &Player, b: &Player, key: SortKey) -> Ordering {
    let num = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match key {
        // Unranked players sort after every ranked one.
        SortKey::Adp => num(
            a.stats.adp.unwrap_or(f64::INFINITY),
            b.stats.adp.unwrap_or(f64::INFINITY),
        ),
        SortKey::FirstName => a.first_name.cmp(&b.first_name),
        SortKey::Positions => a.positions_label().cmp(&b.positions_label()),
        SortKey::GamesPlayed => num(a.stats.games_played, b.stats.games_played),
        SortKey::TotalPoints => num(a.stats.total_points, b.stats.total_points),
        SortKey::AvgPoints => num(a.stats.avg_points, b.stats.avg_points),
        SortKey::CareerAvg => num(a.stats.career_avg, b.stats.career_avg),
    }
}
