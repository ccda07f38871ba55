// League board: which league team drafted which player.
//
// Each configured team owns an ordered list of player ids. A player can belong
// to at most one team.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::player::{Player, PlayerId};
use crate::catalog::Catalog;

/// Teams in configured board order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueBoard {
    teams: Vec<TeamPicks>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TeamPicks {
    name: String,
    /// Drafted player ids, in pick order.
    #[serde(default)]
    picks: Vec<PlayerId>,
}

/// Aggregate figures for one team's table footer.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary<'a> {
    pub team: String,
    pub players: Vec<&'a Player>,
    pub total_points: i64,
    pub avg_points: f64,
    pub career_avg: f64,
}

impl LeagueBoard {
    /// Create a board with an empty pick list for every team.
    pub fn new(team_names: &[String]) -> Self {
        LeagueBoard {
            teams: team_names
                .iter()
                .map(|name| TeamPicks {
                    name: name.clone(),
                    picks: Vec::new(),
                })
                .collect(),
        }
    }

    /// Align a loaded board with the configured teams: the board takes the
    /// configured order, missing teams are added empty, and unconfigured
    /// teams are dropped.
    pub fn conform_to(&mut self, team_names: &[String]) {
        let mut aligned = Vec::with_capacity(team_names.len());
        for name in team_names {
            let picks = match self.teams.iter().position(|t| &t.name == name) {
                Some(idx) => self.teams.swap_remove(idx).picks,
                None => Vec::new(),
            };
            aligned.push(TeamPicks {
                name: name.clone(),
                picks,
            });
        }
        for team in &self.teams {
            warn!(
                "Dropping {} picks for unconfigured team '{}'",
                team.picks.len(),
                team.name
            );
        }
        self.teams = aligned;
    }

    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.name.as_str())
    }

    pub fn picks(&self, team: &str) -> &[PlayerId] {
        self.team(team).map(|t| t.picks.as_slice()).unwrap_or(&[])
    }

    /// The team a player was drafted to, if any.
    pub fn team_of(&self, id: PlayerId) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.picks.contains(&id))
            .map(|t| t.name.as_str())
    }

    fn team(&self, name: &str) -> Option<&TeamPicks> {
        self.teams.iter().find(|t| t.name == name)
    }

    fn team_mut(&mut self, name: &str) -> Option<&mut TeamPicks> {
        self.teams.iter_mut().find(|t| t.name == name)
    }

    /// Record a pick. No-op for unknown teams, unknown players, or players
    /// already on any team.
    pub fn draft_to_team(&mut self, catalog: &Catalog, id: PlayerId, team: &str) -> bool {
        if !catalog.contains(id) {
            debug!("draft_to_team: unknown player {id}");
            return false;
        }
        if self.team_of(id).is_some() {
            return false;
        }
        match self.team_mut(team) {
            Some(entry) => {
                entry.picks.push(id);
                true
            }
            None => {
                debug!("draft_to_team: unknown team '{team}'");
                false
            }
        }
    }

    pub fn remove_from_team(&mut self, id: PlayerId, team: &str) -> bool {
        let Some(entry) = self.team_mut(team) else {
            return false;
        };
        let len = entry.picks.len();
        entry.picks.retain(|&p| p != id);
        entry.picks.len() != len
    }

    /// Empty every team's pick list, keeping the teams themselves.
    pub fn reset_teams(&mut self) -> bool {
        let changed = self.teams.iter().any(|t| !t.picks.is_empty());
        for team in &mut self.teams {
            team.picks.clear();
        }
        changed
    }

    /// Team footer figures. Stats are truncated to whole numbers before
    /// summing, and averages of an empty team are zero.
    pub fn team_summary<'a>(&self, catalog: &'a Catalog, team: &str) -> TeamSummary<'a> {
        let players: Vec<&Player> = self
            .picks(team)
            .iter()
            .filter_map(|&id| catalog.get(id))
            .collect();

        let sum = |f: fn(&Player) -> f64| -> i64 {
            players.iter().map(|p| f(p).trunc() as i64).sum()
        };
        let total_points = sum(|p| p.stats.total_points);
        let avg_sum = sum(|p| p.stats.avg_points);
        let career_sum = sum(|p| p.stats.career_avg);

        let mean = |total: i64| {
            if players.is_empty() {
                0.0
            } else {
                total as f64 / players.len() as f64
            }
        };

        TeamSummary {
            team: team.to_string(),
            total_points,
            avg_points: mean(avg_sum),
            career_avg: mean(career_sum),
            players,
        }
    }
}
