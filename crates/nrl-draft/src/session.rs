// Draft session: owns the catalog, the user's selection sets and the league
// board, and keeps them saved.
//
// Every state-changing call updates memory first and then hands the changed
// documents to their debounced savers. The priority list, drafted roster and
// hidden set are separate documents, each saved under its own key. In-memory
// state is authoritative; a failed save is logged by the saver and never
// surfaces here.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::player::{Player, PlayerId, Position};
use crate::catalog::query::PlayerQuery;
use crate::catalog::Catalog;
use crate::config::{Config, RecommendConfig, StorageConfig, StrategyConfig};
use crate::draft::league::{LeagueBoard, TeamSummary};
use crate::draft::selection::{Buckets, DragMove, SelectionSets, SetKind};
use crate::persistence::{load_document, SaveScheduler, StateStore};
use crate::valuation::recommend::{recommend, RecommendationBoard};
use crate::valuation::summary::{summary, DraftSummary};

/// One debounced saver per stored document.
struct Savers {
    priority: SaveScheduler,
    roster: SaveScheduler,
    hidden: SaveScheduler,
    league: SaveScheduler,
}

impl Savers {
    fn spawn(store: Arc<dyn StateStore>, storage: &StorageConfig) -> Self {
        let window = storage.debounce();
        Savers {
            priority: SaveScheduler::spawn(store.clone(), &storage.priority_key, window),
            roster: SaveScheduler::spawn(store.clone(), &storage.roster_key, window),
            hidden: SaveScheduler::spawn(store.clone(), &storage.hidden_key, window),
            league: SaveScheduler::spawn(store, &storage.league_key, window),
        }
    }

    async fn shutdown(self) {
        self.priority.shutdown().await;
        self.roster.shutdown().await;
        self.hidden.shutdown().await;
        self.league.shutdown().await;
    }
}

pub struct DraftSession {
    catalog: Catalog,
    sets: SelectionSets,
    board: LeagueBoard,
    strategy: StrategyConfig,
    savers: Savers,
}

impl DraftSession {
    /// Load saved state (falling back to empty documents) and start the
    /// debounced savers. Must be called inside a tokio runtime.
    pub async fn start(config: &Config, catalog: Catalog, store: Arc<dyn StateStore>) -> Self {
        let storage = &config.storage;

        let priority: Buckets = load_document(store.as_ref(), &storage.priority_key).await;
        let roster: Buckets = load_document(store.as_ref(), &storage.roster_key).await;
        let hidden: BTreeSet<PlayerId> = load_document(store.as_ref(), &storage.hidden_key).await;
        let mut sets = SelectionSets::from_parts(priority, roster, hidden);
        if sets.normalize() {
            info!("Dropped stale priority entries from saved selections");
        }

        let mut board: LeagueBoard = load_document(store.as_ref(), &storage.league_key).await;
        board.conform_to(&config.league.teams);

        info!(
            "Session started: {} players, {} drafted, {} prioritized, {} hidden",
            catalog.len(),
            sets.roster_len(),
            sets.priority_len(),
            sets.hidden().len()
        );

        DraftSession {
            catalog,
            sets,
            board,
            strategy: config.strategy.clone(),
            savers: Savers::spawn(store, storage),
        }
    }

    /// Flush pending saves and stop the savers.
    pub async fn shutdown(self) {
        self.savers.shutdown().await;
        info!("Session saved and closed");
    }

    // --- Read access ---

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sets(&self) -> &SelectionSets {
        &self.sets
    }

    pub fn board(&self) -> &LeagueBoard {
        &self.board
    }

    pub fn recommend_config(&self) -> &RecommendConfig {
        &self.strategy.recommend
    }

    pub fn set_recommend_config(&mut self, config: RecommendConfig) {
        self.strategy.recommend = config;
    }

    pub fn recommend(&self) -> RecommendationBoard<'_> {
        recommend(
            &self.catalog,
            &self.sets,
            &self.strategy.recommend,
            &self.strategy.scoring,
        )
    }

    pub fn search(&self, query: &PlayerQuery) -> Vec<&Player> {
        query.run(&self.catalog, self.sets.hidden())
    }

    pub fn summary(&self) -> DraftSummary<'_> {
        summary(&self.catalog, &self.sets)
    }

    pub fn team_of(&self, id: PlayerId) -> Option<&str> {
        self.board.team_of(id)
    }

    pub fn team_summary(&self, team: &str) -> TeamSummary<'_> {
        self.board.team_summary(&self.catalog, team)
    }

    /// Summaries for every team, in board order.
    pub fn team_summaries(&self) -> Vec<TeamSummary<'_>> {
        self.board
            .team_names()
            .map(|name| self.team_summary(name))
            .collect()
    }

    // --- Selection sets ---

    pub fn assign_to_priority(&mut self, id: PlayerId, pos: Position) -> bool {
        self.update_selection("assign_to_priority", |sets, catalog| {
            sets.assign_to_priority(catalog, id, pos)
        })
    }

    pub fn assign_to_roster(&mut self, id: PlayerId, pos: Position) -> bool {
        self.update_selection("assign_to_roster", |sets, catalog| {
            sets.assign_to_roster(catalog, id, pos)
        })
    }

    pub fn reorder_priority(&mut self, pos: Position, from: usize, to: usize) -> bool {
        self.update_selection("reorder_priority", |sets, _| {
            sets.reorder_priority(pos, from, to)
        })
    }

    pub fn apply_drag(&mut self, drag: DragMove) -> bool {
        self.update_selection("apply_drag", |sets, _| sets.apply_drag(drag))
    }

    pub fn remove_from_priority(&mut self, id: PlayerId) -> bool {
        self.update_selection("remove_from_priority", |sets, _| {
            sets.remove_from_priority(id)
        })
    }

    pub fn remove_from_roster(&mut self, id: PlayerId) -> bool {
        self.update_selection("remove_from_roster", |sets, _| sets.remove_from_roster(id))
    }

    pub fn mark_hidden(&mut self, id: PlayerId) -> bool {
        self.update_selection("mark_hidden", |sets, _| sets.mark_hidden(id))
    }

    pub fn unhide(&mut self, id: PlayerId) -> bool {
        self.update_selection("unhide", |sets, _| sets.unhide(id))
    }

    pub fn clear_priority(&mut self) -> bool {
        self.update_selection("clear_priority", |sets, _| sets.clear_priority())
    }

    pub fn clear_roster(&mut self) -> bool {
        self.update_selection("clear_roster", |sets, _| sets.clear_roster())
    }

    pub fn clear_hidden(&mut self) -> bool {
        self.update_selection("clear_hidden", |sets, _| sets.clear_hidden())
    }

    pub fn clear_position(&mut self, kind: SetKind, pos: Position) -> bool {
        self.update_selection("clear_position", |sets, _| sets.clear_position(kind, pos))
    }

    /// Empty every selection set. Always saves all three documents, so stale
    /// stored copies are overwritten even when memory was already empty.
    pub fn reset_all(&mut self) -> bool {
        let changed = self.sets.reset_all();
        self.savers.priority.schedule(self.sets.priority());
        self.savers.roster.schedule(self.sets.roster());
        self.savers.hidden.schedule(self.sets.hidden());
        info!("Selection sets reset");
        changed
    }

    // --- League board ---

    pub fn draft_to_team(&mut self, id: PlayerId, team: &str) -> bool {
        let changed = self.board.draft_to_team(&self.catalog, id, team);
        self.league_changed("draft_to_team", changed)
    }

    pub fn remove_from_team(&mut self, id: PlayerId, team: &str) -> bool {
        let changed = self.board.remove_from_team(id, team);
        self.league_changed("remove_from_team", changed)
    }

    pub fn reset_teams(&mut self) -> bool {
        let changed = self.board.reset_teams();
        self.savers.league.schedule(&self.board);
        info!("League board reset");
        changed
    }

    // --- Helpers ---

    /// Apply a selection mutation and schedule a save of each document it
    /// changed.
    fn update_selection<F>(&mut self, op: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut SelectionSets, &Catalog) -> bool,
    {
        let before = self.sets.clone();
        if !mutate(&mut self.sets, &self.catalog) {
            debug!("{op}: no change");
            return false;
        }
        if before.priority() != self.sets.priority() {
            self.savers.priority.schedule(self.sets.priority());
        }
        if before.roster() != self.sets.roster() {
            self.savers.roster.schedule(self.sets.roster());
        }
        if before.hidden() != self.sets.hidden() {
            self.savers.hidden.schedule(self.sets.hidden());
        }
        true
    }

    fn league_changed(&self, op: &str, changed: bool) -> bool {
        if changed {
            self.savers.league.schedule(&self.board);
        } else {
            debug!("{op}: no change");
        }
        changed
    }
}
