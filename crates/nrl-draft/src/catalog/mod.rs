// Player catalog: the read-only set of players fetched once per session.

pub mod player;
pub mod query;
pub mod source;

use std::collections::HashMap;

use tracing::warn;

use player::{Player, PlayerId, RawPlayer};

/// Players in feed order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
}

impl Catalog {
    /// Build a catalog from normalized players. Duplicate ids keep the first
    /// occurrence.
    pub fn new(players: Vec<Player>) -> Self {
        let mut kept = Vec::with_capacity(players.len());
        let mut index = HashMap::with_capacity(players.len());
        for player in players {
            if index.contains_key(&player.id) {
                warn!("Duplicate player id {} in catalog, keeping first", player.id);
                continue;
            }
            index.insert(player.id, kept.len());
            kept.push(player);
        }
        Catalog {
            players: kept,
            index,
        }
    }

    pub fn empty() -> Self {
        Catalog::default()
    }

    /// Normalize raw feed records, skipping any without a usable id.
    pub fn from_raw(records: Vec<RawPlayer>) -> Self {
        let total = records.len();
        let players: Vec<Player> = records
            .into_iter()
            .filter_map(RawPlayer::into_player)
            .collect();
        if players.len() < total {
            warn!(
                "Skipped {} catalog records without a usable id",
                total - players.len()
            );
        }
        Catalog::new(players)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
