// Per-position recommendation board.
//
// Each field position gets its own candidate pool. Candidates are ranked twice
// (by average points and by ADP-adjusted value), bucketed into tiers from their
// rank percentiles, then ordered by tier and a blended base score.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::player::{Player, PlayerId, Position, FIELD_POSITIONS};
use crate::catalog::Catalog;
use crate::config::{RecommendConfig, ScoringConfig};
use crate::draft::selection::SelectionSets;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Recommendation tier. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Near the top of the position by average points.
    Proven,
    /// Near the top once draft cost is priced in.
    Value,
    /// Small sample, no scoring yet, or outside both cut-offs.
    Upside,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Proven => "Proven",
            Tier::Value => "Value",
            Tier::Upside => "Upside",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Tier::Proven => 0,
            Tier::Value => 1,
            Tier::Upside => 2,
        }
    }
}

pub const MULTI_POS_TAG: &str = "Multi-Pos";
pub const INJURED_TAG: &str = "Injured";

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationEntry<'a> {
    pub player: &'a Player,
    pub position: Position,
    pub tier: Tier,
    pub value_score: f64,
    pub base_score: f64,
    /// Rank index by average points over pool size (0 = best).
    pub avg_percentile: f64,
    /// Rank index by value score over pool size (0 = best).
    pub value_percentile: f64,
    /// Tier label first, then "Multi-Pos" and "Injured" where they apply.
    pub tags: Vec<&'static str>,
}

impl RecommendationEntry<'_> {
    pub fn player_id(&self) -> PlayerId {
        self.player.id
    }
}

/// Recommendations keyed by field position. Reserve is never present.
pub type RecommendationBoard<'a> = BTreeMap<Position, Vec<RecommendationEntry<'a>>>;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Candidate with the raw numbers the tiering needs.
struct Scored<'a> {
    player: &'a Player,
    avg: f64,
    value: f64,
    base: f64,
}

fn score<'a>(player: &'a Player, scoring: &ScoringConfig) -> Scored<'a> {
    let stats = &player.stats;
    let adp = stats.adp.unwrap_or(scoring.unranked_adp);
    let value = stats.avg_points - adp / scoring.adp_scale;
    let base = scoring.avg_weight * stats.avg_points
        + scoring.total_weight * stats.total_points
        + scoring.adp_weight * (scoring.adp_scale / (adp + 1.0));
    Scored {
        player,
        avg: stats.avg_points,
        value,
        base,
    }
}

/// Percentile of each candidate (by pool index) under a descending sort on `key`.
/// Ties keep pool order.
fn rank_percentiles(pool: &[Scored<'_>], key: impl Fn(&Scored<'_>) -> f64) -> Vec<f64> {
    let n = pool.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        key(&pool[b])
            .partial_cmp(&key(&pool[a]))
            .unwrap_or(Ordering::Equal)
    });
    let mut percentiles = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        percentiles[idx] = rank as f64 / n as f64;
    }
    percentiles
}

fn assign_tier(c: &Scored<'_>, avg_pct: f64, value_pct: f64, scoring: &ScoringConfig) -> Tier {
    if c.player.stats.games_played <= scoring.min_games || c.avg == 0.0 {
        Tier::Upside
    } else if avg_pct <= scoring.percentile_threshold {
        Tier::Proven
    } else if value_pct <= scoring.percentile_threshold {
        Tier::Value
    } else {
        Tier::Upside
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Recommend up to `per_position_count` players for every field position.
///
/// The pool for a position is every catalog player listing it, minus hidden
/// and drafted players, minus prioritized players when `exclude_priority` is
/// set. A multi-position player can appear under several positions. Output is
/// deterministic for a given catalog and selection state.
pub fn recommend<'a>(
    catalog: &'a Catalog,
    sets: &SelectionSets,
    config: &RecommendConfig,
    scoring: &ScoringConfig,
) -> RecommendationBoard<'a> {
    let drafted = sets.drafted_ids();
    let excluded_priority = if config.exclude_priority {
        sets.priority_ids()
    } else {
        BTreeSet::new()
    };

    let mut board = BTreeMap::new();
    for &pos in FIELD_POSITIONS {
        let pool: Vec<Scored<'a>> = catalog
            .players()
            .iter()
            .filter(|p| p.plays(pos))
            .filter(|p| {
                !sets.is_hidden(p.id) && !drafted.contains(&p.id) && !excluded_priority.contains(&p.id)
            })
            .map(|p| score(p, scoring))
            .collect();

        board.insert(pos, rank_position(pos, pool, config.per_position_count, scoring));
    }
    board
}

fn rank_position<'a>(
    pos: Position,
    pool: Vec<Scored<'a>>,
    limit: usize,
    scoring: &ScoringConfig,
) -> Vec<RecommendationEntry<'a>> {
    let avg_pcts = rank_percentiles(&pool, |c| c.avg);
    let value_pcts = rank_percentiles(&pool, |c| c.value);

    let mut entries: Vec<RecommendationEntry<'a>> = pool
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let tier = assign_tier(c, avg_pcts[i], value_pcts[i], scoring);
            let mut tags = vec![tier.label()];
            if c.player.is_multi_position() {
                tags.push(MULTI_POS_TAG);
            }
            if c.player.is_injured() {
                tags.push(INJURED_TAG);
            }
            RecommendationEntry {
                player: c.player,
                position: pos,
                tier,
                value_score: c.value,
                base_score: c.base,
                avg_percentile: avg_pcts[i],
                value_percentile: value_pcts[i],
                tags,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.tier.rank().cmp(&b.tier.rank()).then_with(|| {
            b.base_score
                .partial_cmp(&a.base_score)
                .unwrap_or(Ordering::Equal)
        })
    });
    entries.truncate(limit);
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
