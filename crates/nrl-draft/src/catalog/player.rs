// Player schema and ingestion defaults.
//
// Raw records from the catalog feed are loosely typed: ids arrive as numbers or
// strings, positions as a label string or a list of numeric codes, and stats as
// numbers, numeric strings, or nothing at all. Everything is normalized here,
// once, so the rest of the crate reads plain `f64`s. The one exception is ADP,
// where "not ranked" is kept as `None` rather than folded into a number.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable player identifier from the catalog feed.
pub type PlayerId = u64;

/// Default draft position scoring assumes for players the feed does not rank.
pub const UNRANKED_ADP: f64 = 9999.0;

/// Rugby-league positions used for roster buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "HOK")]
    Hooker,
    #[serde(rename = "MID")]
    Middle,
    #[serde(rename = "EDG")]
    Edge,
    #[serde(rename = "HLF")]
    Half,
    #[serde(rename = "CTR")]
    Centre,
    #[serde(rename = "WFB")]
    WingFullback,
    #[serde(rename = "RES")]
    Reserve,
}

/// Every position, in board order.
pub const ALL_POSITIONS: &[Position] = &[
    Position::Hooker,
    Position::Middle,
    Position::Edge,
    Position::Half,
    Position::Centre,
    Position::WingFullback,
    Position::Reserve,
];

/// Positions that receive recommendations (the reserve bench is excluded).
pub const FIELD_POSITIONS: &[Position] = &[
    Position::Hooker,
    Position::Middle,
    Position::Edge,
    Position::Half,
    Position::Centre,
    Position::WingFullback,
];

impl Position {
    /// Parse a position label ("HOK", "mid", ...). Unknown labels yield `None`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HOK" => Some(Position::Hooker),
            "MID" => Some(Position::Middle),
            "EDG" => Some(Position::Edge),
            "HLF" => Some(Position::Half),
            "CTR" => Some(Position::Centre),
            "WFB" => Some(Position::WingFullback),
            "RES" => Some(Position::Reserve),
            _ => None,
        }
    }

    /// Map a numeric position code from the NRL fantasy feed.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Position::Hooker),
            2 => Some(Position::Middle),
            3 => Some(Position::Edge),
            4 => Some(Position::Half),
            5 => Some(Position::Centre),
            6 => Some(Position::WingFullback),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Hooker => "HOK",
            Position::Middle => "MID",
            Position::Edge => "EDG",
            Position::Half => "HLF",
            Position::Centre => "CTR",
            Position::WingFullback => "WFB",
            Position::Reserve => "RES",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// Parse a comma-separated position string ("HOK, MID") into positions,
/// dropping unknown labels and duplicates while keeping order.
pub fn parse_positions(s: &str) -> Vec<Position> {
    let mut out = Vec::new();
    for pos in s.split(',').filter_map(Position::from_str_pos) {
        if !out.contains(&pos) {
            out.push(pos);
        }
    }
    out
}

/// Season statistics, already defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: f64,
    pub total_points: f64,
    pub avg_points: f64,
    pub career_avg: f64,
    /// Average draft position; `None` when the feed had no usable value.
    pub adp: Option<f64>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        PlayerStats {
            games_played: 0.0,
            total_points: 0.0,
            avg_points: 0.0,
            career_avg: 0.0,
            adp: None,
        }
    }
}

/// A catalog player. Read-only once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    /// Innate positions, in feed order. May be empty for unknown labels.
    pub positions: Vec<Position>,
    pub stats: PlayerStats,
    pub status: Option<String>,
}

impl Player {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    pub fn plays(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn is_multi_position(&self) -> bool {
        self.positions.len() > 1
    }

    pub fn is_injured(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("injured"))
    }

    /// Whether the feed supplied a real draft position.
    pub fn has_adp(&self) -> bool {
        self.stats.adp.is_some()
    }

    /// Positions joined the way the feed labels them ("HOK, MID").
    pub fn positions_label(&self) -> String {
        self.positions
            .iter()
            .map(Position::display_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// Raw feed records
// ---------------------------------------------------------------------------

/// A player record as delivered by the catalog feed, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub positions: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stats: Option<RawStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub games_played: Value,
    #[serde(default)]
    pub total_points: Value,
    #[serde(default)]
    pub avg_points: Value,
    #[serde(default)]
    pub career_avg: Value,
    #[serde(default)]
    pub adp: Value,
}

impl RawPlayer {
    /// Normalize into a [`Player`]. Returns `None` when the record has no
    /// usable id.
    pub fn into_player(self) -> Option<Player> {
        let id = parse_id(&self.id)?;
        let stats = self.stats.unwrap_or_default();
        Some(Player {
            id,
            first_name: self
                .first_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "No Name".to_string()),
            last_name: self.last_name.unwrap_or_default(),
            positions: positions_from_value(&self.positions),
            stats: PlayerStats {
                games_played: number_or(&stats.games_played, 0.0),
                total_points: number_or(&stats.total_points, 0.0),
                avg_points: number_or(&stats.avg_points, 0.0),
                career_avg: number_or(&stats.career_avg, 0.0),
                adp: number(&stats.adp),
            },
            status: self.status.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Read a loosely-typed numeric field. Non-finite or non-numeric values are
/// `None`.
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn number_or(value: &Value, default: f64) -> f64 {
    number(value).unwrap_or(default)
}

fn parse_id(value: &Value) -> Option<PlayerId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn positions_from_value(value: &Value) -> Vec<Position> {
    match value {
        Value::String(s) => parse_positions(s),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                let pos = match item {
                    Value::Number(n) => n.as_u64().and_then(Position::from_code),
                    Value::String(s) => Position::from_str_pos(s),
                    _ => None,
                };
                if let Some(pos) = pos {
                    if !out.contains(&pos) {
                        out.push(pos);
                    }
                }
            }
            out
        }
        Value::Number(n) => n.as_u64().and_then(Position::from_code).into_iter().collect(),
        _ => Vec::new(),
    }
}
