use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::tables::{LeagueRow, MatchRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionCategory {
    Goalkeeper,
    FullBack,
    CenterBack,
    DefensiveMidfielder,
    AttackingMidfielder,
    Winger,
    Striker,
}

impl PositionCategory {
    pub const ALL: [PositionCategory; 7] = [
        PositionCategory::Goalkeeper,
        PositionCategory::FullBack,
        PositionCategory::CenterBack,
        PositionCategory::DefensiveMidfielder,
        PositionCategory::AttackingMidfielder,
        PositionCategory::Winger,
        PositionCategory::Striker,
    ];

    pub fn long_name(self) -> &'static str {
        match self {
            PositionCategory::Goalkeeper => "Goalkeeper",
            PositionCategory::FullBack => "Full Back",
            PositionCategory::CenterBack => "Center Back",
            PositionCategory::DefensiveMidfielder => "Defensive Midfielder",
            PositionCategory::AttackingMidfielder => "Attacking Midfielder",
            PositionCategory::Winger => "Winger",
            PositionCategory::Striker => "Striker",
        }
    }

    pub fn short_code(self) -> &'static str {
        match self {
            PositionCategory::Goalkeeper => "GK",
            PositionCategory::FullBack => "FB",
            PositionCategory::CenterBack => "CB",
            PositionCategory::DefensiveMidfielder => "DM",
            PositionCategory::AttackingMidfielder => "AM",
            PositionCategory::Winger => "WI",
            PositionCategory::Striker => "ST",
        }
    }

    pub fn from_short_code(short: &str) -> Option<Self> {
        let short = short.trim();
        Self::ALL.into_iter().find(|c| c.short_code() == short)
    }

    /// Radar metrics for this role, in axis order.
    pub fn metrics(self) -> &'static [&'static str] {
        match self {
            PositionCategory::Goalkeeper => &[
                "Shots blocked per 90",
                "Long passes per 90",
                "Accurate long passes, %",
                "Key passes per 90",
                "Smart passes per 90",
                "Accurate smart passes, %",
                "Aerial duels won, %",
            ],
            PositionCategory::FullBack | PositionCategory::DefensiveMidfielder => &[
                "Sliding tackles per 90",
                "Interceptions per 90",
                "Crosses per 90",
                "Accurate crosses, %",
                "Defensive duels per 90",
                "Defensive duels won, %",
                "Pass accuracy (%)",
                "Key passes per 90",
            ],
            PositionCategory::CenterBack => &[
                "Shots blocked per 90",
                "Interceptions per 90",
                "Pass accuracy (%)",
                "Aerial duels won, %",
                "Defensive duels per 90",
                "Defensive duels won, %",
                "Crosses per 90",
                "Dribbles per 90",
            ],
            PositionCategory::AttackingMidfielder => &[
                "Progressive runs per 90",
                "Assists per 90",
                "Offensive duels won, %",
                "Key passes per 90",
                "Pass accuracy (%)",
                "Goals per 90",
                "Shots per 90",
                "Shots on target, %",
            ],
            PositionCategory::Winger => &[
                "Crosses per 90",
                "Assists per 90",
                "Offensive duels won, %",
                "Key passes per 90",
                "Pass accuracy (%)",
                "Goals per 90",
                "Shots per 90",
                "Shots on target, %",
            ],
            PositionCategory::Striker => &[
                "Successful dribbles, %",
                "Assists per 90",
                "Key passes per 90",
                "xG/Shot",
                "Pass accuracy (%)",
                "Goals per 90",
                "Shots per 90",
                "Shots on target, %",
            ],
        }
    }
}

// Raw position codes as they appear in Wyscout-style exports.
const POSITION_CODES: &[(&str, PositionCategory)] = &[
    ("RW", PositionCategory::Winger),
    ("RWF", PositionCategory::Winger),
    ("LWF", PositionCategory::Winger),
    ("LW", PositionCategory::Winger),
    ("GK", PositionCategory::Goalkeeper),
    ("LB", PositionCategory::FullBack),
    ("LB5", PositionCategory::FullBack),
    ("LWB", PositionCategory::FullBack),
    ("RB", PositionCategory::FullBack),
    ("RB5", PositionCategory::FullBack),
    ("RWB", PositionCategory::FullBack),
    ("RCB", PositionCategory::CenterBack),
    ("RCB3", PositionCategory::CenterBack),
    ("CB", PositionCategory::CenterBack),
    ("LCB", PositionCategory::CenterBack),
    ("LCB3", PositionCategory::CenterBack),
    ("DMF", PositionCategory::DefensiveMidfielder),
    ("LCMF", PositionCategory::DefensiveMidfielder),
    ("RCMF", PositionCategory::DefensiveMidfielder),
    ("LDMF", PositionCategory::DefensiveMidfielder),
    ("RDMF", PositionCategory::DefensiveMidfielder),
    ("LCMF3", PositionCategory::DefensiveMidfielder),
    ("RCMF3", PositionCategory::DefensiveMidfielder),
    ("AMF", PositionCategory::AttackingMidfielder),
    ("LAMF", PositionCategory::AttackingMidfielder),
    ("RAMF", PositionCategory::AttackingMidfielder),
    ("CF", PositionCategory::Striker),
    ("LCF", PositionCategory::Striker),
    ("RCF", PositionCategory::Striker),
];

static LONG_BY_CODE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    POSITION_CODES
        .iter()
        .map(|(code, category)| (*code, category.long_name()))
        .collect()
});

static SHORT_BY_CODE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    POSITION_CODES
        .iter()
        .map(|(code, category)| (*code, category.short_code()))
        .collect()
});

pub fn position_codes() -> impl Iterator<Item = &'static str> {
    POSITION_CODES.iter().map(|(code, _)| *code)
}

pub fn long_table() -> &'static HashMap<&'static str, &'static str> {
    &LONG_BY_CODE
}

pub fn short_table() -> &'static HashMap<&'static str, &'static str> {
    &SHORT_BY_CODE
}

pub fn category(code: &str) -> Option<PositionCategory> {
    let code = code.trim();
    POSITION_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, category)| *category)
}

pub fn category_long(code: &str) -> Option<&'static str> {
    LONG_BY_CODE.get(code.trim()).copied()
}

pub fn category_short(code: &str) -> Option<&'static str> {
    SHORT_BY_CODE.get(code.trim()).copied()
}

pub fn metrics_for(short: &str) -> Option<&'static [&'static str]> {
    PositionCategory::from_short_code(short).map(PositionCategory::metrics)
}

/// Most frequent raw position token across a match history. Every
/// comma-separated token of every record is counted; on equal counts the
/// token seen first wins.
pub fn majority_position(records: &[MatchRecord]) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for token in records.iter().flat_map(MatchRecord::position_tokens) {
        match slot.get(token) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                slot.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (token, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((token, count));
        }
    }
    best.map(|(token, _)| token)
}

/// League rows carry one canonical position string; the first entry is the
/// player's main position.
pub fn primary_position(row: &LeagueRow) -> Option<&str> {
    row.position_tokens().next()
}
