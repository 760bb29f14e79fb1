//! Payment tables and score titles.

use serde::Serialize;

/// Row index into the payment tables for a fu value.
pub fn fu_index(fu: u8) -> usize {
    match fu {
        20 => 0,
        25 => 1,
        30 => 2,
        40 => 3,
        50 => 4,
        60 => 5,
        70 => 6,
        80 => 7,
        90 => 8,
        100 => 9,
        _ => 10,
    }
}

/// Hands below five han that already pay as mangan (kiriage rows).
pub const IS_MANGAN: [[bool; 4]; 11] = [
    [false, false, false, false], // 20 fu
    [false, false, false, false], // 25 fu
    [false, false, false, false], // 30 fu
    [false, false, false, true],  // 40 fu
    [false, false, false, true],  // 50 fu
    [false, false, false, true],  // 60 fu
    [false, false, true, true],   // 70 fu
    [false, false, true, true],   // 80 fu
    [false, false, true, true],   // 90 fu
    [false, false, true, true],   // 100 fu
    [false, false, true, true],   // 110 fu
];

pub const RON_DISCARDER_TO_DEALER: usize = 0;
pub const RON_DISCARDER_TO_PLAYER: usize = 1;
pub const TSUMO_PLAYER_TO_DEALER: usize = 2;
pub const TSUMO_DEALER_TO_PLAYER: usize = 3;
pub const TSUMO_PLAYER_TO_PLAYER: usize = 4;

/// Payments below mangan, indexed by payer kind, fu row and han - 1.
pub const BELOW_MANGAN: [[[i32; 4]; 11]; 5] = [
    // (ron) discarder -> dealer
    [
        [0, 0, 0, 0],          // 20 fu (pinfu tsumo only)
        [0, 2400, 4800, 9600], // 25 fu (seven pairs)
        [1500, 2900, 5800, 11600],
        [2000, 3900, 7700, 0],
        [2400, 4800, 9600, 0],
        [2900, 5800, 11600, 0],
        [3400, 6800, 0, 0],
        [3900, 7700, 0, 0],
        [4400, 8700, 0, 0],
        [4800, 9600, 0, 0],
        [5300, 10600, 0, 0],
    ],
    // (ron) discarder -> player
    [
        [0, 0, 0, 0],
        [0, 1600, 3200, 6400],
        [1000, 2000, 3900, 7700],
        [1300, 2600, 5200, 0],
        [1600, 3200, 6400, 0],
        [2000, 3900, 7700, 0],
        [2300, 4500, 0, 0],
        [2600, 5200, 0, 0],
        [2900, 5800, 0, 0],
        [3200, 6400, 0, 0],
        [3600, 7100, 0, 0],
    ],
    // (tsumo) player -> dealer
    [
        [0, 700, 1300, 2600],
        [0, 0, 1600, 3200],
        [500, 1000, 2000, 3900],
        [700, 1300, 2600, 0],
        [800, 1600, 3200, 0],
        [1000, 2000, 3900, 0],
        [1200, 2300, 0, 0],
        [1300, 2600, 0, 0],
        [1500, 2900, 0, 0],
        [1600, 3200, 0, 0],
        [1800, 3600, 0, 0],
    ],
    // (tsumo) dealer -> player
    [
        [0, 700, 1300, 2600],
        [0, 0, 1600, 3200],
        [500, 1000, 2000, 3900],
        [700, 1300, 2600, 0],
        [800, 1600, 3200, 0],
        [1000, 2000, 3900, 0],
        [1200, 2300, 0, 0],
        [1300, 2600, 0, 0],
        [1500, 2900, 0, 0],
        [1600, 3200, 0, 0],
        [1800, 3600, 0, 0],
    ],
    // (tsumo) player -> player
    [
        [0, 400, 700, 1300],
        [0, 0, 800, 1600],
        [300, 500, 1000, 2000],
        [400, 700, 1300, 0],
        [400, 800, 1600, 0],
        [500, 1000, 2000, 0],
        [600, 1200, 0, 0],
        [700, 1300, 0, 0],
        [800, 1500, 0, 0],
        [800, 1600, 0, 0],
        [900, 1800, 0, 0],
    ],
];

/// Payments from mangan up, indexed by payer kind and score title.
pub const ABOVE_MANGAN: [[i32; 11]; 5] = [
    [12000, 18000, 24000, 36000, 48000, 48000, 96000, 144000, 192000, 240000, 288000],
    [8000, 12000, 16000, 24000, 32000, 32000, 64000, 96000, 128000, 160000, 192000],
    [4000, 6000, 8000, 12000, 16000, 16000, 32000, 48000, 64000, 80000, 96000],
    [4000, 6000, 8000, 12000, 16000, 16000, 32000, 48000, 64000, 80000, 96000],
    [2000, 3000, 4000, 6000, 8000, 8000, 16000, 24000, 32000, 40000, 48000],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTitle {
    Mangan = 0,
    Haneman,
    Baiman,
    Sanbaiman,
    CountedYakuman,
    Yakuman,
    DoubleYakuman,
    TripleYakuman,
    QuadrupleYakuman,
    QuintupleYakuman,
    SextupleYakuman,
}

/// Title for a normal hand, `None` when it pays by fu and han.
pub fn title_for(fu: u8, han: u8) -> Option<ScoreTitle> {
    match han {
        0 => None,
        1..=4 => IS_MANGAN[fu_index(fu)][han as usize - 1].then_some(ScoreTitle::Mangan),
        5 => Some(ScoreTitle::Mangan),
        6 | 7 => Some(ScoreTitle::Haneman),
        8..=10 => Some(ScoreTitle::Baiman),
        11 | 12 => Some(ScoreTitle::Sanbaiman),
        _ => Some(ScoreTitle::CountedYakuman),
    }
}

/// Title for an n-fold yakuman.
pub fn title_for_yakuman(n: u8) -> Option<ScoreTitle> {
    match n {
        1 => Some(ScoreTitle::Yakuman),
        2 => Some(ScoreTitle::DoubleYakuman),
        3 => Some(ScoreTitle::TripleYakuman),
        4 => Some(ScoreTitle::QuadrupleYakuman),
        5 => Some(ScoreTitle::QuintupleYakuman),
        6 => Some(ScoreTitle::SextupleYakuman),
        _ => None,
    }
}
