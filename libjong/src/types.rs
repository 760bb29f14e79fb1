//! Round, player, meld and block types shared by the calculators.

use serde::Serialize;
use tinyvec::ArrayVec;

use crate::hand::{self, TileCounts};
use crate::tile;

/// Shape grammars for the distance calculators.
pub mod shanten_flag {
    pub const REGULAR: u8 = 1;
    pub const SEVEN_PAIRS: u8 = 2;
    pub const THIRTEEN_ORPHANS: u8 = 4;
    pub const ALL: u8 = REGULAR | SEVEN_PAIRS | THIRTEEN_ORPHANS;
}

/// Table rules.
pub mod rule_flag {
    pub const RED_DORA: u32 = 1 << 1;
    pub const OPEN_TANYAO: u32 = 1 << 2;
}

/// Win-situation flags passed to the score calculator.
pub mod win_flag {
    pub const TSUMO: u32 = 1 << 0;
    pub const RIICHI: u32 = 1 << 1;
    pub const IPPATSU: u32 = 1 << 2;
    pub const DOUBLE_RIICHI: u32 = 1 << 3;
    pub const ROBBING_A_KONG: u32 = 1 << 4;
    pub const AFTER_A_KONG: u32 = 1 << 5;
    pub const UNDER_THE_SEA: u32 = 1 << 6;
    pub const UNDER_THE_RIVER: u32 = 1 << 7;
    pub const BLESSING_OF_HEAVEN: u32 = 1 << 8;
    pub const BLESSING_OF_EARTH: u32 = 1 << 9;
    pub const HAND_OF_MAN: u32 = 1 << 10;
    pub const NAGASHI_MANGAN: u32 = 1 << 11;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Pong,
    Chow,
    ClosedKong,
    OpenKong,
    AddedKong,
}

impl MeldKind {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Pong),
            1 => Some(Self::Chow),
            2 => Some(Self::ClosedKong),
            3 => Some(Self::OpenKong),
            4 => Some(Self::AddedKong),
            _ => None,
        }
    }

    #[inline]
    pub fn is_kong(self) -> bool {
        matches!(self, Self::ClosedKong | Self::OpenKong | Self::AddedKong)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tiles: ArrayVec<[u8; 4]>,
    /// The claimed discard, where applicable.
    pub discarded_tile: u8,
    /// Relative seat the discard came from.
    pub from: u8,
}

impl Meld {
    pub fn new(kind: MeldKind, tiles: &[u8]) -> Self {
        Self {
            kind,
            tiles: tiles.iter().copied().collect(),
            discarded_tile: tiles.first().copied().unwrap_or_default(),
            from: 0,
        }
    }

    /// Smallest tile of the meld with red fives normalized.
    #[inline]
    pub fn min_tile(&self) -> u8 {
        self.tiles.iter().map(|&t| tile::to_normal(t)).min().unwrap_or_default()
    }
}

/// Block kinds produced by the hand separator, OR-able with [`block_kind::OPEN`].
pub mod block_kind {
    pub const TRIPLET: u8 = 1;
    pub const SEQUENCE: u8 = 2;
    pub const KONG: u8 = 4;
    pub const PAIR: u8 = 8;
    pub const OPEN: u8 = 16;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: u8,
    pub min_tile: u8,
}

impl Block {
    pub const fn new(kind: u8, min_tile: u8) -> Self {
        Self { kind, min_tile }
    }
}

/// How the winning tile relates to the block it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    /// Either side of an open-ended sequence.
    DoubleEdge,
    /// The 3 of 123 or the 7 of 789.
    Edge,
    /// Middle of a sequence.
    Closed,
    /// Completing one of two pairs into a triplet.
    Triplet,
    /// Completing the pair.
    Pair,
}

#[derive(Debug, Clone, Serialize)]
pub struct Round {
    pub rules: u32,
    pub wind: u8,
    pub honba: i32,
    pub kyotaku: i32,
    pub dora_indicators: Vec<u8>,
    pub uradora_indicators: Vec<u8>,
}

impl Default for Round {
    fn default() -> Self {
        Self {
            rules: rule_flag::RED_DORA | rule_flag::OPEN_TANYAO,
            wind: tile::EAST,
            honba: 0,
            kyotaku: 0,
            dora_indicators: Vec::new(),
            uradora_indicators: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    #[serde(serialize_with = "serialize_tile_counts")]
    pub hand: TileCounts,
    pub melds: Vec<Meld>,
    pub wind: u8,
}

/// `serde`'s built-in array impls only cover lengths up to 32, so
/// `TileCounts` ([u8; 37]) needs an explicit serializer.
fn serialize_tile_counts<S>(counts: &TileCounts, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeTuple;
    let mut tup = serializer.serialize_tuple(counts.len())?;
    for c in counts {
        tup.serialize_element(c)?;
    }
    tup.end()
}

impl Player {
    pub fn new(hand: TileCounts, melds: Vec<Meld>, wind: u8) -> Self {
        Self { hand, melds, wind }
    }

    /// Closed means no melds other than closed kongs.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.melds.iter().all(|m| m.kind == MeldKind::ClosedKong)
    }

    #[inline]
    pub fn num_tiles(&self) -> usize {
        hand::num_tiles(&self.hand)
    }
}
