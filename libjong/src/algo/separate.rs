//! Block decompositions of winning hands.
//!
//! Every legal suit (or honor) count vector that splits exactly into
//! melds plus at most one pair is mapped to the complete list of its
//! splits. The dictionaries are enumerated once, keyed by the same base-5
//! hash as the distance tables, and queried per suit; the separator then
//! cross-products the four suit choices and classifies the wait.

use std::io::{Read, Write};
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{Result, bail};
use boomphf::hashmap::BoomHashMap;
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

use crate::hand::TileCounts;
use crate::table::Table;
use crate::tile;
use crate::types::{Block, Meld, MeldKind, WaitKind, block_kind, win_flag};

/// A full winning hand never exceeds four groups plus the pair.
pub type BlockList = ArrayVec<[Block; 5]>;

pub struct Patterns {
    suits: BoomHashMap<u32, Vec<BlockList>>,
    honors: BoomHashMap<u32, Vec<BlockList>>,
}

pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::build);

impl Patterns {
    fn build() -> Self {
        let start = Instant::now();
        let suits = build_dictionary(9, true);
        let honors = build_dictionary(7, false);
        log::info!(
            "block decomposition dictionaries built (suits: {}, honors: {}, elapsed: {:?})",
            suits.len(),
            honors.len(),
            start.elapsed(),
        );
        Self {
            suits: into_boom(suits),
            honors: into_boom(honors),
        }
    }

    #[inline]
    fn suit_patterns(&self, key: u32) -> Option<&Vec<BlockList>> {
        self.suits.get(&key)
    }

    #[inline]
    fn honor_patterns(&self, key: u32) -> Option<&Vec<BlockList>> {
        self.honors.get(&key)
    }
}

fn into_boom(entries: Vec<(u32, Vec<BlockList>)>) -> BoomHashMap<u32, Vec<BlockList>> {
    let (keys, values) = entries.into_iter().unzip();
    BoomHashMap::new(keys, values)
}

/// Enumerate every multiset of at most four melds plus an optional pair
/// whose count vector keeps every position at four or less.
fn build_dictionary(len: usize, with_sequences: bool) -> Vec<(u32, Vec<BlockList>)> {
    let mut melds: Vec<(Block, ArrayVec<[u8; 3]>)> = Vec::new();
    for i in 0..len as u8 {
        melds.push((Block::new(block_kind::TRIPLET, i), [i, i, i].into_iter().collect()));
    }
    if with_sequences {
        for i in 0..len as u8 - 2 {
            melds.push((Block::new(block_kind::SEQUENCE, i), [i, i + 1, i + 2].into_iter().collect()));
        }
    }

    let mut out: ahash::AHashMap<u32, Vec<BlockList>> = ahash::AHashMap::new();
    let mut counts = vec![0u8; len];
    let mut blocks = BlockList::new();
    record_and_extend(&melds, 0, &mut counts, &mut blocks, &mut out);

    let mut entries: Vec<_> = out.into_iter().collect();
    entries.sort_unstable_by_key(|(key, _)| *key);
    entries
}

fn record_and_extend(
    melds: &[(Block, ArrayVec<[u8; 3]>)],
    start: usize,
    counts: &mut [u8],
    blocks: &mut BlockList,
    out: &mut ahash::AHashMap<u32, Vec<BlockList>>,
) {
    record(counts, blocks, None, out);
    for pair in 0..counts.len() as u8 {
        if counts[pair as usize] + 2 <= 4 {
            record(counts, blocks, Some(pair), out);
        }
    }

    if blocks.len() == 4 {
        return;
    }
    for (i, (block, tiles)) in melds.iter().enumerate().skip(start) {
        if tiles.iter().all(|&t| counts[t as usize] < 4)
            && tiles.iter().filter(|&&t| t == tiles[0]).count() as u8 + counts[tiles[0] as usize] <= 4
        {
            for &t in tiles {
                counts[t as usize] += 1;
            }
            blocks.push(*block);
            record_and_extend(melds, i, counts, blocks, out);
            blocks.pop();
            for &t in tiles {
                counts[t as usize] -= 1;
            }
        }
    }
}

fn record(
    counts: &[u8],
    blocks: &BlockList,
    pair: Option<u8>,
    out: &mut ahash::AHashMap<u32, Vec<BlockList>>,
) {
    let mut full = *blocks;
    let mut key = 0u32;
    for (i, &c) in counts.iter().enumerate() {
        let c = c + if pair == Some(i as u8) { 2 } else { 0 };
        key = key * 5 + c as u32;
    }
    if let Some(p) = pair {
        full.push(Block::new(block_kind::PAIR, p));
    }
    out.entry(key).or_default().push(full);
}

/// Enumerate the block decompositions of a winning hand together with the
/// wait kind of each. The hand counts must include the winning tile. On a
/// discard win the block holding the wait is marked open.
pub fn separate(
    hand: &TileCounts,
    melds: &[Meld],
    win_tile: u8,
    win_flags: u32,
) -> Vec<(BlockList, WaitKind)> {
    let mut blocks = BlockList::new();
    for meld in melds {
        let kind = match meld.kind {
            MeldKind::Pong => block_kind::TRIPLET | block_kind::OPEN,
            MeldKind::Chow => block_kind::SEQUENCE | block_kind::OPEN,
            MeldKind::ClosedKong => block_kind::KONG,
            MeldKind::OpenKong | MeldKind::AddedKong => block_kind::KONG | block_kind::OPEN,
        };
        blocks.push(Block::new(kind, meld.min_tile()));
    }

    let keys = [
        Table::suits_hash(&hand[0..9]) as u32,
        Table::suits_hash(&hand[9..18]) as u32,
        Table::suits_hash(&hand[18..27]) as u32,
        Table::honors_hash(&hand[27..34]) as u32,
    ];

    let mut patterns = Vec::new();
    assemble(
        &keys,
        0,
        &mut blocks,
        tile::to_normal(win_tile),
        win_flags & win_flag::TSUMO != 0,
        &mut patterns,
    );
    patterns
}

fn assemble(
    keys: &[u32; 4],
    depth: usize,
    blocks: &mut BlockList,
    win_tile: u8,
    is_tsumo: bool,
    out: &mut Vec<(BlockList, WaitKind)>,
) {
    if depth == 4 {
        classify_waits(blocks, win_tile, is_tsumo, out);
        return;
    }

    let list = if depth < 3 {
        PATTERNS.suit_patterns(keys[depth])
    } else {
        PATTERNS.honor_patterns(keys[depth])
    };
    let Some(list) = list.filter(|l| !l.is_empty()) else {
        assemble(keys, depth + 1, blocks, win_tile, is_tsumo, out);
        return;
    };

    let base = depth as u8 * 9;
    let len = blocks.len();
    for pattern in list {
        for block in pattern {
            blocks.push(Block::new(block.kind, block.min_tile + base));
        }
        assemble(keys, depth + 1, blocks, win_tile, is_tsumo, out);
        blocks.truncate(len);
    }
}

fn classify_waits(blocks: &BlockList, win_tile: u8, is_tsumo: bool, out: &mut Vec<(BlockList, WaitKind)>) {
    for (i, block) in blocks.iter().enumerate() {
        if block.kind & block_kind::OPEN != 0 {
            continue;
        }
        let wait = if block.kind & block_kind::TRIPLET != 0 && block.min_tile == win_tile {
            WaitKind::Triplet
        } else if block.kind == block_kind::SEQUENCE && block.min_tile + 1 == win_tile {
            WaitKind::Closed
        } else if block.kind == block_kind::SEQUENCE
            && block.min_tile + 2 == win_tile
            && matches!(block.min_tile, tile::MANZU1 | tile::PINZU1 | tile::SOUZU1)
        {
            WaitKind::Edge
        } else if block.kind == block_kind::SEQUENCE
            && block.min_tile == win_tile
            && matches!(block.min_tile, 6 | 15 | 24)
        {
            WaitKind::Edge
        } else if block.kind == block_kind::SEQUENCE
            && (block.min_tile == win_tile || block.min_tile + 2 == win_tile)
        {
            WaitKind::DoubleEdge
        } else if block.kind == block_kind::PAIR && block.min_tile == win_tile {
            WaitKind::Pair
        } else {
            continue;
        };

        let mut with_wait = *blocks;
        if !is_tsumo {
            with_wait[i].kind |= block_kind::OPEN;
        }
        out.push((with_wait, wait));
    }
}

/// One dictionary line of the pattern interchange format: concatenated
/// two-character tokens, a tile offset digit followed by `k` (triplet),
/// `s` (sequence) or `z` (pair).
#[derive(Serialize, Deserialize)]
pub struct PatternRecord {
    pub key: u32,
    pub pattern: Vec<String>,
}

pub fn dump_suit_patterns(writer: &mut impl Write) -> Result<()> {
    dump(build_dictionary(9, true), writer)
}

pub fn dump_honor_patterns(writer: &mut impl Write) -> Result<()> {
    dump(build_dictionary(7, false), writer)
}

fn dump(entries: Vec<(u32, Vec<BlockList>)>, writer: &mut impl Write) -> Result<()> {
    let records: Vec<PatternRecord> = entries
        .into_iter()
        .map(|(key, patterns)| PatternRecord {
            key,
            pattern: patterns.iter().map(|p| pattern_string(p)).collect(),
        })
        .collect();
    serde_json::to_writer(writer, &records)?;
    Ok(())
}

fn pattern_string(blocks: &BlockList) -> String {
    let mut s = String::with_capacity(blocks.len() * 2);
    for block in blocks {
        s.push((b'0' + block.min_tile) as char);
        s.push(match block.kind {
            block_kind::TRIPLET => 'k',
            block_kind::SEQUENCE => 's',
            _ => 'z',
        });
    }
    s
}

pub fn parse_pattern(s: &str) -> Result<BlockList> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        bail!("odd-length pattern {s:?}");
    }
    let mut blocks = BlockList::new();
    for token in bytes.chunks_exact(2) {
        let min_tile = match token[0] {
            d @ b'0'..=b'8' => d - b'0',
            c => bail!("bad tile offset {:?} in {s:?}", c as char),
        };
        let kind = match token[1] {
            b'k' => block_kind::TRIPLET,
            b's' => block_kind::SEQUENCE,
            b'z' => block_kind::PAIR,
            c => bail!("bad block code {:?} in {s:?}", c as char),
        };
        blocks.push(Block::new(kind, min_tile));
    }
    Ok(blocks)
}

pub fn load_patterns(reader: &mut impl Read) -> Result<Vec<(u32, Vec<BlockList>)>> {
    let records: Vec<PatternRecord> = serde_json::from_reader(reader)?;
    records
        .into_iter()
        .map(|r| Ok((r.key, r.pattern.iter().map(|p| parse_pattern(p)).collect::<Result<_>>()?)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::hand;

    #[test]
    fn pattern_string_round_trip() {
        let mut blob = Vec::new();
        dump_honor_patterns(&mut blob).unwrap();
        let loaded = load_patterns(&mut blob.as_slice()).unwrap();
        assert_eq!(loaded.len(), PATTERNS.honors.len());
        for (key, patterns) in &loaded {
            let original = PATTERNS.honor_patterns(*key).unwrap();
            assert_eq!(patterns, original);
        }
    }

    #[test]
    fn ambiguous_suit_decomposes_both_ways() {
        // 111222333 reads as three triplets or three parallel sequences.
        let h = hand("111222333m99s99p").unwrap();
        let key = Table::suits_hash(&h[0..9]) as u32;
        let patterns = PATTERNS.suit_patterns(key).unwrap();
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn separator_covers_all_partitions() {
        let h = hand("111222333m67p88s8p").unwrap();
        let patterns = separate(&h, &[], 16, win_flag::TSUMO);
        // Two manzu readings; 678p carries the wait in each.
        assert_eq!(patterns.len(), 2);
        for (blocks, wait) in &patterns {
            assert_eq!(blocks.len(), 5);
            assert_eq!(*wait, WaitKind::DoubleEdge);
        }
    }

    #[test]
    fn ambiguous_wait_yields_both_kinds() {
        // 455556m with a won 5m completes either the 555 triplet or the
        // middle of 456.
        let h = hand("455556m444p789s11z").unwrap();
        let win = tile::MANZU5;
        let kinds: Vec<WaitKind> = separate(&h, &[], win, win_flag::TSUMO)
            .into_iter()
            .map(|(_, wait)| wait)
            .collect();
        assert!(kinds.contains(&WaitKind::Triplet));
        assert!(kinds.contains(&WaitKind::Closed));
    }

    #[test]
    fn ron_marks_wait_block_open() {
        let h = hand("123456789m99s12p3p").unwrap();
        let patterns = separate(&h, &[], 11, 0);
        assert_eq!(patterns.len(), 1);
        let (blocks, wait) = &patterns[0];
        assert_eq!(*wait, WaitKind::Edge);
        let marked = blocks
            .iter()
            .find(|b| b.kind == block_kind::SEQUENCE | block_kind::OPEN)
            .expect("wait block marked open");
        assert_eq!(marked.min_tile, 9);
    }

    #[test]
    fn melds_become_fixed_blocks() {
        let h = hand("123m55s").unwrap();
        let melds = vec![
            Meld::new(MeldKind::Pong, &[tile::EAST; 3]),
            Meld::new(MeldKind::ClosedKong, &[8; 4]),
            Meld::new(MeldKind::OpenKong, &[17; 4]),
        ];
        let patterns = separate(&h, &melds, 22, win_flag::TSUMO);
        assert_eq!(patterns.len(), 1);
        let (blocks, wait) = &patterns[0];
        assert_eq!(*wait, WaitKind::Pair);
        assert!(blocks.contains(&Block::new(block_kind::TRIPLET | block_kind::OPEN, tile::EAST)));
        assert!(blocks.contains(&Block::new(block_kind::KONG, 8)));
        assert!(blocks.contains(&Block::new(block_kind::KONG | block_kind::OPEN, 17)));
    }
}
