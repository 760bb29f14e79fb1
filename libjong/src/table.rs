//! Per-suit distance, wait and discard tables.
//!
//! For every count vector of length nine (suits) or seven (honors) the
//! table stores ten packed words, one per target `(melds, has_pair)`:
//! slot `m` is "m melds, no pair", slot `5 + m` is "m melds plus the
//! pair". Each word packs `distance:4 | wait:9 | discard:9`, where the
//! distance is the minimum number of tile additions until the vector
//! contains the target, the wait mask marks positions whose addition
//! strictly decreases the distance and the discard mask marks positions
//! whose removal leaves it unchanged.
//!
//! Vectors are addressed by the base-5 positional hash with position zero
//! most significant; the table sizes are the largest hash over vectors
//! totalling at most fourteen tiles, plus one.

use std::io::Read;
use std::io::Write;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{Result, ensure};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;

pub const SUITS_TABLE_SIZE: usize = 1_943_751;
pub const HONORS_TABLE_SIZE: usize = 77_751;

const SUITS_LATTICE: usize = 1_953_125; // 5^9
const HONORS_LATTICE: usize = 78_125; // 5^7

/// Ten packed `distance:4 | wait:9 | discard:9` words.
pub type Entry = [u32; 10];

#[inline]
pub(crate) fn distance(entry: &Entry, i: usize) -> i32 {
    (entry[i] & 0xF) as i32
}

#[inline]
pub(crate) fn wait_mask(entry: &Entry, i: usize) -> u64 {
    ((entry[i] >> 4) & 0x1FF) as u64
}

#[inline]
pub(crate) fn discard_mask(entry: &Entry, i: usize) -> u64 {
    ((entry[i] >> 13) & 0x1FF) as u64
}

pub struct Table {
    suits: Vec<Entry>,
    honors: Vec<Entry>,
}

pub static TABLE: LazyLock<Table> = LazyLock::new(Table::build);

impl Table {
    /// Base-5 positional hash, position zero most significant.
    #[inline]
    pub fn suits_hash(counts: &[u8]) -> usize {
        debug_assert_eq!(counts.len(), 9);
        counts.iter().fold(0, |h, &c| h * 5 + c as usize)
    }

    #[inline]
    pub fn honors_hash(counts: &[u8]) -> usize {
        debug_assert_eq!(counts.len(), 7);
        counts.iter().fold(0, |h, &c| h * 5 + c as usize)
    }

    #[inline]
    pub fn suits(&self, hash: usize) -> &Entry {
        &self.suits[hash]
    }

    #[inline]
    pub fn honors(&self, hash: usize) -> &Entry {
        &self.honors[hash]
    }

    pub fn build() -> Self {
        let start = Instant::now();
        let suits = build_table(9, true, SUITS_TABLE_SIZE, SUITS_LATTICE);
        let honors = build_table(7, false, HONORS_TABLE_SIZE, HONORS_LATTICE);
        log::info!(
            "shanten tables built (suits: {}, honors: {}, elapsed: {:?})",
            suits.len(),
            honors.len(),
            start.elapsed(),
        );
        Self { suits, honors }
    }

    /// Read a table in the on-disk format: per record a 32-bit key followed
    /// by ten packed words, little endian, until end of input. Unlisted
    /// keys stay zero. Gzip-compressed blobs are inflated transparently.
    pub fn load(reader: &mut impl Read, size: usize) -> Result<Vec<Entry>> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        if data.starts_with(&[0x1f, 0x8b]) {
            let mut inflated = Vec::new();
            GzDecoder::new(data.as_slice()).read_to_end(&mut inflated)?;
            data = inflated;
        }

        let mut table = vec![[0u32; 10]; size];
        let mut cur = data.as_slice();
        while !cur.is_empty() {
            let key = cur.read_u32::<LittleEndian>()? as usize;
            ensure!(key < size, "table key {key} out of range (size {size})");
            for word in table[key].iter_mut() {
                *word = cur.read_u32::<LittleEndian>()?;
            }
        }
        Ok(table)
    }

    pub fn write_suits(&self, writer: &mut impl Write) -> Result<()> {
        write_table(&self.suits, 9, writer)
    }

    pub fn write_honors(&self, writer: &mut impl Write) -> Result<()> {
        write_table(&self.honors, 7, writer)
    }
}

fn write_table(table: &[Entry], len: usize, writer: &mut impl Write) -> Result<()> {
    for (key, entry) in table.iter().enumerate() {
        if digit_sum(key, len) > 14 {
            continue;
        }
        writer.write_u32::<LittleEndian>(key as u32)?;
        for &word in entry {
            writer.write_u32::<LittleEndian>(word)?;
        }
    }
    Ok(())
}

fn digit_sum(mut hash: usize, len: usize) -> u32 {
    let mut sum = 0;
    for _ in 0..len {
        sum += (hash % 5) as u32;
        hash /= 5;
    }
    sum
}

/// Derive one table from the target definition. Per target, every vector
/// already containing the target's melds and pair is a BFS source at
/// distance zero; removing a tile from a vector at distance d puts the
/// smaller vector at distance at most d + 1. The wait and discard masks
/// then fall out of the distances of the neighbouring vectors.
fn build_table(len: usize, with_sequences: bool, size: usize, lattice: usize) -> Vec<Entry> {
    let weight: Vec<usize> = (0..len).map(|j| 5usize.pow((len - 1 - j) as u32)).collect();

    // Maximum number of melds extractable from each vector, without and
    // with a pair reserved first.
    let mut max_melds = vec![0i8; lattice];
    let mut max_melds_pair = vec![-1i8; lattice];
    let mut digits = vec![0u8; len];
    for idx in 0..lattice {
        decode(idx, &weight, &mut digits);
        let mut best = 0;
        let mut best_pair = -1;
        for j in 0..len {
            if digits[j] >= 3 {
                best = best.max(1 + max_melds[idx - 3 * weight[j]]);
            }
            if with_sequences
                && j + 2 < len
                && digits[j] >= 1
                && digits[j + 1] >= 1
                && digits[j + 2] >= 1
            {
                best = best.max(1 + max_melds[idx - weight[j] - weight[j + 1] - weight[j + 2]]);
            }
            if digits[j] >= 2 {
                best_pair = best_pair.max(max_melds[idx - 2 * weight[j]]);
            }
        }
        max_melds[idx] = best;
        max_melds_pair[idx] = best_pair;
    }

    let mut table = vec![[0u32; 10]; size];
    let mut dist = vec![u8::MAX; lattice];
    let mut frontier: Vec<u32> = Vec::with_capacity(lattice / 2);
    let mut next: Vec<u32> = Vec::with_capacity(lattice / 2);
    for target in 0..10 {
        let m = (target % 5) as i8;
        let with_pair = target >= 5;

        dist.fill(u8::MAX);
        frontier.clear();
        for idx in 0..lattice {
            let contained = if with_pair { max_melds_pair[idx] >= m } else { max_melds[idx] >= m };
            if contained {
                dist[idx] = 0;
                frontier.push(idx as u32);
            }
        }

        let mut d = 0;
        while !frontier.is_empty() {
            for &idx in &frontier {
                let idx = idx as usize;
                let mut rem = idx;
                for &w in &weight {
                    let digit = rem / w;
                    rem %= w;
                    if digit > 0 {
                        let down = idx - w;
                        if dist[down] == u8::MAX {
                            dist[down] = d + 1;
                            next.push(down as u32);
                        }
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
            d += 1;
        }

        for (idx, entry) in table.iter_mut().enumerate() {
            let d0 = dist[idx];
            let mut wait = 0u32;
            let mut disc = 0u32;
            let mut rem = idx;
            for (j, &w) in weight.iter().enumerate() {
                let digit = rem / w;
                rem %= w;
                if digit < 4 && dist[idx + w] < d0 {
                    wait |= 1 << j;
                }
                if digit > 0 && dist[idx - w] == d0 {
                    disc |= 1 << j;
                }
            }
            entry[target] = d0 as u32 | wait << 4 | disc << 13;
        }
    }
    table
}

#[inline]
fn decode(mut idx: usize, weight: &[usize], digits: &mut [u8]) {
    for (j, &w) in weight.iter().enumerate() {
        digits[j] = (idx / w) as u8;
        idx %= w;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn suit(counts: [u8; 9]) -> &'static Entry {
        TABLE.suits(Table::suits_hash(&counts))
    }

    #[test]
    fn hash_round_trip() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let mut counts = [0u8; 9];
            let mut total = 0u32;
            for c in counts.iter_mut() {
                let r: u32 = rng.random_range(0..=4);
                *c = r.min(14 - total) as u8;
                total += *c as u32;
            }
            let hash = Table::suits_hash(&counts);
            assert!(hash < SUITS_TABLE_SIZE);
            let mut decoded = [0u8; 9];
            let weight: Vec<usize> = (0..9).map(|j| 5usize.pow(8 - j as u32)).collect();
            decode(hash, &weight, &mut decoded);
            assert_eq!(decoded, counts);
        }
    }

    #[test]
    fn distances_match_definition() {
        // Empty vector: a pair needs two tiles, one meld three.
        let e = suit([0; 9]);
        assert_eq!(distance(e, 0), 0);
        assert_eq!(distance(e, 5), 2);
        assert_eq!(distance(e, 1), 3);
        assert_eq!(distance(e, 6), 5);
        assert_eq!(distance(e, 9), 14);

        // 123 is one meld away from nothing.
        let e = suit([1, 1, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(distance(e, 1), 0);
        assert_eq!(distance(e, 6), 2);

        // 22 serves the pair; the third 2 finishes a triplet.
        let e = suit([0, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(distance(e, 5), 0);
        assert_eq!(distance(e, 1), 1);
        assert!(wait_mask(e, 1) & 0b1110 != 0);

        // Honors have no sequences: 12 of honors is still two from a meld.
        let h = TABLE.honors(Table::honors_hash(&[1, 1, 0, 0, 0, 0, 0]));
        assert_eq!(distance(h, 1), 2);
    }

    #[test]
    fn masks_match_neighbouring_distances() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let mut counts = [0u8; 9];
            for _ in 0..rng.random_range(0..=13) {
                let j = rng.random_range(0..9);
                if counts[j] < 4 {
                    counts[j] += 1;
                }
            }
            let entry = suit(counts);
            for i in 0..10 {
                let d0 = distance(entry, i);
                for j in 0..9 {
                    if counts[j] < 4 {
                        let mut up = counts;
                        up[j] += 1;
                        let du = distance(suit(up), i);
                        assert_eq!(wait_mask(entry, i) >> j & 1 == 1, du < d0, "{counts:?} target {i} tile {j}");
                    }
                    if counts[j] > 0 {
                        let mut down = counts;
                        down[j] -= 1;
                        let dd = distance(suit(down), i);
                        assert_eq!(discard_mask(entry, i) >> j & 1 == 1, dd == d0, "{counts:?} target {i} tile {j}");
                    }
                }
            }
        }
    }

    #[test]
    fn honors_dump_load_round_trip() {
        let mut blob = Vec::new();
        TABLE.write_honors(&mut blob).unwrap();
        let loaded = Table::load(&mut blob.as_slice(), HONORS_TABLE_SIZE).unwrap();
        assert_eq!(loaded.len(), TABLE.honors.len());
        for counts in [[0; 7], [2, 0, 0, 0, 0, 0, 0], [3, 3, 3, 3, 2, 0, 0], [1, 1, 1, 1, 1, 1, 1]] {
            let hash = Table::honors_hash(&counts);
            assert_eq!(loaded[hash], TABLE.honors[hash]);
        }
    }
}
