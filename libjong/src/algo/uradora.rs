//! Probability of landing `n` uradora given `k` revealed indicators.
//!
//! The matrix is calibrated against a fixed reference hand (twelve
//! singles plus one pair) and a 122-tile remaining wall; the distribution
//! is the exact hypergeometric sum over the indicator draws. Indicator
//! tiles are grouped by how many hand tiles their dora maps to, which is
//! all that matters for the total.

use std::io::{Read, Write};
use std::sync::LazyLock;

use anyhow::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::tile;

/// `PROB[k][n]` = P(n uradora | k indicators), `n` capped at twelve.
pub static PROB: LazyLock<[[f64; 13]; 6]> = LazyLock::new(build);

fn build() -> [[f64; 13]; 6] {
    let mut hand = [0u8; 34];
    for t in [0, 1, 2, 4, 5, 6, 9, 10, 11, 14, 15, 16] {
        hand[t] = 1;
    }
    hand[18] = 2; // the pair

    // Wall tiles grouped by the dora weight of an indicator of that kind.
    let mut group = [0u64; 3];
    for t in 0..tile::NUM_TILE_KINDS as u8 {
        let weight = hand[tile::indicated_dora(t) as usize] as usize;
        group[weight] += (4 - hand[t as usize]) as u64;
    }
    let wall: u64 = group.iter().sum();

    let mut table = [[0.0; 13]; 6];
    for (k, row) in table.iter_mut().enumerate() {
        let k = k as u64;
        for a in 0..=k.min(group[1]) {
            for b in 0..=(k - a).min(group[2]) {
                if k - a - b > group[0] {
                    continue;
                }
                let p = binom(group[1], a) * binom(group[2], b) * binom(group[0], k - a - b)
                    / binom(wall, k);
                row[(a + 2 * b).min(12) as usize] += p;
            }
        }
    }
    table
}

fn binom(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let mut out = 1.0;
    for i in 0..k {
        out *= (n - i) as f64 / (k - i) as f64;
    }
    out
}

/// Read the 6x13 little-endian f64 matrix format.
pub fn load(reader: &mut impl Read) -> Result<[[f64; 13]; 6]> {
    let mut table = [[0.0; 13]; 6];
    for row in table.iter_mut() {
        for v in row.iter_mut() {
            *v = reader.read_f64::<LittleEndian>()?;
        }
    }
    Ok(table)
}

pub fn write(table: &[[f64; 13]; 6], writer: &mut impl Write) -> Result<()> {
    for row in table {
        for &v in row {
            writer.write_f64::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows_are_distributions() {
        for (k, row) in PROB.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {k} sums to {sum}");
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
        assert_eq!(PROB[0][0], 1.0);
        // More indicators never make zero uradora more likely.
        for k in 1..6 {
            assert!(PROB[k][0] < PROB[k - 1][0]);
        }
    }

    #[test]
    fn binary_round_trip() {
        let mut blob = Vec::new();
        write(&PROB, &mut blob).unwrap();
        assert_eq!(blob.len(), 6 * 13 * 8);
        let loaded = load(&mut blob.as_slice()).unwrap();
        assert_eq!(loaded, *PROB);
    }
}
