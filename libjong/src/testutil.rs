//! Helpers for the property-style tests: seeded hand sampling and a
//! brute-force reference that enumerates winning goals directly.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::hand::TileCounts;
use crate::tile;

pub(crate) fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draw `n` tiles from a full four-copy deck (no red fives).
pub(crate) fn random_hand(rng: &mut ChaCha8Rng, n: usize) -> TileCounts {
    let mut deck: Vec<u8> = (0..tile::NUM_TILE_KINDS as u8).flat_map(|t| [t; 4]).collect();
    deck.shuffle(rng);
    let mut counts = [0; tile::NUM_TILE_IDS];
    for &t in &deck[..n] {
        counts[t as usize] += 1;
    }
    counts
}

/// Reference regular-hand shanten: the minimum over all goals (melds plus
/// pair split across the suits) of the number of tiles missing from the
/// hand, minus one. Deliberately naive; only the definition is shared with
/// the table-driven calculator.
pub(crate) fn reference_regular_shanten(hand: &TileCounts, num_melds: usize) -> i8 {
    let m_total = 4 - num_melds;
    let tabs = [
        suit_replacement(&hand[0..9], true),
        suit_replacement(&hand[9..18], true),
        suit_replacement(&hand[18..27], true),
        suit_replacement(&hand[27..34], false),
    ];

    let mut best = u32::MAX;
    for m0 in 0..=m_total {
        for m1 in 0..=m_total - m0 {
            for m2 in 0..=m_total - m0 - m1 {
                let m3 = m_total - m0 - m1 - m2;
                let ms = [m0, m1, m2, m3];
                for pair_suit in 0..4 {
                    let cost: u32 = (0..4)
                        .map(|s| tabs[s][ms[s]][(s == pair_suit) as usize] as u32)
                        .sum();
                    best = best.min(cost);
                }
            }
        }
    }
    best as i8 - 1
}

/// For one suit, the minimum additions until the counts contain exactly
/// `m` melds (and a pair), for every `m` and pair choice.
fn suit_replacement(counts: &[u8], with_sequences: bool) -> [[u8; 2]; 5] {
    let len = counts.len();
    let mut melds: Vec<Vec<u8>> = Vec::new();
    for i in 0..len {
        let mut v = vec![0; len];
        v[i] = 3;
        melds.push(v);
    }
    if with_sequences {
        for i in 0..len - 2 {
            let mut v = vec![0; len];
            v[i] = 1;
            v[i + 1] = 1;
            v[i + 2] = 1;
            melds.push(v);
        }
    }

    // best[m][p]; p = 1 means the suit also hosts the pair.
    let mut best = [[u8::MAX; 2]; 5];
    let mut goal = vec![0u8; len];
    enumerate(&melds, 0, &mut goal, 0, counts, &mut best);
    best
}

fn enumerate(
    melds: &[Vec<u8>],
    start: usize,
    goal: &mut [u8],
    m: usize,
    counts: &[u8],
    best: &mut [[u8; 2]; 5],
) {
    let cost: u8 = goal.iter().zip(counts).map(|(&g, &h)| g.saturating_sub(h)).sum();
    best[m][0] = best[m][0].min(cost);
    for i in 0..goal.len() {
        if goal[i] + 2 <= 4 {
            let with_pair = cost - goal[i].saturating_sub(counts[i]) + (goal[i] + 2).saturating_sub(counts[i]);
            best[m][1] = best[m][1].min(with_pair);
        }
    }
    if m == 4 {
        return;
    }
    for (t, meld) in melds.iter().enumerate().skip(start) {
        if goal.iter().zip(meld).all(|(&g, &d)| g + d <= 4) {
            for (g, d) in goal.iter_mut().zip(meld) {
                *g += d;
            }
            enumerate(melds, t, goal, m + 1, counts, best);
            for (g, d) in goal.iter_mut().zip(meld) {
                *g -= d;
            }
        }
    }
}
