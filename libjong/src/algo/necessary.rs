//! Necessary tiles: the tiles whose draw strictly decreases the distance.

use crate::algo::shanten::{self, MaskAcc, add_masked};
use crate::hand::TileCounts;
use crate::table::{self, TABLE, Table};
use crate::tile;
use crate::types::shanten_flag;

/// Like [`calc`], with the mask expanded to a tile list.
pub fn select(hand: &TileCounts, num_melds: usize, flags: u8) -> (u8, i8, Vec<u8>) {
    let (matched, shanten, mask) = calc(hand, num_melds, flags);
    let tiles = (0..tile::NUM_TILE_KINDS as u8).filter(|&t| mask >> t & 1 == 1).collect();
    (matched, shanten, tiles)
}

/// Minimum distance across the enabled grammars plus the 34-bit mask of
/// tiles whose addition decreases it. Grammars tying for the minimum
/// contribute the union of their masks.
pub fn calc(hand: &TileCounts, num_melds: usize, flags: u8) -> (u8, i8, u64) {
    let mut matched = 0;
    let mut best = i8::MAX;
    let mut mask = 0;
    if flags & shanten_flag::REGULAR != 0 {
        let (shanten, wait) = calc_regular(hand, num_melds);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::REGULAR, shanten, wait);
    }
    if flags & shanten_flag::SEVEN_PAIRS != 0 && num_melds == 0 {
        let (shanten, wait) = calc_seven_pairs(hand);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::SEVEN_PAIRS, shanten, wait);
    }
    if flags & shanten_flag::THIRTEEN_ORPHANS != 0 && num_melds == 0 {
        let (shanten, wait) = calc_thirteen_orphans(hand);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::THIRTEEN_ORPHANS, shanten, wait);
    }
    (matched, best, mask)
}

fn fold(matched: &mut u8, best: &mut i8, mask: &mut u64, flag: u8, shanten: i8, wait: u64) {
    if shanten < *best {
        *matched = flag;
        *best = shanten;
        *mask = wait;
    } else if shanten == *best {
        *matched |= flag;
        *mask |= wait;
    }
}

fn calc_regular(hand: &TileCounts, num_melds: usize) -> (i8, u64) {
    let t = &*TABLE;
    let manzu = t.suits(Table::suits_hash(&hand[0..9]));
    let pinzu = t.suits(Table::suits_hash(&hand[9..18]));
    let souzu = t.suits(Table::suits_hash(&hand[18..27]));
    let honors = t.honors(Table::honors_hash(&hand[27..34]));
    let m = 4 - num_melds;

    let mut acc = MaskAcc::from_honors(honors, table::wait_mask);
    add_masked(&mut acc, souzu, m, table::wait_mask);
    add_masked(&mut acc, pinzu, m, table::wait_mask);
    add_masked(&mut acc, manzu, m, table::wait_mask);

    ((acc.d[5 + m] - 1) as i8, acc.mask[5 + m])
}

fn calc_seven_pairs(hand: &TileCounts) -> (i8, u64) {
    let mut num_pairs = 0;
    let mut num_types = 0;
    let mut count0 = 0u64;
    let mut count1 = 0u64;
    for i in 0..tile::NUM_TILE_KINDS {
        match hand[i] {
            0 => count0 |= 1 << i,
            1 => {
                num_types += 1;
                count1 |= 1 << i;
            }
            _ => {
                num_pairs += 1;
                num_types += 1;
            }
        }
    }

    let shanten = 6 - num_pairs + (7 - num_types).max(0);
    let wait = if num_types < 7 {
        count0 | count1
    } else if num_pairs == 7 {
        0
    } else {
        count1
    };
    (shanten, wait)
}

fn calc_thirteen_orphans(hand: &TileCounts) -> (i8, u64) {
    let mut num_pairs = 0;
    let mut num_types = 0;
    let mut count0 = 0u64;
    let mut count1 = 0u64;
    for t in tile::YAOCHUU {
        match hand[t as usize] {
            0 => count0 |= 1 << t,
            1 => {
                num_types += 1;
                count1 |= 1 << t;
            }
            _ => {
                num_types += 1;
                num_pairs += 1;
            }
        }
    }

    let shanten = 13 - num_types - (num_pairs > 0) as i8;
    let wait = if num_pairs > 0 { count0 } else { count0 | count1 };
    (shanten, wait)
}
