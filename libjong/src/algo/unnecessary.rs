//! Unnecessary tiles: the tiles whose discard keeps the distance.

use crate::algo::shanten::{MaskAcc, add_masked};
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
/// tiles whose removal does not increase it.
pub fn calc(hand: &TileCounts, num_melds: usize, flags: u8) -> (u8, i8, u64) {
    let mut matched = 0;
    let mut best = i8::MAX;
    let mut mask = 0;
    if flags & shanten_flag::REGULAR != 0 {
        let (shanten, disc) = calc_regular(hand, num_melds);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::REGULAR, shanten, disc);
    }
    if flags & shanten_flag::SEVEN_PAIRS != 0 && num_melds == 0 {
        let (shanten, disc) = calc_seven_pairs(hand);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::SEVEN_PAIRS, shanten, disc);
    }
    if flags & shanten_flag::THIRTEEN_ORPHANS != 0 && num_melds == 0 {
        let (shanten, disc) = calc_thirteen_orphans(hand);
        fold(&mut matched, &mut best, &mut mask, shanten_flag::THIRTEEN_ORPHANS, shanten, disc);
    }
    (matched, best, mask)
}

fn fold(matched: &mut u8, best: &mut i8, mask: &mut u64, flag: u8, shanten: i8, disc: u64) {
    if shanten < *best {
        *matched = flag;
        *best = shanten;
        *mask = disc;
    } else if shanten == *best {
        *matched |= flag;
        *mask |= disc;
    }
}

fn calc_regular(hand: &TileCounts, num_melds: usize) -> (i8, u64) {
    let t = &*TABLE;
    let manzu = t.suits(Table::suits_hash(&hand[0..9]));
    let pinzu = t.suits(Table::suits_hash(&hand[9..18]));
    let souzu = t.suits(Table::suits_hash(&hand[18..27]));
    let honors = t.honors(Table::honors_hash(&hand[27..34]));
    let m = 4 - num_melds;

    let mut acc = MaskAcc::from_honors(honors, table::discard_mask);
    add_masked(&mut acc, souzu, m, table::discard_mask);
    add_masked(&mut acc, pinzu, m, table::discard_mask);
    add_masked(&mut acc, manzu, m, table::discard_mask);

    ((acc.d[5 + m] - 1) as i8, acc.mask[5 + m])
}

fn calc_seven_pairs(hand: &TileCounts) -> (i8, u64) {
    let mut num_pairs = 0;
    let mut num_types = 0;
    let mut count1 = 0u64;
    let mut count_ge3 = 0u64;
    for i in 0..tile::NUM_TILE_KINDS {
        match hand[i] {
            0 => {}
            1 => {
                num_types += 1;
                count1 |= 1 << i;
            }
            2 => {
                num_pairs += 1;
                num_types += 1;
            }
            _ => {
                num_pairs += 1;
                num_types += 1;
                count_ge3 |= 1 << i;
            }
        }
    }

    let shanten = 6 - num_pairs + (7 - num_types).max(0);
    let disc = if num_types > 7 { count1 | count_ge3 } else { count_ge3 };
    (shanten, disc)
}

fn calc_thirteen_orphans(hand: &TileCounts) -> (i8, u64) {
    let mut num_pairs = 0;
    let mut num_types = 0;
    let mut middles = 0u64;
    let mut count2 = 0u64;
    let mut count_gt2 = 0u64;
    for t in 0..tile::NUM_TILE_KINDS as u8 {
        if !tile::is_terminal_or_honor(t) {
            if hand[t as usize] > 0 {
                middles |= 1 << t;
            }
            continue;
        }
        match hand[t as usize] {
            0 => {}
            1 => num_types += 1,
            2 => {
                num_types += 1;
                num_pairs += 1;
                count2 |= 1 << t;
            }
            _ => {
                num_types += 1;
                num_pairs += 1;
                count_gt2 |= 1 << t;
            }
        }
    }

    let shanten = 13 - num_types - (num_pairs > 0) as i8;
    let disc = if num_pairs >= 2 {
        middles | count_gt2 | count2
    } else {
        middles | count_gt2
    };
    (shanten, disc)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::shanten;
    use crate::hand::hand;
    use crate::testutil;
    use crate::types::shanten_flag::ALL;

    /// Every tile in the mask can be cut for free; no tile outside it can.
    #[test]
    fn unnecessary_tile_law() {
        let mut rng = testutil::rng(0xC3);
        for n in [14, 14, 11, 8] {
            for _ in 0..60 {
                let h = testutil::random_hand(&mut rng, n);
                let num_melds = (14 - n) / 3;
                let (_, before, mask) = calc(&h, num_melds, ALL);
                for t in 0..tile::NUM_TILE_KINDS {
                    if h[t] == 0 {
                        continue;
                    }
                    let mut removed = h;
                    removed[t] -= 1;
                    let after = shanten::calc(&removed, num_melds, ALL).1;
                    if mask >> t & 1 == 1 {
                        assert_eq!(after, before, "{} - {}", crate::hand::to_mpsz(&h), tile::name(t as u8));
                    } else {
                        assert_eq!(after, before + 1, "{} - {}", crate::hand::to_mpsz(&h), tile::name(t as u8));
                    }
                }
            }
        }
    }

    #[test]
    fn lone_honor_is_unnecessary() {
        // The lone east is cuttable from 222567m34p33667s1z without cost.
        let h = hand("222567m34p33667s1z").unwrap();
        let (_, shanten, tiles) = select(&h, 0, ALL);
        assert_eq!(shanten, 1);
        assert!(tiles.contains(&tile::EAST));
    }
}
