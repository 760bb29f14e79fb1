//! Shanten distance under the three shape grammars.

use crate::hand::TileCounts;
use crate::table::{self, Entry, TABLE, Table};
use crate::tile;
use crate::types::shanten_flag;

/// Minimum distance across the enabled grammars, together with the set of
/// grammars attaining it. Seven Pairs and Thirteen Orphans only apply to
/// hands without melds. `-1` means the hand is a winning shape.
pub fn calc(hand: &TileCounts, num_melds: usize, flags: u8) -> (u8, i8) {
    let mut matched = 0;
    let mut best = i8::MAX;
    if flags & shanten_flag::REGULAR != 0 {
        fold(&mut matched, &mut best, shanten_flag::REGULAR, calc_regular(hand, num_melds));
    }
    if flags & shanten_flag::SEVEN_PAIRS != 0 && num_melds == 0 {
        fold(&mut matched, &mut best, shanten_flag::SEVEN_PAIRS, calc_seven_pairs(hand));
    }
    if flags & shanten_flag::THIRTEEN_ORPHANS != 0 && num_melds == 0 {
        fold(&mut matched, &mut best, shanten_flag::THIRTEEN_ORPHANS, calc_thirteen_orphans(hand));
    }
    (matched, best)
}

fn fold(matched: &mut u8, best: &mut i8, flag: u8, shanten: i8) {
    if shanten < *best {
        *matched = flag;
        *best = shanten;
    } else if shanten == *best {
        *matched |= flag;
    }
}

/// Regular four-melds-plus-pair distance through the precomputed tables.
pub fn calc_regular(hand: &TileCounts, num_melds: usize) -> i8 {
    let t = &*TABLE;
    let manzu = t.suits(Table::suits_hash(&hand[0..9]));
    let pinzu = t.suits(Table::suits_hash(&hand[9..18]));
    let souzu = t.suits(Table::suits_hash(&hand[18..27]));
    let honors = t.honors(Table::honors_hash(&hand[27..34]));
    let m = 4 - num_melds;

    let mut acc = [0i32; 10];
    for i in 0..10 {
        acc[i] = table::distance(honors, i);
    }
    add(&mut acc, souzu, m);
    add(&mut acc, pinzu, m);
    add(&mut acc, manzu, m);

    (acc[5 + m] - 1) as i8
}

pub fn calc_seven_pairs(hand: &TileCounts) -> i8 {
    let mut num_types = 0;
    let mut num_pairs = 0;
    for &c in &hand[..tile::NUM_TILE_KINDS] {
        num_types += (c > 0) as i8;
        num_pairs += (c >= 2) as i8;
    }
    6 - num_pairs + (7 - num_types).max(0)
}

pub fn calc_thirteen_orphans(hand: &TileCounts) -> i8 {
    let mut num_types = 0;
    let mut has_pair = false;
    for t in tile::YAOCHUU {
        num_types += (hand[t as usize] > 0) as i8;
        has_pair |= hand[t as usize] >= 2;
    }
    13 - num_types - has_pair as i8
}

/// One step of the constrained (min,+) convolution: fold `rhs` into the
/// running accumulator, letting at most one side contribute the pair.
fn add(lhs: &mut [i32; 10], rhs: &Entry, m: usize) {
    for i in (5..=5 + m).rev() {
        let mut d = (lhs[i] + table::distance(rhs, 0)).min(lhs[0] + table::distance(rhs, i));
        for j in 5..i {
            d = d
                .min(lhs[j] + table::distance(rhs, i - j))
                .min(lhs[i - j] + table::distance(rhs, j));
        }
        lhs[i] = d;
    }
    for i in (0..=m).rev() {
        let mut d = lhs[i] + table::distance(rhs, 0);
        for j in 0..i {
            d = d.min(lhs[j] + table::distance(rhs, i - j));
        }
        lhs[i] = d;
    }
}

/// Accumulator for the mask-carrying variant of the merge, shared by the
/// necessary and unnecessary tile selectors.
pub(crate) struct MaskAcc {
    pub d: [i32; 10],
    pub mask: [u64; 10],
}

impl MaskAcc {
    pub(crate) fn from_honors(honors: &Entry, group: impl Fn(&Entry, usize) -> u64) -> Self {
        let mut acc = Self { d: [0; 10], mask: [0; 10] };
        for i in 0..10 {
            acc.d[i] = table::distance(honors, i);
            acc.mask[i] = group(honors, i);
        }
        acc
    }
}

/// Same convolution as [`add`], but each candidate carries its tile mask:
/// a strictly smaller distance replaces the mask, a tie ORs them. Merged
/// suits shift left by nine bits so the final layout is manzu in the low
/// nine bits, then pinzu, souzu and honors.
pub(crate) fn add_masked(lhs: &mut MaskAcc, rhs: &Entry, m: usize, group: impl Fn(&Entry, usize) -> u64) {
    for i in (5..=5 + m).rev() {
        let mut d = lhs.d[i] + table::distance(rhs, 0);
        let mut y = lhs.mask[i] << 9 | group(rhs, 0);
        shift(&mut d, lhs.d[0] + table::distance(rhs, i), &mut y, lhs.mask[0] << 9 | group(rhs, i));
        for j in 5..i {
            shift(
                &mut d,
                lhs.d[j] + table::distance(rhs, i - j),
                &mut y,
                lhs.mask[j] << 9 | group(rhs, i - j),
            );
            shift(
                &mut d,
                lhs.d[i - j] + table::distance(rhs, j),
                &mut y,
                lhs.mask[i - j] << 9 | group(rhs, j),
            );
        }
        lhs.d[i] = d;
        lhs.mask[i] = y;
    }
    for i in (0..=m).rev() {
        let mut d = lhs.d[i] + table::distance(rhs, 0);
        let mut y = lhs.mask[i] << 9 | group(rhs, 0);
        for j in 0..i {
            shift(
                &mut d,
                lhs.d[j] + table::distance(rhs, i - j),
                &mut y,
                lhs.mask[j] << 9 | group(rhs, i - j),
            );
        }
        lhs.d[i] = d;
        lhs.mask[i] = y;
    }
}

fn shift(lv: &mut i32, rv: i32, ly: &mut u64, ry: u64) {
    if *lv == rv {
        *ly |= ry;
    } else if *lv > rv {
        *lv = rv;
        *ly = ry;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::hand;
    use crate::testutil;
    use crate::types::shanten_flag::{ALL, REGULAR, SEVEN_PAIRS, THIRTEEN_ORPHANS};

    #[test]
    fn golden_hands() {
        let cases: &[(&str, usize, i8)] = &[
            ("222567m34p33667s1z", 0, 1),
            ("123456789m123p11s", 0, -1),
            ("123456789m123p14s", 0, 0),
            ("1112345678999m1m", 0, -1),
            ("123m456p789s1122z", 0, 0),
            ("19m19p19s1234567z", 0, 0),
            ("147m258p369s1234z", 0, 6),
            ("1111234444789m1p", 0, 0),
            ("222m345p11222s", 1, -1),
            ("222m34p11s", 2, 0),
            ("5m", 4, 0),
            ("55m", 4, -1),
        ];
        for &(s, melds, expected) in cases {
            let h = hand(s).unwrap();
            let (_, shanten) = calc(&h, melds, ALL);
            assert_eq!(shanten, expected, "{s} with {melds} melds");
        }
    }

    #[test]
    fn grammar_flags() {
        // A ryanpeikou shape is winning as both regular and seven pairs.
        let h = hand("112233445566m77p").unwrap();
        let (matched, shanten) = calc(&h, 0, ALL);
        assert_eq!(shanten, -1);
        assert_eq!(matched, REGULAR | SEVEN_PAIRS);

        let h = hand("1199m1199p1199s12z").unwrap();
        let (matched, shanten) = calc(&h, 0, ALL);
        assert_eq!(shanten, 0);
        assert_eq!(matched, SEVEN_PAIRS);
        assert_eq!(calc(&h, 0, THIRTEEN_ORPHANS).1, 4);
    }

    #[test]
    fn seven_pairs_counts_four_of_a_kind_once() {
        let h = hand("11223344555566m").unwrap();
        assert_eq!(calc_seven_pairs(&h), 1);
        let h = hand("1122334455667m").unwrap();
        assert_eq!(calc_seven_pairs(&h), 0);
    }

    #[test]
    fn thirteen_orphans_closed_form() {
        let h = hand("19m19p19s1234567z").unwrap();
        assert_eq!(calc_thirteen_orphans(&h), 0);
        let h = hand("19m19p19s123456z1z").unwrap();
        assert_eq!(calc_thirteen_orphans(&h), -1);
        let h = hand("2345678m2345678p").unwrap();
        assert_eq!(calc_thirteen_orphans(&h), 13);
    }

    #[test]
    fn regular_matches_goal_enumeration() {
        let mut rng = testutil::rng(0xA1);
        for _ in 0..120 {
            let h = testutil::random_hand(&mut rng, 13);
            assert_eq!(
                calc_regular(&h, 0),
                testutil::reference_regular_shanten(&h, 0),
                "hand {}",
                crate::hand::to_mpsz(&h),
            );
        }
        for _ in 0..120 {
            let h = testutil::random_hand(&mut rng, 14);
            assert_eq!(
                calc_regular(&h, 0),
                testutil::reference_regular_shanten(&h, 0),
                "hand {}",
                crate::hand::to_mpsz(&h),
            );
        }
        for _ in 0..60 {
            let h = testutil::random_hand(&mut rng, 8);
            assert_eq!(
                calc_regular(&h, 2),
                testutil::reference_regular_shanten(&h, 2),
                "hand {} with two melds",
                crate::hand::to_mpsz(&h),
            );
        }
    }
}
