//! Yaku detection, fu accumulation and payment calculation.

use anyhow::{Result, bail, ensure};

use crate::algo::score_table::{self, ScoreTitle};
use crate::algo::separate::{self, BlockList};
use crate::algo::shanten;
use crate::hand::TileCounts;
use crate::tile;
use crate::types::{
    Block, Meld, MeldKind, Player, Round, WaitKind, block_kind, rule_flag, shanten_flag,
    win_flag,
};

pub type YakuList = u64;

pub mod yaku {
    use super::YakuList;

    pub const TSUMO: YakuList = 1 << 0;
    pub const RIICHI: YakuList = 1 << 1;
    pub const IPPATSU: YakuList = 1 << 2;
    pub const TANYAO: YakuList = 1 << 3;
    pub const PINFU: YakuList = 1 << 4;
    pub const PURE_DOUBLE_SEQUENCE: YakuList = 1 << 5;
    pub const ROBBING_A_KONG: YakuList = 1 << 6;
    pub const AFTER_A_KONG: YakuList = 1 << 7;
    pub const UNDER_THE_SEA: YakuList = 1 << 8;
    pub const UNDER_THE_RIVER: YakuList = 1 << 9;
    pub const DORA: YakuList = 1 << 10;
    pub const URA_DORA: YakuList = 1 << 11;
    pub const RED_DORA: YakuList = 1 << 12;
    pub const WHITE_DRAGON: YakuList = 1 << 13;
    pub const GREEN_DRAGON: YakuList = 1 << 14;
    pub const RED_DRAGON: YakuList = 1 << 15;
    pub const SELF_WIND_EAST: YakuList = 1 << 16;
    pub const SELF_WIND_SOUTH: YakuList = 1 << 17;
    pub const SELF_WIND_WEST: YakuList = 1 << 18;
    pub const SELF_WIND_NORTH: YakuList = 1 << 19;
    pub const ROUND_WIND_EAST: YakuList = 1 << 20;
    pub const ROUND_WIND_SOUTH: YakuList = 1 << 21;
    pub const ROUND_WIND_WEST: YakuList = 1 << 22;
    pub const ROUND_WIND_NORTH: YakuList = 1 << 23;
    pub const DOUBLE_RIICHI: YakuList = 1 << 24;
    pub const SEVEN_PAIRS: YakuList = 1 << 25;
    pub const ALL_TRIPLETS: YakuList = 1 << 26;
    pub const THREE_CONCEALED_TRIPLETS: YakuList = 1 << 27;
    pub const TRIPLE_TRIPLETS: YakuList = 1 << 28;
    pub const MIXED_TRIPLE_SEQUENCE: YakuList = 1 << 29;
    pub const ALL_TERMINALS_AND_HONORS: YakuList = 1 << 30;
    pub const PURE_STRAIGHT: YakuList = 1 << 31;
    pub const HALF_OUTSIDE_HAND: YakuList = 1 << 32;
    pub const LITTLE_THREE_DRAGONS: YakuList = 1 << 33;
    pub const THREE_KONGS: YakuList = 1 << 34;
    pub const HALF_FLUSH: YakuList = 1 << 35;
    pub const FULLY_OUTSIDE_HAND: YakuList = 1 << 36;
    pub const TWICE_PURE_DOUBLE_SEQUENCE: YakuList = 1 << 37;
    pub const FULL_FLUSH: YakuList = 1 << 38;
    pub const NAGASHI_MANGAN: YakuList = 1 << 39;
    pub const BLESSING_OF_HEAVEN: YakuList = 1 << 40;
    pub const BLESSING_OF_EARTH: YakuList = 1 << 41;
    pub const HAND_OF_MAN: YakuList = 1 << 42;
    pub const ALL_GREEN: YakuList = 1 << 43;
    pub const BIG_THREE_DRAGONS: YakuList = 1 << 44;
    pub const LITTLE_FOUR_WINDS: YakuList = 1 << 45;
    pub const ALL_HONORS: YakuList = 1 << 46;
    pub const THIRTEEN_ORPHANS: YakuList = 1 << 47;
    pub const NINE_GATES: YakuList = 1 << 48;
    pub const FOUR_CONCEALED_TRIPLETS: YakuList = 1 << 49;
    pub const ALL_TERMINALS: YakuList = 1 << 50;
    pub const FOUR_KONGS: YakuList = 1 << 51;
    pub const SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS: YakuList = 1 << 52;
    pub const BIG_FOUR_WINDS: YakuList = 1 << 53;
    pub const TRUE_NINE_GATES: YakuList = 1 << 54;
    pub const THIRTEEN_WAIT_THIRTEEN_ORPHANS: YakuList = 1 << 55;

    /// Normal yaku in result-listing order.
    pub const NORMAL: [YakuList; 36] = [
        TSUMO,
        RIICHI,
        IPPATSU,
        TANYAO,
        PINFU,
        PURE_DOUBLE_SEQUENCE,
        ROBBING_A_KONG,
        AFTER_A_KONG,
        UNDER_THE_SEA,
        UNDER_THE_RIVER,
        WHITE_DRAGON,
        GREEN_DRAGON,
        RED_DRAGON,
        SELF_WIND_EAST,
        SELF_WIND_SOUTH,
        SELF_WIND_WEST,
        SELF_WIND_NORTH,
        ROUND_WIND_EAST,
        ROUND_WIND_SOUTH,
        ROUND_WIND_WEST,
        ROUND_WIND_NORTH,
        DOUBLE_RIICHI,
        SEVEN_PAIRS,
        ALL_TRIPLETS,
        THREE_CONCEALED_TRIPLETS,
        TRIPLE_TRIPLETS,
        MIXED_TRIPLE_SEQUENCE,
        ALL_TERMINALS_AND_HONORS,
        PURE_STRAIGHT,
        HALF_OUTSIDE_HAND,
        LITTLE_THREE_DRAGONS,
        THREE_KONGS,
        HALF_FLUSH,
        FULLY_OUTSIDE_HAND,
        TWICE_PURE_DOUBLE_SEQUENCE,
        FULL_FLUSH,
    ];

    /// Yakuman in result-listing order.
    pub const YAKUMAN: [YakuList; 16] = [
        BLESSING_OF_HEAVEN,
        BLESSING_OF_EARTH,
        HAND_OF_MAN,
        ALL_GREEN,
        BIG_THREE_DRAGONS,
        LITTLE_FOUR_WINDS,
        ALL_HONORS,
        THIRTEEN_ORPHANS,
        NINE_GATES,
        FOUR_CONCEALED_TRIPLETS,
        ALL_TERMINALS,
        FOUR_KONGS,
        SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS,
        BIG_FOUR_WINDS,
        TRUE_NINE_GATES,
        THIRTEEN_WAIT_THIRTEEN_ORPHANS,
    ];

    /// Pattern-dependent yaku summed per decomposition.
    pub(super) const PATTERN: [YakuList; 11] = [
        PINFU,
        PURE_DOUBLE_SEQUENCE,
        ALL_TRIPLETS,
        THREE_CONCEALED_TRIPLETS,
        TRIPLE_TRIPLETS,
        MIXED_TRIPLE_SEQUENCE,
        PURE_STRAIGHT,
        HALF_OUTSIDE_HAND,
        THREE_KONGS,
        FULLY_OUTSIDE_HAND,
        TWICE_PURE_DOUBLE_SEQUENCE,
    ];

    /// `[closed han, open han]`; for yakuman the first entry is the
    /// multiplier.
    pub fn han(y: YakuList) -> [u8; 2] {
        match y {
            TSUMO | RIICHI | IPPATSU | PINFU | PURE_DOUBLE_SEQUENCE => [1, 0],
            TANYAO | ROBBING_A_KONG | AFTER_A_KONG | UNDER_THE_SEA | UNDER_THE_RIVER
            | WHITE_DRAGON | GREEN_DRAGON | RED_DRAGON | SELF_WIND_EAST
            | SELF_WIND_SOUTH | SELF_WIND_WEST | SELF_WIND_NORTH | ROUND_WIND_EAST
            | ROUND_WIND_SOUTH | ROUND_WIND_WEST | ROUND_WIND_NORTH => [1, 1],
            DOUBLE_RIICHI | SEVEN_PAIRS => [2, 0],
            ALL_TRIPLETS | THREE_CONCEALED_TRIPLETS | TRIPLE_TRIPLETS
            | ALL_TERMINALS_AND_HONORS | LITTLE_THREE_DRAGONS | THREE_KONGS => [2, 2],
            MIXED_TRIPLE_SEQUENCE | PURE_STRAIGHT | HALF_OUTSIDE_HAND => [2, 1],
            HALF_FLUSH | FULLY_OUTSIDE_HAND => [3, 2],
            TWICE_PURE_DOUBLE_SEQUENCE => [3, 0],
            FULL_FLUSH => [6, 5],
            SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS | BIG_FOUR_WINDS | TRUE_NINE_GATES
            | THIRTEEN_WAIT_THIRTEEN_ORPHANS => [2, 0],
            BLESSING_OF_HEAVEN | BLESSING_OF_EARTH | HAND_OF_MAN | ALL_GREEN
            | BIG_THREE_DRAGONS | LITTLE_FOUR_WINDS | ALL_HONORS | THIRTEEN_ORPHANS
            | NINE_GATES | FOUR_CONCEALED_TRIPLETS | ALL_TERMINALS | FOUR_KONGS => [1, 0],
            _ => [0, 0],
        }
    }

    pub fn name(y: YakuList) -> &'static str {
        match y {
            TSUMO => "Menzen Tsumo",
            RIICHI => "Riichi",
            IPPATSU => "Ippatsu",
            TANYAO => "All Simples",
            PINFU => "Pinfu",
            PURE_DOUBLE_SEQUENCE => "Pure Double Sequence",
            ROBBING_A_KONG => "Robbing a Kong",
            AFTER_A_KONG => "After a Kong",
            UNDER_THE_SEA => "Under the Sea",
            UNDER_THE_RIVER => "Under the River",
            DORA => "Dora",
            URA_DORA => "Ura Dora",
            RED_DORA => "Red Dora",
            WHITE_DRAGON => "White Dragon",
            GREEN_DRAGON => "Green Dragon",
            RED_DRAGON => "Red Dragon",
            SELF_WIND_EAST => "Seat Wind East",
            SELF_WIND_SOUTH => "Seat Wind South",
            SELF_WIND_WEST => "Seat Wind West",
            SELF_WIND_NORTH => "Seat Wind North",
            ROUND_WIND_EAST => "Round Wind East",
            ROUND_WIND_SOUTH => "Round Wind South",
            ROUND_WIND_WEST => "Round Wind West",
            ROUND_WIND_NORTH => "Round Wind North",
            DOUBLE_RIICHI => "Double Riichi",
            SEVEN_PAIRS => "Seven Pairs",
            ALL_TRIPLETS => "All Triplets",
            THREE_CONCEALED_TRIPLETS => "Three Concealed Triplets",
            TRIPLE_TRIPLETS => "Triple Triplets",
            MIXED_TRIPLE_SEQUENCE => "Mixed Triple Sequence",
            ALL_TERMINALS_AND_HONORS => "All Terminals and Honors",
            PURE_STRAIGHT => "Pure Straight",
            HALF_OUTSIDE_HAND => "Half Outside Hand",
            LITTLE_THREE_DRAGONS => "Little Three Dragons",
            THREE_KONGS => "Three Kongs",
            HALF_FLUSH => "Half Flush",
            FULLY_OUTSIDE_HAND => "Fully Outside Hand",
            TWICE_PURE_DOUBLE_SEQUENCE => "Twice Pure Double Sequence",
            FULL_FLUSH => "Full Flush",
            NAGASHI_MANGAN => "Nagashi Mangan",
            BLESSING_OF_HEAVEN => "Blessing of Heaven",
            BLESSING_OF_EARTH => "Blessing of Earth",
            HAND_OF_MAN => "Hand of Man",
            ALL_GREEN => "All Green",
            BIG_THREE_DRAGONS => "Big Three Dragons",
            LITTLE_FOUR_WINDS => "Little Four Winds",
            ALL_HONORS => "All Honors",
            THIRTEEN_ORPHANS => "Thirteen Orphans",
            NINE_GATES => "Nine Gates",
            FOUR_CONCEALED_TRIPLETS => "Four Concealed Triplets",
            ALL_TERMINALS => "All Terminals",
            FOUR_KONGS => "Four Kongs",
            SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS => "Single-Wait Four Concealed Triplets",
            BIG_FOUR_WINDS => "Big Four Winds",
            TRUE_NINE_GATES => "True Nine Gates",
            THIRTEEN_WAIT_THIRTEEN_ORPHANS => "Thirteen-Wait Thirteen Orphans",
            _ => "No Yaku",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Score {
    /// Established yaku with their han values, listing order fixed.
    pub yaku: Vec<(YakuList, u8)>,
    pub han: u8,
    /// Fu value; zero for yakuman and nagashi mangan.
    pub fu: u8,
    pub title: Option<ScoreTitle>,
    /// `[winner gain, payment...]`: one payment on a discard win, the
    /// dealer's and the others' on a non-dealer self-draw.
    pub score: Vec<i32>,
    pub blocks: Vec<Block>,
    pub wait: Option<WaitKind>,
}

/// The merged hand folds every meld into 34-tile counts (a kong counts
/// three toward the shape). The packed fields hold three bits per count,
/// first tile of the group in the topmost bits.
struct Input<'a> {
    melds: &'a [Meld],
    merged: [u8; 34],
    win_tile: u8,
    win_flags: u32,
    closed: bool,
    manzu: u32,
    pinzu: u32,
    souzu: u32,
    honors: u32,
}

#[inline]
fn pack(counts: &[u8]) -> u32 {
    counts.iter().fold(0, |h, &c| h << 3 | c as u32)
}

#[inline]
fn packed_one(offset: usize, group_len: usize) -> u32 {
    1 << (3 * (group_len - 1 - offset))
}

fn create_input<'a>(player: &'a Player, win_tile: u8, win_flags: u32) -> Input<'a> {
    let mut merged = [0; 34];
    merged.copy_from_slice(&player.hand[..34]);
    for meld in &player.melds {
        let min = meld.min_tile() as usize;
        if meld.kind == MeldKind::Chow {
            merged[min] += 1;
            merged[min + 1] += 1;
            merged[min + 2] += 1;
        } else {
            merged[min] += 3;
        }
    }
    Input {
        melds: &player.melds,
        win_tile: tile::to_normal(win_tile),
        win_flags,
        closed: player.is_closed(),
        manzu: pack(&merged[0..9]),
        pinzu: pack(&merged[9..18]),
        souzu: pack(&merged[18..27]),
        honors: pack(&merged[27..34]),
        merged,
    }
}

/// Score a winning hand. The hand counts must already include the winning
/// tile. Precondition violations and yaku-less hands come back as errors.
pub fn calc(round: &Round, player: &Player, win_tile: u8, win_flags: u32) -> Result<Score> {
    check_arguments(player, win_tile, win_flags)?;
    if win_flags & win_flag::NAGASHI_MANGAN != 0 {
        // Mangan regardless of the hand shape.
        return Ok(aggregate_yakuman(round, player, win_flags, yaku::NAGASHI_MANGAN));
    }
    let (shanten_flags, shanten) =
        shanten::calc(&player.hand, player.melds.len(), shanten_flag::ALL);
    ensure!(shanten == -1, "the hand is not a winning shape");
    calc_fast(round, player, win_tile, win_flags, shanten_flags)
}

/// [`calc`] without the argument and shape checks, for callers that
/// already know the matched grammars.
pub fn calc_fast(
    round: &Round,
    player: &Player,
    win_tile: u8,
    win_flags: u32,
    shanten_flags: u8,
) -> Result<Score> {
    if win_flags & win_flag::NAGASHI_MANGAN != 0 {
        return Ok(aggregate_yakuman(round, player, win_flags, yaku::NAGASHI_MANGAN));
    }

    let input = create_input(player, win_tile, win_flags);

    let yakuman = check_yakuman(&input, shanten_flags);
    if yakuman != 0 {
        return Ok(aggregate_yakuman(round, player, win_flags, yakuman));
    }

    let mut yaku_list = check_not_pattern_yaku(round, player, &input, shanten_flags);
    let (pattern_yaku, fu, blocks, wait) = check_pattern_yaku(round, player, &input, shanten_flags)?;
    yaku_list |= pattern_yaku;

    if yaku_list == 0 {
        bail!("no yaku is established");
    }
    Ok(aggregate_normal(round, player, win_flags, yaku_list, fu, blocks, wait))
}

fn check_arguments(player: &Player, win_tile: u8, win_flags: u32) -> Result<()> {
    use win_flag::*;

    let exclusive = |x: u32| x == 0 || x & (x - 1) == 0;

    ensure!(
        player.hand[tile::to_normal(win_tile) as usize] > 0,
        "winning tile {} is not in the hand",
        tile::name(win_tile),
    );
    ensure!(
        exclusive(win_flags & (RIICHI | DOUBLE_RIICHI)),
        "riichi and double riichi are mutually exclusive",
    );
    ensure!(
        exclusive(win_flags & (ROBBING_A_KONG | AFTER_A_KONG | UNDER_THE_SEA | UNDER_THE_RIVER)),
        "at most one of robbing a kong, after a kong, under the sea and under the river",
    );
    ensure!(
        exclusive(win_flags & (BLESSING_OF_HEAVEN | BLESSING_OF_EARTH | HAND_OF_MAN)),
        "at most one of blessing of heaven, blessing of earth and hand of man",
    );
    ensure!(
        win_flags & (RIICHI | DOUBLE_RIICHI) == 0 || player.is_closed(),
        "riichi requires a closed hand",
    );
    ensure!(
        win_flags & IPPATSU == 0 || win_flags & (RIICHI | DOUBLE_RIICHI) != 0,
        "ippatsu requires riichi",
    );
    ensure!(
        win_flags & (UNDER_THE_SEA | AFTER_A_KONG) == 0 || win_flags & TSUMO != 0,
        "under the sea and after a kong require a self-draw",
    );
    Ok(())
}

fn aggregate_yakuman(round: &Round, player: &Player, win_flags: u32, yaku_list: YakuList) -> Score {
    let is_dealer = player.wind == tile::EAST;

    if yaku_list & yaku::NAGASHI_MANGAN != 0 {
        // Paid as a self-draw regardless of how the round actually ended.
        let score = payments(is_dealer, true, round.honba, round.kyotaku, Some(ScoreTitle::Mangan), 0, 0);
        return Score {
            yaku: vec![(yaku::NAGASHI_MANGAN, 0)],
            han: 0,
            fu: 0,
            title: Some(ScoreTitle::Mangan),
            score,
            blocks: Vec::new(),
            wait: None,
        };
    }

    let mut entries = Vec::new();
    let mut n = 0;
    for y in yaku::YAKUMAN {
        if yaku_list & y != 0 {
            let mult = yaku::han(y)[0];
            entries.push((y, mult));
            n += mult;
        }
    }
    let title = score_table::title_for_yakuman(n.min(6));
    let is_tsumo = win_flags & win_flag::TSUMO != 0;
    let score = payments(is_dealer, is_tsumo, round.honba, round.kyotaku, title, 0, 0);
    Score {
        yaku: entries,
        han: 0,
        fu: 0,
        title,
        score,
        blocks: Vec::new(),
        wait: None,
    }
}

fn aggregate_normal(
    round: &Round,
    player: &Player,
    win_flags: u32,
    yaku_list: YakuList,
    fu: u8,
    blocks: BlockList,
    wait: WaitKind,
) -> Score {
    let closed = player.is_closed();
    let mut entries = Vec::new();
    let mut han = 0;
    for y in yaku::NORMAL {
        if yaku_list & y != 0 {
            let h = yaku::han(y)[!closed as usize];
            entries.push((y, h));
            han += h;
        }
    }

    let num_doras = count_dora(&player.hand, &player.melds, &round.dora_indicators);
    if num_doras > 0 {
        entries.push((yaku::DORA, num_doras));
        han += num_doras;
    }
    let num_uradoras = count_dora(&player.hand, &player.melds, &round.uradora_indicators);
    if num_uradoras > 0 {
        entries.push((yaku::URA_DORA, num_uradoras));
        han += num_uradoras;
    }
    let num_reddoras =
        count_reddora(round.rules & rule_flag::RED_DORA != 0, &player.hand, &player.melds);
    if num_reddoras > 0 {
        entries.push((yaku::RED_DORA, num_reddoras));
        han += num_reddoras;
    }

    let title = score_table::title_for(fu, han);
    let is_dealer = player.wind == tile::EAST;
    let is_tsumo = win_flags & win_flag::TSUMO != 0;
    let score = payments(is_dealer, is_tsumo, round.honba, round.kyotaku, title, han, fu);
    Score {
        yaku: entries,
        han,
        fu,
        title,
        score,
        blocks: blocks.to_vec(),
        wait: Some(wait),
    }
}

/// `[winner gain, payments...]` for one win, honba and kyotaku included.
fn payments(
    is_dealer: bool,
    is_tsumo: bool,
    honba: i32,
    kyotaku: i32,
    title: Option<ScoreTitle>,
    han: u8,
    fu: u8,
) -> Vec<i32> {
    let lookup = |kind: usize| match title {
        Some(t) => score_table::ABOVE_MANGAN[kind][t as usize],
        None => score_table::BELOW_MANGAN[kind][score_table::fu_index(fu)][han as usize - 1],
    };

    if is_tsumo && is_dealer {
        let payment = lookup(score_table::TSUMO_PLAYER_TO_DEALER) + 100 * honba;
        vec![1000 * kyotaku + payment * 3, payment]
    } else if is_tsumo {
        let dealer_payment = lookup(score_table::TSUMO_DEALER_TO_PLAYER) + 100 * honba;
        let player_payment = lookup(score_table::TSUMO_PLAYER_TO_PLAYER) + 100 * honba;
        vec![1000 * kyotaku + dealer_payment + player_payment * 2, dealer_payment, player_payment]
    } else {
        let kind = if is_dealer {
            score_table::RON_DISCARDER_TO_DEALER
        } else {
            score_table::RON_DISCARDER_TO_PLAYER
        };
        let payment = lookup(kind) + 300 * honba;
        vec![1000 * kyotaku + payment, payment]
    }
}

/// One han per hand tile matching any indicator's dora; every indicator
/// is consulted.
pub fn count_dora(hand: &TileCounts, melds: &[Meld], indicators: &[u8]) -> u8 {
    let mut num = 0;
    for &indicator in indicators {
        let dora = tile::indicated_dora(indicator);
        num += hand[dora as usize];
        for meld in melds {
            num += meld.tiles.iter().filter(|&&t| tile::to_normal(t) == dora).count() as u8;
        }
    }
    num
}

pub fn count_reddora(rule_reddora: bool, hand: &TileCounts, melds: &[Meld]) -> u8 {
    if !rule_reddora {
        return 0;
    }
    let mut num = hand[tile::RED_MANZU5 as usize]
        + hand[tile::RED_PINZU5 as usize]
        + hand[tile::RED_SOUZU5 as usize];
    for meld in melds {
        if meld.tiles.iter().any(|&t| tile::is_red(t)) {
            num += 1;
        }
    }
    num
}

/// Expected-value helper: the winner's gain for each han from the hand's
/// own up to thirteen, fu fixed. A yakuman pays a single value.
pub fn scores_for_exp(score: &Score, round: &Round, seat_wind: u8) -> Vec<i32> {
    if score.title.is_some_and(|t| t >= ScoreTitle::CountedYakuman) {
        return vec![score.score[0]];
    }
    let is_dealer = seat_wind == tile::EAST;
    (score.han..=13)
        .map(|han| {
            let title = score_table::title_for(score.fu, han);
            payments(is_dealer, true, round.honba, round.kyotaku, title, han, score.fu)[0]
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////
// Yakuman checks
////////////////////////////////////////////////////////////////////////////

fn check_yakuman(input: &Input, shanten_flags: u8) -> YakuList {
    let mut list = 0;

    if input.win_flags & win_flag::BLESSING_OF_HEAVEN != 0 {
        list |= yaku::BLESSING_OF_HEAVEN;
    } else if input.win_flags & win_flag::BLESSING_OF_EARTH != 0 {
        list |= yaku::BLESSING_OF_EARTH;
    } else if input.win_flags & win_flag::HAND_OF_MAN != 0 {
        list |= yaku::HAND_OF_MAN;
    }

    // A hand winning as both regular and seven pairs scores as regular.
    if shanten_flags & shanten_flag::REGULAR != 0 {
        if check_all_green(input) {
            list |= yaku::ALL_GREEN;
        }
        if check_big_three_dragons(input) {
            list |= yaku::BIG_THREE_DRAGONS;
        }
        if check_big_four_winds(input) {
            list |= yaku::BIG_FOUR_WINDS;
        } else if check_little_four_winds(input) {
            list |= yaku::LITTLE_FOUR_WINDS;
        }
        if check_all_honors(input) {
            list |= yaku::ALL_HONORS;
        }
        if check_true_nine_gates(input) {
            list |= yaku::TRUE_NINE_GATES;
        } else if check_nine_gates(input) {
            list |= yaku::NINE_GATES;
        }
        match check_four_concealed_triplets(input) {
            2 => list |= yaku::SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS,
            1 => list |= yaku::FOUR_CONCEALED_TRIPLETS,
            _ => {}
        }
        if check_all_terminals(input) {
            list |= yaku::ALL_TERMINALS;
        }
        if check_four_kongs(input) {
            list |= yaku::FOUR_KONGS;
        }
    } else if shanten_flags & shanten_flag::SEVEN_PAIRS != 0 {
        if check_all_honors(input) {
            list |= yaku::ALL_HONORS;
        }
    } else {
        if check_thirteen_wait_thirteen_orphans(input) {
            list |= yaku::THIRTEEN_WAIT_THIRTEEN_ORPHANS;
        } else {
            list |= yaku::THIRTEEN_ORPHANS;
        }
    }

    list
}

const TERMINALS_MASK: u32 = 0b111_000_000_000_000_000_000_000_111;
const MIDDLES_MASK: u32 = 0b000_111_111_111_111_111_111_111_000;

fn check_all_green(input: &Input) -> bool {
    // Only 2, 3, 4, 6, 8 of souzu and the green dragon.
    const SOUZU_MASK: u32 = 0b111_000_000_000_111_000_111_000_111;
    const HONORS_MASK: u32 = 0b111_111_111_111_111_000_111;
    input.manzu == 0
        && input.pinzu == 0
        && input.souzu & SOUZU_MASK == 0
        && input.honors & HONORS_MASK == 0
}

fn check_big_three_dragons(input: &Input) -> bool {
    const DRAGONS_MASK: u32 = 0b000_000_000_000_111_111_111;
    const THREE_EACH: u32 = 0b000_000_000_000_011_011_011;
    input.honors & DRAGONS_MASK == THREE_EACH
}

fn check_little_four_winds(input: &Input) -> bool {
    let sum: u8 = (tile::EAST..=tile::NORTH).map(|t| input.merged[t as usize]).sum();
    sum == 11
}

fn check_big_four_winds(input: &Input) -> bool {
    let sum: u8 = (tile::EAST..=tile::NORTH).map(|t| input.merged[t as usize]).sum();
    sum == 12
}

fn check_all_honors(input: &Input) -> bool {
    input.manzu == 0 && input.pinzu == 0 && input.souzu == 0
}

fn check_nine_gates(input: &Input) -> bool {
    if !input.melds.is_empty() {
        return false;
    }
    let base = match input.win_tile {
        t if t <= tile::MANZU9 => 0,
        t if t <= tile::PINZU9 => 9,
        t if t <= tile::SOUZU9 => 18,
        _ => return false,
    };
    let h = &input.merged;
    h[base] >= 3 && h[base + 1..base + 8].iter().all(|&c| c >= 1) && h[base + 8] >= 3
}

fn check_true_nine_gates(input: &Input) -> bool {
    if !input.melds.is_empty() {
        return false;
    }
    const PURE: u32 = 0b011_001_001_001_001_001_001_001_011;
    let one = packed_one(input.win_tile as usize % 9, 9);
    match input.win_tile {
        t if t <= tile::MANZU9 => input.manzu - one == PURE,
        t if t <= tile::PINZU9 => input.pinzu - one == PURE,
        t if t <= tile::SOUZU9 => input.souzu - one == PURE,
        _ => false,
    }
}

fn check_four_concealed_triplets(input: &Input) -> i32 {
    if input.win_flags & win_flag::TSUMO == 0 || !input.closed {
        return 0;
    }
    let mut num_triplets = 0;
    let mut has_head = false;
    let mut single_wait = false;
    for (i, &c) in input.merged.iter().enumerate() {
        if c == 3 {
            num_triplets += 1;
        } else if c == 2 {
            has_head = true;
            single_wait = i == input.win_tile as usize;
        }
    }
    if num_triplets == 4 && has_head {
        if single_wait { 2 } else { 1 }
    } else {
        0
    }
}

fn check_all_terminals(input: &Input) -> bool {
    input.manzu & MIDDLES_MASK == 0
        && input.pinzu & MIDDLES_MASK == 0
        && input.souzu & MIDDLES_MASK == 0
        && input.honors == 0
}

fn check_four_kongs(input: &Input) -> bool {
    input.melds.iter().filter(|m| m.kind.is_kong()).count() == 4
}

fn check_thirteen_wait_thirteen_orphans(input: &Input) -> bool {
    const TERMINALS_ONE: u32 = 0b001_000_000_000_000_000_000_000_001;
    const HONORS_ONE: u32 = 0b001_001_001_001_001_001_001;

    let mut manzu = input.manzu;
    let mut pinzu = input.pinzu;
    let mut souzu = input.souzu;
    let mut honors = input.honors;
    match input.win_tile {
        t if t <= tile::MANZU9 => manzu -= packed_one(t as usize % 9, 9),
        t if t <= tile::PINZU9 => pinzu -= packed_one(t as usize % 9, 9),
        t if t <= tile::SOUZU9 => souzu -= packed_one(t as usize % 9, 9),
        t => honors -= packed_one(t as usize - 27, 7),
    }
    manzu == TERMINALS_ONE && pinzu == TERMINALS_ONE && souzu == TERMINALS_ONE && honors == HONORS_ONE
}

////////////////////////////////////////////////////////////////////////////
// Yaku independent of the decomposition
////////////////////////////////////////////////////////////////////////////

fn check_not_pattern_yaku(round: &Round, player: &Player, input: &Input, shanten_flags: u8) -> YakuList {
    let mut list = 0;

    if input.win_flags & win_flag::DOUBLE_RIICHI != 0 {
        list |= yaku::DOUBLE_RIICHI;
    } else if input.win_flags & win_flag::RIICHI != 0 {
        list |= yaku::RIICHI;
    }
    if input.win_flags & win_flag::IPPATSU != 0 {
        list |= yaku::IPPATSU;
    }
    if input.win_flags & win_flag::ROBBING_A_KONG != 0 {
        list |= yaku::ROBBING_A_KONG;
    } else if input.win_flags & win_flag::AFTER_A_KONG != 0 {
        list |= yaku::AFTER_A_KONG;
    } else if input.win_flags & win_flag::UNDER_THE_SEA != 0 {
        list |= yaku::UNDER_THE_SEA;
    } else if input.win_flags & win_flag::UNDER_THE_RIVER != 0 {
        list |= yaku::UNDER_THE_RIVER;
    }
    if input.win_flags & win_flag::TSUMO != 0 && input.closed {
        list |= yaku::TSUMO;
    }

    if check_tanyao(round.rules & rule_flag::OPEN_TANYAO != 0, input) {
        list |= yaku::TANYAO;
    }
    if check_full_flush(input) {
        list |= yaku::FULL_FLUSH;
    } else if check_half_flush(input) {
        list |= yaku::HALF_FLUSH;
    }
    if check_all_terminals_and_honors(input) {
        list |= yaku::ALL_TERMINALS_AND_HONORS;
    }

    if shanten_flags & shanten_flag::REGULAR != 0 {
        if check_little_three_dragons(input) {
            list |= yaku::LITTLE_THREE_DRAGONS;
        }
        if check_three_kongs(input) {
            list |= yaku::THREE_KONGS;
        }
        if input.merged[tile::WHITE as usize] == 3 {
            list |= yaku::WHITE_DRAGON;
        }
        if input.merged[tile::GREEN as usize] == 3 {
            list |= yaku::GREEN_DRAGON;
        }
        if input.merged[tile::RED as usize] == 3 {
            list |= yaku::RED_DRAGON;
        }
        if input.merged[player.wind as usize] == 3 {
            list |= yaku::SELF_WIND_EAST << (player.wind - tile::EAST);
        }
        if input.merged[round.wind as usize] == 3 {
            list |= yaku::ROUND_WIND_EAST << (round.wind - tile::EAST);
        }
    } else if shanten_flags & shanten_flag::SEVEN_PAIRS != 0 {
        list |= yaku::SEVEN_PAIRS;
    }

    list
}

fn check_tanyao(rule_open_tanyao: bool, input: &Input) -> bool {
    if !rule_open_tanyao && !input.closed {
        return false;
    }
    input.manzu & TERMINALS_MASK == 0
        && input.pinzu & TERMINALS_MASK == 0
        && input.souzu & TERMINALS_MASK == 0
        && input.honors == 0
}

fn check_half_flush(input: &Input) -> bool {
    let suits = [input.manzu, input.pinzu, input.souzu];
    input.honors != 0 && suits.iter().filter(|&&s| s != 0).count() == 1
}

fn check_full_flush(input: &Input) -> bool {
    let suits = [input.manzu, input.pinzu, input.souzu];
    input.honors == 0 && suits.iter().filter(|&&s| s != 0).count() == 1
}

fn check_all_terminals_and_honors(input: &Input) -> bool {
    input.manzu & MIDDLES_MASK == 0
        && input.pinzu & MIDDLES_MASK == 0
        && input.souzu & MIDDLES_MASK == 0
        && input.honors != 0
}

fn check_little_three_dragons(input: &Input) -> bool {
    input.merged[tile::WHITE as usize]
        + input.merged[tile::GREEN as usize]
        + input.merged[tile::RED as usize]
        == 8
}

fn check_three_kongs(input: &Input) -> bool {
    input.melds.iter().filter(|m| m.kind.is_kong()).count() == 3
}

////////////////////////////////////////////////////////////////////////////
// Yaku depending on the decomposition
////////////////////////////////////////////////////////////////////////////

fn check_pattern_yaku(
    round: &Round,
    player: &Player,
    input: &Input,
    shanten_flags: u8,
) -> Result<(YakuList, u8, BlockList, WaitKind)> {
    if shanten_flags == shanten_flag::SEVEN_PAIRS {
        return Ok((0, 25, BlockList::new(), WaitKind::Pair));
    }

    let patterns = separate::separate(&player.hand, &player.melds, input.win_tile, input.win_flags);
    ensure!(!patterns.is_empty(), "the hand has no block decomposition");

    let is_tsumo = input.win_flags & win_flag::TSUMO != 0;
    let mut best: Option<(YakuList, u8, BlockList, WaitKind)> = None;
    let mut best_rank = (0u8, 0u8);
    for (blocks, wait) in patterns {
        let mut list = 0;
        let is_pinfu = check_pinfu(&blocks, wait, round.wind, player.wind);
        if input.closed {
            if is_pinfu {
                list |= yaku::PINFU;
            }
            match check_pure_double_sequence(&blocks) {
                1 => list |= yaku::PURE_DOUBLE_SEQUENCE,
                2 => list |= yaku::TWICE_PURE_DOUBLE_SEQUENCE,
                _ => {}
            }
        }

        if check_pure_straight(&blocks) {
            list |= yaku::PURE_STRAIGHT;
        } else if check_triple_triplets(&blocks) {
            list |= yaku::TRIPLE_TRIPLETS;
        } else if check_mixed_triple_sequence(&blocks) {
            list |= yaku::MIXED_TRIPLE_SEQUENCE;
        }

        match check_outside_hand(&blocks) {
            1 => list |= yaku::HALF_OUTSIDE_HAND,
            2 => list |= yaku::FULLY_OUTSIDE_HAND,
            _ => {}
        }
        if check_all_triplets(&blocks) {
            list |= yaku::ALL_TRIPLETS;
        }
        if check_three_concealed_triplets(&blocks) {
            list |= yaku::THREE_CONCEALED_TRIPLETS;
        }

        let han: u8 = yaku::PATTERN
            .iter()
            .filter(|&&y| list & y != 0)
            .map(|&y| yaku::han(y)[!input.closed as usize])
            .sum();
        let fu = calc_fu(&blocks, wait, input.closed, is_tsumo, is_pinfu, round.wind, player.wind);

        if best.is_none() || han > best_rank.0 || (han == best_rank.0 && fu > best_rank.1) {
            best_rank = (han, fu);
            best = Some((list, fu, blocks, wait));
        }
    }

    Ok(best.expect("patterns are not empty"))
}

fn check_pinfu(blocks: &BlockList, wait: WaitKind, round_wind: u8, seat_wind: u8) -> bool {
    if wait != WaitKind::DoubleEdge {
        return false;
    }
    for block in blocks {
        if block.kind & (block_kind::TRIPLET | block_kind::KONG) != 0 {
            return false;
        }
        if block.kind & block_kind::PAIR != 0
            && (block.min_tile == round_wind
                || block.min_tile == seat_wind
                || block.min_tile >= tile::WHITE)
        {
            return false;
        }
    }
    true
}

fn check_pure_double_sequence(blocks: &BlockList) -> i32 {
    let mut count = [0u8; 34];
    for block in blocks {
        if block.kind & block_kind::SEQUENCE != 0 {
            count[block.min_tile as usize] += 1;
        }
    }
    count
        .iter()
        .map(|&c| match c {
            4 => 2,
            2 | 3 => 1,
            _ => 0,
        })
        .sum()
}

fn check_all_triplets(blocks: &BlockList) -> bool {
    blocks.iter().all(|b| b.kind & block_kind::SEQUENCE == 0)
}

fn check_three_concealed_triplets(blocks: &BlockList) -> bool {
    blocks
        .iter()
        .filter(|b| b.kind == block_kind::TRIPLET || b.kind == block_kind::KONG)
        .count()
        == 3
}

fn check_triple_triplets(blocks: &BlockList) -> bool {
    let mut count = [0u8; 34];
    for block in blocks {
        if block.kind & (block_kind::TRIPLET | block_kind::KONG) != 0 {
            count[block.min_tile as usize] += 1;
        }
    }
    (0..9).any(|i| count[i] > 0 && count[i + 9] > 0 && count[i + 18] > 0)
}

fn check_mixed_triple_sequence(blocks: &BlockList) -> bool {
    let mut count = [0u8; 34];
    for block in blocks {
        if block.kind & block_kind::SEQUENCE != 0 {
            count[block.min_tile as usize] += 1;
        }
    }
    (0..9).any(|i| count[i] > 0 && count[i + 9] > 0 && count[i + 18] > 0)
}

fn check_pure_straight(blocks: &BlockList) -> bool {
    let mut count = [0u8; 34];
    for block in blocks {
        if block.kind & block_kind::SEQUENCE != 0 {
            count[block.min_tile as usize] += 1;
        }
    }
    [0, 9, 18].iter().any(|&b| count[b] > 0 && count[b + 3] > 0 && count[b + 6] > 0)
}

/// 0 none, 1 half outside, 2 fully outside.
fn check_outside_hand(blocks: &BlockList) -> i32 {
    let mut honor_block = false;
    let mut sequence_block = false;
    for block in blocks {
        if block.kind & block_kind::SEQUENCE != 0 {
            if !matches!(block.min_tile, 0 | 6 | 9 | 15 | 18 | 24) {
                return 0;
            }
            sequence_block = true;
        } else {
            if !tile::is_terminal_or_honor(block.min_tile) {
                return 0;
            }
            honor_block |= tile::is_honor(block.min_tile);
        }
    }
    match (honor_block, sequence_block) {
        (true, true) => 1,
        (false, true) => 2,
        _ => 0,
    }
}

fn calc_fu(
    blocks: &BlockList,
    wait: WaitKind,
    is_closed: bool,
    is_tsumo: bool,
    is_pinfu: bool,
    round_wind: u8,
    seat_wind: u8,
) -> u8 {
    if is_pinfu && is_tsumo && is_closed {
        return 20;
    }
    if is_pinfu && !is_tsumo && !is_closed {
        return 30; // open pinfu shape pays a flat 30
    }

    let mut fu = 20u8;
    if is_closed && !is_tsumo {
        fu += 10;
    } else if is_tsumo {
        fu += 2;
    }

    if matches!(wait, WaitKind::Closed | WaitKind::Edge | WaitKind::Pair) {
        fu += 2;
    }

    for block in blocks {
        if block.kind & (block_kind::TRIPLET | block_kind::KONG) != 0 {
            let base = match block.kind {
                k if k == block_kind::TRIPLET | block_kind::OPEN => 2,
                k if k == block_kind::TRIPLET => 4,
                k if k == block_kind::KONG | block_kind::OPEN => 8,
                k if k == block_kind::KONG => 16,
                _ => 0,
            };
            fu += if tile::is_terminal_or_honor(block.min_tile) { base * 2 } else { base };
        } else if block.kind & block_kind::PAIR != 0 {
            if block.min_tile == seat_wind && block.min_tile == round_wind {
                fu += 4;
            } else if block.min_tile == seat_wind
                || block.min_tile == round_wind
                || block.min_tile >= tile::WHITE
            {
                fu += 2;
            }
        }
    }

    fu.div_ceil(10) * 10
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::hand;
    use crate::types::win_flag::*;

    fn east_round() -> Round {
        Round::default()
    }

    fn closed(hand_str: &str, wind: u8) -> Player {
        Player::new(hand(hand_str).unwrap(), Vec::new(), wind)
    }

    #[test]
    fn true_nine_gates_is_double_yakuman() {
        let player = closed("11123456789999m", tile::WEST);
        let score = calc(&east_round(), &player, tile::MANZU9, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::DoubleYakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::TRUE_NINE_GATES));

        // Won from an impure thirteen-tile shape it is a single yakuman.
        let player = closed("11123445678999m", tile::WEST);
        let score = calc(&east_round(), &player, tile::MANZU5, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::Yakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::NINE_GATES));
    }

    #[test]
    fn thirteen_wait_thirteen_orphans() {
        let player = closed("119m19p19s1234567z", tile::SOUTH);
        let score = calc(&east_round(), &player, tile::MANZU1, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::DoubleYakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::THIRTEEN_WAIT_THIRTEEN_ORPHANS));

        // Winning on a tile the hand did not pair means the wait was
        // single-sided: the plain yakuman.
        let score = calc(&east_round(), &player, tile::MANZU9, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::Yakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::THIRTEEN_ORPHANS));
    }

    #[test]
    fn four_concealed_triplets_single_wait() {
        let player = closed("222444666888s11z", tile::SOUTH);
        let score = calc(&east_round(), &player, tile::EAST, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::DoubleYakuman));
        assert!(
            score
                .yaku
                .iter()
                .any(|&(y, _)| y == yaku::SINGLE_WAIT_FOUR_CONCEALED_TRIPLETS)
        );

        // Winning on a triplet instead keeps it a single yakuman.
        let player = closed("222444666888s11z", tile::SOUTH);
        let score = calc(&east_round(), &player, 19, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::Yakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::FOUR_CONCEALED_TRIPLETS));
    }

    #[test]
    fn big_three_dragons() {
        let player = closed("12399m555666777z", tile::WEST);
        let score = calc(&east_round(), &player, tile::MANZU3, TSUMO).unwrap();
        assert_eq!(score.title, Some(ScoreTitle::Yakuman));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::BIG_THREE_DRAGONS));
    }

    #[test]
    fn double_east_pong_scores_both_winds() {
        // 123m 99m 123p 123s + east pong, self-draw 9m, east round and seat.
        let h = hand("12399m123p123s").unwrap();
        let melds = vec![Meld::new(MeldKind::Pong, &[tile::EAST; 3])];
        let player = Player::new(h, melds, tile::EAST);
        let score = calc(&east_round(), &player, tile::MANZU9, TSUMO).unwrap();
        // Both winds, open mixed triple sequence and open half outside hand.
        assert_eq!(score.han, 4);
        assert_eq!(score.fu, 30);
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::SELF_WIND_EAST));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::ROUND_WIND_EAST));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::MIXED_TRIPLE_SEQUENCE));
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::HALF_OUTSIDE_HAND));
        // Dealer self-draw below mangan: 3900 from each player.
        assert_eq!(score.score, vec![11700, 3900]);
    }

    #[test]
    fn pinfu_tsumo_is_twenty_fu() {
        let player = closed("234567m234567p55s", tile::SOUTH);
        let score = calc(&east_round(), &player, 15, TSUMO).unwrap();
        assert_eq!(score.fu, 20);
        assert_eq!(score.han, 2);
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::PINFU));
        assert_eq!(score.score, vec![1500, 700, 400]);
    }

    #[test]
    fn seven_pairs_is_twenty_five_fu() {
        let player = closed("2288m445577p1199s", tile::SOUTH);
        let score = calc(&east_round(), &player, tile::MANZU2, TSUMO).unwrap();
        assert_eq!(score.fu, 25);
        assert_eq!(score.han, 3); // seven pairs + menzen tsumo
        assert_eq!(score.wait, Some(WaitKind::Pair));
        assert_eq!(score.score, vec![3200, 1600, 800]);
    }

    #[test]
    fn riichi_ippatsu_uradora() {
        let mut round = east_round();
        round.dora_indicators = vec![tile::MANZU1]; // dora 2m
        round.uradora_indicators = vec![21]; // 4s indicates 5s
        let player = closed("234567m234567p55s", tile::SOUTH);
        let score =
            calc(&round, &player, 15, TSUMO | RIICHI | IPPATSU).unwrap();
        // pinfu + tsumo + riichi + ippatsu + dora 2m + uradora 5s x2
        assert_eq!(score.han, 7);
        assert_eq!(score.title, Some(ScoreTitle::Haneman));
        assert!(score.yaku.iter().any(|&(y, n)| y == yaku::URA_DORA && n == 2));
    }

    #[test]
    fn dora_strictly_increases_han() {
        let player = closed("234567m234567p55s", tile::SOUTH);
        let bare = calc(&east_round(), &player, 15, TSUMO).unwrap();
        let mut round = east_round();
        round.dora_indicators = vec![tile::MANZU1];
        let with_dora = calc(&round, &player, 15, TSUMO).unwrap();
        assert!(with_dora.han > bare.han);
        assert!(with_dora.score[0] >= bare.score[0]);
    }

    #[test]
    fn red_dora_counts_with_rule_only() {
        let player = closed("234067m234567p55s", tile::SOUTH);
        let score = calc(&east_round(), &player, 15, TSUMO).unwrap();
        assert!(score.yaku.iter().any(|&(y, n)| y == yaku::RED_DORA && n == 1));

        let mut no_red = east_round();
        no_red.rules = rule_flag::OPEN_TANYAO;
        let score = calc(&no_red, &player, 15, TSUMO).unwrap();
        assert!(score.yaku.iter().all(|&(y, _)| y != yaku::RED_DORA));
    }

    #[test]
    fn open_tanyao_rule_gates_the_yaku() {
        let h = hand("23455m345p678p").unwrap();
        let melds = vec![Meld::new(MeldKind::Chow, &[20, 21, 22])];
        let player = Player::new(h, melds, tile::SOUTH);

        let score = calc(&east_round(), &player, 3, 0).unwrap();
        assert_eq!(score.han, 1);
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::TANYAO));

        let mut strict = east_round();
        strict.rules = rule_flag::RED_DORA;
        assert!(calc(&strict, &player, 3, 0).is_err());
    }

    #[test]
    fn twice_pure_double_sequence_beats_seven_pairs_reading() {
        let player = closed("112233445566m77p", tile::SOUTH);
        let score = calc(&east_round(), &player, tile::MANZU1, 0).unwrap();
        assert!(score.yaku.iter().any(|&(y, _)| y == yaku::TWICE_PURE_DOUBLE_SEQUENCE));
        assert!(score.yaku.iter().all(|&(y, _)| y != yaku::SEVEN_PAIRS));
    }

    #[test]
    fn nagashi_mangan_pays_mangan() {
        let player = closed("19m19p19s1234567z", tile::SOUTH);
        let score = calc(
            &east_round(),
            &player,
            tile::MANZU1,
            NAGASHI_MANGAN,
        )
        .unwrap();
        assert_eq!(score.title, Some(ScoreTitle::Mangan));
        assert_eq!(score.score, vec![8000, 4000, 2000]);
    }

    #[test]
    fn honba_and_kyotaku() {
        let mut round = east_round();
        round.honba = 2;
        round.kyotaku = 1;
        let player = closed("2288m445577p1199s", tile::SOUTH);
        let score = calc(&round, &player, tile::MANZU2, TSUMO).unwrap();
        // 25 fu 3 han: 1600 + 200, 800 + 200 each, plus the riichi stick.
        assert_eq!(score.score, vec![4800, 1800, 1000]);
    }

    #[test]
    fn argument_checks() {
        let player = closed("234567m234567p55s", tile::SOUTH);
        assert!(calc(&east_round(), &player, tile::EAST, TSUMO).is_err());
        assert!(calc(&east_round(), &player, 15, TSUMO | IPPATSU).is_err());
        assert!(calc(&east_round(), &player, 15, RIICHI | DOUBLE_RIICHI).is_err());
        assert!(calc(&east_round(), &player, 15, UNDER_THE_SEA).is_err());

        let open = Player::new(
            hand("23455m345p45s").unwrap(),
            vec![Meld::new(MeldKind::Chow, &[20, 21, 22])],
            tile::SOUTH,
        );
        assert!(calc(&east_round(), &open, 21, RIICHI).is_err());

        let not_winning = closed("234567m234567p5s9m", tile::SOUTH);
        assert!(calc(&east_round(), &not_winning, 22, TSUMO).is_err());
    }

    #[test]
    fn fu_is_a_multiple_of_ten_on_random_regular_hands() {
        let mut rng = crate::testutil::rng(0xD4);
        let mut produced = 0;
        'outer: for _ in 0..400 {
            use rand::prelude::*;
            // Compose a random winning hand from four groups and a pair.
            let mut counts = [0u8; 37];
            for _ in 0..4 {
                if rng.random_bool(0.5) {
                    let suit = rng.random_range(0..3);
                    let start = suit * 9 + rng.random_range(0..7);
                    for t in start..start + 3 {
                        counts[t] += 1;
                    }
                } else {
                    let t = rng.random_range(0..34);
                    counts[t] += 3;
                }
            }
            let pair = rng.random_range(0..34);
            counts[pair] += 2;
            if counts.iter().any(|&c| c > 4) {
                continue 'outer;
            }
            let win_tile = (0..34usize).filter(|&t| counts[t] > 0).choose(&mut rng).unwrap() as u8;
            let player = Player::new(counts, Vec::new(), tile::SOUTH);
            let score = calc(&east_round(), &player, win_tile, TSUMO).unwrap();
            if score.title.is_none() || score.title < Some(ScoreTitle::Yakuman) {
                if score.fu != 25 {
                    assert_eq!(score.fu % 10, 0, "hand {}", crate::hand::to_mpsz(&counts));
                    assert!((20..=110).contains(&score.fu));
                }
                assert!(score.han >= 1);
                assert!(score.score[0] > 0);
            }
            produced += 1;
        }
        assert!(produced > 100);
    }

    #[test]
    fn scores_for_exp_ladder() {
        let player = closed("234567m234567p55s", tile::SOUTH);
        let score = calc(&east_round(), &player, 15, TSUMO).unwrap();
        let ladder = scores_for_exp(&score, &east_round(), tile::SOUTH);
        assert_eq!(ladder.len(), (13 - score.han + 1) as usize);
        // 20 fu 2 han tsumo = 1500 total; ladders upward monotonically.
        assert_eq!(ladder[0], 1500);
        assert!(ladder.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*ladder.last().unwrap(), 32000); // counted yakuman, non-dealer
    }
}
