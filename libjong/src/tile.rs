//! Tile identifiers.
//!
//! `0..=8` are manzu 1-9, `9..=17` pinzu 1-9, `18..=26` souzu 1-9 and
//! `27..=33` the honors in the order east, south, west, north, white,
//! green, red. `34..=36` are the red fives of the three suits; for every
//! shape purpose they are the same tile as their normal five and are only
//! tracked separately for red-dora counting.

pub const MANZU1: u8 = 0;
pub const MANZU2: u8 = 1;
pub const MANZU3: u8 = 2;
pub const MANZU5: u8 = 4;
pub const MANZU9: u8 = 8;
pub const PINZU1: u8 = 9;
pub const PINZU5: u8 = 13;
pub const PINZU9: u8 = 17;
pub const SOUZU1: u8 = 18;
pub const SOUZU5: u8 = 22;
pub const SOUZU9: u8 = 26;
pub const EAST: u8 = 27;
pub const SOUTH: u8 = 28;
pub const WEST: u8 = 29;
pub const NORTH: u8 = 30;
pub const WHITE: u8 = 31;
pub const GREEN: u8 = 32;
pub const RED: u8 = 33;
pub const RED_MANZU5: u8 = 34;
pub const RED_PINZU5: u8 = 35;
pub const RED_SOUZU5: u8 = 36;

/// Tile kinds that matter for hand shapes.
pub const NUM_TILE_KINDS: usize = 34;
/// Tile kinds including the three red fives.
pub const NUM_TILE_IDS: usize = 37;

pub const YAOCHUU: [u8; 13] = [
    MANZU1, MANZU9, PINZU1, PINZU9, SOUZU1, SOUZU9, EAST, SOUTH, WEST, NORTH, WHITE,
    GREEN, RED,
];

/// Map a red five onto its normal five; other tiles pass through.
#[inline]
pub const fn to_normal(tile: u8) -> u8 {
    match tile {
        RED_MANZU5 => MANZU5,
        RED_PINZU5 => PINZU5,
        RED_SOUZU5 => SOUZU5,
        t => t,
    }
}

#[inline]
pub const fn is_red(tile: u8) -> bool {
    tile >= RED_MANZU5
}

#[inline]
pub const fn is_honor(tile: u8) -> bool {
    tile >= EAST && tile <= RED
}

#[inline]
pub const fn is_terminal(tile: u8) -> bool {
    tile < EAST && (tile % 9 == 0 || tile % 9 == 8)
}

#[inline]
pub const fn is_terminal_or_honor(tile: u8) -> bool {
    is_terminal(tile) || is_honor(tile)
}

/// The dora indicated by an indicator tile: the successor within the suit
/// (9 wraps to 1), east->south->west->north->east for the winds and
/// white->green->red->white for the dragons.
pub const fn indicated_dora(indicator: u8) -> u8 {
    let t = to_normal(indicator);
    match t {
        0..=26 => t / 9 * 9 + (t % 9 + 1) % 9,
        EAST..=NORTH => EAST + (t - EAST + 1) % 4,
        _ => WHITE + (t - WHITE + 1) % 3,
    }
}

/// mpsz-notation name, red fives written with a zero digit.
pub fn name(tile: u8) -> &'static str {
    const NAMES: [&str; NUM_TILE_IDS] = [
        "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", "1p", "2p", "3p", "4p",
        "5p", "6p", "7p", "8p", "9p", "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s",
        "9s", "1z", "2z", "3z", "4z", "5z", "6z", "7z", "0m", "0p", "0s",
    ];
    NAMES[tile as usize]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dora_successors() {
        assert_eq!(indicated_dora(MANZU1), MANZU1 + 1);
        assert_eq!(indicated_dora(MANZU9), MANZU1);
        assert_eq!(indicated_dora(PINZU9), PINZU1);
        assert_eq!(indicated_dora(NORTH), EAST);
        assert_eq!(indicated_dora(WEST), NORTH);
        assert_eq!(indicated_dora(RED), WHITE);
        assert_eq!(indicated_dora(WHITE), GREEN);
        assert_eq!(indicated_dora(RED_MANZU5), MANZU5 + 1);
    }

    #[test]
    fn classification() {
        assert!(is_terminal(MANZU1));
        assert!(is_terminal(SOUZU9));
        assert!(!is_terminal(MANZU5));
        assert!(!is_terminal(EAST));
        assert!(is_honor(RED));
        assert!(is_terminal_or_honor(NORTH));
        assert_eq!(to_normal(RED_SOUZU5), SOUZU5);
        assert_eq!(name(RED_PINZU5), "0p");
        assert_eq!(name(RED), "7z");
    }
}
