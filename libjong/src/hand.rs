//! Hand counts and the mpsz hand notation.

use anyhow::{Result, bail, ensure};

use crate::tile;

/// Count of each tile identifier. The red-five entries `34..37` mark how
/// many of the fives counted at the normal position are red, so the hand
/// total is the sum over `0..34` only.
pub type TileCounts = [u8; tile::NUM_TILE_IDS];

/// Number of tiles in the hand, melds excluded.
#[inline]
pub fn num_tiles(counts: &TileCounts) -> usize {
    counts[..tile::NUM_TILE_KINDS].iter().map(|&c| c as usize).sum()
}

/// Parse mpsz notation like `"222567m34p33667s1z"`. A `0` digit denotes the
/// red five of the pending suit.
pub fn hand(s: &str) -> Result<TileCounts> {
    let mut counts = [0; tile::NUM_TILE_IDS];
    let mut digits = Vec::with_capacity(14);
    for ch in s.chars() {
        match ch {
            '0'..='9' => digits.push(ch as u8 - b'0'),
            'm' | 'p' | 's' | 'z' => {
                let kind = match ch {
                    'm' => 0,
                    'p' => 1,
                    's' => 2,
                    _ => 3,
                };
                ensure!(!digits.is_empty(), "suit '{ch}' with no tiles in {s:?}");
                for &d in &digits {
                    let id = if d == 0 {
                        ensure!(kind < 3, "honors have no red five in {s:?}");
                        let red = tile::RED_MANZU5 + kind;
                        ensure!(counts[red as usize] == 0, "duplicate red five in {s:?}");
                        counts[red as usize] += 1;
                        kind * 9 + 4
                    } else {
                        ensure!(kind < 3 || d <= 7, "honor tile out of range in {s:?}");
                        kind * 9 + d - 1
                    };
                    counts[id as usize] += 1;
                    ensure!(counts[id as usize] <= 4, "more than four {} in {s:?}", tile::name(id));
                }
                digits.clear();
            }
            c if c.is_whitespace() => {}
            c => bail!("unexpected character {c:?} in hand {s:?}"),
        }
    }
    ensure!(digits.is_empty(), "trailing tiles without a suit in {s:?}");
    Ok(counts)
}

/// Format counts back to mpsz notation.
pub fn to_mpsz(counts: &TileCounts) -> String {
    let mut out = String::new();
    for (kind, letter) in ['m', 'p', 's', 'z'].into_iter().enumerate() {
        let base = kind * 9;
        let len = if kind == 3 { 7 } else { 9 };
        let mut any = false;
        for i in 0..len {
            let mut n = counts[base + i];
            if kind < 3 && i == 4 {
                let red = counts[tile::RED_MANZU5 as usize + kind];
                for _ in 0..red {
                    out.push('0');
                    any = true;
                }
                n -= red;
            }
            for _ in 0..n {
                out.push((b'1' + i as u8) as char);
                any = true;
            }
        }
        if any {
            out.push(letter);
        }
    }
    out
}
