//! Expected-score search over the draw/discard graph.
//!
//! States alternate between 13-tile nodes (about to draw) and 14-tile
//! nodes (about to discard). Every edge points from a 13-tile node to a
//! 14-tile node and doubles as the draw and the discard transition for
//! the tile the two states differ by; its weight is the wall count of
//! that tile. Values propagate backward per turn: a 13-tile node folds
//! its draw edges into the next turn's values, a 14-tile node takes the
//! best of its parents at the same turn, which models the discard choice.

use ahash::AHashMap;
use anyhow::{Result, ensure};
use serde::Serialize;

use crate::algo::{necessary, score, shanten, unnecessary, uradora};
use crate::hand::TileCounts;
use crate::tile;
use crate::types::{Player, Round, shanten_flag, win_flag};

#[derive(Debug, Clone)]
pub struct Config {
    /// First turn the statistics are computed for.
    pub t_min: usize,
    /// Last turn; vectors have `t_max + 1` entries.
    pub t_max: usize,
    /// Draw denominator: the effective wall size, fixed per request.
    pub sum: i32,
    /// Additional exchanges allowed beyond the starting distance.
    pub extra: i32,
    /// Shape grammars considered.
    pub mode: u8,
    pub enable_reddora: bool,
    pub enable_uradora: bool,
    pub enable_shanten_down: bool,
    pub enable_tegawari: bool,
    pub enable_riichi: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            t_min: 0,
            t_max: 18,
            sum: 121,
            extra: 0,
            mode: shanten_flag::ALL,
            enable_reddora: true,
            enable_uradora: true,
            enable_shanten_down: true,
            enable_tegawari: true,
            enable_riichi: true,
        }
    }
}

/// Per-discard result: turn-indexed probabilities and expected score.
#[derive(Debug, Clone, Serialize)]
pub struct Stat {
    pub tile: u8,
    pub tenpai_prob: Vec<f64>,
    pub win_prob: Vec<f64>,
    pub exp_value: Vec<f64>,
    /// Tiles that advance the remaining hand, with their wall counts.
    pub necessary_tiles: Vec<(u8, u8)>,
    pub shanten: i8,
}

/// Four copies of everything minus the dora indicators, the hand and the
/// melds. Entries can go negative on over-subscribed input; the caller
/// validates.
pub fn create_wall(round: &Round, player: &Player, use_red: bool) -> [i8; 37] {
    let mut wall = [0i8; 37];
    for w in wall.iter_mut().take(34) {
        *w = 4;
    }
    if use_red {
        wall[tile::RED_MANZU5 as usize] = 1;
        wall[tile::RED_PINZU5 as usize] = 1;
        wall[tile::RED_SOUZU5 as usize] = 1;
    }

    for &indicator in &round.dora_indicators {
        let t = if use_red { indicator } else { tile::to_normal(indicator) };
        if tile::is_red(t) {
            wall[t as usize] -= 1;
        }
        wall[tile::to_normal(t) as usize] -= 1;
    }

    for i in 0..34 {
        wall[i] -= player.hand[i] as i8;
    }
    if use_red {
        for red in tile::RED_MANZU5..=tile::RED_SOUZU5 {
            wall[red as usize] -= player.hand[red as usize] as i8;
        }
    }

    for meld in &player.melds {
        for &meld_tile in &meld.tiles {
            let t = if use_red { meld_tile } else { tile::to_normal(meld_tile) };
            if tile::is_red(t) {
                wall[t as usize] -= 1;
            }
            wall[tile::to_normal(t) as usize] -= 1;
        }
    }

    wall
}

/// Split the red fives out of the normal-five counts so each of the 37
/// indices is drawable and discardable independently.
fn split(counts: &TileCounts) -> [u8; 37] {
    let mut out = *counts;
    for (red, normal) in [(34, 4), (35, 13), (36, 22)] {
        out[normal] -= counts[red];
    }
    out
}

/// 128-bit state key: four base-8 digit groups plus the red-five bits.
fn hand_key(hand: &[u8; 37]) -> u128 {
    let pack = |r: &[u8]| -> u128 { r.iter().fold(0, |h, &c| h << 3 | c as u128) };
    pack(&hand[0..9])
        | pack(&hand[9..18]) << 27
        | pack(&hand[18..27]) << 54
        | pack(&hand[27..34]) << 81
        | (hand[34] as u128) << 102
        | (hand[35] as u128) << 103
        | (hand[36] as u128) << 104
}

struct VertexData {
    tenpai: Vec<f64>,
    win: Vec<f64>,
    exp: Vec<f64>,
}

struct Edge {
    target: u32,
    weight: f64,
    score: f64,
}

struct Engine<'a> {
    config: &'a Config,
    round: &'a Round,
    player: Player,
    num_melds: usize,
    hand: [u8; 37],
    wall: [u8; 37],
    origin: [u8; 37],
    shanten_org: i32,
    vertices: Vec<VertexData>,
    out_edges: Vec<Vec<Edge>>,
    in_edges: Vec<Vec<u32>>,
    cache_13: AHashMap<u128, u32>,
    cache_14: AHashMap<u128, u32>,
}

/// Run the search. `wall` is the validated 37-entry wall; the hand must
/// hold fourteen tiles counting melds as three each.
pub fn calc(
    config: &Config,
    round: &Round,
    player: &Player,
    wall: &TileCounts,
) -> Result<(Vec<Stat>, usize)> {
    let num_melds = player.melds.len();
    ensure!(
        player.num_tiles() + 3 * num_melds == 14,
        "expected a fourteen-tile hand, got {} tiles and {} melds",
        player.num_tiles(),
        num_melds,
    );
    ensure!(config.t_max >= 1 && config.t_min < config.t_max, "empty turn window");
    ensure!(config.sum > 0, "wall denominator must be positive");

    let (_, shanten_org) = shanten::calc(&player.hand, num_melds, config.mode);
    ensure!(shanten_org != -1, "can't analyze an already winning hand");

    let mut engine = Engine {
        config,
        round,
        player: player.clone(),
        num_melds,
        hand: split(&player.hand),
        wall: split(wall),
        origin: split(&player.hand),
        shanten_org: shanten_org as i32,
        vertices: Vec::new(),
        out_edges: Vec::new(),
        in_edges: Vec::new(),
        cache_13: AHashMap::new(),
        cache_14: AHashMap::new(),
    };

    engine.select_14();
    engine.calc_values();

    let mut stats = Vec::new();
    for t in 0..tile::NUM_TILE_IDS {
        if engine.hand[t] == 0 {
            continue;
        }
        engine.discard(t);
        if let Some(&vertex) = engine.cache_13.get(&hand_key(&engine.hand)) {
            let data = &engine.vertices[vertex as usize];
            let (_, shanten, tiles) =
                necessary::select(&engine.player.hand, num_melds, config.mode);
            let necessary_tiles =
                tiles.into_iter().map(|nt| (nt, wall[nt as usize])).collect();
            stats.push(Stat {
                tile: t as u8,
                tenpai_prob: data.tenpai.clone(),
                win_prob: data.win.clone(),
                exp_value: data.exp.clone(),
                necessary_tiles,
                shanten,
            });
        }
        engine.undo_discard(t);
    }

    let searched = engine.vertices.len();
    log::debug!("expected-score search finished (vertices: {searched})");
    Ok((stats, searched))
}

impl Engine<'_> {
    fn add_vertex(&mut self, data: VertexData) -> u32 {
        let id = self.vertices.len() as u32;
        self.vertices.push(data);
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        id
    }

    fn zeroed(&self) -> VertexData {
        let n = self.config.t_max + 1;
        VertexData {
            tenpai: vec![0.0; n],
            win: vec![0.0; n],
            exp: vec![0.0; n],
        }
    }

    /// Tiles drawn relative to the starting hand.
    fn drawn_distance(&self) -> i32 {
        self.hand
            .iter()
            .zip(&self.origin)
            .map(|(&h, &o)| h.saturating_sub(o) as i32)
            .sum()
    }

    fn draw(&mut self, t: usize) {
        self.hand[t] += 1;
        self.wall[t] -= 1;
        self.player.hand[tile::to_normal(t as u8) as usize] += 1;
        if t >= 34 {
            self.player.hand[t] += 1;
        }
    }

    fn undo_draw(&mut self, t: usize) {
        self.hand[t] -= 1;
        self.wall[t] += 1;
        self.player.hand[tile::to_normal(t as u8) as usize] -= 1;
        if t >= 34 {
            self.player.hand[t] -= 1;
        }
    }

    fn discard(&mut self, t: usize) {
        self.hand[t] -= 1;
        self.wall[t] += 1;
        self.player.hand[tile::to_normal(t as u8) as usize] -= 1;
        if t >= 34 {
            self.player.hand[t] -= 1;
        }
    }

    fn undo_discard(&mut self, t: usize) {
        self.hand[t] += 1;
        self.wall[t] -= 1;
        self.player.hand[tile::to_normal(t as u8) as usize] += 1;
        if t >= 34 {
            self.player.hand[t] += 1;
        }
    }

    fn select_13(&mut self) -> u32 {
        let key = hand_key(&self.hand);
        if let Some(&vertex) = self.cache_13.get(&key) {
            return vertex;
        }

        let (shanten_flags, shanten, wait) =
            necessary::calc(&self.player.hand, self.num_melds, self.config.mode);
        let allow_tegawari = self.config.enable_tegawari
            && self.drawn_distance() + (shanten as i32) < self.shanten_org + self.config.extra;

        let mut data = self.zeroed();
        if shanten == 0 {
            data.tenpai.fill(1.0);
        }
        let vertex = self.add_vertex(data);
        self.cache_13.insert(key, vertex);

        for t in 0..tile::NUM_TILE_IDS {
            let is_wait = wait >> tile::to_normal(t as u8) & 1 == 1;
            if self.wall[t] == 0 || !(allow_tegawari || is_wait) {
                continue;
            }
            let weight = self.wall[t] as f64;
            self.draw(t);
            let target = self.select_14();
            if !self.out_edges[vertex as usize].iter().any(|e| e.target == target) {
                let score = if shanten == 0 && is_wait {
                    self.win_score(t, shanten_flags)
                } else {
                    0.0
                };
                self.out_edges[vertex as usize].push(Edge { target, weight, score });
                self.in_edges[target as usize].push(vertex);
            }
            self.undo_draw(t);
        }

        vertex
    }

    fn select_14(&mut self) -> u32 {
        let key = hand_key(&self.hand);
        if let Some(&vertex) = self.cache_14.get(&key) {
            return vertex;
        }

        let (shanten_flags, shanten, disc) =
            unnecessary::calc(&self.player.hand, self.num_melds, self.config.mode);
        let allow_shanten_down = self.config.enable_shanten_down
            && self.drawn_distance() + (shanten as i32) < self.shanten_org + self.config.extra;

        let mut data = self.zeroed();
        if shanten <= 0 {
            data.tenpai.fill(1.0);
        }
        if shanten == -1 {
            data.win.fill(1.0);
        }
        let vertex = self.add_vertex(data);
        self.cache_14.insert(key, vertex);

        for t in 0..tile::NUM_TILE_IDS {
            let is_disc = disc >> tile::to_normal(t as u8) & 1 == 1;
            if self.hand[t] == 0 || !(allow_shanten_down || is_disc) {
                continue;
            }
            self.discard(t);
            let weight = self.wall[t] as f64;
            let source = self.select_13();
            self.undo_discard(t);
            if !self.out_edges[source as usize].iter().any(|e| e.target == vertex) {
                let score = if shanten == -1 {
                    self.win_score(t, shanten_flags)
                } else {
                    0.0
                };
                self.out_edges[source as usize].push(Edge { target: vertex, weight, score });
                self.in_edges[vertex as usize].push(source);
            }
        }

        vertex
    }

    /// Payout of winning on `t` by self-draw, riichi presumed when enabled
    /// and the hand is closed, uradora integrated over its distribution.
    fn win_score(&self, t: usize, shanten_flags: u8) -> f64 {
        let mut flags = win_flag::TSUMO;
        if self.config.enable_riichi && self.player.is_closed() {
            flags |= win_flag::RIICHI;
        }
        match score::calc_fast(self.round, &self.player, t as u8, flags, shanten_flags) {
            Ok(result) => {
                if self.config.enable_uradora
                    && flags & win_flag::RIICHI != 0
                    && !self.round.dora_indicators.is_empty()
                {
                    let ladder = score::scores_for_exp(&result, self.round, self.player.wind);
                    let k = self.round.dora_indicators.len().min(5);
                    uradora::PROB[k]
                        .iter()
                        .enumerate()
                        .map(|(n, &p)| p * ladder[n.min(ladder.len() - 1)] as f64)
                        .sum()
                } else {
                    result.score[0] as f64
                }
            }
            Err(err) => {
                log::debug!("winning edge scored as zero: {err:#}");
                0.0
            }
        }
    }

    fn calc_values(&mut self) {
        let thirteen: Vec<u32> = self.cache_13.values().copied().collect();
        let fourteen: Vec<u32> = self.cache_14.values().copied().collect();
        let sum = self.config.sum as f64;

        for t in (self.config.t_min..self.config.t_max).rev() {
            for &v in &thirteen {
                let v = v as usize;
                let own = &self.vertices[v];
                let (own_tenpai, own_win, own_exp) =
                    (own.tenpai[t + 1], own.win[t + 1], own.exp[t + 1]);
                let mut acc = (0.0, 0.0, 0.0);
                for e in &self.out_edges[v] {
                    let child = &self.vertices[e.target as usize];
                    acc.0 += e.weight * (child.tenpai[t + 1] - own_tenpai);
                    acc.1 += e.weight * (child.win[t + 1] - own_win);
                    acc.2 += e.weight * (e.score.max(child.exp[t + 1]) - own_exp);
                }
                let own = &mut self.vertices[v];
                own.tenpai[t] = own_tenpai + acc.0 / sum;
                own.win[t] = own_win + acc.1 / sum;
                own.exp[t] = own_exp + acc.2 / sum;
            }

            for &v in &fourteen {
                let v = v as usize;
                let own = &self.vertices[v];
                let mut best = (own.tenpai[t], own.win[t], own.exp[t]);
                for &src in &self.in_edges[v] {
                    let parent = &self.vertices[src as usize];
                    best.0 = best.0.max(parent.tenpai[t]);
                    best.1 = best.1.max(parent.win[t]);
                    best.2 = best.2.max(parent.exp[t]);
                }
                let own = &mut self.vertices[v];
                own.tenpai[t] = best.0;
                own.win[t] = best.1;
                own.exp[t] = best.2;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::hand;
    use crate::types::{Meld, MeldKind};

    fn wall_for(round: &Round, player: &Player) -> TileCounts {
        let raw = create_wall(round, player, true);
        let mut wall = [0u8; 37];
        for (w, &r) in wall.iter_mut().zip(&raw) {
            assert!(r >= 0);
            *w = r as u8;
        }
        wall
    }

    fn analysis_config(wall: &TileCounts) -> Config {
        Config {
            t_min: 1,
            t_max: 17,
            sum: wall[..34].iter().map(|&c| c as i32).sum(),
            extra: 1,
            ..Config::default()
        }
    }

    #[test]
    fn wall_subtracts_everything_visible() {
        let mut round = Round::default();
        round.dora_indicators = vec![tile::MANZU1];
        let h = hand("22234m055p").unwrap();
        let melds = vec![Meld::new(MeldKind::Pong, &[tile::EAST; 3])];
        let player = Player::new(h, melds, tile::SOUTH);
        let wall = create_wall(&round, &player, true);
        assert_eq!(wall[0], 3); // one went to the dora indicator
        assert_eq!(wall[1], 1); // three in hand
        assert_eq!(wall[13], 1); // three 5p in hand, one of them red
        assert_eq!(wall[tile::RED_PINZU5 as usize], 0);
        assert_eq!(wall[tile::RED_SOUZU5 as usize], 1);
        assert_eq!(wall[22], 4); // untouched
        assert_eq!(wall[tile::EAST as usize], 1); // pong
    }

    #[test]
    fn one_shanten_statistics() {
        let player = Player::new(hand("222567m34p33667s1z").unwrap(), Vec::new(), tile::EAST);
        let round = Round::default();
        let wall = wall_for(&round, &player);
        let config = analysis_config(&wall);

        let (stats, searched) = calc(&config, &round, &player, &wall).unwrap();
        assert!(searched > 0);

        let east = stats.iter().find(|s| s.tile == tile::EAST).expect("east discard");
        assert_eq!(east.shanten, 1);
        let tiles: Vec<u8> = east.necessary_tiles.iter().map(|&(t, _)| t).collect();
        assert!(tiles.contains(&10), "2p should be necessary, got {tiles:?}");
        assert!(tiles.contains(&13), "5p should be necessary, got {tiles:?}");

        // Expected value is positive right away and probabilities behave.
        assert!(east.exp_value[1] > 0.0);
        for t in config.t_min..=config.t_max {
            assert!((0.0..=1.0 + 1e-3).contains(&east.tenpai_prob[t]));
            assert!((0.0..=1.0 + 1e-3).contains(&east.win_prob[t]));
        }
        for t in config.t_min..config.t_max {
            assert!(east.win_prob[t] >= east.win_prob[t + 1] - 1e-12);
            assert!(east.tenpai_prob[t] >= east.tenpai_prob[t + 1] - 1e-12);
        }
    }

    #[test]
    fn disabling_exploration_shrinks_the_graph() {
        let player = Player::new(hand("222567m34p33667s1z").unwrap(), Vec::new(), tile::EAST);
        let round = Round::default();
        let wall = wall_for(&round, &player);
        let full = analysis_config(&wall);
        let lean = Config {
            enable_shanten_down: false,
            enable_tegawari: false,
            extra: 0,
            ..full.clone()
        };

        let (_, searched_full) = calc(&full, &round, &player, &wall).unwrap();
        let (_, searched_lean) = calc(&lean, &round, &player, &wall).unwrap();
        assert!(searched_lean < searched_full, "{searched_lean} < {searched_full}");
    }

    #[test]
    fn tenpai_hand_wins_sometimes() {
        let player = Player::new(hand("123456789m123p14s").unwrap(), Vec::new(), tile::SOUTH);
        let round = Round::default();
        let wall = wall_for(&round, &player);
        let config = analysis_config(&wall);

        let (stats, _) = calc(&config, &round, &player, &wall).unwrap();
        let best = stats.iter().find(|s| s.tile == 18).expect("1s discard");
        assert_eq!(best.shanten, 0);
        assert!(best.tenpai_prob[1] > 0.999);
        assert!(best.win_prob[1] > 0.0);
        assert!(best.exp_value[1] > 0.0);
    }

    #[test]
    fn rejects_invalid_input() {
        let round = Round::default();
        let winning = Player::new(hand("123456789m123p11s").unwrap(), Vec::new(), tile::SOUTH);
        let wall = wall_for(&round, &winning);
        assert!(calc(&Config::default(), &round, &winning, &wall).is_err());

        let short = Player::new(hand("123m").unwrap(), Vec::new(), tile::SOUTH);
        assert!(calc(&Config::default(), &round, &short, &wall).is_err());
    }
}
