//! Tie-break weights.
//!
//! `tb_desk` weights each point by the desk it was scored on, so a point on
//! desk 1 is worth `1 + scale` and a point on the last desk is worth 1.
//! `tb_black` multiplies points scored with black by `1 + black_bonus`.

use crate::tournament::{BoardResult, Color, Player};

/// Largest desk number seen on any roster or board, at least 1
pub fn max_desk(players: &[Player], board_results: &[BoardResult]) -> u32 {
    players
        .iter()
        .map(|p| p.desk_number)
        .chain(board_results.iter().map(|b| b.desk_number))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Weight of a point scored on `desk`
pub fn desk_weight(desk: u32, max_desk: u32, scale: f64) -> f64 {
    if max_desk <= 1 {
        return 1.0;
    }
    let desk = desk.clamp(1, max_desk);
    1.0 + scale * f64::from(max_desk - desk) / f64::from(max_desk - 1)
}

/// Multiplier for a point scored with `color`
pub fn color_multiplier(color: Color, black_bonus: f64) -> f64 {
    match color {
        Color::Black => 1.0 + black_bonus,
        Color::White => 1.0,
    }
}

/// Tie-break value in integer thousandths
pub fn to_milli(value: f64) -> i64 {
    (value * 1000.0).round() as i64
}

/// Tie-break value rounded to 3 decimals
pub fn round3(value: f64) -> f64 {
    to_milli(value) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desk_weight_endpoints() {
        assert_eq!(desk_weight(1, 4, 0.5), 1.5);
        assert_eq!(desk_weight(4, 4, 0.5), 1.0);
        assert_eq!(to_milli(desk_weight(2, 4, 0.5)), 1333);
        assert_eq!(desk_weight(1, 1, 0.5), 1.0);
    }

    #[test]
    fn test_color_multiplier() {
        assert_eq!(to_milli(color_multiplier(Color::Black, 0.10)), 1100);
        assert_eq!(color_multiplier(Color::White, 0.10), 1.0);
    }

    #[test]
    fn test_max_desk_defaults_to_one() {
        assert_eq!(max_desk(&[], &[]), 1);
        let players = vec![Player::new("p", "P", "t", 6)];
        assert_eq!(max_desk(&players, &[]), 6);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(to_milli(0.1 + 0.2), 300);
    }
}
