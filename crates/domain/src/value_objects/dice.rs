//! Dice and skill-check resolution.
//!
//! Pure functions only: the caller supplies the rolled dice (from a random
//! port in production, fixed values in tests) and gets a structured result.

use serde::{Deserialize, Serialize};

/// Standard target number for a 2d6 task check.
pub const STANDARD_TARGET: i32 = 8;

/// Outcome of a 2d6 + DM check against a target number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub dice: [i32; 2],
    pub modifier: i32,
    pub total: i32,
    pub target: i32,
    /// `total - target`; non-negative on success.
    pub effect: i32,
    pub success: bool,
}

/// Resolve a 2d6 check.
pub fn skill_check(dice: [i32; 2], modifier: i32, target: i32) -> CheckResult {
    let total = dice[0] + dice[1] + modifier;
    let effect = total - target;
    CheckResult {
        dice,
        modifier,
        total,
        target,
        effect,
        success: effect >= 0,
    }
}

/// Sum of rolled damage dice plus a flat bonus, never negative.
pub fn damage_total(rolls: &[i32], bonus: i32) -> i32 {
    (rolls.iter().sum::<i32>() + bonus).max(0)
}
