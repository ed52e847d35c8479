//! Training-label rule.
//!
//! This additive rule decides PASS/FAIL for synthetic samples. It is a
//! different function from the display rule in `risk::factors`: thresholds
//! differ, contributions add up instead of averaging, extreme cold counts as
//! risk, and a bonus applies when several parameters are in a high-risk
//! zone at once. Models trained on these labels therefore learn this rule,
//! not the display one.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use types::TestParameters;

/// Bonus added when at least [`COMBINATION_MIN`] parameters are high-risk.
pub const COMBINATION_BONUS: f64 = 0.2;
/// Number of simultaneous high-risk parameters that triggers the bonus.
pub const COMBINATION_MIN: usize = 2;

fn temperature_contribution(t: f64) -> f64 {
    if t > 65.0 || t < -35.0 {
        0.5
    } else if t > 60.0 || t < -30.0 {
        0.4
    } else if t > 50.0 || t < -20.0 {
        0.3
    } else if t > 40.0 || t < -10.0 {
        0.2
    } else if t > 30.0 || t < 0.0 {
        0.1
    } else {
        0.0
    }
}

fn humidity_contribution(h: f64) -> f64 {
    if h > 95.0 {
        0.4
    } else if h > 90.0 {
        0.3
    } else if h > 80.0 {
        0.2
    } else if h < 15.0 {
        0.15
    } else {
        0.0
    }
}

fn vibration_contribution(v: f64) -> f64 {
    if v > 40.0 {
        0.5
    } else if v > 30.0 {
        0.4
    } else if v > 20.0 {
        0.3
    } else if v > 10.0 {
        0.2
    } else {
        0.0
    }
}

fn pressure_contribution(p: f64) -> f64 {
    if p < 850.0 || p > 1150.0 {
        0.3
    } else if p < 900.0 || p > 1100.0 {
        0.2
    } else if p < 950.0 || p > 1050.0 {
        0.1
    } else {
        0.0
    }
}

/// How many parameters sit in their high-risk zone.
pub fn high_risk_count(params: &TestParameters) -> usize {
    let t = params.temperature;
    let p = params.pressure;
    [
        t > 60.0 || t < -30.0,
        params.humidity > 90.0,
        params.vibration > 30.0,
        p < 900.0 || p > 1100.0,
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count()
}

/// Deterministic part of the label score, before noise and clamping.
///
/// May exceed 1.0 when several contributions stack.
pub fn base_label_score(params: &TestParameters) -> f64 {
    let mut score = temperature_contribution(params.temperature)
        + humidity_contribution(params.humidity)
        + vibration_contribution(params.vibration)
        + pressure_contribution(params.pressure);
    if high_risk_count(params) >= COMBINATION_MIN {
        score += COMBINATION_BONUS;
    }
    score
}

/// Full label score: base plus N(0, `noise_std`) noise, clamped to [0, 1].
pub fn label_score<R: Rng + ?Sized>(params: &TestParameters, noise_std: f64, rng: &mut R) -> f64 {
    let mut score = base_label_score(params);
    if noise_std > 0.0
        && let Ok(noise) = Normal::new(0.0, noise_std)
    {
        score += noise.sample(rng);
    }
    score.clamp(0.0, 1.0)
}
