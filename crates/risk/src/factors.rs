//! Display/feature risk rule: step functions per parameter.
//!
//! This is the rule shown to users for live parameter feedback. It is *not*
//! the rule that labels training data; that one lives in
//! `datagen::labeling` and uses different thresholds and an additive shape.
//! The two are kept separate on purpose and documented as such.
//!
//! Every factor is a step function over six bands. Values at or above a
//! breakpoint land in the higher bucket. Pressure is the only non-monotonic
//! factor: risk grows with deviation from the 950-1050 hPa band in either
//! direction.

use types::{RiskFactors, TestParameters};

/// Temperature bands (°C lower edge, risk), highest first.
const TEMPERATURE_BANDS: [(f64, f64); 5] = [
    (60.0, 0.95),
    (50.0, 0.8),
    (40.0, 0.6),
    (30.0, 0.4),
    (20.0, 0.2),
];
const TEMPERATURE_FLOOR: f64 = 0.1;

/// Humidity bands (% lower edge, risk), highest first.
const HUMIDITY_BANDS: [(f64, f64); 5] = [
    (90.0, 0.95),
    (85.0, 0.85),
    (80.0, 0.7),
    (70.0, 0.5),
    (60.0, 0.3),
];
const HUMIDITY_FLOOR: f64 = 0.1;

/// Vibration bands (g lower edge, risk), highest first.
const VIBRATION_BANDS: [(f64, f64); 5] = [
    (40.0, 0.9),
    (30.0, 0.8),
    (25.0, 0.5),
    (20.0, 0.4),
    (10.0, 0.2),
];
const VIBRATION_FLOOR: f64 = 0.1;

/// Pressure bands (low edge, high edge, risk), widest deviation first.
const PRESSURE_BANDS: [(f64, f64, f64); 3] = [
    (850.0, 1150.0, 0.8),
    (900.0, 1100.0, 0.5),
    (950.0, 1050.0, 0.2),
];
const PRESSURE_FLOOR: f64 = 0.05;

#[inline]
fn step(value: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(edge, _)| value >= *edge)
        .map_or(floor, |(_, risk)| *risk)
}

/// Temperature risk for a value in °C.
pub fn temperature_risk(temperature: f64) -> f64 {
    step(temperature, &TEMPERATURE_BANDS, TEMPERATURE_FLOOR)
}

/// Humidity risk for a value in %.
pub fn humidity_risk(humidity: f64) -> f64 {
    step(humidity, &HUMIDITY_BANDS, HUMIDITY_FLOOR)
}

/// Vibration risk for a value in g.
pub fn vibration_risk(vibration: f64) -> f64 {
    step(vibration, &VIBRATION_BANDS, VIBRATION_FLOOR)
}

/// Pressure risk for a value in hPa (U-shaped around 950-1050).
pub fn pressure_risk(pressure: f64) -> f64 {
    PRESSURE_BANDS
        .iter()
        .find(|(low, high, _)| pressure <= *low || pressure >= *high)
        .map_or(PRESSURE_FLOOR, |(_, _, risk)| *risk)
}

/// Score all four factors and their equal-weighted mean.
///
/// Pure and total: out-of-range inputs fall into the nearest bucket.
pub fn compute_risk_factors(
    temperature: f64,
    humidity: f64,
    vibration: f64,
    pressure: f64,
) -> RiskFactors {
    RiskFactors::from_components(
        temperature_risk(temperature),
        humidity_risk(humidity),
        vibration_risk(vibration),
        pressure_risk(pressure),
    )
}

/// [`compute_risk_factors`] for a parameter set.
pub fn risk_factors(params: &TestParameters) -> RiskFactors {
    compute_risk_factors(
        params.temperature,
        params.humidity,
        params.vibration,
        params.pressure,
    )
}
