// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Sensor simulator - synthetic readings with daily activity patterns

use rand::prelude::*;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use super::{SensorKind, SensorProfile, LocationCategory};
use crate::core::SimTime;

/// Value override while a fix is running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixOverride {
    pub target: f64,
    /// Ticks left including the one being generated
    pub remaining_ticks: u32,
}

/// Random surge/leak injection rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InjectionRates {
    pub power_surge: f64,
    pub water_leak: f64,
}

impl Default for InjectionRates {
    fn default() -> Self {
        Self {
            power_surge: 0.02,
            water_leak: 0.01,
        }
    }
}

impl InjectionRates {
    pub fn none() -> Self {
        Self { power_surge: 0.0, water_leak: 0.0 }
    }
}

/// Generates the next reading for a sensor. Stateless: everything it needs
/// arrives as arguments, the noise source included.
#[derive(Debug, Clone, Default)]
pub struct SensorSimulator {
    rates: InjectionRates,
}

impl SensorSimulator {
    pub fn new(rates: InjectionRates) -> Self {
        Self { rates }
    }

    pub fn next_value<R: Rng + ?Sized>(
        &self,
        profile: &SensorProfile,
        time: SimTime,
        fix: Option<FixOverride>,
        previous: f64,
        rng: &mut R,
    ) -> f64 {
        if let Some(fix) = fix {
            return self.converge(profile, fix, previous);
        }

        let activity = activity_multiplier(time.hour, rng);

        let value = match profile.kind {
            SensorKind::PowerDraw => self.generate_power(profile, time, activity, rng),
            SensorKind::FlowRate => self.generate_flow(profile, time, activity, rng),
            SensorKind::FillLevel => self.generate_fill(previous, activity, rng),
        };

        profile.clamp(value)
    }

    /// Value the fix drives the sensor to, fixed when the fix starts
    pub fn fix_target(&self, profile: &SensorProfile, value_at_trigger: f64) -> f64 {
        let target = match profile.kind {
            SensorKind::PowerDraw => profile.normal_range.0 * 0.5,
            SensorKind::FlowRate => 0.0,
            SensorKind::FillLevel => value_at_trigger * 0.6,
        };
        profile.clamp(target)
    }

    fn converge(&self, profile: &SensorProfile, fix: FixOverride, previous: f64) -> f64 {
        let remaining = fix.remaining_ticks.max(1) as f64;
        profile.clamp(previous + (fix.target - previous) / remaining)
    }

    fn generate_power<R: Rng + ?Sized>(&self, profile: &SensorProfile, time: SimTime, activity: f64, rng: &mut R) -> f64 {
        let (min, max) = profile.normal_range;
        let mut base = min + (max - min) * activity;
        if time.is_weekend() {
            base *= 0.8;
        }

        let mut value = base * (1.0 + rng.sample(Uniform::new_inclusive(-0.15, 0.15)));

        // Occasional surge (AC or lights left on)
        if rng.gen::<f64>() < self.rates.power_surge {
            value = profile.threshold * rng.sample(Uniform::new_inclusive(1.1, 1.5));
        }

        value
    }

    fn generate_flow<R: Rng + ?Sized>(&self, profile: &SensorProfile, time: SimTime, activity: f64, rng: &mut R) -> f64 {
        let (min, max) = profile.normal_range;
        let mut base = min + (max - min) * activity;

        if profile.category == LocationCategory::Dining && is_meal_hour(time.hour) {
            base *= 1.2;
        }

        let mut value = base * (1.0 + rng.sample(Uniform::new_inclusive(-0.2, 0.2)));

        // Occasional leak
        if rng.gen::<f64>() < self.rates.water_leak {
            value = profile.threshold * rng.sample(Uniform::new_inclusive(1.2, 2.0));
        }

        value
    }

    fn generate_fill<R: Rng + ?Sized>(&self, previous: f64, activity: f64, rng: &mut R) -> f64 {
        let increment = activity * rng.sample(Uniform::new_inclusive(0.5, 2.0));
        (previous + increment).min(100.0)
    }
}

/// Campus activity: quiet at night, busy through the working day
pub fn activity_multiplier<R: Rng + ?Sized>(hour: u8, rng: &mut R) -> f64 {
    let (lo, hi) = activity_band(hour);
    rng.sample(Uniform::new_inclusive(lo, hi))
}

pub fn activity_band(hour: u8) -> (f64, f64) {
    match hour {
        23 | 0..=5 => (0.2, 0.4),
        6..=8 | 18..=22 => (0.6, 0.8),
        _ => (0.8, 1.0),
    }
}

fn is_meal_hour(hour: u8) -> bool {
    (12..=14).contains(&hour) || (18..=20).contains(&hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_same_seed_same_readings() {
        let sim = SensorSimulator::default();
        let profile = SensorProfile::new(LocationCategory::Laboratory, SensorKind::PowerDraw);
        let time = SimTime::new(1, 14, 0);

        let a: Vec<f64> = {
            let mut r = rng();
            (0..20).map(|_| sim.next_value(&profile, time, None, 500.0, &mut r)).collect()
        };
        let b: Vec<f64> = {
            let mut r = rng();
            (0..20).map(|_| sim.next_value(&profile, time, None, 500.0, &mut r)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_readings_stay_in_bounds() {
        let sim = SensorSimulator::new(InjectionRates { power_surge: 0.5, water_leak: 0.5 });
        let mut r = rng();
        for kind in SensorKind::ALL {
            let profile = SensorProfile::new(LocationCategory::Dining, kind);
            let mut prev = profile.initial_value();
            for tick in 0..500 {
                let time = SimTime::new(tick, (tick % 24) as u8, 0);
                prev = sim.next_value(&profile, time, None, prev, &mut r);
                assert!(prev >= profile.bounds.0 && prev <= profile.bounds.1, "{:?} out of bounds: {}", kind, prev);
            }
        }
    }

    #[test]
    fn test_night_draws_less_than_day() {
        let sim = SensorSimulator::new(InjectionRates::none());
        let profile = SensorProfile::new(LocationCategory::Instructional, SensorKind::PowerDraw);
        let mut r = rng();
        let night: f64 = (0..200).map(|_| sim.next_value(&profile, SimTime::new(0, 2, 0), None, 0.0, &mut r)).sum();
        let day: f64 = (0..200).map(|_| sim.next_value(&profile, SimTime::new(0, 13, 0), None, 0.0, &mut r)).sum();
        assert!(night < day);
    }

    #[test]
    fn test_fix_converges_to_target_on_last_tick() {
        let sim = SensorSimulator::default();
        let profile = SensorProfile::new(LocationCategory::Residential, SensorKind::FlowRate);
        let mut r = rng();
        let target = sim.fix_target(&profile, 30.0);
        assert_eq!(target, 0.0);

        let mut value = 30.0;
        for remaining in (1..=5).rev() {
            let next = sim.next_value(&profile, SimTime::new(0, 12, 0), Some(FixOverride { target, remaining_ticks: remaining }), value, &mut r);
            assert!(next <= value);
            value = next;
        }
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_fill_level_accumulates() {
        let sim = SensorSimulator::new(InjectionRates::none());
        let profile = SensorProfile::new(LocationCategory::Residential, SensorKind::FillLevel);
        let mut r = rng();
        let next = sim.next_value(&profile, SimTime::new(0, 10, 0), None, 40.0, &mut r);
        assert!(next > 40.0 && next <= 42.0);
        assert!((sim.fix_target(&profile, 90.0) - 54.0).abs() < 1e-9);
    }
}
