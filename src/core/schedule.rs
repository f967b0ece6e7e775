/// Difficulty schedule: elapsed mission time to clarity and leak ceiling.

use chrono::{DateTime, Utc};

pub const FIRST_DAY: u32 = 1;
pub const LAST_DAY: u32 = 30;

/// One segment of the schedule. Clarity rises linearly from `min_clarity`
/// toward `max_clarity` across the band; the leak ceiling is flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub first_day: u32,
    pub last_day: u32,
    pub min_clarity: f64,
    pub max_clarity: f64,
    pub max_leak_risk: f64,
}

impl Band {
    pub fn len(&self) -> u32 {
        self.last_day - self.first_day + 1
    }

    pub fn contains(&self, day: u32) -> bool {
        (self.first_day..=self.last_day).contains(&day)
    }
}

pub const BANDS: [Band; 4] = [
    Band {
        first_day: 1,
        last_day: 7,
        min_clarity: 0.10,
        max_clarity: 0.25,
        max_leak_risk: 0.20,
    },
    Band {
        first_day: 8,
        last_day: 15,
        min_clarity: 0.25,
        max_clarity: 0.45,
        max_leak_risk: 0.30,
    },
    Band {
        first_day: 16,
        last_day: 23,
        min_clarity: 0.45,
        max_clarity: 0.70,
        max_leak_risk: 0.40,
    },
    Band {
        first_day: 24,
        last_day: 30,
        min_clarity: 0.70,
        max_clarity: 0.85,
        max_leak_risk: 0.45,
    },
];

/// The schedule values in force on one mission day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub day: u32,
    pub clarity: f64,
    pub max_leak_risk: f64,
}

impl Schedule {
    /// Schedule for the day `now` falls on, counted from `started_at`.
    pub fn at(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::for_day(day_index(started_at, now))
    }

    pub fn for_day(day: u32) -> Self {
        let day = day.clamp(FIRST_DAY, LAST_DAY);
        Self {
            day,
            clarity: clarity(day),
            max_leak_risk: max_leak_risk(day),
        }
    }
}

/// 1-based mission day, clamped to `[FIRST_DAY, LAST_DAY]`. A clock that
/// reads earlier than the start counts as day one.
pub fn day_index(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = now.signed_duration_since(started_at).num_days();
    let day = elapsed.saturating_add(1).clamp(FIRST_DAY as i64, LAST_DAY as i64);
    day as u32
}

fn band_for(day: u32) -> &'static Band {
    let day = day.clamp(FIRST_DAY, LAST_DAY);
    BANDS
        .iter()
        .find(|band| band.contains(day))
        .unwrap_or(&BANDS[BANDS.len() - 1])
}

/// `min + (max - min) * (day_in_band / band_len)`, with `day_in_band`
/// counted from 1.
pub fn clarity(day: u32) -> f64 {
    let day = day.clamp(FIRST_DAY, LAST_DAY);
    let band = band_for(day);
    let day_in_band = (day - band.first_day + 1) as f64;
    band.min_clarity + (band.max_clarity - band.min_clarity) * (day_in_band / band.len() as f64)
}

pub fn max_leak_risk(day: u32) -> f64 {
    band_for(day).max_leak_risk
}
