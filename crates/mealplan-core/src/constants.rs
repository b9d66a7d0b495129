// ABOUTME: Planning constants shared across crates: week layout and nutrition conversions
// ABOUTME: Day ordering, energy density of macronutrients, and output rounding precision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Planning constants

use chrono::Weekday;

/// Number of days in a planning horizon
pub const DAYS_PER_WEEK: usize = 7;

/// Days of the plan in output order
pub const WEEK_DAYS: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English day name used in plan output
#[must_use]
pub const fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Energy density constants (kcal per gram)
pub mod energy {
    /// Protein kcal per gram
    pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
    /// Carbohydrate kcal per gram
    pub const CARBS_KCAL_PER_G: f64 = 4.0;
    /// Fat kcal per gram
    pub const FAT_KCAL_PER_G: f64 = 9.0;
}

/// Decimal places kept for totals in plan output
pub const OUTPUT_DECIMALS: i32 = 2;

/// Maximum number of snack names shown in an aggregated snack entry
pub const MAX_SNACK_NAMES: usize = 3;

/// Supported range for meals per day
pub const MEALS_PER_DAY_RANGE: (u8, u8) = (1, 8);

/// Round a value to [`OUTPUT_DECIMALS`] places
#[must_use]
pub fn round_output(value: f64) -> f64 {
    let factor = 10_f64.powi(OUTPUT_DECIMALS);
    (value * factor).round() / factor
}
