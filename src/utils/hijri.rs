use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    match month {
        1..=12 => HIJRI_MONTH_NAMES[month - 1],
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriInfo {
    pub day: usize,
    pub month: usize,
    pub year: usize,
}

impl HijriInfo {
    pub fn month_name(&self) -> &'static str {
        hijri_month_name(self.month)
    }

    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// Hijri date for a Gregorian `date`, shifted by `offset_days` for local
/// moon sighting (e.g. -1 if the country is one day behind Saudi Arabia).
pub fn hijri_for(date: NaiveDate, offset_days: i32) -> Result<HijriInfo> {
    let adjusted = date
        .checked_add_signed(Duration::days(i64::from(offset_days)))
        .ok_or_else(|| anyhow!("Hijri offset {} out of range", offset_days))?;
    let hd = HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .map_err(|e| anyhow!("Hijri conversion error: {}", e))?;

    Ok(HijriInfo {
        day: hd.day(),
        month: hd.month(),
        year: hd.year(),
    })
}

/// Formatted Hijri date, or an empty string when the date is outside the
/// converter's range.
pub fn hijri_string(date: NaiveDate, offset_days: i32) -> String {
    hijri_for(date, offset_days)
        .map(|h| h.formatted())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_the_hijri_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let base = hijri_for(date, 0).unwrap();
        let next = hijri_for(date, 1).unwrap();
        assert_eq!(base.year, 1445);
        assert_ne!(base, next);
        assert!(!hijri_string(date, 0).is_empty());
    }
}
