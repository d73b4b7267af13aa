//! Federal-holiday calendar used by the faculty half-day fill step
//! (§4.1 step 6). Grounded in the teacher's `ResourceCalendar` pattern
//! (availability rules over a date range) but simplified to pure
//! calendar arithmetic — the pipeline needs only "is this date a federal
//! holiday", not working-hour windows or timezone-aware availability.

use chrono::{Datelike, NaiveDate, Weekday};

/// The nth occurrence (1-indexed) of `weekday` in `year`/`month`.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid calendar month");
    let offset = (7 + weekday.num_days_from_sunday() - first.weekday().num_days_from_sunday()) % 7;
    first + chrono::Duration::days((offset + 7 * (n - 1)) as i64)
}

/// The last occurrence of `weekday` in `year`/`month`.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid calendar month");
    let last_day = next_month_first - chrono::Duration::days(1);
    let back = (7 + last_day.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
    last_day - chrono::Duration::days(back as i64)
}

/// US federal holidays observed in `year`, per the fixed-date and
/// nth-weekday rules (5 U.S.C. § 6103). Dates falling on a Saturday are
/// observed the preceding Friday; dates falling on a Sunday are observed
/// the following Monday, per the standard federal observance shift.
pub fn federal_holidays(year: i32) -> Vec<NaiveDate> {
    let raw = vec![
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),  // New Year's Day
        nth_weekday(year, 1, Weekday::Mon, 3),         // MLK Day
        nth_weekday(year, 2, Weekday::Mon, 3),         // Washington's Birthday
        last_weekday(year, 5, Weekday::Mon),           // Memorial Day
        NaiveDate::from_ymd_opt(year, 6, 19).unwrap(), // Juneteenth
        NaiveDate::from_ymd_opt(year, 7, 4).unwrap(),  // Independence Day
        nth_weekday(year, 9, Weekday::Mon, 1),         // Labor Day
        nth_weekday(year, 10, Weekday::Mon, 2),        // Columbus Day
        NaiveDate::from_ymd_opt(year, 11, 11).unwrap(), // Veterans Day
        nth_weekday(year, 11, Weekday::Thu, 4),        // Thanksgiving
        NaiveDate::from_ymd_opt(year, 12, 25).unwrap(), // Christmas Day
    ];
    raw.into_iter().map(observed).collect()
}

fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - chrono::Duration::days(1),
        Weekday::Sun => date + chrono::Duration::days(1),
        _ => date,
    }
}

/// Whether `date` is a federal-holiday block date (using the *observed*
/// date, per federal practice). The faculty half-day fill step checks
/// the weekend placeholder before the holiday placeholder (§4.1 step 6),
/// so a holiday whose observed date lands on a weekend is never reached
/// by this check in practice — see `DESIGN.md` for the Open Question
/// this resolves.
pub fn is_federal_holiday(date: NaiveDate) -> bool {
    federal_holidays(date.year()).contains(&date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independence_day_is_holiday() {
        let d = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        assert!(is_federal_holiday(d));
    }

    #[test]
    fn thanksgiving_is_fourth_thursday() {
        let d = NaiveDate::from_ymd_opt(2026, 11, 26).unwrap();
        assert_eq!(d.weekday(), Weekday::Thu);
        assert!(is_federal_holiday(d));
    }

    #[test]
    fn ordinary_day_is_not_holiday() {
        assert!(!is_federal_holiday(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
    }
}
