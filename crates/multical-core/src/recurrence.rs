//! Weekly recurrence expansion.
//!
//! [`expand`] turns a template occurrence plus a [`WeekdaySet`] and a
//! [`RepeatBound`] into concrete `(start, end)` pairs. Occurrences come out
//! weekday-major: every repetition of the first weekday, then every
//! repetition of the second, and so on.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::error::{CalendarError, CalendarResult};
use crate::event::all_day_span;

/// Maps a single-letter weekday code (`M T W R F S U`) to a weekday.
pub fn weekday_from_code(code: char) -> CalendarResult<Weekday> {
    match code.to_ascii_uppercase() {
        'M' => Ok(Weekday::Mon),
        'T' => Ok(Weekday::Tue),
        'W' => Ok(Weekday::Wed),
        'R' => Ok(Weekday::Thu),
        'F' => Ok(Weekday::Fri),
        'S' => Ok(Weekday::Sat),
        'U' => Ok(Weekday::Sun),
        other => Err(CalendarError::validation(format!(
            "invalid weekday code '{other}' (expected one of MTWRFSU)"
        ))),
    }
}

fn weekday_code(day: Weekday) -> char {
    match day {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'R',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'U',
    }
}

/// A non-empty set of weekdays, kept in ISO order (Monday first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdaySet {
    days: Vec<Weekday>,
}

impl WeekdaySet {
    /// Parses a code string such as `"MWF"`.
    pub fn parse(codes: &str) -> CalendarResult<Self> {
        let days = codes
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(weekday_from_code)
            .collect::<CalendarResult<Vec<_>>>()?;
        Self::from_days(days)
    }

    /// Builds a set from weekdays, dropping repeats.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> CalendarResult<Self> {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|d| d.number_from_monday());
        days.dedup();
        if days.is_empty() {
            return Err(CalendarError::validation("weekday set must not be empty"));
        }
        Ok(Self { days })
    }

    /// Iterates the weekdays in ISO order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.days.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.days
            .iter()
            .try_for_each(|d| write!(f, "{}", weekday_code(*d)))
    }
}

/// How far a series repeats for each weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatBound {
    /// Exactly this many occurrences per weekday.
    Times(u32),
    /// Occurrences whose start date is on or before this date.
    Until(NaiveDate),
}

/// Expands a weekly series into concrete `(start, end)` pairs.
///
/// `end` of `None` makes every occurrence all-day. The template must start
/// and end on the same date.
pub fn expand(
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    weekdays: &WeekdaySet,
    bound: RepeatBound,
) -> CalendarResult<Vec<(NaiveDateTime, NaiveDateTime)>> {
    let (start, end) = match end {
        Some(end) => (start, end),
        None => all_day_span(start.date()),
    };
    if end <= start {
        return Err(CalendarError::validation(format!(
            "series template must end after it starts ({start} >= {end})"
        )));
    }
    if start.date() != end.date() {
        return Err(CalendarError::validation(
            "recurring events cannot span multiple days",
        ));
    }
    if bound == RepeatBound::Times(0) {
        return Err(CalendarError::validation(
            "repeat count must be at least one",
        ));
    }

    let start_iso = i64::from(start.weekday().number_from_monday());
    let mut occurrences = Vec::new();
    for day in weekdays.iter() {
        let offset = (i64::from(day.number_from_monday()) - start_iso + 7) % 7;
        let mut next = (start + Duration::days(offset), end + Duration::days(offset));
        let mut emitted = 0u32;
        loop {
            let keep = match bound {
                RepeatBound::Times(times) => emitted < times,
                RepeatBound::Until(until) => next.0.date() <= until,
            };
            if !keep {
                break;
            }
            occurrences.push(next);
            emitted += 1;
            next = (next.0 + Duration::weeks(1), next.1 + Duration::weeks(1));
        }
    }
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod weekday_set {
        use super::*;

        #[test]
        fn parse_orders_and_dedups() {
            let set = WeekdaySet::parse("FmWM").unwrap();
            assert_eq!(
                set.iter().collect::<Vec<_>>(),
                vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
            );
            assert_eq!(set.to_string(), "MWF");
            assert_eq!(set.len(), 3);
        }

        #[test]
        fn thursday_and_sunday_codes() {
            let set = WeekdaySet::parse("RU").unwrap();
            assert_eq!(
                set.iter().collect::<Vec<_>>(),
                vec![Weekday::Thu, Weekday::Sun]
            );
        }

        #[test]
        fn rejects_bad_codes_and_empty() {
            assert!(WeekdaySet::parse("MX").is_err());
            assert!(WeekdaySet::parse("").is_err());
        }
    }

    mod expand {
        use super::*;

        #[test]
        fn times_is_weekday_major() {
            let set = WeekdaySet::parse("MWF").unwrap();
            let got = expand(
                dt(2025, 6, 16, 9, 0),
                Some(dt(2025, 6, 16, 9, 30)),
                &set,
                RepeatBound::Times(2),
            )
            .unwrap();
            let starts: Vec<_> = got.iter().map(|(s, _)| *s).collect();
            assert_eq!(
                starts,
                vec![
                    dt(2025, 6, 16, 9, 0),
                    dt(2025, 6, 23, 9, 0),
                    dt(2025, 6, 18, 9, 0),
                    dt(2025, 6, 25, 9, 0),
                    dt(2025, 6, 20, 9, 0),
                    dt(2025, 6, 27, 9, 0),
                ]
            );
            assert!(got.iter().all(|(s, e)| *e - *s == Duration::minutes(30)));
        }

        #[test]
        fn offset_wraps_to_next_week() {
            // Template on a Wednesday; Monday is five days later.
            let set = WeekdaySet::parse("M").unwrap();
            let got = expand(
                dt(2025, 6, 18, 9, 0),
                Some(dt(2025, 6, 18, 10, 0)),
                &set,
                RepeatBound::Times(1),
            )
            .unwrap();
            assert_eq!(got, vec![(dt(2025, 6, 23, 9, 0), dt(2025, 6, 23, 10, 0))]);
        }

        #[test]
        fn until_is_inclusive() {
            let set = WeekdaySet::parse("M").unwrap();
            let got = expand(
                dt(2025, 6, 16, 9, 0),
                Some(dt(2025, 6, 16, 10, 0)),
                &set,
                RepeatBound::Until(date(2025, 6, 30)),
            )
            .unwrap();
            assert_eq!(got.len(), 3);
            assert_eq!(got[2].0, dt(2025, 6, 30, 9, 0));
        }

        #[test]
        fn until_before_first_occurrence_is_empty() {
            let set = WeekdaySet::parse("F").unwrap();
            let got = expand(
                dt(2025, 6, 16, 9, 0),
                Some(dt(2025, 6, 16, 10, 0)),
                &set,
                RepeatBound::Until(date(2025, 6, 19)),
            )
            .unwrap();
            assert!(got.is_empty());
        }

        #[test]
        fn all_day_template() {
            let set = WeekdaySet::parse("T").unwrap();
            let got = expand(dt(2025, 6, 16, 13, 0), None, &set, RepeatBound::Times(1)).unwrap();
            assert_eq!(got, vec![(dt(2025, 6, 17, 8, 0), dt(2025, 6, 17, 17, 0))]);
        }

        #[test]
        fn rejects_multi_day_template() {
            let set = WeekdaySet::parse("M").unwrap();
            let err = expand(
                dt(2025, 6, 16, 22, 0),
                Some(dt(2025, 6, 17, 2, 0)),
                &set,
                RepeatBound::Times(2),
            )
            .unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Validation);
        }

        #[test]
        fn rejects_zero_times_and_bad_order() {
            let set = WeekdaySet::parse("M").unwrap();
            assert!(
                expand(
                    dt(2025, 6, 16, 9, 0),
                    Some(dt(2025, 6, 16, 10, 0)),
                    &set,
                    RepeatBound::Times(0)
                )
                .is_err()
            );
            assert!(
                expand(
                    dt(2025, 6, 16, 9, 0),
                    Some(dt(2025, 6, 16, 8, 0)),
                    &set,
                    RepeatBound::Times(1)
                )
                .is_err()
            );
        }
    }
}
