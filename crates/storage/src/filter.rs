//! Birth-year and age criteria compiled to `performers.birthdate` predicates.
//!
//! Each compiler returns clauses to be ANDed together plus their bound values,
//! in placeholder order. A modifier without a date-range meaning compiles to
//! nothing, leaving the query unfiltered.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionModifier {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    IsNull,
    NotNull,
    Includes,
    Excludes,
}

impl CriterionModifier {
    /// Parses a wire name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EQUALS" => Some(Self::Equals),
            "NOT_EQUALS" => Some(Self::NotEquals),
            "GREATER_THAN" => Some(Self::GreaterThan),
            "LESS_THAN" => Some(Self::LessThan),
            "IS_NULL" => Some(Self::IsNull),
            "NOT_NULL" => Some(Self::NotNull),
            "INCLUDES" => Some(Self::Includes),
            "EXCLUDES" => Some(Self::Excludes),
            _ => None,
        }
    }

    fn is_range(&self) -> bool {
        matches!(
            self,
            Self::Equals | Self::NotEquals | Self::GreaterThan | Self::LessThan
        )
    }
}

/// Integer criterion as submitted by a search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntCriterion {
    pub value: i32,
    pub modifier: CriterionModifier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeFilter {
    pub clauses: Vec<String>,
    pub args: Vec<NaiveDate>,
}

impl DateRangeFilter {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn push(&mut self, clause: &str, args: &[NaiveDate]) {
        self.clauses.push(clause.to_string());
        self.args.extend_from_slice(args);
    }
}

const MATCH_NONE: &str = "0 = 1";
const MATCH_ANY_DATE: &str = "performers.birthdate IS NOT NULL";

/// Side of the representable calendar a bound fell off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutOfRange {
    Past,
    Future,
}

/// Clause for a window that cannot be expressed as dates. Every stored
/// birthdate lies on the same side of it, so each modifier matches either
/// all dated performers or none.
///
/// `greater_is_later` is true when `GREATER_THAN` selects later birthdates.
fn unbounded(
    modifier: CriterionModifier,
    side: OutOfRange,
    greater_is_later: bool,
) -> DateRangeFilter {
    let mut filter = DateRangeFilter::default();
    let matches_all = match modifier {
        CriterionModifier::Equals => false,
        CriterionModifier::NotEquals => true,
        CriterionModifier::GreaterThan => (side == OutOfRange::Past) == greater_is_later,
        CriterionModifier::LessThan => (side == OutOfRange::Future) == greater_is_later,
        _ => return filter,
    };
    filter.push(if matches_all { MATCH_ANY_DATE } else { MATCH_NONE }, &[]);
    filter
}

/// Birth-year criterion over the closed interval `[YYYY-01-01, YYYY-12-31]`.
///
/// A year outside the calendar still filters: `EQUALS` matches nothing and
/// the other modifiers match by direction.
pub fn compile_birth_year(modifier: CriterionModifier, year: i32) -> DateRangeFilter {
    let mut filter = DateRangeFilter::default();
    if !modifier.is_range() {
        return filter;
    }
    let (Some(start_of_year), Some(end_of_year)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        let side = if year > 0 { OutOfRange::Future } else { OutOfRange::Past };
        return unbounded(modifier, side, true);
    };

    match modifier {
        CriterionModifier::Equals => {
            filter.push("performers.birthdate >= ?", &[start_of_year]);
            filter.push("performers.birthdate <= ?", &[end_of_year]);
        }
        CriterionModifier::NotEquals => {
            filter.push(
                "performers.birthdate < ? OR performers.birthdate > ?",
                &[start_of_year, end_of_year],
            );
        }
        CriterionModifier::GreaterThan => {
            filter.push("performers.birthdate > ?", &[end_of_year]);
        }
        CriterionModifier::LessThan => {
            filter.push("performers.birthdate < ?", &[start_of_year]);
        }
        _ => {}
    }
    filter
}

/// Age criterion evaluated against `today`.
///
/// Someone aged `age` was born in the half-open window
/// `[today - (age + 1) years, today - age years)`. Ages whose window falls
/// outside the calendar are handled as in `compile_birth_year`.
pub fn compile_age(modifier: CriterionModifier, age: i32, today: NaiveDate) -> DateRangeFilter {
    let mut filter = DateRangeFilter::default();
    if !modifier.is_range() {
        return filter;
    }
    let window = age
        .checked_add(1)
        .and_then(i32::checked_neg)
        .and_then(|years| add_years(today, years))
        .and_then(|birth_date| Some((birth_date, add_years(birth_date, 1)?)));
    let Some((birth_date, year_after)) = window else {
        let side = if age >= 0 { OutOfRange::Past } else { OutOfRange::Future };
        // Older means born earlier.
        return unbounded(modifier, side, false);
    };

    match modifier {
        CriterionModifier::Equals => {
            filter.push("performers.birthdate >= ?", &[birth_date]);
            filter.push("performers.birthdate < ?", &[year_after]);
        }
        CriterionModifier::NotEquals => {
            filter.push(
                "performers.birthdate < ? OR performers.birthdate >= ?",
                &[birth_date, year_after],
            );
        }
        CriterionModifier::GreaterThan => {
            filter.push("performers.birthdate < ?", &[birth_date]);
        }
        CriterionModifier::LessThan => {
            filter.push("performers.birthdate >= ?", &[year_after]);
        }
        _ => {}
    }
    filter
}

/// Calendar year arithmetic. 29 February lands on 1 March in non-leap years.
fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birth_year_equals_is_closed_year() {
        let f = compile_birth_year(CriterionModifier::Equals, 1990);
        assert_eq!(
            f.clauses,
            vec!["performers.birthdate >= ?", "performers.birthdate <= ?"]
        );
        assert_eq!(f.args, vec![ymd(1990, 1, 1), ymd(1990, 12, 31)]);
    }

    #[test]
    fn birth_year_not_equals_is_single_or_clause() {
        let f = compile_birth_year(CriterionModifier::NotEquals, 1990);
        assert_eq!(
            f.clauses,
            vec!["performers.birthdate < ? OR performers.birthdate > ?"]
        );
        assert_eq!(f.args, vec![ymd(1990, 1, 1), ymd(1990, 12, 31)]);
    }

    #[test]
    fn birth_year_bounds() {
        let gt = compile_birth_year(CriterionModifier::GreaterThan, 1990);
        assert_eq!(gt.clauses, vec!["performers.birthdate > ?"]);
        assert_eq!(gt.args, vec![ymd(1990, 12, 31)]);

        let lt = compile_birth_year(CriterionModifier::LessThan, 1990);
        assert_eq!(lt.clauses, vec!["performers.birthdate < ?"]);
        assert_eq!(lt.args, vec![ymd(1990, 1, 1)]);
    }

    #[test]
    fn age_greater_than_means_born_before_window() {
        let today = ymd(2024, 6, 15);
        let f = compile_age(CriterionModifier::GreaterThan, 30, today);
        assert_eq!(f.clauses, vec!["performers.birthdate < ?"]);
        assert_eq!(f.args, vec![ymd(1993, 6, 15)]);
    }

    #[test]
    fn age_equals_is_half_open() {
        let today = ymd(2024, 6, 15);
        let f = compile_age(CriterionModifier::Equals, 30, today);
        assert_eq!(
            f.clauses,
            vec!["performers.birthdate >= ?", "performers.birthdate < ?"]
        );
        assert_eq!(f.args, vec![ymd(1993, 6, 15), ymd(1994, 6, 15)]);
    }

    #[test]
    fn age_not_equals_and_less_than() {
        let today = ymd(2024, 6, 15);
        let ne = compile_age(CriterionModifier::NotEquals, 30, today);
        assert_eq!(
            ne.clauses,
            vec!["performers.birthdate < ? OR performers.birthdate >= ?"]
        );
        assert_eq!(ne.args, vec![ymd(1993, 6, 15), ymd(1994, 6, 15)]);

        let lt = compile_age(CriterionModifier::LessThan, 30, today);
        assert_eq!(lt.clauses, vec!["performers.birthdate >= ?"]);
        assert_eq!(lt.args, vec![ymd(1994, 6, 15)]);
    }

    #[test]
    fn leap_day_rolls_forward() {
        let f = compile_age(CriterionModifier::GreaterThan, 30, ymd(2024, 2, 29));
        assert_eq!(f.args, vec![ymd(1993, 3, 1)]);
    }

    #[test]
    fn non_range_modifiers_compile_to_nothing() {
        for modifier in [
            CriterionModifier::IsNull,
            CriterionModifier::NotNull,
            CriterionModifier::Includes,
            CriterionModifier::Excludes,
        ] {
            assert!(compile_birth_year(modifier, 1990).is_empty());
            assert!(compile_age(modifier, 30, ymd(2024, 1, 1)).is_empty());
        }
    }

    #[test]
    fn birth_year_outside_calendar_still_filters() {
        let year = 300_000;
        assert_eq!(compile_birth_year(CriterionModifier::Equals, year).clauses, vec![MATCH_NONE]);
        assert_eq!(
            compile_birth_year(CriterionModifier::NotEquals, year).clauses,
            vec![MATCH_ANY_DATE]
        );
        assert_eq!(
            compile_birth_year(CriterionModifier::GreaterThan, year).clauses,
            vec![MATCH_NONE]
        );
        assert_eq!(
            compile_birth_year(CriterionModifier::LessThan, year).clauses,
            vec![MATCH_ANY_DATE]
        );
        assert_eq!(
            compile_birth_year(CriterionModifier::GreaterThan, -year).clauses,
            vec![MATCH_ANY_DATE]
        );
        assert_eq!(
            compile_birth_year(CriterionModifier::LessThan, -year).clauses,
            vec![MATCH_NONE]
        );
        assert!(compile_birth_year(CriterionModifier::Equals, year).args.is_empty());
    }

    #[test]
    fn age_outside_calendar_still_filters() {
        let today = ymd(2024, 6, 15);
        for age in [500_000, i32::MAX] {
            assert_eq!(compile_age(CriterionModifier::Equals, age, today).clauses, vec![MATCH_NONE]);
            assert_eq!(
                compile_age(CriterionModifier::NotEquals, age, today).clauses,
                vec![MATCH_ANY_DATE]
            );
            assert_eq!(
                compile_age(CriterionModifier::GreaterThan, age, today).clauses,
                vec![MATCH_NONE]
            );
            assert_eq!(
                compile_age(CriterionModifier::LessThan, age, today).clauses,
                vec![MATCH_ANY_DATE]
            );
        }
        for age in [-500_000, i32::MIN] {
            assert_eq!(
                compile_age(CriterionModifier::GreaterThan, age, today).clauses,
                vec![MATCH_ANY_DATE]
            );
            assert_eq!(
                compile_age(CriterionModifier::LessThan, age, today).clauses,
                vec![MATCH_NONE]
            );
        }
        assert!(compile_age(CriterionModifier::IsNull, i32::MAX, today).is_empty());
    }

    #[test]
    fn unknown_modifier_names_do_not_parse() {
        assert_eq!(CriterionModifier::parse("BETWEEN"), None);
        assert_eq!(
            CriterionModifier::parse("GREATER_THAN"),
            Some(CriterionModifier::GreaterThan)
        );
    }
}
