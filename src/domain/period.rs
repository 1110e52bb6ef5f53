use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate};

/// Period used to filter release lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPeriod {
    #[default]
    All,
    Year(i32),
}

impl FilterPeriod {
    pub fn matches(&self, date: &NaiveDate) -> bool {
        match self {
            FilterPeriod::All => true,
            FilterPeriod::Year(year) => date.year() == *year,
        }
    }
}

impl FromStr for FilterPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(FilterPeriod::All);
        }
        s.parse::<i32>()
            .map(FilterPeriod::Year)
            .map_err(|_| format!("expected \"all\" or a year, got \"{s}\""))
    }
}

impl Display for FilterPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterPeriod::All => write!(f, "All Time"),
            FilterPeriod::Year(year) => write!(f, "{year}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_and_years() {
        assert_eq!("all".parse::<FilterPeriod>(), Ok(FilterPeriod::All));
        assert_eq!("ALL".parse::<FilterPeriod>(), Ok(FilterPeriod::All));
        assert_eq!("2023".parse::<FilterPeriod>(), Ok(FilterPeriod::Year(2023)));
        assert!("last-year".parse::<FilterPeriod>().is_err());
    }

    #[test]
    fn year_matches_only_that_calendar_year() {
        let period = FilterPeriod::Year(2023);
        assert!(period.matches(&NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert!(!period.matches(&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(FilterPeriod::All.matches(&NaiveDate::from_ymd_opt(1999, 6, 1).unwrap()));
    }

    #[test]
    fn displays_like_the_year_picker() {
        assert_eq!(FilterPeriod::All.to_string(), "All Time");
        assert_eq!(FilterPeriod::Year(2021).to_string(), "2021");
    }
}
