use serde::Serialize;

use super::{period::FilterPeriod, release::Release};

pub const DEFAULT_BACKDROP: &str = "/icons/fallback_backdrop.jpg";

/// Represents a tracked artist together with its releases.
///
/// Built from the roster entry merged with the matching releases,
/// and rebuilt from scratch on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub name: String,
    pub cover: Option<String>,
    pub backdrop: Option<String>,
    pub fallback_image: String,
    /// 24-bit RGB
    pub color: u32,
    /// newest first
    pub releases: Vec<Release>,
}

impl Artist {
    pub fn cover_or_fallback(&self) -> &str {
        self.cover.as_deref().unwrap_or(&self.fallback_image)
    }

    pub fn backdrop_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.backdrop.as_deref().unwrap_or(default)
    }

    pub fn color_hex(&self) -> String {
        color_hex(self.color)
    }

    /// Distinct release years, most recent first
    pub fn release_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.releases.iter().map(Release::year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }

    pub fn releases_in(&self, period: FilterPeriod) -> Vec<&Release> {
        self.releases
            .iter()
            .filter(|r| period.matches(&r.release_date))
            .collect()
    }
}

pub fn color_hex(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn artist() -> Artist {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        Artist {
            name: "Kaytranada".to_string(),
            cover: None,
            backdrop: Some("https://img/backdrop.jpg".to_string()),
            fallback_image: "/icons/trackly.png".to_string(),
            color: 0x0a0b0c,
            releases: vec![
                Release::new("Kaytranada", "Timeless", d(2024, 6, 7)),
                Release::new("Kaytranada", "Live", d(2024, 1, 2)),
                Release::new("Kaytranada", "Bubba", d(2019, 12, 13)),
            ],
        }
    }

    #[test]
    fn image_fallbacks() {
        let a = artist();
        assert_eq!(a.cover_or_fallback(), "/icons/trackly.png");
        assert_eq!(a.backdrop_or(DEFAULT_BACKDROP), "https://img/backdrop.jpg");

        let no_backdrop = Artist {
            backdrop: None,
            ..artist()
        };
        assert_eq!(no_backdrop.backdrop_or(DEFAULT_BACKDROP), DEFAULT_BACKDROP);
    }

    #[test]
    fn color_is_zero_padded_rgb() {
        assert_eq!(artist().color_hex(), "#0a0b0c");
        assert_eq!(color_hex(0), "#000000");
        assert_eq!(color_hex(0xff_ff_ff_ff), "#ffffff");
    }

    #[test]
    fn years_are_distinct_and_descending() {
        assert_eq!(artist().release_years(), vec![2024, 2019]);
    }

    #[test]
    fn period_filter_keeps_order() {
        let a = artist();
        let titles: Vec<_> = a
            .releases_in(FilterPeriod::Year(2024))
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Timeless", "Live"]);
        assert_eq!(a.releases_in(FilterPeriod::All).len(), 3);
        assert!(a.releases_in(FilterPeriod::Year(2001)).is_empty());
    }
}
