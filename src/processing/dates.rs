//! Calendar-date parsing for header names and date cells.
//!
//! Parsing goes through the [`DateParser`] trait. [`DateChain`] tries a fixed list of strict
//! formats first and then, depending on [`DateFallback`], a best-effort
//! [`GenericDateParser`]. Every parser yields a plain [`NaiveDate`]; inputs carrying an offset
//! are converted to their UTC calendar date.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::DateFallback;

static YMD_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static YMD_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap());
static YM_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YM_SLASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})$").unwrap());
static YM_COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})(\d{1,2})$").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// Header shapes that mark a column as a time point in a wide table.
static DATE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}[-/]\d{2}([-/]\d{2})?|\d{6}|\d{4})$").unwrap());

/// Returns `true` if a (trimmed) header name looks like a calendar date:
/// `YYYY-MM`, `YYYY/MM/DD`, `YYYYMM`, `YYYY`, ...
pub fn looks_like_date_header(name: &str) -> bool {
    DATE_HEADER_RE.is_match(name.trim())
}

/// Something that turns a raw string into a calendar date.
pub trait DateParser: Send + Sync {
    /// Parse `raw` (already trimmed by the caller), returning `None` if it does not match.
    fn parse(&self, raw: &str) -> Option<NaiveDate>;
}

/// The strict formats, in the priority order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictFormat {
    /// `YYYY-MM-DD`
    YearMonthDayDash,
    /// `YYYY/MM/DD`
    YearMonthDaySlash,
    /// `YYYY-MM`
    YearMonthDash,
    /// `YYYY/MM`
    YearMonthSlash,
    /// `YYYYMM`
    YearMonthCompact,
    /// `YYYY`, defaulting to January 1.
    Year,
}

impl StrictFormat {
    pub const ALL: [StrictFormat; 6] = [
        Self::YearMonthDayDash,
        Self::YearMonthDaySlash,
        Self::YearMonthDash,
        Self::YearMonthSlash,
        Self::YearMonthCompact,
        Self::Year,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            Self::YearMonthDayDash => &*YMD_DASH_RE,
            Self::YearMonthDaySlash => &*YMD_SLASH_RE,
            Self::YearMonthDash => &*YM_DASH_RE,
            Self::YearMonthSlash => &*YM_SLASH_RE,
            Self::YearMonthCompact => &*YM_COMPACT_RE,
            Self::Year => &*YEAR_RE,
        }
    }
}

impl DateParser for StrictFormat {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let caps = self.regex().captures(raw)?;
        let component = |i: usize| -> Option<u32> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(1),
            }
        };
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, component(2)?, component(3)?)
    }
}

/// Best-effort parser for free-form date strings that the strict formats reject.
///
/// Accepts RFC 3339 and RFC 2822 timestamps, ISO-like `YYYY-MM-DD HH:MM[:SS]`, US `MM/DD/YYYY`,
/// and English month names (`Jan 5, 2020`, `5 January 2020`, `March 2021`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDateParser;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%m/%d/%Y", "%B %d, %Y", "%B %d %Y", "%d %B %Y", "%Y.%m.%d"];

impl DateParser for GenericDateParser {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt.date());
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
                return Some(d);
            }
        }
        // "Mar 2021" / "March 2021"
        NaiveDate::parse_from_str(&format!("1 {raw}"), "%d %B %Y").ok()
    }
}

/// Ordered list of parsers; the first match wins.
pub struct DateChain {
    parsers: Vec<Box<dyn DateParser>>,
}

impl DateChain {
    /// Strict formats only.
    pub fn strict() -> Self {
        Self {
            parsers: StrictFormat::ALL
                .iter()
                .map(|f| Box::new(*f) as Box<dyn DateParser>)
                .collect(),
        }
    }

    /// Strict formats followed by the fallback selected by `fallback`.
    pub fn with_fallback(fallback: DateFallback) -> Self {
        let chain = Self::strict();
        match fallback {
            DateFallback::Generic => chain.then(GenericDateParser),
            DateFallback::Disabled => chain,
        }
    }

    /// Append a parser to the end of the chain.
    pub fn then(mut self, parser: impl DateParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Trim `raw` and try each parser in order.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        self.parsers.iter().find_map(|p| p.parse(s))
    }
}

impl Default for DateChain {
    fn default() -> Self {
        Self::with_fallback(DateFallback::default())
    }
}

impl fmt::Debug for DateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateChain")
            .field("parsers_len", &self.parsers.len())
            .finish()
    }
}

/// Parse with the default chain (strict formats, then the generic fallback).
pub fn parse_date_smart(raw: &str) -> Option<NaiveDate> {
    static DEFAULT_CHAIN: LazyLock<DateChain> = LazyLock::new(DateChain::default);
    DEFAULT_CHAIN.parse(raw)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        looks_like_date_header, parse_date_smart, DateChain, DateParser, GenericDateParser, StrictFormat,
    };
    use crate::config::DateFallback;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn strict_formats_in_priority_order() {
        assert_eq!(parse_date_smart("2020-03-15"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_date_smart("2020/03/15"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_date_smart("2020-03"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_smart("2021/01"), Some(ymd(2021, 1, 1)));
        assert_eq!(parse_date_smart("202006"), Some(ymd(2020, 6, 1)));
        assert_eq!(parse_date_smart("1999"), Some(ymd(1999, 1, 1)));
        assert_eq!(parse_date_smart("  2020-3-5 "), Some(ymd(2020, 3, 5)));
    }

    #[test]
    fn out_of_range_components_do_not_match() {
        assert_eq!(StrictFormat::YearMonthDash.parse("2020-13"), None);
        assert_eq!(parse_date_smart("2020-02-30"), None);
        assert_eq!(parse_date_smart("2020-00"), None);
    }

    #[test]
    fn generic_fallback_handles_common_encodings() {
        assert_eq!(parse_date_smart("2020-01-15T10:00:00Z"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_date_smart("2020-01-15T23:30:00-05:00"), Some(ymd(2020, 1, 16)));
        assert_eq!(parse_date_smart("2020-01-15 08:30:00"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_date_smart("01/15/2020"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_date_smart("Jan 15, 2020"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_date_smart("15 January 2020"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_date_smart("March 2021"), Some(ymd(2021, 3, 1)));
    }

    #[test]
    fn generic_fallback_reads_rfc2822_and_long_month_names() {
        let generic = GenericDateParser;
        assert_eq!(
            generic.parse("Wed, 15 Jan 2020 23:30:00 -0500"),
            Some(ymd(2020, 1, 16))
        );
        assert_eq!(generic.parse("Tue, 3 Mar 2020 08:00:00 +0000"), Some(ymd(2020, 3, 3)));
        assert_eq!(generic.parse("January 15, 2020"), Some(ymd(2020, 1, 15)));
        assert_eq!(generic.parse("September 1 2021"), Some(ymd(2021, 9, 1)));
        assert_eq!(parse_date_smart("February 29, 2020"), Some(ymd(2020, 2, 29)));
        assert_eq!(generic.parse("February 30, 2020"), None);
    }

    #[test]
    fn garbage_and_blank_are_rejected() {
        assert_eq!(parse_date_smart(""), None);
        assert_eq!(parse_date_smart("   "), None);
        assert_eq!(parse_date_smart("Source: FHFA"), None);
        assert_eq!(parse_date_smart("20"), None);
    }

    #[test]
    fn disabled_fallback_rejects_free_form_dates() {
        let chain = DateChain::with_fallback(DateFallback::Disabled);
        assert_eq!(chain.parse("Jan 15, 2020"), None);
        assert_eq!(chain.parse("2020-01"), Some(ymd(2020, 1, 1)));
    }

    #[test]
    fn custom_parser_can_be_appended() {
        struct Quarter;
        impl DateParser for Quarter {
            fn parse(&self, raw: &str) -> Option<NaiveDate> {
                let (y, q) = raw.split_once("-Q")?;
                let q: u32 = q.parse().ok()?;
                NaiveDate::from_ymd_opt(y.parse().ok()?, (q - 1) * 3 + 1, 1)
            }
        }

        let chain = DateChain::strict().then(Quarter);
        assert_eq!(chain.parse("2020-Q3"), Some(ymd(2020, 7, 1)));
    }

    #[test]
    fn date_header_shapes() {
        for h in ["2020-01", "2020/01", "2020-01-31", "2020/01/31", "202001", "2020", " 2020-01 "] {
            assert!(looks_like_date_header(h), "{h}");
        }
        for h in ["2020-1", "Jan 2020", "20201", "RegionName", "2020-01-1", "value2020"] {
            assert!(!looks_like_date_header(h), "{h}");
        }
    }
}
