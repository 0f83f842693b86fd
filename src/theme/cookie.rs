//! Cookie-backed theme persistence.
//!
//! Mirrors what a page script sees through `document.cookie`: reads come from
//! a `name=value; other=value` header, writes produce a `Set-Cookie` line with
//! an `expires` attribute `retention_days` in the future.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use super::{Theme, ThemeBackend};
use crate::config::ThemeConfig;

/// In-memory cookie jar holding the theme cookie.
#[derive(Debug, Clone)]
pub struct CookieJar {
    name: String,
    retention_days: u32,
    /// Current `document.cookie` view
    header: String,
    /// Last `Set-Cookie` line written, for the host to emit
    last_set: Option<String>,
}

impl CookieJar {
    pub fn new(config: &ThemeConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            retention_days: config.retention_days,
            header: String::new(),
            last_set: None,
        }
    }

    /// Seed the jar from an incoming `Cookie` header.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn last_set_cookie(&self) -> Option<&str> {
        self.last_set.as_deref()
    }

    fn write(&mut self, value: &str, now: DateTime<Utc>) {
        self.last_set = Some(set_cookie_line(&self.name, value, self.retention_days, now));

        let mut pairs: Vec<String> = self
            .header
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty() && cookie_value(c, &self.name).is_none())
            .map(str::to_string)
            .collect();
        pairs.push(format!("{}={}", self.name, value));
        self.header = pairs.join("; ");
    }
}

impl ThemeBackend for CookieJar {
    fn load(&self) -> Option<Theme> {
        let raw = get_cookie(&self.header, &self.name)?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(_) => {
                log::warn!("Ignoring unrecognized {} cookie value {:?}", self.name, raw);
                None
            }
        }
    }

    fn store(&mut self, theme: Theme) {
        self.write(theme.as_str(), Utc::now());
    }
}

fn cookie_value<'a>(pair: &'a str, name: &str) -> Option<&'a str> {
    pair.strip_prefix(name)?.strip_prefix('=')
}

/// Look up `name` in a `document.cookie` style header.
pub fn get_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(|c| c.trim_start_matches(' '))
        .find_map(|c| cookie_value(c, name))
}

/// Latest date a cookie `expires` attribute can carry (four-digit year)
fn max_expiry() -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).single()
}

/// Expiry `days` after `now`, capped at the end of year 9999.
fn expiry(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|d| now.checked_add_signed(d))
        .filter(|at| at.year() <= 9999)
        .or_else(max_expiry)
}

/// `Set-Cookie` line valid for `days` from `now`; `days == 0` makes a session cookie.
pub fn set_cookie_line(name: &str, value: &str, days: u32, now: DateTime<Utc>) -> String {
    let expires = match expiry(now, days).filter(|_| days > 0) {
        Some(at) => format!("; expires={}", at.format("%a, %d %b %Y %H:%M:%S GMT")),
        None => String::new(),
    };
    format!("{}={}{}; path=/; SameSite=Lax", name, value, expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_theme_among_other_cookies() {
        assert_eq!(get_cookie("a=1; theme=light; b=2", "theme"), Some("light"));
        assert_eq!(get_cookie("theme=dark", "theme"), Some("dark"));
        assert_eq!(get_cookie("xtheme=dark", "theme"), None);
        assert_eq!(get_cookie("", "theme"), None);
    }

    #[test]
    fn set_cookie_carries_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let line = set_cookie_line("theme", "dark", 365, now);
        assert_eq!(
            line,
            "theme=dark; expires=Sat, 16 Oct 2027 12:00:00 GMT; path=/; SameSite=Lax"
        );
        assert_eq!(
            set_cookie_line("theme", "dark", 0, now),
            "theme=dark; path=/; SameSite=Lax"
        );
    }

    #[test]
    fn huge_retention_is_capped() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(
            set_cookie_line("theme", "dark", u32::MAX, now),
            "theme=dark; expires=Fri, 31 Dec 9999 23:59:59 GMT; path=/; SameSite=Lax"
        );
    }

    #[test]
    fn first_visit_with_huge_retention_persists() {
        let config = crate::config::SiteConfig::parse("[theme]\nretention_days = 4000000000").unwrap();
        let store = crate::theme::ThemeStore::from_cookie_header("", &config.theme);
        assert_eq!(store.get(), Theme::Dark);
    }

    #[test]
    fn store_replaces_existing_value() {
        let mut jar = CookieJar::new(&ThemeConfig::default()).with_header("a=1; theme=dark");
        jar.store(Theme::Light);
        assert_eq!(jar.header(), "a=1; theme=light");
        assert_eq!(jar.load(), Some(Theme::Light));
        assert!(jar.last_set_cookie().unwrap().starts_with("theme=light; expires="));
    }

    #[test]
    fn unknown_value_reads_as_missing() {
        let jar = CookieJar::new(&ThemeConfig::default()).with_header("theme=sepia");
        assert_eq!(jar.load(), None);
    }
}
