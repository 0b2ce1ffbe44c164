//! Date helper functions

use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

/// Formats publication dates for display in the configured timezone and
/// language
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    timezone: Tz,
    locale: Locale,
}

impl DateFormatter {
    /// `format` uses date-fns tokens, e.g. `dd MMM yyyy`
    pub fn new(format: &str, timezone: &str, language: &str) -> Self {
        let timezone = timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", timezone);
            Tz::UTC
        });

        Self {
            pattern: date_fns_to_chrono_format(format),
            timezone,
            locale: parse_locale(language),
        }
    }

    pub fn format(&self, date: &DateTime<Utc>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.pattern, self.locale)
            .to_string()
    }

    /// Format an optional date, empty when missing
    pub fn format_opt(&self, date: Option<&DateTime<Utc>>) -> String {
        date.map(|d| self.format(d)).unwrap_or_default()
    }
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn parse_locale(language: &str) -> Locale {
    match language.replace('-', "_").to_lowercase().as_str() {
        "pt_br" | "pt" => Locale::pt_BR,
        "pt_pt" => Locale::pt_PT,
        "en_us" | "en" => Locale::en_US,
        "en_gb" => Locale::en_GB,
        "es_es" | "es" => Locale::es_ES,
        "fr_fr" | "fr" => Locale::fr_FR,
        "de_de" | "de" => Locale::de_DE,
        _ => {
            tracing::warn!("Unsupported language {:?}, using en_US", language);
            Locale::en_US
        }
    }
}

/// Convert a date-fns format string to a chrono format string.
///
/// Text between single quotes is copied literally and `''` is a quote.
fn date_fns_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                result.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        result.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut result, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('a', _) => "%p",
            _ => {
                for _ in 0..run {
                    push_literal(&mut result, c);
                }
                i += run;
                continue;
            }
        };
        result.push_str(spec);
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
