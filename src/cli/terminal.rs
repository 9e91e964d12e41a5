//! Terminal capability detection and display formatting

use chrono::NaiveDate;
use crumb::Rating;
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// `45 min`, `2h`, `2h 30min`.
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let (hours, rest) = (minutes / 60, minutes % 60);
    if rest == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {rest}min")
    }
}

/// `Mar 9, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Five stars, filled up to the rating; `unrated` without one.
pub fn stars(rating: Option<Rating>) -> String {
    rating.map_or_else(
        || "unrated".to_string(),
        |rating| {
            let filled = usize::from(rating.get());
            format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
        },
    )
}

/// Shortens `text` to at most `width` characters, marking the cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, "0 min")]
    #[test_case(45, "45 min")]
    #[test_case(60, "1h")]
    #[test_case(150, "2h 30min")]
    #[test_case(1440, "24h")]
    fn minutes(minutes: u32, expected: &str) {
        assert_eq!(format_minutes(minutes), expected);
    }

    #[test]
    fn date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date), "Mar 9, 2024");
    }

    #[test]
    fn star_ratings() {
        assert_eq!(stars(Rating::new(4).ok()), "★★★★☆");
        assert_eq!(stars(None), "unrated");
    }

    #[test_case("Sourdough", 20, "Sourdough"; "short text untouched")]
    #[test_case("Sourdough country loaf", 10, "Sourdough…"; "long text cut")]
    fn truncation(text: &str, width: usize, expected: &str) {
        assert_eq!(truncate(text, width), expected);
    }
}
