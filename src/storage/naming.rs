//! File and folder names written by the capture core.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone};

const ANONYMOUS_SUBJECT: &str = "Anonymous";
const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Replaces every character outside `[A-Za-z0-9]` with `_`. Only an empty
/// subject falls back to `Anonymous`.
pub fn sanitize_subject(subject: &str) -> String {
    if subject.is_empty() {
        return ANONYMOUS_SUBJECT.to_string();
    }
    subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `{YYYY-MM-DD}_{subject}_BURST_{HHMMSS}`
pub fn burst_folder_name<Tz: TimeZone>(at: &DateTime<Tz>, subject: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_BURST_{}",
        at.format("%Y-%m-%d"),
        sanitize_subject(subject),
        at.format("%H%M%S")
    )
}

/// `IMG_{index:04}.{ext}`
pub fn burst_frame_name(index: u32, extension: &str) -> String {
    format!("IMG_{index:04}.{extension}")
}

/// `{YYYY-MM-DD}_{subject}_MOSAICO.png`
pub fn composite_file_name<Tz: TimeZone>(at: &DateTime<Tz>, subject: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}_MOSAICO.png", at.format("%Y-%m-%d"), sanitize_subject(subject))
}

/// `{YYYY-MM-DD}_{subject}_FOTO_{HHMMSS}.jpg`
pub fn photo_file_name<Tz: TimeZone>(at: &DateTime<Tz>, subject: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_FOTO_{}.jpg",
        at.format("%Y-%m-%d"),
        sanitize_subject(subject),
        at.format("%H%M%S")
    )
}

pub fn is_frame_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Orders names so that embedded numbers compare by value (`IMG_9` < `IMG_10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut lhs = a.chars().peekable();
    let mut rhs = b.chars().peekable();

    loop {
        match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_digits = take_digits(&mut lhs);
                let right_digits = take_digits(&mut rhs);
                let left = left_digits.trim_start_matches('0');
                let right = right_digits.trim_start_matches('0');
                let ord = left.len().cmp(&right.len()).then_with(|| left.cmp(right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                lhs.next();
                rhs.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 42)
            .unwrap()
    }

    #[test]
    fn subject_is_sanitized() {
        assert_eq!(sanitize_subject("José da Silva-Jr."), "Jos__da_Silva_Jr_");
        assert_eq!(sanitize_subject("   "), "___");
        assert_eq!(sanitize_subject(""), "Anonymous");
    }

    #[test]
    fn names_follow_conventions() {
        assert_eq!(burst_folder_name(&at(), "Ana Lima"), "2024-03-07_Ana_Lima_BURST_090542");
        assert_eq!(burst_frame_name(7, "jpg"), "IMG_0007.jpg");
        assert_eq!(composite_file_name(&at(), "Ana"), "2024-03-07_Ana_MOSAICO.png");
        assert_eq!(photo_file_name(&at(), "Ana"), "2024-03-07_Ana_FOTO_090542.jpg");
    }

    #[test]
    fn frame_files_are_recognized_case_insensitively() {
        assert!(is_frame_file("IMG_0001.JPG"));
        assert!(is_frame_file("a.jpeg"));
        assert!(is_frame_file("b.png"));
        assert!(!is_frame_file(".scopecapture_probe"));
        assert!(!is_frame_file("notes.txt"));
    }

    #[test]
    fn natural_order_compares_numbers_by_value() {
        let mut names = vec!["IMG_10.jpg", "IMG_9.jpg", "IMG_0100.jpg", "IMG_0011.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["IMG_9.jpg", "IMG_10.jpg", "IMG_0011.jpg", "IMG_0100.jpg"]);
    }
}
