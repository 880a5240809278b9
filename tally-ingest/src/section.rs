//! Transaction/securities block isolation.

use regex::Regex;

use crate::formats::{compile_ci, SectionBoundary};

/// Collect the trimmed, non-empty lines between the first start marker and
/// the first end marker after it, both exclusive.
///
/// No start marker anywhere → empty result, never an error. A start marker
/// with no later end marker → everything through the end of the text. The
/// walk terminates at the first end marker; later matching blocks are never
/// resumed.
pub fn scan(text: &str, boundary: &SectionBoundary) -> Vec<String> {
    let start = compile_markers(&boundary.start_patterns);
    let end = compile_markers(&boundary.end_patterns);

    let mut inside = false;
    let mut lines = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if !inside {
            if matches_any(line, &start) {
                inside = true;
            }
            continue;
        }
        if matches_any(line, &end) {
            break;
        }
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    lines
}

/// A marker matches a line as a case-insensitive substring or, when it
/// compiles, as a case-insensitive regex.
struct Marker {
    lowered: String,
    regex: Option<Regex>,
}

fn compile_markers(patterns: &[String]) -> Vec<Marker> {
    patterns
        .iter()
        .map(|pattern| Marker {
            lowered: pattern.to_lowercase(),
            regex: compile_ci(pattern).ok(),
        })
        .collect()
}

fn matches_any(line: &str, markers: &[Marker]) -> bool {
    if markers.is_empty() {
        return false;
    }
    let lowered = line.to_lowercase();
    markers.iter().any(|marker| {
        lowered.contains(&marker.lowered)
            || marker
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(start: &[&str], end: &[&str]) -> SectionBoundary {
        SectionBoundary::new(start.iter().copied(), end.iter().copied())
    }

    const STATEMENT: &str = "\
Account Summary
PURCHASES
12/16 Ultra Pure Water Tracy CA 48.00

12/27 UA INFLT 0164460117919 HOUSTON TX 8.00
Total fees charged
12/29 SHOULD NOT APPEAR 10.00
";

    #[test]
    fn test_scan_keeps_lines_between_markers() {
        let lines = scan(STATEMENT, &boundary(&["PURCHASES"], &["Total fees"]));
        assert_eq!(
            lines,
            vec![
                "12/16 Ultra Pure Water Tracy CA 48.00",
                "12/27 UA INFLT 0164460117919 HOUSTON TX 8.00",
            ]
        );
    }

    #[test]
    fn test_scan_drops_blank_lines_and_markers() {
        let lines = scan(STATEMENT, &boundary(&["purchases"], &["total FEES"]));
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| !l.is_empty()));
        assert!(!lines.iter().any(|l| l.contains("PURCHASES")));
    }

    #[test]
    fn test_no_start_marker_yields_empty() {
        let lines = scan(STATEMENT, &boundary(&["TRANSACTIONS"], &["Total fees"]));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_missing_end_marker_runs_to_end_of_text() {
        let lines = scan(STATEMENT, &boundary(&["PURCHASES"], &["NEVER PRESENT"]));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.last().unwrap(), "12/29 SHOULD NOT APPEAR 10.00");
    }

    #[test]
    fn test_walk_never_resumes_after_end_marker() {
        let text = "\
HOLDINGS
AAPL 10
Total Portfolio
HOLDINGS
MSFT 20
Total Portfolio
";
        let lines = scan(text, &boundary(&["HOLDINGS"], &["Total Portfolio"]));
        assert_eq!(lines, vec!["AAPL 10"]);
    }

    #[test]
    fn test_regex_marker_matches_header() {
        let text = "\
Your Holdings as of 12/31/2024
AAPL 10
Total Portfolio Value
";
        let lines = scan(
            text,
            &boundary(&[r"Holdings as of \d{1,2}/\d{1,2}/\d{4}"], &["Total Portfolio"]),
        );
        assert_eq!(lines, vec!["AAPL 10"]);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let lines = scan(STATEMENT, &boundary(&["PURCHASES"], &["Total fees"]));
        let rejoined = lines.join("\n");
        assert_eq!(
            rejoined,
            "12/16 Ultra Pure Water Tracy CA 48.00\n12/27 UA INFLT 0164460117919 HOUSTON TX 8.00"
        );
    }
}
