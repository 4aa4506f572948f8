//! Request line parsing
//!
//! Turns raw lines typed by an operator or read from a request file into
//! `PointRequest`s. Two shapes are accepted:
//!
//! ```text
//! 597120-BA
//! 597120-BA;Site historique d'Argenton-sur-Creuse
//! ```
//!
//! Blank lines and `#` comments are skipped. Anything else that does not
//! split into two identifier halves is kept as a `malformed-line` failure.

use crate::app::services::text_input::read_text_file;
use crate::constants::{COMMENT_PREFIX, DESCRIPTION_SEPARATOR, IDENTIFIER_SEPARATOR};
use crate::models::{Failure, FailureReason, ParsedLine, PointRequest};
use std::io;
use std::path::Path;
use tracing::debug;

/// Parse every line, preserving input order
///
/// Line numbers are 1-based positions in `lines`, counting skipped lines,
/// so failures can be reported against what the operator sees.
pub fn parse_lines<I, S>(lines: I) -> Vec<ParsedLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed: Vec<ParsedLine> = lines
        .into_iter()
        .enumerate()
        .filter_map(|(i, line)| parse_line(i + 1, line.as_ref()))
        .collect();

    debug!("Parsed {} request line(s)", parsed.len());
    parsed
}

/// Parse one line; `None` for blank and comment lines
pub fn parse_line(line_number: usize, raw_line: &str) -> Option<ParsedLine> {
    let line = raw_line.trim_start_matches('\u{feff}').trim();

    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return None;
    }

    let (identifier, description) = match line.split_once(DESCRIPTION_SEPARATOR) {
        Some((identifier, description)) => {
            let description = description.trim();
            (
                identifier,
                (!description.is_empty()).then(|| description.to_string()),
            )
        }
        None => (line, None),
    };

    let parts: Vec<&str> = identifier.split(IDENTIFIER_SEPARATOR).map(str::trim).collect();

    match parts.as_slice() {
        [primary, secondary] if !primary.is_empty() && !secondary.is_empty() => {
            Some(ParsedLine::Request(PointRequest {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
                description,
                line_number,
                raw_line: raw_line.to_string(),
            }))
        }
        _ => {
            debug!("Malformed request line {}: {:?}", line_number, raw_line);
            Some(ParsedLine::Failure(Failure::new(
                line_number,
                raw_line,
                FailureReason::MalformedLine,
            )))
        }
    }
}

/// Split parsed lines into requests and failures, keeping order within each
pub fn partition(parsed: Vec<ParsedLine>) -> (Vec<PointRequest>, Vec<Failure>) {
    let mut requests = Vec::new();
    let mut failures = Vec::new();

    for line in parsed {
        match line {
            ParsedLine::Request(request) => requests.push(request),
            ParsedLine::Failure(failure) => failures.push(failure),
        }
    }

    (requests, failures)
}

/// Read a request file into lines, tolerating BOMs, CRLF and Latin-1
pub fn read_request_file(path: &Path) -> io::Result<Vec<String>> {
    let text = read_text_file(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn expect_request(parsed: Option<ParsedLine>) -> PointRequest {
        match parsed {
            Some(ParsedLine::Request(request)) => request,
            other => panic!("expected request, got {:?}", other),
        }
    }

    fn expect_failure(parsed: Option<ParsedLine>) -> Failure {
        match parsed {
            Some(ParsedLine::Failure(failure)) => failure,
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_identifier() {
        let request = expect_request(parse_line(1, "597120-BA"));
        assert_eq!(request.primary, "597120");
        assert_eq!(request.secondary, "BA");
        assert_eq!(request.description, None);
        assert_eq!(request.line_number, 1);
    }

    #[test]
    fn test_identifier_with_description() {
        let request = expect_request(parse_line(3, "597120-BA;My note"));
        assert_eq!(request.primary, "597120");
        assert_eq!(request.secondary, "BA");
        assert_eq!(request.description.as_deref(), Some("My note"));
    }

    #[test]
    fn test_description_keeps_hyphens_and_semicolons() {
        let request = expect_request(parse_line(
            1,
            "597120-BA;Site historique d'Argenton-sur-Creuse; côté nord",
        ));
        assert_eq!(
            request.description.as_deref(),
            Some("Site historique d'Argenton-sur-Creuse; côté nord")
        );
    }

    #[test]
    fn test_whitespace_tolerance() {
        let request = expect_request(parse_line(1, "  597120 - ba ;  note  \r"));
        assert_eq!(request.primary, "597120");
        assert_eq!(request.secondary, "ba");
        assert_eq!(request.description.as_deref(), Some("note"));
    }

    #[test]
    fn test_empty_description_is_absent() {
        let request = expect_request(parse_line(1, "597120-BA;   "));
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        assert_eq!(parse_line(1, ""), None);
        assert_eq!(parse_line(2, "   \t"), None);
        assert_eq!(parse_line(3, "# codes du 12 mars"), None);
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        let failure = expect_failure(parse_line(4, "justtext"));
        assert_eq!(failure.reason, FailureReason::MalformedLine);
        assert_eq!(failure.raw_line, "justtext");
        assert_eq!(failure.line_number, 4);
    }

    #[test]
    fn test_wrong_part_count_is_malformed() {
        for line in ["597120-BA-X", "-BA", "597120-", "-", ";note only"] {
            let failure = expect_failure(parse_line(1, line));
            assert_eq!(failure.reason, FailureReason::MalformedLine, "{}", line);
        }
    }

    #[test]
    fn test_raw_line_kept_verbatim() {
        let failure = expect_failure(parse_line(1, "  bad line  "));
        assert_eq!(failure.raw_line, "  bad line  ");
    }

    #[test]
    fn test_order_and_line_numbers_preserved() {
        let lines = ["597120-BA", "bad one", "", "142091-AO", "bad two", "393314-BV"];
        let parsed = parse_lines(lines);

        assert_eq!(parsed.len(), 5);
        let (requests, failures) = partition(parsed);

        let request_lines: Vec<usize> = requests.iter().map(|r| r.line_number).collect();
        let failure_lines: Vec<usize> = failures.iter().map(|f| f.line_number).collect();
        assert_eq!(request_lines, vec![1, 4, 6]);
        assert_eq!(failure_lines, vec![2, 5]);
    }

    #[test]
    fn test_leading_bom_stripped() {
        let request = expect_request(parse_line(1, "\u{feff}597120-BA"));
        assert_eq!(request.primary, "597120");
    }

    #[test]
    fn test_read_request_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"597120-BA\r\n142091-AO;Ch\xE2teau\r\n\r\n").unwrap();

        let lines = read_request_file(file.path()).unwrap();
        assert_eq!(lines, vec!["597120-BA", "142091-AO;Château", ""]);

        let (requests, failures) = partition(parse_lines(&lines));
        assert_eq!(requests.len(), 2);
        assert!(failures.is_empty());
        assert_eq!(requests[1].description.as_deref(), Some("Château"));
    }
}
