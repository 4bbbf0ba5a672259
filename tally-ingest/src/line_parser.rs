//! Heuristic line → transaction parser for text recovered from PDFs.
//!
//! A line becomes a candidate only when it carries both a date token and at
//! least one amount token. Statement headers, totals and page footers fall
//! out naturally because they lack one or the other.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::debug;

use crate::types::{TextLine, TransactionCandidate};

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"\b\d{4}[/-]\d{2}[/-]\d{2}\b",
            r"|\b\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})\b",
            r"|(?i:\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[ -]\d{1,2}[,\s-]+\d{4}\b)",
        ))
        .expect("date regex")
    })
}

// Matched against the comma-stripped line, so "1,234.56" arrives as "1234.56".
fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-?(?:\d{1,3}(?:\.\d{3})+|\d+)(?:\.\d{2})?").expect("amount regex")
    })
}

/// Parse a single line. Returns `None` when no date or no amount is found.
///
/// When several amounts are present the last one wins. The description is
/// the line with the date span and the chosen amount span cut out by
/// position, whitespace collapsed.
pub fn parse_line(line: &str) -> Option<TransactionCandidate> {
    let date = date_re().find(line)?;
    let date_span = date.range();

    let (stripped, offsets) = strip_commas(line);
    let amount = amount_re()
        .find_iter(&stripped)
        .filter_map(|m| {
            let span = offsets[m.start()]..offsets[m.end() - 1] + 1;
            let token = m.as_str();
            if is_standalone(line, span.clone()) {
                return Some((token, span));
            }
            // "Ref-3.20": keep the number, drop the hyphen
            let unsigned = token.strip_prefix('-')?;
            let span = offsets[m.start() + 1]..span.end;
            is_standalone(line, span.clone()).then_some((unsigned, span))
        })
        .filter(|(_, span)| !overlaps(span, &date_span))
        .last()?;

    let (token, amount_span) = amount;
    let value = parse_amount_token(token)?;

    Some(TransactionCandidate {
        date_text: date.as_str().to_string(),
        description: cut_spans(line, &[date_span, amount_span]),
        amount: value,
    })
}

/// Parse every line, silently discarding those that are not transactions.
pub fn parse_lines(lines: &[TextLine]) -> Vec<TransactionCandidate> {
    let candidates: Vec<TransactionCandidate> =
        lines.iter().filter_map(|l| parse_line(&l.text)).collect();
    debug!(
        lines = lines.len(),
        candidates = candidates.len(),
        "parsed text lines"
    );
    candidates
}

/// Remove every `,` and record, for each remaining byte, its offset in `line`.
fn strip_commas(line: &str) -> (String, Vec<usize>) {
    let mut stripped = String::with_capacity(line.len());
    let mut offsets = Vec::with_capacity(line.len());
    for (i, c) in line.char_indices() {
        if c == ',' {
            continue;
        }
        for b in 0..c.len_utf8() {
            offsets.push(i + b);
        }
        stripped.push(c);
    }
    (stripped, offsets)
}

/// Reject numbers glued to words or to other digits ("A123", "12.5", "4th").
///
/// Checked on the original line, so a comma next to the number is a
/// separator. A three-letter uppercase currency code directly in front
/// ("USD12.50") does not count as glue.
fn is_standalone(line: &str, span: Range<usize>) -> bool {
    let head = &line[..span.start];
    match head.chars().next_back() {
        Some(c) if c.is_numeric() || c == '.' => return false,
        Some(c) if c.is_alphabetic() && !ends_with_currency_code(head) => return false,
        _ => {}
    }
    let mut after = line[span.end..].chars();
    match after.next() {
        Some(c) if c.is_alphanumeric() => false,
        Some('.') => !after.next().is_some_and(|c| c.is_ascii_digit()),
        _ => true,
    }
}

fn ends_with_currency_code(head: &str) -> bool {
    let word: Vec<char> = head.chars().rev().take_while(|c| c.is_alphabetic()).collect();
    word.len() == 3 && word.iter().all(|c| c.is_ascii_uppercase())
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// "1.234.56" → 1234.56, "1.234" → 1234, "-15.00" → -15.0
fn parse_amount_token(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let n = bytes.len();
    let (int_part, frac) = if n >= 3 && bytes[n - 3] == b'.' {
        (&token[..n - 3], &token[n - 2..])
    } else {
        (token, "")
    };
    let mut normalized = int_part.replace('.', "");
    if !frac.is_empty() {
        normalized.push('.');
        normalized.push_str(frac);
    }
    normalized.parse().ok()
}

fn cut_spans(line: &str, spans: &[Range<usize>]) -> String {
    let kept: String = line
        .char_indices()
        .filter(|(i, _)| !spans.iter().any(|s| s.contains(i)))
        .map(|(_, c)| c)
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
