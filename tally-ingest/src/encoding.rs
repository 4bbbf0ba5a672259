//! Character encoding sniffing for delimited text uploads.
//!
//! Detection never blocks the pipeline: when no candidate is convincing the
//! configured fallback is used and decoding proceeds lossily.

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

/// Legacy encodings tried, in tie-break order, when the bytes are not UTF-8.
const CANDIDATE_LABELS: &[&str] = &[
    "windows-1252",
    "iso-8859-2",
    "shift_jis",
    "gb18030",
    "big5",
    "euc-kr",
];

/// Best-guess encoding with a 0.0..=1.0 confidence score
#[derive(Debug, Clone, Copy)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    pub confidence: f32,
}

/// Guess the encoding of `bytes`.
pub fn detect_encoding(bytes: &[u8]) -> DetectedEncoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return DetectedEncoding {
            encoding,
            confidence: 1.0,
        };
    }

    if std::str::from_utf8(bytes).is_ok() {
        let confidence = if bytes.is_ascii() { 0.99 } else { 1.0 };
        return DetectedEncoding {
            encoding: UTF_8,
            confidence,
        };
    }

    let mut best = DetectedEncoding {
        encoding: UTF_8,
        confidence: 0.0,
    };
    for label in CANDIDATE_LABELS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
        else {
            continue;
        };
        let confidence = printable_ratio(&text);
        if confidence > best.confidence {
            best = DetectedEncoding {
                encoding,
                confidence,
            };
        }
    }
    best
}

/// Decode `bytes` with the detected encoding, or `fallback` when the
/// detector's confidence is below `min_confidence`.
pub fn decode_text(bytes: &[u8], fallback: &'static Encoding, min_confidence: f32) -> String {
    let detected = detect_encoding(bytes);
    let encoding = if detected.confidence >= min_confidence {
        detected.encoding
    } else {
        fallback
    };
    debug!(
        detected = detected.encoding.name(),
        confidence = detected.confidence,
        used = encoding.name(),
        "decoding delimited text"
    );
    // `decode` strips a matching BOM and replaces malformed sequences.
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Resolve a configured encoding label, falling back to UTF-8 for unknown labels.
pub fn encoding_for_label(label: &str) -> &'static Encoding {
    Encoding::for_label(label.trim().as_bytes()).unwrap_or(UTF_8)
}

fn printable_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        total += 1;
        if c == '\n' || c == '\r' || c == '\t' || (!c.is_control() && c != '\u{FFFD}') {
            printable += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    printable as f32 / total as f32
}
