//! Generic removal of balanced two-character delimiter spans.
//!
//! A single automaton handles image/file captions (`[[File:` ... `]]`),
//! templates (`{{` ... `}}`) and tables (`{|` ... `|}`); only the label and
//! the delimiter pair differ between call sites.

/// Tracks whether the previous byte was the first byte of a two-byte delimiter.
#[derive(Clone, Copy, PartialEq)]
enum ScanState {
    Default,
    SawOpenFirst,
    SawCloseFirst,
}

/// Removes every occurrence of `label` together with the span it opens, up to
/// the matching close delimiter at nesting depth zero.
///
/// Depth starts at 1 right after `label`; each confirmed `open` pair
/// increments it, each confirmed `close` pair decrements it. After an excision
/// the search resumes from the same position. If the text ends before the
/// span closes, everything from the unmatched `label` onward is dropped
/// (data-loss policy, not an error).
///
/// Delimiters are ASCII, so scanning raw bytes is UTF-8 safe.
pub fn strip_nested(text: &str, label: &str, open: [u8; 2], close: [u8; 2]) -> String {
    let mut s = text.to_string();
    let mut from = 0usize;

    while let Some(rel) = s[from..].find(label) {
        let start = from + rel;
        let bytes = s.as_bytes();
        let mut state = ScanState::Default;
        let mut depth: i32 = 1;
        let mut cur = start + label.len();
        let mut end = None;

        while cur < bytes.len() {
            let b = bytes[cur];
            if state == ScanState::SawOpenFirst && b == open[1] {
                depth += 1;
                state = ScanState::Default;
            }
            if state == ScanState::SawOpenFirst {
                state = ScanState::Default;
            }
            if b == open[0] {
                state = ScanState::SawOpenFirst;
            }
            if state == ScanState::SawCloseFirst && b == close[1] {
                depth -= 1;
                if depth == 0 {
                    end = Some(cur);
                    break;
                }
                state = ScanState::Default;
            } else {
                if state == ScanState::SawCloseFirst {
                    state = ScanState::Default;
                }
                if b == close[0] {
                    state = ScanState::SawCloseFirst;
                }
            }
            cur += 1;
        }

        match end {
            Some(end) => {
                s.replace_range(start..=end, "");
                from = start;
            }
            None => {
                s.truncate(start);
                break;
            }
        }
    }

    s
}
