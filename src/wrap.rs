//! Utilities for text wrapping.
//!
//! Text is split into source lines at explicit line breaks first.  Every source line produces at
//! least one output line, so intentional blank lines are preserved.  Within a source line, the
//! text is split into [`Token`][]s: whitespace separates words, and every CJK character is a token
//! of its own because Japanese text has no spaces between words.  Closing punctuation such as `。`
//! is attached to the preceding token so that it never starts a line.
//!
//! The [`Wrapper`][] greedily fills each output line with tokens until the next token would exceed
//! the maximum width.  A single token that is wider than the maximum width is emitted on a line of
//! its own and is not split.
//!
//! [`Token`]: struct.Token.html
//! [`Wrapper`]: struct.Wrapper.html

use std::collections::VecDeque;
use std::str;

use crate::fonts::FontData;
use crate::Mm;

/// A unit of text that is never split across lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'s> {
    /// The text of the token.
    pub text: &'s str,
    /// Whether the token was preceded by whitespace in the source text.
    pub space_before: bool,
}

/// Splits a single source line into tokens.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    // (start, end, space_before)
    let mut spans: Vec<(usize, usize, bool)> = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut space = false;

    for (i, c) in line.char_indices() {
        let end = i + c.len_utf8();
        if c.is_whitespace() {
            if let Some(start) = run_start.take() {
                spans.push((start, i, space));
            }
            space = true;
        } else if run_start.is_some() {
            if is_cjk(c) && !is_closing(c) {
                if let Some(start) = run_start.take() {
                    spans.push((start, i, space));
                }
                spans.push((i, end, false));
                space = false;
            }
        } else if is_closing(c) && !space && !spans.is_empty() {
            if let Some(last) = spans.last_mut() {
                last.1 = end;
            }
        } else if is_cjk(c) {
            spans.push((i, end, space));
            space = false;
        } else {
            run_start = Some(i);
        }
    }
    if let Some(start) = run_start {
        spans.push((start, line.len(), space));
    }

    spans
        .into_iter()
        .map(|(start, end, space_before)| Token {
            text: &line[start..end],
            space_before,
        })
        .collect()
}

/// Returns whether the given character belongs to a script that is written without spaces.
pub fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x3000..=0x303F // CJK symbols and punctuation
            | 0x3040..=0x309F // Hiragana
            | 0x30A0..=0x30FF // Katakana
            | 0x3400..=0x4DBF // CJK extension A
            | 0x4E00..=0x9FFF // CJK unified ideographs
            | 0xF900..=0xFAFF // CJK compatibility ideographs
            | 0xFF00..=0xFFEF // half- and full-width forms
            | 0xAC00..=0xD7AF // Hangul syllables
    )
}

/// Returns whether the given character must not start a line.
fn is_closing(c: char) -> bool {
    matches!(
        c,
        '、' | '。'
            | '，'
            | '．'
            | '・'
            | '：'
            | '；'
            | '！'
            | '？'
            | '）'
            | '」'
            | '』'
            | '】'
            | '〕'
            | '〉'
            | '》'
            | 'ー'
            | 'ぁ'
            | 'ぃ'
            | 'ぅ'
            | 'ぇ'
            | 'ぉ'
            | 'っ'
            | 'ゃ'
            | 'ゅ'
            | 'ょ'
            | 'ゎ'
            | 'ァ'
            | 'ィ'
            | 'ゥ'
            | 'ェ'
            | 'ォ'
            | 'ッ'
            | 'ャ'
            | 'ュ'
            | 'ョ'
            | 'ヮ'
            | 'ヵ'
            | 'ヶ'
            | '.'
            | ','
            | ')'
            | '!'
            | '?'
            | ':'
            | ';'
    )
}

/// Wraps the lines of a text to a maximum width.
///
/// This is an iterator over the output lines.  See the [module documentation](index.html) for
/// the wrapping rules.
pub struct Wrapper<'s, 'f> {
    source_lines: str::Split<'s, char>,
    pending: VecDeque<String>,
    font: &'f FontData,
    font_size: u8,
    max_width: Mm,
    has_overflowed: bool,
}

impl<'s, 'f> Wrapper<'s, 'f> {
    /// Creates a new wrapper for the given text.
    pub fn new(text: &'s str, max_width: Mm, font: &'f FontData, font_size: u8) -> Self {
        Wrapper {
            source_lines: text.split('\n'),
            pending: VecDeque::new(),
            font,
            font_size,
            max_width,
            has_overflowed: false,
        }
    }

    /// Returns whether a token was wider than the maximum width so far.
    pub fn has_overflowed(&self) -> bool {
        self.has_overflowed
    }

    fn wrap_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let space_width = self.font.str_width(" ", self.font_size);

        let mut current = String::new();
        let mut current_width = Mm(0.0);
        for token in tokenize(line) {
            let token_width = self.font.str_width(token.text, self.font_size);
            if current.is_empty() {
                current.push_str(token.text);
                current_width = token_width;
            } else {
                let separator = if token.space_before { space_width } else { Mm(0.0) };
                let width = current_width + separator + token_width;
                if width > self.max_width {
                    self.pending.push_back(std::mem::take(&mut current));
                    current.push_str(token.text);
                    current_width = token_width;
                } else {
                    if token.space_before {
                        current.push(' ');
                    }
                    current.push_str(token.text);
                    current_width = width;
                    continue;
                }
            }
            if token_width > self.max_width {
                self.has_overflowed = true;
            }
        }
        self.pending.push_back(current);
    }
}

impl<'s, 'f> Iterator for Wrapper<'s, 'f> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pending.is_empty() {
            let line = self.source_lines.next()?;
            self.wrap_line(line);
        }
        self.pending.pop_front()
    }
}

/// Wraps the given text to the maximum width and returns the lines.
pub fn wrap(text: &str, max_width: Mm, font: &FontData, font_size: u8) -> Vec<String> {
    Wrapper::new(text, max_width, font, font_size).collect()
}
