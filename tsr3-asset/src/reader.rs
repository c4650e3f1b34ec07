//! Line tokenizer shared by the OBJ and MTL readers.
//!
//! Every meaningful line is split into a keyword and the untyped remainder;
//! interpreting the remainder is left to the caller.

use std::fs;
use std::path::Path;

use tsr3_core::{ConvertError, ConvertResult, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub keyword: &'a str,
    pub rest: &'a str,
}

/// One corner of a face as written: 1-based position, uv and normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: u64,
    pub uv: u64,
    pub normal: u64,
}

/// Yields the keyword lines of `text`, skipping blanks and `#` comments.
pub fn tokenize(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => (line, ""),
        };
        Some(Line { number: i + 1, keyword, rest })
    })
}

/// Feeds every line of `text` to `callback`, tagging failures with `origin`
/// and the offending line number.
pub fn parse_str<F>(text: &str, origin: &Path, mut callback: F) -> ConvertResult<()>
where
    F: FnMut(&Line<'_>) -> ConvertResult<()>,
{
    for line in tokenize(text) {
        callback(&line).map_err(|e| e.at_line(origin, line.number))?;
    }
    Ok(())
}

pub fn parse_file<F>(path: &Path, callback: F) -> ConvertResult<()>
where
    F: FnMut(&Line<'_>) -> ConvertResult<()>,
{
    let bytes = fs::read(path).map_err(|e| ConvertError::file_open(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    parse_str(&text, path, callback)
}

/// Parses the first `N` whitespace separated floats of `rest`.
///
/// Extra trailing components (an optional `w`, for instance) are ignored.
pub fn parse_vector<const N: usize>(rest: &str) -> ConvertResult<Vector<N>> {
    let mut components = [0.0f32; N];
    let mut tokens = rest.split_whitespace();
    for (i, slot) in components.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            ConvertError::malformed(format!("expected {N} numbers, found {i} in \"{rest}\""))
        })?;
        *slot = token
            .parse()
            .map_err(|_| ConvertError::malformed(format!("\"{token}\" is not a number")))?;
    }
    Ok(Vector::new(components))
}

/// Parses a `p/t/n` corner. All three indices are required.
pub fn parse_corner(token: &str) -> ConvertResult<FaceCorner> {
    let mut parts = token.split('/');
    let mut next = |what: &str| -> ConvertResult<u64> {
        let part = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConvertError::malformed(format!("corner \"{token}\" has no {what} index")))?;
        part.parse().map_err(|_| {
            ConvertError::malformed(format!("corner \"{token}\" has invalid {what} index \"{part}\""))
        })
    };
    let corner = FaceCorner {
        position: next("position")?,
        uv: next("uv")?,
        normal: next("normal")?,
    };
    if parts.next().is_some() {
        return Err(ConvertError::malformed(format!("corner \"{token}\" has more than 3 indices")));
    }
    Ok(corner)
}

/// Parses the corners of a face, stopping at a trailing `#` comment.
pub fn parse_face(rest: &str) -> ConvertResult<Vec<FaceCorner>> {
    rest.split_whitespace()
        .take_while(|token| !token.starts_with('#'))
        .map(parse_corner)
        .collect()
}
