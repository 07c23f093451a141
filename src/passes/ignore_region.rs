//! Keyword-delimited regions and statement boundaries
//!
//! Splits the code of one line into spans the assignment rewriter may touch,
//! spans it must copy verbatim (from a start keyword such as `IF` through its
//! end keyword `THEN`), and statement boundaries (`;` or `DO`). A region
//! opened on one line stays open on the following lines until its end
//! keyword shows up, so the caller threads a [`RegionState`] from line to
//! line.

use std::ops::Range;

use regex::{Match, Regex};

use crate::config::KeywordPair;
use crate::source::patterns::{keyword_re, STATEMENT_END_RE};

/// Which region, if any, is open at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionState {
    #[default]
    Closed,
    /// Index of the pair whose start keyword opened the region
    Open(usize),
}

/// A piece of a code line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Code outside any region
    Code(Range<usize>),
    /// Code inside a region, including its keywords
    Ignored(Range<usize>),
    /// The preceding span ended a statement
    StatementEnd,
}

/// Compiled start/end keyword pairs
pub struct IgnoreRegions {
    pairs: Vec<(Regex, Regex)>,
}

impl IgnoreRegions {
    #[must_use]
    pub fn new(pairs: &[KeywordPair]) -> Self {
        let pairs = pairs
            .iter()
            .filter(|p| !p.start.is_empty() && !p.end.is_empty())
            .map(|p| (keyword_re(&p.start), keyword_re(&p.end)))
            .collect();
        Self { pairs }
    }

    /// Leftmost start keyword at or after `pos` (earlier pairs win ties)
    fn next_start<'h>(&self, masked: &'h str, pos: usize) -> Option<(usize, Match<'h>)> {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(idx, (start, _))| start.find_at(masked, pos).map(|m| (idx, m)))
            .min_by_key(|(idx, m)| (m.start(), *idx))
    }

    /// Split `masked` (a code segment with string contents blanked) into segments
    ///
    /// `state` is the region state on entry and is left as the state on exit.
    #[must_use]
    pub fn segment(&self, masked: &str, state: &mut RegionState) -> Vec<Segment> {
        let len = masked.len();
        let mut segments = Vec::new();
        let mut pos = 0;

        while pos < len {
            match *state {
                RegionState::Open(idx) => {
                    let Some((_, end_re)) = self.pairs.get(idx) else {
                        *state = RegionState::Closed;
                        continue;
                    };
                    let Some(end) = end_re.find_at(masked, pos) else {
                        segments.push(Segment::Ignored(pos..len));
                        break;
                    };
                    segments.push(Segment::Ignored(pos..end.end()));
                    *state = RegionState::Closed;
                    if STATEMENT_END_RE.is_match(end.as_str()) {
                        segments.push(Segment::StatementEnd);
                    }
                    pos = end.end();
                }
                RegionState::Closed => {
                    let start = self.next_start(masked, pos);
                    let stop = STATEMENT_END_RE.find_at(masked, pos);
                    match (start, stop) {
                        (Some((idx, kw)), stop)
                            if stop.map_or(true, |s| kw.start() < s.start()) =>
                        {
                            if kw.start() > pos {
                                segments.push(Segment::Code(pos..kw.start()));
                            }
                            segments.push(Segment::Ignored(kw.range()));
                            *state = RegionState::Open(idx);
                            pos = kw.end();
                        }
                        (_, Some(stop)) => {
                            segments.push(Segment::Code(pos..stop.end()));
                            segments.push(Segment::StatementEnd);
                            pos = stop.end();
                        }
                        _ => {
                            segments.push(Segment::Code(pos..len));
                            break;
                        }
                    }
                }
            }
        }

        segments
    }
}
