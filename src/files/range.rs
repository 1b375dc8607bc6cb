//! `Range` header handling for single byte ranges.

/// A parsed `Range` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// Not a `bytes` range; serve the whole file.
    Ignored,
    /// More than one range was asked for.
    Multiple,
    /// One range. A missing `from` makes `to` a suffix length. Both missing
    /// means the range could not be read.
    Single { from: Option<u64>, to: Option<u64> },
}

/// A range resolved against a file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// The range covers the entire file.
    Whole,
    /// Inclusive byte bounds inside the file.
    Partial { from: u64, to: u64 },
    /// The bounds fall outside the file.
    NotSatisfiable,
}

impl ResolvedRange {
    /// Value for a `Content-Range` header.
    pub fn content_range(&self, length: u64) -> String {
        match self {
            ResolvedRange::Partial { from, to } => format!("bytes {from}-{to}/{length}"),
            ResolvedRange::Whole => format!("bytes 0-{}/{length}", length.saturating_sub(1)),
            ResolvedRange::NotSatisfiable => format!("bytes */{length}"),
        }
    }
}

/// Parse a `Range` header value such as `bytes=0-99`, `bytes=100-` or
/// `bytes=-500`.
pub fn parse_range_header(value: &str) -> RangeRequest {
    let Some((unit, spec)) = value.trim().split_once('=') else {
        return RangeRequest::Ignored;
    };
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return RangeRequest::Ignored;
    }

    let ranges: Vec<&str> = spec.split(',').map(str::trim).filter(|r| !r.is_empty()).collect();
    if ranges.len() > 1 {
        return RangeRequest::Multiple;
    }

    let unreadable = RangeRequest::Single { from: None, to: None };
    let Some((from, to)) = ranges.first().and_then(|r| r.split_once('-')) else {
        return unreadable;
    };

    let bound = |s: &str| -> Result<Option<u64>, ()> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some).map_err(|_| ())
        }
    };

    match (bound(from), bound(to)) {
        (Ok(from), Ok(to)) => RangeRequest::Single { from, to },
        _ => unreadable,
    }
}

/// Resolve range bounds against a file of `length` bytes.
///
/// Both bounds are used as given; only `from` runs to the end of the file;
/// only `to` is a suffix length. Out-of-bounds ranges are not clamped.
pub fn resolve_range(from: Option<u64>, to: Option<u64>, length: u64) -> ResolvedRange {
    let Some(last) = length.checked_sub(1) else {
        return ResolvedRange::NotSatisfiable;
    };

    let bounds = match (from, to) {
        (Some(from), Some(to)) => Some((from, to)),
        (Some(from), None) => Some((from, last)),
        (None, Some(suffix)) => length.checked_sub(suffix).map(|from| (from, last)),
        (None, None) => None,
    };

    match bounds {
        Some((from, to)) if from <= to && to <= last => {
            if from == 0 && to == last {
                ResolvedRange::Whole
            } else {
                ResolvedRange::Partial { from, to }
            }
        }
        _ => ResolvedRange::NotSatisfiable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(from: Option<u64>, to: Option<u64>) -> RangeRequest {
        RangeRequest::Single { from, to }
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_range_header("bytes=0-4"), single(Some(0), Some(4)));
        assert_eq!(parse_range_header("bytes=6-"), single(Some(6), None));
        assert_eq!(parse_range_header("bytes=-5"), single(None, Some(5)));
        assert_eq!(parse_range_header(" Bytes = 1 - 2 "), single(Some(1), Some(2)));
    }

    #[test]
    fn test_parse_multiple() {
        assert_eq!(parse_range_header("bytes=0-1,3-4"), RangeRequest::Multiple);
        assert_eq!(parse_range_header("bytes=0-1, -2"), RangeRequest::Multiple);
    }

    #[test]
    fn test_parse_unreadable() {
        assert_eq!(parse_range_header("bytes=a-b"), single(None, None));
        assert_eq!(parse_range_header("bytes=5"), single(None, None));
        assert_eq!(parse_range_header("bytes=-"), single(None, None));
        assert_eq!(parse_range_header("bytes="), single(None, None));
    }

    #[test]
    fn test_parse_other_units_ignored() {
        assert_eq!(parse_range_header("items=0-4"), RangeRequest::Ignored);
        assert_eq!(parse_range_header("garbage"), RangeRequest::Ignored);
    }

    #[test]
    fn test_resolve_against_length() {
        assert_eq!(resolve_range(Some(0), Some(4), 11), ResolvedRange::Partial { from: 0, to: 4 });
        assert_eq!(resolve_range(Some(6), None, 11), ResolvedRange::Partial { from: 6, to: 10 });
        assert_eq!(resolve_range(None, Some(5), 11), ResolvedRange::Partial { from: 6, to: 10 });
        assert_eq!(resolve_range(Some(0), Some(10), 11), ResolvedRange::Whole);
        assert_eq!(resolve_range(None, Some(11), 11), ResolvedRange::Whole);
    }

    #[test]
    fn test_resolve_not_satisfiable() {
        assert_eq!(resolve_range(Some(0), Some(100), 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(Some(11), None, 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(Some(5), Some(4), 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(None, Some(12), 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(None, Some(0), 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(None, None, 11), ResolvedRange::NotSatisfiable);
        assert_eq!(resolve_range(Some(0), None, 0), ResolvedRange::NotSatisfiable);
    }

    #[test]
    fn test_content_range_values() {
        assert_eq!(ResolvedRange::Partial { from: 0, to: 4 }.content_range(11), "bytes 0-4/11");
        assert_eq!(ResolvedRange::NotSatisfiable.content_range(11), "bytes */11");
    }
}
