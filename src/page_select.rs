use crate::error::{OpError, Result};

/// What to do with a term that cannot be parsed or names a page outside
/// `1..=page_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    /// Silently drop the offending term.
    Lenient,
    /// Fail the whole resolution.
    Strict,
}

/// Whether the resolved set keeps the caller's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Deduplicate and sort ascending.
    Sorted,
    /// Preserve the expression's order exactly; duplicates and omissions are
    /// both legal (the result need not be a permutation).
    AsGiven,
}

/// Resolution policy, passed explicitly by every call site. The operations of
/// this crate disagree on the right behavior, so there is deliberately no
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub bounds: Bounds,
    pub order: Order,
}

impl Policy {
    /// Used by delete, extract, rotate, watermark, and add-image.
    pub const LENIENT_SORTED: Policy = Policy {
        bounds: Bounds::Lenient,
        order: Order::Sorted,
    };

    /// Used by reorder: a bad term fails the whole operation, and the
    /// caller's ordering is authoritative.
    pub const STRICT_AS_GIVEN: Policy = Policy {
        bounds: Bounds::Strict,
        order: Order::AsGiven,
    };
}

/// Resolve a page-selection expression like "1-5,8" or "all" into zero-based
/// page indices against a known page count.
///
/// Grammar:
/// ```text
/// expression := "all" | term (sep term)*
/// sep        := "," | ";" | whitespace
/// term       := INTEGER | INTEGER "-" INTEGER
/// ```
///
/// Page numbers in the expression are 1-based. A reversed range ("5-2")
/// yields nothing rather than being swapped. An empty expression resolves to
/// an empty set; callers that need at least one page check for that
/// themselves.
pub fn resolve(expression: &str, page_count: usize, policy: Policy) -> Result<Vec<usize>> {
    let expression = expression.trim();

    if expression.eq_ignore_ascii_case("all") {
        // "all" against an empty document is an empty set, not an error.
        return Ok((0..page_count).collect());
    }

    let mut pages = Vec::new();

    for term in expression.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        match parse_term(term) {
            Some(Term::Range(start, end)) => {
                // A reversed range yields nothing in either mode.
                if start > end {
                    continue;
                }
                match policy.bounds {
                    Bounds::Lenient => {
                        // Clamp instead of enumerating out-of-range numbers.
                        let lo = start.max(1);
                        let hi = end.min(page_count as i64);
                        for n in lo..=hi {
                            pages.push((n - 1) as usize);
                        }
                    }
                    Bounds::Strict => {
                        if start < 1 || end > page_count as i64 {
                            return Err(invalid(term, page_count));
                        }
                        for n in start..=end {
                            pages.push((n - 1) as usize);
                        }
                    }
                }
            }
            Some(Term::Single(n)) => {
                if n >= 1 && n <= page_count as i64 {
                    pages.push((n - 1) as usize);
                } else if policy.bounds == Bounds::Strict {
                    return Err(invalid(term, page_count));
                }
            }
            None => {
                if policy.bounds == Bounds::Strict {
                    return Err(invalid(term, page_count));
                }
            }
        }
    }

    if policy.order == Order::Sorted {
        pages.sort_unstable();
        pages.dedup();
    }

    Ok(pages)
}

enum Term {
    Single(i64),
    Range(i64, i64),
}

fn parse_term(term: &str) -> Option<Term> {
    if let Some((start, end)) = term.split_once('-') {
        if let (Ok(start), Ok(end)) = (start.trim().parse(), end.trim().parse()) {
            return Some(Term::Range(start, end));
        }
    }
    // Not a well-formed range; the whole term must be a single integer.
    // (This also rejects negative numbers: "-5" falls through to here and
    // parses to -5, which every bounds check then refuses.)
    term.parse().ok().map(Term::Single)
}

fn invalid(term: &str, page_count: usize) -> OpError {
    OpError::InvalidPageSelection {
        term: term.to_string(),
        page_count,
    }
}
