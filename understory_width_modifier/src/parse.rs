// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breakpoint declaration parsing.
//!
//! A declaration is a comma-separated list of rules. Each rule is a class name
//! optionally followed by a minimum and a maximum width, separated by
//! whitespace:
//!
//! ```text
//! narrow 0 400, medium 400 800, wide 800
//! ```
//!
//! Runs of whitespace are collapsed. A missing minimum is `0`, a missing
//! maximum is unbounded. Parsing never fails: empty fragments are skipped and
//! unreadable widths fall back to their defaults.

/// One `class [min [max]]` rule from a breakpoint declaration.
///
/// The rule matches the half-open width range `min..max`: the minimum is
/// inclusive and the maximum exclusive, so adjacent rules such as
/// `a 0 200, b 200 400` never both match a single width.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Breakpoint<'a> {
    /// The class toggled by this rule. Never empty.
    pub class: &'a str,
    /// Inclusive lower bound, in CSS pixels. Never negative.
    pub min: f64,
    /// Exclusive upper bound, in CSS pixels. [`Breakpoint::UNBOUNDED`] when omitted.
    pub max: f64,
}

impl Breakpoint<'_> {
    /// The upper bound used when a rule does not declare one.
    pub const UNBOUNDED: f64 = f64::INFINITY;

    /// Returns `true` if `width` lies in `min..max`.
    ///
    /// A rule whose minimum is not below its maximum matches nothing.
    #[must_use]
    pub fn contains(&self, width: f64) -> bool {
        self.min <= width && width < self.max
    }
}

/// Parses a breakpoint declaration into its rules, in declaration order.
///
/// # Example
///
/// ```
/// use understory_width_modifier::{Breakpoint, parse_breakpoints};
///
/// let rules: Vec<_> = parse_breakpoints(" small 0 400 ,  large   400").collect();
/// assert_eq!(
///     rules,
///     [
///         Breakpoint { class: "small", min: 0.0, max: 400.0 },
///         Breakpoint { class: "large", min: 400.0, max: Breakpoint::UNBOUNDED },
///     ]
/// );
/// ```
pub fn parse_breakpoints(declaration: &str) -> Breakpoints<'_> {
    Breakpoints {
        rules: declaration.split(','),
    }
}

/// Iterator over the rules of a declaration, returned by [`parse_breakpoints`].
///
/// Rules borrow their class names from the declaration; nothing is allocated.
#[derive(Clone, Debug)]
pub struct Breakpoints<'a> {
    rules: core::str::Split<'a, char>,
}

impl<'a> Iterator for Breakpoints<'a> {
    type Item = Breakpoint<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rule = self.rules.next()?;
            let mut fields = rule.split_whitespace();
            let Some(class) = fields.next() else {
                continue;
            };
            let min = fields
                .next()
                .and_then(parse_length)
                .map_or(0.0, |min| min.max(0.0));
            let max = fields
                .next()
                .and_then(parse_length)
                .unwrap_or(Breakpoint::UNBOUNDED);
            return Some(Breakpoint { class, min, max });
        }
    }
}

/// Reads the leading number of a width field, ignoring any trailing unit.
///
/// `"250"`, `"250px"` and `"2.5e2px"` all read as `250.0`. Returns `None` when
/// the field does not start with a number.
#[must_use]
pub fn parse_length(field: &str) -> Option<f64> {
    let bytes = field.as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_start = end;
    end = digits_from(end);
    let mut has_digits = end > integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        if fraction_end > end + 1 {
            has_digits = true;
            end = fraction_end;
        }
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = digits_from(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    field[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn rules(declaration: &str) -> Vec<Breakpoint<'_>> {
        parse_breakpoints(declaration).collect()
    }

    #[test]
    fn full_rules_keep_declaration_order() {
        assert_eq!(
            rules("foo 0 200, bar 200 500, baz 500"),
            [
                Breakpoint {
                    class: "foo",
                    min: 0.0,
                    max: 200.0
                },
                Breakpoint {
                    class: "bar",
                    min: 200.0,
                    max: 500.0
                },
                Breakpoint {
                    class: "baz",
                    min: 500.0,
                    max: Breakpoint::UNBOUNDED
                },
            ]
        );
    }

    #[test]
    fn bare_class_defaults_to_everything() {
        let parsed = rules("always");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].min, 0.0);
        assert_eq!(parsed[0].max, Breakpoint::UNBOUNDED);
        assert!(parsed[0].contains(0.0));
        assert!(parsed[0].contains(1.0e9));
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(
            rules("\n  a \t 10    20 ,\n b  30  "),
            [
                Breakpoint {
                    class: "a",
                    min: 10.0,
                    max: 20.0
                },
                Breakpoint {
                    class: "b",
                    min: 30.0,
                    max: Breakpoint::UNBOUNDED
                },
            ]
        );
    }

    #[test]
    fn empty_declarations_yield_nothing() {
        assert!(rules("").is_empty());
        assert!(rules("   ").is_empty());
        assert!(rules(" , ,, ").is_empty());
    }

    #[test]
    fn empty_fragments_are_skipped() {
        let parsed = rules("a 0 100, , b 100");
        let classes: Vec<_> = parsed.iter().map(|rule| rule.class).collect();
        assert_eq!(classes, ["a", "b"]);
    }

    #[test]
    fn unreadable_widths_fall_back_to_defaults() {
        let parsed = rules("a wide 300, b 100 huge");
        assert_eq!(parsed[0].min, 0.0);
        assert_eq!(parsed[0].max, 300.0);
        assert_eq!(parsed[1].min, 100.0);
        assert_eq!(parsed[1].max, Breakpoint::UNBOUNDED);
    }

    #[test]
    fn extra_fields_are_ignored() {
        assert_eq!(
            rules("a 1 2 3 4"),
            [Breakpoint {
                class: "a",
                min: 1.0,
                max: 2.0
            }]
        );
    }

    #[test]
    fn negative_minimum_clamps_to_zero() {
        assert_eq!(rules("a -50 10")[0].min, 0.0);
    }

    #[test]
    fn range_is_half_open() {
        let rule = Breakpoint {
            class: "bar",
            min: 200.0,
            max: 500.0,
        };
        assert!(rule.contains(200.0));
        assert!(rule.contains(499.9));
        assert!(!rule.contains(500.0));
        assert!(!rule.contains(199.9));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let rule = rules("odd 500 100")[0];
        assert!(!rule.contains(50.0));
        assert!(!rule.contains(300.0));
        assert!(!rule.contains(600.0));
    }

    #[test]
    fn lengths_read_leading_numbers() {
        assert_eq!(parse_length("250"), Some(250.0));
        assert_eq!(parse_length("250px"), Some(250.0));
        assert_eq!(parse_length("12.5px"), Some(12.5));
        assert_eq!(parse_length(".5"), Some(0.5));
        assert_eq!(parse_length("3."), Some(3.0));
        assert_eq!(parse_length("2.5e2px"), Some(250.0));
        assert_eq!(parse_length("1em"), Some(1.0));
        assert_eq!(parse_length("+7"), Some(7.0));
        assert_eq!(parse_length("-7"), Some(-7.0));
    }

    #[test]
    fn lengths_without_digits_are_rejected() {
        assert_eq!(parse_length(""), None);
        assert_eq!(parse_length("px"), None);
        assert_eq!(parse_length("-"), None);
        assert_eq!(parse_length("."), None);
        assert_eq!(parse_length("var(--x)"), None);
        assert_eq!(parse_length("NaN"), None);
    }
}
