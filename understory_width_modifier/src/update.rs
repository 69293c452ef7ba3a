// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying breakpoints to a class list.

use crate::parse::parse_breakpoints;

/// The mutable class list of one element.
pub trait ClassList {
    /// Returns `true` if the list contains `class`.
    fn contains(&self, class: &str) -> bool;
    /// Adds `class`. Only called when it is absent.
    fn add(&mut self, class: &str);
    /// Removes `class`. Only called when it is present.
    fn remove(&mut self, class: &str);
}

/// Number of classes added and removed by [`apply_breakpoints`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassChanges {
    /// Classes added.
    pub added: usize,
    /// Classes removed.
    pub removed: usize,
}

impl ClassChanges {
    /// Returns `true` if the class list was left untouched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Brings `classes` in line with `declaration` at content width `width`.
///
/// Every rule is evaluated independently, in declaration order: its class is
/// present afterwards iff `min <= width < max`. Overlapping ranges therefore
/// leave several classes applied at once. When two rules name the same class,
/// the later one decides.
///
/// Classes are only touched when their presence must change, so applying the
/// same width twice changes nothing the second time.
///
/// ```
/// use understory_width_modifier::{ClassList, apply_breakpoints};
///
/// #[derive(Default)]
/// struct Classes(Vec<String>);
///
/// impl ClassList for Classes {
///     fn contains(&self, class: &str) -> bool {
///         self.0.iter().any(|c| c == class)
///     }
///     fn add(&mut self, class: &str) {
///         self.0.push(class.into());
///     }
///     fn remove(&mut self, class: &str) {
///         self.0.retain(|c| c != class);
///     }
/// }
///
/// let mut classes = Classes::default();
/// apply_breakpoints(&mut classes, "foo 0 200, bar 200 500, baz 500", 250.0);
/// assert_eq!(classes.0, ["bar"]);
/// ```
pub fn apply_breakpoints<C>(classes: &mut C, declaration: &str, width: f64) -> ClassChanges
where
    C: ClassList + ?Sized,
{
    let mut changes = ClassChanges::default();
    for rule in parse_breakpoints(declaration) {
        let present = classes.contains(rule.class);
        if rule.contains(width) {
            if !present {
                classes.add(rule.class);
                changes.added += 1;
            }
        } else if present {
            classes.remove(rule.class);
            changes.removed += 1;
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Classes(Vec<String>);

    impl ClassList for Classes {
        fn contains(&self, class: &str) -> bool {
            self.0.iter().any(|c| c == class)
        }

        fn add(&mut self, class: &str) {
            self.0.push(class.into());
        }

        fn remove(&mut self, class: &str) {
            self.0.retain(|c| c != class);
        }
    }

    impl Classes {
        fn with(classes: &[&str]) -> Self {
            Self(classes.iter().map(|&c| c.into()).collect())
        }

        fn sorted(&self) -> Vec<&str> {
            let mut out: Vec<_> = self.0.iter().map(String::as_str).collect();
            out.sort_unstable();
            out
        }
    }

    const STEPS: &str = "foo 0 200, bar 200 500, baz 500";

    #[test]
    fn picks_the_matching_range() {
        let mut classes = Classes::default();
        let changes = apply_breakpoints(&mut classes, STEPS, 250.0);
        assert_eq!(classes.sorted(), ["bar"]);
        assert_eq!(
            changes,
            ClassChanges {
                added: 1,
                removed: 0
            }
        );
    }

    #[test]
    fn boundaries_are_half_open() {
        let mut classes = Classes::default();
        apply_breakpoints(&mut classes, STEPS, 200.0);
        assert_eq!(classes.sorted(), ["bar"]);

        apply_breakpoints(&mut classes, STEPS, 199.999);
        assert_eq!(classes.sorted(), ["foo"]);

        apply_breakpoints(&mut classes, STEPS, 500.0);
        assert_eq!(classes.sorted(), ["baz"]);

        apply_breakpoints(&mut classes, STEPS, 0.0);
        assert_eq!(classes.sorted(), ["foo"]);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let mut classes = Classes::default();
        apply_breakpoints(&mut classes, STEPS, 600.0);
        let again = apply_breakpoints(&mut classes, STEPS, 600.0);
        assert!(again.is_empty());
        assert_eq!(classes.0, ["baz"]);
    }

    #[test]
    fn overlapping_ranges_accumulate() {
        let mut classes = Classes::default();
        apply_breakpoints(&mut classes, "a 0 1000, b 500 1500", 700.0);
        assert_eq!(classes.sorted(), ["a", "b"]);

        apply_breakpoints(&mut classes, "a 0 1000, b 500 1500", 1200.0);
        assert_eq!(classes.sorted(), ["b"]);
    }

    #[test]
    fn unrelated_classes_are_untouched() {
        let mut classes = Classes::with(&["card", "foo"]);
        let changes = apply_breakpoints(&mut classes, STEPS, 300.0);
        assert_eq!(classes.sorted(), ["bar", "card"]);
        assert_eq!(
            changes,
            ClassChanges {
                added: 1,
                removed: 1
            }
        );
    }

    #[test]
    fn malformed_fragments_do_not_block_others() {
        let mut classes = Classes::default();
        apply_breakpoints(&mut classes, "small 0 400, , large nope 9000px", 450.0);
        assert_eq!(classes.sorted(), ["large"]);
    }

    #[test]
    fn empty_declaration_changes_nothing() {
        let mut classes = Classes::with(&["foo"]);
        assert!(apply_breakpoints(&mut classes, "", 100.0).is_empty());
        assert_eq!(classes.0, ["foo"]);
    }

    #[test]
    fn later_duplicate_rule_wins() {
        let mut classes = Classes::default();
        apply_breakpoints(&mut classes, "x 0 100, x 100", 50.0);
        assert!(classes.0.is_empty());
        apply_breakpoints(&mut classes, "x 0 100, x 100", 150.0);
        assert_eq!(classes.0, ["x"]);
    }
}
