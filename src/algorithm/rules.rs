//! Ordered rule cascades
//!
//! A cascade is an explicit list of named rules evaluated top to bottom.
//! The first rule that produces an output wins; callers supply the
//! default for when none does.

use std::fmt;

type RuleFn<I, O> = Box<dyn Fn(&I) -> Option<O> + Send + Sync>;

/// A named rule: returns `Some` when it applies to the input
pub struct Rule<I: ?Sized, O> {
    /// Rule name, reported alongside the output
    pub name: &'static str,
    apply: RuleFn<I, O>,
}

impl<I: ?Sized, O> Rule<I, O> {
    /// Create a rule that computes its output
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&I) -> Option<O> + Send + Sync + 'static,
    {
        Self {
            name,
            apply: Box::new(apply),
        }
    }
}

impl<I: ?Sized, O: Clone + Send + Sync + 'static> Rule<I, O> {
    /// Create a rule that yields a fixed output whenever its predicate holds
    pub fn when<P>(name: &'static str, predicate: P, output: O) -> Self
    where
        P: Fn(&I) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |input| predicate(input).then(|| output.clone()))
    }
}

impl<I: ?Sized, O> fmt::Debug for Rule<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// First-match-wins list of rules
pub struct RuleCascade<I: ?Sized, O> {
    rules: Vec<Rule<I, O>>,
}

impl<I: ?Sized, O> fmt::Debug for RuleCascade<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl<I: ?Sized, O> RuleCascade<I, O> {
    /// Create a cascade; rule order is precedence order
    #[must_use]
    pub fn new(rules: Vec<Rule<I, O>>) -> Self {
        Self { rules }
    }

    /// Evaluate the rules in order, returning the first match and its rule name
    pub fn evaluate(&self, input: &I) -> Option<(&'static str, O)> {
        self.rules
            .iter()
            .find_map(|rule| (rule.apply)(input).map(|output| (rule.name, output)))
    }

    /// Names of the rules in precedence order
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }
}
