//! Filter-rule boundary.
//!
//! The matching engine itself lives outside this crate; the handshake
//! only registers at most one rule here, excluding the partial-transfer
//! directory from normal matching.

use bitflags::bitflags;

bitflags! {
    /// Modifiers attached to a filter rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RuleFlags: u32 {
        /// Pattern is taken as-is, never with include/exclude prefixes.
        const NO_PREFIXES = 1 << 0;
        /// Rule matches directories only.
        const DIRECTORY = 1 << 1;
        /// Rule may be dropped when pruning directories that would
        /// otherwise stay empty.
        const PERISHABLE = 1 << 2;
    }
}

/// One exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub pattern: String,
    pub flags: RuleFlags,
}

/// Ordered rule list shared with the matching engine.
#[derive(Debug, Default)]
pub struct FilterList {
    rules: Vec<FilterRule>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rule.
    pub fn add_rule(&mut self, pattern: impl Into<String>, flags: RuleFlags) {
        self.rules.push(FilterRule {
            pattern: pattern.into(),
            flags,
        });
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
