/// Knobs for provenance lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// When a token's translated span does not match exactly, scan backwards
    /// for the nearest token of the same kind instead of giving up.
    pub approximate_tokens: bool,
    /// Upper bound on the tokens visited by that scan. `None` scans up to the
    /// start of the pre-transformation anchor.
    pub token_scan_limit: Option<usize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { approximate_tokens: true, token_scan_limit: None }
    }
}

impl TrackerConfig {
    /// Only exact span matches count.
    pub fn exact() -> Self {
        Self { approximate_tokens: false, ..Self::default() }
    }

    pub(crate) fn scan_limit(&self) -> usize {
        self.token_scan_limit.unwrap_or(usize::MAX)
    }
}
