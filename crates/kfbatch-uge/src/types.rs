//! UGE job state codes.

/// UGE job state string, e.g. "r", "qw", "hqw", "Eqw", "dr".
///
/// States are letter combinations, so one job can be both queued and in
/// error ("Eqw").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UgeJobState<'a>(pub &'a str);

impl UgeJobState<'_> {
    /// r - running (also matches "dr", "Rr", ...)
    pub fn is_running(&self) -> bool {
        self.0.contains('r')
    }

    /// qw - queued and waiting
    pub fn is_queued(&self) -> bool {
        self.0.contains("qw")
    }

    /// E - error
    pub fn is_error(&self) -> bool {
        self.0.contains('E')
    }
}
