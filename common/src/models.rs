/// Outcome of a single pipeline run.
///
/// `new_ips` and `new_domains` are the headline counts. The remaining fields
/// describe work that was absorbed instead of failing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Queries that survived history filtering and were searched (or queued).
    pub queries: usize,
    pub new_ips: usize,
    pub new_domains: usize,
    /// Search calls that failed.
    pub failed_searches: usize,
    /// Reverse lookups that failed.
    pub failed_lookups: usize,
    /// Units of work whose discoveries could not be appended to disk.
    pub unpersisted: usize,
    /// The run was interrupted before all work was launched.
    pub cancelled: bool,
}

impl Summary {
    pub fn found_nothing(&self) -> bool {
        self.new_ips == 0 && self.new_domains == 0
    }

    pub fn had_failures(&self) -> bool {
        self.failed_searches > 0 || self.failed_lookups > 0 || self.unpersisted > 0
    }
}
