use crate::lru::AccessOutcome;
use crate::trace::AccessRecord;

/// Hit, miss and eviction counters of one run. Evictions are a subset of misses.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
            AccessOutcome::MissWithEviction { .. } => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Number of cache accesses, a modify counts twice.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn percent_hit(&self) -> f64 {
        self.percent_of(self.hits)
    }

    pub fn percent_miss(&self) -> f64 {
        self.percent_of(self.misses)
    }

    fn percent_of(&self, count: u64) -> f64 {
        match self.accesses() {
            0 => 0.0,
            accesses => 100.0 * count as f64 / accesses as f64,
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }

    pub fn format_rates(&self) -> String {
        format!(
            "Percent Hits: {:.3}%, Percent Misses: {:.3}%",
            self.percent_hit(),
            self.percent_miss()
        )
    }
}

/// What the cache reported for one trace record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Single(AccessOutcome),
    Modify {
        load: AccessOutcome,
        store: AccessOutcome,
    },
    /// The operation is not simulated.
    Ignored,
}

impl Step {
    pub fn outcomes(&self) -> impl Iterator<Item = AccessOutcome> {
        let outcomes = match *self {
            Step::Single(outcome) => [Some(outcome), None],
            Step::Modify { load, store } => [Some(load), Some(store)],
            Step::Ignored => [None, None],
        };
        outcomes.into_iter().flatten()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Single(outcome) => f.write_fmt(format_args!("{outcome}")),
            Step::Modify { load, store } => f.write_fmt(format_args!("{load} {store}")),
            Step::Ignored => Ok(()),
        }
    }
}

/// Statistics plus the per-record outcomes, for verbose output.
#[derive(Debug, Default)]
pub struct SimulationResult {
    pub stats: Statistics,
    pub steps: Vec<(AccessRecord, Step)>,
}

impl SimulationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AccessRecord, step: Step) {
        step.outcomes()
            .for_each(|outcome| self.stats.record(outcome));
        self.steps.push((record, step));
    }

    /// One `<op> <address>,<size> <outcomes>` line per simulated record.
    pub fn format_trace(&self) -> String {
        self.steps
            .iter()
            .filter(|(_, step)| *step != Step::Ignored)
            .map(|(record, step)| format!("{record} {step}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_summary(&self) -> String {
        self.stats.format_summary()
    }

    /// Per-record lines followed by the summary line.
    pub fn format_report(&self) -> String {
        let trace = self.format_trace();
        if trace.is_empty() {
            self.format_summary()
        } else {
            format!("{trace}\n{}", self.format_summary())
        }
    }
}
