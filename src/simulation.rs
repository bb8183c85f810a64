use crate::address::DecodedAddress;
use crate::lru::LruCache;
use crate::simulation_result::{SimulationResult, Statistics, Step};
use crate::trace::{AccessRecord, Operation, TraceFile};

/// Replays access records against a cache, strictly in trace order.
#[derive(Debug)]
pub struct Simulation;

impl Simulation {
    /// Feeds one record to the cache.
    ///
    /// Loads and stores are a single access. A modify is a load followed by a
    /// store to the same block, so its second access always hits. Any other
    /// operation (e.g. valgrind's instruction fetches) leaves the cache and the
    /// counters untouched.
    pub fn step(lru_cache: &mut LruCache, record: &AccessRecord) -> Step {
        let DecodedAddress { tag, set_index, .. } = lru_cache.decode(record.address);

        match record.operation {
            Operation::Load | Operation::Store => {
                Step::Single(lru_cache.classify(set_index, tag))
            }
            Operation::Modify => {
                let load = lru_cache.classify(set_index, tag);
                let store = lru_cache.classify(set_index, tag);
                debug_assert!(store.is_hit());
                Step::Modify { load, store }
            }
            Operation::Other(letter) => {
                log::trace!("ignoring operation '{letter}' at {:#x}", record.address);
                Step::Ignored
            }
        }
    }

    pub fn run<'a>(
        lru_cache: &mut LruCache,
        records: impl IntoIterator<Item = &'a AccessRecord>,
    ) -> Statistics {
        records
            .into_iter()
            .fold(Statistics::new(), |mut stats, record| {
                Self::step(lru_cache, record)
                    .outcomes()
                    .for_each(|outcome| stats.record(outcome));
                stats
            })
    }

    /// Like [`Simulation::run`], but keeps the outcome of every record.
    pub fn run_traced<'a>(
        lru_cache: &mut LruCache,
        records: impl IntoIterator<Item = &'a AccessRecord>,
    ) -> SimulationResult {
        records
            .into_iter()
            .fold(SimulationResult::new(), |mut simulation_result, record| {
                let step = Self::step(lru_cache, record);
                simulation_result.push(*record, step);
                simulation_result
            })
    }

    /// Runs a parsed trace and renders the cache geometry, the skipped lines,
    /// the per-record outcomes and the summary, in that order.
    pub fn report(lru_cache: &mut LruCache, trace_file: &TraceFile) -> String {
        let mut report = vec![lru_cache.format_info()];
        report.extend(trace_file.format_rejected());
        report.push(Self::run_traced(lru_cache, trace_file).format_report());

        report.join("\n")
    }
}
