use crate::address::{self, DecodedAddress};
use crate::config::CacheConfig;

/// Upper bound on `sets * lines_per_set` for which every set and line can be
/// addressed without exceeding `isize::MAX` bytes.
pub const MAX_LINES: usize =
    isize::MAX as usize / (size_of::<CacheLine>() + size_of::<CacheSet>());

/// Classification of a single access against the current set occupancy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
    /// The least recently used line holding `evicted` was replaced.
    MissWithEviction { evicted: u64 },
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }

    pub fn is_eviction(&self) -> bool {
        matches!(self, AccessOutcome::MissWithEviction { .. })
    }
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessOutcome::Hit => f.write_str("hit"),
            AccessOutcome::Miss => f.write_str("miss"),
            AccessOutcome::MissWithEviction { .. } => f.write_str("miss eviction"),
        }
    }
}

/// Set-associative cache with a least-recently-used replacement policy.
///
/// Only occupancy and recency are tracked, never the cached bytes.
#[derive(Debug, Clone)]
pub struct LruCache {
    config: CacheConfig,
    set_mask: u64,
    sets: Vec<CacheSet>,
}

impl LruCache {
    pub fn new(config: CacheConfig) -> Self {
        log::debug!(
            "allocating {} sets x {} lines",
            config.sets(),
            config.lines_per_set()
        );

        Self {
            config,
            set_mask: (config.sets() - 1) as u64,
            sets: (0..config.sets())
                .map(|_| CacheSet::new(config.lines_per_set()))
                .collect(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn format_info(&self) -> String {
        let total_size = self
            .config
            .block_size()
            .and_then(|block_size| block_size.checked_mul(self.config.total_lines() as u64))
            .map_or_else(|| String::from(">= 2^64 B"), |size| format!("{size}B"));
        let line_size = self
            .config
            .block_size()
            .map_or_else(|| String::from("2^64 B"), |size| format!("{size}B"));

        [
            String::from("LRU Cache:"),
            format!("\tTotal Size: {total_size}"),
            format!("\tSets: {}", self.config.sets()),
            format!("\tWays: {}", self.config.lines_per_set()),
            format!("\tLine-Size: {line_size}"),
            format!(
                "\t| {} tag bits | {} set bits | {} offset bits |",
                self.config.tag_bits(),
                self.config.set_bits(),
                self.config.block_bits()
            ),
        ]
        .join("\n")
    }

    /// Empties every set.
    pub fn reset(&mut self) {
        self.sets.iter_mut().for_each(CacheSet::clear);
    }

    pub fn decode(&self, address: u64) -> DecodedAddress {
        address::decode(address, self.config.set_bits(), self.config.block_bits())
    }

    pub fn access(&mut self, address: u64) -> AccessOutcome {
        let DecodedAddress { tag, set_index, .. } = self.decode(address);
        self.classify(set_index, tag)
    }

    /// Looks `tag` up in set `set_index` and updates that set's recency order.
    ///
    /// Set indices wrap around the number of sets; addresses decoded with the
    /// cache's own geometry are always in range.
    pub fn classify(&mut self, set_index: u64, tag: u64) -> AccessOutcome {
        let slot = self.slot(set_index);
        let outcome = self.sets[slot].classify(tag);
        log::trace!("set {slot} tag {tag:#x}: {outcome}");
        outcome
    }

    pub fn contains(&self, set_index: u64, tag: u64) -> bool {
        self.sets[self.slot(set_index)].position(tag).is_some()
    }

    pub fn occupancy(&self, set_index: u64) -> usize {
        self.sets[self.slot(set_index)].occupied
    }

    /// Resident tags of a set, most recently used first.
    pub fn recency(&self, set_index: u64) -> Vec<u64> {
        self.sets[self.slot(set_index)].recency().collect()
    }

    fn slot(&self, set_index: u64) -> usize {
        (set_index & self.set_mask) as usize
    }
}

/// One set: a fixed arena of lines threaded by an intrusive recency list.
///
/// `head` is the most recently used line, `tail` the least recently used one.
/// Free lines are always `lines[occupied..]` and are not linked.
#[derive(Debug, Clone)]
struct CacheSet {
    lines: Box<[CacheLine]>,
    head: Option<usize>,
    tail: Option<usize>,
    occupied: usize,
}

#[derive(Debug, Copy, Clone, Default)]
struct CacheLine {
    valid: bool,
    tag: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

impl CacheSet {
    fn new(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways].into_boxed_slice(),
            head: None,
            tail: None,
            occupied: 0,
        }
    }

    fn clear(&mut self) {
        self.lines.fill(CacheLine::default());
        self.head = None;
        self.tail = None;
        self.occupied = 0;
    }

    fn position(&self, tag: u64) -> Option<usize> {
        self.lines[..self.occupied]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    fn classify(&mut self, tag: u64) -> AccessOutcome {
        if let Some(line_idx) = self.position(tag) {
            self.promote(line_idx);
            return AccessOutcome::Hit;
        }

        if self.occupied < self.lines.len() {
            let line_idx = self.occupied;
            self.occupied += 1;

            let line = &mut self.lines[line_idx];
            line.valid = true;
            line.tag = tag;
            self.push_front(line_idx);

            return AccessOutcome::Miss;
        }

        match self.tail {
            Some(lru_idx) => {
                let evicted = std::mem::replace(&mut self.lines[lru_idx].tag, tag);
                self.promote(lru_idx);
                AccessOutcome::MissWithEviction { evicted }
            }
            // a set without lines never holds anything
            None => AccessOutcome::Miss,
        }
    }

    fn promote(&mut self, line_idx: usize) {
        if self.head == Some(line_idx) {
            return;
        }
        self.unlink(line_idx);
        self.push_front(line_idx);
    }

    fn unlink(&mut self, line_idx: usize) {
        let CacheLine { prev, next, .. } = self.lines[line_idx];

        match prev {
            Some(prev_idx) => self.lines[prev_idx].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_idx) => self.lines[next_idx].prev = prev,
            None => self.tail = prev,
        }

        let line = &mut self.lines[line_idx];
        line.prev = None;
        line.next = None;
    }

    fn push_front(&mut self, line_idx: usize) {
        self.lines[line_idx].prev = None;
        self.lines[line_idx].next = self.head;

        match self.head {
            Some(head_idx) => self.lines[head_idx].prev = Some(line_idx),
            None => self.tail = Some(line_idx),
        }
        self.head = Some(line_idx);
    }

    fn recency(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(self.head, |&line_idx| self.lines[line_idx].next)
            .map(|line_idx| self.lines[line_idx].tag)
    }
}
