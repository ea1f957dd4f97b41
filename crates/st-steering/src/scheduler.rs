//! Rotating evaluation buckets.
//!
//! Each agent lives in exactly one of `N` buckets; each tick evaluates one
//! bucket and then advances to the next, so every agent is evaluated once
//! per `N` ticks.  New agents join the emptiest bucket.

/// Bucket occupancy and the rotating cursor.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    sizes:  Vec<usize>,
    active: usize,
}

impl TickScheduler {
    /// `bucket_count` is clamped to at least one bucket.
    pub fn new(bucket_count: usize) -> Self {
        Self { sizes: vec![0; bucket_count.max(1)], active: 0 }
    }

    pub fn bucket_count(&self) -> usize {
        self.sizes.len()
    }

    /// The bucket evaluated by the next tick.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The bucket with the fewest agents; ties go to the lowest index.
    pub fn least_loaded(&self) -> usize {
        self.sizes
            .iter()
            .enumerate()
            .min_by_key(|&(i, &n)| (n, i))
            .map_or(0, |(i, _)| i)
    }

    pub fn add(&mut self, bucket: usize) {
        self.sizes[bucket] += 1;
    }

    pub fn remove(&mut self, bucket: usize) {
        self.sizes[bucket] = self.sizes[bucket].saturating_sub(1);
    }

    pub fn advance(&mut self) {
        self.active = (self.active + 1) % self.sizes.len();
    }

    /// Each agent is evaluated once per `N` ticks, so per-agent timers are
    /// charged for all of them.  This scales by the bucket count, not by how
    /// many agents happen to share the active bucket.
    #[inline]
    pub fn effective_elapsed(&self, elapsed: f32) -> f32 {
        elapsed * self.sizes.len() as f32
    }
}
