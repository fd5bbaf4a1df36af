//! Fixed-capacity circular particle pool.

/// Ring buffer of reusable slots.
///
/// Live entries occupy the circular range `first_active..first_free`. The
/// two cursors being equal means the pool is empty, so at most
/// `capacity - 1` entries are live; spawning into a full pool reclaims the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct ParticlePool<T> {
    slots: Vec<T>,
    first_active: usize,
    first_free: usize,
}

impl<T: Default + Clone> ParticlePool<T> {
    /// Allocate all slots up front. Capacities below two are raised to two.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(2)],
            first_active: 0,
            first_free: 0,
        }
    }
}

impl<T> ParticlePool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let cap = self.capacity();
        (self.first_free + cap - self.first_active) % cap
    }

    pub fn is_empty(&self) -> bool {
        self.first_active == self.first_free
    }

    /// `(first_active, first_free)`.
    pub fn cursors(&self) -> (usize, usize) {
        (self.first_active, self.first_free)
    }

    /// Claim the free slot for a new entry, evicting the oldest when full.
    pub fn spawn(&mut self) -> &mut T {
        let cap = self.capacity();
        let slot = self.first_free;
        self.first_free = (self.first_free + 1) % cap;
        if self.first_free == self.first_active {
            self.first_active = (self.first_active + 1) % cap;
        }
        &mut self.slots[slot]
    }

    /// Drop entries from the old end while `dead` holds.
    pub fn retire_while(&mut self, mut dead: impl FnMut(&T) -> bool) {
        let cap = self.capacity();
        while self.first_active != self.first_free && dead(&self.slots[self.first_active]) {
            self.first_active = (self.first_active + 1) % cap;
        }
    }

    /// Live entries as `[first_active, end)` and `[0, first_free)` when wrapped.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        if self.first_active <= self.first_free {
            (&self.slots[self.first_active..self.first_free], &[])
        } else {
            (&self.slots[self.first_active..], &self.slots[..self.first_free])
        }
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        if self.first_active <= self.first_free {
            (&mut self.slots[self.first_active..self.first_free], &mut [])
        } else {
            let (head, tail) = self.slots.split_at_mut(self.first_active);
            (tail, &mut head[..self.first_free])
        }
    }

    /// Live entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (older, newer) = self.as_slices();
        older.iter().chain(newer)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        let (older, newer) = self.as_mut_slices();
        older.iter_mut().chain(newer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(pool: &mut ParticlePool<u32>, values: impl IntoIterator<Item = u32>) {
        for v in values {
            *pool.spawn() = v;
        }
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool: ParticlePool<u32> = ParticlePool::new(4);
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.iter().count(), 0);
        assert_eq!(ParticlePool::<u32>::new(0).capacity(), 2);
    }

    #[test]
    fn test_full_pool_evicts_oldest() {
        let mut pool = ParticlePool::new(4);
        fill(&mut pool, 1..=3);
        assert_eq!(pool.len(), 3);
        fill(&mut pool, [4]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_wrapped_traversal_is_oldest_first() {
        let mut pool = ParticlePool::new(4);
        fill(&mut pool, 1..=5);
        let (active, free) = pool.cursors();
        assert!(free < active);
        let (older, newer) = pool.as_slices();
        assert_eq!(older, &[3, 4]);
        assert_eq!(newer, &[5]);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_iter_mut_touches_wrapped_entries() {
        let mut pool = ParticlePool::new(4);
        fill(&mut pool, 1..=5);
        for v in pool.iter_mut() {
            *v *= 10;
        }
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![30, 40, 50]);
    }

    #[test]
    fn test_retire_stops_at_first_survivor() {
        let mut pool = ParticlePool::new(8);
        fill(&mut pool, [1, 2, 9, 3]);
        pool.retire_while(|&v| v < 5);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![9, 3]);
        pool.retire_while(|_| true);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_len_never_reaches_capacity() {
        let mut pool = ParticlePool::new(16);
        for v in 0..100 {
            *pool.spawn() = v;
            assert!(pool.len() < pool.capacity());
        }
    }
}
