//! Iterative Heap's algorithm.
//!
//! [`Permutations`] keeps the working buffer and the counter stack as fields,
//! so it can be suspended between any two calls and resumed later. Each call
//! to [`Permutations::next_permutation`] costs amortised O(1).

#[derive(Clone, Debug)]
pub struct Permutations<T> {
    items: Vec<T>,
    counters: Vec<usize>,
    index: usize,
    produced: u64,
    exhausted: bool,
}

impl<T> Permutations<T> {
    pub fn new(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            items,
            counters: vec![0; len],
            index: 1,
            produced: 0,
            exhausted: false,
        }
    }

    /// Advances to the next ordering and returns a view of it.
    ///
    /// The first call yields the input order. The returned slice is the
    /// internal buffer and is overwritten by the following call. Returns
    /// `None` once all `len!` orderings have been produced.
    pub fn next_permutation(&mut self) -> Option<&[T]> {
        if self.exhausted {
            return None;
        }
        if self.produced == 0 {
            self.produced = 1;
            return Some(self.items.as_slice());
        }
        while self.index < self.items.len() {
            let i = self.index;
            if self.counters[i] < i {
                let j = if i % 2 == 0 { 0 } else { self.counters[i] };
                self.items.swap(j, i);
                self.counters[i] += 1;
                self.index = 1;
                self.produced += 1;
                return Some(self.items.as_slice());
            }
            self.counters[i] = 0;
            self.index += 1;
        }
        self.exhausted = true;
        None
    }

    /// The ordering returned by the last call, if any.
    pub fn current(&self) -> Option<&[T]> {
        if self.produced == 0 || self.exhausted {
            None
        } else {
            Some(self.items.as_slice())
        }
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `k!`, or `None` when it does not fit in a `u64`.
pub fn factorial(k: usize) -> Option<u64> {
    (1..=k as u64).try_fold(1u64, |acc, i| acc.checked_mul(i))
}
