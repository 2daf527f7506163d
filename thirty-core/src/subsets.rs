//! k-subset enumeration over a small index set, as bitmasks.

/// Largest index set supported (one bit per index in a `u8`).
pub const MAX_SET: usize = 8;

/// Iterator over all k-subsets of `0..n`, in ascending lexicographic order of
/// their sorted index tuples: `{0,1}, {0,2}, .., {0,n-1}, {1,2}, ..`.
///
/// Each subset is yielded as a mask with bit `i` set for index `i`.
#[derive(Debug, Clone)]
pub struct KSubsets {
    n: usize,
    k: usize,
    idx: [usize; MAX_SET],
    done: bool,
}

impl KSubsets {
    /// # Panics
    /// Panics if `n > MAX_SET`.
    pub fn new(n: usize, k: usize) -> Self {
        assert!(n <= MAX_SET, "index set too large: {}", n);
        let mut idx = [0usize; MAX_SET];
        for (i, slot) in idx.iter_mut().enumerate().take(k) {
            *slot = i;
        }
        Self {
            n,
            k,
            idx,
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for KSubsets {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.done {
            return None;
        }
        let mask = self.idx[..self.k]
            .iter()
            .fold(0u8, |m, &i| m | (1u8 << i));

        // Advance the rightmost index that still has room, then reset the tail.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.idx[i] < self.n - self.k + i {
                self.idx[i] += 1;
                for j in (i + 1)..self.k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
                break;
            }
        }
        Some(mask)
    }
}

/// Indices of the set bits of `mask`, ascending.
pub fn mask_indices(mask: u8) -> impl Iterator<Item = usize> {
    (0..MAX_SET).filter(move |&i| mask & (1u8 << i) != 0)
}
