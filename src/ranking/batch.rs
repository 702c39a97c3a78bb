use std::ops::Range;

/// Splits `0..total` into consecutive ranges of at most `batch_size` roles,
/// in increasing order.
#[derive(Debug, Clone)]
pub struct RoleBatches {
    next: usize,
    total: usize,
    batch_size: usize,
}

impl RoleBatches {
    /// `batch_size` of zero is treated as one.
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            next: 0,
            total,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }
}

impl Iterator for RoleBatches {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let start = self.next;
        let end = (start + self.batch_size).min(self.total);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next.min(self.total)).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RoleBatches {}
