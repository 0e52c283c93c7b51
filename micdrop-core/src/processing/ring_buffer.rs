/// Fixed-capacity circular buffer bridging a device callback and the capture loop.
///
/// Not synchronized; wrap in `Arc<parking_lot::Mutex<RingBuffer<_>>>` for
/// cross-thread access.
///
/// Overflow behavior: drops the oldest samples and counts them in `overruns()`.
#[derive(Debug)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    write_index: usize,
    read_index: usize,
    available: usize,
    overruns: u64,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![T::default(); capacity.max(1)],
            write_index: 0,
            read_index: 0,
            available: 0,
            overruns: 0,
        }
    }

    /// Write samples into the ring buffer.
    ///
    /// If the buffer overflows, the oldest samples are dropped.
    /// If `samples` is larger than capacity, only the last `capacity` samples are kept.
    pub fn write(&mut self, samples: &[T]) {
        let capacity = self.capacity();
        let skipped = samples.len().saturating_sub(capacity);
        let samples = &samples[skipped..];
        if samples.is_empty() {
            return;
        }

        let overflow = (self.available + samples.len()).saturating_sub(capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % capacity;
            self.available -= overflow;
        }
        self.overruns += (skipped + overflow) as u64;

        let first = samples.len().min(capacity - self.write_index);
        self.buffer[self.write_index..self.write_index + first].copy_from_slice(&samples[..first]);
        self.buffer[..samples.len() - first].copy_from_slice(&samples[first..]);
        self.write_index = (self.write_index + samples.len()) % capacity;
        self.available += samples.len();
    }

    /// Read and remove up to `count` samples from the buffer.
    ///
    /// Returns fewer samples if fewer are available.
    pub fn read(&mut self, count: usize) -> Vec<T> {
        let to_read = count.min(self.available);
        let capacity = self.capacity();

        let mut result = Vec::with_capacity(to_read);
        for i in 0..to_read {
            result.push(self.buffer[(self.read_index + i) % capacity]);
        }
        self.read_index = (self.read_index + to_read) % capacity;
        self.available -= to_read;
        result
    }

    /// Number of samples currently available for reading.
    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Samples lost to overflow since creation or the last reset.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
        self.overruns = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_chunks_regroup_into_blocks() {
        // Host delivers 3-sample chunks; the reader wants 4-sample blocks.
        let mut ring = RingBuffer::<i16>::new(16);
        ring.write(&[1, 2, 3]);
        ring.write(&[4, 5, 6]);

        assert_eq!(ring.read(4), vec![1, 2, 3, 4]);
        assert_eq!(ring.count(), 2);

        ring.write(&[7, 8]);
        assert_eq!(ring.read(4), vec![5, 6, 7, 8]);
        assert!(ring.is_empty());
        assert_eq!(ring.overruns(), 0);
    }

    #[test]
    fn short_read_returns_what_is_there() {
        let mut ring = RingBuffer::<i16>::new(8);
        ring.write(&[-1, -2]);
        assert_eq!(ring.read(512), vec![-1, -2]);
        assert!(ring.read(1).is_empty());
    }

    #[test]
    fn indices_wrap_past_the_end() {
        let mut ring = RingBuffer::<i16>::new(5);
        ring.write(&[10, 20, 30, 40]);
        ring.read(3);
        ring.write(&[50, 60, 70]);

        assert_eq!(ring.count(), 4);
        assert_eq!(ring.read(4), vec![40, 50, 60, 70]);
    }

    #[test]
    fn slow_reader_loses_oldest_and_counts_overruns() {
        let mut ring = RingBuffer::<i16>::new(4);
        ring.write(&[1, 2, 3]);
        ring.write(&[4, 5, 6]);

        assert_eq!(ring.overruns(), 2);
        assert_eq!(ring.read(4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn oversized_chunk_keeps_its_tail() {
        let mut ring = RingBuffer::<i16>::new(3);
        ring.write(&[1, 2, 3, 4, 5]);

        assert_eq!(ring.overruns(), 2);
        assert_eq!(ring.read(3), vec![3, 4, 5]);
    }

    #[test]
    fn reset_clears_samples_and_counters() {
        let mut ring = RingBuffer::<i16>::new(2);
        ring.write(&[1, 2, 3]);
        ring.reset();

        assert!(ring.is_empty());
        assert_eq!(ring.overruns(), 0);
        assert_eq!(ring.capacity(), 2);
        ring.write(&[]);
        assert!(ring.is_empty());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut ring = RingBuffer::<f32>::new(0);
        ring.write(&[0.25, 0.5]);
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.read(1), vec![0.5]);
    }
}
