/// Windowed averaging of sensor readings and summary publication
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::watch;

use crate::models::{Reading, Summary, FIELD_COUNT};

/// Readings averaged into each published summary
pub const WINDOW_CAPACITY: usize = 9;

/// Owns the open window and is the only writer of the published summary
///
/// Readings are appended by a single ingest path. When the window holds
/// `capacity` readings it is averaged, published and emptied in one call.
pub struct Aggregator {
    window: Vec<Reading>,
    capacity: usize,
    offset: UtcOffset,
    publisher: watch::Sender<Summary>,
}

/// Read-only view of the latest published summary
///
/// Cheap to clone and safe to query from any task while ingestion runs.
#[derive(Debug, Clone)]
pub struct SummaryHandle {
    receiver: watch::Receiver<Summary>,
}

impl Aggregator {
    /// Create an aggregator and the handle used to query its summaries
    ///
    /// Summary timestamps are taken in `offset`.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize, offset: UtcOffset) -> (Self, SummaryHandle) {
        assert!(capacity > 0, "window capacity must be positive");

        let (publisher, receiver) = watch::channel(Summary::default());
        let aggregator = Aggregator {
            window: Vec::with_capacity(capacity),
            capacity,
            offset,
            publisher,
        };

        (aggregator, SummaryHandle { receiver })
    }

    /// Add a reading to the open window
    ///
    /// Returns the newly published summary when this reading completed the
    /// window, otherwise `None` and the previous summary stays visible.
    pub fn ingest(&mut self, reading: Reading) -> Option<Summary> {
        self.window.push(reading);

        if self.window.len() < self.capacity {
            return None;
        }

        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        let summary = average_readings(&self.window, now);
        self.publisher.send_replace(summary);
        self.window.clear();

        Some(summary)
    }

    /// Number of readings waiting in the open window
    pub fn pending(&self) -> usize {
        self.window.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl SummaryHandle {
    /// Copy of the most recently published summary, or the zero sentinel
    pub fn current(&self) -> Summary {
        *self.receiver.borrow()
    }
}

/// Average each field across `readings`, rounding halves up
///
/// The reduction is independent of the order of `readings`.
///
/// # Panics
/// If `readings` is empty; an empty window means the caller broke the
/// flush invariant.
pub fn average_readings(readings: &[Reading], updated_at: OffsetDateTime) -> Summary {
    assert!(!readings.is_empty(), "attempted to average an empty window");

    let mut sums = [0u64; FIELD_COUNT];
    for reading in readings {
        for (sum, word) in sums.iter_mut().zip(reading.words()) {
            *sum += u64::from(word);
        }
    }

    let count = readings.len() as u64;
    // Integer round-half-up; the mean of u16 values always fits in u16
    let averages = sums.map(|sum| ((sum + count / 2) / count) as u16);

    Summary::from_averages(averages, readings.len(), updated_at)
}
