//! Journal - Asynchronous event log.
//!
//! ```text
//! [Matching Thread] --push--> [SPSC Ring Buffer] --pop--> [Journal Thread] --> file
//! ```
//!
//! The matching thread never touches the writer. It pushes events into a
//! bounded rtrb ring and moves on; the journal thread drains the ring,
//! writes one line per event and flushes on a fixed interval.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::execution::{EventSink, OutputEvent};

/// Default ring capacity in events
pub const DEFAULT_CAPACITY: usize = 1 << 16;

/// Default pause between drain/flush passes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Producer half of the journal, owned by the matching thread.
pub struct Journal {
    producer: Option<rtrb::Producer<OutputEvent>>,
    handle: Option<JoinHandle<io::Result<u64>>>,
    dropped: u64,
}

impl Journal {
    /// Journal to a newly created (truncated) file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "journal opened");
        Self::spawn(BufWriter::new(file), DEFAULT_CAPACITY, DEFAULT_FLUSH_INTERVAL)
    }

    /// Start the journal thread writing to `writer`.
    ///
    /// # Arguments
    /// * `writer` - Destination of the journal lines
    /// * `capacity` - Ring size in events; a full ring drops new events
    /// * `flush_interval` - Pause between drain/flush passes
    pub fn spawn<W>(writer: W, capacity: usize, flush_interval: Duration) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (producer, consumer) = rtrb::RingBuffer::new(capacity);
        let handle = thread::Builder::new()
            .name("journal".into())
            .spawn(move || drain_loop(consumer, writer, flush_interval))?;

        Ok(Self {
            producer: Some(producer),
            handle: Some(handle),
            dropped: 0,
        })
    }

    /// Enqueue one event without blocking.
    #[inline]
    pub fn record(&mut self, event: OutputEvent) {
        let Some(producer) = self.producer.as_mut() else {
            return;
        };
        if producer.push(event).is_err() {
            // Warn on the first drop only
            if self.dropped == 0 {
                warn!("journal ring full, dropping events");
            }
            self.dropped += 1;
        }
    }

    /// Events lost to a full ring so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Stop accepting events, wait for the journal thread to write out
    /// everything queued, and return the number of lines written.
    pub fn close(mut self) -> Result<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64> {
        // Dropping the producer lets the consumer see the ring abandoned
        self.producer.take();
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(written) => Ok(written?),
                Err(_) => Err(Error::JournalThread),
            },
            None => Ok(0),
        }
    }
}

impl EventSink for Journal {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        self.record(event);
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "journal shutdown failed");
        }
    }
}

/// Journal thread body. Returns the number of lines written.
fn drain_loop<W: Write>(
    mut consumer: rtrb::Consumer<OutputEvent>,
    mut writer: W,
    flush_interval: Duration,
) -> io::Result<u64> {
    let mut written = 0u64;

    loop {
        // Read the flag before draining so nothing pushed earlier is missed
        let abandoned = consumer.is_abandoned();
        while let Ok(event) = consumer.pop() {
            writeln!(writer, "{event}")?;
            written += 1;
        }
        writer.flush()?;

        if abandoned {
            return Ok(written);
        }
        thread::sleep(flush_interval);
    }
}
