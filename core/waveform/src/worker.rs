use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    decode::{AudioDecoder, DecodeError},
    samples::AudioSamples,
    session::DecodeTicket,
};

const IDLE_WAIT: Duration = Duration::from_millis(10);
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Raw bytes queued for decoding.
#[derive(Debug)]
pub struct DecodeJob {
    pub ticket: DecodeTicket,
    pub bytes: Vec<u8>,
}

/// A finished decode, tagged with the ticket it was submitted under.
#[derive(Debug)]
pub struct DecodeDone {
    pub ticket: DecodeTicket,
    pub result: Result<AudioSamples, DecodeError>,
}

/// Decodes audio off the caller's thread.
///
/// Jobs and results travel over two SPSC ring buffers; the worker parks while
/// idle and is woken on submit.
#[derive(Debug)]
pub struct DecodeWorker {
    jobs: Producer<DecodeJob>,
    results: Consumer<DecodeDone>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    pub fn spawn<D: AudioDecoder + 'static>(decoder: D, capacity: usize) -> std::io::Result<Self> {
        let (jobs, mut pending) = RingBuffer::<DecodeJob>::new(capacity);
        let (mut finished, results) = RingBuffer::<DecodeDone>::new(capacity);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("decode-worker".into())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    let Ok(DecodeJob { ticket, bytes }) = pending.pop() else {
                        thread::park_timeout(IDLE_WAIT);
                        continue;
                    };

                    log::debug!("decoding {} bytes for token {}", bytes.len(), ticket.token());
                    let mut done = DecodeDone {
                        ticket,
                        result: decoder.decode(&bytes),
                    };

                    loop {
                        match finished.push(done) {
                            Ok(()) => break,
                            Err(PushError::Full(back)) => {
                                if !flag.load(Ordering::Acquire) || finished.is_abandoned() {
                                    return;
                                }
                                done = back;
                                thread::park_timeout(IDLE_WAIT);
                            }
                        }
                    }
                }
                log::debug!("decode worker stopped");
            })?;

        Ok(Self {
            jobs,
            results,
            running,
            handle: Some(handle),
        })
    }

    /// Queues bytes for decoding. Gives the job back if the queue is full.
    pub fn submit(&mut self, ticket: DecodeTicket, bytes: Vec<u8>) -> Result<(), DecodeJob> {
        self.jobs
            .push(DecodeJob { ticket, bytes })
            .map_err(|PushError::Full(job)| job)?;
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
        Ok(())
    }

    pub fn try_recv(&mut self) -> Option<DecodeDone> {
        self.results.pop().ok()
    }

    /// Polls for a result until `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<DecodeDone> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(done) = self.try_recv() {
                return Some(done);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("decode worker panicked");
            }
        }
    }
}
