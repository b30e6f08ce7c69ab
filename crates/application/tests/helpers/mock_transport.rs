use async_trait::async_trait;
use ferrous_doq_application::ports::{DoqConnector, DoqSession, DoqStream, StreamRead};
use ferrous_doq_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

/// How a stream answers once the query has been written.
#[derive(Debug, Clone)]
pub enum ReadPlan {
    /// Reply with the exact bytes written on the stream.
    Echo,
    Respond(Vec<u8>),
    /// Deliver the bytes, then fail the read (stream end reported as an error).
    PartialThenError(Vec<u8>),
    ErrorWithoutData,
}

/// Knobs and counters shared by a connector and everything it creates.
pub struct TransportControl {
    pub dials: AtomicUsize,
    pub dial_failures: AtomicUsize,
    pub dial_delay: Mutex<Option<Duration>>,
    pub opens: AtomicUsize,
    pub open_failures: AtomicUsize,
    pub write_failure: AtomicBool,
    pub reads_before_finish: AtomicUsize,
    pub read_plan: Mutex<ReadPlan>,
}

impl TransportControl {
    fn new() -> Self {
        Self {
            dials: AtomicUsize::new(0),
            dial_failures: AtomicUsize::new(0),
            dial_delay: Mutex::new(None),
            opens: AtomicUsize::new(0),
            open_failures: AtomicUsize::new(0),
            write_failure: AtomicBool::new(false),
            reads_before_finish: AtomicUsize::new(0),
            read_plan: Mutex::new(ReadPlan::Echo),
        }
    }

    pub fn fail_next_dials(&self, n: usize) {
        self.dial_failures.store(n, Ordering::SeqCst);
    }

    /// The next `n` stream opens fail and close the session they were tried on.
    pub fn fail_next_opens(&self, n: usize) {
        self.open_failures.store(n, Ordering::SeqCst);
    }

    pub fn set_dial_delay(&self, delay: Duration) {
        *self.dial_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_write_failure(&self, fail: bool) {
        self.write_failure.store(fail, Ordering::SeqCst);
    }

    pub fn set_read_plan(&self, plan: ReadPlan) {
        *self.read_plan.lock().unwrap() = plan;
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Clones share the same control block and session list.
#[derive(Clone)]
pub struct MockConnector {
    target: String,
    control: Arc<TransportControl>,
    sessions: Arc<Mutex<Vec<MockSession>>>,
}

impl MockConnector {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            control: Arc::new(TransportControl::new()),
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn control(&self) -> Arc<TransportControl> {
        Arc::clone(&self.control)
    }

    /// Shared view of every session dialed so far, in dial order.
    pub fn sessions(&self) -> Arc<Mutex<Vec<MockSession>>> {
        Arc::clone(&self.sessions)
    }
}

#[async_trait]
impl DoqConnector for MockConnector {
    type Session = MockSession;

    async fn dial(&self) -> Result<MockSession, DomainError> {
        let id = self.control.dials.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = *self.control.dial_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if take_one(&self.control.dial_failures) {
            return Err(DomainError::SessionFailed {
                server: self.target.clone(),
                reason: "handshake timed out".to_string(),
            });
        }

        let session = MockSession {
            id,
            closed: Arc::new(AtomicBool::new(false)),
            close_calls: Arc::new(AtomicUsize::new(0)),
            close_gate: Arc::new(Mutex::new(None)),
            control: Arc::clone(&self.control),
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Clone)]
pub struct MockSession {
    pub id: usize,
    closed: Arc<AtomicBool>,
    close_calls: Arc<AtomicUsize>,
    close_gate: Arc<Mutex<Option<Arc<Barrier>>>>,
    control: Arc<TransportControl>,
}

impl MockSession {
    /// Each `close()` blocks its thread until `callers` closes are waiting.
    pub fn hold_close_until(&self, callers: usize) {
        *self.close_gate.lock().unwrap() = Some(Arc::new(Barrier::new(callers)));
    }

    /// Simulates the peer or an idle timeout ending the connection.
    pub fn kill(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DoqSession for MockSession {
    type Stream = MockStream;

    async fn open_stream(&self) -> Result<MockStream, DomainError> {
        self.control.opens.fetch_add(1, Ordering::SeqCst);

        if take_one(&self.control.open_failures) {
            self.kill();
            return Err(DomainError::Read("connection lost".to_string()));
        }
        if self.is_closed() {
            return Err(DomainError::Read("connection closed".to_string()));
        }

        Ok(MockStream {
            session_id: self.id,
            written: Vec::new(),
            finished: false,
            control: Arc::clone(&self.control),
        })
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.kill();

        let gate = self.close_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait();
        }
    }
}

pub struct MockStream {
    pub session_id: usize,
    written: Vec<u8>,
    finished: bool,
    control: Arc<TransportControl>,
}

impl MockStream {
    fn fill(buf: &mut [u8], bytes: &[u8]) -> usize {
        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        len
    }
}

#[async_trait]
impl DoqStream for MockStream {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), DomainError> {
        if self.control.write_failure.load(Ordering::SeqCst) {
            return Err(DomainError::Write("stream reset by peer".to_string()));
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DomainError> {
        self.finished = true;
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> StreamRead {
        if !self.finished {
            self.control.reads_before_finish.fetch_add(1, Ordering::SeqCst);
        }

        let plan = self.control.read_plan.lock().unwrap().clone();
        let read = match plan {
            ReadPlan::Echo => StreamRead::complete(Self::fill(buf, &self.written)),
            ReadPlan::Respond(bytes) => StreamRead::complete(Self::fill(buf, &bytes)),
            ReadPlan::PartialThenError(bytes) => StreamRead::failed(
                Self::fill(buf, &bytes),
                DomainError::Read("stream closed".to_string()),
            ),
            ReadPlan::ErrorWithoutData => {
                StreamRead::failed(0, DomainError::Read("stream reset".to_string()))
            }
        };

        // Let other exchanges run while this one still holds its buffer.
        tokio::task::yield_now().await;
        read
    }
}
