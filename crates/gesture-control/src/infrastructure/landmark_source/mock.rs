//! Mock landmark detector for unit and integration tests.
//!
//! Results are scripted up front: each `detect` call pops the next queued
//! result, and once the queue is empty the `fallback` result is repeated.
//! Initialization can be made to succeed, fail, or never complete (to test
//! deactivation while the model is still "downloading").
//!
//! Like [`MockCamera`](crate::infrastructure::camera::mock::MockCamera), the
//! mock is `Clone` and every clone shares the same counters.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gesture_core::HandFrame;

use super::{DetectorError, DetectorOptions, LandmarkSource};
use crate::infrastructure::camera::mock::CallJournal;
use crate::infrastructure::camera::VideoFrame;

/// What `initialize` should do.
#[derive(Debug, Clone)]
enum InitBehaviour {
    Succeed,
    Fail(String),
    Hang,
}

struct MockDetectorState {
    init: InitBehaviour,
    script: VecDeque<Result<Option<HandFrame>, DetectorError>>,
    fallback: Option<HandFrame>,
    initialized: bool,
    closed: bool,
    init_calls: u32,
    detect_calls: u64,
    close_calls: u32,
    timestamps: Vec<u64>,
    last_options: Option<DetectorOptions>,
}

/// A mock implementation of [`LandmarkSource`].
#[derive(Clone)]
pub struct MockLandmarkSource {
    state: Arc<Mutex<MockDetectorState>>,
    journal: Option<CallJournal>,
}

impl Default for MockLandmarkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLandmarkSource {
    /// A detector that loads instantly and never sees a hand.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDetectorState {
                init: InitBehaviour::Succeed,
                script: VecDeque::new(),
                fallback: None,
                initialized: false,
                closed: false,
                init_calls: 0,
                detect_calls: 0,
                close_calls: 0,
                timestamps: Vec::new(),
                last_options: None,
            })),
            journal: None,
        }
    }

    /// Makes `initialize` fail with `reason`.
    pub fn failing_init(self, reason: impl Into<String>) -> Self {
        self.state.lock().expect("lock poisoned").init = InitBehaviour::Fail(reason.into());
        self
    }

    /// Makes `initialize` never complete.
    pub fn hanging_init(self) -> Self {
        self.state.lock().expect("lock poisoned").init = InitBehaviour::Hang;
        self
    }

    /// Repeats `frame` once the scripted queue is exhausted.
    pub fn with_fallback(self, frame: Option<HandFrame>) -> Self {
        self.state.lock().expect("lock poisoned").fallback = frame;
        self
    }

    /// Queues one result for a future `detect` call.
    pub fn push_result(&self, result: Result<Option<HandFrame>, DetectorError>) {
        self.state
            .lock()
            .expect("lock poisoned")
            .script
            .push_back(result);
    }

    /// Records lifecycle calls into `journal`.
    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn init_calls(&self) -> u32 {
        self.state.lock().expect("lock poisoned").init_calls
    }

    pub fn detect_calls(&self) -> u64 {
        self.state.lock().expect("lock poisoned").detect_calls
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().expect("lock poisoned").close_calls
    }

    /// Timestamps passed to `detect`, in call order.
    pub fn timestamps(&self) -> Vec<u64> {
        self.state.lock().expect("lock poisoned").timestamps.clone()
    }

    pub fn last_options(&self) -> Option<DetectorOptions> {
        self.state.lock().expect("lock poisoned").last_options.clone()
    }

    fn record(&self, call: &'static str) {
        if let Some(journal) = &self.journal {
            journal.record(call);
        }
    }
}

#[async_trait]
impl LandmarkSource for MockLandmarkSource {
    async fn initialize(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        self.record("detector.initialize");
        let behaviour = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.init_calls += 1;
            state.last_options = Some(options.clone());
            state.init.clone()
        };
        match behaviour {
            InitBehaviour::Succeed => {
                self.state.lock().expect("lock poisoned").initialized = true;
                Ok(())
            }
            InitBehaviour::Fail(reason) => Err(DetectorError::LoadFailed(reason)),
            InitBehaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    fn detect(
        &mut self,
        _frame: &VideoFrame,
        timestamp_ms: u64,
    ) -> Result<Option<HandFrame>, DetectorError> {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        if !state.initialized {
            return Err(DetectorError::DetectFailed("detector not initialized".into()));
        }
        state.detect_calls += 1;
        state.timestamps.push(timestamp_ms);
        match state.script.pop_front() {
            Some(result) => result,
            None => Ok(state.fallback.clone()),
        }
    }

    fn close(&mut self) -> Result<(), DetectorError> {
        self.record("detector.close");
        let mut state = self.state.lock().expect("lock poisoned");
        state.close_calls += 1;
        if state.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        state.closed = true;
        Ok(())
    }
}
