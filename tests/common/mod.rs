//! Shared test infrastructure for strand-link integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use strand_link::{
    Animation, AnimationEngine, AnimationKind, BusRequest, FrameAssembler, RGB8, StrandConfig,
    StripDriver, TargetBus, TimeDuration, TimeInstant, TimeSource,
};

/// Frame budget used by all integration tests; small enough to keep
/// messages readable, large enough for a sequence command.
pub const TEST_FRAMES: usize = 8;
pub const TEST_FRAME_SIZE: usize = 32;

/// The assembler matching the test frame budget.
pub fn test_assembler() -> FrameAssembler {
    FrameAssembler::new(TEST_FRAMES, TEST_FRAME_SIZE, 0)
}

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current: Cell<u64>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current: Cell::new(0),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        self.current.set(self.current.get() + millis);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        TestInstant(self.current.get())
    }
}

// ============================================================================
// Mock Strip Driver
// ============================================================================

/// Everything the strip hardware was asked to do, in order
#[derive(Default)]
pub struct StripLog {
    pub configures: Vec<(usize, Vec<usize>, f32)>,
    pub releases: usize,
    pub frames: Vec<Vec<RGB8>>,
}

/// Mock strip that records geometry changes and every flushed frame
pub struct MockStrip {
    log: Rc<RefCell<StripLog>>,
}

impl MockStrip {
    pub fn new() -> (Self, Rc<RefCell<StripLog>>) {
        let log = Rc::new(RefCell::new(StripLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl StripDriver for MockStrip {
    fn configure(&mut self, total: usize, lanes: &[usize], brightness: f32) {
        self.log
            .borrow_mut()
            .configures
            .push((total, lanes.to_vec(), brightness));
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }

    fn write(&mut self, frame: &[RGB8]) {
        self.log.borrow_mut().frames.push(frame.to_vec());
    }
}

// ============================================================================
// Mock Animation Engine
// ============================================================================

pub enum TestAnimation {
    /// Paints the whole slice with one color every tick
    Fill(RGB8),
    /// Increments the red channel every tick, so tick counts are visible
    Ramp,
}

impl Animation for TestAnimation {
    fn tick(&mut self, pixels: &mut [RGB8]) {
        match self {
            TestAnimation::Fill(color) => pixels.fill(*color),
            TestAnimation::Ramp => {
                for pixel in pixels.iter_mut() {
                    pixel.r = pixel.r.wrapping_add(1);
                }
            }
        }
    }
}

/// Builds `Fill` for `solid` and `Ramp` for every other kind
pub struct TestEngine;

impl AnimationEngine for TestEngine {
    type Animation = TestAnimation;

    fn build(&self, kind: AnimationKind, config: &StrandConfig) -> TestAnimation {
        match kind {
            AnimationKind::Solid => TestAnimation::Fill(config.color()),
            _ => TestAnimation::Ramp,
        }
    }
}

// ============================================================================
// Mock Target Bus
// ============================================================================

/// Scripted bus: tests queue writes, reads, and idle cycles up front
pub struct MockBus {
    script: VecDeque<Option<BusRequest>>,
    frames: VecDeque<Vec<u8>>,
    responses: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl MockBus {
    pub fn new() -> (Self, Rc<RefCell<Vec<Vec<u8>>>>) {
        let responses = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                script: VecDeque::new(),
                frames: VecDeque::new(),
                responses: responses.clone(),
            },
            responses,
        )
    }

    /// Queues a controller write carrying `message`, NUL padded out to the
    /// test frame budget the way the transport pads on the wire.
    pub fn queue_write(&mut self, message: &str) {
        self.script.push_back(Some(BusRequest::Write));
        self.queue_frames(message.as_bytes().to_vec());
    }

    /// Queues a write the way an SMBus block transfer arrives, with the
    /// register byte in front of the payload.
    pub fn queue_smbus_write(&mut self, message: &str) {
        self.script.push_back(Some(BusRequest::Write));
        let mut raw = vec![0u8];
        raw.extend_from_slice(message.as_bytes());
        self.queue_frames(raw);
    }

    pub fn queue_read(&mut self) {
        self.script.push_back(Some(BusRequest::Read));
    }

    pub fn queue_idle(&mut self) {
        self.script.push_back(None);
    }

    fn queue_frames(&mut self, mut raw: Vec<u8>) {
        assert!(
            raw.len() <= TEST_FRAMES * TEST_FRAME_SIZE,
            "message does not fit the test frame budget"
        );
        raw.resize(TEST_FRAMES * TEST_FRAME_SIZE, 0);
        for chunk in raw.chunks(TEST_FRAME_SIZE) {
            self.frames.push_back(chunk.to_vec());
        }
    }
}

impl TargetBus for MockBus {
    fn poll(&mut self) -> Option<BusRequest> {
        self.script.pop_front().flatten()
    }

    fn read_frame(&mut self, buffer: &mut [u8]) -> usize {
        match self.frames.pop_front() {
            Some(frame) => {
                let n = frame.len().min(buffer.len());
                buffer[..n].copy_from_slice(&frame[..n]);
                n
            }
            None => 0,
        }
    }

    fn respond(&mut self, data: &[u8]) {
        self.responses.borrow_mut().push(data.to_vec());
    }
}

// ============================================================================
// Miscellaneous
// ============================================================================

/// Delay provider that returns immediately
pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
