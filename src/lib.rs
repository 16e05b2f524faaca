#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`LinkService`**: Polls the bus and drives the whole device from one cooperative loop
//! - **`Display`**: Owns the shared pixel frame, splits it across strands, flushes to the strip
//! - **`Strand`**: One logical strand with a sticky config and a `Manual`/`Animating`/`Sequencing` state
//! - **`StrandConfig`**: The attribute set animation instances are built from
//! - **`FrameAssembler`**: Reassembles fixed-size bus frames into one JSON message
//! - **`AttributeOp`**: One parsed directive entry, applied in document order
//! - **`AnimationEngine`**: Trait to implement for your animation rendering
//! - **`StripDriver`**: Trait to implement for your LED strip hardware
//! - **`TargetBus`**: Trait to implement for your I2C target peripheral
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Pixels are [`RGB8`] (8 bits per channel) end to end. Global brightness
//! is handed to the strip driver at configure time rather than applied per
//! pixel, so the frame always holds the colors the host asked for.

extern crate alloc;

// This must go first so the rest of the crate sees its macros.
pub(crate) mod fmt;

pub mod time;
pub mod color;
pub mod config;
pub mod command;
pub mod animation;
pub mod json;
pub mod frame;
pub mod parse;
pub mod strand;
pub mod display;
pub mod bus;
pub mod service;

// Re-export RGB8 from smart-leds for user convenience
pub use smart_leds::RGB8;

pub use animation::{Animation, AnimationEngine, AnimationKind, SequencePlayer};
pub use bus::{BusRequest, TargetBus};
pub use command::{AnimationSpec, AttributeOp, Command, Directive, Name, ReconfigureCommand};
pub use config::{ConfigSource, StrandConfig};
pub use display::{Display, DisplayError, StripDriver};
pub use frame::{AssembleError, FrameAssembler};
pub use json::{Object, Value};
pub use parse::{ParseError, parse_message};
pub use service::{Activity, DEFAULT_STATUS, LinkError, LinkService};
pub use strand::{Strand, StrandError, StrandState};
pub use time::{TimeDuration, TimeInstant, TimeSource};

/// The color of a cleared pixel.
pub const COLOR_OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
