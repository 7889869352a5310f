//! Voice Recorder - microphone capture with server-side conversion
//!
//! This crate records audio from the microphone in timed fragments, assembles
//! them into a single payload, and uploads it to a conversion server that
//! returns an MP3 or WAV download.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the session state machine, and errors
//! - **Application**: Capture session, upload coordinator, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, HTTP, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
