//! Shopmedia Processing Library
//!
//! CPU-bound image work: verifying that fetched bytes really are a
//! well-formed image within the configured limits, and re-encoding verified
//! images into the small set of output formats that reach storage. No I/O
//! happens in this crate; callers are expected to run these routines on a
//! blocking thread.

pub mod transcoder;
pub mod verifier;

pub use transcoder::{TranscodeError, Transcoder};
pub use verifier::{ImageVerifier, VerificationError};
