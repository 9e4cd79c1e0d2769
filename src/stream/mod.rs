//! Incremental search-stream consumption.
//!
//! The components mirror the data flow: the [`SearchSession`] controller
//! issues the request; the [`FrameDecoder`] turns byte chunks into frames;
//! [`interpret`] classifies each frame into a [`SearchEvent`]; the
//! [`ProgressTracker`] and [`ResultAccumulator`] update the derived state
//! that the presentation layer observes through [`SessionState`].

pub mod decoder;
pub mod event;
pub mod progress;
pub mod results;
pub mod session;

pub use decoder::{FrameDecoder, RawFrame};
pub use event::{describe_stage, interpret, messages, stage_label, ProgressState, SearchEvent};
pub use progress::ProgressTracker;
pub use results::ResultAccumulator;
pub use session::{SearchSession, SessionPhase, SessionState};
