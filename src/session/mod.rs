//! Session Module
//!
//! Execution modes and the state machine that moves between them.
//!
//! ## Transitions
//! ```text
//!            begin_transaction             begin_pipeline
//!   Normal ─────────────────► Transaction  Normal ─────────► Pipeline
//!     ▲                           │          ▲                   │
//!     └──────── exec / discard ───┘          └─ exec / discard ──┘
//! ```
//!
//! Entering a batching mode while another one is open is rejected and leaves
//! the state untouched.

mod mode;
mod controller;

pub use mode::SessionMode;
pub use controller::Session;
