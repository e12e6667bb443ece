//! The xtci update pipeline.
//!
//! ```text
//! xtci [-v] [MESSAGE]...
//!   1. Base images   ── one per distinct (cc, cxx) pair of the tag matrix
//!   2. Per module
//!      a. Images     ── one per matrix tag: <ns>/<module>-testing_<tag>
//!      b. Dirty?     ── skip the module
//!      c. Hosted CI? ── skip regeneration
//!      d. Templates  ── .travis.yml, .travis.after_script.bash, .travis.script.bash
//!   3. Commit        ── regenerated modules only, with MESSAGE
//! ```

pub mod images;
pub mod layout;
pub mod pipeline;
pub mod templates;

pub use layout::Layout;
pub use pipeline::{ModuleOutcome, ModuleReport, Pipeline, RunReport, SkipReason, commit_message};
