//! Template rendering, Dockerfile generation, and directory scoping for xtci.
//!
//! # Image build flow
//!
//! ```text
//! per image
//!   1. Template    ── Template::load(<templates>/.../Dockerfile.in)
//!   2. Context     ── EphemeralDir::prepare(<templates>/<module>/<tag>)
//!   3. Enter       ── WorkingDir::enter(context)
//!   4. Dockerfile  ── DockerfileGenerator::write_to(context)
//!   5. docker build / tag
//!   6. Leave       ── WorkingDir dropped, previous cwd restored
//!   7. Cleanup     ── EphemeralDir::finish() (skipped on error)
//! ```
//!
//! # Placeholders
//!
//! Templates use `$name` / `${name}` placeholders with `$$` as an escaped
//! dollar sign. Substitution is *safe*: unknown names are left untouched so
//! shell variables in CI scripts survive rendering.

pub mod dockerfile;
pub mod scope;
pub mod template;

pub use dockerfile::DockerfileGenerator;
pub use scope::{EphemeralDir, ScopeError, WorkingDir};
pub use template::{RenderError, Substitutions, Template, render_file};
