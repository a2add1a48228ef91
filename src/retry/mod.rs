//! Retry envelope for render-dependent steps
//!
//! The portal renders client-side after a script swaps the view, and there is
//! no "render complete" signal. A step that parses successfully is taken as
//! proof the render finished; a transient failure waits a fixed delay and the
//! whole step runs again.
//!
//! | Failure | Action |
//! |---------|--------|
//! | Navigation | wait, retry |
//! | Empty render | wait, retry |
//! | Structural mismatch | propagate immediately |
//! | Anything else | propagate immediately |
//!
//! Each piece of page work is a `Step`; `RetryEnvelope::run` is the only
//! retry loop. Waiting goes through the `Delay` trait so tests can
//! substitute `NoDelay`.

mod delay;
mod policy;

pub use delay::{Delay, NoDelay, TokioDelay};
pub use policy::{Attempts, RetryEnvelope, RetryPolicy, Step};
