//! Probability distributions over actions.
//!
//! A distribution is a transient value produced by one forward call of an
//! output head. It owns its parameter tensors, so it remains valid after the
//! head has moved on to the next batch or an optimizer step.
mod bernoulli;
mod categorical;
mod normal;

use anyhow::Result;
use candle_core::Tensor;

pub use bernoulli::Bernoulli;
pub use categorical::Categorical;
pub use normal::Normal;

/// Common capability set of action distributions.
pub trait Distribution {
    /// Draws a sample.
    ///
    /// The sample shape is `(batch_size, out_dim)` for [`Bernoulli`] and
    /// [`Normal`], and `(batch_size,)` for [`Categorical`].
    fn sample(&self) -> Result<Tensor>;

    /// Returns the log-probability (or log-density) of the given value.
    ///
    /// Fails with [`HeadError::ShapeMismatch`](crate::HeadError) if the shape
    /// of `value` does not match the sample shape of the distribution.
    fn log_prob(&self, value: &Tensor) -> Result<Tensor>;

    /// Returns the entropy of the distribution.
    fn entropy(&self) -> Result<Tensor>;

    /// Returns the most probable value.
    fn mode(&self) -> Result<Tensor>;
}
