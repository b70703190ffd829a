//! Output heads mapping hidden features to action distributions.
//!
//! A head owns a linear transform over an internal [`VarMap`] and produces a
//! fresh [`Distribution`] per forward call. The head stays usable after the
//! call; previously returned distributions remain valid.
//!
//! [`VarMap`]: candle_nn::VarMap
mod bernoulli;
mod categorical;
mod normal;

use crate::dist::Distribution;
use anyhow::Result;
use candle_core::Tensor;

pub use bernoulli::{BernoulliHead, BernoulliHeadConfig};
pub use categorical::{CategoricalHead, CategoricalHeadConfig};
pub use normal::{NormalHead, NormalHeadConfig};

/// Polymorphic interface over the output-head variants.
///
/// `forward` takes `&mut self` because [`NormalHead`] updates its exploration
/// factor on every call; the other heads have no per-call state.
pub trait OutputLayer {
    /// Maps a hidden batch of shape `(batch_size, in_dim)` to an action
    /// distribution.
    fn forward(&mut self, hidden: &Tensor) -> Result<Box<dyn Distribution>>;

    /// Output dimension of the head.
    fn out_dim(&self) -> i64;
}
