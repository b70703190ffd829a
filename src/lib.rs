//! Action-distribution output layers for RL policy networks, implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! A policy network's feature extractor produces a hidden batch of shape
//! `(batch_size, in_dim)`. The output heads in this crate map that batch to a
//! probability distribution over actions:
//!
//! * [`BernoulliHead`] - independent binary actions, samples of shape
//!   `(batch_size, out_dim)`.
//! * [`CategoricalHead`] - one discrete action id per batch row, samples of
//!   shape `(batch_size,)`.
//! * [`NormalHead`] - continuous actions with a learned log-scale and a
//!   geometrically decaying exploration factor, samples of shape
//!   `(batch_size, out_dim)`.
//!
//! Each head returns a fresh [`Distribution`] value per forward call. The
//! distribution owns its parameter tensors, so it stays valid independent of
//! later forward calls or optimizer steps on the head.
pub mod dist;
pub mod error;
pub mod head;
pub mod init;
pub mod util;

pub use dist::{Bernoulli, Categorical, Distribution, Normal};
pub use error::HeadError;
pub use head::{
    BernoulliHead, BernoulliHeadConfig, CategoricalHead, CategoricalHeadConfig, NormalHead,
    NormalHeadConfig, OutputLayer,
};
pub use init::init_weights;
