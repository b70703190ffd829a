//! Bernoulli distribution over independent binary actions.
use super::Distribution;
use crate::{error::HeadError, util::softplus};
use anyhow::Result;
use candle_core::{DType, Tensor};
use candle_nn::ops::sigmoid;

/// Bernoulli distribution parameterized by logits of shape
/// `(batch_size, out_dim)`.
///
/// Each output dimension is an independent coin; samples are f32 tensors of
/// zeros and ones with the same shape as the logits.
pub struct Bernoulli {
    logits: Tensor,
    probs: Tensor,
}

impl Bernoulli {
    /// Constructs the distribution from unnormalized logits.
    ///
    /// The probability of one per dimension is the logistic transform of the
    /// corresponding logit.
    pub fn from_logits(logits: Tensor) -> Result<Self> {
        let probs = sigmoid(&logits)?;
        Ok(Self { logits, probs })
    }

    /// Constructs the distribution from probabilities in `[0, 1]`.
    ///
    /// Probabilities are clamped away from 0 and 1 so that the logit
    /// parameterization stays finite.
    pub fn from_probs(probs: Tensor) -> Result<Self> {
        let probs = probs.clamp(1e-7, 1.0 - 1e-7)?;
        let logits = probs.log()?.sub(&(1.0 - &probs)?.log()?)?;
        Ok(Self { logits, probs })
    }

    /// Probability of one per output dimension.
    pub fn probs(&self) -> &Tensor {
        &self.probs
    }

    /// Unnormalized logits.
    pub fn logits(&self) -> &Tensor {
        &self.logits
    }

    fn check_shape(&self, value: &Tensor) -> Result<()> {
        if value.dims() != self.logits.dims() {
            return Err(HeadError::shape_mismatch(self.logits.dims(), value.dims()).into());
        }
        Ok(())
    }
}

impl Distribution for Bernoulli {
    fn sample(&self) -> Result<Tensor> {
        let u = self.probs.rand_like(0.0, 1.0)?;
        Ok(u.lt(&self.probs)?.to_dtype(DType::F32)?)
    }

    /// `log p(x) = x * l - softplus(l)`, elementwise over the logits `l`.
    ///
    /// This is the stable closed form; it never takes the log of a sigmoid.
    fn log_prob(&self, value: &Tensor) -> Result<Tensor> {
        self.check_shape(value)?;
        Ok(value.mul(&self.logits)?.sub(&softplus(&self.logits)?)?)
    }

    fn entropy(&self) -> Result<Tensor> {
        Ok(softplus(&self.logits)?.sub(&self.logits.mul(&self.probs)?)?)
    }

    fn mode(&self) -> Result<Tensor> {
        Ok(self.probs.gt(0.5f32)?.to_dtype(DType::F32)?)
    }
}
