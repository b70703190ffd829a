//! Categorical distribution over mutually exclusive discrete actions.
use super::Distribution;
use crate::error::HeadError;
use anyhow::Result;
use candle_core::{shape::D, DType, Tensor};
use candle_nn::ops::log_softmax;
use rand::{distributions::WeightedIndex, Rng};

/// Categorical distribution over `out_dim` classes, parameterized by
/// unnormalized logits of shape `(batch_size, out_dim)`.
///
/// Samples are i64 class indices of shape `(batch_size,)`, one per batch row.
pub struct Categorical {
    // Log-probabilities, normalized with log-sum-exp.
    log_probs: Tensor,
}

impl Categorical {
    /// Constructs the distribution from unnormalized logits.
    ///
    /// Normalization goes through [`log_softmax`] rather than a naive
    /// softmax-then-log, so extreme logits stay finite.
    pub fn from_logits(logits: Tensor) -> Result<Self> {
        let log_probs = log_softmax(&logits, D::Minus1)?;
        Ok(Self { log_probs })
    }

    /// Constructs the distribution from per-class probabilities.
    ///
    /// Rows are renormalized; probabilities are clamped away from zero so
    /// that log-probabilities stay finite.
    pub fn from_probs(probs: Tensor) -> Result<Self> {
        let probs = probs.clamp(1e-10, f64::INFINITY)?;
        let sum = probs.sum_keepdim(D::Minus1)?;
        let log_probs = probs.broadcast_div(&sum)?.log()?;
        Ok(Self { log_probs })
    }

    /// Normalized log-probabilities, shape `(batch_size, out_dim)`.
    pub fn log_probs(&self) -> &Tensor {
        &self.log_probs
    }

    fn batch_size(&self) -> usize {
        self.log_probs.dims()[0]
    }

    fn check_shape(&self, value: &Tensor) -> Result<()> {
        let expected = [self.batch_size()];
        if value.dims() != expected {
            return Err(HeadError::shape_mismatch(&expected, value.dims()).into());
        }
        Ok(())
    }
}

impl Distribution for Categorical {
    fn sample(&self) -> Result<Tensor> {
        let device = self.log_probs.device();
        let probs = self.log_probs.exp()?.to_vec2::<f32>()?;
        let n_samples = probs.len();
        let mut rng = rand::thread_rng();
        let mut data = Vec::with_capacity(n_samples);
        for p in probs.into_iter() {
            data.push(rng.sample(WeightedIndex::new(&p)?) as i64);
        }
        Ok(Tensor::from_vec(data, &[n_samples], device)?)
    }

    fn log_prob(&self, value: &Tensor) -> Result<Tensor> {
        self.check_shape(value)?;
        let index = value.to_dtype(DType::I64)?.unsqueeze(D::Minus1)?;
        Ok(self.log_probs.gather(&index, D::Minus1)?.squeeze(D::Minus1)?)
    }

    fn entropy(&self) -> Result<Tensor> {
        let plogp = self.log_probs.exp()?.mul(&self.log_probs)?;
        Ok(plogp.sum(D::Minus1)?.neg()?)
    }

    fn mode(&self) -> Result<Tensor> {
        Ok(self
            .log_probs
            .argmax(D::Minus1)?
            .to_dtype(DType::I64)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_entropy_of_uniform() -> Result<()> {
        let logits = Tensor::zeros(&[2, 5], DType::F32, &Device::Cpu)?;
        let dist = Categorical::from_logits(logits)?;
        let ent = dist.entropy()?.to_vec1::<f32>()?;
        for e in ent {
            assert!((e - (5.0f32).ln()).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_log_prob_gathers_per_row() -> Result<()> {
        let logits = Tensor::from_slice(&[0.0f32, 0.0, 1.0, 3.0], &[2, 2], &Device::Cpu)?;
        let dist = Categorical::from_logits(logits)?;
        let value = Tensor::from_vec(vec![0i64, 1], &[2], &Device::Cpu)?;
        let lp = dist.log_prob(&value)?.to_vec1::<f32>()?;
        assert!((lp[0] - 0.5f32.ln()).abs() < 1e-6);
        // log_softmax([1, 3])[1] = -log(1 + exp(-2))
        assert!((lp[1] + (1.0 + (-2.0f32).exp()).ln()).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_mode_is_argmax() -> Result<()> {
        let logits = Tensor::from_slice(&[0.1f32, 2.0, -1.0, 5.0, 0.0, 1.0], &[2, 3], &Device::Cpu)?;
        let dist = Categorical::from_logits(logits)?;
        assert_eq!(dist.mode()?.to_vec1::<i64>()?, vec![1, 0]);
        Ok(())
    }

    #[test]
    fn test_from_probs_normalizes_rows() -> Result<()> {
        let probs = Tensor::from_slice(&[1.0f32, 3.0], &[1, 2], &Device::Cpu)?;
        let dist = Categorical::from_probs(probs)?;
        let lp = dist.log_probs().to_vec2::<f32>()?;
        assert!((lp[0][0] - 0.25f32.ln()).abs() < 1e-6);
        assert!((lp[0][1] - 0.75f32.ln()).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_log_prob_rejects_wrong_shape() -> Result<()> {
        let logits = Tensor::zeros(&[2, 5], DType::F32, &Device::Cpu)?;
        let dist = Categorical::from_logits(logits)?;
        let value = Tensor::from_vec(vec![0i64, 1, 2], &[3], &Device::Cpu)?;
        assert!(dist.log_prob(&value).is_err());
        Ok(())
    }
}
