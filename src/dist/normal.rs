//! Diagonal Gaussian distribution over continuous actions.
use super::Distribution;
use crate::{error::HeadError, util::check_positive_finite};
use anyhow::Result;
use candle_core::Tensor;

// ln(2 * pi)
const LN_TWO_PI: f64 = 1.8378770664093453;

/// Gaussian distribution with location `(batch_size, out_dim)` and a scale
/// broadcast to the same shape.
///
/// Samples are reparameterized: `loc + scale * eps` with `eps ~ N(0, 1)`.
pub struct Normal {
    loc: Tensor,
    scale: Tensor,
}

impl Normal {
    /// Constructs the distribution from a location batch and a scale.
    ///
    /// `scale` may be a `(out_dim,)` vector, in which case it is broadcast
    /// over the batch. Fails with
    /// [`HeadError::NumericalInstability`](crate::HeadError) if any scale
    /// entry is non-finite or non-positive.
    pub fn new(loc: Tensor, scale: Tensor) -> Result<Self> {
        check_positive_finite(&scale, "scale")?;
        let scale = loc.ones_like()?.broadcast_mul(&scale)?;
        Ok(Self { loc, scale })
    }

    /// Location (mean) of the distribution.
    pub fn loc(&self) -> &Tensor {
        &self.loc
    }

    /// Scale (standard deviation), broadcast to the location's shape.
    pub fn scale(&self) -> &Tensor {
        &self.scale
    }

    fn check_shape(&self, value: &Tensor) -> Result<()> {
        if value.dims() != self.loc.dims() {
            return Err(HeadError::shape_mismatch(self.loc.dims(), value.dims()).into());
        }
        Ok(())
    }
}

impl Distribution for Normal {
    fn sample(&self) -> Result<Tensor> {
        let eps = self.loc.randn_like(0.0, 1.0)?;
        Ok(self.loc.add(&self.scale.mul(&eps)?)?)
    }

    /// Elementwise log-density:
    /// `-0.5 * ((x - loc) / scale)^2 - ln(scale) - 0.5 * ln(2 * pi)`.
    fn log_prob(&self, value: &Tensor) -> Result<Tensor> {
        self.check_shape(value)?;
        let z = value.sub(&self.loc)?.div(&self.scale)?;
        let lp = (z.powf(2.0)? * -0.5)?.sub(&self.scale.log()?)?;
        Ok((lp - 0.5 * LN_TWO_PI)?)
    }

    fn entropy(&self) -> Result<Tensor> {
        Ok((self.scale.log()? + (0.5 + 0.5 * LN_TWO_PI))?)
    }

    fn mode(&self) -> Result<Tensor> {
        Ok(self.loc.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};

    fn standard_normal() -> Result<Normal> {
        let loc = Tensor::zeros(&[2, 3], DType::F32, &Device::Cpu)?;
        let scale = Tensor::ones(&[3], DType::F32, &Device::Cpu)?;
        Normal::new(loc, scale)
    }

    #[test]
    fn test_scale_broadcasts_over_batch() -> Result<()> {
        let dist = standard_normal()?;
        assert_eq!(dist.scale().dims(), &[2, 3]);
        Ok(())
    }

    #[test]
    fn test_log_prob_at_mean() -> Result<()> {
        let dist = standard_normal()?;
        let value = Tensor::zeros(&[2, 3], DType::F32, &Device::Cpu)?;
        let lp = dist.log_prob(&value)?.to_vec2::<f32>()?;
        for row in lp {
            for v in row {
                // -0.5 * ln(2 * pi)
                assert!((v + 0.9189385).abs() < 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn test_entropy_of_standard_normal() -> Result<()> {
        let dist = standard_normal()?;
        let ent = dist.entropy()?.to_vec2::<f32>()?;
        for row in ent {
            for v in row {
                // 0.5 + 0.5 * ln(2 * pi)
                assert!((v - 1.4189385).abs() < 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn test_rejects_degenerate_scale() -> Result<()> {
        let loc = Tensor::zeros(&[2, 3], DType::F32, &Device::Cpu)?;
        let scale = Tensor::zeros(&[3], DType::F32, &Device::Cpu)?;
        assert!(Normal::new(loc, scale).is_err());
        Ok(())
    }

    #[test]
    fn test_log_prob_rejects_wrong_shape() -> Result<()> {
        let dist = standard_normal()?;
        let value = Tensor::zeros(&[3, 2], DType::F32, &Device::Cpu)?;
        assert!(dist.log_prob(&value).is_err());
        Ok(())
    }
}
