//! Utilities.
use crate::error::HeadError;
use anyhow::Result;
use candle_core::Tensor;

/// Interface for handling output dimensions of head configurations.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// Elementwise `log(1 + exp(x))`.
///
/// Written as `max(x, 0) + log(1 + exp(-|x|))` so that large positive inputs
/// do not overflow.
pub fn softplus(xs: &Tensor) -> Result<Tensor> {
    let a = xs.relu()?;
    let b = (xs.abs()?.neg()?.exp()? + 1.0)?.log()?;
    Ok((a + b)?)
}

/// Fails with [`HeadError::NumericalInstability`] unless every element of the
/// tensor is finite and strictly positive.
pub fn check_positive_finite(xs: &Tensor, what: &str) -> Result<()> {
    let values = xs.flatten_all()?.to_vec1::<f32>()?;
    if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(HeadError::NumericalInstability(format!(
            "{} contains a non-finite or non-positive value",
            what
        ))
        .into());
    }
    Ok(())
}

/// Validates that `hidden` is a rank-2 batch whose width matches `in_dim`.
pub(crate) fn check_input_shape(hidden: &Tensor, in_dim: i64) -> Result<()> {
    let dims = hidden.dims();
    if dims.len() != 2 || dims[1] != in_dim as usize {
        return Err(HeadError::ShapeMismatch {
            expected: format!("[batch, {}]", in_dim),
            got: format!("{:?}", dims),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_softplus() -> Result<()> {
        let xs = Tensor::from_slice(&[0.0f32, 100.0, -100.0], &[3], &Device::Cpu)?;
        let ys = softplus(&xs)?.to_vec1::<f32>()?;
        assert!((ys[0] - std::f32::consts::LN_2).abs() < 1e-6);
        // Saturates to the identity for large inputs instead of overflowing.
        assert!((ys[1] - 100.0).abs() < 1e-4);
        assert!(ys[2].abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_check_positive_finite() -> Result<()> {
        let ok = Tensor::from_slice(&[0.1f32, 1.0], &[2], &Device::Cpu)?;
        assert!(check_positive_finite(&ok, "scale").is_ok());

        let nan = Tensor::from_slice(&[0.1f32, f32::NAN], &[2], &Device::Cpu)?;
        assert!(check_positive_finite(&nan, "scale").is_err());

        let zero = Tensor::from_slice(&[0.0f32, 1.0], &[2], &Device::Cpu)?;
        assert!(check_positive_finite(&zero, "scale").is_err());
        Ok(())
    }
}
