//! Output head for independent binary actions.
use super::OutputLayer;
use crate::{
    dist::{Bernoulli, Distribution},
    error::HeadError,
    init::init_weights,
    util::{check_input_shape, OutDim},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`BernoulliHead`].
pub struct BernoulliHeadConfig {
    pub in_dim: i64,
    pub out_dim: i64,
    pub init_weight_scale: f64,
    pub init_bias: f64,
}

impl BernoulliHeadConfig {
    /// Creates a configuration with the default initialization
    /// (weights scaled by 0.01, zero bias).
    pub fn new(in_dim: i64, out_dim: i64) -> Self {
        Self {
            in_dim,
            out_dim,
            init_weight_scale: 0.01,
            init_bias: 0.0,
        }
    }

    /// Sets the multiplicative scale applied to the default weight init.
    pub fn init_weight_scale(mut self, v: f64) -> Self {
        self.init_weight_scale = v;
        self
    }

    /// Sets the constant the bias is filled with.
    pub fn init_bias(mut self, v: f64) -> Self {
        self.init_bias = v;
        self
    }

    /// Constructs [`BernoulliHeadConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`BernoulliHeadConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl OutDim for BernoulliHeadConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}

/// Output head producing a [`Bernoulli`] distribution per forward call.
///
/// Samples have shape `(batch_size, out_dim)`, one independent binary outcome
/// per output dimension.
pub struct BernoulliHead {
    device: Device,
    varmap: VarMap,
    in_dim: i64,
    out_dim: i64,
    linear: Linear,
}

impl BernoulliHead {
    /// Builds the head, applying the configured weight initialization.
    pub fn build(config: BernoulliHeadConfig, device: Device) -> Result<Self> {
        if config.in_dim <= 0 || config.out_dim <= 0 {
            return Err(HeadError::InvalidConfiguration(format!(
                "head dimensions must be positive, got in_dim={}, out_dim={}",
                config.in_dim, config.out_dim
            ))
            .into());
        }

        let varmap = VarMap::new();
        let linear = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            linear(config.in_dim as usize, config.out_dim as usize, vb.pp("linear"))?
        };
        init_weights(&varmap, config.init_weight_scale, config.init_bias)?;

        Ok(Self {
            device,
            varmap,
            in_dim: config.in_dim,
            out_dim: config.out_dim,
            linear,
        })
    }

    /// Maps the hidden batch to a [`Bernoulli`] over the linear logits.
    ///
    /// The logistic transform happens inside the distribution; logits are
    /// passed through unchanged.
    pub fn forward(&self, hidden: &Tensor) -> Result<Bernoulli> {
        check_input_shape(hidden, self.in_dim)?;
        let logits = self.linear.forward(&hidden.to_device(&self.device)?)?;
        Bernoulli::from_logits(logits)
    }

    /// Variables of the head, for an external optimizer.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the head parameters into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save Bernoulli head to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the head parameters from a file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load Bernoulli head from {:?}", path.as_ref());
        Ok(())
    }
}

impl OutputLayer for BernoulliHead {
    fn forward(&mut self, hidden: &Tensor) -> Result<Box<dyn Distribution>> {
        Ok(Box::new(BernoulliHead::forward(self, hidden)?))
    }

    fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_zero_out_dim() {
        let config = BernoulliHeadConfig::new(3, 0);
        assert!(BernoulliHead::build(config, Device::Cpu).is_err());
    }

    #[test]
    fn test_rejects_wrong_input_width() -> Result<()> {
        let head = BernoulliHead::build(BernoulliHeadConfig::new(3, 5), Device::Cpu)?;
        let hidden = Tensor::zeros(&[2, 4], DType::F32, &Device::Cpu)?;
        assert!(head.forward(&hidden).is_err());
        Ok(())
    }
}
