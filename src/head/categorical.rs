//! Output head for a single discrete action per batch row.
use super::OutputLayer;
use crate::{
    dist::{Categorical, Distribution},
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
/// Configuration of [`CategoricalHead`].
pub struct CategoricalHeadConfig {
    pub in_dim: i64,
    pub out_dim: i64,
    pub init_weight_scale: f64,
    pub init_bias: f64,
}

impl CategoricalHeadConfig {
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

    /// Constructs [`CategoricalHeadConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CategoricalHeadConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl OutDim for CategoricalHeadConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}

/// Output head producing a [`Categorical`] distribution per forward call.
///
/// The `out_dim` logits of each batch row are unnormalized log-probabilities
/// over mutually exclusive classes; samples have shape `(batch_size,)`, a
/// single action id per row.
pub struct CategoricalHead {
    device: Device,
    varmap: VarMap,
    in_dim: i64,
    out_dim: i64,
    linear: Linear,
}

impl CategoricalHead {
    /// Builds the head, applying the configured weight initialization.
    pub fn build(config: CategoricalHeadConfig, device: Device) -> Result<Self> {
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

    /// Maps the hidden batch to a [`Categorical`] over the linear logits.
    pub fn forward(&self, hidden: &Tensor) -> Result<Categorical> {
        check_input_shape(hidden, self.in_dim)?;
        let logits = self.linear.forward(&hidden.to_device(&self.device)?)?;
        Categorical::from_logits(logits)
    }

    /// Variables of the head, for an external optimizer.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the head parameters into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save categorical head to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the head parameters from a file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load categorical head from {:?}", path.as_ref());
        Ok(())
    }
}

impl OutputLayer for CategoricalHead {
    fn forward(&mut self, hidden: &Tensor) -> Result<Box<dyn Distribution>> {
        Ok(Box::new(CategoricalHead::forward(self, hidden)?))
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
        let config = CategoricalHeadConfig::new(3, 0);
        assert!(CategoricalHead::build(config, Device::Cpu).is_err());
    }

    #[test]
    fn test_rejects_rank_one_input() -> Result<()> {
        let head = CategoricalHead::build(CategoricalHeadConfig::new(3, 5), Device::Cpu)?;
        let hidden = Tensor::zeros(&[3], DType::F32, &Device::Cpu)?;
        assert!(head.forward(&hidden).is_err());
        Ok(())
    }
}
