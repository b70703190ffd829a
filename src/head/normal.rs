//! Output head for continuous actions with annealed exploration.
use super::OutputLayer;
use crate::{
    dist::{Distribution, Normal},
    error::HeadError,
    init::init_weights,
    util::{check_input_shape, OutDim},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{init::Init, linear, Linear, Module, VarBuilder, VarMap};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`NormalHead`].
pub struct NormalHeadConfig {
    pub in_dim: i64,
    pub out_dim: i64,
    pub init_weight_scale: f64,
    pub init_bias: f64,
    /// Clamp bounds of the learned log-scale, guarding `exp` against
    /// overflow and collapse.
    pub min_scale_log: f64,
    pub max_scale_log: f64,
    /// Multiplicative decay of the exploration factor per forward call.
    pub exploration_decay: f64,
}

impl NormalHeadConfig {
    /// Creates a configuration with the default initialization
    /// (weights kept at their default scale, zero bias).
    pub fn new(in_dim: i64, out_dim: i64) -> Self {
        Self {
            in_dim,
            out_dim,
            init_weight_scale: 1.0,
            init_bias: 0.0,
            min_scale_log: -20.0,
            max_scale_log: 2.0,
            exploration_decay: 0.99,
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

    /// Sets the minimum value of the learned log-scale.
    pub fn min_scale_log(mut self, v: f64) -> Self {
        self.min_scale_log = v;
        self
    }

    /// Sets the maximum value of the learned log-scale.
    pub fn max_scale_log(mut self, v: f64) -> Self {
        self.max_scale_log = v;
        self
    }

    /// Sets the per-call exploration decay (1.0 disables annealing).
    pub fn exploration_decay(mut self, v: f64) -> Self {
        self.exploration_decay = v;
        self
    }

    /// Constructs [`NormalHeadConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NormalHeadConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl OutDim for NormalHeadConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}

/// Output head producing a [`Normal`] distribution per forward call.
///
/// The location comes from the linear transform; the standard deviation is
/// `exp(scale_log) * exploration_factor`, where `scale_log` is a learned
/// `(out_dim,)` parameter initialized to zeros and the exploration factor
/// starts at 1.0 and shrinks by a fixed ratio on every forward call,
/// approaching but never reaching zero. The decay runs unconditionally, also
/// for evaluation-only forwards.
///
/// `forward` takes `&mut self` because of that factor; a head shared across
/// threads needs external serialization.
pub struct NormalHead {
    device: Device,
    varmap: VarMap,
    in_dim: i64,
    out_dim: i64,
    linear_loc: Linear,
    scale_log: Tensor,
    min_scale_log: f64,
    max_scale_log: f64,
    exploration_decay: f64,
    exploration_factor: f64,
}

impl NormalHead {
    /// Builds the head, applying the configured weight initialization.
    pub fn build(config: NormalHeadConfig, device: Device) -> Result<Self> {
        if config.in_dim <= 0 || config.out_dim <= 0 {
            return Err(HeadError::InvalidConfiguration(format!(
                "head dimensions must be positive, got in_dim={}, out_dim={}",
                config.in_dim, config.out_dim
            ))
            .into());
        }
        if config.exploration_decay <= 0.0 || config.exploration_decay > 1.0 {
            return Err(HeadError::InvalidConfiguration(format!(
                "exploration_decay must be in (0, 1], got {}",
                config.exploration_decay
            ))
            .into());
        }

        let varmap = VarMap::new();
        let (linear_loc, scale_log) = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            let linear_loc = linear(
                config.in_dim as usize,
                config.out_dim as usize,
                vb.pp("linear_loc"),
            )?;
            let scale_log =
                vb.get_with_hints(config.out_dim as usize, "scale_log", Init::Const(0.0))?;
            (linear_loc, scale_log)
        };
        init_weights(&varmap, config.init_weight_scale, config.init_bias)?;

        Ok(Self {
            device,
            varmap,
            in_dim: config.in_dim,
            out_dim: config.out_dim,
            linear_loc,
            scale_log,
            min_scale_log: config.min_scale_log,
            max_scale_log: config.max_scale_log,
            exploration_decay: config.exploration_decay,
            exploration_factor: 1.0,
        })
    }

    /// Maps the hidden batch to a [`Normal`] and decays the exploration
    /// factor.
    ///
    /// The factor is applied to the scale of the returned distribution first,
    /// then multiplied by the decay ratio, once per call.
    pub fn forward(&mut self, hidden: &Tensor) -> Result<Normal> {
        check_input_shape(hidden, self.in_dim)?;

        let loc = self.linear_loc.forward(&hidden.to_device(&self.device)?)?;
        trace!("exploration factor: {}", self.exploration_factor);
        let scale = (self
            .scale_log
            .clamp(self.min_scale_log, self.max_scale_log)?
            .exp()?
            * self.exploration_factor)?;

        let dist = Normal::new(loc, scale)?;
        self.exploration_factor *= self.exploration_decay;
        Ok(dist)
    }

    /// Current exploration factor; starts at 1.0 and shrinks per forward
    /// call.
    pub fn exploration_factor(&self) -> f64 {
        self.exploration_factor
    }

    /// Variables of the head, for an external optimizer. Includes the learned
    /// log-scale; excludes the exploration factor, which is runtime state.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the head parameters into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save normal head to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the head parameters from a file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load normal head from {:?}", path.as_ref());
        Ok(())
    }
}

impl OutputLayer for NormalHead {
    fn forward(&mut self, hidden: &Tensor) -> Result<Box<dyn Distribution>> {
        Ok(Box::new(NormalHead::forward(self, hidden)?))
    }

    fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exploration_factor_decays_per_call() -> Result<()> {
        let mut head = NormalHead::build(NormalHeadConfig::new(3, 5), Device::Cpu)?;
        let hidden = Tensor::zeros(&[2, 3], DType::F32, &Device::Cpu)?;

        assert_eq!(head.exploration_factor(), 1.0);
        for _ in 0..3 {
            head.forward(&hidden)?;
        }
        assert!((head.exploration_factor() - 0.99f64.powi(3)).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_decay_applies_after_distribution_construction() -> Result<()> {
        let mut head = NormalHead::build(NormalHeadConfig::new(3, 5), Device::Cpu)?;
        let hidden = Tensor::zeros(&[2, 3], DType::F32, &Device::Cpu)?;

        // scale_log is all zeros, so the scale of the k-th distribution is
        // exactly the factor before the k-th decay.
        let first = head.forward(&hidden)?;
        assert!((first.scale().to_vec2::<f32>()?[0][0] - 1.0).abs() < 1e-6);
        let second = head.forward(&hidden)?;
        assert!((second.scale().to_vec2::<f32>()?[0][0] - 0.99).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_decay() {
        let config = NormalHeadConfig::new(3, 5).exploration_decay(0.0);
        assert!(NormalHead::build(config, Device::Cpu).is_err());
    }
}
