//! Weight initialization of output heads.
use anyhow::Result;
use candle_nn::VarMap;

/// Rescales weights and fills biases of all variables in a [`VarMap`].
///
/// Every variable whose name ends with `.weight` is multiplied in place by
/// `weight_scale`; every variable whose name ends with `.bias` is set to the
/// constant `bias_value`. Other variables are left untouched. Called once at
/// head construction, before any forward pass, so that the initial action
/// distribution starts near-uniform (small logits) or near-zero-mean.
///
/// An empty varmap is a no-op.
pub fn init_weights(varmap: &VarMap, weight_scale: f64, bias_value: f64) -> Result<()> {
    let vars = varmap.data().lock().unwrap();

    for (name, var) in vars.iter() {
        if name.ends_with(".weight") {
            let t = (var.as_tensor() * weight_scale)?;
            var.set(&t)?;
        } else if name.ends_with(".bias") {
            let t = (var.as_tensor().zeros_like()? + bias_value)?;
            var.set(&t)?;
        }
    }

    Ok(())
}
