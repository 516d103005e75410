//! Regression model capability consumed by the forecaster
//!
//! The forecaster only needs `predict(features) -> value`. Training and
//! persistence live outside this crate; any implementation of
//! [`RegressionModel`] can be plugged in.

use crate::error::{ForecastError, Result};
use crate::features::FeatureVector;
use std::fmt::{self, Debug};
use std::sync::Mutex;

pub mod linear;

pub use linear::LinearModel;

/// Stateless inference over a feature vector.
///
/// Implementations must be safe to call from many sites at once and must not
/// change their parameters while predicting.
pub trait RegressionModel: Debug + Send + Sync {
    /// Predict the value for one forecast step
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// A model whose inference needs exclusive access (`&mut self`)
pub trait ExclusiveModel: Debug + Send {
    /// Predict the value for one forecast step
    fn predict_mut(&mut self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Serializes calls into an [`ExclusiveModel`] so it can be shared by the batch.
///
/// Only inference is serialized; feature construction and buffer bookkeeping
/// in each site's forecaster still run in parallel.
#[derive(Debug)]
pub struct SerializedModel<M> {
    name: String,
    inner: Mutex<M>,
}

impl<M: ExclusiveModel> SerializedModel<M> {
    pub fn new(model: M) -> Self {
        Self {
            name: format!("{} (serialized)", model.name()),
            inner: Mutex::new(model),
        }
    }

    /// Recover the wrapped model
    pub fn into_inner(self) -> Result<M> {
        self.inner
            .into_inner()
            .map_err(|_| ForecastError::FatalConfiguration("model lock poisoned".to_string()))
    }
}

impl<M: ExclusiveModel> RegressionModel for SerializedModel<M> {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        // A poisoned lock means a previous prediction panicked mid-update
        let mut model = self
            .inner
            .lock()
            .map_err(|_| ForecastError::FatalConfiguration("model lock poisoned".to_string()))?;
        model.predict_mut(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapts a closure into a [`RegressionModel`]
pub struct FnModel<F> {
    name: String,
    predict: F,
}

impl<F> FnModel<F>
where
    F: Fn(&FeatureVector) -> Result<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, predict: F) -> Self {
        Self {
            name: name.into(),
            predict,
        }
    }
}

impl<F> Debug for FnModel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel").field("name", &self.name).finish()
    }
}

impl<F> RegressionModel for FnModel<F>
where
    F: Fn(&FeatureVector) -> Result<f64> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (self.predict)(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
