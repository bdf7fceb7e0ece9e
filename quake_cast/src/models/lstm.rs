//! Single-layer LSTM regressor
//!
//! A univariate LSTM layer followed by a one-unit dense head, built on
//! `burn` and trained on the `NdArray` CPU backend with autodiff, mean
//! squared error and the Adam optimiser.
//!
//! The configured [`Activation`] is applied to the final hidden state before
//! the dense head: `relu` rectifies it, `tanh` keeps the cell's own bounded
//! output.

use crate::config::Activation;
use crate::error::{ForecastError, Result};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::module::{AutodiffModule, Module};
use burn::nn::loss::{MseLoss, Reduction};
use burn::nn::{Initializer, Linear, LinearConfig, Lstm as LstmLayer, LstmConfig};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor, TensorData};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;
use tracing::debug;

type TrainBackend = Autodiff<NdArray>;

const ADAM_BETA1: f32 = 0.9;
const ADAM_BETA2: f32 = 0.999;
const ADAM_EPSILON: f32 = 1e-7;

/// The backend RNG is process-wide; seeding and initialisation must not
/// interleave between threads.
static BACKEND_SEED: Mutex<()> = Mutex::new(());

/// Optimisation settings for one call to [`Lstm::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for the batch shuffling
    pub seed: u64,
}

/// LSTM layer and dense head
#[derive(Module, Debug)]
pub struct LstmNetwork<B: Backend> {
    lstm: LstmLayer<B>,
    head: Linear<B>,
}

impl<B: Backend> LstmNetwork<B> {
    fn init(hidden: usize, device: &B::Device) -> Self {
        let glorot = Initializer::XavierUniform { gain: 1.0 };
        Self {
            lstm: LstmConfig::new(1, hidden, true)
                .with_initializer(glorot.clone())
                .init(device),
            head: LinearConfig::new(hidden, 1)
                .with_initializer(glorot)
                .init(device),
        }
    }

    /// `[batch, steps, 1]` sequences to `[batch, 1]` predictions
    fn forward(&self, inputs: Tensor<B, 3>, activation: Activation) -> Tensor<B, 2> {
        let (_, state) = self.lstm.forward(inputs, None);
        let hidden = match activation {
            Activation::Relu => relu(state.hidden),
            Activation::Tanh => state.hidden,
        };
        self.head.forward(hidden)
    }
}

/// Trainable LSTM regressor with a scalar output
#[derive(Debug, Clone)]
pub struct Lstm {
    hidden: usize,
    activation: Activation,
    network: LstmNetwork<TrainBackend>,
    device: NdArrayDevice,
}

impl Lstm {
    /// Create a network with Glorot-uniform weights drawn from `seed`
    pub fn new(hidden: usize, activation: Activation, seed: u64) -> Result<Self> {
        if hidden == 0 {
            return Err(ForecastError::InvalidParameter(
                "LSTM needs at least one hidden unit".to_string(),
            ));
        }
        let device = NdArrayDevice::default();
        let network = {
            let _guard = BACKEND_SEED
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            TrainBackend::seed(seed);
            LstmNetwork::init(hidden, &device)
        };

        Ok(Self {
            hidden,
            activation,
            network,
            device,
        })
    }

    /// Number of trainable parameters
    pub fn param_count(&self) -> usize {
        self.network.num_params()
    }

    /// Width of the hidden state
    pub fn hidden_units(&self) -> usize {
        self.hidden
    }

    /// Predict the next value after `sequence`
    pub fn predict(&self, sequence: &[f64]) -> f64 {
        let network = self.network.valid();
        let inputs = sequence_batch::<NdArray>(&[sequence], &self.device);
        network
            .forward(inputs, self.activation)
            .into_scalar()
            .elem::<f64>()
    }

    /// Train on `(sequence, target)` pairs, returning the mean loss per epoch
    pub fn fit(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[f64],
        options: &TrainOptions,
    ) -> Result<Vec<f64>> {
        if inputs.len() != targets.len() {
            return Err(ForecastError::DataError(format!(
                "Inputs length ({}) doesn't match targets length ({})",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(ForecastError::EmptyInput(
                "No training sequences".to_string(),
            ));
        }
        if options.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Batch size must be positive".to_string(),
            ));
        }

        let mut optimizer = AdamConfig::new()
            .with_beta_1(ADAM_BETA1)
            .with_beta_2(ADAM_BETA2)
            .with_epsilon(ADAM_EPSILON)
            .init();
        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut order: Vec<usize> = (0..inputs.len()).collect();
        let mut history = Vec::with_capacity(options.epochs);
        let mut network = self.network.clone();

        for epoch in 0..options.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            for batch in order.chunks(options.batch_size) {
                let sequences: Vec<&[f64]> = batch.iter().map(|&i| inputs[i].as_slice()).collect();
                let batch_targets: Vec<f64> = batch.iter().map(|&i| targets[i]).collect();

                let x = sequence_batch::<TrainBackend>(&sequences, &self.device);
                let y = target_batch::<TrainBackend>(&batch_targets, &self.device);
                let loss = MseLoss::new().forward(
                    network.forward(x, self.activation),
                    y,
                    Reduction::Mean,
                );
                epoch_loss += loss.clone().into_scalar().elem::<f64>() * batch.len() as f64;

                let grads = GradientsParams::from_grads(loss.backward(), &network);
                network = optimizer.step(options.learning_rate, network, grads);
            }

            let mean_loss = epoch_loss / inputs.len() as f64;
            if !mean_loss.is_finite() {
                return Err(ForecastError::Math(quake_math::MathError::CalculationError(
                    format!("training diverged at epoch {}", epoch + 1),
                )));
            }
            if (epoch + 1) % 10 == 0 {
                debug!(epoch = epoch + 1, loss = mean_loss, "lstm training");
            }
            history.push(mean_loss);
        }

        self.network = network;
        Ok(history)
    }
}

/// Stack equal-length sequences into a `[batch, steps, 1]` tensor
fn sequence_batch<B: Backend>(sequences: &[&[f64]], device: &B::Device) -> Tensor<B, 3> {
    let steps = sequences.first().map_or(0, |s| s.len());
    let flat: Vec<f32> = sequences
        .iter()
        .flat_map(|s| s.iter().map(|&v| v as f32))
        .collect();
    Tensor::from_data(TensorData::new(flat, [sequences.len(), steps, 1]), device)
}

fn target_batch<B: Backend>(targets: &[f64], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = targets.iter().map(|&v| v as f32).collect();
    Tensor::from_data(TensorData::new(flat, [targets.len(), 1]), device)
}
