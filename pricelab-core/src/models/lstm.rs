//! Stacked LSTM regressor.
//!
//! Architecture: LSTM(50, full sequence) → Dropout(0.2) → LSTM(50, last step)
//! → Dropout(0.2) → Dense(25) → Dense(1). Every sample is a length-1
//! sequence holding one scaled close. Trained on squared error with Adam,
//! batch size 1, for a fixed number of epochs over a seeded shuffle of the
//! training partition.
//!
//! Targets are min-max scaled on the training partition before fitting and
//! mapped back on output, so the network always learns values in `[0, 1]`.

use ndarray::{s, Array, Array1, Array2, Axis, Dimension, Ix1, Ix2, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{check_fit_input, not_fitted, Regressor};
use crate::error::PredictError;
use crate::pipeline::MinMaxScaler;
use crate::rng::SeedHierarchy;

#[derive(Debug, Clone)]
pub struct LstmConfig {
    /// Width of both recurrent layers.
    pub hidden: usize,
    /// Width of the first dense layer.
    pub dense: usize,
    /// Dropout rate after each recurrent layer.
    pub dropout: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            hidden: 50,
            dense: 25,
            dropout: 0.2,
            epochs: 25,
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

// ─── Parameters and Adam ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Param<D: Dimension> {
    value: Array<f64, D>,
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Param<D> {
    fn new(value: Array<f64, D>) -> Self {
        let m = Array::zeros(value.raw_dim());
        let v = Array::zeros(value.raw_dim());
        Self { value, m, v }
    }

    fn step(&mut self, grad: &Array<f64, D>, config: &LstmConfig, t: i32) {
        let (b1, b2, eps) = (config.beta1, config.beta2, config.epsilon);
        let lr = config.learning_rate * (1.0 - b2.powi(t)).sqrt() / (1.0 - b1.powi(t));
        Zip::from(&mut self.value)
            .and(grad)
            .and(&mut self.m)
            .and(&mut self.v)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                *p -= lr * *m / (v.sqrt() + eps);
            });
    }
}

/// Glorot-uniform matrix of shape `(rows, cols)`.
fn glorot(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    a.view()
        .insert_axis(Axis(1))
        .dot(&b.view().insert_axis(Axis(0)))
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}

// ─── Layers ──────────────────────────────────────────────────────────

/// Per-timestep values kept for backpropagation.
#[derive(Debug, Clone)]
struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

struct LayerGrads {
    wx: Array2<f64>,
    wh: Array2<f64>,
    b: Array1<f64>,
}

/// One recurrent layer. Gate rows are stacked `[input, forget, cell, output]`.
#[derive(Debug, Clone)]
struct LstmLayer {
    hidden: usize,
    wx: Param<Ix2>,
    wh: Param<Ix2>,
    b: Param<Ix1>,
}

impl LstmLayer {
    fn new(input: usize, hidden: usize, rng: &mut StdRng) -> Self {
        let mut b: Array1<f64> = Array1::zeros(4 * hidden);
        b.slice_mut(s![hidden..2 * hidden]).fill(1.0);
        Self {
            hidden,
            wx: Param::new(glorot(4 * hidden, input, rng)),
            wh: Param::new(glorot(4 * hidden, hidden, rng)),
            b: Param::new(b),
        }
    }

    fn forward(&self, xs: &[Array1<f64>]) -> (Vec<Array1<f64>>, Vec<StepCache>) {
        let h = self.hidden;
        let mut h_prev = Array1::zeros(h);
        let mut c_prev = Array1::zeros(h);
        let mut outputs = Vec::with_capacity(xs.len());
        let mut caches = Vec::with_capacity(xs.len());

        for x in xs {
            let z = self.wx.value.dot(x) + self.wh.value.dot(&h_prev) + &self.b.value;
            let i = z.slice(s![0..h]).mapv(sigmoid);
            let f = z.slice(s![h..2 * h]).mapv(sigmoid);
            let g = z.slice(s![2 * h..3 * h]).mapv(f64::tanh);
            let o = z.slice(s![3 * h..4 * h]).mapv(sigmoid);
            let c = &f * &c_prev + &i * &g;
            let tanh_c = c.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            caches.push(StepCache {
                x: x.clone(),
                h_prev: h_prev.clone(),
                c_prev: c_prev.clone(),
                i,
                f,
                g,
                o,
                tanh_c,
            });
            outputs.push(h_next.clone());
            h_prev = h_next;
            c_prev = c;
        }
        (outputs, caches)
    }

    /// Backpropagation through time. `dhs[t]` is the loss gradient flowing
    /// into the output at step `t`; returns parameter gradients and input
    /// gradients per step.
    fn backward(&self, caches: &[StepCache], dhs: &[Array1<f64>]) -> (LayerGrads, Vec<Array1<f64>>) {
        let h = self.hidden;
        let mut grads = LayerGrads {
            wx: Array2::zeros(self.wx.value.raw_dim()),
            wh: Array2::zeros(self.wh.value.raw_dim()),
            b: Array1::zeros(4 * h),
        };
        let mut dxs = vec![Array1::zeros(0); caches.len()];
        let mut dh_next: Array1<f64> = Array1::zeros(h);
        let mut dc_next: Array1<f64> = Array1::zeros(h);

        for t in (0..caches.len()).rev() {
            let cache = &caches[t];
            let dh = &dhs[t] + &dh_next;
            let d_o = &dh * &cache.tanh_c;
            let dc = &dh * &cache.o * &cache.tanh_c.mapv(|v| 1.0 - v * v) + &dc_next;
            let di = &dc * &cache.g;
            let dg = &dc * &cache.i;
            let df = &dc * &cache.c_prev;
            dc_next = &dc * &cache.f;

            let mut dz = Array1::zeros(4 * h);
            dz.slice_mut(s![0..h])
                .assign(&(&di * &cache.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![h..2 * h])
                .assign(&(&df * &cache.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * h..3 * h])
                .assign(&(&dg * &cache.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * h..4 * h])
                .assign(&(&d_o * &cache.o.mapv(|v| v * (1.0 - v))));

            grads.wx += &outer(&dz, &cache.x);
            grads.wh += &outer(&dz, &cache.h_prev);
            grads.b += &dz;
            dxs[t] = self.wx.value.t().dot(&dz);
            dh_next = self.wh.value.t().dot(&dz);
        }
        (grads, dxs)
    }

    fn apply(&mut self, grads: &LayerGrads, config: &LstmConfig, t: i32) {
        self.wx.step(&grads.wx, config, t);
        self.wh.step(&grads.wh, config, t);
        self.b.step(&grads.b, config, t);
    }
}

/// Fully connected layer with linear activation.
#[derive(Debug, Clone)]
struct Dense {
    w: Param<Ix2>,
    b: Param<Ix1>,
}

impl Dense {
    fn new(input: usize, output: usize, rng: &mut StdRng) -> Self {
        Self {
            w: Param::new(glorot(output, input, rng)),
            b: Param::new(Array1::zeros(output)),
        }
    }

    fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.w.value.dot(x) + &self.b.value
    }

    /// Returns `(dW, db, dx)`.
    fn backward(&self, x: &Array1<f64>, dy: &Array1<f64>) -> (Array2<f64>, Array1<f64>, Array1<f64>) {
        (outer(dy, x), dy.clone(), self.w.value.t().dot(dy))
    }
}

// ─── Network ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Network {
    first: LstmLayer,
    second: LstmLayer,
    hidden_dense: Dense,
    output: Dense,
}

impl Network {
    fn new(config: &LstmConfig, rng: &mut StdRng) -> Self {
        Self {
            first: LstmLayer::new(1, config.hidden, rng),
            second: LstmLayer::new(config.hidden, config.hidden, rng),
            hidden_dense: Dense::new(config.hidden, config.dense, rng),
            output: Dense::new(config.dense, 1, rng),
        }
    }

    fn sequence(x: f64) -> Vec<Array1<f64>> {
        vec![Array1::from_elem(1, x)]
    }

    fn infer(&self, x: f64) -> f64 {
        let (h1, _) = self.first.forward(&Self::sequence(x));
        let (h2, _) = self.second.forward(&h1);
        let last = h2.last().cloned().unwrap_or_else(|| Array1::zeros(0));
        self.output.forward(&self.hidden_dense.forward(&last))[0]
    }

    /// One forward/backward pass on a single sample with dropout, followed
    /// by an Adam update. Returns the squared error before the update.
    fn train_step(
        &mut self,
        x: f64,
        y: f64,
        config: &LstmConfig,
        rng: &mut StdRng,
        t: i32,
    ) -> f64 {
        let keep = 1.0 - config.dropout;
        let mut mask = |n: usize| -> Array1<f64> {
            Array1::from_shape_fn(n, |_| {
                if rng.gen::<f64>() < config.dropout {
                    0.0
                } else {
                    1.0 / keep
                }
            })
        };

        let xs = Self::sequence(x);
        let (h1s, cache1) = self.first.forward(&xs);
        let masks1: Vec<Array1<f64>> = h1s.iter().map(|h| mask(h.len())).collect();
        let dropped1: Vec<Array1<f64>> = h1s.iter().zip(&masks1).map(|(h, m)| h * m).collect();

        let (h2s, cache2) = self.second.forward(&dropped1);
        let last = h2s.len() - 1;
        let mask2 = mask(config.hidden);
        let dropped2 = &h2s[last] * &mask2;

        let a1 = self.hidden_dense.forward(&dropped2);
        let prediction = self.output.forward(&a1)[0];
        let error = prediction - y;

        let d_out = Array1::from_elem(1, 2.0 * error);
        let (dw_out, db_out, da1) = self.output.backward(&a1, &d_out);
        let (dw_hidden, db_hidden, d_dropped2) = self.hidden_dense.backward(&dropped2, &da1);

        let mut dh2s = vec![Array1::zeros(config.hidden); h2s.len()];
        dh2s[last] = &d_dropped2 * &mask2;
        let (grads2, d_dropped1) = self.second.backward(&cache2, &dh2s);
        let dh1s: Vec<Array1<f64>> = d_dropped1.iter().zip(&masks1).map(|(d, m)| d * m).collect();
        let (grads1, _) = self.first.backward(&cache1, &dh1s);

        self.output.w.step(&dw_out, config, t);
        self.output.b.step(&db_out, config, t);
        self.hidden_dense.w.step(&dw_hidden, config, t);
        self.hidden_dense.b.step(&db_hidden, config, t);
        self.second.apply(&grads2, config, t);
        self.first.apply(&grads1, config, t);

        error * error
    }
}

// ─── Regressor ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct FittedLstm {
    network: Network,
    targets: MinMaxScaler,
}

#[derive(Debug, Clone)]
pub struct LstmRegressor {
    config: LstmConfig,
    seeds: SeedHierarchy,
    fitted: Option<FittedLstm>,
    loss_history: Vec<f64>,
}

impl LstmRegressor {
    pub fn new(config: LstmConfig, seeds: SeedHierarchy) -> Self {
        Self {
            config,
            seeds,
            fitted: None,
            loss_history: Vec::new(),
        }
    }

    /// Mean squared error (scaled targets) per epoch of the last fit.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }
}

impl Regressor for LstmRegressor {
    fn name(&self) -> &str {
        "LSTM"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), PredictError> {
        check_fit_input(self.name(), x, y)?;
        if !(0.0..1.0).contains(&self.config.dropout) {
            return Err(PredictError::ModelFitFailure(format!(
                "LSTM: dropout must be in [0, 1), got {}",
                self.config.dropout
            )));
        }

        let targets = MinMaxScaler::fit(y);
        let scaled_y = targets.transform(y);

        let mut init_rng = self.seeds.rng_for("LSTM/init", 0);
        let mut dropout_rng = self.seeds.rng_for("LSTM/dropout", 0);
        let mut network = Network::new(&self.config, &mut init_rng);

        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut step: i32 = 0;
        self.loss_history.clear();
        for epoch in 0..self.config.epochs {
            let mut shuffle_rng = self.seeds.rng_for("LSTM/shuffle", epoch as u64);
            order.shuffle(&mut shuffle_rng);

            let mut total = 0.0;
            for &i in &order {
                step = step.saturating_add(1);
                total += network.train_step(x[i], scaled_y[i], &self.config, &mut dropout_rng, step);
            }
            let loss = total / order.len() as f64;
            if !loss.is_finite() {
                return Err(PredictError::ModelFitFailure(format!(
                    "LSTM: loss diverged in epoch {epoch}"
                )));
            }
            self.loss_history.push(loss);
        }

        tracing::debug!(
            samples = x.len(),
            epochs = self.config.epochs,
            final_loss = self.loss_history.last().copied().unwrap_or(f64::NAN),
            "lstm fit complete"
        );
        self.fitted = Some(FittedLstm { network, targets });
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let scaled: Vec<f64> = x.iter().map(|&v| fitted.network.infer(v)).collect();
        Ok(fitted.targets.inverse_transform(&scaled))
    }
}
