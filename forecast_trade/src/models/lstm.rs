//! Single-layer LSTM with a linear read-out
//!
//! Parameter layout, with `H` hidden units and gate order input, forget,
//! candidate, output:
//!
//! | block   | length   | meaning                              |
//! |---------|----------|--------------------------------------|
//! | `w_x`   | `4H`     | input weight of each gate row        |
//! | `w_h`   | `4H * H` | recurrent weights, row-major by gate |
//! | `bias`  | `4H`     | gate biases                          |
//! | `w_out` | `H`      | read-out weights                     |
//! | `b_out` | `1`      | read-out bias                        |

use crate::error::{ForecastError, Result};
use crate::models::SequenceModel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

#[derive(Debug, Clone, Copy)]
struct Layout {
    hidden: usize,
}

impl Layout {
    fn w_x(&self) -> usize {
        0
    }

    fn w_h(&self) -> usize {
        4 * self.hidden
    }

    fn bias(&self) -> usize {
        self.w_h() + 4 * self.hidden * self.hidden
    }

    fn w_out(&self) -> usize {
        self.bias() + 4 * self.hidden
    }

    fn b_out(&self) -> usize {
        self.w_out() + self.hidden
    }

    fn total(&self) -> usize {
        self.b_out() + 1
    }
}

/// Activations of one time step, kept for backpropagation
#[derive(Debug)]
struct Step {
    x: f64,
    h_prev: Vec<f64>,
    c_prev: Vec<f64>,
    i: Vec<f64>,
    f: Vec<f64>,
    g: Vec<f64>,
    o: Vec<f64>,
    tanh_c: Vec<f64>,
    h: Vec<f64>,
    c: Vec<f64>,
}

/// LSTM forecaster over one input channel
#[derive(Debug, Clone)]
pub struct LstmModel {
    name: String,
    window_size: usize,
    hidden_size: usize,
    params: Vec<f64>,
}

impl LstmModel {
    /// Create a model with deterministic initial parameters
    ///
    /// Weights are drawn uniformly from `±1/sqrt(H)`; gate biases start at zero
    /// except the forget gate, which starts at one.
    pub fn new(window_size: usize, hidden_size: usize, seed: u64) -> Result<Self> {
        Self::check_shape(window_size, hidden_size)?;

        let layout = Layout {
            hidden: hidden_size,
        };
        let limit = (1.0 / hidden_size as f64).sqrt();
        let dist = Uniform::new(-limit, limit);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut params: Vec<f64> = (0..layout.total()).map(|_| dist.sample(&mut rng)).collect();

        for r in 0..4 * hidden_size {
            let forget_gate = (hidden_size..2 * hidden_size).contains(&r);
            params[layout.bias() + r] = if forget_gate { 1.0 } else { 0.0 };
        }
        params[layout.b_out()] = 0.0;

        Ok(Self::assemble(window_size, hidden_size, params))
    }

    /// Create a model from an explicit parameter vector
    pub fn from_parameters(
        window_size: usize,
        hidden_size: usize,
        params: Vec<f64>,
    ) -> Result<Self> {
        Self::check_shape(window_size, hidden_size)?;

        let expected = Self::parameter_count(hidden_size);
        if params.len() != expected {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected {} parameters for {} hidden units, got {}",
                expected,
                hidden_size,
                params.len()
            )));
        }

        Ok(Self::assemble(window_size, hidden_size, params))
    }

    /// Size of the flat parameter vector for `hidden_size` units
    pub fn parameter_count(hidden_size: usize) -> usize {
        Layout {
            hidden: hidden_size,
        }
        .total()
    }

    /// Hidden units
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn assemble(window_size: usize, hidden_size: usize, params: Vec<f64>) -> Self {
        Self {
            name: format!("LSTM (window={}, hidden={})", window_size, hidden_size),
            window_size,
            hidden_size,
            params,
        }
    }

    fn check_shape(window_size: usize, hidden_size: usize) -> Result<()> {
        if window_size == 0 || hidden_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size and hidden size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn layout(&self) -> Layout {
        Layout {
            hidden: self.hidden_size,
        }
    }

    fn check_window(&self, window: &[f64]) -> Result<()> {
        if window.len() != self.window_size {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected a window of {} values, got {}",
                self.window_size,
                window.len()
            )));
        }
        Ok(())
    }

    fn step(&self, x: f64, h_prev: &[f64], c_prev: &[f64]) -> Step {
        let h = self.hidden_size;
        let layout = self.layout();
        let p = &self.params;

        let z: Vec<f64> = (0..4 * h)
            .map(|r| {
                let row = &p[layout.w_h() + r * h..layout.w_h() + (r + 1) * h];
                let recurrent: f64 = row.iter().zip(h_prev).map(|(w, hp)| w * hp).sum();
                p[layout.w_x() + r] * x + recurrent + p[layout.bias() + r]
            })
            .collect();

        let i: Vec<f64> = z[..h].iter().map(|&v| sigmoid(v)).collect();
        let f: Vec<f64> = z[h..2 * h].iter().map(|&v| sigmoid(v)).collect();
        let g: Vec<f64> = z[2 * h..3 * h].iter().map(|v| v.tanh()).collect();
        let o: Vec<f64> = z[3 * h..].iter().map(|&v| sigmoid(v)).collect();

        let c: Vec<f64> = (0..h).map(|k| f[k] * c_prev[k] + i[k] * g[k]).collect();
        let tanh_c: Vec<f64> = c.iter().map(|v| v.tanh()).collect();
        let h_next: Vec<f64> = (0..h).map(|k| o[k] * tanh_c[k]).collect();

        Step {
            x,
            h_prev: h_prev.to_vec(),
            c_prev: c_prev.to_vec(),
            i,
            f,
            g,
            o,
            tanh_c,
            h: h_next,
            c,
        }
    }

    fn unroll(&self, window: &[f64]) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::with_capacity(window.len());
        let zeros = vec![0.0; self.hidden_size];

        for &x in window {
            let step = match steps.last() {
                Some(prev) => self.step(x, &prev.h, &prev.c),
                None => self.step(x, &zeros, &zeros),
            };
            steps.push(step);
        }

        steps
    }

    fn read_out(&self, h: &[f64]) -> f64 {
        let layout = self.layout();
        let w_out = &self.params[layout.w_out()..layout.b_out()];
        w_out.iter().zip(h).map(|(w, v)| w * v).sum::<f64>() + self.params[layout.b_out()]
    }
}

impl SequenceModel for LstmModel {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        self.check_window(window)?;
        let steps = self.unroll(window);
        Ok(steps.last().map_or(0.0, |s| self.read_out(&s.h)))
    }

    fn gradient(&self, window: &[f64], label: f64) -> Result<(f64, Vec<f64>)> {
        self.check_window(window)?;

        let h = self.hidden_size;
        let layout = self.layout();
        let p = &self.params;
        let steps = self.unroll(window);
        let last_h = steps.last().map(|s| s.h.clone()).unwrap_or_else(|| vec![0.0; h]);

        let error = self.read_out(&last_h) - label;
        let loss = error * error;
        let d_out = 2.0 * error;

        let mut grad = vec![0.0; layout.total()];
        for k in 0..h {
            grad[layout.w_out() + k] = d_out * last_h[k];
        }
        grad[layout.b_out()] = d_out;

        let mut dh: Vec<f64> = (0..h).map(|k| d_out * p[layout.w_out() + k]).collect();
        let mut dc = vec![0.0; h];
        let mut dz = vec![0.0; 4 * h];

        for step in steps.iter().rev() {
            for k in 0..h {
                let d_o = dh[k] * step.tanh_c[k];
                dc[k] += dh[k] * step.o[k] * (1.0 - step.tanh_c[k] * step.tanh_c[k]);

                let d_i = dc[k] * step.g[k];
                let d_g = dc[k] * step.i[k];
                let d_f = dc[k] * step.c_prev[k];

                dz[k] = d_i * step.i[k] * (1.0 - step.i[k]);
                dz[h + k] = d_f * step.f[k] * (1.0 - step.f[k]);
                dz[2 * h + k] = d_g * (1.0 - step.g[k] * step.g[k]);
                dz[3 * h + k] = d_o * step.o[k] * (1.0 - step.o[k]);

                // carry into the previous cell state
                dc[k] *= step.f[k];
            }

            let mut dh_prev = vec![0.0; h];
            for (r, &dz_r) in dz.iter().enumerate() {
                grad[layout.w_x() + r] += dz_r * step.x;
                grad[layout.bias() + r] += dz_r;

                let row = layout.w_h() + r * h;
                for j in 0..h {
                    grad[row + j] += dz_r * step.h_prev[j];
                    dh_prev[j] += p[row + j] * dz_r;
                }
            }
            dh = dh_prev;
        }

        Ok((loss, grad))
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
