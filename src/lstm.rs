//! Reference LSTM forward pass
//!
//! A minimal single-layer LSTM plus dense output evaluator, used solely to
//! produce expected numeric outputs for cross-checking the embedded runtime
//! against converted weights. Gate order matches the source model layout:
//! `[input, forget, cell-candidate, output]`. Not a production inference
//! path; there is intentionally no batching or vectorization.

use crate::model::RecurrentModel;

/// Single-layer LSTM + dense evaluator with explicit state.
///
/// State starts at zero and is resettable via [`ReferenceLstm::reset`]
/// between independent runs.
#[derive(Debug, Clone)]
pub struct ReferenceLstm {
    hidden_size: usize,
    /// Input kernel W, length `4 * hidden`
    kernel: Vec<f32>,
    /// Recurrent kernel U, row-major `(hidden, 4 * hidden)`
    recurrent: Vec<f32>,
    /// Gate bias b, length `4 * hidden`
    bias: Vec<f32>,
    /// Dense output weights, length `hidden`
    dense_weight: Vec<f32>,
    /// Dense output bias (scalar)
    dense_bias: f32,
    /// Hidden state vector
    h: Vec<f32>,
    /// Cell state vector
    c: Vec<f32>,
}

impl ReferenceLstm {
    /// Build an evaluator from a parsed model's weight tensors.
    pub fn from_model(model: &RecurrentModel) -> Self {
        ReferenceLstm {
            hidden_size: model.hidden_size,
            kernel: model.kernel.clone(),
            recurrent: model.recurrent.clone(),
            bias: model.bias.clone(),
            dense_weight: model.dense_weight.clone(),
            dense_bias: model.dense_bias[0],
            h: vec![0.0; model.hidden_size],
            c: vec![0.0; model.hidden_size],
        }
    }

    /// Reset hidden and cell state to zero.
    pub fn reset(&mut self) {
        self.h.fill(0.0);
        self.c.fill(0.0);
    }

    /// Advance one step on scalar input `x` and return the dense output.
    ///
    /// Per-step update:
    /// ```text
    /// gates = x*W + h*U + b
    /// i = sigmoid(gates[0:h]); f = sigmoid(gates[h:2h])
    /// g = tanh(gates[2h:3h]);  o = sigmoid(gates[3h:4h])
    /// c' = f*c + i*g
    /// h' = o * tanh(c')
    /// y  = h'*Wd + bd
    /// ```
    pub fn step(&mut self, x: f32) -> f32 {
        let n = self.hidden_size;

        // gates = x*W + h*U + b (input width is 1, so x*W is a scale)
        let mut gates = vec![0.0f32; 4 * n];
        for (g, (w, b)) in gates
            .iter_mut()
            .zip(self.kernel.iter().zip(self.bias.iter()))
        {
            *g = x * w + b;
        }
        for (row, h_val) in self.h.iter().enumerate() {
            let row_base = row * 4 * n;
            for (j, g) in gates.iter_mut().enumerate() {
                *g += h_val * self.recurrent[row_base + j];
            }
        }

        // Gate slices: [input, forget, cell-candidate, output]
        for j in 0..n {
            let i_gate = stable_sigmoid(gates[j]);
            let f_gate = stable_sigmoid(gates[n + j]);
            let g_cand = gates[2 * n + j].tanh();
            let o_gate = stable_sigmoid(gates[3 * n + j]);

            self.c[j] = f_gate * self.c[j] + i_gate * g_cand;
            self.h[j] = o_gate * self.c[j].tanh();
        }

        // Dense output layer
        let mut y = self.dense_bias;
        for (h_val, w) in self.h.iter().zip(self.dense_weight.iter()) {
            y += h_val * w;
        }
        y
    }

    /// Run a full input sequence from the current state.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        input.iter().map(|&x| self.step(x)).collect()
    }
}

/// Numerically stable sigmoid.
///
/// Two-branch form so `exp` never sees a large positive argument: plain
/// `1/(1+e^-x)` overflows `e^-x` for large negative `x`.
fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
