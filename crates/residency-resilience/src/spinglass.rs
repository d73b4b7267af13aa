//! Spin-Glass Diversity Model (spec §4.5.5, optional): a statistical-
//! physics analogy used to measure how diverse the set of candidate
//! schedules produced under stress actually is, so the fallback/sacrifice
//! machinery isn't silently converging on one fragile shape.
//!
//! Each person is a spin `s_i ∈ {-1, +1}` (roughly, "on the A side" vs
//! "on the B side" of a scheduling split); the coupling matrix `J`
//! encodes how strongly two people's assignments pull toward agreement
//! or disagreement. Annealed via single-spin-flip Metropolis-Hastings,
//! matching the teacher's autonomic crate's simulated-annealing planner
//! in spirit (`reference_autonomic/src/planner.rs`) though this is a
//! from-scratch physical model, not a port of that code.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SpinGlassModel {
    n: usize,
    coupling: Vec<Vec<f64>>,
}

impl SpinGlassModel {
    /// Build a model over `n` spins with a random symmetric coupling
    /// matrix in `[-1, 1]`, seeded for reproducibility.
    pub fn new(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut coupling = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let j_ij = rng.gen_range(-1.0..=1.0);
                coupling[i][j] = j_ij;
                coupling[j][i] = j_ij;
            }
        }
        Self { n, coupling }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `E(s) = -Σ_{i<j} J_ij s_i s_j`: lower energy means spins agree
    /// where coupling is positive and disagree where it's negative.
    pub fn energy(&self, spins: &[i8]) -> f64 {
        debug_assert_eq!(spins.len(), self.n);
        let mut e = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                e -= self.coupling[i][j] * spins[i] as f64 * spins[j] as f64;
            }
        }
        e
    }

    /// Single-spin-flip Metropolis-Hastings annealing from `initial`,
    /// cooling linearly from `initial_temp` to near zero over `steps`
    /// iterations. Returns the final configuration and its energy.
    pub fn anneal(&self, initial: Vec<i8>, steps: usize, initial_temp: f64, seed: u64) -> (Vec<i8>, f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut spins = initial;
        let mut energy = self.energy(&spins);

        for step in 0..steps {
            if self.n == 0 {
                break;
            }
            let temp = (initial_temp * (1.0 - step as f64 / steps.max(1) as f64)).max(1e-6);
            let i = rng.gen_range(0..self.n);

            let mut trial = spins.clone();
            trial[i] = -trial[i];
            let trial_energy = self.energy(&trial);
            let delta = trial_energy - energy;

            if delta <= 0.0 || rng.gen::<f64>() < (-delta / temp).exp() {
                spins = trial;
                energy = trial_energy;
            }
        }
        (spins, energy)
    }

    /// Fraction of spins that disagree with the majority sign — 0.0 when
    /// every spin agrees (no diversity), approaching 1.0 at an even split.
    pub fn diversity_score(spins: &[i8]) -> f64 {
        if spins.is_empty() {
            return 0.0;
        }
        let positive = spins.iter().filter(|&&s| s > 0).count();
        let minority = positive.min(spins.len() - positive);
        minority as f64 / spins.len() as f64
    }
}
