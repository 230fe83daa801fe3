mod accumulate;
mod network_size;

use super::{Observation, TrainingState};

fn state(epoch: usize, iteration: usize) -> TrainingState {
    TrainingState {
        epoch,
        iteration,
        epoch_detail: epoch as f64,
        elapsed_time: iteration as f64 * 0.5,
    }
}

fn observation(pairs: &[(&str, f64)]) -> Observation {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}
