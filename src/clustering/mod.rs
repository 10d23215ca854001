//! Prototype-based clustering on dissimilarity data.

pub mod relational_neural_gas;

pub use relational_neural_gas::{
    RelationalNeuralGas, RelationalNeuralGasBuilder, TrainingLog, TrainingState,
};
