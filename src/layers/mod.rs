pub mod dense;
pub mod initialization;

pub use dense::{DenseLayer, LayerGradients, LayerTrace};
pub use initialization::WeightInit;
