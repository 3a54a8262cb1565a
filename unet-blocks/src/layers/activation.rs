use burn::{
    nn::{Gelu, LeakyRelu, LeakyReluConfig, Relu},
    prelude::*,
};

use crate::config::ActivationKind;

impl ActivationKind {
    /// Builds the activation module for this kind.
    pub fn init(&self) -> Activation {
        match self {
            Self::Relu => Activation::Relu(Relu::new()),
            Self::LeakyRelu => Activation::LeakyRelu(LeakyReluConfig::new().init()),
            Self::Gelu => Activation::Gelu(Gelu::new()),
        }
    }
}

/// A pointwise activation selected by [`ActivationKind`].
#[derive(Module, Debug, Clone)]
pub enum Activation {
    Relu(Relu),
    LeakyRelu(LeakyRelu),
    Gelu(Gelu),
}

impl Activation {
    pub fn forward<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Relu(relu) => relu.forward(x),
            Self::LeakyRelu(leaky_relu) => leaky_relu.forward(x),
            Self::Gelu(gelu) => gelu.forward(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_activation_negative_inputs() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1>::from_floats([-2.0, 0.0, 3.0], &device);

        let relu = ActivationKind::Relu.init().forward(x.clone());
        assert_eq!(relu.into_data().to_vec::<f32>().unwrap(), vec![0.0, 0.0, 3.0]);

        let leaky = ActivationKind::LeakyRelu
            .init()
            .forward(x)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert!((leaky[0] + 0.02).abs() < 1e-6);
        assert_eq!(leaky[2], 3.0);
    }
}
