//! Activation function evaluation.

use crate::schema::Activation;

impl Activation {
    /// Apply the nonlinearity to a convolution sum.
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        match *self {
            Activation::Tanh { scale, bias } => (scale * x + bias).tanh(),
            Activation::Relu { threshold, leak } => {
                if x > threshold {
                    x
                } else {
                    leak * x
                }
            }
            Activation::Sigmoid { scale, bias } => 1.0 / (1.0 + (-(scale * x + bias)).exp()),
            Activation::Identity => x,
            Activation::Swish { beta } => x / (1.0 + (-beta * x).exp()),
            Activation::Gelu { alpha } => {
                let inner = (2.0 / std::f32::consts::PI).sqrt() * alpha * (x + 0.044715 * x * x * x);
                0.5 * x * (1.0 + inner.tanh())
            }
        }
    }

    /// Display name of the function family.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Tanh { .. } => "tanh",
            Activation::Relu { .. } => "relu",
            Activation::Sigmoid { .. } => "sigmoid",
            Activation::Identity => "identity",
            Activation::Swish { .. } => "swish",
            Activation::Gelu { .. } => "gelu",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tanh_zero() {
        let f = Activation::Tanh {
            scale: 1.0,
            bias: 0.0,
        };
        assert_eq!(f.apply(0.0), 0.0);
    }

    #[test]
    fn test_tanh_saturates() {
        let f = Activation::Tanh {
            scale: 1.0,
            bias: 0.0,
        };
        assert!(f.apply(20.0) > 0.999);
        assert!(f.apply(-20.0) < -0.999);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        let f = Activation::Sigmoid {
            scale: 1.0,
            bias: 0.0,
        };
        assert!((f.apply(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_identity() {
        for x in [-3.5f32, 0.0, 0.25, 100.0] {
            assert_eq!(Activation::Identity.apply(x), x);
        }
    }

    #[test]
    fn test_leaky_relu() {
        let f = Activation::Relu {
            threshold: 0.0,
            leak: 0.01,
        };
        assert_eq!(f.apply(5.0), 5.0);
        assert!((f.apply(-5.0) - (-0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_swish_zero_and_sign() {
        let f = Activation::Swish { beta: 1.0 };
        assert_eq!(f.apply(0.0), 0.0);
        // Large positive input passes through, large negative vanishes.
        assert!((f.apply(10.0) - 10.0).abs() < 1e-3);
        assert!(f.apply(-10.0).abs() < 1e-3);
    }

    #[test]
    fn test_gelu_matches_tanh_approximation() {
        let f = Activation::Gelu { alpha: 1.0 };
        assert_eq!(f.apply(0.0), 0.0);
        // Reference values of the tanh approximation.
        let x = 1.0f32;
        let inner = (2.0 / std::f32::consts::PI).sqrt() * (x + 0.044715 * x * x * x);
        let expected = 0.5 * x * (1.0 + inner.tanh());
        assert!((f.apply(x) - expected).abs() < 1e-6);
        assert!(f.apply(1.0) > 0.8 && f.apply(1.0) < 0.9);
    }
}
