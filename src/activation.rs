//! Activation selection and backend dispatch
//!
//! [`Activation`] names the closed set of transforms. [`apply`] validates the
//! buffers, resolves the [`Backend`] and runs the activation through the
//! matching [`ActivationBackend`]. The `*_scalar` / `*_vectorized` free
//! functions are thin wrappers pinning the backend to the scalar reference
//! or to the best vector backend of the running CPU.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(target_arch = "x86_64")]
use crate::backends::avx2::Avx2Backend;
#[cfg(target_arch = "aarch64")]
use crate::backends::neon::NeonBackend;
use crate::backends::portable::PortableBackend;
use crate::backends::scalar::ScalarBackend;
#[cfg(target_arch = "x86_64")]
use crate::backends::sse2::Sse2Backend;
#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
use crate::backends::wasm::WasmBackend;
use crate::backends::ActivationBackend;
use crate::scalar::{self, DEFAULT_LEAKY_SLOPE};
use crate::validation::Tolerance;
use crate::{Backend, ChispaError, Result};

/// Elementwise activation function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// `max(x, 0)`
    Relu,
    /// `x` for `x > 0`, `slope * x` otherwise (compare + merge)
    LeakyRelu {
        /// Negative-domain slope
        slope: f32,
    },
    /// Leaky ReLU computed as `max(x, slope * x)`; requires `0 <= slope <= 1`
    LeakyReluMax {
        /// Negative-domain slope
        slope: f32,
    },
    /// `x * σ(x)`, also known as SiLU
    Swish,
    /// `x * Φ(x)`
    Gelu,
    /// Tanh GELU approximation
    GeluTanh,
    /// Cook tanh GELU approximation, `0.5x(1 + tanh(0.8x))`
    GeluTanhCook,
    /// Logistic GELU approximation, `x * σ(1.702x)`
    GeluLogistic,
    /// `0.5x(1 + x / sqrt(1 + x²))`
    Dish,
    /// Exponential linear squashing
    Elish,
    /// `sqrt(x)` where `x > 0`, `x` elsewhere
    MaskedSqrt,
}

impl Activation {
    /// Every activation, leaky variants at [`DEFAULT_LEAKY_SLOPE`]
    pub const ALL: [Activation; 11] = [
        Activation::Relu,
        Activation::LeakyRelu {
            slope: DEFAULT_LEAKY_SLOPE,
        },
        Activation::LeakyReluMax {
            slope: DEFAULT_LEAKY_SLOPE,
        },
        Activation::Swish,
        Activation::Gelu,
        Activation::GeluTanh,
        Activation::GeluTanhCook,
        Activation::GeluLogistic,
        Activation::Dish,
        Activation::Elish,
        Activation::MaskedSqrt,
    ];

    /// Canonical snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::LeakyRelu { .. } => "leaky_relu",
            Activation::LeakyReluMax { .. } => "leaky_relu_max",
            Activation::Swish => "swish",
            Activation::Gelu => "gelu",
            Activation::GeluTanh => "gelu_tanh",
            Activation::GeluTanhCook => "gelu_tanh_cook",
            Activation::GeluLogistic => "gelu_logistic",
            Activation::Dish => "dish",
            Activation::Elish => "elish",
            Activation::MaskedSqrt => "masked_sqrt",
        }
    }

    /// Agreement bound between vector backends and the scalar reference
    pub fn tolerance(&self) -> Tolerance {
        match self {
            Activation::Relu
            | Activation::LeakyRelu { .. }
            | Activation::LeakyReluMax { .. } => Tolerance::exact(),
            Activation::Swish | Activation::Dish => Tolerance::relative(0.01),
            Activation::Gelu
            | Activation::GeluTanh
            | Activation::GeluTanhCook
            | Activation::GeluLogistic
            | Activation::Elish => Tolerance::absolute(0.01),
            Activation::MaskedSqrt => Tolerance::relative(1e-4),
        }
    }

    /// Scalar reference value for one input
    pub fn eval_scalar(&self, x: f32) -> f32 {
        match *self {
            Activation::Relu => scalar::relu(x),
            Activation::LeakyRelu { slope } | Activation::LeakyReluMax { slope } => {
                scalar::leaky_relu(x, slope)
            }
            Activation::Swish => scalar::swish(x),
            Activation::Gelu => scalar::gelu(x),
            Activation::GeluTanh => scalar::gelu_tanh(x),
            Activation::GeluTanhCook => scalar::gelu_tanh_cook(x),
            Activation::GeluLogistic => scalar::gelu_logistic(x),
            Activation::Dish => scalar::dish(x),
            Activation::Elish => scalar::elish(x),
            Activation::MaskedSqrt => scalar::masked_sqrt(x),
        }
    }

    /// Check parameters
    ///
    /// # Errors
    ///
    /// Returns [`ChispaError::InvalidInput`] for a max-strategy slope outside
    /// `[0, 1]`, where `max(x, slope * x)` no longer equals the branch form,
    /// or for a non-finite slope on either leaky variant.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Activation::LeakyReluMax { slope } if !(0.0..=1.0).contains(&slope) => {
                Err(ChispaError::InvalidInput(format!(
                    "leaky_relu_max slope {slope} outside [0, 1]"
                )))
            }
            Activation::LeakyRelu { slope } if !slope.is_finite() => Err(
                ChispaError::InvalidInput(format!("leaky_relu slope {slope} is not finite")),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Activation::LeakyRelu { slope } | Activation::LeakyReluMax { slope }
                if slope != DEFAULT_LEAKY_SLOPE =>
            {
                write!(f, "{}={}", self.name(), slope)
            }
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for Activation {
    type Err = ChispaError;

    /// Parse a snake_case name; leaky variants accept `name=slope`
    ///
    /// ```
    /// use chispa::Activation;
    ///
    /// assert_eq!("silu".parse::<Activation>().unwrap(), Activation::Swish);
    /// assert_eq!(
    ///     "leaky_relu=0.2".parse::<Activation>().unwrap(),
    ///     Activation::LeakyRelu { slope: 0.2 }
    /// );
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let (name, slope) = match normalized.split_once('=') {
            Some((name, slope)) => {
                let slope = slope.trim().parse::<f32>().map_err(|_| {
                    ChispaError::InvalidInput(format!("invalid slope in activation: {s}"))
                })?;
                (name.trim(), Some(slope))
            }
            None => (normalized.as_str(), None),
        };

        let activation = match name {
            "leaky_relu" => Activation::LeakyRelu {
                slope: slope.unwrap_or(DEFAULT_LEAKY_SLOPE),
            },
            "leaky_relu_max" => Activation::LeakyReluMax {
                slope: slope.unwrap_or(DEFAULT_LEAKY_SLOPE),
            },
            _ if slope.is_some() => {
                return Err(ChispaError::InvalidInput(format!(
                    "activation takes no parameter: {s}"
                )))
            }
            "relu" => Activation::Relu,
            "swish" | "silu" => Activation::Swish,
            "gelu" => Activation::Gelu,
            "gelu_tanh" => Activation::GeluTanh,
            "gelu_tanh_cook" => Activation::GeluTanhCook,
            "gelu_logistic" => Activation::GeluLogistic,
            "dish" => Activation::Dish,
            "elish" => Activation::Elish,
            "masked_sqrt" => Activation::MaskedSqrt,
            _ => {
                return Err(ChispaError::InvalidInput(format!(
                    "unknown activation: {s}"
                )))
            }
        };
        activation.validate()?;
        Ok(activation)
    }
}

/// Run `activation` through backend `B`
///
/// # Safety
///
/// `B`'s instruction set must be available and `out.len() >= x.len()`.
pub(crate) unsafe fn run<B: ActivationBackend>(activation: Activation, x: &[f32], out: &mut [f32]) {
    match activation {
        Activation::Relu => B::relu(x, out),
        Activation::LeakyRelu { slope } => B::leaky_relu(x, slope, out),
        Activation::LeakyReluMax { slope } => B::leaky_relu_max(x, slope, out),
        Activation::Swish => B::swish(x, out),
        Activation::Gelu => B::gelu(x, out),
        Activation::GeluTanh => B::gelu_tanh(x, out),
        Activation::GeluTanhCook => B::gelu_tanh_cook(x, out),
        Activation::GeluLogistic => B::gelu_logistic(x, out),
        Activation::Dish => B::dish(x, out),
        Activation::Elish => B::elish(x, out),
        Activation::MaskedSqrt => B::masked_sqrt(x, out),
    }
}

/// Compute `out[i] = activation(x[i])` on the given backend
///
/// `Backend::Auto` resolves to [`crate::select_best_available_backend`].
///
/// # Examples
///
/// ```
/// use chispa::{apply, Activation, Backend};
///
/// let x = [-1.0, 0.0, 4.0];
/// let mut out = [0.0; 3];
/// apply(Backend::Auto, Activation::MaskedSqrt, &x, &mut out).unwrap();
/// assert_eq!(out, [-1.0, 0.0, 2.0]);
/// ```
///
/// # Errors
///
/// - [`ChispaError::SizeMismatch`] if `out.len() != x.len()`
/// - [`ChispaError::UnsupportedBackend`] if the CPU lacks the backend's ISA
/// - [`ChispaError::InvalidInput`] if [`Activation::validate`] fails
#[cfg_attr(feature = "tracing", instrument(skip(x, out), fields(n = x.len())))]
pub fn apply(backend: Backend, activation: Activation, x: &[f32], out: &mut [f32]) -> Result<()> {
    if out.len() != x.len() {
        return Err(ChispaError::SizeMismatch {
            expected: x.len(),
            actual: out.len(),
        });
    }

    let backend = backend.resolve();
    if !backend.is_available() {
        return Err(ChispaError::UnsupportedBackend(backend));
    }
    activation.validate()?;

    // SAFETY: backend availability checked above, out.len() == x.len()
    unsafe {
        match backend {
            Backend::Scalar => run::<ScalarBackend>(activation, x, out),
            Backend::Portable => run::<PortableBackend>(activation, x, out),
            #[cfg(target_arch = "x86_64")]
            Backend::SSE2 => run::<Sse2Backend>(activation, x, out),
            #[cfg(target_arch = "x86_64")]
            Backend::AVX2 => run::<Avx2Backend>(activation, x, out),
            #[cfg(target_arch = "aarch64")]
            Backend::NEON => run::<NeonBackend>(activation, x, out),
            #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
            Backend::WasmSIMD => run::<WasmBackend>(activation, x, out),
            other => return Err(ChispaError::UnsupportedBackend(other)),
        }
    }
    Ok(())
}

macro_rules! activation_pair {
    ($scalar:ident, $vectorized:ident, $activation:expr, $name:literal) => {
        #[doc = concat!("Scalar reference ", $name, " over `x` into `out`")]
        ///
        /// # Errors
        ///
        /// Returns [`ChispaError::SizeMismatch`] if `out.len() != x.len()`.
        pub fn $scalar(x: &[f32], out: &mut [f32]) -> Result<()> {
            apply(Backend::Scalar, $activation, x, out)
        }

        #[doc = concat!("Vectorized ", $name, " over `x` into `out` on the best available backend")]
        ///
        /// # Errors
        ///
        /// Returns [`ChispaError::SizeMismatch`] if `out.len() != x.len()`.
        pub fn $vectorized(x: &[f32], out: &mut [f32]) -> Result<()> {
            apply(Backend::Auto, $activation, x, out)
        }
    };
}

activation_pair!(relu_scalar, relu_vectorized, Activation::Relu, "ReLU");
activation_pair!(swish_scalar, swish_vectorized, Activation::Swish, "swish");
activation_pair!(gelu_scalar, gelu_vectorized, Activation::Gelu, "GELU");
activation_pair!(
    gelu_tanh_scalar,
    gelu_tanh_vectorized,
    Activation::GeluTanh,
    "tanh GELU"
);
activation_pair!(
    gelu_tanh_cook_scalar,
    gelu_tanh_cook_vectorized,
    Activation::GeluTanhCook,
    "Cook tanh GELU"
);
activation_pair!(
    gelu_logistic_scalar,
    gelu_logistic_vectorized,
    Activation::GeluLogistic,
    "logistic GELU"
);
activation_pair!(dish_scalar, dish_vectorized, Activation::Dish, "dish");
activation_pair!(elish_scalar, elish_vectorized, Activation::Elish, "ELiSH");
activation_pair!(
    masked_sqrt_scalar,
    masked_sqrt_vectorized,
    Activation::MaskedSqrt,
    "masked square root"
);

/// Scalar reference leaky ReLU
///
/// # Errors
///
/// Returns [`ChispaError::SizeMismatch`] if `out.len() != x.len()`, or
/// [`ChispaError::InvalidInput`] for a non-finite slope.
pub fn leaky_relu_scalar(x: &[f32], slope: f32, out: &mut [f32]) -> Result<()> {
    apply(Backend::Scalar, Activation::LeakyRelu { slope }, x, out)
}

/// Vectorized leaky ReLU as `max(x, slope * x)`
///
/// # Errors
///
/// Returns [`ChispaError::InvalidInput`] if `slope` is outside `[0, 1]`, and
/// [`ChispaError::SizeMismatch`] if `out.len() != x.len()`.
pub fn leaky_relu_max_vectorized(x: &[f32], slope: f32, out: &mut [f32]) -> Result<()> {
    apply(Backend::Auto, Activation::LeakyReluMax { slope }, x, out)
}

/// Vectorized leaky ReLU as compare `x > 0` + merge; any finite slope
///
/// # Errors
///
/// Returns [`ChispaError::SizeMismatch`] if `out.len() != x.len()`, or
/// [`ChispaError::InvalidInput`] for a non-finite slope.
pub fn leaky_relu_masked_vectorized(x: &[f32], slope: f32, out: &mut [f32]) -> Result<()> {
    apply(Backend::Auto, Activation::LeakyRelu { slope }, x, out)
}
