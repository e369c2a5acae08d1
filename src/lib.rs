//! Chispa: Elementwise Activation Kernels, Scalar and Vectorized
//!
//! **Chispa** (Spanish: "spark") computes neural-network activation functions
//! over `f32` buffers: swish, GELU (exact, tanh, Cook tanh, logistic), dish,
//! ReLU, leaky ReLU, ELiSH and masked square root. Every activation has two
//! interchangeable strategies:
//!
//! 1. **Scalar reference** built on the standard transcendental functions
//! 2. **Vectorized kernels** built from SIMD primitives only: a bit-trick
//!    exponential, a reciprocal square root refined by Newton-Raphson, fused
//!    multiply-add and compare + select masking
//!
//! The vectorized result agrees with the scalar reference within a small
//! per-activation [`Tolerance`].
//!
//! # Design Principles
//!
//! - **Write once, optimize everywhere**: kernels are generic over a
//!   [`lanes::LaneGroup`] and instantiated per instruction set
//! - **Runtime dispatch**: Auto-select best implementation based on CPU features
//! - **Zero unsafe in public API**: Safety via type system, `unsafe` isolated in backends
//!
//! # Quick Start
//!
//! ```rust
//! use chispa::{swish_scalar, swish_vectorized};
//!
//! let x = [-2.0, -0.5, 0.0, 0.5, 2.0];
//! let mut reference = [0.0; 5];
//! let mut fast = [0.0; 5];
//!
//! swish_scalar(&x, &mut reference).unwrap();
//! swish_vectorized(&x, &mut fast).unwrap();
//!
//! for (a, b) in fast.iter().zip(&reference) {
//!     assert!((a - b).abs() <= 0.01 * b.abs());
//! }
//! ```

use std::fmt;
use std::str::FromStr;

pub mod activation;
pub mod backends;
pub mod driver;
pub mod error;
pub mod kernels;
pub mod lanes;
pub mod scalar;
pub mod validation;
pub mod vector;

pub use activation::*;
pub use error::{ChispaError, Result};
pub use validation::{find_divergence, verify_against_scalar, verify_with_tolerance, Tolerance};
pub use vector::Vector;

/// Backend execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Scalar reference (no SIMD)
    Scalar,
    /// Portable 8-lane arrays (every target)
    Portable,
    /// SSE2 (x86_64 baseline)
    SSE2,
    /// AVX2 (256-bit with FMA)
    AVX2,
    /// ARM NEON (AArch64)
    NEON,
    /// WebAssembly SIMD128
    WasmSIMD,
    /// Auto-select best available
    Auto,
}

impl Backend {
    /// Every concrete backend, reference first
    pub const ALL: [Backend; 6] = [
        Backend::Scalar,
        Backend::Portable,
        Backend::SSE2,
        Backend::AVX2,
        Backend::NEON,
        Backend::WasmSIMD,
    ];

    /// Select the best available backend for the current platform
    ///
    /// This is a convenience wrapper around `select_best_available_backend()`
    pub fn select_best() -> Self {
        select_best_available_backend()
    }

    /// Map [`Backend::Auto`] to the best available backend
    pub fn resolve(self) -> Self {
        match self {
            Backend::Auto => select_best_available_backend(),
            backend => backend,
        }
    }

    /// Whether this backend can run on the current CPU
    ///
    /// Performs runtime feature detection for the ISA backends.
    /// [`Backend::Auto`] is always available.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Portable | Backend::Auto => true,
            #[cfg(target_arch = "x86_64")]
            Backend::SSE2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Backend::AVX2 => is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma"),
            #[cfg(target_arch = "aarch64")]
            Backend::NEON => std::arch::is_aarch64_feature_detected!("neon"),
            #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
            Backend::WasmSIMD => true,
            _ => false,
        }
    }

    /// Concrete backends usable on this CPU
    pub fn available() -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|backend| backend.is_available())
            .collect()
    }

    /// Lower-case name, as accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            Backend::SSE2 => "sse2",
            Backend::AVX2 => "avx2",
            Backend::NEON => "neon",
            Backend::WasmSIMD => "wasm_simd",
            Backend::Auto => "auto",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ChispaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Backend::Scalar),
            "portable" => Ok(Backend::Portable),
            "sse2" => Ok(Backend::SSE2),
            "avx2" => Ok(Backend::AVX2),
            "neon" => Ok(Backend::NEON),
            "wasm_simd" | "simd128" => Ok(Backend::WasmSIMD),
            "auto" => Ok(Backend::Auto),
            other => Err(ChispaError::InvalidInput(format!("unknown backend: {other}"))),
        }
    }
}

/// Detect best SIMD backend for x86_64 platforms
#[cfg(target_arch = "x86_64")]
fn detect_x86_backend() -> Backend {
    if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
        return Backend::AVX2;
    }
    // SSE2 is part of the x86_64 baseline
    Backend::SSE2
}

/// Detect best SIMD backend for AArch64 platforms
#[cfg(target_arch = "aarch64")]
fn detect_arm_backend() -> Backend {
    if std::arch::is_aarch64_feature_detected!("neon") {
        Backend::NEON
    } else {
        Backend::Portable
    }
}

/// Detect best SIMD backend for WebAssembly
#[cfg(target_arch = "wasm32")]
fn detect_wasm_backend() -> Backend {
    #[cfg(target_feature = "simd128")]
    {
        Backend::WasmSIMD
    }
    #[cfg(not(target_feature = "simd128"))]
    {
        Backend::Portable
    }
}

/// Select the best available backend for the current platform
///
/// This function performs runtime CPU feature detection and selects the most
/// optimized vector backend available. The selection follows this priority:
///
/// **x86_64**:
/// 1. AVX2 (if `avx2` and `fma` features detected)
/// 2. SSE2 (baseline for x86_64)
///
/// **AArch64**: NEON (if detected), else Portable
///
/// **WASM**: SIMD128 (if compiled with `simd128`), else Portable
///
/// **Other platforms**: Portable
///
/// The scalar reference is never selected; request [`Backend::Scalar`]
/// explicitly for it.
///
/// # Examples
///
/// ```
/// use chispa::{select_best_available_backend, Backend};
///
/// let backend = select_best_available_backend();
/// assert_ne!(backend, Backend::Scalar);
/// println!("Using backend: {:?}", backend);
/// ```
pub fn select_best_available_backend() -> Backend {
    #[cfg(target_arch = "x86_64")]
    let backend = detect_x86_backend();

    #[cfg(target_arch = "aarch64")]
    let backend = detect_arm_backend();

    #[cfg(target_arch = "wasm32")]
    let backend = detect_wasm_backend();

    #[cfg(not(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "wasm32"
    )))]
    let backend = Backend::Portable;

    #[cfg(feature = "tracing")]
    tracing::debug!(%backend, "selected activation backend");

    backend
}
