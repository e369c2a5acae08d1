//! Vector/scalar agreement on every backend available on this CPU
//!
//! Each test sweeps the inputs through the scalar reference and through every
//! available vector backend and compares with the activation's tolerance.

use chispa::{apply, verify_against_scalar, Activation, Backend, Tolerance};

fn sweep(start: f32, end: f32, step: f32) -> Vec<f32> {
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|i| start + i as f32 * step).collect()
}

fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| -3.0 + 6.0 * i as f32 / n as f32).collect()
}

fn vector_backends() -> Vec<Backend> {
    Backend::available()
        .into_iter()
        .filter(|b| *b != Backend::Scalar)
        .collect()
}

fn assert_agrees(activation: Activation, x: &[f32], tolerance: Tolerance) {
    let mut expected = vec![0.0; x.len()];
    apply(Backend::Scalar, activation, x, &mut expected).unwrap();

    for backend in vector_backends() {
        let mut actual = vec![0.0; x.len()];
        apply(backend, activation, x, &mut actual).unwrap();
        for ((&xi, &e), &a) in x.iter().zip(&expected).zip(&actual) {
            assert!(
                tolerance.approx_eq(a, e),
                "{activation} on {backend}: f({xi}) = {a}, expected {e}"
            );
        }
    }
}

#[test]
fn test_swish_tail_lengths() {
    for n in [1, 7, 16, 33, 64, 100, 257] {
        assert_agrees(Activation::Swish, &ramp(n), Tolerance::relative(0.01));
    }
}

#[test]
fn test_swish_sweep() {
    assert_agrees(
        Activation::Swish,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::relative(0.01),
    );
}

#[test]
fn test_gelu_tanh_cook_sweep() {
    assert_agrees(
        Activation::GeluTanhCook,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::absolute(0.01),
    );
}

#[test]
fn test_gelu_logistic_sweep() {
    assert_agrees(
        Activation::GeluLogistic,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::absolute(0.01),
    );
}

#[test]
fn test_gelu_exact_and_tanh_sweep() {
    let x = sweep(-10.0, 10.0, 0.25);
    assert_agrees(Activation::Gelu, &x, Tolerance::absolute(0.01));
    assert_agrees(Activation::GeluTanh, &x, Tolerance::absolute(0.01));
}

#[test]
fn test_dish_sweep() {
    assert_agrees(
        Activation::Dish,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::relative(0.01),
    );
}

#[test]
fn test_elish_sweep() {
    assert_agrees(
        Activation::Elish,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::absolute(0.01),
    );
}

#[test]
fn test_masked_sqrt_sweep() {
    let x = sweep(-5.0, 5.0, 0.5);
    assert_agrees(Activation::MaskedSqrt, &x, Tolerance::relative(1e-4));

    // Non-positive lanes pass through untouched on every backend
    for backend in Backend::available() {
        let mut out = vec![0.0; x.len()];
        apply(backend, Activation::MaskedSqrt, &x, &mut out).unwrap();
        for (&xi, &yi) in x.iter().zip(&out) {
            if xi <= 0.0 {
                assert_eq!(yi, xi, "{backend}: passthrough for {xi}");
            } else {
                assert!((yi - xi.sqrt()).abs() <= 1e-4 * xi.sqrt());
            }
        }
    }
}

#[test]
fn test_leaky_relu_strategies_agree_with_branch() {
    let x: Vec<f32> = (0..101).map(|i| (i as f32 - 50.0) * 0.37).collect();
    for slope in [0.01, 0.1, 0.25, 0.5, 0.99] {
        assert_agrees(Activation::LeakyRelu { slope }, &x, Tolerance::exact());
        assert_agrees(Activation::LeakyReluMax { slope }, &x, Tolerance::exact());
    }
}

#[test]
fn test_relu_exact() {
    assert_agrees(
        Activation::Relu,
        &sweep(-10.0, 10.0, 0.25),
        Tolerance::exact(),
    );
}

#[test]
fn test_large_magnitude_inputs_agree() {
    // Around and past the exp overflow edge at ±88.72
    let x = [
        -1e30f32, -1e4, -500.0, -120.0, -100.0, -89.0, -88.722_83, -88.5, -88.0, 88.0, 88.5,
        88.722_83, 89.0, 100.0, 120.0, 500.0, 1e4, 1e30,
    ];
    for backend in Backend::available() {
        for activation in Activation::ALL {
            verify_against_scalar(activation, backend, &x)
                .unwrap_or_else(|err| panic!("{activation} on {backend}: {err}"));

            let mut out = vec![0.0; x.len()];
            apply(backend, activation, &x, &mut out).unwrap();
            for (&xi, &yi) in x.iter().zip(&out) {
                assert!(!yi.is_nan(), "{activation} on {backend}: f({xi}) = NaN");
            }
        }
    }
}

#[test]
fn test_dish_agrees_where_square_overflows() {
    let x = [
        2e19f32,
        -2e19,
        1e30,
        -1e30,
        f32::MAX,
        -f32::MAX,
        4_294_967_296.0,
        -4_294_967_296.0,
        -1e4,
        -300.0,
    ];
    for backend in Backend::available() {
        verify_against_scalar(Activation::Dish, backend, &x)
            .unwrap_or_else(|err| panic!("dish on {backend}: {err}"));

        let mut out = vec![0.0; x.len()];
        apply(backend, Activation::Dish, &x, &mut out).unwrap();
        for (&xi, &yi) in x.iter().zip(&out) {
            assert!(yi.is_finite(), "dish on {backend}: f({xi}) = {yi}");
        }
    }
}

#[test]
fn test_nan_propagates() {
    let x = [f32::NAN, 1.0, -1.0];
    for backend in Backend::available() {
        for activation in Activation::ALL {
            let mut out = [0.0; 3];
            apply(backend, activation, &x, &mut out).unwrap();
            assert!(out[0].is_nan(), "{activation} on {backend} dropped NaN");
        }
    }
}

#[test]
fn test_repeated_calls_are_bit_identical() {
    let x: Vec<f32> = (0..257).map(|i| (i as f32 * 0.731).sin() * 8.0).collect();
    for backend in Backend::available() {
        for activation in Activation::ALL {
            let mut first = vec![0.0; x.len()];
            let mut second = vec![0.0; x.len()];
            apply(backend, activation, &x, &mut first).unwrap();
            apply(backend, activation, &x, &mut second).unwrap();
            let first_bits: Vec<u32> = first.iter().map(|v| v.to_bits()).collect();
            let second_bits: Vec<u32> = second.iter().map(|v| v.to_bits()).collect();
            assert_eq!(first_bits, second_bits, "{activation} on {backend}");
        }
    }
}

#[test]
fn test_empty_buffers_are_noops() {
    for backend in Backend::available() {
        for activation in Activation::ALL {
            let mut out: Vec<f32> = Vec::new();
            apply(backend, activation, &[], &mut out).unwrap();
            assert!(out.is_empty());
        }
    }
}
