//! Transform facade: descriptor lifecycle, round-trip identity, spectrum
//! sanity against a naive reference, and both memory models.

use std::f64::consts::PI;
use unimath::complex::Complex64;
use unimath::dft::{self, DftDescriptor};
use unimath::prelude::*;
use unimath::usm;

fn upload(queue: &Queue, data: &[Complex64]) -> u64 {
    let ptr = usm::malloc::<Complex64>(queue, data.len()).unwrap();
    usm::copy_to_device(queue, data, ptr).unwrap();
    ptr
}

fn download(queue: &Queue, ptr: u64, len: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::ZERO; len];
    usm::copy_from_device(queue, ptr, &mut out).unwrap();
    out
}

fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
    let n = input.len();
    (0..n)
        .map(|k| {
            let mut acc = Complex64::ZERO;
            for (j, x) in input.iter().enumerate() {
                let w = Complex64::cis(-2.0 * PI * (k * j) as f64 / n as f64);
                acc = acc + *x * w;
            }
            acc
        })
        .collect()
}

fn signal(n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|i| Complex64::new((i as f64 * 0.3).sin(), (i as f64 * 0.7).cos() * 0.5))
        .collect()
}

#[test]
fn test_forward_matches_naive_reference() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 16;

    let input = signal(n);
    let want = naive_dft(&input);

    let mut desc = DftDescriptor::<Complex64>::new(n);
    desc.commit(&sel).unwrap();

    let p = upload(&queue, &input);
    dft::compute_forward(&desc, &sel, p, &[])
        .unwrap()
        .wait()
        .unwrap();

    let got = download(&queue, p, n);
    for (g, w) in got.iter().zip(want.iter()) {
        assert!((g.re - w.re).abs() < 1e-9, "re {} vs {}", g.re, w.re);
        assert!((g.im - w.im).abs() < 1e-9, "im {} vs {}", g.im, w.im);
    }
    usm::free::<Complex64>(&queue, p, n);
}

#[test]
fn test_forward_backward_roundtrip() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 64;

    let input = signal(n);
    let mut desc = DftDescriptor::<Complex64>::new(n);
    desc.commit(&sel).unwrap();

    let p = upload(&queue, &input);
    let fwd = dft::compute_forward(&desc, &sel, p, &[]).unwrap();
    dft::compute_backward(&desc, &sel, p, &[fwd])
        .unwrap()
        .wait()
        .unwrap();

    let got = download(&queue, p, n);
    for (g, w) in got.iter().zip(input.iter()) {
        assert!((g.re - w.re).abs() < 1e-12);
        assert!((g.im - w.im).abs() < 1e-12);
    }
    usm::free::<Complex64>(&queue, p, n);
}

#[test]
fn test_impulse_has_flat_spectrum() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 32;

    let mut input = vec![Complex64::ZERO; n];
    input[0] = Complex64::ONE;
    let mut desc = DftDescriptor::<Complex64>::new(n);
    desc.commit(&sel).unwrap();

    let p = upload(&queue, &input);
    dft::compute_forward(&desc, &sel, p, &[])
        .unwrap()
        .wait()
        .unwrap();

    let got = download(&queue, p, n);
    for g in &got {
        assert!((g.re - 1.0).abs() < 1e-12);
        assert!(g.im.abs() < 1e-12);
    }
    usm::free::<Complex64>(&queue, p, n);
}

#[test]
fn test_non_power_of_two_commit_is_invalid() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    let mut desc = DftDescriptor::<Complex64>::new(12);
    let err = desc.commit(&sel).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "n", .. }));
}

#[test]
fn test_commit_resolves_backend_early() {
    // commit against an unknown device reports the deployment gap before
    // any compute call
    let device = Device::from_metadata("acme devices", "mystery", 0);
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    let mut desc = DftDescriptor::<Complex64>::new(8);
    let err = desc.commit(&sel).unwrap_err();
    assert!(matches!(err, Error::UnsupportedBackend { .. }));
}

#[test]
fn test_uncommitted_descriptor_rejected() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    let desc = DftDescriptor::<Complex64>::new(8);
    let err = dft::compute_forward(&desc, &sel, 0x100, &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_buffer_model_roundtrip() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 8;

    let input = signal(n);
    let buf = Buffer::from_slice(&input);
    let mut desc = DftDescriptor::<Complex64>::new(n);
    desc.commit(&sel).unwrap();

    dft::compute_forward_buf(&desc, &sel, &buf).unwrap();
    dft::compute_backward_buf(&desc, &sel, &buf).unwrap();

    let got = buf.read().unwrap();
    for (g, w) in got.iter().zip(input.iter()) {
        assert!((g.re - w.re).abs() < 1e-12);
        assert!((g.im - w.im).abs() < 1e-12);
    }
}
