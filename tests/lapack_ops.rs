//! Factorization facades: inverse round-trip, Cholesky triangles,
//! scratchpad protocol, and deferred numerical failures.

use unimath::blas::column_major;
use unimath::lapack;
use unimath::prelude::*;
use unimath::usm;

fn upload<T: Scalar>(queue: &Queue, data: &[T]) -> u64 {
    let ptr = usm::malloc::<T>(queue, data.len()).unwrap();
    usm::copy_to_device(queue, data, ptr).unwrap();
    ptr
}

fn download<T: Scalar>(queue: &Queue, ptr: u64, len: usize) -> Vec<T> {
    let mut out = vec![T::zero(); len];
    usm::copy_from_device(queue, ptr, &mut out).unwrap();
    out
}

/// Well-conditioned test matrix: diagonally dominant, column-major.
fn test_matrix(n: usize) -> Vec<f64> {
    let mut a = vec![0.0f64; n * n];
    for j in 0..n {
        for i in 0..n {
            a[i + j * n] = if i == j {
                n as f64 + 1.0
            } else {
                ((i * 31 + j * 17) % 11) as f64 * 0.1
            };
        }
    }
    a
}

/// 64x64 inverse via getrf + getri, checked by multiplying back to the
/// identity within tolerance.
#[test]
fn test_getrf_getri_inverse_roundtrip() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 64;

    let a_host = test_matrix(n);
    let pa = upload(&queue, &a_host);
    let pipiv = usm::malloc::<i64>(&queue, n).unwrap();

    let scratch_len = lapack::getri_scratchpad_size::<_, f64>(&sel, n, n).unwrap();
    assert!(scratch_len >= n * n);
    let pscratch = usm::malloc::<f64>(&queue, scratch_len).unwrap();

    let factored = lapack::getrf::<_, f64>(&sel, n, n, pa, n, pipiv, &[]).unwrap();
    let inverted =
        lapack::getri::<_, f64>(&sel, n, pa, n, pipiv, pscratch, scratch_len, &[factored])
            .unwrap();
    inverted.wait().unwrap();

    // A * A^{-1} == I
    let pa_orig = upload(&queue, &a_host);
    let pprod = usm::malloc::<f64>(&queue, n * n).unwrap();
    column_major::gemm(
        &sel,
        Transpose::NoTrans,
        Transpose::NoTrans,
        n,
        n,
        n,
        1.0,
        pa_orig,
        n,
        pa,
        n,
        0.0,
        pprod,
        n,
        &[],
    )
    .unwrap()
    .wait()
    .unwrap();

    let prod: Vec<f64> = download(&queue, pprod, n * n);
    for j in 0..n {
        for i in 0..n {
            let want = if i == j { 1.0 } else { 0.0 };
            assert!(
                (prod[i + j * n] - want).abs() < 1e-8,
                "identity check failed at ({}, {}): {}",
                i,
                j,
                prod[i + j * n]
            );
        }
    }

    usm::free::<f64>(&queue, pa, n * n);
    usm::free::<f64>(&queue, pa_orig, n * n);
    usm::free::<f64>(&queue, pprod, n * n);
    usm::free::<f64>(&queue, pscratch, scratch_len);
    usm::free::<i64>(&queue, pipiv, n);
}

#[test]
fn test_getri_with_short_scratchpad_is_invalid_argument() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 8;

    let err = lapack::getri::<_, f64>(&sel, n, 0x100, n, 0x200, 0x300, n, &[]).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidArgument {
            arg: "scratch_len",
            ..
        }
    ));
}

#[test]
fn test_potrf_lower_reconstructs_matrix() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 16;

    // SPD matrix: B + B^T + n*I over a small random-ish B
    let mut a = vec![0.0f64; n * n];
    for j in 0..n {
        for i in 0..n {
            let bij = ((i * 7 + j * 13) % 5) as f64 * 0.2;
            let bji = ((j * 7 + i * 13) % 5) as f64 * 0.2;
            a[i + j * n] = bij + bji + if i == j { n as f64 } else { 0.0 };
        }
    }

    let pa = upload(&queue, &a);
    lapack::potrf::<_, f64>(&sel, UpLo::Lower, n, pa, n, &[])
        .unwrap()
        .wait()
        .unwrap();

    let f: Vec<f64> = download(&queue, pa, n * n);
    // L * L^T == A on the lower triangle
    for j in 0..n {
        for i in j..n {
            let mut acc = 0.0;
            for k in 0..n {
                let lik = if k <= i { f[i + k * n] } else { 0.0 };
                let ljk = if k <= j { f[j + k * n] } else { 0.0 };
                acc += lik * ljk;
            }
            assert!(
                (acc - a[i + j * n]).abs() < 1e-9,
                "reconstruction failed at ({}, {})",
                i,
                j
            );
        }
    }

    usm::free::<f64>(&queue, pa, n * n);
}

#[test]
fn test_potrf_upper_and_lower_agree() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 8;

    let mut a = vec![0.0f64; n * n];
    for j in 0..n {
        for i in 0..n {
            a[i + j * n] = if i == j { 4.0 } else { 1.0 / (1.0 + (i + j) as f64) };
        }
    }

    let pl = upload(&queue, &a);
    let pu = upload(&queue, &a);
    lapack::potrf::<_, f64>(&sel, UpLo::Lower, n, pl, n, &[])
        .unwrap()
        .wait()
        .unwrap();
    lapack::potrf::<_, f64>(&sel, UpLo::Upper, n, pu, n, &[])
        .unwrap()
        .wait()
        .unwrap();

    let l: Vec<f64> = download(&queue, pl, n * n);
    let u: Vec<f64> = download(&queue, pu, n * n);
    // U == L^T where both triangles were computed
    for j in 0..n {
        for i in j..n {
            assert!(
                (l[i + j * n] - u[j + i * n]).abs() < 1e-12,
                "factor mismatch at ({}, {})",
                i,
                j
            );
        }
    }

    usm::free::<f64>(&queue, pl, n * n);
    usm::free::<f64>(&queue, pu, n * n);
}

#[test]
fn test_potrf_rejects_indefinite_matrix() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 3;

    // negative diagonal entry: not positive definite
    let a = [1.0f64, 0.0, 0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 1.0];
    let pa = upload(&queue, &a);
    let ev = lapack::potrf::<_, f64>(&sel, UpLo::Lower, n, pa, n, &[]).unwrap();
    match ev.wait() {
        Err(Error::ExecutionFailure { detail }) => {
            assert!(detail.contains("order 2"), "detail: {}", detail);
        }
        other => panic!("expected ExecutionFailure, got {:?}", other),
    }
    usm::free::<f64>(&queue, pa, n * n);
}

#[test]
fn test_buffer_model_factorization() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 12;

    let a_host = test_matrix(n);
    let a = Buffer::from_slice(&a_host);
    let ipiv = Buffer::<i64>::zeroed(n);
    let scratch = Buffer::<f64>::zeroed(n * n);

    lapack::getrf_buf::<_, f64>(&sel, n, n, &a, n, &ipiv).unwrap();
    lapack::getri_buf::<_, f64>(&sel, n, &a, n, &ipiv, &scratch).unwrap();

    // multiply back through the buffer facade
    let a_orig = Buffer::from_slice(&a_host);
    let prod = Buffer::<f64>::zeroed(n * n);
    unimath::blas::column_major::gemm_buf(
        &sel,
        Transpose::NoTrans,
        Transpose::NoTrans,
        n,
        n,
        n,
        1.0,
        &a_orig,
        n,
        &a,
        n,
        0.0,
        &prod,
        n,
    )
    .unwrap();

    let p = prod.read().unwrap();
    for j in 0..n {
        for i in 0..n {
            let want = if i == j { 1.0 } else { 0.0 };
            assert!((p[i + j * n] - want).abs() < 1e-9);
        }
    }
}

#[test]
fn test_bad_lda_rejected_synchronously() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let err = lapack::getrf::<_, f64>(&sel, 8, 8, 0x100, 4, 0x200, &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "lda", .. }));
}
