//! Compile-time selection: `Static<CpuNative>` monomorphizes to the same
//! semantics the runtime selector reaches through its table.

use unimath::blas::{column_major, row_major};
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

#[test]
fn test_static_and_dynamic_gemm_agree_bitwise() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let st = Static::<CpuNative>::new(&queue);
    let dy = Dynamic::new(&queue);
    let (m, n, k) = (5, 4, 3);

    let a: Vec<f64> = (0..m * k).map(|i| (i as f64).sin()).collect();
    let b: Vec<f64> = (0..k * n).map(|i| (i as f64).cos()).collect();

    let pa = upload(&queue, &a);
    let pb = upload(&queue, &b);
    let pc1 = upload(&queue, &vec![0.0f64; m * n]);
    let pc2 = upload(&queue, &vec![0.0f64; m * n]);

    row_major::gemm(
        &st,
        Transpose::NoTrans,
        Transpose::NoTrans,
        m,
        n,
        k,
        1.5,
        pa,
        k,
        pb,
        n,
        0.0,
        pc1,
        n,
        &[],
    )
    .unwrap()
    .wait()
    .unwrap();
    row_major::gemm(
        &dy,
        Transpose::NoTrans,
        Transpose::NoTrans,
        m,
        n,
        k,
        1.5,
        pa,
        k,
        pb,
        n,
        0.0,
        pc2,
        n,
        &[],
    )
    .unwrap()
    .wait()
    .unwrap();

    assert_eq!(
        download::<f64>(&queue, pc1, m * n),
        download::<f64>(&queue, pc2, m * n)
    );

    usm::free::<f64>(&queue, pa, m * k);
    usm::free::<f64>(&queue, pb, k * n);
    usm::free::<f64>(&queue, pc1, m * n);
    usm::free::<f64>(&queue, pc2, m * n);
}

/// The same input bytes inverted through the compile-time-selected
/// backend and through runtime selection agree to the operation's
/// tolerance.
#[test]
fn test_inverse_agrees_across_selection_strategies() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let st = Static::<CpuNative>::new(&queue);
    let dy = Dynamic::new(&queue);
    let n = 64;

    let mut a = vec![0.0f64; n * n];
    for j in 0..n {
        for i in 0..n {
            a[i + j * n] = if i == j {
                n as f64 + 2.0
            } else {
                ((i * 13 + j * 7) % 9) as f64 * 0.25
            };
        }
    }

    let invert = |sel: &dyn Fn(u64, u64, u64, usize) -> ()| {
        let pa = upload(&queue, &a);
        let pipiv = usm::malloc::<i64>(&queue, n).unwrap();
        let pscratch = usm::malloc::<f64>(&queue, n * n).unwrap();
        sel(pa, pipiv, pscratch, n * n);
        let out = download::<f64>(&queue, pa, n * n);
        usm::free::<f64>(&queue, pa, n * n);
        usm::free::<i64>(&queue, pipiv, n);
        usm::free::<f64>(&queue, pscratch, n * n);
        out
    };

    let via_static = invert(&|pa, pipiv, pscratch, slen| {
        let f = lapack::getrf::<_, f64>(&st, n, n, pa, n, pipiv, &[]).unwrap();
        lapack::getri::<_, f64>(&st, n, pa, n, pipiv, pscratch, slen, &[f])
            .unwrap()
            .wait()
            .unwrap();
    });
    let via_dynamic = invert(&|pa, pipiv, pscratch, slen| {
        let f = lapack::getrf::<_, f64>(&dy, n, n, pa, n, pipiv, &[]).unwrap();
        lapack::getri::<_, f64>(&dy, n, pa, n, pipiv, pscratch, slen, &[f])
            .unwrap()
            .wait()
            .unwrap();
    });

    for (s, d) in via_static.iter().zip(via_dynamic.iter()) {
        assert!((s - d).abs() < 1e-12);
    }
}

#[test]
fn test_static_selector_scratchpad_query_is_direct() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let st = Static::<CpuNative>::new(&queue);
    let n = 10;
    assert_eq!(
        lapack::getri_scratchpad_size::<_, f64>(&st, n, n).unwrap(),
        n * n
    );
}

#[test]
fn test_static_buffer_model_matches_dynamic() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let st = Static::<CpuNative>::new(&queue);
    let dy = Dynamic::new(&queue);
    let n = 6;

    let x = Buffer::from_slice(&vec![2.0f64; n]);
    let y1 = Buffer::from_slice(&vec![1.0f64; n]);
    let y2 = Buffer::from_slice(&vec![1.0f64; n]);

    column_major::axpy_buf(&st, n, 3.0, &x, 1, &y1, 1).unwrap();
    column_major::axpy_buf(&dy, n, 3.0, &x, 1, &y2, 1).unwrap();

    assert_eq!(y1.read().unwrap(), y2.read().unwrap());
    assert_eq!(y1.read().unwrap(), vec![7.0f64; n]);
}
