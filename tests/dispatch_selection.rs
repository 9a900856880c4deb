//! Backend identification and runtime table resolution: the error
//! taxonomy boundaries and the construct-once table guarantee.

use std::thread;
use unimath::blas::column_major;
use unimath::prelude::*;
use unimath::sparse;
use unimath::usm;

#[test]
fn test_unknown_vendor_is_unsupported_backend() {
    let device = Device::from_metadata("acme devices", "frobnicator 9000", 0);
    assert_eq!(identify(&device, Domain::Blas), Backend::Unsupported);

    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let err = column_major::axpy(&sel, 1, 1.0f64, 0x10, 1, 0x20, 1, &[]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedBackend { .. }));
}

#[test]
fn test_recognized_backend_without_built_unit_is_unsupported() {
    // AMD platform is recognized, but no rocblas unit is built or on disk
    let device = Device::from_metadata("amd", "hip runtime", 0);
    assert_eq!(identify(&device, Domain::Blas), Backend::Rocblas);

    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let err = column_major::axpy(&sel, 1, 1.0f64, 0x10, 1, 0x20, 1, &[]).unwrap_err();
    match err {
        Error::UnsupportedBackend { domain, detail } => {
            assert_eq!(domain, Domain::Blas);
            assert!(detail.contains("rocblas"), "detail: {}", detail);
        }
        other => panic!("expected UnsupportedBackend, got {:?}", other),
    }
}

#[test]
fn test_trsv_is_unimplemented_not_unsupported() {
    // the sparse table loads fine; the trsv entry is absent from it
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    let err = sparse::row_major::trsv::<_, f64>(
        &sel,
        UpLo::Lower,
        Transpose::NoTrans,
        2,
        0x10,
        0x20,
        0x30,
        0x40,
        &[],
    )
    .unwrap_err();
    match err {
        Error::UnimplementedOperation {
            backend,
            domain,
            op,
        } => {
            assert_eq!(backend, Backend::CpuNative);
            assert_eq!(domain, Domain::Sparse);
            assert_eq!(op, "trsv");
        }
        other => panic!("expected UnimplementedOperation, got {:?}", other),
    }
}

#[test]
fn test_unimplemented_is_distinct_from_unsupported() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    // spmv works on the same backend that lacks trsv
    let row_ptr = [0i64, 1];
    let col_ind = [0i64];
    let values = [2.0f64];
    let x = [3.0f64];
    let y = [0.0f64];
    let prp = usm::malloc::<i64>(&queue, 2).unwrap();
    let pci = usm::malloc::<i64>(&queue, 1).unwrap();
    let pv = usm::malloc::<f64>(&queue, 1).unwrap();
    let px = usm::malloc::<f64>(&queue, 1).unwrap();
    let py = usm::malloc::<f64>(&queue, 1).unwrap();
    usm::copy_to_device(&queue, &row_ptr, prp).unwrap();
    usm::copy_to_device(&queue, &col_ind, pci).unwrap();
    usm::copy_to_device(&queue, &values, pv).unwrap();
    usm::copy_to_device(&queue, &x, px).unwrap();
    usm::copy_to_device(&queue, &y, py).unwrap();

    sparse::row_major::spmv(
        &sel,
        Transpose::NoTrans,
        1,
        1,
        1.0f64,
        prp,
        pci,
        pv,
        px,
        0.0,
        py,
        &[],
    )
    .unwrap()
    .wait()
    .unwrap();

    let mut out = [0.0f64];
    usm::copy_from_device(&queue, py, &mut out).unwrap();
    assert_eq!(out[0], 6.0);

    usm::free::<i64>(&queue, prp, 2);
    usm::free::<i64>(&queue, pci, 1);
    usm::free::<f64>(&queue, pv, 1);
    usm::free::<f64>(&queue, px, 1);
    usm::free::<f64>(&queue, py, 1);
}

/// Concurrent first use of one (domain, backend) pair: every thread
/// succeeds and observes the same fully constructed table (same
/// dispatch behavior, consistent results).
#[test]
fn test_concurrent_first_use_constructs_once() {
    let device = Device::cpu();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dev = device.clone();
            thread::spawn(move || {
                let queue = Queue::new(&dev);
                let sel = Dynamic::new(&queue);
                let x = [i as f64; 4];
                let y = [1.0f64; 4];
                let px = usm::malloc::<f64>(&queue, 4).unwrap();
                let py = usm::malloc::<f64>(&queue, 4).unwrap();
                usm::copy_to_device(&queue, &x, px).unwrap();
                usm::copy_to_device(&queue, &y, py).unwrap();

                column_major::axpy(&sel, 4, 1.0, px, 1, py, 1, &[])
                    .unwrap()
                    .wait()
                    .unwrap();

                let mut out = [0.0f64; 4];
                usm::copy_from_device(&queue, py, &mut out).unwrap();
                usm::free::<f64>(&queue, px, 4);
                usm::free::<f64>(&queue, py, 4);
                out
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        let out = h.join().unwrap();
        assert_eq!(out, [i as f64 + 1.0; 4]);
    }
}

#[test]
fn test_lookup_is_idempotent_across_calls() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);

    // same call twice through the cached table; identical results
    let x = [2.0f64, 4.0];
    let px = usm::malloc::<f64>(&queue, 2).unwrap();
    let pr = usm::malloc::<f64>(&queue, 1).unwrap();
    usm::copy_to_device(&queue, &x, px).unwrap();

    for _ in 0..2 {
        column_major::dot::<_, f64>(&sel, 2, px, 1, px, 1, pr, &[])
            .unwrap()
            .wait()
            .unwrap();
        let mut out = [0.0f64];
        usm::copy_from_device(&queue, pr, &mut out).unwrap();
        assert_eq!(out[0], 20.0);
    }

    usm::free::<f64>(&queue, px, 2);
    usm::free::<f64>(&queue, pr, 1);
}

#[test]
fn test_identification_never_panics_on_garbage_metadata() {
    for (vendor, platform) in [
        ("", ""),
        ("\u{0}\u{0}", "???"),
        ("CUDA", "not-really"),
        ("host", "HOST"),
    ] {
        let device = Device::from_metadata(vendor, platform, 0);
        // any result is fine; the contract is "no panic, no error"
        let _ = identify(&device, Domain::Dft);
    }
}
