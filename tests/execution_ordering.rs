//! Asynchronous execution contract: dependency chaining, completion
//! signaling, deferred failures, and the absence of false ordering.

use unimath::blas::column_major;
use unimath::prelude::*;
use unimath::rng::{self, Engine, Uniform};
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

/// A dependent call must not observe operands before its declared
/// predecessors complete, even when the predecessor is slow. The
/// predecessor here is an RNG fill that holds the engine lock while the
/// axpy consuming its output waits on the event edge.
#[test]
fn test_dependent_call_waits_for_slow_predecessor() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 1000;

    let px = usm::malloc::<f64>(&queue, n).unwrap();
    let py = upload(&queue, &vec![0.0f64; n]);

    // predecessor: fill x on [1, 2)
    let engine = Engine::new(99);
    let fill = rng::generate_uniform::<_, f64>(
        &sel,
        &Uniform { a: 1.0, b: 2.0 },
        &engine,
        n,
        px,
        &[],
    )
    .unwrap();

    // dependent: y += x; every element of y must land in [1, 2)
    let done = column_major::axpy(&sel, n, 1.0, px, 1, py, 1, &[fill]).unwrap();
    done.wait().unwrap();

    let y: Vec<f64> = download(&queue, py, n);
    assert!(y.iter().all(|v| (1.0..2.0).contains(v)));

    usm::free::<f64>(&queue, px, n);
    usm::free::<f64>(&queue, py, n);
}

/// Chained USM calls through returned events: each stage sees the
/// previous stage's effect exactly.
#[test]
fn test_event_chain_orders_three_stages() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 4;

    let px = upload(&queue, &[1.0f64, 1.0, 1.0, 1.0]);
    let py = upload(&queue, &[0.0f64, 0.0, 0.0, 0.0]);

    // y += 2x three times, each depending on the previous
    let e1 = column_major::axpy(&sel, n, 2.0, px, 1, py, 1, &[]).unwrap();
    let e2 = column_major::axpy(&sel, n, 2.0, px, 1, py, 1, &[e1]).unwrap();
    let e3 = column_major::axpy(&sel, n, 2.0, px, 1, py, 1, &[e2]).unwrap();
    e3.wait().unwrap();

    assert_eq!(download::<f64>(&queue, py, n), vec![6.0, 6.0, 6.0, 6.0]);

    usm::free::<f64>(&queue, px, n);
    usm::free::<f64>(&queue, py, n);
}

/// Two calls with no shared operands and no declared dependency must be
/// able to proceed concurrently: a tiny independent call submitted after
/// a large one completes while the large one is still running. A core
/// that falsely serializes queue submissions fails the ordering check.
#[test]
fn test_independent_calls_are_not_serialized() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 512;

    let pa = upload(&queue, &vec![1.0f64; n * n]);
    let pb = upload(&queue, &vec![1.0f64; n * n]);
    let pc = usm::malloc::<f64>(&queue, n * n).unwrap();
    let slow = column_major::gemm(
        &sel,
        Transpose::NoTrans,
        Transpose::NoTrans,
        n,
        n,
        n,
        1.0,
        pa,
        n,
        pb,
        n,
        0.0,
        pc,
        n,
        &[],
    )
    .unwrap();

    let px = upload(&queue, &[1.0f64]);
    let py = upload(&queue, &[0.0f64]);
    let quick = column_major::axpy(&sel, 1, 1.0, px, 1, py, 1, &[]).unwrap();
    quick.wait().unwrap();

    // the large multiply is still in flight when the small call is done
    assert!(
        !slow.is_complete(),
        "independent submissions appear serialized"
    );
    slow.wait().unwrap();

    usm::free::<f64>(&queue, pa, n * n);
    usm::free::<f64>(&queue, pb, n * n);
    usm::free::<f64>(&queue, pc, n * n);
    usm::free::<f64>(&queue, px, 1);
    usm::free::<f64>(&queue, py, 1);
}

/// Buffer hazards: a read-after-write and a write-after-read both get
/// ordering edges without any caller-visible event.
#[test]
fn test_buffer_hazards_order_implicitly() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 8;

    let x = Buffer::from_slice(&vec![1.0f64; n]);
    let y = Buffer::from_slice(&vec![0.0f64; n]);
    let r = Buffer::<f64>::zeroed(1);

    // writer, then reader-of-y, then another writer of y
    unimath::blas::row_major::axpy_buf(&sel, n, 3.0, &x, 1, &y, 1).unwrap();
    unimath::blas::row_major::dot_buf(&sel, n, &x, 1, &y, 1, &r).unwrap();
    unimath::blas::row_major::axpy_buf(&sel, n, 1.0, &x, 1, &y, 1).unwrap();

    // dot ran between the writes: 8 * (1 * 3)
    assert_eq!(r.read().unwrap(), vec![24.0]);
    // second axpy landed after the read
    assert_eq!(y.read().unwrap(), vec![4.0f64; n]);
}

/// A failed predecessor poisons the dependent call; the dependent's
/// kernel never runs and the failure kind is preserved.
#[test]
fn test_predecessor_failure_propagates_unchanged() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 3;

    // singular matrix: LU hits an exactly-zero pivot
    let a = upload(&queue, &vec![0.0f64; n * n]);
    let ipiv = usm::malloc::<i64>(&queue, n).unwrap();
    let bad = unimath::lapack::getrf::<_, f64>(&sel, n, n, a, n, ipiv, &[]).unwrap();

    let px = upload(&queue, &[1.0f64, 1.0, 1.0]);
    let py = upload(&queue, &[0.0f64, 0.0, 0.0]);
    let dependent = column_major::axpy(&sel, n, 1.0, px, 1, py, 1, &[bad]).unwrap();

    match dependent.wait() {
        Err(Error::ExecutionFailure { detail }) => {
            assert!(detail.contains("zero"), "unexpected detail: {}", detail);
        }
        other => panic!("expected ExecutionFailure, got {:?}", other),
    }
    // dependent never executed
    assert_eq!(download::<f64>(&queue, py, n), vec![0.0, 0.0, 0.0]);

    usm::free::<f64>(&queue, a, n * n);
    usm::free::<i64>(&queue, ipiv, n);
    usm::free::<f64>(&queue, px, n);
    usm::free::<f64>(&queue, py, n);
}

/// Queue::wait drains everything submitted and reports deferred errors.
#[test]
fn test_queue_wait_surfaces_deferred_failure() {
    let device = Device::cpu();
    let queue = Queue::new(&device);
    let sel = Dynamic::new(&queue);
    let n = 2;

    let a = upload(&queue, &vec![0.0f64; n * n]);
    let ipiv = usm::malloc::<i64>(&queue, n).unwrap();
    let _ = unimath::lapack::getrf::<_, f64>(&sel, n, n, a, n, ipiv, &[]).unwrap();

    assert!(matches!(
        queue.wait(),
        Err(Error::ExecutionFailure { .. })
    ));
    // queue is quiescent afterwards
    assert!(queue.wait().is_ok());

    usm::free::<f64>(&queue, a, n * n);
    usm::free::<i64>(&queue, ipiv, n);
}
