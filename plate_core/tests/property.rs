use plate_core::buffer::ChannelBuffer;
use plate_core::layout::SurfaceLayout;
use plate_core::session::{ChannelAssignments, SensorSession};
use plate_core::{ChannelRole, StreamParams, Surface};
use proptest::prelude::*;

fn corner_assignments() -> ChannelAssignments {
    ChannelAssignments {
        layout: SurfaceLayout::FourCorner,
        left: vec![
            (ChannelRole::FrontLeft, 1),
            (ChannelRole::FrontRight, 2),
            (ChannelRole::BackLeft, 3),
            (ChannelRole::BackRight, 4),
        ],
        right: vec![
            (ChannelRole::FrontLeft, 5),
            (ChannelRole::FrontRight, 6),
            (ChannelRole::BackLeft, 7),
            (ChannelRole::BackRight, 8),
        ],
    }
}

/// A 1-sample/1-slot session: latest display value == latest raw sample.
fn single_slot_session() -> SensorSession {
    let params = StreamParams {
        sample_rate_hz: 1,
        display_rate_hz: 1,
        history_secs: 1,
    };
    SensorSession::new(params, corner_assignments()).expect("session")
}

proptest! {
    #[test]
    fn buffer_length_is_invariant_under_any_batches(
        cap in 1usize..64,
        batches in prop::collection::vec(prop::collection::vec(any::<i32>(), 0..100), 0..20),
    ) {
        let mut b = ChannelBuffer::zeroed(cap);
        for batch in &batches {
            b.append(batch);
            prop_assert_eq!(b.len(), cap);
        }
    }

    #[test]
    fn trailing_entries_match_batch_concatenation(
        cap in 1usize..64,
        batches in prop::collection::vec(prop::collection::vec(any::<i32>(), 1..8), 1..8),
    ) {
        let total: usize = batches.iter().map(Vec::len).sum();
        prop_assume!(total <= cap);

        let mut b = ChannelBuffer::zeroed(cap);
        let mut concat = Vec::new();
        for batch in &batches {
            b.append(batch);
            concat.extend_from_slice(batch);
        }
        prop_assert_eq!(&b.as_slice()[cap - total..], concat.as_slice());
    }

    #[test]
    fn oversized_batch_keeps_most_recent_capacity(
        cap in 1usize..32,
        extra in 1usize..64,
    ) {
        let batch: Vec<i32> = (0..(cap + extra) as i32).collect();
        let mut b = ChannelBuffer::zeroed(cap);
        b.append(&batch);
        prop_assert_eq!(b.as_slice(), &batch[extra..]);
    }

    #[test]
    fn ratios_stay_in_unit_interval_for_nonnegative_forces(
        fl in 0i16..=i16::MAX,
        fr in 0i16..=i16::MAX,
        bl in 0i16..=i16::MAX,
        br in 0i16..=i16::MAX,
    ) {
        let mut session = single_slot_session();
        session.set_stream_order(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let mut ingestor = plate_core::StreamIngestor::new();
        // One point: left corners carry the generated forces, right is idle.
        let payload = plate_core::mocks::interleave_payload(&[
            vec![fl], vec![fr], vec![bl], vec![br],
            vec![0], vec![0], vec![0], vec![0],
        ]);
        let outcome = ingestor.on_batch(&mut session, &payload);
        prop_assert_eq!(outcome, plate_core::BatchOutcome::Applied { points: 1 });

        let m = session.surface(Surface::Left).metrics;
        let b = m.balance.expect("corner layout has ratios");
        prop_assert!((0.0..=1.0).contains(&b.lateral));
        prop_assert!((0.0..=1.0).contains(&b.anterior_posterior));
    }
}

#[test]
fn all_zero_forces_report_zero_ratios() {
    // Epsilon policy check at the estimator level: as forces -> 0 the
    // numerator vanishes while the denominator tends to the epsilon, so
    // both ratios tend to 0 (not a symmetric 0.5).
    let mut session = single_slot_session();
    session.set_stream_order(vec![1, 2, 3, 4, 5, 6, 7, 8]);
    let mut ingestor = plate_core::StreamIngestor::new();
    let payload = plate_core::mocks::interleave_payload(&[
        vec![0],
        vec![0],
        vec![0],
        vec![0],
        vec![0],
        vec![0],
        vec![0],
        vec![0],
    ]);
    ingestor.on_batch(&mut session, &payload);
    let b = session.surface(Surface::Left).metrics.balance.unwrap();
    assert_eq!(b.lateral, 0.0);
    assert_eq!(b.anterior_posterior, 0.0);
}
