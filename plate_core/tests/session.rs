//! End-to-end session scenarios driven through the ingestor.

use plate_core::layout::SurfaceLayout;
use plate_core::mocks::interleave_payload;
use plate_core::session::{ChannelAssignments, SensorSession};
use plate_core::{BatchOutcome, ChannelRole, DropReason, StreamIngestor, StreamParams, Surface};

const SIX_AXIS_ORDER: [u16; 14] = [32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45];

fn six_axis_assignments() -> ChannelAssignments {
    let roles = SurfaceLayout::SixAxis.roles();
    ChannelAssignments {
        layout: SurfaceLayout::SixAxis,
        left: roles.iter().copied().zip(32u16..=38).collect(),
        right: roles.iter().copied().zip(39u16..=45).collect(),
    }
}

fn six_axis_session(params: StreamParams) -> SensorSession {
    SensorSession::new(params, six_axis_assignments()).expect("session")
}

/// Interleaved payload where left f_z carries `fz` and every other
/// channel is zero.
fn left_fz_payload(fz: &[i16]) -> Vec<u8> {
    let points = fz.len();
    let mut channels: Vec<Vec<i16>> = vec![vec![0; points]; SIX_AXIS_ORDER.len()];
    channels[2] = fz.to_vec(); // f_z is third in stream order
    interleave_payload(&channels)
}

#[test]
fn block_averaging_of_a_fresh_ramp() {
    // history=1s at 10 Hz raw / 5 Hz display: ratio 2, N=10, M=5.
    let params = StreamParams {
        sample_rate_hz: 10,
        display_rate_hz: 5,
        history_secs: 1,
    };
    let mut session = six_axis_session(params);
    session.set_stream_order(SIX_AXIS_ORDER.to_vec());
    let mut ingestor = StreamIngestor::new();

    let outcome = ingestor.on_batch(
        &mut session,
        &left_fz_payload(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
    );
    assert_eq!(outcome, BatchOutcome::Applied { points: 10 });

    let display = &session.surface(Surface::Left).display;
    assert_eq!(
        display.channel(ChannelRole::Fz).unwrap(),
        &[1.5, 3.5, 5.5, 7.5, 9.5]
    );
    // Six-axis mean series tracks f_z alone.
    assert_eq!(display.mean(), &[1.5, 3.5, 5.5, 7.5, 9.5]);
    assert!((session.surface(Surface::Left).metrics.mean_load - 9.5).abs() < 1e-6);
}

#[test]
fn batch_larger_than_capacity_keeps_newest_history() {
    // N=4 per channel; a 6-point batch must retain only its last 4 values.
    let params = StreamParams {
        sample_rate_hz: 4,
        display_rate_hz: 2,
        history_secs: 1,
    };
    let mut session = six_axis_session(params);
    session.set_stream_order(SIX_AXIS_ORDER.to_vec());
    let mut ingestor = StreamIngestor::new();

    let outcome = ingestor.on_batch(&mut session, &left_fz_payload(&[1, 2, 3, 4, 5, 6]));
    assert_eq!(outcome, BatchOutcome::Applied { points: 6 });

    let buf = session
        .surface(Surface::Left)
        .buffers()
        .buffer(ChannelRole::Fz)
        .unwrap();
    assert_eq!(buf.as_slice(), &[3, 4, 5, 6]);
    assert_eq!(
        session
            .surface(Surface::Left)
            .display
            .channel(ChannelRole::Fz)
            .unwrap(),
        &[3.5, 5.5]
    );
}

#[test]
fn batch_before_channel_metadata_is_dropped_without_effect() {
    let params = StreamParams {
        sample_rate_hz: 10,
        display_rate_hz: 5,
        history_secs: 1,
    };
    let mut session = six_axis_session(params);
    let mut ingestor = StreamIngestor::new();

    let outcome = ingestor.on_batch(&mut session, &left_fz_payload(&[7, 7, 7, 7, 7]));
    assert_eq!(outcome, BatchOutcome::Dropped(DropReason::NoChannelInfo));
    assert_eq!(ingestor.batches_applied(), 0);
    assert_eq!(ingestor.batches_dropped(), 1);

    // Buffers remain in their all-zero startup state.
    let buf = session
        .surface(Surface::Left)
        .buffers()
        .buffer(ChannelRole::Fz)
        .unwrap();
    assert!(buf.as_slice().iter().all(|&v| v == 0));
    assert!(session
        .surface(Surface::Left)
        .display
        .mean()
        .iter()
        .all(|&v| v == 0.0));
}

#[test]
fn successive_batches_roll_the_history() {
    let params = StreamParams {
        sample_rate_hz: 4,
        display_rate_hz: 2,
        history_secs: 1,
    };
    let mut session = six_axis_session(params);
    session.set_stream_order(SIX_AXIS_ORDER.to_vec());
    let mut ingestor = StreamIngestor::new();

    ingestor.on_batch(&mut session, &left_fz_payload(&[1, 2]));
    ingestor.on_batch(&mut session, &left_fz_payload(&[3, 4]));
    ingestor.on_batch(&mut session, &left_fz_payload(&[5, 6]));

    let buf = session
        .surface(Surface::Left)
        .buffers()
        .buffer(ChannelRole::Fz)
        .unwrap();
    assert_eq!(buf.as_slice(), &[3, 4, 5, 6]);
}

#[test]
fn right_surface_channels_route_independently() {
    let params = StreamParams {
        sample_rate_hz: 1,
        display_rate_hz: 1,
        history_secs: 1,
    };
    let mut session = six_axis_session(params);
    session.set_stream_order(SIX_AXIS_ORDER.to_vec());
    let mut ingestor = StreamIngestor::new();

    // One point; right f_z (stream position 9) carries 250.
    let mut channels: Vec<Vec<i16>> = vec![vec![0]; SIX_AXIS_ORDER.len()];
    channels[9] = vec![250];
    ingestor.on_batch(&mut session, &interleave_payload(&channels));

    assert!((session.surface(Surface::Right).metrics.mean_load - 250.0).abs() < 1e-6);
    assert_eq!(session.surface(Surface::Left).metrics.mean_load, 0.0);
    // Six-axis: the marker path is unsupported, no fabricated ratios.
    assert!(session.surface(Surface::Right).metrics.balance.is_none());
}
