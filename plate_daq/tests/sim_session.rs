use std::time::Duration;

use plate_daq::SimulatedDaq;
use plate_traits::{DaqEvent, DaqSource};
use rstest::rstest;

const TIMEOUT: Duration = Duration::from_millis(20);

fn four_corner_daq(samples_per_batch: usize, batches: Option<u64>) -> SimulatedDaq {
    SimulatedDaq::four_corner([10, 11, 12, 13], [14, 15, 16, 17], 1000, samples_per_batch, batches)
}

#[test]
fn first_event_advertises_channel_ids() {
    let mut daq = SimulatedDaq::six_axis(1000, 10, Some(1));
    match daq.next_event(TIMEOUT).unwrap() {
        Some(DaqEvent::DeviceInfo { options }) => {
            assert_eq!(
                options,
                "channelids=32,33,34,35,36,37,38,39,40,41,42,43,44,45"
            );
        }
        other => panic!("expected DeviceInfo, got {other:?}"),
    }
}

#[test]
fn corner_session_advertises_configured_ids() {
    let mut daq = four_corner_daq(10, Some(1));
    match daq.next_event(TIMEOUT).unwrap() {
        Some(DaqEvent::DeviceInfo { options }) => {
            assert_eq!(options, "channelids=10,11,12,13,14,15,16,17");
        }
        other => panic!("expected DeviceInfo, got {other:?}"),
    }
}

#[rstest]
#[case::six_axis_small(SimulatedDaq::six_axis(1000, 10, Some(3)), 10, 14)]
#[case::six_axis_display_batch(SimulatedDaq::six_axis(1000, 100, Some(3)), 100, 14)]
#[case::four_corner(four_corner_daq(25, Some(3)), 25, 8)]
fn batches_are_interleaved_i16_frames(
    #[case] mut daq: SimulatedDaq,
    #[case] points: usize,
    #[case] channels: usize,
) {
    daq.next_event(TIMEOUT).unwrap(); // metadata
    for _ in 0..3 {
        match daq.next_event(TIMEOUT).unwrap() {
            Some(DaqEvent::Samples { data }) => {
                // time points x channels x 2 bytes
                assert_eq!(data.len(), points * channels * 2);
            }
            other => panic!("expected Samples, got {other:?}"),
        }
    }
}

#[test]
fn bounded_session_ends_with_done() {
    let mut daq = SimulatedDaq::six_axis(1000, 10, Some(2));
    daq.next_event(TIMEOUT).unwrap();
    daq.next_event(TIMEOUT).unwrap();
    daq.next_event(TIMEOUT).unwrap();
    assert!(matches!(
        daq.next_event(TIMEOUT).unwrap(),
        Some(DaqEvent::Done)
    ));
    // Done is sticky
    assert!(matches!(
        daq.next_event(TIMEOUT).unwrap(),
        Some(DaqEvent::Done)
    ));
}

#[test]
fn injected_fault_is_terminal() {
    let mut daq = SimulatedDaq::six_axis(1000, 10, None).fail_after(1);
    daq.next_event(TIMEOUT).unwrap(); // metadata
    assert!(matches!(
        daq.next_event(TIMEOUT).unwrap(),
        Some(DaqEvent::Samples { .. })
    ));
    let err = daq.next_event(TIMEOUT).unwrap_err();
    assert!(err.to_string().contains("closed by peer"));
}

#[test]
fn vertical_load_sweeps_between_plates() {
    let mut daq = SimulatedDaq::six_axis(100, 200, Some(1)).stride_period(2.0);
    daq.next_event(TIMEOUT).unwrap();
    let data = match daq.next_event(TIMEOUT).unwrap() {
        Some(DaqEvent::Samples { data }) => data,
        other => panic!("expected Samples, got {other:?}"),
    };
    let frame = |p: usize, pos: usize| {
        let off = 2 * (p * 14 + pos);
        i16::from_le_bytes([data[off], data[off + 1]])
    };
    // quarter stride: left peaks. three-quarter stride: right peaks.
    assert!(frame(50, 2) > frame(50, 9));
    assert!(frame(150, 9) > frame(150, 2));
}
