//! Sessions driven by real sample sources
//!
//! MCP3008 over a scripted bus, CSV recording and replay, camera frames.

#![cfg(feature = "std")]

mod common;

use std::collections::VecDeque;

use common::{min_max_model, probe_interpolation, soil_frame, ScriptedBus};
use soilgauge_core::{
    acquisition::{CameraSource, Mcp3008, ReplaySource},
    calibration::OutOfRangePolicy,
    conditioning::{Conditioner, ConditioningConfig, GlossFilter, GrayImage, Normalization, Reduction, RoiSelection},
    history::LoggedEstimate,
    report::{history_json, CsvSink, HistoryEntry, CSV_HEADER},
    session::{SensorSession, SessionCommand},
    time::FixedTime,
    traits::FrameSource,
    AcquisitionError, Channel, MoistureEstimator, Validity,
};
use tempfile::NamedTempFile;

const T0: u64 = 1_700_000_000_000;

#[test]
fn mcp3008_session_publishes_calibrated_text() {
    let (bus, bus_log) = ScriptedBus::new(&[365, 522, 1023]);
    let adc = Mcp3008::new(bus, 0).unwrap();
    let estimator = MoistureEstimator::analog(probe_interpolation());

    let mut session: SensorSession<_, _, _> =
        SensorSession::open(adc, estimator, FixedTime::new(T0)).unwrap();
    assert_eq!(session.value(), b"0.00");

    assert_eq!(session.handle_read(), b"7.50");
    assert_eq!(session.handle_read(), b"11.24");
    assert_eq!(session.handle_read(), b"15.00");

    // Script exhausted: the bus fails and the last value is served again
    assert_eq!(session.handle_read(), b"15.00");

    assert_eq!(session.log().len(), 3);
    assert_eq!(
        session.log().latest().map(|e| e.estimate.validity),
        Some(Validity::Extrapolated)
    );

    let sent = bus_log.borrow().frames_sent.clone();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|frame| *frame == [0x01, 0x80, 0x00]));

    drop(session);
    assert_eq!(bus_log.borrow().closed, 1);
}

#[test]
fn mcp3008_rejects_missing_channel() {
    let (bus, _) = ScriptedBus::new(&[]);
    assert!(matches!(
        Mcp3008::new(bus, 8),
        Err(AcquisitionError::InvalidChannel { channel: 8 })
    ));
}

#[test]
fn bus_failure_surfaces_from_sample() {
    let (bus, _) = ScriptedBus::new(&[]);
    let adc = Mcp3008::new(bus, 3).unwrap();
    let mut session: SensorSession<_, _, _> = SensorSession::open(
        adc,
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();

    assert!(matches!(session.sample(), Err(AcquisitionError::Bus { .. })));
    assert!(session.log().is_empty());
}

#[test]
fn shutdown_write_reaches_outer_loop() {
    let (bus, bus_log) = ScriptedBus::new(&[400; 16]);
    let adc = Mcp3008::new(bus, 0).unwrap();
    let mut session: SensorSession<_, _, _> = SensorSession::open(
        adc,
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();

    let stop = session.shutdown_signal();
    let mut reads = 0;
    while !stop.is_requested() {
        session.handle_read();
        reads += 1;
        if reads == 5 {
            assert_eq!(session.handle_write(&[0x0F]), SessionCommand::Shutdown);
        }
    }
    session.close();

    assert_eq!(reads, 5);
    assert!(!session.is_open());
    assert_eq!(bus_log.borrow().closed, 1);
}

#[test]
fn recorded_csv_replays_to_same_estimates() {
    let codes = [220, 300, 365, 522, 680, 900];
    let mut session: SensorSession<_, _, _> = SensorSession::open(
        ReplaySource::from_adc_codes(&codes).unwrap(),
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();
    while session.sample().is_ok() {}
    assert_eq!(session.log().len(), codes.len());

    let mut recording = NamedTempFile::new().unwrap();
    let mut sink = CsvSink::new(recording.as_file_mut());
    session.publish_history(&mut sink);
    assert_eq!(sink.failures(), 0);
    drop(sink);

    let text = std::fs::read_to_string(recording.path()).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
    assert_eq!(text.lines().count(), codes.len() + 1);

    let replay = ReplaySource::from_csv(Channel::Analog, &text).unwrap();
    assert_eq!(replay.remaining(), codes.len());

    let mut replayed: SensorSession<_, _, _> = SensorSession::open(
        replay,
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();
    while replayed.sample().is_ok() {}

    let original: Vec<_> = session.log().iter().map(|e| e.estimate).collect();
    let again: Vec<_> = replayed.log().iter().map(|e| e.estimate).collect();
    assert_eq!(original, again);

    replayed.close();
    assert!(replayed.source().is_released());
}

#[test]
fn history_json_lists_oldest_first() {
    let mut session: SensorSession<_, _, _, 3> = SensorSession::open(
        ReplaySource::from_adc_codes(&[220, 365, 680, 522]).unwrap(),
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();
    while session.sample().is_ok() {}
    assert!(session.log().is_full());

    let json = history_json(session.log()).unwrap();
    let entries: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();

    // Capacity 3: the first reading (3%) was overwritten
    let moisture: Vec<f64> = entries.iter().map(|e| e.moisture).collect();
    assert_eq!(moisture.len(), 3);
    assert_eq!(&moisture[..2], &[7.5, 15.0]);
    assert!((moisture[2] - (7.5 + 7.5 * 157.0 / 315.0)).abs() < 1e-12);
    assert!(entries.iter().all(|e| e.timestamp == 1_700_000_000.0));
}

#[test]
fn history_goes_to_any_sink() {
    let mut session: SensorSession<_, _, _> = SensorSession::open(
        ReplaySource::from_adc_codes(&[220, 680]).unwrap(),
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    )
    .unwrap();
    while session.sample().is_ok() {}

    let mut collected: Vec<LoggedEstimate> = Vec::new();
    session.publish_history(&mut collected);
    assert_eq!(collected.len(), 2);
    assert_eq!(collected[0].estimate.percent, 3.0);
    assert_eq!(collected[1].estimate.percent, 15.0);
}

/// Camera that yields queued frames, then reports nothing ready
struct QueuedCamera(VecDeque<GrayImage>);

impl FrameSource for QueuedCamera {
    fn poll_frame(&mut self) -> nb::Result<GrayImage, AcquisitionError> {
        self.0.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

#[test]
fn camera_session_conditions_each_frame() {
    let config = ConditioningConfig {
        roi: RoiSelection::Full,
        normalization: Normalization::None,
        gloss: GlossFilter::None,
        reduction: Reduction::AllPixels,
    };
    let frames = VecDeque::from(vec![
        GrayImage::filled(16, 16, 157).unwrap(),
        GrayImage::filled(16, 16, 116).unwrap(),
        GrayImage::filled(16, 16, 60).unwrap(),
    ]);
    let camera = CameraSource::new(QueuedCamera(frames), Conditioner::new(config));
    let estimator = MoistureEstimator::new(
        min_max_model(OutOfRangePolicy::Clamp),
        Channel::CameraRoi,
        config,
    );

    let mut session: SensorSession<_, _, _> =
        SensorSession::open(camera, estimator, FixedTime::new(T0)).unwrap();

    assert_eq!(session.handle_read(), b"0.00");
    assert_eq!(session.handle_read(), b"14.64");
    assert_eq!(session.handle_read(), b"50.00");
    assert_eq!(session.log().latest().unwrap().estimate.validity, Validity::Extrapolated);

    // Nothing queued: not an error, the last value stays
    assert!(matches!(session.sample(), Ok(None)));
    assert_eq!(session.value(), b"50.00");
}

#[test]
fn noisy_frames_stay_in_calibrated_band() {
    let frames: VecDeque<_> = (0..4).map(|seed| soil_frame(64, 48, 116, 6, seed)).collect();
    let camera = CameraSource::new(
        QueuedCamera(frames),
        Conditioner::new(ConditioningConfig {
            roi: RoiSelection::Full,
            normalization: Normalization::None,
            ..ConditioningConfig::default()
        }),
    );
    let mut session: SensorSession<_, _, _> = SensorSession::open(
        camera,
        MoistureEstimator::camera(min_max_model(OutOfRangePolicy::Strict)),
        FixedTime::new(T0),
    )
    .unwrap();

    while let Ok(Some(entry)) = session.sample() {
        assert!((entry.estimate.percent - 14.64).abs() < 1.0);
    }
    assert_eq!(session.log().len(), 4);
}

#[test]
fn mismatched_source_refuses_to_open() {
    let camera = CameraSource::new(QueuedCamera(VecDeque::new()), Conditioner::default());
    let result: Result<SensorSession<_, _, _>, _> = SensorSession::open(
        camera,
        MoistureEstimator::analog(probe_interpolation()),
        FixedTime::new(T0),
    );
    assert!(matches!(result, Err(AcquisitionError::Conditioning(_))));
}
