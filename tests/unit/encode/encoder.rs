use super::*;
use crossbeam_channel::unbounded;

fn cfg() -> EncoderConfig {
    EncoderConfig {
        width: 2,
        height: 2,
        fps: Fps::new(10, 1).unwrap(),
        format: OutputFormat::Webm,
        background: Rgba8::new(0, 0, 0, 255),
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

#[test]
fn memory_encoder_batches_segments_and_flushes_on_stop() {
    let (tx, rx) = unbounded();
    let mut enc = MemoryEncoder::new(2);
    assert_eq!(enc.state(), RecorderState::Inactive);
    enc.start(&cfg(), tx).unwrap();
    assert_eq!(enc.state(), RecorderState::Recording);

    for v in 1..=3 {
        enc.push_frame(&frame(v)).unwrap();
    }
    enc.request_stop().unwrap();
    assert_eq!(enc.state(), RecorderState::Inactive);

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 3);
    let EncoderEvent::DataAvailable(first) = &events[0] else {
        panic!("expected data, got {:?}", events[0]);
    };
    assert_eq!(first.len(), 32);
    assert_eq!(events[1], EncoderEvent::DataAvailable(vec![3; 16]));
    assert_eq!(events[2], EncoderEvent::Stopped);
    assert_eq!(enc.mime_type(), "video/x-raw");
}

#[test]
fn second_stop_is_a_noop() {
    let (tx, rx) = unbounded();
    let mut enc = MemoryEncoder::default();
    enc.start(&cfg(), tx).unwrap();
    enc.request_stop().unwrap();
    enc.request_stop().unwrap();
    let stops = rx
        .try_iter()
        .filter(|e| *e == EncoderEvent::Stopped)
        .count();
    assert_eq!(stops, 1);
}

#[test]
fn frames_outside_recording_or_of_wrong_size_are_rejected() {
    let mut enc = MemoryEncoder::default();
    assert!(enc.push_frame(&frame(0)).is_err());

    let (tx, _rx) = unbounded();
    enc.start(&cfg(), tx).unwrap();
    let wrong = FrameRGBA {
        width: 4,
        height: 1,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(enc.push_frame(&wrong).is_err());
}
