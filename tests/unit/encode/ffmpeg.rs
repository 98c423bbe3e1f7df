use super::*;
use crate::foundation::core::{Fps, Rgba8};

fn cfg(format: OutputFormat) -> EncoderConfig {
    EncoderConfig {
        width: 64,
        height: 36,
        fps: Fps::new(30000, 1001).unwrap(),
        format,
        background: Rgba8::new(0, 0, 0, 255),
    }
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_half_alpha_over_black() {
    let src = vec![64u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![64, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn args_stream_rawvideo_in_and_container_out() {
    let args = ffmpeg_args(&cfg(OutputFormat::WebmVp9)).unwrap();
    let joined = args.join(" ");
    assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 64x36 -r 30000/1001 -i pipe:0"));
    assert!(joined.contains("-c:v libvpx-vp9"));
    assert!(joined.contains("-f webm"));
    assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
}

#[test]
fn mp4_output_is_fragmented() {
    let joined = ffmpeg_args(&cfg(OutputFormat::Mp4Avc1)).unwrap().join(" ");
    assert!(joined.contains("-c:v libx264"));
    assert!(joined.contains("empty_moov"));
    assert!(joined.contains("-f mp4"));
}

#[test]
fn raw_format_has_no_ffmpeg_pipeline() {
    assert!(ffmpeg_args(&cfg(OutputFormat::RawRgba)).is_err());
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut enc = FfmpegEncoder::new();
    let mut c = cfg(OutputFormat::Webm);
    c.width = 63;
    let err = enc.start(&c, tx).unwrap_err();
    assert!(err.to_string().contains("even"));
    assert_eq!(enc.state(), RecorderState::Inactive);
}

#[test]
fn stop_before_start_is_a_noop() {
    let mut enc = FfmpegEncoder::default();
    enc.request_stop().unwrap();
    assert_eq!(enc.state(), RecorderState::Inactive);
}

#[test]
fn encodes_to_webm_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut enc = FfmpegEncoder::new();
    let c = cfg(OutputFormat::Webm);
    if enc.start(&c, tx).is_err() {
        return;
    }
    let frame = FrameRGBA {
        width: 64,
        height: 36,
        data: vec![200; 64 * 36 * 4],
        premultiplied: true,
    };
    for _ in 0..5 {
        enc.push_frame(&frame).unwrap();
    }
    enc.request_stop().unwrap();

    let mut bytes = Vec::new();
    for event in rx.iter() {
        match event {
            EncoderEvent::DataAvailable(chunk) => bytes.extend(chunk),
            EncoderEvent::Stopped => break,
            // ffmpeg builds without libvpx are fine to skip
            EncoderEvent::Error(_) => return,
        }
    }
    // EBML magic
    assert_eq!(&bytes[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
}
