use super::*;
use crate::encode::capability::StaticCapabilities;

#[test]
fn selection_prefers_the_most_efficient_supported_codec() {
    let all = StaticCapabilities::supporting(&[OutputFormat::WebmVp9, OutputFormat::Mp4Avc1]);
    assert_eq!(select_format(&all), OutputFormat::WebmVp9);

    let mp4_only = StaticCapabilities::supporting(&[OutputFormat::Mp4Avc1]);
    assert_eq!(select_format(&mp4_only), OutputFormat::Mp4Avc1);
}

#[test]
fn selection_falls_back_to_baseline() {
    let none = StaticCapabilities::supporting(&[]);
    assert_eq!(select_format(&none), OutputFormat::Webm);
    assert_eq!(select_format(&none), OutputFormat::BASELINE);
}

#[test]
fn mime_round_trips_and_tolerates_spacing() {
    for f in OutputFormat::PREFERENCE {
        assert_eq!(OutputFormat::from_mime(f.mime_type()), Some(f));
    }
    assert_eq!(
        OutputFormat::from_mime("video/webm; codecs=VP9"),
        Some(OutputFormat::WebmVp9)
    );
    assert_eq!(OutputFormat::from_mime("video/webm;codecs=av1"), None);
}

#[test]
fn extensions_and_codecs() {
    assert_eq!(OutputFormat::WebmVp9.extension(), "webm");
    assert_eq!(OutputFormat::Mp4Avc1.extension(), "mp4");
    assert_eq!(OutputFormat::RawRgba.extension(), "raw");
    assert_eq!(OutputFormat::Webm.ffmpeg_codec(), Some("libvpx"));
    assert_eq!(OutputFormat::RawRgba.ffmpeg_codec(), None);
    assert_eq!(OutputFormat::Mp4Avc1.to_string(), "video/mp4;codecs=avc1");
}
