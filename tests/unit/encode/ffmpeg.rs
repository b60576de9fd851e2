use super::*;
use crate::encode::sink::AudioInputConfig;

fn cfg(width: u32, height: u32, audio: Option<PathBuf>) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio: audio.map(|path| AudioInputConfig { path }),
    }
}

fn frame(width: u32, height: u32, v: u8) -> FrameRgb {
    FrameRgb {
        width,
        height,
        data: vec![v; (width * height * 3) as usize],
    }
}

fn silent_audio(dir: &Path) -> Option<PathBuf> {
    let path = dir.join("song.m4a");
    let status = Command::new("ffmpeg")
        .args([
            "-loglevel",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "anullsrc=r=44100:cl=stereo",
            "-t",
            "1",
            "-c:a",
            "aac",
        ])
        .arg(&path)
        .status()
        .ok()?;
    status.success().then_some(path)
}

#[test]
fn args_mux_audio_with_configured_encoders() {
    let opts = FfmpegSinkOpts::new("/tmp/out.mp4");
    let args = encoder_args(&opts, &cfg(1280, 720, Some(PathBuf::from("song.mp3"))));
    let joined = args.join(" ");
    assert!(joined.starts_with("-y -loglevel error -f rawvideo -pix_fmt rgb24 -s 1280x720 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-i song.mp3 -map 0:v:0 -map 1:a:0"));
    assert!(joined.contains("-c:v libx264 -preset medium -threads 4 -pix_fmt yuv420p"));
    assert!(joined.contains("-c:a aac -shortest"));
    assert!(joined.ends_with("-movflags +faststart /tmp/out.mp4"));
}

#[test]
fn args_without_audio_disable_audio_stream() {
    let mut opts = FfmpegSinkOpts::new("out.mp4");
    opts.overwrite = false;
    let args = encoder_args(&opts, &cfg(2, 2, None));
    assert_eq!(args[0], "-n");
    assert!(args.iter().any(|a| a == "-an"));
    assert!(!args.iter().any(|a| a == "-shortest"));
}

#[test]
fn begin_rejects_odd_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.mp4")));
    let err = sink.begin(cfg(15, 16, None)).unwrap_err();
    assert!(matches!(err, KaraokeError::Validation(_)));
}

#[test]
fn begin_rejects_missing_audio() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.mp4")));
    let err = sink
        .begin(cfg(16, 16, Some(dir.path().join("missing.mp3"))))
        .unwrap_err();
    assert!(matches!(err, KaraokeError::Resource(_)));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/c.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}

#[test]
fn encodes_mp4_with_audio() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let Some(audio) = silent_audio(dir.path()) else {
        return;
    };
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16, Some(audio))).unwrap();
    for i in 0..10u64 {
        sink.push_frame(FrameIndex(i), &frame(16, 16, (i * 20) as u8))
            .unwrap();
    }
    sink.end().unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn abort_leaves_no_output_file() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16, None)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(16, 16, 0)).unwrap();
    sink.abort();
    assert!(!out.exists());
}

#[test]
fn out_of_order_frames_are_rejected() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16, None)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(16, 16, 0)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame(16, 16, 0)).is_err());
    drop(sink);
    assert!(!out.exists());
}

#[test]
fn failed_encode_reports_ffmpeg_error_and_removes_output() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut opts = FfmpegSinkOpts::new(&out);
    opts.video_codec = "no_such_encoder".to_string();
    let mut sink = FfmpegSink::new(opts);
    sink.begin(cfg(16, 16, None)).unwrap();
    // ffmpeg may already have exited, closing its stdin.
    let _ = sink.push_frame(FrameIndex(0), &frame(16, 16, 0));

    let err = sink.end().unwrap_err();
    let KaraokeError::Encode(msg) = &err else {
        panic!("expected encode error, got {err:?}");
    };
    assert!(msg.contains("ffmpeg exited with status"), "{msg}");
    assert!(msg.contains("no_such_encoder"), "{msg}");
    assert!(!out.exists());
    assert!(sink.cfg.is_none());
}
