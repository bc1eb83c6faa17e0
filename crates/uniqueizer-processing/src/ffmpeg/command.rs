use std::path::Path;

use uniqueizer_core::UniqueizeOptions;

use super::filters::FilterParams;

/// Re-encode settings applied whenever the copy is uniqueized.
const REENCODE_ARGS: [&str; 8] = [
    "-r", "30", "-crf", "28", "-preset", "veryfast", "-b:v", "6.5M",
];

/// Build the encoder argument list for one copy.
///
/// Streams without filters are stream-copied instead of re-encoded.
pub fn build_ffmpeg_args(
    input_path: &Path,
    output_path: &Path,
    options: &UniqueizeOptions,
    params: &FilterParams,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input_path.to_string_lossy().to_string(),
    ];

    if options.do_uniqueize {
        args.extend(REENCODE_ARGS.iter().map(|s| s.to_string()));
    }

    let video_filters = params.video_filters(options);
    if video_filters.is_empty() {
        args.extend_from_slice(&["-c:v".to_string(), "copy".to_string()]);
    } else {
        args.extend_from_slice(&["-vf".to_string(), video_filters.join(",")]);
    }

    let audio_filters = params.audio_filters(options);
    if audio_filters.is_empty() {
        args.extend_from_slice(&["-c:a".to_string(), "copy".to_string()]);
    } else {
        args.extend_from_slice(&["-af".to_string(), audio_filters.join(",")]);
    }

    args.push(output_path.to_string_lossy().to_string());

    tracing::debug!(
        input = %input_path.display(),
        output = %output_path.display(),
        args = %args.join(" "),
        "Built ffmpeg command"
    );

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn paths() -> (PathBuf, PathBuf) {
        (
            PathBuf::from("uploads/12345_clip.mp4"),
            PathBuf::from("output/12345_clip_1_4321.mp4"),
        )
    }

    #[test]
    fn test_plain_copy_stream_copies_everything() {
        let (input, output) = paths();
        let args = build_ffmpeg_args(
            &input,
            &output,
            &UniqueizeOptions::default(),
            &FilterParams::default(),
        );
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "uploads/12345_clip.mp4",
                "-c:v",
                "copy",
                "-c:a",
                "copy",
                "output/12345_clip_1_4321.mp4",
            ]
        );
    }

    #[test]
    fn test_uniqueize_reencodes_with_filters() {
        let (input, output) = paths();
        let options = UniqueizeOptions {
            do_uniqueize: true,
            randomize_volume: true,
            ..Default::default()
        };
        let params = FilterParams {
            volume_percent: 104,
            ..Default::default()
        };
        let args = build_ffmpeg_args(&input, &output, &options, &params);
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "uploads/12345_clip.mp4",
                "-r",
                "30",
                "-crf",
                "28",
                "-preset",
                "veryfast",
                "-b:v",
                "6.5M",
                "-vf",
                "eq=gamma=100/100:saturation=100/100:brightness=0,noise=alls=1:allf=t,setsar=1",
                "-af",
                "volume=104/100",
                "output/12345_clip_1_4321.mp4",
            ]
        );
    }

    #[test]
    fn test_antitranscribe_only_keeps_video_stream() {
        let (input, output) = paths();
        let options = UniqueizeOptions {
            do_audio_antitranscribe: true,
            ..Default::default()
        };
        let args = build_ffmpeg_args(&input, &output, &options, &FilterParams::default());
        let joined = args.join(" ");
        assert!(joined.contains("-c:v copy"));
        assert!(joined.contains("-af pan=stereo|c0=FL|c1=-1*FR"));
        assert!(!joined.contains("-crf"));
        assert_eq!(args.last().map(String::as_str), Some("output/12345_clip_1_4321.mp4"));
    }
}
