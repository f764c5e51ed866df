use crate::constants::{DEFAULT_QUALITY, DEFAULT_ROOT_DIR, DEFAULT_WORKERS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-shrink",
    about = "Recompress every JPEG, PNG and GIF under a directory tree",
    long_about = "img-shrink walks a directory, picks up images by file extension and re-encodes \
                  each one at the requested quality using a bounded pool of concurrent workers. \
                  Results are written in place, or under an output directory that is either flat \
                  or mirrors the source hierarchy.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink --dir ./photos --quality 70\n  \
    img-shrink -d ./photos -o ./small --hierarchy --workers 8\n  \
    img-shrink -d ./site -o ./out --override -e jpg,png"
)]
pub struct Args {
    #[arg(
        short = 'd',
        long,
        default_value = DEFAULT_ROOT_DIR,
        help = "Directory to scan for images",
        long_help = "Directory to look up for images to be compressed. \
                     Subdirectories are always visited."
    )]
    pub dir: PathBuf,

    #[arg(
        short = 'o',
        long,
        help = "Output directory (default: overwrite originals)",
        long_help = "Output folder for the compressed images. \
                     If not set, every image is replaced in place."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'q',
        long,
        default_value_t = DEFAULT_QUALITY,
        allow_negative_numbers = true,
        help = "Compression quality (0-100, default: 60)",
        long_help = "Quality handed to the encoder, from 0 (smallest) to 100 (best). \
                     For PNG: >=90 uses Zopfli, >=70 uses high compression, <70 uses standard compression."
    )]
    pub quality: i64,

    #[arg(
        short = 'w',
        long,
        default_value_t = DEFAULT_WORKERS,
        allow_negative_numbers = true,
        help = "Number of images processed concurrently (default: 50)"
    )]
    pub workers: i64,

    #[arg(
        long = "override",
        help = "Remove an existing output file before writing the new one"
    )]
    pub overwrite: bool,

    #[arg(
        long,
        help = "Mirror the source folder structure under the output directory",
        long_help = "Preserve the structure of the inner folders under --output. \
                     Without it all images land directly in the output directory and \
                     images sharing a file name overwrite each other."
    )]
    pub hierarchy: bool,

    #[arg(
        short = 'e',
        long,
        value_delimiter = ',',
        help = "File extensions to pick up (default: jpg,jpeg,png,gif)"
    )]
    pub extensions: Vec<String>,

    #[arg(long, help = "Only print failures")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print destination and sizes for every image")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["img-shrink"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("."));
        assert_eq!(args.output, None);
        assert_eq!(args.quality, 60);
        assert_eq!(args.workers, 50);
        assert!(!args.overwrite);
        assert!(!args.hierarchy);
        assert!(args.extensions.is_empty());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "img-shrink",
            "--dir",
            "in",
            "--output",
            "out",
            "--quality",
            "85",
            "--workers",
            "4",
            "--override",
            "--hierarchy",
            "-e",
            "jpg,png",
        ])
        .unwrap();
        assert_eq!(args.dir, PathBuf::from("in"));
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.quality, 85);
        assert_eq!(args.workers, 4);
        assert!(args.overwrite);
        assert!(args.hierarchy);
        assert_eq!(args.extensions, vec!["jpg", "png"]);
    }

    #[test]
    fn test_negative_workers_parse() {
        // rejected later by Config, not by the parser
        let args = Args::try_parse_from(["img-shrink", "--workers", "-3"]).unwrap();
        assert_eq!(args.workers, -3);
    }
}
