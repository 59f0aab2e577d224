use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::harness::{LoadSettings, SampleStrategy};
use crate::metrics::DEFAULT_WATERMARK;

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/dicom";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_IMAGE_DIR: &str = "./images";

/// With the sample data this is about 500k documents.
pub const LOAD_RUNS: u32 = 1000;
pub const READ_RUNS: u32 = 10000;
pub const STUDIES: u32 = 1000;
pub const IMAGE_SAMPLES: u32 = 10;

#[derive(Debug, Parser)]
#[command(name = "dcmbench", version, about = "DICOM document-store load/read benchmark")]
pub struct Cli {
    /// MongoDB connection string, including the database name
    #[arg(long, default_value = DEFAULT_MONGO_URI)]
    pub uri: String,

    /// Directory holding the DICOM source files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub datadir: PathBuf,

    /// Drop the database and recreate indexes before running
    #[arg(long)]
    pub drop: bool,

    /// Fetch the sample studies into the data directory first
    #[arg(long)]
    pub download: bool,

    /// Workload to measure
    #[arg(long, value_enum, default_value_t = Mode::Mix)]
    pub measure: Mode,

    /// Do not capture pixel data (also disables the image workload)
    #[arg(long)]
    pub noimg: bool,

    /// Load iterations; each one loads the whole data directory again
    #[arg(long, default_value_t = LOAD_RUNS, value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: u32,

    /// Random study reads
    #[arg(long, default_value_t = READ_RUNS)]
    pub reads: u32,

    /// Number of synthetic studies iterations are spread over
    #[arg(long, default_value_t = STUDIES, value_parser = clap::value_parser!(u32).range(1..))]
    pub studies: u32,

    /// Images to sample and render
    #[arg(long, default_value_t = IMAGE_SAMPLES)]
    pub images: u32,

    /// Buffered metric events before a flush is attempted
    #[arg(long, default_value_t = DEFAULT_WATERMARK)]
    pub watermark: usize,

    /// How sampled images are picked
    #[arg(long, value_enum, default_value_t = SampleBy::Study)]
    pub sample_by: SampleBy,

    /// Where rendered images are written
    #[arg(long, default_value = DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// Debug logging for this crate
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Load,
    Read,
    Img,
    Mix,
}

impl Mode {
    pub fn loads(self) -> bool {
        matches!(self, Mode::Load | Mode::Mix)
    }

    pub fn reads(self) -> bool {
        matches!(self, Mode::Read | Mode::Mix)
    }

    pub fn samples_images(self) -> bool {
        matches!(self, Mode::Img | Mode::Mix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleBy {
    Study,
    Offset,
}

impl From<SampleBy> for SampleStrategy {
    fn from(value: SampleBy) -> Self {
        match value {
            SampleBy::Study => SampleStrategy::ByStudy,
            SampleBy::Offset => SampleStrategy::ByOffset,
        }
    }
}

/// Workload settings derived from the command line.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub mode: Mode,
    pub load: LoadSettings,
    pub reads: u32,
    pub images: u32,
    pub sample_by: SampleStrategy,
    pub image_dir: PathBuf,
}

impl BenchConfig {
    pub fn run_images(&self) -> bool {
        self.load.capture_pixels && self.mode.samples_images()
    }
}

impl From<&Cli> for BenchConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            mode: cli.measure,
            load: LoadSettings {
                source_dir: cli.datadir.clone(),
                iterations: cli.iterations,
                studies: cli.studies,
                capture_pixels: !cli.noimg,
            },
            reads: cli.reads,
            images: cli.images,
            sample_by: cli.sample_by.into(),
            image_dir: cli.image_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_benchmark_setup() {
        let cli = Cli::try_parse_from(["dcmbench"]).unwrap();
        assert_eq!(cli.uri, DEFAULT_MONGO_URI);
        assert_eq!(cli.datadir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(cli.measure, Mode::Mix);
        assert!(!cli.drop && !cli.download && !cli.noimg);
        assert_eq!(cli.watermark, DEFAULT_WATERMARK);

        let config = BenchConfig::from(&cli);
        assert_eq!(config.load.iterations, LOAD_RUNS);
        assert_eq!(config.load.studies, STUDIES);
        assert_eq!(config.reads, READ_RUNS);
        assert!(config.load.capture_pixels);
        assert!(config.run_images());
        assert_eq!(config.sample_by, SampleStrategy::ByStudy);
    }

    #[test]
    fn noimg_disables_capture_and_image_workload() {
        let cli = Cli::try_parse_from(["dcmbench", "--measure", "img", "--noimg"]).unwrap();
        let config = BenchConfig::from(&cli);
        assert!(!config.load.capture_pixels);
        assert!(!config.run_images());
        assert!(!config.mode.loads());
    }

    #[test]
    fn rejects_zero_studies_and_unknown_modes() {
        assert!(Cli::try_parse_from(["dcmbench", "--studies", "0"]).is_err());
        assert!(Cli::try_parse_from(["dcmbench", "--measure", "write"]).is_err());
    }

    #[test]
    fn offset_sampling_is_selectable() {
        let cli = Cli::try_parse_from(["dcmbench", "--sample-by", "offset", "--measure", "read"])
            .unwrap();
        let config = BenchConfig::from(&cli);
        assert_eq!(config.sample_by, SampleStrategy::ByOffset);
        assert!(config.mode.reads() && !config.mode.samples_images());
    }
}
