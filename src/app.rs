use std::process::ExitCode;

use anyhow::Context;
use rand::Rng;

use crate::cli::{BenchConfig, Cli};
use crate::download::download_samples;
use crate::error::StoreError;
use crate::harness::Bench;
use crate::image_pipeline::PngSink;
use crate::metrics::MetricsRecorder;
use crate::store::{DocumentStore, MongoStore};

pub fn run(cli: Cli) -> ExitCode {
    log::info!("Starting dcmbench ({:?})", cli.measure);

    let mut store = match MongoStore::connect(&cli.uri) {
        Ok(store) => store,
        Err(err @ StoreError::NoDatabase(_)) => {
            log::error!("Database not set in mongodb uri, cannot continue");
            log::error!("Ensure the uri names a database: mongodb://localhost:27017/dbname");
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Using database {}", store.database_name());

    if let Err(err) = prepare(&mut store, &cli) {
        log::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    let config = BenchConfig::from(&cli);
    let mut bench = Bench::new(
        store,
        MetricsRecorder::new(cli.watermark),
        rand::thread_rng(),
    );
    match finish(&mut bench, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Startup steps requested on the command line: drop and re-index, then
/// fetch the sample data.
pub fn prepare<S: DocumentStore>(store: &mut S, cli: &Cli) -> anyhow::Result<()> {
    if cli.drop {
        store.reset().context("failed to reset database")?;
    }
    if cli.download {
        download_samples(&cli.datadir).context("failed to download samples")?;
    }
    Ok(())
}

/// Run the selected workloads, then always try to drain the metrics buffer.
pub fn finish<S: DocumentStore, R: Rng>(
    bench: &mut Bench<S, R>,
    config: &BenchConfig,
) -> anyhow::Result<()> {
    let outcome = run_workloads(bench, config);
    let drained = bench.drain().context("metrics not written at shutdown");

    match (outcome, drained) {
        (Err(err), Err(drain_err)) => {
            log::error!("{drain_err:#}");
            Err(err)
        }
        (Err(err), Ok(_)) | (Ok(()), Err(err)) => Err(err),
        (Ok(()), Ok(written)) => {
            log::info!("Finished, {written} trailing metrics written");
            Ok(())
        }
    }
}

fn run_workloads<S: DocumentStore, R: Rng>(
    bench: &mut Bench<S, R>,
    config: &BenchConfig,
) -> anyhow::Result<()> {
    if config.mode.loads() {
        let summary = bench.run_load(&config.load).context("load workload aborted")?;
        log::info!(
            "Load finished: {} documents written, {} iterations dropped",
            summary.written,
            summary.failed_iterations
        );
    }

    if config.mode.reads() {
        bench.run_read(config.reads).context("read workload aborted")?;
    }

    if config.run_images() {
        let mut sink = PngSink::new(&config.image_dir)?;
        let rendered = bench
            .sample_images(config.images, config.sample_by, &mut sink)
            .context("image workload aborted")?;
        log::info!("Rendered {rendered} images to {}", sink.dir().display());
    }

    Ok(())
}
