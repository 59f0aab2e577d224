use std::fs::{self, File};
use std::path::Path;

use reqwest::blocking::Client;
use zip::ZipArchive;

use crate::error::DownloadError;

/// Sample studies from the DICOM Library, fetched as zip archives.
pub const DICOM_SAMPLES: [(&str, &str); 3] = [
    (
        "DICOM_CT_SAMPLE",
        "https://www.dicomlibrary.com/?requestType=WADO&studyUID=1.2.826.0.1.3680043.8.1055.1.20111102150758591.92402465.76095170&manage=1b9baeb16d2aeba13bed71045df1bc65",
    ),
    (
        "DICOM_MR_SAMPLE",
        "https://www.dicomlibrary.com/?requestType=WADO&studyUID=1.2.826.0.1.3680043.8.1055.1.20111103111148288.98361414.79379639&manage=02ef8f31ea86a45cfce6eb297c274598",
    ),
    (
        "DICOM_OT_SAMPLE",
        "https://www.dicomlibrary.com/?requestType=WADO&studyUID=1.2.826.0.1.3680043.8.1055.1.20111103112244831.40200514.30965937&manage=feb6447a72c9a0a31e1bb4459e547964",
    ),
];

/// Fetch and unpack every sample into `data_dir/<name>/`. Samples whose
/// directory already exists are left alone.
pub fn download_samples(data_dir: &Path) -> Result<(), DownloadError> {
    log::debug!("Attempting to download samples to {}", data_dir.display());
    fs::create_dir_all(data_dir)?;

    let mut client = None;
    for (name, url) in DICOM_SAMPLES {
        let sample_dir = data_dir.join(name);
        if sample_dir.exists() {
            log::info!("{name} already present in {}", sample_dir.display());
            continue;
        }

        let client = match &mut client {
            Some(client) => client,
            slot => slot.insert(Client::builder().build().map_err(DownloadError::Client)?),
        };

        fs::create_dir_all(&sample_dir)?;
        if let Err(err) = fetch_and_extract(client, name, url, &sample_dir) {
            // leave no half-filled directory behind, it would be skipped next time
            if let Err(cleanup) = fs::remove_dir_all(&sample_dir) {
                log::warn!("Could not remove {}: {cleanup}", sample_dir.display());
            }
            return Err(err);
        }
    }
    Ok(())
}

fn fetch_and_extract(
    client: &Client,
    name: &'static str,
    url: &str,
    sample_dir: &Path,
) -> Result<(), DownloadError> {
    let archive = sample_dir.join(format!("{name}.zip"));
    log::info!("Downloading data to {}", archive.display());

    let mut response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|source| DownloadError::Fetch { name, source })?;
    let mut file = File::create(&archive)?;
    response
        .copy_to(&mut file)
        .map_err(|source| DownloadError::Fetch { name, source })?;
    drop(file);

    extract(&archive, sample_dir)?;
    fs::remove_file(&archive)?;
    log::info!("Zip file extracted and deleted");
    Ok(())
}

fn extract(archive: &Path, into: &Path) -> Result<(), DownloadError> {
    let to_error = |source| DownloadError::Extract {
        path: archive.to_path_buf(),
        source,
    };
    let mut zip = ZipArchive::new(File::open(archive)?).map_err(to_error)?;
    zip.extract(into).map_err(to_error)
}
