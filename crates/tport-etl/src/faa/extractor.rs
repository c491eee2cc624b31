//! FAA releasable-aircraft archive provider
//!
//! Downloads `ReleasableAircraft.zip` into the data directory, unpacks its
//! `.txt` members and locates the three files the pipeline reads. A data
//! directory that already holds the extracted files is used as-is.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::EtlConfig;
use crate::error::{EtlError, Result};

pub const ARCHIVE_NAME: &str = "ReleasableAircraft.zip";
pub const MASTER_FILE: &str = "MASTER.txt";
pub const AIRCRAFT_REF_FILE: &str = "ACFTREF.txt";
pub const ENGINE_FILE: &str = "ENGINE.txt";

/// Paths of the extracted registry files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaaFiles {
    pub master: PathBuf,
    pub aircraft_ref: PathBuf,
    pub engine: PathBuf,
}

impl FaaFiles {
    /// Find the registry files in `dir`, ignoring file name case
    pub fn locate(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(EtlError::SourceFileMissing(dir.join(MASTER_FILE).display().to_string()));
        }

        let names: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();

        let find = |wanted: &str| -> Result<PathBuf> {
            names
                .iter()
                .find(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
                })
                .cloned()
                .ok_or_else(|| EtlError::SourceFileMissing(dir.join(wanted).display().to_string()))
        };

        Ok(Self {
            master: find(MASTER_FILE)?,
            aircraft_ref: find(AIRCRAFT_REF_FILE)?,
            engine: find(ENGINE_FILE)?,
        })
    }
}

pub struct FaaExtractor {
    client: reqwest::Client,
    url: String,
    data_dir: PathBuf,
    max_retries: u32,
    retry_delay: Duration,
    show_progress: bool,
}

impl FaaExtractor {
    pub fn new(config: &EtlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .user_agent(concat!("tport-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.faa_url.clone(),
            data_dir: config.data_dir.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
            show_progress: true,
        })
    }

    /// Toggle the download progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Make the registry files available locally.
    ///
    /// Without `force`, already extracted files are returned untouched and an
    /// archive left by an earlier run is unpacked instead of downloaded. A
    /// leftover archive that is not a readable zip is replaced by one download.
    pub async fn extract(&self, force: bool) -> Result<FaaFiles> {
        if !force {
            if let Ok(files) = FaaFiles::locate(&self.data_dir) {
                info!(dir = %self.data_dir.display(), "Using pre-extracted FAA files");
                return Ok(files);
            }
        }

        std::fs::create_dir_all(&self.data_dir)?;
        let archive = self.data_dir.join(ARCHIVE_NAME);

        let fresh = force || !archive.exists();
        if fresh {
            self.download_with_retry(&archive).await?;
        } else {
            info!(path = %archive.display(), "Reusing downloaded archive");
        }

        let extracted = match extract_archive(&archive, &self.data_dir) {
            Err(EtlError::Zip(e)) if !fresh => {
                warn!(path = %archive.display(), error = %e, "Cached archive is unreadable, downloading again");
                std::fs::remove_file(&archive)?;
                self.download_with_retry(&archive).await?;
                extract_archive(&archive, &self.data_dir)?
            },
            result => result?,
        };
        info!(files = extracted.len(), dir = %self.data_dir.display(), "Extracted archive");

        FaaFiles::locate(&self.data_dir)
    }

    async fn download_with_retry(&self, dest: &Path) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.download(dest).await {
                Ok(bytes) => {
                    info!(url = %self.url, bytes, attempt, "Downloaded FAA archive");
                    return Ok(());
                },
                Err(e) => {
                    if dest.exists() {
                        if let Err(remove_err) = std::fs::remove_file(dest) {
                            warn!(path = %dest.display(), error = %remove_err, "Failed to remove partial download");
                        }
                    }

                    if attempt >= self.max_retries {
                        return Err(EtlError::source_unavailable(attempt, e.to_string()));
                    }

                    let delay = self.retry_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "Download failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }
    }

    /// Stream the archive to `dest`, returning the byte count
    async fn download(&self, dest: &Path) -> Result<u64> {
        debug!(url = %self.url, "Requesting FAA archive");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let total_size = response.content_length().unwrap_or(0);

        let pb = if self.show_progress {
            download_progress(total_size)?
        } else {
            ProgressBar::hidden()
        };

        let mut file = File::create(dest)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }
        file.flush()?;

        pb.finish_with_message(format!("Downloaded {}", ARCHIVE_NAME));
        Ok(downloaded)
    }
}

fn download_progress(total_size: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map_err(anyhow::Error::from)?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", ARCHIVE_NAME));
    Ok(pb)
}

/// Unpack the `.txt` members of `archive` flat into `dir`.
///
/// Directory components inside the archive are dropped.
pub fn extract_archive(archive: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let file_name = match Path::new(entry.name()).file_name() {
            Some(name) => name.to_owned(),
            None => continue,
        };
        let is_text = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if !is_text {
            debug!(entry = entry.name(), "Skipping non-text archive member");
            continue;
        }

        let out_path = dir.join(&file_name);
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted.push(out_path);
    }

    Ok(extracted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::FileOptions;

    fn archive_bytes(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn registry_archive() -> Vec<u8> {
        archive_bytes(&[
            ("MASTER.txt", "N-NUMBER,\n"),
            ("ACFTREF.txt", "CODE,MFR,\n"),
            ("nested/ENGINE.txt", "CODE,MFR,\n"),
            ("ardata.pdf", "%PDF"),
        ])
    }

    fn config(dir: &Path, url: String) -> EtlConfig {
        EtlConfig {
            data_dir: dir.to_path_buf(),
            faa_url: url,
            max_retries: 2,
            retry_delay_secs: 0,
            connect_timeout_secs: 1,
            read_timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_locate_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("master.txt"), "").unwrap();
        std::fs::write(dir.path().join("ACFTREF.TXT"), "").unwrap();
        std::fs::write(dir.path().join("ENGINE.txt"), "").unwrap();

        let files = FaaFiles::locate(dir.path()).unwrap();
        assert!(files.master.ends_with("master.txt"));
        assert!(files.aircraft_ref.ends_with("ACFTREF.TXT"));
    }

    #[test]
    fn test_locate_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("MASTER.txt"), "").unwrap();
        let err = FaaFiles::locate(dir.path()).unwrap_err();
        match err {
            EtlError::SourceFileMissing(path) => assert!(path.ends_with(AIRCRAFT_REF_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_archive_keeps_text_members_flat() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join(ARCHIVE_NAME);
        std::fs::write(&archive, registry_archive()).unwrap();

        let extracted = extract_archive(&archive, dir.path()).unwrap();
        assert_eq!(extracted.len(), 3);
        assert!(dir.path().join("ENGINE.txt").exists());
        assert!(!dir.path().join("ardata.pdf").exists());
    }

    #[tokio::test]
    async fn test_pre_extracted_files_skip_network() {
        let dir = TempDir::new().unwrap();
        for name in [MASTER_FILE, AIRCRAFT_REF_FILE, ENGINE_FILE] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let extractor = FaaExtractor::new(&config(dir.path(), "http://127.0.0.1:9/none.zip".into()))
            .unwrap()
            .with_progress(false);
        let files = extractor.extract(false).await.unwrap();
        assert_eq!(files.master, dir.path().join(MASTER_FILE));
    }

    #[tokio::test]
    async fn test_download_and_extract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ReleasableAircraft.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(registry_archive()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/ReleasableAircraft.zip", server.uri());
        let extractor = FaaExtractor::new(&config(dir.path(), url)).unwrap().with_progress(false);

        let files = extractor.extract(false).await.unwrap();
        assert_eq!(std::fs::read_to_string(files.master).unwrap(), "N-NUMBER,\n");
        assert!(dir.path().join(ARCHIVE_NAME).exists());
    }

    #[tokio::test]
    async fn test_download_retries_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/ReleasableAircraft.zip", server.uri());
        let extractor = FaaExtractor::new(&config(dir.path(), url)).unwrap().with_progress(false);

        let err = extractor.extract(false).await.unwrap_err();
        assert!(matches!(err, EtlError::SourceUnavailable { attempts: 2, .. }));
        assert!(!dir.path().join(ARCHIVE_NAME).exists());
    }

    #[tokio::test]
    async fn test_corrupt_cached_archive_is_downloaded_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ReleasableAircraft.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(registry_archive()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ARCHIVE_NAME), b"truncated download").unwrap();

        let url = format!("{}/ReleasableAircraft.zip", server.uri());
        let extractor = FaaExtractor::new(&config(dir.path(), url)).unwrap().with_progress(false);

        let files = extractor.extract(false).await.unwrap();
        assert_eq!(std::fs::read_to_string(files.master).unwrap(), "N-NUMBER,\n");
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(registry_archive()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/ReleasableAircraft.zip", server.uri());
        let extractor = FaaExtractor::new(&config(dir.path(), url)).unwrap().with_progress(false);

        assert!(extractor.extract(true).await.is_ok());
    }
}
