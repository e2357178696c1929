//! Attachment archive builder
//!
//! Packs the media files of one or more instances into a zip archive written
//! to an anonymous temporary file. Entries are stored uncompressed (media is
//! already compressed) with zip64 extensions enabled.

use fieldsight_common::db::Attachment;
use fieldsight_common::report::{report_exception, Reporter};
use fieldsight_common::storage::Storage;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors that abort the whole archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Per-attachment failure, reported and skipped
#[derive(Debug, Error)]
enum EntryError {
    #[error("failed to read from storage")]
    Read(#[source] std::io::Error),

    #[error("failed to write archive entry")]
    Write(#[source] std::io::Error),

    #[error("failed to start archive entry")]
    Zip(#[source] zip::result::ZipError),
}

/// Build a zip of every attachment present in storage
///
/// Missing files are skipped silently. Read or write failures on a single
/// attachment are sent to `reporter` and the archive continues with the rest.
/// The returned file is positioned at offset 0 and is removed from disk once
/// dropped.
pub fn build_zip(
    attachments: &[Attachment],
    storage: &dyn Storage,
    reporter: &dyn Reporter,
) -> Result<File, ArchiveError> {
    let mut file = write_archive(tempfile::tempfile()?, attachments, storage, reporter)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

fn write_archive<W: Write + Seek>(
    writer: W,
    attachments: &[Attachment],
    storage: &dyn Storage,
    reporter: &dyn Reporter,
) -> Result<W, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(true);

    let mut zip = ZipWriter::new(writer);
    let mut written = 0usize;

    for attachment in attachments {
        let name = attachment.media_file.as_str();
        if !storage.exists(name) {
            debug!(attachment_id = attachment.id, file = %name, "Attachment missing from storage");
            continue;
        }

        match add_entry(&mut zip, storage, name, options) {
            Ok(()) => written += 1,
            Err(e) => {
                let subject = format!("Error adding file \"{}\" to archive.", name);
                report_exception(reporter, &subject, &e);
            }
        }
    }

    let writer = zip.finish()?;

    info!(
        requested = attachments.len(),
        written, "Attachment archive built"
    );

    Ok(writer)
}

fn add_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    storage: &dyn Storage,
    name: &str,
    options: SimpleFileOptions,
) -> Result<(), EntryError> {
    let content = storage.read(name).map_err(EntryError::Read)?;
    zip.start_file(name, options).map_err(EntryError::Zip)?;
    if let Err(e) = zip.write_all(&content) {
        // Drop the partial entry so the next one starts on a clean header
        if let Err(abort) = zip.abort_file() {
            warn!(file = %name, error = %abort, "Failed to discard partial archive entry");
        }
        return Err(EntryError::Write(e));
    }
    Ok(())
}
