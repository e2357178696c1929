//! Attachment image URLs

use fieldsight_common::db::Attachment;
use fieldsight_common::storage::{suffixed_path, Storage};

/// One URL per attachment, preferring the resized thumbnail when it exists
pub fn image_urls(attachments: &[Attachment], storage: &dyn Storage, suffix: &str) -> Vec<String> {
    attachments
        .iter()
        .map(|a| image_url(&a.media_file, storage, suffix))
        .collect()
}

fn image_url(media_file: &str, storage: &dyn Storage, suffix: &str) -> String {
    let thumbnail = suffixed_path(media_file, suffix);
    if storage.exists(&thumbnail) {
        storage.url(&thumbnail)
    } else {
        storage.url(media_file)
    }
}
