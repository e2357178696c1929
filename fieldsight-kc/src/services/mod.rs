//! Service layer: outbound integrations and media processing

pub mod attachment_archiver;
pub mod enketo_client;
pub mod enketo_sanitizer;
pub mod form_url;
pub mod media;

pub use attachment_archiver::{build_zip, ArchiveError};
pub use enketo_client::{EnketoClient, EnketoError, EnketoMode, EnketoRequest, EnketoUrl};
pub use enketo_sanitizer::{AttachmentPathSanitizer, InstanceXmlSanitizer};
pub use form_url::{client_ip, form_url, request_host};
pub use media::image_urls;
