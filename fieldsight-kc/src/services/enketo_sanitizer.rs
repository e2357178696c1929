//! Instance XML clean-up before it is handed to Enketo
//!
//! Stored instances reference attachments by their storage path
//! (`bob/attachments/photo.jpg`) while Enketo expects the bare file name it
//! receives in `instance_attachments[<name>]`.

use roxmltree::Document;

/// Rewrites an instance document before it is sent along with attachments
pub trait InstanceXmlSanitizer: Send + Sync {
    fn clean(&self, attachment_names: &[&str], xml: &str) -> String;
}

/// Replaces leaf text ending in `/<attachment name>` with the bare name
///
/// Documents that do not parse are returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentPathSanitizer;

impl InstanceXmlSanitizer for AttachmentPathSanitizer {
    fn clean(&self, attachment_names: &[&str], xml: &str) -> String {
        let Ok(doc) = Document::parse(xml) else {
            return xml.to_string();
        };

        let mut replacements: Vec<(std::ops::Range<usize>, &str)> = doc
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| {
                let text = n.text()?.trim();
                let name = attachment_names.iter().find(|name| {
                    text.len() > name.len()
                        && text.ends_with(*name)
                        && text[..text.len() - name.len()].ends_with('/')
                })?;
                Some((n.range(), *name))
            })
            .collect();

        if replacements.is_empty() {
            return xml.to_string();
        }

        replacements.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
        let mut cleaned = xml.to_string();
        for (range, name) in replacements {
            cleaned.replace_range(range, &escape_text(name));
        }
        cleaned
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_attachment_paths() {
        let xml = "<data id=\"f\"><a>bob/attachments/a.jpg</a><b>keep/b.jpg</b><c>a.jpg</c></data>";
        let cleaned = AttachmentPathSanitizer.clean(&["a.jpg"], xml);
        assert_eq!(
            cleaned,
            "<data id=\"f\"><a>a.jpg</a><b>keep/b.jpg</b><c>a.jpg</c></data>"
        );
    }

    #[test]
    fn test_multiple_attachments() {
        let xml = "<data id=\"f\"><a>x/one.png</a><g><b>y/z/two.png</b></g></data>";
        let cleaned = AttachmentPathSanitizer.clean(&["one.png", "two.png"], xml);
        assert_eq!(
            cleaned,
            "<data id=\"f\"><a>one.png</a><g><b>two.png</b></g></data>"
        );
    }

    #[test]
    fn test_suffix_must_follow_slash() {
        let xml = "<data id=\"f\"><a>x/photo_a.jpg</a></data>";
        assert_eq!(AttachmentPathSanitizer.clean(&["a.jpg"], xml), xml);
    }

    #[test]
    fn test_unparseable_document_untouched() {
        let xml = "<data><a>x/a.jpg</a>";
        assert_eq!(AttachmentPathSanitizer.clean(&["a.jpg"], xml), xml);
    }
}
