use std::path::{Path, PathBuf};

/// A notification email prior to serialization.
///
/// Built fresh per send and never persisted. Inline images are referenced by
/// path; their bytes are read at composition time, not here.
#[derive(Debug)]
pub struct EmailMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,

    /// Plaintext body
    pub body: String,

    /// HTML body; may reference inline images via `cid:` URLs
    pub body_html: String,

    images: Vec<InlineImage>,
}

/// An image to embed in the HTML body.
///
/// The content id maps the image part to its `<img src="cid:...">` reference.
#[derive(Debug)]
pub struct InlineImage {
    pub content_id: String,
    pub path: PathBuf,
}

impl EmailMessage {
    pub fn new(sender: &str, recipient: &str, subject: &str) -> EmailMessage {
        EmailMessage {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: String::new(),
            body_html: String::new(),
            images: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.body_html = html.to_string();
        self
    }

    /// Register an inline image under `content_id`.
    ///
    /// Content ids are unique within a message: registering an id a second
    /// time replaces the earlier path, keeping the original position.
    pub fn inline_image<P: AsRef<Path>>(mut self, content_id: &str, path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        if let Some(existing) = self
            .images
            .iter_mut()
            .find(|i| i.content_id == content_id)
        {
            existing.path = path;
        } else {
            self.images.push(InlineImage {
                content_id: content_id.to_string(),
                path,
            });
        }

        self
    }

    /// Registered images, in insertion order.
    pub fn images(&self) -> &[InlineImage] {
        &self.images
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn images_keep_insertion_order() {
        let mail = EmailMessage::new("a@example.com", "b@example.com", "hi")
            .inline_image("logo", "logo.gif")
            .inline_image("chart", "chart.png");

        let ids: Vec<&str> = mail.images().iter().map(|i| i.content_id.as_str()).collect();
        assert_eq!(ids, vec!["logo", "chart"]);
    }

    #[test]
    fn duplicate_content_id_replaces_path() {
        let mail = EmailMessage::new("a@example.com", "b@example.com", "hi")
            .inline_image("logo", "old.gif")
            .inline_image("chart", "chart.png")
            .inline_image("logo", "new.gif");

        let images = mail.images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].content_id, "logo");
        assert_eq!(images[0].path, Path::new("new.gif"));
    }
}
