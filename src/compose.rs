use std::fs;
use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

use crate::email::EmailMessage;
use crate::error::Error;

/// Result of composing a message: the serialized MIME document, plus any
/// inline images that were dropped because their files could not be read.
#[derive(Debug)]
pub struct Composed {
    pub document: Vec<u8>,
    pub skipped: Vec<SkippedImage>,
}

#[derive(Debug)]
pub struct SkippedImage {
    pub content_id: String,
    pub reason: String,
}

/// Serialize `mail` into a `multipart/alternative` MIME document.
///
/// The container holds the plaintext part first and the HTML part second;
/// mail readers render the last alternative they understand, so the richer
/// rendering must come last. Image parts follow in registration order, each
/// tagged with a `Content-ID` of `<id>` so that `cid:id` references in the
/// HTML resolve.
///
/// An unreadable image path is logged and reported via `Composed::skipped`
/// rather than failing the whole message.
pub fn compose(mail: &EmailMessage) -> Result<Composed, Error> {
    let from: Mailbox = mail
        .sender
        .parse()
        .map_err(|e| Error::Address(format!("{}: {}", mail.sender, e)))?;
    let to: Mailbox = mail
        .recipient
        .parse()
        .map_err(|e| Error::Address(format!("{}: {}", mail.recipient, e)))?;

    let mut parts = MultiPart::alternative()
        .singlepart(SinglePart::plain(mail.body.clone()))
        .singlepart(SinglePart::html(mail.body_html.clone()));

    let mut skipped = Vec::new();

    for image in mail.images() {
        let data = match fs::read(&image.path) {
            Ok(data) => data,
            Err(err) => {
                log::warn!(
                    "Skipping inline image {} ({}): {}",
                    image.content_id,
                    image.path.display(),
                    err
                );
                skipped.push(SkippedImage {
                    content_id: image.content_id.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let content_type =
            ContentType::parse(guess_mime(&image.path)).map_err(|e| Error::Compose(e.to_string()))?;

        // Lettre wraps the id in angle brackets for the Content-ID header
        parts = parts.singlepart(Attachment::new_inline(image.content_id.clone()).body(data, content_type));
    }

    // Header values (subject included) get RFC 2047 encoding from lettre, so
    // non-ASCII text survives transport
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(parts)?;

    Ok(Composed {
        document: message.formatted(),
        skipped,
    })
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
