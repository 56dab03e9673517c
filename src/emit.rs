use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::Local;
use tempfile::NamedTempFile;

use crate::error::Error;

/// Mail transfer command used when none is given.
pub const DEFAULT_SENDMAIL: &str = "sendmail";

/// Writes message files to disk and hands them to the local mail transfer
/// agent.
///
/// All writes go to a temp file in the destination directory first and are
/// renamed into place, so a failed write never leaves a partial file at the
/// destination. Callers running emitters concurrently must use distinct
/// output paths.
pub struct Emitter {
    sendmail: PathBuf,
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::new()
    }
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter {
            sendmail: PathBuf::from(DEFAULT_SENDMAIL),
        }
    }

    /// Use `command` as the mail transfer command instead of `sendmail`.
    pub fn with_sendmail<P: Into<PathBuf>>(command: P) -> Emitter {
        Emitter {
            sendmail: command.into(),
        }
    }

    /// Write `lines` to `path`, one line terminator per line plus a single
    /// trailing blank line: `["a", "b"]` becomes `"a\nb\n\n"`.
    pub fn write_text<P, S>(&self, path: P, lines: &[S]) -> Result<(), Error>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        text.push('\n');

        self.write_raw(path, text.as_bytes())
    }

    /// Write `data` to `path` verbatim, replacing any existing file.
    ///
    /// Used for already-serialized documents such as `compose` output.
    pub fn write_raw<P: AsRef<Path>>(&self, path: P, data: &[u8]) -> Result<(), Error> {
        let path = path.as_ref();
        log::info!("Writing file: {}", path.display());

        // Temp file must live on the same filesystem as the destination for
        // the rename to work
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(data)?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;

        Ok(())
    }

    /// Write a plain sendmail-ready message file: a `subject:` line stamped
    /// with the current time and `origin`, followed by the body lines.
    ///
    /// The subject is uppercased so these notifications stand out in a
    /// crowded inbox.
    pub fn write_message_file<P, S>(
        &self,
        path: P,
        subject: &str,
        origin: &str,
        body: &[S],
    ) -> Result<(), Error>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        log::info!("Creating message file for subject: {}", subject);

        let stamp = Local::now().format("%a %b %e %H:%M:%S %Y");
        let mut lines = Vec::with_capacity(body.len() + 1);
        lines.push(format!(
            "subject: {} {} {}",
            stamp,
            subject.to_uppercase(),
            origin
        ));
        for line in body {
            lines.push(line.as_ref().to_string());
        }

        self.write_text(path, &lines)
    }

    /// Feed the previously written file at `path` to the mail transfer
    /// command, routed to `recipient`.
    ///
    /// The command is invoked with an argument array; no shell is involved.
    /// A non-zero exit surfaces as `Error::Dispatch` and the message file is
    /// left on disk for inspection or retry.
    pub fn dispatch<P: AsRef<Path>>(&self, path: P, recipient: &str) -> Result<(), Error> {
        let path = path.as_ref();
        log::info!("Sending {} to {}", path.display(), recipient);

        let message = File::open(path)?;

        let output = Command::new(&self.sendmail)
            .arg("-v")
            .arg(recipient)
            .stdin(Stdio::from(message))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!(
                "{} failed for {}: {}",
                self.sendmail.display(),
                recipient,
                stderr.trim()
            );
            return Err(Error::Dispatch(format!(
                "{} exited with {} for {}: {}",
                self.sendmail.display(),
                output.status,
                recipient,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn write_text_pins_exact_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        Emitter::new().write_text(&path, &["a", "b"]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n\n");
    }

    #[test]
    fn write_raw_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.eml");
        let data = b"From: a@example.com\r\n\r\nbody \x00\xff bytes".to_vec();

        Emitter::new().write_raw(&path, &data).unwrap();

        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn write_raw_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.eml");

        let emitter = Emitter::new();
        emitter.write_raw(&path, b"first").unwrap();
        emitter.write_raw(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second".to_vec());
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");

        match Emitter::new().write_raw(&path, b"hi") {
            Err(Error::Io(_)) => (),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }

    #[test]
    fn message_file_has_subject_line_and_trailing_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.txt");

        Emitter::new()
            .write_message_file(&path, "load done", "orangeshovel", &["line one", "line two"])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap();

        assert!(first.starts_with("subject: "));
        assert!(first.contains("LOAD DONE"));
        assert!(first.ends_with("orangeshovel"));
        assert!(content.ends_with("line two\n\n"));
    }

    #[test]
    fn dispatch_succeeds_on_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg.eml");
        fs::write(&path, b"message").unwrap();

        Emitter::with_sendmail("true")
            .dispatch(&path, "ops@example.com")
            .unwrap();

        // Message file stays around after dispatch
        assert!(path.exists());
    }

    #[test]
    fn dispatch_reports_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg.eml");
        fs::write(&path, b"message").unwrap();

        match Emitter::with_sendmail("false").dispatch(&path, "ops@example.com") {
            Err(Error::Dispatch(_)) => (),
            other => panic!("expected dispatch error, got {:?}", other),
        }
    }

    #[test]
    fn dispatch_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.eml");

        match Emitter::with_sendmail("true").dispatch(&path, "ops@example.com") {
            Err(Error::Io(_)) => (),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}
