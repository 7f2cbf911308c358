//! Plain-text presenter for one-shot commands.

use std::io::Write;

use devarch_core::{ImageHandle, Presenter};
use tracing::warn;

/// Writes markdown answers to any writer, usually stdout.
///
/// Write failures (a closed pipe, say) are logged and otherwise ignored.
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write + Send> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write output");
        }
    }
}

impl<W: Write + Send> Presenter for TextPresenter<W> {
    fn warn(&mut self, message: &str) {
        self.emit(&format!("⚠️ {message}"));
    }

    fn answer(&mut self, heading: &str, text: &str) {
        self.emit(&format!("{heading}\n\n{text}\n"));
    }

    fn diagram_section(&mut self, heading: &str) {
        self.emit(&format!("{heading}\n"));
    }

    fn diagram(&mut self, image: &ImageHandle, caption: &str) {
        self.emit(&format!("![{caption}]({})\n", image.path().display()));
    }
}
