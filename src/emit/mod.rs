use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use tracing::debug;

use crate::diagnostic::DiagnosticRecord;
use crate::sink::Report;
use crate::span::SourceFile;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EmitStyle {
    /// `<line>.<column>: <message>`, one record per line.
    #[default]
    Plain,
    /// Source snippets with a caret under each position.
    Rich,
}

#[derive(Debug, Clone, Copy)]
pub struct EmitConfig {
    pub style: EmitStyle,
    pub color: ColorChoice,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            style: EmitStyle::Plain,
            color: ColorChoice::Never,
        }
    }
}

impl Report {
    /// Writes the report to `writer` in the configured style. `file` must be
    /// the source the positions were taken from.
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        file: &SourceFile,
        config: &EmitConfig,
    ) -> Result<(), files::Error> {
        debug!(count = self.len(), style = ?config.style, "emitting semantic errors");
        match config.style {
            EmitStyle::Plain => {
                for record in self {
                    writeln!(writer, "{}", record)?;
                }
            }
            EmitStyle::Rich => {
                let term_config = term::Config::default();
                for record in self {
                    let diagnostic = to_codespan(record, file);
                    term::emit(writer, &term_config, file.files(), &diagnostic)?;
                }
            }
        }
        Ok(())
    }

    pub fn emit_to_stderr(
        &self,
        file: &SourceFile,
        config: &EmitConfig,
    ) -> Result<(), files::Error> {
        let stream = StandardStream::stderr(config.color);
        let mut writer = stream.lock();
        self.emit(&mut writer, file, config)
    }
}

fn to_codespan(record: &DiagnosticRecord, file: &SourceFile) -> Diagnostic<()> {
    let diagnostic = Diagnostic::error()
        .with_message(record.message())
        .with_code(record.code());
    match file.char_range(record.position()) {
        Some(range) => diagnostic.with_labels(vec![Label::primary((), range)]),
        None => diagnostic.with_notes(vec![format!("at {}", record.position())]),
    }
}
