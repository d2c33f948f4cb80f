//! Collection of the semantic errors found while checking an Asl program.
//!
//! The symbol and type checking passes report into a [`DiagnosticSink`] and
//! keep going; once they are done the driver looks at the count and prints
//! every error, sorted by source position.

pub mod diagnostic;
pub mod emit;
pub mod sink;
pub mod span;

pub use diagnostic::{DiagnosticRecord, ErrorKind};
pub use emit::{EmitConfig, EmitStyle};
pub use sink::{DiagnosticSink, Report, SemanticErrors};
pub use span::{HasSourcePosition, Position, SourceFile, Span, SyntaxNode, Token};
