use strum::{AsRefStr, EnumCount, EnumIter, IntoStaticStr};

use crate::span::{HasSourcePosition, Position};

/// Every semantic error the symbol and type checking passes can report,
/// together with the data its message needs.
///
/// `as_ref()` yields the error code, e.g. `undeclaredIdent`.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr, IntoStaticStr, EnumIter, EnumCount)]
#[strum(serialize_all = "camelCase")]
pub enum ErrorKind {
    DeclaredIdent { ident: String },
    UndeclaredIdent { ident: String },
    IncompatibleAssignment,
    NonReferenceableLeftExpr,
    IncompatibleOperator { op: String },
    NonArrayInArrayAccess,
    NonIntegerIndexInArrayAccess,
    BooleanRequired,
    IsNotCallable { ident: String },
    /// Functions may be called as procedures, so this is never reported by
    /// the checker. Kept for completeness of the taxonomy.
    IsNotProcedure { ident: String },
    IsNotFunction { ident: String },
    NumberOfParameters { callee: String },
    /// `index` counts arguments from 1.
    IncompatibleParameter { index: usize, callee: String },
    /// `index` counts arguments from 1.
    ReferenceableParameter { index: usize, callee: String },
    IncompatibleReturn,
    ReadWriteRequireBasic,
    NonReferenceableExpression,
    NoMainProperlyDeclared,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorKind::*;
        match self {
            DeclaredIdent { ident } => write!(f, "identifier `{}` already declared", ident),
            UndeclaredIdent { ident } => write!(f, "identifier `{}` is undeclared", ident),
            IncompatibleAssignment => f.write_str("assignment with incompatible types"),
            NonReferenceableLeftExpr => {
                f.write_str("left expression of assignment is not referenceable")
            }
            IncompatibleOperator { op } => write!(f, "operator `{}` with incompatible types", op),
            NonArrayInArrayAccess => f.write_str("array access to a non array operand"),
            NonIntegerIndexInArrayAccess => f.write_str("array access with non integer index"),
            BooleanRequired => f.write_str("boolean condition required"),
            IsNotCallable { ident } => write!(f, "identifier `{}` is not callable", ident),
            IsNotProcedure { ident } => write!(f, "identifier `{}` is not a procedure", ident),
            IsNotFunction { ident } => write!(f, "identifier `{}` is not a function", ident),
            NumberOfParameters { callee } => write!(
                f,
                "the number of parameters in the call to `{}` does not match",
                callee
            ),
            IncompatibleParameter { index, callee } => write!(
                f,
                "parameter #{} with incompatible types in call to `{}`",
                index, callee
            ),
            ReferenceableParameter { index, callee } => write!(
                f,
                "parameter #{} is expected to be referenceable in call to `{}`",
                index, callee
            ),
            IncompatibleReturn => f.write_str("return with incompatible type"),
            ReadWriteRequireBasic => f.write_str("basic type required in read/write instruction"),
            NonReferenceableExpression => f.write_str("referenceable expression required"),
            NoMainProperlyDeclared => f.write_str("there is no `main` function properly declared"),
        }
    }
}

/// One collected semantic error: where it is and what it says.
///
/// The message is rendered when the record is built and never changes.
#[derive(Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    position: Position,
    code: &'static str,
    message: String,
}

impl DiagnosticRecord {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::with_code(Position::new(line, column), "", message)
    }

    pub(crate) fn with_code(
        position: Position,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            position,
            code,
            message: message.into(),
        }
    }

    pub fn from_kind(kind: &ErrorKind, at: &impl HasSourcePosition) -> Self {
        Self::with_code(at.position(), kind.code(), kind.to_string())
    }

    pub fn line(&self) -> usize {
        self.position.line()
    }

    pub fn column(&self) -> usize {
        self.position.column()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Error code of the kind that produced this record; empty for records
    /// built directly from a message.
    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `<line>.<column>: <message>`
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Debug for DiagnosticRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DiagnosticRecord({}, {:?}, {:?})",
            self.position, self.code, self.message
        )
    }
}

impl std::fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}
