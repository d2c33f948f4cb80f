use std::io;

use tracing::{debug, trace};

use crate::diagnostic::{DiagnosticRecord, ErrorKind};
use crate::span::{HasSourcePosition, SyntaxNode};

/// Collects the semantic errors of one compilation unit.
///
/// Records are kept in the order they were reported and are never removed,
/// merged or deduplicated. Output is sorted by `(line, column)` with a stable
/// sort, so errors at the same position come out in the order they were
/// reported.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    records: Vec<DiagnosticRecord>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self { records: vec![] }
    }

    /// Records one error of `kind` at the position of `at`.
    pub fn report(&mut self, kind: ErrorKind, at: &impl HasSourcePosition) {
        let record = DiagnosticRecord::from_kind(&kind, at);
        trace!(
            code = record.code(),
            line = record.line(),
            column = record.column(),
            "semantic error recorded"
        );
        self.records.push(record);
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Records in the order they were reported.
    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    pub fn sorted(&self) -> Vec<&DiagnosticRecord> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by_key(|record| record.position());
        records
    }

    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        for record in self.sorted() {
            writeln!(out, "{}", record)?;
        }
        Ok(())
    }

    /// Writes every record to standard error, sorted by position.
    pub fn print(&self) {
        debug!(count = self.count(), "printing semantic errors");
        // Nowhere left to report a failing stderr.
        let _ = self.write_to(&mut io::stderr().lock());
    }

    /// Freezes the collected errors into a sorted [`Report`].
    #[tracing::instrument(skip(self), fields(count = self.records.len()))]
    pub fn finish(self) -> Report {
        let mut records = self.records;
        records.sort_by_key(|record| record.position());
        debug!("semantic analysis finished");
        Report { records }
    }

    /// `ident` is the identifier token in the declaration.
    pub fn declared_ident(&mut self, ident: &impl SyntaxNode) {
        let kind = ErrorKind::DeclaredIdent {
            ident: ident.text().to_owned(),
        };
        self.report(kind, ident);
    }

    /// `ident` is the identifier token in the expression.
    pub fn undeclared_ident(&mut self, ident: &impl SyntaxNode) {
        let kind = ErrorKind::UndeclaredIdent {
            ident: ident.text().to_owned(),
        };
        self.report(kind, ident);
    }

    /// `assign` is the assignment operator token.
    pub fn incompatible_assignment(&mut self, assign: &impl HasSourcePosition) {
        self.report(ErrorKind::IncompatibleAssignment, assign);
    }

    pub fn non_referenceable_left_expr(&mut self, left_expr: &impl HasSourcePosition) {
        self.report(ErrorKind::NonReferenceableLeftExpr, left_expr);
    }

    pub fn incompatible_operator(&mut self, op: &impl SyntaxNode) {
        let kind = ErrorKind::IncompatibleOperator {
            op: op.text().to_owned(),
        };
        self.report(kind, op);
    }

    pub fn non_array_in_array_access(&mut self, access: &impl HasSourcePosition) {
        self.report(ErrorKind::NonArrayInArrayAccess, access);
    }

    pub fn non_integer_index_in_array_access(&mut self, index: &impl HasSourcePosition) {
        self.report(ErrorKind::NonIntegerIndexInArrayAccess, index);
    }

    pub fn boolean_required(&mut self, condition: &impl HasSourcePosition) {
        self.report(ErrorKind::BooleanRequired, condition);
    }

    pub fn is_not_callable(&mut self, ident: &impl SyntaxNode) {
        let kind = ErrorKind::IsNotCallable {
            ident: ident.text().to_owned(),
        };
        self.report(kind, ident);
    }

    pub fn is_not_procedure(&mut self, ident: &impl SyntaxNode) {
        let kind = ErrorKind::IsNotProcedure {
            ident: ident.text().to_owned(),
        };
        self.report(kind, ident);
    }

    pub fn is_not_function(&mut self, ident: &impl SyntaxNode) {
        let kind = ErrorKind::IsNotFunction {
            ident: ident.text().to_owned(),
        };
        self.report(kind, ident);
    }

    /// `callee` is the function identifier of the call.
    pub fn number_of_parameters(&mut self, callee: &impl SyntaxNode) {
        let kind = ErrorKind::NumberOfParameters {
            callee: callee.text().to_owned(),
        };
        self.report(kind, callee);
    }

    /// Reported at `arg`, the `index`-th actual parameter (from 1) of `call`.
    pub fn incompatible_parameter(
        &mut self,
        arg: &impl HasSourcePosition,
        index: usize,
        call: &impl SyntaxNode,
    ) {
        let kind = ErrorKind::IncompatibleParameter {
            index,
            callee: call.text().to_owned(),
        };
        self.report(kind, arg);
    }

    /// Reported at `arg`, the `index`-th actual parameter (from 1) of `call`.
    pub fn referenceable_parameter(
        &mut self,
        arg: &impl HasSourcePosition,
        index: usize,
        call: &impl SyntaxNode,
    ) {
        let kind = ErrorKind::ReferenceableParameter {
            index,
            callee: call.text().to_owned(),
        };
        self.report(kind, arg);
    }

    /// `ret` is the `return` keyword token.
    pub fn incompatible_return(&mut self, ret: &impl HasSourcePosition) {
        self.report(ErrorKind::IncompatibleReturn, ret);
    }

    pub fn read_write_require_basic(&mut self, stmt: &impl HasSourcePosition) {
        self.report(ErrorKind::ReadWriteRequireBasic, stmt);
    }

    pub fn non_referenceable_expression(&mut self, stmt: &impl HasSourcePosition) {
        self.report(ErrorKind::NonReferenceableExpression, stmt);
    }

    /// `program` is the root node.
    pub fn no_main_properly_declared(&mut self, program: &impl HasSourcePosition) {
        self.report(ErrorKind::NoMainProperlyDeclared, program);
    }
}

/// The sorted, no longer growing result of semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    records: Vec<DiagnosticRecord>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticRecord> {
        self.records.iter()
    }

    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        for record in &self.records {
            writeln!(out, "{}", record)?;
        }
        Ok(())
    }

    pub fn print(&self) {
        debug!(count = self.len(), "printing semantic errors");
        let _ = self.write_to(&mut io::stderr().lock());
    }

    /// `Err` when at least one error was reported.
    pub fn into_result(self) -> Result<(), SemanticErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SemanticErrors { report: self })
        }
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a DiagnosticRecord;
    type IntoIter = std::slice::Iter<'a, DiagnosticRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Semantic analysis found errors; code generation must not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticErrors {
    pub report: Report,
}

impl std::fmt::Display for SemanticErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.report.len() {
            1 => f.write_str("1 semantic error found"),
            n => write!(f, "{} semantic errors found", n),
        }
    }
}

impl std::error::Error for SemanticErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, Token};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn tok(text: &str, line: usize, column: usize) -> Token {
        Token::new(text, Position::new(line, column))
    }

    fn output(sink: &DiagnosticSink) -> String {
        let mut out = Vec::new();
        sink.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_sink_prints_nothing() {
        let sink = DiagnosticSink::new();
        assert_eq!(sink.count(), 0);
        assert_eq!(output(&sink), "");
        assert!(sink.finish().into_result().is_ok());
    }

    #[test]
    fn undeclared_ident_renders_at_its_position() {
        let mut sink = DiagnosticSink::new();
        sink.undeclared_ident(&tok("x", 2, 5));
        assert_eq!(sink.count(), 1);
        assert_eq!(output(&sink), "2.5: identifier `x` is undeclared\n");
    }

    #[test]
    fn output_is_sorted_by_line_then_column() {
        let mut sink = DiagnosticSink::new();
        sink.incompatible_operator(&tok("+", 10, 3));
        sink.undeclared_ident(&tok("y", 4, 1));
        sink.boolean_required(&Position::new(4, 12));
        sink.incompatible_return(&tok("return", 1, 20));
        assert_eq!(
            output(&sink),
            "1.20: return with incompatible type\n\
             4.1: identifier `y` is undeclared\n\
             4.12: boolean condition required\n\
             10.3: operator `+` with incompatible types\n"
        );
    }

    #[test]
    fn call_errors_on_one_line_follow_column_order() {
        let mut sink = DiagnosticSink::new();
        let call = tok("f", 7, 2);
        sink.incompatible_parameter(&Position::new(7, 10), 2, &call);
        sink.number_of_parameters(&call);
        assert_eq!(
            output(&sink),
            "7.2: the number of parameters in the call to `f` does not match\n\
             7.10: parameter #2 with incompatible types in call to `f`\n"
        );
    }

    #[test]
    fn equal_positions_keep_report_order() {
        let mut sink = DiagnosticSink::new();
        let at = tok("a", 3, 3);
        sink.non_referenceable_left_expr(&at);
        sink.incompatible_assignment(&at);
        sink.declared_ident(&at);
        sink.non_referenceable_left_expr(&at);
        let codes: Vec<_> = sink.sorted().iter().map(|r| r.code()).collect();
        assert_eq!(
            codes,
            vec![
                "nonReferenceableLeftExpr",
                "incompatibleAssignment",
                "declaredIdent",
                "nonReferenceableLeftExpr",
            ]
        );
        let report = sink.finish();
        let frozen: Vec<_> = report.iter().map(|r| r.code()).collect();
        assert_eq!(frozen, codes);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut sink = DiagnosticSink::new();
        let ident = tok("n", 5, 9);
        sink.undeclared_ident(&ident);
        sink.undeclared_ident(&ident);
        assert_eq!(sink.count(), 2);
        assert_eq!(
            output(&sink),
            "5.9: identifier `n` is undeclared\n5.9: identifier `n` is undeclared\n"
        );
    }

    #[test]
    fn printing_does_not_consume_or_reorder() {
        let mut sink = DiagnosticSink::new();
        sink.non_array_in_array_access(&Position::new(9, 1));
        sink.non_integer_index_in_array_access(&Position::new(2, 4));
        let first = output(&sink);
        sink.print();
        assert_eq!(output(&sink), first);
        assert_eq!(sink.count(), 2);
        let reported: Vec<_> = sink.records().iter().map(|r| r.line()).collect();
        assert_eq!(reported, vec![9, 2]);
    }

    #[test]
    fn every_typed_operation_appends_exactly_one_record() {
        let mut sink = DiagnosticSink::new();
        let ident = tok("g", 1, 1);
        let call = tok("g", 1, 1);
        let at = Position::new(1, 1);
        sink.declared_ident(&ident);
        sink.undeclared_ident(&ident);
        sink.incompatible_assignment(&at);
        sink.non_referenceable_left_expr(&at);
        sink.incompatible_operator(&tok("and", 1, 1));
        sink.non_array_in_array_access(&at);
        sink.non_integer_index_in_array_access(&at);
        sink.boolean_required(&at);
        sink.is_not_callable(&ident);
        sink.is_not_procedure(&ident);
        sink.is_not_function(&ident);
        sink.number_of_parameters(&call);
        sink.incompatible_parameter(&at, 1, &call);
        sink.referenceable_parameter(&at, 3, &call);
        sink.incompatible_return(&at);
        sink.read_write_require_basic(&at);
        sink.non_referenceable_expression(&at);
        sink.no_main_properly_declared(&at);
        assert_eq!(sink.count(), 18);

        let codes: Vec<_> = sink.records().iter().map(|r| r.code()).collect();
        assert_eq!(
            codes,
            vec![
                "declaredIdent",
                "undeclaredIdent",
                "incompatibleAssignment",
                "nonReferenceableLeftExpr",
                "incompatibleOperator",
                "nonArrayInArrayAccess",
                "nonIntegerIndexInArrayAccess",
                "booleanRequired",
                "isNotCallable",
                "isNotProcedure",
                "isNotFunction",
                "numberOfParameters",
                "incompatibleParameter",
                "referenceableParameter",
                "incompatibleReturn",
                "readWriteRequireBasic",
                "nonReferenceableExpression",
                "noMainProperlyDeclared",
            ]
        );
    }

    #[test]
    fn report_into_result_fails_when_errors_were_found() {
        let mut sink = DiagnosticSink::new();
        sink.no_main_properly_declared(&Position::new(1, 1));
        sink.read_write_require_basic(&Position::new(3, 3));
        let err = sink.finish().into_result().unwrap_err();
        assert_eq!(err.to_string(), "2 semantic errors found");
        assert_eq!(err.report.len(), 2);

        let mut sink = DiagnosticSink::new();
        sink.non_referenceable_expression(&Position::new(6, 7));
        let err = sink.finish().into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 semantic error found");
    }

    #[test]
    fn report_output_matches_sink_output() {
        let mut sink = DiagnosticSink::new();
        sink.is_not_function(&tok("p", 8, 14));
        sink.referenceable_parameter(&Position::new(3, 9), 1, &tok("swap", 3, 3));
        let expected = output(&sink);
        let report = sink.finish();
        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!((&report).into_iter().count(), report.len());
    }

    #[traced_test]
    #[test]
    fn reports_are_traced() {
        let mut sink = DiagnosticSink::new();
        sink.is_not_callable(&tok("v", 2, 2));
        assert!(logs_contain("semantic error recorded"));
        assert!(logs_contain("isNotCallable"));
    }
}
