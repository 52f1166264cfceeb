//! Machine-readable check results
//!
//! One [`JsonReport`] per file. Positions are byte offsets; lines and
//! columns are 1-based.

use crate::FileReport;
use jscriptor_diagnostics::span::LineIndex;
use serde::Serialize;

/// Code used for parser and lexer errors, which carry no checker code
pub const PARSE_ERROR_CODE: &str = "E_PARSE";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonReport {
    pub file: String,
    pub errors: Vec<JsonError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonError {
    pub code: String,
    pub message: String,
    pub node_type: String,
    pub position: Option<usize>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl JsonReport {
    pub fn from_report(report: &FileReport) -> Self {
        let index = LineIndex::new(&report.source);
        let locate = |position: Option<usize>| match position {
            Some(offset) => {
                let at = index.line_col(&report.source, offset);
                (Some(at.line), Some(at.column))
            }
            None => (None, None),
        };

        let parse_errors = report.parse_errors.iter().map(|error| {
            let position = Some(error.span().start);
            let (line, column) = locate(position);
            JsonError {
                code: PARSE_ERROR_CODE.to_string(),
                message: error.to_string(),
                node_type: "Program".to_string(),
                position,
                line,
                column,
            }
        });

        let type_errors = report.type_errors().iter().map(|diagnostic| {
            let position = diagnostic.position();
            let (line, column) = locate(position);
            JsonError {
                code: diagnostic.code().to_string(),
                message: diagnostic.message(),
                node_type: diagnostic.node_kind.to_string(),
                position,
                line,
                column,
            }
        });

        Self {
            file: report.file_name(),
            errors: parse_errors.chain(type_errors).collect(),
        }
    }
}
