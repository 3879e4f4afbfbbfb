//! Structural check of formula text before it is written to a cell
//!
//! The writer stores formulas verbatim, so a malformed string would only
//! surface when the workbook is opened. This check is syntactic: balanced
//! parentheses, terminated string literals and quoted sheet names, and
//! cell references inside the worksheet grid.

use super::address::column_letter_to_index;
use crate::error::{FdmError, FdmResult};
use regex::Regex;

const MAX_COLUMN_INDEX: usize = 16_383; // XFD
const MAX_ROW: u64 = 1_048_576;

pub struct FormulaChecker {
    cell_ref: Regex,
    column_ref: Regex,
    dangling_operator: Regex,
    doubled_operator: Regex,
}

impl FormulaChecker {
    pub fn new() -> FdmResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| FdmError::Config(format!("Invalid pattern: {}", e)))
        };

        Ok(Self {
            cell_ref: compile(r"^\$?([A-Z]{1,3})\$?([0-9]+)$")?,
            column_ref: compile(r"^\$?[A-Z]{1,3}$")?,
            dangling_operator: compile(r"[-+*/&^,=<>]\s*(\)|$)")?,
            doubled_operator: compile(r"[*/&^]\s*[*/&^]")?,
        })
    }

    /// Returns the reason a formula is malformed
    pub fn check(&self, formula: &str) -> Result<(), String> {
        let body = formula.strip_prefix('=').unwrap_or(formula).trim();
        if body.is_empty() {
            return Err("empty formula".to_string());
        }

        let skeleton = strip_literals(body)?;

        if self.dangling_operator.is_match(&skeleton) {
            return Err("operator without right operand".to_string());
        }
        if self.doubled_operator.is_match(&skeleton) {
            return Err("consecutive operators".to_string());
        }

        for token in skeleton
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '$' || c == '_' || c == '.'))
            .filter(|t| !t.is_empty())
        {
            self.check_token(token)?;
        }

        Ok(())
    }

    fn check_token(&self, token: &str) -> Result<(), String> {
        if let Some(caps) = self.cell_ref.captures(token) {
            if column_letter_to_index(&caps[1]).map_or(true, |idx| idx > MAX_COLUMN_INDEX) {
                return Err(format!("column out of range in {}", token));
            }
            let row: u64 = caps[2]
                .parse()
                .map_err(|_| format!("row out of range in {}", token))?;
            if row == 0 || row > MAX_ROW {
                return Err(format!("row out of range in {}", token));
            }
            return Ok(());
        }

        if token.contains('$') && !self.column_ref.is_match(token) {
            return Err(format!("malformed reference {}", token));
        }

        Ok(())
    }
}

/// Replace string literals and quoted sheet names with placeholders and
/// verify parenthesis nesting on what remains
fn strip_literals(body: &str) -> Result<String, String> {
    let mut skeleton = String::with_capacity(body.len());
    let mut depth: i32 = 0;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                        }
                        Some('"') => break,
                        Some(_) => {}
                        None => return Err("unterminated string literal".to_string()),
                    }
                }
                skeleton.push_str("\"\"");
            }
            '\'' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            name.push('\'');
                        }
                        Some('\'') => break,
                        Some(ch) => name.push(ch),
                        None => return Err("unterminated sheet name".to_string()),
                    }
                }
                if name.trim().is_empty() {
                    return Err("empty sheet name".to_string());
                }
                if chars.peek() != Some(&'!') {
                    return Err(format!("sheet name '{}' is not followed by '!'", name));
                }
                skeleton.push_str("Sheet");
            }
            '(' => {
                depth += 1;
                skeleton.push(c);
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced parentheses".to_string());
                }
                skeleton.push(c);
            }
            _ => skeleton.push(c),
        }
    }

    if depth != 0 {
        return Err("unbalanced parentheses".to_string());
    }
    Ok(skeleton)
}

/// One-off check; batch callers should keep a [`FormulaChecker`]
pub fn check_formula(formula: &str) -> Result<(), String> {
    FormulaChecker::new()
        .map_err(|e| e.to_string())?
        .check(formula)
}
