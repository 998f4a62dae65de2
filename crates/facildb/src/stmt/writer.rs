//! SQL text assembly with positional placeholder numbering.

use crate::error::{DbError, DbResult};
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

/// Incrementally assembled statement text.
///
/// Fragments use `?` for a positional parameter. Each `?` becomes the next
/// `$n` placeholder, so placeholders are numbered in the order they appear in
/// the final statement. `??` renders a literal `?`. A `?` inside a quoted
/// string (including `E'..'` escape strings and `$tag$..$tag$` bodies), a
/// quoted identifier or a comment is copied as is.
#[derive(Debug, Default)]
pub struct SqlWriter {
    sql: String,
    placeholders: usize,
}

impl SqlWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL assembled so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of placeholders emitted so far.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Append trusted SQL verbatim.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append the next `$n` placeholder.
    pub fn push_placeholder(&mut self) -> &mut Self {
        self.placeholders += 1;
        let _ = write!(self.sql, "${}", self.placeholders);
        self
    }

    /// Append a caller fragment, numbering its `?` placeholders.
    pub fn push_fragment(&mut self, fragment: &str) -> &mut Self {
        let mut chars = fragment.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '?' => {
                    if chars.peek() == Some(&'?') {
                        chars.next();
                        self.sql.push('?');
                    } else {
                        self.push_placeholder();
                    }
                }
                '\'' if self.opens_escape_string() => {
                    self.sql.push(ch);
                    self.copy_escape_string(&mut chars);
                }
                '\'' | '"' => {
                    self.sql.push(ch);
                    self.copy_through(&mut chars, ch);
                }
                '$' if !self.sql.chars().next_back().is_some_and(is_ident_char) => {
                    match dollar_tag(chars.clone()) {
                        Some(tag) => self.copy_dollar_quoted(&mut chars, &tag),
                        None => self.sql.push(ch),
                    }
                }
                '-' if chars.peek() == Some(&'-') => {
                    self.sql.push(ch);
                    self.copy_through(&mut chars, '\n');
                }
                '/' if chars.peek() == Some(&'*') => {
                    self.sql.push(ch);
                    self.sql.push('*');
                    chars.next();
                    self.copy_block_comment(&mut chars);
                }
                _ => self.sql.push(ch),
            }
        }
        self
    }

    /// Consume the writer, returning the SQL and its placeholder count.
    pub fn finish(self) -> (String, usize) {
        (self.sql, self.placeholders)
    }

    // Copy up to and including `end` (or to the end of input).
    fn copy_through(&mut self, chars: &mut Peekable<Chars<'_>>, end: char) {
        for ch in chars.by_ref() {
            self.sql.push(ch);
            if ch == end {
                return;
            }
        }
    }

    // `E'` or `e'` not preceded by an identifier character.
    fn opens_escape_string(&self) -> bool {
        let mut tail = self.sql.chars().rev();
        matches!(tail.next(), Some('E' | 'e')) && !tail.next().is_some_and(is_ident_char)
    }

    // Backslash escapes the next character; `''` stays inside the literal.
    fn copy_escape_string(&mut self, chars: &mut Peekable<Chars<'_>>) {
        while let Some(ch) = chars.next() {
            self.sql.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        self.sql.push(escaped);
                    }
                }
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    self.sql.push('\'');
                }
                '\'' => return,
                _ => {}
            }
        }
    }

    // The leading `$` is already consumed; `chars` starts at the tag.
    fn copy_dollar_quoted(&mut self, chars: &mut Peekable<Chars<'_>>, tag: &str) {
        let delimiter = format!("${}$", tag);
        for _ in 0..=tag.chars().count() {
            chars.next();
        }
        self.sql.push_str(&delimiter);
        let body_start = self.sql.len();
        for ch in chars.by_ref() {
            self.sql.push(ch);
            if ch == '$' && self.sql[body_start..].ends_with(&delimiter) {
                return;
            }
        }
    }

    fn copy_block_comment(&mut self, chars: &mut Peekable<Chars<'_>>) {
        while let Some(ch) = chars.next() {
            self.sql.push(ch);
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                self.sql.push('/');
                return;
            }
        }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Tag of a dollar-quote opener whose leading `$` was just read: `$` gives
/// `""`, `name$` gives `"name"`.
fn dollar_tag(rest: Peekable<Chars<'_>>) -> Option<String> {
    let mut tag = String::new();
    for ch in rest {
        match ch {
            '$' => return Some(tag),
            c if c.is_alphabetic() || c == '_' => tag.push(c),
            c if c.is_ascii_digit() && !tag.is_empty() => tag.push(c),
            _ => return None,
        }
    }
    None
}

/// Split a comma-separated column list into trimmed column names.
///
/// Commas nested in parentheses or quotes do not split.
pub(crate) fn split_columns(list: &str) -> DbResult<Vec<String>> {
    if list.trim().is_empty() {
        return Err(DbError::builder("column list is empty"));
    }

    let mut columns = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in list.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    columns.push(take_column(&mut current, list)?);
                }
                _ => current.push(ch),
            },
        }
    }
    columns.push(take_column(&mut current, list)?);
    Ok(columns)
}

fn take_column(current: &mut String, list: &str) -> DbResult<String> {
    let column = current.trim().to_string();
    current.clear();
    if column.is_empty() {
        return Err(DbError::builder(format!(
            "empty column name in column list '{}'",
            list
        )));
    }
    Ok(column)
}

/// Reject blank names and fragments before they reach the statement text.
pub(crate) fn require(value: &str, what: &str) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::builder(format!("{} is empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(fragment: &str) -> (String, usize) {
        let mut w = SqlWriter::new();
        w.push_fragment(fragment);
        w.finish()
    }

    #[test]
    fn numbers_placeholders_in_order() {
        assert_eq!(
            render("publisher_id=? AND author <> ?"),
            ("publisher_id=$1 AND author <> $2".to_string(), 2)
        );
    }

    #[test]
    fn numbering_continues_across_fragments() {
        let mut w = SqlWriter::new();
        w.push("UPDATE book SET title = ").push_placeholder();
        w.push(" WHERE ").push_fragment("id=?");
        assert_eq!(w.placeholders(), 2);
        assert_eq!(w.sql(), "UPDATE book SET title = $1 WHERE id=$2");
    }

    #[test]
    fn quoted_question_marks_are_not_placeholders() {
        assert_eq!(
            render("isbn = '978-?' AND \"odd?col\" = ?"),
            ("isbn = '978-?' AND \"odd?col\" = $1".to_string(), 1)
        );
    }

    #[test]
    fn doubled_quote_stays_inside_literal() {
        assert_eq!(
            render("title = 'Who''s ?' AND id = ?"),
            ("title = 'Who''s ?' AND id = $1".to_string(), 1)
        );
    }

    #[test]
    fn comments_are_copied_verbatim() {
        assert_eq!(
            render("id = ? -- why?\nAND x = ? /* ? */"),
            ("id = $1 -- why?\nAND x = $2 /* ? */".to_string(), 2)
        );
    }

    #[test]
    fn double_question_mark_is_literal() {
        assert_eq!(
            render("tags ?? 'rust' AND id = ?"),
            ("tags ? 'rust' AND id = $1".to_string(), 1)
        );
    }

    #[test]
    fn unterminated_literal_is_copied() {
        assert_eq!(render("x = 'open ?"), ("x = 'open ?".to_string(), 0));
    }

    #[test]
    fn escape_string_backslash_quote_stays_inside() {
        assert_eq!(
            render(r"title = E'it\'s ?' AND id = ?"),
            (r"title = E'it\'s ?' AND id = $1".to_string(), 1)
        );
        assert_eq!(
            render(r"a = e'x\\' AND b = ? AND c = E'y''?'"),
            (r"a = e'x\\' AND b = $1 AND c = E'y''?'".to_string(), 1)
        );
    }

    #[test]
    fn identifier_ending_in_e_is_not_an_escape_prefix() {
        // `namE` is an identifier, so the quote that follows is an ordinary literal.
        assert_eq!(
            render(r"namE'a\' = ?"),
            (r"namE'a\' = $1".to_string(), 1)
        );
    }

    #[test]
    fn dollar_quoted_bodies_are_copied() {
        let ddl = "create function has_k(doc jsonb) returns bool as $$ select doc ? 'k' $$ language sql";
        assert_eq!(render(ddl), (ddl.to_string(), 0));

        assert_eq!(
            render("$fn$ select ? from t where x = '$fn' $fn$ AND id = ?"),
            ("$fn$ select ? from t where x = '$fn' $fn$ AND id = $1".to_string(), 1)
        );
    }

    #[test]
    fn dollar_without_tag_is_plain_text() {
        assert_eq!(render("price$1 = ? AND x = $1"), ("price$1 = $1 AND x = $1".to_string(), 1));
        assert_eq!(render("a = ? $ b"), ("a = $1 $ b".to_string(), 1));
    }

    #[test]
    fn unterminated_dollar_quote_is_copied() {
        assert_eq!(render("$$ open ?"), ("$$ open ?".to_string(), 0));
    }

    #[test]
    fn split_columns_trims_names() {
        assert_eq!(
            split_columns("id, title ,author,isbn, publisher_id").unwrap(),
            vec!["id", "title", "author", "isbn", "publisher_id"]
        );
    }

    #[test]
    fn split_columns_keeps_nested_commas() {
        assert_eq!(
            split_columns("id, coalesce(a, b), \"x,y\"").unwrap(),
            vec!["id", "coalesce(a, b)", "\"x,y\""]
        );
    }

    #[test]
    fn split_columns_rejects_empty_entries() {
        assert!(split_columns("").unwrap_err().is_builder());
        assert!(split_columns("   ").unwrap_err().is_builder());
        assert!(split_columns("id,,title").unwrap_err().is_builder());
        assert!(split_columns("id, title,").unwrap_err().is_builder());
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("book", "table name").is_ok());
        let err = require("  ", "table name").unwrap_err();
        assert_eq!(err.to_string(), "Builder error: table name is empty");
    }
}
