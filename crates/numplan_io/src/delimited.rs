//! Delimited-text records.
//!
//! Fields are separated by a single-byte delimiter. A field may be wrapped
//! in double quotes, in which case the delimiter is literal inside it and
//! `""` stands for one quote. Records never span lines.

/// Splits one line into fields.
#[must_use]
pub fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            '"' if field.is_empty() => quoted = true,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Quotes `value` if it contains the delimiter, a quote or a line break.
#[must_use]
pub fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains([delimiter, '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Joins fields into one line, escaping as needed.
#[must_use]
pub fn join_record<S: AsRef<str>>(fields: &[S], delimiter: char) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(delimiter);
        }
        line.push_str(&escape_field(field.as_ref(), delimiter));
    }
    line
}
