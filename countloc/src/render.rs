//! Report rendering: console text, CSV, HTML and JSON.
//!
//! Every tabular format walks the same [`LocTable`]; JSON serializes the raw
//! [`CountResult`] so skipped files are part of it too.

use std::fmt::Write as _;
use std::str::FromStr;

use console::Style;
use countloclib::{CountResult, LocTable, TableRow};

/// Longest label shown in the text report before it is truncated.
const MAX_LABEL_WIDTH: usize = 60;

/// Report format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Render a count result in the requested format.
pub fn render(result: &CountResult, format: OutputFormat) -> anyhow::Result<String> {
    let table = LocTable::from_count(result);
    Ok(match format {
        OutputFormat::Text => render_text(&table),
        OutputFormat::Csv => render_csv(&table),
        OutputFormat::Html => render_html(&table),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
    })
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

/// Width of every value column: the widest of header and cells.
fn value_widths(table: &LocTable) -> Vec<usize> {
    table.headers[1..]
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .chain(std::iter::once(&table.footer))
                .filter_map(|row| row.values.get(i))
                .map(|v| v.len())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn text_line(label: &str, cells: &[String], label_width: usize, widths: &[usize]) -> String {
    let mut line = format!(
        "{:<width$}",
        truncate_name(label, label_width),
        width = label_width
    );
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, "  {:>width$}", cell, width = width);
    }
    line
}

/// Aligned console table with a bold header.
pub fn render_text(table: &LocTable) -> String {
    let header_style = Style::new().bold();
    let label_width = table.label_width().min(MAX_LABEL_WIDTH);
    let widths = value_widths(table);

    let header = text_line(&table.headers[0], &table.headers[1..], label_width, &widths);
    let separator = "-".repeat(header.chars().count());

    let mut output = String::new();
    let _ = writeln!(output, "{}", header_style.apply_to(&header));
    let _ = writeln!(output, "{}", separator);
    for row in &table.rows {
        let _ = writeln!(output, "{}", text_line(&row.label, &row.values, label_width, &widths));
    }
    let _ = writeln!(output, "{}", separator);
    let _ = writeln!(
        output,
        "{}",
        text_line(&table.footer.label, &table.footer.values, label_width, &widths)
    );
    output
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(row: &TableRow) -> String {
    let mut line = csv_field(&row.label);
    for value in &row.values {
        line.push(',');
        line.push_str(value);
    }
    line
}

/// Render as CSV, names quoted, total last.
pub fn render_csv(table: &LocTable) -> String {
    let mut output = table.headers.join(",");
    output.push('\n');
    for row in table.rows.iter().chain(std::iter::once(&table.footer)) {
        output.push_str(&csv_row(row));
        output.push('\n');
    }
    output
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn html_row(output: &mut String, cell: &str, row: &TableRow) {
    let _ = write!(output, "<tr><{cell}>{}</{cell}>", escape_html(&row.label));
    for value in &row.values {
        let _ = write!(output, "<{cell}>{}</{cell}>", escape_html(value));
    }
    output.push_str("</tr>\n");
}

/// Render a standalone HTML page holding the table.
pub fn render_html(table: &LocTable) -> String {
    let mut output = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Lines of code</title>\n</head>\n<body>\n<table>\n",
    );

    output.push_str("<thead><tr>");
    for header in &table.headers {
        let _ = write!(output, "<th>{}</th>", escape_html(header));
    }
    output.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        html_row(&mut output, "td", row);
    }
    output.push_str("</tbody>\n<tfoot>\n");
    html_row(&mut output, "th", &table.footer);
    output.push_str("</tfoot>\n</table>\n</body>\n</html>\n");
    output
}
