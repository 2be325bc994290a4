use gallery::prelude::*;

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers: Vec<String> = T::headers().iter().map(ToString::to_string).collect();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
    let widths = column_widths(&headers, &rows);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&headers, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let width = widths.get(idx).copied().unwrap_or(0);
            format!("{cell:<width$}")
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

impl TableRow for Item {
    fn headers() -> &'static [&'static str] {
        &["id", "type", "title", "date", "tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.type_str().unwrap_or_default().to_string(),
            self.title.clone().unwrap_or_default(),
            self.date().unwrap_or_default().to_string(),
            self.tags.join(", "),
        ]
    }
}

impl TableRow for ClickAction {
    fn headers() -> &'static [&'static str] {
        &["href", "target"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.href(), self.target().to_string()]
    }
}
