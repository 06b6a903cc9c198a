// Plain-text tables and bar charts for the console views

const MAX_CELL_WIDTH: usize = 40;
const BAR_WIDTH: usize = 30;

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut out: String = cell.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Renders at most `max_rows` rows; the remainder is summarised on one line.
pub fn table(headers: &[&str], rows: &[Vec<String>], max_rows: usize) -> String {
    let shown = &rows[..rows.len().min(max_rows)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| row.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |values: Vec<String>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| pad(v, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(cells.len() + 3);
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in cells {
        out.push(line(row));
    }
    if rows.len() > shown.len() {
        out.push(format!("... {} more rows (use /export for the full table)", rows.len() - shown.len()));
    }
    out.join("\n")
}

/// Horizontal bars scaled to the largest value, in the given order.
pub fn bar_chart(items: &[(String, usize)]) -> String {
    let max = items.iter().map(|(_, v)| *v).max().unwrap_or(0);
    let label_width = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    items
        .iter()
        .map(|(label, value)| {
            let len = if max == 0 { 0 } else { (value * BAR_WIDTH).div_ceil(max) };
            format!("{} | {} {}", pad(label, label_width), "█".repeat(len), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-joined list, or a dash when empty.
pub fn list(items: &[String]) -> String {
    if items.is_empty() {
        "—".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let rows = vec![
            vec!["Apples".to_string(), "Farm A".to_string()],
            vec!["Kiwi".to_string(), "B".to_string()],
        ];
        let out = table(&["Product", "Supplier"], &rows, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Product | Supplier");
        assert_eq!(lines[1], "--------+---------");
        assert_eq!(lines[2], "Apples  | Farm A");
        assert_eq!(lines[3], "Kiwi    | B");
    }

    #[test]
    fn table_caps_rows() {
        let rows: Vec<Vec<String>> = (0..5).map(|i| vec![i.to_string()]).collect();
        let out = table(&["n"], &rows, 2);
        assert!(out.ends_with("... 3 more rows (use /export for the full table)"));
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(60);
        let out = table(&["c"], &[vec![long]], 5);
        assert!(out.lines().nth(2).unwrap().ends_with('…'));
        assert_eq!(out.lines().nth(2).unwrap().chars().count(), MAX_CELL_WIDTH);
    }

    #[test]
    fn bars_scale_to_max() {
        let out = bar_chart(&[("Organic".into(), 4), ("Fair Trade".into(), 2)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("Organic    | {} 4", "█".repeat(30)));
        assert_eq!(lines[1], format!("Fair Trade | {} 2", "█".repeat(15)));
    }

    #[test]
    fn empty_list_is_a_dash() {
        assert_eq!(list(&[]), "—");
        assert_eq!(list(&["a".into(), "b".into()]), "a, b");
    }
}
