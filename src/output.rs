use crate::error::LoadError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

fn ensure_parent(path: &Path) -> Result<(), LoadError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), LoadError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    log::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), LoadError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_markdown(path: impl AsRef<Path>, body: &str) -> Result<(), LoadError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    std::fs::write(path, body)?;
    Ok(())
}

/// Render rows as a markdown table, or `(no rows)` when empty.
pub fn markdown_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", markdown_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Tabled)]
    struct Row {
        #[serde(rename = "Tehsil")]
        #[tabled(rename = "Tehsil")]
        tehsil: String,
        #[serde(rename = "Score")]
        #[tabled(rename = "Score")]
        score: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                tehsil: "Lahore City".to_string(),
                score: "80.00".to_string(),
            },
            Row {
                tehsil: "Shalimar".to_string(),
                score: "41.20".to_string(),
            },
        ]
    }

    #[test]
    fn test_write_csv_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_csv(&path, &rows()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Tehsil,Score"));
        assert_eq!(lines.next(), Some("Lahore City,80.00"));
    }

    #[test]
    fn test_markdown_table_limits_rows() {
        let table = markdown_table(&rows(), 1);
        assert!(table.contains("Lahore City"));
        assert!(!table.contains("Shalimar"));
        assert_eq!(markdown_table::<Row>(&[], 5), "(no rows)");
    }
}
