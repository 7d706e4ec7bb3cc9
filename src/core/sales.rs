//! Sales CSV exploration: filter by product and month, preview, export.
//!
//! Expects the columns `Produkt`, `Monat` and `Umsatz`; any other columns are
//! carried through untouched on export.

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

pub const PRODUCT_COLUMN: &str = "Produkt";
pub const MONTH_COLUMN: &str = "Monat";
pub const REVENUE_COLUMN: &str = "Umsatz";

#[derive(Debug, Clone)]
pub struct SalesRow {
    pub product: String,
    pub month: u32,
    pub revenue: f64,
    record: StringRecord,
}

impl SalesRow {
    /// All fields as they appeared in the source file.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.record.iter()
    }
}

#[derive(Debug, Clone)]
pub struct SalesTable {
    headers: StringRecord,
    rows: Vec<SalesRow>,
}

struct Columns {
    product: usize,
    month: usize,
    revenue: usize,
}

pub fn load_sales(path: &Path) -> Result<SalesTable> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("open sales csv {}", path.display()))?;
    read_sales(reader).with_context(|| format!("read sales csv {}", path.display()))
}

pub fn read_sales<R: io::Read>(mut reader: csv::Reader<R>) -> Result<SalesTable> {
    let headers = reader.headers().context("read header row")?.clone();
    let columns = Columns {
        product: column_index(&headers, PRODUCT_COLUMN)?,
        month: column_index(&headers, MONTH_COLUMN)?,
        revenue: column_index(&headers, REVENUE_COLUMN)?,
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record = record.with_context(|| format!("line {}", line))?;
        let month: u32 = field(&record, columns.month)
            .parse()
            .with_context(|| format!("line {}: invalid {}", line, MONTH_COLUMN))?;
        let revenue: f64 = field(&record, columns.revenue)
            .parse()
            .with_context(|| format!("line {}: invalid {}", line, REVENUE_COLUMN))?;
        rows.push(SalesRow {
            product: field(&record, columns.product).to_string(),
            month,
            revenue,
            record,
        });
    }

    Ok(SalesTable { headers, rows })
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    match headers.iter().position(|h| h.trim() == name) {
        Some(idx) => Ok(idx),
        None => bail!("missing column '{}'", name),
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

impl SalesTable {
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn rows(&self) -> &[SalesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct products in first-seen order.
    pub fn products(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.product.as_str()) {
                seen.push(&row.product);
            }
        }
        seen
    }

    /// Rows for `product` up to and including `month`.
    pub fn filter(&self, product: &str, month: u32) -> Result<SalesTable> {
        if !(1..=12).contains(&month) {
            bail!("month must be between 1 and 12, got {}", month);
        }
        let rows = self
            .rows
            .iter()
            .filter(|r| r.product == product && r.month <= month)
            .cloned()
            .collect();
        Ok(SalesTable {
            headers: self.headers.clone(),
            rows,
        })
    }

    pub fn preview(&self, n: usize) -> &[SalesRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Revenue summed per month, ascending.
    pub fn monthly_totals(&self) -> Vec<(u32, f64)> {
        let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(row.month).or_insert(0.0) += row.revenue;
        }
        totals.into_iter().collect()
    }

    pub fn write_csv<W: io::Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.headers).context("write header row")?;
        for row in &self.rows {
            writer.write_record(&row.record).context("write row")?;
        }
        writer.flush().context("flush csv")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Produkt,Monat,Umsatz,Region\n\
                          Tee,1,100.5,Nord\n\
                          Kaffee,1,200,Sued\n\
                          Tee,2,150,Nord\n\
                          Tee,5,80,West\n\
                          Kaffee,3,50,Nord\n";

    fn sample() -> SalesTable {
        read_sales(csv::Reader::from_reader(SAMPLE.as_bytes())).unwrap()
    }

    #[test]
    fn test_products_first_seen_order() {
        assert_eq!(sample().products(), ["Tee", "Kaffee"]);
    }

    #[test]
    fn test_filter_by_product_and_month() {
        let filtered = sample().filter("Tee", 2).unwrap();
        let months: Vec<u32> = filtered.rows().iter().map(|r| r.month).collect();
        assert_eq!(months, [1, 2]);
        assert!(filtered.rows().iter().all(|r| r.product == "Tee"));
    }

    #[test]
    fn test_filter_rejects_bad_month() {
        assert!(sample().filter("Tee", 0).is_err());
        assert!(sample().filter("Tee", 13).is_err());
    }

    #[test]
    fn test_unknown_product_gives_empty_table() {
        assert!(sample().filter("Kakao", 12).unwrap().is_empty());
    }

    #[test]
    fn test_monthly_totals() {
        let totals = sample().filter("Tee", 12).unwrap().monthly_totals();
        assert_eq!(totals, [(1, 100.5), (2, 150.0), (5, 80.0)]);
    }

    #[test]
    fn test_preview_caps_at_len() {
        let table = sample();
        assert_eq!(table.preview(3).len(), 3);
        assert_eq!(table.preview(50).len(), 5);
    }

    #[test]
    fn test_export_keeps_extra_columns() {
        let filtered = sample().filter("Kaffee", 12).unwrap();
        let mut out = Vec::new();
        filtered.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Produkt,Monat,Umsatz,Region\nKaffee,1,200,Sued\nKaffee,3,50,Nord\n"
        );
    }

    #[test]
    fn test_missing_column() {
        let err = read_sales(csv::Reader::from_reader("Produkt,Monat\nTee,1\n".as_bytes()))
            .unwrap_err();
        assert!(err.to_string().contains("Umsatz"));
    }

    #[test]
    fn test_bad_number_names_line() {
        let data = "Produkt,Monat,Umsatz\nTee,1,100\nTee,zwei,3\n";
        let err = read_sales(csv::Reader::from_reader(data.as_bytes())).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }
}
