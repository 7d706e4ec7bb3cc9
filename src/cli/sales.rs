use crate::cli::CliContext;
use crate::core::sales::{self, SalesRow, SalesTable};
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use dialoguer::Select;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SalesArgs {
    /// Sales CSV with Produkt, Monat and Umsatz columns
    pub csv: PathBuf,

    /// Product to show (prompted for when omitted; first product with --non-interactive)
    #[arg(long)]
    pub product: Option<String>,

    /// Include months 1 through this one
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    /// Rows of the raw file to preview
    #[arg(long, default_value_t = 5)]
    pub preview: usize,

    /// Write the filtered rows to this CSV file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &CliContext, args: SalesArgs) -> Result<()> {
    let table = sales::load_sales(&args.csv)?;
    if table.is_empty() {
        println!("{} has no rows", args.csv.display());
        return Ok(());
    }

    if args.preview > 0 {
        println!("{}", rows_table(&table, table.preview(args.preview)));
    }

    let product = match args.product {
        Some(product) => product,
        None => choose_product(ctx, &table)?,
    };

    let filtered = table.filter(&product, args.month)?;
    println!(
        "\n{}: months 1-{}, {} rows",
        product,
        args.month,
        filtered.len()
    );
    if filtered.is_empty() {
        return Ok(());
    }
    println!("{}", rows_table(&filtered, filtered.rows()));
    println!("{}", totals_table(&filtered));

    if let Some(output) = args.output {
        let file = File::create(&output)
            .with_context(|| format!("create {}", output.display()))?;
        filtered.write_csv(BufWriter::new(file))?;
        println!("Wrote {}", output.display());
    }
    Ok(())
}

fn choose_product(ctx: &CliContext, table: &SalesTable) -> Result<String> {
    let products = table.products();
    let Some(first) = products.first() else {
        bail!("no products in file");
    };
    if ctx.non_interactive {
        return Ok(first.to_string());
    }
    let idx = Select::new()
        .with_prompt("Product")
        .items(&products)
        .default(0)
        .interact()
        .context("read product selection")?;
    Ok(products[idx].to_string())
}

fn rows_table(table: &SalesTable, rows: &[SalesRow]) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL);
    out.set_header(
        table
            .headers()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for row in rows {
        out.add_row(row.fields().collect::<Vec<_>>());
    }
    out
}

fn totals_table(table: &SalesTable) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL);
    out.set_header(vec![
        Cell::new(sales::MONTH_COLUMN).add_attribute(Attribute::Bold),
        Cell::new(sales::REVENUE_COLUMN).add_attribute(Attribute::Bold),
    ]);
    for (month, revenue) in table.monthly_totals() {
        out.add_row(vec![month.to_string(), format!("{:.2}", revenue)]);
    }
    out
}
