use crate::{output_path, read_bom, write_bom};
use anyhow::{Context, Result};
use hwtools_acquire::PriceSource;
use hwtools_model::{BomSchema, BomTable, PriceResult, SchemaError, PRICE_COLUMN};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct AugmentOptions {
    /// Pad unpriced rows with empty cells up to the width of the header
    /// (including "Single Price"). Blank lines stay blank.
    pub pad_unpriced: bool,
}

/// What happened to one line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Priced { row: usize, libref: String, price: String },
    /// Empty product identifier; no lookup was made.
    Skipped { row: usize, libref: String },
    /// Page fetched but no quantity-1 price found.
    Unavailable { row: usize, libref: String, product_id: String },
    /// Lookup failed in transport.
    Failed { row: usize, libref: String, product_id: String, error: String },
}

impl RowOutcome {
    pub fn row(&self) -> usize {
        match self {
            RowOutcome::Priced { row, .. }
            | RowOutcome::Skipped { row, .. }
            | RowOutcome::Unavailable { row, .. }
            | RowOutcome::Failed { row, .. } => *row,
        }
    }

    pub fn libref(&self) -> &str {
        match self {
            RowOutcome::Priced { libref, .. }
            | RowOutcome::Skipped { libref, .. }
            | RowOutcome::Unavailable { libref, .. }
            | RowOutcome::Failed { libref, .. } => libref,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentReport {
    pub outcomes: Vec<RowOutcome>,
}

impl AugmentReport {
    pub fn priced(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Priced { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped { .. }))
    }

    pub fn unavailable(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Unavailable { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Append a "Single Price" column to the table, one lookup per line item.
///
/// The schema is resolved before anything is modified; a missing required
/// column is the only error. Per-row problems are logged, recorded in the
/// report, and leave the row without a price.
pub async fn augment<S: PriceSource>(
    table: &mut BomTable,
    source: &S,
    options: &AugmentOptions,
) -> Result<AugmentReport, SchemaError> {
    let schema = BomSchema::resolve(table.header().map(Vec::as_slice))?;
    let mut width = 0;
    if let Some(header) = table.header_mut() {
        header.push(PRICE_COLUMN.to_string());
        width = header.len();
    }

    let mut report = AugmentReport::default();
    for (index, row) in table.line_items_mut() {
        let libref = schema.libref(row).to_string();
        let product_id = schema.product_id(row).to_string();

        let outcome = if product_id.is_empty() {
            tracing::warn!(libref = %libref, row = index, "No product ID, skipping");
            RowOutcome::Skipped { row: index, libref }
        } else {
            match source.fetch_price(&product_id).await {
                Ok(PriceResult::Price(price)) => {
                    tracing::info!(libref = %libref, price = %price, "Priced");
                    row.push(price.clone());
                    RowOutcome::Priced { row: index, libref, price }
                }
                Ok(PriceResult::Unavailable) => {
                    tracing::warn!(
                        libref = %libref,
                        product_id = %product_id,
                        "Unable to extract pricing info"
                    );
                    RowOutcome::Unavailable { row: index, libref, product_id }
                }
                Err(e) => {
                    tracing::warn!(
                        libref = %libref,
                        product_id = %product_id,
                        error = %e,
                        "Failed to download price"
                    );
                    RowOutcome::Failed {
                        row: index,
                        libref,
                        product_id,
                        error: e.to_string(),
                    }
                }
            }
        };

        let priced = matches!(outcome, RowOutcome::Priced { .. });
        if options.pad_unpriced && !priced && !row.is_empty() && row.len() < width {
            row.resize(width, String::new());
        }
        report.outcomes.push(outcome);
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub report: AugmentReport,
}

/// Read the BOM at `input`, price it, and write it next to the input.
///
/// The output is written even if every lookup failed.
pub async fn run<S: PriceSource>(
    input: &Path,
    source: &S,
    options: &AugmentOptions,
) -> Result<RunSummary> {
    let mut table = read_bom(input)?;
    tracing::info!(path = %input.display(), rows = table.len(), "Loaded BOM");

    let report = augment(&mut table, source, options)
        .await
        .with_context(|| format!("BOM {} has an unusable header", input.display()))?;

    let output = output_path(input);
    write_bom(&output, &table)?;
    tracing::info!(
        path = %output.display(),
        priced = report.priced(),
        skipped = report.skipped(),
        unavailable = report.unavailable(),
        failed = report.failed(),
        "Wrote priced BOM"
    );

    Ok(RunSummary { output, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwtools_acquire::{DigikeyPricingTable, FetchError, PriceExtractor};
    use hwtools_model::Row;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// Serves canned markup per product identifier through a real extractor.
    /// Identifiers without a page fail like an unreachable host.
    struct CannedPages {
        pages: HashMap<&'static str, String>,
        extractor: DigikeyPricingTable,
        requests: RefCell<Vec<String>>,
    }

    impl CannedPages {
        fn new(pages: &[(&'static str, String)]) -> Self {
            Self {
                pages: pages.iter().cloned().collect(),
                extractor: DigikeyPricingTable::new(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl PriceSource for CannedPages {
        async fn fetch_price(&self, product_id: &str) -> Result<PriceResult, FetchError> {
            self.requests.borrow_mut().push(product_id.to_string());
            match self.pages.get(product_id) {
                Some(html) => Ok(self.extractor.extract(html)),
                None => Err(FetchError::InvalidUrl {
                    url: format!("http://unreachable/{product_id}"),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    fn pricing_page(price: &str) -> String {
        format!(
            r#"<html><body><table><tr><td class="catalog-pricing">
               <table id="pricing">
                 <tr><td>1</td><td>{price}</td><td>{price}</td></tr>
                 <tr><td>10</td><td>$0.01</td><td>$0.10</td></tr>
               </table>
               </td></tr></table></body></html>"#
        )
    }

    fn rows(rows: &[&[&str]]) -> Vec<Row> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_table() -> BomTable {
        BomTable::new(rows(&[
            &["LibRef", "Value", "Supplier - Digikey"],
            &["Schematic", "rev B", "1"],
            &["Res", "10k", "311-10.0KHRCT-ND"],
            &["Cap", "100n", ""],
            &["Diode", "SS34", "SS34-NOPRICE"],
            &["Inductor", "12u", "UNREACHABLE"],
        ]))
    }

    fn sample_source() -> CannedPages {
        CannedPages::new(&[
            ("311-10.0KHRCT-ND", pricing_page("$0.10")),
            ("SS34-NOPRICE", "<html><body>Obsolete</body></html>".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_augment_appends_prices_and_reports_outcomes() {
        let mut table = sample_table();
        let source = sample_source();

        let report = augment(&mut table, &source, &AugmentOptions::default())
            .await
            .unwrap();

        assert_eq!(
            table.rows(),
            rows(&[
                &["LibRef", "Value", "Supplier - Digikey", "Single Price"],
                &["Schematic", "rev B", "1"],
                &["Res", "10k", "311-10.0KHRCT-ND", "$0.10"],
                &["Cap", "100n", ""],
                &["Diode", "SS34", "SS34-NOPRICE"],
                &["Inductor", "12u", "UNREACHABLE"],
            ])
        );
        assert_eq!(report.priced(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.unavailable(), 1);
        assert_eq!(report.failed(), 1);

        assert_eq!(report.outcomes[1], RowOutcome::Skipped { row: 3, libref: "Cap".into() });
        let labels: Vec<(usize, &str)> =
            report.outcomes.iter().map(|o| (o.row(), o.libref())).collect();
        assert_eq!(labels, vec![(2, "Res"), (3, "Cap"), (4, "Diode"), (5, "Inductor")]);
        assert!(matches!(
            &report.outcomes[3],
            RowOutcome::Failed { libref, product_id, .. }
                if libref == "Inductor" && product_id == "UNREACHABLE"
        ));
    }

    #[tokio::test]
    async fn test_reserved_row_and_empty_ids_are_not_fetched() {
        let mut table = sample_table();
        let source = sample_source();
        augment(&mut table, &source, &AugmentOptions::default())
            .await
            .unwrap();

        assert_eq!(
            *source.requests.borrow(),
            vec!["311-10.0KHRCT-ND", "SS34-NOPRICE", "UNREACHABLE"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_fetched_each_time() {
        let mut table = BomTable::new(rows(&[
            &["Supplier - Digikey", "LibRef"],
            &["", ""],
            &["311-10.0KHRCT-ND", "R1"],
            &["311-10.0KHRCT-ND", "R2"],
        ]));
        let source = sample_source();
        let report = augment(&mut table, &source, &AugmentOptions::default())
            .await
            .unwrap();

        assert_eq!(report.priced(), 2);
        assert_eq!(source.requests.borrow().len(), 2);
        assert_eq!(table.rows()[3], vec!["311-10.0KHRCT-ND", "R2", "$0.10"]);
    }

    #[tokio::test]
    async fn test_pad_unpriced_keeps_rows_rectangular() {
        let mut table = sample_table();
        let source = sample_source();
        let options = AugmentOptions { pad_unpriced: true };
        augment(&mut table, &source, &options).await.unwrap();

        let width = table.rows()[0].len();
        for row in &table.rows()[2..] {
            assert_eq!(row.len(), width);
        }
        assert_eq!(table.rows()[3].last().map(String::as_str), Some(""));
        // The reserved row is never touched.
        assert_eq!(table.rows()[1].len(), 3);
    }

    #[tokio::test]
    async fn test_missing_column_fails_before_mutation() {
        let mut table = BomTable::new(rows(&[
            &["LibRef", "Supplier - Mouser"],
            &["", ""],
            &["R1", "71-CRCW0603-10K"],
        ]));
        let before = table.clone();
        let source = sample_source();

        let err = augment(&mut table, &source, &AugmentOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("Supplier - Digikey".into()));
        assert_eq!(table, before);
        assert!(source.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_empty_table_is_schema_error() {
        let mut table = BomTable::default();
        let err = augment(&mut table, &sample_source(), &AugmentOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyTable);
    }

    #[tokio::test]
    async fn test_run_writes_priced_copy() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("psu.csv");
        fs::write(
            &input,
            "LibRef,Value,Supplier - Digikey\n\
             Schematic,rev B,\n\
             Res,\"10k, 1%\",311-10.0KHRCT-ND\n\
             Inductor,12u,UNREACHABLE\n",
        )
        .unwrap();

        let summary = run(&input, &sample_source(), &AugmentOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.output, dir.path().join("psu-prices.csv"));
        assert_eq!(summary.report.priced(), 1);
        assert_eq!(summary.report.failed(), 1);

        let written = read_bom(&summary.output).unwrap();
        assert_eq!(
            written.rows(),
            rows(&[
                &["LibRef", "Value", "Supplier - Digikey", "Single Price"],
                &["Schematic", "rev B", ""],
                &["Res", "10k, 1%", "311-10.0KHRCT-ND", "$0.10"],
                &["Inductor", "12u", "UNREACHABLE"],
            ])
        );
        // The input is left alone.
        assert_eq!(read_bom(&input).unwrap().rows()[0].len(), 3);
    }

    #[tokio::test]
    async fn test_run_writes_output_when_every_row_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bom.csv");
        fs::write(
            &input,
            "LibRef,Supplier - Digikey\n,\nR1,UNREACHABLE\nR2,ALSO-UNREACHABLE\n",
        )
        .unwrap();

        let summary = run(&input, &sample_source(), &AugmentOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.report.failed(), 2);
        assert!(summary.output.exists());
    }

    #[tokio::test]
    async fn test_run_missing_column_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bom.csv");
        fs::write(&input, "Designator,Supplier - Digikey\n,\nR1,X\n").unwrap();

        let err = run(&input, &sample_source(), &AugmentOptions::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("LibRef"));
        assert!(!dir.path().join("bom-prices.csv").exists());
    }

    fn part_pages() -> CannedPages {
        CannedPages::new(&[
            ("PART-ND", pricing_page("$0.10")),
            ("PART2-ND", pricing_page("$0.20")),
        ])
    }

    #[tokio::test]
    async fn test_pad_unpriced_fills_short_rows_to_header_width() {
        let mut table = BomTable::new(rows(&[
            &["LibRef", "Value", "Supplier - Digikey"],
            &["", "", ""],
            &["Fuse"],
            &[],
            &["R1", "10k", "PART-ND"],
        ]));
        let options = AugmentOptions { pad_unpriced: true };
        augment(&mut table, &part_pages(), &options).await.unwrap();

        assert_eq!(table.rows()[2], vec!["Fuse", "", "", ""]);
        assert!(table.rows()[3].is_empty());
        assert_eq!(table.rows()[4], vec!["R1", "10k", "PART-ND", "$0.10"]);
    }

    #[tokio::test]
    async fn test_run_prices_first_item_after_blank_reserved_row() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bom.csv");
        fs::write(&input, "LibRef,Supplier - Digikey\n\nR1,PART-ND\nR2,PART2-ND\n").unwrap();

        let source = part_pages();
        let summary = run(&input, &source, &AugmentOptions::default()).await.unwrap();

        assert_eq!(*source.requests.borrow(), vec!["PART-ND", "PART2-ND"]);
        assert_eq!(summary.report.priced(), 2);
        assert_eq!(
            fs::read_to_string(&summary.output).unwrap(),
            "LibRef,Supplier - Digikey,Single Price\r\n\r\nR1,PART-ND,$0.10\r\nR2,PART2-ND,$0.20\r\n"
        );
    }

    #[tokio::test]
    async fn test_run_keeps_blank_line_between_items() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bom.csv");
        fs::write(&input, "LibRef,Supplier - Digikey\nnotes,\nR1,PART-ND\n\nR2,PART2-ND\n").unwrap();

        let summary = run(&input, &part_pages(), &AugmentOptions::default()).await.unwrap();

        let labels: Vec<(usize, &str)> = summary
            .report
            .outcomes
            .iter()
            .map(|o| (o.row(), o.libref()))
            .collect();
        assert_eq!(labels, vec![(2, "R1"), (3, ""), (4, "R2")]);
        assert_eq!(summary.report.priced(), 2);
        assert_eq!(summary.report.skipped(), 1);
        assert_eq!(
            fs::read_to_string(&summary.output).unwrap(),
            "LibRef,Supplier - Digikey,Single Price\r\nnotes,\r\nR1,PART-ND,$0.10\r\n\r\nR2,PART2-ND,$0.20\r\n"
        );
    }

    #[tokio::test]
    async fn test_run_empty_file_reports_unusable_header() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bom.csv");
        fs::write(&input, "").unwrap();

        let err = run(&input, &part_pages(), &AugmentOptions::default())
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("has an unusable header"), "{message}");
        assert!(message.contains("no header row"), "{message}");
        assert!(!message.contains("missing required columns"), "{message}");
    }
}
