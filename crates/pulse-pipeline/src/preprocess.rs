//! Preprocessing stage
//!
//! Price tables lose every incomplete row and get a canonical `date` column.
//! News tables gain `cleaned_text`, the normalized form of `description`.
//! Both are read from the raw area and written to the processed area.

use async_trait::async_trait;
use pulse_core::records::columns;
use pulse_core::store::{news_file_name, stock_file_name};
use pulse_core::{Company, DataArea, PipelineError, Result, Stage, StageReport, Table, TableStore};
use pulse_nlp::TextProcessor;

/// Clean a ticker's raw price table and write it to the processed area
///
/// Fails with `MissingColumn` (and writes nothing) when the table has no
/// `date`, `Date` or `Datetime` column.
pub fn try_clean_stock_data(store: &dyn TableStore, ticker: &str) -> Result<Table> {
    let name = stock_file_name(ticker);
    let mut table = store.read(DataArea::Raw, &name)?;

    if !table.has_column(columns::DATE)
        && !table.rename_column(columns::RAW_DATE, columns::DATE)
        && !table.rename_column(columns::RAW_DATETIME, columns::DATE)
    {
        return Err(PipelineError::missing_column(
            columns::DATE,
            store.location(DataArea::Raw, &name),
        ));
    }

    let dropped = table.drop_incomplete_rows();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} incomplete rows from {name}");
    }

    store.write(DataArea::Processed, &name, &table)?;
    tracing::info!(
        "Processed stock data saved to {}",
        store.location(DataArea::Processed, &name)
    );
    Ok(table)
}

/// Like [`try_clean_stock_data`], logging the error instead of returning it
pub fn clean_stock_data(store: &dyn TableStore, ticker: &str) -> Option<Table> {
    try_clean_stock_data(store, ticker)
        .inspect_err(|e| tracing::error!("Failed to clean stock data for {ticker}: {e}"))
        .ok()
}

/// Add `cleaned_text` to a company's raw news table and write it to the
/// processed area
///
/// A missing description becomes an empty `cleaned_text`. A table without a
/// `description` column fails with `MissingColumn` and nothing is written.
pub fn try_preprocess_news(
    store: &dyn TableStore,
    processor: &TextProcessor,
    company: &str,
) -> Result<Table> {
    let name = news_file_name(company);
    let mut table = store.read(DataArea::Raw, &name)?;
    let location = store.location(DataArea::Raw, &name);
    let description = table.require_column(columns::DESCRIPTION, &location)?;

    let cleaned: Vec<String> = (0..table.len())
        .map(|row| processor.clean(table.cell(row, description)))
        .collect();
    table.set_column(columns::CLEANED_TEXT, cleaned)?;

    store.write(DataArea::Processed, &name, &table)?;
    tracing::info!(
        "Processed news data saved to {}",
        store.location(DataArea::Processed, &name)
    );
    Ok(table)
}

/// Like [`try_preprocess_news`], logging the error instead of returning it
pub fn preprocess_news(
    store: &dyn TableStore,
    processor: &TextProcessor,
    company: &str,
) -> Option<Table> {
    try_preprocess_news(store, processor, company)
        .inspect_err(|e| tracing::error!("Failed to preprocess news for {company}: {e}"))
        .ok()
}

/// Preprocessing stage over a list of companies
#[derive(Debug, Clone)]
pub struct Preprocessor {
    processor: TextProcessor,
    companies: Vec<Company>,
}

impl Preprocessor {
    pub fn new(processor: TextProcessor, companies: Vec<Company>) -> Self {
        Self {
            processor,
            companies,
        }
    }

    /// Preprocess the price and news tables of one company
    pub fn process_company(&self, store: &dyn TableStore, company: &Company) -> StageReport {
        let mut report = StageReport::new(self.name());

        tracing::info!("Processing stock data for {}...", company.name);
        match try_clean_stock_data(store, &company.ticker) {
            Ok(_) => report.record_written(
                store.location(DataArea::Processed, &stock_file_name(&company.ticker)),
            ),
            Err(e) => {
                tracing::error!("Failed to clean stock data for {}: {e}", company.ticker);
                report.record_failure(&company.ticker, e);
            },
        }

        tracing::info!("Processing news data for {}...", company.name);
        match try_preprocess_news(store, &self.processor, &company.name) {
            Ok(_) => {
                let name = news_file_name(&company.name);
                report.record_written(store.location(DataArea::Processed, &name));
            },
            Err(e) => {
                tracing::error!("Failed to preprocess news for {}: {e}", company.name);
                report.record_failure(&company.name, e);
            },
        }

        report
    }

    /// Preprocess every company; one company's failure never blocks the others
    pub fn process_all(&self, store: &dyn TableStore) -> StageReport {
        let mut report = StageReport::new(self.name());
        for company in &self.companies {
            report.absorb(self.process_company(store, company));
        }
        report
    }
}

#[async_trait]
impl Stage for Preprocessor {
    fn name(&self) -> &str {
        "preprocess"
    }

    async fn run(&self, store: &dyn TableStore) -> Result<StageReport> {
        Ok(self.process_all(store))
    }
}
