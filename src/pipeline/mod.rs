use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn, Instrument};

mod assemble;
mod error;
mod group;
pub mod pool;
pub mod table;

pub use assemble::assemble_row;
pub use error::ImportError;
pub use group::ProductGrouper;
pub use pool::{run_jobs, FileJob};

use crate::config::{Config, JitterRange};
use crate::parsers::product_handle;
use crate::scrapers::{extract_fields, HttpSession, PageFetcher, PageSession};
use crate::utils::delay::jitter;
use crate::utils::http::create_client;

/// State for one file's run. Created when the run starts, summarised and
/// dropped when it ends.
#[derive(Debug)]
pub struct RunContext {
    pub label: String,
    pub started_at: DateTime<Local>,
    pub max_images: Option<usize>,
    pub between_items: JitterRange,
    pub output_suffix: String,
    pub attempted: usize,
    pub imported: usize,
    pub skipped: usize,
}

impl RunContext {
    pub fn new(label: impl Into<String>, config: &Config) -> Self {
        Self {
            label: label.into(),
            started_at: Local::now(),
            max_images: config.image_cap(),
            between_items: config.delays.between_items,
            output_suffix: config.output_suffix.clone(),
            attempted: 0,
            imported: 0,
            skipped: 0,
        }
    }

    fn log_summary(&self) {
        let elapsed = Local::now() - self.started_at;
        info!(
            "{}: {} imported, {} skipped of {} in {}s",
            self.label,
            self.imported,
            self.skipped,
            self.attempted,
            elapsed.num_seconds()
        );
    }
}

/// Scrape every identifier in `input` through `fetcher` and write the
/// Shopify table next to it. Returns the output path.
pub async fn process_file<S: PageSession>(
    ctx: &mut RunContext,
    fetcher: &mut PageFetcher<S>,
    input: &Path,
    template_path: &Path,
) -> Result<PathBuf, ImportError> {
    info!("Processing {}", input.display());

    let template = table::read_template(template_path)?;
    let sources = table::read_input(input)?;
    if sources.is_empty() {
        return Err(ImportError::EmptyInput(input.to_path_buf()));
    }

    let mut grouper = ProductGrouper::default();
    let total = sources.len();

    for (idx, source) in sources.iter().enumerate() {
        ctx.attempted += 1;
        info!("Processing {} (line {}, {}/{})", source.id, source.line, idx + 1, total);

        if !fetcher.load(&source.id).await {
            ctx.skipped += 1;
            continue;
        }

        let fields = extract_fields(fetcher.page_source(), &source.id, ctx.max_images);
        if !fields.has_title() {
            warn!("No product data for {}, skipping", source.id);
            ctx.skipped += 1;
            continue;
        }

        let handle = product_handle(&fields.title, &source.id);
        let row = assemble_row(&template, source, &fields);
        grouper.add(&handle, row, &fields.images);
        ctx.imported += 1;
        info!(
            "Imported {}: {}",
            source.id,
            fields.title.chars().take(40).collect::<String>()
        );

        if idx + 1 < total {
            jitter(ctx.between_items).await;
        }
    }

    if grouper.is_empty() {
        return Err(ImportError::NoRowsImported(input.to_path_buf()));
    }

    for group in grouper.groups() {
        info!(
            "Product {}: {} variant(s), {} image(s)",
            group.handle(),
            group.len(),
            group.images().len()
        );
    }

    let rows = grouper.into_rows();
    let output = table::output_path(input, &ctx.output_suffix);
    table::write_output(&output, &template, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(output)
}

/// One complete pipeline with its own HTTP session. `slot` selects the
/// proxy when several are configured.
pub async fn run_file(config: &Config, job: &FileJob, slot: usize) -> Result<PathBuf, ImportError> {
    let label = job
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| job.input.display().to_string());
    let span = info_span!("run", file = %label);

    let result = run_with_session(config, job, slot, label)
        .instrument(span.clone())
        .await;
    if let Err(e) = &result {
        span.in_scope(|| error!("{}", e));
    }
    result
}

async fn run_with_session(
    config: &Config,
    job: &FileJob,
    slot: usize,
    label: String,
) -> Result<PathBuf, ImportError> {
    let client = create_client(config, slot)?;
    let mut fetcher = PageFetcher::new(HttpSession::new(client), config)?;
    let mut ctx = RunContext::new(label, config);

    let result = process_file(&mut ctx, &mut fetcher, &job.input, &job.template).await;
    ctx.log_summary();
    result
}
