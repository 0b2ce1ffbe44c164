//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Fetch everything from the content source and write the site
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let source = blog.content_source()?;
    let generator = Generator::new(blog)?;
    let report = generator.generate(source.as_ref()).await?;

    if !report.failed.is_empty() {
        tracing::warn!(
            "{} post(s) could not be generated: {}",
            report.failed.len(),
            report.failed.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} post pages ({} on the index) in {:.2}s",
        report.posts,
        report.listed,
        duration.as_secs_f64()
    );

    Ok(report)
}
