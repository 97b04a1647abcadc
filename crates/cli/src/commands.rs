//! Subcommand implementations.

use anyhow::{Result, bail};
use docent_core::{AppState, CrawlJob, CrawlRequest, PollEvent, SearchFilters};
use serde::Serialize;

use crate::{Crawl4aiArgs, CrawlArgs, SearchArgs};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn search_filters(args: &SearchArgs) -> Option<SearchFilters> {
    let mut filters = SearchFilters::new();
    if let Some(source) = &args.source {
        filters.insert("source".into(), source.clone());
    }
    if let Some(version) = &args.doc_version {
        filters.insert("version".into(), version.clone());
    }
    (!filters.is_empty()).then_some(filters)
}

fn crawl_request(args: CrawlArgs) -> CrawlRequest {
    let mut request = CrawlRequest::new(args.url).with_max_pages(args.max_pages);
    request.include_patterns = (!args.include.is_empty()).then_some(args.include);
    request.exclude_patterns = (!args.exclude.is_empty()).then_some(args.exclude);
    request.generate_summaries = !args.no_summaries;
    request
}

/// One progress line, e.g. `job-1 processing pages=12`.
fn progress_line(job: &CrawlJob) -> String {
    let mut line = format!("{} {}", job.job_id, job.status);
    if let Some(pages) = job.page_count {
        line.push_str(&format!(" pages={pages}"));
    }
    if let Some(error) = &job.error {
        line.push_str(&format!(" error={error}"));
    }
    line
}

pub async fn search(state: &AppState, args: SearchArgs) -> Result<()> {
    let filters = search_filters(&args);
    let result = state.search.search(&args.query, args.limit, filters.as_ref()).await?;
    print_json(&result)
}

pub async fn doc(state: &AppState, id: &str) -> Result<()> {
    let document = state.search.get_document_by_id(id).await?;
    print_json(&document)
}

pub async fn status(state: &AppState, job_id: &str) -> Result<()> {
    let job = state.crawl.poll(job_id).await?;
    print_json(&job)
}

pub async fn purge(state: &AppState) -> Result<()> {
    let deleted = state.store().purge_expired().await?;
    print_json(&serde_json::json!({ "deleted": deleted }))
}

pub async fn crawl(state: &AppState, args: CrawlArgs) -> Result<()> {
    let no_wait = args.no_wait;
    let job = state.crawl.submit(&crawl_request(args)).await?;

    if no_wait { print_json(&job) } else { follow(state, job).await }
}

pub async fn crawl4ai(state: &AppState, args: Crawl4aiArgs) -> Result<()> {
    let job = state.crawl.submit_crawl4ai_docs(args.max_pages, !args.no_summaries).await?;

    if args.no_wait { print_json(&job) } else { follow(state, job).await }
}

/// Poll until the job is terminal or the user presses Ctrl-C.
///
/// Cancelling stops local polling only; the crawl keeps running on the service.
async fn follow(state: &AppState, job: CrawlJob) -> Result<()> {
    eprintln!("{}", progress_line(&job));
    if job.is_terminal() {
        return finish(job);
    }

    let mut handle = state.poller().watch(job.job_id.clone());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                handle.cancel();
                eprintln!("stopped polling; job {} continues on the crawler", job.job_id);
                return Ok(());
            }
            event = handle.next() => match event {
                Some(PollEvent::Status(current)) => eprintln!("{}", progress_line(&current)),
                Some(PollEvent::Failed(e)) => tracing::warn!(job_id = %job.job_id, error = %e, "status poll failed"),
                Some(PollEvent::Finished(done)) => return finish(done),
                None => bail!("polling for job {} stopped unexpectedly", job.job_id),
            },
        }
    }
}

fn finish(job: CrawlJob) -> Result<()> {
    print_json(&job)?;
    match &job.error {
        Some(error) => bail!("crawl {} failed: {error}", job.job_id),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::JobStatus;

    fn job(status: JobStatus) -> CrawlJob {
        serde_json::from_value(serde_json::json!({
            "jobId": "job-1",
            "url": "https://docs.example.com",
            "status": status,
            "createdAt": "2024-03-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_progress_line() {
        let mut running = job(JobStatus::Processing);
        running.page_count = Some(12);
        assert_eq!(progress_line(&running), "job-1 processing pages=12");

        let failed = job(JobStatus::Failed).normalized();
        assert_eq!(progress_line(&failed), "job-1 failed error=crawl failed");
    }

    #[test]
    fn test_finish_fails_on_failed_job() {
        assert!(finish(job(JobStatus::Completed)).is_ok());
        assert!(finish(job(JobStatus::Failed).normalized()).is_err());
    }

    #[test]
    fn test_crawl_request_from_args() {
        let args = CrawlArgs {
            url: "https://docs.example.com".into(),
            max_pages: 2,
            include: vec![],
            exclude: vec!["/blog/*".into()],
            no_summaries: true,
            no_wait: false,
        };
        let request = crawl_request(args);

        assert_eq!(request.max_pages, 2);
        assert!(request.include_patterns.is_none());
        assert_eq!(request.exclude_patterns.as_deref(), Some(&["/blog/*".to_string()][..]));
        assert!(!request.generate_summaries);
    }

    #[test]
    fn test_search_filters_from_args() {
        let args = SearchArgs { query: "q".into(), limit: 5, source: None, doc_version: Some("1.24".into()) };
        let filters = search_filters(&args).unwrap();
        assert_eq!(filters["version"], "1.24");

        let args = SearchArgs { query: "q".into(), limit: 5, source: None, doc_version: None };
        assert!(search_filters(&args).is_none());
    }
}
