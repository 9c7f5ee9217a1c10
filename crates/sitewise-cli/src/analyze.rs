use sitewise_advisor::Advisor;
use sitewise_core::AppConfig;

/// Run one analysis and print the report.
///
/// The run itself never fails; degraded steps are listed in the report.
///
/// # Errors
///
/// Returns an error if the advisor cannot be built from configuration or the
/// report cannot be encoded as JSON.
pub(crate) async fn run_analyze(config: &AppConfig, query: &str, json: bool) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }

    let advisor = Advisor::from_config(config).await?;
    let report = advisor.run(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if report.is_degraded() {
        tracing::warn!(
            steps = report.degraded_steps.len(),
            "report was built with fallbacks"
        );
    }
    Ok(())
}
