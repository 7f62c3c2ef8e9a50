//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use uiprobe_config::{ConfigLoader, ConfigValidator};
use uiprobe_protocols::{Rect, ToolResult, UiElement};
use uiprobe_runtime::{RetryPolicy, VerificationManager};
use uiprobe_vision::TemplateVisibleCheck;
use uiprobe_vision::image_utils::load_gray;

use crate::app::{App, CliResult, desktop_capture};
use crate::cli::IndexAction;

/// Used when neither the command line nor the policy bounds the wait.
const DEFAULT_WAIT: Duration = Duration::from_secs(300);
/// Room for the attempt in flight when the policy timeout expires.
const WAIT_GRACE: Duration = Duration::from_secs(5);

pub(crate) async fn run_match(
    app: &App,
    screen: &Path,
    template: &Path,
    max_results: Option<usize>,
) -> CliResult<()> {
    let mut params = json!({
        "screen": screen.to_string_lossy(),
        "template": template.to_string_lossy(),
    });
    if let Some(max_results) = max_results {
        params["max_results"] = json!(max_results);
    }
    let result = app.call_tool("vision_find_template", params).await?;
    print_result(&result)
}

pub(crate) async fn run_index(app: &App, action: IndexAction) -> CliResult<()> {
    let retriever = app.retriever().await?;
    match action {
        IndexAction::Store {
            name,
            description,
            template,
            bounds,
            id,
        } => {
            let element = build_element(name, description, template, bounds, id);
            retriever.store(&element).await?;
            println!("{}", element.id);
            Ok(())
        }
        IndexAction::Search {
            query,
            top_n,
            min_score,
        } => {
            app.register_element_tools(retriever, None)?;
            let mut params = json!({ "query": query });
            if let Some(top_n) = top_n {
                params["top_n"] = json!(top_n);
            }
            if let Some(min_score) = min_score {
                params["min_score"] = json!(min_score);
            }
            let result = app.call_tool("element_search", params).await?;
            print_result(&result)
        }
        IndexAction::Remove { id } => {
            retriever
                .remove(&UiElement::new(String::new(), String::new()).with_id(id))
                .await?;
            info!("Removed element {}", id);
            Ok(())
        }
    }
}

pub(crate) async fn run_locate(app: &App, query: &str) -> CliResult<()> {
    let capture = desktop_capture()?;
    let retriever = app.retriever().await?;
    app.register_element_tools(retriever, Some(capture))?;
    let result = app
        .call_tool("element_locate", json!({ "query": query }))
        .await?;
    print_result(&result)
}

pub(crate) async fn run_wait_for(
    app: &App,
    template: &Path,
    gone: bool,
    timeout_ms: Option<u64>,
) -> CliResult<()> {
    let capture = desktop_capture()?;
    let template = load_gray(template)?;
    let check = if gone {
        TemplateVisibleCheck::hidden(template, app.matcher, app.mapper)
    } else {
        TemplateVisibleCheck::visible(template, app.matcher, app.mapper)
    };

    let policy = RetryPolicy::from(&app.config.retry.verification);
    let wait = wait_bound(&policy, timeout_ms);

    let manager = VerificationManager::new(capture)?;
    manager.submit(Arc::new(check), policy)?;
    let snapshot = manager.wait_for_completion_async(wait).await?;
    let status = manager.status();
    manager.close();

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "status": status,
            "success": snapshot.success,
            "message": snapshot.message,
            "attempt": snapshot.attempt,
            "payload": snapshot.payload,
        }))?
    );
    if !snapshot.success {
        return Err(format!("Verification did not pass: {}", snapshot.message).into());
    }
    Ok(())
}

/// Outer bound for `wait-for`. An explicit `--timeout-ms` is used as is.
/// Otherwise the policy timeout is only checked between attempts, so the
/// loop may run one more sleep and attempt past it; the bound leaves room
/// for both so the loop ends with its own status rather than a cancel.
fn wait_bound(policy: &RetryPolicy, timeout_ms: Option<u64>) -> Duration {
    if let Some(ms) = timeout_ms {
        return Duration::from_millis(ms);
    }
    policy
        .timeout
        .map(|timeout| {
            timeout
                .saturating_add(policy.max_delay)
                .saturating_add(WAIT_GRACE)
        })
        .unwrap_or(DEFAULT_WAIT)
}

/// Print every error and warning; fail when the file is invalid.
pub(crate) fn run_validate(path: &Path) -> CliResult<()> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);
    for error in &result.errors {
        println!("error   {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        println!("warning {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        return Err(format!("{} configuration errors", result.errors.len()).into());
    }
    println!("{} is valid", path.display());
    Ok(())
}

fn build_element(
    name: String,
    description: String,
    template: Option<PathBuf>,
    bounds: Option<Rect>,
    id: Option<Uuid>,
) -> UiElement {
    let mut element = UiElement::new(name, description);
    if let Some(id) = id {
        element = element.with_id(id);
    }
    if let Some(template) = template {
        element = element.with_template(ConfigLoader::expand_path(&template.to_string_lossy()));
    }
    if let Some(bounds) = bounds {
        element = element.with_bounds(bounds);
    }
    element
}

fn print_result(result: &ToolResult) -> CliResult<()> {
    if let Some(output) = &result.structured_output {
        println!("{}", serde_json::to_string_pretty(output)?);
    }
    if !result.success {
        return Err(result.content.clone().into());
    }
    info!("{}", result.content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_element_applies_options() {
        let id = Uuid::new_v4();
        let element = build_element(
            "Ok".into(),
            "ok button".into(),
            Some(PathBuf::from("/tmp/ok.png")),
            Some(Rect::new(1, 2, 3, 4)),
            Some(id),
        );
        assert_eq!(element.id, id);
        assert_eq!(element.template, Some(PathBuf::from("/tmp/ok.png")));
        assert_eq!(element.bounds, Some(Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_wait_bound_outlasts_policy_timeout() {
        let policy = RetryPolicy::new(10, 500, 2_000);
        let wait = wait_bound(&policy, None);
        assert_eq!(wait, Duration::from_millis(2_500) + WAIT_GRACE);
        assert!(wait > policy.timeout.unwrap() + policy.delay_for_attempt(9));

        assert_eq!(wait_bound(&policy, Some(750)), Duration::from_millis(750));
        assert_eq!(wait_bound(&RetryPolicy::new(3, 10, 0), None), DEFAULT_WAIT);
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[display]\nscale_x = 0.0\n").unwrap();
        assert!(run_validate(&path).is_err());

        std::fs::write(&path, "[display]\nscale_x = 2.0\n").unwrap();
        assert!(run_validate(&path).is_ok());
    }
}
