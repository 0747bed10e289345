use std::io::{self, Write};

use serde_json::Value;
use tickerlens_core::{Envelope, NOT_AVAILABLE};

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    render_to(&mut stdout.lock(), envelope, format, pretty)
}

pub fn render_to(
    out: &mut impl Write,
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(out, envelope)?,
    }

    Ok(())
}

fn render_table(out: &mut impl Write, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let meta = &envelope.meta;
    writeln!(out, "request_id  : {}", meta.request_id)?;
    writeln!(out, "schema      : {}", meta.schema_version)?;
    writeln!(out, "generated_at: {}", meta.generated_at)?;
    writeln!(
        out,
        "sources     : {}",
        meta.source_chain
            .iter()
            .map(|source| source.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    writeln!(out, "latency_ms  : {}", meta.latency_ms)?;
    writeln!(out, "cache_hit   : {}", meta.cache_hit)?;

    if !meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match dashboard_lines(&envelope.data) {
        Some(lines) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        None => {
            writeln!(out, "data:")?;
            for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

/// Summary block for an `analyze` payload; `None` for anything else.
fn dashboard_lines(data: &Value) -> Option<Vec<String>> {
    let display = data.get("display")?;
    let text = |value: &Value, key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(NOT_AVAILABLE)
            .to_owned()
    };
    let latest = data.get("latest")?;

    Some(vec![
        format!("symbol      : {}", text(data, "symbol")),
        format!(
            "latest      : {} close {}",
            text(latest, "date"),
            latest
                .get("close")
                .and_then(Value::as_f64)
                .map(|close| format!("{close:.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
        ),
        format!("bars        : {}", data.get("bar_count").unwrap_or(&Value::Null)),
        format!("trend       : {}", text(display, "trend")),
        format!(
            "{}-day MA    : {}",
            data.get("window").unwrap_or(&Value::Null),
            text(display, "moving_average")
        ),
        format!("volatility  : {}", text(display, "volatility")),
    ])
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tickerlens_core::{EnvelopeMeta, ProviderId, SCHEMA_VERSION};

    use super::*;

    fn envelope(data: Value) -> Envelope<Value> {
        let meta = EnvelopeMeta::new(
            "request-12345",
            SCHEMA_VERSION,
            vec![ProviderId::Alphavantage],
            3,
            false,
        )
        .expect("meta");
        Envelope::success(meta, data)
    }

    fn rendered(envelope: &Envelope<Value>, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        render_to(&mut buffer, envelope, format, false).expect("renders");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn table_shows_dashboard_summary() {
        let data = json!({
            "symbol": "IBM",
            "latest": { "date": "2024-06-28", "close": 170.5 },
            "bar_count": 1,
            "window": 7,
            "display": { "trend": "N/A", "moving_average": "N/A", "volatility": "N/A" }
        });

        let output = rendered(&envelope(data), OutputFormat::Table);
        assert!(output.contains("symbol      : IBM"));
        assert!(output.contains("latest      : 2024-06-28 close 170.50"));
        assert!(output.contains("7-day MA    : N/A"));
        assert!(output.contains("volatility  : N/A"));
        assert!(!output.contains("data:"));
    }

    #[test]
    fn table_falls_back_to_data_dump() {
        let output = rendered(&envelope(json!({ "cleared": true })), OutputFormat::Table);
        assert!(output.contains("data:"));
        assert!(output.contains("\"cleared\": true"));
    }

    #[test]
    fn json_output_is_single_line() {
        let output = rendered(&envelope(json!({ "cleared": false })), OutputFormat::Json);
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"schema_version\":\"v1.0.0\""));
    }
}
