use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::output;
use crate::cli::OutputFormat;

pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let data: Value = client.get("/api/health").await?;
    output(output_format, &data, |d| {
        format!(
            "✓ Server is {} (version {})",
            d["status"].as_str().unwrap_or("unknown"),
            d["version"].as_str().unwrap_or("?")
        )
    })
}

pub async fn dashboard(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let data: Value = client.get("/api/dashboard").await?;
    output(output_format, &data, render)
}

fn render(data: &Value) -> String {
    let summary = &data["summary"];
    let baby = data["profile"]["baby_name"].as_str().unwrap_or("Carregando...");
    format!(
        "{}\n  Vacinas:   {}/{} ({}%)\n  Sono hoje: {}\n  Rotina:    {}/{}\n  Sonecas:   {}",
        baby,
        summary["vaccines"]["completed"],
        summary["vaccines"]["total"],
        summary["vaccine_percent_display"],
        summary["sleep_today_label"].as_str().unwrap_or("0.0h"),
        summary["routines"]["completed"],
        summary["routines"]["total"],
        summary["nap_count"],
    )
}
