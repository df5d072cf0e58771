//! `parley models` -- list models visible to the configured API key.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_types::llm::ModelInfo;

/// Fetch and print the model list.
///
/// Without `all`, only models usable for chat are shown.
pub async fn list_models(provider: &BoxLlmProvider, all: bool, json: bool) -> Result<()> {
    let models = provider
        .list_models()
        .await
        .with_context(|| format!("failed to list {} models", provider.name()))?;
    let shown = visible_models(models, all);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!();
        println!(
            "  {} No models available for this API key.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::White),
        Cell::new("Display Name").fg(Color::White),
        Cell::new("Chat").fg(Color::White),
    ]);

    for model in &shown {
        let chat_cell = if model.supports_chat {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&model.name).fg(Color::Cyan),
            Cell::new(model.display_name.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
            chat_cell,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} model{} ({})",
        style(shown.len()).bold(),
        if shown.len() == 1 { "" } else { "s" },
        style(provider.name()).dim()
    );
    println!();

    Ok(())
}

fn visible_models(models: Vec<ModelInfo>, all: bool) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(|m| all || m.supports_chat)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, supports_chat: bool) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            display_name: None,
            supports_chat,
        }
    }

    #[test]
    fn test_visible_models_filters_non_chat() {
        let models = vec![model("models/a", true), model("models/embed", false)];
        let shown = visible_models(models, false);
        assert_eq!(shown, vec![model("models/a", true)]);
    }

    #[test]
    fn test_visible_models_all() {
        let models = vec![model("models/a", true), model("models/embed", false)];
        assert_eq!(visible_models(models, true).len(), 2);
    }
}
