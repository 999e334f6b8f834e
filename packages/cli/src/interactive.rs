//! Interactive render loop.
//!
//! Presents the registry as a `dialoguer` menu, optionally takes a threshold
//! override, and re-renders both artifacts on every pass. A failed cycle,
//! including one whose artifacts couldn't be written, prints its message
//! and returns to the menu.

use std::path::Path;

use borehole_map_dataset::Dataset;
use borehole_map_parameter::registry::ParameterRegistry;
use borehole_map_render::{RenderOptions, RenderOutcome, RenderRequest, render_cycle};
use dialoguer::{Input, Select};

const QUIT: &str = "Quit";

/// Runs the menu until the user picks "Quit".
///
/// # Errors
///
/// Returns an error only if terminal interaction fails.
pub fn run(
    dataset: &Dataset,
    registry: &ParameterRegistry,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}: {} samples", dataset.name, dataset.len());
    println!();

    let mut labels: Vec<String> = registry
        .parameters()
        .iter()
        .map(|spec| match spec.limit_description() {
            Some(limit) => format!("{} ({limit})", spec.name),
            None => spec.name.clone(),
        })
        .collect();
    labels.push(QUIT.to_string());

    let options = RenderOptions::default();
    let mut last = 0;

    loop {
        let idx = Select::new()
            .with_prompt("Parameter to map")
            .items(&labels)
            .default(last)
            .interact()?;

        let Some(spec) = registry.parameters().get(idx) else {
            return Ok(());
        };
        last = idx;

        let mut request = RenderRequest::new(spec.name.clone());
        if spec.kind.is_numeric() {
            if let Some(bound) = prompt_threshold()? {
                request = request.with_threshold(bound);
            }
        }

        let outcome = render_cycle(dataset, registry, &request, &options);
        if let RenderOutcome::Rendered(output) = &outcome {
            println!(
                "{}: {} plotted, {} missing, {} unparseable",
                output.parameter,
                output.stats.included,
                output.stats.missing,
                output.stats.rejected
            );
        }
        match crate::publish(outcome, dir) {
            Ok(paths) => {
                println!("  map:          {}", paths.map.display());
                println!("  distribution: {}", paths.distribution.display());
            }
            Err(message) => println!("Error: {message}"),
        }
        println!();
    }
}

/// Asks for an optional upper bound. Empty input keeps the registry limit.
fn prompt_threshold() -> Result<Option<f64>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt("Threshold override (leave empty for the registry limit)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_threshold(input).map(|_| ())
        })
        .interact_text()?;

    Ok(parse_threshold(&raw)?)
}

fn parse_threshold(input: &str) -> Result<Option<f64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("Invalid threshold '{trimmed}'")),
    }
}
