//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Blueprint info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    paths: PathsInfo,
    fastframe: FastframeInfo,
    instrument: InstrumentInfo,
    selection: SelectionInfo,
    dispatch: DispatchInfo,
}

#[derive(Serialize)]
struct PathsInfo {
    raw_root: String,
    prod_root: String,
}

#[derive(Serialize)]
struct FastframeInfo {
    program: String,
    format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_args: Vec<String>,
}

#[derive(Serialize)]
struct InstrumentInfo {
    channels: Vec<String>,
    spectrographs: u8,
    camera_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cameras: Vec<String>,
}

#[derive(Serialize)]
struct SelectionInfo {
    flavors: Vec<String>,
}

#[derive(Serialize)]
struct DispatchInfo {
    workers: usize,
    strict: bool,
    item_timeout_secs: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint info");

    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize blueprint info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RunBlueprint, args: &InfoArgs) -> ConfigInfo {
    let cameras = blueprint.cameras();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        paths: PathsInfo {
            raw_root: blueprint.paths.raw_root.display().to_string(),
            prod_root: blueprint.paths.prod_root.display().to_string(),
        },
        fastframe: FastframeInfo {
            program: blueprint.fastframe.program.clone(),
            format: blueprint.fastframe.format.prefix().to_string(),
            extra_args: blueprint.fastframe.extra_args.clone(),
        },
        instrument: InstrumentInfo {
            channels: blueprint
                .instrument
                .channels
                .iter()
                .map(|c| c.to_string())
                .collect(),
            spectrographs: blueprint.instrument.spectrographs,
            camera_count: cameras.len(),
            cameras: if args.cameras {
                cameras.iter().map(|c| c.to_string()).collect()
            } else {
                Vec::new()
            },
        },
        selection: SelectionInfo {
            flavors: blueprint
                .selection
                .flavors
                .iter()
                .map(|f| f.label().to_string())
                .collect(),
        },
        dispatch: DispatchInfo {
            workers: blueprint.dispatch.workers,
            strict: blueprint.dispatch.strict,
            item_timeout_secs: blueprint.dispatch.item_timeout_secs,
        },
    }
}

fn print_config_info(blueprint: &contracts::RunBlueprint, args: &InfoArgs) {
    println!("==============================================================");
    println!("              Fastframe Dispatch Blueprint");
    println!("==============================================================\n");

    println!("Paths");
    println!("   |- Version: {:?}", blueprint.version);
    println!("   |- Raw root: {}", blueprint.paths.raw_root.display());
    println!("   `- Prod root: {}", blueprint.paths.prod_root.display());

    println!("\nFastframe");
    println!("   |- Program: {}", blueprint.fastframe.program);
    println!("   |- Output format: {}", blueprint.fastframe.format.prefix());
    if blueprint.fastframe.extra_args.is_empty() {
        println!("   `- Extra args: (none)");
    } else {
        println!("   `- Extra args: {:?}", blueprint.fastframe.extra_args);
    }

    let cameras = blueprint.cameras();
    println!("\nInstrument");
    println!(
        "   |- Channels: {}",
        blueprint
            .instrument
            .channels
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("   |- Spectrographs: {}", blueprint.instrument.spectrographs);
    if args.cameras {
        println!("   `- Cameras ({}):", cameras.len());
        for (i, camera) in cameras.iter().enumerate() {
            let prefix = if i == cameras.len() - 1 { "`-" } else { "|-" };
            println!("      {} {}", prefix, camera);
        }
    } else {
        println!("   `- Cameras: {}", cameras.len());
    }

    println!("\nSelection");
    println!(
        "   `- Flavors: {}",
        blueprint
            .selection
            .flavors
            .iter()
            .map(|f| f.label().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("\nDispatch");
    println!("   |- Workers: {}", blueprint.dispatch.workers);
    println!("   |- Strict: {}", blueprint.dispatch.strict);
    match blueprint.dispatch.item_timeout() {
        Some(t) => println!("   `- Item timeout: {}s", t.as_secs()),
        None => println!("   `- Item timeout: unlimited"),
    }

    println!();
}
