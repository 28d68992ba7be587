use crate::settings;
use colored::Colorize;
use std::sync::Arc;
use vpcreaper_cloud::{CloudError, Teardown, TeardownReport};
use vpcreaper_cloud_aws::AwsProvider;

pub struct DeleteArgs {
    pub vpc_id: String,
    pub dry_run: bool,
    pub release_addresses: bool,
    pub region: Option<String>,
    pub json: bool,
}

pub async fn handle(args: DeleteArgs) -> anyhow::Result<()> {
    let vpc_id = args.vpc_id.trim();
    if vpc_id.is_empty() {
        anyhow::bail!("VPC id must not be empty");
    }

    let (file, path) = vpcreaper_config::load_settings()?;
    if let Some(path) = &path {
        tracing::debug!(path = %path.display(), "Loaded settings file");
    }
    let teardown_settings = settings::teardown_settings(&file, args.release_addresses);
    let region = settings::region(args.region, &file);

    if !args.json {
        let mode = if args.dry_run {
            " (dry run)".yellow().to_string()
        } else {
            String::new()
        };
        println!("{} {}{}", "Tearing down".bold(), vpc_id.cyan(), mode);
        if let Some(region) = &region {
            println!("  region: {}", region.cyan());
        }
    }

    let provider = AwsProvider::from_env(region).await;
    let teardown = Teardown::new(Arc::new(provider), teardown_settings);

    match teardown.run(vpc_id, args.dry_run).await {
        Ok(report) if args.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(err) => {
            if let CloudError::StepFailed { step, source } = &err {
                eprintln!(
                    "{} {} failed: {}",
                    "✗".red(),
                    step.description(),
                    source.to_string().red()
                );
                eprintln!(
                    "  Nothing was rolled back. Fix the cause and run the command again."
                );
            }
            Err(err.into())
        }
    }
}

fn print_report(report: &TeardownReport) {
    for step in &report.steps {
        let mark = if step.targeted.is_empty() {
            "·".dimmed()
        } else {
            "✓".green()
        };
        println!(
            "  {} {:<32} {} found, {} targeted",
            mark,
            step.step.description(),
            step.discovered,
            step.targeted.len()
        );
        if report.dry_run {
            for id in &step.targeted {
                println!("      {}", id.dimmed());
            }
        }
    }

    println!();
    let headline = if report.dry_run {
        "Dry run completed, nothing was changed:".yellow().bold()
    } else {
        "Teardown completed:".green().bold()
    };
    println!(
        "{} {} ({} ms)",
        headline,
        report.summary(),
        report.duration_ms
    );
}
