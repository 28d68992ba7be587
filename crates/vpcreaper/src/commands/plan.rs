use crate::settings;
use colored::Colorize;
use vpcreaper_cloud::Teardown;

pub fn handle(release_addresses: bool) -> anyhow::Result<()> {
    let (file, _) = vpcreaper_config::load_settings()?;
    let teardown_settings = settings::teardown_settings(&file, release_addresses);

    println!("{}", "Teardown steps:".bold());
    for (i, step) in Teardown::plan_for(&teardown_settings).iter().enumerate() {
        println!(
            "  {:>2}. {:<24} {}",
            i + 1,
            step.to_string().cyan(),
            step.description()
        );
    }
    Ok(())
}
