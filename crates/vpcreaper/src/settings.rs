//! Settings file + command line merge

use std::time::Duration;
use vpcreaper_cloud::TeardownSettings;
use vpcreaper_config::Settings;

/// Build the teardown settings from the file, with the flag able to switch
/// address release on but never off
pub fn teardown_settings(file: &Settings, release_addresses: bool) -> TeardownSettings {
    let defaults = TeardownSettings::default();
    let ms = |value: Option<u64>, default: Duration| value.map(Duration::from_millis).unwrap_or(default);

    TeardownSettings {
        max_retries: file.retry.max_retries.unwrap_or(defaults.max_retries),
        retry_delay: ms(file.retry.delay_ms, defaults.retry_delay),
        file_system_retries: file
            .file_system_retries
            .unwrap_or(defaults.file_system_retries),
        mount_target_settle: ms(file.settle.mount_targets_ms, defaults.mount_target_settle),
        subnet_settle: ms(file.settle.subnets_ms, defaults.subnet_settle),
        security_group_settle: ms(
            file.settle.security_groups_ms,
            defaults.security_group_settle,
        ),
        release_addresses: release_addresses || file.release_addresses.unwrap_or(false),
    }
}

/// Command line region first, then the file. `None` leaves it to the AWS
/// environment.
pub fn region(flag: Option<String>, file: &Settings) -> Option<String> {
    flag.or_else(|| file.region.clone())
}
