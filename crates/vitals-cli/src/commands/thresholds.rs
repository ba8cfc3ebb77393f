use vitals_core::ThresholdConfig;

/// Print the default thresholds as a `[thresholds]` table.
pub fn print_defaults() -> anyhow::Result<()> {
    let defaults = ThresholdConfig::default();
    let table = toml::to_string_pretty(&defaults)?;
    println!("[thresholds]\n{table}");
    Ok(())
}
