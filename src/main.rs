//! ab2st - Automation Basic to Structured Text converter

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::Path;

use ab2st::{convert_path, parse_args, ChangeLog, CliArgs, Config, Result};

fn main() -> Result<()> {
    let args = parse_args();
    let config = build_config(&args)?;

    let mut log = ChangeLog::new(!args.silent);
    let outcome = convert_path(&args.path, &config, &args.exclude, &mut log);
    if let Err(e) = &outcome {
        log.error(format!("{e:#}"));
    }

    if let Some(log_file) = &args.log_file {
        log.write_to(log_file)?;
    }

    outcome.map(|_| ())
}

/// Build configuration from CLI args and optional config file
///
/// Without `--config`, config files are discovered from the ancestors of the
/// target path. `--no-<pass>` switches are applied on top.
fn build_config(args: &CliArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else {
        if args.debug {
            print_discovered(&args.path);
        }
        Config::from_discovered_files(&args.path)
    };

    for kind in &args.disabled {
        config.passes.set(*kind, false);
    }

    if args.debug {
        print_config_debug(&config);
    }

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

fn print_discovered(path: &Path) {
    let discovered = Config::discover_config_files(path);
    if discovered.is_empty() {
        eprintln!("[DEBUG] No config files discovered for: {}", path.display());
    } else {
        eprintln!("[DEBUG] Discovered config files for {}:", path.display());
        for f in &discovered {
            eprintln!("[DEBUG]   - {}", f.display());
        }
    }
}

/// Print configuration values in debug mode
fn print_config_debug(config: &Config) {
    eprintln!("[DEBUG] Configuration:");
    let disabled = config.passes.disabled();
    if disabled.is_empty() {
        eprintln!("[DEBUG]   passes: all enabled");
    } else {
        let names: Vec<&str> = disabled.iter().map(|k| k.key()).collect();
        eprintln!("[DEBUG]   disabled passes: {}", names.join(", "));
    }
    let tables = &config.tables;
    eprintln!("[DEBUG]   manual_fixes: {}", tables.manual_fixes.len());
    eprintln!(
        "[DEBUG]   keyword_replacements: {}",
        tables.keyword_replacements.len()
    );
    eprintln!(
        "[DEBUG]   ignore_equals_pairs: {}",
        tables
            .ignore_equals_pairs
            .iter()
            .map(|p| format!("{}..{}", p.start, p.end))
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!(
        "[DEBUG]   ignore_semicolon_keywords: {}",
        tables.ignore_semicolon_keywords.join(" ")
    );
    eprintln!("[DEBUG]   uppercase: {} words", tables.uppercase.len());
    eprintln!("[DEBUG]   adr_functions: {}", tables.adr_functions.join(" "));
    eprintln!(
        "[DEBUG]   descriptor_files: {}",
        tables.descriptor_files.join(", ")
    );
    eprintln!(
        "[DEBUG]   declaration_extensions: {}",
        tables.declaration_extensions.join(", ")
    );
}
