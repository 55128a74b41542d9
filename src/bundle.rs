use anyhow::{Context, Result};
use std::ffi;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BundleConfig;

const BUNDLE_EXTENSION: &str = "zip";
const CONFIGURATION_SUFFIX: &str = "-config";

pub struct InstallationEntry {
    pub name: String,
    pub bundle: PathBuf,
    pub configuration: Option<PathBuf>,
}

impl From<&BundleConfig> for InstallationEntry {
    fn from(config: &BundleConfig) -> Self {
        InstallationEntry {
            name: config.name.clone(),
            bundle: config.bundle.clone(),
            configuration: config.configuration.clone(),
        }
    }
}

pub fn discover(bundle_dir: &Path) -> Result<Vec<InstallationEntry>> {
    let mut entries = Vec::new();
    if !bundle_dir.exists() {
        return Ok(entries);
    }

    for dir_entry in WalkDir::new(bundle_dir).into_iter() {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if path.is_dir() || path.extension() != Some(ffi::OsStr::new(BUNDLE_EXTENSION)) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.ends_with(CONFIGURATION_SUFFIX) {
            continue;
        }

        let configuration =
            path.with_file_name(format!("{stem}{CONFIGURATION_SUFFIX}.{BUNDLE_EXTENSION}"));
        entries.push(InstallationEntry {
            name: stem.to_string(),
            bundle: path.to_path_buf(),
            configuration: configuration.exists().then_some(configuration),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn render_script(entries: &[InstallationEntry], base: &Path, conduct_command: &str) -> String {
    let mut script = String::from("#!/usr/bin/env bash\nset -e\n\ncd \"$(dirname \"$0\")\"\n");

    for entry in entries {
        let variable = shell_variable(&entry.name);
        let bundle = relative_to(&entry.bundle, base);

        script.push('\n');
        match &entry.configuration {
            Some(configuration) => {
                let configuration = relative_to(configuration, base);
                script.push_str(&format!(
                    "{variable}=$({conduct_command} load -q {bundle} {configuration})\n"
                ));
            }
            None => {
                script.push_str(&format!("{variable}=$({conduct_command} load -q {bundle})\n"));
            }
        }
        script.push_str(&format!("{conduct_command} run \"${{{variable}}}\"\n"));
    }

    script.push_str(&format!("\n{conduct_command} info\n"));
    script
}

pub fn write_script(path: &Path, script: &str) -> Result<()> {
    fs::write(path, script)
        .with_context(|| format!("Failed to write script to {}", path.display()))?;

    // the script has to be runnable as-is
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for {}", path.display()))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set permissions for {}", path.display()))?;
    }

    Ok(())
}

pub fn shell_variable(name: &str) -> String {
    let mut variable: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    if variable.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        variable.insert(0, '_');
    }
    variable
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
