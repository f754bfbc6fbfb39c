//! Handlers of the `create` and `validate` subcommands

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    builder::ThingId,
    collect,
    prompt::{Prompter, TerminalPrompter},
    thing::Thing,
    validate::{self, Summary},
};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the Thing Description JSON file.
    pub file: PathBuf,
}

/// Execute `create` on the process terminal.
pub fn run_create(cwd: &Path) -> Result<PathBuf> {
    let mut prompter = TerminalPrompter::stdio()?;
    create(&mut prompter, cwd)
}

/// Ask for the device details, then write the TD under `cwd`.
///
/// Returns the path of the written file, an existing file is replaced.
pub fn create<P: Prompter>(prompter: &mut P, cwd: &Path) -> Result<PathBuf> {
    prompter.say("\n🌐 Welcome to TD Generator!\n")?;
    prompter.say(
        "This tool will help you create a Thing Description file for your Web of Things device.\n",
    )?;

    let answers = collect::questionnaire(prompter)?;
    let title = answers.device.title.clone();
    let thing = answers.into_thing(ThingId::generate(&title))?;

    let path = cwd.join(collect::filename(prompter, &title)?);
    write_thing(&path, &thing)?;

    prompter.say("\n✅ Thing Description created successfully!\n")?;
    prompter.say(&format!("📄 File saved to: {}\n", path.display()))?;
    prompter.say("You can now use this TD file with Web of Things clients and platforms.\n")?;
    Ok(path)
}

/// Write `thing` as pretty printed JSON, replacing `path` atomically.
///
/// A replaced file keeps its permissions, a new one is readable by everyone.
pub fn write_thing(path: &Path, thing: &Thing) -> Result<()> {
    let json = serde_json::to_string_pretty(thing).context("Failed to serialize the TD")?;

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        file.as_file()
            .set_permissions(permissions)
            .with_context(|| format!("Failed to set permissions on {}", file.path().display()))?;
    }
    file.persist(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    info!(path = %path.display(), bytes = json.len(), "TD written");
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

/// Execute `validate`, resolving the file against `cwd`.
pub fn run_validate(args: &ValidateArgs, cwd: &Path) -> Result<Summary, validate::Error> {
    let path = cwd.join(&args.file);
    info!(path = %path.display(), "validating TD");
    validate::validate_file(&path)
}
