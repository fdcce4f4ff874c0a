//! Download the jar-backed emulator binaries into the local cache.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::cli::SetupArgs;
use crate::emulator::binaries::{self, JarSpec};
use crate::emulator::EmulatorKind;
use crate::paths;

pub async fn cmd_setup(args: SetupArgs) -> Result<()> {
    let cache_dir = paths::emulator_cache_dir();
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("creating cache directory {}", cache_dir.display()))?;

    let client = reqwest::Client::new();
    for kind in EmulatorKind::ALL {
        let Some(spec) = binaries::spec_for(kind) else {
            continue;
        };

        prune_outdated(&cache_dir, &spec)?;

        let dest = spec.local_path();
        if dest.exists() && !args.force {
            println!("  ✓ {} already cached", spec.file_name());
            continue;
        }

        download(&client, &spec, &dest).await?;
        println!("  ✓ Downloaded {}", spec.file_name());
    }

    println!("\nEmulator binaries ready in {}", cache_dir.display());
    Ok(())
}

async fn download(client: &reqwest::Client, spec: &JarSpec, dest: &Path) -> Result<()> {
    info!(url = spec.remote_url, "downloading emulator binary");
    let response = client
        .get(spec.remote_url)
        .send()
        .await
        .with_context(|| format!("fetching {}", spec.remote_url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", spec.remote_url))?;
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("reading {}", spec.remote_url))?;

    // Write to a temp name first so an interrupted download never leaves a
    // truncated jar at the expected path.
    let partial = dest.with_extension("jar.partial");
    std::fs::write(&partial, &bytes)
        .with_context(|| format!("writing {}", partial.display()))?;
    std::fs::rename(&partial, dest)
        .with_context(|| format!("moving {} into place", dest.display()))?;
    Ok(())
}

/// Remove cached jars for this emulator at other versions.
fn prune_outdated(cache_dir: &Path, spec: &JarSpec) -> Result<()> {
    let current = spec.file_name();
    for entry in std::fs::read_dir(cache_dir)
        .with_context(|| format!("listing {}", cache_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(spec.name_prefix) && name != current {
            info!(file = %name, "removing outdated emulator binary");
            std::fs::remove_file(entry.path())
                .with_context(|| format!("removing {}", entry.path().display()))?;
        }
    }
    Ok(())
}
