use crate::config::ImageSettings;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CONTAINERFILE: &str = "Containerfile";

/// A staged one-shot image build directory: a rendered Containerfile next
/// to the unit artifacts it copies in. The directory is removed when the
/// value drops, whether or not the build succeeded.
#[derive(Debug)]
pub struct BuildContext {
    dir: TempDir,
    containerfile: PathBuf,
}

impl BuildContext {
    /// Stages a context for a run-to-completion unit defined by inline
    /// artifact text.
    pub fn for_main_unit(settings: &ImageSettings, unit_name: &str, artifact: &str) -> Result<Self> {
        let dir = TempDir::new().context("creating build context directory")?;

        let file_name = format!("{unit_name}.unit");
        fs::write(dir.path().join(&file_name), artifact)
            .with_context(|| format!("writing {file_name}"))?;

        let containerfile = render_main_containerfile(settings, &file_name);
        Self::finish(dir, &containerfile)
    }

    /// Stages a context for a long-running service unit built from
    /// pre-packaged files. Paths must already be validated by the caller.
    pub fn for_service_unit(settings: &ImageSettings, packages: &[PathBuf]) -> Result<Self> {
        let dir = TempDir::new().context("creating build context directory")?;

        let mut file_names = Vec::with_capacity(packages.len());
        for package in packages {
            let Some(file_name) = package.file_name() else {
                bail!("package path {:?} has no file name", package);
            };
            fs::copy(package, dir.path().join(file_name))
                .with_context(|| format!("copying package {:?}", package))?;
            file_names.push(file_name.to_string_lossy().into_owned());
        }

        let containerfile = render_service_containerfile(settings, &file_names);
        Self::finish(dir, &containerfile)
    }

    fn finish(dir: TempDir, containerfile: &str) -> Result<Self> {
        let path = dir.path().join(CONTAINERFILE);
        fs::write(&path, containerfile).context("writing Containerfile")?;
        Ok(Self {
            dir,
            containerfile: path,
        })
    }

    pub fn containerfile(&self) -> &Path {
        &self.containerfile
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

fn render_main_containerfile(settings: &ImageSettings, file_name: &str) -> String {
    format!(
        "FROM {base}\nCOPY {file} {dir}/\nCMD [\"{cmd}\", \"run\", \"{dir}/{file}\"]\n",
        base = settings.base_image,
        file = file_name,
        dir = settings.install_dir,
        cmd = settings.run_command,
    )
}

fn render_service_containerfile(settings: &ImageSettings, file_names: &[String]) -> String {
    let mut lines = vec![format!("FROM {}", settings.base_image)];
    for file_name in file_names {
        lines.push(format!("COPY {} {}/", file_name, settings.install_dir));
    }
    lines.push(format!(
        "CMD [\"{}\", \"serve\", \"{}\"]",
        settings.run_command, settings.install_dir
    ));
    lines.push(String::new());
    lines.join("\n")
}
