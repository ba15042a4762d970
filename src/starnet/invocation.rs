//! Building a starnet++ command line from the user's settings

use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;
use crate::domain::Settings;

use super::RunError;

/// Everything needed to spawn starnet++ once
///
/// starnet++ is called as `<tool> <input> <output> <stride>` from its own
/// directory, where it expects the input image and writes the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The executable
    pub program: PathBuf,
    /// Directory the tool runs in; input and output live here
    pub working_dir: PathBuf,
    /// Staged input file name (e.g., "starnetTempInput.tiff")
    pub input_name: String,
    /// Output file name (e.g., "starless.tiff")
    pub output_name: String,
    pub stride: u32,
    /// Image the user picked, copied to `input_name` by `stage_input`
    pub source_image: Option<PathBuf>,
}

impl Invocation {
    /// Build an invocation from a settings snapshot.
    ///
    /// The working directory is the tool's parent directory.
    pub fn from_settings(settings: &Settings, runner: &RunnerConfig) -> Result<Self, RunError> {
        let tool_path = settings.tool_path.trim();
        if tool_path.is_empty() {
            return Err(RunError::ToolNotConfigured);
        }
        let program = PathBuf::from(tool_path);
        if !program.is_file() {
            return Err(RunError::ToolNotFound(program));
        }

        let extension = runner.input_extension.trim_start_matches('.');
        let input_name = file_name(&settings.temp_file_name, extension, "tempFileName")?;
        let output_name = file_name(&settings.output_filename, extension, "outputFilename")?;

        let working_dir = match program.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            program,
            working_dir,
            input_name,
            output_name,
            stride: runner.stride,
            source_image: None,
        })
    }

    pub fn with_source(mut self, image: impl Into<PathBuf>) -> Self {
        self.source_image = Some(image.into());
        self
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Arguments passed to the tool
    pub fn args(&self) -> Vec<String> {
        vec![
            self.input_name.clone(),
            self.output_name.clone(),
            self.stride.to_string(),
        ]
    }

    pub fn input_path(&self) -> PathBuf {
        self.working_dir.join(&self.input_name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_name)
    }

    /// Copy the source image into the working directory under the input name.
    ///
    /// Without a source image the input is expected to be in place already.
    pub async fn stage_input(&self) -> Result<PathBuf, RunError> {
        let target = self.input_path();
        let Some(source) = &self.source_image else {
            if !target.exists() {
                return Err(RunError::InputMissing(target));
            }
            return Ok(target);
        };

        if !source.is_file() {
            return Err(RunError::InputMissing(source.clone()));
        }

        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| RunError::io(&target, e))?;
        tracing::debug!("Staged {} as {}", source.display(), target.display());
        Ok(target)
    }

    /// Remove the staged input, ignoring a file that is already gone
    pub async fn cleanup_input(&self) -> Result<(), RunError> {
        let target = self.input_path();
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RunError::io(&target, e)),
        }
    }
}

/// `<stem>.<extension>`, refusing names that would leave the working directory
fn file_name(stem: &str, extension: &str, setting: &'static str) -> Result<String, RunError> {
    let stem = stem.trim();
    let invalid = stem.is_empty()
        || stem == "."
        || stem == ".."
        || stem.contains(['/', '\\'])
        || Path::new(stem).is_absolute();
    if invalid {
        return Err(RunError::InvalidFileName {
            setting,
            value: stem.to_string(),
        });
    }

    if extension.is_empty() {
        Ok(stem.to_string())
    } else {
        Ok(format!("{}.{}", stem, extension))
    }
}
