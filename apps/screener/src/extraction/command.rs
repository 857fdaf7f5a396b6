//! External OCR engine: runs a configured program per document and reads its stdout.
//!
//! `OCR_COMMAND` is a whitespace-separated command line. `{input}` is replaced by the document
//! path; without a placeholder the path is appended. Example: `tesseract {input} stdout`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{Document, ExtractionError, TextExtractor};

const INPUT_PLACEHOLDER: &str = "{input}";

/// Extensions handed to the external engine.
const COMMAND_EXTENSIONS: &[&str] = &["pdf", "txt", "docx", "png", "jpg", "jpeg", "tif", "tiff"];

#[derive(Debug, Clone)]
pub struct CommandOcrExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandOcrExtractor {
    pub fn parse(command_line: &str) -> Result<Self, ExtractionError> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| ExtractionError::Unavailable("OCR command is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn args_for(&self, input: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(INPUT_PLACEHOLDER, &input))
            .collect();
        if !self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            args.push(input);
        }
        args
    }

    /// Resolves the program the way a shell would: as a path if it has a separator, else via PATH.
    fn resolve_program(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }
        let search_path = std::env::var_os("PATH")?;
        std::env::split_paths(&search_path)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }
}

#[async_trait]
impl TextExtractor for CommandOcrExtractor {
    fn name(&self) -> &'static str {
        "command"
    }

    fn supports(&self, extension: &str) -> bool {
        COMMAND_EXTENSIONS.contains(&extension)
    }

    async fn initialize(&self) -> Result<(), ExtractionError> {
        self.resolve_program().map(|_| ()).ok_or_else(|| {
            ExtractionError::Unavailable(format!("program '{}' not found", self.program))
        })
    }

    async fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        let output = Command::new(&self.program)
            .args(self.args_for(&document.path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractionError::Engine(format!("failed to run '{}': {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Engine(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
