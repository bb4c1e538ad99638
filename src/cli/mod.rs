// CLI module for math-advisor
// Author: kelexine (https://github.com/kelexine)

use crate::error::{AdvisorError, Result};
use crate::solver::{Solver, SOLVE_PROMPT};
use crate::vision::{prepare_image, resolve_mime_type, ImageFormat, UploadedImage};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// math-advisor - upload a photo of a math problem and let Gemini solve it
#[derive(Parser, Debug)]
#[command(name = "math-advisor", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.math-advisor/config.toml)
    #[arg(long, short, global = true, env = "MATH_ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web UI (default)
    Serve {
        /// Address to bind, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overrides `server.port`
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Solve a single image file and print the answer
    Solve {
        /// A jpg, jpeg or png image of the problem
        path: PathBuf,
    },
}

/// Read an image file the way the upload widget would receive it.
pub async fn load_image(path: &Path) -> Result<UploadedImage> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if ImageFormat::from_file_name(&file_name).is_none() {
        return Err(AdvisorError::InvalidRequest(format!(
            "Unsupported file type: {}. Expected jpg, jpeg, or png.",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let mime_type = resolve_mime_type(None, Some(&file_name), &bytes);

    Ok(UploadedImage::new(mime_type, bytes).with_file_name(file_name))
}

/// Package `path`, ask the model once and return the text to print.
pub async fn solve_file(solver: &Solver, path: &Path) -> Result<String> {
    let upload = load_image(path).await?;
    let parts = prepare_image(Some(&upload))
        .ok_or_else(|| AdvisorError::Internal("image packaging produced nothing".to_string()))?;
    Ok(solver.solve_to_text(&parts, SOLVE_PROMPT).await)
}
