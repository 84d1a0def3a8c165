pub(crate) mod mesh;
pub(crate) mod utils;

use anyhow::Result;
use log::{debug, warn};
use mesh::obj;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use walkdir::WalkDir;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "hm_asset")]
struct CliArgs {
    #[structopt(subcommand)]
    command: Command,
    /// Output debug info
    #[structopt(short = "v", long = "verbose", global = true)]
    verbose: bool,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Converts every `.obj` file below the input folder into binary meshes
    Convert {
        /// Specify the input folder
        input: PathBuf,
        /// Output directory, to place the converted files in
        #[structopt(short = "o", long = "output")]
        output: PathBuf,
    },
    /// Decodes all input files and writes their objects into one `.obj` file
    Merge {
        /// Files to merge
        #[structopt(required = true)]
        inputs: Vec<PathBuf>,
        /// Merged output file
        #[structopt(short = "o", long = "output")]
        output: PathBuf,
    },
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Input path does not exist: {0}")]
    InputNonExistant(String),
    #[error("Output folder structure could not be created: {0}")]
    ErrorCreatingOutputStructure(#[from] io::Error),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    match args.command {
        Command::Convert { input, output } => convert(&input, &output),
        Command::Merge { inputs, output } => merge(&inputs, &output),
    }
}

fn convert(input_path: &Path, output_path: &Path) -> Result<()> {
    if !input_path.is_dir() {
        return Err(CliError::InputNonExistant(input_path.display().to_string()).into());
    }

    for entry in WalkDir::new(input_path) {
        let path = match &entry {
            Err(err) => {
                warn!("Error parsing path: {}", err);
                continue;
            }
            Ok(entry) => entry.path(),
        };

        if path.is_dir() {
            continue;
        }

        let output = output_path.join(path.strip_prefix(input_path)?);

        // creating the output folder of the input file in the same structure
        let local_output_folder = output.parent().unwrap_or(output_path);
        if !local_output_folder.exists() {
            fs::create_dir_all(&local_output_folder)
                .map_err(CliError::ErrorCreatingOutputStructure)?;
        }

        // check extension
        if let Some(Some(extension)) = path.extension().map(|x| x.to_str()) {
            match extension.to_ascii_lowercase().as_ref() {
                "obj" => obj::process(path, local_output_folder)?,
                "toml" => debug!("Ignored toml file: {}", &path.display()),
                _ => warn!("Could not handle path: {}", &path.display()),
            }
        } else {
            warn!(
                "Ignored file \"{}\", because no file extension was found.",
                path.display()
            );
        }
    }

    Ok(())
}

fn merge(inputs: &[PathBuf], output: &Path) -> Result<()> {
    if let Some(missing) = inputs.iter().find(|path| !path.is_file()) {
        return Err(CliError::InputNonExistant(missing.display().to_string()).into());
    }

    if let Some(folder) = output.parent() {
        if !folder.as_os_str().is_empty() && !folder.exists() {
            fs::create_dir_all(folder).map_err(CliError::ErrorCreatingOutputStructure)?;
        }
    }

    let inputs: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
    obj::merge(&inputs, output)
}
