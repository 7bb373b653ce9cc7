// src/cli.rs
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::{FsOps, ResumeProcessor, TemplateStore};
use crate::error::FormatterError;
use crate::types::{Artifact, ArtifactKind, ResumeUpload};
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "resume-formatter")]
#[command(about = "Turn PDF resumes into HTML documents via a processing endpoint")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Template directory (overrides configuration)
    #[arg(long, global = true)]
    pub templates_dir: Option<PathBuf>,

    /// Processing endpoint URL (overrides configuration)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        address: IpAddr,
    },
    /// Manage stored templates
    #[command(subcommand)]
    Templates(TemplateCommand),
    /// Process one resume and write the HTML, JSON and base64 artifacts
    Process(ProcessArgs),
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List available templates
    List,
    /// Print a template
    Show { name: String },
    /// Store a template from a local file
    Save {
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Preview the templates inside a ZIP archive, optionally saving them
    Import {
        archive: PathBuf,
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
pub struct ProcessArgs {
    /// PDF resume to submit
    pub resume: PathBuf,

    /// Stored template name
    #[arg(long, conflicts_with = "template_file", required_unless_present = "template_file")]
    pub template: Option<String>,

    /// Template read straight from a file
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    /// Where artifacts are written (defaults to the configured output path)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = &self.templates_dir {
            config = config.with_templates_dir(dir.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        config
    }
}

pub async fn handle_command(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Serve { port, address } => start_web_server(config, address, port).await,
        Command::Templates(command) => handle_template_command(command, &config).await,
        Command::Process(args) => {
            let written = process_resume(args, &config).await?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

async fn handle_template_command(command: TemplateCommand, config: &AppConfig) -> Result<()> {
    let store = TemplateStore::new(config.paths.templates_path.clone());

    match command {
        TemplateCommand::List => {
            let batch = store.load_all().await?;
            if batch.templates.is_empty() {
                println!("No templates in {}", store.dir().display());
            }
            for name in batch.templates.keys() {
                println!("{}", name);
            }
            for failure in &batch.failures {
                eprintln!("skipped {}: {}", failure.name, failure.error);
            }
        }

        TemplateCommand::Show { name } => {
            print!("{}", store.load(&name).await?);
        }

        TemplateCommand::Save { name, file } => {
            let content = FsOps::read_file_safe(&file).await?;
            let path = store.save(&name, &content).await?;
            println!("Saved {}", path.display());
        }

        TemplateCommand::Import { archive, save } => {
            let bytes = FsOps::read_bytes(&archive).await?;
            let batch = TemplateStore::extract_from_archive(&bytes);

            for failure in &batch.failures {
                eprintln!("skipped {}: {}", failure.name, failure.error);
            }
            if batch.templates.is_empty() {
                bail!("No templates found in {}", archive.display());
            }

            println!("Found {} templates:", batch.templates.len());
            for name in batch.templates.keys() {
                println!("  {}", name);
            }

            if save {
                let summary = store.save_all(&batch.templates).await;
                println!("Saved {} templates to {}", summary.saved.len(), store.dir().display());
                for failure in &summary.failures {
                    eprintln!("failed {}: {}", failure.name, failure.error);
                }
            } else {
                println!("Run again with --save to store them");
            }
        }
    }

    Ok(())
}

/// Run the pipeline for one resume file; returns the artifact paths
pub async fn process_resume(args: ProcessArgs, config: &AppConfig) -> Result<Vec<PathBuf>> {
    if !FsOps::has_extension(&args.resume, &["pdf"]) {
        warn!("{} does not look like a PDF", args.resume.display());
    }

    let template = match (&args.template, &args.template_file) {
        (_, Some(path)) => FsOps::read_file_safe(path).await?,
        (Some(name), None) => {
            TemplateStore::new(config.paths.templates_path.clone())
                .load(name)
                .await?
        }
        (None, None) => bail!("Either --template or --template-file is required"),
    };
    if template.trim().is_empty() {
        return Err(FormatterError::MissingInput("no template selected").into());
    }

    let filename = file_name_of(&args.resume)?;
    let bytes = FsOps::read_bytes(&args.resume).await?;
    let upload = ResumeUpload::new(filename, bytes);

    let processor = ResumeProcessor::new(&config.service, config.render)?;
    info!("Submitting {} to {}", upload.filename, processor.endpoint());
    let outcome = processor.process(&upload, &template).await?;

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.paths.output_path.clone());
    FsOps::ensure_dir_exists(&out_dir).await?;

    let mut written = Vec::with_capacity(ArtifactKind::ALL.len());
    for kind in ArtifactKind::ALL {
        let artifact = Artifact::build(kind, &upload, &outcome)?;
        let path = out_dir.join(&artifact.file_name);
        FsOps::write_file_safe(&path, artifact.content).await?;
        written.push(path);
    }

    Ok(written)
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("Invalid resume path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(dir: &Path, endpoint: Option<String>) -> AppConfig {
        let config = AppConfig::load_from(dir, |_: &str| None::<String>).unwrap();
        match endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        }
    }

    #[test]
    fn test_parse_process_command() {
        let cli = Cli::try_parse_from([
            "resume-formatter",
            "--endpoint",
            "http://localhost:9000/score",
            "process",
            "cv.pdf",
            "--template",
            "modern",
        ])
        .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:9000/score"));
        match cli.command {
            Command::Process(args) => {
                assert_eq!(args.resume, PathBuf::from("cv.pdf"));
                assert_eq!(args.template.as_deref(), Some("modern"));
                assert!(args.out_dir.is_none());
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_process_requires_a_template_source() {
        assert!(Cli::try_parse_from(["resume-formatter", "process", "cv.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "resume-formatter",
            "process",
            "cv.pdf",
            "--template",
            "a",
            "--template-file",
            "b.html",
        ])
        .is_err());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "resume-formatter",
            "templates",
            "list",
            "--templates-dir",
            "/srv/templates",
        ])
        .unwrap();

        let config = cli.apply_overrides(config(dir.path(), None));
        assert_eq!(config.paths.templates_path, PathBuf::from("/srv/templates"));
        assert!(!config.endpoint_configured());
    }

    #[tokio::test]
    async fn test_process_writes_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let resume = dir.path().join("alice.pdf");
        let template = dir.path().join("t.html");
        std::fs::write(&resume, b"%PDF").unwrap();
        std::fs::write(&template, "<p>{{ name }}</p>").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/score")
            .match_body(Matcher::Json(json!({
                "resume_filename": "alice.pdf",
                "resume_base64_encoded": "JVBERg==",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"name": "Alice"}}"#)
            .create_async()
            .await;
        let url = format!("{}/score", server.url());
        let out_dir = dir.path().join("out");
        let args = ProcessArgs {
            resume,
            template: None,
            template_file: Some(template),
            out_dir: Some(out_dir.clone()),
        };

        let written = process_resume(args, &config(dir.path(), Some(url)))
            .await
            .unwrap();

        assert_eq!(
            written,
            vec![
                out_dir.join("alice_formatted.html"),
                out_dir.join("alice_data.json"),
                out_dir.join("alice_base64.txt"),
            ]
        );
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "<p>Alice</p>");
        assert_eq!(std::fs::read_to_string(&written[2]).unwrap(), "JVBERg==");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_process_with_blank_template_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let resume = dir.path().join("cv.pdf");
        std::fs::write(&resume, b"%PDF").unwrap();
        let template = dir.path().join("t.html");
        std::fs::write(&template, "  \n").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data": {}}"#)
            .expect(0)
            .create_async()
            .await;

        let out_dir = dir.path().join("out");
        let args = ProcessArgs {
            resume,
            template: None,
            template_file: Some(template),
            out_dir: Some(out_dir.clone()),
        };

        let err = process_resume(args, &config(dir.path(), Some(server.url())))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatterError>(),
            Some(FormatterError::MissingInput(_))
        ));
        assert!(!out_dir.exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_process_without_endpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let resume = dir.path().join("cv.pdf");
        std::fs::write(&resume, b"%PDF").unwrap();
        let template = dir.path().join("t.html");
        std::fs::write(&template, "x").unwrap();

        let args = ProcessArgs {
            resume,
            template: None,
            template_file: Some(template),
            out_dir: None,
        };

        let err = process_resume(args, &config(dir.path(), None)).await.unwrap_err();
        assert!(err.to_string().contains("API endpoint"));
    }
}
