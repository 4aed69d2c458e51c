//! Command line: parse → (validate | generate)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use restschema::{
    BoolCoercion, HtmlGenerator, JsonSchemaGenerator, JsonSchemaParser, Property, RamlParser,
    SchemaGenerator, SwaggerGenerator, SwaggerOptions, ValidationReport, Validator,
    ValidatorOptions, ViewGenerator, XsdGenerator, XsdOptions,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON documents against a schema, or project a schema / RAML resource into
/// JSON Schema, XSD, HTML or Swagger
#[derive(Parser, Debug)]
#[command(name = "restschema", version)]
pub struct CommandLineInterface {
    /// log parser and generator decisions to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// normalize a JSON Schema file
    Jsonschema(JsonSchemaOut),
    /// emit an XML Schema for a JSON Schema file
    Xsd(XsdOut),
    /// emit HTML documentation for a JSON Schema file
    Html(HtmlOut),
    /// validate JSON documents against a JSON Schema file
    Validate(ValidateCmd),
    /// document one resource of a RAML file
    Raml(RamlOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaInput {
    /// JSON Schema file
    #[arg(long, short)]
    schema: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct JsonSchemaOut {
    #[command(flatten)]
    input: SchemaInput,

    #[command(flatten)]
    output: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct XsdOut {
    #[command(flatten)]
    input: SchemaInput,

    /// targetNamespace of the generated schema
    #[arg(long, default_value = "urn:restschema")]
    target_namespace: String,

    #[command(flatten)]
    output: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct HtmlOut {
    #[command(flatten)]
    input: SchemaInput,

    #[command(flatten)]
    output: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct ValidateCmd {
    #[command(flatten)]
    input: SchemaInput,

    /// One or more documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    documents: Vec<String>,

    /// only accept JSON booleans for boolean properties, not "true"/"false" strings
    #[arg(long, default_value_t = false)]
    strict_bool: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ViewFormat {
    Swagger,
    Xsd,
    Html,
}

#[derive(clap::Parser, Debug)]
struct RamlOut {
    /// RAML document
    #[arg(long, short)]
    file: PathBuf,

    /// resource path inside the document (e.g. /news/:id)
    #[arg(long, short)]
    path: String,

    #[arg(long, value_enum, default_value_t = ViewFormat::Swagger)]
    format: ViewFormat,

    /// swagger basePath
    #[arg(long, default_value = "/")]
    base_path: String,

    /// swagger apiVersion (defaults to the document's version)
    #[arg(long)]
    api_version: Option<u32>,

    /// xsd targetNamespace
    #[arg(long, default_value = "urn:restschema")]
    target_namespace: String,

    #[command(flatten)]
    output: OutputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaInput {
    fn load(&self) -> Result<Property> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema {}", self.schema.display()))?;
        JsonSchemaParser::parse(&source)
            .with_context(|| format!("failed to parse schema {}", self.schema.display()))
    }
}

impl OutputSettings {
    fn write(&self, contents: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, contents)
                    .with_context(|| format!("failed to write {}", out.display()))
            }
            None => {
                println!("{contents}");
                Ok(())
            }
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Jsonschema(target) => {
                let schema = target.input.load()?;
                target.output.write(&JsonSchemaGenerator.generate(&schema)?)
            }
            Command::Xsd(target) => {
                let schema = target.input.load()?;
                let options = XsdOptions { target_namespace: target.target_namespace.clone() };
                target.output.write(&XsdGenerator::new(options).generate(&schema)?)
            }
            Command::Html(target) => {
                let schema = target.input.load()?;
                target.output.write(&HtmlGenerator.generate(&schema)?)
            }
            Command::Validate(target) => target.run(),
            Command::Raml(target) => {
                let resource = RamlParser::parse_file(&target.file, &target.path)
                    .with_context(|| format!("failed to read {}", target.file.display()))?;
                let view = resource.to_view();
                let output = match target.format {
                    ViewFormat::Swagger => {
                        let options = SwaggerOptions {
                            api_version: target.api_version.unwrap_or(resource.version),
                            base_path: target.base_path.clone(),
                        };
                        SwaggerGenerator::new(options).generate_view(&view)?
                    }
                    ViewFormat::Xsd => {
                        let options = XsdOptions { target_namespace: target.target_namespace.clone() };
                        XsdGenerator::new(options).generate_view(&view)?
                    }
                    ViewFormat::Html => HtmlGenerator.generate_view(&view)?,
                };
                target.output.write(&output)
            }
        }
    }
}

enum Outcome {
    Valid,
    Invalid(ValidationReport),
    Unreadable(anyhow::Error),
}

impl ValidateCmd {
    fn run(&self) -> Result<()> {
        let schema = self.input.load()?;
        let bool_coercion = if self.strict_bool { BoolCoercion::Strict } else { BoolCoercion::Lenient };
        let validator = Validator::new(ValidatorOptions { bool_coercion });
        let paths = resolve_file_path_patterns(&self.documents)?;

        let outcomes: Vec<(PathBuf, Outcome)> = paths
            .into_par_iter()
            .map(|path| {
                let outcome = check_document(&validator, &schema, &path);
                (path, outcome)
            })
            .collect();

        let mut failed = 0usize;
        for (path, outcome) in &outcomes {
            let path = path.display();
            match outcome {
                Outcome::Valid => eprintln!("{} {path}", "PASS".green().bold()),
                Outcome::Invalid(report) => {
                    failed += 1;
                    eprintln!("{} {path}", "FAIL".red().bold());
                    for failure in &report.failures {
                        eprintln!("    {failure}");
                    }
                }
                Outcome::Unreadable(error) => {
                    failed += 1;
                    eprintln!("{} {path}: {error:#}", "ERROR".red().bold());
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} documents failed validation", outcomes.len());
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_document(validator: &Validator, schema: &Property, path: &Path) -> Outcome {
    let value = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .and_then(|source| {
            serde_json::from_str::<serde_json::Value>(&source)
                .with_context(|| format!("failed to parse JSON {}", path.display()))
        });
    match value {
        Err(error) => Outcome::Unreadable(error),
        Ok(value) => match validator.validate(schema, &value) {
            Ok(()) => Outcome::Valid,
            Err(report) => Outcome::Invalid(report),
        },
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched_any = false;
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
            out.push(entry?);
            matched_any = true;
        }
        if !matched_any {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
