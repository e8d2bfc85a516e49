//! Diabetes Risk Pipeline - Main Entry Point
//!
//! Trains the classifier from the configured dataset, then scores one
//! patient record supplied on the command line.

use anyhow::{Context, Result};
use clap::Parser;
use diabetes_risk_pipeline::{
    config::{AppConfig, LoggingConfig},
    FeatureExtractor, FeatureRecord, LabeledDataset, TrainedModel,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Diabetes risk assessment from eight health measurements
#[derive(Parser, Debug)]
#[command(name = "diabetes-risk", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the dataset path from the configuration
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Number of pregnancies (0-17)
    #[arg(long, default_value_t = 3)]
    pregnancies: u32,

    /// Plasma glucose, mg/dL (0-200)
    #[arg(long, default_value_t = 120)]
    glucose: u32,

    /// Diastolic blood pressure, mm Hg (0-122)
    #[arg(long, default_value_t = 70)]
    blood_pressure: u32,

    /// Triceps skin fold thickness, mm (0-100)
    #[arg(long, default_value_t = 20)]
    skin_thickness: u32,

    /// 2-hour serum insulin, IU/mL (0-846)
    #[arg(long, default_value_t = 79)]
    insulin: u32,

    /// Body mass index (0.0-67.0)
    #[arg(long, default_value_t = 20.0)]
    bmi: f64,

    /// Diabetes pedigree function (0.0-2.4)
    #[arg(long, default_value_t = 0.47)]
    dpf: f64,

    /// Age in years (21-88)
    #[arg(long, default_value_t = 33)]
    age: u32,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,

    /// Log the held-out evaluation report and feature importances
    #[arg(long)]
    report: bool,
}

impl Cli {
    fn raw_record(&self) -> FeatureRecord {
        FeatureRecord {
            pregnancies: self.pregnancies,
            glucose: self.glucose,
            blood_pressure: self.blood_pressure,
            skin_thickness: self.skin_thickness,
            insulin: self.insulin,
            bmi: self.bmi,
            diabetes_pedigree_function: self.dpf,
            age: self.age,
        }
    }

    /// Record as submitted to the pipeline, clamped to the accepted ranges.
    fn record(&self) -> FeatureRecord {
        let (record, adjusted) = self.raw_record().clamped();
        if !adjusted.is_empty() {
            warn!(fields = ?adjusted, "Input clamped to accepted ranges");
        }
        record
    }
}

/// Filter directives used when `RUST_LOG` is unset. Covers the library and
/// this binary, whose events carry the `diabetes_risk` target.
fn default_directives(level: &str) -> String {
    format!("diabetes_risk_pipeline={0},diabetes_risk={0}", level)
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&logging.level)))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load()?,
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = Some(dataset.display().to_string());
    }

    init_tracing(&config.logging)?;
    info!("Starting Diabetes Risk Pipeline");

    let extractor = FeatureExtractor::new();
    info!(
        features = extractor.feature_count(),
        names = ?extractor.feature_names(),
        "Feature extractor initialized"
    );

    // Training happens once, before any record is scored
    let dataset = match &config.dataset.path {
        Some(path) => LabeledDataset::load(path)
            .with_context(|| format!("Cannot start without dataset {}", path))?,
        None => LabeledDataset::bundled().context("Bundled dataset is unreadable")?,
    };
    let model = TrainedModel::train(&dataset, &config.split, &config.model)
        .context("Failed to train risk model")?;

    info!(
        classifier = model.classifier_name(),
        accuracy_percent = format!("{:.2}", model.evaluate()),
        "Model ready"
    );

    if cli.report {
        model.evaluation_report().print_summary();
    }

    let record = cli.record();
    let assessment = model.assess(&record).context("Failed to assess record")?;

    info!(
        assessment_id = %assessment.assessment_id,
        label = %assessment.label,
        high_risk_probability = assessment.high_risk_probability,
        "Assessment complete"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        println!("Analysis Result: {}", assessment.label.summary());
        println!(
            "High-risk probability: {:.2}",
            assessment.high_risk_probability
        );
        println!("Model Accuracy: {:.2}%", assessment.accuracy_percent);
    }

    Ok(())
}
