use clap::{Parser, Subcommand};
use obesity_core::config::bmi_rounding_from_env_value;
use obesity_core::constants::{BMI_ROUNDING_ENV, MODEL_INFO_PATH_ENV, MODEL_PATH_ENV};
use obesity_core::{
    BmiCalculator, CoreConfig, ModelInfo, ModelLoader, ObesityClass, PatientProfile,
    RecommendationSet, RiskPipeline, CLINICAL_DISCLAIMER,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "obesity")]
#[command(about = "Obesity risk assessment CLI")]
struct Cli {
    /// Model artifact path (falls back to OBESITY_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<String>,
    /// Model metadata sidecar path (falls back to OBESITY_MODEL_INFO_PATH)
    #[arg(long, global = true)]
    model_info: Option<String>,
    /// BMI rounding mode: exact or ceiling (falls back to OBESITY_BMI_ROUNDING)
    #[arg(long, global = true)]
    bmi_rounding: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute body mass index
    Bmi {
        /// Weight in kilograms
        weight: f64,
        /// Height in metres
        height: f64,
    },
    /// Print the canonical feature vector for a profile
    Encode {
        /// Patient profile JSON file
        #[arg(long)]
        profile: PathBuf,
    },
    /// Assess a profile with the configured model
    Predict {
        /// Patient profile JSON file
        #[arg(long)]
        profile: PathBuf,
    },
    /// List the weight classes in severity order
    Classes,
    /// Print the model metadata sidecar
    ModelInfo,
}

impl Cli {
    fn config(&self) -> Result<CoreConfig, Box<dyn std::error::Error>> {
        Ok(CoreConfig::from_values(
            self.model.clone().or_else(|| std::env::var(MODEL_PATH_ENV).ok()),
            self.model_info
                .clone()
                .or_else(|| std::env::var(MODEL_INFO_PATH_ENV).ok()),
            self.bmi_rounding
                .clone()
                .or_else(|| std::env::var(BMI_ROUNDING_ENV).ok()),
        )?)
    }
}

fn read_profile(path: &Path) -> Result<PatientProfile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read profile {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&contents)
        .map_err(|e| format!("invalid profile {}: {}", path.display(), e))?)
}

fn load_pipeline(cfg: &CoreConfig) -> Result<RiskPipeline, Box<dyn std::error::Error>> {
    let model = cfg.model_loader().load()?;
    Ok(RiskPipeline::new(Arc::new(model), cfg.bmi_rounding()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("obesity_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Bmi { weight, height }) => {
            let rounding = bmi_rounding_from_env_value(
                cli.bmi_rounding
                    .clone()
                    .or_else(|| std::env::var(BMI_ROUNDING_ENV).ok()),
            )?;
            let bmi = BmiCalculator::new(rounding).compute(*weight, *height)?;
            println!("BMI: {:.2} ({})", bmi, rounding);
        }
        Some(Commands::Encode { profile }) => {
            let cfg = cli.config()?;
            let profile = read_profile(profile)?;
            let encoder = obesity_core::FeatureEncoder::new(BmiCalculator::new(cfg.bmi_rounding()));
            let features = encoder.encode(&profile)?;
            println!("{}", serde_json::to_string_pretty(&features)?);
        }
        Some(Commands::Predict { profile }) => {
            let cfg = cli.config()?;
            let profile = read_profile(profile)?;
            let pipeline = load_pipeline(&cfg)?;
            let assessment = pipeline.assess(&profile)?;
            let result = &assessment.result;

            println!("BMI: {:.2}", assessment.bmi);
            println!("Class: {} ({})", result.label, result.tier);
            println!("{}", result.description);
            println!();
            println!("Most likely:");
            for ranked in result.top(3) {
                println!("  {:<22} {:>6.1}%", ranked.class, ranked.probability * 100.0);
            }
            if let Some(warning) = result.consistency_warning {
                println!();
                println!(
                    "Warning: classifier predicted {} but {} is most probable",
                    warning.predicted, warning.most_probable
                );
            }
            println!();
            println!("{}", RecommendationSet::for_tier(result.tier).headline);
            for item in result.recommendations {
                println!("  - {}", item);
            }
            println!();
            println!("{}", CLINICAL_DISCLAIMER);
        }
        Some(Commands::Classes) => {
            for class in ObesityClass::all() {
                let entry = class.entry();
                println!(
                    "{} {:<20} {:<14} {}",
                    entry.rank, entry.label, entry.tier, entry.description
                );
            }
        }
        Some(Commands::ModelInfo) => {
            let cfg = cli.config()?;
            match cfg.model_info_path().and_then(ModelInfo::load_optional) {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => println!("No model metadata found."),
            }
        }
        None => {
            println!("No command provided. Use --help for usage.");
        }
    }

    Ok(())
}
