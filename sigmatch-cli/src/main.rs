use clap::Parser;
use serde::{Deserialize, Serialize};
use sigmatch::image::io::{encode_png, load_gray_image};
use sigmatch::{
    Corpus, MatchConfig, MatchOutcome, Matcher, NameIndex, OcrConfig, QualityPolicy, RasterImage,
    ScoreMethod, Scorer, TextRecognizer, VisualStrategy,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

/// Display name reported when text was recognized but matched no known name.
const TEXT_UNMATCHED_NAME: &str = "Text detected, no match";

#[derive(Parser, Debug)]
#[command(author, version, about = "SigMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    StyleRouted,
    Keypoint,
    Template,
    LetterWise,
    StructuralCompact,
    StructuralCanonical,
}

impl From<StrategyConfig> for VisualStrategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::StyleRouted => VisualStrategy::default(),
            StrategyConfig::Keypoint => VisualStrategy::Fixed(Scorer::Keypoint),
            StrategyConfig::Template => VisualStrategy::Fixed(Scorer::template()),
            StrategyConfig::LetterWise => VisualStrategy::Fixed(Scorer::letter_wise()),
            StrategyConfig::StructuralCompact => {
                VisualStrategy::Fixed(Scorer::structural_compact())
            }
            StrategyConfig::StructuralCanonical => {
                VisualStrategy::Fixed(Scorer::structural_canonical())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum QualityConfig {
    InkDensity,
    DescriptorCount,
}

impl From<QualityConfig> for QualityPolicy {
    fn from(value: QualityConfig) -> Self {
        match value {
            QualityConfig::InkDensity => QualityPolicy::ink_density(),
            QualityConfig::DescriptorCount => QualityPolicy::descriptor_count(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    top_k: usize,
    strategy: StrategyConfig,
    quality: QualityConfig,
    parallel: bool,
    deadline_ms: Option<u64>,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            top_k: cfg.top_k,
            strategy: StrategyConfig::StyleRouted,
            quality: QualityConfig::InkDensity,
            parallel: cfg.parallel,
            deadline_ms: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OcrEngine {
    Disabled,
    Tesseract,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OcrConfigJson {
    engine: OcrEngine,
    command: String,
    min_name_ratio: f64,
}

impl Default for OcrConfigJson {
    fn default() -> Self {
        Self {
            engine: OcrEngine::Disabled,
            command: "tesseract".to_string(),
            min_name_ratio: OcrConfig::default().min_name_ratio,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    query_path: String,
    corpus_dir: String,
    names_path: Option<String>,
    output_path: Option<String>,
    ocr: OcrConfigJson,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

/// Runs an external tesseract process on one binarized text line.
struct Tesseract {
    command: String,
}

impl Tesseract {
    fn run(&self, binarized: &RasterImage) -> Result<String, Box<dyn std::error::Error>> {
        // Recognizers expect dark text on a light page.
        let png = encode_png(&binarized.inverted())?;
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "--psm", "7"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(format!("{} exited with {}", self.command, output.status).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextRecognizer for Tesseract {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize_line(&self, binarized: &RasterImage) -> Option<String> {
        match self.run(binarized) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "text recognition failed");
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    name: String,
    score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<ScoreMethod>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Matches {
        top_matches: Vec<MatchRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        rejected: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        unreadable: Vec<String>,
    },
    Error {
        error: String,
    },
}

fn to_output(outcome: MatchOutcome, corpus: &Corpus) -> Output {
    let unreadable = corpus
        .unreadable()
        .iter()
        .map(|item| item.id.clone())
        .collect();
    match outcome {
        MatchOutcome::TextMatched(report) | MatchOutcome::Ranked(report) => Output::Matches {
            top_matches: report
                .matches()
                .iter()
                .map(|m| MatchRecord {
                    name: m.name.clone(),
                    score: m.score,
                    id: Some(m.id.clone()),
                    method: Some(m.method),
                })
                .collect(),
            text: None,
            rejected: report.rejected().to_vec(),
            unreadable,
        },
        MatchOutcome::TextUnmatched { text } => Output::Matches {
            top_matches: vec![MatchRecord {
                name: TEXT_UNMATCHED_NAME.to_string(),
                score: 0.0,
                id: None,
                method: Some(ScoreMethod::TextRecognition),
            }],
            text: Some(text),
            rejected: Vec::new(),
            unreadable,
        },
        MatchOutcome::QualityRejected(verdict) => Output::Error {
            error: verdict.reason(),
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("sigmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.query_path.is_empty() || config.corpus_dir.is_empty() {
        return Err("query_path and corpus_dir must be set in the config".into());
    }
    if config.match_cfg.top_k == 0 {
        return Err("top_k must be at least 1".into());
    }

    let query = load_gray_image(&config.query_path)?;
    let corpus = Corpus::load_dir(&config.corpus_dir)?;
    let names = match &config.names_path {
        Some(path) => NameIndex::load(path)?,
        None => NameIndex::new(),
    };

    let defaults = MatchConfig::default();
    let mut matcher = Matcher::new().with_config(MatchConfig {
        top_k: config.match_cfg.top_k,
        strategy: config.match_cfg.strategy.into(),
        quality: config.match_cfg.quality.into(),
        ocr: OcrConfig {
            min_name_ratio: config.ocr.min_name_ratio,
            ..defaults.ocr
        },
        parallel: config.match_cfg.parallel,
        deadline: config.match_cfg.deadline_ms.map(Duration::from_millis),
        ..defaults
    });
    if let OcrEngine::Tesseract = config.ocr.engine {
        matcher = matcher.with_recognizer(Box::new(Tesseract {
            command: config.ocr.command,
        }));
    }

    let outcome = matcher.identify(&query, &corpus, &names)?;
    let output = to_output(outcome, &corpus);
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
