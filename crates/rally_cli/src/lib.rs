//! Rally CLI Library
//!
//! File I/O around the JSON API: read a request, pick a config profile and
//! id generator, run the engine, write the result.

use anyhow::{Context, Result};
use rally_core::engine::{
    AnalysisTracer, IdGenerator, LogTracer, NoopTracer, SeededIdGenerator, UuidIdGenerator,
};
use rally_core::EngineConfig;
use std::fs;
use std::path::Path;

/// Seeded ids when a seed is given, random UUIDs otherwise.
pub fn id_generator(seed: Option<u64>) -> Box<dyn IdGenerator> {
    match seed {
        Some(seed) => Box::new(SeededIdGenerator::new(seed)),
        None => Box::new(UuidIdGenerator),
    }
}

/// `--trace` forwards pipeline events to the log at debug level.
pub fn tracer(trace: bool) -> Box<dyn AnalysisTracer> {
    if trace {
        Box::new(LogTracer)
    } else {
        Box::new(NoopTracer)
    }
}

/// A config file wins over a named profile; with neither,
/// `RALLY_ENGINE_PROFILE` decides.
pub fn load_config(profile: Option<&str>, config_file: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = config_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        return EngineConfig::from_json(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()));
    }
    Ok(match profile {
        Some(name) => EngineConfig::from_profile(name),
        None => EngineConfig::from_env_or_default(),
    })
}

fn read_request(input: &Path) -> Result<String> {
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read request file: {}", input.display()))
}

fn prettify(json: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Failed to re-parse result")?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Analyzes the rally request in `input`; writes to `output` when given and
/// always returns the JSON text.
pub fn run_analyze(
    input: &Path,
    output: Option<&Path>,
    config: &EngineConfig,
    seed: Option<u64>,
    pretty: bool,
    trace: bool,
) -> Result<String> {
    let request = read_request(input)?;
    let mut ids = id_generator(seed);
    let mut json = rally_core::analyze_rally_json(&request, config, ids.as_mut(), tracer(trace))
        .with_context(|| format!("Failed to analyze {}", input.display()))?;
    if pretty {
        json = prettify(&json)?;
    }

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
        fs::write(path, &json)
            .with_context(|| format!("Failed to write result: {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = json.len(), "result written");
    }
    Ok(json)
}

/// Single-shot query from a request file.
pub fn run_shot(
    input: &Path,
    config: &EngineConfig,
    seed: Option<u64>,
    trace: bool,
) -> Result<String> {
    let request = read_request(input)?;
    let mut ids = id_generator(seed);
    let json = rally_core::recommend_shot_json(&request, config, ids.as_mut(), tracer(trace))
        .with_context(|| format!("Failed to query shot from {}", input.display()))?;
    prettify(&json)
}

pub fn run_schema() -> Result<String> {
    let schema = rally_core::analysis_result_schema()?;
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn request_file(body: &serde_json::Value) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(body.to_string().as_bytes())?;
        Ok(file)
    }

    fn rally() -> serde_json::Value {
        serde_json::json!({
            "sessionId": "cli",
            "trajectory": [
                {"x": 0.50, "y": 0.10, "timestamp": 0.0},
                {"x": 0.55, "y": 0.40, "timestamp": 300.0},
                {"x": 0.60, "y": 0.80, "timestamp": 600.0},
                {"x": 0.62, "y": 0.92, "timestamp": 750.0},
                {"x": 0.55, "y": 0.45, "timestamp": 950.0},
                {"x": 0.45, "y": 0.10, "timestamp": 1150.0}
            ]
        })
    }

    #[test]
    fn test_analyze_writes_output() -> Result<()> {
        let input = request_file(&rally())?;
        let dir = tempdir()?;
        let out = dir.path().join("nested").join("result.json");

        let config = EngineConfig::default();
        let json = run_analyze(input.path(), Some(&out), &config, Some(1), true, false)?;
        let written = fs::read_to_string(&out)?;
        assert_eq!(json, written);

        let value: serde_json::Value = serde_json::from_str(&written)?;
        assert_eq!(value["sessionId"], "cli");
        assert!(written.contains('\n'));
        Ok(())
    }

    #[test]
    fn test_seeded_runs_share_ids() -> Result<()> {
        let input = request_file(&rally())?;
        let config = EngineConfig::default();
        let a = run_analyze(input.path(), None, &config, Some(42), false, false)?;
        // Tracing does not change the result.
        let b = run_analyze(input.path(), None, &config, Some(42), false, true)?;
        let a: serde_json::Value = serde_json::from_str(&a)?;
        let b: serde_json::Value = serde_json::from_str(&b)?;
        assert_eq!(a["rallyId"], b["rallyId"]);
        assert_eq!(a["shots"], b["shots"]);
        Ok(())
    }

    #[test]
    fn test_missing_file_reports_path() {
        let config = EngineConfig::default();
        let missing = Path::new("/nonexistent/rally.json");
        let err = run_analyze(missing, None, &config, None, false, false).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rally.json"));
    }

    #[test]
    fn test_invalid_request_is_an_error() -> Result<()> {
        let mut body = rally();
        body["trajectory"][0]["y"] = serde_json::json!(-0.2);
        let input = request_file(&body)?;
        let config = EngineConfig::default();
        assert!(run_analyze(input.path(), None, &config, None, false, false).is_err());
        Ok(())
    }

    #[test]
    fn test_shot_query() -> Result<()> {
        let body = serde_json::json!({"trajectory": rally()["trajectory"].clone(), "shotIndex": 0});
        let input = request_file(&body)?;
        let config = EngineConfig::default();
        let value: serde_json::Value =
            serde_json::from_str(&run_shot(input.path(), &config, Some(3), true)?)?;
        assert_eq!(value["recommendations"].as_array().map(Vec::len), Some(3));

        let trajectory = rally()["trajectory"].clone();
        let input = request_file(&serde_json::json!({"trajectory": trajectory, "shotIndex": -2}))?;
        let value: serde_json::Value =
            serde_json::from_str(&run_shot(input.path(), &config, None, false)?)?;
        assert_eq!(value["shotIndex"], -2);
        assert_eq!(value["recommendations"].as_array().map(Vec::len), Some(0));
        Ok(())
    }

    #[test]
    fn test_trace_flag_picks_tracer() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracer(true).enabled());
            assert!(!tracer(false).enabled());
        });
    }

    #[test]
    fn test_schema_and_profiles() -> Result<()> {
        assert!(run_schema()?.contains("RallyAnalysisResult"));
        assert_eq!(load_config(Some("aggressive"), None)?, EngineConfig::aggressive());

        let mut file = NamedTempFile::new()?;
        file.write_all(br#"{"scoring": {"base_score": 45.0}}"#)?;
        let config = load_config(Some("aggressive"), Some(file.path()))?;
        assert_eq!(config.scoring.base_score, 45.0);

        let mut bad = NamedTempFile::new()?;
        bad.write_all(br#"{"segmentation": {"net_line_y": 3.0}}"#)?;
        assert!(load_config(None, Some(bad.path())).is_err());
        Ok(())
    }
}
