use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::config::{
    bootstrap_data_root, default_data_root_path, AdvancedOptions, AlgorithmSettings,
    AppPreferences, DataPaths, FileSettings,
};
use crate::run::{QueryFacade, RunState, RunStateStore};
use crate::worker::{WorkerConfig, WorkerLauncher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_LANGUAGE_MODEL: &str = "BAAI/bge-large-en-v1.5";
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let Some(verb) = args.first() else {
        return Ok(help_text());
    };
    match parse_cli_verb(verb) {
        CliVerb::Run => cmd_run(&args[1..]),
        CliVerb::Runs => cmd_runs(),
        CliVerb::Show => cmd_show(&args[1..]),
        CliVerb::Rename => cmd_rename(&args[1..]),
        CliVerb::Prefs => cmd_prefs(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{verb}`\n\n{}", help_text())),
    }
}

fn data_paths() -> Result<DataPaths, String> {
    let root = match std::env::var_os("RESPCLUSTER_DATA_ROOT") {
        Some(root) => PathBuf::from(root),
        None => default_data_root_path().map_err(|err| err.to_string())?,
    };
    Ok(DataPaths::new(root))
}

fn facade() -> Result<QueryFacade, String> {
    let paths = data_paths()?;
    Ok(QueryFacade::new(Arc::new(RunStateStore::new()), paths))
}

fn cmd_run(args: &[String]) -> Result<String, String> {
    let mut input: Option<PathBuf> = None;
    let mut delimiter = ",".to_string();
    let mut has_header = false;
    let mut selected_columns = vec![0usize];
    let mut cluster_count: Option<u32> = None;
    let mut auto_cluster_count = false;
    let mut max_clusters: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut excluded_words: Vec<String> = Vec::new();
    let mut language_model = DEFAULT_LANGUAGE_MODEL.to_string();
    let mut nearest_neighbors: Option<u32> = None;
    let mut z_score_threshold: Option<f64> = None;
    let mut merge_threshold: Option<f64> = None;
    let mut python_binary = PathBuf::from("python3");
    let mut script = PathBuf::from("main.py");
    let mut log_level: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--delimiter" => delimiter = required_value(&mut iter, arg)?,
            "--has-headers" => has_header = true,
            "--columns" => {
                selected_columns = parse_list(&required_value(&mut iter, arg)?, arg)?;
            }
            "--clusters" => cluster_count = Some(parse_number(&mut iter, arg)?),
            "--auto" => auto_cluster_count = true,
            "--max-clusters" => max_clusters = Some(parse_number(&mut iter, arg)?),
            "--seed" => seed = Some(parse_number(&mut iter, arg)?),
            "--exclude" => {
                excluded_words = required_value(&mut iter, arg)?
                    .split(',')
                    .map(str::to_string)
                    .collect();
            }
            "--language-model" => language_model = required_value(&mut iter, arg)?,
            "--nearest-neighbors" => nearest_neighbors = Some(parse_number(&mut iter, arg)?),
            "--z-score-threshold" => z_score_threshold = Some(parse_number(&mut iter, arg)?),
            "--merge-threshold" => merge_threshold = Some(parse_number(&mut iter, arg)?),
            "--python" => python_binary = PathBuf::from(required_value(&mut iter, arg)?),
            "--script" => script = PathBuf::from(required_value(&mut iter, arg)?),
            "--log-level" => log_level = Some(required_value(&mut iter, arg)?),
            other if other.starts_with("--") => {
                return Err(format!("unknown flag `{other}` for `run`"));
            }
            positional => {
                if input.is_some() {
                    return Err(format!("unexpected extra argument `{positional}`"));
                }
                input = Some(PathBuf::from(positional));
            }
        }
    }

    let input = input.ok_or_else(|| "run requires an input csv path".to_string())?;

    let file_settings = FileSettings {
        path: input,
        has_header,
        delimiter,
        selected_columns,
    };
    let algorithm_settings = AlgorithmSettings {
        auto_cluster_count,
        max_clusters,
        cluster_count,
        seed,
        excluded_words,
        advanced_options: AdvancedOptions {
            outlier_detection: nearest_neighbors.is_some() && z_score_threshold.is_some(),
            nearest_neighbors,
            z_score_threshold,
            agglomerative_clustering: merge_threshold.is_some(),
            similarity_threshold: merge_threshold,
            language_model,
        },
    };

    let paths = data_paths()?;
    bootstrap_data_root(&paths).map_err(|err| err.to_string())?;
    let working_dir = std::env::current_dir().map_err(|err| err.to_string())?;
    let config = WorkerConfig {
        python_binary,
        script,
        working_dir,
        output_dir: paths.output_root(),
        log_dir: paths.worker_log_dir(),
        log_level,
    };

    let store = Arc::new(RunStateStore::new());
    let launcher = WorkerLauncher::new(Arc::clone(&store), config, paths.root.clone());
    let facade = QueryFacade::new(Arc::clone(&store), paths.clone());

    let handle = launcher
        .launch(&file_settings, &algorithm_settings)
        .map_err(|err| err.to_string())?;

    let mut printed_completed = 0usize;
    let mut printed_failed = 0usize;
    let mut current_step: Option<String> = None;
    while handle.is_running() {
        std::thread::sleep(STATUS_POLL_INTERVAL);
        let status = facade.poll_run_status();
        for completed in status.progress.completed_tasks.iter().skip(printed_completed) {
            println!("done     {}", completed.step);
        }
        printed_completed = status.progress.completed_tasks.len();
        for failed in status.progress.failed_tasks.iter().skip(printed_failed) {
            println!("failed   {}", failed.step);
        }
        printed_failed = status.progress.failed_tasks.len();
        let step = status.progress.current_task.as_ref().map(|c| c.step.clone());
        if step != current_step {
            if let Some(step) = &step {
                println!("started  {step}");
            }
            current_step = step;
        }
    }
    handle.wait();

    let status = facade.poll_run_status();
    match status.state {
        RunState::Completed => {
            let results = facade.results_dir().map_err(|err| err.to_string())?;
            Ok(format!(
                "run `{}` completed\nresults: {}",
                status.name,
                results.display()
            ))
        }
        _ => Err(format!(
            "run failed; see worker logs under {}",
            paths.worker_log_dir().display()
        )),
    }
}

fn cmd_runs() -> Result<String, String> {
    let facade = facade()?;
    let mut runs = facade.previous_runs().map_err(|err| err.to_string())?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if runs.is_empty() {
        return Ok("no previous runs".to_string());
    }
    let lines: Vec<String> = runs
        .iter()
        .map(|run| format!("{}  {}", run.timestamp, run.name))
        .collect();
    Ok(lines.join("\n"))
}

fn cmd_show(args: &[String]) -> Result<String, String> {
    let [name, artifact] = args else {
        return Err("usage: show <run> <artifact>".to_string());
    };
    let facade = facade()?;
    facade.load_run(name).map_err(|err| err.to_string())?;
    match artifact.as_str() {
        "args" => to_pretty(&facade.args_snapshot().map_err(|err| err.to_string())?),
        "assignments" => {
            let assignments = facade.cluster_assignments().map_err(|err| err.to_string())?;
            let lines: Vec<String> = assignments
                .iter()
                .map(|row| {
                    format!(
                        "{}\t{:.4}\t{}",
                        row.cluster_index, row.similarity_to_center, row.response
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        "similarities" => {
            to_pretty(&facade.pairwise_similarities().map_err(|err| err.to_string())?)
        }
        "outliers" => to_pretty(&facade.outliers().map_err(|err| err.to_string())?),
        "merges" => to_pretty(&facade.merged_clusters().map_err(|err| err.to_string())?),
        "timestamps" => to_pretty(&facade.timestamps().map_err(|err| err.to_string())?),
        other => Err(format!("unknown artifact `{other}`")),
    }
}

fn cmd_rename(args: &[String]) -> Result<String, String> {
    let [name, new_name] = args else {
        return Err("usage: rename <run> <new-name>".to_string());
    };
    let facade = facade()?;
    facade.load_run(name).map_err(|err| err.to_string())?;
    facade.set_run_name(new_name).map_err(|err| err.to_string())?;
    Ok(format!("renamed `{name}` to `{new_name}`"))
}

fn cmd_prefs(args: &[String]) -> Result<String, String> {
    let paths = data_paths()?;
    let prefs_path = paths.preferences_file();
    match args.first().map(String::as_str) {
        Some("show") | None => {
            let prefs = AppPreferences::from_path(&prefs_path).map_err(|err| err.to_string())?;
            to_pretty(&prefs)
        }
        Some("set") => {
            let [_, key, value] = args else {
                return Err("usage: prefs set <key> <value>".to_string());
            };
            let parsed: bool = value
                .parse()
                .map_err(|_| format!("value for `{key}` must be true or false"))?;
            let mut prefs =
                AppPreferences::from_path(&prefs_path).map_err(|err| err.to_string())?;
            match key.as_str() {
                "tutorialMode" => prefs.tutorial_mode = parsed,
                "firstLaunch" => prefs.first_launch = parsed,
                other => return Err(format!("unknown preference `{other}`")),
            }
            prefs.save(&prefs_path).map_err(|err| err.to_string())?;
            Ok(format!("{key} = {parsed}"))
        }
        Some(other) => Err(format!("unknown prefs action `{other}`")),
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}

fn required_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("`{flag}` requires a value"))
}

fn parse_number<T: std::str::FromStr>(
    iter: &mut std::slice::Iter<'_, String>,
    flag: &str,
) -> Result<T, String> {
    let raw = required_value(iter, flag)?;
    raw.parse()
        .map_err(|_| format!("invalid value `{raw}` for `{flag}`"))
}

fn parse_list(raw: &str, flag: &str) -> Result<Vec<usize>, String> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse()
                .map_err(|_| format!("invalid value `{part}` for `{flag}`"))
        })
        .collect()
}
