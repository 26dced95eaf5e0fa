#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Runs,
    Show,
    Rename,
    Prefs,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "runs" => CliVerb::Runs,
        "show" => CliVerb::Show,
        "rename" => CliVerb::Rename,
        "prefs" => CliVerb::Prefs,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run <input.csv> [flags]              Start a clustering run and follow its progress"
            .to_string(),
        "    --delimiter <char>                 Input delimiter (default: ,)".to_string(),
        "    --has-headers                      First input row is a header".to_string(),
        "    --columns <i,j,...>                Column indexes to cluster (default: 0)".to_string(),
        "    --clusters <n>                     Fixed cluster count".to_string(),
        "    --auto [--max-clusters <n>]        Determine the cluster count automatically"
            .to_string(),
        "    --seed <n>                         Random seed (random in [0,1000) if omitted)"
            .to_string(),
        "    --exclude <w1,w2,...>              Words excluded from clustering".to_string(),
        "    --language-model <name>            Embedding model name".to_string(),
        "    --nearest-neighbors <n>            Outlier detection neighbor count".to_string(),
        "    --z-score-threshold <x>            Outlier detection threshold".to_string(),
        "    --merge-threshold <x>              Agglomerative merge threshold in [0,1]".to_string(),
        "    --python <path>                    Worker interpreter (default: python3)".to_string(),
        "    --script <path>                    Worker script (default: main.py)".to_string(),
        "    --log-level <level>                Worker log level".to_string(),
        "  runs                                 List previous runs, newest first".to_string(),
        "  show <run> <artifact>                Print a run artifact (args|assignments|".to_string(),
        "                                       similarities|outliers|merges|timestamps)"
            .to_string(),
        "  rename <run> <new-name>              Rename a completed run".to_string(),
        "  prefs show|set <key> <value>         Inspect or change app preferences".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
