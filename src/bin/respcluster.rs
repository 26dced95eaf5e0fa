use respcluster::app::commands;

fn output_header() -> &'static str {
    "respcluster\nRun orchestration for the survey response clustering tool."
}

fn run() -> Result<(), String> {
    println!("{}\n", output_header());
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = commands::run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
