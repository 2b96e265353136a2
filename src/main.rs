use clap::{Parser, Subcommand};
use colored::Colorize;
use ops_assistant::protocol::TaskResponse;
use ops_assistant::{Agent, OperationsAgent, RuntimeError, Settings};
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;

const EXAMPLE_TASKS: &[&str] = &[
    "Find top 3 Python GitHub repos and tell me the weather in Bangalore",
    "Show trending AI repositories and weather in Delhi",
    "Get best machine learning repositories and weather in Mumbai",
];

/// Multi-agent operations assistant: plan, execute, verify.
#[derive(Parser)]
#[command(name = "ops-assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a natural-language task through the planner, executor and verifier
    Run {
        task: String,
        /// Print each stage under its own heading instead of one JSON document
        #[arg(long)]
        pretty: bool,
    },
    /// Check that API keys are configured
    Check,
    /// List example tasks
    Examples,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Run { task, pretty } => match run_task(&settings, &task) {
            Ok(output) => {
                print_response(&output, pretty);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{}", json!({ "detail": format!("Task execution failed: {err}") }));
                ExitCode::FAILURE
            }
        },
        Command::Check => check_setup(&settings),
        Command::Examples => {
            for task in EXAMPLE_TASKS {
                println!("{task}");
            }
            ExitCode::SUCCESS
        }
    }
}

fn run_task(settings: &Settings, task: &str) -> Result<TaskResponse, RuntimeError> {
    let agent = OperationsAgent::from_settings(settings)?;
    agent.run(task)
}

fn print_response(response: &TaskResponse, pretty: bool) {
    if !pretty {
        println!("{}", to_pretty_json(response));
        return;
    }

    println!("{}\n{}", "--- PLAN ---".cyan().bold(), to_pretty_json(&response.plan));
    println!(
        "{}\n{}",
        "--- EXECUTION ---".cyan().bold(),
        to_pretty_json(&response.execution_results)
    );
    println!(
        "{}\n{}",
        "--- FINAL OUTPUT ---".cyan().bold(),
        to_pretty_json(&response.final_output)
    );
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}

fn check_setup(settings: &Settings) -> ExitCode {
    let report = settings.check();

    println!("{}", "Checking environment variables...".bold());
    for (name, masked) in &report.configured {
        println!("  {name}: {masked} {}", "✓".green());
    }

    if !report.issues.is_empty() {
        println!("\n{}", "ISSUES FOUND:".red().bold());
        for issue in &report.issues {
            println!("  • {issue}");
        }
    }
    if !report.warnings.is_empty() {
        println!("\n{}", "WARNINGS:".yellow().bold());
        for warning in &report.warnings {
            println!("  • {warning}");
        }
    }

    if report.is_ready() {
        println!("\n{}", "All required keys are set.".green().bold());
        ExitCode::SUCCESS
    } else {
        println!("\nFix these issues before running a task.");
        ExitCode::FAILURE
    }
}
