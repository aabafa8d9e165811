//! TaskTree CLI - Command line interface for the TaskTree planning server.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;

/// TaskTree CLI - planning server management tool
#[derive(Parser)]
#[command(name = "tasktree")]
#[command(about = "CLI for the TaskTree planning server", long_about = None)]
struct Cli {
    /// Planning server address
    #[arg(short, long, default_value = "http://[::1]:50061")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new task
    #[command(name = "create-task")]
    CreateTask {
        /// Task title
        #[arg(short, long)]
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// What finishing the task achieves
        #[arg(short, long, default_value = "")]
        goal: String,

        /// Mark the task as critical-path
        #[arg(long)]
        critical_path: bool,

        /// IDs of tasks this one depends on (repeatable)
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },

    /// Get a task with its dependency tree and execution order
    #[command(name = "get-task")]
    GetTask {
        /// Task ID
        id: String,
    },

    /// List all tasks
    #[command(name = "list-tasks")]
    ListTasks,

    /// Transition a task's status
    #[command(name = "set-status")]
    SetStatus {
        /// Task ID
        id: String,

        /// Target status: todo, in-progress, done, or failed
        status: String,
    },

    /// Show the current in-progress task
    #[command(name = "current")]
    Current,
}

// ============================================================================
// Wire types (mirrors the server's legacy JSON envelopes)
// ============================================================================

#[derive(Deserialize)]
struct McpResponse<T> {
    result: Option<T>,
    error: Option<McpError>,
}

#[derive(Deserialize)]
struct McpError {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct CreateTaskResult {
    task_id: String,
    status: String,
}

#[derive(Deserialize)]
struct SetTaskStatusResult {
    task_id: String,
    old_status: String,
    new_status: String,
}

#[derive(Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    status: String,
    depends_on_task_ids: Vec<String>,
    critical_path: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct GetTaskInfoResult {
    task: TaskRecord,
    tree: Vec<TaskRecord>,
    next_up: Vec<TaskRecord>,
}

#[derive(Deserialize)]
struct GetCurrentTaskResult {
    task_id: Option<String>,
    task: Option<TaskRecord>,
}

#[derive(Deserialize)]
struct TaskSummary {
    task_id: String,
    title: String,
    status: String,
    critical_path: bool,
    depends_on_count: usize,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::CreateTask {
            title,
            description,
            goal,
            critical_path,
            depends_on,
        } => {
            create_task(&client, &cli.addr, title, description, goal, critical_path, depends_on)
                .await?;
        }
        Commands::GetTask { id } => {
            get_task(&client, &cli.addr, id).await?;
        }
        Commands::ListTasks => {
            list_tasks(&client, &cli.addr).await?;
        }
        Commands::SetStatus { id, status } => {
            set_status(&client, &cli.addr, id, status).await?;
        }
        Commands::Current => {
            current(&client, &cli.addr).await?;
        }
    }

    Ok(())
}

/// Unwrap an MCP envelope or turn its error into a CLI failure.
fn into_result<T>(response: McpResponse<T>) -> Result<T, Box<dyn std::error::Error>> {
    match (response.result, response.error) {
        (Some(result), _) => Ok(result),
        (None, Some(err)) => Err(format!("{}: {}", err.code, err.message).into()),
        (None, None) => Err("empty response from server".into()),
    }
}

async fn create_task(
    client: &reqwest::Client,
    addr: &str,
    title: String,
    description: String,
    goal: String,
    critical_path: bool,
    depends_on: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = json!({
        "params": {
            "title": title,
            "description": description,
            "goal": goal,
            "critical_path": critical_path,
            "depends_on_task_ids": depends_on,
        }
    });

    let response: McpResponse<CreateTaskResult> = client
        .post(format!("{}/mcp/tools/create_task", addr))
        .json(&body)
        .send()
        .await?
        .json()
        .await?;
    let result = into_result(response)?;

    println!("Task created:");
    println!("  ID:     {}", result.task_id);
    println!("  Status: {}", result.status);

    Ok(())
}

async fn get_task(
    client: &reqwest::Client,
    addr: &str,
    id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = json!({ "params": { "task_id": id } });

    let response: McpResponse<GetTaskInfoResult> = client
        .post(format!("{}/mcp/tools/get_task_info", addr))
        .json(&body)
        .send()
        .await?
        .json()
        .await?;
    let result = into_result(response)?;

    print_task(&result.task);

    println!("  Tree ({} tasks):", result.tree.len());
    for task in &result.tree {
        println!("    - {} [{}] {}", task.id, task.status, task.title);
    }

    println!("  Next up ({} tasks):", result.next_up.len());
    for task in &result.next_up {
        let marker = if task.critical_path { " *critical*" } else { "" };
        println!("    - {} {}{}", task.id, task.title, marker);
    }

    Ok(())
}

async fn list_tasks(
    client: &reqwest::Client,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks: Vec<TaskSummary> = client
        .get(format!("{}/v1/tasks", addr))
        .send()
        .await?
        .json()
        .await?;

    println!("Tasks ({}):", tasks.len());
    println!(
        "{:<36}  {:<12}  {:<8}  {:<5}  {}",
        "ID", "STATUS", "DEPS", "CRIT", "TITLE"
    );
    println!("{}", "-".repeat(80));

    for task in tasks {
        let crit = if task.critical_path { "yes" } else { "no" };
        println!(
            "{:<36}  {:<12}  {:<8}  {:<5}  {}",
            task.task_id, task.status, task.depends_on_count, crit, task.title
        );
    }

    Ok(())
}

async fn set_status(
    client: &reqwest::Client,
    addr: &str,
    id: String,
    status: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = json!({ "params": { "task_id": id, "status": status } });

    let response: McpResponse<SetTaskStatusResult> = client
        .post(format!("{}/mcp/tools/set_task_status", addr))
        .json(&body)
        .send()
        .await?
        .json()
        .await?;
    let result = into_result(response)?;

    println!(
        "Task {}: {} -> {}",
        result.task_id, result.old_status, result.new_status
    );

    Ok(())
}

async fn current(
    client: &reqwest::Client,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = json!({ "params": {} });

    let response: McpResponse<GetCurrentTaskResult> = client
        .post(format!("{}/mcp/tools/get_current_task", addr))
        .json(&body)
        .send()
        .await?
        .json()
        .await?;
    let result = into_result(response)?;

    match (result.task_id, result.task) {
        (Some(id), Some(task)) => {
            println!("Current task: {}", id);
            print_task(&task);
        }
        (Some(id), None) => {
            println!("Current task: {} (record missing)", id);
        }
        _ => {
            println!("No current task");
        }
    }

    Ok(())
}

fn print_task(task: &TaskRecord) {
    println!("  ID:         {}", task.id);
    println!("  Title:      {}", task.title);
    println!("  Status:     {}", task.status);
    println!("  Critical:   {}", task.critical_path);
    println!("  Created:    {}", task.created_at.format("%Y-%m-%d %H:%M:%S"));

    if !task.depends_on_task_ids.is_empty() {
        println!("  Depends on:");
        for dep in &task.depends_on_task_ids {
            println!("    - {}", dep);
        }
    }
}
