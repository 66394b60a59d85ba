// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sow_rag::utils::logging::{format_step, format_success, format_warning};
use sow_rag::{
    BlobClient, ChatMode, ChatSession, Config, ContractAgent, IndexDefinition, IndexerManager,
    RagEngine, SearchClient,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "sow_rag")]
#[command(version = "0.1.0")]
#[command(about = "RAG pipeline and contract agent for Statement-of-Work documents", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the index, data source, skillset, and indexer
    Provision {
        #[arg(long)]
        skip_indexer: bool,
    },

    /// Upload SOW documents to the blob container
    Upload {
        /// File or directory of documents
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,
    },

    /// Run the indexer to chunk and embed uploaded documents
    RunIndexer {
        #[arg(long)]
        wait: bool,
    },

    /// Show indexer status and last run summary
    Status,

    /// Search the index by hybrid semantic similarity
    Search {
        /// Search query text
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Ask a question and get a grounded answer (simple RAG)
    Ask {
        question: String,

        #[arg(long, value_name = "NUM")]
        top_k: Option<usize>,
    },

    /// Ask the contract agent (search + risk-check tools)
    Agent {
        question: String,
    },

    /// Interactive question loop
    Chat {
        #[arg(short, long, default_value = "simple")]
        mode: String,
    },

    /// Verify service connectivity and index state
    Verify,

    Stats,

    /// Delete and recreate the index and ingestion objects
    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    sow_rag::utils::logging::init_logger(cli.color, cli.verbose);

    info!("SOW RAG pipeline");
    info!("Loading configuration from: {}", cli.config.display());

    if !cli.config.exists() {
        warn!(
            "Config file {} not found, using defaults and environment",
            cli.config.display()
        );
    }
    let config =
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    match cli.command {
        Commands::Provision { skip_indexer } => {
            cmd_provision(&config, skip_indexer).await?;
        }
        Commands::Upload { path, recursive } => {
            cmd_upload(&config, &path, recursive).await?;
        }
        Commands::RunIndexer { wait } => {
            cmd_run_indexer(&config, wait).await?;
        }
        Commands::Status => {
            cmd_status(&config).await?;
        }
        Commands::Search { query, limit } => {
            cmd_search(&config, &query, limit).await?;
        }
        Commands::Ask { question, top_k } => {
            cmd_ask(&config, &question, top_k).await?;
        }
        Commands::Agent { question } => {
            cmd_agent(&config, &question).await?;
        }
        Commands::Chat { mode } => {
            cmd_chat(config, &mode).await?;
        }
        Commands::Verify => {
            cmd_verify(&config).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

async fn cmd_provision(config: &Config, skip_indexer: bool) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;

    println!("{}", format_step(1, 2, "Creating or updating index"));
    let index = IndexDefinition::sow_index(config);
    client
        .create_or_update_index(&index)
        .await
        .context("Index provisioning failed")?;
    println!("{}", format_success(&format!("Index ready: {}", index.name)));

    if skip_indexer {
        info!("Skipping data source, skillset, and indexer (--skip-indexer)");
        return Ok(());
    }

    println!("{}", format_step(2, 2, "Creating or updating ingestion objects"));
    let manager = IndexerManager::new(&client, config);
    manager
        .provision()
        .await
        .context("Ingestion object provisioning failed")?;
    println!(
        "{}",
        format_success(&format!(
            "Ingestion pipeline ready: {} -> {} -> {}",
            config.search.data_source_name, config.search.skillset_name, config.search.index_name
        ))
    );

    Ok(())
}

async fn cmd_upload(config: &Config, path: &PathBuf, recursive: bool) -> Result<()> {
    let client = BlobClient::from_config(config).context("Failed to create blob client")?;

    client
        .ensure_container()
        .await
        .context("Container creation failed")?;

    if path.is_file() {
        let blob_name = client.upload_file(path).await.context("Upload failed")?;
        println!("{}", format_success(&format!("Uploaded: {}", blob_name)));
        return Ok(());
    }

    let stats = client
        .upload_directory(path, recursive)
        .await
        .context("Directory upload failed")?;

    println!("\nUpload summary");
    println!("  Uploaded: {}", stats.files_uploaded);
    println!("  Skipped:  {}", stats.files_skipped);
    println!("  Failed:   {}", stats.files_failed);
    println!("  Bytes:    {}", stats.bytes_uploaded);
    println!("  Success:  {:.1}%", stats.success_rate());

    if stats.files_failed > 0 {
        println!("{}", format_warning("Some files failed to upload; see the log"));
    }

    Ok(())
}

async fn cmd_run_indexer(config: &Config, wait: bool) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;
    let manager = IndexerManager::new(&client, config);

    manager.run().await.context("Indexer run request failed")?;
    println!(
        "{}",
        format_success(&format!("Indexer run requested: {}", config.search.indexer_name))
    );

    if wait {
        let summary = manager
            .wait_for_completion()
            .await
            .context("Indexer polling failed")?;
        print_run_summary(&summary);
    }

    Ok(())
}

async fn cmd_status(config: &Config) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;
    let manager = IndexerManager::new(&client, config);

    let status = manager.status().await.context("Status request failed")?;
    println!("Indexer: {}", config.search.indexer_name);
    println!("Status:  {}", status.status);

    match status.last_result {
        Some(summary) => print_run_summary(&summary),
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

fn print_run_summary(summary: &sow_rag::search::IndexerRunSummary) {
    println!("\nLast run");
    println!("  Status:          {}", summary.status);
    println!("  Items processed: {}", summary.items_processed);
    println!("  Items failed:    {}", summary.items_failed);
    if let Some(message) = &summary.error_message {
        println!("  Error:           {}", message);
    }
}

async fn cmd_search(config: &Config, query: &str, limit: usize) -> Result<()> {
    let engine = RagEngine::new(config.clone()).context("Failed to create RAG engine")?;

    let results = engine
        .search_documents(query, limit)
        .await
        .context("Hybrid search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Checking that documents have been uploaded and indexed");
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.iter().enumerate() {
        println!("\n{}. {} (Score: {:.4})", idx + 1, result.title, result.score);

        if let Some(reranker) = result.reranker_score {
            println!("   Reranker: {:.4}", reranker);
        }

        println!("   Preview:");
        let preview = sow_rag::Validator::truncate_text(&result.chunk, 300);
        for line in preview.lines().take(5) {
            println!("     {}", line);
        }
    }

    println!("\n{}", "=".repeat(80));
    info!("Search complete");

    Ok(())
}

async fn cmd_ask(config: &Config, question: &str, top_k: Option<usize>) -> Result<()> {
    let engine = RagEngine::new(config.clone()).context("Failed to create RAG engine")?;
    let top_k = top_k.unwrap_or(config.answer.top_k);

    let answer = engine
        .generate_answer(question, top_k)
        .await
        .context("Answer generation failed")?;

    println!("\n{}", "=".repeat(80));
    println!("{}", answer);
    println!("{}", "=".repeat(80));

    Ok(())
}

async fn cmd_agent(config: &Config, question: &str) -> Result<()> {
    let engine = RagEngine::new(config.clone()).context("Failed to create RAG engine")?;
    let agent = ContractAgent::new(&engine);

    let outcome = agent.run(question).await.context("Agent run failed")?;

    println!("\n{}", "=".repeat(80));
    println!("{}", outcome.answer);
    println!("{}", "=".repeat(80));
    println!(
        "Steps: {} | Tools used: {}",
        outcome.steps,
        if outcome.tools_used.is_empty() {
            "none".to_string()
        } else {
            outcome.tools_used.join(", ")
        }
    );

    Ok(())
}

async fn cmd_chat(config: Config, mode: &str) -> Result<()> {
    let mode = ChatMode::from_str(mode).context("Invalid chat mode")?;
    let engine = RagEngine::new(config).context("Failed to create RAG engine")?;

    let mut session = ChatSession::new(engine, mode);
    session.run().await.context("Chat session failed")?;

    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;

    println!("Verifying services\n");

    let index_name = &config.search.index_name;
    match client.index_exists(index_name).await {
        Ok(true) => {
            let count = client.document_count(index_name).await.unwrap_or(0);
            println!(
                "{}",
                format_success(&format!("Index '{}' exists ({} documents)", index_name, count))
            );
        }
        Ok(false) => {
            println!(
                "{}",
                format_warning(&format!(
                    "Index '{}' does not exist (run `provision` first)",
                    index_name
                ))
            );
        }
        Err(e) => {
            error!("Search service check failed: {}", e);
            return Err(anyhow::anyhow!("Search service unreachable: {}", e));
        }
    }

    let engine = RagEngine::new(config.clone()).context("Failed to create RAG engine")?;
    match engine.openai_client().embed("connectivity check").await {
        Ok(embedding) => println!(
            "{}",
            format_success(&format!(
                "Embedding deployment '{}' reachable (dimension {})",
                engine.openai_client().embedding_deployment(),
                embedding.len()
            ))
        ),
        Err(e) => println!(
            "{}",
            format_warning(&format!("Embedding deployment check failed: {}", e))
        ),
    }

    match engine
        .openai_client()
        .chat(&[sow_rag::ChatMessage::user("Reply with OK")], None, 0.0)
        .await
    {
        Ok(_) => println!(
            "{}",
            format_success(&format!(
                "Chat deployment '{}' reachable",
                engine.openai_client().chat_deployment()
            ))
        ),
        Err(e) => println!(
            "{}",
            format_warning(&format!("Chat deployment check failed: {}", e))
        ),
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;

    let count = client
        .document_count(&config.search.index_name)
        .await
        .context("Document count failed")?;

    println!("Index:     {}", config.search.index_name);
    println!("Indexer:   {}", config.search.indexer_name);
    println!("Skillset:  {}", config.search.skillset_name);
    println!("Documents: {}", count);

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete the index and all ingestion objects. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting search service objects - indexed data will be lost");

    let client = SearchClient::from_config(config).context("Failed to create search client")?;
    let manager = IndexerManager::new(&client, config);

    manager.teardown().await.context("Teardown failed")?;
    client
        .delete_index(&config.search.index_name)
        .await
        .context("Index deletion failed")?;
    println!("{}", format_success("Deleted index and ingestion objects"));

    cmd_provision(config, false).await?;
    println!("{}", format_success("Reset complete"));

    Ok(())
}
