use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use extract::{ClientConfig, CompletionClient, Extractor, Provider};
use std::path::{Path, PathBuf};

const DIAGRAM_PATH: &str = "graph_visualization.png";
const MERMAID_PATH: &str = "graph_mermaid.md";

#[derive(Parser)]
#[command(
    name = "findetect",
    about = "Extract a financial knowledge graph from an annual report"
)]
struct Cli {
    /// Path to the input text file
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file path
    #[arg(short, long, default_value = "graph_output.json")]
    output: PathBuf,

    /// Completion provider
    #[arg(short, long, value_enum, default_value_t = ProviderArg::Groq)]
    provider: ProviderArg,

    /// API key (or set GROQ_API_KEY/OPENAI_API_KEY)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Also render a PNG visualization
    #[arg(short, long)]
    visualize: bool,

    /// Also write a Mermaid flow chart
    #[arg(short, long)]
    mermaid: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Groq,
    Openai,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Groq => Provider::Groq,
            ProviderArg::Openai => Provider::OpenAi,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if !cli.input.exists() {
        bail!("input file {} not found", cli.input.display());
    }

    let config = ClientConfig::resolve(cli.provider.into(), cli.api_key)?;
    let extractor = Extractor::new(CompletionClient::new(config));

    let graph = extractor.extract_file(&cli.input).await?;

    graph.save(&cli.output)?;
    println!("Saved knowledge graph to {}", cli.output.display());

    if cli.visualize {
        render::render_diagram(&graph, Path::new(DIAGRAM_PATH))?;
        println!("Saved visualization to {DIAGRAM_PATH}");
    }

    if cli.mermaid {
        render::save_mermaid(&graph, Path::new(MERMAID_PATH))?;
        println!("Saved Mermaid chart to {MERMAID_PATH}");
    }

    println!(
        "Extraction complete: {} entities, {} relationships",
        graph.entities.len(),
        graph.relationships.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let cli = Cli::try_parse_from(["findetect", "--input", "report.txt"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("report.txt"));
        assert_eq!(cli.output, PathBuf::from("graph_output.json"));
        assert!(matches!(cli.provider, ProviderArg::Groq));
        assert!(cli.api_key.is_none());
        assert!(!cli.visualize);
        assert!(!cli.mermaid);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["findetect"]).is_err());
    }

    #[test]
    fn short_flags_cover_the_full_surface() {
        let cli = Cli::try_parse_from([
            "findetect", "-i", "report.txt", "-o", "out.json", "-p", "openai", "-k", "sk-test",
            "-v", "-m",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from("out.json"));
        assert!(matches!(cli.provider, ProviderArg::Openai));
        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        assert!(cli.visualize);
        assert!(cli.mermaid);
        assert_eq!(Provider::from(cli.provider), Provider::OpenAi);
    }
}
