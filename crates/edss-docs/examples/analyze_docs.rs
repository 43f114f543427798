//! Example: Run every documentation operation against a live host
//!
//! Run with: cargo run -p edss-docs --example analyze_docs -- https://docs.host/
//!
//! The first argument overrides the documentation host root.

use edss_docs::{DocsTool, DEFAULT_BASE_URL};
use serde_json::json;

/// Operation invocation shown by the example
struct Step {
    tool: &'static str,
    description: &'static str,
    arguments: fn() -> serde_json::Value,
}

const STEPS: &[Step] = &[
    Step {
        tool: "discover_links",
        description: "Discover documentation versions",
        arguments: || json!({}),
    },
    Step {
        tool: "get_documentation",
        description: "Authentication section of latest v4",
        arguments: || json!({"version": "latest", "section": "authentication"}),
    },
    Step {
        tool: "search_documentation",
        description: "Search latest and trunk for snapshots",
        arguments: || json!({"query": "snapshot", "version": "all"}),
    },
    Step {
        tool: "analyze_endpoints",
        description: "Endpoint analysis of trunk",
        arguments: || json!({"version": "trunk"}),
    },
    Step {
        tool: "compare_versions",
        description: "Compare latest against trunk",
        arguments: || json!({"focus": ["endpoints"]}),
    },
    Step {
        tool: "get_download_info",
        description: "ZIP download metadata",
        arguments: || json!({}),
    },
];

const PREVIEW_CHARS: usize = 400;

#[tokio::main]
async fn main() {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    println!("EDSS Docs Examples");
    println!("==================");
    println!("Host: {}\n", base_url);

    let tool = match DocsTool::builder().base_url(base_url).build() {
        Ok(tool) => tool,
        Err(e) => {
            eprintln!("Failed to build tool: {}", e);
            std::process::exit(1);
        }
    };

    let mut failed = 0;
    for (i, step) in STEPS.iter().enumerate() {
        println!("{}. {} ({})", i + 1, step.description, step.tool);

        let output = tool.call(step.tool, (step.arguments)()).await;
        print_preview(&output.text);

        if output.is_error {
            println!("   ✗ FAIL\n");
            failed += 1;
        } else {
            println!("   ✓ OK\n");
        }
    }

    println!("==================");
    println!("{} of {} operations succeeded", STEPS.len() - failed, STEPS.len());

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_preview(text: &str) {
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    for line in preview.lines() {
        println!("   {}", line);
    }
    if text.chars().count() > PREVIEW_CHARS {
        println!("   ...");
    }
}
