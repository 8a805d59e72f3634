//! AI backend diagnostics

use std::sync::Arc;

use anyhow::Result;
use catat_core::{
    AIClient, AiConfig, BackendKind, InMemoryMappingStore, RemoteClassifier, TextBackend,
};

const SAMPLE_DESCRIPTION: &str = "Timezone Grand Indonesia";

/// Environment variables that configure a backend
fn setup_hint(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::Gemini => "export GEMINI_API_KEY=<key>  (optional: GEMINI_MODEL)",
        BackendKind::Ollama => "export OLLAMA_HOST=http://localhost:11434  (optional: OLLAMA_MODEL)",
        BackendKind::OpenAICompatible => {
            "export OPENAI_COMPATIBLE_HOST=http://localhost:8000  (optional: OPENAI_COMPATIBLE_MODEL, OPENAI_COMPATIBLE_API_KEY)"
        }
        BackendKind::Mock => "nothing to configure",
    }
}

/// Show the resolved AI config, check connectivity and classify one description
///
/// Runs against a throwaway store, so nothing is learned.
pub async fn cmd_ai_test(config: &AiConfig, description: Option<&str>) -> Result<()> {
    println!("🔍 Testing AI backend...\n");
    println!("  Backend: {}", config.backend);
    println!("  Model:   {}", config.model);
    println!("  Host:    {}", config.host.as_deref().unwrap_or("(not set)"));
    println!("  Timeout: {}s", config.timeout.as_secs_f32());

    let Some(client) = AIClient::from_config(config)? else {
        println!("\n⚠️  {} backend is not configured", config.backend);
        println!("\nTo set it up:");
        println!("  {}", setup_hint(config.backend));
        println!("  or pick another backend with AI_BACKEND=gemini|ollama|openai_compatible");
        return Ok(());
    };

    print!("\nChecking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {} at {}", config.backend, client.host());
        return Ok(());
    }

    let description = description.unwrap_or(SAMPLE_DESCRIPTION);
    let classifier = RemoteClassifier::new(Some(client), Arc::new(InMemoryMappingStore::new()))
        .with_options(config.into())
        .with_timeout(config.timeout);

    print!("\n  \"{}\" → ", description);
    match classifier.try_classify(description).await {
        Ok(category) => println!("{}", category),
        Err(fault) => println!("❌ {} ({})", fault, fault.kind()),
    }

    Ok(())
}
