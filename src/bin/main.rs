use advisory_engine::{
    cache::ResponseCache,
    config::{GatewayConfig, SWEEP_INTERVAL},
    gateway::AdvisoryGateway,
    models::{AssetClass, UserSelections},
    orchestrator::AdvisoryOrchestrator,
};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    info!("Advisory Engine starting");

    let config = GatewayConfig::from_env();
    if !config.has_credentials() {
        info!("No advisory credentials configured - running in fallback mode");
    }

    // Create components
    let cache = ResponseCache::new();
    let _sweeper = cache.spawn_sweeper(SWEEP_INTERVAL);
    let gateway = Box::new(AdvisoryGateway::new(config));
    let orchestrator = AdvisoryOrchestrator::new(gateway, cache);

    // Sample customer record, shaped like a raw store row
    let raw_record = json!({
        "id": "CUST_1001",
        "name": "Jordan Reyes",
        "age": 41,
        "total_assets": 520000,
        "risk_tolerance": "growth",
        "investment_experience": 9,
        "liquidity_needs": "long",
        "annual_income": 165000,
        "financial_goals": ["retire at 62", "vacation home"],
        "industry_context": "manufacturing"
    });

    let selections = UserSelections {
        focus_areas: vec!["tax efficiency".to_string()],
        horizon: Some("20 years".to_string()),
        notes: None,
    };

    info!(customer_id = "CUST_1001", "Requesting advice");

    match orchestrator
        .get_advice("CUST_1001", &raw_record, &selections)
        .await
    {
        Ok(bundle) => {
            println!("\n=== ADVISORY RESULT ===");
            println!("Customer:  {}", bundle.customer_profile.name);
            println!("Strategy:  {}", bundle.allocation.strategy_label);
            println!("Risk:      {}/100", bundle.allocation.risk_score);
            println!(
                "Mix:       {}% stocks / {}% bonds / {}% cash",
                bundle.allocation.percent(AssetClass::Stocks),
                bundle.allocation.percent(AssetClass::Bonds),
                bundle.allocation.percent(AssetClass::Cash),
            );
            println!("Products:");
            for product in &bundle.allocation.recommended_products {
                println!("  - {}", product);
            }
            println!(
                "\nNarrative ({}, fallback: {}):\n{}",
                bundle.advisory.model_id, bundle.advisory.is_fallback, bundle.advisory.narrative
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Advice generation failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
