use poco_client::services::ErrorBoundary;
use poco_client::{PatientClient, load_config};
use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("poco_client=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    println!("Loaded configuration:");
    println!("{}", config);

    let client = PatientClient::new(config)?;
    if let Ok(token) = std::env::var("POCO_TOKEN") {
        client.session.set_token(SecretString::from(token));
    }

    let mut list = client.list_controller();
    match std::env::args().nth(1) {
        Some(search) => list.set_search_text(search),
        None => list.load().await,
    }
    list.settle().await;

    let mut screen = ErrorBoundary::new("patient-list", list.view().clone());
    if let Some(message) = &list.view().error {
        screen.capture(message.clone());
    }

    if let Some(message) = screen.error_message() {
        println!("Failed to load patients: {}", message);
    }
    match &screen.value().page {
        Some(page) => {
            println!(
                "Page {} of {} ({} patients total)",
                page.current_page, page.total_pages, page.total_count
            );
            for patient in &page.patients {
                println!("  {}  {}  {}", patient.id, patient.full_name(), patient.email);
            }
        }
        None => println!("No patients loaded"),
    }

    Ok(())
}
