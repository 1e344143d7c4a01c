//! Study binary: wires the adapters and runs one participant session.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mirror_study::adapters::ai::{OpenAiConfig, OpenAiProvider};
use mirror_study::adapters::sheets::{SheetsStore, SheetsStoreConfig};
use mirror_study::adapters::terminal::TerminalUi;
use mirror_study::application::{
    PhaseController, StudySettings, StyleProfileExtractor, SurveySubmission,
};
use mirror_study::config::AppConfig;
use mirror_study::domain::session::{SessionEvent, SessionState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let provider = Arc::new(OpenAiProvider::new(
        OpenAiConfig::new(api_key)
            .with_model(config.ai.model.as_str())
            .with_base_url(config.ai.base_url.as_str())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?);

    let store = Arc::new(SheetsStore::new(
        SheetsStoreConfig::new(
            config.sheets.spreadsheet_id.as_str(),
            config.sheets.access_token.as_str(),
        )
        .with_base_url(config.sheets.base_url.as_str())
        .with_timeout(config.sheets.timeout()),
    )?);

    let settings = StudySettings::from(&config.study);
    let controller = PhaseController::new(
        provider.clone(),
        StyleProfileExtractor::new(provider, settings.style_sample_window),
        SurveySubmission::new(store),
        settings,
    );

    let mut state = SessionState::new();
    let mut ui = TerminalUi::new();
    tracing::info!(participant = %state.participant_id(), "session created");

    let mut render = controller.handle(&mut state, SessionEvent::Advance).await;
    while let Some(event) = ui.next_event(&render).await? {
        render = controller.handle(&mut state, event).await;
    }

    tracing::info!(participant = %state.participant_id(), "session ended");
    Ok(())
}
