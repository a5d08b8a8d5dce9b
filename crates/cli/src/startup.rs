use std::{path::Path, sync::Arc};

use {
    sigrelay_channels::{GroupSelector, Messenger, find_group},
    sigrelay_common::types::{Group, OutboundMessage, Recipient},
    sigrelay_config::{Severity, SigrelayConfig, validate},
    sigrelay_dispatch::Dispatcher,
    sigrelay_signal::{SignalMessenger, start_receiving},
    tracing::{info, warn},
};

use crate::settings::{Overrides, Settings};

const STARTED_REACTION: &str = "🇨🇦";
const READY_REACTION: &str = "🤖";

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to initialise signal client: {0}")]
    Client(#[from] sigrelay_signal::Error),

    #[error("failed to list groups: {0}")]
    GroupList(#[source] sigrelay_channels::Error),

    #[error("control group not found by {0}")]
    ControlGroupNotFound(GroupSelector),

    #[error(transparent)]
    Channel(#[from] sigrelay_channels::Error),
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Client(_) | Self::GroupList(_) => 2,
            Self::ControlGroupNotFound(_) => 3,
            Self::Channel(_) => 1,
        }
    }
}

/// Load settings, connect, announce in the control group, relay until
/// Ctrl-C or SIGTERM, then announce shutdown.
pub async fn run(config_path: Option<&Path>, overrides: Overrides) -> Result<(), StartupError> {
    let settings = load_settings(config_path, &overrides)?;
    info!(
        account = %settings.signal.account,
        api_url = %settings.signal.api_url,
        control_group = %settings.control_group,
        "starting signal client"
    );

    let (messenger, control_group) = connect(settings).await?;
    serve(messenger, control_group, wait_for_shutdown()).await
}

/// Connect to the daemon and resolve the control group.
async fn connect(settings: Settings) -> Result<(Arc<SignalMessenger>, Group), StartupError> {
    let messenger = Arc::new(SignalMessenger::connect(settings.signal).await?);

    let groups = messenger.groups().await.map_err(StartupError::GroupList)?;
    for group in &groups {
        info!(id = %group.id, name = %group.name, "group");
    }
    let control_group = find_group(&groups, &settings.control_group)
        .cloned()
        .ok_or(StartupError::ControlGroupNotFound(settings.control_group))?;
    info!(id = %control_group.id, name = %control_group.name, "control group resolved");

    Ok((messenger, control_group))
}

/// Announce, relay until `shutdown` resolves, then announce shutdown.
async fn serve(
    messenger: Arc<SignalMessenger>,
    control_group: Group,
    shutdown: impl Future<Output = ()>,
) -> Result<(), StartupError> {
    announce(
        messenger.as_ref(),
        &control_group,
        format!("Chatbot v{} started.", env!("CARGO_PKG_VERSION")),
        STARTED_REACTION,
    )
    .await?;

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        control_group.clone(),
    ));
    let receiver = start_receiving(Arc::clone(&messenger), dispatcher);

    if let Err(e) = announce(
        messenger.as_ref(),
        &control_group,
        "Chatbot now accepting commands.",
        READY_REACTION,
    )
    .await
    {
        receiver.stop().await;
        return Err(e.into());
    }
    info!("accepting commands");

    shutdown.await;
    info!("shutdown requested, stopping receive loop");
    receiver.stop().await;

    messenger
        .send(OutboundMessage::text(
            Recipient::Group(control_group),
            "Chatbot shutting down.",
        ))
        .await?;
    Ok(())
}

fn load_settings(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<Settings, StartupError> {
    let loaded =
        sigrelay_config::load(config_path).map_err(|e| StartupError::Config(e.to_string()))?;
    if let Some(ref path) = loaded.path {
        info!(path = %path.display(), "loaded config");
    }
    settings_from(overrides.apply(loaded.config))
}

/// Validate the merged config and pull out what the bot needs.
fn settings_from(config: SigrelayConfig) -> Result<Settings, StartupError> {
    let result = validate(&config);
    for d in &result.diagnostics {
        if d.severity == Severity::Warning {
            warn!(path = %d.path, "{}", d.message);
        }
    }
    if let Some(d) = result
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Error)
    {
        return Err(StartupError::Config(format!("{}: {}", d.path, d.message)));
    }

    Settings::resolve(&config).ok_or_else(|| {
        StartupError::Config(
            "no account number: pass --account, set SIGRELAY_ACCOUNT, or set signal.account"
                .into(),
        )
    })
}

/// Post `text` to the control group and react to it.
async fn announce(
    messenger: &dyn Messenger,
    group: &Group,
    text: impl Into<String>,
    reaction: &str,
) -> sigrelay_channels::Result<()> {
    let sent = messenger
        .send(OutboundMessage::text(Recipient::Group(group.clone()), text))
        .await?;
    messenger.react(&sent.message_ref(), reaction).await
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
